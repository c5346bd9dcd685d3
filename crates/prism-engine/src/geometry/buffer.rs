use crate::gfx::{BufferId, GraphicsContext, RenderBackend, VertexArrayId};

use super::{AttributeLayout, GeometryError};

/// Draw-ready geometry: a filled vertex buffer plus the vertex array that
/// records its attribute layout.
///
/// Immutable after upload. Drawing needs only [`GeometryBuffer::bind_for_draw`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeometryBuffer {
    buffer: BufferId,
    vertex_array: VertexArrayId,
    layout: AttributeLayout,
    byte_len: usize,
    vertex_count: u32,
}

impl GeometryBuffer {
    /// Uploads `bytes` and records `layout` in a fresh vertex array.
    ///
    /// Leaves no vertex array and no array buffer bound. Zero-length data is
    /// accepted and yields a zero-vertex handle.
    pub fn upload<B: RenderBackend>(
        ctx: &mut GraphicsContext<B>,
        label: &str,
        bytes: &[u8],
        layout: AttributeLayout,
    ) -> Result<Self, GeometryError> {
        let vertex_count = layout.vertex_count(bytes.len())?;

        let vertex_array = ctx.create_vertex_array();
        ctx.bind_vertex_array(Some(vertex_array))?;

        let buffer = ctx.create_buffer(label);
        ctx.bind_array_buffer(Some(buffer))?;
        ctx.buffer_data(bytes)?;

        for attr in layout.attributes() {
            ctx.vertex_attrib_pointer(*attr, layout.stride())?;
            ctx.enable_vertex_attrib(attr.slot)?;
        }

        // The vertex array now holds the buffer association.
        ctx.bind_array_buffer(None)?;
        ctx.bind_vertex_array(None)?;

        log::debug!(
            target: "prism::geometry",
            "uploaded `{label}`: {} bytes, {vertex_count} vertices, stride {}",
            bytes.len(),
            layout.stride()
        );

        Ok(Self {
            buffer,
            vertex_array,
            layout,
            byte_len: bytes.len(),
            vertex_count,
        })
    }

    /// [`GeometryBuffer::upload`] for typed vertex data.
    pub fn upload_vertices<B: RenderBackend, V: bytemuck::Pod>(
        ctx: &mut GraphicsContext<B>,
        label: &str,
        vertices: &[V],
        layout: AttributeLayout,
    ) -> Result<Self, GeometryError> {
        Self::upload(ctx, label, bytemuck::cast_slice(vertices), layout)
    }

    /// Re-binds the vertex array; the buffer and layout come with it.
    pub fn bind_for_draw<B: RenderBackend>(
        &self,
        ctx: &mut GraphicsContext<B>,
    ) -> Result<(), GeometryError> {
        ctx.bind_vertex_array(Some(self.vertex_array))?;
        Ok(())
    }

    /// Deletes the vertex array, then the buffer.
    pub fn release<B: RenderBackend>(self, ctx: &mut GraphicsContext<B>) {
        ctx.delete_vertex_array(self.vertex_array);
        ctx.delete_buffer(self.buffer);
    }

    #[inline]
    pub fn buffer(&self) -> BufferId {
        self.buffer
    }

    #[inline]
    pub fn vertex_array(&self) -> VertexArrayId {
        self.vertex_array
    }

    #[inline]
    pub fn layout(&self) -> &AttributeLayout {
        &self.layout
    }

    #[inline]
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Viewport;
    use crate::gfx::headless::{Event, HeadlessBackend};
    use crate::gfx::{Bindings, DrawOutcome, Topology};
    use crate::shader::fixtures::{TRIANGLE_FS, TRIANGLE_VS};
    use crate::shader::{ShaderProgram, ShaderStage, StageSource};

    const TRIANGLE: [f32; 9] = [-0.5, -0.5, 0.0, 0.5, -0.5, 0.0, 0.0, 0.5, 0.0];

    fn ctx() -> (GraphicsContext<HeadlessBackend>, crate::gfx::headless::EventLog) {
        let (backend, log) = HeadlessBackend::new();
        (GraphicsContext::new(backend, Viewport::full(800, 600)), log)
    }

    #[test]
    fn upload_counts_vertices_and_leaves_nothing_bound() {
        let (mut ctx, log) = ctx();
        let geo = GeometryBuffer::upload(
            &mut ctx,
            "triangle",
            bytemuck::cast_slice(&TRIANGLE),
            AttributeLayout::position3f(),
        )
        .unwrap();

        assert_eq!(geo.vertex_count(), 3);
        assert_eq!(geo.byte_len(), 36);
        assert_eq!(geo.layout().stride(), 12);
        assert_eq!(ctx.bindings(), Bindings::default());
        assert_eq!(ctx.buffer_len(geo.buffer()), Some(36));
        assert!(log.events().contains(&Event::Upload { id: geo.buffer(), len: 36 }));
    }

    #[test]
    fn misaligned_data_is_rejected_before_any_allocation() {
        let (mut ctx, log) = ctx();
        let err = GeometryBuffer::upload(&mut ctx, "bad", &[0u8; 13], AttributeLayout::position3f())
            .unwrap_err();

        assert_eq!(err, GeometryError::MisalignedVertexData { len: 13, stride: 12 });
        assert!(log.events().is_empty());
    }

    #[test]
    fn zero_vertices_is_legal_and_draws_nothing() {
        let (mut ctx, log) = ctx();
        let geo =
            GeometryBuffer::upload(&mut ctx, "empty", &[], AttributeLayout::position3f()).unwrap();
        assert_eq!(geo.vertex_count(), 0);

        let program = ctx.create_program(ShaderProgram::build(
            "triangle",
            &StageSource::embedded("vs", ShaderStage::Vertex, TRIANGLE_VS),
            &StageSource::embedded("fs", ShaderStage::Fragment, TRIANGLE_FS),
        ));
        ctx.use_program(Some(program)).unwrap();
        geo.bind_for_draw(&mut ctx).unwrap();

        let outcome = ctx
            .draw_arrays(Topology::TriangleList, 0, geo.vertex_count())
            .unwrap();
        assert_eq!(outcome, DrawOutcome::Empty);
        ctx.present();
        assert_eq!(log.presented_draws(), vec![vec![]]);
    }

    #[test]
    fn bind_for_draw_binds_only_the_vertex_array() {
        let (mut ctx, _) = ctx();
        let vertices: [[f32; 3]; 3] = [[-0.5, -0.5, 0.0], [0.5, -0.5, 0.0], [0.0, 0.5, 0.0]];
        let geo = GeometryBuffer::upload_vertices(
            &mut ctx,
            "triangle",
            &vertices,
            AttributeLayout::position3f(),
        )
        .unwrap();

        geo.bind_for_draw(&mut ctx).unwrap();
        assert_eq!(geo.vertex_count(), 3);
        assert_eq!(ctx.bindings().vertex_array, Some(geo.vertex_array()));
        assert_eq!(ctx.bindings().array_buffer, None);
    }

    #[test]
    fn release_frees_the_buffer() {
        let (mut ctx, log) = ctx();
        let geo = GeometryBuffer::upload(
            &mut ctx,
            "triangle",
            bytemuck::cast_slice(&TRIANGLE),
            AttributeLayout::position3f(),
        )
        .unwrap();
        let buffer = geo.buffer();
        let vao = geo.vertex_array();

        geo.release(&mut ctx);

        assert!(log.events().contains(&Event::ReleaseBuffer(buffer)));
        assert!(ctx.bind_vertex_array(Some(vao)).is_err());
    }
}
