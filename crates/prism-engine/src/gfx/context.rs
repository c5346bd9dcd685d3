use std::collections::{BTreeMap, HashMap};

use crate::coords::Viewport;
use crate::geometry::{AttributeLayout, VertexAttribute};
use crate::paint::Color;
use crate::shader::ShaderProgram;

use super::ids::IdAllocator;
use super::{
    BindingError, Bindings, BufferId, DrawCall, FrameCommands, PipelineDesc, PipelineId,
    PresentOutcome, ProgramId, RenderBackend, Topology, VertexArrayId, VertexBufferLayoutDesc,
};

/// What happened to a `draw_arrays` request.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DrawOutcome {
    /// Recorded for the current frame.
    Queued,
    /// Zero vertices; nothing recorded.
    Empty,
    /// The bound program is missing or failed to link.
    SkippedInvalidProgram,
    /// The program consumes `slot`, but the vertex array does not feed it with
    /// a matching enabled attribute.
    SkippedLayoutMismatch { slot: u32 },
    /// The vertex range reads past the end of a source buffer.
    SkippedOutOfRange,
}

impl DrawOutcome {
    #[inline]
    pub fn is_queued(self) -> bool {
        self == DrawOutcome::Queued
    }
}

type ResizeObserver = Box<dyn FnMut(u32, u32)>;
type PipelineKey = (Vec<VertexBufferLayoutDesc>, Topology);

struct BufferRecord {
    label: String,
    byte_len: Option<u64>,
}

#[derive(Debug, Copy, Clone)]
struct AttributePointer {
    buffer: BufferId,
    stride: u64,
    attribute: VertexAttribute,
    enabled: bool,
}

#[derive(Default)]
struct VertexArrayRecord {
    pointers: BTreeMap<u32, AttributePointer>,
}

struct ProgramRecord {
    program: ShaderProgram,
    pipelines: HashMap<PipelineKey, PipelineId>,
}

/// Explicit graphics context.
///
/// Owns the backend (surface + device), the viewport, the binding points,
/// every registered resource and the resize observers. All graphics
/// operations go through `&mut self`.
pub struct GraphicsContext<B: RenderBackend> {
    backend: B,
    viewport: Viewport,
    bindings: Bindings,

    ids: IdAllocator,
    buffers: HashMap<BufferId, BufferRecord>,
    vertex_arrays: HashMap<VertexArrayId, VertexArrayRecord>,
    programs: HashMap<ProgramId, ProgramRecord>,

    observers: Vec<ResizeObserver>,
    frame: FrameCommands,
}

impl<B: RenderBackend> GraphicsContext<B> {
    pub fn new(backend: B, viewport: Viewport) -> Self {
        Self {
            backend,
            viewport,
            bindings: Bindings::default(),
            ids: IdAllocator::default(),
            buffers: HashMap::new(),
            vertex_arrays: HashMap::new(),
            programs: HashMap::new(),
            observers: Vec::new(),
            frame: FrameCommands::new(viewport),
        }
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[inline]
    pub fn bindings(&self) -> Bindings {
        self.bindings
    }

    // ── surface ───────────────────────────────────────────────────────────

    /// Registers a resize observer. Observers run in registration order.
    pub fn on_resize(&mut self, observer: impl FnMut(u32, u32) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Applies a new surface size: full-surface viewport, surface
    /// reconfiguration (deferred while the size is zero), then observers.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::full(width, height);

        if !self.viewport.is_empty() {
            self.backend.resize_surface(width, height);
        }

        log::debug!(target: "prism::device", "viewport resized to {width}x{height}");

        for observer in &mut self.observers {
            observer(width, height);
        }
    }

    // ── buffers ───────────────────────────────────────────────────────────

    pub fn create_buffer(&mut self, label: impl Into<String>) -> BufferId {
        let id = BufferId(self.ids.next());
        self.buffers.insert(
            id,
            BufferRecord {
                label: label.into(),
                byte_len: None,
            },
        );
        id
    }

    pub fn bind_array_buffer(&mut self, buffer: Option<BufferId>) -> Result<(), BindingError> {
        if let Some(id) = buffer {
            if !self.buffers.contains_key(&id) {
                return Err(BindingError::UnknownBuffer(id));
            }
        }
        self.bindings.array_buffer = buffer;
        Ok(())
    }

    /// Copies `bytes` into the bound array buffer, replacing earlier contents.
    pub fn buffer_data(&mut self, bytes: &[u8]) -> Result<(), BindingError> {
        let id = self.bindings.array_buffer.ok_or(BindingError::NoArrayBuffer)?;
        let record = self
            .buffers
            .get_mut(&id)
            .ok_or(BindingError::UnknownBuffer(id))?;

        record.byte_len = Some(bytes.len() as u64);
        self.backend.upload_vertex_buffer(id, &record.label, bytes);
        Ok(())
    }

    /// Byte length of a buffer's contents, `None` before its first upload.
    pub fn buffer_len(&self, id: BufferId) -> Option<u64> {
        self.buffers.get(&id).and_then(|b| b.byte_len)
    }

    pub fn delete_buffer(&mut self, id: BufferId) {
        if self.buffers.remove(&id).is_none() {
            return;
        }
        if self.bindings.array_buffer == Some(id) {
            self.bindings.array_buffer = None;
        }
        for vao in self.vertex_arrays.values_mut() {
            vao.pointers.retain(|_, p| p.buffer != id);
        }
        self.backend.release_buffer(id);
    }

    // ── vertex arrays ─────────────────────────────────────────────────────

    pub fn create_vertex_array(&mut self) -> VertexArrayId {
        let id = VertexArrayId(self.ids.next());
        self.vertex_arrays.insert(id, VertexArrayRecord::default());
        id
    }

    pub fn bind_vertex_array(&mut self, vao: Option<VertexArrayId>) -> Result<(), BindingError> {
        if let Some(id) = vao {
            if !self.vertex_arrays.contains_key(&id) {
                return Err(BindingError::UnknownVertexArray(id));
            }
        }
        self.bindings.vertex_array = vao;
        Ok(())
    }

    /// Declares how `attribute.slot` reads the bound array buffer and stores
    /// that association in the bound vertex array.
    ///
    /// Unbinding the array buffer afterwards does not affect the record.
    pub fn vertex_attrib_pointer(
        &mut self,
        attribute: VertexAttribute,
        stride: u64,
    ) -> Result<(), BindingError> {
        let vao_id = self.bindings.vertex_array.ok_or(BindingError::NoVertexArray)?;
        let buffer = self.bindings.array_buffer.ok_or(BindingError::NoArrayBuffer)?;

        let valid = AttributeLayout::is_valid_stride(stride)
            && attribute.format.is_valid()
            && attribute.slot <= AttributeLayout::MAX_SLOT
            && attribute.fits(stride);
        if !valid {
            return Err(BindingError::InvalidAttribute {
                slot: attribute.slot,
                stride,
            });
        }

        let vao = self
            .vertex_arrays
            .get_mut(&vao_id)
            .ok_or(BindingError::UnknownVertexArray(vao_id))?;

        let enabled = vao
            .pointers
            .get(&attribute.slot)
            .is_some_and(|p| p.enabled);

        vao.pointers.insert(
            attribute.slot,
            AttributePointer {
                buffer,
                stride,
                attribute,
                enabled,
            },
        );
        Ok(())
    }

    pub fn enable_vertex_attrib(&mut self, slot: u32) -> Result<(), BindingError> {
        self.set_attrib_enabled(slot, true)
    }

    pub fn disable_vertex_attrib(&mut self, slot: u32) -> Result<(), BindingError> {
        self.set_attrib_enabled(slot, false)
    }

    fn set_attrib_enabled(&mut self, slot: u32, enabled: bool) -> Result<(), BindingError> {
        let vao_id = self.bindings.vertex_array.ok_or(BindingError::NoVertexArray)?;
        let vao = self
            .vertex_arrays
            .get_mut(&vao_id)
            .ok_or(BindingError::UnknownVertexArray(vao_id))?;
        let pointer = vao
            .pointers
            .get_mut(&slot)
            .ok_or(BindingError::UndeclaredAttribute(slot))?;
        pointer.enabled = enabled;
        Ok(())
    }

    pub fn delete_vertex_array(&mut self, id: VertexArrayId) {
        if self.vertex_arrays.remove(&id).is_some() && self.bindings.vertex_array == Some(id) {
            self.bindings.vertex_array = None;
        }
    }

    // ── programs ──────────────────────────────────────────────────────────

    /// Registers a program, linked or not. Unlinked programs can be bound but
    /// never reach the backend.
    pub fn create_program(&mut self, program: ShaderProgram) -> ProgramId {
        let id = ProgramId(self.ids.next());
        self.programs.insert(
            id,
            ProgramRecord {
                program,
                pipelines: HashMap::new(),
            },
        );
        id
    }

    pub fn program(&self, id: ProgramId) -> Option<&ShaderProgram> {
        self.programs.get(&id).map(|r| &r.program)
    }

    pub fn use_program(&mut self, program: Option<ProgramId>) -> Result<(), BindingError> {
        if let Some(id) = program {
            if !self.programs.contains_key(&id) {
                return Err(BindingError::UnknownProgram(id));
            }
        }
        self.bindings.program = program;
        Ok(())
    }

    /// Unregisters a program and releases every pipeline realised from it.
    pub fn delete_program(&mut self, id: ProgramId) {
        let Some(record) = self.programs.remove(&id) else {
            return;
        };
        if self.bindings.program == Some(id) {
            self.bindings.program = None;
        }
        for pipeline in record.pipelines.into_values() {
            self.backend.release_pipeline(pipeline);
        }
    }

    // ── drawing ───────────────────────────────────────────────────────────

    /// Sets the frame's clear colour. Draws recorded earlier in the frame are
    /// overwritten by the clear and dropped.
    pub fn clear(&mut self, color: Color) {
        self.frame.clear = Some(color);
        self.frame.draws.clear();
    }

    /// Records a non-indexed draw of `count` vertices from the bound vertex
    /// array with the bound program.
    ///
    /// Binding misuse is an error. A draw that cannot produce valid output
    /// (unlinked program, mismatched layout, out-of-range vertices) is skipped
    /// and reported through the outcome.
    pub fn draw_arrays(
        &mut self,
        topology: Topology,
        first: u32,
        count: u32,
    ) -> Result<DrawOutcome, BindingError> {
        let vao_id = self.bindings.vertex_array.ok_or(BindingError::NoVertexArray)?;
        let vao = self
            .vertex_arrays
            .get(&vao_id)
            .ok_or(BindingError::UnknownVertexArray(vao_id))?;

        let Some(program_id) = self.bindings.program else {
            return Ok(DrawOutcome::SkippedInvalidProgram);
        };
        let record = self
            .programs
            .get_mut(&program_id)
            .ok_or(BindingError::UnknownProgram(program_id))?;

        if count == 0 {
            return Ok(DrawOutcome::Empty);
        }

        let Some(linked) = record.program.linked() else {
            return Ok(DrawOutcome::SkippedInvalidProgram);
        };

        // One vertex-buffer slot per distinct (buffer, stride), ordered by the
        // lowest shader location it feeds.
        let mut sources: Vec<(BufferId, VertexBufferLayoutDesc)> = Vec::new();
        let last_vertex = u64::from(first) + u64::from(count) - 1;

        for &(location, format) in linked.vertex_inputs() {
            let Some(pointer) = vao.pointers.get(&location).filter(|p| p.enabled) else {
                return Ok(DrawOutcome::SkippedLayoutMismatch { slot: location });
            };
            if pointer.attribute.format != format {
                return Ok(DrawOutcome::SkippedLayoutMismatch { slot: location });
            }

            let len = self
                .buffers
                .get(&pointer.buffer)
                .and_then(|b| b.byte_len)
                .unwrap_or(0);
            let end = pointer.attribute.end().and_then(|attr_end| {
                last_vertex.checked_mul(pointer.stride)?.checked_add(attr_end)
            });
            if end.is_none_or(|end| end > len) {
                return Ok(DrawOutcome::SkippedOutOfRange);
            }

            match sources
                .iter_mut()
                .find(|(buf, layout)| *buf == pointer.buffer && layout.stride == pointer.stride)
            {
                Some((_, layout)) => layout.attributes.push(pointer.attribute),
                None => sources.push((
                    pointer.buffer,
                    VertexBufferLayoutDesc {
                        stride: pointer.stride,
                        attributes: vec![pointer.attribute],
                    },
                )),
            }
        }

        sources.sort_by_key(|(_, layout)| layout.attributes.iter().map(|a| a.slot).min());
        let (vertex_buffers, layouts): (Vec<_>, Vec<_>) = sources.into_iter().unzip();

        let key = (layouts, topology);
        let pipeline = match record.pipelines.get(&key) {
            Some(&id) => id,
            None => {
                let id = PipelineId(self.ids.next());
                let desc = PipelineDesc {
                    label: record.program.label(),
                    program: linked,
                    buffers: &key.0,
                    topology,
                };
                self.backend.create_pipeline(id, &desc);
                log::debug!(
                    target: "prism::shader",
                    "realised {id} for program `{}` ({topology:?})",
                    record.program.label()
                );
                record.pipelines.insert(key, id);
                id
            }
        };

        self.frame.draws.push(DrawCall {
            pipeline,
            vertex_buffers,
            first_vertex: first,
            vertex_count: count,
        });
        Ok(DrawOutcome::Queued)
    }

    /// Submits the recorded frame and starts a new one.
    ///
    /// A zero-area viewport skips presentation.
    pub fn present(&mut self) -> PresentOutcome {
        let mut frame = std::mem::replace(&mut self.frame, FrameCommands::new(self.viewport));
        if self.viewport.is_empty() {
            return PresentOutcome::Skipped;
        }
        frame.viewport = self.viewport;
        self.backend.present(&frame)
    }

    /// Releases every remaining pipeline, then every remaining buffer.
    ///
    /// The backend itself is released when the context is dropped.
    pub fn shutdown(&mut self) {
        let program_ids: Vec<_> = self.programs.keys().copied().collect();
        for id in program_ids {
            self.delete_program(id);
        }

        let buffer_ids: Vec<_> = self.buffers.keys().copied().collect();
        for id in buffer_ids {
            self.delete_buffer(id);
        }

        self.vertex_arrays.clear();
        self.bindings = Bindings::default();
        self.frame = FrameCommands::new(self.viewport);
        log::debug!(target: "prism::device", "graphics context resources released");
    }
}
