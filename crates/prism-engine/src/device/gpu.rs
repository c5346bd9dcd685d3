use std::collections::HashMap;

use wgpu::util::DeviceExt;
use wgpu::SurfaceError;
use winit::dpi::PhysicalSize;

use crate::coords::Viewport;
use crate::gfx::{
    BufferId, FrameCommands, PipelineDesc, PipelineId, PresentOutcome, RenderBackend,
};

use super::frame::GpuFrame;
use super::{surface, SurfaceErrorAction};

/// Owns the surface, device and queue, plus every GPU object created
/// on behalf of a graphics context.
pub struct Gpu<'w> {
    /// Surface bound to the window; the window must outlive the `Gpu`.
    surface: wgpu::Surface<'w>,

    device: wgpu::Device,
    queue: wgpu::Queue,

    /// Active surface configuration.
    config: wgpu::SurfaceConfiguration,

    /// Current drawable size in physical pixels.
    size: PhysicalSize<u32>,

    buffers: HashMap<BufferId, wgpu::Buffer>,
    pipelines: HashMap<PipelineId, wgpu::RenderPipeline>,
}

impl<'w> Gpu<'w> {
    pub(super) fn from_parts(
        surface: wgpu::Surface<'w>,
        device: wgpu::Device,
        queue: wgpu::Queue,
        config: wgpu::SurfaceConfiguration,
        size: PhysicalSize<u32>,
    ) -> Self {
        Self {
            surface,
            device,
            queue,
            config,
            size,
            buffers: HashMap::new(),
            pipelines: HashMap::new(),
        }
    }

    /// Reconfigures the surface after a resize.
    ///
    /// wgpu rejects 0x0 surfaces; in that case only the tracked size changes.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        surface::apply_resize(
            &self.surface,
            &self.device,
            &mut self.config,
            &mut self.size,
            new_size,
        );
    }

    fn begin_frame(&self) -> Result<GpuFrame, SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("prism frame encoder"),
            });

        Ok(GpuFrame {
            surface_texture,
            view,
            encoder,
        })
    }

    /// Submits the recorded commands; presentation happens on `present()`.
    fn submit(&self, frame: GpuFrame) {
        self.queue.submit(std::iter::once(frame.encoder.finish()));
        drop(frame.view);
        frame.surface_texture.present();
    }

    fn handle_surface_error(&mut self, err: SurfaceError) -> SurfaceErrorAction {
        surface::map_surface_error(&self.surface, &self.device, &self.config, self.size, err)
    }
}

impl RenderBackend for Gpu<'_> {
    fn upload_vertex_buffer(&mut self, id: BufferId, label: &str, bytes: &[u8]) {
        if bytes.is_empty() {
            self.buffers.remove(&id);
            return;
        }

        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytes,
                usage: wgpu::BufferUsages::VERTEX,
            });
        self.buffers.insert(id, buffer);
    }

    fn release_buffer(&mut self, id: BufferId) {
        if let Some(buffer) = self.buffers.remove(&id) {
            buffer.destroy();
        }
    }

    fn create_pipeline(&mut self, id: PipelineId, desc: &PipelineDesc<'_>) {
        let vertex = desc.program.vertex();
        let fragment = desc.program.fragment();

        // Stage modules only live long enough to build the pipeline.
        let vs = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(vertex.label()),
            source: wgpu::ShaderSource::Wgsl(vertex.source().into()),
        });
        let fs = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(fragment.label()),
            source: wgpu::ShaderSource::Wgsl(fragment.source().into()),
        });

        let attributes: Vec<Vec<wgpu::VertexAttribute>> = desc
            .buffers
            .iter()
            .map(|b| {
                b.attributes
                    .iter()
                    .filter_map(|a| {
                        Some(wgpu::VertexAttribute {
                            format: a.format.to_wgpu()?,
                            offset: a.offset,
                            shader_location: a.slot,
                        })
                    })
                    .collect()
            })
            .collect();

        let buffers: Vec<wgpu::VertexBufferLayout<'_>> = desc
            .buffers
            .iter()
            .zip(&attributes)
            .map(|(b, attrs)| wgpu::VertexBufferLayout {
                array_stride: b.stride,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: attrs,
            })
            .collect();

        let pipeline_layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(desc.label),
                bind_group_layouts: &[],
                immediate_size: 0,
            });

        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(desc.label),
                layout: Some(&pipeline_layout),

                vertex: wgpu::VertexState {
                    module: &vs,
                    entry_point: Some(vertex.entry_point()),
                    compilation_options: Default::default(),
                    buffers: &buffers,
                },

                fragment: Some(wgpu::FragmentState {
                    module: &fs,
                    entry_point: Some(fragment.entry_point()),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.config.format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),

                primitive: wgpu::PrimitiveState {
                    topology: desc.topology.to_wgpu(),
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },

                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            });

        self.pipelines.insert(id, pipeline);
    }

    fn release_pipeline(&mut self, id: PipelineId) {
        self.pipelines.remove(&id);
    }

    fn resize_surface(&mut self, width: u32, height: u32) {
        self.resize(PhysicalSize::new(width, height));
    }

    fn present(&mut self, frame: &FrameCommands) -> PresentOutcome {
        if self.size.width == 0 || self.size.height == 0 {
            return PresentOutcome::Skipped;
        }

        let mut gpu_frame = match self.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                return match self.handle_surface_error(err.clone()) {
                    SurfaceErrorAction::Fatal => {
                        log::error!(target: "prism::device", "surface lost for good: {err}");
                        PresentOutcome::Fatal
                    }
                    action => {
                        log::debug!(target: "prism::device", "frame skipped ({action:?}): {err}");
                        PresentOutcome::Skipped
                    }
                };
            }
        };

        // Render pass borrows the encoder; dropped before submit() takes the frame.
        {
            let load = match frame.clear {
                Some(c) => wgpu::LoadOp::Clear(c.to_wgpu()),
                None => wgpu::LoadOp::Load,
            };

            let mut rpass = gpu_frame
                .encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("prism frame pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &gpu_frame.view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                    multiview_mask: None,
                });

            if let Some([x, y, w, h]) =
                viewport_rect(frame.viewport, self.config.width, self.config.height)
            {
                rpass.set_viewport(x, y, w, h, 0.0, 1.0);

                for draw in &frame.draws {
                    let Some(pipeline) = self.pipelines.get(&draw.pipeline) else {
                        continue;
                    };
                    let sources: Option<Vec<&wgpu::Buffer>> = draw
                        .vertex_buffers
                        .iter()
                        .map(|id| self.buffers.get(id))
                        .collect();
                    let Some(sources) = sources else { continue };

                    rpass.set_pipeline(pipeline);
                    for (slot, buffer) in sources.into_iter().enumerate() {
                        rpass.set_vertex_buffer(slot as u32, buffer.slice(..));
                    }
                    rpass.draw(draw.first_vertex..draw.first_vertex + draw.vertex_count, 0..1);
                }
            }
        }

        self.submit(gpu_frame);
        PresentOutcome::Presented
    }
}

/// Converts a bottom-left-origin viewport into a top-left wgpu viewport
/// `[x, y, w, h]`, clamped to the `width` x `height` target.
fn viewport_rect(vp: Viewport, width: u32, height: u32) -> Option<[f32; 4]> {
    let x = vp.x.min(width);
    let y = vp.y.min(height);
    let w = vp.width.min(width - x);
    let h = vp.height.min(height - y);
    if w == 0 || h == 0 {
        return None;
    }

    let top = height - (y + h);
    Some([x as f32, top as f32, w as f32, h as f32])
}
