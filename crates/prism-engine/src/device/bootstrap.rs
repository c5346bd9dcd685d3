use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::surface;
use super::{ContextError, Gpu, GpuInit};

/// First stage of context bring-up: a wgpu instance over the requested
/// backends.
///
/// Bring-up is three explicit steps, each with its own failure:
/// `initialize` → `create_surface` → `load_function_table`.
pub struct GpuBootstrap {
    instance: wgpu::Instance,
    init: GpuInit,
}

impl GpuBootstrap {
    /// One-time global setup. Must run before any surface is created.
    pub fn initialize(init: &GpuInit) -> Result<Self, ContextError> {
        if init.backends.is_empty() {
            return Err(ContextError::ContextCreationFailed(
                "no graphics backends requested".to_string(),
            ));
        }

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: init.backends,
            ..Default::default()
        });

        log::debug!(target: "prism::device", "instance created for backends {:?}", init.backends);

        Ok(Self {
            instance,
            init: init.clone(),
        })
    }

    /// Creates the presentable surface for `window` and selects an adapter
    /// that can drive it under the configured requirement.
    pub fn create_surface<'w>(self, window: &'w Window) -> Result<PendingSurface<'w>, ContextError> {
        let Self { instance, init } = self;
        let size = window.inner_size();

        // Surface lifetime is tied to `window` via `'w`.
        let surface = instance.create_surface(window).map_err(|e| {
            ContextError::ContextCreationFailed(format!("failed to create surface: {e}"))
        })?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: init.power_preference,
            compatible_surface: Some(&surface),
            force_fallback_adapter: init.force_fallback_adapter,
        }))
        .map_err(|e| {
            ContextError::ContextCreationFailed(format!(
                "no adapter satisfies the requirement (backends {:?}): {e}",
                init.backends
            ))
        })?;

        let caps = surface.get_capabilities(&adapter);
        let format = surface::choose_surface_format(&caps, init.prefer_srgb).ok_or_else(|| {
            ContextError::ContextCreationFailed(
                "adapter reports no supported surface format".to_string(),
            )
        })?;
        let alpha_mode = surface::choose_alpha_mode(&caps, init.alpha_mode);

        let info = adapter.get_info();
        log::info!(
            target: "prism::device",
            "adapter: {} ({:?}), surface format {:?}",
            info.name,
            info.backend,
            format
        );

        Ok(PendingSurface {
            init,
            surface,
            adapter,
            format,
            alpha_mode,
            size,
        })
    }
}

/// A surface with a chosen adapter, waiting for its device.
pub struct PendingSurface<'w> {
    init: GpuInit,
    surface: wgpu::Surface<'w>,
    adapter: wgpu::Adapter,
    format: wgpu::TextureFormat,
    alpha_mode: wgpu::CompositeAlphaMode,
    size: PhysicalSize<u32>,
}

impl<'w> PendingSurface<'w> {
    /// Requests the logical device and queue, then configures the surface to
    /// the current window size.
    pub fn load_function_table(self) -> Result<Gpu<'w>, ContextError> {
        let Self {
            init,
            surface,
            adapter,
            format,
            alpha_mode,
            size,
        } = self;

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("prism device"),
            required_features: init.required_features,
            required_limits: init.required_limits,
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        }))
        .map_err(|e| ContextError::FunctionLoadFailed(format!("device request failed: {e}")))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: init.present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };

        surface.configure(&device, &config);

        log::debug!(
            target: "prism::device",
            "surface configured at {}x{}",
            config.width,
            config.height
        );

        Ok(Gpu::from_parts(surface, device, queue, config, size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_backend_set_fails_context_creation() {
        let init = GpuInit {
            backends: wgpu::Backends::empty(),
            ..GpuInit::default()
        };
        assert!(matches!(
            GpuBootstrap::initialize(&init),
            Err(ContextError::ContextCreationFailed(_))
        ));
    }
}
