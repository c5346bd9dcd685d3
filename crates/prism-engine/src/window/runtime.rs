use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::coords::Viewport;
use crate::core::App;
use crate::device::{ContextError, Gpu, GpuBootstrap, GpuInit, PendingSurface};
use crate::frame::{FrameLoop, LoopState, RenderSetup, Termination, WindowHost};
use crate::gfx::GraphicsContext;
use crate::input::platform::translate_window_event;
use crate::input::InputState;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "prism".to_string(),
            initial_size: LogicalSize::new(800.0, 600.0),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Brings up the context, runs setup, then drives the frame loop until the
    /// window closes.
    ///
    /// Returns an error for any failure before the first frame; the loop itself
    /// never fails.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: 'static + App,
    {
        let bootstrap = GpuBootstrap::initialize(&gpu_init)?;

        let event_loop = EventLoop::new().map_err(|e| {
            ContextError::ContextCreationFailed(format!("failed to create event loop: {e}"))
        })?;
        let mut state = AppState::new(config, bootstrap, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.fatal.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gfx: GraphicsContext<Gpu<'this>>,
}

/// Window-side collaborator handed to the frame loop.
struct WinitHost<'a> {
    window: &'a Window,
    close_requested: &'a mut bool,
}

impl WindowHost for WinitHost<'_> {
    fn should_close(&self) -> bool {
        *self.close_requested
    }

    fn request_close(&mut self) {
        *self.close_requested = true;
    }

    fn pre_present(&self) {
        self.window.pre_present_notify();
    }
}

struct AppState<A>
where
    A: App + 'static,
{
    config: RuntimeConfig,
    bootstrap: Option<GpuBootstrap>,
    app: A,

    entry: Option<WindowEntry>,
    setup: Option<RenderSetup>,
    frame_loop: Option<FrameLoop>,

    input: InputState,
    close_requested: bool,
    fatal: Option<anyhow::Error>,
}

impl<A> AppState<A>
where
    A: App + 'static,
{
    fn new(config: RuntimeConfig, bootstrap: GpuBootstrap, app: A) -> Self {
        Self {
            config,
            bootstrap: Some(bootstrap),
            app,
            entry: None,
            setup: None,
            frame_loop: None,
            input: InputState::default(),
            close_requested: false,
            fatal: None,
        }
    }

    /// Window, surface, device, then application setup.
    fn start(&mut self, event_loop: &ActiveEventLoop, bootstrap: GpuBootstrap) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop.create_window(attrs).map_err(|e| {
            ContextError::ContextCreationFailed(format!("failed to create window: {e}"))
        })?;

        let mut entry = WindowEntryTryBuilder {
            window,
            gfx_builder: |w| {
                let size = w.inner_size();
                bootstrap
                    .create_surface(w)
                    .and_then(PendingSurface::load_function_table)
                    .map(|gpu| GraphicsContext::new(gpu, Viewport::full(size.width, size.height)))
            },
        }
        .try_build()?;

        let frame_loop = FrameLoop::new(self.app.frame_config());
        let app = &mut self.app;
        let setup = entry.with_gfx_mut(|gfx| -> Result<RenderSetup> {
            let setup = app.setup(gfx).context("application setup failed")?;
            frame_loop.check_setup(&setup, gfx)?;
            Ok(setup)
        })?;

        entry.with_window(|w| w.request_redraw());

        self.entry = Some(entry);
        self.setup = Some(setup);
        self.frame_loop = Some(frame_loop);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        self.release();
        self.fatal = Some(err);
        event_loop.exit();
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        if let Some(entry) = self.entry.as_mut() {
            entry.with_gfx_mut(|gfx| gfx.resize(size.width, size.height));
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(entry), Some(setup), Some(frame_loop)) = (
            self.entry.as_mut(),
            self.setup.as_ref(),
            self.frame_loop.as_mut(),
        ) else {
            return;
        };

        let input = &self.input;
        let close_requested = &mut self.close_requested;

        let state = entry.with_mut(|fields| {
            let mut host = WinitHost {
                window: fields.window,
                close_requested: &mut *close_requested,
            };
            frame_loop.iterate(fields.gfx, &mut host, input, setup)
        });

        if state != LoopState::Terminated {
            return;
        }
        if frame_loop.state().termination == Some(Termination::PresentFailed) {
            self.fail(event_loop, anyhow::anyhow!("surface presentation failed"));
        } else {
            self.release();
            event_loop.exit();
        }
    }

    /// Shutdown in reverse acquisition order: setup handles, then the
    /// graphics context, then the window.
    fn release(&mut self) {
        let (entry, setup, frame_loop) = (self.entry.take(), self.setup.take(), self.frame_loop.take());
        let Some(mut entry) = entry else {
            return;
        };

        if let (Some(setup), Some(frame_loop)) = (setup, frame_loop) {
            entry.with_gfx_mut(|gfx| frame_loop.shutdown(setup, gfx));
        }

        drop(entry);
        log::info!(target: "prism::device", "graphics context and window destroyed");
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: App + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            return;
        }
        let Some(bootstrap) = self.bootstrap.take() else {
            return;
        };

        if let Err(e) = self.start(event_loop, bootstrap) {
            self.fail(event_loop, e);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(entry) = self.entry.as_ref() else {
            return;
        };

        // Non-blocking: pending events are drained, then the next frame runs.
        event_loop.set_control_flow(ControlFlow::Poll);
        entry.with_window(|w| w.request_redraw());
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(ev) = translate_window_event(&event) {
            self.input.apply_event(&ev);
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!(target: "prism::frame", "close requested by the window system");
                self.close_requested = true;
            }

            WindowEvent::Resized(new_size) => self.resize(new_size),

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(size) = self.entry.as_ref().map(|e| e.with_window(|w| w.inner_size())) {
                    self.resize(size);
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.release();
    }
}
