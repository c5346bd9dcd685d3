use std::time::Duration;

use anyhow::{ensure, Result};

use crate::coords::Viewport;
use crate::geometry::GeometryBuffer;
use crate::gfx::{
    DrawOutcome, GraphicsContext, PresentOutcome, ProgramId, RenderBackend, Topology,
};
use crate::input::KeyboardInput;
use crate::time::FrameClock;

use super::{FrameLoopConfig, WindowHost};

/// Loop state machine.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopState {
    Running,
    Terminated,
}

/// Why the loop left `Running`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Termination {
    /// The close key or the window system asked to close.
    CloseRequested,
    /// The surface could not be presented any more.
    PresentFailed,
}

/// Observable frame state, updated once per iteration.
#[derive(Debug, Clone)]
pub struct FrameState {
    pub state: LoopState,
    pub viewport: Viewport,
    /// Frames rendered so far.
    pub frames: u64,
    pub last_dt: Duration,
    pub termination: Option<Termination>,
}

/// Handles produced by one-time setup and drawn every frame.
#[derive(Debug)]
pub struct RenderSetup {
    pub program: ProgramId,
    pub geometry: GeometryBuffer,
}

/// Per-frame controller: poll close, clear, bind, draw once, present.
#[derive(Debug)]
pub struct FrameLoop {
    config: FrameLoopConfig,
    clock: FrameClock,
    frame: FrameState,
    warned_skip: bool,
}

impl FrameLoop {
    pub fn new(config: FrameLoopConfig) -> Self {
        Self {
            config,
            clock: FrameClock::new(),
            frame: FrameState {
                state: LoopState::Running,
                viewport: Viewport::default(),
                frames: 0,
                last_dt: Duration::ZERO,
                termination: None,
            },
            warned_skip: false,
        }
    }

    #[inline]
    pub fn config(&self) -> &FrameLoopConfig {
        &self.config
    }

    #[inline]
    pub fn state(&self) -> &FrameState {
        &self.frame
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.frame.state == LoopState::Running
    }

    /// Validates setup handles before the first iteration.
    ///
    /// Only fails for an unlinked program when `require_linked_program` is set.
    pub fn check_setup<B: RenderBackend>(
        &self,
        setup: &RenderSetup,
        gfx: &GraphicsContext<B>,
    ) -> Result<()> {
        let program = gfx
            .program(setup.program)
            .ok_or_else(|| anyhow::anyhow!("{} is not registered", setup.program))?;

        if !program.is_linked() {
            ensure!(
                !self.config.require_linked_program,
                "program `{}` is not linked and a linked program is required",
                program.label()
            );
            log::warn!(
                target: "prism::frame",
                "program `{}` is not linked; frames will show the background only",
                program.label()
            );
        }
        Ok(())
    }

    /// Runs one iteration.
    ///
    /// A close request seen here terminates the loop, but this iteration still
    /// renders; the next call returns `Terminated` without rendering.
    pub fn iterate<B, H, I>(
        &mut self,
        gfx: &mut GraphicsContext<B>,
        host: &mut H,
        input: &I,
        setup: &RenderSetup,
    ) -> LoopState
    where
        B: RenderBackend,
        H: WindowHost,
        I: KeyboardInput,
    {
        if self.frame.state == LoopState::Terminated {
            return LoopState::Terminated;
        }

        if input.is_key_pressed(self.config.close_key) && !host.should_close() {
            log::info!(target: "prism::frame", "{} pressed; closing", self.config.close_key);
            host.request_close();
        }
        if host.should_close() {
            self.frame.state = LoopState::Terminated;
            self.frame.termination = Some(Termination::CloseRequested);
        }

        let time = self.clock.tick();
        self.frame.last_dt = Duration::from_secs_f32(time.dt);
        self.frame.viewport = gfx.viewport();

        gfx.clear(self.config.clear_color);
        self.draw(gfx, setup);

        host.pre_present();
        match gfx.present() {
            PresentOutcome::Presented => self.frame.frames += 1,
            PresentOutcome::Skipped => {}
            PresentOutcome::Fatal => {
                log::error!(target: "prism::frame", "presentation failed; terminating");
                self.frame.state = LoopState::Terminated;
                self.frame.termination = Some(Termination::PresentFailed);
            }
        }

        self.frame.state
    }

    fn draw<B: RenderBackend>(&mut self, gfx: &mut GraphicsContext<B>, setup: &RenderSetup) {
        match bind_and_draw(gfx, setup, self.config.topology) {
            Ok(DrawOutcome::Queued | DrawOutcome::Empty) => {}
            Ok(skipped) => self.warn_once(format_args!("draw skipped: {skipped:?}")),
            Err(e) => self.warn_once(format_args!("draw failed: {e:#}")),
        }
    }

    fn warn_once(&mut self, msg: std::fmt::Arguments<'_>) {
        if !self.warned_skip {
            log::warn!(target: "prism::frame", "{msg} (further occurrences are not reported)");
            self.warned_skip = true;
        }
    }

    /// Releases setup handles in reverse acquisition order: geometry, then
    /// program, then whatever the context still owns.
    pub fn shutdown<B: RenderBackend>(self, setup: RenderSetup, gfx: &mut GraphicsContext<B>) {
        let RenderSetup { program, geometry } = setup;
        geometry.release(gfx);
        gfx.delete_program(program);
        gfx.shutdown();

        log::info!(
            target: "prism::frame",
            "frame loop finished after {} frames",
            self.frame.frames
        );
    }
}

fn bind_and_draw<B: RenderBackend>(
    gfx: &mut GraphicsContext<B>,
    setup: &RenderSetup,
    topology: Topology,
) -> Result<DrawOutcome> {
    gfx.use_program(Some(setup.program))?;
    setup.geometry.bind_for_draw(gfx)?;
    Ok(gfx.draw_arrays(topology, 0, setup.geometry.vertex_count())?)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::geometry::AttributeLayout;
    use crate::gfx::headless::{Event, EventLog, HeadlessBackend};
    use crate::input::Key;
    use crate::paint::Color;
    use crate::shader::fixtures::{BROKEN_FS, TRIANGLE_FS, TRIANGLE_VS};
    use crate::shader::{ShaderProgram, ShaderStage, StageSource};

    #[derive(Default)]
    struct FakeHost {
        close: bool,
        pre_presents: Cell<u32>,
    }

    impl WindowHost for FakeHost {
        fn should_close(&self) -> bool {
            self.close
        }

        fn request_close(&mut self) {
            self.close = true;
        }

        fn pre_present(&self) {
            self.pre_presents.set(self.pre_presents.get() + 1);
        }
    }

    #[derive(Default)]
    struct FakeKeys(Vec<Key>);

    impl KeyboardInput for FakeKeys {
        fn is_key_pressed(&self, key: Key) -> bool {
            self.0.contains(&key)
        }
    }

    const TRIANGLE: [f32; 9] = [-0.5, -0.5, 0.0, 0.5, -0.5, 0.0, 0.0, 0.5, 0.0];

    fn setup(fs: &str) -> (GraphicsContext<HeadlessBackend>, EventLog, RenderSetup) {
        setup_on(HeadlessBackend::new(), fs)
    }

    fn setup_on(
        (backend, log): (HeadlessBackend, EventLog),
        fs: &str,
    ) -> (GraphicsContext<HeadlessBackend>, EventLog, RenderSetup) {
        let mut gfx = GraphicsContext::new(backend, Viewport::full(800, 600));

        let program = gfx.create_program(ShaderProgram::build(
            "triangle",
            &StageSource::embedded("vs", ShaderStage::Vertex, TRIANGLE_VS),
            &StageSource::embedded("fs", ShaderStage::Fragment, fs),
        ));
        let geometry = GeometryBuffer::upload(
            &mut gfx,
            "triangle",
            bytemuck::cast_slice(&TRIANGLE),
            AttributeLayout::position3f(),
        )
        .unwrap();

        (gfx, log, RenderSetup { program, geometry })
    }

    #[test]
    fn draws_one_triangle_per_frame_over_background() {
        let (mut gfx, log, setup) = setup(TRIANGLE_FS);
        let mut lp = FrameLoop::new(FrameLoopConfig::default());
        let mut host = FakeHost::default();
        let keys = FakeKeys::default();

        for _ in 0..3 {
            assert_eq!(lp.iterate(&mut gfx, &mut host, &keys, &setup), LoopState::Running);
        }

        let frames = log.presented_draws();
        assert_eq!(frames.len(), 3);
        assert!(frames.iter().all(|draws| draws.len() == 1 && draws[0].vertex_count == 3));
        assert!(log.events().iter().all(|e| match e {
            Event::Present { clear, .. } => *clear == Some(Color::new(0.2, 0.3, 0.3, 1.0)),
            _ => true,
        }));
        assert_eq!(host.pre_presents.get(), 3);
        assert_eq!(lp.state().frames, 3);
    }

    #[test]
    fn close_request_renders_at_most_one_more_frame() {
        let (mut gfx, log, setup) = setup(TRIANGLE_FS);
        let mut lp = FrameLoop::new(FrameLoopConfig::default());
        let mut host = FakeHost::default();
        let keys = FakeKeys::default();

        lp.iterate(&mut gfx, &mut host, &keys, &setup);
        host.close = true;

        assert_eq!(lp.iterate(&mut gfx, &mut host, &keys, &setup), LoopState::Terminated);
        assert_eq!(lp.iterate(&mut gfx, &mut host, &keys, &setup), LoopState::Terminated);
        assert_eq!(log.presents(), 2);
        assert_eq!(lp.state().termination, Some(Termination::CloseRequested));
    }

    #[test]
    fn escape_requests_close() {
        let (mut gfx, log, setup) = setup(TRIANGLE_FS);
        let mut lp = FrameLoop::new(FrameLoopConfig::default());
        let mut host = FakeHost::default();
        let keys = FakeKeys(vec![Key::Escape]);

        assert_eq!(lp.iterate(&mut gfx, &mut host, &keys, &setup), LoopState::Terminated);
        assert!(host.close);
        assert_eq!(lp.iterate(&mut gfx, &mut host, &keys, &setup), LoopState::Terminated);
        assert_eq!(log.presents(), 1);
    }

    #[test]
    fn broken_shader_keeps_loop_running_with_background_only() {
        let (mut gfx, log, setup) = setup(BROKEN_FS);
        let lp_check = FrameLoop::new(FrameLoopConfig::default());
        assert!(lp_check.check_setup(&setup, &gfx).is_ok());

        let mut lp = FrameLoop::new(FrameLoopConfig::default());
        let mut host = FakeHost::default();
        let keys = FakeKeys::default();

        for _ in 0..2 {
            assert_eq!(lp.iterate(&mut gfx, &mut host, &keys, &setup), LoopState::Running);
        }
        assert_eq!(log.presented_draws(), vec![vec![], vec![]]);
    }

    #[test]
    fn fail_fast_policy_rejects_unlinked_program() {
        let (gfx, _, setup) = setup(BROKEN_FS);
        let lp = FrameLoop::new(FrameLoopConfig {
            require_linked_program: true,
            ..FrameLoopConfig::default()
        });
        assert!(lp.check_setup(&setup, &gfx).is_err());
    }

    #[test]
    fn fatal_present_terminates() {
        let (mut backend, log) = HeadlessBackend::new();
        backend.present_outcome = PresentOutcome::Fatal;
        let (mut gfx, _, setup) = setup_on((backend, log), TRIANGLE_FS);

        let mut lp = FrameLoop::new(FrameLoopConfig::default());
        let mut host = FakeHost::default();
        let keys = FakeKeys::default();

        assert_eq!(lp.iterate(&mut gfx, &mut host, &keys, &setup), LoopState::Terminated);
        assert!(!lp.is_running());
        assert_eq!(lp.state().frames, 0);
        assert_eq!(lp.state().termination, Some(Termination::PresentFailed));
    }

    #[test]
    fn shutdown_releases_geometry_then_program_then_context() {
        let (mut gfx, log, setup) = setup(TRIANGLE_FS);
        let mut lp = FrameLoop::new(FrameLoopConfig::default());
        let mut host = FakeHost::default();
        lp.iterate(&mut gfx, &mut host, &FakeKeys::default(), &setup);

        lp.shutdown(setup, &mut gfx);
        drop(gfx);

        let events = log.events();
        let buffer = events.iter().position(|e| matches!(e, Event::ReleaseBuffer(_))).unwrap();
        let pipeline = events.iter().position(|e| matches!(e, Event::ReleasePipeline(_))).unwrap();
        let dropped = events.iter().position(|e| matches!(e, Event::Dropped)).unwrap();
        assert!(buffer < pipeline && pipeline < dropped);
    }
}
