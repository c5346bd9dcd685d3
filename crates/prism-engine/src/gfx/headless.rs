//! Recording backend for tests.

use std::cell::RefCell;
use std::rc::Rc;

use super::{
    BufferId, DrawCall, FrameCommands, PipelineDesc, PipelineId, PresentOutcome, RenderBackend,
    Topology,
};
use crate::paint::Color;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Event {
    Upload { id: BufferId, len: usize },
    ReleaseBuffer(BufferId),
    CreatePipeline { id: PipelineId, buffers: usize, topology: Topology },
    ReleasePipeline(PipelineId),
    Resize(u32, u32),
    Present { clear: Option<Color>, draws: Vec<DrawCall> },
    Dropped,
}

/// Shared view of everything a [`HeadlessBackend`] was asked to do.
#[derive(Debug, Clone, Default)]
pub(crate) struct EventLog(Rc<RefCell<Vec<Event>>>);

impl EventLog {
    fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    pub(crate) fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    /// Draw lists of every presented frame, in order.
    pub(crate) fn presented_draws(&self) -> Vec<Vec<DrawCall>> {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Present { draws, .. } => Some(draws.clone()),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn presents(&self) -> usize {
        self.presented_draws().len()
    }
}

pub(crate) struct HeadlessBackend {
    log: EventLog,
    pub(crate) present_outcome: PresentOutcome,
}

impl HeadlessBackend {
    pub(crate) fn new() -> (Self, EventLog) {
        let log = EventLog::default();
        let backend = Self {
            log: log.clone(),
            present_outcome: PresentOutcome::Presented,
        };
        (backend, log)
    }
}

impl RenderBackend for HeadlessBackend {
    fn upload_vertex_buffer(&mut self, id: BufferId, _label: &str, bytes: &[u8]) {
        self.log.push(Event::Upload { id, len: bytes.len() });
    }

    fn release_buffer(&mut self, id: BufferId) {
        self.log.push(Event::ReleaseBuffer(id));
    }

    fn create_pipeline(&mut self, id: PipelineId, desc: &PipelineDesc<'_>) {
        self.log.push(Event::CreatePipeline {
            id,
            buffers: desc.buffers.len(),
            topology: desc.topology,
        });
    }

    fn release_pipeline(&mut self, id: PipelineId) {
        self.log.push(Event::ReleasePipeline(id));
    }

    fn resize_surface(&mut self, width: u32, height: u32) {
        self.log.push(Event::Resize(width, height));
    }

    fn present(&mut self, frame: &FrameCommands) -> PresentOutcome {
        if self.present_outcome == PresentOutcome::Presented {
            self.log.push(Event::Present {
                clear: frame.clear,
                draws: frame.draws.clone(),
            });
        }
        self.present_outcome
    }
}

impl Drop for HeadlessBackend {
    fn drop(&mut self) {
        self.log.push(Event::Dropped);
    }
}
