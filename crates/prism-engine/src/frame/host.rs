/// Window collaborator seen by the frame loop.
pub trait WindowHost {
    /// True once the window has been asked to close.
    fn should_close(&self) -> bool;

    /// Flags the window for closing. Observed by the next `should_close`.
    fn request_close(&mut self);

    /// Called right before the frame is handed to the compositor.
    fn pre_present(&self) {}
}
