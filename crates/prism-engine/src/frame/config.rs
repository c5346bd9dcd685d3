use crate::gfx::Topology;
use crate::input::Key;
use crate::paint::Color;

/// Frame loop configuration.
#[derive(Debug, Clone)]
pub struct FrameLoopConfig {
    /// Background colour the target is cleared to every frame.
    pub clear_color: Color,

    /// Held key that requests the window to close.
    pub close_key: Key,

    pub topology: Topology,

    /// Refuse to start the loop when the program failed to link.
    ///
    /// Off by default: an unlinked program leaves the loop running with draws
    /// skipped.
    pub require_linked_program: bool,
}

impl Default for FrameLoopConfig {
    fn default() -> Self {
        Self {
            clear_color: Color::new(0.2, 0.3, 0.3, 1.0),
            close_key: Key::Escape,
            topology: Topology::TriangleList,
            require_linked_program: false,
        }
    }
}
