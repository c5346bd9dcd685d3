use thiserror::Error;

/// Fatal failures while bringing up the graphics context.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContextError {
    /// Instance, window, surface or adapter could not be created.
    #[error("graphics context creation failed: {0}")]
    ContextCreationFailed(String),

    /// The device/queue (the API entry points) could not be obtained.
    #[error("graphics function table could not be loaded: {0}")]
    FunctionLoadFailed(String),
}

/// High-level response after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Fatal error (commonly OOM); terminate gracefully.
    Fatal,
}
