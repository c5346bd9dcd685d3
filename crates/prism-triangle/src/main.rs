mod triangle;

use anyhow::Result;

use prism_engine::device::GpuInit;
use prism_engine::logging::{init_logging, LoggingConfig};
use prism_engine::window::{Runtime, RuntimeConfig};

use triangle::TriangleApp;

/// `0` after a normal close, `-1` for any failure that ended the run.
fn exit_code(result: &Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(_) => -1,
    }
}

fn main() {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        title: "prism - hello triangle".to_string(),
        ..RuntimeConfig::default()
    };

    let result = Runtime::run(config, GpuInit::default(), TriangleApp);
    if let Err(e) = &result {
        log::error!("{e:#}");
    }
    std::process::exit(exit_code(&result));
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_engine::device::ContextError;

    #[test]
    fn normal_close_exits_zero() {
        assert_eq!(exit_code(&Ok(())), 0);
    }

    #[test]
    fn context_failure_exits_minus_one() {
        let err = ContextError::ContextCreationFailed("no adapter".to_string());
        assert_eq!(exit_code(&Err(err.into())), -1);

        let err = ContextError::FunctionLoadFailed("device request failed".to_string());
        assert_eq!(exit_code(&Err(err.into())), -1);
    }
}
