//! Log output setup.

use crate::error::{Error, Result};

/// Sends `log` records at or above `level` to stdout as
/// `[timestamp LEVEL target] message` lines.
///
/// Fails if a logger is already installed.
pub fn init(level: log::LevelFilter) -> Result<()> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stdout())
        .apply()
        .map_err(|e| Error::Config(format!("logger already installed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        // the first call may lose to another test's logger, the second never succeeds.
        // Off keeps the installed logger silent for the rest of the test binary.
        let _ = init(log::LevelFilter::Off);
        assert!(matches!(init(log::LevelFilter::Off), Err(Error::Config(_))));
    }
}
