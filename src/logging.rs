use anyhow::Result;
use flexi_logger::{DeferredNow, Logger, LoggerHandle, Record};

/// Setup console logging. `RUST_LOG` overrides the default `info` level.
///
/// Keep the returned handle alive until the program exits.
pub fn setup() -> Result<LoggerHandle> {
    let handle = Logger::try_with_env_or_str("info")?
        .format(line_format)
        .start()?;

    log::debug!("logging initialized");
    Ok(handle)
}

/// `LEVEL [time] [file:line] message`
pub fn line_format(
    w: &mut dyn std::io::Write,
    now: &mut DeferredNow,
    record: &Record,
) -> Result<(), std::io::Error> {
    write!(
        w,
        "{:<5} [{}] [{}:{}] {}",
        record.level(),
        now.now().format("%H:%M:%S%.3f"),
        record.file().unwrap_or("<unnamed>"),
        record.line().unwrap_or(0),
        record.args()
    )
}
