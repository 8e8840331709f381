//! Logger initialization.

use log::LevelFilter;
use std::io::Write;

/// Initializes `env_logger`.
///
/// `RUST_LOG` is read first; `level` then overrides it for this crate's own
/// targets so `--log-level` wins for our messages while dependency filters
/// from the environment still apply.
pub fn init_logger(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_module("ip_tracker", level);
    builder.filter_module("iptrack", level);
    builder.filter_module("hyper", LevelFilter::Warn);
    builder.format(|buf, record| {
        writeln!(
            buf,
            "[{}] {:<5} {}: {}",
            chrono::Utc::now().format("%H:%M:%S"),
            record.level(),
            record.target(),
            record.args()
        )
    });
    // try_init so repeated calls (tests) don't panic
    builder.try_init()
}

/// Parse a `--log-level` value.
pub fn parse_level(s: &str) -> Result<LevelFilter, String> {
    s.parse::<LevelFilter>()
        .map_err(|_| format!("Unknown log level '{}'. Use off, error, warn, info, debug or trace.", s))
}
