//! Logging setup for the envmold binary.
//!
//! Logs go to stderr so the exported environment on stdout stays clean.

use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Initialize the global subscriber.
///
/// `debug` forces the `debug` level and adds source locations; otherwise
/// `level` (from the config file) is used, falling back to `info`. `RUST_LOG`
/// directives always apply on top.
pub fn init(debug: bool, level: Option<&str>) {
    let default_level = if debug {
        LevelFilter::DEBUG
    } else {
        level.and_then(parse_level).unwrap_or(LevelFilter::INFO)
    };

    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(debug)
        .with_line_number(debug)
        .with_filter(filter);

    // A subscriber may already be installed (e.g. when embedded); keep it.
    let _ = tracing_subscriber::registry().with(layer).try_init();
}

pub(crate) fn parse_level(s: &str) -> Option<LevelFilter> {
    match s.to_lowercase().as_str() {
        "error" => Some(LevelFilter::ERROR),
        "warn" => Some(LevelFilter::WARN),
        "info" => Some(LevelFilter::INFO),
        "debug" => Some(LevelFilter::DEBUG),
        "trace" => Some(LevelFilter::TRACE),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("error"), Some(LevelFilter::ERROR));
        assert_eq!(parse_level("WARN"), Some(LevelFilter::WARN));
        assert_eq!(parse_level("Info"), Some(LevelFilter::INFO));
        assert_eq!(parse_level("debug"), Some(LevelFilter::DEBUG));
        assert_eq!(parse_level("trace"), Some(LevelFilter::TRACE));
        assert_eq!(parse_level("invalid"), None);
        assert_eq!(parse_level(""), None);
    }
}
