//! File-backed tracing setup
//!
//! The TUI owns the terminal, so log output always goes to a file.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Resolve a level string; unknown strings fall back to INFO
pub fn parse_level(level: Option<&str>) -> tracing::Level {
    match level.map(|s| s.to_uppercase()) {
        Some(s) => match s.as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    }
}

/// Install the global subscriber writing to `<log_dir>/planner.log`.
///
/// Level priority: CLI `--log-level` > config `log_level` > INFO. `RUST_LOG`
/// directives are layered on top.
pub fn setup_logging(
    log_dir: &Path,
    cli_log_level: Option<&str>,
    config_log_level: Option<&str>,
) -> std::io::Result<PathBuf> {
    fs::create_dir_all(log_dir)?;

    let level = parse_level(cli_log_level.or(config_log_level));
    let log_path = log_dir.join("planner.log");
    let log_file = fs::File::create(&log_path)?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(log_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level(Some("debug")), tracing::Level::DEBUG);
        assert_eq!(parse_level(Some("Warning")), tracing::Level::WARN);
        assert_eq!(parse_level(Some("nonsense")), tracing::Level::INFO);
        assert_eq!(parse_level(None), tracing::Level::INFO);
    }
}
