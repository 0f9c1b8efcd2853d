//! Environment configuration.
//!
//! Reads `YAHTZEEVALUE_LOG`, `YAHTZEEVALUE_PRELOAD` and `YAHTZEEVALUE_VERIFY`.
//! The C entry points use these; Rust callers can pass [`LoadOptions`] directly.

use tracing::level_filters::LevelFilter;

pub const LOG_ENV: &str = "YAHTZEEVALUE_LOG";
pub const PRELOAD_ENV: &str = "YAHTZEEVALUE_PRELOAD";
pub const VERIFY_ENV: &str = "YAHTZEEVALUE_VERIFY";

/// How a table artifact is brought into memory and checked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Read the values into an owned buffer instead of mapping the file.
    pub preload: bool,
    /// Run the parallel deep verification after the structural checks.
    pub verify: bool,
}

impl LoadOptions {
    pub fn from_env() -> Self {
        LoadOptions {
            preload: env_flag(PRELOAD_ENV),
            verify: env_flag(VERIFY_ENV),
        }
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name).is_ok_and(|v| parse_flag(&v))
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Max log level from `YAHTZEEVALUE_LOG` (default `warn`).
pub fn log_level() -> LevelFilter {
    std::env::var(LOG_ENV)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(LevelFilter::WARN)
}
