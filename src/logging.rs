//! Native log output (CLI, simulator). Library code only emits `tracing` events.

use std::str::FromStr;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    /// One JSON object per line, for log shippers.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" | "" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format: {}", other)),
        }
    }
}

impl LogFormat {
    /// `BLOCKLEARN_LOG_FORMAT`, or `BLOCKLEARN_LOG_JSON=1` as a shorthand.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        if lookup("BLOCKLEARN_LOG_JSON").as_deref() == Some("1") {
            return LogFormat::Json;
        }
        lookup("BLOCKLEARN_LOG_FORMAT").and_then(|v| v.parse().ok()).unwrap_or_default()
    }
}

/// Install the stderr subscriber; `RUST_LOG` filters (default `info`).
/// Later calls are no-ops.
pub fn init_logging() {
    init_logging_with(LogFormat::from_lookup(|key| std::env::var(key).ok()));
}

pub fn init_logging_with(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt::Subscriber::builder().with_env_filter(env_filter).with_writer(std::io::stderr);

    let _ = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().with_target(false).try_init(),
    };
}
