use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{FmtSubscriber, filter::EnvFilter, util::SubscriberInitExt};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        };
        f.write_str(level)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Plaintext,
    Json,
}

/// Initialize logging.
///
/// Logs go to stderr so the report on stdout stays clean.
///
/// Returns a drop guard responsible for flushing any remaining logs when the program terminates.
/// The guard must be assigned to a binding that is not _, as _ will result in the guard being
/// dropped immediately.
pub fn init(log_level: LogLevel, log_format: LogFormat) -> WorkerGuard {
    let filter = build_tracing_filter(log_level);

    let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stderr());

    let builder = FmtSubscriber::builder()
        .with_target(false)
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(enable_ansi())
        .with_thread_ids(false);

    match log_format {
        LogFormat::Plaintext => {
            let subscriber = builder.finish();
            subscriber.init();
        }
        LogFormat::Json => {
            let subscriber = builder.json().finish();
            subscriber.init();
        }
    };

    guard
}

/// Check if both stdout and stderr are proper terminal (tty),
/// so that we know whether or not to enable colored output,
/// using ANSI escape codes. If either is not, eg. because
/// stdout is redirected to a file, we don't enable colored output.
pub fn enable_ansi() -> bool {
    use std::io::IsTerminal;
    std::io::stdout().is_terminal() && std::io::stderr().is_terminal()
}

/// Crates targeted by the default log level.
const TARGET_CRATES: &[&str] =
    &["ethprobe", "ethprobe_cli", "ethprobe_execution", "ethprobe_harness", "ethprobe_types"];

/// Build a tracing directive setting the log level for the
/// crates to the given `log_level`.
pub fn default_directive(log_level: LogLevel) -> String {
    use itertools::Itertools;

    TARGET_CRATES.iter().map(|&c| format!("{c}={log_level}")).join(",")
}

/// Everything outside our crates stays at `warn`.
fn build_tracing_filter(log_level: LogLevel) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .parse_lossy(default_directive(log_level))
}
