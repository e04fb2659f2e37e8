//! Tracing subscriber setup for pipeline runs.

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{NormalizeError, NormalizeResult};

const DEFAULT_FILTER: &str = "sheet_normalizer=info";

/// Install a global subscriber: timestamped lines on stderr and, when `log_file` is given, the
/// same events in that file (truncated on every call).
///
/// `RUST_LOG` overrides the default `sheet_normalizer=info` filter. Fails if a global subscriber
/// is already installed.
pub fn init_logging(log_file: Option<&Path>) -> NormalizeResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false);

    let file_layer = match log_file {
        Some(path) => {
            let file = File::create(path)?;
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| NormalizeError::Logging {
            message: e.to_string(),
        })
}
