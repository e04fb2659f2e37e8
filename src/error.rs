use std::path::PathBuf;

use thiserror::Error;

/// Convenience result type for normalization operations.
pub type NormalizeResult<T> = Result<T, NormalizeError>;

/// Error type returned by the reader, the writer, the stage transforms and configuration loading.
///
/// Per-file errors never escape the stage runner; they are recorded as
/// [`crate::execution::FailedFile`]s and reported to the observer.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// Underlying I/O error (e.g. output directory cannot be created, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The input spreadsheet could not be opened or a sheet could not be parsed.
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// The output spreadsheet could not be built or saved.
    #[error("xlsx write error: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),

    /// A batch entry does not exist under the base directory.
    #[error("file not found: {}", path.display())]
    MissingInput { path: PathBuf },

    /// Content has an unexpected shape (no numeric row, no sheets left, grid too large, ...).
    #[error("malformed content: {message}")]
    Malformed { message: String },

    /// Configuration is invalid.
    #[error("invalid configuration: {message}")]
    Config { message: String },

    /// Configuration file is not valid TOML for [`crate::config::NormalizeConfig`].
    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The global tracing subscriber could not be installed.
    #[error("logging setup failed: {message}")]
    Logging { message: String },
}

impl NormalizeError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}
