//! Crate-wide error type
//!
//! Every failure a user can see ends up as one of these variants and, in the
//! dashboard, as the single banner message.

use crate::ai::Operation;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The user triggered an operation without the input it needs.
    #[error("{0}")]
    InputMissing(&'static str),

    /// The completion call failed or returned something unusable.
    #[error("{} Please check the logs for details.", .0.failure_message())]
    OperationFailed(Operation),

    /// A required configuration value is absent.
    #[error("{0} environment variable not set")]
    ConfigMissing(&'static str),

    #[error("Nothing to export in the current view.")]
    ExportEmpty,

    #[error("Another operation is already running.")]
    Busy,

    /// A result arrived for an operation that is not the one in flight.
    #[error("{0} is not running.")]
    NotRunning(Operation),

    #[error("Unsupported file type: {0}")]
    UnsupportedFile(String),

    #[error("invalid suggestions response: {0}")]
    Parse(#[from] serde_json::Error),

    /// The browser sent a body the server could not decode.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("completion service error: {0}")]
    Service(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
