//! Error types for the registration tool.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for batch operations
pub type Result<T> = std::result::Result<T, BatchError>;

/// Errors that abort a run or fail one output artifact.
///
/// `FileOpen`, `HeaderMismatch`, `Parse` and `Csv` are structural: the input
/// cannot be trusted and the whole run stops before anything is registered.
/// The export variants only ever fail the artifact they name.
#[derive(Error, Debug)]
pub enum BatchError {
    /// The input file is missing or unreadable
    #[error("unable to open file {}: {source}", path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// First line of the input is not the expected column header
    #[error("wrong column names, must be '{expected}' but found '{found}'")]
    HeaderMismatch { expected: String, found: String },

    /// A data row does not have exactly three fields.
    ///
    /// `line_number` is 1-based within the input file, or 0 for a line
    /// parsed on its own.
    #[error("line does not consist of 3 columns ({line})")]
    Parse { line_number: usize, line: String },

    /// Reading the delimited input failed (e.g. invalid UTF-8)
    #[error("unable to read input: {0}")]
    Csv(#[from] csv::Error),

    /// The HTTP client for the remote servers could not be built
    #[error("unable to set up HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// Writing an output artifact failed
    #[error("unable to write {}: {source}", path.display())]
    ExportWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Serializing the token export failed
    #[error("unable to encode {}: {source}", path.display())]
    ExportEncode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The debug log file could not be opened
    #[error("unable to open log file {}: {source}", path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BatchError {
    /// Returns `true` for errors caused by the input file itself.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            BatchError::FileOpen { .. }
                | BatchError::HeaderMismatch { .. }
                | BatchError::Parse { .. }
                | BatchError::Csv(_)
        )
    }
}

/// Why registering the application on one account failed.
///
/// Always recorded on the account and never fatal for the run.
#[derive(Error, Debug)]
pub enum RegistrationError {
    /// Connection, TLS, URL or body decoding failure
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success HTTP status
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The server answered but the payload was not what the API promises
    #[error("unexpected response: {0}")]
    Protocol(String),

    /// The server refused the request (bad credentials, disabled user, ...)
    #[error("{0}")]
    Rejected(String),
}
