//! Error types for pixelgate.

use thiserror::Error;

/// Classification of a [`GateError`], independent of its message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    FileTooLarge,
    FileTypeNotSupported,
    FolderNotFound,
    DbQueryFailed,
    InvalidParameter,
    Settings,
    Database,
    Io,
    Config,
}

impl ErrorKind {
    /// Stable code used by request handlers when reporting the error.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::FileTooLarge => "file_too_large",
            ErrorKind::FileTypeNotSupported => "file_type_not_supported",
            ErrorKind::FolderNotFound => "folder_not_found",
            ErrorKind::DbQueryFailed => "db_query_failed",
            ErrorKind::InvalidParameter => "invalid_parameter",
            ErrorKind::Settings => "settings_unavailable",
            ErrorKind::Database => "database_error",
            ErrorKind::Io => "io_error",
            ErrorKind::Config => "config_error",
        }
    }
}

/// Common error type for pixelgate.
#[derive(Error, Debug)]
pub enum GateError {
    /// A single file or a whole batch is over its size limit.
    #[error("file too large: {0}")]
    FileTooLarge(String),

    /// The file extension is not on the allow-list.
    #[error("file type not supported: {0}")]
    FileTypeNotSupported(String),

    /// The target folder does not exist or belongs to someone else.
    #[error("folder not found: {0}")]
    FolderNotFound(String),

    /// A lookup needed to evaluate the request failed.
    #[error("query failed: {message}: {source}")]
    DbQueryFailed {
        message: String,
        #[source]
        source: Box<GateError>,
    },

    /// A request parameter was rejected by policy.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The dynamic settings source could not be read.
    #[error("settings error: {0}")]
    Settings(String),

    /// Database error.
    ///
    /// Errors from sqlx are converted into this variant.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl GateError {
    /// Wrap a lower level failure as [`ErrorKind::DbQueryFailed`].
    pub fn query_failed(message: impl Into<String>, source: GateError) -> Self {
        GateError::DbQueryFailed {
            message: message.into(),
            source: Box::new(source),
        }
    }

    /// The kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GateError::FileTooLarge(_) => ErrorKind::FileTooLarge,
            GateError::FileTypeNotSupported(_) => ErrorKind::FileTypeNotSupported,
            GateError::FolderNotFound(_) => ErrorKind::FolderNotFound,
            GateError::DbQueryFailed { .. } => ErrorKind::DbQueryFailed,
            GateError::InvalidParameter(_) => ErrorKind::InvalidParameter,
            GateError::Settings(_) => ErrorKind::Settings,
            GateError::Database(_) => ErrorKind::Database,
            GateError::Io(_) => ErrorKind::Io,
            GateError::Config(_) => ErrorKind::Config,
        }
    }
}

impl From<sqlx::Error> for GateError {
    fn from(e: sqlx::Error) -> Self {
        GateError::Database(e.to_string())
    }
}

/// Result type alias for pixelgate operations.
pub type Result<T> = std::result::Result<T, GateError>;
