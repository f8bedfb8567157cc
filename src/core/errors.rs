use thiserror::Error;

#[derive(Error, Debug)]
pub enum WaniAnkiError {
    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Reqwest error: {0}")]
    Reqwest(Box<reqwest::Error>),

    #[error("SQLite error: {0}")]
    Sqlite(Box<rusqlite::Error>),

    #[error("Zip error: {0}")]
    Zip(Box<zip::result::ZipError>),

    #[error("WaniKani rejected the API token (HTTP 401); check that it is valid and not expired")]
    Authentication,

    #[error("WaniKani refused access to {0} (HTTP 403); the subscription may not cover it")]
    Forbidden(String),

    #[error("HTTP error {status} from {url}")]
    Http { status: u16, url: String },

    #[error("No levels completed and --include-in-progress-level not passed")]
    NoCompletedLevels,

    #[error("WaniAnkiError: {0}")]
    Custom(String),
}

impl From<std::io::Error> for WaniAnkiError {
    fn from(error: std::io::Error) -> Self {
        WaniAnkiError::Io(Box::new(error))
    }
}

impl From<reqwest::Error> for WaniAnkiError {
    fn from(error: reqwest::Error) -> Self {
        WaniAnkiError::Reqwest(Box::new(error))
    }
}

impl From<rusqlite::Error> for WaniAnkiError {
    fn from(error: rusqlite::Error) -> Self {
        WaniAnkiError::Sqlite(Box::new(error))
    }
}

impl From<zip::result::ZipError> for WaniAnkiError {
    fn from(error: zip::result::ZipError) -> Self {
        WaniAnkiError::Zip(Box::new(error))
    }
}

impl From<tempfile::PersistError> for WaniAnkiError {
    fn from(error: tempfile::PersistError) -> Self {
        WaniAnkiError::Io(Box::new(error.error))
    }
}
