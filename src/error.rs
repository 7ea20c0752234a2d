use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShoeboxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Server error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response from server: {0}")]
    UnexpectedResponse(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Invalid month '{0}' (expected YYYY-MM)")]
    InvalidMonth(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ShoeboxError>;
