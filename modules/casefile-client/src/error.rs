use thiserror::Error;

pub type Result<T> = std::result::Result<T, CasefileError>;

#[derive(Debug, Error)]
pub enum CasefileError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for CasefileError {
    fn from(err: reqwest::Error) -> Self {
        CasefileError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for CasefileError {
    fn from(err: serde_json::Error) -> Self {
        CasefileError::Parse(err.to_string())
    }
}
