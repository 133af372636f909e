use thiserror::Error;

/// Main error type for Patou
#[derive(Error, Debug)]
pub enum PatouError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server returned status {0}")]
    Api(u16),

    #[error("Invalid image attachment: {0}")]
    InvalidImage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PatouError {
    /// True when the server answered but reported a failure, as opposed to
    /// the request never reaching it.
    pub fn is_api_reported(&self) -> bool {
        matches!(self, Self::Api(_))
    }
}
