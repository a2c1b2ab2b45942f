/// Errors surfaced by every client operation
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Request(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Server error: {status} - {message}")]
    Server { status: u16, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Total count unavailable: the query was issued without `count`")]
    UnavailableCount,

    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),
}

impl Error {
    /// Wrap a transport-level failure
    pub fn request(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Error::Request(Box::new(err))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Server { status: 404, .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
