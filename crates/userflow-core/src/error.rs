pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Malformed user-flow payload: {message}")]
    DataShape { message: String },

    #[error("Payload JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn shape(message: impl Into<String>) -> Self {
        Self::DataShape {
            message: message.into(),
        }
    }
}
