use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    /// The node could not be reached or the HTTP exchange failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The node answered with an error message.
    #[error("node rejected request: {0}")]
    Rejected(String),

    /// The node answered, but not in the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ChainError {
    /// Whether retrying later may succeed without operator action.
    pub fn is_transient(&self) -> bool {
        matches!(self, ChainError::Transport(_))
    }
}
