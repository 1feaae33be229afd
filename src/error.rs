#[derive(Debug, thiserror::Error)]
pub enum NabuError {
    #[error("{message} (status {status})")]
    Transport {
        status: u16,
        message: String,
        body: String,
    },
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Missing: {0}")]
    Missing(String),
    #[error("Invalid: {0}")]
    Invalid(String),
    #[error("Unsupported: {0}")]
    Unsupported(String),
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),
    #[error(transparent)]
    Base64Error(#[from] base64::DecodeError),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl NabuError {
    pub fn transport(
        status: u16,
        message: impl Into<String>,
        body: impl Into<String>,
    ) -> NabuError {
        NabuError::Transport {
            status,
            message: message.into(),
            body: body.into(),
        }
    }

    /// Whether a gateway response signals that the endpoint itself does not
    /// exist or is not supported, which triggers the discovery fallback path
    /// instead of propagating as a fault.
    pub fn is_unsupported_endpoint(&self) -> bool {
        matches!(
            self,
            NabuError::Transport {
                status: 404 | 405 | 501,
                ..
            }
        )
    }
}
