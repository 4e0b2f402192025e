#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    /// Non-2xx response; the message comes out of the shared decode cascade.
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
    /// Successful status with a body where one was required.
    #[error("empty response from server")]
    EmptyResponse,
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Local validation failure; never reaches the network.
    #[error("{0}")]
    Invalid(String),
    #[error("not signed in")]
    NoSession,
}

impl AppError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }

    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
