/// Failure taxonomy for the experiment client.
///
/// `Unauthenticated` is produced and handled centrally by the gateway (the
/// credential is cleared and the caller is routed to the login screen);
/// screens only ever see it as a terminal failure, never as something they
/// are expected to recover from themselves.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Credential missing or rejected by the service.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),
    /// Client-detected bad configuration, rejected before any network call.
    #[error("validation error: {0}")]
    Validation(String),
    /// Non-2xx response other than an auth failure. `message` carries the
    /// service-provided diagnostic verbatim.
    #[error("remote failure: {message}")]
    Remote {
        status: Option<u16>,
        message: String,
    },
    /// Network or HTTP engine failure before a response was obtained.
    #[error("transport error: {0}")]
    Transport(String),
    /// Invalid client setup (bad base URL, unbuildable HTTP client, etc.).
    #[error("config error: {0}")]
    Config(String),
}

impl ClientError {
    /// Creates a remote failure with the service's diagnostic text.
    pub fn remote(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Remote {
            status,
            message: message.into(),
        }
    }

    /// Creates a transport-level error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an unauthenticated error.
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated(message.into())
    }

    /// Returns the HTTP status associated with this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => *status,
            _ => None,
        }
    }

    /// Returns the human-readable message for this error.
    pub fn message(&self) -> &str {
        match self {
            Self::Unauthenticated(message)
            | Self::Validation(message)
            | Self::Transport(message)
            | Self::Config(message)
            | Self::Remote { message, .. } => message,
        }
    }
}
