use rentscan_core::SchemaError;
use thiserror::Error;

/// Coarse failure category, for callers that branch on what went wrong
/// rather than on the details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Authentication,
    RateLimited,
    Api,
    Timeout,
    UnparsableOutput,
    SchemaValidation,
    InvalidRequest,
}

#[derive(Error, Debug)]
pub enum VisionError {
    #[error("authentication failed: {message}")]
    Authentication { message: String, body: String },

    #[error("rate limited by provider: {message}")]
    RateLimited { message: String, body: String },

    /// Any other non-2xx reply, or a 2xx reply that is not a chat completion.
    #[error("provider returned {status}: {message}")]
    Api {
        status: u16,
        message: String,
        body: String,
    },

    #[error("request timed out: {0}")]
    Timeout(String),

    /// Connection refused, DNS failure, TLS error and the like.
    #[error("HTTP request failed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("model output contains no usable JSON object: {reason}")]
    UnparsableOutput { reason: String, raw: String },

    #[error(transparent)]
    SchemaValidation(#[from] SchemaError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl VisionError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Authentication { .. } => FailureKind::Authentication,
            Self::RateLimited { .. } => FailureKind::RateLimited,
            Self::Api { .. } | Self::Network(_) => FailureKind::Api,
            Self::Timeout(_) => FailureKind::Timeout,
            Self::UnparsableOutput { .. } => FailureKind::UnparsableOutput,
            Self::SchemaValidation(_) => FailureKind::SchemaValidation,
            Self::InvalidRequest(_) => FailureKind::InvalidRequest,
        }
    }

    /// HTTP status of the provider reply, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { .. } => Some(401),
            Self::RateLimited { .. } => Some(429),
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether sending the same request again might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Timeout(_) | Self::Network(_) => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Raw completion text or reply body attached to the failure.
    pub fn raw(&self) -> Option<&str> {
        match self {
            Self::Authentication { body, .. }
            | Self::RateLimited { body, .. }
            | Self::Api { body, .. } => Some(body),
            Self::UnparsableOutput { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for VisionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else {
            Self::Network(err)
        }
    }
}
