use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("backend returned HTTP {status}")]
    Http { status: u16 },
    #[error("backend rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("backend response carried no data")]
    MissingData,
    #[error("invalid backend url: {0}")]
    Url(#[from] url::ParseError),
}

impl BackendError {
    /// Text shown to the user; backend messages pass through, the rest is generic.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Rejected { message, .. } if !message.trim().is_empty() => message.clone(),
            Self::Request(err) if err.is_timeout() => {
                "The server took too long to respond. Please try again.".to_string()
            }
            _ => fallback.to_string(),
        }
    }

    /// Status for the page that reports this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Rejected { status, .. } => match *status {
                401 | 403 => StatusCode::UNAUTHORIZED,
                400..=499 => StatusCode::UNPROCESSABLE_ENTITY,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::Request(err) if err.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            Self::Request(_) | Self::Http { .. } | Self::MissingData | Self::Url(_) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}
