use crate::domain::dispatch::models::email::EmailError;
use crate::domain::email_configuration::errors::SiteConfigError;

#[derive(thiserror::Error, Debug)]
pub enum DispatchError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error(transparent)]
    ApiError(#[from] ApiError),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl From<EmailError> for DispatchError {
    fn from(value: EmailError) -> Self {
        Self::ValidationError(value.to_string())
    }
}

impl From<SiteConfigError> for DispatchError {
    fn from(error: SiteConfigError) -> Self {
        match error {
            SiteConfigError::ValidationError(e) => DispatchError::ValidationError(e),
            SiteConfigError::MissingConfiguration(e) | SiteConfigError::NotFound(e) => {
                DispatchError::ConfigurationError(e)
            }
            SiteConfigError::Conflict(e) => DispatchError::Unexpected(anyhow::anyhow!(e)),
            SiteConfigError::Unexpected(e) => DispatchError::Unexpected(e),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Rejected request or credentials. Resending the same request will fail again.
    Client,
    /// Server-side or network failure.
    Transient,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "ForwardEmail API error ({kind:?}{}): {message}",
    .status.map(|s| format!(", status {}", s)).unwrap_or_default()
)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub status: Option<u16>,
    pub message: String,
}

impl ApiError {
    pub fn from_status(status: u16, message: String) -> Self {
        let kind = if (500..600).contains(&status) {
            ApiErrorKind::Transient
        } else {
            ApiErrorKind::Client
        };
        Self {
            kind,
            status: Some(status),
            message,
        }
    }

    pub fn network(message: String) -> Self {
        Self {
            kind: ApiErrorKind::Transient,
            status: None,
            message,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind == ApiErrorKind::Transient
    }
}
