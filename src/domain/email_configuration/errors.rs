use crate::domain::dispatch::models::email::EmailError;
use crate::domain::site::models::SiteDomainError;

#[derive(thiserror::Error, Debug)]
pub enum SiteConfigError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    Conflict(String),
    #[error("Missing email configuration: {0}")]
    MissingConfiguration(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl From<EmailError> for SiteConfigError {
    fn from(value: EmailError) -> Self {
        Self::ValidationError(value.to_string())
    }
}

impl From<SiteDomainError> for SiteConfigError {
    fn from(value: SiteDomainError) -> Self {
        Self::ValidationError(value.to_string())
    }
}
