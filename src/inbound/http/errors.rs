use crate::domain::dispatch::errors::{ApiErrorKind, DispatchError};
use crate::domain::dispatch::models::email::EmailError;
use crate::domain::email_configuration::errors::SiteConfigError;
use crate::domain::site::models::SiteDomainError;

use actix_web::HttpResponse;
use actix_web::{http::StatusCode, ResponseError};

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    #[error("Email provider rejected the request: {0}")]
    Upstream(String),
    #[error("Email provider is unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl From<DispatchError> for AppError {
    fn from(error: DispatchError) -> Self {
        match error {
            DispatchError::ValidationError(s) => AppError::ValidationError(s),
            DispatchError::ConfigurationError(s) => AppError::ConfigurationError(s),
            DispatchError::ApiError(e) => match e.kind {
                ApiErrorKind::Client => AppError::Upstream(e.to_string()),
                ApiErrorKind::Transient => AppError::UpstreamUnavailable(e.to_string()),
            },
            DispatchError::Unexpected(e) => AppError::Unexpected(e),
        }
    }
}

impl From<SiteConfigError> for AppError {
    fn from(error: SiteConfigError) -> Self {
        match error {
            SiteConfigError::ValidationError(s) => AppError::ValidationError(s),
            SiteConfigError::NotFound(s) => AppError::NotFound(s),
            SiteConfigError::Conflict(s) => AppError::Conflict(s),
            SiteConfigError::MissingConfiguration(s) => AppError::ConfigurationError(s),
            SiteConfigError::Unexpected(e) => AppError::Unexpected(e),
        }
    }
}

impl From<SiteDomainError> for AppError {
    fn from(error: SiteDomainError) -> Self {
        AppError::ValidationError(error.to_string())
    }
}

impl From<EmailError> for AppError {
    fn from(error: EmailError) -> Self {
        AppError::ValidationError(error.to_string())
    }
}

#[derive(serde::Serialize)]
struct ErrorBody {
    error: String,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        let message = match self {
            AppError::Unexpected(_) => "Unexpected error".to_string(),
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(ErrorBody { error: message })
    }
}
