use async_trait::async_trait;

use super::{
    errors::{ApiError, DispatchError},
    models::message::{EmailRequest, OutgoingEmail},
};
use crate::domain::email_configuration::models::{ApiKey, EffectiveConfig};
use crate::domain::site::models::{RequestHost, SiteDomain};

/// Delivers one message to the email provider
#[async_trait]
pub trait EmailSender: Send + Sync + 'static {
    /// Issues exactly one request. Retrying is left to the caller.
    async fn send_email(&self, api_key: &ApiKey, email: &OutgoingEmail) -> Result<(), ApiError>;
}

#[async_trait]
pub trait DispatchService: Send + Sync + 'static {
    /// Sends with an already resolved configuration.
    async fn send(
        &self,
        request: EmailRequest,
        config: &EffectiveConfig,
    ) -> Result<(), DispatchError>;

    /// Resolves the configuration for the given site or request host, then sends.
    async fn send_for_site(
        &self,
        request: EmailRequest,
        explicit_site: Option<SiteDomain>,
        request_host: Option<RequestHost>,
    ) -> Result<(), DispatchError>;
}
