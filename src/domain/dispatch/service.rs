use async_trait::async_trait;
use std::sync::Arc;

use super::{
    errors::DispatchError,
    models::message::{Email, EmailRequest, OutgoingEmail},
    ports::{DispatchService, EmailSender},
};
use crate::domain::email_configuration::{models::EffectiveConfig, ports::ConfigurationService};
use crate::domain::site::models::{RequestHost, SiteDomain};

#[derive(Debug)]
pub struct Dispatch<CS, N>
where
    CS: ConfigurationService,
    N: EmailSender,
{
    pub configurations: Arc<CS>,
    pub sender: Arc<N>,
}

impl<CS, N> Dispatch<CS, N>
where
    CS: ConfigurationService,
    N: EmailSender,
{
    pub fn new(configurations: Arc<CS>, sender: Arc<N>) -> Self {
        Self {
            configurations,
            sender,
        }
    }

    async fn deliver(&self, email: Email, config: &EffectiveConfig) -> Result<(), DispatchError> {
        let outgoing = OutgoingEmail::build(email, config)?;
        self.sender.send_email(&config.api_key, &outgoing).await?;
        tracing::info!(
            recipients = outgoing.to.len(),
            site = ?config.site,
            "Email accepted by ForwardEmail"
        );
        Ok(())
    }
}

#[async_trait]
impl<CS, N> DispatchService for Dispatch<CS, N>
where
    CS: ConfigurationService,
    N: EmailSender,
{
    #[tracing::instrument(
        name = "Dispatch an email",
        skip(self, request, config),
        fields(subject = %request.subject)
    )]
    async fn send(
        &self,
        request: EmailRequest,
        config: &EffectiveConfig,
    ) -> Result<(), DispatchError> {
        let email = Email::try_from(request)?;
        self.deliver(email, config).await
    }

    #[tracing::instrument(
        name = "Dispatch an email for a site",
        skip(self, request),
        fields(subject = %request.subject)
    )]
    async fn send_for_site(
        &self,
        request: EmailRequest,
        explicit_site: Option<SiteDomain>,
        request_host: Option<RequestHost>,
    ) -> Result<(), DispatchError> {
        let email = Email::try_from(request)?;
        let config = self
            .configurations
            .resolve(explicit_site.as_ref(), request_host.as_ref())
            .await?;
        self.deliver(email, &config).await
    }
}
