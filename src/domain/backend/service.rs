use std::sync::Arc;

use super::models::EmailMessage;
use crate::domain::dispatch::{
    errors::DispatchError, models::message::EmailRequest, ports::DispatchService,
};
use crate::domain::site::models::{RequestHost, SiteDomain};

/// Mail backend that hands each message of a batch to the dispatcher.
#[derive(Debug)]
pub struct EmailBackend<D>
where
    D: DispatchService,
{
    pub dispatcher: Arc<D>,
}

impl<D> EmailBackend<D>
where
    D: DispatchService,
{
    pub fn new(dispatcher: Arc<D>) -> Self {
        Self { dispatcher }
    }

    /// Sends messages one after another and returns how many went through.
    /// A failing message is logged and skipped, never aborting the batch.
    /// `site` and `request_host` feed the resolver exactly as for a single send.
    #[tracing::instrument(
        name = "Send a batch of email messages",
        skip(self, messages),
        fields(batch_size = messages.len(), sent = tracing::field::Empty)
    )]
    pub async fn send_messages(
        &self,
        messages: &[EmailMessage],
        site: Option<SiteDomain>,
        request_host: Option<RequestHost>,
    ) -> usize {
        let mut sent = 0;
        for (index, message) in messages.iter().enumerate() {
            if !message.has_recipients() {
                tracing::debug!(index, "Skipping a message without recipients");
                continue;
            }

            match self
                .send_message(message.clone(), site.clone(), request_host.clone())
                .await {
                Ok(()) => sent += 1,
                Err(error) => {
                    tracing::warn!(
                        error.cause_chain = ?error,
                        error.message = %error,
                        index,
                        "Skipping a message. It could not be dispatched",
                    );
                }
            }
        }
        tracing::Span::current().record("sent", sent);
        sent
    }

    async fn send_message(
        &self,
        message: EmailMessage,
        site: Option<SiteDomain>,
        request_host: Option<RequestHost>,
    ) -> Result<(), DispatchError> {
        let request = EmailRequest::try_from(message)?;
        self.dispatcher
            .send_for_site(request, site, request_host)
            .await
    }
}
