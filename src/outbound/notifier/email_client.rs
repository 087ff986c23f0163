use crate::configuration::ForwardEmailSettings;
use crate::domain::dispatch::{
    errors::ApiError,
    models::{email::EmailAddress, message::OutgoingEmail},
    ports::EmailSender,
};
use crate::domain::email_configuration::models::ApiKey;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;

/// Client for the ForwardEmail.net REST API. Credentials are passed per
/// call because every site carries its own key.
#[derive(Debug, Clone)]
pub struct EmailClient {
    http_client: Client,
    base_url: String,
}

impl EmailClient {
    pub fn new(configuration: ForwardEmailSettings) -> Self {
        let timeout = configuration.timeout();
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build the HTTP client");
        Self {
            http_client,
            base_url: configuration.base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl EmailSender for EmailClient {
    #[tracing::instrument(
        name = "Send email through ForwardEmail",
        skip(self, api_key, email),
        fields(status = tracing::field::Empty)
    )]
    async fn send_email(&self, api_key: &ApiKey, email: &OutgoingEmail) -> Result<(), ApiError> {
        let url = format!("{}/v1/emails", self.base_url);
        let attachments: Vec<SendEmailAttachment> = email
            .attachments
            .iter()
            .map(|a| SendEmailAttachment {
                filename: a.filename(),
                content: base64::encode(a.content()),
                encoding: "base64",
                content_type: a.content_type(),
            })
            .collect();
        let request_body = SendEmailRequest {
            from: &email.from,
            to: join_addresses(&email.to),
            subject: email.subject.as_ref(),
            text: email.text.as_ref(),
            html: email.html.as_ref().map(|h| h.as_ref()),
            reply_to: email.reply_to.as_ref().map(|r| r.as_ref()),
            cc: Some(join_addresses(&email.cc)).filter(|s| !s.is_empty()),
            bcc: Some(join_addresses(&email.bcc)).filter(|s| !s.is_empty()),
            attachments,
        };

        let response = self
            .http_client
            .post(&url)
            .basic_auth(api_key.as_secret().expose_secret(), Option::<&str>::None)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| ApiError::network(e.to_string()))?;

        let status = response.status();
        tracing::Span::current().record("status", status.as_u16());
        if status.is_success() {
            return Ok(());
        }

        let message = match response.json::<ErrorResponse>().await {
            Ok(ErrorResponse {
                message: Some(message),
            }) => message,
            _ => status
                .canonical_reason()
                .unwrap_or("Unexpected response status")
                .to_string(),
        };
        Err(ApiError::from_status(status.as_u16(), message))
    }
}

fn join_addresses(addresses: &[EmailAddress]) -> String {
    addresses
        .iter()
        .map(|a| a.as_ref())
        .collect::<Vec<&str>>()
        .join(", ")
}

#[derive(serde::Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: String,
    subject: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bcc: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<SendEmailAttachment<'a>>,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct SendEmailAttachment<'a> {
    filename: &'a str,
    content: String,
    encoding: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_type: Option<&'a str>,
}

#[derive(serde::Deserialize)]
struct ErrorResponse {
    message: Option<String>,
}
