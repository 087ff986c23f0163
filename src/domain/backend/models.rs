use crate::domain::dispatch::models::email::{Attachment, EmailError};
use crate::domain::dispatch::models::message::{EmailRequest, Recipients};

const HTML_MIMETYPE: &str = "text/html";

/// An alternative rendering of the body, e.g. `("<p>Hi</p>", "text/html")`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct Alternative {
    pub content: String,
    pub mimetype: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct MessageAttachment {
    pub filename: String,
    /// Base64 encoded file content.
    pub content: String,
    #[serde(default)]
    pub mimetype: Option<String>,
}

/// A framework-style outgoing message, as handed to a mail backend.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct EmailMessage {
    #[serde(default)]
    pub from_email: Option<String>,
    #[serde(default)]
    pub to: Vec<String>,
    #[serde(default)]
    pub cc: Vec<String>,
    #[serde(default)]
    pub bcc: Vec<String>,
    #[serde(default)]
    pub reply_to: Vec<String>,
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub alternatives: Vec<Alternative>,
    #[serde(default)]
    pub attachments: Vec<MessageAttachment>,
}

impl EmailMessage {
    pub fn new(to: Vec<String>, subject: &str, body: &str) -> Self {
        Self {
            to,
            subject: subject.to_string(),
            body: body.to_string(),
            ..Default::default()
        }
    }

    pub fn attach_alternative(mut self, content: &str, mimetype: &str) -> Self {
        self.alternatives.push(Alternative {
            content: content.to_string(),
            mimetype: mimetype.to_string(),
        });
        self
    }

    pub fn has_recipients(&self) -> bool {
        !(self.to.is_empty() && self.cc.is_empty() && self.bcc.is_empty())
    }
}

impl TryFrom<EmailMessage> for EmailRequest {
    type Error = EmailError;

    fn try_from(message: EmailMessage) -> Result<Self, Self::Error> {
        let html = message
            .alternatives
            .into_iter()
            .find(|a| a.mimetype.eq_ignore_ascii_case(HTML_MIMETYPE))
            .map(|a| a.content);
        let attachments = message
            .attachments
            .into_iter()
            .map(|a| {
                let content = base64::decode(a.content.as_bytes()).map_err(|e| {
                    EmailError::InvalidAttachment(format!(
                        "{} is not valid base64: {}",
                        a.filename, e
                    ))
                })?;
                Attachment::new(a.filename, content, a.mimetype)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(EmailRequest {
            to: Recipients::Many(message.to),
            subject: message.subject,
            text: message.body,
            html,
            from_email: message.from_email,
            reply_to: message.reply_to.into_iter().next(),
            cc: Recipients::Many(message.cc),
            bcc: Recipients::Many(message.bcc),
            attachments,
            encoded_attachments: Vec::new(),
        })
    }
}
