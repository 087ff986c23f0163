use super::email::{
    Attachment, EmailAddress, EmailError, EmailHtmlContent, EmailSubject, EmailTextContent,
};
use crate::domain::dispatch::errors::DispatchError;
use crate::domain::email_configuration::models::EffectiveConfig;

/// Accepts either a single address string or a list of them.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    One(String),
    Many(Vec<String>),
}

impl Default for Recipients {
    fn default() -> Self {
        Recipients::Many(Vec::new())
    }
}

impl From<Vec<String>> for Recipients {
    fn from(value: Vec<String>) -> Self {
        Recipients::Many(value)
    }
}

impl From<&str> for Recipients {
    fn from(value: &str) -> Self {
        Recipients::One(value.to_string())
    }
}

impl Recipients {
    fn parse(self) -> Result<Vec<EmailAddress>, EmailError> {
        let raw = match self {
            Recipients::One(s) => vec![s],
            Recipients::Many(v) => v,
        };
        raw.into_iter().map(EmailAddress::parse).collect()
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct AttachmentDto {
    pub filename: String,
    /// Base64 encoded file content.
    pub content: String,
    #[serde(default)]
    pub content_type: Option<String>,
}

/// Caller-facing dispatch input, unvalidated.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct EmailRequest {
    pub to: Recipients,
    pub subject: String,
    pub text: String,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub from_email: Option<String>,
    #[serde(default)]
    pub reply_to: Option<String>,
    #[serde(default)]
    pub cc: Recipients,
    #[serde(default)]
    pub bcc: Recipients,
    #[serde(default, skip)]
    pub attachments: Vec<Attachment>,
    #[serde(default, rename = "attachments")]
    pub encoded_attachments: Vec<AttachmentDto>,
}

impl EmailRequest {
    pub fn new(to: impl Into<Recipients>, subject: &str, text: &str) -> Self {
        Self {
            to: to.into(),
            subject: subject.to_string(),
            text: text.to_string(),
            html: None,
            from_email: None,
            reply_to: None,
            cc: Recipients::default(),
            bcc: Recipients::default(),
            attachments: Vec::new(),
            encoded_attachments: Vec::new(),
        }
    }

    pub fn with_html(mut self, html: &str) -> Self {
        self.html = Some(html.to_string());
        self
    }

    pub fn with_from_email(mut self, from_email: &str) -> Self {
        self.from_email = Some(from_email.to_string());
        self
    }

    pub fn with_reply_to(mut self, reply_to: &str) -> Self {
        self.reply_to = Some(reply_to.to_string());
        self
    }
}

/// A message whose every field has been validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: Vec<EmailAddress>,
    pub cc: Vec<EmailAddress>,
    pub bcc: Vec<EmailAddress>,
    pub subject: EmailSubject,
    pub text: EmailTextContent,
    pub html: Option<EmailHtmlContent>,
    pub from_email: Option<EmailAddress>,
    pub reply_to: Option<EmailAddress>,
    pub attachments: Vec<Attachment>,
}

impl TryFrom<EmailRequest> for Email {
    type Error = EmailError;

    fn try_from(request: EmailRequest) -> Result<Self, Self::Error> {
        let to = request.to.parse()?;
        if to.is_empty() {
            return Err(EmailError::NoRecipients);
        }
        let mut attachments = request.attachments;
        for dto in request.encoded_attachments {
            let content = base64::decode(dto.content.as_bytes()).map_err(|e| {
                EmailError::InvalidAttachment(format!("{} is not valid base64: {}", dto.filename, e))
            })?;
            attachments.push(Attachment::new(dto.filename, content, dto.content_type)?);
        }

        Ok(Email {
            to,
            cc: request.cc.parse()?,
            bcc: request.bcc.parse()?,
            subject: EmailSubject::try_from(request.subject)?,
            text: EmailTextContent::try_from(request.text)?,
            html: request.html.map(EmailHtmlContent::try_from).transpose()?,
            from_email: request.from_email.map(EmailAddress::parse).transpose()?,
            reply_to: request.reply_to.map(EmailAddress::parse).transpose()?,
            attachments,
        })
    }
}

/// A validated message with its sender and reply-to resolved against an
/// `EffectiveConfig`. This is exactly what goes on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<EmailAddress>,
    pub cc: Vec<EmailAddress>,
    pub bcc: Vec<EmailAddress>,
    pub subject: EmailSubject,
    pub text: EmailTextContent,
    pub html: Option<EmailHtmlContent>,
    pub reply_to: Option<EmailAddress>,
    pub attachments: Vec<Attachment>,
}

impl OutgoingEmail {
    /// Sender precedence: explicit, then configuration (which already carries
    /// the environment default).
    pub fn build(email: Email, config: &EffectiveConfig) -> Result<Self, DispatchError> {
        let from_email = email
            .from_email
            .or_else(|| config.from_email.clone())
            .ok_or_else(|| {
                DispatchError::ConfigurationError(
                    "No sender address is configured for this site or environment".into(),
                )
            })?;
        let from = match &config.from_name {
            Some(name) if from_email.address() == from_email.as_ref() => {
                name.mailbox(from_email.as_ref())
            }
            _ => from_email.to_string(),
        };

        Ok(Self {
            from,
            to: email.to,
            cc: email.cc,
            bcc: email.bcc,
            subject: email.subject,
            text: email.text,
            html: email.html,
            reply_to: email.reply_to.or_else(|| config.reply_to.clone()),
            attachments: email.attachments,
        })
    }
}
