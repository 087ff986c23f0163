use unicode_segmentation::UnicodeSegmentation;
use validator::validate_email;

const MAX_SENDER_NAME_LENGTH: usize = 256;
const UNQUOTED_NAME_FORBIDDEN: [char; 12] = ['<', '>', '"', ',', ';', '@', '(', ')', '[', ']', ':', '\\'];
const NAME_SPECIALS: [char; 13] = ['(', ')', '<', '>', '[', ']', ':', ';', '@', '\\', ',', '.', '"'];

#[derive(thiserror::Error, Debug)]
pub enum EmailError {
    #[error("Invalid email subject: {0}")]
    InvalidSubject(String),
    #[error("Invalid email Html content: {0}")]
    InvalidHtmlContent(String),
    #[error("Invalid email text content: {0}")]
    InvalidTextContent(String),
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
    #[error("Invalid sender name: {0}")]
    InvalidSenderName(String),
    #[error("Invalid attachment: {0}")]
    InvalidAttachment(String),
    #[error("At least one recipient is required.")]
    NoRecipients,
}

/// A single mailbox, either `user@host` or `Display Name <user@host>`.
/// The original string is kept verbatim.
#[derive(Debug, Clone, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn parse(s: String) -> Result<EmailAddress, EmailError> {
        let invalid = || EmailError::InvalidAddress(format!("{} is not a valid email", s));
        let trimmed = s.trim();
        if trimmed.chars().any(char::is_control) {
            return Err(invalid());
        }
        let address = match (trimmed.rfind('<'), trimmed.ends_with('>')) {
            (Some(start), true) => {
                if !is_valid_display_name(trimmed[..start].trim()) {
                    return Err(invalid());
                }
                &trimmed[start + 1..trimmed.len() - 1]
            }
            _ => trimmed,
        };
        if validate_email(address) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(invalid())
        }
    }

    /// The bare `user@host` part.
    pub fn address(&self) -> &str {
        match (self.0.rfind('<'), self.0.ends_with('>')) {
            (Some(start), true) => &self.0[start + 1..self.0.len() - 1],
            _ => &self.0,
        }
    }
}

/// A display name is either a quoted string or a phrase free of RFC 5322
/// specials, so one `EmailAddress` can never expand into several mailboxes.
fn is_valid_display_name(name: &str) -> bool {
    if name.len() >= 2 && name.starts_with('"') && name.ends_with('"') {
        let mut chars = name[1..name.len() - 1].chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' if chars.next().is_none() => return false,
                '"' => return false,
                _ => {}
            }
        }
        return true;
    }
    !name.chars().any(|c| UNQUOTED_NAME_FORBIDDEN.contains(&c))
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<EmailAddress> for String {
    fn from(email: EmailAddress) -> Self {
        email.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SenderName(String);

impl SenderName {
    pub fn parse(s: String) -> Result<SenderName, EmailError> {
        let is_empty_or_whitespace = s.trim().is_empty();
        let is_too_long = s.graphemes(true).count() > MAX_SENDER_NAME_LENGTH;
        let forbidden_characters = ['<', '>', '"'];
        let contains_forbidden_characters = s
            .chars()
            .any(|c| forbidden_characters.contains(&c) || c.is_control());

        if is_empty_or_whitespace || is_too_long || contains_forbidden_characters {
            Err(EmailError::InvalidSenderName(format!(
                "{} is not a valid sender name",
                s
            )))
        } else {
            Ok(Self(s.trim().to_string()))
        }
    }

    /// Formats `Name <address>`, quoting the name when it carries specials.
    pub fn mailbox(&self, address: &str) -> String {
        if self.0.chars().any(|c| NAME_SPECIALS.contains(&c)) {
            let escaped = self.0.replace('\\', "\\\\").replace('"', "\\\"");
            format!("\"{}\" <{}>", escaped, address)
        } else {
            format!("{} <{}>", self.0, address)
        }
    }
}

impl AsRef<str> for SenderName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub struct EmailSubject(String);

impl TryFrom<String> for EmailSubject {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        EmailSubject::try_from(value.as_str())
    }
}

impl TryFrom<&str> for EmailSubject {
    type Error = EmailError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if value.trim().is_empty() {
            Err(EmailError::InvalidSubject(
                "EmailSubject cannot be empty.".into(),
            ))
        } else if value.contains('\n') || value.contains('\r') {
            Err(EmailError::InvalidSubject(
                "EmailSubject cannot contain newlines.".into(),
            ))
        } else {
            Ok(Self(value.to_string()))
        }
    }
}
impl AsRef<str> for EmailSubject {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub struct EmailHtmlContent(String);

impl TryFrom<String> for EmailHtmlContent {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if !value.is_empty() {
            Ok(Self(value))
        } else {
            Err(EmailError::InvalidHtmlContent(
                "EmailHtmlContent cannot be empty.".into(),
            ))
        }
    }
}

impl TryFrom<&str> for EmailHtmlContent {
    type Error = EmailError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        EmailHtmlContent::try_from(value.to_string())
    }
}
impl AsRef<str> for EmailHtmlContent {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub struct EmailTextContent(String);

impl TryFrom<String> for EmailTextContent {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if !value.is_empty() {
            Ok(Self(value))
        } else {
            Err(EmailError::InvalidTextContent(
                "EmailTextContent cannot be empty.".into(),
            ))
        }
    }
}

impl TryFrom<&str> for EmailTextContent {
    type Error = EmailError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        EmailTextContent::try_from(value.to_string())
    }
}
impl AsRef<str> for EmailTextContent {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    filename: String,
    content: Vec<u8>,
    content_type: Option<String>,
}

impl Attachment {
    pub fn new(
        filename: String,
        content: Vec<u8>,
        content_type: Option<String>,
    ) -> Result<Self, EmailError> {
        if filename.trim().is_empty() {
            return Err(EmailError::InvalidAttachment(
                "Attachment filename cannot be empty.".into(),
            ));
        }
        Ok(Self {
            filename,
            content,
            content_type: content_type.filter(|c| !c.trim().is_empty()),
        })
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }
}
