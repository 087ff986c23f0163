use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, Secret};
use uuid::Uuid;

use crate::domain::dispatch::models::email::{EmailAddress, EmailError, SenderName};
use crate::domain::email_configuration::errors::SiteConfigError;
use crate::domain::site::models::{SiteDomain, SiteId};

#[derive(Debug, Clone)]
pub struct ApiKey(Secret<String>);

impl ApiKey {
    pub fn parse(s: String) -> Result<ApiKey, SiteConfigError> {
        let key = s.trim();
        if key.is_empty() {
            Err(SiteConfigError::ValidationError(
                "API key cannot be empty.".into(),
            ))
        } else {
            Ok(Self(Secret::new(key.to_string())))
        }
    }

    pub fn as_secret(&self) -> &Secret<String> {
        &self.0
    }

    /// Last four characters, enough to tell keys apart in listings.
    pub fn hint(&self) -> String {
        let key = self.0.expose_secret();
        let tail: String = key
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        format!("****{}", tail)
    }
}

/// Process-wide fallbacks, each independently optional.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentDefaults {
    pub api_key: Option<ApiKey>,
    pub from_email: Option<EmailAddress>,
    pub from_name: Option<SenderName>,
    pub reply_to: Option<EmailAddress>,
}

#[derive(Debug, Clone)]
pub struct EmailConfiguration {
    pub id: Uuid,
    pub site_id: SiteId,
    pub site: SiteDomain,
    pub api_key: ApiKey,
    pub from_email: Option<EmailAddress>,
    pub from_name: Option<SenderName>,
    pub reply_to: Option<EmailAddress>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct EmailConfigurationRequest {
    pub api_key: Secret<String>,
    #[serde(default)]
    pub from_email: Option<String>,
    #[serde(default)]
    pub from_name: Option<String>,
    #[serde(default)]
    pub reply_to: Option<String>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct CreateEmailConfigurationRequest {
    pub site: String,
    #[serde(flatten)]
    pub configuration: EmailConfigurationRequest,
}

#[derive(Debug, Clone)]
pub struct NewEmailConfiguration {
    pub api_key: ApiKey,
    pub from_email: Option<EmailAddress>,
    pub from_name: Option<SenderName>,
    pub reply_to: Option<EmailAddress>,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl TryFrom<EmailConfigurationRequest> for NewEmailConfiguration {
    type Error = SiteConfigError;

    fn try_from(request: EmailConfigurationRequest) -> Result<Self, Self::Error> {
        let parse_address = |value: Option<String>| -> Result<Option<EmailAddress>, EmailError> {
            blank_to_none(value).map(EmailAddress::parse).transpose()
        };
        Ok(Self {
            api_key: ApiKey::parse(request.api_key.expose_secret().to_string())?,
            from_email: parse_address(request.from_email)?,
            from_name: blank_to_none(request.from_name)
                .map(SenderName::parse)
                .transpose()?,
            reply_to: parse_address(request.reply_to)?,
        })
    }
}

/// What the admin surface shows for a stored configuration. The key itself
/// is never echoed back.
#[derive(Debug, Clone, serde::Serialize)]
pub struct EmailConfigurationView {
    pub site: String,
    pub api_key_hint: String,
    pub from_email: Option<String>,
    pub from_name: Option<String>,
    pub reply_to: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&EmailConfiguration> for EmailConfigurationView {
    fn from(c: &EmailConfiguration) -> Self {
        Self {
            site: c.site.to_string(),
            api_key_hint: c.api_key.hint(),
            from_email: c.from_email.as_ref().map(|e| e.to_string()),
            from_name: c.from_name.as_ref().map(|n| n.as_ref().to_string()),
            reply_to: c.reply_to.as_ref().map(|e| e.to_string()),
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    Site,
    Environment,
}

/// Credentials and addresses a dispatch runs with, after the fallback chain.
#[derive(Debug, Clone)]
pub struct EffectiveConfig {
    pub site: Option<SiteDomain>,
    pub api_key: ApiKey,
    pub from_email: Option<EmailAddress>,
    pub from_name: Option<SenderName>,
    pub reply_to: Option<EmailAddress>,
    pub source: ConfigSource,
}

impl EffectiveConfig {
    pub fn from_site(configuration: EmailConfiguration, defaults: &EnvironmentDefaults) -> Self {
        Self {
            site: Some(configuration.site),
            api_key: configuration.api_key,
            from_email: configuration
                .from_email
                .or_else(|| defaults.from_email.clone()),
            from_name: configuration
                .from_name
                .or_else(|| defaults.from_name.clone()),
            reply_to: configuration.reply_to.or_else(|| defaults.reply_to.clone()),
            source: ConfigSource::Site,
        }
    }

    pub fn from_environment(
        site: Option<SiteDomain>,
        defaults: &EnvironmentDefaults,
    ) -> Option<Self> {
        let api_key = defaults.api_key.clone()?;
        Some(Self {
            site,
            api_key,
            from_email: defaults.from_email.clone(),
            from_name: defaults.from_name.clone(),
            reply_to: defaults.reply_to.clone(),
            source: ConfigSource::Environment,
        })
    }
}
