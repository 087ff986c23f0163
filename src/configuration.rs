use crate::domain::dispatch::models::email::{EmailAddress, SenderName};
use crate::domain::email_configuration::models::{ApiKey, EnvironmentDefaults};
use crate::domain::site::models::{CurrentSite, SiteDomain};
use secrecy::{ExposeSecret, Secret};
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::postgres::{PgConnectOptions, PgSslMode};

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Settings {
    pub general: GeneralSettings,
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub forward_email: ForwardEmailSettings,
}

impl Settings {
    pub fn log_level(&self) -> String {
        self.general.log_level.clone()
    }
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct GeneralSettings {
    pub log_level: String,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    pub database_name: String,
    pub require_ssl: bool,
}

impl DatabaseSettings {
    pub fn without_db(&self) -> PgConnectOptions {
        let ssl_mode = if self.require_ssl {
            PgSslMode::Require
        } else {
            PgSslMode::Prefer
        };
        PgConnectOptions::new()
            .host(&self.host)
            .username(&self.username)
            .password(self.password.expose_secret())
            .port(self.port)
            .ssl_mode(ssl_mode)
    }

    pub fn with_db(&self) -> PgConnectOptions {
        self.without_db().database(&self.database_name)
    }
}

/// Settings for the outbound ForwardEmail client and the process-wide
/// fallbacks used when a site carries no stored configuration.
#[derive(serde::Deserialize, Clone, Debug)]
pub struct ForwardEmailSettings {
    pub base_url: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
    #[serde(default)]
    pub api_key: Option<Secret<String>>,
    #[serde(default)]
    pub from_email: Option<String>,
    #[serde(default)]
    pub from_name: Option<String>,
    #[serde(default)]
    pub reply_to: Option<String>,
    #[serde(default)]
    pub current_site: Option<String>,
}

impl ForwardEmailSettings {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_milliseconds)
    }

    /// Blank values count as unset so an empty `APP_FORWARD_EMAIL__API_KEY`
    /// does not shadow a missing key.
    pub fn defaults(&self) -> Result<EnvironmentDefaults, String> {
        let api_key = match self.api_key.as_ref().map(|k| k.expose_secret().as_str()) {
            Some(key) if !key.trim().is_empty() => {
                Some(ApiKey::parse(key.to_string()).map_err(|e| e.to_string())?)
            }
            _ => None,
        };
        let from_email = non_blank(&self.from_email)
            .map(EmailAddress::parse)
            .transpose()
            .map_err(|e| e.to_string())?;
        let from_name = non_blank(&self.from_name)
            .map(SenderName::parse)
            .transpose()
            .map_err(|e| e.to_string())?;
        let reply_to = non_blank(&self.reply_to)
            .map(EmailAddress::parse)
            .transpose()
            .map_err(|e| e.to_string())?;

        Ok(EnvironmentDefaults {
            api_key,
            from_email,
            from_name,
            reply_to,
        })
    }

    pub fn current_site(&self) -> Result<CurrentSite, String> {
        match non_blank(&self.current_site) {
            Some(domain) => Ok(CurrentSite::Configured(
                SiteDomain::parse(domain).map_err(|e| e.to_string())?,
            )),
            None => Ok(CurrentSite::FirstRegistered),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_ref()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let mut settings = config::Config::default();
    let base_path = std::env::current_dir().expect("Failed to determine the current directory");
    let configuration_directory = base_path.join("configuration");

    settings.merge(config::File::from(configuration_directory.join("base")).required(true))?;

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .expect("Failed to parse APP_ENVIRONMENT.");

    settings.merge(
        config::File::from(configuration_directory.join(environment.as_str())).required(true),
    )?;

    // E.g. `APP_FORWARD_EMAIL__API_KEY=...` sets `Settings.forward_email.api_key`
    settings.merge(config::Environment::with_prefix("app").separator("__"))?;

    settings.try_into()
}

pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}
