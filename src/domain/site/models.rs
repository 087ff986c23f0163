use chrono::{DateTime, Utc};
use uuid::Uuid;

const MAX_DOMAIN_LENGTH: usize = 253;

pub type SiteId = Uuid;

#[derive(thiserror::Error, Debug)]
pub enum SiteDomainError {
    #[error("Site domain cannot be empty.")]
    Empty,
    #[error("Site domain is too long: {0}")]
    TooLong(String),
    #[error("Invalid site domain: {0}")]
    Invalid(String),
}

/// A lower-cased host name identifying a tenant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SiteDomain(String);

impl SiteDomain {
    pub fn parse(s: String) -> Result<SiteDomain, SiteDomainError> {
        let domain = s.trim().trim_end_matches('.').to_lowercase();
        if domain.is_empty() {
            return Err(SiteDomainError::Empty);
        }
        if domain.len() > MAX_DOMAIN_LENGTH {
            return Err(SiteDomainError::TooLong(s));
        }
        let valid = domain.split('.').all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        });
        if !valid {
            return Err(SiteDomainError::Invalid(s));
        }
        Ok(Self(domain))
    }
}

impl AsRef<str> for SiteDomain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SiteDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<String> for SiteDomain {
    type Error = SiteDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        SiteDomain::parse(value)
    }
}

impl TryFrom<&str> for SiteDomain {
    type Error = SiteDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        SiteDomain::parse(value.to_string())
    }
}

/// Host of an inbound request, as carried by its `Host` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHost(SiteDomain);

impl RequestHost {
    pub fn parse(header_value: &str) -> Result<RequestHost, SiteDomainError> {
        let host = match header_value.rsplit_once(':') {
            Some((host, port))
                if !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()) =>
            {
                host
            }
            _ => header_value,
        };
        SiteDomain::parse(host.to_string()).map(Self)
    }

    pub fn domain(&self) -> &SiteDomain {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Site {
    pub id: SiteId,
    #[serde(serialize_with = "serialize_domain")]
    pub domain: SiteDomain,
    pub name: String,
    pub registered_at: DateTime<Utc>,
}

fn serialize_domain<S: serde::Serializer>(
    domain: &SiteDomain,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(domain.as_ref())
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct NewSiteRequest {
    pub domain: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewSite {
    pub domain: SiteDomain,
    pub name: String,
}

impl TryFrom<NewSiteRequest> for NewSite {
    type Error = SiteDomainError;

    fn try_from(request: NewSiteRequest) -> Result<Self, Self::Error> {
        let domain = SiteDomain::parse(request.domain)?;
        let name = request
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| domain.to_string());
        Ok(NewSite { domain, name })
    }
}

/// Handle on the site used when neither an explicit site nor a request
/// host selects one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CurrentSite {
    Configured(SiteDomain),
    #[default]
    FirstRegistered,
}
