use async_trait::async_trait;
use std::sync::Arc;

use super::models::{CurrentSite, RequestHost, SiteDomain};
use super::ports::SiteRepository;
use crate::domain::email_configuration::errors::SiteConfigError;

/// Picks the site a dispatch runs for.
///
/// Implementations must honour the precedence: explicit site, then the
/// request host, then the current site. `Ok(None)` means no site could be
/// chosen and the caller falls back to environment defaults.
#[async_trait]
pub trait SiteResolver: Send + Sync + 'static {
    async fn resolve_site(
        &self,
        explicit_site: Option<&SiteDomain>,
        request_host: Option<&RequestHost>,
    ) -> Result<Option<SiteDomain>, SiteConfigError>;
}

#[derive(Debug)]
pub struct FallbackSiteResolver<S>
where
    S: SiteRepository,
{
    sites: Arc<S>,
    current_site: CurrentSite,
}

impl<S> FallbackSiteResolver<S>
where
    S: SiteRepository,
{
    pub fn new(sites: Arc<S>, current_site: CurrentSite) -> Self {
        Self {
            sites,
            current_site,
        }
    }
}

#[async_trait]
impl<S> SiteResolver for FallbackSiteResolver<S>
where
    S: SiteRepository,
{
    #[tracing::instrument(name = "Resolve site", skip(self))]
    async fn resolve_site(
        &self,
        explicit_site: Option<&SiteDomain>,
        request_host: Option<&RequestHost>,
    ) -> Result<Option<SiteDomain>, SiteConfigError> {
        if let Some(site) = explicit_site {
            return Ok(Some(site.clone()));
        }

        if let Some(host) = request_host {
            if let Some(site) = self.sites.get_by_domain(host.domain()).await? {
                return Ok(Some(site.domain));
            }
            tracing::debug!(host = %host.domain(), "No site registered for request host");
        }

        match &self.current_site {
            CurrentSite::Configured(domain) => Ok(Some(domain.clone())),
            CurrentSite::FirstRegistered => {
                Ok(self.sites.first_registered().await?.map(|s| s.domain))
            }
        }
    }
}
