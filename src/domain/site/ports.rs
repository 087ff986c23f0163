use async_trait::async_trait;

use super::models::{NewSite, Site, SiteDomain};
use crate::domain::email_configuration::errors::SiteConfigError;

/// Represents a store of registered sites
#[async_trait]
pub trait SiteRepository: Send + Sync + 'static {
    /// Registers a new site. Fails with `Conflict` if the domain is taken.
    async fn insert(&self, site: NewSite) -> Result<Site, SiteConfigError>;

    async fn get_by_domain(&self, domain: &SiteDomain) -> Result<Option<Site>, SiteConfigError>;

    /// Earliest registered site, used as the default current site.
    async fn first_registered(&self) -> Result<Option<Site>, SiteConfigError>;

    async fn list(&self) -> Result<Vec<Site>, SiteConfigError>;

    /// Removes a site together with its email configuration.
    async fn delete(&self, domain: &SiteDomain) -> Result<(), SiteConfigError>;
}
