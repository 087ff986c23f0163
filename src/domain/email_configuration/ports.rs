use async_trait::async_trait;

use super::{
    errors::SiteConfigError,
    models::{EffectiveConfig, EmailConfiguration, NewEmailConfiguration},
};
use crate::domain::site::models::{NewSite, RequestHost, Site, SiteDomain};

/// Represents a store of per-site email configurations
#[async_trait]
pub trait EmailConfigurationRepository: Send + Sync + 'static {
    /// Stores the configuration of `site`. Fails with `Conflict` if the site
    /// already has one.
    async fn insert_configuration(
        &self,
        site: &Site,
        configuration: NewEmailConfiguration,
    ) -> Result<EmailConfiguration, SiteConfigError>;

    async fn get_for_site(
        &self,
        site: &SiteDomain,
    ) -> Result<Option<EmailConfiguration>, SiteConfigError>;

    async fn list_configurations(&self) -> Result<Vec<EmailConfiguration>, SiteConfigError>;

    async fn update_configuration(
        &self,
        site: &SiteDomain,
        configuration: NewEmailConfiguration,
    ) -> Result<EmailConfiguration, SiteConfigError>;

    async fn delete_configuration(&self, site: &SiteDomain) -> Result<(), SiteConfigError>;
}

#[async_trait]
pub trait ConfigurationService: Send + Sync + 'static {
    /// Applies the fallback chain and loads the credentials to dispatch with.
    async fn resolve(
        &self,
        explicit_site: Option<&SiteDomain>,
        request_host: Option<&RequestHost>,
    ) -> Result<EffectiveConfig, SiteConfigError>;

    async fn register_site(&self, site: NewSite) -> Result<Site, SiteConfigError>;

    async fn list_sites(&self) -> Result<Vec<Site>, SiteConfigError>;

    async fn delete_site(&self, domain: &SiteDomain) -> Result<(), SiteConfigError>;

    async fn create_configuration(
        &self,
        site: &SiteDomain,
        configuration: NewEmailConfiguration,
    ) -> Result<EmailConfiguration, SiteConfigError>;

    async fn get_configuration(
        &self,
        site: &SiteDomain,
    ) -> Result<EmailConfiguration, SiteConfigError>;

    async fn list_configurations(&self) -> Result<Vec<EmailConfiguration>, SiteConfigError>;

    async fn update_configuration(
        &self,
        site: &SiteDomain,
        configuration: NewEmailConfiguration,
    ) -> Result<EmailConfiguration, SiteConfigError>;

    async fn delete_configuration(&self, site: &SiteDomain) -> Result<(), SiteConfigError>;
}
