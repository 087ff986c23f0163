use async_trait::async_trait;
use std::sync::Arc;

use super::{
    errors::SiteConfigError,
    models::{EffectiveConfig, EmailConfiguration, EnvironmentDefaults, NewEmailConfiguration},
    ports::{ConfigurationService, EmailConfigurationRepository},
};
use crate::domain::site::{
    models::{CurrentSite, NewSite, RequestHost, Site, SiteDomain},
    ports::SiteRepository,
    resolver::{FallbackSiteResolver, SiteResolver},
};

pub struct Configurations<S, C>
where
    S: SiteRepository,
    C: EmailConfigurationRepository,
{
    pub sites: Arc<S>,
    pub configurations: Arc<C>,
    resolver: Arc<dyn SiteResolver>,
    defaults: EnvironmentDefaults,
}

impl<S, C> Configurations<S, C>
where
    S: SiteRepository,
    C: EmailConfigurationRepository,
{
    pub fn new(
        sites: Arc<S>,
        configurations: Arc<C>,
        defaults: EnvironmentDefaults,
        current_site: CurrentSite,
    ) -> Self {
        let resolver = Arc::new(FallbackSiteResolver::new(Arc::clone(&sites), current_site));
        Self {
            sites,
            configurations,
            resolver,
            defaults,
        }
    }

    /// Replaces the default precedence chain with a host-supplied one.
    pub fn with_site_resolver(mut self, resolver: Arc<dyn SiteResolver>) -> Self {
        self.resolver = resolver;
        self
    }
}

#[async_trait]
impl<S, C> ConfigurationService for Configurations<S, C>
where
    S: SiteRepository,
    C: EmailConfigurationRepository,
{
    #[tracing::instrument(
        name = "Resolve email configuration",
        skip(self),
        fields(site = tracing::field::Empty, source = tracing::field::Empty)
    )]
    async fn resolve(
        &self,
        explicit_site: Option<&SiteDomain>,
        request_host: Option<&RequestHost>,
    ) -> Result<EffectiveConfig, SiteConfigError> {
        let site = self
            .resolver
            .resolve_site(explicit_site, request_host)
            .await?;

        if let Some(site) = &site {
            tracing::Span::current().record("site", tracing::field::display(site));
            if let Some(configuration) = self.configurations.get_for_site(site).await? {
                tracing::Span::current().record("source", "site");
                return Ok(EffectiveConfig::from_site(configuration, &self.defaults));
            }
        }

        let config = EffectiveConfig::from_environment(site, &self.defaults).ok_or_else(|| {
            SiteConfigError::MissingConfiguration(
                "No email configuration found for the site and no default API key is set".into(),
            )
        })?;
        tracing::Span::current().record("source", "environment");
        Ok(config)
    }

    #[tracing::instrument(name = "Register a new site", skip(self, site), fields(domain = %site.domain))]
    async fn register_site(&self, site: NewSite) -> Result<Site, SiteConfigError> {
        self.sites.insert(site).await
    }

    async fn list_sites(&self) -> Result<Vec<Site>, SiteConfigError> {
        self.sites.list().await
    }

    #[tracing::instrument(name = "Delete a site", skip(self))]
    async fn delete_site(&self, domain: &SiteDomain) -> Result<(), SiteConfigError> {
        self.sites.delete(domain).await
    }

    #[tracing::instrument(name = "Create an email configuration", skip(self, configuration))]
    async fn create_configuration(
        &self,
        site: &SiteDomain,
        configuration: NewEmailConfiguration,
    ) -> Result<EmailConfiguration, SiteConfigError> {
        let site = self
            .sites
            .get_by_domain(site)
            .await?
            .ok_or_else(|| SiteConfigError::NotFound(format!("Site {} is not registered", site)))?;
        self.configurations
            .insert_configuration(&site, configuration)
            .await
    }

    async fn get_configuration(
        &self,
        site: &SiteDomain,
    ) -> Result<EmailConfiguration, SiteConfigError> {
        self.configurations
            .get_for_site(site)
            .await?
            .ok_or_else(|| {
                SiteConfigError::NotFound(format!("Site {} has no email configuration", site))
            })
    }

    async fn list_configurations(&self) -> Result<Vec<EmailConfiguration>, SiteConfigError> {
        self.configurations.list_configurations().await
    }

    #[tracing::instrument(name = "Update an email configuration", skip(self, configuration))]
    async fn update_configuration(
        &self,
        site: &SiteDomain,
        configuration: NewEmailConfiguration,
    ) -> Result<EmailConfiguration, SiteConfigError> {
        self.configurations
            .update_configuration(site, configuration)
            .await
    }

    #[tracing::instrument(name = "Delete an email configuration", skip(self))]
    async fn delete_configuration(&self, site: &SiteDomain) -> Result<(), SiteConfigError> {
        self.configurations.delete_configuration(site).await
    }
}
