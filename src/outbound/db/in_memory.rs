use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::domain::email_configuration::{
    errors::SiteConfigError,
    models::{EmailConfiguration, NewEmailConfiguration},
    ports::EmailConfigurationRepository,
};
use crate::domain::site::{
    models::{NewSite, Site, SiteDomain},
    ports::SiteRepository,
};

/// Process-local store with the same uniqueness and cascade rules as the
/// Postgres schema.
#[derive(Debug, Default)]
pub struct InMemoryDb {
    inner: Mutex<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    sites: Vec<Site>,
    configurations: Vec<EmailConfiguration>,
}

impl InMemoryDb {
    fn tables(&self) -> Result<MutexGuard<'_, Tables>, SiteConfigError> {
        self.inner
            .lock()
            .map_err(|_| SiteConfigError::Unexpected(anyhow::anyhow!("In-memory store is poisoned")))
    }
}

#[async_trait]
impl SiteRepository for InMemoryDb {
    async fn insert(&self, site: NewSite) -> Result<Site, SiteConfigError> {
        let mut tables = self.tables()?;
        if tables.sites.iter().any(|s| s.domain == site.domain) {
            return Err(SiteConfigError::Conflict(format!(
                "Site {} is already registered",
                site.domain
            )));
        }
        let site = Site {
            id: Uuid::new_v4(),
            domain: site.domain,
            name: site.name,
            registered_at: Utc::now(),
        };
        tables.sites.push(site.clone());
        Ok(site)
    }

    async fn get_by_domain(&self, domain: &SiteDomain) -> Result<Option<Site>, SiteConfigError> {
        Ok(self
            .tables()?
            .sites
            .iter()
            .find(|s| &s.domain == domain)
            .cloned())
    }

    async fn first_registered(&self) -> Result<Option<Site>, SiteConfigError> {
        // Insertion order is registration order.
        Ok(self.tables()?.sites.first().cloned())
    }

    async fn list(&self) -> Result<Vec<Site>, SiteConfigError> {
        Ok(self.tables()?.sites.clone())
    }

    async fn delete(&self, domain: &SiteDomain) -> Result<(), SiteConfigError> {
        let mut tables = self.tables()?;
        let before = tables.sites.len();
        tables.sites.retain(|s| &s.domain != domain);
        if tables.sites.len() == before {
            return Err(SiteConfigError::NotFound(format!(
                "Site {} is not registered",
                domain
            )));
        }
        tables.configurations.retain(|c| &c.site != domain);
        Ok(())
    }
}

#[async_trait]
impl EmailConfigurationRepository for InMemoryDb {
    async fn insert_configuration(
        &self,
        site: &Site,
        configuration: NewEmailConfiguration,
    ) -> Result<EmailConfiguration, SiteConfigError> {
        let mut tables = self.tables()?;
        if !tables.sites.iter().any(|s| s.id == site.id) {
            return Err(SiteConfigError::NotFound(format!(
                "Site {} is not registered",
                site.domain
            )));
        }
        if tables.configurations.iter().any(|c| c.site_id == site.id) {
            return Err(SiteConfigError::Conflict(format!(
                "Site {} already has an email configuration",
                site.domain
            )));
        }
        let now = Utc::now();
        let stored = EmailConfiguration {
            id: Uuid::new_v4(),
            site_id: site.id,
            site: site.domain.clone(),
            api_key: configuration.api_key,
            from_email: configuration.from_email,
            from_name: configuration.from_name,
            reply_to: configuration.reply_to,
            created_at: now,
            updated_at: now,
        };
        tables.configurations.push(stored.clone());
        Ok(stored)
    }

    async fn get_for_site(
        &self,
        site: &SiteDomain,
    ) -> Result<Option<EmailConfiguration>, SiteConfigError> {
        Ok(self
            .tables()?
            .configurations
            .iter()
            .find(|c| &c.site == site)
            .cloned())
    }

    async fn list_configurations(&self) -> Result<Vec<EmailConfiguration>, SiteConfigError> {
        Ok(self.tables()?.configurations.clone())
    }

    async fn update_configuration(
        &self,
        site: &SiteDomain,
        configuration: NewEmailConfiguration,
    ) -> Result<EmailConfiguration, SiteConfigError> {
        let mut tables = self.tables()?;
        let stored = tables
            .configurations
            .iter_mut()
            .find(|c| &c.site == site)
            .ok_or_else(|| {
                SiteConfigError::NotFound(format!("Site {} has no email configuration", site))
            })?;
        stored.api_key = configuration.api_key;
        stored.from_email = configuration.from_email;
        stored.from_name = configuration.from_name;
        stored.reply_to = configuration.reply_to;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete_configuration(&self, site: &SiteDomain) -> Result<(), SiteConfigError> {
        let mut tables = self.tables()?;
        let before = tables.configurations.len();
        tables.configurations.retain(|c| &c.site != site);
        if tables.configurations.len() == before {
            return Err(SiteConfigError::NotFound(format!(
                "Site {} has no email configuration",
                site
            )));
        }
        Ok(())
    }
}
