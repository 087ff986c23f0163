use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use uuid::Uuid;

use super::*;
use crate::domain::dispatch::models::email::{EmailAddress, SenderName};
use crate::domain::email_configuration::{
    models::{ApiKey, EmailConfiguration, NewEmailConfiguration},
    ports::EmailConfigurationRepository,
};
use crate::domain::site::models::{Site, SiteDomain};

const SELECT_CONFIGURATION: &str = r#"
    SELECT c.id, c.site_id, s.domain, c.api_key, c.from_email, c.from_name, c.reply_to,
           c.created_at, c.updated_at
    FROM email_configurations c
    JOIN sites s ON s.id = c.site_id"#;

#[derive(sqlx::FromRow)]
struct ConfigurationRow {
    id: Uuid,
    site_id: Uuid,
    domain: String,
    api_key: String,
    from_email: Option<String>,
    from_name: Option<String>,
    reply_to: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ConfigurationRow> for EmailConfiguration {
    type Error = SiteConfigError;

    fn try_from(row: ConfigurationRow) -> Result<Self, Self::Error> {
        Ok(EmailConfiguration {
            id: row.id,
            site_id: row.site_id,
            site: SiteDomain::parse(row.domain)?,
            api_key: ApiKey::parse(row.api_key)?,
            from_email: row.from_email.map(EmailAddress::parse).transpose()?,
            from_name: row.from_name.map(SenderName::parse).transpose()?,
            reply_to: row.reply_to.map(EmailAddress::parse).transpose()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl PostgresDb {
    async fn fetch_configuration(
        &self,
        id: Uuid,
    ) -> Result<EmailConfiguration, SiteConfigError> {
        let row = sqlx::query_as::<_, ConfigurationRow>(&format!(
            "{} WHERE c.id = $1",
            SELECT_CONFIGURATION
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to read back the stored email configuration.")?;

        row.try_into()
    }
}

#[async_trait]
impl EmailConfigurationRepository for PostgresDb {
    #[tracing::instrument(
        name = "Saving new email configuration in db",
        skip(self, site, configuration),
        fields(site = %site.domain)
    )]
    async fn insert_configuration(
        &self,
        site: &Site,
        configuration: NewEmailConfiguration,
    ) -> Result<EmailConfiguration, SiteConfigError> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        sqlx::query(
            r#"
        INSERT INTO email_configurations
            (id, site_id, api_key, from_email, from_name, reply_to, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
                "#,
        )
        .bind(id)
        .bind(site.id)
        .bind(configuration.api_key.as_secret().expose_secret())
        .bind(configuration.from_email.as_ref().map(|e| e.as_ref()))
        .bind(configuration.from_name.as_ref().map(|n| n.as_ref()))
        .bind(configuration.reply_to.as_ref().map(|e| e.as_ref()))
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_insert_error(
                e,
                format!("Site {} already has an email configuration", site.domain),
            )
        })?;

        self.fetch_configuration(id).await
    }

    #[tracing::instrument(name = "Get email configuration for site", skip(self))]
    async fn get_for_site(
        &self,
        site: &SiteDomain,
    ) -> Result<Option<EmailConfiguration>, SiteConfigError> {
        let row = sqlx::query_as::<_, ConfigurationRow>(&format!(
            "{} WHERE s.domain = $1",
            SELECT_CONFIGURATION
        ))
        .bind(site.as_ref())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to perform a query to retrieve an email configuration.")?;

        row.map(EmailConfiguration::try_from).transpose()
    }

    #[tracing::instrument(name = "List email configurations", skip(self))]
    async fn list_configurations(&self) -> Result<Vec<EmailConfiguration>, SiteConfigError> {
        let rows = sqlx::query_as::<_, ConfigurationRow>(&format!(
            "{} ORDER BY s.registered_at ASC, s.domain ASC",
            SELECT_CONFIGURATION
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to perform a query to list email configurations.")?;

        let mut configurations = Vec::with_capacity(rows.len());
        for row in rows {
            let domain = row.domain.clone();
            match EmailConfiguration::try_from(row) {
                Ok(configuration) => configurations.push(configuration),
                Err(error) => {
                    tracing::warn!(
                        error.cause_chain = ?error,
                        site = %domain,
                        "Skipping an email configuration. Its stored values are invalid",
                    );
                }
            }
        }
        Ok(configurations)
    }

    #[tracing::instrument(name = "Update email configuration", skip(self, configuration))]
    async fn update_configuration(
        &self,
        site: &SiteDomain,
        configuration: NewEmailConfiguration,
    ) -> Result<EmailConfiguration, SiteConfigError> {
        let updated = sqlx::query_scalar::<_, Uuid>(
            r#"
        UPDATE email_configurations c
        SET api_key = $1, from_email = $2, from_name = $3, reply_to = $4, updated_at = $5
        FROM sites s
        WHERE s.id = c.site_id AND s.domain = $6
        RETURNING c.id
                "#,
        )
        .bind(configuration.api_key.as_secret().expose_secret())
        .bind(configuration.from_email.as_ref().map(|e| e.as_ref()))
        .bind(configuration.from_name.as_ref().map(|n| n.as_ref()))
        .bind(configuration.reply_to.as_ref().map(|e| e.as_ref()))
        .bind(Utc::now())
        .bind(site.as_ref())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to update email configuration in database")?;

        match updated {
            Some(id) => self.fetch_configuration(id).await,
            None => Err(SiteConfigError::NotFound(format!(
                "Site {} has no email configuration",
                site
            ))),
        }
    }

    #[tracing::instrument(name = "Delete email configuration", skip(self))]
    async fn delete_configuration(&self, site: &SiteDomain) -> Result<(), SiteConfigError> {
        let result = sqlx::query(
            r#"DELETE FROM email_configurations c USING sites s
            WHERE s.id = c.site_id AND s.domain = $1"#,
        )
        .bind(site.as_ref())
        .execute(&self.pool)
        .await
        .context("Failed to delete email configuration from database")?;

        if result.rows_affected() == 0 {
            return Err(SiteConfigError::NotFound(format!(
                "Site {} has no email configuration",
                site
            )));
        }
        Ok(())
    }
}
