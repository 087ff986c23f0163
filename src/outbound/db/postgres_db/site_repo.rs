use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::*;
use crate::domain::site::{
    models::{NewSite, Site, SiteDomain},
    ports::SiteRepository,
};

#[derive(sqlx::FromRow)]
struct SiteRow {
    id: Uuid,
    domain: String,
    name: String,
    registered_at: DateTime<Utc>,
}

impl TryFrom<SiteRow> for Site {
    type Error = SiteConfigError;

    fn try_from(row: SiteRow) -> Result<Self, Self::Error> {
        Ok(Site {
            id: row.id,
            domain: SiteDomain::parse(row.domain)?,
            name: row.name,
            registered_at: row.registered_at,
        })
    }
}

#[async_trait]
impl SiteRepository for PostgresDb {
    #[tracing::instrument(name = "Saving new site in db", skip(self, site), fields(domain = %site.domain))]
    async fn insert(&self, site: NewSite) -> Result<Site, SiteConfigError> {
        let row = sqlx::query_as::<_, SiteRow>(
            r#"
        INSERT INTO sites (id, domain, name, registered_at)
        VALUES ($1, $2, $3, $4)
        RETURNING id, domain, name, registered_at
                "#,
        )
        .bind(Uuid::new_v4())
        .bind(site.domain.as_ref())
        .bind(&site.name)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, format!("Site {} is already registered", site.domain)))?;

        row.try_into()
    }

    #[tracing::instrument(name = "Get site from domain", skip(self))]
    async fn get_by_domain(&self, domain: &SiteDomain) -> Result<Option<Site>, SiteConfigError> {
        let row = sqlx::query_as::<_, SiteRow>(
            r#"SELECT id, domain, name, registered_at FROM sites WHERE domain = $1"#,
        )
        .bind(domain.as_ref())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to perform a query to retrieve a site.")?;

        row.map(Site::try_from).transpose()
    }

    #[tracing::instrument(name = "Get first registered site", skip(self))]
    async fn first_registered(&self) -> Result<Option<Site>, SiteConfigError> {
        let row = sqlx::query_as::<_, SiteRow>(
            r#"SELECT id, domain, name, registered_at FROM sites
            ORDER BY registered_at ASC, domain ASC LIMIT 1"#,
        )
        .fetch_optional(&self.pool)
        .await
        .context("Failed to perform a query to retrieve the first registered site.")?;

        row.map(Site::try_from).transpose()
    }

    #[tracing::instrument(name = "List sites", skip(self))]
    async fn list(&self) -> Result<Vec<Site>, SiteConfigError> {
        let rows = sqlx::query_as::<_, SiteRow>(
            r#"SELECT id, domain, name, registered_at FROM sites
            ORDER BY registered_at ASC, domain ASC"#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to perform a query to list sites.")?;

        let mut sites = Vec::with_capacity(rows.len());
        for row in rows {
            let domain = row.domain.clone();
            match Site::try_from(row) {
                Ok(site) => sites.push(site),
                Err(error) => {
                    tracing::warn!(
                        error.cause_chain = ?error,
                        site = %domain,
                        "Skipping a site. Its stored domain is invalid",
                    );
                }
            }
        }
        Ok(sites)
    }

    #[tracing::instrument(name = "Delete site", skip(self))]
    async fn delete(&self, domain: &SiteDomain) -> Result<(), SiteConfigError> {
        // email_configurations rows go with it through ON DELETE CASCADE
        let result = sqlx::query(r#"DELETE FROM sites WHERE domain = $1"#)
            .bind(domain.as_ref())
            .execute(&self.pool)
            .await
            .context("Failed to delete site from database")?;

        if result.rows_affected() == 0 {
            return Err(SiteConfigError::NotFound(format!(
                "Site {} is not registered",
                domain
            )));
        }
        Ok(())
    }
}
