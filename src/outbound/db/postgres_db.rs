use crate::configuration::DatabaseSettings;
use crate::domain::email_configuration::errors::SiteConfigError;
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

mod configuration_repo;
mod site_repo;

#[derive(Clone, Debug)]
pub struct PostgresDb {
    pool: PgPool,
}

impl PostgresDb {
    pub fn new(configuration: &DatabaseSettings) -> PostgresDb {
        PostgresDb {
            pool: PgPoolOptions::new()
                .acquire_timeout(std::time::Duration::from_secs(2))
                .connect_lazy_with(configuration.with_db()),
        }
    }

    pub fn from_pool(pool: PgPool) -> PostgresDb {
        PostgresDb { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    #[tracing::instrument(name = "Run database migrations", skip(self))]
    pub async fn migrate(&self) -> Result<(), anyhow::Error> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to migrate the database")
    }
}

/// Maps a unique-constraint violation to `Conflict`, anything else to `Unexpected`.
fn map_insert_error(error: sqlx::Error, conflict: String) -> SiteConfigError {
    match &error {
        sqlx::Error::Database(db_error) if db_error.is_unique_violation() => {
            SiteConfigError::Conflict(conflict)
        }
        _ => SiteConfigError::Unexpected(anyhow::Error::from(error)),
    }
}
