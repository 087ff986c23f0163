use forward_email::configuration::{
    get_configuration, ApplicationSettings, DatabaseSettings, ForwardEmailSettings,
};
use forward_email::domain::dispatch::service::Dispatch;
use forward_email::domain::email_configuration::models::EnvironmentDefaults;
use forward_email::domain::email_configuration::ports::ConfigurationService;
use forward_email::domain::email_configuration::service::Configurations;
use forward_email::domain::site::models::CurrentSite;
use forward_email::inbound::http::Application;
use forward_email::outbound::db::in_memory::InMemoryDb;
use forward_email::outbound::db::postgres_db::PostgresDb;
use forward_email::outbound::notifier::email_client::EmailClient;
use forward_email::outbound::telemetry::init_logger;
use once_cell::sync::Lazy;
use sqlx::{Connection, Executor, PgConnection, PgPool};
use std::sync::Arc;
use uuid::Uuid;
use wiremock::MockServer;

static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = get_configuration()
        .map(|c| c.general.log_level)
        .unwrap_or_else(|_| "info".into());
    let subscriber_name = "test".to_string();
    if std::env::var("TEST_LOG").is_ok() {
        init_logger(&subscriber_name, &default_filter_level, std::io::stdout);
    } else {
        init_logger(&subscriber_name, &default_filter_level, std::io::sink);
    }
});

pub struct TestApp {
    pub address: String,
    #[allow(dead_code)]
    pub port: u16,
    pub email_server: MockServer,
    pub api_client: reqwest::Client,
}

impl TestApp {
    pub async fn post_email(&self, body: &serde_json::Value) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/emails", &self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_email_for_site(
        &self,
        body: &serde_json::Value,
        site: &str,
    ) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/emails", &self.address))
            .query(&[("site", site)])
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_email_with_host(
        &self,
        body: &serde_json::Value,
        host: &str,
        site: Option<&str>,
    ) -> reqwest::Response {
        let mut request = self
            .api_client
            .post(&format!("{}/emails", &self.address))
            .header("Host", host)
            .json(body);
        if let Some(site) = site {
            request = request.query(&[("site", site)]);
        }
        request.send().await.expect("Failed to execute request.")
    }

    pub async fn post_batch(&self, body: &serde_json::Value) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/emails/batch", &self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_batch_with_host(
        &self,
        body: &serde_json::Value,
        host: &str,
    ) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/emails/batch", &self.address))
            .header("Host", host)
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_site(&self, domain: &str) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/sites", &self.address))
            .json(&serde_json::json!({ "domain": domain }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn delete_site(&self, domain: &str) -> reqwest::Response {
        self.api_client
            .delete(&format!("{}/sites/{}", &self.address, domain))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_configuration(&self, body: &serde_json::Value) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/configurations", &self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_configuration(&self, site: &str) -> reqwest::Response {
        self.api_client
            .get(&format!("{}/configurations/{}", &self.address, site))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn put_configuration(
        &self,
        site: &str,
        body: &serde_json::Value,
    ) -> reqwest::Response {
        self.api_client
            .put(&format!("{}/configurations/{}", &self.address, site))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn delete_configuration(&self, site: &str) -> reqwest::Response {
        self.api_client
            .delete(&format!("{}/configurations/{}", &self.address, site))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Registers `domain` and stores a configuration using `api_key`.
    pub async fn configure_site(&self, domain: &str, api_key: &str) {
        self.post_site(domain).await.error_for_status().unwrap();
        self.post_configuration(&serde_json::json!({
            "site": domain,
            "api_key": api_key,
            "from_email": format!("noreply@{}", domain),
        }))
        .await
        .error_for_status()
        .unwrap();
    }

    pub async fn get_email_request_bodies(&self) -> Vec<serde_json::Value> {
        self.email_server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .map(|r| serde_json::from_slice(&r.body).unwrap())
            .collect()
    }
}

pub fn basic_auth_header(api_key: &str) -> String {
    format!("Basic {}", base64::encode(format!("{}:", api_key)))
}

pub fn email_body(to: &str) -> serde_json::Value {
    serde_json::json!({
        "to": to,
        "subject": "Welcome aboard",
        "text": "Thanks for signing up.",
        "html": "<p>Thanks for signing up.</p>",
    })
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with_defaults(EnvironmentDefaults::default()).await
}

pub async fn spawn_app_with_defaults(defaults: EnvironmentDefaults) -> TestApp {
    Lazy::force(&TRACING);
    let email_server = MockServer::start().await;

    let db = Arc::new(InMemoryDb::default());
    let configurations = Arc::new(Configurations::new(
        Arc::clone(&db),
        db,
        defaults,
        CurrentSite::FirstRegistered,
    ));

    launch(configurations, email_server).await
}

/// A `TestApp` backed by a freshly created and migrated Postgres database.
pub struct PostgresTestApp {
    pub app: TestApp,
    pub db_pool: PgPool,
}

pub async fn spawn_postgres_app() -> PostgresTestApp {
    Lazy::force(&TRACING);
    let email_server = MockServer::start().await;
    let configuration = {
        let mut c = get_configuration().expect("Failed to read configuration");
        c.database.database_name = Uuid::new_v4().to_string();
        c
    };

    let db_pool = configure_database(&configuration.database).await;
    let db = Arc::new(PostgresDb::from_pool(db_pool.clone()));
    let configurations = Arc::new(Configurations::new(
        Arc::clone(&db),
        db,
        EnvironmentDefaults::default(),
        CurrentSite::FirstRegistered,
    ));

    PostgresTestApp {
        app: launch(configurations, email_server).await,
        db_pool,
    }
}

async fn launch<CS: ConfigurationService>(
    configurations: Arc<CS>,
    email_server: MockServer,
) -> TestApp {
    let email_client = Arc::new(EmailClient::new(ForwardEmailSettings {
        base_url: email_server.uri(),
        timeout_milliseconds: 200,
        api_key: None,
        from_email: None,
        from_name: None,
        reply_to: None,
        current_site: None,
    }));
    let dispatch = Arc::new(Dispatch::new(Arc::clone(&configurations), email_client));

    let application = Application::build(
        configurations,
        dispatch,
        ApplicationSettings {
            host: "127.0.0.1".into(),
            port: 0,
        },
    )
    .await
    .expect("Failed to build application");
    let application_port = application.port();
    let _ = tokio::spawn(application.run_until_stopped());

    TestApp {
        address: format!("http://127.0.0.1:{}", application_port),
        port: application_port,
        email_server,
        api_client: reqwest::Client::new(),
    }
}

pub async fn configure_database(config: &DatabaseSettings) -> PgPool {
    let mut connection = PgConnection::connect_with(&config.without_db())
        .await
        .expect("Failed to connect to Postgres");
    connection
        .execute(format!(r#"CREATE DATABASE "{}";"#, config.database_name).as_str())
        .await
        .expect("Failed to create database");

    let connection_pool = PgPool::connect_with(config.with_db())
        .await
        .expect("Failed to connect to Postgres");
    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .expect("Failed to migrate the database");

    connection_pool
}
