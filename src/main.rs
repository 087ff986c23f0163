use forward_email::configuration::get_configuration;
use forward_email::domain::dispatch::service::Dispatch;
use forward_email::domain::email_configuration::service::Configurations;
use forward_email::inbound::http::Application;
use forward_email::outbound::db::postgres_db::PostgresDb;
use forward_email::outbound::notifier::email_client::EmailClient;
use forward_email::outbound::telemetry::init_logger;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let configuration = get_configuration().expect("Failed to read configuration");
    init_logger("forward_email", &configuration.log_level(), std::io::stdout);

    let defaults = configuration
        .forward_email
        .defaults()
        .map_err(|e| anyhow::anyhow!("Invalid ForwardEmail defaults: {}", e))?;
    let current_site = configuration
        .forward_email
        .current_site()
        .map_err(|e| anyhow::anyhow!("Invalid current site: {}", e))?;

    let db = Arc::new(PostgresDb::new(&configuration.database));
    db.migrate().await?;

    let configurations = Arc::new(Configurations::new(
        Arc::clone(&db),
        Arc::clone(&db),
        defaults,
        current_site,
    ));
    let email_client = Arc::new(EmailClient::new(configuration.forward_email));
    let dispatch = Arc::new(Dispatch::new(Arc::clone(&configurations), email_client));

    let application = Application::build(configurations, dispatch, configuration.application).await?;
    tracing::info!(port = application.port(), "Listening");

    application.run_until_stopped().await?;
    Ok(())
}
