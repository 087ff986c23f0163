use crate::configuration::ApplicationSettings;
use crate::domain::dispatch::ports::DispatchService;
use crate::domain::email_configuration::ports::ConfigurationService;
use crate::inbound::http::handlers::{
    create_configuration, delete_configuration, delete_site, get_configuration, health_check,
    list_configurations, list_sites, register_site, send_batch, send_email, update_configuration,
};
use crate::inbound::http::state::{SharedConfigurationState, SharedDispatchState};
use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

mod errors;
mod handlers;
pub mod state;

pub use errors::AppError;

pub struct Application<CS, DS>
where
    CS: ConfigurationService,
    DS: DispatchService,
{
    port: u16,
    server: Server,
    configuration_state: SharedConfigurationState<CS>,
    dispatch_state: SharedDispatchState<DS>,
}

fn run<CS: ConfigurationService, DS: DispatchService>(
    listener: TcpListener,
    configuration_state: SharedConfigurationState<CS>,
    dispatch_state: SharedDispatchState<DS>,
) -> Result<Server, std::io::Error> {
    let configuration_state = web::Data::new(configuration_state);
    let dispatch_state = web::Data::new(dispatch_state);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .app_data(dispatch_state.clone())
            .route("/emails", web::post().to(send_email::<DS>))
            .route("/emails/batch", web::post().to(send_batch::<DS>))
            .app_data(configuration_state.clone())
            .route("/sites", web::get().to(list_sites::<CS>))
            .route("/sites", web::post().to(register_site::<CS>))
            .route("/sites/{domain}", web::delete().to(delete_site::<CS>))
            .route("/configurations", web::get().to(list_configurations::<CS>))
            .route("/configurations", web::post().to(create_configuration::<CS>))
            .route(
                "/configurations/{site}",
                web::get().to(get_configuration::<CS>),
            )
            .route(
                "/configurations/{site}",
                web::put().to(update_configuration::<CS>),
            )
            .route(
                "/configurations/{site}",
                web::delete().to(delete_configuration::<CS>),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}

impl<CS, DS> Application<CS, DS>
where
    CS: ConfigurationService,
    DS: DispatchService,
{
    pub async fn build(
        configuration_service: Arc<CS>,
        dispatch_service: Arc<DS>,
        configuration: ApplicationSettings,
    ) -> Result<Self, std::io::Error> {
        let address = format!("{}:{}", configuration.host, configuration.port);
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();

        let configuration_state = SharedConfigurationState::new(configuration_service);
        let dispatch_state = SharedDispatchState::new(dispatch_service);

        let server: Server = run(
            listener,
            configuration_state.clone(),
            dispatch_state.clone(),
        )?;

        Ok(Self {
            port,
            server,
            configuration_state,
            dispatch_state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn configuration_state(&self) -> SharedConfigurationState<CS> {
        self.configuration_state.clone()
    }

    pub fn dispatch_state(&self) -> SharedDispatchState<DS> {
        self.dispatch_state.clone()
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}
