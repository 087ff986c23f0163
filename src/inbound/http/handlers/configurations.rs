use crate::{
    domain::{
        email_configuration::{
            models::{
                CreateEmailConfigurationRequest, EmailConfigurationRequest,
                EmailConfigurationView, NewEmailConfiguration,
            },
            ports::ConfigurationService,
        },
        site::models::SiteDomain,
    },
    inbound::http::{errors::AppError, state::SharedConfigurationState},
};
use actix_web::{web, HttpResponse};

#[tracing::instrument(
    name = "Create an email configuration",
    skip(body, state),
    fields(site = %body.site)
)]
pub async fn create_configuration<CS: ConfigurationService>(
    body: web::Json<CreateEmailConfigurationRequest>,
    state: web::Data<SharedConfigurationState<CS>>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();
    let site = SiteDomain::parse(request.site)?;
    let configuration = NewEmailConfiguration::try_from(request.configuration)?;

    let stored = state
        .configuration_service()
        .create_configuration(&site, configuration)
        .await?;

    Ok(HttpResponse::Created().json(EmailConfigurationView::from(&stored)))
}

pub async fn list_configurations<CS: ConfigurationService>(
    state: web::Data<SharedConfigurationState<CS>>,
) -> Result<HttpResponse, AppError> {
    let configurations = state.configuration_service().list_configurations().await?;
    let views: Vec<EmailConfigurationView> = configurations
        .iter()
        .map(EmailConfigurationView::from)
        .collect();

    Ok(HttpResponse::Ok().json(views))
}

pub async fn get_configuration<CS: ConfigurationService>(
    site: web::Path<String>,
    state: web::Data<SharedConfigurationState<CS>>,
) -> Result<HttpResponse, AppError> {
    let site = SiteDomain::parse(site.into_inner())?;
    let stored = state.configuration_service().get_configuration(&site).await?;

    Ok(HttpResponse::Ok().json(EmailConfigurationView::from(&stored)))
}

#[tracing::instrument(name = "Update an email configuration", skip(body, state))]
pub async fn update_configuration<CS: ConfigurationService>(
    site: web::Path<String>,
    body: web::Json<EmailConfigurationRequest>,
    state: web::Data<SharedConfigurationState<CS>>,
) -> Result<HttpResponse, AppError> {
    let site = SiteDomain::parse(site.into_inner())?;
    let configuration = NewEmailConfiguration::try_from(body.into_inner())?;

    let stored = state
        .configuration_service()
        .update_configuration(&site, configuration)
        .await?;

    Ok(HttpResponse::Ok().json(EmailConfigurationView::from(&stored)))
}

#[tracing::instrument(name = "Delete an email configuration", skip(state))]
pub async fn delete_configuration<CS: ConfigurationService>(
    site: web::Path<String>,
    state: web::Data<SharedConfigurationState<CS>>,
) -> Result<HttpResponse, AppError> {
    let site = SiteDomain::parse(site.into_inner())?;
    state
        .configuration_service()
        .delete_configuration(&site)
        .await?;

    Ok(HttpResponse::NoContent().finish())
}
