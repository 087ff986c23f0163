use crate::{
    domain::{
        email_configuration::ports::ConfigurationService,
        site::models::{NewSite, NewSiteRequest, SiteDomain},
    },
    inbound::http::{errors::AppError, state::SharedConfigurationState},
};
use actix_web::{web, HttpResponse};

#[tracing::instrument(
    name = "Register a site",
    skip(body, state),
    fields(domain = %body.domain)
)]
pub async fn register_site<CS: ConfigurationService>(
    body: web::Json<NewSiteRequest>,
    state: web::Data<SharedConfigurationState<CS>>,
) -> Result<HttpResponse, AppError> {
    let new_site = NewSite::try_from(body.into_inner())?;
    let site = state.configuration_service().register_site(new_site).await?;

    Ok(HttpResponse::Created().json(site))
}

pub async fn list_sites<CS: ConfigurationService>(
    state: web::Data<SharedConfigurationState<CS>>,
) -> Result<HttpResponse, AppError> {
    let sites = state.configuration_service().list_sites().await?;

    Ok(HttpResponse::Ok().json(sites))
}

#[tracing::instrument(name = "Delete a site", skip(state))]
pub async fn delete_site<CS: ConfigurationService>(
    domain: web::Path<String>,
    state: web::Data<SharedConfigurationState<CS>>,
) -> Result<HttpResponse, AppError> {
    let domain = SiteDomain::parse(domain.into_inner())?;
    state.configuration_service().delete_site(&domain).await?;

    Ok(HttpResponse::NoContent().finish())
}
