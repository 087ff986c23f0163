use crate::{
    domain::{
        backend::models::EmailMessage,
        dispatch::{models::message::EmailRequest, ports::DispatchService},
        site::models::{RequestHost, SiteDomain},
    },
    inbound::http::{errors::AppError, state::SharedDispatchState},
};
use actix_web::{http::header, web, HttpRequest, HttpResponse};

#[derive(Debug, serde::Deserialize)]
pub struct SiteQuery {
    pub site: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub site: Option<String>,
    pub messages: Vec<EmailMessage>,
}

#[derive(Debug, serde::Serialize)]
pub struct BatchResponse {
    pub sent: usize,
}

/// Host of the inbound request. A missing or unparsable header yields `None`.
fn request_host(request: &HttpRequest) -> Option<RequestHost> {
    let value = request.headers().get(header::HOST)?.to_str().ok()?;
    match RequestHost::parse(value) {
        Ok(host) => Some(host),
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring unparsable Host header");
            None
        }
    }
}

fn explicit_site(site: Option<String>) -> Result<Option<SiteDomain>, AppError> {
    Ok(site
        .filter(|s| !s.trim().is_empty())
        .map(SiteDomain::parse)
        .transpose()?)
}

#[tracing::instrument(
    name = "Send an email",
    skip(body, query, state, request),
    fields(site = ?query.site)
)]
pub async fn send_email<DS: DispatchService>(
    body: web::Json<EmailRequest>,
    query: web::Query<SiteQuery>,
    state: web::Data<SharedDispatchState<DS>>,
    request: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let site = explicit_site(query.into_inner().site)?;
    let host = request_host(&request);

    state
        .dispatch_service()
        .send_for_site(body.into_inner(), site, host)
        .await?;

    Ok(HttpResponse::Ok().finish())
}

#[tracing::instrument(name = "Send a batch of emails", skip(body, state, request))]
pub async fn send_batch<DS: DispatchService>(
    body: web::Json<BatchRequest>,
    state: web::Data<SharedDispatchState<DS>>,
    request: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let batch = body.into_inner();
    let site = explicit_site(batch.site)?;
    let host = request_host(&request);

    let sent = state
        .backend()
        .send_messages(&batch.messages, site, host)
        .await;

    Ok(HttpResponse::Ok().json(BatchResponse { sent }))
}
