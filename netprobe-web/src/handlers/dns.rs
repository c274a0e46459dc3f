use actix_web::{HttpResponse, web};
use netprobe_toolbox::{DomainQuery, ResolverQuery};
use tracing_attributes::instrument;

use crate::dto::{DnsLookupParams, DnsLookupResponse, DnsResolveRequest};
use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/dns?domain=..&type=A|MX|NS`
#[instrument(name = "dns_lookup", skip_all, fields(domain = %params.domain, record_type = %params.record_type))]
pub async fn lookup(
    state: web::Data<AppState>,
    params: web::Query<DnsLookupParams>,
) -> Result<HttpResponse, ApiError> {
    let query = DomainQuery::new(&params.domain, &params.record_type).map_err(ApiError::lookup)?;
    let results = state
        .toolbox
        .lookup_records(&query)
        .await
        .map_err(ApiError::lookup)?;

    Ok(HttpResponse::Ok().json(DnsLookupResponse {
        domain: query.domain().to_string(),
        record_type: query.record_type(),
        results,
        timestamp: netprobe_toolbox::utils::datetime::now_millis(),
    }))
}

/// `POST /api/dns-resolve` with `{domain, dnsServer?}`
#[instrument(name = "dns_resolve", skip_all, fields(domain = %body.domain))]
pub async fn resolve(
    state: web::Data<AppState>,
    body: web::Json<DnsResolveRequest>,
) -> Result<HttpResponse, ApiError> {
    let query =
        ResolverQuery::new(&body.domain, body.dns_server.as_deref()).map_err(ApiError::resolve)?;
    let result = state
        .toolbox
        .resolve_with_server(&query)
        .await
        .map_err(ApiError::resolve)?;
    Ok(HttpResponse::Ok().json(result))
}
