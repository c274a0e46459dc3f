use actix_web::{HttpResponse, web};
use netprobe_toolbox::PortQuery;
use tracing_attributes::instrument;

use crate::dto::PortScanRequest;
use crate::error::ApiError;
use crate::state::AppState;

/// `POST /api/port-scan` with `{ipAddress, port}`.
///
/// A closed or unreachable port is a normal `200` answer with `isOpen: false`.
#[instrument(name = "port_scan", skip_all, fields(host = %body.ip_address, port = body.port))]
pub async fn scan(
    state: web::Data<AppState>,
    body: web::Json<PortScanRequest>,
) -> Result<HttpResponse, ApiError> {
    let query = PortQuery::new(&body.ip_address, body.port).map_err(ApiError::port_scan)?;
    let result = state
        .toolbox
        .probe_port(&query)
        .await
        .map_err(ApiError::port_scan)?;
    tracing::debug!(open = result.open, "Port probe finished");
    Ok(HttpResponse::Ok().json(result))
}
