use actix_web::{HttpResponse, Responder};

use crate::dto::HealthResponse;

pub async fn health_check() -> impl Responder {
    tracing::debug!("Health check requested");
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
