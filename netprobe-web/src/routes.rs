use actix_cors::Cors;
use actix_web::{http::header, web};

use crate::error::ApiError;
use crate::handlers::{dns, health, ip, port_scan};
use crate::rate_limit::RateLimit;
use crate::state::AppState;

/// Register state, extractor error handlers and every route.
///
/// `/api/dns` and `/api/dns-resolve` share one rate-limit budget.
pub fn configure(cfg: &mut web::ServiceConfig, state: &AppState) {
    let trust_proxy = state.trust_proxy;
    let dns_limit = || RateLimit::new(state.limits.dns.clone(), trust_proxy);

    cfg.app_data(web::Data::new(state.clone()))
        .app_data(web::JsonConfig::default().error_handler(|err, _req| ApiError::malformed(err).into()))
        .app_data(
            web::QueryConfig::default().error_handler(|err, _req| ApiError::malformed(err).into()),
        )
        .service(
            web::resource("/api/dns")
                .wrap(dns_limit())
                .route(web::get().to(dns::lookup)),
        )
        .service(
            web::resource("/api/dns-resolve")
                .wrap(dns_limit())
                .route(web::post().to(dns::resolve)),
        )
        .service(
            web::resource("/api/port-scan")
                .wrap(RateLimit::new(state.limits.port_scan.clone(), trust_proxy))
                .route(web::post().to(port_scan::scan)),
        )
        .route("/api/ip", web::get().to(ip::whoami))
        .route("/", web::get().to(ip::whoami))
        .route("/txt", web::get().to(ip::txt))
        .route("/raw", web::get().to(ip::raw))
        .route("/health", web::get().to(health::health_check));
}

/// CORS policy: the configured origins (`*` for any), `GET`/`POST`/`OPTIONS`, `Content-Type`.
pub fn cors(allowed_origins: &[String]) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_header(header::CONTENT_TYPE)
        .max_age(3600);

    if allowed_origins.iter().any(|o| o == "*") {
        return cors.allow_any_origin();
    }
    allowed_origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}
