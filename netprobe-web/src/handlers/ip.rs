//! "What is my IP" endpoints.

use actix_web::{HttpRequest, HttpResponse, http::header::ContentType, web};
use netprobe_toolbox::utils::datetime::now_millis;

use crate::client_ip::{client_ip, is_cli_user_agent, user_agent};
use crate::dto::IpInfoResponse;
use crate::state::AppState;

fn requester_ip(req: &HttpRequest, state: &AppState) -> String {
    client_ip(req.headers(), req.peer_addr(), state.trust_proxy)
}

fn plain(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body(body)
}

/// Plain address for CLI clients, JSON for everyone else.
fn ip_info(req: &HttpRequest, state: &AppState) -> HttpResponse {
    let ip = requester_ip(req, state);
    let user_agent = user_agent(req.headers());
    if is_cli_user_agent(&user_agent) {
        return plain(ip);
    }
    HttpResponse::Ok().json(IpInfoResponse {
        ip,
        user_agent,
        timestamp: now_millis(),
    })
}

/// `GET /api/ip` and `GET /`
pub async fn whoami(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    ip_info(&req, &state)
}

/// `GET /txt`: address followed by a newline.
pub async fn txt(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    plain(format!("{}\n", requester_ip(&req, &state)))
}

/// `GET /raw`: bare address.
pub async fn raw(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    plain(requester_ip(&req, &state))
}
