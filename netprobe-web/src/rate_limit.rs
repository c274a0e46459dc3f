//! Per-client fixed-window rate limiting.

use std::future::{Ready, ready};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use actix_service::{Service, Transform, forward_ready};
use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header::{HeaderMap, HeaderName, HeaderValue, RETRY_AFTER},
};
use dashmap::DashMap;
use futures::future::LocalBoxFuture;
use serde::Serialize;

use crate::client_ip::client_ip;
use crate::config::{RateLimitConfig, RateLimitRule};

pub const DNS_LIMIT_MESSAGE: &str = "Too many resource-intensive requests, please try again later.";
pub const PORT_SCAN_LIMIT_MESSAGE: &str = "Port scanning rate limit exceeded. Please try again later.";

/// Expired windows are swept every this many checks.
const PRUNE_EVERY: u64 = 1024;

const RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
const RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
const RATELIMIT_RESET: HeaderName = HeaderName::from_static("ratelimit-reset");

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    hits: u32,
}

/// Outcome of one rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Time until the client's window resets.
    pub reset_after: Duration,
}

impl Decision {
    fn reset_secs(&self) -> u64 {
        let secs = self.reset_after.as_secs();
        if self.reset_after.subsec_nanos() > 0 {
            secs + 1
        } else {
            secs
        }
    }

    fn apply_headers(&self, headers: &mut HeaderMap) {
        headers.insert(RATELIMIT_LIMIT, HeaderValue::from(self.limit));
        headers.insert(RATELIMIT_REMAINING, HeaderValue::from(self.remaining));
        headers.insert(RATELIMIT_RESET, HeaderValue::from(self.reset_secs()));
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RateLimitedBody<'a> {
    error: &'a str,
    retry_after: &'a str,
}

/// Fixed-window counter keyed by client address.
#[derive(Debug)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    message: &'static str,
    retry_after: String,
    windows: DashMap<String, Window>,
    checks: AtomicU64,
}

impl RateLimiter {
    pub fn new(rule: RateLimitRule, message: &'static str) -> Self {
        Self {
            limit: rule.max_requests,
            window: rule.window(),
            message,
            retry_after: describe_window(rule.window_secs),
            windows: DashMap::new(),
            checks: AtomicU64::new(0),
        }
    }

    pub fn check(&self, key: &str) -> Decision {
        self.check_at(key, Instant::now())
    }

    /// Count one request from `key` at `now`.
    pub fn check_at(&self, key: &str, now: Instant) -> Decision {
        if self.checks.fetch_add(1, Ordering::Relaxed) % PRUNE_EVERY == PRUNE_EVERY - 1 {
            self.prune(now);
        }

        let mut entry = self.windows.entry(key.to_string()).or_insert(Window {
            started: now,
            hits: 0,
        });
        if now.duration_since(entry.started) >= self.window {
            *entry = Window {
                started: now,
                hits: 0,
            };
        }

        let allowed = entry.hits < self.limit;
        if allowed {
            entry.hits += 1;
        }

        Decision {
            allowed,
            limit: self.limit,
            remaining: self.limit.saturating_sub(entry.hits),
            reset_after: self
                .window
                .saturating_sub(now.duration_since(entry.started)),
        }
    }

    /// Drop windows that have already expired.
    pub fn prune(&self, now: Instant) {
        self.windows
            .retain(|_, w| now.duration_since(w.started) < self.window);
    }

    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }

    fn rejection(&self, decision: &Decision) -> HttpResponse {
        let mut response = HttpResponse::TooManyRequests().json(RateLimitedBody {
            error: self.message,
            retry_after: &self.retry_after,
        });
        let headers = response.headers_mut();
        decision.apply_headers(headers);
        headers.insert(RETRY_AFTER, HeaderValue::from(decision.reset_secs()));
        response
    }
}

/// Human wording of a window length, e.g. `5 minutes`.
fn describe_window(secs: u64) -> String {
    match secs {
        60 => "1 minute".to_string(),
        s if s % 60 == 0 => format!("{} minutes", s / 60),
        1 => "1 second".to_string(),
        s => format!("{s} seconds"),
    }
}

/// Limiters for the two endpoint groups; `None` when limiting is disabled.
#[derive(Debug, Clone, Default)]
pub struct RateLimits {
    pub dns: Option<Arc<RateLimiter>>,
    pub port_scan: Option<Arc<RateLimiter>>,
}

impl RateLimits {
    pub fn from_config(config: &RateLimitConfig) -> Self {
        if !config.enabled {
            return Self::default();
        }
        Self {
            dns: Some(Arc::new(RateLimiter::new(config.dns, DNS_LIMIT_MESSAGE))),
            port_scan: Some(Arc::new(RateLimiter::new(
                config.port_scan,
                PORT_SCAN_LIMIT_MESSAGE,
            ))),
        }
    }
}

/// Middleware applying a [`RateLimiter`] to the wrapped resource.
pub struct RateLimit {
    limiter: Option<Arc<RateLimiter>>,
    trust_proxy: bool,
}

impl RateLimit {
    pub fn new(limiter: Option<Arc<RateLimiter>>, trust_proxy: bool) -> Self {
        Self {
            limiter,
            trust_proxy,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            limiter: self.limiter.clone(),
            trust_proxy: self.trust_proxy,
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    limiter: Option<Arc<RateLimiter>>,
    trust_proxy: bool,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let Some(limiter) = self.limiter.clone() else {
            let fut = self.service.call(req);
            return Box::pin(async move { Ok(fut.await?.map_into_left_body()) });
        };

        let key = client_ip(req.headers(), req.peer_addr(), self.trust_proxy);
        let decision = limiter.check(&key);

        if !decision.allowed {
            tracing::warn!(client = %key, path = req.path(), "Rate limit exceeded");
            let response = limiter.rejection(&decision);
            return Box::pin(async move { Ok(req.into_response(response).map_into_right_body()) });
        }

        let fut = self.service.call(req);
        Box::pin(async move {
            let mut res = fut.await?;
            decision.apply_headers(res.headers_mut());
            Ok(res.map_into_left_body())
        })
    }
}
