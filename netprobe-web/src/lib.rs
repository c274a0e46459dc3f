//! netprobe HTTP API: DNS record lookups, custom-resolver resolution, TCP port
//! probes and client address echo on top of `netprobe-toolbox`.

pub mod client_ip;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod rate_limit;
pub mod request_log;
pub mod routes;
pub mod state;
