//! Request-scoped DNS resolver construction.
//!
//! Every lookup builds its own [`TokioResolver`]; nothing here is shared between
//! requests, so a caller-selected upstream can never leak into another request.

use std::net::SocketAddr;
use std::time::Duration;

use hickory_resolver::{
    config::{NameServerConfigGroup, ResolverConfig, ResolverOpts},
    name_server::TokioConnectionProvider,
    proto::{op::ResponseCode, ProtoErrorKind},
    ResolveError, TokioResolver,
};

use crate::error::ToolboxError;

/// Resolver options for one-shot diagnostic lookups: no answer cache, bounded per-attempt timeout.
fn probe_options(opts: &mut ResolverOpts, timeout: Duration) {
    opts.cache_size = 0;
    opts.timeout = timeout;
}

/// Build a resolver bound to exactly one upstream server (UDP with TCP fallback).
pub(crate) fn build_resolver_for_server(server: SocketAddr, timeout: Duration) -> TokioResolver {
    let config = ResolverConfig::from_parts(
        None,
        vec![],
        NameServerConfigGroup::from_ips_clear(&[server.ip()], server.port(), true),
    );
    let mut opts = ResolverOpts::default();
    probe_options(&mut opts, timeout);
    TokioResolver::builder_with_config(config, TokioConnectionProvider::default())
        .with_options(opts)
        .build()
}

/// Build a resolver using the host system DNS configuration.
///
/// Falls back to Hickory's default upstream set (Google Public DNS) when the
/// system configuration cannot be read.
pub(crate) fn build_system_resolver(timeout: Duration) -> TokioResolver {
    #[cfg(any(unix, target_os = "windows"))]
    {
        if let Ok(mut builder) = TokioResolver::builder_tokio() {
            probe_options(builder.options_mut(), timeout);
            return builder.build();
        }
    }

    let mut opts = ResolverOpts::default();
    probe_options(&mut opts, timeout);
    TokioResolver::builder_with_config(ResolverConfig::default(), TokioConnectionProvider::default())
        .with_options(opts)
        .build()
}

/// Response code of a negative answer, if the error is one.
fn negative_response_code(err: &ResolveError) -> Option<ResponseCode> {
    let proto = err.proto()?;
    match proto.kind() {
        ProtoErrorKind::NoRecordsFound { response_code, .. } => Some(*response_code),
        _ => None,
    }
}

/// Classify a resolver failure.
///
/// Only NXDOMAIN means the name does not exist. An empty NOERROR answer
/// (NODATA), SERVFAIL, REFUSED, timeouts and transport errors are resolution
/// failures.
pub(crate) fn classify_resolve_error(domain: &str, err: &ResolveError) -> ToolboxError {
    match negative_response_code(err) {
        Some(ResponseCode::NXDomain) => ToolboxError::DomainNotFound(domain.to_string()),
        Some(ResponseCode::NoError) => {
            ToolboxError::ResolutionError(format!("No records of the requested type for {domain}"))
        }
        _ => ToolboxError::ResolutionError(err.to_string()),
    }
}
