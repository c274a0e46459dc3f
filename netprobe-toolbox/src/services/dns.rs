//! DNS 查询模块 (hickory 后端)

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::TokioResolver;

use crate::error::ToolboxResult;
use crate::types::{DnsRecord, RecordType};

use super::resolver::{build_resolver_for_server, build_system_resolver, classify_resolve_error};
use super::RecordSource;

/// Record source backed by classic UDP/TCP DNS through hickory.
///
/// With no upstream configured the host's system resolver configuration is used.
/// A fresh resolver is built for every lookup.
#[derive(Debug, Clone)]
pub struct HickorySource {
    upstream: Option<SocketAddr>,
    timeout: Duration,
}

impl HickorySource {
    /// Source using the system resolver configuration.
    pub fn system(timeout: Duration) -> Self {
        Self {
            upstream: None,
            timeout,
        }
    }

    /// Source pinned to a single upstream resolver.
    pub fn with_upstream(upstream: SocketAddr, timeout: Duration) -> Self {
        Self {
            upstream: Some(upstream),
            timeout,
        }
    }

    fn resolver(&self) -> TokioResolver {
        match self.upstream {
            Some(server) => build_resolver_for_server(server, self.timeout),
            None => build_system_resolver(self.timeout),
        }
    }
}

#[async_trait]
impl RecordSource for HickorySource {
    async fn lookup(&self, domain: &str, record_type: RecordType) -> ToolboxResult<Vec<DnsRecord>> {
        let resolver = self.resolver();
        match record_type {
            RecordType::A => lookup_a(&resolver, domain).await,
            RecordType::Mx => lookup_mx(&resolver, domain).await,
            RecordType::Ns => lookup_ns(&resolver, domain).await,
        }
    }
}

/// Resolve IPv4 addresses through one specific upstream server.
pub(crate) async fn resolve_ipv4_via(
    server: SocketAddr,
    domain: &str,
    timeout: Duration,
) -> ToolboxResult<Vec<String>> {
    let resolver = build_resolver_for_server(server, timeout);
    let records = lookup_a(&resolver, domain).await?;
    Ok(records.into_iter().map(|r| r.value).collect())
}

async fn lookup_a(resolver: &TokioResolver, domain: &str) -> ToolboxResult<Vec<DnsRecord>> {
    let response = resolver
        .ipv4_lookup(domain)
        .await
        .map_err(|e| classify_resolve_error(domain, &e))?;
    Ok(response
        .iter()
        .map(|ip| DnsRecord::new(RecordType::A, ip.to_string()))
        .collect())
}

async fn lookup_mx(resolver: &TokioResolver, domain: &str) -> ToolboxResult<Vec<DnsRecord>> {
    let response = resolver
        .mx_lookup(domain)
        .await
        .map_err(|e| classify_resolve_error(domain, &e))?;
    // Resolver order is kept; callers wanting preference order sort themselves.
    Ok(response
        .iter()
        .map(|mx| DnsRecord::mx(trim_root(&mx.exchange().to_string()), mx.preference()))
        .collect())
}

async fn lookup_ns(resolver: &TokioResolver, domain: &str) -> ToolboxResult<Vec<DnsRecord>> {
    let response = resolver
        .ns_lookup(domain)
        .await
        .map_err(|e| classify_resolve_error(domain, &e))?;
    Ok(response
        .iter()
        .map(|ns| DnsRecord::new(RecordType::Ns, trim_root(&ns.to_string())))
        .collect())
}

/// Drop the trailing root label dot from a fully-qualified name.
pub(crate) fn trim_root(name: &str) -> String {
    name.trim_end_matches('.').to_string()
}
