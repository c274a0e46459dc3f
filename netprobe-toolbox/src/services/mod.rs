//! Service façade exposing the toolbox operations.
//!
//! [`ToolboxService`] is cheap to clone and holds no per-request state: every
//! lookup builds its own resolver, and every operation runs in its own task so a
//! panic or hang in one request cannot take down another.

mod dns;
mod doh;
mod port;
mod resolver;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{ToolboxError, ToolboxResult};
use crate::types::{DnsRecord, DomainQuery, PortQuery, ProbeResult, RecordType, ResolveResult, ResolverQuery};
use crate::utils::datetime::now_millis;

pub use dns::HickorySource;
pub use doh::{DohSource, DEFAULT_DOH_ENDPOINT};
pub use port::PROBE_TIMEOUT;

/// Default per-lookup DNS budget.
pub const DEFAULT_DNS_TIMEOUT: Duration = Duration::from_secs(5);

/// Backend answering [`ToolboxService::lookup_records`].
///
/// Implementations must return records of the requested type only, with the
/// policy TTL applied. NXDOMAIN maps to [`ToolboxError::DomainNotFound`]; an
/// empty answer for an existing name maps to [`ToolboxError::ResolutionError`].
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn lookup(&self, domain: &str, record_type: RecordType) -> ToolboxResult<Vec<DnsRecord>>;
}

/// Which record source a [`ToolboxService`] is built with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LookupBackend {
    /// UDP/TCP DNS using the host's resolver configuration.
    #[default]
    System,
    /// JSON DNS-over-HTTPS against the given endpoint.
    DnsOverHttps { endpoint: String },
}

/// Construction options for [`ToolboxService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolboxOptions {
    pub backend: LookupBackend,
    /// Overall budget for one lookup or custom-resolver resolution.
    pub dns_timeout: Duration,
}

impl Default for ToolboxOptions {
    fn default() -> Self {
        Self {
            backend: LookupBackend::System,
            dns_timeout: DEFAULT_DNS_TIMEOUT,
        }
    }
}

/// Entry point for all network diagnostic operations.
///
/// ```rust,no_run
/// use netprobe_toolbox::{DomainQuery, ToolboxService};
/// # async fn demo() -> netprobe_toolbox::ToolboxResult<()> {
/// let service = ToolboxService::default();
/// let query = DomainQuery::new("example.com", "MX")?;
/// let records = service.lookup_records(&query).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ToolboxService {
    records: Arc<dyn RecordSource>,
    dns_timeout: Duration,
}

impl std::fmt::Debug for ToolboxService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolboxService")
            .field("dns_timeout", &self.dns_timeout)
            .finish_non_exhaustive()
    }
}

impl Default for ToolboxService {
    fn default() -> Self {
        Self::with_record_source(
            Arc::new(HickorySource::system(DEFAULT_DNS_TIMEOUT)),
            DEFAULT_DNS_TIMEOUT,
        )
    }
}

impl ToolboxService {
    /// Build a service from options.
    ///
    /// Fails only when the DNS-over-HTTPS client cannot be created.
    pub fn new(options: &ToolboxOptions) -> ToolboxResult<Self> {
        let records: Arc<dyn RecordSource> = match &options.backend {
            LookupBackend::System => Arc::new(HickorySource::system(options.dns_timeout)),
            LookupBackend::DnsOverHttps { endpoint } => {
                Arc::new(DohSource::new(endpoint.clone(), options.dns_timeout)?)
            }
        };
        Ok(Self::with_record_source(records, options.dns_timeout))
    }

    /// Build a service around a caller-provided record source.
    pub fn with_record_source(records: Arc<dyn RecordSource>, dns_timeout: Duration) -> Self {
        Self {
            records,
            dns_timeout,
        }
    }

    /// Look up A, MX or NS records for a domain.
    ///
    /// Every record carries the policy TTL of its type; MX records also carry
    /// their preference. Only NXDOMAIN is reported as
    /// [`ToolboxError::DomainNotFound`]; an empty answer is a
    /// [`ToolboxError::ResolutionError`], never an empty list.
    pub async fn lookup_records(&self, query: &DomainQuery) -> ToolboxResult<Vec<DnsRecord>> {
        let records = Arc::clone(&self.records);
        let domain = query.domain().to_string();
        let record_type = query.record_type();

        let found = run_isolated(self.dns_timeout, "DNS lookup", async move {
            records.lookup(&domain, record_type).await
        })
        .await??;

        if found.is_empty() {
            return Err(ToolboxError::ResolutionError(format!(
                "No {record_type} records for {}",
                query.domain()
            )));
        }
        Ok(found)
    }

    /// Resolve IPv4 addresses through the resolver named in the query.
    ///
    /// The resolver is built for this call alone, so concurrent calls naming
    /// different resolvers never observe each other's choice.
    pub async fn resolve_with_server(&self, query: &ResolverQuery) -> ToolboxResult<ResolveResult> {
        let server = query.server();
        let domain = query.domain().to_string();
        let budget = self.dns_timeout;

        let addresses = run_isolated(budget, "DNS resolution", async move {
            dns::resolve_ipv4_via(server, &domain, budget).await
        })
        .await??;

        if addresses.is_empty() {
            return Err(ToolboxError::ResolutionError(format!(
                "No A records for {}",
                query.domain()
            )));
        }

        Ok(ResolveResult {
            domain: query.domain().to_string(),
            resolver_address: query.resolver_address().to_string(),
            addresses,
            timestamp: now_millis(),
        })
    }

    /// Check whether a TCP connection to `host:port` can be established
    /// within [`PROBE_TIMEOUT`].
    ///
    /// A closed or unreachable port is a successful probe with `open == false`.
    pub async fn probe_port(&self, query: &PortQuery) -> ToolboxResult<ProbeResult> {
        let query = query.clone();
        // The connect itself is bounded by PROBE_TIMEOUT; the outer budget only
        // guards against a stuck task.
        let budget = PROBE_TIMEOUT + Duration::from_secs(1);
        run_isolated(budget, "port probe", async move {
            port::probe_port(&query, PROBE_TIMEOUT).await
        })
        .await
    }
}

/// Run `fut` on its own task, bounded by `budget`.
///
/// Exceeding the budget is a [`ToolboxError::ResolutionError`]; a panicked or
/// cancelled task is a [`ToolboxError::Internal`].
async fn run_isolated<T, F>(budget: Duration, what: &str, fut: F) -> ToolboxResult<T>
where
    T: Send + 'static,
    F: Future<Output = T> + Send + 'static,
{
    let handle = tokio::spawn(fut);
    let abort = handle.abort_handle();

    match tokio::time::timeout(budget, handle).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(ToolboxError::Internal(format!("{what} task failed: {e}"))),
        Err(_) => {
            abort.abort();
            Err(ToolboxError::ResolutionError(format!(
                "{what} timed out after {}ms",
                budget.as_millis()
            )))
        }
    }
}
