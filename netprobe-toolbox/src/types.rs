//! Public types accepted and returned by toolbox operations.

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ToolboxError, ToolboxResult};
use crate::utils::datetime;
use crate::validate;

/// Resolver used by [`ResolverQuery`] when the caller does not name one (Google Public DNS).
pub const DEFAULT_RESOLVER_ADDRESS: &str = "8.8.8.8";

/// DNS record type supported by [`LookupRecords`](crate::ToolboxService::lookup_records).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    /// IPv4 address record.
    A,
    /// Mail exchange record.
    Mx,
    /// Name server record.
    Ns,
}

impl RecordType {
    /// TTL reported for every record of this type.
    ///
    /// These are fixed policy values, not the TTL the resolver received: neither
    /// lookup backend surfaces live TTLs consistently, so results always carry
    /// 3600 s for A / MX and 86400 s for NS.
    #[must_use]
    pub const fn policy_ttl(self) -> u32 {
        match self {
            Self::A | Self::Mx => 3600,
            Self::Ns => 86400,
        }
    }

    /// Numeric RR type code (RFC 1035).
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::A => 1,
            Self::Ns => 2,
            Self::Mx => 15,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::Mx => write!(f, "MX"),
            Self::Ns => write!(f, "NS"),
        }
    }
}

impl FromStr for RecordType {
    type Err = ToolboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(Self::A),
            "MX" => Ok(Self::Mx),
            "NS" => Ok(Self::Ns),
            _ => Err(ToolboxError::InvalidRecordType(s.to_string())),
        }
    }
}

/// A single DNS answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// IPv4 address (A) or host name without the trailing root dot (MX / NS).
    pub value: String,
    /// Policy TTL in seconds, see [`RecordType::policy_ttl`].
    pub ttl: u32,
    /// Preference, MX records only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
}

impl DnsRecord {
    pub(crate) fn new(record_type: RecordType, value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ttl: record_type.policy_ttl(),
            priority: None,
        }
    }

    pub(crate) fn mx(exchange: impl Into<String>, priority: u16) -> Self {
        Self {
            priority: Some(priority),
            ..Self::new(RecordType::Mx, exchange)
        }
    }
}

/// Validated record lookup request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainQuery {
    domain: String,
    record_type: RecordType,
}

impl DomainQuery {
    /// Build a query from raw user input.
    ///
    /// The record type is checked first, so an unsupported type is reported as
    /// [`ToolboxError::InvalidRecordType`] whatever the domain looks like.
    pub fn new(domain: &str, record_type: &str) -> ToolboxResult<Self> {
        let record_type: RecordType = record_type.parse()?;
        Self::with_type(domain, record_type)
    }

    /// Build a query for an already-typed record type.
    pub fn with_type(domain: &str, record_type: RecordType) -> ToolboxResult<Self> {
        Ok(Self {
            domain: validate::normalize_domain(domain)?,
            record_type,
        })
    }

    /// Normalised ASCII domain.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn record_type(&self) -> RecordType {
        self.record_type
    }
}

/// Validated request to resolve A records through a specific recursive resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverQuery {
    domain: String,
    resolver_address: String,
    server: SocketAddr,
}

impl ResolverQuery {
    /// Build a query from raw user input. An absent or blank `resolver_address`
    /// falls back to [`DEFAULT_RESOLVER_ADDRESS`].
    pub fn new(domain: &str, resolver_address: Option<&str>) -> ToolboxResult<Self> {
        let domain = validate::normalize_domain(domain)?;
        let resolver_address = resolver_address
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_RESOLVER_ADDRESS)
            .to_string();
        let server = validate::parse_resolver_address(&resolver_address)?;
        Ok(Self {
            domain,
            resolver_address,
            server,
        })
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Resolver address as supplied (or the default), echoed back in results.
    pub fn resolver_address(&self) -> &str {
        &self.resolver_address
    }

    /// Socket address the request-scoped resolver is bound to.
    pub fn server(&self) -> SocketAddr {
        self.server
    }
}

/// Validated TCP reachability request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortQuery {
    host: String,
    port: u16,
}

impl PortQuery {
    /// Build a query from raw user input; `port` must lie in `1..=65535`.
    ///
    /// The port is taken as `i64` so out-of-range input from the wire can be
    /// rejected here rather than silently truncated.
    pub fn new(host: &str, port: i64) -> ToolboxResult<Self> {
        let host = validate::normalize_host(host)?;
        let port = validate::validate_port(port)?;
        Ok(Self { host, port })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

/// Outcome of a single port probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    /// Probed host as given by the caller.
    #[serde(rename = "ipAddress")]
    pub host: String,
    pub port: u16,
    /// `true` when a TCP connection was established within the timeout.
    #[serde(rename = "isOpen")]
    pub open: bool,
    #[serde(with = "datetime")]
    pub timestamp: DateTime<Utc>,
}

/// A records returned by a caller-selected resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveResult {
    pub domain: String,
    /// Resolver that answered (the default when none was requested).
    #[serde(rename = "dnsServer")]
    pub resolver_address: String,
    /// IPv4 addresses in the order the resolver returned them.
    #[serde(rename = "ipAddresses")]
    pub addresses: Vec<String>,
    #[serde(with = "datetime")]
    pub timestamp: DateTime<Utc>,
}
