//! DNS-over-HTTPS record source (JSON API, as served by Google and Cloudflare).

use std::net::Ipv4Addr;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{ToolboxError, ToolboxResult};
use crate::types::{DnsRecord, RecordType};

use super::dns::trim_root;
use super::RecordSource;

/// Google Public DNS JSON endpoint.
pub const DEFAULT_DOH_ENDPOINT: &str = "https://dns.google/resolve";

/// DNS RCODE for "no such name".
const RCODE_NXDOMAIN: u32 = 3;

/// Response structure of the `application/dns-json` API.
#[derive(Debug, Deserialize)]
struct DohResponse {
    #[serde(rename = "Status")]
    status: u32,
    #[serde(rename = "Answer", default)]
    answer: Vec<DohAnswer>,
}

#[derive(Debug, Deserialize)]
struct DohAnswer {
    #[serde(rename = "type")]
    record_type: u16,
    data: String,
}

/// Record source resolving over HTTPS.
#[derive(Debug, Clone)]
pub struct DohSource {
    client: reqwest::Client,
    endpoint: String,
}

impl DohSource {
    /// Create a source for the given JSON endpoint; `timeout` bounds each HTTP request.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> ToolboxResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("netprobe/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ToolboxError::Internal(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl RecordSource for DohSource {
    async fn lookup(&self, domain: &str, record_type: RecordType) -> ToolboxResult<Vec<DnsRecord>> {
        let type_name = record_type.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("name", domain), ("type", type_name.as_str())])
            .header(reqwest::header::ACCEPT, "application/dns-json")
            .send()
            .await
            .map_err(|e| ToolboxError::ResolutionError(format!("DoH request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ToolboxError::ResolutionError(format!(
                "DoH server returned status: {}",
                response.status()
            )));
        }

        let body: DohResponse = response.json().await.map_err(|e| {
            ToolboxError::ResolutionError(format!("Failed to parse DoH response: {e}"))
        })?;

        parse_answers(domain, record_type, body)
    }
}

/// Turn a DoH JSON answer into policy-TTL records of the requested type.
///
/// CNAME links in the answer chain are skipped. An answer with nothing of the
/// requested type is NODATA, which is a resolution failure rather than NXDOMAIN.
fn parse_answers(
    domain: &str,
    record_type: RecordType,
    response: DohResponse,
) -> ToolboxResult<Vec<DnsRecord>> {
    match response.status {
        0 => {}
        RCODE_NXDOMAIN => return Err(ToolboxError::DomainNotFound(domain.to_string())),
        rcode => {
            return Err(ToolboxError::ResolutionError(format!(
                "DoH resolver answered with RCODE {rcode}"
            )));
        }
    }

    let records: Vec<DnsRecord> = response
        .answer
        .into_iter()
        .filter(|a| a.record_type == record_type.code())
        .filter_map(|a| parse_rdata(record_type, a.data.trim()))
        .collect();

    if records.is_empty() {
        return Err(ToolboxError::ResolutionError(format!(
            "No {record_type} records for {domain}"
        )));
    }
    Ok(records)
}

fn parse_rdata(record_type: RecordType, data: &str) -> Option<DnsRecord> {
    match record_type {
        RecordType::A => data
            .parse::<Ipv4Addr>()
            .ok()
            .map(|ip| DnsRecord::new(RecordType::A, ip.to_string())),
        RecordType::Mx => {
            let (preference, exchange) = data.split_once(char::is_whitespace)?;
            let preference = preference.parse::<u16>().ok()?;
            Some(DnsRecord::mx(trim_root(exchange.trim()), preference))
        }
        RecordType::Ns => Some(DnsRecord::new(RecordType::Ns, trim_root(data))),
    }
}
