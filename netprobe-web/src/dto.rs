use chrono::{DateTime, Utc};
use netprobe_toolbox::utils::datetime;
use netprobe_toolbox::{DnsRecord, RecordType};
use serde::{Deserialize, Serialize};

/// Query string of `GET /api/dns`.
#[derive(Debug, Default, Deserialize)]
pub struct DnsLookupParams {
    #[serde(default)]
    pub domain: String,
    #[serde(rename = "type", default)]
    pub record_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsLookupResponse {
    pub domain: String,
    pub record_type: RecordType,
    pub results: Vec<DnsRecord>,
    #[serde(with = "datetime")]
    pub timestamp: DateTime<Utc>,
}

/// Body of `POST /api/dns-resolve`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsResolveRequest {
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub dns_server: Option<String>,
}

/// Body of `POST /api/port-scan`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortScanRequest {
    pub ip_address: String,
    pub port: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IpInfoResponse {
    pub ip: String,
    pub user_agent: String,
    #[serde(with = "datetime")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}
