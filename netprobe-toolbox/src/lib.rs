//! Network probe toolbox
//!
//! 提供无状态的网络诊断功能：A / MX / NS 记录查询、指定递归解析器的 A 记录解析、TCP 端口可达性探测。
//! The crate never logs; callers decide how to report [`ToolboxError`]s.

mod error;
mod services;
mod types;
pub mod utils;
mod validate;

pub use error::{ToolboxError, ToolboxResult};
pub use services::{
    DohSource, HickorySource, LookupBackend, RecordSource, ToolboxOptions, ToolboxService,
    DEFAULT_DNS_TIMEOUT, DEFAULT_DOH_ENDPOINT, PROBE_TIMEOUT,
};
pub use types::{
    DnsRecord, DomainQuery, PortQuery, ProbeResult, RecordType, ResolveResult, ResolverQuery,
    DEFAULT_RESOLVER_ADDRESS,
};
