//! Input normalisation shared by the query constructors.

use std::net::{IpAddr, SocketAddr};

use crate::error::{ToolboxError, ToolboxResult};

/// Standard DNS port used when a resolver address carries none.
pub(crate) const DNS_PORT: u16 = 53;

/// Maximum length of an ASCII domain name.
const MAX_DOMAIN_LEN: usize = 253;

/// Strip the decoration users paste along with a domain: whitespace, an
/// `http://` / `https://` scheme, trailing slashes and the root dot of a
/// fully-qualified name.
pub(crate) fn strip_domain_decoration(raw: &str) -> &str {
    let mut domain = raw.trim();
    for scheme in ["https://", "http://"] {
        if domain
            .get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
        {
            domain = &domain[scheme.len()..];
            break;
        }
    }
    let domain = domain.trim_end_matches('/');
    domain.strip_suffix('.').unwrap_or(domain)
}

/// Validate and normalise a domain name.
///
/// Internationalised names are converted to ASCII via IDNA 2008 (strict STD3 rules),
/// which also lower-cases the result.
pub(crate) fn normalize_domain(raw: &str) -> ToolboxResult<String> {
    let domain = strip_domain_decoration(raw);
    if domain.is_empty() {
        return Err(ToolboxError::DomainRequired);
    }

    let ascii_domain = idna::domain_to_ascii_strict(domain)
        .map_err(|_| ToolboxError::InvalidInput(format!("Invalid domain name: {domain}")))?;
    if ascii_domain.is_empty() {
        return Err(ToolboxError::DomainRequired);
    }
    if ascii_domain.len() > MAX_DOMAIN_LEN {
        return Err(ToolboxError::InvalidInput(format!(
            "Domain name exceeds maximum length of {MAX_DOMAIN_LEN} characters (got {})",
            ascii_domain.len()
        )));
    }
    Ok(ascii_domain)
}

/// Parse a recursive resolver address.
///
/// Accepts `ip`, `ip:port`, `[ipv6]` and `[ipv6]:port`; the port defaults to 53.
pub(crate) fn parse_resolver_address(raw: &str) -> ToolboxResult<SocketAddr> {
    let raw = raw.trim();
    let invalid = || ToolboxError::InvalidInput(format!("Invalid DNS server address: {raw}"));

    if let Ok(ip) = raw.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, DNS_PORT));
    }
    if let Some(inner) = raw.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        let ip: IpAddr = inner.parse().map_err(|_| invalid())?;
        return Ok(SocketAddr::new(ip, DNS_PORT));
    }

    let addr: SocketAddr = raw.parse().map_err(|_| invalid())?;
    if addr.port() == 0 {
        return Err(invalid());
    }
    Ok(addr)
}

/// Validate a probe target host. Only emptiness is checked here; anything else
/// is left to the connect attempt (which reports an unresolvable host as not open).
pub(crate) fn normalize_host(raw: &str) -> ToolboxResult<String> {
    let host = raw.trim();
    if host.is_empty() {
        return Err(ToolboxError::InvalidInput(
            "IP address or host name is required".to_string(),
        ));
    }
    // `[::1]` is accepted for convenience; the socket layer wants the bare address.
    let host = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    Ok(host.to_string())
}

/// Validate a TCP port number.
pub(crate) fn validate_port(port: i64) -> ToolboxResult<u16> {
    u16::try_from(port)
        .ok()
        .filter(|p| *p != 0)
        .ok_or_else(|| {
            ToolboxError::InvalidInput(format!("Port must be between 1 and 65535 (got {port})"))
        })
}
