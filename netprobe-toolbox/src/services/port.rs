//! TCP 端口可达性探测

use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::types::{PortQuery, ProbeResult};
use crate::utils::datetime::now_millis;

/// Connect budget for a single probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_millis(1500);

/// Attempt one TCP connection to the query target.
///
/// Refused, unreachable, unresolvable and timed-out targets all report
/// `open == false`; the connection is closed again as soon as it is established.
pub(crate) async fn probe_port(query: &PortQuery, budget: Duration) -> ProbeResult {
    let open = matches!(
        timeout(budget, TcpStream::connect((query.host(), query.port()))).await,
        Ok(Ok(_))
    );

    ProbeResult {
        host: query.host().to_string(),
        port: query.port(),
        open,
        timestamp: now_millis(),
    }
}
