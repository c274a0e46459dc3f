//! End-to-end tests against local DNS servers and TCP listeners.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use hickory_resolver::proto::op::{Message, MessageType, OpCode, ResponseCode};
use hickory_resolver::proto::rr::rdata::{A, MX, NS};
use hickory_resolver::proto::rr::{Name, RData, Record, RecordType as WireType};
use netprobe_toolbox::{
    DnsRecord, DomainQuery, HickorySource, PortQuery, ResolverQuery, ToolboxError,
    ToolboxOptions, ToolboxService,
};
use tokio::net::{TcpListener, UdpSocket};

/// How a fake upstream answers every query.
#[derive(Clone, Copy)]
enum Answer {
    /// One A record for any name and type.
    Address(Ipv4Addr),
    /// A small zone: one A record, two MX records (higher preference value
    /// first) and two NS records.
    Zone,
    /// NOERROR with an empty answer section.
    NoData,
    NxDomain,
}

fn name(raw: &str) -> Name {
    Name::from_ascii(raw).unwrap()
}

/// Answer records for one question under [`Answer::Zone`].
fn zone_answers(owner: &Name, query_type: WireType) -> Vec<Record> {
    let rdata = match query_type {
        WireType::A => vec![RData::A(A(Ipv4Addr::new(192, 0, 2, 10)))],
        WireType::MX => vec![
            RData::MX(MX::new(20, name("backup.mx.test."))),
            RData::MX(MX::new(10, name("mx.test."))),
        ],
        WireType::NS => vec![
            RData::NS(NS(name("ns1.zone.test."))),
            RData::NS(NS(name("ns2.zone.test."))),
        ],
        _ => Vec::new(),
    };
    rdata
        .into_iter()
        .map(|rdata| Record::from_rdata(owner.clone(), 300, rdata))
        .collect()
}

/// Spawn a UDP DNS server on 127.0.0.1 answering every question the same way.
async fn spawn_dns_server(answer: Answer) -> SocketAddr {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();

    tokio::spawn(async move {
        let mut buf = [0u8; 4096];
        loop {
            let Ok((len, peer)) = socket.recv_from(&mut buf).await else {
                break;
            };
            let Ok(request) = Message::from_vec(&buf[..len]) else {
                continue;
            };

            let mut response = Message::new();
            response
                .set_id(request.id())
                .set_message_type(MessageType::Response)
                .set_op_code(OpCode::Query)
                .set_recursion_desired(request.recursion_desired())
                .set_recursion_available(true)
                .add_queries(request.queries().to_vec());

            match answer {
                Answer::Address(ip) => {
                    for query in request.queries() {
                        response.add_answer(Record::from_rdata(
                            query.name().clone(),
                            60,
                            RData::A(A(ip)),
                        ));
                    }
                }
                Answer::Zone => {
                    for query in request.queries() {
                        response.add_answers(zone_answers(query.name(), query.query_type()));
                    }
                }
                Answer::NoData => {}
                Answer::NxDomain => {
                    response.set_response_code(ResponseCode::NXDomain);
                }
            }

            if let Ok(bytes) = response.to_vec() {
                let _ = socket.send_to(&bytes, peer).await;
            }
        }
    });

    addr
}

fn service() -> ToolboxService {
    ToolboxService::default()
}

/// Service whose record lookups go to `server` only.
fn upstream_service(server: SocketAddr) -> ToolboxService {
    ToolboxService::with_record_source(
        Arc::new(HickorySource::with_upstream(server, Duration::from_secs(2))),
        Duration::from_secs(3),
    )
}

// ==================== lookup_records through hickory ====================

#[tokio::test]
async fn test_lookup_a_records() {
    let server = spawn_dns_server(Answer::Zone).await;
    let query = DomainQuery::new("zone.test", "A").unwrap();

    let records = upstream_service(server).lookup_records(&query).await.unwrap();
    assert_eq!(
        records,
        vec![DnsRecord {
            value: "192.0.2.10".to_string(),
            ttl: 3600,
            priority: None,
        }]
    );
}

#[tokio::test]
async fn test_lookup_mx_records_keep_resolver_order() {
    let server = spawn_dns_server(Answer::Zone).await;
    let query = DomainQuery::new("zone.test", "MX").unwrap();

    let records = upstream_service(server).lookup_records(&query).await.unwrap();
    assert_eq!(
        records,
        vec![
            DnsRecord {
                value: "backup.mx.test".to_string(),
                ttl: 3600,
                priority: Some(20),
            },
            DnsRecord {
                value: "mx.test".to_string(),
                ttl: 3600,
                priority: Some(10),
            },
        ]
    );
}

#[tokio::test]
async fn test_lookup_ns_records() {
    let server = spawn_dns_server(Answer::Zone).await;
    let query = DomainQuery::new("zone.test.", "NS").unwrap();

    let records = upstream_service(server).lookup_records(&query).await.unwrap();
    let values: Vec<&str> = records.iter().map(|r| r.value.as_str()).collect();
    assert_eq!(values, ["ns1.zone.test", "ns2.zone.test"]);
    assert!(records.iter().all(|r| r.ttl == 86400 && r.priority.is_none()));
}

#[tokio::test]
async fn test_lookup_nxdomain_is_not_found() {
    let server = spawn_dns_server(Answer::NxDomain).await;
    let query = DomainQuery::new("missing.test", "MX").unwrap();

    let err = upstream_service(server).lookup_records(&query).await.unwrap_err();
    assert_eq!(err, ToolboxError::DomainNotFound("missing.test".to_string()));
}

#[tokio::test]
async fn test_lookup_empty_answer_is_resolution_error() {
    let server = spawn_dns_server(Answer::NoData).await;
    let query = DomainQuery::new("exists.test", "NS").unwrap();

    let err = upstream_service(server).lookup_records(&query).await.unwrap_err();
    assert!(matches!(err, ToolboxError::ResolutionError(_)), "got {err:?}");
}

// ==================== resolve_with_server ====================

#[tokio::test]
async fn test_resolve_with_local_server() {
    let server = spawn_dns_server(Answer::Address(Ipv4Addr::new(192, 0, 2, 1))).await;
    let address = server.to_string();

    let query = ResolverQuery::new("alpha.test", Some(&address)).unwrap();
    let result = service().resolve_with_server(&query).await.unwrap();

    assert_eq!(result.domain, "alpha.test");
    assert_eq!(result.resolver_address, address);
    assert_eq!(result.addresses, vec!["192.0.2.1".to_string()]);
}

#[tokio::test]
async fn test_resolve_nxdomain_is_not_found() {
    let server = spawn_dns_server(Answer::NxDomain).await;

    let query = ResolverQuery::new("missing.test", Some(&server.to_string())).unwrap();
    let err = service().resolve_with_server(&query).await.unwrap_err();
    assert_eq!(err, ToolboxError::DomainNotFound("missing.test".to_string()));
}

#[tokio::test]
async fn test_resolve_empty_answer_is_resolution_error() {
    let server = spawn_dns_server(Answer::NoData).await;

    let query = ResolverQuery::new("exists.test", Some(&server.to_string())).unwrap();
    let err = service().resolve_with_server(&query).await.unwrap_err();
    assert!(matches!(err, ToolboxError::ResolutionError(_)), "got {err:?}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_custom_resolvers_do_not_interfere() {
    let first = spawn_dns_server(Answer::Address(Ipv4Addr::new(192, 0, 2, 1))).await;
    let second = spawn_dns_server(Answer::Address(Ipv4Addr::new(198, 51, 100, 2))).await;
    let service = service();

    let requests = (0..40).map(|i| {
        let service = service.clone();
        let (server, expected) = if i % 2 == 0 {
            (first, "192.0.2.1")
        } else {
            (second, "198.51.100.2")
        };
        async move {
            let query = ResolverQuery::new("shared.test", Some(&server.to_string())).unwrap();
            let result = service.resolve_with_server(&query).await.unwrap();
            (result, server, expected)
        }
    });

    for (result, server, expected) in join_all(requests).await {
        assert_eq!(result.resolver_address, server.to_string());
        assert_eq!(result.addresses, vec![expected.to_string()]);
    }
}

#[tokio::test]
async fn test_unreachable_resolver_is_resolution_error() {
    // Bind then drop so nothing answers on this port.
    let port = {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        socket.local_addr().unwrap().port()
    };
    let service = ToolboxService::new(&ToolboxOptions {
        dns_timeout: Duration::from_secs(1),
        ..ToolboxOptions::default()
    })
    .unwrap();

    let query = ResolverQuery::new("alpha.test", Some(&format!("127.0.0.1:{port}"))).unwrap();
    let err = service.resolve_with_server(&query).await.unwrap_err();
    assert!(matches!(err, ToolboxError::ResolutionError(_)), "got {err:?}");
}

// ==================== probe_port ====================

#[tokio::test]
async fn test_probe_port_open_and_closed() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let open_port = listener.local_addr().unwrap().port();

    let closed_port = {
        let l = TcpListener::bind("127.0.0.1:0").await.unwrap();
        l.local_addr().unwrap().port()
    };

    let service = service();

    let open = service
        .probe_port(&PortQuery::new("127.0.0.1", i64::from(open_port)).unwrap())
        .await
        .unwrap();
    assert!(open.open);
    assert_eq!(open.port, open_port);

    let closed = service
        .probe_port(&PortQuery::new("127.0.0.1", i64::from(closed_port)).unwrap())
        .await
        .unwrap();
    assert!(!closed.open);
    assert_eq!(closed.host, "127.0.0.1");
}

#[tokio::test]
async fn test_probe_unroutable_host_is_bounded() {
    // TEST-NET-1 is never routed; the probe must give up within its budget.
    let started = std::time::Instant::now();
    let result = service()
        .probe_port(&PortQuery::new("192.0.2.1", 81).unwrap())
        .await
        .unwrap();
    assert!(!result.open);
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[test]
fn test_port_query_rejects_out_of_range() {
    for port in [0, -5, 65536] {
        assert!(matches!(
            PortQuery::new("127.0.0.1", port),
            Err(ToolboxError::InvalidInput(_))
        ));
    }
}
