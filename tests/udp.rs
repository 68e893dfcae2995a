//! Engine over the real UDP transport against a scripted loopback agent.

mod common;

use common::*;
use snmp_watch::{Credentials, Engine, EngineConfig, Error};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;

/// How the loopback agent answers.
#[derive(Clone, Copy)]
enum Behaviour {
    /// Echo every request; hold the first reply back this long.
    LateFirst(Duration),
    /// Answer every request with this OID (BER content bytes).
    WrongOid(&'static [u8]),
}

/// BER content bytes of sysName.0.
const SYS_NAME_CONTENT: &[u8] = &[0x2B, 0x06, 0x01, 0x02, 0x01, 0x01, 0x05, 0x00];

fn tlv(tag: u8, content: &[u8]) -> Vec<u8> {
    let mut out = vec![tag];
    match content.len() {
        len @ 0..=127 => out.push(len as u8),
        len @ 128..=255 => out.extend([0x81, len as u8]),
        len => out.extend([0x82, (len >> 8) as u8, len as u8]),
    }
    out.extend_from_slice(content);
    out
}

fn integer(value: i64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let mut start = 0;
    while start < 7 {
        let (head, next) = (bytes[start], bytes[start + 1]);
        let redundant = (head == 0x00 && next & 0x80 == 0) || (head == 0xFF && next & 0x80 != 0);
        if !redundant {
            break;
        }
        start += 1;
    }
    tlv(0x02, &bytes[start..])
}

/// v2c GetResponse with one OCTET STRING binding.
fn response(request_id: i32, community: &[u8], oid_content: &[u8], value: &[u8]) -> Vec<u8> {
    let varbind = tlv(0x30, &[tlv(0x06, oid_content), tlv(0x04, value)].concat());
    let pdu = tlv(
        0xA2,
        &[
            integer(request_id.into()),
            integer(0),
            integer(0),
            tlv(0x30, &varbind),
        ]
        .concat(),
    );
    tlv(0x30, &[integer(1), tlv(0x04, community), pdu].concat())
}

async fn spawn_agent(behaviour: Behaviour) -> SocketAddr {
    let socket = Arc::new(UdpSocket::bind("127.0.0.1:0").await.unwrap());
    let addr = socket.local_addr().unwrap();

    tokio::spawn(async move {
        let mut buf = vec![0u8; 2048];
        let mut answered = 0usize;
        loop {
            let Ok((len, peer)) = socket.recv_from(&mut buf).await else {
                continue;
            };
            let Ok(request) = snmp2::Pdu::from_bytes(&buf[..len]) else {
                continue;
            };
            let mut varbinds = request.varbinds;
            let Some((oid, _)) = varbinds.next() else {
                continue;
            };

            let (oid_content, delay) = match behaviour {
                Behaviour::LateFirst(late) if answered == 0 => (oid.as_bytes(), late),
                Behaviour::LateFirst(_) => (oid.as_bytes(), Duration::ZERO),
                Behaviour::WrongOid(content) => (content, Duration::ZERO),
            };
            let reply = response(request.req_id, request.community, oid_content, b"answer");
            answered += 1;

            let socket = socket.clone();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let _ = socket.send_to(&reply, peer).await;
            });
        }
    });

    addr
}

async fn connect(agent: SocketAddr) -> Engine {
    let config = EngineConfig::default()
        .timeout(Duration::from_millis(100))
        .retries(0);
    Engine::connect(agent, &Credentials::v2c(b"public"), config)
        .await
        .unwrap()
}

#[tokio::test]
async fn connect_and_get_on_default_thread() {
    let agent = spawn_agent(Behaviour::LateFirst(Duration::ZERO)).await;
    let engine = connect(agent).await;

    let rows = engine.poll(&sys_descr()).await.unwrap();
    assert_eq!(rows[0].oid, sys_descr());
    assert_eq!(rows[0].text, "answer");
}

#[tokio::test]
async fn late_reply_is_not_taken_for_the_next_request() {
    let agent = spawn_agent(Behaviour::LateFirst(Duration::from_millis(300))).await;
    let engine = connect(agent).await;

    let err = engine.get(&sys_descr()).await.unwrap_err();
    assert!(matches!(err, Error::Timeout { retries: 0, .. }));

    // let the late reply land in the old socket
    tokio::time::sleep(Duration::from_millis(400)).await;

    let name = engine.get(&sys_name()).await.unwrap();
    assert_eq!(name.varbinds()[0].oid, sys_name());
    let uptime = engine.get(&sys_uptime()).await.unwrap();
    assert_eq!(uptime.varbinds()[0].oid, sys_uptime());
}

#[tokio::test]
async fn get_rejects_reply_for_another_oid() {
    let agent = spawn_agent(Behaviour::WrongOid(SYS_NAME_CONTENT)).await;
    let engine = connect(agent).await;

    let err = engine.get(&sys_descr()).await.unwrap_err();
    assert!(err.is_transport(), "unexpected {err:?}");

    // the echoed OID matches here, so the reopened session answers normally
    let name = engine.get(&sys_name()).await.unwrap();
    assert_eq!(name.varbinds()[0].oid, sys_name());
}
