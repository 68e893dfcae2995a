//! Trap listener.
//!
//! Binds a UDP socket and runs one receiver task that decodes every
//! datagram into a [`TrapEvent`] and hands it to an unbounded channel.
//! Malformed datagrams are logged and dropped; the loop keeps running.
//!
//! # Example
//!
//! ```rust,no_run
//! use snmp_watch::VarBindDecoder;
//! use snmp_watch::config::ListenerConfig;
//! use snmp_watch::trap::TrapListener;
//!
//! # async fn example() -> snmp_watch::Result<()> {
//! let config = ListenerConfig::default().bind("0.0.0.0:1162".parse().unwrap());
//! let (mut listener, mut events) = TrapListener::start(config, VarBindDecoder::default()).await?;
//!
//! if let Some(event) = events.recv().await {
//!     println!("{} trap from {}", event.version, event.source);
//!     for vb in &event.varbinds {
//!         println!("  {} = {} ({})", vb.oid, vb.text, vb.type_name);
//!     }
//! }
//!
//! listener.stop().await;
//! # Ok(())
//! # }
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::SystemTime;

use tokio::net::UdpSocket;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::ListenerConfig;
use crate::decode::{DecodedVarBind, VarBindDecoder};
use crate::error::{Error, Result, TrapErrorKind};
use crate::sink::Gate;
use crate::tag::universal;
use crate::transport::wire::from_wire_binding;
use crate::util::bind_udp_socket;
use crate::varbind::VarBind;
use crate::version::Version;

/// Largest datagram the receiver accepts.
const MAX_DATAGRAM: usize = 65535;

/// A decoded trap message before presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct TrapPdu {
    pub version: Version,
    pub varbinds: Vec<VarBind>,
}

/// Turns a raw datagram into a [`TrapPdu`].
pub trait TrapDecoder: Send + Sync + 'static {
    fn decode(&self, datagram: &[u8], source: SocketAddr) -> Result<TrapPdu>;
}

/// Production decoder backed by the `snmp2` codec.
///
/// The version comes from [`read_version`]; the bindings come from `snmp2`.
/// Community-based traps (v1, v2c) only: v3 messages are reported as
/// malformed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Snmp2TrapDecoder;

impl TrapDecoder for Snmp2TrapDecoder {
    fn decode(&self, datagram: &[u8], source: SocketAddr) -> Result<TrapPdu> {
        let malformed = |kind| Error::MalformedTrap { peer: source, kind };

        let version = read_version(datagram).map_err(malformed)?;
        let pdu = snmp2::Pdu::from_bytes(datagram)
            .map_err(|e| malformed(TrapErrorKind::Codec(format!("{:?}", e))))?;

        let varbinds = pdu
            .varbinds
            .map(|(oid, value)| {
                from_wire_binding(oid, value)
                    .map_err(|e| malformed(TrapErrorKind::Codec(e.to_string())))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(TrapPdu { version, varbinds })
    }
}

/// Read the SNMP version from a message header.
///
/// Expects `SEQUENCE { INTEGER version, ... }` and looks no further.
pub fn read_version(datagram: &[u8]) -> std::result::Result<Version, TrapErrorKind> {
    let mut reader = HeaderReader { data: datagram };
    reader.expect_tag(universal::SEQUENCE)?;
    reader.read_length()?;
    reader.expect_tag(universal::INTEGER)?;
    let len = reader.read_length()?;
    if len == 0 || len > 8 {
        return Err(TrapErrorKind::InvalidLength);
    }
    let bytes = reader.take(len)?;

    // two's complement, big-endian
    let mut value: i64 = if bytes[0] & 0x80 != 0 { -1 } else { 0 };
    for &b in bytes {
        value = (value << 8) | i64::from(b);
    }
    Version::from_wire(value).ok_or(TrapErrorKind::UnknownVersion(value))
}

struct HeaderReader<'a> {
    data: &'a [u8],
}

impl<'a> HeaderReader<'a> {
    fn take(&mut self, n: usize) -> std::result::Result<&'a [u8], TrapErrorKind> {
        if self.data.len() < n {
            return Err(TrapErrorKind::Truncated);
        }
        let (head, rest) = self.data.split_at(n);
        self.data = rest;
        Ok(head)
    }

    fn expect_tag(&mut self, expected: u8) -> std::result::Result<(), TrapErrorKind> {
        let actual = self.take(1)?[0];
        if actual != expected {
            return Err(TrapErrorKind::UnexpectedTag { expected, actual });
        }
        Ok(())
    }

    fn read_length(&mut self) -> std::result::Result<usize, TrapErrorKind> {
        let first = self.take(1)?[0];
        if first < 0x80 {
            return Ok(usize::from(first));
        }
        let count = usize::from(first & 0x7F);
        // indefinite form (0x80) is not allowed in SNMP
        if count == 0 || count > 4 {
            return Err(TrapErrorKind::InvalidLength);
        }
        let len = self
            .take(count)?
            .iter()
            .fold(0usize, |acc, &b| (acc << 8) | usize::from(b));
        Ok(len)
    }
}

/// One received trap, ready for presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrapEvent {
    pub source: SocketAddr,
    pub version: Version,
    pub varbinds: Vec<DecodedVarBind>,
    pub received_at: SystemTime,
}

/// A running trap listener.
///
/// Dropping the listener stops delivery and cancels the receiver task;
/// [`stop`](Self::stop) additionally waits for the socket to close.
pub struct TrapListener {
    local_addr: SocketAddr,
    gate: Arc<Gate<TrapEvent>>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl TrapListener {
    /// Bind and start listening with the `snmp2` decoder.
    pub async fn start(
        config: ListenerConfig,
        decoder: VarBindDecoder,
    ) -> Result<(Self, UnboundedReceiver<TrapEvent>)> {
        Self::start_with(config, Snmp2TrapDecoder, decoder).await
    }

    /// Bind and start listening with a custom datagram decoder.
    pub async fn start_with<D: TrapDecoder>(
        config: ListenerConfig,
        trap_decoder: D,
        decoder: VarBindDecoder,
    ) -> Result<(Self, UnboundedReceiver<TrapEvent>)> {
        let bind_addr = config.bind;
        let socket = bind_udp_socket(bind_addr, config.recv_buffer_size)
            .await
            .map_err(|e| Error::Io {
                target: Some(bind_addr),
                source: e,
            })?;
        let local_addr = socket.local_addr().map_err(|e| Error::Io {
            target: Some(bind_addr),
            source: e,
        })?;

        let (gate, receiver) = Gate::channel();
        let gate = Arc::new(gate);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(receive_loop(
            socket,
            trap_decoder,
            decoder,
            gate.clone(),
            cancel.clone(),
        ));

        tracing::info!(target: "snmp_watch::trap", { snmp.local_addr = %local_addr }, "trap listener started");

        Ok((
            Self {
                local_addr,
                gate,
                cancel,
                task: Some(task),
            },
            receiver,
        ))
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_listening(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop listening.
    ///
    /// No event is delivered after this returns, and the socket is closed.
    pub async fn stop(&mut self) {
        self.gate.close();
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::debug!(target: "snmp_watch::trap", error = %e, "receiver task ended abnormally");
            }
            tracing::info!(target: "snmp_watch::trap", { snmp.local_addr = %self.local_addr }, "trap listener stopped");
        }
    }
}

impl Drop for TrapListener {
    fn drop(&mut self) {
        self.gate.close();
        self.cancel.cancel();
    }
}

async fn receive_loop<D: TrapDecoder>(
    socket: UdpSocket,
    trap_decoder: D,
    decoder: VarBindDecoder,
    gate: Arc<Gate<TrapEvent>>,
    cancel: CancellationToken,
) {
    let mut buf = vec![0u8; MAX_DATAGRAM];

    loop {
        let (len, source) = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            received = socket.recv_from(&mut buf) => match received {
                Ok(received) => received,
                Err(e) => {
                    tracing::warn!(target: "snmp_watch::trap", error = %e, "receive failed");
                    continue;
                }
            },
        };
        tracing::trace!(target: "snmp_watch::trap", { snmp.source = %source, snmp.bytes = len }, "datagram received");

        let pdu = match trap_decoder.decode(&buf[..len], source) {
            Ok(pdu) => pdu,
            Err(e) => {
                tracing::warn!(target: "snmp_watch::trap", { snmp.source = %source, error = %e }, "dropping malformed trap");
                continue;
            }
        };

        let event = present(pdu, source, &decoder);
        tracing::debug!(target: "snmp_watch::trap", { snmp.source = %source, snmp.version = %event.version, snmp.varbind_count = event.varbinds.len() }, "trap received");
        if !gate.deliver(event) {
            break;
        }
    }
}

/// Decode bindings for display, skipping Null-like ones.
fn present(pdu: TrapPdu, source: SocketAddr, decoder: &VarBindDecoder) -> TrapEvent {
    let varbinds = pdu
        .varbinds
        .iter()
        .filter_map(|vb| match decoder.decode(vb) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::debug!(target: "snmp_watch::trap", { snmp.source = %source, error = %e }, "skipping binding");
                None
            }
        })
        .collect();

    TrapEvent {
        source,
        version: pdu.version,
        varbinds,
        received_at: SystemTime::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;
    use crate::value::Value;

    fn source() -> SocketAddr {
        "192.0.2.7:50000".parse().unwrap()
    }

    #[test]
    fn test_read_version_v2c() {
        // SEQUENCE, INTEGER 1, OCTET STRING "public"
        let data = [0x30, 0x0B, 0x02, 0x01, 0x01, 0x04, 0x06, b'p', b'u', b'b', b'l', b'i', b'c'];
        assert_eq!(read_version(&data), Ok(Version::V2c));
    }

    #[test]
    fn test_read_version_long_form_length() {
        let data = [0x30, 0x82, 0x01, 0x00, 0x02, 0x01, 0x00];
        assert_eq!(read_version(&data), Ok(Version::V1));
    }

    #[test]
    fn test_read_version_v3() {
        let data = [0x30, 0x03, 0x02, 0x01, 0x03];
        assert_eq!(read_version(&data), Ok(Version::V3));
    }

    #[test]
    fn test_read_version_errors() {
        assert_eq!(read_version(&[]), Err(TrapErrorKind::Truncated));
        assert_eq!(
            read_version(&[0x04, 0x00]),
            Err(TrapErrorKind::UnexpectedTag {
                expected: 0x30,
                actual: 0x04
            })
        );
        assert_eq!(
            read_version(&[0x30, 0x80, 0x02, 0x01, 0x01]),
            Err(TrapErrorKind::InvalidLength)
        );
        assert_eq!(
            read_version(&[0x30, 0x03, 0x02, 0x01, 0x02]),
            Err(TrapErrorKind::UnknownVersion(2))
        );
        assert_eq!(
            read_version(&[0x30, 0x03, 0x02, 0x01]),
            Err(TrapErrorKind::Truncated)
        );
        assert_eq!(
            read_version(&[0x30, 0x03, 0x02, 0x00]),
            Err(TrapErrorKind::InvalidLength)
        );
    }

    #[test]
    fn test_read_version_negative() {
        assert_eq!(
            read_version(&[0x30, 0x03, 0x02, 0x01, 0xFF]),
            Err(TrapErrorKind::UnknownVersion(-1))
        );
    }

    #[test]
    fn test_snmp2_decoder_rejects_garbage() {
        let err = Snmp2TrapDecoder.decode(b"hello", source()).unwrap_err();
        assert!(matches!(err, Error::MalformedTrap { .. }));
        assert_eq!(err.target(), Some(source()));
    }

    #[test]
    fn test_present_skips_null_like() {
        let pdu = TrapPdu {
            version: Version::V2c,
            varbinds: vec![
                VarBind::new(oid!(1, 3, 6, 1, 2, 1, 1, 3, 0), Value::TimeTicks(100)),
                VarBind::new(oid!(1, 3, 6, 1, 4, 1, 9, 1), Value::Null),
                VarBind::new(oid!(1, 3, 6, 1, 4, 1, 9, 2), Value::from("up")),
            ],
        };
        let event = present(pdu, source(), &VarBindDecoder::default());
        assert_eq!(event.version, Version::V2c);
        assert_eq!(event.varbinds.len(), 2);
        assert_eq!(event.varbinds[1].text, "up");
    }
}
