//! UDP transport over an `snmp2` session.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use snmp2::AsyncSession;
use tokio::sync::Mutex;

use super::wire::{from_wire_binding, to_wire_oid};
use super::{RequestKind, Transport};
use crate::config::Credentials;
use crate::error::{Error, ErrorStatus, Result};
use crate::oid::Oid;
use crate::varbind::VarBind;
use crate::version::Version;

/// Community-based (v1/v2c) UDP transport to one agent.
///
/// Requests on one transport are serialized; clones share the session.
/// A request that is cancelled or fails mid-exchange leaves the session
/// stale, and the next request reopens it on a fresh socket so a late
/// reply can never be read as the answer to a later request.
#[derive(Clone)]
pub struct UdpTransport {
    inner: Arc<UdpTransportInner>,
}

struct UdpTransportInner {
    peer: SocketAddr,
    credentials: Credentials,
    slot: Mutex<SessionSlot>,
}

struct SessionSlot {
    session: Box<AsyncSession>,
    stale: bool,
}

impl UdpTransport {
    /// Open a session to `target`.
    ///
    /// Fails with [`Error::UnsupportedVersion`] for SNMPv3.
    pub async fn connect(target: SocketAddr, credentials: &Credentials) -> Result<Self> {
        let session = open_session(target, credentials).await?;

        tracing::debug!(target: "snmp_watch::transport", { snmp.target = %target, snmp.version = %credentials.version }, "session opened");

        Ok(Self {
            inner: Arc::new(UdpTransportInner {
                peer: target,
                credentials: credentials.clone(),
                slot: Mutex::new(SessionSlot {
                    session,
                    stale: false,
                }),
            }),
        })
    }

    pub fn version(&self) -> Version {
        self.inner.credentials.version
    }

    async fn exchange(&self, kind: RequestKind, oid: &Oid) -> Result<Vec<VarBind>> {
        let target = self.inner.peer;
        let wire_oid = to_wire_oid(oid).map_err(|message| Error::Transport {
            target: Some(target),
            message,
        })?;

        let mut guard = self.inner.slot.lock().await;
        let slot = &mut *guard;
        if slot.stale {
            tracing::debug!(target: "snmp_watch::transport", { snmp.target = %target }, "reopening stale session");
            slot.session = open_session(target, &self.inner.credentials).await?;
        }

        // Cleared only once a matching reply has been read in full.
        slot.stale = true;
        tracing::trace!(target: "snmp_watch::transport", { snmp.target = %target, snmp.oid = %oid }, "sending {}", kind);
        let response = match kind {
            RequestKind::Get => slot.session.get(&wire_oid).await,
            RequestKind::GetNext => slot.session.getnext(&wire_oid).await,
        }
        .map_err(|e| Error::Transport {
            target: Some(target),
            message: format!("{:?}", e),
        })?;

        let status = ErrorStatus(response.error_status as u32);
        if status.is_error() {
            slot.stale = false;
            return Err(Error::Snmp {
                target,
                status,
                index: response.error_index as u32,
            });
        }

        let varbinds = response
            .varbinds
            .map(|(oid, value)| {
                from_wire_binding(oid, value).map_err(|e| Error::Transport {
                    target: Some(target),
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mismatch = varbinds
            .first()
            .filter(|vb| kind == RequestKind::Get && vb.oid != *oid);
        if let Some(vb) = mismatch {
            tracing::warn!(target: "snmp_watch::transport", { snmp.target = %target, requested = %oid, answered = %vb.oid }, "response does not echo the requested OID");
            return Err(Error::Transport {
                target: Some(target),
                message: format!("response OID {} does not match request {}", vb.oid, oid),
            });
        }

        slot.stale = false;
        Ok(varbinds)
    }
}

impl Transport for UdpTransport {
    fn get(&self, oid: &Oid) -> impl std::future::Future<Output = Result<Vec<VarBind>>> + Send {
        self.exchange(RequestKind::Get, oid)
    }

    fn get_next(&self, oid: &Oid) -> impl std::future::Future<Output = Result<Vec<VarBind>>> + Send {
        self.exchange(RequestKind::GetNext, oid)
    }

    fn peer_addr(&self) -> SocketAddr {
        self.inner.peer
    }
}

async fn open_session(target: SocketAddr, credentials: &Credentials) -> Result<Box<AsyncSession>> {
    let request_id = initial_request_id();
    let community = &credentials.community[..];
    let session = match credentials.version {
        Version::V1 => Box::pin(AsyncSession::new_v1(target, community, request_id)).await,
        Version::V2c => Box::pin(AsyncSession::new_v2c(target, community, request_id)).await,
        version => return Err(Error::UnsupportedVersion { version }),
    }
    .map_err(|source| Error::Io {
        target: Some(target),
        source,
    })?;
    Ok(Box::new(session))
}

fn initial_request_id() -> i32 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    (nanos & 0x3FFF_FFFF) as i32 + 1
}
