//! Transport layer abstraction.
//!
//! The engine talks to an agent through the [`Transport`] trait: one GET or
//! GETNEXT exchange per call, no retries and no timeout. Retries and
//! deadlines belong to the [`Engine`](crate::engine::Engine).

mod mock;
mod udp;
pub(crate) mod wire;

pub use mock::*;
pub use udp::*;

use crate::error::Result;
use crate::oid::Oid;
use crate::varbind::VarBind;
use std::future::Future;
use std::net::SocketAddr;

/// Request/response exchange with one agent.
///
/// # Clone Requirement
///
/// Monitor tasks own a clone of the engine (and thus the transport).
/// Implementations use `Arc` internally, making clone cheap.
pub trait Transport: Send + Sync + Clone + 'static {
    /// Send a GET for `oid` and wait for the response bindings.
    fn get(&self, oid: &Oid) -> impl Future<Output = Result<Vec<VarBind>>> + Send;

    /// Send a GETNEXT for `oid` and wait for the response bindings.
    fn get_next(&self, oid: &Oid) -> impl Future<Output = Result<Vec<VarBind>>> + Send;

    /// The agent address.
    ///
    /// Named to match [`std::net::TcpStream::peer_addr()`].
    fn peer_addr(&self) -> SocketAddr;
}

/// Request type, as recorded by [`MockTransport`] and shown in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Get,
    GetNext,
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestKind::Get => write!(f, "GET"),
            RequestKind::GetNext => write!(f, "GETNEXT"),
        }
    }
}
