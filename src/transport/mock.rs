//! Mock transport for testing.
//!
//! Answers from an in-memory agent view, so walks and GETs behave like a
//! real agent without a network. Scripted responses (timeouts, I/O errors,
//! delays, agent errors) can be queued ahead of the agent view.

use super::{RequestKind, Transport};
use crate::error::{Error, ErrorStatus, Result};
use crate::oid::Oid;
use crate::value::Value;
use crate::varbind::VarBind;
use std::collections::{BTreeMap, VecDeque};
use std::future::Future;
use std::net::SocketAddr;
use std::ops::Bound;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// A scripted response, consumed before the agent view is consulted.
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// Return these bindings as-is.
    Bindings(Vec<VarBind>),
    /// Never answer; the engine's timeout fires.
    Silence,
    /// Answer from the agent view after a delay.
    Delay(Duration),
    /// Simulate an I/O error.
    IoError(String),
    /// Agent error-status with its 1-based index.
    Status { status: ErrorStatus, index: u32 },
}

/// A request seen by the mock.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedRequest {
    pub kind: RequestKind,
    pub oid: Oid,
}

struct MockTransportInner {
    target: SocketAddr,
    view: BTreeMap<Oid, Value>,
    responses: VecDeque<MockResponse>,
    requests: Vec<RecordedRequest>,
}

/// Mock transport for testing engine, table and monitor behaviour.
///
/// A GET for an absent OID answers `noSuchObject`; a GETNEXT past the last
/// entry answers `endOfMibView`, like a v2c agent.
///
/// # Example
///
/// ```rust
/// use snmp_watch::transport::MockTransport;
/// use snmp_watch::{oid, Value};
///
/// let mock = MockTransport::new("127.0.0.1:161".parse().unwrap());
/// mock.insert(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), Value::from("core-sw"));
///
/// // the next request times out
/// mock.queue_silence();
/// ```
#[derive(Clone)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

impl MockTransport {
    /// Create a mock with an empty agent view.
    pub fn new(target: SocketAddr) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockTransportInner {
                target,
                view: BTreeMap::new(),
                responses: VecDeque::new(),
                requests: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockTransportInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set a value in the agent view, replacing any existing one.
    pub fn insert(&self, oid: Oid, value: Value) {
        self.lock().view.insert(oid, value);
    }

    /// Remove a value from the agent view.
    pub fn remove(&self, oid: &Oid) -> Option<Value> {
        self.lock().view.remove(oid)
    }

    /// Queue bindings returned verbatim by the next request.
    pub fn queue_bindings(&self, varbinds: Vec<VarBind>) {
        self.queue(MockResponse::Bindings(varbinds));
    }

    /// Queue a request that never gets an answer.
    pub fn queue_silence(&self) {
        self.queue(MockResponse::Silence);
    }

    /// Queue an I/O error.
    pub fn queue_io_error(&self, msg: impl Into<String>) {
        self.queue(MockResponse::IoError(msg.into()));
    }

    pub fn queue(&self, response: MockResponse) {
        self.lock().responses.push_back(response);
    }

    /// All requests seen so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    pub fn clear_requests(&self) {
        self.lock().requests.clear();
    }

    pub fn queued_response_count(&self) -> usize {
        self.lock().responses.len()
    }

    fn answer(view: &BTreeMap<Oid, Value>, kind: RequestKind, oid: &Oid) -> VarBind {
        match kind {
            RequestKind::Get => {
                let value = view.get(oid).cloned().unwrap_or(Value::NoSuchObject);
                VarBind::new(oid.clone(), value)
            }
            RequestKind::GetNext => view
                .range((Bound::Excluded(oid), Bound::Unbounded))
                .next()
                .map(|(next, value)| VarBind::new(next.clone(), value.clone()))
                .unwrap_or_else(|| VarBind::new(oid.clone(), Value::EndOfMibView)),
        }
    }

    fn exchange(
        &self,
        kind: RequestKind,
        oid: &Oid,
    ) -> impl Future<Output = Result<Vec<VarBind>>> + Send + use<> {
        let (scripted, target) = {
            let mut inner = self.lock();
            inner.requests.push(RecordedRequest {
                kind,
                oid: oid.clone(),
            });
            (inner.responses.pop_front(), inner.target)
        };
        let inner = self.inner.clone();
        let oid = oid.clone();

        async move {
            let from_view = |inner: &Mutex<MockTransportInner>| {
                let guard = inner.lock().unwrap_or_else(PoisonError::into_inner);
                vec![Self::answer(&guard.view, kind, &oid)]
            };

            match scripted {
                None => Ok(from_view(inner.as_ref())),
                Some(MockResponse::Bindings(varbinds)) => Ok(varbinds),
                Some(MockResponse::Silence) => std::future::pending().await,
                Some(MockResponse::Delay(delay)) => {
                    tokio::time::sleep(delay).await;
                    Ok(from_view(inner.as_ref()))
                }
                Some(MockResponse::IoError(msg)) => Err(Error::Io {
                    target: Some(target),
                    source: std::io::Error::other(msg),
                }),
                Some(MockResponse::Status { status, index }) => Err(Error::Snmp {
                    target,
                    status,
                    index,
                }),
            }
        }
    }
}

impl Transport for MockTransport {
    fn get(&self, oid: &Oid) -> impl Future<Output = Result<Vec<VarBind>>> + Send {
        self.exchange(RequestKind::Get, oid)
    }

    fn get_next(&self, oid: &Oid) -> impl Future<Output = Result<Vec<VarBind>>> + Send {
        self.exchange(RequestKind::GetNext, oid)
    }

    fn peer_addr(&self) -> SocketAddr {
        self.lock().target
    }
}
