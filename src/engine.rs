//! Request engine: GET, GETNEXT and walk-based table retrieval against one agent.
//!
//! # Example
//!
//! ```rust,no_run
//! use snmp_watch::{Credentials, Engine, EngineConfig, oid};
//!
//! # async fn example() -> snmp_watch::Result<()> {
//! let engine = Engine::connect(
//!     "192.168.1.1:161".parse().unwrap(),
//!     &Credentials::v2c(b"public"),
//!     EngineConfig::default(),
//! )
//! .await?;
//!
//! let uptime = engine.get(&oid!(1, 3, 6, 1, 2, 1, 1, 3, 0)).await?;
//! for row in engine.decode(&uptime)? {
//!     println!("{} = {} ({})", row.oid, row.text, row.type_name);
//! }
//!
//! let interfaces = engine.table(&oid!(1, 3, 6, 1, 2, 1, 2, 2, 1)).await?;
//! println!("{} interfaces", interfaces.row_count());
//! # Ok(())
//! # }
//! ```

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use tracing::{Span, instrument};

use crate::config::{Credentials, EngineConfig};
use crate::decode::{DecodedVarBind, VarBindDecoder};
use crate::error::{Error, ErrorStatus, OidErrorKind, Result};
use crate::oid::Oid;
use crate::table::{TableBuilder, TableGrid};
use crate::transport::{RequestKind, Transport, UdpTransport};
use crate::value::Value;
use crate::varbind::{PollResult, VarBind};

/// v1 agents signal the end of the MIB view with this error-status.
const NO_SUCH_NAME: ErrorStatus = ErrorStatus(2);

/// Request engine for one agent.
///
/// Cheap to clone; clones share the transport and the stepping cursor.
pub struct Engine<T: Transport = UdpTransport> {
    inner: Arc<EngineInner<T>>,
}

struct EngineInner<T> {
    transport: T,
    config: EngineConfig,
    decoder: VarBindDecoder,
    current: Mutex<Option<Oid>>,
}

impl<T: Transport> Clone for Engine<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl Engine<UdpTransport> {
    /// Open a UDP session to `target` and wrap it in an engine.
    pub async fn connect(
        target: SocketAddr,
        credentials: &Credentials,
        config: EngineConfig,
    ) -> Result<Self> {
        let transport = UdpTransport::connect(target, credentials).await?;
        Self::new(transport, config)
    }
}

impl<T: Transport> Engine<T> {
    /// Create an engine over an existing transport.
    ///
    /// Fails with [`Error::UnknownEncoding`] if the configured text encoding
    /// label is not recognised.
    pub fn new(transport: T, config: EngineConfig) -> Result<Self> {
        let decoder = config.decoder()?;
        Ok(Self {
            inner: Arc::new(EngineInner {
                transport,
                config,
                decoder,
                current: Mutex::new(None),
            }),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    pub fn decoder(&self) -> &VarBindDecoder {
        &self.inner.decoder
    }

    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.inner.transport.peer_addr()
    }

    /// OID returned by the last successful GETNEXT.
    pub fn current_oid(&self) -> Option<Oid> {
        self.cursor().clone()
    }

    /// Move the stepping cursor.
    pub fn set_current_oid(&self, oid: Oid) {
        *self.cursor() = Some(oid);
    }

    fn cursor(&self) -> std::sync::MutexGuard<'_, Option<Oid>> {
        self.inner
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// One exchange with retries on timeout.
    #[instrument(
        level = "debug",
        skip_all,
        fields(
            snmp.target = %self.peer_addr(),
            snmp.request = %kind,
            snmp.oid = %oid,
            snmp.attempt = tracing::field::Empty,
            snmp.elapsed_ms = tracing::field::Empty,
        )
    )]
    async fn request(&self, kind: RequestKind, oid: &Oid) -> Result<Vec<VarBind>> {
        let start = Instant::now();
        let timeout = self.inner.config.timeout;
        let retries = self.inner.config.retries;

        for attempt in 0..=retries {
            Span::current().record("snmp.attempt", attempt);
            if attempt > 0 {
                tracing::debug!(target: "snmp_watch::engine", "retrying request");
            }

            let outcome = match kind {
                RequestKind::Get => tokio::time::timeout(timeout, self.inner.transport.get(oid)).await,
                RequestKind::GetNext => {
                    tokio::time::timeout(timeout, self.inner.transport.get_next(oid)).await
                }
            };

            match outcome {
                Ok(result) => {
                    Span::current().record("snmp.elapsed_ms", start.elapsed().as_millis() as u64);
                    if let Ok(varbinds) = &result {
                        tracing::trace!(target: "snmp_watch::engine", { snmp.varbind_count = varbinds.len() }, "received response");
                    }
                    return result;
                }
                Err(_) => continue,
            }
        }

        let elapsed = start.elapsed();
        Span::current().record("snmp.elapsed_ms", elapsed.as_millis() as u64);
        tracing::debug!(target: "snmp_watch::engine", { peer = %self.peer_addr(), ?elapsed, retries }, "request timed out");
        Err(Error::Timeout {
            target: self.peer_addr(),
            elapsed,
            retries,
        })
    }

    fn empty_response(&self) -> Error {
        tracing::debug!(target: "snmp_watch::engine", { peer = %self.peer_addr() }, "empty response");
        Error::Transport {
            target: Some(self.peer_addr()),
            message: "empty response".to_string(),
        }
    }

    fn first_binding(&self, varbinds: Vec<VarBind>) -> Result<VarBind> {
        varbinds
            .into_iter()
            .next()
            .ok_or_else(|| self.empty_response())
    }

    /// GET a single OID.
    ///
    /// A Null-like answer is [`Error::RequestFailed`], never an empty result.
    #[instrument(skip(self), err, fields(snmp.target = %self.peer_addr(), snmp.oid = %oid))]
    pub async fn get(&self, oid: &Oid) -> Result<PollResult> {
        let varbinds = self.request(RequestKind::Get, oid).await?;
        if varbinds.is_empty() {
            return Err(self.empty_response());
        }
        varbinds
            .into_iter()
            .map(VarBind::into_checked)
            .collect::<Result<Vec<_>>>()
            .map(PollResult::new)
    }

    /// GET and decode, as a monitor tick does.
    pub async fn poll(&self, oid: &Oid) -> Result<Vec<DecodedVarBind>> {
        let result = self.get(oid).await?;
        self.decode(&result)
    }

    /// GETNEXT from `oid`.
    ///
    /// Returns the binding and the OID the agent answered with, which also
    /// becomes the stepping cursor.
    #[instrument(skip(self), err, fields(snmp.target = %self.peer_addr(), snmp.oid = %oid))]
    pub async fn get_next(&self, oid: &Oid) -> Result<(PollResult, Oid)> {
        let varbinds = self.request(RequestKind::GetNext, oid).await?;
        let vb = self.first_binding(varbinds)?.into_checked()?;
        if vb.oid <= *oid {
            tracing::warn!(target: "snmp_watch::engine", { peer = %self.peer_addr(), previous = %oid, current = %vb.oid }, "GETNEXT did not advance");
            return Err(Error::NonIncreasingOid {
                previous: oid.clone(),
                current: vb.oid,
            });
        }
        let next = vb.oid.clone();
        self.set_current_oid(next.clone());
        tracing::debug!(target: "snmp_watch::engine", { snmp.next = %next }, "cursor advanced");
        Ok((PollResult::new(vec![vb]), next))
    }

    /// GETNEXT from the stepping cursor.
    pub async fn step_next(&self) -> Result<(PollResult, Oid)> {
        let from = self.current_oid().ok_or(Error::InvalidOid {
            kind: OidErrorKind::Empty,
            input: None,
        })?;
        self.get_next(&from).await
    }

    /// Walk the subtree under `root` with repeated GETNEXT.
    ///
    /// Stops when the agent leaves the subtree or reports endOfMibView.
    /// Any other Null-like binding fails the whole walk.
    #[instrument(skip(self), err, fields(snmp.target = %self.peer_addr(), snmp.root = %root))]
    pub async fn get_table(&self, root: &Oid) -> Result<PollResult> {
        let mut result = PollResult::default();
        let mut current = root.clone();

        loop {
            let varbinds = match self.request(RequestKind::GetNext, &current).await {
                Ok(varbinds) => varbinds,
                Err(Error::Snmp { status, .. }) if status == NO_SUCH_NAME => {
                    tracing::trace!(target: "snmp_watch::engine", "walk ended with noSuchName");
                    break;
                }
                Err(e) => return Err(e),
            };
            let vb = self.first_binding(varbinds)?;

            if matches!(vb.value, Value::EndOfMibView) || !vb.oid.starts_with(root) {
                break;
            }
            let vb = vb.into_checked()?;
            if vb.oid <= current {
                tracing::warn!(target: "snmp_watch::engine", { peer = %self.peer_addr(), previous = %current, current = %vb.oid }, "non-increasing OID in walk");
                return Err(Error::NonIncreasingOid {
                    previous: current,
                    current: vb.oid,
                });
            }

            current = vb.oid.clone();
            result.push(vb);
        }

        tracing::debug!(target: "snmp_watch::engine", { snmp.varbind_count = result.len() }, "walk complete");
        Ok(result)
    }

    /// Walk `root` and lay the result out as a grid.
    pub async fn table(&self, root: &Oid) -> Result<TableGrid> {
        let walk = self.get_table(root).await?;
        let mut builder = TableBuilder::new(root.clone(), self.inner.decoder);
        for vb in &walk {
            builder.push(vb)?;
        }
        Ok(builder.finish())
    }

    /// Decode bindings for presentation.
    pub fn decode(&self, result: &PollResult) -> Result<Vec<DecodedVarBind>> {
        self.inner.decoder.decode_all(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Failure;
    use crate::oid;
    use crate::transport::{MockResponse, MockTransport};
    use std::time::Duration;

    fn engine(mock: &MockTransport) -> Engine<MockTransport> {
        let config = EngineConfig::default()
            .timeout(Duration::from_millis(100))
            .retries(2);
        Engine::new(mock.clone(), config).unwrap()
    }

    fn mock() -> MockTransport {
        let mock = MockTransport::new("127.0.0.1:161".parse().unwrap());
        mock.insert(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::from("Linux"));
        mock.insert(oid!(1, 3, 6, 1, 2, 1, 1, 3, 0), Value::TimeTicks(4200));
        mock
    }

    #[tokio::test]
    async fn test_get() {
        let mock = mock();
        let result = engine(&mock).get(&oid!(1, 3, 6, 1, 2, 1, 1, 3, 0)).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.varbinds()[0].value, Value::TimeTicks(4200));
    }

    #[tokio::test]
    async fn test_get_no_such_object_fails() {
        let mock = mock();
        let err = engine(&mock)
            .get(&oid!(1, 3, 6, 1, 2, 1, 1, 9, 0))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::RequestFailed {
                failure: Failure::NoSuchObject,
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_after_retries() {
        let mock = mock();
        mock.queue_silence();
        mock.queue_silence();
        mock.queue_silence();
        let err = engine(&mock)
            .get(&oid!(1, 3, 6, 1, 2, 1, 1, 3, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout { retries: 2, .. }));
        assert_eq!(mock.request_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_recovers() {
        let mock = mock();
        mock.queue_silence();
        let result = engine(&mock).get(&oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(mock.request_count(), 2);
    }

    #[tokio::test]
    async fn test_io_error_not_retried() {
        let mock = mock();
        mock.queue_io_error("network unreachable");
        let err = engine(&mock)
            .get(&oid!(1, 3, 6, 1, 2, 1, 1, 1, 0))
            .await
            .unwrap_err();
        assert!(err.is_transport());
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn test_get_next_moves_cursor() {
        let mock = mock();
        let engine = engine(&mock);
        assert!(engine.current_oid().is_none());

        let (_, next) = engine.get_next(&oid!(1, 3, 6, 1, 2, 1, 1)).await.unwrap();
        assert_eq!(next, oid!(1, 3, 6, 1, 2, 1, 1, 1, 0));
        assert_eq!(engine.current_oid(), Some(next));

        let (result, next) = engine.step_next().await.unwrap();
        assert_eq!(next, oid!(1, 3, 6, 1, 2, 1, 1, 3, 0));
        assert_eq!(result.varbinds()[0].value, Value::TimeTicks(4200));

        let err = engine.step_next().await.unwrap_err();
        assert!(matches!(
            err,
            Error::RequestFailed {
                failure: Failure::EndOfMibView,
                ..
            }
        ));
        assert_eq!(engine.current_oid(), Some(oid!(1, 3, 6, 1, 2, 1, 1, 3, 0)));
    }

    #[tokio::test]
    async fn test_step_without_cursor() {
        let mock = mock();
        assert!(matches!(
            engine(&mock).step_next().await,
            Err(Error::InvalidOid { .. })
        ));
    }

    #[tokio::test]
    async fn test_walk_stops_at_subtree_end() {
        let mock = mock();
        mock.insert(oid!(1, 3, 6, 1, 2, 1, 2, 1, 0), Value::Integer(2));
        let result = engine(&mock).get_table(&oid!(1, 3, 6, 1, 2, 1, 1)).await.unwrap();
        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_walk_empty_subtree() {
        let mock = mock();
        let result = engine(&mock).get_table(&oid!(1, 3, 6, 1, 2, 1, 5)).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_walk_v1_no_such_name_ends() {
        let mock = mock();
        mock.queue_bindings(vec![VarBind::new(
            oid!(1, 3, 6, 1, 2, 1, 1, 1, 0),
            Value::from("Linux"),
        )]);
        mock.queue(MockResponse::Status {
            status: ErrorStatus(2),
            index: 1,
        });
        let result = engine(&mock).get_table(&oid!(1, 3, 6, 1, 2, 1, 1)).await.unwrap();
        assert_eq!(result.len(), 1);
    }

    #[tokio::test]
    async fn test_walk_null_fails() {
        let mock = mock();
        mock.insert(oid!(1, 3, 6, 1, 2, 1, 1, 2, 0), Value::Null);
        let err = engine(&mock)
            .get_table(&oid!(1, 3, 6, 1, 2, 1, 1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::RequestFailed {
                failure: Failure::Null,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_walk_non_increasing() {
        let mock = mock();
        mock.queue_bindings(vec![VarBind::new(
            oid!(1, 3, 6, 1, 2, 1, 1, 3, 0),
            Value::Integer(1),
        )]);
        mock.queue_bindings(vec![VarBind::new(
            oid!(1, 3, 6, 1, 2, 1, 1, 1, 0),
            Value::Integer(1),
        )]);
        let err = engine(&mock)
            .get_table(&oid!(1, 3, 6, 1, 2, 1, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NonIncreasingOid { .. }));
    }

    #[tokio::test]
    async fn test_get_next_must_advance() {
        let mock = mock();
        let engine = engine(&mock);
        engine.set_current_oid(oid!(1, 3, 6, 1, 2, 1, 1, 3, 0));
        mock.queue_bindings(vec![VarBind::new(
            oid!(1, 3, 6, 1, 2, 1, 1, 1, 0),
            Value::from("stale"),
        )]);

        let err = engine.step_next().await.unwrap_err();
        match err {
            Error::NonIncreasingOid { previous, current } => {
                assert_eq!(previous, oid!(1, 3, 6, 1, 2, 1, 1, 3, 0));
                assert_eq!(current, oid!(1, 3, 6, 1, 2, 1, 1, 1, 0));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(engine.current_oid(), Some(oid!(1, 3, 6, 1, 2, 1, 1, 3, 0)));
    }

    #[tokio::test]
    async fn test_unknown_encoding_rejected() {
        let mock = mock();
        let config = EngineConfig::default().text_encoding("bogus");
        assert!(matches!(
            Engine::new(mock, config),
            Err(Error::UnknownEncoding { .. })
        ));
    }
}
