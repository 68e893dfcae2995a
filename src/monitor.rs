//! Periodic polling of monitored objects.
//!
//! Each entry owns one tokio task that polls its OID on a fixed period and
//! delivers a [`MonitorEvent`] per tick, success or failure. Entries live
//! until [`MonitorScheduler::remove`] or shutdown; a failing poll never
//! pauses or removes its entry.
//!
//! # Example
//!
//! ```rust,no_run
//! use snmp_watch::{Credentials, Engine, EngineConfig};
//! use snmp_watch::monitor::MonitorScheduler;
//! use std::time::Duration;
//!
//! # async fn example() -> snmp_watch::Result<()> {
//! let engine = Engine::connect(
//!     "192.168.1.1:161".parse().unwrap(),
//!     &Credentials::v2c(b"public"),
//!     EngineConfig::default(),
//! )
//! .await?;
//!
//! let (monitor, mut events) = MonitorScheduler::new(engine);
//! monitor.add("1.3.6.1.2.1.1.3.0", Duration::from_secs(5))?;
//!
//! while let Some(event) = events.recv().await {
//!     match event.outcome {
//!         Ok(rows) => println!("{}: {}", event.key, rows[0].text),
//!         Err(e) => println!("{}: {}", event.key, e),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::decode::DecodedVarBind;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::oid::Oid;
use crate::sink::Gate;
use crate::transport::{Transport, UdpTransport};

/// Outcome of one monitor tick.
#[derive(Debug)]
pub struct MonitorEvent {
    pub key: String,
    pub at: SystemTime,
    pub outcome: Result<Vec<DecodedVarBind>>,
}

impl MonitorEvent {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

struct MonitorEntry {
    interval: Duration,
    gate: Arc<Gate<MonitorEvent>>,
    task: JoinHandle<()>,
}

impl MonitorEntry {
    fn stop(self) {
        self.gate.close();
        self.task.abort();
    }
}

/// Registry of monitored objects, keyed by OID text.
///
/// Must be used from within a tokio runtime.
pub struct MonitorScheduler<T: Transport = UdpTransport> {
    engine: Engine<T>,
    sender: UnboundedSender<MonitorEvent>,
    entries: Mutex<HashMap<String, MonitorEntry>>,
}

impl<T: Transport> MonitorScheduler<T> {
    /// Create a scheduler and the receiver its events arrive on.
    pub fn new(engine: Engine<T>) -> (Self, UnboundedReceiver<MonitorEvent>) {
        let (sender, receiver) = unbounded_channel();
        let scheduler = Self {
            engine,
            sender,
            entries: Mutex::new(HashMap::new()),
        };
        (scheduler, receiver)
    }

    pub fn engine(&self) -> &Engine<T> {
        &self.engine
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, MonitorEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start polling `key` (dotted OID text) with GET every `interval`.
    ///
    /// The first poll happens one interval after the call.
    pub fn add(&self, key: &str, interval: Duration) -> Result<()> {
        let oid = Oid::parse(key)?;
        let engine = self.engine.clone();
        self.add_with(key, interval, move || {
            let engine = engine.clone();
            let oid = oid.clone();
            async move { engine.poll(&oid).await }
        })
    }

    /// Start polling `key` with the engine's configured interval.
    pub fn add_default(&self, key: &str) -> Result<()> {
        self.add(key, self.engine.config().monitor_interval)
    }

    /// Start polling `key` with a custom poll function.
    pub fn add_with<F, Fut>(&self, key: &str, interval: Duration, poll: F) -> Result<()>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<DecodedVarBind>>> + Send + 'static,
    {
        if interval.is_zero() {
            return Err(Error::ZeroInterval);
        }

        let mut entries = self.lock();
        if entries.contains_key(key) {
            tracing::debug!(target: "snmp_watch::monitor", { monitor.key = key }, "already monitored");
            return Err(Error::DuplicateKey {
                key: key.to_string(),
            });
        }

        let gate = Arc::new(Gate::new(self.sender.clone()));
        let task = tokio::spawn(run_entry(key.to_string(), interval, gate.clone(), poll));
        entries.insert(
            key.to_string(),
            MonitorEntry {
                interval,
                gate,
                task,
            },
        );

        tracing::debug!(target: "snmp_watch::monitor", { monitor.key = key, ?interval }, "monitor added");
        Ok(())
    }

    /// Stop polling `key`. Returns `false` if it was not monitored.
    ///
    /// No event for `key` is delivered after this returns.
    pub fn remove(&self, key: &str) -> bool {
        let entry = self.lock().remove(key);
        match entry {
            Some(entry) => {
                entry.stop();
                tracing::debug!(target: "snmp_watch::monitor", { monitor.key = key }, "monitor removed");
                true
            }
            None => false,
        }
    }

    /// Monitored keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    pub fn interval(&self, key: &str) -> Option<Duration> {
        self.lock().get(key).map(|entry| entry.interval)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Stop every entry.
    pub fn shutdown(&self) {
        let drained: Vec<MonitorEntry> = self.lock().drain().map(|(_, entry)| entry).collect();
        if !drained.is_empty() {
            tracing::debug!(target: "snmp_watch::monitor", { monitor.count = drained.len() }, "monitor shutdown");
        }
        for entry in drained {
            entry.stop();
        }
    }
}

impl<T: Transport> Drop for MonitorScheduler<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn run_entry<F, Fut>(key: String, period: Duration, gate: Arc<Gate<MonitorEvent>>, poll: F)
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<DecodedVarBind>>> + Send + 'static,
{
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let outcome = poll().await;
        if let Err(e) = &outcome {
            tracing::warn!(target: "snmp_watch::monitor", { monitor.key = %key, error = %e }, "poll failed");
        }

        let event = MonitorEvent {
            key: key.clone(),
            at: SystemTime::now(),
            outcome,
        };
        if !gate.deliver(event) {
            tracing::trace!(target: "snmp_watch::monitor", { monitor.key = %key }, "sink closed, stopping");
            break;
        }
    }
}
