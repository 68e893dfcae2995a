//! # snmp-watch
//!
//! Async SNMP polling and trap ingestion for tokio.
//!
//! The crate covers the working set of an interactive SNMP browser:
//!
//! - **Requests**: GET, GETNEXT with a stepping cursor, and walk-based table
//!   retrieval through [`Engine`], with per-attempt timeouts and retries.
//! - **Tables**: [`TableGrid`] lays a column-major walk out as rows and
//!   columns without knowing the table's index structure.
//! - **Monitoring**: [`MonitorScheduler`] polls objects on a fixed period and
//!   streams every outcome, failures included.
//! - **Traps**: [`TrapListener`] receives notifications on a UDP port and
//!   streams decoded [`TrapEvent`]s.
//!
//! Values are shown through [`VarBindDecoder`]: non-UTF-8 octet strings are
//! decoded with a configurable legacy encoding (GBK by default), and
//! Null-like answers surface as [`Error::RequestFailed`], never as data.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use snmp_watch::{Credentials, Engine, EngineConfig, oid};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> snmp_watch::Result<()> {
//!     let engine = Engine::connect(
//!         "192.168.1.1:161".parse().unwrap(),
//!         &Credentials::v2c(b"public"),
//!         EngineConfig::default().timeout(Duration::from_secs(2)),
//!     )
//!     .await?;
//!
//!     let result = engine.get(&oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)).await?;
//!     for row in engine.decode(&result)? {
//!         println!("{} = {} [{}]", row.oid, row.text, row.type_name);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Tracing
//!
//! Request flow is logged through `tracing` under the targets
//! `snmp_watch::engine`, `snmp_watch::transport`, `snmp_watch::monitor`
//! and `snmp_watch::trap`:
//!
//! ```bash
//! RUST_LOG=snmp_watch::engine=debug cargo run --features cli --bin snmpwatch-get -- ...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli`: command-line tools (`snmpwatch-get`, `snmpwatch-table`,
//!   `snmpwatch-monitor`, `snmpwatch-traps`)
//! - `rt-multi-thread`: multi-threaded tokio runtime

// Error values carry OIDs inline.
#![allow(clippy::result_large_err)]

pub mod config;
pub mod decode;
pub mod engine;
pub mod error;
pub mod monitor;
pub mod oid;
pub mod prelude;
pub mod table;
pub mod tag;
pub mod transport;
pub mod trap;
pub mod value;
pub mod varbind;
pub mod version;

pub(crate) mod sink;
pub(crate) mod util;

#[cfg(feature = "cli")]
pub mod cli;

pub use config::{Credentials, EngineConfig, ListenerConfig};
pub use decode::{DecodedVarBind, DisplayValue, TextEncoding, VarBindDecoder};
pub use engine::Engine;
pub use error::{
    Error, ErrorStatus, Failure, OidErrorKind, Result, TableErrorKind, TrapErrorKind,
};
pub use monitor::{MonitorEvent, MonitorScheduler};
pub use oid::Oid;
pub use table::{TableBuilder, TableCell, TableColumn, TableGrid};
pub use transport::{MockTransport, Transport, UdpTransport};
pub use trap::{Snmp2TrapDecoder, TrapDecoder, TrapEvent, TrapListener, TrapPdu};
pub use value::Value;
pub use varbind::{PollResult, VarBind};
pub use version::Version;

/// Engine over a real UDP session.
pub type UdpEngine = Engine<UdpTransport>;

/// Engine over the mock transport, for tests.
pub type MockEngine = Engine<MockTransport>;
