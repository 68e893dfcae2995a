//! Prelude module for convenient imports.
//!
//! ```rust,no_run
//! use snmp_watch::prelude::*;
//! ```
//!
//! Brings in the engine, scheduler and listener types, the value types,
//! [`Error`] / [`Result`], and the [`oid!`] macro.

pub use crate::config::{Credentials, EngineConfig, ListenerConfig};
pub use crate::decode::{DecodedVarBind, VarBindDecoder};
pub use crate::engine::Engine;
pub use crate::error::{Error, Result};
pub use crate::monitor::{MonitorEvent, MonitorScheduler};
pub use crate::oid::Oid;
pub use crate::table::TableGrid;
pub use crate::trap::{TrapEvent, TrapListener};
pub use crate::value::Value;
pub use crate::varbind::{PollResult, VarBind};
pub use crate::version::Version;

#[doc(no_inline)]
pub use crate::oid;
