//! CLI utilities for snmp-watch.
//!
//! Argument parsing, output formatting and OID name hints for the
//! `snmpwatch-*` tools.
//!
//! This module is only available with the `cli` feature.

pub mod args;
pub mod hints;
pub mod output;
