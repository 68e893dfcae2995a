//! Common test fixtures and constants.

use snmp_watch::transport::MockTransport;
use snmp_watch::{Engine, EngineConfig, MockEngine, Oid, Value, oid};
use std::net::SocketAddr;
use std::time::Duration;

// =============================================================================
// Standard system MIB OIDs (1.3.6.1.2.1.1.*)
// =============================================================================

pub fn sys_descr() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)
}
pub fn sys_uptime() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 3, 0)
}
pub fn sys_name() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 5, 0)
}
pub fn sys_location() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 6, 0)
}

/// ifEntry: 1.3.6.1.2.1.2.2.1
pub fn if_entry() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 2, 2, 1)
}

/// Nonexistent OID for noSuchObject answers.
pub fn nonexistent_oid() -> Oid {
    oid!(1, 3, 6, 1, 99, 99, 99, 0)
}

pub fn agent_addr() -> SocketAddr {
    "192.0.2.1:161".parse().unwrap()
}

/// GBK encoding of "机房" (machine room).
pub const GBK_MACHINE_ROOM: &[u8] = &[0xBB, 0xFA, 0xB7, 0xBF];

// =============================================================================
// Mock agent
// =============================================================================

/// A mock agent with the system group and a three-interface ifTable.
pub fn populated_mock() -> MockTransport {
    let mock = MockTransport::new(agent_addr());
    mock.insert(sys_descr(), Value::from("Edge router"));
    mock.insert(sys_uptime(), Value::TimeTicks(12_345));
    mock.insert(sys_name(), Value::from("core-sw"));
    mock.insert(sys_location(), Value::octet_string(GBK_MACHINE_ROOM));

    let names = ["lo", "eth0", "eth1"];
    for (i, name) in names.iter().enumerate() {
        let index = i as u32 + 1;
        mock.insert(if_entry().child(1).child(index), Value::Integer(index as i32));
        mock.insert(if_entry().child(2).child(index), Value::from(*name));
        mock.insert(
            if_entry().child(5).child(index),
            Value::Gauge32(1_000_000_000),
        );
    }
    // an object after the table, so walks must stop on subtree exit
    mock.insert(oid!(1, 3, 6, 1, 2, 1, 4, 1, 0), Value::Integer(2));
    mock
}

pub fn test_config() -> EngineConfig {
    EngineConfig::default()
        .timeout(Duration::from_millis(100))
        .retries(1)
}

pub fn engine(mock: &MockTransport) -> MockEngine {
    Engine::new(mock.clone(), test_config()).unwrap()
}

// =============================================================================
// Trap datagrams
// =============================================================================

/// SNMPv2c trap, community "public", request-id 1:
/// sysUpTime.0 = 100, snmpTrapOID.0 = linkDown.
pub const V2C_LINK_DOWN_TRAP: &[u8] = &[
    0x30, 0x40, // Message SEQUENCE
    0x02, 0x01, 0x01, // version 1 (v2c)
    0x04, 0x06, b'p', b'u', b'b', b'l', b'i', b'c', // community
    0xA7, 0x33, // SNMPv2-Trap-PDU
    0x02, 0x01, 0x01, // request-id
    0x02, 0x01, 0x00, // error-status
    0x02, 0x01, 0x00, // error-index
    0x30, 0x28, // varbind list
    0x30, 0x0D, // sysUpTime.0 = TimeTicks 100
    0x06, 0x08, 0x2B, 0x06, 0x01, 0x02, 0x01, 0x01, 0x03, 0x00, //
    0x43, 0x01, 0x64, //
    0x30, 0x17, // snmpTrapOID.0 = linkDown
    0x06, 0x0A, 0x2B, 0x06, 0x01, 0x06, 0x03, 0x01, 0x01, 0x04, 0x01, 0x00, //
    0x06, 0x09, 0x2B, 0x06, 0x01, 0x06, 0x03, 0x01, 0x01, 0x05, 0x03,
];

pub fn snmp_trap_oid() -> Oid {
    oid!(1, 3, 6, 1, 6, 3, 1, 1, 4, 1, 0)
}

pub fn link_down() -> Oid {
    oid!(1, 3, 6, 1, 6, 3, 1, 1, 5, 3)
}

/// SNMPv1 Trap-PDU, community "public", enterprise NET-SNMP-MIB::netSnmpAgentOIDs.10,
/// agent 192.0.2.20, generic linkDown, uptime 100: ifIndex.2 = 2.
pub const V1_LINK_DOWN_TRAP: &[u8] = &[
    0x30, 0x3B, // Message SEQUENCE
    0x02, 0x01, 0x00, // version 0 (v1)
    0x04, 0x06, b'p', b'u', b'b', b'l', b'i', b'c', // community
    0xA4, 0x2E, // Trap-PDU
    0x06, 0x0A, 0x2B, 0x06, 0x01, 0x04, 0x01, 0xBF, 0x08, 0x03, 0x02, 0x0A, // enterprise
    0x40, 0x04, 0xC0, 0x00, 0x02, 0x14, // agent-addr
    0x02, 0x01, 0x02, // generic-trap linkDown(2)
    0x02, 0x01, 0x00, // specific-trap
    0x43, 0x01, 0x64, // time-stamp
    0x30, 0x11, // varbind list
    0x30, 0x0F, // ifIndex.2 = 2
    0x06, 0x0A, 0x2B, 0x06, 0x01, 0x02, 0x01, 0x02, 0x02, 0x01, 0x01, 0x02, //
    0x02, 0x01, 0x02,
];

pub fn if_index_2() -> Oid {
    if_entry().child(1).child(2)
}
