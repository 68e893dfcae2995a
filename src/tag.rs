//! BER tags for SNMP values and message headers.
//!
//! Values carry their wire tag through [`Value::tag`](crate::value::Value::tag);
//! the trap header reader uses the universal tags to sniff the message version.

/// Universal tags (class bits 00)
pub mod universal {
    pub const INTEGER: u8 = 0x02;
    pub const OCTET_STRING: u8 = 0x04;
    pub const NULL: u8 = 0x05;
    pub const OBJECT_IDENTIFIER: u8 = 0x06;
    pub const SEQUENCE: u8 = 0x30; // Constructed
}

/// Application tags (class bits 01) - SNMP-specific types
pub mod application {
    pub const IP_ADDRESS: u8 = 0x40;
    pub const COUNTER32: u8 = 0x41;
    pub const GAUGE32: u8 = 0x42; // Also Unsigned32
    pub const TIMETICKS: u8 = 0x43;
    pub const OPAQUE: u8 = 0x44;
    pub const COUNTER64: u8 = 0x46;
}

/// Context-specific tags (class bits 10) - Exception values
pub mod context {
    pub const NO_SUCH_OBJECT: u8 = 0x80;
    pub const NO_SUCH_INSTANCE: u8 = 0x81;
    pub const END_OF_MIB_VIEW: u8 = 0x82;
}

/// Type name shown next to a value, keyed by wire tag.
pub fn type_name(tag: u8) -> &'static str {
    match tag {
        universal::INTEGER => "Integer32",
        universal::OCTET_STRING => "OctetString",
        universal::NULL => "Null",
        universal::OBJECT_IDENTIFIER => "ObjectId",
        application::IP_ADDRESS => "IPAddress",
        application::COUNTER32 => "Counter32",
        application::GAUGE32 => "Gauge32",
        application::TIMETICKS => "TimeTicks",
        application::OPAQUE => "Opaque",
        application::COUNTER64 => "Counter64",
        context::NO_SUCH_OBJECT => "noSuchObject",
        context::NO_SUCH_INSTANCE => "noSuchInstance",
        context::END_OF_MIB_VIEW => "endOfMibView",
        _ => "Unknown",
    }
}
