//! SNMP value types.
//!
//! The `Value` enum represents all SNMP data types including exceptions.

use crate::error::Failure;
use crate::oid::Oid;
use crate::tag::{application, context, universal};
use bytes::Bytes;

/// SNMP value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// INTEGER (ASN.1 primitive, signed 32-bit)
    Integer(i32),

    /// OCTET STRING.
    ///
    /// `hex` marks content that is not plain printable text. Such strings are
    /// decoded with the configured legacy encoding instead of as UTF-8; use
    /// [`Value::octet_string`] to have the flag computed.
    OctetString { data: Bytes, hex: bool },

    /// NULL
    Null,

    /// OBJECT IDENTIFIER
    ObjectIdentifier(Oid),

    /// IpAddress (4 bytes, big-endian)
    IpAddress([u8; 4]),

    /// Counter32 (unsigned 32-bit, wrapping)
    Counter32(u32),

    /// Gauge32 / Unsigned32 (unsigned 32-bit, non-wrapping)
    Gauge32(u32),

    /// TimeTicks (hundredths of seconds)
    TimeTicks(u32),

    /// Opaque (legacy, arbitrary bytes)
    Opaque(Bytes),

    /// Counter64 (unsigned 64-bit, wrapping). SNMPv2c and later.
    Counter64(u64),

    /// noSuchObject exception.
    NoSuchObject,

    /// noSuchInstance exception.
    NoSuchInstance,

    /// endOfMibView exception, the normal end of a walk.
    EndOfMibView,
}

/// Whether octet string content must be shown as non-UTF-8 data.
///
/// Any byte above 0x7F, or a control byte other than TAB, LF and CR, sets the
/// flag. A single trailing NUL (C string terminator) is tolerated.
pub fn is_hex_content(data: &[u8]) -> bool {
    let last = data.len().saturating_sub(1);
    data.iter().enumerate().any(|(i, &b)| match b {
        0x80..=0xFF => true,
        b'\t' | b'\n' | b'\r' => false,
        0 if i == last => false,
        0x00..=0x1F | 0x7F => true,
        _ => false,
    })
}

impl Value {
    /// Build an OCTET STRING, detecting whether it needs legacy decoding.
    pub fn octet_string(data: impl Into<Bytes>) -> Self {
        let data = data.into();
        let hex = is_hex_content(&data);
        Value::OctetString { data, hex }
    }

    /// BER tag this value is carried under.
    pub fn tag(&self) -> u8 {
        match self {
            Value::Integer(_) => universal::INTEGER,
            Value::OctetString { .. } => universal::OCTET_STRING,
            Value::Null => universal::NULL,
            Value::ObjectIdentifier(_) => universal::OBJECT_IDENTIFIER,
            Value::IpAddress(_) => application::IP_ADDRESS,
            Value::Counter32(_) => application::COUNTER32,
            Value::Gauge32(_) => application::GAUGE32,
            Value::TimeTicks(_) => application::TIMETICKS,
            Value::Opaque(_) => application::OPAQUE,
            Value::Counter64(_) => application::COUNTER64,
            Value::NoSuchObject => context::NO_SUCH_OBJECT,
            Value::NoSuchInstance => context::NO_SUCH_INSTANCE,
            Value::EndOfMibView => context::END_OF_MIB_VIEW,
        }
    }

    /// Type name for display (e.g. `"TimeTicks"`).
    pub fn type_name(&self) -> &'static str {
        crate::tag::type_name(self.tag())
    }

    /// The failure this value signals, if it is Null-like.
    pub fn failure(&self) -> Option<Failure> {
        match self {
            Value::Null => Some(Failure::Null),
            Value::NoSuchObject => Some(Failure::NoSuchObject),
            Value::NoSuchInstance => Some(Failure::NoSuchInstance),
            Value::EndOfMibView => Some(Failure::EndOfMibView),
            _ => None,
        }
    }

    /// Returns `true` for Null and the three exception values.
    pub fn is_failure(&self) -> bool {
        self.failure().is_some()
    }

    /// Raw bytes of an OCTET STRING or Opaque.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::OctetString { data, .. } | Value::Opaque(data) => Some(data),
            _ => None,
        }
    }
}

fn write_hex(f: &mut std::fmt::Formatter<'_>, data: &[u8]) -> std::fmt::Result {
    for (i, b) in data.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{:02X}", b)?;
    }
    Ok(())
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{}", v),
            Value::OctetString { data, hex: false } => {
                write!(f, "{}", String::from_utf8_lossy(data))
            }
            Value::OctetString { data, hex: true } => write_hex(f, data),
            Value::Null => write!(f, "Null"),
            Value::ObjectIdentifier(oid) => write!(f, "{}", oid),
            Value::IpAddress(addr) => {
                write!(f, "{}.{}.{}.{}", addr[0], addr[1], addr[2], addr[3])
            }
            Value::Counter32(v) => write!(f, "{}", v),
            Value::Gauge32(v) => write!(f, "{}", v),
            Value::TimeTicks(v) => {
                let secs = v / 100;
                let days = secs / 86400;
                let hours = (secs % 86400) / 3600;
                let mins = (secs % 3600) / 60;
                let s = secs % 60;
                let ms = (v % 100) * 10;
                write!(f, "{}d {}h {}m {}s {}ms", days, hours, mins, s, ms)
            }
            Value::Opaque(data) => write_hex(f, data),
            Value::Counter64(v) => write!(f, "{}", v),
            Value::NoSuchObject => write!(f, "noSuchObject"),
            Value::NoSuchInstance => write!(f, "noSuchInstance"),
            Value::EndOfMibView => write!(f, "endOfMibView"),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::octet_string(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<Oid> for Value {
    fn from(oid: Oid) -> Self {
        Value::ObjectIdentifier(oid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;

    #[test]
    fn test_hex_detection_plain_text() {
        assert!(!is_hex_content(b"Linux router 5.15"));
        assert!(!is_hex_content(b"line one\r\nline two\t"));
        assert!(!is_hex_content(b""));
    }

    #[test]
    fn test_hex_detection_trailing_nul() {
        assert!(!is_hex_content(b"eth0\0"));
        assert!(is_hex_content(b"eth\x000"));
    }

    #[test]
    fn test_hex_detection_binary_and_high_bytes() {
        assert!(is_hex_content(&[0x00, 0x1B, 0x21, 0x3C, 0x4D, 0x5E]));
        // "交换机" in GBK
        assert!(is_hex_content(&[0xBD, 0xBB, 0xBB, 0xBB, 0xBB, 0xFA]));
        assert!(is_hex_content(b"bell\x07"));
    }

    #[test]
    fn test_octet_string_constructor_sets_flag() {
        assert!(matches!(
            Value::octet_string(&b"public"[..]),
            Value::OctetString { hex: false, .. }
        ));
        assert!(matches!(
            Value::octet_string(vec![0xC4, 0xE3]),
            Value::OctetString { hex: true, .. }
        ));
    }

    #[test]
    fn test_failure_values() {
        assert_eq!(Value::Null.failure(), Some(Failure::Null));
        assert_eq!(Value::NoSuchObject.failure(), Some(Failure::NoSuchObject));
        assert_eq!(Value::NoSuchInstance.failure(), Some(Failure::NoSuchInstance));
        assert_eq!(Value::EndOfMibView.failure(), Some(Failure::EndOfMibView));
        assert!(!Value::Integer(0).is_failure());
        assert!(!Value::from("").is_failure());
    }

    #[test]
    fn test_tags_and_type_names() {
        assert_eq!(Value::Integer(1).tag(), 0x02);
        assert_eq!(Value::Counter64(1).tag(), 0x46);
        assert_eq!(Value::TimeTicks(1).type_name(), "TimeTicks");
        assert_eq!(Value::from(oid!(1, 3)).type_name(), "ObjectId");
        assert_eq!(Value::NoSuchInstance.type_name(), "noSuchInstance");
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Integer(-7).to_string(), "-7");
        assert_eq!(Value::IpAddress([10, 0, 0, 1]).to_string(), "10.0.0.1");
        assert_eq!(Value::TimeTicks(8_640_123).to_string(), "1d 0h 0m 1s 230ms");
        assert_eq!(
            Value::octet_string(vec![0x00, 0x1B, 0xFF]).to_string(),
            "00 1B FF"
        );
        assert_eq!(Value::from("eth0").to_string(), "eth0");
    }
}
