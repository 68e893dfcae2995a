//! Conversions between `snmp2` wire types and this crate's types.

use bytes::Bytes;

use crate::oid::Oid;
use crate::value::Value;
use crate::varbind::VarBind;

/// Why one wire binding could not be converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ConvertError {
    /// An arc does not fit in 32 bits.
    OidArc,
    /// INTEGER outside the 32-bit range.
    IntegerRange(i64),
    /// A value type SNMP does not carry in bindings.
    UnsupportedType(&'static str),
}

impl std::fmt::Display for ConvertError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OidArc => write!(f, "OID arc exceeds 32 bits"),
            Self::IntegerRange(v) => write!(f, "INTEGER {} out of range", v),
            Self::UnsupportedType(t) => write!(f, "unsupported value type {}", t),
        }
    }
}

pub(crate) fn to_wire_oid(oid: &Oid) -> Result<snmp2::Oid<'static>, String> {
    let arcs: Vec<u64> = oid.arcs().iter().map(|&a| u64::from(a)).collect();
    snmp2::Oid::from(&arcs).map_err(|e| format!("cannot encode OID {}: {:?}", oid, e))
}

pub(crate) fn from_wire_oid(oid: &snmp2::Oid<'_>) -> Result<Oid, ConvertError> {
    let arcs = oid.iter().ok_or(ConvertError::OidArc)?;
    arcs.map(|arc| u32::try_from(arc).map_err(|_| ConvertError::OidArc))
        .collect::<Result<Vec<u32>, _>>()
        .map(Oid::new)
}

pub(crate) fn from_wire_value(value: snmp2::Value<'_>) -> Result<Value, ConvertError> {
    use snmp2::Value as W;

    Ok(match value {
        W::Integer(v) => Value::Integer(i32::try_from(v).map_err(|_| ConvertError::IntegerRange(v))?),
        W::OctetString(data) => Value::octet_string(Bytes::copy_from_slice(data)),
        W::Null => Value::Null,
        W::ObjectIdentifier(oid) => Value::ObjectIdentifier(from_wire_oid(&oid)?),
        W::IpAddress(addr) => Value::IpAddress(addr),
        W::Counter32(v) => Value::Counter32(v),
        W::Unsigned32(v) => Value::Gauge32(v),
        W::Timeticks(v) => Value::TimeTicks(v),
        W::Opaque(data) => Value::Opaque(Bytes::copy_from_slice(data)),
        W::Counter64(v) => Value::Counter64(v),
        W::EndOfMibView => Value::EndOfMibView,
        W::NoSuchObject => Value::NoSuchObject,
        W::NoSuchInstance => Value::NoSuchInstance,
        W::Boolean(_) => return Err(ConvertError::UnsupportedType("BOOLEAN")),
        _ => return Err(ConvertError::UnsupportedType("constructed")),
    })
}

pub(crate) fn from_wire_binding(
    oid: snmp2::Oid<'_>,
    value: snmp2::Value<'_>,
) -> Result<VarBind, ConvertError> {
    Ok(VarBind::new(from_wire_oid(&oid)?, from_wire_value(value)?))
}
