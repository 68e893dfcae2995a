//! Friendly names for common OIDs.
//!
//! A small hardcoded table of MIB-II objects, used to label output and to
//! accept names such as `sysUpTime.0` or `ifDescr` on the command line.
//! This is not MIB support.

use crate::Oid;

/// Object name table, keyed by the object's OID (no instance suffix).
static NAMES: &[(&[u32], &str)] = &[
    // SNMPv2-MIB::system
    (&[1, 3, 6, 1, 2, 1, 1], "system"),
    (&[1, 3, 6, 1, 2, 1, 1, 1], "sysDescr"),
    (&[1, 3, 6, 1, 2, 1, 1, 2], "sysObjectID"),
    (&[1, 3, 6, 1, 2, 1, 1, 3], "sysUpTime"),
    (&[1, 3, 6, 1, 2, 1, 1, 4], "sysContact"),
    (&[1, 3, 6, 1, 2, 1, 1, 5], "sysName"),
    (&[1, 3, 6, 1, 2, 1, 1, 6], "sysLocation"),
    (&[1, 3, 6, 1, 2, 1, 1, 7], "sysServices"),
    // IF-MIB::interfaces
    (&[1, 3, 6, 1, 2, 1, 2], "interfaces"),
    (&[1, 3, 6, 1, 2, 1, 2, 1], "ifNumber"),
    (&[1, 3, 6, 1, 2, 1, 2, 2], "ifTable"),
    (&[1, 3, 6, 1, 2, 1, 2, 2, 1], "ifEntry"),
    (&[1, 3, 6, 1, 2, 1, 2, 2, 1, 1], "ifIndex"),
    (&[1, 3, 6, 1, 2, 1, 2, 2, 1, 2], "ifDescr"),
    (&[1, 3, 6, 1, 2, 1, 2, 2, 1, 3], "ifType"),
    (&[1, 3, 6, 1, 2, 1, 2, 2, 1, 4], "ifMtu"),
    (&[1, 3, 6, 1, 2, 1, 2, 2, 1, 5], "ifSpeed"),
    (&[1, 3, 6, 1, 2, 1, 2, 2, 1, 6], "ifPhysAddress"),
    (&[1, 3, 6, 1, 2, 1, 2, 2, 1, 7], "ifAdminStatus"),
    (&[1, 3, 6, 1, 2, 1, 2, 2, 1, 8], "ifOperStatus"),
    (&[1, 3, 6, 1, 2, 1, 2, 2, 1, 10], "ifInOctets"),
    (&[1, 3, 6, 1, 2, 1, 2, 2, 1, 16], "ifOutOctets"),
    // SNMPv2-MIB notification objects
    (&[1, 3, 6, 1, 6, 3, 1, 1, 4, 1], "snmpTrapOID"),
    (&[1, 3, 6, 1, 6, 3, 1, 1, 5, 1], "coldStart"),
    (&[1, 3, 6, 1, 6, 3, 1, 1, 5, 2], "warmStart"),
    (&[1, 3, 6, 1, 6, 3, 1, 1, 5, 3], "linkDown"),
    (&[1, 3, 6, 1, 6, 3, 1, 1, 5, 4], "linkUp"),
    (&[1, 3, 6, 1, 6, 3, 1, 1, 5, 5], "authenticationFailure"),
];

/// Label an OID with the longest known object name, plus its instance suffix.
///
/// `1.3.6.1.2.1.2.2.1.2.3` becomes `ifDescr.3`.
pub fn lookup(oid: &Oid) -> Option<String> {
    let arcs = oid.arcs();
    let (prefix, name) = NAMES
        .iter()
        .filter(|(prefix, _)| arcs.starts_with(prefix))
        .max_by_key(|(prefix, _)| prefix.len())?;

    let suffix = &arcs[prefix.len()..];
    if suffix.is_empty() {
        return Some((*name).to_string());
    }
    let suffix: Vec<String> = suffix.iter().map(u32::to_string).collect();
    Some(format!("{}.{}", name, suffix.join(".")))
}

/// Parse dotted notation or a known name with an optional instance suffix.
///
/// Accepts `1.3.6.1.2.1.1.3.0`, `sysUpTime.0`, `ifTable`.
pub fn parse_oid(s: &str) -> Result<Oid, String> {
    let s = s.trim();
    if s.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return Oid::parse(s).map_err(|e| format!("invalid OID '{}': {}", s, e));
    }

    let (name, suffix) = match s.split_once('.') {
        Some((name, suffix)) => (name, Some(suffix)),
        None => (s, None),
    };
    let base = NAMES
        .iter()
        .find(|(_, known)| known.eq_ignore_ascii_case(name))
        .map(|(arcs, _)| Oid::from_slice(arcs))
        .ok_or_else(|| {
            format!(
                "unknown OID name '{}'; use dotted notation (e.g. 1.3.6.1.2.1.1.3.0)",
                name
            )
        })?;

    match suffix {
        None => Ok(base),
        Some(suffix) => {
            let suffix = Oid::parse(suffix).map_err(|e| format!("invalid OID '{}': {}", s, e))?;
            Ok(base.concat(&suffix))
        }
    }
}
