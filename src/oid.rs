//! Object Identifier (OID) type.
//!
//! OIDs are stored as `SmallVec<[u32; 16]>` to avoid heap allocation for common OIDs.
//!
//! Besides the usual prefix tests, [`Oid`] carries the path arithmetic used
//! to lay out conceptual tables: cutting a shared root, reading the arc at a
//! 1-based level, and truncating after a level.

use crate::error::{Error, OidErrorKind, Result};
use smallvec::SmallVec;
use std::fmt;
use std::num::IntErrorKind;

/// Object Identifier.
///
/// Stored as a sequence of arc values (u32). Uses SmallVec to avoid
/// heap allocation for OIDs with 16 or fewer arcs.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Oid {
    arcs: SmallVec<[u32; 16]>,
}

impl Oid {
    /// Create an empty OID.
    ///
    /// Only produced by path arithmetic (e.g. cutting an OID by itself);
    /// [`Oid::parse`] never returns one.
    pub fn empty() -> Self {
        Self {
            arcs: SmallVec::new(),
        }
    }

    /// Create an OID from arc values.
    pub fn new(arcs: impl IntoIterator<Item = u32>) -> Self {
        Self {
            arcs: arcs.into_iter().collect(),
        }
    }

    /// Create an OID from a slice of arcs.
    pub fn from_slice(arcs: &[u32]) -> Self {
        Self {
            arcs: SmallVec::from_slice(arcs),
        }
    }

    /// Parse an OID from dotted notation (e.g. `"1.3.6.1.2.1.1.3.0"`).
    ///
    /// A single leading dot is accepted (`".1.3.6.1"`). Empty input, empty
    /// segments, signs, non-digits and arcs above `u32::MAX` are rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use snmp_watch::oid::Oid;
    ///
    /// let oid = Oid::parse("1.3.6.1.2.1.1.3.0").unwrap();
    /// assert_eq!(oid.levels(), 9);
    ///
    /// assert!(Oid::parse("").is_err());
    /// assert!(Oid::parse("1.-3.6").is_err());
    /// assert!(Oid::parse("1..3").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let body = s.strip_prefix('.').unwrap_or(s);
        if body.is_empty() {
            return Err(Error::invalid_oid(OidErrorKind::Empty, s));
        }

        let mut arcs = SmallVec::new();
        for part in body.split('.') {
            if part.is_empty() {
                return Err(Error::invalid_oid(OidErrorKind::EmptyArc, s));
            }
            if !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(Error::invalid_oid(OidErrorKind::InvalidArc, s));
            }
            let arc: u32 = part.parse().map_err(|e: std::num::ParseIntError| {
                let kind = match e.kind() {
                    IntErrorKind::PosOverflow => OidErrorKind::ArcOverflow,
                    _ => OidErrorKind::InvalidArc,
                };
                Error::invalid_oid(kind, s)
            })?;
            arcs.push(arc);
        }

        Ok(Self { arcs })
    }

    /// Get the arc values.
    pub fn arcs(&self) -> &[u32] {
        &self.arcs
    }

    /// Number of levels (arcs).
    pub fn levels(&self) -> usize {
        self.arcs.len()
    }

    /// Check if the OID is empty.
    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// Check if this OID starts with another OID.
    ///
    /// An OID always starts with itself, and any OID starts with an empty OID.
    pub fn starts_with(&self, other: &Oid) -> bool {
        self.arcs.len() >= other.arcs.len() && self.arcs[..other.arcs.len()] == other.arcs[..]
    }

    /// Strip `root` from the front of this OID and return what remains.
    ///
    /// Callers are expected to check [`starts_with`](Self::starts_with)
    /// first; a `root` that is not a prefix is an error.
    ///
    /// # Examples
    ///
    /// ```
    /// use snmp_watch::oid;
    ///
    /// let entry = oid!(1, 3, 6, 1, 2, 1, 2, 2, 1);
    /// let cell = oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 2, 7);
    /// assert_eq!(cell.cut_common_root(&entry).unwrap(), oid!(2, 7));
    /// ```
    pub fn cut_common_root(&self, root: &Oid) -> Result<Oid> {
        if !self.starts_with(root) {
            return Err(Error::NotUnderRoot {
                oid: self.clone(),
                root: root.clone(),
            });
        }
        Ok(Oid::from_slice(&self.arcs[root.arcs.len()..]))
    }

    /// Arc at a 1-based level.
    pub fn level_value(&self, level: usize) -> Result<u32> {
        level
            .checked_sub(1)
            .and_then(|idx| self.arcs.get(idx))
            .copied()
            .ok_or(Error::LevelOutOfRange {
                level,
                levels: self.arcs.len(),
            })
    }

    /// Keep the first `n` levels. Returns the whole OID when `n >= levels()`.
    pub fn cut_after_level(&self, n: usize) -> Oid {
        let end = n.min(self.arcs.len());
        Oid::from_slice(&self.arcs[..end])
    }

    /// Get the parent OID (all arcs except the last).
    ///
    /// Returns `None` if the OID is empty.
    pub fn parent(&self) -> Option<Oid> {
        let (_, head) = self.arcs.split_last()?;
        Some(Oid::from_slice(head))
    }

    /// Create a child OID by appending an arc.
    pub fn child(&self, arc: u32) -> Oid {
        let mut arcs = self.arcs.clone();
        arcs.push(arc);
        Oid { arcs }
    }

    /// Append all arcs of `suffix`.
    pub fn concat(&self, suffix: &Oid) -> Oid {
        let mut arcs = self.arcs.clone();
        arcs.extend_from_slice(&suffix.arcs);
        Oid { arcs }
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({})", self)
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for arc in &self.arcs {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{}", arc)?;
            first = false;
        }
        Ok(())
    }
}

impl std::str::FromStr for Oid {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<&[u32]> for Oid {
    fn from(arcs: &[u32]) -> Self {
        Self::from_slice(arcs)
    }
}

impl<const N: usize> From<[u32; N]> for Oid {
    fn from(arcs: [u32; N]) -> Self {
        Self::new(arcs)
    }
}

impl PartialOrd for Oid {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Oid {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.arcs.cmp(&other.arcs)
    }
}

/// Macro to create an OID from literal arcs.
///
/// # Examples
///
/// ```
/// use snmp_watch::oid;
///
/// let sys_uptime = oid!(1, 3, 6, 1, 2, 1, 1, 3, 0);
/// assert_eq!(sys_uptime.to_string(), "1.3.6.1.2.1.1.3.0");
/// ```
#[macro_export]
macro_rules! oid {
    ($($arc:expr),* $(,)?) => {
        $crate::oid::Oid::from_slice(&[$($arc),*])
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse() {
        let oid = Oid::parse("1.3.6.1.2.1.1.1.0").unwrap();
        assert_eq!(oid.arcs(), &[1, 3, 6, 1, 2, 1, 1, 1, 0]);
    }

    #[test]
    fn test_parse_leading_dot() {
        let oid = Oid::parse(".1.3.6.1").unwrap();
        assert_eq!(oid.arcs(), &[1, 3, 6, 1]);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        let cases = [
            ("", OidErrorKind::Empty),
            (".", OidErrorKind::Empty),
            ("1..3", OidErrorKind::EmptyArc),
            ("1.3.", OidErrorKind::EmptyArc),
            ("1.-3.6", OidErrorKind::InvalidArc),
            ("1.+3", OidErrorKind::InvalidArc),
            ("1.three", OidErrorKind::InvalidArc),
            ("1 .3", OidErrorKind::InvalidArc),
            ("1.4294967296", OidErrorKind::ArcOverflow),
        ];
        for (input, expected) in cases {
            match Oid::parse(input) {
                Err(Error::InvalidOid { kind, .. }) => assert_eq!(kind, expected, "{input:?}"),
                other => panic!("{input:?}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_display() {
        let oid = Oid::from_slice(&[1, 3, 6, 1, 2, 1, 1, 1, 0]);
        assert_eq!(oid.to_string(), "1.3.6.1.2.1.1.1.0");
    }

    #[test]
    fn test_starts_with() {
        let oid = Oid::parse("1.3.6.1.2.1.1.1.0").unwrap();
        let prefix = Oid::parse("1.3.6.1").unwrap();
        assert!(oid.starts_with(&prefix));
        assert!(!prefix.starts_with(&oid));
    }

    #[test]
    fn test_cut_common_root() {
        let oid = oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 10, 3);
        let root = oid!(1, 3, 6, 1, 2, 1, 2, 2, 1);
        assert_eq!(oid.cut_common_root(&root).unwrap(), oid!(10, 3));
        assert!(oid.cut_common_root(&oid).unwrap().is_empty());
    }

    #[test]
    fn test_cut_common_root_not_prefix() {
        let oid = oid!(1, 3, 6, 1, 2, 1, 1, 3, 0);
        let root = oid!(1, 3, 6, 1, 2, 1, 2);
        assert!(matches!(
            oid.cut_common_root(&root),
            Err(Error::NotUnderRoot { .. })
        ));
    }

    #[test]
    fn test_level_value() {
        let oid = oid!(1, 3, 6, 1, 4);
        assert_eq!(oid.level_value(1).unwrap(), 1);
        assert_eq!(oid.level_value(5).unwrap(), 4);
        assert!(matches!(
            oid.level_value(6),
            Err(Error::LevelOutOfRange {
                level: 6,
                levels: 5
            })
        ));
        assert!(matches!(
            oid.level_value(0),
            Err(Error::LevelOutOfRange { level: 0, .. })
        ));
    }

    #[test]
    fn test_cut_after_level() {
        let oid = oid!(1, 3, 6, 1, 2, 1);
        assert_eq!(oid.cut_after_level(3), oid!(1, 3, 6));
        assert_eq!(oid.cut_after_level(0), Oid::empty());
        assert_eq!(oid.cut_after_level(42), oid);
    }

    #[test]
    fn test_parent_child() {
        let oid = oid!(1, 3, 6);
        assert_eq!(oid.parent(), Some(oid!(1, 3)));
        assert_eq!(oid.child(1), oid!(1, 3, 6, 1));
        assert!(Oid::empty().parent().is_none());
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        assert!(oid!(1, 3, 6, 1, 2) < oid!(1, 3, 6, 1, 10));
        assert!(oid!(1, 3, 6) < oid!(1, 3, 6, 0));
    }

    #[test]
    fn test_oid_fromstr() {
        let oid: Oid = "1.3.6.1.2.1.1.5.0".parse().unwrap();
        assert_eq!(oid, oid!(1, 3, 6, 1, 2, 1, 1, 5, 0));
    }

    fn arb_arcs() -> impl Strategy<Value = Vec<u32>> {
        prop::collection::vec(any::<u32>(), 1..=24)
    }

    proptest! {
        #[test]
        fn prop_dotted_roundtrip(arcs in arb_arcs()) {
            let text = arcs.iter().map(u32::to_string).collect::<Vec<_>>().join(".");
            let oid = Oid::parse(&text).unwrap();
            prop_assert_eq!(oid.to_string(), text);
            prop_assert_eq!(oid.arcs(), &arcs[..]);
        }

        #[test]
        fn prop_cut_then_concat_restores(arcs in arb_arcs(), split in 0usize..=24) {
            let oid = Oid::new(arcs.clone());
            let root = oid.cut_after_level(split);
            let suffix = oid.cut_common_root(&root).unwrap();
            prop_assert_eq!(root.concat(&suffix), oid.clone());
            prop_assert_eq!(root.levels() + suffix.levels(), oid.levels());
        }

        #[test]
        fn prop_level_value_matches_arcs(arcs in arb_arcs()) {
            let oid = Oid::new(arcs.clone());
            for (i, arc) in arcs.iter().enumerate() {
                prop_assert_eq!(oid.level_value(i + 1).unwrap(), *arc);
            }
            prop_assert!(oid.level_value(arcs.len() + 1).is_err());
        }
    }
}
