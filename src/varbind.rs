//! Variable binding (VarBind) type and the result of one request.

use crate::error::{Error, Result};
use crate::oid::Oid;
use crate::value::Value;

/// Variable binding - an OID-value pair.
#[derive(Debug, Clone, PartialEq)]
pub struct VarBind {
    /// The object identifier.
    pub oid: Oid,
    /// The value.
    pub value: Value,
}

impl VarBind {
    /// Create a new VarBind.
    pub fn new(oid: Oid, value: Value) -> Self {
        Self { oid, value }
    }

    /// Return self, or `RequestFailed` if the value is Null-like.
    pub fn into_checked(self) -> Result<Self> {
        match self.value.failure() {
            Some(failure) => Err(Error::RequestFailed {
                oid: self.oid,
                failure,
            }),
            None => Ok(self),
        }
    }
}

impl std::fmt::Display for VarBind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.oid, self.value)
    }
}

/// Ordered bindings produced by one request or one walk.
///
/// A failed request is an `Err`, never an empty `PollResult`; an empty
/// result only comes from a walk whose subtree was empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollResult {
    varbinds: Vec<VarBind>,
}

impl PollResult {
    pub fn new(varbinds: Vec<VarBind>) -> Self {
        Self { varbinds }
    }

    pub fn varbinds(&self) -> &[VarBind] {
        &self.varbinds
    }

    pub fn len(&self) -> usize {
        self.varbinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.varbinds.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VarBind> {
        self.varbinds.iter()
    }

    /// First Null-like binding, if any.
    pub fn first_failure(&self) -> Option<&VarBind> {
        self.varbinds.iter().find(|vb| vb.value.is_failure())
    }

    pub fn into_inner(self) -> Vec<VarBind> {
        self.varbinds
    }

    pub(crate) fn push(&mut self, vb: VarBind) {
        self.varbinds.push(vb);
    }
}

impl From<Vec<VarBind>> for PollResult {
    fn from(varbinds: Vec<VarBind>) -> Self {
        Self::new(varbinds)
    }
}

impl IntoIterator for PollResult {
    type Item = VarBind;
    type IntoIter = std::vec::IntoIter<VarBind>;

    fn into_iter(self) -> Self::IntoIter {
        self.varbinds.into_iter()
    }
}

impl<'a> IntoIterator for &'a PollResult {
    type Item = &'a VarBind;
    type IntoIter = std::slice::Iter<'a, VarBind>;

    fn into_iter(self) -> Self::IntoIter {
        self.varbinds.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Failure;
    use crate::oid;

    #[test]
    fn test_varbind_display() {
        let vb = VarBind::new(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::Integer(42));
        assert_eq!(vb.to_string(), "1.3.6.1.2.1.1.1.0 = 42");
    }

    #[test]
    fn test_into_checked() {
        let ok = VarBind::new(oid!(1, 3, 6, 1), Value::Integer(1));
        assert!(ok.into_checked().is_ok());

        let failed = VarBind::new(oid!(1, 3, 6, 1), Value::NoSuchObject);
        match failed.into_checked() {
            Err(Error::RequestFailed { oid, failure }) => {
                assert_eq!(oid, oid!(1, 3, 6, 1));
                assert_eq!(failure, Failure::NoSuchObject);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_poll_result_first_failure() {
        let result = PollResult::new(vec![
            VarBind::new(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::from("router")),
            VarBind::new(oid!(1, 3, 6, 1, 2, 1, 1, 99, 0), Value::Null),
        ]);
        assert_eq!(result.len(), 2);
        assert_eq!(
            result.first_failure().map(|vb| vb.oid.clone()),
            Some(oid!(1, 3, 6, 1, 2, 1, 1, 99, 0))
        );
    }
}
