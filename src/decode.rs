//! Variable binding decoder.
//!
//! Turns a tagged [`Value`] into display text plus a type name. Null-like
//! values are failures, not data: the agent answered but had nothing to
//! report, so they come back as [`Error::RequestFailed`].

use encoding_rs::Encoding;

use crate::error::{Error, Failure, Result};
use crate::oid::Oid;
use crate::value::Value;
use crate::varbind::{PollResult, VarBind};

/// Legacy byte-oriented text encoding for hex-flagged octet strings.
#[derive(Clone, Copy)]
pub struct TextEncoding(&'static Encoding);

impl TextEncoding {
    /// Resolve a WHATWG encoding label such as `"gbk"`, `"big5"` or
    /// `"windows-1251"`.
    pub fn for_label(label: &str) -> Result<Self> {
        Encoding::for_label(label.trim().as_bytes())
            .map(Self)
            .ok_or_else(|| Error::UnknownEncoding {
                label: label.to_string(),
            })
    }

    /// Canonical encoding name (e.g. `"GBK"`).
    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// Decode bytes, replacing malformed sequences with U+FFFD.
    pub fn decode(&self, data: &[u8]) -> String {
        let (text, _had_errors) = self.0.decode_without_bom_handling(data);
        text.into_owned()
    }
}

impl Default for TextEncoding {
    fn default() -> Self {
        Self(encoding_rs::GBK)
    }
}

impl std::fmt::Debug for TextEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TextEncoding({})", self.name())
    }
}

/// Display text and type name of one value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayValue {
    pub text: String,
    pub type_name: &'static str,
}

/// A binding ready for presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedVarBind {
    pub oid: Oid,
    pub text: String,
    pub type_name: &'static str,
}

/// Maps values to display strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct VarBindDecoder {
    legacy: TextEncoding,
}

impl VarBindDecoder {
    pub fn new(legacy: TextEncoding) -> Self {
        Self { legacy }
    }

    pub fn legacy_encoding(&self) -> TextEncoding {
        self.legacy
    }

    /// Decode one value.
    pub fn decode_value(&self, value: &Value) -> std::result::Result<DisplayValue, Failure> {
        let text = match value {
            Value::Null => return Err(Failure::Null),
            Value::NoSuchObject => return Err(Failure::NoSuchObject),
            Value::NoSuchInstance => return Err(Failure::NoSuchInstance),
            Value::EndOfMibView => return Err(Failure::EndOfMibView),
            Value::OctetString { data, hex: true } => self.legacy.decode(data),
            Value::OctetString { data, hex: false } => String::from_utf8_lossy(data).into_owned(),
            Value::Integer(_)
            | Value::ObjectIdentifier(_)
            | Value::IpAddress(_)
            | Value::Counter32(_)
            | Value::Gauge32(_)
            | Value::TimeTicks(_)
            | Value::Opaque(_)
            | Value::Counter64(_) => value.to_string(),
        };
        Ok(DisplayValue {
            text,
            type_name: value.type_name(),
        })
    }

    /// Decode one binding.
    pub fn decode(&self, vb: &VarBind) -> Result<DecodedVarBind> {
        let display = self
            .decode_value(&vb.value)
            .map_err(|failure| Error::RequestFailed {
                oid: vb.oid.clone(),
                failure,
            })?;
        Ok(DecodedVarBind {
            oid: vb.oid.clone(),
            text: display.text,
            type_name: display.type_name,
        })
    }

    /// Decode every binding; the first Null-like one fails the whole result.
    pub fn decode_all(&self, result: &PollResult) -> Result<Vec<DecodedVarBind>> {
        result.iter().map(|vb| self.decode(vb)).collect()
    }
}
