//! Error types for snmp-watch.
//!
//! Every failure is scoped to the single request, monitor entry or datagram
//! that produced it. Nothing in this crate is process-fatal.

use std::net::SocketAddr;
use std::time::Duration;

use crate::oid::Oid;
use crate::version::Version;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// OID validation error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OidErrorKind {
    /// Empty OID string.
    Empty,
    /// Empty segment between two dots (e.g. `1..3`).
    EmptyArc,
    /// Arc is not a non-negative decimal number.
    InvalidArc,
    /// Arc does not fit in 32 bits.
    ArcOverflow,
}

impl std::fmt::Display for OidErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty OID"),
            Self::EmptyArc => write!(f, "empty arc"),
            Self::InvalidArc => write!(f, "invalid arc value"),
            Self::ArcOverflow => write!(f, "arc exceeds 32 bits"),
        }
    }
}

/// Why a variable binding counts as a failed element.
///
/// The agent answered, but had nothing to report for the requested OID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Null,
    NoSuchObject,
    NoSuchInstance,
    EndOfMibView,
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "Null"),
            Self::NoSuchObject => write!(f, "noSuchObject"),
            Self::NoSuchInstance => write!(f, "noSuchInstance"),
            Self::EndOfMibView => write!(f, "endOfMibView"),
        }
    }
}

/// Table reconstruction error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableErrorKind {
    /// The first arc below the table root was 0, which names no column.
    ZeroColumn,
    /// The OID has no arc below the table root.
    NoColumn,
    /// The walk came back to a column it had already left.
    ///
    /// Reconstruction assumes column-major delivery; this is what row-major
    /// delivery looks like.
    ColumnReentered { column: usize },
}

impl std::fmt::Display for TableErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroColumn => write!(f, "column arc 0 below table root"),
            Self::NoColumn => write!(f, "no column arc below table root"),
            Self::ColumnReentered { column } => {
                write!(f, "column {} re-entered, walk is not column-major", column)
            }
        }
    }
}

/// Trap datagram error kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrapErrorKind {
    /// Datagram ended before the message header was complete.
    Truncated,
    /// Expected different tag.
    UnexpectedTag { expected: u8, actual: u8 },
    /// Length form this reader does not accept.
    InvalidLength,
    /// Version number outside v1/v2c/v3.
    UnknownVersion(i64),
    /// The SNMP codec rejected the message.
    Codec(String),
}

impl std::fmt::Display for TrapErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Truncated => write!(f, "unexpected end of data"),
            Self::UnexpectedTag { expected, actual } => {
                write!(f, "expected tag 0x{:02X}, got 0x{:02X}", expected, actual)
            }
            Self::InvalidLength => write!(f, "invalid length encoding"),
            Self::UnknownVersion(v) => write!(f, "unknown SNMP version: {}", v),
            Self::Codec(msg) => write!(f, "{}", msg),
        }
    }
}

/// Agent error-status (RFC 3416) carried in a response PDU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorStatus(pub u32);

impl ErrorStatus {
    const NAMES: [&'static str; 19] = [
        "noError",
        "tooBig",
        "noSuchName",
        "badValue",
        "readOnly",
        "genErr",
        "noAccess",
        "wrongType",
        "wrongLength",
        "wrongEncoding",
        "wrongValue",
        "noCreation",
        "inconsistentValue",
        "resourceUnavailable",
        "commitFailed",
        "undoFailed",
        "authorizationError",
        "notWritable",
        "inconsistentName",
    ];

    pub fn is_error(&self) -> bool {
        self.0 != 0
    }
}

impl std::fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match Self::NAMES.get(self.0 as usize) {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "unknown({})", self.0),
        }
    }
}

/// Library error type.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// I/O error during communication or socket setup.
    #[error("I/O error{}: {source}", target.map(|t| format!(" communicating with {}", t)).unwrap_or_default())]
    Io {
        target: Option<SocketAddr>,
        #[source]
        source: std::io::Error,
    },

    /// Request timed out after all retries.
    #[error("timeout after {elapsed:?} waiting for {target} (retries={retries})")]
    Timeout {
        target: SocketAddr,
        elapsed: Duration,
        retries: u32,
    },

    /// The transport collaborator failed for a reason other than I/O.
    #[error("transport error{}: {message}", target.map(|t| format!(" from {}", t)).unwrap_or_default())]
    Transport {
        target: Option<SocketAddr>,
        message: String,
    },

    /// SNMP error-status returned by the agent.
    #[error("SNMP error from {target}: {status} at index {index}")]
    Snmp {
        target: SocketAddr,
        status: ErrorStatus,
        index: u32,
    },

    /// Malformed dotted OID text.
    #[error("invalid OID{}: {kind}", input.as_ref().map(|i| format!(" '{}'", i)).unwrap_or_default())]
    InvalidOid {
        kind: OidErrorKind,
        input: Option<Box<str>>,
    },

    /// 1-based level index outside the OID.
    #[error("level {level} out of range for OID with {levels} levels")]
    LevelOutOfRange { level: usize, levels: usize },

    /// The OID is not below the given root.
    #[error("{oid} is not under {root}")]
    NotUnderRoot { oid: Oid, root: Oid },

    /// The agent answered with a Null-like binding.
    #[error("request failed: {oid} = {failure}")]
    RequestFailed { oid: Oid, failure: Failure },

    /// Non-increasing OID detected during a walk (agent misbehavior).
    #[error("walk detected non-increasing OID: {previous} >= {current}")]
    NonIncreasingOid { previous: Oid, current: Oid },

    /// The walk cannot be laid out as a conceptual table.
    #[error("table layout error at {oid}: {kind}")]
    TableLayout { oid: Oid, kind: TableErrorKind },

    /// A monitor with this key already exists.
    #[error("object {key} is already monitored")]
    DuplicateKey { key: String },

    /// Monitor period of zero.
    #[error("monitor interval must be non-zero")]
    ZeroInterval,

    /// Text encoding label not recognised.
    #[error("unknown text encoding: {label}")]
    UnknownEncoding { label: String },

    /// The transport cannot speak this SNMP version.
    #[error("unsupported SNMP version: {version}")]
    UnsupportedVersion { version: Version },

    /// Inbound trap datagram could not be decoded.
    #[error("malformed trap from {peer}: {kind}")]
    MalformedTrap { peer: SocketAddr, kind: TrapErrorKind },
}

impl Error {
    /// Create an invalid OID error with the input string that failed.
    pub fn invalid_oid(kind: OidErrorKind, input: impl Into<Box<str>>) -> Self {
        Self::InvalidOid {
            kind,
            input: Some(input.into()),
        }
    }

    /// Get the target address if this error has one.
    pub fn target(&self) -> Option<SocketAddr> {
        match self {
            Self::Io { target, .. } => *target,
            Self::Timeout { target, .. } => Some(*target),
            Self::Transport { target, .. } => *target,
            Self::Snmp { target, .. } => Some(*target),
            Self::MalformedTrap { peer, .. } => Some(*peer),
            _ => None,
        }
    }

    /// Whether the agent answered but had nothing to report.
    ///
    /// Presentation code shows these as "request failed" notices, distinct
    /// from transport problems.
    pub fn is_request_failed(&self) -> bool {
        matches!(self, Self::RequestFailed { .. } | Self::Snmp { .. })
    }

    /// Whether the request never got an answer.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Io { .. } | Self::Timeout { .. } | Self::Transport { .. }
        )
    }
}
