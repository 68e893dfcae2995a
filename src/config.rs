//! Engine, credential and listener configuration.
//!
//! # Examples
//!
//! ```rust
//! use snmp_watch::config::{Credentials, EngineConfig};
//! use std::time::Duration;
//!
//! let config = EngineConfig::default()
//!     .timeout(Duration::from_secs(2))
//!     .retries(3)
//!     .text_encoding("big5");
//! assert_eq!(config.retries, 3);
//!
//! let creds = Credentials::v2c(b"public");
//! assert_eq!(creds.community.as_ref(), b"public");
//! ```

use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;

use bytes::Bytes;

use crate::decode::{TextEncoding, VarBindDecoder};
use crate::error::{Error, Result};
use crate::version::Version;

/// Default trap port.
pub const DEFAULT_TRAP_PORT: u16 = 162;

/// Default agent port.
pub const DEFAULT_AGENT_PORT: u16 = 161;

/// Request engine settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Per-attempt timeout.
    pub timeout: Duration,
    /// Extra attempts after the first one times out.
    pub retries: u32,
    /// Default period for monitor entries.
    pub monitor_interval: Duration,
    /// WHATWG label of the legacy encoding for hex octet strings.
    pub text_encoding: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            retries: 1,
            monitor_interval: Duration::from_secs(1),
            text_encoding: "gbk".to_string(),
        }
    }
}

impl EngineConfig {
    /// Set the per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the number of retries after a timeout.
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Set the default monitor period.
    pub fn monitor_interval(mut self, interval: Duration) -> Self {
        self.monitor_interval = interval;
        self
    }

    /// Set the legacy text encoding label.
    pub fn text_encoding(mut self, label: impl Into<String>) -> Self {
        self.text_encoding = label.into();
        self
    }

    /// Decoder for the configured encoding.
    pub fn decoder(&self) -> Result<VarBindDecoder> {
        TextEncoding::for_label(&self.text_encoding).map(VarBindDecoder::new)
    }
}

/// Community-based credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub version: Version,
    pub community: Bytes,
}

impl Credentials {
    pub fn v1(community: &[u8]) -> Self {
        Self {
            version: Version::V1,
            community: Bytes::copy_from_slice(community),
        }
    }

    pub fn v2c(community: &[u8]) -> Self {
        Self {
            version: Version::V2c,
            community: Bytes::copy_from_slice(community),
        }
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::v2c(b"public")
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("version", &self.version)
            .field("community", &"<redacted>")
            .finish()
    }
}

/// Trap listener settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerConfig {
    pub bind: SocketAddr,
    /// Socket receive buffer; the kernel may cap it.
    pub recv_buffer_size: Option<usize>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], DEFAULT_TRAP_PORT)),
            recv_buffer_size: None,
        }
    }
}

impl ListenerConfig {
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind = addr;
        self
    }

    pub fn recv_buffer_size(mut self, size: usize) -> Self {
        self.recv_buffer_size = Some(size);
        self
    }
}

/// Resolve `host` or `host:port`, defaulting to port 161.
pub fn resolve_target(target: &str) -> Result<SocketAddr> {
    let with_port = if target.parse::<SocketAddr>().is_ok() || has_port(target) {
        target.to_string()
    } else if target.contains(':') && !target.starts_with('[') {
        // bare IPv6 literal
        format!("[{}]:{}", target, DEFAULT_AGENT_PORT)
    } else {
        format!("{}:{}", target, DEFAULT_AGENT_PORT)
    };

    with_port
        .to_socket_addrs()
        .map_err(|e| Error::Io {
            target: None,
            source: e,
        })?
        .next()
        .ok_or_else(|| Error::Io {
            target: None,
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "could not resolve address",
            ),
        })
}

fn has_port(target: &str) -> bool {
    match target.rsplit_once(':') {
        Some((host, port)) => {
            (!host.contains(':') || host.ends_with(']')) && port.parse::<u16>().is_ok()
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.retries, 1);
        assert_eq!(config.monitor_interval, Duration::from_secs(1));
        assert_eq!(config.decoder().unwrap().legacy_encoding().name(), "GBK");
    }

    #[test]
    fn test_engine_bad_encoding() {
        let config = EngineConfig::default().text_encoding("not-an-encoding");
        assert!(matches!(
            config.decoder(),
            Err(Error::UnknownEncoding { .. })
        ));
    }

    #[test]
    fn test_credentials_debug_redacts_community() {
        let creds = Credentials::v1(b"s3cret");
        let shown = format!("{:?}", creds);
        assert!(!shown.contains("s3cret"));
        assert!(shown.contains("V1"));
    }

    #[test]
    fn test_listener_defaults() {
        let config = ListenerConfig::default();
        assert_eq!(config.bind.port(), 162);
        assert!(config.recv_buffer_size.is_none());
    }

    #[test]
    fn test_resolve_target_default_port() {
        assert_eq!(
            resolve_target("127.0.0.1").unwrap(),
            "127.0.0.1:161".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(
            resolve_target("127.0.0.1:1161").unwrap(),
            "127.0.0.1:1161".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(
            resolve_target("::1").unwrap(),
            "[::1]:161".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(
            resolve_target("[::1]:1161").unwrap(),
            "[::1]:1161".parse::<SocketAddr>().unwrap()
        );
    }
}
