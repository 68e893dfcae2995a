//! Command-line argument structures shared by the `snmpwatch-*` tools.

use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::time::Duration;

use crate::config::{Credentials, DEFAULT_TRAP_PORT, EngineConfig, ListenerConfig, resolve_target};
use crate::{Error, Version};

/// SNMP version for CLI argument parsing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SnmpVersion {
    /// SNMPv1
    #[value(name = "1")]
    V1,
    /// SNMPv2c (default)
    #[default]
    #[value(name = "2c")]
    V2c,
}

impl From<SnmpVersion> for Version {
    fn from(v: SnmpVersion) -> Self {
        match v {
            SnmpVersion::V1 => Version::V1,
            SnmpVersion::V2c => Version::V2c,
        }
    }
}

/// Output format for CLI tools.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output with type information.
    #[default]
    Human,
    /// JSON, one document per result (one line per event when streaming).
    Json,
    /// Tab-separated output for scripting.
    Raw,
}

/// Agent connection arguments.
#[derive(Debug, Parser)]
pub struct CommonArgs {
    /// Target host or host:port (default port 161).
    #[arg(value_name = "TARGET")]
    pub target: String,

    /// SNMP version: 1 or 2c.
    #[arg(short = 'v', long = "snmp-version", default_value = "2c")]
    pub snmp_version: SnmpVersion,

    /// Community string.
    #[arg(short = 'c', long = "community", default_value = "public")]
    pub community: String,

    /// Per-attempt timeout in seconds.
    #[arg(short = 't', long = "timeout", default_value = "5")]
    pub timeout: f64,

    /// Retransmissions after the first attempt.
    #[arg(short = 'r', long = "retries", default_value = "1")]
    pub retries: u32,

    #[command(flatten)]
    pub text: TextArgs,
}

impl CommonArgs {
    pub fn target_addr(&self) -> Result<SocketAddr, Error> {
        resolve_target(&self.target)
    }

    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs_f64(self.timeout.max(0.0))
    }

    pub fn credentials(&self) -> Credentials {
        match self.snmp_version {
            SnmpVersion::V1 => Credentials::v1(self.community.as_bytes()),
            SnmpVersion::V2c => Credentials::v2c(self.community.as_bytes()),
        }
    }

    /// Engine configuration from the CLI flags.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::default()
            .timeout(self.timeout_duration())
            .retries(self.retries)
            .text_encoding(self.text.encoding.clone())
    }
}

/// Text decoding arguments.
#[derive(Debug, Parser)]
pub struct TextArgs {
    /// Encoding for non-UTF-8 octet strings (WHATWG label, e.g. gbk, shift_jis).
    #[arg(short = 'e', long = "encoding", default_value = "gbk")]
    pub encoding: String,
}

/// Trap listener arguments.
#[derive(Debug, Parser)]
pub struct ListenArgs {
    /// Address to listen on.
    #[arg(short = 'l', long = "listen", default_value_t = SocketAddr::from(([0, 0, 0, 0], DEFAULT_TRAP_PORT)))]
    pub listen: SocketAddr,

    /// Requested socket receive buffer size in bytes.
    #[arg(long = "recv-buffer")]
    pub recv_buffer: Option<usize>,

    #[command(flatten)]
    pub text: TextArgs,
}

impl ListenArgs {
    pub fn listener_config(&self) -> ListenerConfig {
        let config = ListenerConfig::default().bind(self.listen);
        match self.recv_buffer {
            Some(size) => config.recv_buffer_size(size),
            None => config,
        }
    }
}

/// Output control arguments.
#[derive(Debug, Parser)]
pub struct OutputArgs {
    /// Output format: human, json, or raw.
    #[arg(short = 'O', long = "output", default_value = "human")]
    pub format: OutputFormat,

    /// Show request timing.
    #[arg(long = "timing")]
    pub timing: bool,

    /// Disable well-known OID name hints.
    #[arg(long = "no-hints")]
    pub no_hints: bool,

    /// Enable debug logging (snmp_watch=debug).
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Enable trace logging (snmp_watch=trace).
    #[arg(short = 'D', long = "trace")]
    pub trace: bool,
}

impl OutputArgs {
    /// Initialize tracing based on the debug/trace flags.
    ///
    /// `RUST_LOG`, when set, takes precedence.
    pub fn init_tracing(&self) {
        use tracing_subscriber::EnvFilter;

        let filter = if self.trace {
            "snmp_watch=trace"
        } else if self.debug {
            "snmp_watch=debug"
        } else {
            "snmp_watch=warn"
        };

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }
}

/// Parse a human duration for `--interval`: `500ms`, `2s`, `1m`, or bare seconds.
pub fn parse_interval(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    let (digits, unit) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(pos) => s.split_at(pos),
        None => (s, "s"),
    };
    let value: f64 = digits
        .parse()
        .map_err(|_| format!("invalid interval '{}'", s))?;
    let secs = match unit {
        "ms" => value / 1000.0,
        "s" => value,
        "m" => value * 60.0,
        _ => return Err(format!("invalid interval unit '{}' (use ms, s or m)", unit)),
    };
    if !secs.is_finite() || secs <= 0.0 {
        return Err(format!("interval must be positive: '{}'", s));
    }
    Ok(Duration::from_secs_f64(secs))
}
