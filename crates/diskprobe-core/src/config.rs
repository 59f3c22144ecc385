//! Configuration module
//!
//! Settings are read once at startup from command-line flags, each of which
//! falls back to a `DISKPROBE_*` environment variable (optionally loaded from a
//! `.env` file). The resulting [`Config`] is immutable and cheap to clone.

use std::ffi::OsString;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::error::ConfigError;

// Defaults
const DEFAULT_PATH: &str = "/mnt/storage";
const DEFAULT_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_THRESHOLD_BYTES: u64 = 107_400_000_000;
const DEFAULT_POLLERS: usize = 1;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
const DEFAULT_ERROR_BACKOFF_SECS: u64 = 10;
const DEFAULT_STATUS_INTERVAL_SECS: u64 = 60;
const DEFAULT_MEASURE_TIMEOUT_SECS: u64 = 300;

/// Output format of the log subscriber
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Raw probe settings as parsed from flags and environment
#[derive(Clone, Debug, Parser)]
#[command(name = "diskprobe", version, about = "Disk usage threshold probe")]
pub struct ProbeConfig {
    /// The path to query for disk usage
    #[arg(long, env = "DISKPROBE_PATH", default_value = DEFAULT_PATH)]
    pub path: String,

    /// Threshold in bytes above which the probe serves 500's over HTTP
    #[arg(long, env = "DISKPROBE_THRESHOLD", default_value_t = DEFAULT_THRESHOLD_BYTES)]
    pub threshold: u64,

    /// Listen address for HTTP
    #[arg(long, env = "DISKPROBE_ADDR", default_value = DEFAULT_ADDR)]
    pub addr: String,

    /// Answer OK even when the threshold is exceeded
    #[arg(long = "override", env = "DISKPROBE_OVERRIDE")]
    pub override_check: bool,

    /// Number of concurrent poller workers
    #[arg(long, env = "DISKPROBE_POLLERS", default_value_t = DEFAULT_POLLERS)]
    pub pollers: usize,

    /// Seconds between two successful measurements
    #[arg(long, env = "DISKPROBE_POLL_INTERVAL_SECS", default_value_t = DEFAULT_POLL_INTERVAL_SECS)]
    pub poll_interval_secs: u64,

    /// Extra delay in seconds added per consecutive measurement failure
    #[arg(long, env = "DISKPROBE_ERROR_BACKOFF_SECS", default_value_t = DEFAULT_ERROR_BACKOFF_SECS)]
    pub error_backoff_secs: u64,

    /// Seconds between two state snapshots in the log
    #[arg(long, env = "DISKPROBE_STATUS_INTERVAL_SECS", default_value_t = DEFAULT_STATUS_INTERVAL_SECS)]
    pub status_interval_secs: u64,

    /// Upper bound in seconds for a single measurement
    #[arg(long, env = "DISKPROBE_MEASURE_TIMEOUT_SECS", default_value_t = DEFAULT_MEASURE_TIMEOUT_SECS)]
    pub measure_timeout_secs: u64,

    /// Optional cap in seconds for the delay between two polls (unbounded when unset)
    #[arg(long, env = "DISKPROBE_MAX_BACKOFF_SECS")]
    pub max_backoff_secs: Option<u64>,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl ProbeConfig {
    pub fn validate(&self) -> Result<SocketAddr, ConfigError> {
        if self.path.trim().is_empty() {
            return Err(ConfigError::invalid("path", "must not be empty"));
        }
        if self.pollers == 0 {
            return Err(ConfigError::invalid("pollers", "must be at least 1"));
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::invalid("poll_interval_secs", "must be greater than 0"));
        }
        if self.status_interval_secs == 0 {
            return Err(ConfigError::invalid(
                "status_interval_secs",
                "must be greater than 0",
            ));
        }
        if self.measure_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "measure_timeout_secs",
                "must be greater than 0",
            ));
        }
        if let Some(cap) = self.max_backoff_secs {
            if cap < self.poll_interval_secs {
                return Err(ConfigError::invalid(
                    "max_backoff_secs",
                    format!(
                        "must not be lower than poll_interval_secs ({})",
                        self.poll_interval_secs
                    ),
                ));
            }
        }

        self.addr
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidListenAddr {
                addr: self.addr.clone(),
                reason: e.to_string(),
            })
    }
}

/// Validated, immutable probe configuration.
#[derive(Clone, Debug)]
pub struct Config {
    inner: Arc<ProbeConfig>,
    listen_addr: SocketAddr,
}

impl Config {
    /// Load `.env` (best effort), then parse flags and environment.
    ///
    /// Exits the process with usage information on `--help` or malformed flags,
    /// like any clap-based binary.
    pub fn load() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        let probe = ProbeConfig::parse();
        Ok(Self::from_probe_config(probe)?)
    }

    /// Parse an explicit argument list; the first item is the binary name.
    pub fn from_args<I, T>(args: I) -> Result<Self, anyhow::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let probe = ProbeConfig::try_parse_from(args)?;
        Ok(Self::from_probe_config(probe)?)
    }

    pub fn from_probe_config(probe: ProbeConfig) -> Result<Self, ConfigError> {
        let listen_addr = probe.validate()?;
        Ok(Config {
            inner: Arc::new(probe),
            listen_addr,
        })
    }

    pub fn target_path(&self) -> &str {
        &self.inner.path
    }

    pub fn threshold_bytes(&self) -> u64 {
        self.inner.threshold
    }

    pub fn listen_addr(&self) -> SocketAddr {
        self.listen_addr
    }

    pub fn override_enabled(&self) -> bool {
        self.inner.override_check
    }

    pub fn pollers(&self) -> usize {
        self.inner.pollers
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.inner.poll_interval_secs)
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_secs(self.inner.error_backoff_secs)
    }

    pub fn status_interval(&self) -> Duration {
        Duration::from_secs(self.inner.status_interval_secs)
    }

    pub fn measure_timeout(&self) -> Duration {
        Duration::from_secs(self.inner.measure_timeout_secs)
    }

    pub fn max_backoff(&self) -> Option<Duration> {
        self.inner.max_backoff_secs.map(Duration::from_secs)
    }

    pub fn log_format(&self) -> LogFormat {
        self.inner.log_format
    }
}
