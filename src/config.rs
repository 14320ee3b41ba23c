/// Driver configuration loader - parses ip100.toml
///
/// Keeps station address, cadence and retry settings out of the code so a
/// deployment can point at a different station or remap fields without
/// recompiling.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::model::ConfigError;

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "ip100.toml";

const DEFAULT_HOST: &str = "192.168.1.12";
const DEFAULT_PORT: u16 = 80;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;
const DEFAULT_MAX_TRIES: u32 = 3;
const DEFAULT_RETRY_WAIT_SECS: u64 = 5;

/// Settings for one IP-100 station, from the `[ip100]` table.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DriverConfig {
    /// Full status URL. Takes precedence over `host`/`port`.
    #[serde(default)]
    pub station_url: Option<String>,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Seconds between polls; 0 disables wall-clock alignment.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,

    /// Consecutive failed fetches before the loop gives up.
    #[serde(default = "default_max_tries")]
    pub max_tries: u32,

    /// Seconds to wait after a failed fetch.
    #[serde(default = "default_retry_wait")]
    pub retry_wait: u64,

    /// Partial canonical → device-native overrides on top of the default map.
    #[serde(default)]
    pub sensor_map: BTreeMap<String, String>,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_max_tries() -> u32 {
    DEFAULT_MAX_TRIES
}

fn default_retry_wait() -> u64 {
    DEFAULT_RETRY_WAIT_SECS
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            station_url: None,
            host: default_host(),
            port: default_port(),
            poll_interval: default_poll_interval(),
            max_tries: default_max_tries(),
            retry_wait: default_retry_wait(),
            sensor_map: BTreeMap::new(),
        }
    }
}

impl DriverConfig {
    /// Config for a station at `host:port`, everything else defaulted.
    pub fn for_host(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
            ..Self::default()
        }
    }

    /// The URL the driver polls.
    pub fn station_url(&self) -> String {
        match &self.station_url {
            Some(url) => url.clone(),
            None => status_url(&self.host, self.port),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval)
    }

    pub fn retry_wait(&self) -> Duration {
        Duration::from_secs(self.retry_wait)
    }
}

/// Builds the status document URL for a station address.
pub fn status_url(host: &str, port: u16) -> String {
    format!("http://{}:{}/status.xml", host, port)
}

/// Root structure for TOML parsing. A file without an `[ip100]` table
/// yields the defaults.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    ip100: Option<DriverConfig>,
}

/// Parses driver configuration from TOML text.
pub fn parse_config(contents: &str, path: &str) -> Result<DriverConfig, ConfigError> {
    let file: ConfigFile = toml::from_str(contents).map_err(|source| ConfigError::Parse {
        path: path.to_string(),
        source,
    })?;

    Ok(file.ip100.unwrap_or_default())
}

/// Loads driver configuration from a TOML file.
pub fn load_config(path: impl AsRef<Path>) -> Result<DriverConfig, ConfigError> {
    let path = path.as_ref();
    let display = path.display().to_string();

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: display.clone(),
        source,
    })?;

    parse_config(&contents, &display)
}

/// Commented default configuration, suitable for pasting into a new
/// `ip100.toml`.
pub fn default_stanza() -> String {
    format!(
        r#"[ip100]
# This section is for the Rainwise IP-100 weather stations.

# Hostname or IP address of the IP-100, and the port it listens on.
host = "{host}"
port = {port}

# Or give the full status URL instead of host/port.
# station_url = "http://{host}:{port}/status.xml"

# How often to poll the device, in seconds
poll_interval = {poll_interval}

# The number of times to try to read from the IP100 before giving up.
max_tries = {max_tries}

# The number of seconds to wait before retrying a read from the IP100.
retry_wait = {retry_wait}

# Override individual entries of the default sensor map.
# [ip100.sensor_map]
# outTemp = "temperature_outside"
"#,
        host = DEFAULT_HOST,
        port = DEFAULT_PORT,
        poll_interval = DEFAULT_POLL_INTERVAL_SECS,
        max_tries = DEFAULT_MAX_TRIES,
        retry_wait = DEFAULT_RETRY_WAIT_SECS,
    )
}
