//! Runner configuration
//!
//! The embedded `sim.toml` is the default; a path given as the first
//! command line argument replaces it. Either source is parsed with serde
//! and checked by [`SimConfig::validate`] before anything is built.

use std::fmt;
use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;

use apiary_devices::{Build, SamplerConfig};
use serde::Deserialize;
use tracing::{debug, info};

/// Embedded default configuration
pub const EMBEDDED_CONFIG: &str = include_str!("../sim.toml");

/// Port used when the network section leaves it out
pub const DEFAULT_PORT: u16 = 4999;

/// Which device variant the runner hosts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    #[default]
    Sampler,
    Focuser,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub kind: DeviceKind,
    /// Also run the temperature reporter action
    pub report_temperature: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            kind: DeviceKind::Sampler,
            report_temperature: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub bind: IpAddr,
    pub port: u16,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
        }
    }
}

impl NetworkConfig {
    pub fn address(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FocuserConfig {
    pub build: Build,
    /// Simulated carriage position at start, in steps from home
    pub start_position: i32,
}

impl Default for FocuserConfig {
    fn default() -> Self {
        Self {
            build: Build::LowPowerHyperstar,
            start_position: 2500,
        }
    }
}

/// Everything the runner needs to start a device
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub device: DeviceConfig,
    pub network: NetworkConfig,
    pub sampler: SamplerConfig,
    pub focuser: FocuserConfig,
}

/// Configuration loading errors
#[derive(Debug)]
pub enum ConfigError {
    /// The override file could not be read
    Read(std::io::Error),
    /// The TOML text did not match the expected layout
    Parse(toml::de::Error),
    /// Port 0 was requested
    InvalidPort,
    /// A sampler window of zero length
    EmptyWindow,
    /// The sample interval does not fit inside one window
    IntervalTooLong,
    /// A session shorter than one window would never bin a sample
    SessionTooShort,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read(e) => write!(f, "failed to read configuration: {}", e),
            ConfigError::Parse(e) => write!(f, "invalid configuration: {}", e),
            ConfigError::InvalidPort => f.write_str("network port must not be 0"),
            ConfigError::EmptyWindow => f.write_str("sampler window_ms must be positive"),
            ConfigError::IntervalTooLong => {
                f.write_str("sampler sample_interval_us must be shorter than window_ms")
            }
            ConfigError::SessionTooShort => {
                f.write_str("sampler session_ms must be at least window_ms")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Read(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl SimConfig {
    /// Parse and validate configuration text
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, or the embedded default when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                let text = fs::read_to_string(path)?;
                Self::parse(&text)
            }
            None => {
                debug!("Using embedded configuration");
                Self::parse(EMBEDDED_CONFIG)
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.network.port == 0 {
            return Err(ConfigError::InvalidPort);
        }

        let sampler = &self.sampler;
        if sampler.window_ms == 0 {
            return Err(ConfigError::EmptyWindow);
        }
        if u64::from(sampler.sample_interval_us) >= u64::from(sampler.window_ms) * 1000 {
            return Err(ConfigError::IntervalTooLong);
        }
        if sampler.session_ms < sampler.window_ms {
            return Err(ConfigError::SessionTooShort);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_config_parses() {
        let config = SimConfig::parse(EMBEDDED_CONFIG).unwrap();
        assert_eq!(config.device.kind, DeviceKind::Sampler);
        assert!(config.device.report_temperature);
        assert_eq!(config.network.port, DEFAULT_PORT);
        assert_eq!(config.sampler, SamplerConfig::default());
        assert_eq!(config.focuser.build, Build::LowPowerHyperstar);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = SimConfig::parse("[device]\nkind = \"focuser\"\n").unwrap();
        assert_eq!(config.device.kind, DeviceKind::Focuser);
        assert_eq!(config.network, NetworkConfig::default());
        assert_eq!(config.focuser, FocuserConfig::default());
        assert_eq!(config.sampler.windows_per_session(), 3600);
    }

    #[test]
    fn test_focuser_build_by_name() {
        let text = "[focuser]\nbuild = \"unit_test_traditional\"\nstart_position = 40\n";
        let config = SimConfig::parse(text).unwrap();
        assert_eq!(config.focuser.build, Build::UnitTestTraditional);
        assert_eq!(config.focuser.start_position, 40);
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let err = SimConfig::parse("[device]\nkind = \"toaster\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_port_zero_rejected() {
        let err = SimConfig::parse("[network]\nport = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort));
    }

    #[test]
    fn test_sampler_timing_checked() {
        let err = SimConfig::parse("[sampler]\nwindow_ms = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::EmptyWindow));

        let err = SimConfig::parse("[sampler]\nsample_interval_us = 2000\nwindow_ms = 2\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::IntervalTooLong));

        let err = SimConfig::parse("[sampler]\nwindow_ms = 1000\nsession_ms = 999\n").unwrap_err();
        assert!(matches!(err, ConfigError::SessionTooShort));
    }

    #[test]
    fn test_bind_address() {
        let config = SimConfig::parse("[network]\nbind = \"127.0.0.1\"\nport = 5000\n").unwrap();
        assert_eq!(config.network.address(), "127.0.0.1:5000".parse().unwrap());
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = SimConfig::load(Some(Path::new("/nonexistent/apiary/sim.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read(_)));
        assert!(err.to_string().starts_with("failed to read configuration"));
    }
}
