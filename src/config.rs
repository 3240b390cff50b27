//! Runtime tunables.
//!
//! Every field has a compile-time default and an optional TOML file can override
//! any subset of them. The shared region layout is not configurable: the
//! cartridge side hardcodes it.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::error::{Error, Result};
use crate::pattern::NamePattern;

pub const DEFAULT_PROCESS_PATTERN: &str = "pico8.exe";
pub const DEFAULT_TICK_PERIOD_MS: u64 = 16;
pub const DEFAULT_RECHECK_INTERVAL: u32 = 5;
pub const DEFAULT_SCAN_INTERVAL_MS: u64 = 1000;

/// Environment variable naming an optional config file.
pub const CONFIG_ENV: &str = "PINPUT_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Glob matched case-insensitively against both the executable name and
    /// the module name.
    pub process_pattern: String,
    /// Poller frame period.
    pub tick_period_ms: u64,
    /// Look for new controllers and refresh capabilities and battery every
    /// this many ticks.
    pub recheck_interval: u32,
    /// Delay between acquisition attempts.
    pub scan_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            process_pattern: DEFAULT_PROCESS_PATTERN.to_owned(),
            tick_period_ms: DEFAULT_TICK_PERIOD_MS,
            recheck_interval: DEFAULT_RECHECK_INTERVAL,
            scan_interval_ms: DEFAULT_SCAN_INTERVAL_MS,
        }
    }
}

impl Config {
    pub fn from_toml_str(text: &str) -> std::result::Result<Self, toml::de::Error> {
        let mut config: Config = toml::from_str(text)?;
        config.sanitize();
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::ConfigIo {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|source| Error::Config {
            path: path.to_owned(),
            source,
        })
    }

    /// Load the file named by [`CONFIG_ENV`], or the defaults when it's unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn pattern(&self) -> NamePattern {
        NamePattern::new(&self.process_pattern)
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_millis(self.scan_interval_ms)
    }

    fn sanitize(&mut self) {
        if self.recheck_interval == 0 {
            warn!("recheck_interval must be at least 1, using 1");
            self.recheck_interval = 1;
        }
        if self.tick_period_ms == 0 {
            warn!("tick_period_ms must be at least 1, using 1");
            self.tick_period_ms = 1;
        }
        if self.scan_interval_ms == 0 {
            warn!("scan_interval_ms must be at least 1, using 1");
            self.scan_interval_ms = 1;
        }
    }
}
