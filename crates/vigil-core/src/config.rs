//! Session timing configuration

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result, DEFAULT_IDLE_TIMEOUT_SECS, DEFAULT_WARNING_LEAD_SECS, TICK_INTERVAL_MS};

/// Idle-session timing, immutable once a controller is built
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Total inactivity before forced logout
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,

    /// Tail of the idle timeout during which the countdown is shown
    #[serde(default = "default_warning_lead_secs")]
    pub warning_lead_secs: u64,

    /// Countdown refresh period
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Run the full logout (remote call, clear, navigate) on teardown
    #[serde(default)]
    pub logout_on_teardown: bool,
}

/// Longest accepted idle timeout (one day)
pub const MAX_IDLE_TIMEOUT_SECS: u64 = 24 * 60 * 60;

fn default_idle_timeout_secs() -> u64 {
    DEFAULT_IDLE_TIMEOUT_SECS
}

fn default_warning_lead_secs() -> u64 {
    DEFAULT_WARNING_LEAD_SECS
}

fn default_tick_interval_ms() -> u64 {
    TICK_INTERVAL_MS
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: DEFAULT_IDLE_TIMEOUT_SECS,
            warning_lead_secs: DEFAULT_WARNING_LEAD_SECS,
            tick_interval_ms: TICK_INTERVAL_MS,
            logout_on_teardown: false,
        }
    }
}

impl SessionConfig {
    /// Shorter timeout for high-security terminals
    pub fn strict() -> Self {
        Self {
            idle_timeout_secs: 2 * 60,
            warning_lead_secs: 30,
            ..Self::default()
        }
    }

    /// Long timeout for development
    pub fn development() -> Self {
        Self {
            idle_timeout_secs: 30 * 60,
            warning_lead_secs: 5 * 60,
            ..Self::default()
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn warning_lead(&self) -> Duration {
        Duration::from_secs(self.warning_lead_secs)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Idle time after which the warning appears
    pub fn warning_delay(&self) -> Duration {
        self.idle_timeout().saturating_sub(self.warning_lead())
    }

    /// Check the timings are usable
    pub fn validate(&self) -> Result<()> {
        if self.idle_timeout_secs == 0 {
            return Err(Error::Config("idle timeout must be non-zero".to_string()));
        }
        if self.idle_timeout_secs > MAX_IDLE_TIMEOUT_SECS {
            return Err(Error::Config(format!(
                "idle timeout ({}s) must be at most {}s",
                self.idle_timeout_secs, MAX_IDLE_TIMEOUT_SECS
            )));
        }
        if self.warning_lead_secs == 0 {
            return Err(Error::Config("warning lead must be at least 1s".to_string()));
        }
        if self.warning_lead_secs >= self.idle_timeout_secs {
            return Err(Error::Config(format!(
                "warning lead ({}s) must be shorter than idle timeout ({}s)",
                self.warning_lead_secs, self.idle_timeout_secs
            )));
        }
        if self.tick_interval_ms == 0 {
            return Err(Error::Config("tick interval must be non-zero".to_string()));
        }
        if self.tick_interval_ms > MAX_IDLE_TIMEOUT_SECS * 1000 {
            return Err(Error::Config(format!(
                "tick interval ({}ms) must be at most {}s",
                self.tick_interval_ms, MAX_IDLE_TIMEOUT_SECS
            )));
        }
        Ok(())
    }

    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
