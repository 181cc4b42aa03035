//! Crate configuration, loaded from `config.toml`. Every tunable has a
//! built-in default so a missing file or a partial file still works.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

/// Top-level config file layout.
#[derive(Debug, Clone, Deserialize)]
pub struct VaultConfig {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
}

/// Incremental scan pacing.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanConfig {
    /// Max candidates processed per increment.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Wall-clock budget for one increment, in milliseconds.
    #[serde(default = "default_step_budget_ms")]
    pub step_budget_ms: u64,
    /// Pause between increments, in milliseconds.
    #[serde(default = "default_yield_interval_ms")]
    pub yield_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// How long a completed scan result stays valid, in seconds.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaptureConfig {
    /// Minimum time between two conversions by the same actor, in seconds.
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
}

fn default_batch_size() -> usize {
    32
}
fn default_step_budget_ms() -> u64 {
    4
}
fn default_yield_interval_ms() -> u64 {
    2
}
fn default_ttl_secs() -> u64 {
    60
}
fn default_cooldown_secs() -> u64 {
    10
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            step_budget_ms: default_step_budget_ms(),
            yield_interval_ms: default_yield_interval_ms(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: default_cooldown_secs(),
        }
    }
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            scan: ScanConfig::default(),
            cache: CacheConfig::default(),
            capture: CaptureConfig::default(),
        }
    }
}

const DEFAULT_TOML: &str = r#"# vaultguard configuration
[scan]
batch_size = 32
step_budget_ms = 4
yield_interval_ms = 2

[cache]
ttl_secs = 60

[capture]
cooldown_secs = 10
"#;

impl VaultConfig {
    /// Load config from a TOML file. If the file does not exist, write the
    /// default one and return built-in defaults.
    pub fn load(path: &Path) -> Result<Self, String> {
        if path.exists() {
            let text = std::fs::read_to_string(path).map_err(|e| format!("read config: {e}"))?;
            toml::from_str(&text).map_err(|e| format!("parse config: {e}"))
        } else {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| format!("create config dir: {e}"))?;
            }
            std::fs::write(path, DEFAULT_TOML)
                .map_err(|e| format!("write default config: {e}"))?;
            log::info!("vaultguard: wrote default config to {}", path.display());
            Ok(Self::default())
        }
    }

    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }

    #[must_use]
    pub const fn step_budget(&self) -> Duration {
        Duration::from_millis(self.scan.step_budget_ms)
    }

    #[must_use]
    pub const fn yield_interval(&self) -> Duration {
        Duration::from_millis(self.scan.yield_interval_ms)
    }

    #[must_use]
    pub const fn cooldown(&self) -> Duration {
        Duration::from_secs(self.capture.cooldown_secs)
    }
}
