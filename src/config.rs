//! Configuration system
//!
//! Provides layered configuration with:
//! - Runtime defaults
//! - Config file loading (optional)
//! - Environment variable overrides
//! - Validation

use crate::billing::StandardPlan;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Rate table source
    #[serde(default)]
    pub rates: RatesConfig,

    /// Billing plan parameters
    pub plan: PlanConfig,

    /// Output configuration
    pub output: OutputConfig,

    /// Paths configuration
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RatesConfig {
    /// External rate table; the bundled table is used when unset.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanConfig {
    pub credit: f64,
    pub minimum_charge: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub json_pretty: bool,
    pub show_zero_usage: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    pub log_directory: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let plan = StandardPlan::default();
        Self {
            logging: LoggingConfig {
                level: "WARN".to_string(),
                format: "pretty".to_string(),
                output: "console".to_string(),
            },
            rates: RatesConfig::default(),
            plan: PlanConfig {
                credit: plan.credit,
                minimum_charge: plan.minimum_charge,
            },
            output: OutputConfig {
                json_pretty: true,
                show_zero_usage: false,
            },
            paths: PathsConfig {
                log_directory: PathBuf::from("logs"),
            },
        }
    }
}

impl Config {
    /// Load configuration from file, environment, and defaults
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        let config_paths = [
            PathBuf::from("mux-pricing.toml"),
            PathBuf::from(".mux-pricing.toml"),
            dirs::config_dir()
                .map(|d| d.join("mux-pricing").join("config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.is_file() {
                info!(config_file = %path.display(), "Loading configuration from file");
                config = Self::load_from_file(path)?;
                break;
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = env::var("LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = env::var("LOG_FORMAT") {
            self.logging.format = val;
        }
        if let Ok(val) = env::var("LOG_OUTPUT") {
            self.logging.output = val;
        }

        if let Ok(val) = env::var("MUX_PRICING_RATES") {
            self.rates.path = Some(PathBuf::from(val));
        }

        if let Ok(val) = env::var("MUX_PRICING_PLAN_CREDIT") {
            self.plan.credit = val.parse().context("Invalid MUX_PRICING_PLAN_CREDIT")?;
        }
        if let Ok(val) = env::var("MUX_PRICING_MINIMUM_CHARGE") {
            self.plan.minimum_charge = val
                .parse()
                .context("Invalid MUX_PRICING_MINIMUM_CHARGE")?;
        }

        if let Ok(val) = env::var("MUX_PRICING_LOG_DIR") {
            self.paths.log_directory = PathBuf::from(val);
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.plan.credit.is_finite() || self.plan.credit < 0.0 {
            return Err(anyhow::anyhow!(
                "Plan credit must be a non-negative amount, got {}",
                self.plan.credit
            ));
        }

        if !self.plan.minimum_charge.is_finite() || self.plan.minimum_charge < 0.0 {
            return Err(anyhow::anyhow!(
                "Minimum charge must be a non-negative amount, got {}",
                self.plan.minimum_charge
            ));
        }

        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(anyhow::anyhow!(
                "Log format must be 'pretty' or 'json', got '{}'",
                self.logging.format
            ));
        }

        if !matches!(self.logging.output.as_str(), "console" | "file" | "both") {
            return Err(anyhow::anyhow!(
                "Log output must be 'console', 'file' or 'both', got '{}'",
                self.logging.output
            ));
        }

        Ok(())
    }

    /// Save current configuration to file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        info!(path = %path.display(), "Configuration saved to file");

        Ok(())
    }

    pub fn billing_plan(&self) -> StandardPlan {
        StandardPlan {
            credit: self.plan.credit,
            minimum_charge: self.plan.minimum_charge,
        }
    }
}
