//! Application configuration management.

use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::types::Currency;

/// Largest share scale accepted; leaves headroom in `Decimal`'s 28 digits.
pub const MAX_SHARE_SCALE: u32 = 16;

/// Application configuration.
///
/// Every section has defaults, so an empty environment yields a usable config.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Balance engine configuration.
    pub engine: EngineConfig,
    /// Summary cache configuration.
    pub cache: CacheConfig,
    /// Presentation configuration.
    pub display: DisplayConfig,
    /// Report configuration.
    pub reports: ReportsConfig,
    /// Logging configuration.
    pub log: LogConfig,
}

/// Balance engine configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Decimal places carried by each participant's share of an expense.
    pub share_scale: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { share_scale: 8 }
    }
}

/// Summary cache configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether computed summaries are cached at all.
    pub enabled: bool,
    /// Time-to-live in seconds for each cached summary.
    pub ttl_secs: u64,
    /// Maximum number of cached group summaries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 300, // 5 minutes
            max_capacity: 1000,
        }
    }
}

/// Presentation configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Currency used to round amounts for display.
    pub currency: Currency,
}

/// Report configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportsConfig {
    /// Number of categories listed before the rest is merged into "Other".
    pub top_categories: usize,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self { top_categories: 10 }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default `tracing` filter directive, overridden by `RUST_LOG`.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "tabsplit=info".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, lowest priority first: `config/default`, `config/{RUN_MODE}`,
    /// then `TABSPLIT__SECTION__KEY` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or fails validation.
    pub fn load() -> AppResult<Self> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("TABSPLIT").separator("__"))
            .build()?;

        let app_config: Self = config.try_deserialize()?;
        app_config.validate()?;
        Ok(app_config)
    }

    /// Checks value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for out-of-range settings.
    pub fn validate(&self) -> AppResult<()> {
        if self.engine.share_scale > MAX_SHARE_SCALE {
            return Err(AppError::Validation(format!(
                "engine.share_scale must be at most {MAX_SHARE_SCALE}, got {}",
                self.engine.share_scale
            )));
        }
        if self.reports.top_categories == 0 {
            return Err(AppError::Validation(
                "reports.top_categories must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
