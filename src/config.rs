use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Input dataset
    pub data: DataConfig,
    /// Log output
    pub logging: LoggingConfig,
    /// Dashboard behavior
    pub dashboard: DashboardConfig,
    /// Export destination
    pub export: ExportConfig,
}

/// Input dataset settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path of the transactions CSV
    pub path: String,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum level when `RUST_LOG` is unset
    pub level: String,
    /// Optional rolling log file
    pub file_path: Option<String>,
    /// "json" or "text"
    pub format: String,
}

/// How filter values outside the known category/location sets are handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterPolicy {
    /// Unknown values simply match no rows
    #[default]
    Lenient,
    /// Unknown values are rejected
    Strict,
}

impl FilterPolicy {
    /// Configuration spelling
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lenient => "lenient",
            Self::Strict => "strict",
        }
    }
}

/// Dashboard behavior settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Unknown filter value handling
    pub filter_policy: FilterPolicy,
    /// Rows per page of the transaction table
    pub page_size: usize,
    /// Categories listed on the KPI card
    pub top_categories: usize,
}

/// Export settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Base directory for timestamped exports
    pub output_directory: String,
    /// "json" or "csv"
    pub default_format: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: DataConfig {
                path: "transactions.csv".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: None,
                format: "text".to_string(),
            },
            dashboard: DashboardConfig {
                filter_policy: FilterPolicy::Lenient,
                page_size: 15,
                top_categories: crate::kpi::TOP_CATEGORY_LIMIT,
            },
            export: ExportConfig {
                output_directory: "./output".to_string(),
                default_format: "json".to_string(),
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from multiple sources with precedence
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, layering an explicit file over the standard ones.
    ///
    /// Precedence, lowest first: built-in defaults, `config/default.*`,
    /// `config/local.*`, `extra_file`, then `TXN_DASHBOARD__*` variables.
    pub fn load_from(extra_file: Option<&Path>) -> Result<Self> {
        let defaults = Self::default();

        let mut builder = Config::builder()
            .set_default("data.path", defaults.data.path)?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.format", defaults.logging.format)?
            .set_default("dashboard.filter_policy", defaults.dashboard.filter_policy.as_str())?
            .set_default("dashboard.page_size", defaults.dashboard.page_size as u64)?
            .set_default("dashboard.top_categories", defaults.dashboard.top_categories as u64)?
            .set_default("export.output_directory", defaults.export.output_directory)?
            .set_default("export.default_format", defaults.export.default_format)?
            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false));

        if let Some(path) = extra_file {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config = builder
            // Add environment variables with prefix
            .add_source(Environment::with_prefix("TXN_DASHBOARD").separator("__"))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| anyhow::anyhow!("Failed to deserialize configuration: {}", e))?;

        // Validate configuration
        app_config.validate()?;

        Ok(app_config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.data.path.trim().is_empty() {
            return Err(anyhow::anyhow!("data.path must not be empty"));
        }

        // Validate logging config
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level,
                valid_levels
            ));
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log format: {}. Must be one of: {:?}",
                self.logging.format,
                valid_formats
            ));
        }

        // Validate dashboard config
        if self.dashboard.page_size == 0 {
            return Err(anyhow::anyhow!("page_size must be greater than 0"));
        }
        if self.dashboard.top_categories == 0 {
            return Err(anyhow::anyhow!("top_categories must be greater than 0"));
        }

        // Validate export config
        let valid_formats = ["json", "csv"];
        if !valid_formats.contains(&self.export.default_format.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid export format: {}. Must be one of: {:?}",
                self.export.default_format,
                valid_formats
            ));
        }
        if self.export.output_directory.trim().is_empty() {
            return Err(anyhow::anyhow!("output_directory must not be empty"));
        }

        Ok(())
    }
}
