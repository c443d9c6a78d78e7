//! Application configuration.
//!
//! One JSON document with a section per concern:
//!
//! ```json
//! {
//!   "observability": { "log_level": "info", "log_format": "pretty" },
//!   "screener": { "portfolio_size": 10, "min_score_threshold": 6 },
//!   "rebalance": { "quarter_anchor": "2026-07-01", "year_anchor": "2026-01-01" },
//!   "output": { "format": "markdown" }
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use stockrank_common::config::{env_override, load_layered};
use stockrank_common::validation::collect_errors;
use stockrank_common::{ObservabilityConfig, Result, Validate, ValidationError, ValidationResult};
use stockrank_engine::{RebalanceConfig, ReportFormat, ScreenerConfig};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub screener: ScreenerConfig,

    #[serde(default)]
    pub rebalance: RebalanceConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Report output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default report format (markdown, json, text)
    #[serde(default = "default_format")]
    pub format: String,

    /// Directory reports are written to when no `--output` is given
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            directory: None,
        }
    }
}

fn default_format() -> String {
    "markdown".to_string()
}

impl OutputConfig {
    pub fn report_format(&self) -> ReportFormat {
        self.format.parse().unwrap_or(ReportFormat::Markdown)
    }
}

impl AppConfig {
    /// Load from `path` (or `~/.stockrank/config.json`) and apply
    /// `STOCKRANK_*` environment overrides. Not validated yet; the caller
    /// applies command line flags first.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config: Self = load_layered(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(level) = env_override::<String>("LOG_LEVEL") {
            self.observability.log_level = level;
        }
        self.screener.apply_env_overrides();
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();

        for result in [
            self.observability.validate(),
            self.screener.validate(),
            self.rebalance.validate(),
        ] {
            if let Err(e) = result {
                errors.push(e);
            }
        }

        if self.output.format.parse::<ReportFormat>().is_err() {
            errors.push(ValidationError::InvalidValue {
                field: "output.format".to_string(),
                reason: format!("'{}' is not markdown, json, or text", self.output.format),
            });
        }

        collect_errors(errors)
    }
}
