//! Entity and snapshot types.
//!
//! A [`UniverseSnapshot`] is what the data-source collaborator hands the
//! engine: a set of [`Entity`] records, the time they were taken, and
//! whether they came from a live feed. The engine only ever borrows it.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use stockrank_common::{Error, Result, ResultExt};

// ============================================================================
// Metrics
// ============================================================================

/// Financial metrics used for scoring.
///
/// Every field is optional. A missing value fails whichever criterion
/// reads it; it never raises.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// 3-year sales CAGR (%)
    pub sales_growth_3y: Option<f64>,
    /// 7-year sales CAGR (%)
    pub sales_growth_7y: Option<f64>,
    /// 3-year profit CAGR (%)
    pub profit_growth_3y: Option<f64>,
    /// 7-year profit CAGR (%)
    pub profit_growth_7y: Option<f64>,
    /// Trailing operating margin (%)
    pub operating_margin: Option<f64>,
    /// 5-year average operating margin (%)
    pub operating_margin_5y: Option<f64>,
    /// 10-year average operating margin (%)
    pub operating_margin_10y: Option<f64>,
    /// Net profit margin (%)
    pub net_margin: Option<f64>,
    /// Return on capital employed (%)
    pub roce: Option<f64>,
    /// Return on equity (%)
    pub roe: Option<f64>,
    /// Return on invested capital (%)
    pub roic: Option<f64>,
    /// Share of promoter holding pledged (%)
    pub pledge_pct: Option<f64>,
    /// Debt to equity (ratio)
    pub debt_to_equity: Option<f64>,
    /// Interest coverage (ratio)
    pub interest_coverage_ratio: Option<f64>,
    /// Operating cash flow / EBIT (ratio)
    pub operating_cashflow_to_ebit: Option<f64>,
    /// Promoter holding (%)
    pub promoter_holding_pct: Option<f64>,
    /// Market capitalisation (currency units of the snapshot)
    pub market_cap: Option<f64>,
}

// ============================================================================
// Entity
// ============================================================================

/// One financial instrument in a universe snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Unique identifier within a snapshot
    pub symbol: String,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Sector label
    #[serde(default, deserialize_with = "de_label")]
    pub sector: Option<String>,
    /// Business group label
    #[serde(default, deserialize_with = "de_label")]
    pub group_affiliation: Option<String>,
    /// Scoring inputs
    #[serde(flatten)]
    pub metrics: Metrics,
    /// Last price (not used for scoring)
    #[serde(default)]
    pub price: Option<f64>,
    /// Analyst target price
    #[serde(default)]
    pub target_price: Option<f64>,
    /// Protective stop level
    #[serde(default)]
    pub stop_loss: Option<f64>,
}

impl Entity {
    /// Create an entity with only a symbol; everything else unset.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Default::default()
        }
    }

    /// Builder-style sector setter.
    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = normalize_label(sector.into());
        self
    }

    /// Builder-style group setter.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group_affiliation = normalize_label(group.into());
        self
    }

    /// Builder-style metrics setter.
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Display name, falling back to the symbol.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.symbol)
    }
}

/// Normalize a categorical label: blank and the literal "None" mean unset.
pub fn normalize_label(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        None
    } else if trimmed.len() == raw.len() {
        Some(raw)
    } else {
        Some(trimmed.to_string())
    }
}

fn de_label<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(normalize_label))
}

// ============================================================================
// Universe Snapshot
// ============================================================================

/// A point-in-time universe handed to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniverseSnapshot {
    /// Identifier used for cache keys and reports
    pub id: String,
    /// When the records were taken
    pub as_of: DateTime<Utc>,
    /// Whether the records came from a live feed rather than a fallback corpus
    #[serde(default)]
    pub data_is_live: bool,
    /// Entity records
    pub entities: Vec<Entity>,
}

impl UniverseSnapshot {
    /// Build a snapshot from records.
    pub fn new(
        id: impl Into<String>,
        as_of: DateTime<Utc>,
        data_is_live: bool,
        entities: Vec<Entity>,
    ) -> Self {
        Self {
            id: id.into(),
            as_of,
            data_is_live,
            entities,
        }
    }

    /// Parse a snapshot from JSON and check symbol uniqueness.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Self = serde_json::from_str(json).context("decoding snapshot")?;
        snapshot.check_unique_symbols()?;
        Ok(snapshot)
    }

    /// Read a snapshot file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("reading snapshot {}", path.display()))?;
        Self::from_json(&content).map_err(|e| e.with_context(path.display().to_string()))
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the snapshot has no entities.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Find an entity by symbol.
    pub fn get(&self, symbol: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.symbol == symbol)
    }

    fn check_unique_symbols(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for entity in &self.entities {
            if entity.symbol.trim().is_empty() {
                return Err(Error::Snapshot("entity with empty symbol".into()));
            }
            if !seen.insert(entity.symbol.as_str()) {
                return Err(Error::Snapshot(format!(
                    "duplicate symbol '{}'",
                    entity.symbol
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
