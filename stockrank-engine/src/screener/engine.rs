//! Screener engine module.
//!
//! Chains score → select → allocate over one snapshot. The engine reads no
//! clock and holds no mutable state, so the same snapshot and config always
//! produce the same result.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::analysis::UniverseSummary;
use crate::cache::{CacheKey, ResultCache};
use crate::model::UniverseSnapshot;
use crate::portfolio::{allocate, Portfolio};

use super::config::ScreenerConfig;
use super::scorer::{score_universe, ScoredEntity};
use super::selector::{select_with_funnel, FilterResult};

// ============================================================================
// Screen Status
// ============================================================================

/// Whether anything survived the filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenStatus {
    /// At least one holding was selected
    Selected,
    /// Filters left nothing to select
    NoMatches,
}

impl ScreenStatus {
    /// Hint for the user when nothing matched.
    pub fn guidance(&self) -> Option<&'static str> {
        match self {
            Self::Selected => None,
            Self::NoMatches => Some(
                "No stocks match the current filters. Lower the minimum score or widen the sector and group filters.",
            ),
        }
    }
}

impl std::fmt::Display for ScreenStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Selected => write!(f, "selected"),
            Self::NoMatches => write!(f, "no matches"),
        }
    }
}

// ============================================================================
// Screener Result
// ============================================================================

/// Result of a screening run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenerResult {
    /// Snapshot the run was computed from
    pub snapshot_id: String,
    /// When the snapshot was taken
    pub as_of: DateTime<Utc>,
    /// Whether the snapshot came from a live feed
    pub data_is_live: bool,
    /// Screening configuration used
    pub config_summary: String,
    /// Outcome
    pub status: ScreenStatus,
    /// Headline numbers over the whole universe
    pub summary: UniverseSummary,
    /// Filter stage results
    pub filter_results: Vec<FilterResult>,
    /// Every entity, scored and ranked
    pub scored: Vec<ScoredEntity>,
    /// Weighted selection
    pub portfolio: Portfolio,
}

impl ScreenerResult {
    /// Whether the run selected nothing.
    pub fn is_empty(&self) -> bool {
        self.status == ScreenStatus::NoMatches
    }

    /// Summary string for logging.
    pub fn headline(&self) -> String {
        format!(
            "Scored {} entities from '{}': {} selected ({})",
            self.scored.len(),
            self.snapshot_id,
            self.portfolio.len(),
            self.status
        )
    }
}

// ============================================================================
// Screener Engine
// ============================================================================

/// Screening pipeline bound to one configuration.
#[derive(Debug, Clone, Default)]
pub struct ScreenerEngine {
    config: ScreenerConfig,
}

impl ScreenerEngine {
    pub fn new(config: ScreenerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScreenerConfig {
        &self.config
    }

    /// Run the pipeline over a snapshot. The snapshot is only read.
    pub fn run(&self, snapshot: &UniverseSnapshot) -> ScreenerResult {
        debug!(
            snapshot_id = %snapshot.id,
            entities = snapshot.len(),
            config = %self.config.summary(),
            "Starting screen"
        );

        let scored = score_universe(&snapshot.entities);
        let selection = select_with_funnel(
            &scored,
            &self.config.selection_filter(),
            self.config.portfolio_size,
        );
        let status = if selection.is_empty() {
            ScreenStatus::NoMatches
        } else {
            ScreenStatus::Selected
        };
        let portfolio = allocate(selection.members);
        let summary = UniverseSummary::from_scored(&scored);

        let result = ScreenerResult {
            snapshot_id: snapshot.id.clone(),
            as_of: snapshot.as_of,
            data_is_live: snapshot.data_is_live,
            config_summary: self.config.summary(),
            status,
            summary,
            filter_results: selection.funnel,
            scored,
            portfolio,
        };

        info!(
            snapshot_id = %result.snapshot_id,
            data_is_live = result.data_is_live,
            selected = result.portfolio.len(),
            status = %result.status,
            "Screen complete"
        );

        result
    }

    /// Cache key for a snapshot under this engine's config.
    pub fn cache_key(&self, snapshot: &UniverseSnapshot) -> CacheKey {
        CacheKey::new(snapshot.id.clone(), self.config.fingerprint())
    }

    /// Like [`run`](Self::run), memoized in `cache`.
    pub fn run_cached(
        &self,
        snapshot: &UniverseSnapshot,
        cache: &ResultCache<ScreenerResult>,
    ) -> Arc<ScreenerResult> {
        cache.get_or_compute(self.cache_key(snapshot), || self.run(snapshot))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Entity;
    use crate::screener::criteria::tests::full_marks;
    use chrono::TimeZone;

    fn snapshot() -> UniverseSnapshot {
        UniverseSnapshot::new(
            "t1",
            Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap(),
            false,
            vec![
                Entity::new("A").with_sector("IT").with_metrics(full_marks()),
                Entity::new("B").with_sector("Banking"),
                Entity::new("C").with_sector("IT"),
            ],
        )
    }

    #[test]
    fn test_run_selects_and_weights() {
        let engine = ScreenerEngine::new(ScreenerConfig {
            portfolio_size: 2,
            ..Default::default()
        });
        let result = engine.run(&snapshot());

        assert_eq!(result.status, ScreenStatus::Selected);
        assert_eq!(result.scored.len(), 3);
        assert_eq!(result.portfolio.symbols(), vec!["A", "B"]);
        assert_eq!(result.portfolio.total_weight_pct, 100.0);
        assert!(!result.data_is_live);
        assert_eq!(result.filter_results.len(), 5);
    }

    #[test]
    fn test_no_matches() {
        let engine = ScreenerEngine::new(ScreenerConfig {
            sector_allow_list: vec!["Pharma".into()],
            ..Default::default()
        });
        let result = engine.run(&snapshot());

        assert!(result.is_empty());
        assert!(result.portfolio.is_empty());
        assert_eq!(result.portfolio.total_weight_pct, 0.0);
        assert!(result.status.guidance().is_some());
        assert_eq!(result.scored.len(), 3);
    }

    #[test]
    fn test_run_is_reproducible() {
        let engine = ScreenerEngine::default();
        let snap = snapshot();
        let a = serde_json::to_string(&engine.run(&snap)).unwrap();
        let b = serde_json::to_string(&engine.run(&snap)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_run_cached() {
        let engine = ScreenerEngine::default();
        let cache = ResultCache::new();
        let snap = snapshot();

        let first = engine.run_cached(&snap, &cache);
        let second = engine.run_cached(&snap, &cache);
        assert!(Arc::ptr_eq(&first, &second));

        let other = ScreenerEngine::new(ScreenerConfig {
            portfolio_size: 1,
            ..Default::default()
        });
        let third = other.run_cached(&snap, &cache);
        assert_eq!(third.portfolio.len(), 1);
        assert_eq!(cache.stats().entries, 2);

        assert_eq!(cache.invalidate("t1"), 2);
    }

    #[test]
    fn test_headline() {
        let result = ScreenerEngine::default().run(&snapshot());
        assert_eq!(
            result.headline(),
            "Scored 3 entities from 't1': 3 selected (selected)"
        );
    }
}
