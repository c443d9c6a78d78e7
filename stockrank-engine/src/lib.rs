//! stockrank engine
//!
//! Scores equity universes against a weighted nine-group quality checklist,
//! selects the top N, allocates rank-weighted percentages that sum to
//! exactly 100, and classifies rebalance urgency from elapsed days.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        stockrank-engine                          │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  UniverseSnapshot ─▶ screener ─▶ portfolio ─▶ ScreenerResult     │
//! │                      (criteria,   (allocation)   │               │
//! │                       scorer,                    ▼               │
//! │                       selector)               report             │
//! │                                                                  │
//! │  (now, anchors) ─▶ rebalance clock ─▶ CadenceState ─▶ advice     │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here is synchronous and side-effect free apart from the
//! explicit [`cache::ResultCache`] and report file writes. Snapshots are
//! borrowed, never mutated, so one snapshot can be screened from many
//! threads at once.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod analysis;
pub mod cache;
pub mod demo;
pub mod model;
pub mod portfolio;
pub mod rebalance;
pub mod screener;

pub use analysis::{Recommendation, Thesis, TradePlan, UniverseSummary};
pub use cache::{CacheKey, ResultCache};
pub use model::{Entity, Metrics, UniverseSnapshot};
pub use portfolio::{allocate, Holding, Portfolio};
pub use rebalance::{
    CadenceState, RebalanceAdvice, RebalanceClock, RebalanceConfig, RebalanceStatus,
};
pub use screener::{
    score, score_universe, select, ReportFormat, ScoredEntity, ScreenStatus, ScreenerConfig,
    ScreenerEngine, ScreenerReport, ScreenerResult, SelectionFilter, MAX_SCORE,
};
