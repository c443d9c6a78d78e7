//! Multi-criteria screener.
//!
//! # Pipeline
//!
//! ```text
//! snapshot ─▶ criteria ─▶ scorer ─▶ selector ─▶ allocator ─▶ result
//!             (9 groups)  (rank)    (filters,    (weights)
//!                                    top N)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use stockrank_engine::screener::{ScreenerConfig, ScreenerEngine};
//!
//! let engine = ScreenerEngine::new(ScreenerConfig::default());
//! let result = engine.run(&snapshot);
//! println!("{}", result.headline());
//! ```

pub mod config;
pub mod criteria;
pub mod engine;
pub mod report;
pub mod scorer;
pub mod selector;

pub use config::ScreenerConfig;
pub use criteria::{evaluate, CriterionId, Evaluation, CRITERIA, MAX_SCORE};
pub use engine::{ScreenStatus, ScreenerEngine, ScreenerResult};
pub use report::{ReportFormat, ScreenerReport};
pub use scorer::{ranking_order, score, score_universe, ScoredEntity};
pub use selector::{select, select_with_funnel, FilterResult, FilterStage, SelectionFilter};
