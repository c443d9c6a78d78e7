//! Rebalance clock.
//!
//! A stateless classifier over elapsed days since two externally supplied
//! anchors. Nothing is stored between calls; every status is recomputed
//! from `now` and the anchors.

pub mod advice;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use stockrank_common::validation::collect_errors;
use stockrank_common::{Validate, ValidationError, ValidationResult};

pub use advice::{AdviceItem, RebalanceAdvice};

/// Default quarterly review threshold (days).
pub const QUARTERLY_DAYS: i64 = 90;

/// Default yearly rebuild threshold (days).
pub const YEARLY_DAYS: i64 = 365;

// ============================================================================
// Cadence State
// ============================================================================

/// Rebalance urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CadenceState {
    /// Nothing due
    Ok,
    /// Review entrants and weak incumbents
    QuarterlyDue,
    /// Sell everything and rebuild
    YearlyDue,
}

impl std::fmt::Display for CadenceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::QuarterlyDue => write!(f, "QUARTERLY_DUE"),
            Self::YearlyDue => write!(f, "YEARLY_DUE"),
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Rebalance thresholds and anchors.
///
/// Unset anchors fall back to the start of the calendar quarter and year
/// containing `now`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebalanceConfig {
    /// Days after the quarter anchor before a review is due
    #[serde(default = "default_quarterly_days")]
    pub quarterly_days_threshold: i64,

    /// Days after the year anchor before a rebuild is due
    #[serde(default = "default_yearly_days")]
    pub yearly_days_threshold: i64,

    /// Start of the current review period
    #[serde(default)]
    pub quarter_anchor: Option<NaiveDate>,

    /// Start of the current rebuild period
    #[serde(default)]
    pub year_anchor: Option<NaiveDate>,
}

impl Default for RebalanceConfig {
    fn default() -> Self {
        Self {
            quarterly_days_threshold: default_quarterly_days(),
            yearly_days_threshold: default_yearly_days(),
            quarter_anchor: None,
            year_anchor: None,
        }
    }
}

fn default_quarterly_days() -> i64 {
    QUARTERLY_DAYS
}

fn default_yearly_days() -> i64 {
    YEARLY_DAYS
}

impl Validate for RebalanceConfig {
    fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();

        for (field, value) in [
            ("quarterly_days_threshold", self.quarterly_days_threshold),
            ("yearly_days_threshold", self.yearly_days_threshold),
        ] {
            if value <= 0 {
                errors.push(ValidationError::InvalidValue {
                    field: field.to_string(),
                    reason: format!("must be positive, got {}", value),
                });
            }
        }

        if self.quarterly_days_threshold >= self.yearly_days_threshold {
            errors.push(ValidationError::Conflict {
                reason: format!(
                    "quarterly_days_threshold ({}) must be below yearly_days_threshold ({})",
                    self.quarterly_days_threshold, self.yearly_days_threshold
                ),
            });
        }

        if let (Some(q), Some(y)) = (self.quarter_anchor, self.year_anchor) {
            if q < y {
                errors.push(ValidationError::Conflict {
                    reason: format!("quarter_anchor {} precedes year_anchor {}", q, y),
                });
            }
        }

        collect_errors(errors)
    }
}

// ============================================================================
// Clock
// ============================================================================

/// Elapsed-day counters and the resulting state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebalanceStatus {
    pub days_since_quarter_anchor: i64,
    pub days_since_year_anchor: i64,
    pub cadence_state: CadenceState,
}

/// Classifies elapsed days into a [`CadenceState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebalanceClock {
    quarterly_days: i64,
    yearly_days: i64,
}

impl Default for RebalanceClock {
    fn default() -> Self {
        Self::new(QUARTERLY_DAYS, YEARLY_DAYS)
    }
}

impl RebalanceClock {
    pub fn new(quarterly_days: i64, yearly_days: i64) -> Self {
        Self {
            quarterly_days,
            yearly_days,
        }
    }

    pub fn from_config(config: &RebalanceConfig) -> Self {
        Self::new(config.quarterly_days_threshold, config.yearly_days_threshold)
    }

    /// Most severe applicable state. Thresholds are strict: exactly 90 days
    /// is still `Ok`.
    pub fn classify(&self, days_since_quarter: i64, days_since_year: i64) -> CadenceState {
        if days_since_year > self.yearly_days {
            CadenceState::YearlyDue
        } else if days_since_quarter > self.quarterly_days {
            CadenceState::QuarterlyDue
        } else {
            CadenceState::Ok
        }
    }

    /// Status at `now` for the given anchor dates.
    ///
    /// Days are whole calendar days between the UTC date of `now` and each
    /// anchor. An anchor in the future gives a negative count.
    pub fn status(
        &self,
        now: DateTime<Utc>,
        quarter_anchor: NaiveDate,
        year_anchor: NaiveDate,
    ) -> RebalanceStatus {
        let today = now.date_naive();
        let days_q = today.signed_duration_since(quarter_anchor).num_days();
        let days_y = today.signed_duration_since(year_anchor).num_days();
        let state = self.classify(days_q, days_y);

        tracing::debug!(
            days_since_quarter_anchor = days_q,
            days_since_year_anchor = days_y,
            state = %state,
            "Rebalance status"
        );

        RebalanceStatus {
            days_since_quarter_anchor: days_q,
            days_since_year_anchor: days_y,
            cadence_state: state,
        }
    }

    /// Status using the configured anchors, or calendar defaults.
    pub fn status_for(&self, now: DateTime<Utc>, config: &RebalanceConfig) -> RebalanceStatus {
        let today = now.date_naive();
        let quarter = config
            .quarter_anchor
            .unwrap_or_else(|| quarter_start(today));
        let year = config.year_anchor.unwrap_or_else(|| year_start(today));
        self.status(now, quarter, year)
    }
}

/// First day of the calendar quarter containing `date`.
pub fn quarter_start(date: NaiveDate) -> NaiveDate {
    let month = (date.month0() / 3) * 3 + 1;
    NaiveDate::from_ymd_opt(date.year(), month, 1).unwrap_or(date)
}

/// January 1st of the year containing `date`.
pub fn year_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date)
}

// ============================================================================
// Tests
// ============================================================================
