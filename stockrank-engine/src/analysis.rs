//! Per-entity analysis on top of the composite score.
//!
//! - **Trade plan**: upside to target, risk to stop, reward/risk
//! - **Recommendation**: score band as a share of [`MAX_SCORE`]
//! - **Thesis**: passed groups as strengths, failed groups as concerns
//! - **Summary**: universe-level counts and averages

use serde::Serialize;

use crate::screener::criteria::{Metric, CRITERIA, MAX_SCORE};
use crate::screener::ScoredEntity;
use crate::model::Entity;

/// Most concerns listed in a thesis.
pub const MAX_CONCERNS: usize = 5;

// ============================================================================
// Trade Plan
// ============================================================================

/// Price levels and derived percentages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TradePlan {
    pub price: f64,
    pub target_price: f64,
    pub stop_loss: f64,
    /// (target - price) / price, in %
    pub upside_pct: f64,
    /// (price - stop) / price, in %
    pub risk_pct: f64,
    /// upside / risk; 0 when risk is not positive
    pub reward_risk: f64,
}

impl TradePlan {
    /// Compute a plan from raw levels.
    ///
    /// A non-positive price yields zero percentages rather than dividing by it.
    pub fn new(price: f64, target_price: f64, stop_loss: f64) -> Self {
        let (upside_pct, risk_pct) = if price > 0.0 {
            (
                (target_price - price) / price * 100.0,
                (price - stop_loss) / price * 100.0,
            )
        } else {
            (0.0, 0.0)
        };
        let reward_risk = if risk_pct > 0.0 {
            upside_pct / risk_pct
        } else {
            0.0
        };

        Self {
            price,
            target_price,
            stop_loss,
            upside_pct,
            risk_pct,
            reward_risk,
        }
    }

    /// Plan for an entity, if all three levels are present and finite.
    pub fn from_entity(entity: &Entity) -> Option<Self> {
        let finite = |v: Option<f64>| v.filter(|x| x.is_finite());
        Some(Self::new(
            finite(entity.price)?,
            finite(entity.target_price)?,
            finite(entity.stop_loss)?,
        ))
    }
}

// ============================================================================
// Recommendation
// ============================================================================

/// Score band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    StrongBuy,
    Buy,
    Hold,
    Avoid,
}

impl Recommendation {
    /// Band for a composite score, judged as a percentage of [`MAX_SCORE`].
    pub fn from_score(score: u32) -> Self {
        let pct = score_pct(score);
        if pct >= 80.0 {
            Self::StrongBuy
        } else if pct >= 70.0 {
            Self::Buy
        } else if pct >= 60.0 {
            Self::Hold
        } else {
            Self::Avoid
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StrongBuy => write!(f, "Strong Buy"),
            Self::Buy => write!(f, "Buy"),
            Self::Hold => write!(f, "Hold"),
            Self::Avoid => write!(f, "Avoid"),
        }
    }
}

/// Score as a percentage of the maximum.
pub fn score_pct(score: u32) -> f64 {
    if MAX_SCORE == 0 {
        return 0.0;
    }
    f64::from(score) * 100.0 / f64::from(MAX_SCORE)
}

// ============================================================================
// Thesis
// ============================================================================

/// Plain-language reasons behind a score.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Thesis {
    pub strengths: Vec<String>,
    pub concerns: Vec<String>,
}

impl Thesis {
    pub fn for_entity(scored: &ScoredEntity) -> Self {
        let metrics = &scored.entity.metrics;
        let mut thesis = Self::default();

        for criterion in CRITERIA.iter() {
            if scored.passed(criterion.id) {
                thesis.strengths.push(criterion.label.to_string());
                continue;
            }
            if thesis.concerns.len() >= MAX_CONCERNS {
                continue;
            }
            let missing = criterion.missing_inputs(metrics);
            let concern = if missing.is_empty() {
                format!("Fails {}", criterion.label)
            } else {
                format!(
                    "Fails {} (data missing: {})",
                    criterion.label,
                    join_keys(&missing)
                )
            };
            thesis.concerns.push(concern);
        }

        thesis
    }
}

fn join_keys(metrics: &[Metric]) -> String {
    metrics.iter().map(|m| m.key()).collect::<Vec<_>>().join(", ")
}

// ============================================================================
// Universe Summary
// ============================================================================

/// Headline numbers for a scored universe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UniverseSummary {
    pub total_analyzed: usize,
    pub strong_buy_count: usize,
    /// Mean composite score; 0 for an empty universe
    pub average_score: f64,
    /// Mean upside over entities with a trade plan
    pub average_upside_pct: Option<f64>,
}

impl UniverseSummary {
    pub fn from_scored(scored: &[ScoredEntity]) -> Self {
        let total = scored.len();
        let strong = scored
            .iter()
            .filter(|s| Recommendation::from_score(s.composite_score) == Recommendation::StrongBuy)
            .count();
        let average_score = if total > 0 {
            scored.iter().map(|s| f64::from(s.composite_score)).sum::<f64>() / total as f64
        } else {
            0.0
        };

        let upsides: Vec<f64> = scored
            .iter()
            .filter_map(|s| TradePlan::from_entity(&s.entity))
            .map(|p| p.upside_pct)
            .collect();
        let average_upside_pct = if upsides.is_empty() {
            None
        } else {
            Some(upsides.iter().sum::<f64>() / upsides.len() as f64)
        };

        Self {
            total_analyzed: total,
            strong_buy_count: strong,
            average_score,
            average_upside_pct,
        }
    }
}
