//! Criteria evaluator.
//!
//! The quality checklist is a fixed table of nine weighted criterion groups.
//! Each group awards its points only when its rule holds; there is no
//! partial credit. Every input that a condition reads may be missing, and a
//! missing (or NaN) input makes that condition false.
//!
//! | Group               | Rule                                                   | Points |
//! |---------------------|--------------------------------------------------------|--------|
//! | Sales growth        | 3y > 12 AND 7y > 10                                    | 2      |
//! | Profit growth       | 3y > 14 AND 7y > 10                                    | 2      |
//! | Margin consistency  | OPM > 14 AND 5y > 14 AND 10y > 10                      | 3      |
//! | Net margin          | NPM > 5                                                | 1      |
//! | Returns             | ROCE > 15 OR ROE > 15 OR ROIC > 15                     | 1      |
//! | Leverage & coverage | pledge < 1 AND D/E < 1 AND ICR > 3                     | 3      |
//! | Cash conversion     | OCF/EBIT > 0.75                                        | 1      |
//! | Promoter commitment | promoter holding > 50                                  | 1      |
//! | Scale floor         | market cap > 500                                       | 1      |

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{Entity, Metrics};

/// Name the checklist is published under.
///
/// This is a label only. The table below awards at most [`MAX_SCORE`]
/// points, which is not 17.
pub const FRAMEWORK_NAME: &str = "17-criteria quality screen";

// ============================================================================
// Metrics
// ============================================================================

/// A scoring input, addressable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Metric {
    SalesGrowth3y,
    SalesGrowth7y,
    ProfitGrowth3y,
    ProfitGrowth7y,
    OperatingMargin,
    OperatingMargin5y,
    OperatingMargin10y,
    NetMargin,
    Roce,
    Roe,
    Roic,
    PledgePct,
    DebtToEquity,
    InterestCoverageRatio,
    OperatingCashflowToEbit,
    PromoterHoldingPct,
    MarketCap,
}

impl Metric {
    /// Every metric, in export column order.
    pub const ALL: [Metric; 17] = [
        Metric::SalesGrowth3y,
        Metric::SalesGrowth7y,
        Metric::ProfitGrowth3y,
        Metric::ProfitGrowth7y,
        Metric::OperatingMargin,
        Metric::OperatingMargin5y,
        Metric::OperatingMargin10y,
        Metric::NetMargin,
        Metric::Roce,
        Metric::Roe,
        Metric::Roic,
        Metric::PledgePct,
        Metric::DebtToEquity,
        Metric::InterestCoverageRatio,
        Metric::OperatingCashflowToEbit,
        Metric::PromoterHoldingPct,
        Metric::MarketCap,
    ];

    /// Field name as it appears in snapshot records.
    pub const fn key(self) -> &'static str {
        match self {
            Self::SalesGrowth3y => "sales_growth_3y",
            Self::SalesGrowth7y => "sales_growth_7y",
            Self::ProfitGrowth3y => "profit_growth_3y",
            Self::ProfitGrowth7y => "profit_growth_7y",
            Self::OperatingMargin => "operating_margin",
            Self::OperatingMargin5y => "operating_margin_5y",
            Self::OperatingMargin10y => "operating_margin_10y",
            Self::NetMargin => "net_margin",
            Self::Roce => "roce",
            Self::Roe => "roe",
            Self::Roic => "roic",
            Self::PledgePct => "pledge_pct",
            Self::DebtToEquity => "debt_to_equity",
            Self::InterestCoverageRatio => "interest_coverage_ratio",
            Self::OperatingCashflowToEbit => "operating_cashflow_to_ebit",
            Self::PromoterHoldingPct => "promoter_holding_pct",
            Self::MarketCap => "market_cap",
        }
    }

    /// Read this metric, treating NaN as missing.
    pub fn read(self, m: &Metrics) -> Option<f64> {
        let value = match self {
            Self::SalesGrowth3y => m.sales_growth_3y,
            Self::SalesGrowth7y => m.sales_growth_7y,
            Self::ProfitGrowth3y => m.profit_growth_3y,
            Self::ProfitGrowth7y => m.profit_growth_7y,
            Self::OperatingMargin => m.operating_margin,
            Self::OperatingMargin5y => m.operating_margin_5y,
            Self::OperatingMargin10y => m.operating_margin_10y,
            Self::NetMargin => m.net_margin,
            Self::Roce => m.roce,
            Self::Roe => m.roe,
            Self::Roic => m.roic,
            Self::PledgePct => m.pledge_pct,
            Self::DebtToEquity => m.debt_to_equity,
            Self::InterestCoverageRatio => m.interest_coverage_ratio,
            Self::OperatingCashflowToEbit => m.operating_cashflow_to_ebit,
            Self::PromoterHoldingPct => m.promoter_holding_pct,
            Self::MarketCap => m.market_cap,
        };
        value.filter(|v| !v.is_nan())
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

// ============================================================================
// Conditions and Rules
// ============================================================================

/// Strict comparison against a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Above,
    Below,
}

/// One threshold test on one metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Condition {
    pub metric: Metric,
    pub comparison: Comparison,
    pub threshold: f64,
}

impl Condition {
    const fn above(metric: Metric, threshold: f64) -> Self {
        Self {
            metric,
            comparison: Comparison::Above,
            threshold,
        }
    }

    const fn below(metric: Metric, threshold: f64) -> Self {
        Self {
            metric,
            comparison: Comparison::Below,
            threshold,
        }
    }

    /// Whether the condition holds. Missing input is a failure.
    pub fn holds(&self, metrics: &Metrics) -> bool {
        match self.metric.read(metrics) {
            Some(v) => match self.comparison {
                Comparison::Above => v > self.threshold,
                Comparison::Below => v < self.threshold,
            },
            None => false,
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let op = match self.comparison {
            Comparison::Above => ">",
            Comparison::Below => "<",
        };
        write!(f, "{} {} {}", self.metric, op, self.threshold)
    }
}

/// How a group's conditions combine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rule {
    All(&'static [Condition]),
    Any(&'static [Condition]),
}

impl Rule {
    /// Conditions in the rule.
    pub const fn conditions(&self) -> &'static [Condition] {
        match self {
            Self::All(c) | Self::Any(c) => *c,
        }
    }

    fn holds(&self, metrics: &Metrics) -> bool {
        match self {
            Self::All(c) => c.iter().all(|cond| cond.holds(metrics)),
            Self::Any(c) => c.iter().any(|cond| cond.holds(metrics)),
        }
    }
}

// ============================================================================
// Criterion Table
// ============================================================================

/// Criterion group identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionId {
    SalesGrowth,
    ProfitGrowth,
    MarginConsistency,
    NetMargin,
    Returns,
    LeverageCoverage,
    CashConversion,
    PromoterCommitment,
    ScaleFloor,
}

impl std::fmt::Display for CriterionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(criterion(*self).label)
    }
}

/// A weighted criterion group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Criterion {
    pub id: CriterionId,
    pub label: &'static str,
    pub points: u32,
    pub rule: Rule,
}

impl Criterion {
    /// Whether the group passes for these metrics.
    pub fn passes(&self, metrics: &Metrics) -> bool {
        self.rule.holds(metrics)
    }

    /// Inputs the group reads that are missing.
    pub fn missing_inputs(&self, metrics: &Metrics) -> Vec<Metric> {
        self.rule
            .conditions()
            .iter()
            .map(|c| c.metric)
            .filter(|m| m.read(metrics).is_none())
            .collect()
    }
}

const SALES_GROWTH: &[Condition] = &[
    Condition::above(Metric::SalesGrowth3y, 12.0),
    Condition::above(Metric::SalesGrowth7y, 10.0),
];

const PROFIT_GROWTH: &[Condition] = &[
    Condition::above(Metric::ProfitGrowth3y, 14.0),
    Condition::above(Metric::ProfitGrowth7y, 10.0),
];

const MARGIN_CONSISTENCY: &[Condition] = &[
    Condition::above(Metric::OperatingMargin, 14.0),
    Condition::above(Metric::OperatingMargin5y, 14.0),
    Condition::above(Metric::OperatingMargin10y, 10.0),
];

const NET_MARGIN: &[Condition] = &[Condition::above(Metric::NetMargin, 5.0)];

const RETURNS: &[Condition] = &[
    Condition::above(Metric::Roce, 15.0),
    Condition::above(Metric::Roe, 15.0),
    Condition::above(Metric::Roic, 15.0),
];

const LEVERAGE_COVERAGE: &[Condition] = &[
    Condition::below(Metric::PledgePct, 1.0),
    Condition::below(Metric::DebtToEquity, 1.0),
    Condition::above(Metric::InterestCoverageRatio, 3.0),
];

const CASH_CONVERSION: &[Condition] = &[Condition::above(Metric::OperatingCashflowToEbit, 0.75)];

const PROMOTER_COMMITMENT: &[Condition] = &[Condition::above(Metric::PromoterHoldingPct, 50.0)];

const SCALE_FLOOR: &[Condition] = &[Condition::above(Metric::MarketCap, 500.0)];

/// The checklist.
pub const CRITERIA: [Criterion; 9] = [
    Criterion {
        id: CriterionId::SalesGrowth,
        label: "Sales growth",
        points: 2,
        rule: Rule::All(SALES_GROWTH),
    },
    Criterion {
        id: CriterionId::ProfitGrowth,
        label: "Profit growth",
        points: 2,
        rule: Rule::All(PROFIT_GROWTH),
    },
    Criterion {
        id: CriterionId::MarginConsistency,
        label: "Margin consistency",
        points: 3,
        rule: Rule::All(MARGIN_CONSISTENCY),
    },
    Criterion {
        id: CriterionId::NetMargin,
        label: "Net margin",
        points: 1,
        rule: Rule::All(NET_MARGIN),
    },
    Criterion {
        id: CriterionId::Returns,
        label: "Returns",
        points: 1,
        rule: Rule::Any(RETURNS),
    },
    Criterion {
        id: CriterionId::LeverageCoverage,
        label: "Leverage & coverage",
        points: 3,
        rule: Rule::All(LEVERAGE_COVERAGE),
    },
    Criterion {
        id: CriterionId::CashConversion,
        label: "Cash conversion",
        points: 1,
        rule: Rule::All(CASH_CONVERSION),
    },
    Criterion {
        id: CriterionId::PromoterCommitment,
        label: "Promoter commitment",
        points: 1,
        rule: Rule::All(PROMOTER_COMMITMENT),
    },
    Criterion {
        id: CriterionId::ScaleFloor,
        label: "Scale floor",
        points: 1,
        rule: Rule::All(SCALE_FLOOR),
    },
];

const fn total_points(table: &[Criterion]) -> u32 {
    let mut sum = 0;
    let mut i = 0;
    while i < table.len() {
        sum += table[i].points;
        i += 1;
    }
    sum
}

/// Highest achievable composite score, derived from [`CRITERIA`].
pub const MAX_SCORE: u32 = total_points(&CRITERIA);

/// Look up a criterion by id.
pub fn criterion(id: CriterionId) -> &'static Criterion {
    static TABLE: [Criterion; 9] = CRITERIA;
    TABLE
        .iter()
        .find(|c| c.id == id)
        .unwrap_or(&TABLE[0])
}

// ============================================================================
// Evaluation
// ============================================================================

/// Per-entity checklist outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Pass flag per criterion group
    pub flags: BTreeMap<CriterionId, bool>,
    /// Sum of points for passed groups
    pub points: u32,
}

impl Evaluation {
    /// Whether a group passed.
    pub fn passed(&self, id: CriterionId) -> bool {
        self.flags.get(&id).copied().unwrap_or(false)
    }

    /// Number of groups that passed.
    pub fn passed_count(&self) -> usize {
        self.flags.values().filter(|v| **v).count()
    }
}

/// Evaluate the checklist against a set of metrics.
pub fn evaluate_metrics(metrics: &Metrics) -> Evaluation {
    let mut flags = BTreeMap::new();
    let mut points = 0;

    for c in &CRITERIA {
        let passed = c.passes(metrics);
        if passed {
            points += c.points;
        }
        flags.insert(c.id, passed);
    }

    Evaluation { flags, points }
}

/// Evaluate the checklist for an entity.
pub fn evaluate(entity: &Entity) -> Evaluation {
    evaluate_metrics(&entity.metrics)
}

// ============================================================================
// Tests
// ============================================================================
