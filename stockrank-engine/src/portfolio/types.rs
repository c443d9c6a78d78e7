//! Portfolio data types.

use serde::Serialize;

use crate::screener::ScoredEntity;

/// A selected entity with its allocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Holding {
    #[serde(flatten)]
    pub scored: ScoredEntity,
    /// Allocation (%), one decimal
    pub weight_pct: f64,
}

impl Holding {
    pub fn symbol(&self) -> &str {
        self.scored.symbol()
    }

    pub fn rank(&self) -> usize {
        self.scored.rank
    }
}

/// An ordered, weighted selection.
///
/// Built once from a selection and never mutated; a new snapshot produces a
/// new portfolio.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Portfolio {
    /// Holdings in rank order
    pub holdings: Vec<Holding>,
    /// Sum of weights; exactly 100 unless empty
    pub total_weight_pct: f64,
}

impl Portfolio {
    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    /// Holding symbols in rank order.
    pub fn symbols(&self) -> Vec<&str> {
        self.holdings.iter().map(|h| h.symbol()).collect()
    }

    pub fn get(&self, symbol: &str) -> Option<&Holding> {
        self.holdings.iter().find(|h| h.symbol() == symbol)
    }

    /// Weight of a symbol, zero when not held.
    pub fn weight_of(&self, symbol: &str) -> f64 {
        self.get(symbol).map(|h| h.weight_pct).unwrap_or(0.0)
    }
}
