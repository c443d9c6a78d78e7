//! Advisory payloads for each cadence state.
//!
//! The engine never trades. A yearly rebuild lists what to sell and the
//! fresh allocation to buy; a quarterly review lists candidates for a
//! manual decision.

use std::collections::BTreeSet;

use serde::Serialize;

use super::CadenceState;
use crate::portfolio::Portfolio;
use crate::screener::ScoredEntity;

/// One symbol in an advice list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdviceItem {
    pub symbol: String,
    /// Current score; `None` when the symbol is absent from the universe
    pub composite_score: Option<u32>,
    /// Rank in the full scored universe
    pub rank: Option<usize>,
    /// Target weight (%) for buys, `None` otherwise
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_pct: Option<f64>,
}

/// What the caller should consider doing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RebalanceAdvice {
    /// Nothing due
    Hold,
    /// Review only; no forced reallocation
    Review {
        /// Fresh top-N members not currently held
        new_entrants: Vec<AdviceItem>,
        /// Current holdings that fell out of the fresh top-N
        weak_incumbents: Vec<AdviceItem>,
    },
    /// Liquidate and rebuild from the latest snapshot
    Rebuild {
        sell: Vec<AdviceItem>,
        buy: Vec<AdviceItem>,
    },
}

impl RebalanceAdvice {
    /// Build advice for a state.
    ///
    /// `scored` is the full ranked universe of the latest snapshot and
    /// `fresh` the portfolio built from it.
    pub fn for_state(
        state: CadenceState,
        current_holdings: &[String],
        fresh: &Portfolio,
        scored: &[ScoredEntity],
    ) -> Self {
        let lookup = |symbol: &str| scored.iter().find(|s| s.symbol() == symbol);
        let item = |symbol: &str, weight_pct: Option<f64>| {
            let found = lookup(symbol);
            AdviceItem {
                symbol: symbol.to_string(),
                composite_score: found.map(|s| s.composite_score),
                rank: found.map(|s| s.rank),
                weight_pct,
            }
        };

        match state {
            CadenceState::Ok => Self::Hold,
            CadenceState::QuarterlyDue => {
                let held: BTreeSet<&str> = current_holdings.iter().map(String::as_str).collect();
                let fresh_symbols: BTreeSet<&str> = fresh.symbols().into_iter().collect();

                let new_entrants = fresh
                    .holdings
                    .iter()
                    .filter(|h| !held.contains(h.symbol()))
                    .map(|h| item(h.symbol(), None))
                    .collect();
                let weak_incumbents = current_holdings
                    .iter()
                    .filter(|s| !fresh_symbols.contains(s.as_str()))
                    .map(|s| item(s.as_str(), None))
                    .collect();

                Self::Review {
                    new_entrants,
                    weak_incumbents,
                }
            }
            CadenceState::YearlyDue => Self::Rebuild {
                sell: current_holdings.iter().map(|s| item(s.as_str(), None)).collect(),
                buy: fresh
                    .holdings
                    .iter()
                    .map(|h| item(h.symbol(), Some(h.weight_pct)))
                    .collect(),
            },
        }
    }

    pub fn is_hold(&self) -> bool {
        matches!(self, Self::Hold)
    }
}

impl std::fmt::Display for RebalanceAdvice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hold => write!(f, "Hold: no rebalance due"),
            Self::Review {
                new_entrants,
                weak_incumbents,
            } => write!(
                f,
                "Review: {} new entrant(s), {} weak incumbent(s)",
                new_entrants.len(),
                weak_incumbents.len()
            ),
            Self::Rebuild { sell, buy } => write!(
                f,
                "Rebuild: sell {} holding(s), buy {} holding(s)",
                sell.len(),
                buy.len()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Entity, Metrics};
    use crate::portfolio::allocate;
    use crate::screener::{score_universe, select, SelectionFilter};

    fn setup() -> (Vec<ScoredEntity>, Portfolio) {
        let cap = |v| Metrics {
            market_cap: Some(v),
            ..Default::default()
        };
        let scored = score_universe(&[
            Entity::new("A").with_metrics(cap(4000.0)),
            Entity::new("B").with_metrics(cap(3000.0)),
            Entity::new("C").with_metrics(cap(2000.0)),
            Entity::new("D").with_metrics(cap(100.0)),
        ]);
        let fresh = allocate(select(&scored, &SelectionFilter::default(), 2));
        (scored, fresh)
    }

    fn held(symbols: &[&str]) -> Vec<String> {
        symbols.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_ok_holds() {
        let (scored, fresh) = setup();
        let advice = RebalanceAdvice::for_state(CadenceState::Ok, &held(&["A"]), &fresh, &scored);
        assert!(advice.is_hold());
    }

    #[test]
    fn test_quarterly_review_lists_changes() {
        let (scored, fresh) = setup();
        let advice = RebalanceAdvice::for_state(
            CadenceState::QuarterlyDue,
            &held(&["A", "D", "GONE"]),
            &fresh,
            &scored,
        );
        match advice {
            RebalanceAdvice::Review {
                new_entrants,
                weak_incumbents,
            } => {
                let entrants: Vec<_> = new_entrants.iter().map(|i| i.symbol.as_str()).collect();
                assert_eq!(entrants, vec!["B"]);
                let weak: Vec<_> = weak_incumbents.iter().map(|i| i.symbol.as_str()).collect();
                assert_eq!(weak, vec!["D", "GONE"]);
                assert_eq!(weak_incumbents[0].rank, Some(4));
                assert_eq!(weak_incumbents[1].composite_score, None);
            }
            other => panic!("expected review, got {other:?}"),
        }
    }

    #[test]
    fn test_yearly_rebuild_sells_everything() {
        let (scored, fresh) = setup();
        let advice = RebalanceAdvice::for_state(
            CadenceState::YearlyDue,
            &held(&["A", "C"]),
            &fresh,
            &scored,
        );
        match &advice {
            RebalanceAdvice::Rebuild { sell, buy } => {
                assert_eq!(sell.len(), 2);
                let buys: Vec<_> = buy.iter().map(|i| (i.symbol.as_str(), i.weight_pct)).collect();
                assert_eq!(buys, vec![("A", Some(54.5)), ("B", Some(45.5))]);
            }
            other => panic!("expected rebuild, got {other:?}"),
        }
        assert_eq!(advice.to_string(), "Rebuild: sell 2 holding(s), buy 2 holding(s)");
    }

    #[test]
    fn test_advice_serializes_with_action_tag() {
        let json = serde_json::to_value(RebalanceAdvice::Hold).unwrap();
        assert_eq!(json["action"], "hold");
    }
}
