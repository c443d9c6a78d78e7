//! Static fallback universe.
//!
//! Ten large NSE-listed companies with price levels, returns, leverage,
//! growth, and size. Long-horizon growth, margins, pledge, and promoter
//! data are absent, so the affected criteria fail. The snapshot is marked
//! `data_is_live = false`.

use stockrank_common::Result;

use crate::model::UniverseSnapshot;

const DEMO_UNIVERSE: &str = include_str!("../data/demo_universe.json");

/// Load the embedded demo snapshot.
pub fn demo_snapshot() -> Result<UniverseSnapshot> {
    UniverseSnapshot::from_json(DEMO_UNIVERSE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screener::{score_universe, CriterionId};

    #[test]
    fn test_demo_snapshot_loads() {
        let snapshot = demo_snapshot().unwrap();
        assert_eq!(snapshot.len(), 10);
        assert!(!snapshot.data_is_live);
        assert!(snapshot.entities.iter().all(|e| e.price.is_some()));
    }

    #[test]
    fn test_demo_labels() {
        let snapshot = demo_snapshot().unwrap();
        let tcs = snapshot.get("TCS").unwrap();
        assert_eq!(tcs.group_affiliation.as_deref(), Some("Tata"));
        assert_eq!(snapshot.get("INFY").unwrap().group_affiliation, None);
    }

    #[test]
    fn test_demo_ranking() {
        let snapshot = demo_snapshot().unwrap();
        let scored = score_universe(&snapshot.entities);
        let order: Vec<_> = scored.iter().map(|s| s.symbol()).collect();
        assert_eq!(
            order,
            vec![
                "TCS",
                "HDFCBANK",
                "ICICIBANK",
                "INFY",
                "HINDUNILVR",
                "BAJFINANCE",
                "ASIANPAINT",
                "WIPRO",
                "RELIANCE",
                "AXISBANK",
            ]
        );
        assert!(!scored[8].passed(CriterionId::Returns));
        assert!(scored[8].passed(CriterionId::ScaleFloor));
    }
}
