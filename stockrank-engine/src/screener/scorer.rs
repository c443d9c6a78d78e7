//! Composite scorer and ranking order.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use super::criteria::{evaluate, CriterionId, Metric};
use crate::model::Entity;

/// An entity annotated with its checklist outcome and rank.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredEntity {
    /// The input record, unchanged
    #[serde(flatten)]
    pub entity: Entity,
    /// Pass flag per criterion group
    pub criteria_flags: BTreeMap<CriterionId, bool>,
    /// Sum of points for passed groups
    pub composite_score: u32,
    /// 1-based position in ranking order
    pub rank: usize,
}

impl ScoredEntity {
    /// Score a single entity. The rank is left at 0 until the universe is sorted.
    pub fn from_entity(entity: &Entity) -> Self {
        let eval = evaluate(entity);
        Self {
            entity: entity.clone(),
            criteria_flags: eval.flags,
            composite_score: eval.points,
            rank: 0,
        }
    }

    /// Symbol shortcut.
    pub fn symbol(&self) -> &str {
        &self.entity.symbol
    }

    /// Market cap with NaN treated as missing.
    pub fn market_cap(&self) -> Option<f64> {
        Metric::MarketCap.read(&self.entity.metrics)
    }

    /// Whether a criterion group passed.
    pub fn passed(&self, id: CriterionId) -> bool {
        self.criteria_flags.get(&id).copied().unwrap_or(false)
    }
}

/// Composite score of an entity.
pub fn score(entity: &Entity) -> u32 {
    evaluate(entity).points
}

/// Ranking order: score descending, then market cap descending, then symbol
/// ascending. An entity with a market cap ranks ahead of a tied one without.
pub fn ranking_order(a: &ScoredEntity, b: &ScoredEntity) -> Ordering {
    b.composite_score
        .cmp(&a.composite_score)
        .then_with(|| market_cap_desc(a.market_cap(), b.market_cap()))
        .then_with(|| a.symbol().cmp(b.symbol()))
}

fn market_cap_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sort in ranking order and number the ranks from 1.
pub fn rank_in_place(scored: &mut [ScoredEntity]) {
    scored.sort_by(ranking_order);
    for (i, s) in scored.iter_mut().enumerate() {
        s.rank = i + 1;
    }
}

/// Score and rank every entity. The input is not modified.
pub fn score_universe(entities: &[Entity]) -> Vec<ScoredEntity> {
    let mut scored: Vec<ScoredEntity> = entities.iter().map(ScoredEntity::from_entity).collect();
    rank_in_place(&mut scored);

    tracing::debug!(
        entities = scored.len(),
        top = scored.first().map(|s| s.symbol()).unwrap_or("-"),
        "Scored universe"
    );

    scored
}
