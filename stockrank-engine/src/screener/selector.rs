//! Portfolio selector.
//!
//! Narrows a scored universe through a small funnel (score floor, sector
//! allow-list, group allow-list) and keeps the top `n` in ranking order.
//! Each stage reports how many entities it eliminated.

use serde::{Deserialize, Serialize};

use super::scorer::{rank_in_place, ScoredEntity};

// ============================================================================
// Filter Stage
// ============================================================================

/// Filter stage identifier for tracking where entities are eliminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterStage {
    /// Input stage (whole scored universe)
    Input,
    /// Minimum composite score
    Score,
    /// Sector allow-list
    Sector,
    /// Business group allow-list
    Group,
    /// Top-N cut
    Final,
}

impl std::fmt::Display for FilterStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Input => write!(f, "Input"),
            Self::Score => write!(f, "Score floor"),
            Self::Sector => write!(f, "Sector filter"),
            Self::Group => write!(f, "Group filter"),
            Self::Final => write!(f, "Top-N"),
        }
    }
}

// ============================================================================
// Filter Result
// ============================================================================

/// Result of a filtering stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterResult {
    /// Stage name
    pub stage: FilterStage,
    /// Number of entities that passed this stage
    pub passed: usize,
    /// Number of entities eliminated at this stage
    pub eliminated: usize,
    /// Elimination rate (%)
    pub elimination_rate: f64,
}

impl FilterResult {
    pub fn new(stage: FilterStage, input_count: usize, passed_count: usize) -> Self {
        let eliminated = input_count.saturating_sub(passed_count);
        let elimination_rate = if input_count > 0 {
            (eliminated as f64 / input_count as f64) * 100.0
        } else {
            0.0
        };

        Self {
            stage,
            passed: passed_count,
            eliminated,
            elimination_rate,
        }
    }
}

// ============================================================================
// Selection Filter
// ============================================================================

/// Caller-supplied eligibility rules.
///
/// An empty allow-list admits everything. A non-empty one admits only
/// entities whose label matches an entry (trimmed, case-insensitive); an
/// entity with no label never matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionFilter {
    #[serde(default)]
    pub min_score_threshold: u32,
    #[serde(default)]
    pub sector_allow_list: Vec<String>,
    #[serde(default)]
    pub group_allow_list: Vec<String>,
}

impl SelectionFilter {
    fn passes_score(&self, s: &ScoredEntity) -> bool {
        s.composite_score >= self.min_score_threshold
    }

    fn passes_sector(&self, s: &ScoredEntity) -> bool {
        allowed(&self.sector_allow_list, s.entity.sector.as_deref())
    }

    fn passes_group(&self, s: &ScoredEntity) -> bool {
        allowed(&self.group_allow_list, s.entity.group_affiliation.as_deref())
    }
}

fn allowed(list: &[String], label: Option<&str>) -> bool {
    if list.is_empty() {
        return true;
    }
    match label {
        Some(label) => list
            .iter()
            .any(|entry| entry.trim().eq_ignore_ascii_case(label.trim())),
        None => false,
    }
}

// ============================================================================
// Selection
// ============================================================================

/// Outcome of a selection, with the funnel that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Selected entities, re-ranked from 1
    pub members: Vec<ScoredEntity>,
    /// Per-stage counts, in funnel order
    pub funnel: Vec<FilterResult>,
}

impl Selection {
    /// Whether nothing survived the filters.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Keep the top `n` eligible entities.
///
/// `n` larger than the eligible set returns all of it; an empty eligible
/// set gives an empty selection.
pub fn select(scored: &[ScoredEntity], filter: &SelectionFilter, n: usize) -> Vec<ScoredEntity> {
    select_with_funnel(scored, filter, n).members
}

/// Like [`select`], also reporting per-stage elimination counts.
pub fn select_with_funnel(
    scored: &[ScoredEntity],
    filter: &SelectionFilter,
    n: usize,
) -> Selection {
    let mut funnel = vec![FilterResult::new(FilterStage::Input, scored.len(), scored.len())];

    let candidates: Vec<&ScoredEntity> = scored.iter().collect();
    let (result, candidates) = run_stage(FilterStage::Score, candidates, |s| filter.passes_score(s));
    funnel.push(result);
    let (result, candidates) = run_stage(FilterStage::Sector, candidates, |s| filter.passes_sector(s));
    funnel.push(result);
    let (result, candidates) = run_stage(FilterStage::Group, candidates, |s| filter.passes_group(s));
    funnel.push(result);

    let eligible = candidates.len();
    let mut members: Vec<ScoredEntity> = candidates.into_iter().cloned().collect();
    rank_in_place(&mut members);
    members.truncate(n);
    // Truncating a ranked list keeps ranks 1..=k.
    funnel.push(FilterResult::new(FilterStage::Final, eligible, members.len()));

    tracing::debug!(
        input = scored.len(),
        eligible,
        selected = members.len(),
        requested = n,
        "Selection complete"
    );

    Selection { members, funnel }
}

fn run_stage<'a>(
    stage: FilterStage,
    input: Vec<&'a ScoredEntity>,
    pred: impl Fn(&ScoredEntity) -> bool,
) -> (FilterResult, Vec<&'a ScoredEntity>) {
    let before = input.len();
    let kept: Vec<&ScoredEntity> = input.into_iter().filter(|s| pred(*s)).collect();
    (FilterResult::new(stage, before, kept.len()), kept)
}

// ============================================================================
// Tests
// ============================================================================
