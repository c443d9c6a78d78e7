//! End-to-end tests over the full screening pipeline.

use chrono::{NaiveDate, TimeZone, Utc};
use test_case::test_case;

use stockrank_engine::demo::demo_snapshot;
use stockrank_engine::portfolio::weights;
use stockrank_engine::screener::{evaluate, CriterionId, ScreenerReport, CRITERIA};
use stockrank_engine::{
    CadenceState, Entity, Metrics, RebalanceAdvice, RebalanceClock,
    ReportFormat, ResultCache, ScreenStatus, ScreenerConfig, ScreenerEngine, UniverseSnapshot,
    MAX_SCORE,
};

// ============================================================================
// Test Utilities
// ============================================================================

fn worked_example() -> Metrics {
    Metrics {
        sales_growth_3y: Some(15.0),
        sales_growth_7y: Some(12.0),
        profit_growth_3y: Some(16.0),
        profit_growth_7y: Some(11.0),
        operating_margin: Some(16.0),
        operating_margin_5y: Some(15.0),
        operating_margin_10y: Some(11.0),
        net_margin: Some(6.0),
        roce: Some(16.0),
        roe: Some(10.0),
        roic: Some(10.0),
        pledge_pct: Some(0.5),
        debt_to_equity: Some(0.5),
        interest_coverage_ratio: Some(5.0),
        operating_cashflow_to_ebit: Some(0.9),
        promoter_holding_pct: Some(60.0),
        market_cap: Some(1000.0),
    }
}

fn engine(size: usize) -> ScreenerEngine {
    ScreenerEngine::new(ScreenerConfig {
        portfolio_size: size,
        ..Default::default()
    })
}

// ============================================================================
// Scoring
// ============================================================================

#[test]
fn test_worked_example_scores_maximum() {
    let eval = evaluate(&Entity::new("W").with_metrics(worked_example()));
    assert_eq!(eval.points, 15);
    assert_eq!(eval.points, MAX_SCORE);
    assert_eq!(eval.flags.len(), CRITERIA.len());
    assert!(eval.flags.values().all(|&passed| passed));
}

#[test]
fn test_missing_metrics_fail_quietly() {
    let eval = evaluate(&Entity::new("EMPTY"));
    assert_eq!(eval.points, 0);
    assert!(!eval.passed(CriterionId::ScaleFloor));
}

// ============================================================================
// Weights
// ============================================================================

#[test_case(1 ; "one")]
#[test_case(3 ; "three")]
#[test_case(5 ; "five")]
#[test_case(7 ; "seven")]
#[test_case(10 ; "ten")]
#[test_case(15 ; "fifteen")]
#[test_case(20 ; "twenty")]
fn test_portfolio_weights_total_one_hundred(n: usize) {
    let entities: Vec<Entity> = (0..25).map(|i| Entity::new(format!("E{:02}", i))).collect();
    let snapshot = UniverseSnapshot::new("w", Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(), false, entities);
    let result = engine(n).run(&snapshot);

    assert_eq!(result.portfolio.len(), n);
    assert_eq!(result.portfolio.total_weight_pct, 100.0);
    let sum: f64 = result.portfolio.holdings.iter().map(|h| h.weight_pct).sum();
    assert!((sum - 100.0).abs() < 1e-9);
}

#[test]
fn test_weight_curve_examples() {
    assert_eq!(weights(5), vec![30.0, 25.0, 20.0, 15.0, 10.0]);
    assert_eq!(weights(3), vec![40.0, 33.3, 26.7]);
}

// ============================================================================
// Pipeline
// ============================================================================

#[test]
fn test_demo_pipeline() {
    let snapshot = demo_snapshot().unwrap();
    let result = engine(5).run(&snapshot);

    assert_eq!(result.status, ScreenStatus::Selected);
    assert!(!result.data_is_live);
    assert_eq!(
        result.portfolio.symbols(),
        vec!["TCS", "HDFCBANK", "ICICIBANK", "INFY", "HINDUNILVR"]
    );
    assert_eq!(result.portfolio.weight_of("TCS"), 30.0);
    assert_eq!(result.summary.total_analyzed, 10);
}

#[test]
fn test_idempotent_output() {
    let snapshot = demo_snapshot().unwrap();
    let engine = engine(7);
    let first = ScreenerReport::new(&engine.run(&snapshot)).generate(ReportFormat::Json);
    let second = ScreenerReport::new(&engine.run(&snapshot)).generate(ReportFormat::Json);
    assert_eq!(first.as_bytes(), second.as_bytes());

    let text_a = ScreenerReport::new(&engine.run(&snapshot)).generate(ReportFormat::Text);
    let text_b = ScreenerReport::new(&engine.run(&snapshot)).generate(ReportFormat::Text);
    assert_eq!(text_a, text_b);
}

#[test]
fn test_snapshot_not_mutated() {
    let snapshot = demo_snapshot().unwrap();
    let before = snapshot.clone();
    let _ = engine(3).run(&snapshot);
    assert_eq!(snapshot, before);
}

#[test]
fn test_concurrent_runs_share_snapshot() {
    let snapshot = demo_snapshot().unwrap();
    let expected = serde_json::to_string(&engine(4).run(&snapshot)).unwrap();

    let shared = &snapshot;
    let outputs: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(move || serde_json::to_string(&engine(4).run(shared)).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(outputs.iter().all(|o| *o == expected));
}

#[test]
fn test_concurrent_cache_access() {
    let snapshot = demo_snapshot().unwrap();
    let cache = ResultCache::new();
    let engine = engine(3);

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let result = engine.run_cached(&snapshot, &cache);
                assert_eq!(result.portfolio.len(), 3);
            });
        }
    });

    assert_eq!(cache.stats().entries, 1);
    assert_eq!(cache.invalidate(&snapshot.id), 1);
}

#[test]
fn test_over_filtered_universe() {
    let snapshot = demo_snapshot().unwrap();
    let engine = ScreenerEngine::new(ScreenerConfig {
        min_score_threshold: MAX_SCORE,
        ..Default::default()
    });
    let result = engine.run(&snapshot);

    assert_eq!(result.status, ScreenStatus::NoMatches);
    assert!(result.portfolio.is_empty());
    assert_eq!(result.scored.len(), 10);
}

#[test]
fn test_empty_universe() {
    let snapshot = UniverseSnapshot::new("empty", Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(), false, vec![]);
    let result = engine(10).run(&snapshot);
    assert_eq!(result.status, ScreenStatus::NoMatches);
    assert_eq!(result.summary.total_analyzed, 0);
}

// ============================================================================
// Rebalance
// ============================================================================

#[test_case(89, 100, CadenceState::Ok ; "ok")]
#[test_case(91, 200, CadenceState::QuarterlyDue ; "quarterly")]
#[test_case(10, 366, CadenceState::YearlyDue ; "yearly small quarter")]
#[test_case(120, 366, CadenceState::YearlyDue ; "yearly large quarter")]
fn test_clock_transitions(days_q: i64, days_y: i64, expected: CadenceState) {
    assert_eq!(RebalanceClock::default().classify(days_q, days_y), expected);
}

#[test]
fn test_yearly_rebuild_from_demo() {
    let snapshot = demo_snapshot().unwrap();
    let result = engine(3).run(&snapshot);

    let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
    let anchor = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
    let status = RebalanceClock::default().status(now, anchor, anchor);
    assert_eq!(status.cadence_state, CadenceState::YearlyDue);

    let held = vec!["RELIANCE".to_string(), "TCS".to_string()];
    let advice =
        RebalanceAdvice::for_state(status.cadence_state, &held, &result.portfolio, &result.scored);
    match advice {
        RebalanceAdvice::Rebuild { sell, buy } => {
            assert_eq!(sell.len(), 2);
            assert_eq!(buy.len(), 3);
            let total: f64 = buy.iter().filter_map(|b| b.weight_pct).sum();
            assert!((total - 100.0).abs() < 1e-9);
        }
        other => panic!("expected rebuild, got {other:?}"),
    }
}
