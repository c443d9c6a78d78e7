//! Weight allocator.
//!
//! Turns an ordered selection into percentage weights using a descending
//! base curve chosen by selection size:
//!
//! ```text
//! n <= 5        30 25 20 15 10
//! 5 < n <= 10   15 13 11 10  9  8  7  6  6  5
//! n > 10        10  9  8  7  6  5  4  4  3  3  3  2  2  2  2 (2 repeats)
//! ```
//!
//! The truncated curve is normalized to 100 and rounded to one decimal.
//! Arithmetic runs in integer tenths of a percent, so after the rounding
//! remainder is moved onto rank 1 the weights sum to exactly 100.

use super::types::{Holding, Portfolio};
use crate::screener::ScoredEntity;

/// Base curve for up to five holdings.
pub const SMALL_CURVE: [u32; 5] = [30, 25, 20, 15, 10];

/// Base curve for six to ten holdings.
pub const MEDIUM_CURVE: [u32; 10] = [15, 13, 11, 10, 9, 8, 7, 6, 6, 5];

/// Base curve for more than ten holdings; the last value repeats.
pub const LARGE_CURVE: [u32; 15] = [10, 9, 8, 7, 6, 5, 4, 4, 3, 3, 3, 2, 2, 2, 2];

/// Size at or below which [`SMALL_CURVE`] applies.
pub const SMALL_MAX: usize = 5;

/// Size at or below which [`MEDIUM_CURVE`] applies.
pub const MEDIUM_MAX: usize = 10;

const TENTHS_TOTAL: i64 = 1000;

/// Base curve truncated (or extended by its tail value) to `n` entries.
pub fn base_curve(n: usize) -> Vec<u32> {
    let curve: &[u32] = if n <= SMALL_MAX {
        &SMALL_CURVE
    } else if n <= MEDIUM_MAX {
        &MEDIUM_CURVE
    } else {
        &LARGE_CURVE
    };
    let tail = curve[curve.len() - 1];
    curve
        .iter()
        .copied()
        .chain(std::iter::repeat(tail))
        .take(n)
        .collect()
}

/// Weights for `n` holdings in tenths of a percent, summing to 1000.
pub fn weight_tenths(n: usize) -> Vec<i64> {
    let curve = base_curve(n);
    let total: u32 = curve.iter().sum();
    if total == 0 {
        return Vec::new();
    }

    let mut tenths: Vec<i64> = curve
        .iter()
        .map(|&v| (f64::from(v) * TENTHS_TOTAL as f64 / f64::from(total)).round() as i64)
        .collect();

    let residual = TENTHS_TOTAL - tenths.iter().sum::<i64>();
    if let Some(first) = tenths.first_mut() {
        *first += residual;
    }
    if residual != 0 {
        tracing::trace!(n, residual_tenths = residual, "Moved rounding remainder to rank 1");
    }
    tenths
}

/// Weights for `n` holdings in percent.
pub fn weights(n: usize) -> Vec<f64> {
    weight_tenths(n).into_iter().map(tenths_to_pct).collect()
}

/// Attach weights to an ordered selection.
///
/// An empty selection gives an empty portfolio with a total of 0.
pub fn allocate(selection: Vec<ScoredEntity>) -> Portfolio {
    let tenths = weight_tenths(selection.len());
    let total: i64 = tenths.iter().sum();

    let holdings = selection
        .into_iter()
        .zip(tenths)
        .map(|(scored, t)| Holding {
            scored,
            weight_pct: tenths_to_pct(t),
        })
        .collect();

    Portfolio {
        holdings,
        total_weight_pct: tenths_to_pct(total),
    }
}

fn tenths_to_pct(tenths: i64) -> f64 {
    tenths as f64 / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Entity;
    use crate::screener::score_universe;
    use test_case::test_case;

    #[test]
    fn test_curve_selection() {
        assert_eq!(base_curve(3), vec![30, 25, 20]);
        assert_eq!(base_curve(6), vec![15, 13, 11, 10, 9, 8]);
        assert_eq!(base_curve(11).len(), 11);
        assert_eq!(base_curve(11)[0], 10);
    }

    #[test]
    fn test_large_curve_repeats_tail() {
        let curve = base_curve(20);
        assert_eq!(curve.len(), 20);
        assert!(curve[15..].iter().all(|&v| v == 2));
    }

    #[test]
    fn test_five_unchanged() {
        assert_eq!(weights(5), vec![30.0, 25.0, 20.0, 15.0, 10.0]);
    }

    #[test]
    fn test_three_normalized() {
        assert_eq!(weights(3), vec![40.0, 33.3, 26.7]);
    }

    #[test]
    fn test_residual_moves_to_rank_one() {
        // Twelve holdings round to 1001 tenths; rank 1 gives one back.
        let tenths = weight_tenths(12);
        assert_eq!(tenths[0], 155);
        assert_eq!(tenths[1], 141);
        assert_eq!(tenths.iter().sum::<i64>(), 1000);
    }

    #[test]
    fn test_no_residual_for_seven() {
        assert_eq!(
            weight_tenths(7),
            vec![205, 178, 151, 137, 123, 110, 96]
        );
    }

    #[test_case(1 ; "one")]
    #[test_case(3 ; "three")]
    #[test_case(5 ; "five")]
    #[test_case(7 ; "seven")]
    #[test_case(10 ; "ten")]
    #[test_case(15 ; "fifteen")]
    #[test_case(20 ; "twenty")]
    fn test_sum_exactly_hundred(n: usize) {
        let tenths = weight_tenths(n);
        assert_eq!(tenths.len(), n);
        assert_eq!(tenths.iter().sum::<i64>(), 1000);
        assert!(tenths.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_empty_selection() {
        let portfolio = allocate(Vec::new());
        assert!(portfolio.is_empty());
        assert_eq!(portfolio.total_weight_pct, 0.0);
    }

    #[test]
    fn test_allocate_keeps_order() {
        let scored = score_universe(&[Entity::new("A"), Entity::new("B"), Entity::new("C")]);
        let portfolio = allocate(scored);
        assert_eq!(portfolio.symbols(), vec!["A", "B", "C"]);
        assert_eq!(portfolio.weight_of("A"), 40.0);
        assert_eq!(portfolio.weight_of("Z"), 0.0);
        assert_eq!(portfolio.total_weight_pct, 100.0);
        assert_eq!(portfolio.holdings[2].rank(), 3);
    }
}
