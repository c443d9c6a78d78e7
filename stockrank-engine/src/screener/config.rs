//! Screener configuration module.
//!
//! Everything the boundary layer can tune about a screening run: the score
//! floor, the optional sector and group allow-lists, and the portfolio size.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use stockrank_common::config::env_override;
use stockrank_common::validation::{check_range, collect_errors};
use stockrank_common::{Validate, ValidationError, ValidationResult};

use super::criteria::MAX_SCORE;
use super::selector::SelectionFilter;

/// Smallest allowed portfolio.
pub const MIN_PORTFOLIO_SIZE: usize = 1;
/// Largest allowed portfolio.
pub const MAX_PORTFOLIO_SIZE: usize = 50;

// ============================================================================
// Screener Configuration
// ============================================================================

/// Configuration for a screening run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenerConfig {
    /// Entities scoring below this are never selected
    #[serde(default)]
    pub min_score_threshold: u32,

    /// Only these sectors are eligible (empty means all)
    #[serde(default)]
    pub sector_allow_list: Vec<String>,

    /// Only these business groups are eligible (empty means all)
    #[serde(default)]
    pub group_allow_list: Vec<String>,

    /// Target number of holdings
    #[serde(default = "default_portfolio_size")]
    pub portfolio_size: usize,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            min_score_threshold: 0,
            sector_allow_list: Vec::new(),
            group_allow_list: Vec::new(),
            portfolio_size: default_portfolio_size(),
        }
    }
}

fn default_portfolio_size() -> usize {
    10
}

impl ScreenerConfig {
    /// Apply `STOCKRANK_PORTFOLIO_SIZE` and `STOCKRANK_MIN_SCORE`.
    pub fn apply_env_overrides(&mut self) {
        if let Some(size) = env_override::<usize>("PORTFOLIO_SIZE") {
            self.portfolio_size = size;
        }
        if let Some(min_score) = env_override::<u32>("MIN_SCORE") {
            self.min_score_threshold = min_score;
        }
    }

    /// Eligibility filter for the selector.
    pub fn selection_filter(&self) -> SelectionFilter {
        SelectionFilter {
            min_score_threshold: self.min_score_threshold,
            sector_allow_list: self.sector_allow_list.clone(),
            group_allow_list: self.group_allow_list.clone(),
        }
    }

    /// Short fingerprint of the serialized config, used in cache keys.
    ///
    /// Two configs that serialize identically share a fingerprint.
    pub fn fingerprint(&self) -> String {
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        let digest = Sha256::digest(&bytes);
        hex::encode(&digest[..8])
    }

    /// One-line human summary for reports and logs.
    pub fn summary(&self) -> String {
        format!(
            "size={} min_score={} sectors={} groups={}",
            self.portfolio_size,
            self.min_score_threshold,
            list_or_all(&self.sector_allow_list),
            list_or_all(&self.group_allow_list),
        )
    }
}

fn list_or_all(list: &[String]) -> String {
    if list.is_empty() {
        "all".to_string()
    } else {
        list.join(",")
    }
}

impl Validate for ScreenerConfig {
    fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();

        if let Err(e) = check_range(
            "portfolio_size",
            self.portfolio_size as i64,
            MIN_PORTFOLIO_SIZE as i64,
            MAX_PORTFOLIO_SIZE as i64,
        ) {
            errors.push(e);
        }

        if let Err(e) = check_range(
            "min_score_threshold",
            i64::from(self.min_score_threshold),
            0,
            i64::from(MAX_SCORE),
        ) {
            errors.push(e);
        }

        for (field, list) in [
            ("sector_allow_list", &self.sector_allow_list),
            ("group_allow_list", &self.group_allow_list),
        ] {
            if list.iter().any(|s| s.trim().is_empty()) {
                errors.push(ValidationError::InvalidValue {
                    field: field.to_string(),
                    reason: "blank entry".to_string(),
                });
            }
        }

        collect_errors(errors)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_defaults() {
        let config = ScreenerConfig::default();
        assert_eq!(config.portfolio_size, 10);
        assert_eq!(config.min_score_threshold, 0);
        assert!(config.sector_allow_list.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: ScreenerConfig =
            serde_json::from_str(r#"{"sector_allow_list": ["IT"]}"#).unwrap();
        assert_eq!(config.portfolio_size, 10);
        assert_eq!(config.sector_allow_list, vec!["IT".to_string()]);
    }

    #[test_case(0, false ; "zero")]
    #[test_case(1, true ; "one")]
    #[test_case(50, true ; "fifty")]
    #[test_case(51, false ; "fifty one")]
    fn test_portfolio_size_bounds(size: usize, ok: bool) {
        let config = ScreenerConfig {
            portfolio_size: size,
            ..Default::default()
        };
        assert_eq!(config.validate().is_ok(), ok);
    }

    #[test]
    fn test_min_score_above_max_rejected() {
        let config = ScreenerConfig {
            min_score_threshold: MAX_SCORE + 1,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_multiple_errors_collected() {
        let config = ScreenerConfig {
            portfolio_size: 0,
            sector_allow_list: vec![" ".into()],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::Multiple(v)) if v.len() == 2
        ));
    }

    #[test]
    fn test_fingerprint_stable_and_sensitive() {
        let a = ScreenerConfig::default();
        let b = ScreenerConfig::default();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 16);

        let c = ScreenerConfig {
            portfolio_size: 5,
            ..Default::default()
        };
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn test_summary() {
        let config = ScreenerConfig {
            sector_allow_list: vec!["IT".into(), "Banking".into()],
            ..Default::default()
        };
        assert_eq!(
            config.summary(),
            "size=10 min_score=0 sectors=IT,Banking groups=all"
        );
    }
}
