//! Screener report generation.
//!
//! Renders a [`ScreenerResult`] as Markdown, JSON, or tab-separated text.
//! Every format carries symbol, score, weight, and each scoring metric at
//! full precision; missing values render as `-` (text formats) or `null`
//! (JSON).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::criteria::{Metric, MAX_SCORE};
use super::engine::ScreenerResult;
use super::scorer::ScoredEntity;
use crate::analysis::Recommendation;

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Markdown format (human-readable)
    Markdown,
    /// JSON format (machine-readable)
    Json,
    /// Tab-separated rows (spreadsheet import)
    Text,
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Markdown => write!(f, "markdown"),
            Self::Json => write!(f, "json"),
            Self::Text => write!(f, "text"),
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            "text" | "txt" | "tsv" => Ok(Self::Text),
            _ => Err(format!("Unknown report format: {}", s)),
        }
    }
}

impl ReportFormat {
    fn extension(self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Json => "json",
            Self::Text => "tsv",
        }
    }
}

/// Report over one screening result.
pub struct ScreenerReport<'a> {
    result: &'a ScreenerResult,
}

impl<'a> ScreenerReport<'a> {
    pub fn new(result: &'a ScreenerResult) -> Self {
        Self { result }
    }

    /// Render in the given format.
    pub fn generate(&self, format: ReportFormat) -> String {
        match format {
            ReportFormat::Markdown => self.to_markdown(),
            ReportFormat::Json => self.to_json(),
            ReportFormat::Text => self.to_text(),
        }
    }

    /// Write the report, adding the format's extension when `path` has none.
    pub fn save_to_file(&self, path: &Path, format: ReportFormat) -> Result<PathBuf> {
        let content = self.generate(format);

        let file_path = if path.extension().is_none() {
            path.with_extension(format.extension())
        } else {
            path.to_path_buf()
        };

        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).context("Failed to create report directory")?;
            }
        }

        std::fs::write(&file_path, content)
            .with_context(|| format!("Failed to write report file {}", file_path.display()))?;

        Ok(file_path)
    }

    /// Generate markdown report.
    pub fn to_markdown(&self) -> String {
        let r = self.result;
        let mut md = String::new();

        md.push_str(&format!(
            "# Stock Screen Report\n\n**Snapshot**: {}\n**As of**: {}\n**Data**: {}\n\n",
            r.snapshot_id,
            r.as_of.format("%Y-%m-%d %H:%M:%S UTC"),
            if r.data_is_live { "live" } else { "static fallback" },
        ));

        md.push_str("## Summary\n\n");
        md.push_str(&format!("- **Analyzed**: {}\n", r.summary.total_analyzed));
        md.push_str(&format!("- **Strong Buy**: {}\n", r.summary.strong_buy_count));
        md.push_str(&format!(
            "- **Average score**: {:.1} / {}\n",
            r.summary.average_score, MAX_SCORE
        ));
        if let Some(upside) = r.summary.average_upside_pct {
            md.push_str(&format!("- **Average upside**: {:.1}%\n", upside));
        }
        md.push_str(&format!("- **Filters**: {}\n\n", r.config_summary));

        md.push_str("### Filter funnel\n\n");
        md.push_str("| Stage | Passed | Eliminated | Rate |\n");
        md.push_str("|-------|--------|------------|------|\n");
        for fr in &r.filter_results {
            md.push_str(&format!(
                "| {} | {} | {} | {:.1}% |\n",
                fr.stage, fr.passed, fr.eliminated, fr.elimination_rate
            ));
        }
        md.push('\n');

        md.push_str("## Portfolio\n\n");
        if let Some(guidance) = r.status.guidance() {
            md.push_str(&format!("> {}\n\n", guidance));
        } else {
            md.push_str("| Rank | Symbol | Sector | Score | Weight % | Call |\n");
            md.push_str("|------|--------|--------|-------|----------|------|\n");
            for h in &r.portfolio.holdings {
                md.push_str(&format!(
                    "| {} | {} | {} | {} | {:.1} | {} |\n",
                    h.rank(),
                    h.symbol(),
                    h.scored.entity.sector.as_deref().unwrap_or("-"),
                    h.scored.composite_score,
                    h.weight_pct,
                    Recommendation::from_score(h.scored.composite_score),
                ));
            }
            md.push_str(&format!(
                "\n**Total weight**: {:.1}%\n\n",
                r.portfolio.total_weight_pct
            ));
        }

        md.push_str("## Scored universe\n\n");
        md.push_str(&format!("| {} |\n", self.columns().join(" | ")));
        md.push_str(&format!("|{}\n", "---|".repeat(self.columns().len())));
        for s in &r.scored {
            md.push_str(&format!("| {} |\n", self.row(s).join(" | ")));
        }

        md
    }

    /// Generate JSON report.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self.result).unwrap_or_else(|_| "{}".to_string())
    }

    /// Tab-separated rows, one per scored entity, with a header line.
    pub fn to_text(&self) -> String {
        let mut out = self.columns().join("\t");
        out.push('\n');
        for s in &self.result.scored {
            out.push_str(&self.row(s).join("\t"));
            out.push('\n');
        }
        out
    }

    fn columns(&self) -> Vec<&'static str> {
        let mut cols = vec!["rank", "symbol", "sector", "group", "composite_score", "weight_pct"];
        cols.extend(Metric::ALL.iter().map(|m| m.key()));
        cols
    }

    fn row(&self, s: &ScoredEntity) -> Vec<String> {
        let mut row = vec![
            s.rank.to_string(),
            s.symbol().to_string(),
            s.entity.sector.clone().unwrap_or_else(|| "-".to_string()),
            s.entity
                .group_affiliation
                .clone()
                .unwrap_or_else(|| "-".to_string()),
            s.composite_score.to_string(),
            self.result.portfolio.weight_of(s.symbol()).to_string(),
        ];
        row.extend(
            Metric::ALL
                .iter()
                .map(|m| fmt_value(m.read(&s.entity.metrics))),
        );
        row
    }
}

/// Shortest representation that parses back to the same value.
fn fmt_value(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

// ============================================================================
// Tests
// ============================================================================
