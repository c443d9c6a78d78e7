//! `stockrank screen` and `stockrank criteria`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use stockrank_engine::demo::demo_snapshot;
use stockrank_engine::screener::criteria::{Rule, CRITERIA, FRAMEWORK_NAME};
use stockrank_engine::{ReportFormat, ScreenerEngine, ScreenerReport, UniverseSnapshot, MAX_SCORE};
use tracing::{info, warn};

use crate::config::AppConfig;

#[derive(Args, Debug)]
pub struct ScreenArgs {
    /// Universe snapshot JSON (default: built-in demo universe)
    #[arg(long)]
    pub universe: Option<PathBuf>,

    /// Portfolio size (1-50)
    #[arg(short = 'n', long)]
    pub size: Option<usize>,

    /// Minimum composite score
    #[arg(long)]
    pub min_score: Option<u32>,

    /// Allowed sectors (comma separated or repeated)
    #[arg(long, value_delimiter = ',')]
    pub sector: Vec<String>,

    /// Allowed business groups (comma separated or repeated)
    #[arg(long, value_delimiter = ',')]
    pub group: Vec<String>,

    /// Report format (markdown, json, text)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl ScreenArgs {
    /// Command line flags win over file and environment values.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(size) = self.size {
            config.screener.portfolio_size = size;
        }
        if let Some(min_score) = self.min_score {
            config.screener.min_score_threshold = min_score;
        }
        if !self.sector.is_empty() {
            config.screener.sector_allow_list = self.sector.clone();
        }
        if !self.group.is_empty() {
            config.screener.group_allow_list = self.group.clone();
        }
        if let Some(format) = &self.format {
            config.output.format = format.clone();
        }
    }
}

/// Load the snapshot from a file, or fall back to the demo universe.
pub fn load_universe(path: Option<&Path>) -> Result<UniverseSnapshot> {
    match path {
        Some(path) => UniverseSnapshot::load(path)
            .with_context(|| format!("Failed to load universe {}", path.display())),
        None => {
            warn!("No universe given, using the static demo universe");
            demo_snapshot().context("Failed to load demo universe")
        }
    }
}

pub fn run(config: &AppConfig, args: &ScreenArgs) -> Result<()> {
    let snapshot = load_universe(args.universe.as_deref())?;
    let engine = ScreenerEngine::new(config.screener.clone());
    let result = engine.run(&snapshot);
    info!("{}", result.headline());

    if !result.data_is_live {
        warn!(snapshot_id = %result.snapshot_id, "Snapshot is not live data");
    }

    let format = config.output.report_format();
    let report = ScreenerReport::new(&result);

    let target = args.output.clone().or_else(|| {
        config
            .output
            .directory
            .as_ref()
            .map(|dir| dir.join(format!("screen-{}", result.snapshot_id)))
    });

    match target {
        Some(path) => {
            let written = report.save_to_file(&path, format)?;
            info!(path = %written.display(), format = %format, "Report saved");
            println!("{}", written.display());
        }
        None => print!("{}", ensure_newline(report.generate(format))),
    }

    Ok(())
}

fn ensure_newline(mut s: String) -> String {
    if !s.ends_with('\n') {
        s.push('\n');
    }
    s
}

/// Plain-text rendering of the checklist.
pub fn criteria_table() -> String {
    let mut out = format!("{} (maximum score {})\n\n", FRAMEWORK_NAME, MAX_SCORE);
    for c in CRITERIA.iter() {
        let joiner = match c.rule {
            Rule::All(_) => " AND ",
            Rule::Any(_) => " OR ",
        };
        let conditions: Vec<String> = c.rule.conditions().iter().map(|x| x.to_string()).collect();
        out.push_str(&format!(
            "{:<22} {:>2} pt  {}\n",
            c.label,
            c.points,
            conditions.join(joiner)
        ));
    }
    out
}
