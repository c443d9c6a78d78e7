//! `stockrank rebalance`.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::Args;
use serde::Serialize;
use stockrank_engine::{RebalanceAdvice, RebalanceClock, RebalanceStatus, ScreenerEngine};
use tracing::info;

use crate::config::AppConfig;
use crate::screen::load_universe;

#[derive(Args, Debug)]
pub struct RebalanceArgs {
    /// Universe snapshot JSON (default: built-in demo universe)
    #[arg(long)]
    pub universe: Option<PathBuf>,

    /// Start of the current review period (YYYY-MM-DD)
    #[arg(long)]
    pub quarter_anchor: Option<NaiveDate>,

    /// Start of the current rebuild period (YYYY-MM-DD)
    #[arg(long)]
    pub year_anchor: Option<NaiveDate>,

    /// Symbols currently held (comma separated or repeated)
    #[arg(long, value_delimiter = ',')]
    pub holdings: Vec<String>,

    /// Evaluate as of this time (RFC 3339 or YYYY-MM-DD; default: now)
    #[arg(long)]
    pub now: Option<String>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

impl RebalanceArgs {
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(anchor) = self.quarter_anchor {
            config.rebalance.quarter_anchor = Some(anchor);
        }
        if let Some(anchor) = self.year_anchor {
            config.rebalance.year_anchor = Some(anchor);
        }
    }
}

#[derive(Debug, Serialize)]
struct RebalanceOutput {
    as_of: DateTime<Utc>,
    #[serde(flatten)]
    status: RebalanceStatus,
    advice: RebalanceAdvice,
}

/// Parse `--now`.
pub fn parse_now(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    bail!("Cannot parse '{}' as RFC 3339 time or YYYY-MM-DD date", raw)
}

pub fn run(config: &AppConfig, args: &RebalanceArgs) -> Result<()> {
    let now = match &args.now {
        Some(raw) => parse_now(raw)?,
        None => Utc::now(),
    };

    let clock = RebalanceClock::from_config(&config.rebalance);
    let status = clock.status_for(now, &config.rebalance);

    let snapshot = load_universe(args.universe.as_deref())?;
    let result = ScreenerEngine::new(config.screener.clone()).run(&snapshot);
    let advice = RebalanceAdvice::for_state(
        status.cadence_state,
        &args.holdings,
        &result.portfolio,
        &result.scored,
    );
    info!(state = %status.cadence_state, advice = %advice, "Rebalance evaluated");

    let output = RebalanceOutput {
        as_of: now,
        status,
        advice,
    };

    if args.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to encode output")?;
        println!("{}", json);
    } else {
        print!("{}", render_text(&output));
    }
    Ok(())
}

fn render_text(output: &RebalanceOutput) -> String {
    let s = &output.status;
    let mut out = format!(
        "State: {}\nDays since quarter anchor: {}\nDays since year anchor: {}\n{}\n",
        s.cadence_state, s.days_since_quarter_anchor, s.days_since_year_anchor, output.advice
    );

    let list = |title: &str, items: &[stockrank_engine::rebalance::AdviceItem]| {
        let mut block = format!("\n{}:\n", title);
        if items.is_empty() {
            block.push_str("  (none)\n");
        }
        for item in items {
            let score = item
                .composite_score
                .map_or_else(|| "-".to_string(), |v| v.to_string());
            match item.weight_pct {
                Some(w) => block.push_str(&format!("  {:<12} score {:>2}  {:>5.1}%\n", item.symbol, score, w)),
                None => block.push_str(&format!("  {:<12} score {:>2}\n", item.symbol, score)),
            }
        }
        block
    };

    match &output.advice {
        RebalanceAdvice::Hold => {}
        RebalanceAdvice::Review {
            new_entrants,
            weak_incumbents,
        } => {
            out.push_str(&list("New entrants", new_entrants));
            out.push_str(&list("Weak incumbents", weak_incumbents));
        }
        RebalanceAdvice::Rebuild { sell, buy } => {
            out.push_str(&list("Sell", sell));
            out.push_str(&list("Buy", buy));
        }
    }
    out
}
