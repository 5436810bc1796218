//! `profchat insights <name>`: professor sentiment and rating trends.

use std::io::{self, Write};

use console::style;
use serde_json::json;
use tracing::{Instrument, info_span};

use profchat_observe::attrs;
use profchat_types::analytics::ProfessorInsights;

use crate::state::AppState;

/// Run both lookups for `name` and print them.
///
/// Fails only on a blank name or when both lookups failed.
pub async fn show_insights(state: &AppState, name: &str, json: bool) -> anyhow::Result<()> {
    let spinner = (!json).then(|| {
        let spinner = indicatif::ProgressBar::new_spinner();
        spinner.set_message(format!("Looking up {name}..."));
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        spinner
    });

    let result = state
        .analytics
        .lookup(name)
        .instrument(info_span!(attrs::SPAN_INSIGHTS))
        .await;

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let insights = result?;

    let mut stdout = io::stdout().lock();
    if json {
        writeln!(stdout, "{}", serde_json::to_string_pretty(&insights_json(&insights))?)?;
    } else {
        write_insights(&mut stdout, &insights)?;
    }

    if !insights.has_any() {
        anyhow::bail!("no analytics available for '{}'", insights.name);
    }
    Ok(())
}

/// Write the human-readable report.
pub fn write_insights(out: &mut impl Write, insights: &ProfessorInsights) -> io::Result<()> {
    let name = &insights.name;

    writeln!(out)?;
    match &insights.sentiment {
        Ok(scores) => {
            writeln!(out, "  {}", style(format!("Sentiment Analysis for {name}:")).bold())?;
            writeln!(out, "    Positive: {}", scores.positive)?;
            writeln!(out, "    Neutral: {}", scores.neutral)?;
            writeln!(out, "    Negative: {}", scores.negative)?;
            writeln!(out, "    Compound: {}", scores.compound)?;
        }
        Err(e) => writeln!(
            out,
            "  {} Sentiment unavailable for {name}: {e}",
            style("!").yellow().bold()
        )?,
    }
    writeln!(out)?;
    match &insights.trends {
        Ok(trends) => {
            writeln!(out, "  {}", style(format!("Trends for {name}:")).bold())?;
            writeln!(out, "    Average Rating: {}", trends.average_rating)?;
            writeln!(out, "    Number of Reviews: {}", trends.review_count)?;
        }
        Err(e) => writeln!(
            out,
            "  {} Trends unavailable for {name}: {e}",
            style("!").yellow().bold()
        )?,
    }
    writeln!(out)
}

/// JSON form: each lookup is either its data or `{"error": "..."}`.
pub fn insights_json(insights: &ProfessorInsights) -> serde_json::Value {
    let sentiment = match &insights.sentiment {
        Ok(scores) => json!(scores),
        Err(e) => json!({ "error": e.to_string() }),
    };
    let trends = match &insights.trends {
        Ok(trends) => json!(trends),
        Err(e) => json!({ "error": e.to_string() }),
    };
    json!({
        "name": insights.name,
        "sentiment": sentiment,
        "trends": trends,
    })
}
