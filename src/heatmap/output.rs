use crate::cli::CommonArgs;
use crate::error::Result;
use crate::model::{DayBucket, DayInsight, HeatmapOutput, PeriodBucket, SCHEMA_VERSION};
use chrono::Utc;
use console::style;
use std::collections::BTreeMap;

pub fn output_json(
    days: &BTreeMap<String, DayBucket>,
    insights: &BTreeMap<String, DayInsight>,
    series: &[PeriodBucket],
    common: &CommonArgs,
) -> Result<()> {
    let output = HeatmapOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        username: common.user.clone(),
        since: common.since.clone(),
        until: common.until.clone(),
        days: days.clone(),
        insights: insights.clone(),
        buckets: series.to_vec(),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// One line per day, counters and insight merged into a flat object.
pub fn output_ndjson(
    days: &BTreeMap<String, DayBucket>,
    insights: &BTreeMap<String, DayInsight>,
) -> Result<()> {
    for (date, day) in days {
        let mut line = serde_json::to_value(day)?;
        if let Some(obj) = line.as_object_mut() {
            obj.insert("date".to_string(), serde_json::Value::String(date.clone()));
            if let Some(insight) = insights.get(date) {
                obj.insert("insight".to_string(), serde_json::to_value(insight)?);
            }
        }
        println!("{}", serde_json::to_string(&line)?);
    }
    Ok(())
}

pub fn output_heatmap(
    series: &[PeriodBucket],
    days: &BTreeMap<String, DayBucket>,
    common: &CommonArgs,
) -> Result<()> {
    if series.is_empty() {
        println!("No data to display");
        return Ok(());
    }

    if let (Some(since), Some(until)) = (&common.since, &common.until) {
        println!("Filtering contributions from {} to {}", since, until);
    } else if let Some(since) = &common.since {
        println!("Filtering contributions since {}", since);
    } else if let Some(until) = &common.until {
        println!("Filtering contributions until {}", until);
    }

    let max_events = series.iter().map(|b| b.total_events).max().unwrap_or(1).max(1);
    let max_size = series.iter().map(|b| b.total_size).max().unwrap_or(1).max(1);

    println!("{} for {}", style("Contribution Heatmap").bold(), common.user);
    println!("{}", "─".repeat(60));

    for bucket in series {
        let event_intensity = ((bucket.total_events as f64 / max_events as f64) * 5.0) as u32;
        let size_intensity = ((bucket.total_size as f64 / max_size as f64) * 5.0) as u32;

        let event_char = match event_intensity {
            0 => " ",
            1 => "▁",
            2 => "▃",
            3 => "▅",
            4 => "▇",
            _ => "█",
        };

        let size_char = match size_intensity {
            0 => " ",
            1 => "░",
            2 => "▒",
            3 => "▓",
            4 => "█",
            _ => "█",
        };

        println!(
            "{}..{} {} {} events: {:>4}, lines: {:>7}",
            bucket.start,
            bucket.end,
            style(event_char).green(),
            style(size_char).blue(),
            bucket.total_events,
            bucket.total_size
        );
    }

    println!("\n{}", style("Legend").bold());
    println!("  {} event intensity", style("▁▃▅▇█").green());
    println!("  {} line-change intensity", style("░▒▓█").blue());

    let total_events: u64 = days.values().map(|d| d.total_events).sum();
    let active_days = days.len();
    println!(
        "\n{} events across {} active days",
        style(total_events).cyan(),
        style(active_days).cyan()
    );

    Ok(())
}
