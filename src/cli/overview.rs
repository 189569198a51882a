use ansi_term::Style;
use anyhow::Result;

use crate::{
    tracker::{
        aggregation::rolling_overview,
        entities::{ImprovementKind, UserData, MAX_EFFORT_LEVEL},
    },
    utils::time::date_key,
};

pub fn process_overview_command(days: usize, data: &UserData) -> Result<()> {
    if data.daily_entries.is_empty() {
        println!("No daily records yet. Record one with `daybetter log`");
        return Ok(());
    }

    let total = data
        .improvements
        .iter()
        .filter(|v| v.kind == ImprovementKind::Improvement)
        .count();
    let overview = rolling_overview(&data.daily_entries, total, days);

    for day in &overview.days {
        println!(
            "{}\t{}%\t{}/{} attempted\t{}",
            date_key(day.date),
            *day.progress.percentage as i32,
            day.progress.attempted,
            total,
            format_effort(day.progress.avg_effort)
        );
    }

    println!();
    println!(
        "{} {}% progress, {:.1}/{MAX_EFFORT_LEVEL} effort over the last {} days",
        Style::new().bold().paint("Overall:"),
        *overview.overall_progress as i32,
        overview.overall_effort,
        overview.days.len()
    );
    Ok(())
}

fn format_effort(avg_effort: f64) -> String {
    if avg_effort > 0. {
        format!("effort {avg_effort:.1}/{MAX_EFFORT_LEVEL}")
    } else {
        "no effort recorded".to_string()
    }
}
