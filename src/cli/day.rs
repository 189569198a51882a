use ansi_term::{Colour, Style};
use anyhow::Result;
use clap::Parser;

use crate::{
    tracker::{
        aggregation::day_progress,
        entities::{DayRecord, Improvement, ImprovementKind, UserData, MAX_EFFORT_LEVEL},
    },
    utils::time::date_key,
};

use super::{parse_date_arg, DateStyle};

#[derive(Debug, Parser)]
pub struct DayCommand {
    #[arg(help = "Day to show. Defaults to today")]
    date: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
}

pub fn process_day_command(
    DayCommand { date, date_style }: DayCommand,
    data: &UserData,
) -> Result<()> {
    let date = parse_date_arg(date.as_deref(), date_style)?;
    let entry = data.daily_entries.iter().find(|v| v.date == date);

    println!("{}", Style::new().bold().paint(date_key(date)));
    if data.improvements.is_empty() {
        println!("No areas tracked yet. Add one with `daybetter add`");
        return Ok(());
    }

    for improvement in &data.improvements {
        let record = entry.and_then(|v| v.improvements.get(&improvement.id));
        println!("{}", render_area_line(improvement, record));
    }

    println!();
    match entry {
        Some(entry) => {
            let total = data
                .improvements
                .iter()
                .filter(|v| v.kind == ImprovementKind::Improvement)
                .count();
            let progress = day_progress(entry, total);
            println!(
                "{}/{} attempted\t{}%\taverage effort {:.1}/{MAX_EFFORT_LEVEL}",
                progress.attempted,
                total,
                *progress.percentage as i32,
                progress.avg_effort
            );
        }
        None => println!("No records for this day yet"),
    }
    Ok(())
}

fn render_area_line(improvement: &Improvement, record: Option<&DayRecord>) -> String {
    match improvement.kind {
        ImprovementKind::Improvement => {
            let mark = if record.and_then(|v| v.attempted).unwrap_or(false) {
                Colour::Green.paint("✓")
            } else {
                Colour::Red.paint("✗")
            };
            let effort = record
                .and_then(|v| v.effort_level)
                .map(|v| *v)
                .unwrap_or(0);
            let initiative = record
                .and_then(|v| v.initiative.as_deref())
                .unwrap_or("-");
            format!(
                "{mark}\t{}\t{}\t{}\t{initiative}",
                effort_stars(effort),
                improvement.text,
                improvement.source
            )
        }
        ImprovementKind::Preservation => {
            let content = record.and_then(|v| v.content.as_deref()).unwrap_or("-");
            format!(
                "{}\t{}\t{}\t{content}",
                Colour::Cyan.paint("◆"),
                improvement.text,
                improvement.source
            )
        }
    }
}

pub fn effort_stars(level: u8) -> String {
    let filled = "★".repeat(level as usize);
    let empty = "☆".repeat((MAX_EFFORT_LEVEL - level) as usize);
    format!("{}{empty}", Colour::Yellow.paint(filled))
}
