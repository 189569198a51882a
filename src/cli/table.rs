use ansi_term::Colour;
use anyhow::Result;

use crate::{
    tracker::{
        aggregation::table_projection,
        entities::{ImprovementKind, UserData},
    },
    utils::time::date_key,
};

use super::day::effort_stars;

pub fn process_table_command(kind: Option<ImprovementKind>, data: &UserData) -> Result<()> {
    let kinds = match kind {
        Some(v) => vec![v],
        None => vec![ImprovementKind::Improvement, ImprovementKind::Preservation],
    };
    for kind in kinds {
        print_kind_table(kind, data);
    }
    Ok(())
}

fn print_kind_table(kind: ImprovementKind, data: &UserData) {
    let rows = table_projection(&data.improvements, &data.daily_entries, kind);

    let heading = match kind {
        ImprovementKind::Improvement => Colour::Blue.bold().paint("Improvement areas"),
        ImprovementKind::Preservation => Colour::Green.bold().paint("Preservation areas"),
    };
    println!("{heading} ({} records)", rows.len());

    if rows.is_empty() {
        println!("Nothing recorded yet");
        println!();
        return;
    }

    for row in rows {
        match kind {
            ImprovementKind::Improvement => {
                let mark = if row.record.attempted.unwrap_or(false) {
                    Colour::Green.paint("✓")
                } else {
                    Colour::Red.paint("✗")
                };
                let effort = row.record.effort_level.map(|v| *v).unwrap_or(0);
                println!(
                    "{}\t{}\t{}\t{mark}\t{}\t{}",
                    date_key(row.date),
                    row.improvement.text,
                    row.improvement.source,
                    effort_stars(effort),
                    row.record.initiative.as_deref().unwrap_or("-")
                );
            }
            ImprovementKind::Preservation => {
                println!(
                    "{}\t{}\t{}\t{}",
                    date_key(row.date),
                    row.improvement.text,
                    row.improvement.source,
                    row.record.content.as_deref().unwrap_or("-")
                );
            }
        }
    }
    println!();
}
