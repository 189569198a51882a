use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing::warn;

use crate::{
    tracker::entities::{EffortLevel, ImprovementKind, RecordPatch, UserData},
    utils::{clock::Clock, time::date_key},
};

use super::{parse_date_arg, Args, DateStyle};

#[derive(Debug, Parser)]
pub struct LogCommand {
    #[arg(help = "Identifier of the area, see `list`")]
    id: String,
    #[arg(
        long,
        help = "Day to record for. Examples are \"today\", \"yesterday\", \"15/03/2025\". Defaults to today"
    )]
    date: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
    #[arg(long, help = "Whether the area was attempted that day")]
    attempted: Option<bool>,
    #[arg(long, help = "Effort self-rating from 0 to 5")]
    effort: Option<EffortLevel>,
    #[arg(long, help = "Free-text initiative taken that day")]
    initiative: Option<String>,
    #[arg(long, help = "Free-text note for a preservation area")]
    content: Option<String>,
}

/// Builds a record patch matching the targeted area's kind and merges it into the day's entry.
/// Returns the new snapshot to persist, or [None] when there is nothing to save.
pub fn process_log_command(
    LogCommand {
        id,
        date,
        date_style,
        attempted,
        effort,
        initiative,
        content,
    }: LogCommand,
    data: &UserData,
    clock: &impl Clock,
) -> Result<Option<UserData>> {
    let Some(improvement) = data.improvements.iter().find(|v| v.id == id) else {
        warn!("Attempt to log against unknown area {id}");
        println!("No area with id {id}");
        return Ok(None);
    };

    let patch = match improvement.kind {
        ImprovementKind::Improvement => {
            if content.is_some() {
                return Err(validation_error(
                    "--content only applies to preservation areas",
                ));
            }
            if attempted.is_none() && effort.is_none() && initiative.is_none() {
                return Err(validation_error(
                    "Nothing to record. Pass --attempted, --effort or --initiative",
                ));
            }
            RecordPatch::Improvement {
                attempted,
                effort_level: effort,
                initiative,
            }
        }
        ImprovementKind::Preservation => {
            if attempted.is_some() || effort.is_some() || initiative.is_some() {
                return Err(validation_error(
                    "--attempted, --effort and --initiative only apply to improvement areas",
                ));
            }
            let Some(content) = content else {
                return Err(validation_error("Nothing to record. Pass --content"));
            };
            RecordPatch::Preservation {
                content: Some(content),
            }
        }
    };

    let date = parse_date_arg(date.as_deref(), date_style)?;
    let next = data.upsert_daily_record(date, &id, patch, clock);
    println!("Recorded {} for \"{}\"", date_key(date), improvement.text);
    Ok(Some(next))
}

fn validation_error(message: &str) -> anyhow::Error {
    Args::command()
        .error(clap::error::ErrorKind::ValueValidation, message)
        .into()
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{NaiveDate, TimeZone, Utc};

    use crate::{
        cli::DateStyle,
        tracker::{
            entities::{ImprovementKind, Source, UserData},
            mutation::ImprovementDraft,
        },
        utils::clock::MockClock,
    };

    use super::{process_log_command, LogCommand};

    fn fixed_clock() -> MockClock {
        let mut clock = MockClock::new();
        clock
            .expect_now()
            .return_const(Utc.with_ymd_and_hms(2025, 3, 16, 8, 0, 0).unwrap());
        clock
    }

    fn data_with_area(kind: ImprovementKind) -> UserData {
        UserData::new("u1").add_improvement(
            ImprovementDraft {
                text: "stay calm".to_string(),
                kind,
                source: Source::Team,
            },
            &fixed_clock(),
        )
    }

    fn command(id: &str) -> LogCommand {
        LogCommand {
            id: id.to_string(),
            date: Some("15/03/2025".to_string()),
            date_style: DateStyle::Uk,
            attempted: None,
            effort: None,
            initiative: None,
            content: None,
        }
    }

    #[test]
    fn logs_an_attempt_for_an_improvement_area() -> Result<()> {
        let data = data_with_area(ImprovementKind::Improvement);
        let id = data.improvements[0].id.clone();
        let command = LogCommand {
            attempted: Some(true),
            ..command(&id)
        };

        let next = process_log_command(command, &data, &fixed_clock())?.unwrap();

        let entry = &next.daily_entries[0];
        assert_eq!(entry.date, NaiveDate::from_ymd_opt(2025, 3, 15).unwrap());
        assert_eq!(entry.improvements[&id].attempted, Some(true));
        Ok(())
    }

    #[test]
    fn rejects_content_for_an_improvement_area() {
        let data = data_with_area(ImprovementKind::Improvement);
        let id = data.improvements[0].id.clone();
        let command = LogCommand {
            content: Some("note".to_string()),
            ..command(&id)
        };

        assert!(process_log_command(command, &data, &fixed_clock()).is_err());
    }

    #[test]
    fn rejects_attempt_flags_for_a_preservation_area() {
        let data = data_with_area(ImprovementKind::Preservation);
        let id = data.improvements[0].id.clone();
        let command = LogCommand {
            attempted: Some(true),
            ..command(&id)
        };

        assert!(process_log_command(command, &data, &fixed_clock()).is_err());
    }

    #[test]
    fn requires_at_least_one_field() {
        let data = data_with_area(ImprovementKind::Improvement);
        let id = data.improvements[0].id.clone();

        assert!(process_log_command(command(&id), &data, &fixed_clock()).is_err());
    }

    #[test]
    fn unknown_area_saves_nothing() -> Result<()> {
        let data = data_with_area(ImprovementKind::Improvement);
        let command = LogCommand {
            attempted: Some(true),
            ..command("missing")
        };

        assert_eq!(process_log_command(command, &data, &fixed_clock())?, None);
        Ok(())
    }
}
