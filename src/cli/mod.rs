pub mod day;
pub mod log;
pub mod overview;
pub mod table;

use std::{env, fmt::Display, path::PathBuf};

use anyhow::Result;
use chrono::{Local, NaiveDate};
use chrono_english::parse_date_string;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use tracing::level_filters::LevelFilter;

use crate::{
    identity::{resolve_user_id, share_url, FileIdentityContext},
    storage::user_store::{JsonUserStore, UserStore},
    tracker::{
        aggregation::DEFAULT_OVERVIEW_WINDOW,
        entities::{ImprovementKind, Source},
        mutation::ImprovementDraft,
    },
    utils::{clock::DefaultClock, logging::enable_logging},
};

use self::{
    day::{process_day_command, DayCommand},
    log::{process_log_command, LogCommand},
    overview::process_overview_command,
    table::process_table_command,
};

#[derive(Parser, Debug)]
#[command(name = "Daybetter", version, long_about = None)]
#[command(about = "Command line tracker for daily self-improvement and preservation areas", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
    #[arg(long, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[arg(
        long,
        help = "User identifier to act as. Overrides the locally remembered one"
    )]
    user: Option<String>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Add a new improvement or preservation area")]
    Add {
        text: String,
        #[arg(long, value_enum, default_value_t = ImprovementKind::Improvement)]
        kind: ImprovementKind,
        #[arg(long, value_enum, default_value_t = Source::Commander, help = "Who raised the area")]
        source: Source,
    },
    #[command(about = "Change the description of an area")]
    Edit { id: String, text: String },
    #[command(about = "Delete an area together with its daily history")]
    Remove { id: String },
    #[command(about = "List tracked areas with their identifiers")]
    List,
    #[command(about = "Record what happened for an area on a given day")]
    Log {
        #[command(flatten)]
        command: LogCommand,
    },
    #[command(about = "Show one day's records and progress")]
    Day {
        #[command(flatten)]
        command: DayCommand,
    },
    #[command(about = "Show rolling progress over the most recent days")]
    Overview {
        #[arg(long, default_value_t = DEFAULT_OVERVIEW_WINDOW, help = "Window size in days")]
        days: usize,
    },
    #[command(about = "Show the full history tables")]
    Table {
        #[arg(long, value_enum, help = "Restrict output to one kind of area")]
        kind: Option<ImprovementKind>,
    },
    #[command(about = "Print a link that opens this data elsewhere")]
    Share {
        #[arg(
            long,
            default_value = "https://daybetter.app/",
            help = "Base address the link points at"
        )]
        base: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

/// Parses a human date argument ("yesterday", "15/03/2025", ...), defaulting to today.
pub fn parse_date_arg(value: Option<&str>, date_style: DateStyle) -> Result<NaiveDate> {
    let now = Local::now();
    match value {
        None => Ok(now.date_naive()),
        Some(s) => match parse_date_string(s, now, date_style.into()) {
            Ok(v) => Ok(v.date_naive()),
            Err(e) => Err(Args::command()
                .error(
                    clap::error::ErrorKind::ValueValidation,
                    format!("Failed to validate date {s}: {e}"),
                )
                .into()),
        },
    }
}

pub fn run_cli() -> Result<()> {
    let args = Args::parse();

    let dir = match &args.dir {
        Some(v) => {
            std::fs::create_dir_all(v)?;
            v.clone()
        }
        None => create_application_default_path()?,
    };

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(&dir, logging_level, args.log)?;

    let mut identity = FileIdentityContext::new(&dir, args.user.clone());
    let user_id = resolve_user_id(&mut identity)?;
    let store = JsonUserStore::new(&dir)?;
    let data = store.load(&user_id)?;
    let clock = DefaultClock;

    match args.command {
        Commands::Add { text, kind, source } => {
            if text.trim().is_empty() {
                return Err(Args::command()
                    .error(
                        clap::error::ErrorKind::ValueValidation,
                        "Area text can't be empty",
                    )
                    .into());
            }
            let next = data.add_improvement(
                ImprovementDraft {
                    text: text.clone(),
                    kind,
                    source,
                },
                &clock,
            );
            store.save(&next)?;
            println!("Added {kind} area \"{}\"", text.trim());
            Ok(())
        }
        Commands::Edit { id, text } => {
            if !data.improvements.iter().any(|v| v.id == id) {
                println!("No area with id {id}");
                return Ok(());
            }
            let next = data.edit_improvement_text(&id, &text);
            store.save(&next)?;
            println!("Updated area {id}");
            Ok(())
        }
        Commands::Remove { id } => {
            if !data.improvements.iter().any(|v| v.id == id) {
                println!("No area with id {id}");
                return Ok(());
            }
            let next = data.delete_improvement(&id);
            store.save(&next)?;
            println!("Removed area {id} and its daily history");
            Ok(())
        }
        Commands::List => {
            if data.improvements.is_empty() {
                println!("No areas tracked yet. Add one with `daybetter add`");
                return Ok(());
            }
            for improvement in &data.improvements {
                println!(
                    "{}\t{}\t{}\t{}",
                    improvement.id, improvement.kind, improvement.source, improvement.text
                );
            }
            Ok(())
        }
        Commands::Log { command } => {
            if let Some(next) = process_log_command(command, &data, &clock)? {
                store.save(&next)?;
            }
            Ok(())
        }
        Commands::Day { command } => process_day_command(command, &data),
        Commands::Overview { days } => process_overview_command(days, &data),
        Commands::Table { kind } => process_table_command(kind, &data),
        Commands::Share { base } => {
            println!("{}", share_url(&base, &user_id));
            Ok(())
        }
    }
}

pub fn create_application_default_path() -> Result<PathBuf> {
    let path = {
        #[cfg(windows)]
        {
            let mut path =
                PathBuf::from(env::var("APPDATA").expect("APPDATA should be present on Windows"));
            path.push("daybetter");
            path
        }
        #[cfg(not(windows))]
        {
            let mut path = env::var("XDG_STATE_HOME")
                .map(PathBuf::from)
                .or_else(|_| {
                    env::var("HOME").map(|home| {
                        let mut path = PathBuf::from(home);
                        path.push(".local/state");
                        path
                    })
                })
                .expect("Couldn't find neither XDG_STATE_HOME nor HOME");
            path.push("daybetter");
            path
        }
    };

    match std::fs::create_dir_all(&path) {
        Ok(_) => Ok(path),
        Err(v) if v.kind() == std::io::ErrorKind::AlreadyExists => Ok(path),
        Err(v) => Err(v.into()),
    }
}
