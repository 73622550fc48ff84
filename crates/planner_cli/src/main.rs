//! `planner` CLI: manage a day plan stored in SQLite.
//!
//! # Responsibility
//! - Wire config, logging, storage and the event store together.
//! - Expose create/list/move/complete/delete plus progress and week views.
//!
//! ```sh
//! planner add --title "Standup" --location "Room 4" --date 2026-03-09 --start 09:00 --end 09:15
//! planner list --date 2026-03-09
//! planner move --date 2026-03-09 --from 2 --to 0
//! planner progress --date 2026-03-09
//! ```
//!
//! Times are read and printed in UTC.

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use clap::{Parser, Subcommand};
use log::info;
use planner_core::db::open_db;
use planner_core::view::calendar::{shift_week, week_days};
use planner_core::{
    day_view, init_logging, Category, Committed, DayFilter, DayProgress, DragSession, Event,
    EventDraft, EventId, EventStore, PlannerConfig, ReminderError, ReminderRequest,
    ReminderScheduler, SqliteEventRepository,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "planner", version, about = "Day planner with drag-style rescheduling")]
struct Cli {
    /// TOML config file (defaults apply when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an event
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        location: String,
        /// Day in YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,
        /// Start time in HH:MM
        #[arg(long)]
        start: String,
        /// End time in HH:MM
        #[arg(long)]
        end: String,
        #[arg(long)]
        urgent: bool,
        /// Request a reminder before the start
        #[arg(long)]
        notify: bool,
        /// Reminder lead time; the config default applies when omitted
        #[arg(long, requires = "notify")]
        lead_minutes: Option<i64>,
    },
    /// Show one day ordered by start time
    List {
        #[arg(long)]
        date: NaiveDate,
        /// Case-insensitive title filter
        #[arg(long)]
        query: Option<String>,
        /// urgent or not_urgent; narrows the --query matches
        #[arg(long, requires = "query")]
        category: Option<String>,
    },
    /// Move the event at position FROM of a day view to position TO
    Move {
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        from: usize,
        #[arg(long)]
        to: usize,
    },
    /// Mark an event completed
    Complete {
        id: EventId,
        /// Mark it not completed instead
        #[arg(long)]
        undo: bool,
    },
    /// Delete an event
    Delete { id: EventId },
    /// Completion and planned-time summary for one day
    Progress {
        #[arg(long)]
        date: NaiveDate,
    },
    /// Event counts for the week containing DATE
    Week {
        #[arg(long)]
        date: NaiveDate,
        /// Whole weeks to move forward (negative goes back)
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        shift: i64,
    },
}

/// Reminder delivery for a terminal session: the request is printed.
struct StdoutReminders;

impl ReminderScheduler for StdoutReminders {
    fn schedule(&self, request: &ReminderRequest) -> Result<(), ReminderError> {
        println!(
            "reminder {} at {}: {}",
            request.identifier(),
            request.fire_at.format("%Y-%m-%d %H:%M"),
            request.body
        );
        Ok(())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => PlannerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PlannerConfig::default(),
    };
    if let Some(dir) = &config.log_dir {
        init_logging(&config.log_level, dir).context("starting logger")?;
    }

    let conn = open_db(&config.database_path)
        .with_context(|| format!("opening {}", config.database_path.display()))?;
    let repo = SqliteEventRepository::new(&conn);
    let mut store = EventStore::load(repo)
        .context("loading events")?
        .with_reminders(Arc::new(StdoutReminders));
    info!(
        "event=cli_start module=cli status=ok events={} db={}",
        store.len(),
        config.database_path.display()
    );

    run(cli.command, &config, &mut store)
}

fn run(
    command: Commands,
    config: &PlannerConfig,
    store: &mut EventStore<SqliteEventRepository<'_>>,
) -> Result<()> {
    match command {
        Commands::Add {
            title,
            location,
            date,
            start,
            end,
            urgent,
            notify,
            lead_minutes,
        } => {
            let mut draft = EventDraft::new(
                title,
                location,
                at(date, &start)?,
                at(date, &end)?,
            );
            if urgent {
                draft.category = Category::Urgent;
            }
            draft.notification_enabled = notify;
            draft.notification_lead_time = lead_minutes
                .map(Duration::minutes)
                .unwrap_or_else(|| config.default_lead_time());

            let committed = store.create(draft)?;
            warn_if_volatile(&committed);
            println!("created {}", committed.value.id);
        }
        Commands::List {
            date,
            query,
            category,
        } => {
            let mut filter = DayFilter::new(date);
            if let Some(query) = query {
                filter = filter.with_title_query(query);
            }
            if let Some(category) = category {
                let category = Category::parse(&category)
                    .ok_or_else(|| anyhow!("unknown category `{category}`"))?;
                filter = filter.with_category(category);
            }
            let view = day_view(&store.all(), &filter);
            if view.is_empty() {
                println!("no events on {date}");
            }
            for (index, event) in view.iter().enumerate() {
                println!("{}", format_row(index, event));
            }
        }
        Commands::Move { date, from, to } => {
            let filter = DayFilter::new(date);
            let mut session = DragSession::new();
            session.begin(&store.day_view(&filter), from)?;
            session.hover(to)?;
            match session.finish(store, &filter)? {
                Some(committed) => {
                    warn_if_volatile(&committed);
                    println!(
                        "moved {} to {}",
                        committed.value.id,
                        format_window(&committed.value)
                    );
                }
                None => println!("nothing to move"),
            }
        }
        Commands::Complete { id, undo } => {
            let committed = store.set_completed(id, !undo)?;
            warn_if_volatile(&committed);
            let state = if committed.value.completed {
                "completed"
            } else {
                "open"
            };
            println!("{id} {state}");
        }
        Commands::Delete { id } => {
            let committed = store.delete(id);
            warn_if_volatile(&committed);
            match committed.value {
                Some(_) => println!("deleted {id}"),
                None => bail!("event not found: {id}"),
            }
        }
        Commands::Progress { date } => {
            let progress = DayProgress::from_events(&store.day_view(&DayFilter::new(date)));
            let (hours, minutes) = progress.planned_hours_minutes();
            println!(
                "completed {}/{} ({}%)",
                progress.completed,
                progress.total,
                progress.completion_percent()
            );
            println!("urgent {} not_urgent {}", progress.urgent, progress.not_urgent);
            println!("planned {hours}h {minutes}m");
        }
        Commands::Week { date, shift } => {
            for day in week_days(shift_week(date, shift)) {
                let count = store.day_view(&DayFilter::new(day)).len();
                println!("{} {day} {count}", day.format("%a"));
            }
        }
    }
    Ok(())
}

fn at(date: NaiveDate, time: &str) -> Result<DateTime<Utc>> {
    let time = NaiveTime::parse_from_str(time, "%H:%M")
        .with_context(|| format!("invalid time `{time}`, expected HH:MM"))?;
    Ok(date.and_time(time).and_utc())
}

fn format_window(event: &Event) -> String {
    match event.end_time {
        Some(end) => format!(
            "{}-{}",
            event.start_time.format("%H:%M"),
            end.format("%H:%M")
        ),
        None => event.start_time.format("%H:%M").to_string(),
    }
}

fn format_row(index: usize, event: &Event) -> String {
    let done = if event.completed { "x" } else { " " };
    format!(
        "{index} [{done}] {} {} @ {} ({}) {}",
        format_window(event),
        event.title,
        event.location,
        event.category.as_str(),
        event.id
    )
}

fn warn_if_volatile<T>(committed: &Committed<T>) {
    if let Some(err) = &committed.persist_error {
        eprintln!("warning: change kept in memory only: {err}");
    }
}
