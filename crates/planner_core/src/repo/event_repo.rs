//! Event repository contract and SQLite implementation.
//!
//! # Invariants
//! - Write paths call `Event::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::event::{Category, Event, EventId, EventValidationError};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const EVENT_SELECT_SQL: &str = "SELECT
    id,
    title,
    location,
    event_date,
    start_ms,
    end_ms,
    category,
    notification_enabled,
    notification_lead_secs,
    completed
FROM events";

const DATE_FORMAT: &str = "%Y-%m-%d";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for event persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(EventValidationError),
    Db(DbError),
    NotFound(EventId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "event not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted event data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<EventValidationError> for RepoError {
    fn from(value: EventValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence collaborator used by the event store.
///
/// The store only needs these five operations and never depends on the
/// storage technology behind them.
pub trait EventRepository {
    fn create_event(&self, event: &Event) -> RepoResult<EventId>;
    fn get_event(&self, id: EventId) -> RepoResult<Option<Event>>;
    fn update_event(&self, event: &Event) -> RepoResult<()>;
    fn delete_event(&self, id: EventId) -> RepoResult<()>;
    /// Bulk fetch of every persisted event, ordered by day then start.
    fn list_events(&self) -> RepoResult<Vec<Event>>;
}

impl<R: EventRepository + ?Sized> EventRepository for &R {
    fn create_event(&self, event: &Event) -> RepoResult<EventId> {
        (**self).create_event(event)
    }

    fn get_event(&self, id: EventId) -> RepoResult<Option<Event>> {
        (**self).get_event(id)
    }

    fn update_event(&self, event: &Event) -> RepoResult<()> {
        (**self).update_event(event)
    }

    fn delete_event(&self, id: EventId) -> RepoResult<()> {
        (**self).delete_event(id)
    }

    fn list_events(&self) -> RepoResult<Vec<Event>> {
        (**self).list_events()
    }
}

/// SQLite-backed event repository.
pub struct SqliteEventRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEventRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl EventRepository for SqliteEventRepository<'_> {
    fn create_event(&self, event: &Event) -> RepoResult<EventId> {
        event.validate()?;

        self.conn.execute(
            "INSERT INTO events (
                id,
                title,
                location,
                event_date,
                start_ms,
                end_ms,
                category,
                notification_enabled,
                notification_lead_secs,
                completed
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                event.id.to_string(),
                event.title.as_str(),
                event.location.as_str(),
                event.date.format(DATE_FORMAT).to_string(),
                event.start_time.timestamp_millis(),
                event.end_time.map(|end| end.timestamp_millis()),
                event.category.as_str(),
                bool_to_int(event.notification_enabled),
                event.notification_lead_time.num_seconds(),
                bool_to_int(event.completed),
            ],
        )?;

        Ok(event.id)
    }

    fn get_event(&self, id: EventId) -> RepoResult<Option<Event>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EVENT_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query(params![id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_event_row(row)?));
        }

        Ok(None)
    }

    fn update_event(&self, event: &Event) -> RepoResult<()> {
        event.validate()?;

        let changed = self.conn.execute(
            "UPDATE events
             SET
                title = ?1,
                location = ?2,
                event_date = ?3,
                start_ms = ?4,
                end_ms = ?5,
                category = ?6,
                notification_enabled = ?7,
                notification_lead_secs = ?8,
                completed = ?9,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?10;",
            params![
                event.title.as_str(),
                event.location.as_str(),
                event.date.format(DATE_FORMAT).to_string(),
                event.start_time.timestamp_millis(),
                event.end_time.map(|end| end.timestamp_millis()),
                event.category.as_str(),
                bool_to_int(event.notification_enabled),
                event.notification_lead_time.num_seconds(),
                bool_to_int(event.completed),
                event.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(event.id));
        }

        Ok(())
    }

    fn delete_event(&self, id: EventId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM events WHERE id = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn list_events(&self) -> RepoResult<Vec<Event>> {
        let mut stmt = self.conn.prepare(&format!(
            "{EVENT_SELECT_SQL} ORDER BY event_date ASC, start_ms ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut events = Vec::new();

        while let Some(row) = rows.next()? {
            events.push(parse_event_row(row)?);
        }

        Ok(events)
    }
}

fn parse_event_row(row: &Row<'_>) -> RepoResult<Event> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in events.id"))
    })?;

    let date_text: String = row.get("event_date")?;
    let date = NaiveDate::parse_from_str(&date_text, DATE_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!("invalid date `{date_text}` in events.event_date"))
    })?;

    let start_time = millis_to_datetime(row.get("start_ms")?, "start_ms")?;
    let end_time = match row.get::<_, Option<i64>>("end_ms")? {
        Some(value) => Some(millis_to_datetime(value, "end_ms")?),
        None => None,
    };

    let category_text: String = row.get("category")?;
    let category = Category::parse(&category_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid category `{category_text}` in events.category"
        ))
    })?;

    let event = Event {
        id,
        title: row.get("title")?,
        location: row.get("location")?,
        date,
        start_time,
        end_time,
        category,
        notification_enabled: int_to_bool(row.get("notification_enabled")?, "notification_enabled")?,
        notification_lead_time: lead_secs_to_duration(row.get("notification_lead_secs")?)?,
        completed: int_to_bool(row.get("completed")?, "completed")?,
    };
    event.validate()?;
    Ok(event)
}

fn millis_to_datetime(value: i64, column: &str) -> RepoResult<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(value).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid timestamp `{value}` in events.{column}"))
    })
}

fn lead_secs_to_duration(value: i64) -> RepoResult<Duration> {
    Duration::try_seconds(value).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid lead time `{value}` in events.notification_lead_secs"
        ))
    })
}

fn int_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in events.{column}"
        ))),
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
