use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use planner_core::db::open_db_in_memory;
use planner_core::{
    ChangeKind, ChangeListener, Event, EventDraft, EventId, EventRepository, EventStore,
    EventValidationError, ListenerError, RepoError, RepoResult, ReminderError, ReminderRequest,
    ReminderScheduler, SqliteEventRepository, StoreError,
};
use std::sync::{Arc, Mutex};

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 9, hour, minute, 0).unwrap()
}

fn draft(title: &str, start_hour: u32, end_hour: u32) -> EventDraft {
    EventDraft::new(title, "office", at(start_hour, 0), at(end_hour, 0))
}

#[derive(Default)]
struct RecordingListener {
    calls: Mutex<Vec<(ChangeKind, Vec<EventId>)>>,
}

impl RecordingListener {
    fn calls(&self) -> Vec<(ChangeKind, Vec<EventId>)> {
        self.calls.lock().unwrap().clone()
    }

    fn kinds(&self) -> Vec<ChangeKind> {
        self.calls().into_iter().map(|(kind, _)| kind).collect()
    }
}

impl ChangeListener for RecordingListener {
    fn on_change(&self, change: ChangeKind, events: &[Event]) -> Result<(), ListenerError> {
        let ids = events.iter().map(|event| event.id).collect();
        self.calls.lock().unwrap().push((change, ids));
        Ok(())
    }
}

struct FailingListener;

impl ChangeListener for FailingListener {
    fn on_change(&self, _change: ChangeKind, _events: &[Event]) -> Result<(), ListenerError> {
        Err(ListenerError::new("view detached"))
    }
}

struct PanickingListener;

impl ChangeListener for PanickingListener {
    fn on_change(&self, _change: ChangeKind, _events: &[Event]) -> Result<(), ListenerError> {
        panic!("listener blew up");
    }
}

/// Repository whose writes always fail.
struct BrokenRepository;

impl EventRepository for BrokenRepository {
    fn create_event(&self, event: &Event) -> RepoResult<EventId> {
        Err(RepoError::InvalidData(format!("disk full for {}", event.id)))
    }

    fn get_event(&self, _id: EventId) -> RepoResult<Option<Event>> {
        Ok(None)
    }

    fn update_event(&self, event: &Event) -> RepoResult<()> {
        Err(RepoError::NotFound(event.id))
    }

    fn delete_event(&self, id: EventId) -> RepoResult<()> {
        Err(RepoError::NotFound(id))
    }

    fn list_events(&self) -> RepoResult<Vec<Event>> {
        Ok(Vec::new())
    }
}

#[derive(Default)]
struct RecordingScheduler {
    requests: Mutex<Vec<ReminderRequest>>,
}

impl ReminderScheduler for RecordingScheduler {
    fn schedule(&self, request: &ReminderRequest) -> Result<(), ReminderError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(())
    }
}

struct RefusingScheduler;

impl ReminderScheduler for RefusingScheduler {
    fn schedule(&self, _request: &ReminderRequest) -> Result<(), ReminderError> {
        Err(ReminderError::new("permission denied"))
    }
}

#[test]
fn create_appends_persists_and_broadcasts_add() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::new(&conn);
    let mut store = EventStore::new(&repo);
    let listener = Arc::new(RecordingListener::default());
    store.subscribe(listener.clone());

    let committed = store.create(draft("standup", 9, 10)).unwrap();
    assert!(committed.is_durable());
    let event = committed.into_value();

    assert_eq!(store.len(), 1);
    assert_eq!(store.get(event.id), Some(event.clone()));
    assert_eq!(repo.get_event(event.id).unwrap(), Some(event.clone()));
    assert_eq!(
        listener.calls(),
        vec![
            (ChangeKind::Update, vec![]),
            (ChangeKind::Add, vec![event.id]),
        ]
    );
}

#[test]
fn subscribe_replays_current_set() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::new(&conn);
    let mut store = EventStore::new(&repo);
    let first = store.create(draft("first", 9, 10)).unwrap().into_value();
    let second = store.create(draft("second", 11, 12)).unwrap().into_value();

    let listener = Arc::new(RecordingListener::default());
    store.subscribe(listener.clone());

    assert_eq!(
        listener.calls(),
        vec![(ChangeKind::Update, vec![first.id, second.id])]
    );
}

#[test]
fn invalid_create_changes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::new(&conn);
    let mut store = EventStore::new(&repo);
    let listener = Arc::new(RecordingListener::default());
    store.subscribe(listener.clone());

    let err = store.create(draft("backwards", 10, 9)).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(EventValidationError::InvalidTimeWindow { .. })
    ));

    let err = store.create(draft("   ", 9, 10)).unwrap_err();
    assert_eq!(err, StoreError::Validation(EventValidationError::EmptyTitle));

    assert!(store.is_empty());
    assert!(repo.list_events().unwrap().is_empty());
    assert_eq!(listener.kinds(), vec![ChangeKind::Update]);
}

#[test]
fn update_keeps_identity_and_broadcasts_update() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::new(&conn);
    let mut store = EventStore::new(&repo);
    let event = store.create(draft("review", 9, 10)).unwrap().into_value();
    let listener = Arc::new(RecordingListener::default());
    store.subscribe(listener.clone());

    let mut edit = event.to_draft();
    edit.title = "code review".to_string();
    edit.end_time = at(10, 30);
    let updated = store.update(event.id, edit).unwrap().into_value();

    assert_eq!(updated.id, event.id);
    assert_eq!(updated.duration(), Duration::minutes(90));
    assert_eq!(repo.get_event(event.id).unwrap(), Some(updated));
    assert_eq!(listener.kinds(), vec![ChangeKind::Update, ChangeKind::Update]);
}

#[test]
fn update_unknown_id_is_not_found_and_silent() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::new(&conn);
    let mut store = EventStore::new(&repo);
    let listener = Arc::new(RecordingListener::default());
    store.subscribe(listener.clone());

    let ghost = Event::new(draft("ghost", 9, 10)).unwrap();
    let err = store.update(ghost.id, ghost.to_draft()).unwrap_err();

    assert_eq!(err, StoreError::NotFound(ghost.id));
    assert_eq!(listener.calls().len(), 1);
}

#[test]
fn delete_removes_event_and_absent_delete_is_noop() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::new(&conn);
    let mut store = EventStore::new(&repo);
    let keep = store.create(draft("keep", 9, 10)).unwrap().into_value();
    let doomed = store.create(draft("drop", 11, 12)).unwrap().into_value();
    let listener = Arc::new(RecordingListener::default());
    store.subscribe(listener.clone());

    let removed = store.delete(doomed.id);
    assert!(removed.is_durable());
    assert_eq!(removed.into_value(), Some(doomed.clone()));
    assert!(repo.get_event(doomed.id).unwrap().is_none());

    let again = store.delete(doomed.id);
    assert_eq!(again.into_value(), None);

    assert_eq!(store.all(), vec![keep.clone()]);
    assert_eq!(
        listener.calls(),
        vec![
            (ChangeKind::Update, vec![keep.id, doomed.id]),
            (ChangeKind::Remove, vec![keep.id]),
        ]
    );
}

#[test]
fn unsubscribe_stops_delivery_and_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::new(&conn);
    let mut store = EventStore::new(&repo);
    let listener = Arc::new(RecordingListener::default());
    let subscription = store.subscribe(listener.clone());

    assert!(store.unsubscribe(subscription));
    assert!(!store.unsubscribe(subscription));
    assert_eq!(store.listener_count(), 0);

    let _ = store.create(draft("unseen", 9, 10)).unwrap();
    assert_eq!(listener.calls().len(), 1);
}

#[test]
fn failing_listeners_do_not_block_later_ones() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::new(&conn);
    let mut store = EventStore::new(&repo);
    store.subscribe(Arc::new(FailingListener));
    store.subscribe(Arc::new(PanickingListener));
    let healthy = Arc::new(RecordingListener::default());
    store.subscribe(healthy.clone());

    let event = store.create(draft("resilient", 9, 10)).unwrap().into_value();

    assert_eq!(store.len(), 1);
    assert_eq!(store.listener_count(), 3);
    assert_eq!(
        healthy.calls(),
        vec![
            (ChangeKind::Update, vec![]),
            (ChangeKind::Add, vec![event.id]),
        ]
    );
}

#[test]
fn persistence_failure_keeps_in_memory_change() {
    let mut store = EventStore::new(BrokenRepository);
    let listener = Arc::new(RecordingListener::default());
    store.subscribe(listener.clone());

    let committed = store.create(draft("offline", 9, 10)).unwrap();
    assert!(!committed.is_durable());
    assert!(matches!(
        committed.persist_error,
        Some(RepoError::InvalidData(_))
    ));
    let event = committed.into_value();

    let completed = store.set_completed(event.id, true).unwrap();
    assert!(!completed.is_durable());
    assert!(store.get(event.id).unwrap().completed);

    let removed = store.delete(event.id);
    assert!(!removed.is_durable());
    assert!(store.is_empty());
    assert_eq!(
        listener.kinds(),
        vec![
            ChangeKind::Update,
            ChangeKind::Add,
            ChangeKind::Update,
            ChangeKind::Remove,
        ]
    );
}

#[test]
fn load_hydrates_from_repository() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::new(&conn);
    let late = Event::new(draft("late", 15, 16)).unwrap();
    let early = Event::new(draft("early", 8, 9)).unwrap();
    repo.create_event(&late).unwrap();
    repo.create_event(&early).unwrap();

    let store = EventStore::load(&repo).unwrap();
    assert_eq!(store.all(), vec![early, late]);
}

#[test]
fn reminders_follow_notification_flag() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::new(&conn);
    let scheduler = Arc::new(RecordingScheduler::default());
    let mut store = EventStore::new(&repo).with_reminders(scheduler.clone());

    let _ = store.create(draft("quiet", 8, 9)).unwrap();

    let mut loud = draft("dentist", 14, 15);
    loud.notification_enabled = true;
    loud.notification_lead_time = Duration::minutes(30);
    let event = store.create(loud).unwrap().into_value();
    let _ = store.set_completed(event.id, true).unwrap();

    let requests = scheduler.requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].event_id, event.id);
    assert_eq!(requests[0].fire_at, at(13, 30));
    assert_eq!(
        requests[0].body,
        "Your event 'dentist' is starting soon! 30 minutes left"
    );
}

#[test]
fn reminder_failure_does_not_fail_the_mutation() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::new(&conn);
    let mut store = EventStore::new(&repo).with_reminders(Arc::new(RefusingScheduler));

    let mut loud = draft("call", 9, 10);
    loud.notification_enabled = true;
    let committed = store.create(loud).unwrap();

    assert!(committed.is_durable());
    assert_eq!(store.len(), 1);
}

#[test]
fn commit_reschedule_moves_only_the_interval() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::new(&conn);
    let mut store = EventStore::new(&repo);
    let event = store.create(draft("gym", 18, 19)).unwrap().into_value();

    let mut moved = event.clone();
    moved.title = "ignored".to_string();
    moved.start_time = at(7, 0);
    moved.end_time = Some(at(8, 0));
    let committed = store.commit_reschedule(&moved).unwrap().into_value();

    assert_eq!(committed.title, "gym");
    assert_eq!(committed.start_time, at(7, 0));
    assert_eq!(committed.date, NaiveDate::from_ymd_opt(2026, 3, 9).unwrap());
    assert_eq!(repo.get_event(event.id).unwrap(), Some(committed));
}
