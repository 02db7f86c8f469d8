use chrono::NaiveDate;
use daytrack::application::session::Session;
use daytrack::domain::{
    clock::ManualClock,
    error::{StoreError, TaskError},
    repository::TaskStore,
    task::{Department, TaskFilter, TaskId},
};
use daytrack::infrastructure::json_store::JsonFileStore;
use serde_json::json;

fn day(d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(2024, 3, d).unwrap() }

fn clock_on(d: u32) -> ManualClock { ManualClock::new(day(d).and_hms_opt(10, 5, 0).unwrap()) }

#[test]
fn acceptance_add_toggle_untoggle_delete() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    let mut session = Session::open(JsonFileStore::new(&path), clock_on(1)).unwrap();

    // add
    let task = session.add("Buy milk", Department::Home).unwrap().unwrap();
    assert_eq!(session.registry().len(), 1);
    assert!(!task.done);
    assert_eq!(task.time_done, None);
    assert_eq!(task.date, Some(day(1)));

    // done
    session.toggle_done(task.id, true).unwrap();
    let saved = JsonFileStore::new(&path).load().unwrap();
    assert!(saved.tasks[0].done);
    assert!(saved.tasks[0].time_done.is_some());

    // not done again
    session.toggle_done(task.id, false).unwrap();
    let saved = JsonFileStore::new(&path).load().unwrap();
    assert!(!saved.tasks[0].done);
    assert_eq!(saved.tasks[0].time_done, None);

    // blank add is refused
    assert!(session.add("   ", Department::Odoo).unwrap().is_none());
    assert_eq!(session.registry().len(), 1);

    // unknown delete is harmless, real delete is persisted
    assert!(!session.delete(TaskId(99)).unwrap());
    assert!(session.delete(task.id).unwrap());
    assert!(JsonFileStore::new(&path).load().unwrap().tasks.is_empty());
}

#[test]
fn acceptance_rollover_on_startup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    std::fs::write(
        &path,
        json!({
            "next_id": 2,
            "current_day": "2024-03-01",
            "tasks": [{ "id": 1, "title": "Stand-up", "done": true, "department": "Odoo", "time_done": "09:00:00" }]
        })
        .to_string(),
    )
    .unwrap();

    let session = Session::open(JsonFileStore::new(&path), clock_on(2)).unwrap();
    let task = &session.registry().tasks()[0];
    assert!(!task.done);
    assert_eq!(task.time_done, None);
    assert_eq!(session.registry().current_day(), Some(day(2)));

    let saved = JsonFileStore::new(&path).load().unwrap();
    assert_eq!(saved.current_day, Some(day(2)));
    assert!(!saved.tasks[0].done);
}

#[test]
fn acceptance_legacy_file_keeps_done_on_first_start() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    std::fs::write(
        &path,
        json!([
            { "id": 1, "title": "Invoice run", "done": true, "department": "Odoo" },
            { "id": 2, "title": "Water plants", "done": false, "department": "Home" }
        ])
        .to_string(),
    )
    .unwrap();

    let mut session = Session::open(JsonFileStore::new(&path), clock_on(1)).unwrap();
    assert!(session.registry().tasks()[0].done);
    assert_eq!(session.registry().current_day(), Some(day(1)));

    let home = session.registry().filter(TaskFilter::department(Department::Home));
    assert_eq!(home.len(), 1);
    assert_eq!(home[0].title, "Water plants");

    let added = session.add_daily("Gym", Department::Home).unwrap().unwrap();
    assert_eq!(added.id, TaskId(3));
}

#[test]
fn acceptance_corrupt_file_is_escalated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    std::fs::write(&path, "[{\"id\": 1,").unwrap();

    let err = Session::open(JsonFileStore::new(&path), clock_on(1)).err().unwrap();
    assert!(matches!(err, TaskError::Store(StoreError::CorruptData { .. })));
    // the bad file is left alone for the caller to inspect
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "[{\"id\": 1,");
}

#[test]
fn acceptance_save_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    {
        let mut session = Session::open(JsonFileStore::new(&path), clock_on(1)).unwrap();
        let a = session.add("Buy milk", Department::Home).unwrap().unwrap();
        session.add_daily("Stand-up", Department::Odoo).unwrap();
        session.toggle_done(a.id, true).unwrap();
    }

    let store = JsonFileStore::new(&path);
    let first = store.load().unwrap();
    assert_eq!(first.tasks.len(), 2);
    store.save(&first).unwrap();
    assert_eq!(store.load().unwrap(), first);
}
