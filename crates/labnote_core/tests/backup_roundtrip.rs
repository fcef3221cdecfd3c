mod common;

use common::{ManualClock, T0};
use labnote_core::service::local_day;
use labnote_core::store::{EXPERIMENTS_KEY, PROJECTS_KEY, TASKS_KEY};
use labnote_core::{
    BackupDocument, ExperimentSection, ImportError, KvStore, LabRepository, MemoryKvStore,
    TaskService, BACKUP_FORMAT_VERSION,
};
use serde_json::{json, Value};

fn seeded_repo(clock: &ManualClock) -> LabRepository<MemoryKvStore, &ManualClock> {
    let repo = LabRepository::with_clock(MemoryKvStore::new(), clock);
    let project = repo.create_project("实验项目").unwrap();
    clock.advance(1);
    let mut experiment = repo.create_experiment(project.id.as_str(), "ELISA").unwrap();
    experiment.set_section(ExperimentSection::Purpose, "<p>测定 IL-6</p>");
    clock.advance(1);
    repo.save_experiment(&experiment).unwrap();
    TaskService::new(&repo)
        .add_tasks("coat plate\nblock", local_day(T0).unwrap())
        .unwrap();
    repo
}

fn snapshot_of(store: &MemoryKvStore) -> [Option<String>; 3] {
    [
        store.get(PROJECTS_KEY).unwrap(),
        store.get(EXPERIMENTS_KEY).unwrap(),
        store.get(TASKS_KEY).unwrap(),
    ]
}

#[test]
fn export_is_a_versioned_pretty_document() {
    let clock = ManualClock::new(T0);
    let repo = seeded_repo(&clock);
    clock.set(T0 + 500);

    let text = repo.export_all().unwrap();
    assert!(text.contains('\n'));
    let document: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(document["version"], BACKUP_FORMAT_VERSION);
    assert_eq!(document["timestamp"], T0 + 500);
    assert_eq!(document["projects"].as_array().unwrap().len(), 1);
    assert_eq!(document["experiments"][0]["purpose"], "<p>测定 IL-6</p>");
    assert_eq!(document["tasks"].as_array().unwrap().len(), 2);
}

#[test]
fn import_of_export_restores_every_collection() {
    let clock = ManualClock::new(T0);
    let source = seeded_repo(&clock);
    let exported = source.export_all().unwrap();

    let target = LabRepository::new(MemoryKvStore::new());
    target.create_project("will be replaced").unwrap();
    let summary = target.import_all(&exported).unwrap();

    assert_eq!(summary.projects, 1);
    assert_eq!(summary.experiments, 1);
    assert_eq!(summary.tasks, 2);
    assert_eq!(target.list_projects(), source.list_projects());
    assert_eq!(target.list_experiments(None), source.list_experiments(None));
    assert_eq!(target.list_tasks(), source.list_tasks());

    let document: BackupDocument = serde_json::from_str(&exported).unwrap();
    assert_eq!(document.projects, target.list_projects());
}

#[test]
fn import_without_experiments_fails_and_leaves_storage_untouched() {
    let clock = ManualClock::new(T0);
    let repo = seeded_repo(&clock);
    let before = snapshot_of(repo.store());

    let payload = json!({ "projects": [], "tasks": [] }).to_string();
    let err = repo.import_all(&payload).unwrap_err();
    assert!(matches!(err, ImportError::MissingCollection("experiments")));
    assert_eq!(snapshot_of(repo.store()), before);
}

#[test]
fn import_rejects_non_array_collections_and_bad_json() {
    let clock = ManualClock::new(T0);
    let repo = seeded_repo(&clock);
    let before = snapshot_of(repo.store());

    let not_array = json!({ "projects": {}, "experiments": [] }).to_string();
    assert!(matches!(
        repo.import_all(&not_array),
        Err(ImportError::MissingCollection("projects"))
    ));
    let null_experiments = json!({ "projects": [], "experiments": null }).to_string();
    assert!(matches!(
        repo.import_all(&null_experiments),
        Err(ImportError::MissingCollection("experiments"))
    ));
    assert!(matches!(
        repo.import_all("{\"projects\": ["),
        Err(ImportError::InvalidJson(_))
    ));
    assert!(matches!(
        repo.import_all("[]"),
        Err(ImportError::MissingCollection("projects"))
    ));
    assert_eq!(snapshot_of(repo.store()), before);
}

#[test]
fn import_stores_arrays_as_given_even_with_unreadable_records() {
    let clock = ManualClock::new(T0);
    let repo = seeded_repo(&clock);

    let payload = json!({
        "projects": [{ "id": "p1", "name": "ok", "createdAt": 1 }],
        "experiments": [
            { "title": "missing ids" },
            { "id": "e1", "projectId": "p1", "title": "fine", "createdAt": 2, "updatedAt": 2 }
        ],
        "tasks": "not a list"
    })
    .to_string();
    let summary = repo.import_all(&payload).unwrap();

    assert_eq!(summary.projects, 1);
    assert_eq!(summary.experiments, 2);
    assert_eq!(summary.tasks, 0);
    assert_eq!(repo.store().get(TASKS_KEY).unwrap().as_deref(), Some("[]"));

    let stored: Vec<Value> =
        serde_json::from_str(&repo.store().get(EXPERIMENTS_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0], json!({ "title": "missing ids" }));

    let experiments = repo.list_experiments(None);
    assert_eq!(experiments.len(), 1);
    assert_eq!(experiments[0].id, "e1");
}

#[test]
fn export_keeps_records_the_model_cannot_read() {
    let store = MemoryKvStore::new();
    store
        .set(
            PROJECTS_KEY,
            r#"[{"id":"p1","name":"ok","createdAt":1},{"id":"p2","name":"odd","createdAt":"2023-01-01"}]"#,
        )
        .unwrap();
    let source = LabRepository::new(&store);
    let exported = source.export_all().unwrap();

    let document: Value = serde_json::from_str(&exported).unwrap();
    assert_eq!(document["projects"][1]["createdAt"], "2023-01-01");

    let target = LabRepository::new(MemoryKvStore::new());
    target.import_all(&exported).unwrap();
    let restored: Vec<Value> =
        serde_json::from_str(&target.store().get(PROJECTS_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(restored.len(), 2);
    assert_eq!(restored[1]["id"], "p2");
    assert_eq!(target.list_projects().len(), 1);
}

#[test]
fn missing_tasks_import_as_empty_and_legacy_experiments_are_accepted() {
    let clock = ManualClock::new(T0);
    let repo = seeded_repo(&clock);

    let payload = json!({
        "projects": [{ "id": "p1", "name": "old", "createdAt": 1 }],
        "experiments": [{
            "id": "e1",
            "projectId": "p1",
            "title": "legacy",
            "createdAt": 2,
            "updatedAt": 3,
            "content": "<p>实验</p>"
        }]
    })
    .to_string();
    let summary = repo.import_all(&payload).unwrap();

    assert_eq!(summary.tasks, 0);
    assert!(repo.list_tasks().is_empty());
    assert_eq!(repo.store().get(TASKS_KEY).unwrap().as_deref(), Some("[]"));
    let experiments = repo.list_experiments(None);
    assert_eq!(experiments.len(), 1);
    assert_eq!(experiments[0].purpose, "<p>实验</p>");
}
