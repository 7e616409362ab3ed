// Test suite for garbage collection against real backends
// Covers both retention shapes end to end, idempotence, protected files,
// stale lock abandonment and failure injection

mod common;

use common::{kv_store, ns, object_store, p, source_dir, BrokenSource, FailingKv, FailingObjects};
use tempfile::TempDir;
use valpop_core::{
    ExErrorKind, FixedClock, GenerationId, GenerationSource, RetentionPolicy, RetentionShape,
};
use valpop_engine::{collect, populate, publish, GcOptions};
use valpop_store::{DirWalker, KvAdapter, ObjectBackend, ObjectStoreAdapter, StorageAdapter};

fn g(seconds: i64) -> GenerationId {
    GenerationId::new(seconds)
}

fn publish_at(adapter: &dyn StorageAdapter, namespace: &str, seconds: i64, files: &[(&str, &str)]) {
    let source = source_dir(files);
    publish(
        adapter,
        &ns(namespace),
        &DirWalker::new(source.path()),
        &FixedClock::new(seconds),
    )
    .unwrap();
}

#[test]
fn test_per_path_scenario_on_kv() {
    // Given: app1 published at 0, 10, 20 and 40
    let dir = TempDir::new().unwrap();
    let store = kv_store(&dir);
    for seconds in [0, 10, 20, 40] {
        publish_at(&store, "app1", seconds, &[("index.html", "x")]);
    }

    // When: Collected at 45 keeping 2, max age 30
    let policy = RetentionPolicy::try_new(2, 30).unwrap();
    let report = collect(&store, &ns("app1"), &policy, &FixedClock::new(45), GcOptions::default())
        .unwrap();

    // Then: Generations 0 and 10 lose their items
    assert_eq!(report.shape, RetentionShape::PerPath);
    assert_eq!(report.items_deleted, 2);
    let remaining: Vec<GenerationId> = store
        .list_generations(&ns("app1"))
        .unwrap()
        .generations()
        .collect();
    assert_eq!(remaining, vec![g(20), g(40)]);
}

#[test]
fn test_reachability_scenario_on_object_store() {
    // Given: Two manifests sharing shared.js
    let dir = TempDir::new().unwrap();
    let store = object_store(&dir);
    publish_at(&store, "app1", 0, &[("a.js", "a"), ("shared.js", "s0")]);
    publish_at(&store, "app1", 50, &[("b.js", "b"), ("shared.js", "s50")]);

    // When: Collected at 60 keeping 1, max age 10
    let policy = RetentionPolicy::try_new(1, 10).unwrap();
    let report = collect(&store, &ns("app1"), &policy, &FixedClock::new(60), GcOptions::default())
        .unwrap();

    // Then: Only a.js and manifest 0 go
    assert_eq!(report.shape, RetentionShape::Reachability);
    let deleted: Vec<String> = report.plan.items.iter().map(|k| k.path.to_string()).collect();
    assert_eq!(deleted, vec!["a.js"]);
    assert_eq!(report.plan.generations, vec![g(0)]);
    assert_eq!(report.generations_deleted, 1);

    let backend = store.backend();
    assert!(backend.get_object("data/app1/a.js").unwrap().is_none());
    assert!(backend.get_object("data/app1/shared.js").unwrap().is_some());
    assert!(backend.get_object("data/app1/b.js").unwrap().is_some());
    assert!(store.get_manifest(&ns("app1"), g(0)).unwrap().is_none());
}

#[test]
fn test_second_pass_deletes_nothing() {
    let dir = TempDir::new().unwrap();
    let stores: Vec<Box<dyn StorageAdapter>> =
        vec![Box::new(kv_store(&dir)), Box::new(object_store(&dir))];

    for store in &stores {
        // Given: Four generations, collected once
        for seconds in [0, 10, 20, 40] {
            publish_at(store.as_ref(), "app1", seconds, &[("index.html", "x"), ("app.js", "y")]);
        }
        let policy = RetentionPolicy::try_new(2, 30).unwrap();
        let clock = FixedClock::new(45);
        let first =
            collect(store.as_ref(), &ns("app1"), &policy, &clock, GcOptions::default()).unwrap();
        assert!(!first.plan.is_empty());

        // When: Collected again with no publish in between
        let second =
            collect(store.as_ref(), &ns("app1"), &policy, &clock, GcOptions::default()).unwrap();

        // Then: Nothing more is deleted
        assert!(second.plan.is_empty(), "{:?}", second.plan);
    }
}

#[test]
fn test_protected_file_survives_on_object_store() {
    // Given: fedmods.json only listed by an expired generation
    let dir = TempDir::new().unwrap();
    let store = object_store(&dir);
    publish_at(&store, "app1", 0, &[("fedmods.json", "{}"), ("old.js", "o")]);
    publish_at(&store, "app1", 100, &[("new.js", "n")]);

    // When: Collected with the default protected set
    let policy = RetentionPolicy::try_new(1, 10).unwrap();
    let report = collect(&store, &ns("app1"), &policy, &FixedClock::new(200), GcOptions::default())
        .unwrap();

    // Then: old.js goes, fedmods.json stays
    assert!(report.plan.items.iter().all(|k| k.path.as_str() != "fedmods.json"));
    assert!(store
        .backend()
        .get_object("data/app1/fedmods.json")
        .unwrap()
        .is_some());
    assert!(store.backend().get_object("data/app1/old.js").unwrap().is_none());
}

#[test]
fn test_stale_lock_abandoned_during_collect() {
    // Given: A crashed publish at 100 and a good one at 9_000
    let dir = TempDir::new().unwrap();
    let store = kv_store(&dir);
    let crashed = BrokenSource {
        good: vec![("index.html", "partial")],
    };
    publish(&store, &ns("app1"), &crashed, &FixedClock::new(100)).unwrap_err();
    publish_at(&store, "app1", 9_000, &[("index.html", "good")]);

    // When: Collected with a one-hour stale threshold
    let options = GcOptions {
        stale_lock_after_seconds: Some(3_600),
        ..GcOptions::default()
    };
    let report = collect(
        &store,
        &ns("app1"),
        &RetentionPolicy::default(),
        &FixedClock::new(10_000),
        options,
    )
    .unwrap();

    // Then: The crashed generation is gone and the good one untouched
    assert_eq!(report.abandoned, vec![g(100)]);
    assert!(store.is_abandoned(&ns("app1"), g(100)).unwrap());
    assert!(!store.list_generations(&ns("app1")).unwrap().contains(g(100)));
    assert!(store.get_item(&ns("app1"), &p("index.html"), g(100)).is_err());
    assert!(store.list_generations(&ns("app1")).unwrap().contains(g(9_000)));
}

#[test]
fn test_stale_locks_left_alone_by_default() {
    let dir = TempDir::new().unwrap();
    let store = kv_store(&dir);
    let crashed = BrokenSource { good: vec![] };
    publish(&store, &ns("app1"), &crashed, &FixedClock::new(100)).unwrap_err();

    let report = collect(
        &store,
        &ns("app1"),
        &RetentionPolicy::default(),
        &FixedClock::new(1_000_000),
        GcOptions::default(),
    )
    .unwrap();

    assert!(report.abandoned.is_empty());
    assert!(store.is_locked(&ns("app1"), g(100)).unwrap());
}

#[test]
fn test_delete_failure_aborts_collect() {
    // Given: Four generations on a backend whose deletes fail
    let backend = FailingKv::new();
    let store = KvAdapter::new(&backend);
    for seconds in [0, 10, 20, 40] {
        publish_at(&store, "app1", seconds, &[("index.html", "x")]);
    }
    backend.fail_delete.set(true);

    // When: Collected
    let policy = RetentionPolicy::try_new(2, 30).unwrap();
    let err = collect(&store, &ns("app1"), &policy, &FixedClock::new(45), GcOptions::default())
        .unwrap_err();

    // Then: The adapter error surfaces with the command and namespace
    assert_eq!(err.kind(), ExErrorKind::Adapter);
    assert_eq!(err.op(), Some("collect"));
    assert_eq!(err.namespace(), Some("app1"));
    assert_eq!(err.source_error().and_then(|e| e.op()), Some("delete_many"));
    assert_eq!(store.list_generations(&ns("app1")).unwrap().len(), 4);
}

#[test]
fn test_partial_collect_converges_on_rerun() {
    // Given: Three expired single-file generations on the object store
    let dir = TempDir::new().unwrap();
    let store = ObjectStoreAdapter::new(FailingObjects::new(dir.path()));
    publish_at(&store, "app1", 0, &[("a.js", "a")]);
    publish_at(&store, "app1", 1, &[("b.js", "b")]);
    publish_at(&store, "app1", 2, &[("c.js", "c")]);
    publish_at(&store, "app1", 100, &[("index.html", "i")]);
    let policy = RetentionPolicy::try_new(1, 10).unwrap();
    let clock = FixedClock::new(200);

    // When: The backend fails after one removal
    store.backend().removals_allowed.set(Some(1));
    let err = collect(&store, &ns("app1"), &policy, &clock, GcOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Adapter);

    // Then: Every manifest is still there, so nothing went visible-but-broken
    assert_eq!(store.list_manifests(&ns("app1")).unwrap().len(), 4);

    // And: A healthy rerun finishes the job
    store.backend().removals_allowed.set(None);
    let report = collect(&store, &ns("app1"), &policy, &clock, GcOptions::default()).unwrap();
    assert_eq!(report.generations_deleted, 3);
    assert_eq!(
        store.list_manifests(&ns("app1")).unwrap(),
        vec![g(100)]
    );
}

#[test]
fn test_populate_publishes_then_collects() {
    let dir = TempDir::new().unwrap();
    let store = kv_store(&dir);
    publish_at(&store, "app1", 0, &[("index.html", "old")]);
    let source = source_dir(&[("index.html", "new")]);

    let report = populate(
        &store,
        &ns("app1"),
        &DirWalker::new(source.path()),
        &RetentionPolicy::try_new(1, 10).unwrap(),
        &FixedClock::new(100),
        GcOptions::default(),
    )
    .unwrap();

    assert_eq!(report.publish.generation, g(100));
    assert_eq!(report.gc.items_deleted, 1);
    assert_eq!(
        store
            .list_generations(&ns("app1"))
            .unwrap()
            .generations()
            .collect::<Vec<_>>(),
        vec![g(100)]
    );
}
