//! Concurrency behavior of the access coordinator against real fixture trees.

use fixturekit_coordinator::{
    AccessCoordinator, AccessError, AccessOptions, FixtureLocator, ResourceScope,
};
use fixturekit_directory::{DirectoryResolver, FixtureError, MapEnvironment};
use fixturekit_test_utils::FixtureProject;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{oneshot, Barrier};

fn project_with(names: &[&str]) -> FixtureProject {
    let project = FixtureProject::new().unwrap();
    for name in names {
        project.add_fixture(name, *name).unwrap();
    }
    project
}

fn resolver_for(project: &FixtureProject) -> DirectoryResolver {
    DirectoryResolver::new(project.root()).with_environment(MapEnvironment::empty())
}

/// Wraps a resolver and counts how often it is asked for a path.
#[derive(Debug)]
struct CountingLocator {
    inner: DirectoryResolver,
    lookups: Arc<AtomicUsize>,
}

impl FixtureLocator for CountingLocator {
    fn locate(&self, fixture_id: &str) -> Result<PathBuf, FixtureError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.locate(fixture_id)
    }

    fn fixture_ids(&self) -> Result<Vec<String>, FixtureError> {
        self.inner.fixture_ids()
    }
}

#[derive(Debug, Default)]
struct RecordingScope {
    events: Mutex<Vec<String>>,
}

impl RecordingScope {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl ResourceScope for RecordingScope {
    fn start_access(&self, path: &Path) -> bool {
        let name = path.file_name().unwrap().to_string_lossy();
        self.events.lock().unwrap().push(format!("start {name}"));
        true
    }

    fn stop_access(&self, path: &Path) {
        let name = path.file_name().unwrap().to_string_lossy();
        self.events.lock().unwrap().push(format!("stop {name}"));
    }
}

#[derive(Debug)]
enum TestError {
    Access(AccessError),
    Operation(&'static str),
}

impl From<AccessError> for TestError {
    fn from(e: AccessError) -> Self {
        Self::Access(e)
    }
}

#[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 4))]
async fn test_same_fixture_never_overlaps() {
    let project = project_with(&["sample.json"]);
    let coordinator = Arc::new(AccessCoordinator::new(resolver_for(&project)));
    let active = Arc::new(AtomicUsize::new(0));
    let max_active = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let coordinator = Arc::clone(&coordinator);
        let active = Arc::clone(&active);
        let max_active = Arc::clone(&max_active);
        handles.push(tokio::spawn(async move {
            coordinator
                .with_exclusive_access("sample.json", |path| async move {
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    max_active.fetch_max(now, Ordering::SeqCst);
                    assert!(path.is_file());
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    active.fetch_sub(1, Ordering::SeqCst);
                    Ok::<_, AccessError>(())
                })
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(max_active.load(Ordering::SeqCst), 1);
    assert_eq!(coordinator.access_count("sample.json"), 8);
    assert!(!coordinator.is_locked("sample.json"));
}

#[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 2))]
async fn test_different_fixtures_run_in_parallel() {
    let project = project_with(&["a.json", "b.json"]);
    let coordinator = Arc::new(AccessCoordinator::new(resolver_for(&project)));
    // Both bodies must be inside their critical sections at the same time
    let barrier = Arc::new(Barrier::new(2));

    let run = |id: &'static str| {
        let coordinator = Arc::clone(&coordinator);
        let barrier = Arc::clone(&barrier);
        tokio::spawn(async move {
            coordinator
                .with_exclusive_access(id, |_| async move {
                    barrier.wait().await;
                    Ok::<_, AccessError>(())
                })
                .await
        })
    };

    let both = async {
        let (a, b) = tokio::join!(run("a.json"), run("b.json"));
        a.unwrap().unwrap();
        b.unwrap().unwrap();
    };
    tokio::time::timeout(Duration::from_secs(5), both)
        .await
        .expect("different fixtures were serialized");
}

#[tokio::test]
async fn test_operation_error_returned_unchanged_and_lock_released() {
    let project = project_with(&["sample.json"]);
    let coordinator = AccessCoordinator::new(resolver_for(&project));

    let err = coordinator
        .with_exclusive_access("sample.json", |_| async {
            Err::<(), _>(TestError::Operation("boom"))
        })
        .await
        .unwrap_err();
    assert!(matches!(err, TestError::Operation("boom")));
    assert!(!coordinator.is_locked("sample.json"));

    coordinator
        .with_exclusive_access("sample.json", |_| async { Ok::<_, TestError>(()) })
        .await
        .unwrap();
    assert_eq!(coordinator.access_count("sample.json"), 2);
}

#[tokio::test]
async fn test_missing_fixture_surfaces_through_caller_error() {
    let project = project_with(&[]);
    let coordinator = AccessCoordinator::new(resolver_for(&project));

    let err = coordinator
        .with_exclusive_access("missing.json", |_| async { Ok::<_, TestError>(()) })
        .await
        .unwrap_err();
    match err {
        TestError::Access(AccessError::Fixture(e)) => assert!(e.is_fixture_not_found()),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!coordinator.is_locked("missing.json"));
    assert_eq!(coordinator.access_count("missing.json"), 1);
}

#[tokio::test]
async fn test_anyhow_callers() -> anyhow::Result<()> {
    let project = project_with(&["sample.json"]);
    let coordinator = AccessCoordinator::new(resolver_for(&project));

    let contents = coordinator
        .with_exclusive_access("sample.json", |path| async move {
            Ok::<_, anyhow::Error>(tokio::fs::read_to_string(path).await?)
        })
        .await?;
    assert_eq!(contents, "sample.json");
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_panicking_operation_releases_lock() {
    let project = project_with(&["sample.json"]);
    let coordinator = Arc::new(AccessCoordinator::new(resolver_for(&project)));

    let panicking = {
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move {
            coordinator
                .with_exclusive_access("sample.json", |_| async {
                    if true {
                        panic!("operation panicked");
                    }
                    Ok::<_, AccessError>(())
                })
                .await
        })
    };
    assert!(panicking.await.unwrap_err().is_panic());
    assert!(!coordinator.is_locked("sample.json"));

    coordinator
        .with_exclusive_access("sample.json", |_| async { Ok::<_, AccessError>(()) })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_cancelled_access_releases_lock() {
    let project = project_with(&["sample.json"]);
    let coordinator = AccessCoordinator::new(resolver_for(&project));

    let slow = coordinator.with_exclusive_access("sample.json", |_| async {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok::<_, AccessError>(())
    });
    assert!(tokio::time::timeout(Duration::from_millis(20), slow)
        .await
        .is_err());
    assert!(!coordinator.is_locked("sample.json"));
}

#[tokio::test]
async fn test_paths_are_memoized() {
    let project = project_with(&["sample.json", "other.txt"]);
    let lookups = Arc::new(AtomicUsize::new(0));
    let coordinator = AccessCoordinator::new(CountingLocator {
        inner: resolver_for(&project),
        lookups: Arc::clone(&lookups),
    });

    for _ in 0..2 {
        coordinator
            .with_exclusive_access("sample.json", |_| async { Ok::<_, AccessError>(()) })
            .await
            .unwrap();
    }
    assert_eq!(lookups.load(Ordering::SeqCst), 1);
    assert_eq!(
        coordinator.cached_path("sample.json"),
        Some(project.fixtures_dir().join("sample.json"))
    );

    coordinator.clear_cache();
    coordinator
        .with_exclusive_access("sample.json", |_| async { Ok::<_, AccessError>(()) })
        .await
        .unwrap();
    assert_eq!(lookups.load(Ordering::SeqCst), 2);

    assert_eq!(coordinator.preload_all().unwrap(), 1);
    assert_eq!(lookups.load(Ordering::SeqCst), 3);
    assert!(coordinator.cached_path("other.txt").is_some());
    // Preloading does not count as access
    assert_eq!(coordinator.access_count("other.txt"), 0);
}

#[tokio::test]
async fn test_acquire_timeout() {
    let project = project_with(&["sample.json"]);
    let coordinator = Arc::new(
        AccessCoordinator::new(resolver_for(&project))
            .with_options(AccessOptions::with_acquire_timeout(Duration::from_millis(50))),
    );
    let (entered_tx, entered_rx) = oneshot::channel();
    let (finish_tx, finish_rx) = oneshot::channel::<()>();

    let holder = {
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move {
            coordinator
                .with_exclusive_access("sample.json", |_| async move {
                    let _ = entered_tx.send(());
                    let _ = finish_rx.await;
                    Ok::<_, AccessError>(())
                })
                .await
        })
    };
    entered_rx.await.unwrap();

    let err = coordinator
        .with_exclusive_access("sample.json", |_| async { Ok::<_, AccessError>(()) })
        .await
        .unwrap_err();
    match err {
        AccessError::AcquireTimeout { name, waited } => {
            assert_eq!(name, "sample.json");
            assert!(waited >= Duration::from_millis(50));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    // A timed-out waiter is not counted
    assert_eq!(coordinator.access_count("sample.json"), 1);

    finish_tx.send(()).unwrap();
    holder.await.unwrap().unwrap();
    assert!(!coordinator.is_locked("sample.json"));
}

#[tokio::test]
async fn test_release_all_locks_unblocks_waiters() {
    let project = project_with(&["sample.json"]);
    let coordinator = Arc::new(AccessCoordinator::new(resolver_for(&project)));
    let (entered_tx, entered_rx) = oneshot::channel();
    let (finish_tx, finish_rx) = oneshot::channel::<()>();

    let holder = {
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move {
            coordinator
                .with_exclusive_access("sample.json", |_| async move {
                    let _ = entered_tx.send(());
                    let _ = finish_rx.await;
                    Ok::<_, AccessError>(())
                })
                .await
        })
    };
    entered_rx.await.unwrap();

    let waiter = {
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move {
            coordinator
                .with_exclusive_access("sample.json", |_| async { Ok::<_, AccessError>(()) })
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!waiter.is_finished());

    coordinator.release_all_locks();
    tokio::time::timeout(Duration::from_secs(5), waiter)
        .await
        .expect("waiter stayed blocked")
        .unwrap()
        .unwrap();

    finish_tx.send(()).unwrap();
    holder.await.unwrap().unwrap();
    assert!(!coordinator.is_locked("sample.json"));
    assert_eq!(coordinator.access_count("sample.json"), 2);
}

#[tokio::test]
async fn test_scoped_access_starts_and_stops() {
    let project = project_with(&["sample.json"]);
    let scope = Arc::new(RecordingScope::default());
    let coordinator =
        AccessCoordinator::new(resolver_for(&project)).with_resource_scope(Arc::clone(&scope));

    coordinator
        .with_scoped_access("sample.json", |_| async {
            assert_eq!(scope.events(), vec!["start sample.json"]);
            Ok::<_, AccessError>(())
        })
        .await
        .unwrap();
    assert_eq!(scope.events(), vec!["start sample.json", "stop sample.json"]);

    let err = coordinator
        .with_scoped_access("sample.json", |_| async {
            Err::<(), _>(TestError::Operation("failed"))
        })
        .await
        .unwrap_err();
    assert!(matches!(err, TestError::Operation("failed")));
    assert_eq!(scope.events().len(), 4);
    assert_eq!(scope.events()[3], "stop sample.json");
}

#[tokio::test]
async fn test_scope_not_started_when_resolution_fails() {
    let project = project_with(&[]);
    let scope = Arc::new(RecordingScope::default());
    let coordinator =
        AccessCoordinator::new(resolver_for(&project)).with_resource_scope(Arc::clone(&scope));

    let result = coordinator
        .with_scoped_access("missing.json", |_| async { Ok::<_, AccessError>(()) })
        .await;
    assert!(result.is_err());
    assert!(scope.events().is_empty());
}

#[tokio::test]
async fn test_usage_report_after_accesses() {
    let project = project_with(&["a.json", "b.json"]);
    let coordinator = AccessCoordinator::new(resolver_for(&project));
    for id in ["b.json", "a.json", "b.json"] {
        coordinator
            .with_exclusive_access(id, |_| async { Ok::<_, AccessError>(()) })
            .await
            .unwrap();
    }

    let report = coordinator.usage_report();
    let rows: Vec<&str> = report.lines().skip(4).take(2).collect();
    assert!(rows[0].starts_with("b.json"));
    assert!(rows[0].trim_end().ends_with('2'));
    assert!(rows[1].starts_with("a.json"));
    assert!(report.contains("Total accesses: 3"));
    coordinator.log_usage_report();
}
