//! Several writers sharing one registry file, as threads and as processes.

mod common;

use bamtest_registry::{Environment, RegistryConfig, RegistryStore};
use common::{init_tracing, registered_user};
use std::collections::BTreeSet;
use std::env;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

const WRITERS: u64 = 8;
const RECORDS_PER_WRITER: u64 = 10;

/// Set on child processes spawned by the cross-process test.
const WRITER_DIR_VAR: &str = "BAMTEST_WRITER_DIR";
const WRITER_INDEX_VAR: &str = "BAMTEST_WRITER_INDEX";

fn writer_config(dir: &Path) -> RegistryConfig {
    RegistryConfig::new(dir).with_poll_interval(Duration::from_millis(1))
}

fn write_batch(store: &RegistryStore, writer: u64) {
    for n in 0..RECORDS_PER_WRITER {
        let id = writer * 1000 + n + 1;
        store.save_user(&registered_user(id, n % 2 == 0)).unwrap();
    }
}

fn assert_every_batch_survived(dir: &Path) {
    let store = RegistryStore::open(writer_config(dir), Environment::Test);
    let keys: BTreeSet<String> = store.load().unwrap().keys().cloned().collect();
    let expected: BTreeSet<String> = (0..WRITERS)
        .flat_map(|writer| (0..RECORDS_PER_WRITER).map(move |n| (writer * 1000 + n + 1).to_string()))
        .collect();
    assert_eq!(keys, expected);
}

#[test]
fn disjoint_concurrent_merges_all_survive() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let barrier = Arc::new(Barrier::new(WRITERS as usize));

    let handles: Vec<_> = (0..WRITERS)
        .map(|writer| {
            let config = writer_config(dir.path());
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let store = RegistryStore::open(config, Environment::Test);
                barrier.wait();
                write_batch(&store, writer);
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_every_batch_survived(dir.path());
}

/// Body of one writer process. Does nothing unless spawned by
/// `disjoint_merges_from_separate_processes_all_survive`.
#[test]
fn registry_writer_process() {
    let (Ok(dir), Ok(writer)) = (env::var(WRITER_DIR_VAR), env::var(WRITER_INDEX_VAR)) else {
        return;
    };
    let writer: u64 = writer.parse().unwrap();
    let store = RegistryStore::open(writer_config(Path::new(&dir)), Environment::Test);
    write_batch(&store, writer);
}

#[test]
fn disjoint_merges_from_separate_processes_all_survive() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let exe = env::current_exe().unwrap();

    let children: Vec<_> = (0..WRITERS)
        .map(|writer| {
            Command::new(&exe)
                .args(["registry_writer_process", "--exact", "--test-threads=1", "--quiet"])
                .env(WRITER_DIR_VAR, dir.path())
                .env(WRITER_INDEX_VAR, writer.to_string())
                .stdout(Stdio::null())
                .spawn()
                .unwrap()
        })
        .collect();
    for mut child in children {
        assert!(child.wait().unwrap().success());
    }

    assert_every_batch_survived(dir.path());
}

#[test]
fn readers_never_see_partial_files() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let config = RegistryConfig::new(dir.path());
    let store = RegistryStore::open(config.clone(), Environment::Test);
    store.load().unwrap();

    let writer = thread::spawn(move || {
        let store = RegistryStore::open(config, Environment::Test);
        for id in 1..=50 {
            store.save_user(&registered_user(id, true)).unwrap();
        }
    });

    while !writer.is_finished() {
        let registry = store.load().unwrap();
        assert!(registry.len() <= 50);
    }
    writer.join().unwrap();
    assert_eq!(store.load().unwrap().len(), 50);
}
