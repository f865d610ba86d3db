mod common;

use bamtest_model::User;
use bamtest_registry::{
    CorruptStorePolicy, Environment, RawRegistry, RegistryConfig, RegistryError, RegistryStore,
    UserFilter,
};
use common::{config_in, registered_user, temp_store};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::fs;
use tempfile::TempDir;

// ── Paths ────────────────────────────────────────────────────────

#[test]
fn paths_follow_environment_naming() {
    let (dir, store) = temp_store(Environment::Staging);
    assert_eq!(store.path(), dir.path().join("STAGING_ENV_USERS.json"));
    assert_eq!(store.lock_path(), dir.path().join("STAGING_ENV_USERS.json.lock"));
    assert_eq!(store.environment(), Environment::Staging);
}

// ── Load ─────────────────────────────────────────────────────────

#[test]
fn load_bootstraps_missing_file() {
    let (_dir, store) = temp_store(Environment::Test);
    assert!(!store.path().exists());

    let registry = store.load().unwrap();
    assert!(registry.is_empty());

    let on_disk: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(on_disk, json!({}));
}

#[test]
fn load_creates_missing_parent_directories() {
    let dir = TempDir::new().unwrap();
    let config = RegistryConfig::new(dir.path().join("nested").join("registered_users"));
    let store = RegistryStore::open(config, Environment::Dev);

    assert!(store.load().unwrap().is_empty());
    assert!(store.path().exists());
}

#[test]
fn load_propagates_invalid_json() {
    let (_dir, store) = temp_store(Environment::Test);
    fs::write(store.path(), "{ not json").unwrap();

    let err = store.load().unwrap_err();
    match &err {
        RegistryError::Decode { environment, path, .. } => {
            assert_eq!(*environment, Environment::Test);
            assert_eq!(path, store.path());
        }
        other => panic!("expected Decode, got {other:?}"),
    }
    assert!(err.to_string().contains("TEST"));
}

#[test]
fn load_rejects_bare_array() {
    let (_dir, store) = temp_store(Environment::Test);
    fs::write(store.path(), "[]").unwrap();
    assert!(matches!(store.load(), Err(RegistryError::Decode { .. })));
}

// ── Merge and save ───────────────────────────────────────────────

#[test]
fn saved_record_is_loaded_unchanged() {
    let (_dir, store) = temp_store(Environment::Test);
    let record = json!({
        "username": "ABCDE",
        "password": "12345",
        "id": 7,
        "bank_accounts": {},
        "extra": [1, 2, {"nested": true}]
    });

    store.merge_and_save("7", record.clone()).unwrap();

    let registry = store.load().unwrap();
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.get("7"), Some(&record));
}

#[test]
fn merge_keeps_other_keys_and_replaces_same_key() {
    let (_dir, store) = temp_store(Environment::Test);
    store.merge_and_save("1", json!({"v": 1})).unwrap();
    store.merge_and_save("2", json!({"v": 2})).unwrap();
    store.merge_and_save("1", json!({"v": 3})).unwrap();

    let registry = store.load().unwrap();
    let mut expected = RawRegistry::new();
    expected.insert("1".into(), json!({"v": 3}));
    expected.insert("2".into(), json!({"v": 2}));
    assert_eq!(registry, expected);
}

#[test]
fn file_is_pretty_printed_object() {
    let (_dir, store) = temp_store(Environment::Test);
    store.merge_and_save("1", json!({"v": 1})).unwrap();

    let text = fs::read_to_string(store.path()).unwrap();
    assert_eq!(text, "{\n  \"1\": {\n    \"v\": 1\n  }\n}\n");
}

#[cfg(unix)]
#[test]
fn rewrite_keeps_file_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let (_dir, store) = temp_store(Environment::Test);
    store.load().unwrap();
    fs::set_permissions(store.path(), fs::Permissions::from_mode(0o644)).unwrap();

    store.merge_and_save("1", json!({"v": 1})).unwrap();
    store.remove("1").unwrap();

    let mode = fs::metadata(store.path()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o644);
}

#[test]
fn corrupt_file_is_replaced_by_default() {
    let (_dir, store) = temp_store(Environment::Test);
    fs::write(store.path(), "garbage").unwrap();

    store.merge_and_save("1", json!({"v": 1})).unwrap();

    let registry = store.load().unwrap();
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.get("1"), Some(&json!({"v": 1})));
}

#[test]
fn corrupt_file_aborts_write_under_strict_policy() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir).with_corrupt_policy(CorruptStorePolicy::Abort);
    let store = RegistryStore::open(config, Environment::Dev);
    fs::write(store.path(), "garbage").unwrap();

    let err = store.merge_and_save("1", json!({"v": 1})).unwrap_err();
    assert!(matches!(err, RegistryError::CorruptStore { environment: Environment::Dev, .. }));
    assert_eq!(fs::read_to_string(store.path()).unwrap(), "garbage");
}

#[test]
fn failed_write_releases_lock() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir)
        .with_corrupt_policy(CorruptStorePolicy::Abort)
        .with_lock_timeout(Some(std::time::Duration::from_millis(200)));
    let store = RegistryStore::open(config, Environment::Test);
    fs::write(store.path(), "garbage").unwrap();

    assert!(store.merge_and_save("1", json!({})).is_err());

    fs::write(store.path(), "{}").unwrap();
    store.merge_and_save("1", json!({})).unwrap();
}

// ── Typed helpers ────────────────────────────────────────────────

#[test]
fn save_user_round_trips_through_record() {
    let (_dir, store) = temp_store(Environment::Test);
    let mut user = registered_user(11, true);
    user.token = Some("session".into());

    store.save_user(&user).unwrap();

    let loaded = store.load_user("11").unwrap().unwrap();
    assert_eq!(loaded.token, None);
    user.token = None;
    assert_eq!(loaded, user);
    assert!(store.load_user("12").unwrap().is_none());
}

#[test]
fn unregistered_user_cannot_be_saved() {
    let (_dir, store) = temp_store(Environment::Test);
    let err = store.save_user(&User::new("ABCDE", "12345")).unwrap_err();
    assert!(matches!(err, RegistryError::MissingUserId { ref username } if username == "ABCDE"));
    assert!(!store.path().exists());
}

#[test]
fn remove_deletes_only_the_given_key() {
    let (_dir, store) = temp_store(Environment::Test);
    store.save_user(&registered_user(1, false)).unwrap();
    store.save_user(&registered_user(2, false)).unwrap();

    assert!(store.remove("1").unwrap());
    assert!(!store.remove("1").unwrap());

    let registry = store.load().unwrap();
    assert_eq!(registry.keys().collect::<Vec<_>>(), vec!["2"]);
}

#[test]
fn select_random_user_reads_from_disk() {
    let (_dir, store) = temp_store(Environment::Test);
    store.save_user(&registered_user(1, false)).unwrap();
    store.save_user(&registered_user(2, true)).unwrap();

    for _ in 0..10 {
        let user = store.select_random_user(UserFilter::WithBankAccount).unwrap();
        assert_eq!(user.id(), Some(2));
    }
}

#[test]
fn selection_failure_names_environment() {
    let (_dir, store) = temp_store(Environment::Local);
    store.save_user(&registered_user(1, false)).unwrap();

    let err = store.select_random_user(UserFilter::WithBankAccount).unwrap_err();
    assert!(matches!(
        err,
        RegistryError::NoMatchingRecord {
            environment: Some(Environment::Local),
            total: 1,
            rejected: 0,
            ..
        }
    ));
    let msg = err.to_string();
    assert!(msg.contains("in LOCAL"));
    assert!(msg.contains("user with a bank account"));
}

#[test]
fn environments_do_not_share_files() {
    let dir = TempDir::new().unwrap();
    let test = RegistryStore::open(config_in(&dir), Environment::Test);
    let dev = RegistryStore::open(config_in(&dir), Environment::Dev);

    test.save_user(&registered_user(1, false)).unwrap();
    assert!(dev.load().unwrap().is_empty());
    assert_eq!(test.load().unwrap().len(), 1);
}
