use bamtest_registry::{CorruptStorePolicy, DEFAULT_DATA_DIR, DEFAULT_POLL_INTERVAL, RegistryConfig};
use std::path::Path;
use std::time::Duration;

#[test]
fn defaults() {
    let config = RegistryConfig::default();
    assert_eq!(config.base_dir(), Path::new(DEFAULT_DATA_DIR));
    assert_eq!(config.lock_timeout(), None);
    assert_eq!(config.poll_interval(), DEFAULT_POLL_INTERVAL);
    assert_eq!(config.corrupt_policy(), CorruptStorePolicy::TreatAsEmpty);
}

#[test]
fn builder_overrides() {
    let config = RegistryConfig::new("/tmp/x")
        .with_lock_timeout(Some(Duration::from_secs(3)))
        .with_poll_interval(Duration::from_millis(10))
        .with_corrupt_policy(CorruptStorePolicy::Abort);
    assert_eq!(config.base_dir(), Path::new("/tmp/x"));
    assert_eq!(config.lock_timeout(), Some(Duration::from_secs(3)));
    assert_eq!(config.poll_interval(), Duration::from_millis(10));
    assert_eq!(config.corrupt_policy(), CorruptStorePolicy::Abort);
}
