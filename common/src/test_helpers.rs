use std::sync::atomic::{AtomicU64, Ordering};
use tempfile::TempDir;

static NEXT_TEST_ID: AtomicU64 = AtomicU64::new(1);

/// Monotonically increasing id so fixtures in the same test run never collide.
pub fn generate_unique_test_id() -> u64 {
    NEXT_TEST_ID.fetch_add(1, Ordering::Relaxed)
}

/// A throwaway on-disk SQLite database. The returned directory guard must be
/// kept alive for the duration of the test.
pub fn temp_database() -> (TempDir, String) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join(format!("test_{}.db", generate_unique_test_id()));
    let url = format!("sqlite://{}?mode=rwc", path.display());
    (dir, url)
}
