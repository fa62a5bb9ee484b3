//! Shared helpers for tests across the workspace. Not for production use.

use db::DBService;

/// Fresh in-memory database with all migrations applied.
pub async fn test_db() -> DBService {
    DBService::connect("sqlite::memory:")
        .await
        .expect("in-memory database should always connect")
}

/// Scratch directory for attachment-store tests. Dropped with its contents
/// when the guard goes out of scope.
pub fn temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}
