//! Test fixtures and environment helpers.

use std::path::PathBuf;

/// Environment variable naming an externally managed test database.
pub const TEST_DATABASE_ENV: &str = "RECAST_TEST_DATABASE_URL";

/// Returns `true` if database-backed integration tests can run: either an
/// external database URL is supplied or local Postgres binaries are on the
/// search path.
#[must_use]
pub fn postgres_available() -> bool {
    std::env::var(TEST_DATABASE_ENV).is_ok() || find_binary("initdb").is_some()
}

/// Locate a binary on `PATH` plus the common Postgres install locations.
#[must_use]
pub fn find_binary(name: &str) -> Option<PathBuf> {
    let mut search_paths: Vec<PathBuf> = vec![
        PathBuf::from("/opt/homebrew/opt/postgresql@16/bin"),
        PathBuf::from("/usr/local/opt/postgresql@16/bin"),
    ];
    search_paths.extend(
        std::env::var_os("PATH")
            .map_or_else(Vec::new, |paths| std::env::split_paths(&paths).collect()),
    );
    search_paths.extend([
        PathBuf::from("/usr/local/bin"),
        PathBuf::from("/opt/homebrew/bin"),
        PathBuf::from("/usr/lib/postgresql/16/bin"),
    ]);

    search_paths
        .into_iter()
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.exists())
}
