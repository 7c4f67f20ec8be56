//! Cache storage trait and SQLite implementation.

use chrono::Utc;
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Trait for cache storage backends.
///
/// Values are opaque byte blobs; encoding is handled by [`super::Store`].
pub trait CacheStorage: Send + Sync {
  /// Get the live value for a key. Expired entries are misses.
  fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>>;

  /// Store a value, replacing any previous one.
  fn set_raw(&self, key: &str, data: &[u8], ttl: Duration) -> Result<()>;

  /// Remove a key. Missing keys are not an error.
  fn delete(&self, key: &str) -> Result<()>;

  /// Release the backend. Later calls fail.
  fn close(&self) -> Result<()>;
}

/// Storage implementation that doesn't cache anything.
/// Used when caching is disabled - all operations are no-ops.
pub struct NoopStorage;

impl CacheStorage for NoopStorage {
  fn get_raw(&self, _key: &str) -> Result<Option<Vec<u8>>> {
    Ok(None) // Always miss
  }

  fn set_raw(&self, _key: &str, _data: &[u8], _ttl: Duration) -> Result<()> {
    Ok(()) // Discard
  }

  fn delete(&self, _key: &str) -> Result<()> {
    Ok(())
  }

  fn close(&self) -> Result<()> {
    Ok(())
  }
}

/// SQLite-based cache storage implementation.
pub struct SqliteStorage {
  conn: Mutex<Option<Connection>>,
}

impl SqliteStorage {
  /// Open (or create) a cache database at `path`.
  pub fn open(path: &Path) -> Result<Self> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;

    Self::with_connection(conn)
  }

  /// Open a private database that lives as long as this value.
  pub fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()
      .map_err(|e| eyre!("Failed to open in-memory cache database: {}", e))?;

    Self::with_connection(conn)
  }

  fn with_connection(conn: Connection) -> Result<Self> {
    conn
      .execute_batch(CACHE_SCHEMA)
      .map_err(|e| eyre!("Failed to run cache migrations: {}", e))?;

    Ok(Self {
      conn: Mutex::new(Some(conn)),
    })
  }

  /// Run `f` against the open connection.
  fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
    let guard: MutexGuard<'_, Option<Connection>> = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    match guard.as_ref() {
      Some(conn) => f(conn),
      None => Err(eyre!("Cache database is closed")),
    }
  }
}

/// Schema for cache tables.
const CACHE_SCHEMA: &str = r#"
-- Key/value cache (stores serialized JSON)
CREATE TABLE IF NOT EXISTS kv_cache (
    cache_key TEXT PRIMARY KEY,
    data BLOB NOT NULL,
    expires_at INTEGER NOT NULL,
    cached_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_kv_cache_expires ON kv_cache(expires_at);
"#;

impl CacheStorage for SqliteStorage {
  fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>> {
    self.with_conn(|conn| {
      let row: Option<(Vec<u8>, i64)> = conn
        .query_row(
          "SELECT data, expires_at FROM kv_cache WHERE cache_key = ?",
          params![key],
          |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()
        .map_err(|e| eyre!("Failed to read cache entry: {}", e))?;

      match row {
        Some((data, expires_at)) if expires_at > Utc::now().timestamp() => Ok(Some(data)),
        Some(_) => {
          // Expired, purge lazily
          conn
            .execute("DELETE FROM kv_cache WHERE cache_key = ?", params![key])
            .map_err(|e| eyre!("Failed to purge expired entry: {}", e))?;
          Ok(None)
        }
        None => Ok(None),
      }
    })
  }

  fn set_raw(&self, key: &str, data: &[u8], ttl: Duration) -> Result<()> {
    let ttl = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
    let expires_at = Utc::now().timestamp().saturating_add(ttl);

    self.with_conn(|conn| {
      conn
        .execute(
          "INSERT OR REPLACE INTO kv_cache (cache_key, data, expires_at, cached_at)
           VALUES (?, ?, ?, datetime('now'))",
          params![key, data, expires_at],
        )
        .map_err(|e| eyre!("Failed to store cache entry: {}", e))?;
      Ok(())
    })
  }

  fn delete(&self, key: &str) -> Result<()> {
    self.with_conn(|conn| {
      conn
        .execute("DELETE FROM kv_cache WHERE cache_key = ?", params![key])
        .map_err(|e| eyre!("Failed to delete cache entry: {}", e))?;
      Ok(())
    })
  }

  fn close(&self) -> Result<()> {
    let mut guard = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    if let Some(conn) = guard.take() {
      conn
        .close()
        .map_err(|(_, e)| eyre!("Failed to close cache database: {}", e))?;
    }
    Ok(())
  }
}
