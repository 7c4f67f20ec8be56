//! Typed, logged access to a cache backend.

use color_eyre::Result;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, trace, warn, Span};

use super::storage::CacheStorage;

/// Default lifetime of an entry.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// JSON store over a [`CacheStorage`] backend.
///
/// Backend and decode failures never escape: reads degrade to a miss and
/// writes are skipped, with the failure logged against the store's span.
#[derive(Clone)]
pub struct Store {
  storage: Arc<dyn CacheStorage>,
  ttl: Duration,
  span: Span,
}

impl Store {
  /// Create a store with the given backend and entry lifetime.
  /// A zero `ttl` falls back to [`DEFAULT_TTL`].
  pub fn new(storage: Arc<dyn CacheStorage>, ttl: Duration) -> Self {
    Self {
      storage,
      ttl: if ttl.is_zero() { DEFAULT_TTL } else { ttl },
      span: tracing::debug_span!("cache"),
    }
  }

  /// Attach a parent span for log correlation.
  pub fn with_span(mut self, span: Span) -> Self {
    self.span = span;
    self
  }

  pub fn ttl(&self) -> Duration {
    self.ttl
  }

  /// Read and decode `key`, treating any failure as a miss.
  pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
    trace!(parent: &self.span, key, "retrieving cache");
    let start = Instant::now();

    let raw = match self.storage.get_raw(key) {
      Ok(Some(raw)) => raw,
      Ok(None) => {
        trace!(parent: &self.span, key, "cache miss");
        return None;
      }
      Err(e) => {
        warn!(parent: &self.span, key, "failed retrieving cache: {e}");
        return None;
      }
    };

    match serde_json::from_slice(&raw) {
      Ok(value) => {
        debug!(parent: &self.span, key, elapsed = ?start.elapsed(), "cache found");
        Some(value)
      }
      Err(e) => {
        warn!(parent: &self.span, key, "failed decoding cache: {e}");
        None
      }
    }
  }

  /// Encode and write `value`; failures are logged and dropped.
  pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
    trace!(parent: &self.span, key, "saving cache");
    let start = Instant::now();

    if let Err(e) = self.try_set(key, value) {
      error!(parent: &self.span, key, "failed saving cache: {e}");
      return;
    }
    debug!(parent: &self.span, key, elapsed = ?start.elapsed(), "cache saved");
  }

  fn try_set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
    let data = serde_json::to_vec(value)?;
    self.storage.set_raw(key, &data, self.ttl)
  }

  /// Remove `key`; failures are logged and dropped.
  pub fn delete(&self, key: &str) {
    trace!(parent: &self.span, key, "deleting cache");
    match self.storage.delete(key) {
      Ok(()) => debug!(parent: &self.span, key, "cache deleted"),
      Err(e) => error!(parent: &self.span, key, "failed deleting cache: {e}"),
    }
  }

  /// Release the backend.
  pub fn close(&self) -> Result<()> {
    self.storage.close()
  }
}
