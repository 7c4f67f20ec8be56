//! Typed, validated and cached access to an anime and manga catalogue site.
//!
//! Requests flow through a fixed chain:
//!
//! ```text
//! Validator -> CachedApi -> extraction service (any `Api`)
//! ```
//!
//! The extraction service parses pages into the records in [`mal::types`].
//! It is injected into [`Malscraper`], and can build on the [`Toolkit`] for
//! fetching and date handling.

pub mod cache;
pub mod config;
pub mod date;
pub mod error;
pub mod logging;
pub mod mal;
pub mod utils;

use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::cache::{CacheStorage, NoopStorage, SqliteStorage, Store, DEFAULT_TTL};
use crate::config::Config;
use crate::date::DateNormalizer;
use crate::error::{Error, Outcome};
use crate::mal::{Api, CachedApi, Fetcher, Validator};

pub use crate::error::{OutcomeExt, ValidationError};

/// Composition root. Dereferences to the validated, cached [`Api`].
pub struct Malscraper {
  api: Box<dyn Api>,
  store: Store,
}

impl Malscraper {
  /// Wire `extractor` behind the cache and validator described by `config`.
  ///
  /// Fails with [`Error::InitCache`] when the cache backend can't be opened.
  pub fn new(config: &Config, extractor: Box<dyn Api>) -> Outcome<Self> {
    let storage: Arc<dyn CacheStorage> = if !config.cache.enabled {
      Arc::new(NoopStorage)
    } else {
      let storage = match &config.cache.path {
        Some(path) => SqliteStorage::open(path),
        None => SqliteStorage::open_in_memory(),
      }
      .map_err(|e| Error::InitCache(e.to_string()))?;
      Arc::new(storage)
    };

    info!(
      enabled = config.cache.enabled,
      ttl = ?config.cache.ttl(),
      "malscraper ready"
    );
    Ok(Self::with_storage(storage, config.cache.ttl(), extractor))
  }

  /// Same chain without caching: every call reaches `extractor`.
  pub fn no_cache(extractor: Box<dyn Api>) -> Self {
    Self::with_storage(Arc::new(NoopStorage), DEFAULT_TTL, extractor)
  }

  /// Chain over a caller-provided backend.
  pub fn with_storage(
    storage: Arc<dyn CacheStorage>,
    ttl: Duration,
    extractor: Box<dyn Api>,
  ) -> Self {
    let store = Store::new(storage, ttl);
    let cached = CachedApi::new(extractor, store.clone());
    let validator = Validator::new(Box::new(cached), store.clone());
    Self {
      api: Box::new(validator),
      store,
    }
  }

  /// Release the cache backend. Later calls still work, uncached.
  pub fn close(&self) -> color_eyre::Result<()> {
    self.store.close()
  }
}

impl Deref for Malscraper {
  type Target = dyn Api;

  fn deref(&self) -> &Self::Target {
    self.api.as_ref()
  }
}

/// Shared helpers for extraction services.
#[derive(Clone)]
pub struct Toolkit {
  pub fetcher: Fetcher,
  pub dates: DateNormalizer,
  clean_image_url: bool,
  clean_video_url: bool,
}

impl Toolkit {
  pub fn from_config(config: &Config) -> Outcome<Self> {
    Ok(Self::new(Fetcher::new()?, DateNormalizer::default(), config))
  }

  pub fn new(fetcher: Fetcher, dates: DateNormalizer, config: &Config) -> Self {
    Self {
      fetcher,
      dates,
      clean_image_url: config.clean_image_url,
      clean_video_url: config.clean_video_url,
    }
  }

  /// Image URL as scraped, cleaned when the config asks for it.
  pub fn image_url(&self, raw: &str) -> String {
    if self.clean_image_url {
      utils::clean_image_url(raw)
    } else {
      raw.to_string()
    }
  }

  /// Video URL as scraped, cleaned when the config asks for it.
  pub fn video_url(&self, raw: &str) -> String {
    if self.clean_video_url {
      utils::clean_video_url(raw)
    } else {
      raw.to_string()
    }
  }
}
