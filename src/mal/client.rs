//! Outbound HTTP for the extraction layer.

use bytes::Bytes;
use reqwest::Client;
use scraper::Html;
use serde::de::DeserializeOwned;
use std::time::Instant;
use tracing::{debug, Span};
use url::Url;

use crate::error::{Error, Outcome};

/// Site root used when building catalogue URLs.
pub const DEFAULT_BASE_URL: &str = "https://myanimelist.net";

/// Issues GET requests and maps every failure onto [`Error`].
#[derive(Clone)]
pub struct Fetcher {
  client: Client,
  base_url: Url,
  span: Span,
}

impl Fetcher {
  pub fn new() -> Outcome<Self> {
    Self::with_base_url(DEFAULT_BASE_URL)
  }

  /// Build a fetcher whose relative URLs resolve against `base_url`.
  pub fn with_base_url(base_url: &str) -> Outcome<Self> {
    let base_url = Url::parse(base_url).map_err(|e| Error::PrepareRequest(e.to_string()))?;
    let client = Client::builder()
      .user_agent(concat!("malscraper/", env!("CARGO_PKG_VERSION")))
      .redirect(reqwest::redirect::Policy::limited(5))
      .build()
      .map_err(|e| Error::PrepareRequest(e.to_string()))?;

    Ok(Self {
      client,
      base_url,
      span: tracing::debug_span!("fetcher"),
    })
  }

  /// Attach a parent span for log correlation.
  pub fn with_span(mut self, span: Span) -> Self {
    self.span = span;
    self
  }

  /// Resolve `path` against the base URL and append `pairs` as the query.
  pub fn url(&self, path: &str, pairs: &[(&str, String)]) -> Outcome<Url> {
    let mut url = self
      .base_url
      .join(path)
      .map_err(|e| Error::PrepareRequest(e.to_string()))?;
    if !pairs.is_empty() {
      url
        .query_pairs_mut()
        .extend_pairs(pairs.iter().map(|(k, v)| (*k, v.as_str())));
    }
    Ok(url)
  }

  /// Fetch `url` and return the raw body of a 2xx response.
  pub async fn fetch_body(&self, url: &str) -> Outcome<Bytes> {
    self.fetch(url, "body").await
  }

  /// Fetch `url` and parse it as HTML. `label` only tags the log line.
  pub async fn fetch_document(&self, url: &str, label: &str) -> Outcome<Html> {
    let body = self.fetch(url, label).await?;
    let text = std::str::from_utf8(&body).map_err(|e| Error::ParseBody(e.to_string()))?;
    Ok(Html::parse_document(text))
  }

  /// Fetch `url` and decode a JSON payload.
  pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Outcome<T> {
    let body = self.fetch(url, "json").await?;
    serde_json::from_slice(&body).map_err(|e| Error::DecodeJson(e.to_string()))
  }

  async fn fetch(&self, url: &str, label: &str) -> Outcome<Bytes> {
    let parsed = Url::parse(url).map_err(|e| Error::PrepareRequest(e.to_string()))?;
    let start = Instant::now();

    let response = self.client.get(parsed).send().await.map_err(|e| {
      if e.is_builder() {
        Error::PrepareRequest(e.to_string())
      } else {
        Error::HttpRequest(e)
      }
    })?;

    let status = response.status();
    debug!(
      parent: &self.span,
      method = "GET",
      url,
      label,
      status = status.as_u16(),
      elapsed = ?start.elapsed(),
      "fetched"
    );

    if !status.is_success() {
      return Err(Error::Not200(status));
    }

    response.bytes().await.map_err(|e| {
      if e.is_decode() || e.is_body() {
        Error::ParseBody(e.to_string())
      } else {
        Error::HttpRequest(e)
      }
    })
  }
}
