//! Error types shared by every layer of the request chain.
//!
//! Every operation returns an [`Outcome`]. The HTTP-style status of an outcome
//! is `200` for `Ok` values and [`Error::status`] for failures, so callers
//! should branch on the `Result` itself and only use the status for reporting.

use reqwest::StatusCode;
use thiserror::Error;

/// Result of a single operation at any layer of the chain.
pub type Outcome<T> = std::result::Result<T, Error>;

/// Failures surfaced by the fetcher, the decorators and the composition root.
#[derive(Debug, Error)]
pub enum Error {
  /// The outbound request could not be built (bad URL, bad header).
  #[error("failed preparing request: {0}")]
  PrepareRequest(String),

  /// The request was sent but the transport failed.
  #[error("failed http request: {0}")]
  HttpRequest(#[source] reqwest::Error),

  /// Upstream answered with a non-2xx status.
  #[error("response status is not 200: {0}")]
  Not200(StatusCode),

  /// The body could not be read or parsed into a document.
  #[error("failed parsing body: {0}")]
  ParseBody(String),

  /// A JSON-backed endpoint returned a payload that does not decode.
  #[error("failed decoding json: {0}")]
  DecodeJson(String),

  /// The cache backend could not be opened. Only raised at construction.
  #[error("failed initiating cache: {0}")]
  InitCache(String),

  /// The request was rejected before any I/O.
  #[error(transparent)]
  Invalid(#[from] ValidationError),
}

impl Error {
  /// Shorthand for an upstream not-found.
  pub fn not_found() -> Self {
    Error::Not200(StatusCode::NOT_FOUND)
  }

  /// The HTTP-style status this error maps to.
  pub fn status(&self) -> StatusCode {
    match self {
      Error::Not200(code) => *code,
      Error::Invalid(_) => StatusCode::BAD_REQUEST,
      _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  /// Whether this is exactly an upstream not-found.
  pub fn is_not_found(&self) -> bool {
    matches!(self, Error::Not200(code) if *code == StatusCode::NOT_FOUND)
  }
}

/// Reasons a request is rejected by the validator.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
  #[error("invalid id")]
  InvalidId,
  #[error("invalid page")]
  InvalidPage,
  #[error("invalid type")]
  InvalidType,
  #[error("invalid username")]
  InvalidUsername,
  #[error("invalid score")]
  InvalidScore,
  #[error("invalid status")]
  InvalidStatus,
  #[error("invalid order")]
  InvalidOrder,
  #[error("invalid season")]
  InvalidSeason,
  #[error("invalid year")]
  InvalidYear,
  #[error("invalid rating")]
  InvalidRating,
  #[error("search term must be at least 3 letters")]
  ThreeLetterMinimum,
  #[error("first letter filter must be a single character")]
  InvalidFirstLetter,
  #[error("invalid producer id")]
  InvalidProducer,
  #[error("invalid magazine id")]
  InvalidMagazine,
  #[error("invalid genre id")]
  InvalidGenre,
  #[error("invalid tag")]
  InvalidTag,
  #[error("invalid club category")]
  InvalidClubCategory,
  #[error("invalid sort type")]
  InvalidSortType,
  #[error("invalid gender")]
  InvalidGender,
  #[error("invalid age")]
  InvalidAge,
}

/// Access to the HTTP-style status of an [`Outcome`].
pub trait OutcomeExt {
  /// `200` for successes, [`Error::status`] otherwise.
  fn status(&self) -> StatusCode;
}

impl<T> OutcomeExt for Outcome<T> {
  fn status(&self) -> StatusCode {
    match self {
      Ok(_) => StatusCode::OK,
      Err(e) => e.status(),
    }
  }
}
