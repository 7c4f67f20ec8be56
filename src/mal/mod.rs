//! Catalogue access: the capability trait, its decorators and the fetcher
//! the extraction service is built on.

pub mod api;
pub mod cache;
pub mod cached_client;
pub mod client;
pub mod query;
pub mod types;
pub mod validator;

#[cfg(test)]
pub(crate) mod testing;

pub use api::Api;
pub use cached_client::CachedApi;
pub use client::Fetcher;
pub use validator::Validator;
