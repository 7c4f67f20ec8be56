//! Cache keys shared by the memoizing and validating layers.

use crate::cache::{CacheKey, KeyArg};

use super::query::MediaType;

/// Entity kinds that can be remembered as not found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entity {
  Anime,
  Manga,
  Character,
  People,
  Article,
  Club,
  News,
  Review,
  User,
}

impl Entity {
  fn as_str(&self) -> &'static str {
    match self {
      Self::Anime => "anime",
      Self::Manga => "manga",
      Self::Character => "character",
      Self::People => "people",
      Self::Article => "article",
      Self::Club => "club",
      Self::News => "news",
      Self::Review => "review",
      Self::User => "user",
    }
  }

  /// Marker key recording that `id` of this kind was not found.
  pub fn empty_key(&self, id: impl KeyArg) -> CacheKey {
    CacheKey::new("empty").arg(self.as_str()).arg(id)
  }
}

impl From<MediaType> for Entity {
  fn from(media: MediaType) -> Self {
    match media {
      MediaType::Anime => Self::Anime,
      MediaType::Manga => Self::Manga,
    }
  }
}

// Reference lists. The validator reads what the memoizing layer wrote.

pub fn producers_key() -> CacheKey {
  CacheKey::new("producers")
}

pub fn magazines_key() -> CacheKey {
  CacheKey::new("magazines")
}

pub fn genres_key(media: &str) -> CacheKey {
  CacheKey::new("genres").arg(media)
}

pub fn article_tag_key() -> CacheKey {
  CacheKey::new("article-tag")
}

pub fn news_tag_key() -> CacheKey {
  CacheKey::new("news-tag")
}
