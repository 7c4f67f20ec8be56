//! Query descriptors, code tables and their wire mapping.
//!
//! Descriptors carry raw caller input (`i32` codes, free text). The validator
//! checks them against the tables here; the extraction layer turns them into
//! query pairs with the `*_pairs` methods.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::cache::KeyArg;

/// Results per page on the advanced search pages.
pub const SEARCH_PAGE_SIZE: i32 = 50;
/// Results per page on the user search page.
pub const USER_SEARCH_PAGE_SIZE: i32 = 24;
/// Entries per chunk of a user list payload.
pub const USER_LIST_PAGE_SIZE: i32 = 300;
/// Page sentinel asking for every page of a user list.
pub const ALL_PAGES: i32 = -1;

// ============================================================================
// Enumerations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
  Anime,
  Manga,
}

impl MediaType {
  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "anime" => Some(Self::Anime),
      "manga" => Some(Self::Manga),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Anime => "anime",
      Self::Manga => "manga",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
  Winter,
  Spring,
  Summer,
  Fall,
}

impl Season {
  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "winter" => Some(Self::Winter),
      "spring" => Some(Self::Spring),
      "summer" => Some(Self::Summer),
      "fall" => Some(Self::Fall),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Winter => "winter",
      Self::Spring => "spring",
      Self::Summer => "summer",
      Self::Fall => "fall",
    }
  }
}

/// Review listing flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewType {
  Anime,
  Manga,
  BestVoted,
}

impl ReviewType {
  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "anime" => Some(Self::Anime),
      "manga" => Some(Self::Manga),
      "bestvoted" => Some(Self::BestVoted),
      _ => None,
    }
  }
}

// ============================================================================
// Code tables
// ============================================================================

/// Anime search type: any, TV, OVA, movie, special, ONA, music.
pub const ANIME_SEARCH_TYPES: RangeInclusive<i32> = 0..=6;
/// Manga search type: any, manga, light novel, one-shot, doujinshi, manhwa, manhua, novel.
pub const MANGA_SEARCH_TYPES: RangeInclusive<i32> = 0..=7;
pub const SEARCH_SCORES: RangeInclusive<i32> = 0..=10;
/// Any, airing, finished, not yet aired.
pub const ANIME_SEARCH_STATUSES: RangeInclusive<i32> = 0..=3;
/// Any, publishing, finished, not yet published, on hiatus, discontinued.
pub const MANGA_SEARCH_STATUSES: RangeInclusive<i32> = 0..=5;
/// Any, G, PG, PG-13, R, R+, Rx.
pub const SEARCH_RATINGS: RangeInclusive<i32> = 0..=6;
pub const CLUB_CATEGORIES: RangeInclusive<i32> = 0..=12;
/// Default, name, comments, posts, members.
pub const CLUB_SORTS: RangeInclusive<i32> = 0..=4;
/// Any, male, female, non-binary.
pub const GENDERS: RangeInclusive<i32> = 0..=3;
/// All (0 or 7), current, completed, on hold, dropped, planned (6).
pub const USER_LIST_STATUSES: [i32; 7] = [0, 1, 2, 3, 4, 6, 7];
/// Default order, then the list columns in page order.
pub const USER_LIST_ORDERS: RangeInclusive<i32> = 0..=16;

const TOP_ANIME_TYPES: [&str; 10] = [
  "", "airing", "upcoming", "tv", "movie", "ova", "ona", "special", "bypopularity", "favorite",
];
const TOP_MANGA_TYPES: [&str; 10] = [
  "", "manga", "oneshots", "doujin", "lightnovels", "novels", "manhwa", "manhua", "bypopularity",
  "favorite",
];

/// Wire value of a top-anime type code.
pub fn top_anime_type(code: i32) -> Option<&'static str> {
  usize::try_from(code).ok().and_then(|i| TOP_ANIME_TYPES.get(i).copied())
}

/// Wire value of a top-manga type code.
pub fn top_manga_type(code: i32) -> Option<&'static str> {
  usize::try_from(code).ok().and_then(|i| TOP_MANGA_TYPES.get(i).copied())
}

// ============================================================================
// Descriptors
// ============================================================================

/// Advanced anime/manga search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
  pub title: String,
  /// 0 means the first page
  pub page: i32,
  #[serde(rename = "type")]
  pub kind: i32,
  pub score: i32,
  pub status: i32,
  /// Anime only, 0 for any
  pub producer_id: i64,
  /// Manga only, 0 for any
  pub magazine_id: i64,
  /// Anime only
  pub rating: i32,
  pub start_date: Option<NaiveDate>,
  pub end_date: Option<NaiveDate>,
  /// Treat `genre_ids` as exclusions
  pub exclude_genre: bool,
  pub genre_ids: Vec<i64>,
  pub first_letter: String,
}

impl Query {
  /// Wire query for the `media` search page.
  pub fn query_pairs(&self, media: MediaType) -> Vec<(&'static str, String)> {
    let mut pairs = vec![("q", self.title.clone())];
    push_nonzero(&mut pairs, "type", self.kind);
    push_nonzero(&mut pairs, "score", self.score);
    push_nonzero(&mut pairs, "status", self.status);
    match media {
      MediaType::Anime => {
        push_nonzero(&mut pairs, "p", self.producer_id);
        push_nonzero(&mut pairs, "r", self.rating);
      }
      MediaType::Manga => push_nonzero(&mut pairs, "mid", self.magazine_id),
    }
    push_date(&mut pairs, ["sd", "sm", "sy"], self.start_date);
    push_date(&mut pairs, ["ed", "em", "ey"], self.end_date);
    if self.exclude_genre {
      pairs.push(("gx", "1".to_string()));
    }
    for id in &self.genre_ids {
      pairs.push(("genre[]", id.to_string()));
    }
    if !self.first_letter.is_empty() {
      pairs.push(("letter", self.first_letter.clone()));
    }
    push_offset(&mut pairs, "show", self.page, SEARCH_PAGE_SIZE);
    pairs
  }
}

/// Club search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClubQuery {
  pub name: String,
  pub page: i32,
  pub category: i32,
  pub sort: i32,
}

impl ClubQuery {
  pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
    let mut pairs = vec![
      ("action", "find".to_string()),
      ("cat", "club".to_string()),
      ("q", self.name.clone()),
    ];
    push_nonzero(&mut pairs, "catid", self.category);
    push_nonzero(&mut pairs, "sort", self.sort);
    if self.page > 1 {
      pairs.push(("p", self.page.to_string()));
    }
    pairs
  }
}

impl KeyArg for ClubQuery {
  fn write_key(&self, out: &mut String) {
    write_fields(out, &[&self.name, &self.page, &self.category, &self.sort]);
  }
}

/// User search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserQuery {
  pub username: String,
  pub page: i32,
  pub location: String,
  pub min_age: i32,
  pub max_age: i32,
  pub gender: i32,
}

impl UserQuery {
  pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
    let mut pairs = vec![("q", self.username.clone())];
    if !self.location.is_empty() {
      pairs.push(("loc", self.location.clone()));
    }
    push_nonzero(&mut pairs, "agelow", self.min_age);
    push_nonzero(&mut pairs, "agehigh", self.max_age);
    push_nonzero(&mut pairs, "g", self.gender);
    push_offset(&mut pairs, "show", self.page, USER_SEARCH_PAGE_SIZE);
    pairs
  }
}

impl KeyArg for UserQuery {
  fn write_key(&self, out: &mut String) {
    write_fields(
      out,
      &[
        &self.username,
        &self.page,
        &self.location,
        &self.min_age,
        &self.max_age,
        &self.gender,
      ],
    );
  }
}

/// A user's anime or manga list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserListQuery {
  pub username: String,
  /// 0 means the first page, [`ALL_PAGES`] every page
  pub page: i32,
  pub status: i32,
  pub order: i32,
  pub tag: String,
}

impl UserListQuery {
  /// Wire query for one chunk of the list payload.
  pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
    // 0 and 7 both mean every status on the wire
    let status = if self.status == 0 { 7 } else { self.status };
    let mut pairs = vec![("status", status.to_string())];
    push_nonzero(&mut pairs, "order", self.order);
    if !self.tag.is_empty() {
      pairs.push(("tag", self.tag.clone()));
    }
    if self.page != ALL_PAGES {
      push_offset(&mut pairs, "offset", self.page, USER_LIST_PAGE_SIZE);
    }
    pairs
  }
}

impl KeyArg for UserListQuery {
  fn write_key(&self, out: &mut String) {
    write_fields(
      out,
      &[&self.username, &self.page, &self.status, &self.order, &self.tag],
    );
  }
}

fn push_nonzero<T: PartialEq + Default + ToString>(
  pairs: &mut Vec<(&'static str, String)>,
  name: &'static str,
  value: T,
) {
  if value != T::default() {
    pairs.push((name, value.to_string()));
  }
}

fn push_date(
  pairs: &mut Vec<(&'static str, String)>,
  [day, month, year]: [&'static str; 3],
  date: Option<NaiveDate>,
) {
  if let Some(d) = date {
    pairs.push((day, d.day().to_string()));
    pairs.push((month, d.month().to_string()));
    pairs.push((year, d.year().to_string()));
  }
}

fn push_offset(pairs: &mut Vec<(&'static str, String)>, name: &'static str, page: i32, size: i32) {
  if page > 1 {
    let offset = (i64::from(page) - 1) * i64::from(size);
    pairs.push((name, offset.to_string()));
  }
}

/// Positional fields of a descriptor, colon-separated like the key itself.
fn write_fields(out: &mut String, fields: &[&dyn KeyArg]) {
  for (i, field) in fields.iter().enumerate() {
    if i > 0 {
      out.push(':');
    }
    field.write_key(out);
  }
}
