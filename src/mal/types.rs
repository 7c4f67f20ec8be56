//! Records returned by the catalogue operations.
//!
//! Every type round-trips through JSON so the memoizing layer can store it.
//! Dates use [`NormalizedDate`], where unknown parts are `0`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use crate::date::NormalizedDate;

// ============================================================================
// Shared building blocks
// ============================================================================

/// Named reference to another entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
  pub id: i64,
  pub name: String,
}

/// Reference list entry (genre, producer, magazine)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemCount {
  pub id: i64,
  pub name: String,
  pub count: i64,
}

/// Entry in a person or character listing, with what they did there
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Role {
  pub id: i64,
  pub name: String,
  pub image: String,
  pub role: String,
}

/// Anime or manga an item points at
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Source {
  pub id: i64,
  pub title: String,
  pub image: String,
  #[serde(rename = "type")]
  pub kind: String, // "anime" or "manga"
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
  pub start: NormalizedDate,
  pub end: NormalizedDate,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlternativeTitles {
  pub english: String,
  pub japanese: String,
  pub synonym: String,
}

/// Related entries grouped by relation ("Sequel", "Adaptation", ...)
pub type Related = BTreeMap<String, Vec<Source>>;

// ============================================================================
// Anime & manga
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Anime {
  pub id: i64,
  pub title: String,
  pub alternative_titles: AlternativeTitles,
  pub image: String,
  pub video: String,
  pub synopsis: String,
  pub score: f64,
  pub voter: i64,
  pub rank: i64,
  pub popularity: i64,
  pub member: i64,
  pub favorite: i64,
  #[serde(rename = "type")]
  pub kind: String,
  pub episode: i64,
  pub status: String,
  pub airing: DateRange,
  pub premiered: String,
  pub broadcast: String,
  pub producers: Vec<Item>,
  pub licensors: Vec<Item>,
  pub studios: Vec<Item>,
  pub source: String,
  pub genres: Vec<Item>,
  /// Seconds per episode
  pub duration: u64,
  pub rating: String,
  pub related: Related,
  pub openings: Vec<String>,
  pub endings: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manga {
  pub id: i64,
  pub title: String,
  pub alternative_titles: AlternativeTitles,
  pub image: String,
  pub synopsis: String,
  pub score: f64,
  pub voter: i64,
  pub rank: i64,
  pub popularity: i64,
  pub member: i64,
  pub favorite: i64,
  #[serde(rename = "type")]
  pub kind: String,
  pub volume: i64,
  pub chapter: i64,
  pub status: String,
  pub publishing: DateRange,
  pub genres: Vec<Item>,
  pub authors: Vec<Role>,
  pub serializations: Vec<Item>,
  pub related: Related,
}

/// Character appearing in an anime, with its voice actors
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimeCharacter {
  pub id: i64,
  pub name: String,
  pub image: String,
  pub role: String,
  pub voice_actors: Vec<Role>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Episode {
  pub episode: i64,
  pub title: String,
  pub japanese_title: String,
  pub aired: NormalizedDate,
  pub tag: String, // "filler", "recap" or empty
  pub link: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoLink {
  pub title: String,
  pub link: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Video {
  pub episodes: Vec<VideoLink>,
  pub promotions: Vec<VideoLink>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
  pub current: i64,
  pub completed: i64,
  pub on_hold: i64,
  pub dropped: i64,
  pub planned: i64,
  pub total: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreCount {
  pub score: u8,
  pub vote: i64,
  pub percent: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
  pub summary: StatsSummary,
  pub scores: Vec<ScoreCount>,
}

/// Anime in a list page (season, genre, producer)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimeItem {
  pub id: i64,
  pub title: String,
  pub image: String,
  pub synopsis: String,
  pub genres: Vec<Item>,
  pub source: String,
  pub producers: Vec<Item>,
  pub episode: i64,
  pub licensors: Vec<String>,
  #[serde(rename = "type")]
  pub kind: String,
  pub start_date: NormalizedDate,
  pub member: i64,
  pub score: f64,
}

/// Manga in a list page (genre, magazine)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MangaItem {
  pub id: i64,
  pub title: String,
  pub image: String,
  pub synopsis: String,
  pub genres: Vec<Item>,
  pub authors: Vec<Item>,
  pub volume: i64,
  pub serializations: Vec<String>,
  #[serde(rename = "type")]
  pub kind: String,
  pub start_date: NormalizedDate,
  pub member: i64,
  pub score: f64,
}

// ============================================================================
// Characters & people
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Character {
  pub id: i64,
  pub image: String,
  pub nickname: String,
  pub name: String,
  pub japanese_name: String,
  pub favorite: i64,
  pub about: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct People {
  pub id: i64,
  pub name: String,
  pub image: String,
  pub given_name: String,
  pub family_name: String,
  pub alternative_names: Vec<String>,
  pub birthday: NormalizedDate,
  pub website: String,
  pub favorite: i64,
  pub more: String,
}

/// Character voiced by a person, and where
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeopleCharacter {
  pub anime: Role,
  pub character: Role,
}

// ============================================================================
// Articles, news, reviews, recommendations
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleItem {
  pub id: i64,
  pub title: String,
  pub image: String,
  pub summary: String,
  pub username: String,
  pub view: i64,
  pub spoiler: bool,
  pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
  pub id: i64,
  pub title: String,
  pub summary: String,
  pub content: String,
  pub username: String,
  pub view: i64,
  pub date: NormalizedDate,
  pub spoiler: bool,
  pub related: Vec<Source>,
  pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleTagItem {
  pub name: String,
  pub tag: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
  pub id: i64,
  pub title: String,
  pub image: String,
  pub content: String,
  pub date: NormalizedDate,
  pub username: String,
  pub forum_id: i64,
  pub comment: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct News {
  pub id: i64,
  pub title: String,
  pub content: String,
  pub date: NormalizedDate,
  pub username: String,
  pub forum_id: i64,
  pub comment: i64,
  pub related: Vec<Source>,
  pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsTagItem {
  pub name: String,
  pub tag: String,
  pub description: String,
}

/// News tags grouped by section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsTag {
  pub anime: Vec<NewsTagItem>,
  pub manga: Vec<NewsTagItem>,
  pub people: Vec<NewsTagItem>,
  pub music: Vec<NewsTagItem>,
  pub event: Vec<NewsTagItem>,
  pub industry: Vec<NewsTagItem>,
}

impl NewsTag {
  /// Every tag across all sections.
  pub fn all(&self) -> impl Iterator<Item = &NewsTagItem> {
    self
      .anime
      .iter()
      .chain(&self.manga)
      .chain(&self.people)
      .chain(&self.music)
      .chain(&self.event)
      .chain(&self.industry)
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Review {
  pub id: i64,
  pub username: String,
  pub image: String,
  pub source: Source,
  pub helpful: i64,
  pub date: NormalizedDate,
  /// Episodes or chapters seen when writing, e.g. "12 of 24"
  pub progress: String,
  /// Per-category scores; "overall" is always present
  pub score: BTreeMap<String, i32>,
  pub review: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
  pub source: Source,
  pub recommended: Source,
  pub users: Vec<RecommendationUser>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationUser {
  pub username: String,
  pub content: String,
  pub date: NormalizedDate,
}

// ============================================================================
// Clubs
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClubItem {
  pub id: i64,
  pub name: String,
  pub member: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Club {
  pub id: i64,
  pub name: String,
  pub image: String,
  pub information: String,
  pub category: String,
  #[serde(rename = "type")]
  pub kind: String, // "public", "private", "secret"
  pub member: i64,
  pub picture: i64,
  pub created: NormalizedDate,
  pub admins: Vec<Item>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClubMember {
  pub username: String,
  pub image: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClubRelated {
  pub anime: Vec<Item>,
  pub manga: Vec<Item>,
  pub character: Vec<Item>,
}

// ============================================================================
// Top lists
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopAnime {
  pub rank: i64,
  pub id: i64,
  pub title: String,
  pub image: String,
  #[serde(rename = "type")]
  pub kind: String,
  pub episode: i64,
  pub aired: DateRange,
  pub member: i64,
  pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopManga {
  pub rank: i64,
  pub id: i64,
  pub title: String,
  pub image: String,
  #[serde(rename = "type")]
  pub kind: String,
  pub volume: i64,
  pub published: DateRange,
  pub member: i64,
  pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopCharacter {
  pub rank: i64,
  pub id: i64,
  pub name: String,
  pub japanese_name: String,
  pub image: String,
  pub favorite: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopPeople {
  pub rank: i64,
  pub id: i64,
  pub name: String,
  pub japanese_name: String,
  pub image: String,
  pub birthday: NormalizedDate,
  pub favorite: i64,
}

// ============================================================================
// Search results
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimeSearch {
  pub id: i64,
  pub title: String,
  pub image: String,
  pub summary: String,
  #[serde(rename = "type")]
  pub kind: String,
  pub episode: i64,
  pub score: f64,
  pub aired: DateRange,
  pub member: i64,
  pub rated: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MangaSearch {
  pub id: i64,
  pub title: String,
  pub image: String,
  pub summary: String,
  #[serde(rename = "type")]
  pub kind: String,
  pub volume: i64,
  pub chapter: i64,
  pub score: f64,
  pub published: DateRange,
  pub member: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterSearch {
  pub id: i64,
  pub image: String,
  pub name: String,
  pub nickname: String,
  pub anime: Vec<Item>,
  pub manga: Vec<Item>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeopleSearch {
  pub id: i64,
  pub image: String,
  pub name: String,
  pub nickname: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClubSearch {
  pub id: i64,
  pub name: String,
  pub image: String,
  pub summary: String,
  pub creator: String,
  pub member: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSearch {
  pub username: String,
  pub image: String,
  pub last_online: NormalizedDate,
}

// ============================================================================
// Users
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
  pub username: String,
  pub image: String,
  pub last_online: NormalizedDate,
  pub gender: String,
  pub birthday: NormalizedDate,
  pub location: String,
  pub joined_date: NormalizedDate,
  pub forum_post: i64,
  pub review: i64,
  pub recommendation: i64,
  pub blog_post: i64,
  pub club: i64,
  pub friend: i64,
  pub about: String,
}

/// Totals for one of the user's lists
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserListStats {
  pub days: f64,
  pub mean_score: f64,
  pub summary: StatsSummary,
  pub rewatched: i64,
  /// Episodes or chapters
  pub consumed: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
  pub anime: UserListStats,
  pub manga: UserListStats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserFavorite {
  pub anime: Vec<Item>,
  pub manga: Vec<Item>,
  pub character: Vec<Item>,
  pub people: Vec<Item>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserFriend {
  pub username: String,
  pub image: String,
  pub last_online: NormalizedDate,
  pub friend_since: NormalizedDate,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserHistory {
  pub id: i64,
  pub title: String,
  #[serde(rename = "type")]
  pub kind: String,
  pub progress: i64,
  pub date: NormalizedDate,
}

/// Entry of a user's anime list (decoded from the list's JSON payload)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserAnime {
  pub id: i64,
  pub title: String,
  pub image: String,
  pub score: i32,
  pub status: i32,
  #[serde(rename = "type")]
  pub kind: String,
  pub progress: i64,
  pub episode: i64,
  pub tags: String,
  pub airing_status: i32,
  pub start_date: NormalizedDate,
  pub end_date: NormalizedDate,
  pub priority: String,
  pub is_rewatching: bool,
}

/// Entry of a user's manga list (decoded from the list's JSON payload)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserManga {
  pub id: i64,
  pub title: String,
  pub image: String,
  pub score: i32,
  pub status: i32,
  #[serde(rename = "type")]
  pub kind: String,
  pub read_chapter: i64,
  pub read_volume: i64,
  pub chapter: i64,
  pub volume: i64,
  pub tags: String,
  pub publishing_status: i32,
  pub start_date: NormalizedDate,
  pub end_date: NormalizedDate,
  pub priority: String,
  pub is_rereading: bool,
}
