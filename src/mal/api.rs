//! The capability interface shared by the extraction service and the
//! decorators in front of it.

use async_trait::async_trait;

use crate::error::Outcome;

use super::query::{ClubQuery, Query, UserListQuery, UserQuery};
use super::types::*;

/// One method per catalogue resource.
///
/// Ids are positive, pages start at 1. `kind`/`media` strings are
/// `"anime"` or `"manga"` unless noted otherwise. Implementations must be
/// callable concurrently.
#[async_trait]
pub trait Api: Send + Sync {
  // Anime
  async fn get_anime(&self, id: i64) -> Outcome<Anime>;
  async fn get_anime_character(&self, id: i64) -> Outcome<Vec<AnimeCharacter>>;
  async fn get_anime_staff(&self, id: i64) -> Outcome<Vec<Role>>;
  async fn get_anime_video(&self, id: i64, page: i32) -> Outcome<Video>;
  async fn get_anime_episode(&self, id: i64, page: i32) -> Outcome<Vec<Episode>>;
  async fn get_anime_stats(&self, id: i64) -> Outcome<Stats>;
  async fn get_anime_review(&self, id: i64, page: i32) -> Outcome<Vec<Review>>;
  async fn get_anime_recommendation(&self, id: i64) -> Outcome<Vec<Recommendation>>;
  async fn get_anime_news(&self, id: i64) -> Outcome<Vec<NewsItem>>;
  async fn get_anime_article(&self, id: i64) -> Outcome<Vec<ArticleItem>>;
  async fn get_anime_club(&self, id: i64) -> Outcome<Vec<ClubItem>>;
  async fn get_anime_picture(&self, id: i64) -> Outcome<Vec<String>>;
  async fn get_anime_more_info(&self, id: i64) -> Outcome<String>;

  // Manga
  async fn get_manga(&self, id: i64) -> Outcome<Manga>;
  async fn get_manga_character(&self, id: i64) -> Outcome<Vec<Role>>;
  async fn get_manga_stats(&self, id: i64) -> Outcome<Stats>;
  async fn get_manga_review(&self, id: i64, page: i32) -> Outcome<Vec<Review>>;
  async fn get_manga_recommendation(&self, id: i64) -> Outcome<Vec<Recommendation>>;
  async fn get_manga_news(&self, id: i64) -> Outcome<Vec<NewsItem>>;
  async fn get_manga_article(&self, id: i64) -> Outcome<Vec<ArticleItem>>;
  async fn get_manga_club(&self, id: i64) -> Outcome<Vec<ClubItem>>;
  async fn get_manga_picture(&self, id: i64) -> Outcome<Vec<String>>;
  async fn get_manga_more_info(&self, id: i64) -> Outcome<String>;

  // Character
  async fn get_character(&self, id: i64) -> Outcome<Character>;
  async fn get_character_article(&self, id: i64) -> Outcome<Vec<ArticleItem>>;
  /// Animeography or mangaography, by `kind`.
  async fn get_character_ography(&self, kind: &str, id: i64) -> Outcome<Vec<Role>>;
  async fn get_character_picture(&self, id: i64) -> Outcome<Vec<String>>;
  async fn get_character_club(&self, id: i64) -> Outcome<Vec<ClubItem>>;
  async fn get_character_va(&self, id: i64) -> Outcome<Vec<Role>>;

  // People
  async fn get_people(&self, id: i64) -> Outcome<People>;
  async fn get_people_character(&self, id: i64) -> Outcome<Vec<PeopleCharacter>>;
  async fn get_people_staff(&self, id: i64) -> Outcome<Vec<Role>>;
  async fn get_people_manga(&self, id: i64) -> Outcome<Vec<Role>>;
  async fn get_people_news(&self, id: i64) -> Outcome<Vec<NewsItem>>;
  async fn get_people_article(&self, id: i64) -> Outcome<Vec<ArticleItem>>;
  async fn get_people_picture(&self, id: i64) -> Outcome<Vec<String>>;

  // Producers, magazines, genres
  async fn get_producers(&self) -> Outcome<Vec<ItemCount>>;
  async fn get_producer(&self, id: i64, page: i32) -> Outcome<Vec<AnimeItem>>;
  async fn get_magazines(&self) -> Outcome<Vec<ItemCount>>;
  async fn get_magazine(&self, id: i64, page: i32) -> Outcome<Vec<MangaItem>>;
  async fn get_genres(&self, media: &str) -> Outcome<Vec<ItemCount>>;
  async fn get_anime_with_genre(&self, id: i64, page: i32) -> Outcome<Vec<AnimeItem>>;
  async fn get_manga_with_genre(&self, id: i64, page: i32) -> Outcome<Vec<MangaItem>>;

  // Reviews & recommendations
  async fn get_review(&self, id: i64) -> Outcome<Review>;
  /// `kind` is `"anime"`, `"manga"` or `"bestvoted"`.
  async fn get_reviews(&self, kind: &str, page: i32) -> Outcome<Vec<Review>>;
  async fn get_recommendation(&self, kind: &str, id1: i64, id2: i64) -> Outcome<Recommendation>;
  async fn get_recommendations(&self, kind: &str, page: i32) -> Outcome<Vec<Recommendation>>;

  // Articles & news. An empty tag means every tag.
  async fn get_article(&self, id: i64) -> Outcome<Article>;
  async fn get_articles(&self, page: i32, tag: &str) -> Outcome<Vec<ArticleItem>>;
  async fn get_article_tag(&self) -> Outcome<Vec<ArticleTagItem>>;
  async fn get_news(&self, id: i64) -> Outcome<News>;
  async fn get_news_list(&self, page: i32, tag: &str) -> Outcome<Vec<NewsItem>>;
  async fn get_news_tag(&self) -> Outcome<NewsTag>;

  // Clubs
  async fn get_clubs(&self, page: i32) -> Outcome<Vec<ClubSearch>>;
  async fn get_club(&self, id: i64) -> Outcome<Club>;
  async fn get_club_member(&self, id: i64, page: i32) -> Outcome<Vec<ClubMember>>;
  async fn get_club_picture(&self, id: i64) -> Outcome<Vec<String>>;
  async fn get_club_related(&self, id: i64) -> Outcome<ClubRelated>;

  // Seasons & top lists
  async fn get_season(&self, season: &str, year: i32) -> Outcome<Vec<AnimeItem>>;
  async fn get_top_anime(&self, kind: i32, page: i32) -> Outcome<Vec<TopAnime>>;
  async fn get_top_manga(&self, kind: i32, page: i32) -> Outcome<Vec<TopManga>>;
  async fn get_top_character(&self, page: i32) -> Outcome<Vec<TopCharacter>>;
  async fn get_top_people(&self, page: i32) -> Outcome<Vec<TopPeople>>;

  // Users
  async fn get_user(&self, username: &str) -> Outcome<User>;
  async fn get_user_stats(&self, username: &str) -> Outcome<UserStats>;
  async fn get_user_favorite(&self, username: &str) -> Outcome<UserFavorite>;
  async fn get_user_friend(&self, username: &str, page: i32) -> Outcome<Vec<UserFriend>>;
  /// `kind` may also be empty for both lists.
  async fn get_user_history(&self, username: &str, kind: &str) -> Outcome<Vec<UserHistory>>;
  async fn get_user_review(&self, username: &str, page: i32) -> Outcome<Vec<Review>>;
  async fn get_user_recommendation(&self, username: &str, page: i32)
    -> Outcome<Vec<Recommendation>>;
  async fn get_user_club(&self, username: &str) -> Outcome<Vec<Item>>;
  async fn get_user_anime(&self, query: &UserListQuery) -> Outcome<Vec<UserAnime>>;
  async fn get_user_manga(&self, query: &UserListQuery) -> Outcome<Vec<UserManga>>;

  // Search
  async fn search_anime(&self, query: &Query) -> Outcome<Vec<AnimeSearch>>;
  async fn search_manga(&self, query: &Query) -> Outcome<Vec<MangaSearch>>;
  async fn search_character(&self, name: &str, page: i32) -> Outcome<Vec<CharacterSearch>>;
  async fn search_people(&self, name: &str, page: i32) -> Outcome<Vec<PeopleSearch>>;
  async fn search_club(&self, query: &ClubQuery) -> Outcome<Vec<ClubSearch>>;
  async fn search_user(&self, query: &UserQuery) -> Outcome<Vec<UserSearch>>;
}
