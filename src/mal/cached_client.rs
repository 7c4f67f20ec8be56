//! Memoizing decorator that wraps any [`Api`] with a key/value cache.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use tracing::{trace, Span};

use crate::cache::{CacheKey, Store};
use crate::error::Outcome;

use super::api::Api;
use super::cache::{article_tag_key, genres_key, magazines_key, news_tag_key, producers_key};
use super::query::{ClubQuery, Query, UserListQuery, UserQuery};
use super::types::*;

/// Api with transparent caching.
///
/// Successful results are stored under `mal:<tag>[:<arg>]*` and served from
/// the cache until they expire. Failures are never cached. Free-text anime
/// and manga searches always go to the inner api.
pub struct CachedApi {
  inner: Box<dyn Api>,
  store: Store,
  span: Span,
}

impl CachedApi {
  pub fn new(inner: Box<dyn Api>, store: Store) -> Self {
    Self {
      inner,
      store,
      span: tracing::debug_span!("cacher"),
    }
  }

  /// Serve `key` from the cache, or run `fetch` and store its success.
  async fn execute<T, F, Fut>(&self, key: CacheKey, fetch: F) -> Outcome<T>
  where
    T: Serialize + DeserializeOwned + Send,
    F: FnOnce() -> Fut + Send,
    Fut: Future<Output = Outcome<T>> + Send,
  {
    if let Some(data) = self.store.get::<T>(key.as_str()) {
      return Ok(data);
    }

    trace!(parent: &self.span, key = key.as_str(), "cache miss, delegating");
    let data = fetch().await?;
    self.store.set(key.as_str(), &data);
    Ok(data)
  }
}

#[async_trait]
impl Api for CachedApi {
  // Anime

  async fn get_anime(&self, id: i64) -> Outcome<Anime> {
    let key = CacheKey::new("anime").arg(id);
    self.execute(key, || self.inner.get_anime(id)).await
  }

  async fn get_anime_character(&self, id: i64) -> Outcome<Vec<AnimeCharacter>> {
    let key = CacheKey::new("anime-character").arg(id);
    self.execute(key, || self.inner.get_anime_character(id)).await
  }

  async fn get_anime_staff(&self, id: i64) -> Outcome<Vec<Role>> {
    let key = CacheKey::new("anime-staff").arg(id);
    self.execute(key, || self.inner.get_anime_staff(id)).await
  }

  async fn get_anime_video(&self, id: i64, page: i32) -> Outcome<Video> {
    let key = CacheKey::new("anime-video").arg(id).arg(page);
    self.execute(key, || self.inner.get_anime_video(id, page)).await
  }

  async fn get_anime_episode(&self, id: i64, page: i32) -> Outcome<Vec<Episode>> {
    let key = CacheKey::new("anime-episode").arg(id).arg(page);
    self.execute(key, || self.inner.get_anime_episode(id, page)).await
  }

  async fn get_anime_stats(&self, id: i64) -> Outcome<Stats> {
    let key = CacheKey::new("anime-stats").arg(id);
    self.execute(key, || self.inner.get_anime_stats(id)).await
  }

  async fn get_anime_review(&self, id: i64, page: i32) -> Outcome<Vec<Review>> {
    let key = CacheKey::new("anime-review").arg(id).arg(page);
    self.execute(key, || self.inner.get_anime_review(id, page)).await
  }

  async fn get_anime_recommendation(&self, id: i64) -> Outcome<Vec<Recommendation>> {
    let key = CacheKey::new("anime-recommendation").arg(id);
    self
      .execute(key, || self.inner.get_anime_recommendation(id))
      .await
  }

  async fn get_anime_news(&self, id: i64) -> Outcome<Vec<NewsItem>> {
    let key = CacheKey::new("anime-news").arg(id);
    self.execute(key, || self.inner.get_anime_news(id)).await
  }

  async fn get_anime_article(&self, id: i64) -> Outcome<Vec<ArticleItem>> {
    let key = CacheKey::new("anime-article").arg(id);
    self.execute(key, || self.inner.get_anime_article(id)).await
  }

  async fn get_anime_club(&self, id: i64) -> Outcome<Vec<ClubItem>> {
    let key = CacheKey::new("anime-club").arg(id);
    self.execute(key, || self.inner.get_anime_club(id)).await
  }

  async fn get_anime_picture(&self, id: i64) -> Outcome<Vec<String>> {
    let key = CacheKey::new("anime-picture").arg(id);
    self.execute(key, || self.inner.get_anime_picture(id)).await
  }

  async fn get_anime_more_info(&self, id: i64) -> Outcome<String> {
    let key = CacheKey::new("anime-more-info").arg(id);
    self.execute(key, || self.inner.get_anime_more_info(id)).await
  }

  // Manga

  async fn get_manga(&self, id: i64) -> Outcome<Manga> {
    let key = CacheKey::new("manga").arg(id);
    self.execute(key, || self.inner.get_manga(id)).await
  }

  async fn get_manga_character(&self, id: i64) -> Outcome<Vec<Role>> {
    let key = CacheKey::new("manga-character").arg(id);
    self.execute(key, || self.inner.get_manga_character(id)).await
  }

  async fn get_manga_stats(&self, id: i64) -> Outcome<Stats> {
    let key = CacheKey::new("manga-stats").arg(id);
    self.execute(key, || self.inner.get_manga_stats(id)).await
  }

  async fn get_manga_review(&self, id: i64, page: i32) -> Outcome<Vec<Review>> {
    let key = CacheKey::new("manga-review").arg(id).arg(page);
    self.execute(key, || self.inner.get_manga_review(id, page)).await
  }

  async fn get_manga_recommendation(&self, id: i64) -> Outcome<Vec<Recommendation>> {
    let key = CacheKey::new("manga-recommendation").arg(id);
    self
      .execute(key, || self.inner.get_manga_recommendation(id))
      .await
  }

  async fn get_manga_news(&self, id: i64) -> Outcome<Vec<NewsItem>> {
    let key = CacheKey::new("manga-news").arg(id);
    self.execute(key, || self.inner.get_manga_news(id)).await
  }

  async fn get_manga_article(&self, id: i64) -> Outcome<Vec<ArticleItem>> {
    let key = CacheKey::new("manga-article").arg(id);
    self.execute(key, || self.inner.get_manga_article(id)).await
  }

  async fn get_manga_club(&self, id: i64) -> Outcome<Vec<ClubItem>> {
    let key = CacheKey::new("manga-club").arg(id);
    self.execute(key, || self.inner.get_manga_club(id)).await
  }

  async fn get_manga_picture(&self, id: i64) -> Outcome<Vec<String>> {
    let key = CacheKey::new("manga-picture").arg(id);
    self.execute(key, || self.inner.get_manga_picture(id)).await
  }

  async fn get_manga_more_info(&self, id: i64) -> Outcome<String> {
    let key = CacheKey::new("manga-more-info").arg(id);
    self.execute(key, || self.inner.get_manga_more_info(id)).await
  }

  // Character

  async fn get_character(&self, id: i64) -> Outcome<Character> {
    let key = CacheKey::new("character").arg(id);
    self.execute(key, || self.inner.get_character(id)).await
  }

  async fn get_character_article(&self, id: i64) -> Outcome<Vec<ArticleItem>> {
    let key = CacheKey::new("character-article").arg(id);
    self.execute(key, || self.inner.get_character_article(id)).await
  }

  async fn get_character_ography(&self, kind: &str, id: i64) -> Outcome<Vec<Role>> {
    let key = CacheKey::new("character-ography").arg(kind).arg(id);
    self
      .execute(key, || self.inner.get_character_ography(kind, id))
      .await
  }

  async fn get_character_picture(&self, id: i64) -> Outcome<Vec<String>> {
    let key = CacheKey::new("character-picture").arg(id);
    self.execute(key, || self.inner.get_character_picture(id)).await
  }

  async fn get_character_club(&self, id: i64) -> Outcome<Vec<ClubItem>> {
    let key = CacheKey::new("character-club").arg(id);
    self.execute(key, || self.inner.get_character_club(id)).await
  }

  async fn get_character_va(&self, id: i64) -> Outcome<Vec<Role>> {
    let key = CacheKey::new("character-va").arg(id);
    self.execute(key, || self.inner.get_character_va(id)).await
  }

  // People

  async fn get_people(&self, id: i64) -> Outcome<People> {
    let key = CacheKey::new("people").arg(id);
    self.execute(key, || self.inner.get_people(id)).await
  }

  async fn get_people_character(&self, id: i64) -> Outcome<Vec<PeopleCharacter>> {
    let key = CacheKey::new("people-character").arg(id);
    self.execute(key, || self.inner.get_people_character(id)).await
  }

  async fn get_people_staff(&self, id: i64) -> Outcome<Vec<Role>> {
    let key = CacheKey::new("people-staff").arg(id);
    self.execute(key, || self.inner.get_people_staff(id)).await
  }

  async fn get_people_manga(&self, id: i64) -> Outcome<Vec<Role>> {
    let key = CacheKey::new("people-manga").arg(id);
    self.execute(key, || self.inner.get_people_manga(id)).await
  }

  async fn get_people_news(&self, id: i64) -> Outcome<Vec<NewsItem>> {
    let key = CacheKey::new("people-news").arg(id);
    self.execute(key, || self.inner.get_people_news(id)).await
  }

  async fn get_people_article(&self, id: i64) -> Outcome<Vec<ArticleItem>> {
    let key = CacheKey::new("people-article").arg(id);
    self.execute(key, || self.inner.get_people_article(id)).await
  }

  async fn get_people_picture(&self, id: i64) -> Outcome<Vec<String>> {
    let key = CacheKey::new("people-picture").arg(id);
    self.execute(key, || self.inner.get_people_picture(id)).await
  }

  // Producers, magazines, genres

  async fn get_producers(&self) -> Outcome<Vec<ItemCount>> {
    self.execute(producers_key(), || self.inner.get_producers()).await
  }

  async fn get_producer(&self, id: i64, page: i32) -> Outcome<Vec<AnimeItem>> {
    let key = CacheKey::new("producer").arg(id).arg(page);
    self.execute(key, || self.inner.get_producer(id, page)).await
  }

  async fn get_magazines(&self) -> Outcome<Vec<ItemCount>> {
    self.execute(magazines_key(), || self.inner.get_magazines()).await
  }

  async fn get_magazine(&self, id: i64, page: i32) -> Outcome<Vec<MangaItem>> {
    let key = CacheKey::new("magazine").arg(id).arg(page);
    self.execute(key, || self.inner.get_magazine(id, page)).await
  }

  async fn get_genres(&self, media: &str) -> Outcome<Vec<ItemCount>> {
    self
      .execute(genres_key(media), || self.inner.get_genres(media))
      .await
  }

  async fn get_anime_with_genre(&self, id: i64, page: i32) -> Outcome<Vec<AnimeItem>> {
    let key = CacheKey::new("anime-with-genre").arg(id).arg(page);
    self
      .execute(key, || self.inner.get_anime_with_genre(id, page))
      .await
  }

  async fn get_manga_with_genre(&self, id: i64, page: i32) -> Outcome<Vec<MangaItem>> {
    let key = CacheKey::new("manga-with-genre").arg(id).arg(page);
    self
      .execute(key, || self.inner.get_manga_with_genre(id, page))
      .await
  }

  // Reviews & recommendations

  async fn get_review(&self, id: i64) -> Outcome<Review> {
    let key = CacheKey::new("review").arg(id);
    self.execute(key, || self.inner.get_review(id)).await
  }

  async fn get_reviews(&self, kind: &str, page: i32) -> Outcome<Vec<Review>> {
    let key = CacheKey::new("reviews").arg(kind).arg(page);
    self.execute(key, || self.inner.get_reviews(kind, page)).await
  }

  async fn get_recommendation(&self, kind: &str, id1: i64, id2: i64) -> Outcome<Recommendation> {
    let key = CacheKey::new("recommendation").arg(kind).arg(id1).arg(id2);
    self
      .execute(key, || self.inner.get_recommendation(kind, id1, id2))
      .await
  }

  async fn get_recommendations(&self, kind: &str, page: i32) -> Outcome<Vec<Recommendation>> {
    let key = CacheKey::new("recommendations").arg(kind).arg(page);
    self
      .execute(key, || self.inner.get_recommendations(kind, page))
      .await
  }

  // Articles & news

  async fn get_article(&self, id: i64) -> Outcome<Article> {
    let key = CacheKey::new("article").arg(id);
    self.execute(key, || self.inner.get_article(id)).await
  }

  async fn get_articles(&self, page: i32, tag: &str) -> Outcome<Vec<ArticleItem>> {
    let key = CacheKey::new("article-list").arg(page).arg(tag);
    self.execute(key, || self.inner.get_articles(page, tag)).await
  }

  async fn get_article_tag(&self) -> Outcome<Vec<ArticleTagItem>> {
    self
      .execute(article_tag_key(), || self.inner.get_article_tag())
      .await
  }

  async fn get_news(&self, id: i64) -> Outcome<News> {
    let key = CacheKey::new("news").arg(id);
    self.execute(key, || self.inner.get_news(id)).await
  }

  async fn get_news_list(&self, page: i32, tag: &str) -> Outcome<Vec<NewsItem>> {
    let key = CacheKey::new("news-list").arg(page).arg(tag);
    self.execute(key, || self.inner.get_news_list(page, tag)).await
  }

  async fn get_news_tag(&self) -> Outcome<NewsTag> {
    self
      .execute(news_tag_key(), || self.inner.get_news_tag())
      .await
  }

  // Clubs

  async fn get_clubs(&self, page: i32) -> Outcome<Vec<ClubSearch>> {
    let key = CacheKey::new("clubs").arg(page);
    self.execute(key, || self.inner.get_clubs(page)).await
  }

  async fn get_club(&self, id: i64) -> Outcome<Club> {
    let key = CacheKey::new("club").arg(id);
    self.execute(key, || self.inner.get_club(id)).await
  }

  async fn get_club_member(&self, id: i64, page: i32) -> Outcome<Vec<ClubMember>> {
    let key = CacheKey::new("club-member").arg(id).arg(page);
    self.execute(key, || self.inner.get_club_member(id, page)).await
  }

  async fn get_club_picture(&self, id: i64) -> Outcome<Vec<String>> {
    let key = CacheKey::new("club-picture").arg(id);
    self.execute(key, || self.inner.get_club_picture(id)).await
  }

  async fn get_club_related(&self, id: i64) -> Outcome<ClubRelated> {
    let key = CacheKey::new("club-related").arg(id);
    self.execute(key, || self.inner.get_club_related(id)).await
  }

  // Seasons & top lists

  async fn get_season(&self, season: &str, year: i32) -> Outcome<Vec<AnimeItem>> {
    let key = CacheKey::new("season").arg(season).arg(year);
    self.execute(key, || self.inner.get_season(season, year)).await
  }

  async fn get_top_anime(&self, kind: i32, page: i32) -> Outcome<Vec<TopAnime>> {
    let key = CacheKey::new("top-anime").arg(kind).arg(page);
    self.execute(key, || self.inner.get_top_anime(kind, page)).await
  }

  async fn get_top_manga(&self, kind: i32, page: i32) -> Outcome<Vec<TopManga>> {
    let key = CacheKey::new("top-manga").arg(kind).arg(page);
    self.execute(key, || self.inner.get_top_manga(kind, page)).await
  }

  async fn get_top_character(&self, page: i32) -> Outcome<Vec<TopCharacter>> {
    let key = CacheKey::new("top-character").arg(page);
    self.execute(key, || self.inner.get_top_character(page)).await
  }

  async fn get_top_people(&self, page: i32) -> Outcome<Vec<TopPeople>> {
    let key = CacheKey::new("top-people").arg(page);
    self.execute(key, || self.inner.get_top_people(page)).await
  }

  // Users

  async fn get_user(&self, username: &str) -> Outcome<User> {
    let key = CacheKey::new("user").arg(username);
    self.execute(key, || self.inner.get_user(username)).await
  }

  async fn get_user_stats(&self, username: &str) -> Outcome<UserStats> {
    let key = CacheKey::new("user-stats").arg(username);
    self.execute(key, || self.inner.get_user_stats(username)).await
  }

  async fn get_user_favorite(&self, username: &str) -> Outcome<UserFavorite> {
    let key = CacheKey::new("user-favorite").arg(username);
    self.execute(key, || self.inner.get_user_favorite(username)).await
  }

  async fn get_user_friend(&self, username: &str, page: i32) -> Outcome<Vec<UserFriend>> {
    let key = CacheKey::new("user-friend").arg(username).arg(page);
    self
      .execute(key, || self.inner.get_user_friend(username, page))
      .await
  }

  async fn get_user_history(&self, username: &str, kind: &str) -> Outcome<Vec<UserHistory>> {
    let key = CacheKey::new("user-history").arg(username).arg(kind);
    self
      .execute(key, || self.inner.get_user_history(username, kind))
      .await
  }

  async fn get_user_review(&self, username: &str, page: i32) -> Outcome<Vec<Review>> {
    let key = CacheKey::new("user-review").arg(username).arg(page);
    self
      .execute(key, || self.inner.get_user_review(username, page))
      .await
  }

  async fn get_user_recommendation(
    &self,
    username: &str,
    page: i32,
  ) -> Outcome<Vec<Recommendation>> {
    let key = CacheKey::new("user-recommendation").arg(username).arg(page);
    self
      .execute(key, || self.inner.get_user_recommendation(username, page))
      .await
  }

  async fn get_user_club(&self, username: &str) -> Outcome<Vec<Item>> {
    let key = CacheKey::new("user-club").arg(username);
    self.execute(key, || self.inner.get_user_club(username)).await
  }

  async fn get_user_anime(&self, query: &UserListQuery) -> Outcome<Vec<UserAnime>> {
    let key = CacheKey::new("user-anime").arg(query);
    self.execute(key, || self.inner.get_user_anime(query)).await
  }

  async fn get_user_manga(&self, query: &UserListQuery) -> Outcome<Vec<UserManga>> {
    let key = CacheKey::new("user-manga").arg(query);
    self.execute(key, || self.inner.get_user_manga(query)).await
  }

  // Search

  async fn search_anime(&self, query: &Query) -> Outcome<Vec<AnimeSearch>> {
    self.inner.search_anime(query).await
  }

  async fn search_manga(&self, query: &Query) -> Outcome<Vec<MangaSearch>> {
    self.inner.search_manga(query).await
  }

  async fn search_character(&self, name: &str, page: i32) -> Outcome<Vec<CharacterSearch>> {
    let key = CacheKey::new("search-character").arg(name).arg(page);
    self
      .execute(key, || self.inner.search_character(name, page))
      .await
  }

  async fn search_people(&self, name: &str, page: i32) -> Outcome<Vec<PeopleSearch>> {
    let key = CacheKey::new("search-people").arg(name).arg(page);
    self.execute(key, || self.inner.search_people(name, page)).await
  }

  async fn search_club(&self, query: &ClubQuery) -> Outcome<Vec<ClubSearch>> {
    let key = CacheKey::new("search-club").arg(query);
    self.execute(key, || self.inner.search_club(query)).await
  }

  async fn search_user(&self, query: &UserQuery) -> Outcome<Vec<UserSearch>> {
    let key = CacheKey::new("search-user").arg(query);
    self.execute(key, || self.inner.search_user(query)).await
  }
}
