//! Request validation in front of any [`Api`].
//!
//! Malformed input is rejected before any I/O. Lookups of ids and usernames
//! that upstream already answered with a not-found are short-circuited
//! through empty markers stored in the cache. Producer, magazine, genre and
//! tag filters are checked against the reference lists the memoizing layer
//! stored; when a list is not cached yet the check passes.

use async_trait::async_trait;
use std::future::Future;
use tracing::{debug, trace, Span};

use crate::cache::{CacheKey, Store};
use crate::error::{Error, Outcome, ValidationError};

use super::api::Api;
use super::cache::{
  article_tag_key, genres_key, magazines_key, news_tag_key, producers_key, Entity,
};
use super::query::{
  top_anime_type, top_manga_type, ClubQuery, MediaType, Query, ReviewType, Season, UserListQuery,
  UserQuery, ALL_PAGES, ANIME_SEARCH_STATUSES, ANIME_SEARCH_TYPES, CLUB_CATEGORIES, CLUB_SORTS,
  GENDERS, MANGA_SEARCH_STATUSES, MANGA_SEARCH_TYPES, SEARCH_RATINGS, SEARCH_SCORES,
  USER_LIST_ORDERS, USER_LIST_STATUSES,
};
use super::types::*;

/// Minimum length of free-text search terms, in characters.
const MIN_SEARCH_LEN: usize = 3;

pub struct Validator {
  inner: Box<dyn Api>,
  store: Store,
  span: Span,
}

fn ensure(ok: bool, err: ValidationError) -> Outcome<()> {
  if ok {
    Ok(())
  } else {
    Err(err.into())
  }
}

fn ensure_id(id: i64) -> Outcome<()> {
  ensure(id > 0, ValidationError::InvalidId)
}

fn ensure_page(page: i32) -> Outcome<()> {
  ensure(page > 0, ValidationError::InvalidPage)
}

fn ensure_username(username: &str) -> Outcome<()> {
  ensure(!username.is_empty(), ValidationError::InvalidUsername)
}

fn ensure_search_term(term: &str) -> Outcome<()> {
  ensure(
    term.chars().count() >= MIN_SEARCH_LEN,
    ValidationError::ThreeLetterMinimum,
  )
}

fn ensure_media(kind: &str) -> Outcome<MediaType> {
  MediaType::parse(kind).ok_or_else(|| ValidationError::InvalidType.into())
}

/// Page of a query descriptor: `0` means the first page.
fn descriptor_page(page: i32) -> Outcome<i32> {
  ensure(page >= 0, ValidationError::InvalidPage)?;
  Ok(page.max(1))
}

impl Validator {
  pub fn new(inner: Box<dyn Api>, store: Store) -> Self {
    Self {
      inner,
      store,
      span: tracing::debug_span!("validator"),
    }
  }

  // ==========================================================================
  // Empty markers
  // ==========================================================================

  fn is_empty(&self, marker: &CacheKey) -> bool {
    trace!(parent: &self.span, key = marker.as_str(), "checking empty id");
    let empty = self.store.get::<bool>(marker.as_str()).unwrap_or(false);
    if empty {
      debug!(parent: &self.span, key = marker.as_str(), "found empty id");
    }
    empty
  }

  fn remember_empty(&self, marker: &CacheKey, err: &Error) {
    if err.is_not_found() {
      trace!(parent: &self.span, key = marker.as_str(), "saving empty id");
      self.store.set(marker.as_str(), &true);
    }
  }

  /// Answer not-found from the marker, or delegate and record a not-found.
  async fn guard<T, F, Fut>(&self, marker: CacheKey, fetch: F) -> Outcome<T>
  where
    F: FnOnce() -> Fut + Send,
    Fut: Future<Output = Outcome<T>> + Send,
  {
    if self.is_empty(&marker) {
      return Err(Error::not_found());
    }
    let result = fetch().await;
    if let Err(e) = &result {
      self.remember_empty(&marker, e);
    }
    result
  }

  // ==========================================================================
  // Reference lists
  // ==========================================================================

  /// Whether `id` is in the cached list under `key`. Cold list passes.
  fn in_list(&self, key: CacheKey, id: i64) -> bool {
    trace!(parent: &self.span, key = key.as_str(), id, "checking reference list");
    match self.store.get::<Vec<ItemCount>>(key.as_str()) {
      Some(items) => items.iter().any(|item| item.id == id),
      None => true,
    }
  }

  fn is_producer_valid(&self, id: i64) -> bool {
    id >= 0 && self.in_list(producers_key(), id)
  }

  fn is_magazine_valid(&self, id: i64) -> bool {
    id >= 0 && self.in_list(magazines_key(), id)
  }

  fn is_genre_valid(&self, media: MediaType, id: i64) -> bool {
    id != 0 && self.in_list(genres_key(media.as_str()), id)
  }

  fn is_article_tag_valid(&self, tag: &str) -> bool {
    if tag.is_empty() {
      return true;
    }
    match self.store.get::<Vec<ArticleTagItem>>(article_tag_key().as_str()) {
      Some(tags) => tags.iter().any(|t| t.name == tag || t.tag == tag),
      None => true,
    }
  }

  fn is_news_tag_valid(&self, tag: &str) -> bool {
    if tag.is_empty() {
      return true;
    }
    match self.store.get::<NewsTag>(news_tag_key().as_str()) {
      Some(tags) => tags.all().any(|t| t.name == tag || t.tag == tag),
      None => true,
    }
  }

  // ==========================================================================
  // Descriptors
  // ==========================================================================

  fn validate_search(&self, query: &Query, media: MediaType) -> Outcome<Query> {
    ensure_search_term(&query.title)?;
    let page = descriptor_page(query.page)?;

    let (types, statuses) = match media {
      MediaType::Anime => (ANIME_SEARCH_TYPES, ANIME_SEARCH_STATUSES),
      MediaType::Manga => (MANGA_SEARCH_TYPES, MANGA_SEARCH_STATUSES),
    };
    ensure(types.contains(&query.kind), ValidationError::InvalidType)?;
    ensure(SEARCH_SCORES.contains(&query.score), ValidationError::InvalidScore)?;
    ensure(statuses.contains(&query.status), ValidationError::InvalidStatus)?;

    match media {
      MediaType::Anime => {
        if query.producer_id != 0 {
          ensure(
            self.is_producer_valid(query.producer_id),
            ValidationError::InvalidProducer,
          )?;
        }
      }
      MediaType::Manga => {
        if query.magazine_id != 0 {
          ensure(
            self.is_magazine_valid(query.magazine_id),
            ValidationError::InvalidMagazine,
          )?;
        }
      }
    }

    for &id in &query.genre_ids {
      ensure(self.is_genre_valid(media, id), ValidationError::InvalidGenre)?;
    }
    if media == MediaType::Anime {
      ensure(SEARCH_RATINGS.contains(&query.rating), ValidationError::InvalidRating)?;
    }
    ensure(
      query.first_letter.chars().count() <= 1,
      ValidationError::InvalidFirstLetter,
    )?;

    Ok(Query {
      page,
      ..query.clone()
    })
  }

  fn validate_club_search(query: &ClubQuery) -> Outcome<ClubQuery> {
    ensure_search_term(&query.name)?;
    let page = descriptor_page(query.page)?;
    ensure(
      CLUB_CATEGORIES.contains(&query.category),
      ValidationError::InvalidClubCategory,
    )?;
    ensure(CLUB_SORTS.contains(&query.sort), ValidationError::InvalidSortType)?;
    Ok(ClubQuery {
      page,
      ..query.clone()
    })
  }

  fn validate_user_search(query: &UserQuery) -> Outcome<UserQuery> {
    ensure_search_term(&query.username)?;
    let page = descriptor_page(query.page)?;
    let (min, max) = (query.min_age, query.max_age);
    ensure(
      min >= 0 && max >= 0 && !(min > 0 && max > 0 && min > max),
      ValidationError::InvalidAge,
    )?;
    ensure(GENDERS.contains(&query.gender), ValidationError::InvalidGender)?;
    Ok(UserQuery {
      page,
      ..query.clone()
    })
  }

  fn validate_user_list(query: &UserListQuery) -> Outcome<UserListQuery> {
    ensure_username(&query.username)?;
    let page = match query.page {
      ALL_PAGES => ALL_PAGES,
      page => descriptor_page(page)?,
    };
    ensure(
      USER_LIST_STATUSES.contains(&query.status),
      ValidationError::InvalidStatus,
    )?;
    ensure(
      USER_LIST_ORDERS.contains(&query.order),
      ValidationError::InvalidOrder,
    )?;
    Ok(UserListQuery {
      page,
      ..query.clone()
    })
  }
}

#[async_trait]
impl Api for Validator {
  // Anime

  async fn get_anime(&self, id: i64) -> Outcome<Anime> {
    ensure_id(id)?;
    self
      .guard(Entity::Anime.empty_key(id), || self.inner.get_anime(id))
      .await
  }

  async fn get_anime_character(&self, id: i64) -> Outcome<Vec<AnimeCharacter>> {
    ensure_id(id)?;
    self
      .guard(Entity::Anime.empty_key(id), || self.inner.get_anime_character(id))
      .await
  }

  async fn get_anime_staff(&self, id: i64) -> Outcome<Vec<Role>> {
    ensure_id(id)?;
    self
      .guard(Entity::Anime.empty_key(id), || self.inner.get_anime_staff(id))
      .await
  }

  async fn get_anime_video(&self, id: i64, page: i32) -> Outcome<Video> {
    ensure_id(id)?;
    ensure_page(page)?;
    self
      .guard(Entity::Anime.empty_key(id), || self.inner.get_anime_video(id, page))
      .await
  }

  async fn get_anime_episode(&self, id: i64, page: i32) -> Outcome<Vec<Episode>> {
    ensure_id(id)?;
    ensure_page(page)?;
    self
      .guard(Entity::Anime.empty_key(id), || {
        self.inner.get_anime_episode(id, page)
      })
      .await
  }

  async fn get_anime_stats(&self, id: i64) -> Outcome<Stats> {
    ensure_id(id)?;
    self
      .guard(Entity::Anime.empty_key(id), || self.inner.get_anime_stats(id))
      .await
  }

  async fn get_anime_review(&self, id: i64, page: i32) -> Outcome<Vec<Review>> {
    ensure_id(id)?;
    ensure_page(page)?;
    self
      .guard(Entity::Anime.empty_key(id), || self.inner.get_anime_review(id, page))
      .await
  }

  async fn get_anime_recommendation(&self, id: i64) -> Outcome<Vec<Recommendation>> {
    ensure_id(id)?;
    self
      .guard(Entity::Anime.empty_key(id), || {
        self.inner.get_anime_recommendation(id)
      })
      .await
  }

  async fn get_anime_news(&self, id: i64) -> Outcome<Vec<NewsItem>> {
    ensure_id(id)?;
    self
      .guard(Entity::Anime.empty_key(id), || self.inner.get_anime_news(id))
      .await
  }

  async fn get_anime_article(&self, id: i64) -> Outcome<Vec<ArticleItem>> {
    ensure_id(id)?;
    self
      .guard(Entity::Anime.empty_key(id), || self.inner.get_anime_article(id))
      .await
  }

  async fn get_anime_club(&self, id: i64) -> Outcome<Vec<ClubItem>> {
    ensure_id(id)?;
    self
      .guard(Entity::Anime.empty_key(id), || self.inner.get_anime_club(id))
      .await
  }

  async fn get_anime_picture(&self, id: i64) -> Outcome<Vec<String>> {
    ensure_id(id)?;
    self
      .guard(Entity::Anime.empty_key(id), || self.inner.get_anime_picture(id))
      .await
  }

  async fn get_anime_more_info(&self, id: i64) -> Outcome<String> {
    ensure_id(id)?;
    self
      .guard(Entity::Anime.empty_key(id), || self.inner.get_anime_more_info(id))
      .await
  }

  // Manga

  async fn get_manga(&self, id: i64) -> Outcome<Manga> {
    ensure_id(id)?;
    self
      .guard(Entity::Manga.empty_key(id), || self.inner.get_manga(id))
      .await
  }

  async fn get_manga_character(&self, id: i64) -> Outcome<Vec<Role>> {
    ensure_id(id)?;
    self
      .guard(Entity::Manga.empty_key(id), || self.inner.get_manga_character(id))
      .await
  }

  async fn get_manga_stats(&self, id: i64) -> Outcome<Stats> {
    ensure_id(id)?;
    self
      .guard(Entity::Manga.empty_key(id), || self.inner.get_manga_stats(id))
      .await
  }

  async fn get_manga_review(&self, id: i64, page: i32) -> Outcome<Vec<Review>> {
    ensure_id(id)?;
    ensure_page(page)?;
    self
      .guard(Entity::Manga.empty_key(id), || self.inner.get_manga_review(id, page))
      .await
  }

  async fn get_manga_recommendation(&self, id: i64) -> Outcome<Vec<Recommendation>> {
    ensure_id(id)?;
    self
      .guard(Entity::Manga.empty_key(id), || {
        self.inner.get_manga_recommendation(id)
      })
      .await
  }

  async fn get_manga_news(&self, id: i64) -> Outcome<Vec<NewsItem>> {
    ensure_id(id)?;
    self
      .guard(Entity::Manga.empty_key(id), || self.inner.get_manga_news(id))
      .await
  }

  async fn get_manga_article(&self, id: i64) -> Outcome<Vec<ArticleItem>> {
    ensure_id(id)?;
    self
      .guard(Entity::Manga.empty_key(id), || self.inner.get_manga_article(id))
      .await
  }

  async fn get_manga_club(&self, id: i64) -> Outcome<Vec<ClubItem>> {
    ensure_id(id)?;
    self
      .guard(Entity::Manga.empty_key(id), || self.inner.get_manga_club(id))
      .await
  }

  async fn get_manga_picture(&self, id: i64) -> Outcome<Vec<String>> {
    ensure_id(id)?;
    self
      .guard(Entity::Manga.empty_key(id), || self.inner.get_manga_picture(id))
      .await
  }

  async fn get_manga_more_info(&self, id: i64) -> Outcome<String> {
    ensure_id(id)?;
    self
      .guard(Entity::Manga.empty_key(id), || self.inner.get_manga_more_info(id))
      .await
  }

  // Character

  async fn get_character(&self, id: i64) -> Outcome<Character> {
    ensure_id(id)?;
    self
      .guard(Entity::Character.empty_key(id), || self.inner.get_character(id))
      .await
  }

  async fn get_character_article(&self, id: i64) -> Outcome<Vec<ArticleItem>> {
    ensure_id(id)?;
    self
      .guard(Entity::Character.empty_key(id), || {
        self.inner.get_character_article(id)
      })
      .await
  }

  async fn get_character_ography(&self, kind: &str, id: i64) -> Outcome<Vec<Role>> {
    ensure_media(kind)?;
    ensure_id(id)?;
    self
      .guard(Entity::Character.empty_key(id), || {
        self.inner.get_character_ography(kind, id)
      })
      .await
  }

  async fn get_character_picture(&self, id: i64) -> Outcome<Vec<String>> {
    ensure_id(id)?;
    self
      .guard(Entity::Character.empty_key(id), || {
        self.inner.get_character_picture(id)
      })
      .await
  }

  async fn get_character_club(&self, id: i64) -> Outcome<Vec<ClubItem>> {
    ensure_id(id)?;
    self
      .guard(Entity::Character.empty_key(id), || {
        self.inner.get_character_club(id)
      })
      .await
  }

  async fn get_character_va(&self, id: i64) -> Outcome<Vec<Role>> {
    ensure_id(id)?;
    self
      .guard(Entity::Character.empty_key(id), || self.inner.get_character_va(id))
      .await
  }

  // People

  async fn get_people(&self, id: i64) -> Outcome<People> {
    ensure_id(id)?;
    self
      .guard(Entity::People.empty_key(id), || self.inner.get_people(id))
      .await
  }

  async fn get_people_character(&self, id: i64) -> Outcome<Vec<PeopleCharacter>> {
    ensure_id(id)?;
    self
      .guard(Entity::People.empty_key(id), || {
        self.inner.get_people_character(id)
      })
      .await
  }

  async fn get_people_staff(&self, id: i64) -> Outcome<Vec<Role>> {
    ensure_id(id)?;
    self
      .guard(Entity::People.empty_key(id), || self.inner.get_people_staff(id))
      .await
  }

  async fn get_people_manga(&self, id: i64) -> Outcome<Vec<Role>> {
    ensure_id(id)?;
    self
      .guard(Entity::People.empty_key(id), || self.inner.get_people_manga(id))
      .await
  }

  async fn get_people_news(&self, id: i64) -> Outcome<Vec<NewsItem>> {
    ensure_id(id)?;
    self
      .guard(Entity::People.empty_key(id), || self.inner.get_people_news(id))
      .await
  }

  async fn get_people_article(&self, id: i64) -> Outcome<Vec<ArticleItem>> {
    ensure_id(id)?;
    self
      .guard(Entity::People.empty_key(id), || self.inner.get_people_article(id))
      .await
  }

  async fn get_people_picture(&self, id: i64) -> Outcome<Vec<String>> {
    ensure_id(id)?;
    self
      .guard(Entity::People.empty_key(id), || self.inner.get_people_picture(id))
      .await
  }

  // Producers, magazines, genres

  async fn get_producers(&self) -> Outcome<Vec<ItemCount>> {
    self.inner.get_producers().await
  }

  async fn get_producer(&self, id: i64, page: i32) -> Outcome<Vec<AnimeItem>> {
    ensure_id(id)?;
    ensure_page(page)?;
    ensure(self.in_list(producers_key(), id), ValidationError::InvalidId)?;
    self.inner.get_producer(id, page).await
  }

  async fn get_magazines(&self) -> Outcome<Vec<ItemCount>> {
    self.inner.get_magazines().await
  }

  async fn get_magazine(&self, id: i64, page: i32) -> Outcome<Vec<MangaItem>> {
    ensure_id(id)?;
    ensure_page(page)?;
    ensure(self.in_list(magazines_key(), id), ValidationError::InvalidId)?;
    self.inner.get_magazine(id, page).await
  }

  async fn get_genres(&self, media: &str) -> Outcome<Vec<ItemCount>> {
    ensure_media(media)?;
    self.inner.get_genres(media).await
  }

  async fn get_anime_with_genre(&self, id: i64, page: i32) -> Outcome<Vec<AnimeItem>> {
    ensure_id(id)?;
    ensure_page(page)?;
    ensure(
      self.is_genre_valid(MediaType::Anime, id),
      ValidationError::InvalidId,
    )?;
    self.inner.get_anime_with_genre(id, page).await
  }

  async fn get_manga_with_genre(&self, id: i64, page: i32) -> Outcome<Vec<MangaItem>> {
    ensure_id(id)?;
    ensure_page(page)?;
    ensure(
      self.is_genre_valid(MediaType::Manga, id),
      ValidationError::InvalidId,
    )?;
    self.inner.get_manga_with_genre(id, page).await
  }

  // Reviews & recommendations

  async fn get_review(&self, id: i64) -> Outcome<Review> {
    ensure_id(id)?;
    self
      .guard(Entity::Review.empty_key(id), || self.inner.get_review(id))
      .await
  }

  async fn get_reviews(&self, kind: &str, page: i32) -> Outcome<Vec<Review>> {
    ensure(ReviewType::parse(kind).is_some(), ValidationError::InvalidType)?;
    ensure_page(page)?;
    self.inner.get_reviews(kind, page).await
  }

  async fn get_recommendation(&self, kind: &str, id1: i64, id2: i64) -> Outcome<Recommendation> {
    let entity = Entity::from(ensure_media(kind)?);
    ensure_id(id1)?;
    ensure_id(id2)?;
    if self.is_empty(&entity.empty_key(id1)) || self.is_empty(&entity.empty_key(id2)) {
      return Err(Error::not_found());
    }
    self.inner.get_recommendation(kind, id1, id2).await
  }

  async fn get_recommendations(&self, kind: &str, page: i32) -> Outcome<Vec<Recommendation>> {
    ensure_media(kind)?;
    ensure_page(page)?;
    self.inner.get_recommendations(kind, page).await
  }

  // Articles & news

  async fn get_article(&self, id: i64) -> Outcome<Article> {
    ensure_id(id)?;
    self
      .guard(Entity::Article.empty_key(id), || self.inner.get_article(id))
      .await
  }

  async fn get_articles(&self, page: i32, tag: &str) -> Outcome<Vec<ArticleItem>> {
    ensure_page(page)?;
    ensure(self.is_article_tag_valid(tag), ValidationError::InvalidTag)?;
    self.inner.get_articles(page, tag).await
  }

  async fn get_article_tag(&self) -> Outcome<Vec<ArticleTagItem>> {
    self.inner.get_article_tag().await
  }

  async fn get_news(&self, id: i64) -> Outcome<News> {
    ensure_id(id)?;
    self
      .guard(Entity::News.empty_key(id), || self.inner.get_news(id))
      .await
  }

  async fn get_news_list(&self, page: i32, tag: &str) -> Outcome<Vec<NewsItem>> {
    ensure_page(page)?;
    ensure(self.is_news_tag_valid(tag), ValidationError::InvalidTag)?;
    self.inner.get_news_list(page, tag).await
  }

  async fn get_news_tag(&self) -> Outcome<NewsTag> {
    self.inner.get_news_tag().await
  }

  // Clubs

  async fn get_clubs(&self, page: i32) -> Outcome<Vec<ClubSearch>> {
    ensure_page(page)?;
    self.inner.get_clubs(page).await
  }

  async fn get_club(&self, id: i64) -> Outcome<Club> {
    ensure_id(id)?;
    self
      .guard(Entity::Club.empty_key(id), || self.inner.get_club(id))
      .await
  }

  async fn get_club_member(&self, id: i64, page: i32) -> Outcome<Vec<ClubMember>> {
    ensure_id(id)?;
    ensure_page(page)?;
    self
      .guard(Entity::Club.empty_key(id), || self.inner.get_club_member(id, page))
      .await
  }

  async fn get_club_picture(&self, id: i64) -> Outcome<Vec<String>> {
    ensure_id(id)?;
    self
      .guard(Entity::Club.empty_key(id), || self.inner.get_club_picture(id))
      .await
  }

  async fn get_club_related(&self, id: i64) -> Outcome<ClubRelated> {
    ensure_id(id)?;
    self
      .guard(Entity::Club.empty_key(id), || self.inner.get_club_related(id))
      .await
  }

  // Seasons & top lists

  async fn get_season(&self, season: &str, year: i32) -> Outcome<Vec<AnimeItem>> {
    ensure(Season::parse(season).is_some(), ValidationError::InvalidSeason)?;
    ensure(year > 0, ValidationError::InvalidYear)?;
    self.inner.get_season(season, year).await
  }

  async fn get_top_anime(&self, kind: i32, page: i32) -> Outcome<Vec<TopAnime>> {
    ensure(top_anime_type(kind).is_some(), ValidationError::InvalidType)?;
    ensure_page(page)?;
    self.inner.get_top_anime(kind, page).await
  }

  async fn get_top_manga(&self, kind: i32, page: i32) -> Outcome<Vec<TopManga>> {
    ensure(top_manga_type(kind).is_some(), ValidationError::InvalidType)?;
    ensure_page(page)?;
    self.inner.get_top_manga(kind, page).await
  }

  async fn get_top_character(&self, page: i32) -> Outcome<Vec<TopCharacter>> {
    ensure_page(page)?;
    self.inner.get_top_character(page).await
  }

  async fn get_top_people(&self, page: i32) -> Outcome<Vec<TopPeople>> {
    ensure_page(page)?;
    self.inner.get_top_people(page).await
  }

  // Users

  async fn get_user(&self, username: &str) -> Outcome<User> {
    ensure_username(username)?;
    self
      .guard(Entity::User.empty_key(username), || self.inner.get_user(username))
      .await
  }

  async fn get_user_stats(&self, username: &str) -> Outcome<UserStats> {
    ensure_username(username)?;
    self
      .guard(Entity::User.empty_key(username), || {
        self.inner.get_user_stats(username)
      })
      .await
  }

  async fn get_user_favorite(&self, username: &str) -> Outcome<UserFavorite> {
    ensure_username(username)?;
    self
      .guard(Entity::User.empty_key(username), || {
        self.inner.get_user_favorite(username)
      })
      .await
  }

  async fn get_user_friend(&self, username: &str, page: i32) -> Outcome<Vec<UserFriend>> {
    ensure_username(username)?;
    ensure_page(page)?;
    self
      .guard(Entity::User.empty_key(username), || {
        self.inner.get_user_friend(username, page)
      })
      .await
  }

  async fn get_user_history(&self, username: &str, kind: &str) -> Outcome<Vec<UserHistory>> {
    ensure_username(username)?;
    if !kind.is_empty() {
      ensure_media(kind)?;
    }
    self
      .guard(Entity::User.empty_key(username), || {
        self.inner.get_user_history(username, kind)
      })
      .await
  }

  async fn get_user_review(&self, username: &str, page: i32) -> Outcome<Vec<Review>> {
    ensure_username(username)?;
    ensure_page(page)?;
    self
      .guard(Entity::User.empty_key(username), || {
        self.inner.get_user_review(username, page)
      })
      .await
  }

  async fn get_user_recommendation(
    &self,
    username: &str,
    page: i32,
  ) -> Outcome<Vec<Recommendation>> {
    ensure_username(username)?;
    ensure_page(page)?;
    self
      .guard(Entity::User.empty_key(username), || {
        self.inner.get_user_recommendation(username, page)
      })
      .await
  }

  async fn get_user_club(&self, username: &str) -> Outcome<Vec<Item>> {
    ensure_username(username)?;
    self
      .guard(Entity::User.empty_key(username), || {
        self.inner.get_user_club(username)
      })
      .await
  }

  async fn get_user_anime(&self, query: &UserListQuery) -> Outcome<Vec<UserAnime>> {
    let query = Self::validate_user_list(query)?;
    self
      .guard(Entity::User.empty_key(query.username.as_str()), || {
        self.inner.get_user_anime(&query)
      })
      .await
  }

  async fn get_user_manga(&self, query: &UserListQuery) -> Outcome<Vec<UserManga>> {
    let query = Self::validate_user_list(query)?;
    self
      .guard(Entity::User.empty_key(query.username.as_str()), || {
        self.inner.get_user_manga(&query)
      })
      .await
  }

  // Search

  async fn search_anime(&self, query: &Query) -> Outcome<Vec<AnimeSearch>> {
    let query = self.validate_search(query, MediaType::Anime)?;
    self.inner.search_anime(&query).await
  }

  async fn search_manga(&self, query: &Query) -> Outcome<Vec<MangaSearch>> {
    let query = self.validate_search(query, MediaType::Manga)?;
    self.inner.search_manga(&query).await
  }

  async fn search_character(&self, name: &str, page: i32) -> Outcome<Vec<CharacterSearch>> {
    ensure_search_term(name)?;
    ensure_page(page)?;
    self.inner.search_character(name, page).await
  }

  async fn search_people(&self, name: &str, page: i32) -> Outcome<Vec<PeopleSearch>> {
    ensure_search_term(name)?;
    ensure_page(page)?;
    self.inner.search_people(name, page).await
  }

  async fn search_club(&self, query: &ClubQuery) -> Outcome<Vec<ClubSearch>> {
    let query = Self::validate_club_search(query)?;
    self.inner.search_club(&query).await
  }

  async fn search_user(&self, query: &UserQuery) -> Outcome<Vec<UserSearch>> {
    let query = Self::validate_user_search(query)?;
    self.inner.search_user(&query).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::{CacheStorage, SqliteStorage, DEFAULT_TTL};
  use crate::error::OutcomeExt;
  use crate::mal::testing::FakeApi;
  use reqwest::StatusCode;
  use rstest::rstest;
  use std::sync::Arc;

  fn setup() -> (Validator, FakeApi, Store) {
    let fake = FakeApi::new();
    let store = Store::new(Arc::new(SqliteStorage::open_in_memory().unwrap()), DEFAULT_TTL);
    let validator = Validator::new(Box::new(fake.clone()), store.clone());
    (validator, fake, store)
  }

  fn invalid<T: std::fmt::Debug>(res: Outcome<T>) -> ValidationError {
    match res {
      Err(Error::Invalid(e)) => e,
      other => panic!("expected a validation error, got {other:?}"),
    }
  }

  fn items(ids: &[i64]) -> Vec<ItemCount> {
    ids
      .iter()
      .map(|&id| ItemCount {
        id,
        ..Default::default()
      })
      .collect()
  }

  // ==========================================================================
  // Shape checks
  // ==========================================================================

  #[tokio::test]
  async fn test_ids_and_pages() {
    let (v, fake, _) = setup();

    assert_eq!(invalid(v.get_anime(0).await), ValidationError::InvalidId);
    assert_eq!(invalid(v.get_manga(-3).await), ValidationError::InvalidId);
    assert_eq!(invalid(v.get_anime_video(1, 0).await), ValidationError::InvalidPage);
    assert_eq!(invalid(v.get_club_member(0, 0).await), ValidationError::InvalidId);
    assert_eq!(invalid(v.get_club_member(1, 0).await), ValidationError::InvalidPage);
    assert_eq!(invalid(v.get_top_character(0).await), ValidationError::InvalidPage);
    assert_eq!(invalid(v.get_clubs(0).await), ValidationError::InvalidPage);
    assert_eq!(fake.total_calls(), 0);

    let res = v.get_anime(1).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(fake.calls("get_anime"), 1);
  }

  #[tokio::test]
  async fn test_validation_maps_to_bad_request() {
    let (v, _, _) = setup();
    assert_eq!(v.get_people(0).await.status(), StatusCode::BAD_REQUEST);
    assert_eq!(v.get_user("").await.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn test_media_type_strings() {
    let (v, fake, _) = setup();

    assert_eq!(invalid(v.get_genres("").await), ValidationError::InvalidType);
    assert_eq!(
      invalid(v.get_character_ography("", 0).await),
      ValidationError::InvalidType
    );
    assert_eq!(
      invalid(v.get_character_ography("anime", 0).await),
      ValidationError::InvalidId
    );
    assert_eq!(
      invalid(v.get_recommendations("novel", 1).await),
      ValidationError::InvalidType
    );
    assert_eq!(
      invalid(v.get_reviews("people", 1).await),
      ValidationError::InvalidType
    );
    assert_eq!(
      invalid(v.get_user_history("rl404", "t").await),
      ValidationError::InvalidType
    );

    v.get_reviews("bestvoted", 1).await.unwrap();
    v.get_user_history("rl404", "").await.unwrap();
    v.get_genres("manga").await.unwrap();
    assert_eq!(fake.total_calls(), 3);
  }

  #[rstest]
  #[case(-1, 1, ValidationError::InvalidType)]
  #[case(10, 1, ValidationError::InvalidType)]
  #[case(1, 0, ValidationError::InvalidPage)]
  #[tokio::test]
  async fn test_top_lists(#[case] kind: i32, #[case] page: i32, #[case] expected: ValidationError) {
    let (v, _, _) = setup();
    assert_eq!(invalid(v.get_top_anime(kind, page).await), expected);
    assert_eq!(invalid(v.get_top_manga(kind, page).await), expected);
  }

  #[tokio::test]
  async fn test_season() {
    let (v, fake, _) = setup();
    assert_eq!(invalid(v.get_season("", 2019).await), ValidationError::InvalidSeason);
    assert_eq!(
      invalid(v.get_season("autumn", 2019).await),
      ValidationError::InvalidSeason
    );
    assert_eq!(invalid(v.get_season("winter", 0).await), ValidationError::InvalidYear);

    v.get_season("winter", 2019).await.unwrap();
    assert_eq!(fake.last_args("get_season").unwrap(), "\"winter\", 2019");
  }

  // ==========================================================================
  // Search descriptors
  // ==========================================================================

  fn naruto() -> Query {
    Query {
      title: "naruto".into(),
      ..Default::default()
    }
  }

  #[rstest]
  #[case(Query { title: "".into(), ..Default::default() }, ValidationError::ThreeLetterMinimum)]
  #[case(Query { title: "na".into(), ..Default::default() }, ValidationError::ThreeLetterMinimum)]
  #[case(Query { page: -1, ..naruto() }, ValidationError::InvalidPage)]
  #[case(Query { kind: -1, ..naruto() }, ValidationError::InvalidType)]
  #[case(Query { kind: 7, ..naruto() }, ValidationError::InvalidType)]
  #[case(Query { score: 11, ..naruto() }, ValidationError::InvalidScore)]
  #[case(Query { status: -1, ..naruto() }, ValidationError::InvalidStatus)]
  #[case(Query { producer_id: -1, ..naruto() }, ValidationError::InvalidProducer)]
  #[case(Query { genre_ids: vec![0], ..naruto() }, ValidationError::InvalidGenre)]
  #[case(Query { rating: -1, ..naruto() }, ValidationError::InvalidRating)]
  #[case(Query { first_letter: "ab".into(), ..naruto() }, ValidationError::InvalidFirstLetter)]
  #[tokio::test]
  async fn test_search_anime_rejects(#[case] query: Query, #[case] expected: ValidationError) {
    let (v, fake, _) = setup();
    assert_eq!(invalid(v.search_anime(&query).await), expected);
    assert_eq!(fake.total_calls(), 0);
  }

  #[tokio::test]
  async fn test_search_first_page_is_normalized() {
    let (v, fake, _) = setup();

    v.search_anime(&naruto()).await.unwrap();
    assert!(fake.last_args("search_anime").unwrap().contains("page: 1,"));

    v.search_manga(&Query { kind: 7, ..naruto() }).await.unwrap();
    assert!(fake.last_args("search_manga").unwrap().contains("page: 1,"));

    v.search_club(&ClubQuery {
      name: "naruto".into(),
      ..Default::default()
    })
    .await
    .unwrap();
    assert!(fake.last_args("search_club").unwrap().contains("page: 1,"));
  }

  #[tokio::test]
  async fn test_search_manga_magazine() {
    let (v, fake, store) = setup();
    store.set(magazines_key().as_str(), &items(&[1, 2]));

    let res = v.search_manga(&Query { magazine_id: 3, ..naruto() }).await;
    assert_eq!(invalid(res), ValidationError::InvalidMagazine);

    v.search_manga(&Query { magazine_id: 2, ..naruto() })
      .await
      .unwrap();
    assert_eq!(fake.calls("search_manga"), 1);
  }

  #[tokio::test]
  async fn test_search_genres_use_media_list() {
    let (v, _, store) = setup();
    store.set(genres_key("anime").as_str(), &items(&[1]));
    store.set(genres_key("manga").as_str(), &items(&[2]));

    let query = Query {
      genre_ids: vec![2],
      ..naruto()
    };
    assert_eq!(invalid(v.search_anime(&query).await), ValidationError::InvalidGenre);
    v.search_manga(&query).await.unwrap();
  }

  #[tokio::test]
  async fn test_search_character_and_people() {
    let (v, fake, _) = setup();
    assert_eq!(
      invalid(v.search_character("", 0).await),
      ValidationError::ThreeLetterMinimum
    );
    assert_eq!(
      invalid(v.search_people("naruto", 0).await),
      ValidationError::InvalidPage
    );
    v.search_character("naruto", 1).await.unwrap();
    assert_eq!(fake.calls("search_character"), 1);
  }

  #[rstest]
  #[case(ClubQuery { name: "".into(), ..Default::default() }, ValidationError::ThreeLetterMinimum)]
  #[case(ClubQuery { name: "naruto".into(), page: -1, ..Default::default() }, ValidationError::InvalidPage)]
  #[case(ClubQuery { name: "naruto".into(), category: -1, ..Default::default() }, ValidationError::InvalidClubCategory)]
  #[case(ClubQuery { name: "naruto".into(), sort: 5, ..Default::default() }, ValidationError::InvalidSortType)]
  #[tokio::test]
  async fn test_search_club_rejects(#[case] query: ClubQuery, #[case] expected: ValidationError) {
    let (v, _, _) = setup();
    assert_eq!(invalid(v.search_club(&query).await), expected);
  }

  #[rstest]
  #[case(0, 0, 0, None)]
  #[case(18, 0, 0, None)]
  #[case(18, 30, 3, None)]
  #[case(-1, 0, 0, Some(ValidationError::InvalidAge))]
  #[case(0, -1, 0, Some(ValidationError::InvalidAge))]
  #[case(30, 18, 0, Some(ValidationError::InvalidAge))]
  #[case(0, 0, -1, Some(ValidationError::InvalidGender))]
  #[case(0, 0, 4, Some(ValidationError::InvalidGender))]
  #[tokio::test]
  async fn test_search_user(
    #[case] min_age: i32,
    #[case] max_age: i32,
    #[case] gender: i32,
    #[case] expected: Option<ValidationError>,
  ) {
    let (v, fake, _) = setup();
    let query = UserQuery {
      username: "rl404".into(),
      min_age,
      max_age,
      gender,
      ..Default::default()
    };
    let res = v.search_user(&query).await;
    match expected {
      Some(e) => assert_eq!(invalid(res), e),
      None => {
        assert!(res.is_ok());
        assert!(fake.last_args("search_user").unwrap().contains("page: 1,"));
      }
    }
  }

  #[tokio::test]
  async fn test_user_list_pages() {
    let (v, fake, _) = setup();
    let query = |page, status, order| UserListQuery {
      username: "rl404".into(),
      page,
      status,
      order,
      ..Default::default()
    };

    assert_eq!(
      invalid(v.get_user_anime(&UserListQuery::default()).await),
      ValidationError::InvalidUsername
    );
    assert_eq!(invalid(v.get_user_anime(&query(-2, 0, 0)).await), ValidationError::InvalidPage);
    assert_eq!(invalid(v.get_user_manga(&query(0, 5, 0)).await), ValidationError::InvalidStatus);
    assert_eq!(invalid(v.get_user_manga(&query(0, 0, -1)).await), ValidationError::InvalidOrder);

    v.get_user_anime(&query(0, 0, 0)).await.unwrap();
    assert!(fake.last_args("get_user_anime").unwrap().contains("page: 1,"));

    v.get_user_anime(&query(ALL_PAGES, 7, 0)).await.unwrap();
    assert!(fake.last_args("get_user_anime").unwrap().contains("page: -1,"));
  }

  // ==========================================================================
  // Empty markers
  // ==========================================================================

  #[tokio::test]
  async fn test_not_found_is_remembered() {
    let (v, fake, store) = setup();
    fake.fail_with("get_anime", Error::not_found);

    let first = v.get_anime(99).await;
    assert_eq!(first.status(), StatusCode::NOT_FOUND);
    assert_eq!(store.get::<bool>("mal:empty:anime:99"), Some(true));

    // Every anime operation on that id now short-circuits.
    let second = v.get_anime(99).await;
    assert!(second.unwrap_err().is_not_found());
    let pictures = v.get_anime_picture(99).await;
    assert_eq!(pictures.status(), StatusCode::NOT_FOUND);
    assert_eq!(fake.calls("get_anime"), 1);
    assert_eq!(fake.calls("get_anime_picture"), 0);

    // Other ids and other entities are unaffected.
    v.get_anime(98).await.unwrap_err();
    v.get_manga(99).await.unwrap();
    assert_eq!(fake.calls("get_anime"), 2);
  }

  #[tokio::test]
  async fn test_other_failures_leave_no_marker() {
    let (v, fake, store) = setup();
    fake.fail_with("get_club", || Error::Not200(StatusCode::FORBIDDEN));
    fake.fail_with("get_user", || Error::ParseBody("truncated".into()));

    assert_eq!(v.get_club(1).await.status(), StatusCode::FORBIDDEN);
    assert_eq!(
      v.get_user("rl404").await.status(),
      StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(store.get::<bool>("mal:empty:club:1"), None);
    assert_eq!(store.get::<bool>("mal:empty:user:rl404"), None);

    v.get_club(1).await.unwrap_err();
    assert_eq!(fake.calls("get_club"), 2);
  }

  #[tokio::test]
  async fn test_username_marker_is_shared_across_user_ops() {
    let (v, fake, store) = setup();
    store.set(Entity::User.empty_key("ghost").as_str(), &true);

    assert!(v.get_user("ghost").await.unwrap_err().is_not_found());
    assert!(v.get_user_friend("ghost", 1).await.unwrap_err().is_not_found());
    let list = UserListQuery {
      username: "ghost".into(),
      ..Default::default()
    };
    assert!(v.get_user_manga(&list).await.unwrap_err().is_not_found());
    assert_eq!(fake.total_calls(), 0);
  }

  #[tokio::test]
  async fn test_recommendation_checks_both_ids() {
    let (v, fake, store) = setup();
    store.set(Entity::Manga.empty_key(2).as_str(), &true);

    assert_eq!(
      invalid(v.get_recommendation("", 1, 2).await),
      ValidationError::InvalidType
    );
    assert_eq!(
      invalid(v.get_recommendation("anime", 1, 0).await),
      ValidationError::InvalidId
    );
    assert!(v
      .get_recommendation("manga", 1, 2)
      .await
      .unwrap_err()
      .is_not_found());
    assert!(v
      .get_recommendation("manga", 2, 1)
      .await
      .unwrap_err()
      .is_not_found());
    assert_eq!(fake.calls("get_recommendation"), 0);

    // The anime marker space is separate.
    v.get_recommendation("anime", 1, 2).await.unwrap();
    assert_eq!(fake.calls("get_recommendation"), 1);
  }

  #[tokio::test]
  async fn test_unreadable_marker_is_a_miss() {
    let (v, fake, store) = setup();
    store.set(Entity::News.empty_key(5).as_str(), "not a bool");

    v.get_news(5).await.unwrap();
    assert_eq!(fake.calls("get_news"), 1);
  }

  #[tokio::test]
  async fn test_marker_expires_with_ttl() {
    let fake = FakeApi::new();
    let storage: Arc<dyn CacheStorage> = Arc::new(SqliteStorage::open_in_memory().unwrap());
    let store = Store::new(storage.clone(), DEFAULT_TTL);
    let v = Validator::new(Box::new(fake.clone()), store);

    storage
      .set_raw("mal:empty:people:3", b"true", std::time::Duration::ZERO)
      .unwrap();
    v.get_people(3).await.unwrap();
    assert_eq!(fake.calls("get_people"), 1);
  }

  // ==========================================================================
  // Reference lists
  // ==========================================================================

  #[tokio::test]
  async fn test_producer_reference_list() {
    let (v, fake, store) = setup();

    assert_eq!(invalid(v.get_producer(0, 0).await), ValidationError::InvalidId);
    assert_eq!(invalid(v.get_producer(1, 0).await), ValidationError::InvalidPage);

    // Cold list passes.
    v.get_producer(1, 1).await.unwrap();
    assert_eq!(fake.calls("get_producer"), 1);

    store.set(producers_key().as_str(), &Vec::<ItemCount>::new());
    assert_eq!(invalid(v.get_producer(1, 1).await), ValidationError::InvalidId);

    store.set(producers_key().as_str(), &items(&[1, 17]));
    v.get_producer(17, 2).await.unwrap();
    assert_eq!(fake.calls("get_producer"), 2);
  }

  #[tokio::test]
  async fn test_magazine_and_genre_reference_lists() {
    let (v, _, store) = setup();
    store.set(magazines_key().as_str(), &items(&[5]));
    store.set(genres_key("manga").as_str(), &items(&[1]));

    assert_eq!(invalid(v.get_magazine(6, 1).await), ValidationError::InvalidId);
    v.get_magazine(5, 1).await.unwrap();

    assert_eq!(
      invalid(v.get_manga_with_genre(2, 1).await),
      ValidationError::InvalidId
    );
    v.get_manga_with_genre(1, 1).await.unwrap();

    // No anime genres cached.
    v.get_anime_with_genre(2, 1).await.unwrap();
  }

  #[tokio::test]
  async fn test_corrupt_reference_list_fails_open() {
    let (v, fake, store) = setup();
    store.set(producers_key().as_str(), "garbage");

    v.get_producer(42, 1).await.unwrap();
    assert_eq!(fake.calls("get_producer"), 1);
  }

  #[tokio::test]
  async fn test_article_tags() {
    let (v, fake, store) = setup();

    v.get_articles(1, "anything").await.unwrap();
    assert_eq!(invalid(v.get_articles(0, "").await), ValidationError::InvalidPage);

    store.set(
      article_tag_key().as_str(),
      &vec![ArticleTagItem {
        name: "Editorial".into(),
        tag: "editorial".into(),
      }],
    );
    assert_eq!(invalid(v.get_articles(1, "tag").await), ValidationError::InvalidTag);
    v.get_articles(1, "").await.unwrap();
    v.get_articles(1, "editorial").await.unwrap();
    v.get_articles(1, "Editorial").await.unwrap();
    assert_eq!(fake.calls("get_articles"), 4);
  }

  #[tokio::test]
  async fn test_news_tags_cover_every_section() {
    let (v, _, store) = setup();
    store.set(
      news_tag_key().as_str(),
      &NewsTag {
        industry: vec![NewsTagItem {
          name: "Business".into(),
          tag: "business".into(),
          ..Default::default()
        }],
        ..Default::default()
      },
    );

    assert_eq!(invalid(v.get_news_list(1, "tag").await), ValidationError::InvalidTag);
    v.get_news_list(1, "business").await.unwrap();
    v.get_news_list(2, "").await.unwrap();
  }

  #[tokio::test]
  async fn test_reference_list_getters_pass_through() {
    let (v, fake, _) = setup();
    v.get_producers().await.unwrap();
    v.get_magazines().await.unwrap();
    v.get_article_tag().await.unwrap();
    v.get_news_tag().await.unwrap();
    assert_eq!(fake.total_calls(), 4);
  }
}
