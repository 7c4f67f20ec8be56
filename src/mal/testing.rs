//! In-memory [`Api`] double for exercising the decorators.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{Error, Outcome};

use super::api::Api;
use super::query::{ClubQuery, Query, UserListQuery, UserQuery};
use super::types::*;

type Failure = Box<dyn Fn() -> Error + Send>;

#[derive(Default)]
struct State {
  calls: HashMap<&'static str, usize>,
  last_args: HashMap<&'static str, String>,
  failures: HashMap<&'static str, Failure>,
}

/// Counts calls per method and answers with canned data. Clones share state,
/// so a test can keep one handle while the chain owns another.
#[derive(Clone, Default)]
pub struct FakeApi {
  state: Arc<Mutex<State>>,
}

impl FakeApi {
  pub fn new() -> Self {
    Self::default()
  }

  /// Make every call to `method` fail with the produced error.
  pub fn fail_with(&self, method: &'static str, make: impl Fn() -> Error + Send + 'static) {
    self
      .state
      .lock()
      .unwrap()
      .failures
      .insert(method, Box::new(make));
  }

  pub fn calls(&self, method: &str) -> usize {
    self.state.lock().unwrap().calls.get(method).copied().unwrap_or(0)
  }

  pub fn total_calls(&self) -> usize {
    self.state.lock().unwrap().calls.values().sum()
  }

  /// Debug rendering of the arguments of the latest call to `method`.
  pub fn last_args(&self, method: &str) -> Option<String> {
    self.state.lock().unwrap().last_args.get(method).cloned()
  }

  fn record(&self, method: &'static str, args: Vec<String>) -> Outcome<()> {
    let mut state = self.state.lock().unwrap();
    *state.calls.entry(method).or_default() += 1;
    state.last_args.insert(method, args.join(", "));
    match state.failures.get(method) {
      Some(make) => Err(make()),
      None => Ok(()),
    }
  }
}

macro_rules! fake_api {
  ($( fn $name:ident ( $($arg:ident : $ty:ty),* ) -> $ret:ty => $body:expr; )*) => {
    #[async_trait]
    impl Api for FakeApi {
      $(
        async fn $name(&self, $($arg: $ty),*) -> Outcome<$ret> {
          let args: Vec<String> = vec![$(format!("{:?}", $arg)),*];
          self.record(stringify!($name), args)?;
          Ok($body)
        }
      )*
    }
  };
}

fn items(names: &[&str]) -> Vec<ItemCount> {
  names
    .iter()
    .zip(1..)
    .map(|(name, id)| ItemCount {
      id,
      name: name.to_string(),
      count: 100 * id,
    })
    .collect()
}

fake_api! {
  fn get_anime(id: i64) -> Anime => Anime { id, title: format!("Anime {id}"), ..Default::default() };
  fn get_anime_character(id: i64) -> Vec<AnimeCharacter> => vec![AnimeCharacter::default()];
  fn get_anime_staff(id: i64) -> Vec<Role> => vec![Role { id: 1, ..Default::default() }];
  fn get_anime_video(id: i64, page: i32) -> Video => Video::default();
  fn get_anime_episode(id: i64, page: i32) -> Vec<Episode> => vec![Episode::default()];
  fn get_anime_stats(id: i64) -> Stats => Stats::default();
  fn get_anime_review(id: i64, page: i32) -> Vec<Review> => vec![Review::default()];
  fn get_anime_recommendation(id: i64) -> Vec<Recommendation> => Vec::new();
  fn get_anime_news(id: i64) -> Vec<NewsItem> => Vec::new();
  fn get_anime_article(id: i64) -> Vec<ArticleItem> => Vec::new();
  fn get_anime_club(id: i64) -> Vec<ClubItem> => Vec::new();
  fn get_anime_picture(id: i64) -> Vec<String> => vec![format!("https://cdn.myanimelist.net/images/anime/{id}.jpg")];
  fn get_anime_more_info(id: i64) -> String => format!("more info {id}");

  fn get_manga(id: i64) -> Manga => Manga { id, title: format!("Manga {id}"), ..Default::default() };
  fn get_manga_character(id: i64) -> Vec<Role> => Vec::new();
  fn get_manga_stats(id: i64) -> Stats => Stats::default();
  fn get_manga_review(id: i64, page: i32) -> Vec<Review> => Vec::new();
  fn get_manga_recommendation(id: i64) -> Vec<Recommendation> => Vec::new();
  fn get_manga_news(id: i64) -> Vec<NewsItem> => Vec::new();
  fn get_manga_article(id: i64) -> Vec<ArticleItem> => Vec::new();
  fn get_manga_club(id: i64) -> Vec<ClubItem> => Vec::new();
  fn get_manga_picture(id: i64) -> Vec<String> => Vec::new();
  fn get_manga_more_info(id: i64) -> String => String::new();

  fn get_character(id: i64) -> Character => Character::default();
  fn get_character_article(id: i64) -> Vec<ArticleItem> => Vec::new();
  fn get_character_ography(kind: &str, id: i64) -> Vec<Role> => Vec::new();
  fn get_character_picture(id: i64) -> Vec<String> => Vec::new();
  fn get_character_club(id: i64) -> Vec<ClubItem> => Vec::new();
  fn get_character_va(id: i64) -> Vec<Role> => Vec::new();

  fn get_people(id: i64) -> People => People::default();
  fn get_people_character(id: i64) -> Vec<PeopleCharacter> => Vec::new();
  fn get_people_staff(id: i64) -> Vec<Role> => Vec::new();
  fn get_people_manga(id: i64) -> Vec<Role> => Vec::new();
  fn get_people_news(id: i64) -> Vec<NewsItem> => Vec::new();
  fn get_people_article(id: i64) -> Vec<ArticleItem> => Vec::new();
  fn get_people_picture(id: i64) -> Vec<String> => Vec::new();

  fn get_producers() -> Vec<ItemCount> => items(&["Studio Pierrot", "Bones", "Madhouse"]);
  fn get_producer(id: i64, page: i32) -> Vec<AnimeItem> => Vec::new();
  fn get_magazines() -> Vec<ItemCount> => items(&["Shounen Jump", "Big Comic"]);
  fn get_magazine(id: i64, page: i32) -> Vec<MangaItem> => Vec::new();
  fn get_genres(media: &str) -> Vec<ItemCount> => items(&["Action", "Adventure"]);
  fn get_anime_with_genre(id: i64, page: i32) -> Vec<AnimeItem> => Vec::new();
  fn get_manga_with_genre(id: i64, page: i32) -> Vec<MangaItem> => Vec::new();

  fn get_review(id: i64) -> Review => Review::default();
  fn get_reviews(kind: &str, page: i32) -> Vec<Review> => Vec::new();
  fn get_recommendation(kind: &str, id1: i64, id2: i64) -> Recommendation => Recommendation::default();
  fn get_recommendations(kind: &str, page: i32) -> Vec<Recommendation> => Vec::new();

  fn get_article(id: i64) -> Article => Article::default();
  fn get_articles(page: i32, tag: &str) -> Vec<ArticleItem> => Vec::new();
  fn get_article_tag() -> Vec<ArticleTagItem> => vec![ArticleTagItem { name: "Editorial".into(), tag: "editorial".into() }];
  fn get_news(id: i64) -> News => News { id, ..Default::default() };
  fn get_news_list(page: i32, tag: &str) -> Vec<NewsItem> => Vec::new();
  fn get_news_tag() -> NewsTag => NewsTag {
    anime: vec![NewsTagItem { name: "New Anime".into(), tag: "new_anime".into(), ..Default::default() }],
    ..Default::default()
  };

  fn get_clubs(page: i32) -> Vec<ClubSearch> => Vec::new();
  fn get_club(id: i64) -> Club => Club { id, name: format!("Club {id}"), ..Default::default() };
  fn get_club_member(id: i64, page: i32) -> Vec<ClubMember> => Vec::new();
  fn get_club_picture(id: i64) -> Vec<String> => Vec::new();
  fn get_club_related(id: i64) -> ClubRelated => ClubRelated::default();

  fn get_season(season: &str, year: i32) -> Vec<AnimeItem> => Vec::new();
  fn get_top_anime(kind: i32, page: i32) -> Vec<TopAnime> => Vec::new();
  fn get_top_manga(kind: i32, page: i32) -> Vec<TopManga> => Vec::new();
  fn get_top_character(page: i32) -> Vec<TopCharacter> => Vec::new();
  fn get_top_people(page: i32) -> Vec<TopPeople> => Vec::new();

  fn get_user(username: &str) -> User => User { username: username.to_string(), ..Default::default() };
  fn get_user_stats(username: &str) -> UserStats => UserStats::default();
  fn get_user_favorite(username: &str) -> UserFavorite => UserFavorite::default();
  fn get_user_friend(username: &str, page: i32) -> Vec<UserFriend> => Vec::new();
  fn get_user_history(username: &str, kind: &str) -> Vec<UserHistory> => Vec::new();
  fn get_user_review(username: &str, page: i32) -> Vec<Review> => Vec::new();
  fn get_user_recommendation(username: &str, page: i32) -> Vec<Recommendation> => Vec::new();
  fn get_user_club(username: &str) -> Vec<Item> => Vec::new();
  fn get_user_anime(query: &UserListQuery) -> Vec<UserAnime> => Vec::new();
  fn get_user_manga(query: &UserListQuery) -> Vec<UserManga> => Vec::new();

  fn search_anime(query: &Query) -> Vec<AnimeSearch> => Vec::new();
  fn search_manga(query: &Query) -> Vec<MangaSearch> => Vec::new();
  fn search_character(name: &str, page: i32) -> Vec<CharacterSearch> => Vec::new();
  fn search_people(name: &str, page: i32) -> Vec<PeopleSearch> => Vec::new();
  fn search_club(query: &ClubQuery) -> Vec<ClubSearch> => Vec::new();
  fn search_user(query: &UserQuery) -> Vec<UserSearch> => Vec::new();
}
