//! Small text helpers for values scraped out of pages.

use regex::Regex;
use std::sync::LazyLock;

static RESIZE_SEGMENT: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"/r/\d+x\d+").expect("valid regex"));
static YOUTUBE_EMBED: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^https?://(?:www\.)?youtube(?:-nocookie)?\.com/embed/([\w-]+)").expect("valid regex")
});

/// Full-size image URL: drops the `/r/WxH` resize segment and the query.
/// The placeholder image becomes an empty string.
pub fn clean_image_url(url: &str) -> String {
  if url.contains("questionmark") {
    return String::new();
  }
  let url = url.split('?').next().unwrap_or_default();
  RESIZE_SEGMENT.replace(url, "").into_owned()
}

/// Watch URL for an embedded YouTube player; anything else is returned as is.
pub fn clean_video_url(url: &str) -> String {
  match YOUTUBE_EMBED.captures(url) {
    Some(caps) => format!("https://www.youtube.com/watch?v={}", &caps[1]),
    None => url.to_string(),
  }
}

/// Parse an integer with thousands separators. Unparsable text is `0`.
pub fn str_to_num(s: &str) -> i64 {
  s.trim().replace(',', "").parse().unwrap_or(0)
}

/// Parse a decimal with thousands separators. Unparsable text is `0.0`.
pub fn str_to_float(s: &str) -> f64 {
  s.trim().replace(',', "").parse().unwrap_or(0.0)
}
