//! Cache key grammar: `<namespace>:<tag>[:<arg>]*`.

use std::fmt;

/// Namespace prefixed to every key.
pub const NAMESPACE: &str = "mal";

/// A value that can appear as one positional segment of a cache key.
///
/// Implementations must be injective: different values never render the
/// same text, and no rendering can be confused with a segment separator.
pub trait KeyArg {
  fn write_key(&self, out: &mut String);
}

macro_rules! display_key_arg {
  ($($t:ty),*) => {
    $(impl KeyArg for $t {
      fn write_key(&self, out: &mut String) {
        use std::fmt::Write;
        let _ = write!(out, "{}", self);
      }
    })*
  };
}

display_key_arg!(i32, i64, u32, u64, bool);

impl KeyArg for str {
  fn write_key(&self, out: &mut String) {
    for c in self.chars() {
      match c {
        '%' => out.push_str("%25"),
        ':' => out.push_str("%3A"),
        ',' => out.push_str("%2C"),
        c => out.push(c),
      }
    }
  }
}

impl KeyArg for String {
  fn write_key(&self, out: &mut String) {
    self.as_str().write_key(out);
  }
}

impl<T: KeyArg + ?Sized> KeyArg for &T {
  fn write_key(&self, out: &mut String) {
    (**self).write_key(out);
  }
}

/// Rendered as `<len>;<item>,<item>...` so an empty list and a list of one
/// empty item stay distinct.
impl<T: KeyArg> KeyArg for [T] {
  fn write_key(&self, out: &mut String) {
    use std::fmt::Write;
    let _ = write!(out, "{};", self.len());
    for (i, item) in self.iter().enumerate() {
      if i > 0 {
        out.push(',');
      }
      item.write_key(out);
    }
  }
}

impl<T: KeyArg> KeyArg for Vec<T> {
  fn write_key(&self, out: &mut String) {
    self.as_slice().write_key(out);
  }
}

/// Builder for a namespaced cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
  pub fn new(tag: &str) -> Self {
    Self(format!("{NAMESPACE}:{tag}"))
  }

  /// Append one positional argument.
  pub fn arg(mut self, value: impl KeyArg) -> Self {
    self.0.push(':');
    value.write_key(&mut self.0);
    self
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for CacheKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_key_format() {
    assert_eq!(CacheKey::new("producers").as_str(), "mal:producers");
    assert_eq!(CacheKey::new("producer").arg(1).arg(2).as_str(), "mal:producer:1:2");
    assert_eq!(
      CacheKey::new("search-character").arg("naruto").arg(1).as_str(),
      "mal:search-character:naruto:1"
    );
  }

  #[test]
  fn test_equal_args_equal_keys() {
    let a = CacheKey::new("user-history").arg("rl404").arg("anime");
    let b = CacheKey::new("user-history").arg(String::from("rl404")).arg("anime");
    assert_eq!(a, b);
  }

  #[test]
  fn test_separator_in_args_does_not_collide() {
    let split = CacheKey::new("t").arg("a").arg("b");
    let joined = CacheKey::new("t").arg("a:b");
    assert_ne!(split, joined);
    assert_eq!(joined.as_str(), "mal:t:a%3Ab");

    let escaped = CacheKey::new("t").arg("a%3Ab");
    assert_ne!(escaped, joined);
  }

  #[test]
  fn test_list_args() {
    assert_eq!(CacheKey::new("t").arg(vec![1, 2]).as_str(), "mal:t:2;1,2");
    assert_ne!(
      CacheKey::new("t").arg(vec![12]),
      CacheKey::new("t").arg(vec![1, 2])
    );
    assert_ne!(
      CacheKey::new("t").arg(Vec::<String>::new()),
      CacheKey::new("t").arg(vec![String::new()])
    );
    assert_eq!(CacheKey::new("t").arg(Vec::<i64>::new()).as_str(), "mal:t:0;");
  }
}
