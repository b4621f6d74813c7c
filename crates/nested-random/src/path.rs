//! Path segments and their textual form.
//!
//! A [`SeedPath`] is written like a JSON Pointer: the empty string is the
//! empty path, every other path is a sequence of `/`-prefixed segments.
//! Inside keys `~0` stands for `~` and `~1` for `/`. A segment that reads as
//! an `i32` is an index; a key that would read as an index (or that starts
//! with a double quote) is wrapped in double quotes.
//!
//! ```
//! use nested_random::{SeedPath, Segment};
//!
//! let path: SeedPath = "/user/5/\"7\"/a~1b".parse().unwrap();
//! assert_eq!(
//!     path.segments(),
//!     &[
//!         Segment::from("user"),
//!         Segment::from(5),
//!         Segment::from("7"),
//!         Segment::from("a/b"),
//!     ]
//! );
//! assert_eq!(path.to_string(), "/user/5/\"7\"/a~1b");
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Encode an index as its 4 content bytes, low byte first.
pub fn encode_index(index: i32) -> [u8; 4] {
    index.to_le_bytes()
}

/// Recover an index from its content bytes.
pub fn decode_index(bytes: [u8; 4]) -> i32 {
    i32::from_le_bytes(bytes)
}

/// One step from a node to one of its children.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Segment {
    /// A named field.
    Key(String),
    /// A position in a notional array.
    Index(i32),
}

impl Segment {
    /// The bytes this segment contributes to the derived seed.
    pub fn content(&self) -> Cow<'_, [u8]> {
        match self {
            Segment::Key(key) => Cow::Borrowed(key.as_bytes()),
            Segment::Index(index) => Cow::Owned(encode_index(*index).to_vec()),
        }
    }

    pub fn as_key(&self) -> Option<&str> {
        match self {
            Segment::Key(key) => Some(key),
            Segment::Index(_) => None,
        }
    }

    pub fn as_index(&self) -> Option<i32> {
        match self {
            Segment::Key(_) => None,
            Segment::Index(index) => Some(*index),
        }
    }

    /// Parse a single segment as it appears between slashes.
    fn parse_text(raw: &str, path: &str) -> Result<Self> {
        if let Some(rest) = raw.strip_prefix('"') {
            let inner = rest
                .strip_suffix('"')
                .ok_or_else(|| Error::invalid_path(path, format!("unterminated quote in '{raw}'")))?;
            return Ok(Segment::Key(unescape(inner, path)?));
        }
        if let Ok(index) = raw.parse::<i32>() {
            return Ok(Segment::Index(index));
        }
        Ok(Segment::Key(unescape(raw, path)?))
    }
}

impl From<&str> for Segment {
    fn from(key: &str) -> Self {
        Segment::Key(key.to_string())
    }
}

impl From<String> for Segment {
    fn from(key: String) -> Self {
        Segment::Key(key)
    }
}

impl From<i32> for Segment {
    fn from(index: i32) -> Self {
        Segment::Index(index)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Index(index) => write!(f, "{index}"),
            Segment::Key(key) => {
                let escaped = key.replace('~', "~0").replace('/', "~1");
                if escaped.starts_with('"') || escaped.parse::<i32>().is_ok() {
                    write!(f, "\"{escaped}\"")
                } else {
                    f.write_str(&escaped)
                }
            }
        }
    }
}

fn unescape(text: &str, path: &str) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '~' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('~'),
            Some('1') => out.push('/'),
            Some(other) => {
                return Err(Error::invalid_path(
                    path,
                    format!("invalid escape '~{other}'"),
                ))
            }
            None => return Err(Error::invalid_path(path, "dangling '~' at end of segment")),
        }
    }
    Ok(out)
}

/// An ordered sequence of segments below some node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeedPath(Vec<Segment>);

impl SeedPath {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn push(&mut self, segment: impl Into<Segment>) {
        self.0.push(segment.into());
    }

    /// Return a copy of this path extended by one segment.
    pub fn join(&self, segment: impl Into<Segment>) -> Self {
        let mut path = self.clone();
        path.push(segment);
        path
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.0.iter()
    }
}

impl From<Vec<Segment>> for SeedPath {
    fn from(segments: Vec<Segment>) -> Self {
        Self(segments)
    }
}

impl FromIterator<Segment> for SeedPath {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for SeedPath {
    type Item = Segment;
    type IntoIter = std::vec::IntoIter<Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a SeedPath {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for SeedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.0 {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for SeedPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Ok(SeedPath::new());
        }
        let rest = s
            .strip_prefix('/')
            .ok_or_else(|| Error::invalid_path(s, "path must be empty or start with '/'"))?;
        rest.split('/')
            .map(|raw| Segment::parse_text(raw, s))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> SeedPath {
        s.parse().unwrap()
    }

    #[test]
    fn test_index_encoding_is_little_endian() {
        assert_eq!(encode_index(1), [1, 0, 0, 0]);
        assert_eq!(encode_index(0x0403_0201), [1, 2, 3, 4]);
        assert_eq!(encode_index(-1), [0xff, 0xff, 0xff, 0xff]);
    }

    #[test]
    fn test_index_encoding_round_trip() {
        for value in [0, 1, -1, i32::MAX] {
            assert_eq!(decode_index(encode_index(value)), value);
        }
    }

    #[test]
    fn test_segment_content() {
        assert_eq!(Segment::from("user").content().as_ref(), b"user");
        assert_eq!(Segment::from(5).content().as_ref(), &[5, 0, 0, 0]);
        assert_eq!(Segment::from("").content().len(), 0);
    }

    #[test]
    fn test_parse_empty_and_root_slash() {
        assert!(parse("").is_empty());
        assert_eq!(parse("/").segments(), &[Segment::from("")]);
    }

    #[test]
    fn test_parse_mixed_segments() {
        let path = parse("/user/5/name/-3");
        assert_eq!(
            path.segments(),
            &[
                Segment::from("user"),
                Segment::from(5),
                Segment::from("name"),
                Segment::from(-3),
            ]
        );
    }

    #[test]
    fn test_parse_escapes_and_quotes() {
        let path = parse("/a~1b/~0x/\"12\"/\"\"q\"");
        assert_eq!(
            path.segments(),
            &[
                Segment::from("a/b"),
                Segment::from("~x"),
                Segment::from("12"),
                Segment::from("\"q"),
            ]
        );
    }

    #[test]
    fn test_index_out_of_range_is_a_key() {
        let path = parse("/4294967296");
        assert_eq!(path.segments(), &[Segment::from("4294967296")]);
    }

    #[test]
    fn test_display_round_trip() {
        let path: SeedPath = vec![
            Segment::from("user"),
            Segment::from(5),
            Segment::from("5"),
            Segment::from("+5"),
            Segment::from("a/b~c"),
            Segment::from(""),
            Segment::from("\""),
            Segment::from(i32::MIN),
        ]
        .into();
        let text = path.to_string();
        assert_eq!(text.parse::<SeedPath>().unwrap(), path);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "user".parse::<SeedPath>(),
            Err(Error::InvalidPath { .. })
        ));
        assert!("/a~2".parse::<SeedPath>().is_err());
        assert!("/a~".parse::<SeedPath>().is_err());
        assert!("/\"open".parse::<SeedPath>().is_err());
        assert!("/\"".parse::<SeedPath>().is_err());
    }

    #[test]
    fn test_json_form() {
        let path = parse("/user/5/name");
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, r#"["user",5,"name"]"#);
        let back: SeedPath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
    }
}
