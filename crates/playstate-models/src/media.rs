use serde::{Deserialize, Serialize};
use std::fmt;

/// Media kind as reported by the server's `Type` field.
///
/// Only movies and episodes take part in catalog lookups; anything else
/// (series, audio, folders) is carried through as its raw name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum MediaKind {
    Movie,
    Episode,
    Other(String),
}

impl MediaKind {
    /// Kinds requested when paginating the catalog for index building
    pub const CATALOG_KINDS: [MediaKind; 2] = [MediaKind::Movie, MediaKind::Episode];

    pub fn as_str(&self) -> &str {
        match self {
            MediaKind::Movie => "Movie",
            MediaKind::Episode => "Episode",
            MediaKind::Other(name) => name,
        }
    }
}

impl From<String> for MediaKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Movie" => MediaKind::Movie,
            "Episode" => MediaKind::Episode,
            _ => MediaKind::Other(value),
        }
    }
}

impl From<MediaKind> for String {
    fn from(kind: MediaKind) -> Self {
        kind.as_str().to_string()
    }
}

impl Default for MediaKind {
    fn default() -> Self {
        MediaKind::Other(String::new())
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_kinds_parse() {
        assert_eq!(MediaKind::from("Movie".to_string()), MediaKind::Movie);
        assert_eq!(MediaKind::from("Episode".to_string()), MediaKind::Episode);
    }

    #[test]
    fn test_unknown_kind_is_preserved() {
        let kind: MediaKind = serde_json::from_str("\"Series\"").unwrap();
        assert_eq!(kind, MediaKind::Other("Series".to_string()));
        assert_eq!(serde_json::to_string(&kind).unwrap(), "\"Series\"");
    }
}
