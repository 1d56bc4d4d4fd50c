use serde::{Deserialize, Serialize};
use std::fmt;

/// Third-party catalog that issued an external identifier.
///
/// Declaration order is lookup priority: IMDb ids are the most
/// authoritative, TVDB ids the least.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExternalIdSource {
    Imdb,
    Tmdb,
    Tvdb,
}

impl ExternalIdSource {
    /// All sources in resolution priority order
    pub const PRIORITY: [ExternalIdSource; 3] = [
        ExternalIdSource::Imdb,
        ExternalIdSource::Tmdb,
        ExternalIdSource::Tvdb,
    ];

    /// Key used by the server's `ProviderIds` map
    pub fn provider_key(&self) -> &'static str {
        match self {
            ExternalIdSource::Imdb => "Imdb",
            ExternalIdSource::Tmdb => "Tmdb",
            ExternalIdSource::Tvdb => "Tvdb",
        }
    }
}

impl fmt::Display for ExternalIdSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExternalIdSource::Imdb => "IMDb",
            ExternalIdSource::Tmdb => "TMDB",
            ExternalIdSource::Tvdb => "TVDB",
        };
        f.write_str(label)
    }
}

/// External identifiers attached to one media item.
///
/// Values are opaque strings; they are compared verbatim and never parsed.
/// Serialized with the flat `ImdbId` / `TmdbId` / `TvdbId` keys of the
/// backup file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ExternalIds {
    #[serde(rename = "ImdbId", default)]
    pub imdb: Option<String>,
    #[serde(rename = "TmdbId", default)]
    pub tmdb: Option<String>,
    #[serde(rename = "TvdbId", default)]
    pub tvdb: Option<String>,
}

impl ExternalIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw values, treating empty or whitespace-only strings as absent
    pub fn from_raw(imdb: Option<String>, tmdb: Option<String>, tvdb: Option<String>) -> Self {
        Self {
            imdb: non_empty(imdb),
            tmdb: non_empty(tmdb),
            tvdb: non_empty(tvdb),
        }
    }

    pub fn get(&self, source: ExternalIdSource) -> Option<&str> {
        let value = match source {
            ExternalIdSource::Imdb => &self.imdb,
            ExternalIdSource::Tmdb => &self.tmdb,
            ExternalIdSource::Tvdb => &self.tvdb,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }

    /// Present ids in priority order
    pub fn iter(&self) -> impl Iterator<Item = (ExternalIdSource, &str)> + '_ {
        ExternalIdSource::PRIORITY
            .into_iter()
            .filter_map(move |source| self.get(source).map(|value| (source, value)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

impl fmt::Display for ExternalIds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IMDb: {}, TMDB: {}, TVDB: {}",
            self.imdb.as_deref().unwrap_or("none"),
            self.tmdb.as_deref().unwrap_or("none"),
            self.tvdb.as_deref().unwrap_or("none"),
        )
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
