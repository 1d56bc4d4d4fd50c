use playstate_models::{ExternalIdSource, ExternalIds, PlaybackRecord};
use tracing::{debug, warn};
use crate::catalog_index::CatalogIndex;

/// Outcome of mapping one backup record onto the target catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Matched {
        item_id: String,
        /// Id type that produced the match
        source: ExternalIdSource,
        external_id: String,
    },
    Unmatched,
}

impl Resolution {
    pub fn item_id(&self) -> Option<&str> {
        match self {
            Resolution::Matched { item_id, .. } => Some(item_id),
            Resolution::Unmatched => None,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, Resolution::Matched { .. })
    }
}

/// Resolves records against a fully built [`CatalogIndex`].
///
/// External ids are tried IMDb, then TMDB, then TVDB. An id that is missing
/// from the record or missing from the index simply falls through to the
/// next type; the first hit wins.
pub struct IdentityResolver<'a> {
    index: &'a CatalogIndex,
}

impl<'a> IdentityResolver<'a> {
    pub fn new(index: &'a CatalogIndex) -> Self {
        Self { index }
    }

    pub fn resolve(&self, record: &PlaybackRecord) -> Resolution {
        let resolution = self.resolve_ids(&record.external_ids);
        if let Resolution::Matched { item_id, source, external_id } = &resolution {
            debug!(
                item = record.display_name(),
                source = %source,
                external_id = %external_id,
                item_id = %item_id,
                "Matched backup item"
            );
        }
        resolution
    }

    pub fn resolve_ids(&self, ids: &ExternalIds) -> Resolution {
        let mut candidates = ids
            .iter()
            .filter_map(|(source, value)| {
                self.index
                    .lookup(source, value)
                    .map(|item_id| (source, value, item_id))
            });

        let Some((source, value, item_id)) = candidates.next() else {
            return Resolution::Unmatched;
        };

        // Lower-priority ids pointing elsewhere do not change the answer
        for (other_source, other_value, other_item) in candidates {
            if other_item != item_id {
                warn!(
                    chosen_source = %source,
                    chosen_id = value,
                    chosen_item = item_id,
                    other_source = %other_source,
                    other_id = other_value,
                    other_item,
                    "External ids resolve to different target items, keeping the higher-priority match"
                );
            }
        }

        Resolution::Matched {
            item_id: item_id.to_string(),
            source,
            external_id: value.to_string(),
        }
    }
}
