use std::collections::HashMap;
use playstate_models::ExternalIdSource;
use playstate_sources::{MediaServer, ServerItem};
use tracing::{debug, error, info, warn};
use crate::context::RunContext;
use crate::error::CoreError;

/// Counters gathered while scanning the catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogStats {
    pub pages_fetched: usize,
    pub items_retrieved: usize,
    /// Last `TotalRecordCount` the server reported
    pub reported_total: usize,
    /// Items that carried no external id at all
    pub items_without_ids: usize,
    /// `(source, value)` pairs already mapped to a different item and overwritten
    pub duplicate_keys: usize,
}

/// Reverse map from external ids to target-server item ids.
///
/// One index per id source, so a lookup is a single hash probe keyed by
/// `(source, value)`. When two catalog items share an external id the later
/// one wins.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    by_imdb: HashMap<String, String>,
    by_tmdb: HashMap<String, String>,
    by_tvdb: HashMap<String, String>,
    stats: CatalogStats,
}

impl CatalogIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a fixed set of items, as the scan would
    pub fn from_items<'a, I>(items: I) -> Self
    where
        I: IntoIterator<Item = &'a ServerItem>,
    {
        let mut index = Self::new();
        for item in items {
            index.insert_item(item);
            index.stats.items_retrieved += 1;
        }
        index
    }

    fn map_for(&self, source: ExternalIdSource) -> &HashMap<String, String> {
        match source {
            ExternalIdSource::Imdb => &self.by_imdb,
            ExternalIdSource::Tmdb => &self.by_tmdb,
            ExternalIdSource::Tvdb => &self.by_tvdb,
        }
    }

    fn map_for_mut(&mut self, source: ExternalIdSource) -> &mut HashMap<String, String> {
        match source {
            ExternalIdSource::Imdb => &mut self.by_imdb,
            ExternalIdSource::Tmdb => &mut self.by_tmdb,
            ExternalIdSource::Tvdb => &mut self.by_tvdb,
        }
    }

    /// Map `(source, value)` to `item_id`, replacing any earlier mapping
    pub fn insert(&mut self, source: ExternalIdSource, value: &str, item_id: &str) {
        let previous = self
            .map_for_mut(source)
            .insert(value.to_string(), item_id.to_string());

        if let Some(previous) = previous {
            if previous != item_id {
                self.stats.duplicate_keys += 1;
                debug!(
                    source = %source,
                    external_id = value,
                    previous_item = %previous,
                    item_id,
                    "Duplicate external id in catalog, keeping the later item"
                );
            }
        }
    }

    /// Insert every present external id of one item; returns how many were mapped
    pub fn insert_item(&mut self, item: &ServerItem) -> usize {
        let mut mapped = 0;
        for (source, value) in item.external_ids.iter() {
            self.insert(source, value, &item.id);
            mapped += 1;
        }
        if mapped == 0 {
            self.stats.items_without_ids += 1;
        }
        mapped
    }

    pub fn lookup(&self, source: ExternalIdSource, value: &str) -> Option<&str> {
        self.map_for(source).get(value).map(String::as_str)
    }

    /// Number of `(source, value)` entries
    pub fn len(&self) -> usize {
        self.by_imdb.len() + self.by_tmdb.len() + self.by_tvdb.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> &CatalogStats {
        &self.stats
    }
}

/// Scan the whole target catalog and build the external id index.
///
/// Any failed page aborts the scan: a partial index would quietly miss every
/// item on the pages that were never read.
pub async fn build_catalog_index<S>(server: &S, ctx: &RunContext) -> Result<CatalogIndex, CoreError>
where
    S: MediaServer + ?Sized,
{
    build_catalog_index_with_progress(server, ctx, |_, _| {}).await
}

/// Same as [`build_catalog_index`], calling `on_page(retrieved, total)` after each page
pub async fn build_catalog_index_with_progress<S, F>(
    server: &S,
    ctx: &RunContext,
    mut on_page: F,
) -> Result<CatalogIndex, CoreError>
where
    S: MediaServer + ?Sized,
    F: FnMut(usize, usize),
{
    let page_size = ctx.catalog_page_size.max(1);
    info!(
        server = server.server_name(),
        page_size,
        "Retrieving all movies and episodes to build the external id map"
    );

    let mut index = CatalogIndex::new();
    let mut retrieved = 0usize;
    let mut total = 0usize;
    let mut page = 0usize;

    loop {
        let start_index = page * page_size;
        let item_page = match server.get_catalog_page(start_index, page_size).await {
            Ok(item_page) => item_page,
            Err(e) => {
                error!(
                    page,
                    start_index,
                    retrieved,
                    total,
                    error = %e,
                    "Failed to retrieve catalog page, cannot build the external id map"
                );
                return Err(CoreError::CatalogIncomplete {
                    page,
                    retrieved,
                    total,
                    source: e,
                });
            }
        };
        index.stats.pages_fetched += 1;
        total = item_page.total_record_count;

        if item_page.returned == 0 {
            if retrieved < total {
                warn!(
                    page,
                    retrieved,
                    total,
                    "Catalog returned an empty page before the reported total was reached, stopping"
                );
            } else {
                debug!(page, "No more catalog items");
            }
            break;
        }

        for item in &item_page.items {
            index.insert_item(item);
        }
        retrieved += item_page.returned;
        on_page(retrieved, total);

        info!(page, retrieved, total, "Retrieved catalog items for mapping");

        if retrieved >= total {
            break;
        }
        page += 1;
    }

    index.stats.items_retrieved = retrieved;
    index.stats.reported_total = total;

    info!(
        entries = index.len(),
        pages = index.stats.pages_fetched,
        items = retrieved,
        duplicates = index.stats.duplicate_keys,
        without_ids = index.stats.items_without_ids,
        "Finished building external id map"
    );
    Ok(index)
}
