//! List view-model: the authoritative in-memory copy of the caller's
//! collection plus the search/filter/sort inputs that derive what is shown.
//!
//! Mutations go to the gateway first; the local list is reconciled only
//! after the remote write succeeded, and left untouched when it failed.

use std::cmp::Ordering;

use icu_collator::{Collator, CollatorOptions, Strength};
use tracing::warn;

use crate::error::{Error, Result};
use crate::gateway::RecordGateway;
use crate::models::{CollectionEntry, EntryPatch, EntryType, NewEntry};
use crate::progress::{self, ProgressChange};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Only(EntryType),
}

impl TypeFilter {
    fn accepts(&self, entry: &CollectionEntry) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Only(t) => entry.entry_type == *t,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Newest,
    Alphabetical,
    Progress,
}

/// Locale-aware title ordering (CLDR root collation, tertiary strength).
/// Ties fall back to the raw strings so distinct titles never compare equal.
pub struct TitleOrder {
    collator: Option<Collator>,
}

impl TitleOrder {
    pub fn new() -> Self {
        let mut options = CollatorOptions::new();
        options.strength = Some(Strength::Tertiary);
        let collator = match Collator::try_new(&Default::default(), options) {
            Ok(collator) => Some(collator),
            Err(e) => {
                warn!("Title collation unavailable, sorting case-insensitively: {}", e);
                None
            }
        };
        Self { collator }
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        let primary = match &self.collator {
            Some(collator) => collator.compare(a, b),
            None => a.to_lowercase().cmp(&b.to_lowercase()),
        };
        primary.then_with(|| a.cmp(b))
    }
}

impl Default for TitleOrder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn compare_titles(a: &str, b: &str) -> Ordering {
    TitleOrder::new().compare(a, b)
}

/// Clears the loading flag however the fetch ends, including when the
/// future is dropped before completion.
struct Loading<'a>(&'a mut bool);

impl<'a> Loading<'a> {
    fn start(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

/// Displayed sequence for `entries`. Pure; the input is never reordered.
pub fn derive(
    entries: &[CollectionEntry],
    search_query: &str,
    type_filter: TypeFilter,
    sort_key: SortKey,
) -> Vec<CollectionEntry> {
    let query = search_query.trim().to_lowercase();

    let mut list: Vec<CollectionEntry> = entries
        .iter()
        .filter(|e| query.is_empty() || e.title.to_lowercase().contains(&query))
        .filter(|e| type_filter.accepts(e))
        .cloned()
        .collect();

    // sort_by is stable, so equal keys keep their authoritative order.
    match sort_key {
        SortKey::Newest => list.sort_by(|a, b| b.id.cmp(&a.id)),
        SortKey::Alphabetical => {
            let order = TitleOrder::new();
            list.sort_by(|a, b| order.compare(&a.title, &b.title))
        }
        SortKey::Progress => list.sort_by(|a, b| b.progress.cmp(&a.progress)),
    }
    list
}

pub struct ListViewModel<G> {
    gateway: G,
    entries: Vec<CollectionEntry>,
    search_query: String,
    type_filter: TypeFilter,
    sort_key: SortKey,
    error: Option<String>,
    loading: bool,
}

impl<G: RecordGateway<CollectionEntry>> ListViewModel<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            entries: Vec::new(),
            search_query: String::new(),
            type_filter: TypeFilter::All,
            sort_key: SortKey::Newest,
            error: None,
            loading: false,
        }
    }

    pub fn entries(&self) -> &[CollectionEntry] {
        &self.entries
    }

    pub fn entry(&self, id: i64) -> Option<&CollectionEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    pub fn type_filter(&self) -> TypeFilter {
        self.type_filter
    }

    pub fn set_type_filter(&mut self, filter: TypeFilter) {
        self.type_filter = filter;
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    pub fn set_sort_key(&mut self, key: SortKey) {
        self.sort_key = key;
    }

    /// Recomputed on every call.
    pub fn displayed(&self) -> Vec<CollectionEntry> {
        derive(&self.entries, &self.search_query, self.type_filter, self.sort_key)
    }

    pub fn apply_created(&mut self, entry: CollectionEntry) {
        self.entries.insert(0, entry);
    }

    /// Replaces the entry with the same id in place; unknown ids are ignored.
    pub fn apply_updated(&mut self, entry: CollectionEntry) {
        if let Some(slot) = self.entries.iter_mut().find(|e| e.id == entry.id) {
            *slot = entry;
        }
    }

    pub fn apply_deleted(&mut self, id: i64) {
        self.entries.retain(|e| e.id != id);
    }

    fn surface<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(ref e) = result {
            warn!("Collection action failed: {}", e);
            self.error = Some(e.message().to_string());
        }
        result
    }

    fn local_entry(&self, id: i64) -> Result<CollectionEntry> {
        self.entry(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Collection entry {} is not in the list", id)))
    }

    /// Replaces the whole list with the remote one.
    pub async fn refresh(&mut self) -> Result<()> {
        self.error = None;
        let fetched = {
            let _loading = Loading::start(&mut self.loading);
            self.gateway.get_all().await
        };

        let entries = self.surface(fetched)?;
        self.entries = entries;
        Ok(())
    }

    pub async fn add(
        &mut self,
        title: &str,
        entry_type: EntryType,
        date_simulcast: Option<String>,
    ) -> Result<CollectionEntry> {
        self.error = None;
        let title = title.trim();
        if title.is_empty() {
            return self.surface(Err(Error::Validation("Title must not be empty".into())));
        }

        let mut new = NewEntry::new(title, entry_type);
        new.date_simulcast = date_simulcast;

        let created = self.gateway.create(new).await;
        let created = self.surface(created)?;
        self.apply_created(created.clone());
        Ok(created)
    }

    pub async fn update(&mut self, id: i64, patch: EntryPatch) -> Result<CollectionEntry> {
        self.error = None;
        let updated = self.gateway.update(id, patch).await;
        let updated = self.surface(updated)?;
        self.apply_updated(updated.clone());
        Ok(updated)
    }

    pub async fn rename(&mut self, id: i64, title: &str) -> Result<CollectionEntry> {
        let title = title.trim();
        if title.is_empty() {
            self.error = None;
            return self.surface(Err(Error::Validation("Title must not be empty".into())));
        }
        self.update(id, EntryPatch::title(title)).await
    }

    /// Applies the progress policy to the local value and writes the result.
    /// Nothing is sent when the policy leaves the value unchanged.
    pub async fn adjust_progress(&mut self, id: i64, change: ProgressChange) -> Result<CollectionEntry> {
        self.error = None;
        let entry = self.local_entry(id);
        let entry = self.surface(entry)?;
        let next = progress::apply(entry.progress, change);
        let next = self.surface(next)?;

        if next == entry.progress {
            return Ok(entry);
        }
        self.update(id, EntryPatch::progress(next)).await
    }

    /// One more episode watched: progress +1 and, when the release date
    /// parses, the date moves to the following week.
    pub async fn mark_watched(&mut self, id: i64) -> Result<CollectionEntry> {
        self.error = None;
        let entry = self.local_entry(id);
        let entry = self.surface(entry)?;
        let next = progress::apply(entry.progress, ProgressChange::Increment(1));
        let next = self.surface(next)?;

        let patch = EntryPatch {
            progress: Some(next),
            date_simulcast: entry.date_simulcast.as_deref().and_then(progress::next_release),
            ..EntryPatch::default()
        };
        self.update(id, patch).await
    }

    /// Deletes after `confirm` approved the prompt. A declined prompt is a
    /// local error and nothing is sent.
    pub async fn remove<F>(&mut self, id: i64, confirm: F) -> Result<()>
    where
        F: FnOnce(&str) -> bool,
    {
        self.error = None;
        let prompt = match self.entry(id) {
            Some(entry) => format!("Delete \"{}\"?", entry.title),
            None => format!("Delete entry {}?", id),
        };
        if !confirm(&prompt) {
            return self.surface(Err(Error::Local("Deletion cancelled".into())));
        }

        let deleted = self.gateway.delete(id).await;
        self.surface(deleted)?;
        self.apply_deleted(id);
        Ok(())
    }
}
