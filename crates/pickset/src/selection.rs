//! Selection store and item snapshot cache.
//!
//! The selection is an insertion-ordered sequence of unique ids. Alongside
//! it the store keeps the last-seen snapshot of every selected item, so a
//! tag can still be rendered after its item scrolls out of the loaded page
//! or a different query replaces the page entirely.
//!
//! The store is owned by the host. Widgets hold a [`SharedSelection`] to
//! read it and to refresh snapshots, but they request changes through
//! their `selection_changed` signal; only the host calls
//! [`SharedSelection::replace`].
//!
//! The helpers [`SelectionStore::toggled`], [`SelectionStore::without`],
//! [`SelectionStore::with_all`] and [`SelectionStore::without_all`] compute
//! the *next* sequence without mutating anything.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;
use pickset_core::logging::targets;

use crate::item::FilterableItem;

/// Remove duplicates, keeping the first occurrence of each id.
pub fn dedupe<Id>(ids: impl IntoIterator<Item = Id>) -> Vec<Id>
where
    Id: Clone + Eq + std::hash::Hash,
{
    let mut seen = HashSet::new();
    ids.into_iter()
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// Selected ids plus the snapshot cache.
#[derive(Debug, Clone)]
pub struct SelectionStore<T: FilterableItem> {
    ids: Vec<T::Id>,
    cache: HashMap<T::Id, T>,
}

impl<T: FilterableItem> Default for SelectionStore<T> {
    fn default() -> Self {
        Self {
            ids: Vec::new(),
            cache: HashMap::new(),
        }
    }
}

impl<T: FilterableItem> SelectionStore<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with an initial selection.
    pub fn with_ids(ids: impl IntoIterator<Item = T::Id>) -> Self {
        Self {
            ids: dedupe(ids),
            cache: HashMap::new(),
        }
    }

    /// The selected ids in insertion order.
    pub fn ids(&self) -> &[T::Id] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Whether `id` is selected.
    pub fn contains(&self, id: &T::Id) -> bool {
        self.ids.contains(id)
    }

    /// The cached snapshot for `id`, if one was ever observed.
    pub fn cached(&self, id: &T::Id) -> Option<&T> {
        self.cache.get(id)
    }

    /// Number of cached snapshots.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Replace the whole selection.
    ///
    /// Duplicates are dropped keeping the first occurrence. Snapshots of ids
    /// that are no longer selected are evicted. Returns `true` if the
    /// sequence changed.
    pub fn replace(&mut self, next: Vec<T::Id>) -> bool {
        let next = dedupe(next);
        if next == self.ids {
            return false;
        }

        let keep: HashSet<&T::Id> = next.iter().collect();
        let before = self.cache.len();
        self.cache.retain(|id, _| keep.contains(id));

        tracing::debug!(
            target: targets::SELECTION,
            count = next.len(),
            evicted = before - self.cache.len(),
            "selection replaced"
        );

        self.ids = next;
        true
    }

    /// Refresh cached snapshots of selected items from freshly loaded data.
    ///
    /// Only items whose id is selected are considered, and an entry is only
    /// rewritten when the loaded item differs by value. Nothing is ever
    /// evicted here. Returns the number of refreshed entries.
    pub fn reconcile(&mut self, items: &[T]) -> usize {
        let mut refreshed = 0;
        for item in items {
            let id = item.id();
            if !self.ids.contains(id) {
                continue;
            }
            if self.cache.get(id) != Some(item) {
                self.cache.insert(id.clone(), item.clone());
                refreshed += 1;
            }
        }
        if refreshed > 0 {
            tracing::trace!(target: targets::SELECTION, refreshed, "snapshot cache refreshed");
        }
        refreshed
    }

    /// Look up an item, preferring the loaded page over the cache.
    pub fn resolve<'a>(&'a self, id: &T::Id, page: &'a [T]) -> Option<&'a T> {
        page.iter()
            .find(|item| item.id() == id)
            .or_else(|| self.cache.get(id))
    }

    /// Resolve every selected id, silently skipping ones never observed.
    pub fn resolve_all<'a>(&'a self, page: &'a [T]) -> Vec<&'a T> {
        self.ids
            .iter()
            .filter_map(|id| self.resolve(id, page))
            .collect()
    }

    /// The next sequence after toggling `id`.
    ///
    /// Absent ids are appended; present ids are removed.
    pub fn toggled(&self, id: &T::Id) -> Vec<T::Id> {
        if self.contains(id) {
            self.without(id)
        } else {
            let mut next = self.ids.clone();
            next.push(id.clone());
            next
        }
    }

    /// The next sequence with `id` removed.
    pub fn without(&self, id: &T::Id) -> Vec<T::Id> {
        self.ids.iter().filter(|i| *i != id).cloned().collect()
    }

    /// The union of the selection and `ids`, existing ids first.
    pub fn with_all<'a>(&self, ids: impl IntoIterator<Item = &'a T::Id>) -> Vec<T::Id> {
        dedupe(self.ids.iter().cloned().chain(ids.into_iter().cloned()))
    }

    /// The next sequence with every id in `ids` removed.
    pub fn without_all<'a>(&self, ids: impl IntoIterator<Item = &'a T::Id>) -> Vec<T::Id> {
        let drop: HashSet<&T::Id> = ids.into_iter().collect();
        self.ids
            .iter()
            .filter(|id| !drop.contains(id))
            .cloned()
            .collect()
    }
}

/// A cloneable handle to a host-owned [`SelectionStore`].
#[derive(Debug)]
pub struct SharedSelection<T: FilterableItem> {
    inner: Arc<RwLock<SelectionStore<T>>>,
}

impl<T: FilterableItem> Clone for SharedSelection<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: FilterableItem> Default for SharedSelection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FilterableItem> SharedSelection<T> {
    /// Create an empty shared selection.
    pub fn new() -> Self {
        Self::from_store(SelectionStore::new())
    }

    /// Create a shared selection with initial ids.
    pub fn with_ids(ids: impl IntoIterator<Item = T::Id>) -> Self {
        Self::from_store(SelectionStore::with_ids(ids))
    }

    pub fn from_store(store: SelectionStore<T>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    /// A copy of the selected ids.
    pub fn ids(&self) -> Vec<T::Id> {
        self.inner.read().ids().to_vec()
    }

    /// Number of selected ids.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Replace the selection. Only the owner should call this.
    pub fn replace(&self, next: Vec<T::Id>) -> bool {
        self.inner.write().replace(next)
    }

    /// Run a closure with read access to the store.
    pub fn read<R>(&self, f: impl FnOnce(&SelectionStore<T>) -> R) -> R {
        f(&self.inner.read())
    }

    /// Refresh snapshots from loaded items.
    pub fn reconcile(&self, items: &[T]) -> usize {
        self.inner.write().reconcile(items)
    }
}
