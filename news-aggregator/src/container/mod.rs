//! The multi-index item container.
//!
//! Items live in a [`PrimaryStore`]; the category, order and date indices only
//! hold identifiers pointing back into it. Every mutating method finishes by
//! rebuilding [`Meta`] from the live indices.
//!
//! Re-adding an identifier with different field values leaves it filed under the
//! old values as well; use [`NewsContainer::upsert`] to re-index instead. Removal
//! always prunes every key an identifier was filed under, whatever values the
//! caller's copy of the item carries.

mod date_index;
mod index;
mod meta;
mod store;

pub use date_index::DateIndex;
pub use index::KeyIndex;
pub use meta::Meta;
pub use store::{Filing, PrimaryStore};

use crate::item::NewsItem;
use crate::types::{AggregatorError, AsOrderId, ItemId, ItemRecord, OrderId, Result};
use indexmap::IndexSet;
use tracing::{debug, info, warn};

pub struct NewsContainer<T = NewsItem> {
    store: PrimaryStore<T>,
    by_category: KeyIndex<String>,
    by_order: KeyIndex<OrderId>,
    by_date: DateIndex,
    meta: Meta,
}

impl<T: ItemRecord> NewsContainer<T> {
    pub fn new() -> Self {
        Self {
            store: PrimaryStore::new(),
            by_category: KeyIndex::new(),
            by_order: KeyIndex::new(),
            by_date: DateIndex::new(),
            meta: Meta::default(),
        }
    }

    pub fn add(&mut self, item: T) {
        self.insert(item);
        self.refresh_meta();
    }

    pub fn add_batch<I>(&mut self, items: I) -> usize
    where
        I: IntoIterator<Item = T>,
    {
        let mut added = 0;
        for item in items {
            self.insert(item);
            added += 1;
        }
        self.refresh_meta();
        info!("Added {} items, container now holds {}", added, self.store.len());
        added
    }

    /// Adds the item after dropping every filing of its identifier, so no stale
    /// index membership survives a change of category, order or date.
    pub fn upsert(&mut self, item: T) {
        self.detach(item.item_id());
        self.insert(item);
        self.refresh_meta();
    }

    /// Removes the stored item with this item's identifier. Absent items are ignored.
    pub fn remove(&mut self, item: &T) -> Option<T> {
        let removed = self.detach(item.item_id());
        self.refresh_meta();
        removed
    }

    pub fn remove_batch<'a, I>(&mut self, items: I) -> usize
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        let removed = items
            .into_iter()
            .filter_map(|item| self.detach(item.item_id()))
            .count();
        self.refresh_meta();
        info!("Removed {} items, container now holds {}", removed, self.store.len());
        removed
    }

    pub fn remove_id(&mut self, id: ItemId) -> Option<T> {
        let removed = self.detach(id);
        self.refresh_meta();
        removed
    }

    pub fn get(&self, id: ItemId) -> Result<&T> {
        self.store.get(&id).ok_or(AggregatorError::ItemNotFound { id })
    }

    /// Items in the order the identifiers were given. Fails on the first unknown one.
    pub fn get_many<I>(&self, ids: I) -> Result<Vec<&T>>
    where
        I: IntoIterator<Item = ItemId>,
    {
        ids.into_iter().map(|id| self.get(id)).collect()
    }

    /// Every set of index keys the identifier has been filed under since it was added.
    pub fn filings(&self, id: ItemId) -> Option<&[Filing]> {
        self.store.filings(&id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.store.contains(&id)
    }

    /// Union of the given categories' items.
    ///
    /// Unsorted results follow the categories in the order given, each in insertion
    /// order. `sort` orders by publication time, items without one first; `reverse`
    /// flips whichever order results.
    pub fn search_by_category<I, S>(&self, categories: I, sort: bool, reverse: bool) -> Result<Vec<&T>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ids = IndexSet::new();
        for category in categories {
            let category = category.as_ref();
            let bucket = self.by_category.lookup(category).ok_or_else(|| {
                AggregatorError::UnknownCategory {
                    category: category.to_string(),
                }
            })?;
            ids.extend(bucket.iter().copied());
        }
        Ok(self.resolve(ids, sort, reverse))
    }

    /// Same as [`search_by_category`](Self::search_by_category), keyed by order.
    pub fn search_by_order<I, O>(&self, orders: I, sort: bool, reverse: bool) -> Result<Vec<&T>>
    where
        I: IntoIterator<Item = O>,
        O: AsOrderId,
    {
        let mut ids = IndexSet::new();
        for order in orders {
            let id = order.as_order_id();
            let bucket = self
                .by_order
                .lookup(&id)
                .ok_or(AggregatorError::UnknownOrder { id })?;
            ids.extend(bucket.iter().copied());
        }
        Ok(self.resolve(ids, sort, reverse))
    }

    /// Items published within `[start, end]`, oldest first. Without `end` only
    /// items published exactly at `start` match.
    ///
    /// An item re-added under a new timestamp is listed once, at its earliest match.
    pub fn search_by_date(&self, start: &str, end: Option<&str>, reverse: bool) -> Vec<&T> {
        let ids: IndexSet<ItemId> = self.by_date.range(start, end).collect();
        self.resolve(ids, false, reverse)
    }

    pub fn categories(&self) -> Vec<&str> {
        self.by_category.keys().map(String::as_str).collect()
    }

    pub fn orders(&self) -> Vec<OrderId> {
        self.by_order.keys().copied().collect()
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn size(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Stored items in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.store.iter()
    }

    fn insert(&mut self, item: T) {
        let id = item.item_id();
        let filing = Filing::of(&item);
        if let Some(category) = &filing.category {
            self.by_category.add(category.clone(), id);
        }
        if let Some(order) = filing.order {
            self.by_order.add(order, id);
        }
        if let Some(published) = &filing.published {
            self.by_date.add(published.as_str(), id);
        }
        if self.store.insert(id, item, filing) {
            debug!("Replaced item {}, earlier index keys are kept", id);
        } else {
            debug!("Inserted item {}", id);
        }
    }

    fn detach(&mut self, id: ItemId) -> Option<T> {
        let (item, filings) = self.store.delete(&id)?;
        for filing in &filings {
            if let Some(category) = &filing.category {
                self.by_category.remove(category.as_str(), &id);
            }
            if let Some(order) = &filing.order {
                self.by_order.remove(order, &id);
            }
            if let Some(published) = &filing.published {
                self.by_date.remove(published, &id);
            }
        }
        debug!("Removed item {}", id);
        Some(item)
    }

    fn resolve<I>(&self, ids: I, sort: bool, reverse: bool) -> Vec<&T>
    where
        I: IntoIterator<Item = ItemId>,
    {
        let mut items: Vec<&T> = ids.into_iter().filter_map(|id| self.store.get(&id)).collect();
        if sort {
            items.sort_by(|a, b| a.published().cmp(&b.published()));
        }
        if reverse {
            items.reverse();
        }
        items
    }

    fn refresh_meta(&mut self) {
        self.meta = Meta::compute(self.store.len(), &self.by_category, &self.by_order);
    }
}

impl<T> NewsContainer<T>
where
    T: ItemRecord + TryFrom<serde_json::Value, Error = AggregatorError>,
{
    /// Adds records arriving as untyped JSON.
    ///
    /// Stops at the first value that is not an item; values before it stay added.
    pub fn add_values<I>(&mut self, values: I) -> Result<usize>
    where
        I: IntoIterator<Item = serde_json::Value>,
    {
        let mut added = 0;
        let mut outcome = Ok(());
        for value in values {
            match T::try_from(value) {
                Ok(item) => {
                    self.insert(item);
                    added += 1;
                }
                Err(e) => {
                    warn!("Stopped adding after {} items: {}", added, e);
                    outcome = Err(e);
                    break;
                }
            }
        }
        self.refresh_meta();
        outcome.map(|()| added)
    }

    /// Untyped counterpart of [`remove_batch`](Self::remove_batch), with the same
    /// stop-at-first-invalid behavior as [`add_values`](Self::add_values).
    pub fn remove_values<I>(&mut self, values: I) -> Result<usize>
    where
        I: IntoIterator<Item = serde_json::Value>,
    {
        let mut removed = 0;
        let mut outcome = Ok(());
        for value in values {
            match T::try_from(value) {
                Ok(item) => {
                    if self.detach(item.item_id()).is_some() {
                        removed += 1;
                    }
                }
                Err(e) => {
                    warn!("Stopped removing after {} items: {}", removed, e);
                    outcome = Err(e);
                    break;
                }
            }
        }
        self.refresh_meta();
        outcome.map(|()| removed)
    }
}

impl<T: ItemRecord> Default for NewsContainer<T> {
    fn default() -> Self {
        Self::new()
    }
}
