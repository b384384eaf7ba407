use crate::types::{non_empty, ItemId, ItemRecord, OrderId};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// The index keys an item was filed under by one add.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Filing {
    pub category: Option<String>,
    pub order: Option<OrderId>,
    pub published: Option<String>,
}

impl Filing {
    pub fn of<T: ItemRecord>(item: &T) -> Self {
        Self {
            category: non_empty(item.category()).map(str::to_owned),
            order: item.order_id(),
            published: non_empty(item.published()).map(str::to_owned),
        }
    }
}

struct Slot<T> {
    item: T,
    // Every distinct filing made for this id since it entered the store.
    filings: Vec<Filing>,
}

/// Owns every item, keyed by identifier.
pub struct PrimaryStore<T> {
    slots: HashMap<ItemId, Slot<T>>,
}

impl<T> PrimaryStore<T> {
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
        }
    }

    /// Last write wins. Earlier filings are kept, so returns true when an entry was replaced.
    pub fn insert(&mut self, id: ItemId, item: T, filing: Filing) -> bool {
        match self.slots.entry(id) {
            Entry::Occupied(mut occupied) => {
                let slot = occupied.get_mut();
                slot.item = item;
                if !slot.filings.contains(&filing) {
                    slot.filings.push(filing);
                }
                true
            }
            Entry::Vacant(vacant) => {
                vacant.insert(Slot {
                    item,
                    filings: vec![filing],
                });
                false
            }
        }
    }

    pub fn get(&self, id: &ItemId) -> Option<&T> {
        self.slots.get(id).map(|slot| &slot.item)
    }

    pub fn filings(&self, id: &ItemId) -> Option<&[Filing]> {
        self.slots.get(id).map(|slot| slot.filings.as_slice())
    }

    /// Removes the entry along with its filings. No-op when absent.
    pub fn delete(&mut self, id: &ItemId) -> Option<(T, Vec<Filing>)> {
        self.slots.remove(id).map(|slot| (slot.item, slot.filings))
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.slots.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.values().map(|slot| &slot.item)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<T> Default for PrimaryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}
