use super::index::KeyIndex;
use crate::types::ItemId;

/// Publication timestamps in lexicographic order, which callers keep chronological
/// by using a uniform format such as RFC 3339 in UTC.
#[derive(Debug, Clone, Default)]
pub struct DateIndex {
    index: KeyIndex<String>,
}

impl DateIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, timestamp: impl Into<String>, id: ItemId) {
        self.index.add(timestamp.into(), id);
    }

    pub fn remove(&mut self, timestamp: &str, id: &ItemId) {
        self.index.remove(timestamp, id);
    }

    /// Identifiers published within `[start, end]`; `end` defaults to `start`.
    ///
    /// The iterator is lazy and can be cloned to replay it.
    pub fn range<'a>(
        &'a self,
        start: &'a str,
        end: Option<&'a str>,
    ) -> impl Iterator<Item = ItemId> + Clone + 'a {
        self.index.range(start, end.unwrap_or(start))
    }

    pub fn timestamps(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
