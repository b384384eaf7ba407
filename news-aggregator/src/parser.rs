use crate::item::NewsItem;
use crate::order::NewsOrder;
use crate::types::{AggregatorError, Result};
use feed_rs::parser;
use std::collections::HashSet;
use tracing::{debug, info};

/// Turns an already-retrieved RSS or Atom document into news items for one order.
pub struct FeedParser {
    seen_urls: HashSet<String>,
}

impl FeedParser {
    pub fn new() -> Self {
        Self {
            seen_urls: HashSet::new(),
        }
    }

    pub fn parse_items(&mut self, order: &NewsOrder, content: &[u8]) -> Result<Vec<NewsItem>> {
        debug!("Parsing feed for {} ({} bytes)", order.order_key(), content.len());

        // Parse the feed document
        let feed = parser::parse(content)
            .map_err(|e| AggregatorError::Parse(format!("Failed to parse feed: {}", e)))?;

        // Convert entries, stopping at the order's item limit
        let limit = order.max_items.unwrap_or(usize::MAX);
        let mut items = Vec::new();
        for entry in feed.entries {
            if items.len() >= limit {
                break;
            }
            if let Some(item) = self.parse_entry(order, entry) {
                items.push(item);
            }
        }

        info!("Parsed {} items for order {}", items.len(), order.order_key());
        Ok(items)
    }

    fn parse_entry(&mut self, order: &NewsOrder, entry: feed_rs::model::Entry) -> Option<NewsItem> {
        // Get the primary link
        let link = entry.links.first()?.href.clone();

        // Check for duplicates based on URL
        if !self.seen_urls.insert(link.clone()) {
            debug!("Skipping duplicate entry with URL: {}", link);
            return None;
        }

        // Extract basic information
        let title = entry
            .title
            .map(|t| t.content)
            .unwrap_or_else(|| "Untitled".to_string());
        let mut item = NewsItem::new(title, link).with_order(order.clone());

        // Entry categories win over the order's configured ones
        let category = entry
            .categories
            .into_iter()
            .map(|c| c.term)
            .find(|term| !term.is_empty())
            .or_else(|| order.categories.first().cloned());
        item.category = category;

        // Fall back to the update time when there is no publication date
        if let Some(published_at) = entry.published.or(entry.updated) {
            item = item.with_published_at(published_at);
        }
        // Optional fields
        item.author = entry.authors.into_iter().map(|p| p.name).find(|name| !name.is_empty());
        item.summary = entry.summary.map(|s| s.content);

        Some(item)
    }

    /// Forgets links seen so far, so a later document may repeat them.
    pub fn reset(&mut self) {
        self.seen_urls.clear();
    }
}

impl Default for FeedParser {
    fn default() -> Self {
        Self::new()
    }
}
