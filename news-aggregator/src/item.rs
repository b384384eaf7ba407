use crate::order::NewsOrder;
use crate::types::{non_empty, AggregatorError, ItemId, ItemRecord, OrderId, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One collected news entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    #[serde(default = "Uuid::new_v4")]
    pub item_id: ItemId,
    /// The order the item was collected for.
    #[serde(default)]
    pub news_order: Option<NewsOrder>,
    pub title: String,
    pub link: String,
    /// Publication time as a sortable string, RFC 3339 in UTC when produced by the parser.
    #[serde(default)]
    pub published: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

impl NewsItem {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            item_id: Uuid::new_v4(),
            news_order: None,
            title: title.into(),
            link: link.into(),
            published: None,
            published_at: None,
            author: None,
            category: None,
            summary: None,
        }
    }

    pub fn with_order(mut self, order: NewsOrder) -> Self {
        self.news_order = Some(order);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Sets the publication timestamp string as given.
    pub fn with_published(mut self, published: impl Into<String>) -> Self {
        self.published = Some(published.into());
        self
    }

    /// Sets both publication fields from a parsed time.
    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published = Some(format_timestamp(&published_at));
        self.published_at = Some(published_at);
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn order(&self) -> Option<&NewsOrder> {
        self.news_order.as_ref()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl ItemRecord for NewsItem {
    fn item_id(&self) -> ItemId {
        self.item_id
    }

    fn category(&self) -> Option<&str> {
        non_empty(self.category.as_deref())
    }

    fn order_id(&self) -> Option<OrderId> {
        self.news_order.as_ref().map(|order| order.order_id)
    }

    fn published(&self) -> Option<&str> {
        non_empty(self.published.as_deref())
    }
}

/// Adapter for records arriving as untyped JSON.
impl TryFrom<serde_json::Value> for NewsItem {
    type Error = AggregatorError;

    fn try_from(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| AggregatorError::InvalidInput(format!("not a news item: {}", e)))
    }
}

/// Second-precision RFC 3339 in UTC, e.g. `2024-01-01T09:30:00Z`.
pub fn format_timestamp(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}
