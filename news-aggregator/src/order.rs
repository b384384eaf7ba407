use crate::types::{AggregatorError, AsOrderId, OrderId, Result};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

/// A configured news source: one RSS feed of one publisher, optionally narrowed to categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsOrder {
    #[serde(default = "Uuid::new_v4")]
    pub order_id: OrderId,
    pub name: String,
    pub rss: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Upper bound on items taken from a single feed document.
    #[serde(default)]
    pub max_items: Option<usize>,
}

impl NewsOrder {
    pub fn new(name: impl Into<String>, rss: impl Into<String>) -> Self {
        Self {
            order_id: Uuid::new_v4(),
            name: name.into(),
            rss: rss.into(),
            categories: Vec::new(),
            description: None,
            max_items: None,
        }
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = Some(max_items);
        self
    }

    /// `name`, or `name_cat1_cat2` when categories are configured.
    pub fn order_key(&self) -> String {
        if self.categories.is_empty() {
            self.name.clone()
        } else {
            format!("{}_{}", self.name, self.categories.join("_"))
        }
    }

    /// Checks the feed address is an absolute http(s) URL. Nothing is fetched.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.rss)?;
        if !matches!(url.scheme(), "http" | "https") || url.host().is_none() {
            return Err(AggregatorError::InvalidInput(format!(
                "order {} has a non-http feed address: {}",
                self.name, self.rss
            )));
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl TryFrom<serde_json::Value> for NewsOrder {
    type Error = AggregatorError;

    fn try_from(value: serde_json::Value) -> Result<Self> {
        let order: NewsOrder = serde_json::from_value(value)
            .map_err(|e| AggregatorError::InvalidInput(format!("not a news order: {}", e)))?;
        order.validate()?;
        Ok(order)
    }
}

impl AsOrderId for NewsOrder {
    fn as_order_id(&self) -> OrderId {
        self.order_id
    }
}
