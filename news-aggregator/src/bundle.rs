use crate::order::NewsOrder;
use crate::types::{AggregatorError, AsOrderId, OrderId, Result};
use indexmap::IndexMap;
use std::path::Path;
use tracing::{debug, info};

/// Orders keyed by their own identifier, so one source definition is held once.
#[derive(Debug, Clone, Default)]
pub struct NewsOrderBundle {
    orders: IndexMap<OrderId, NewsOrder>,
}

impl NewsOrderBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a JSON array of orders, validating each one.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let values: Vec<serde_json::Value> = serde_json::from_str(json)?;
        let mut bundle = Self::new();
        for value in values {
            bundle.insert(NewsOrder::try_from(value)?);
        }
        Ok(bundle)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let bundle = Self::from_json_str(&json)?;
        info!("Loaded {} orders from {}", bundle.len(), path.display());
        Ok(bundle)
    }

    /// Inserts under the order's own identifier, replacing any order with the same one.
    pub fn insert(&mut self, order: NewsOrder) -> Option<NewsOrder> {
        debug!("Registering order {} ({})", order.order_key(), order.order_id);
        self.orders.insert(order.order_id, order)
    }

    /// Inserts under an explicit key, which must be the order's identifier.
    pub fn insert_with_id(&mut self, id: OrderId, order: NewsOrder) -> Result<Option<NewsOrder>> {
        if id != order.order_id {
            return Err(AggregatorError::InvalidInput(format!(
                "key {} does not match order id {}",
                id, order.order_id
            )));
        }
        Ok(self.insert(order))
    }

    pub fn get(&self, order: impl AsOrderId) -> Option<&NewsOrder> {
        self.orders.get(&order.as_order_id())
    }

    pub fn get_by_name(&self, name: &str) -> Vec<&NewsOrder> {
        self.orders.values().filter(|order| order.name == name).collect()
    }

    pub fn contains(&self, order: impl AsOrderId) -> bool {
        self.orders.contains_key(&order.as_order_id())
    }

    pub fn remove(&mut self, order: impl AsOrderId) -> Option<NewsOrder> {
        self.orders.shift_remove(&order.as_order_id())
    }

    pub fn iter(&self) -> impl Iterator<Item = &NewsOrder> {
        self.orders.values()
    }

    pub fn to_vec(&self) -> Vec<NewsOrder> {
        self.orders.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
