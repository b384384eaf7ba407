use crate::{FeedParser, LoadConfig, NewsContainer, NewsOrder, NewsOrderBundle, Result, AggregatorError};
use crate::types::{AsOrderId, OrderId};
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Ties the configured orders to a container: feed documents are parsed per order
/// and their items added.
pub struct NewsAggregator {
    orders: NewsOrderBundle,
    parser: FeedParser,
    container: NewsContainer,
    config: LoadConfig,
}

impl NewsAggregator {
    pub fn new(orders: NewsOrderBundle, config: LoadConfig) -> Self {
        Self {
            orders,
            parser: FeedParser::new(),
            container: NewsContainer::new(),
            config,
        }
    }

    /// Parses one feed document for a registered order and adds its items.
    pub fn ingest_feed(&mut self, order: impl AsOrderId, content: &[u8]) -> Result<usize> {
        // Only registered orders may contribute items
        let id = order.as_order_id();
        let order = self
            .orders
            .get(id)
            .ok_or(AggregatorError::UnknownOrder { id })?;
        let items = self.parser.parse_items(order, content)?;

        // Store the parsed items
        Ok(self.container.add_batch(items))
    }

    /// Where the feed document for `order` is expected on disk.
    pub fn feed_path(&self, order: &NewsOrder) -> PathBuf {
        self.config
            .feeds_dir
            .join(format!("{}.{}", order.order_key(), self.config.feed_extension))
    }

    /// Loads the feed file of every order. Missing or broken files are logged and
    /// skipped; returns how many feeds were ingested.
    pub fn load_all_feeds(&mut self) -> Result<usize> {
        // Snapshot the order ids before ingesting
        let ids: Vec<OrderId> = self.orders.iter().map(|order| order.order_id).collect();
        let total_feeds = ids.len();
        let mut loaded = 0;

        info!("Loading {} feeds from {}", total_feeds, self.config.feeds_dir.display());

        for id in ids {
            let Some(order) = self.orders.get(id) else {
                continue;
            };
            // Read the feed file for this order
            let path = self.feed_path(order);
            let content = match std::fs::read(&path) {
                Ok(content) => content,
                Err(e) => {
                    warn!("Skipping {}: cannot read {}: {}", order.order_key(), path.display(), e);
                    continue;
                }
            };

            // Parse and store, logging failures without stopping the load
            match self.ingest_feed(id, &content) {
                Ok(count) => {
                    info!("Feed {}: ingested {} items", path.display(), count);
                    loaded += 1;
                }
                Err(e) => error!("Failed to ingest feed {}: {}", path.display(), e),
            }
        }

        info!("Successfully loaded {}/{} feeds", loaded, total_feeds);
        Ok(loaded)
    }

    pub fn orders(&self) -> &NewsOrderBundle {
        &self.orders
    }

    pub fn container(&self) -> &NewsContainer {
        &self.container
    }

    pub fn container_mut(&mut self) -> &mut NewsContainer {
        &mut self.container
    }
}
