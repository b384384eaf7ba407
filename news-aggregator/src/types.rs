use std::path::PathBuf;
use uuid::Uuid;

pub type ItemId = Uuid;
pub type OrderId = Uuid;

/// The fields the container reads from an item to file it into its indices.
///
/// Empty strings are treated the same as absent values.
pub trait ItemRecord {
    fn item_id(&self) -> ItemId;

    fn category(&self) -> Option<&str>;

    /// Identifier of the order (feed source) the item was collected from.
    fn order_id(&self) -> Option<OrderId>;

    /// Publication timestamp, expected to sort lexicographically in chronological order.
    fn published(&self) -> Option<&str>;
}

/// Anything that can name an order: the bare identifier or the order itself.
pub trait AsOrderId {
    fn as_order_id(&self) -> OrderId;
}

impl AsOrderId for OrderId {
    fn as_order_id(&self) -> OrderId {
        *self
    }
}

impl<T: AsOrderId + ?Sized> AsOrderId for &T {
    fn as_order_id(&self) -> OrderId {
        (**self).as_order_id()
    }
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// Directory holding one feed document per order, named after its order key.
    pub feeds_dir: PathBuf,
    pub feed_extension: String,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            feeds_dir: PathBuf::from("feeds"),
            feed_extension: "xml".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AggregatorError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Item not found: {id}")]
    ItemNotFound { id: ItemId },

    #[error("Unknown category: {category}")]
    UnknownCategory { category: String },

    #[error("Unknown order: {id}")]
    UnknownOrder { id: OrderId },

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AggregatorError {
    /// True for lookups against an index key that has no bucket.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::UnknownCategory { .. } | Self::UnknownOrder { .. })
    }
}

pub type Result<T> = std::result::Result<T, AggregatorError>;
