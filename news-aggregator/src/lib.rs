pub mod types;
pub mod item;
pub mod order;
pub mod bundle;
pub mod container;
pub mod parser;
pub mod aggregator;

pub use types::*;
pub use item::NewsItem;
pub use order::NewsOrder;
pub use bundle::NewsOrderBundle;
pub use container::{Meta, NewsContainer};
pub use parser::FeedParser;
pub use aggregator::NewsAggregator;
