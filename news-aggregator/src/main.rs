use anyhow::{bail, Context};
use clap::Parser;
use news_aggregator::{LoadConfig, NewsAggregator, NewsItem, NewsOrderBundle};
use std::path::PathBuf;
use tracing::info;

/// Load news orders and their feed files, then query the collected items.
#[derive(Debug, Parser)]
#[command(name = "news-aggregator", version)]
struct Args {
    /// JSON file holding an array of news orders
    #[arg(long)]
    orders: PathBuf,

    /// Directory with one `<order_key>.xml` feed document per order
    #[arg(long, env = "NEWS_FEEDS_DIR", default_value = "feeds")]
    feeds_dir: PathBuf,

    /// Only show items in this category (repeatable)
    #[arg(long)]
    category: Vec<String>,

    /// Only show items collected for orders with this name
    #[arg(long)]
    order: Option<String>,

    /// Earliest publication timestamp, inclusive
    #[arg(long)]
    from: Option<String>,

    /// Latest publication timestamp, inclusive
    #[arg(long, requires = "from")]
    to: Option<String>,

    /// Sort category and order results by publication time
    #[arg(long)]
    sort: bool,

    /// Reverse the result order
    #[arg(long)]
    reverse: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    info!("Starting news aggregator");

    let orders = NewsOrderBundle::load(&args.orders)
        .with_context(|| format!("failed to load orders from {}", args.orders.display()))?;

    let config = LoadConfig {
        feeds_dir: args.feeds_dir.clone(),
        ..LoadConfig::default()
    };
    let mut aggregator = NewsAggregator::new(orders, config);
    let loaded = aggregator.load_all_feeds()?;
    info!("Loaded {} feeds", loaded);

    let container = aggregator.container();
    println!("{}", serde_json::to_string_pretty(container.meta())?);

    let items: Vec<&NewsItem> = if !args.category.is_empty() {
        container.search_by_category(&args.category, args.sort, args.reverse)?
    } else if let Some(name) = &args.order {
        // Orders sharing the name whose feeds produced no items are skipped
        let indexed = container.orders();
        let matching: Vec<_> = aggregator
            .orders()
            .get_by_name(name)
            .into_iter()
            .filter(|order| indexed.contains(&order.order_id))
            .collect();
        if matching.is_empty() {
            bail!("no items for order: {}", name);
        }
        container.search_by_order(matching, args.sort, args.reverse)?
    } else if let Some(from) = &args.from {
        container.search_by_date(from, args.to.as_deref(), args.reverse)
    } else {
        return Ok(());
    };

    for item in items {
        println!(
            "{}\t{}\t{}\t{}",
            item.published.as_deref().unwrap_or("-"),
            item.category.as_deref().unwrap_or("-"),
            item.title,
            item.link
        );
    }

    Ok(())
}
