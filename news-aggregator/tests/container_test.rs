use news_aggregator::container::{DateIndex, KeyIndex};
use news_aggregator::{AggregatorError, NewsContainer, NewsItem, NewsOrder, Result};
use serde_json::json;
use std::sync::Once;
use tracing::info;
use uuid::Uuid;

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

fn item(title: &str, category: Option<&str>, published: Option<&str>) -> NewsItem {
    let mut item = NewsItem::new(title, format!("https://example.com/{}", title));
    item.category = category.map(str::to_string);
    item.published = published.map(str::to_string);
    item
}

fn titles(items: &[&NewsItem]) -> Vec<String> {
    items.iter().map(|item| item.title.clone()).collect()
}

#[test]
fn test_added_item_is_found_by_category_and_id() -> Result<()> {
    init_tracing();

    let mut container = NewsContainer::new();
    let a = item("a", Some("tech"), Some("2024-01-01"));
    container.add(a.clone());

    assert_eq!(container.get(a.item_id)?, &a);
    assert_eq!(titles(&container.search_by_category(["tech"], false, false)?), ["a"]);
    assert_eq!(container.size(), 1);
    Ok(())
}

#[test]
fn test_sorted_category_search_orders_by_publication() -> Result<()> {
    init_tracing();

    let mut container = NewsContainer::new();
    container.add_batch(vec![
        item("a", Some("tech"), Some("2024-01-02")),
        item("b", Some("tech"), Some("2024-01-01")),
    ]);

    let sorted = container.search_by_category(["tech"], true, false)?;
    assert_eq!(titles(&sorted), ["b", "a"]);

    let reversed = container.search_by_category(["tech"], true, true)?;
    assert_eq!(titles(&reversed), ["a", "b"]);

    // Without sort, reverse flips insertion order.
    let unsorted_reversed = container.search_by_category(["tech"], false, true)?;
    assert_eq!(titles(&unsorted_reversed), ["b", "a"]);
    Ok(())
}

#[test]
fn test_removing_last_items_prunes_category() {
    init_tracing();

    let mut container = NewsContainer::new();
    let a = item("a", Some("tech"), Some("2024-01-02"));
    let b = item("b", Some("tech"), Some("2024-01-01"));
    container.add_batch(vec![a.clone(), b.clone()]);
    assert_eq!(container.categories(), ["tech"]);

    let removed = container.remove_batch([&a, &b]);
    assert_eq!(removed, 2);
    assert!(container.categories().is_empty());
    assert_eq!(container.size(), 0);
    assert!(container.search_by_date("0000", Some("9999"), false).is_empty());
    assert_eq!(container.meta().total_items, 0);
    assert!(container.meta().items_per_category.is_empty());
}

#[test]
fn test_date_range_is_inclusive_and_ascending() {
    init_tracing();

    let mut container = NewsContainer::new();
    container.add_batch(vec![
        item("a", Some("tech"), Some("2024-01-02")),
        item("b", Some("tech"), Some("2024-01-01")),
        item("c", None, Some("2024-01-03")),
        item("d", None, None),
    ]);

    let both = container.search_by_date("2024-01-01", Some("2024-01-02"), false);
    assert_eq!(titles(&both), ["b", "a"]);

    let exact = container.search_by_date("2024-01-01", None, false);
    assert_eq!(titles(&exact), ["b"]);

    let all_reversed = container.search_by_date("2024-01-01", Some("2024-12-31"), true);
    assert_eq!(titles(&all_reversed), ["c", "a", "b"]);

    let inverted = container.search_by_date("2024-01-03", Some("2024-01-01"), false);
    assert!(inverted.is_empty());

    assert!(container.search_by_date("2023-12-31", None, false).is_empty());
}

#[test]
fn test_unknown_id_is_not_found() {
    init_tracing();

    let mut container = NewsContainer::new();
    let a = item("a", None, None);
    container.add(a.clone());

    let missing = Uuid::new_v4();
    match container.get(missing) {
        Err(AggregatorError::ItemNotFound { id }) => assert_eq!(id, missing),
        other => panic!("expected ItemNotFound, got {:?}", other.map(|item| item.title.clone())),
    }

    assert!(matches!(
        container.get_many([a.item_id, missing]),
        Err(AggregatorError::ItemNotFound { .. })
    ));
}

#[test]
fn test_get_many_keeps_caller_order() -> Result<()> {
    init_tracing();

    let mut container = NewsContainer::new();
    let a = item("a", None, None);
    let b = item("b", None, None);
    let c = item("c", None, None);
    container.add_batch(vec![a.clone(), b.clone(), c.clone()]);

    let items = container.get_many([c.item_id, a.item_id, b.item_id])?;
    assert_eq!(titles(&items), ["c", "a", "b"]);
    assert_eq!(container.iter().count(), 3);

    assert_eq!(container.remove_id(b.item_id), Some(b.clone()));
    assert!(container.remove_id(b.item_id).is_none());
    assert_eq!(container.meta().total_items, 2);
    Ok(())
}

#[test]
fn test_non_item_value_is_invalid_input() {
    init_tracing();

    let mut container: NewsContainer = NewsContainer::new();
    let result = container.add_values([json!(42)]);

    assert!(matches!(result, Err(AggregatorError::InvalidInput(_))));
    assert_eq!(container.size(), 0);
    assert_eq!(container.meta().total_items, 0);
}

#[test]
fn test_untyped_batch_keeps_items_before_failure() {
    init_tracing();

    let a = item("a", Some("tech"), Some("2024-01-01"));
    let b = item("b", Some("tech"), Some("2024-01-02"));

    let mut container: NewsContainer = NewsContainer::new();
    let result = container.add_values([
        serde_json::to_value(&a).unwrap(),
        json!({ "title": "missing link" }),
        serde_json::to_value(&b).unwrap(),
    ]);

    assert!(matches!(result, Err(AggregatorError::InvalidInput(_))));
    assert!(container.contains(a.item_id));
    assert!(!container.contains(b.item_id));
    assert_eq!(container.meta().total_items, 1);
    assert_eq!(container.meta().items_per_category.get("tech"), Some(&1));

    container.add(b.clone());
    let result = container.remove_values([
        serde_json::to_value(&a).unwrap(),
        json!("not an item"),
        serde_json::to_value(&b).unwrap(),
    ]);
    assert!(matches!(result, Err(AggregatorError::InvalidInput(_))));
    assert!(!container.contains(a.item_id));
    assert!(container.contains(b.item_id));
    assert_eq!(container.meta().total_items, 1);
}

#[test]
fn test_untyped_json_without_id_mints_one() -> Result<()> {
    init_tracing();

    let mut container: NewsContainer = NewsContainer::new();
    let added = container.add_values([
        json!({ "title": "one", "link": "https://example.com/1", "category": "tech" }),
        json!({ "title": "two", "link": "https://example.com/2", "category": "tech" }),
    ])?;

    assert_eq!(added, 2);
    assert_eq!(container.size(), 2);
    assert_eq!(container.meta().items_per_category.get("tech"), Some(&2));
    Ok(())
}

#[test]
fn test_remove_is_idempotent() {
    init_tracing();

    let mut container = NewsContainer::new();
    let a = item("a", Some("tech"), Some("2024-01-01"));
    let b = item("b", Some("science"), Some("2024-01-01"));
    container.add_batch(vec![a.clone(), b.clone()]);

    assert!(container.remove(&a).is_some());
    let meta_after_first = container.meta().clone();

    assert!(container.remove(&a).is_none());
    assert_eq!(container.meta(), &meta_after_first);
    assert_eq!(container.categories(), ["science"]);
    assert_eq!(container.size(), 1);
}

#[test]
fn test_readding_keeps_previous_index_keys() -> Result<()> {
    init_tracing();

    let mut container = NewsContainer::new();
    let original = item("a", Some("tech"), Some("2024-01-01"));
    container.add(original.clone());

    let mut moved = original.clone();
    moved.category = Some("science".to_string());
    container.add(moved.clone());

    info!("Categories after re-add: {:?}", container.categories());
    assert_eq!(container.size(), 1);
    assert_eq!(container.categories(), ["science", "tech"]);

    // The stale membership still resolves to the current item.
    let stale = container.search_by_category(["tech"], false, false)?;
    assert_eq!(stale[0].category.as_deref(), Some("science"));
    assert_eq!(container.meta().items_per_category.get("tech"), Some(&1));

    // Removing with the original copy clears every key the id was filed under.
    container.remove(&original);
    assert!(container.categories().is_empty());
    assert!(container.search_by_date("2024-01-01", None, false).is_empty());
    Ok(())
}

#[test]
fn test_readded_item_appears_once_in_date_range() {
    init_tracing();

    let mut container = NewsContainer::new();
    let original = item("a", Some("tech"), Some("2024-01-01"));
    container.add(original.clone());

    let mut moved = original.clone();
    moved.category = Some("science".to_string());
    moved.published = Some("2024-01-02".to_string());
    container.add(moved);

    let filings = container.filings(original.item_id).unwrap();
    assert_eq!(filings.len(), 2);
    assert_eq!(filings[0].published.as_deref(), Some("2024-01-01"));
    assert_eq!(filings[1].published.as_deref(), Some("2024-01-02"));

    let found = container.search_by_date("2024-01-01", Some("2024-01-02"), false);
    assert_eq!(titles(&found), ["a"]);
    assert_eq!(titles(&container.search_by_date("2024-01-01", Some("2024-01-02"), true)), ["a"]);

    // Each old timestamp on its own still matches the item.
    assert_eq!(container.search_by_date("2024-01-01", None, false).len(), 1);
    assert_eq!(container.search_by_date("2024-01-02", None, false).len(), 1);

    container.remove(&original);
    assert!(container.filings(original.item_id).is_none());
}

#[test]
fn test_upsert_reindexes() -> Result<()> {
    init_tracing();

    let mut container = NewsContainer::new();
    let original = item("a", Some("tech"), Some("2024-01-01"));
    container.add(original.clone());

    let mut moved = original.clone();
    moved.category = Some("science".to_string());
    moved.published = Some("2024-02-01".to_string());
    container.upsert(moved);

    assert_eq!(container.categories(), ["science"]);
    assert!(container.search_by_date("2024-01-01", None, false).is_empty());
    assert_eq!(titles(&container.search_by_date("2024-02-01", None, false)), ["a"]);
    assert!(container
        .search_by_category(["tech"], false, false)
        .unwrap_err()
        .is_invalid_argument());
    Ok(())
}

#[test]
fn test_remove_with_mutated_copy_prunes_stored_keys() {
    init_tracing();

    let mut container = NewsContainer::new();
    let a = item("a", Some("tech"), Some("2024-01-01"));
    container.add(a.clone());

    let mut mutated = a.clone();
    mutated.category = Some("sports".to_string());
    mutated.published = None;

    assert!(container.remove(&mutated).is_some());
    assert!(container.categories().is_empty());
    assert!(container.search_by_date("2024-01-01", None, false).is_empty());
    assert!(container.meta().items_per_category.is_empty());
}

#[test]
fn test_unknown_category_is_invalid_argument() {
    init_tracing();

    let mut container = NewsContainer::new();
    container.add(item("a", Some("tech"), None));

    let err = container
        .search_by_category(["tech", "cooking"], false, false)
        .unwrap_err();
    assert!(err.is_invalid_argument());
    assert!(matches!(err, AggregatorError::UnknownCategory { ref category } if category == "cooking"));
}

#[test]
fn test_category_union_follows_requested_order() -> Result<()> {
    init_tracing();

    let mut container = NewsContainer::new();
    container.add_batch(vec![
        item("t1", Some("tech"), Some("2024-01-03")),
        item("s1", Some("science"), Some("2024-01-01")),
        item("t2", Some("tech"), None),
    ]);

    let union = container.search_by_category(["science", "tech", "science"], false, false)?;
    assert_eq!(titles(&union), ["s1", "t1", "t2"]);

    // Items without a publication time sort first.
    let sorted = container.search_by_category(["tech", "science"], true, false)?;
    assert_eq!(titles(&sorted), ["t2", "s1", "t1"]);
    Ok(())
}

#[test]
fn test_empty_fields_are_not_indexed() {
    init_tracing();

    let mut container = NewsContainer::new();
    container.add(item("blank", Some(""), Some("")));

    assert_eq!(container.size(), 1);
    assert!(container.categories().is_empty());
    assert!(container.search_by_date("", None, false).is_empty());
    assert_eq!(container.meta().items_per_category.values().sum::<usize>(), 0);
}

#[test]
fn test_search_by_order_accepts_orders_and_ids() -> Result<()> {
    init_tracing();

    let wire = NewsOrder::new("wire", "https://example.com/wire.xml");
    let daily = NewsOrder::new("daily", "https://example.com/daily.xml");

    let mut container = NewsContainer::new();
    container.add_batch(vec![
        item("w1", None, Some("2024-01-02")).with_order(wire.clone()),
        item("d1", None, Some("2024-01-01")).with_order(daily.clone()),
        item("w2", None, Some("2024-01-01")).with_order(wire.clone()),
        item("loose", None, None),
    ]);

    let by_object = container.search_by_order([&wire], true, false)?;
    assert_eq!(titles(&by_object), ["w2", "w1"]);

    let by_id = container.search_by_order([daily.order_id, wire.order_id], false, false)?;
    assert_eq!(titles(&by_id), ["d1", "w1", "w2"]);

    let mut orders = container.orders();
    orders.sort();
    let mut expected = vec![wire.order_id, daily.order_id];
    expected.sort();
    assert_eq!(orders, expected);
    assert_eq!(container.meta().items_per_order.get(&wire.order_id), Some(&2));

    let unknown = NewsOrder::new("unknown", "https://example.com/none.xml");
    assert!(matches!(
        container.search_by_order([&unknown], false, false),
        Err(AggregatorError::UnknownOrder { id }) if id == unknown.order_id
    ));
    Ok(())
}

#[test]
fn test_meta_serializes_with_count_keys() {
    init_tracing();

    let mut container = NewsContainer::new();
    container.add_batch(vec![
        item("a", Some("tech"), None),
        item("b", Some("tech"), None),
        item("c", None, None),
    ]);

    let meta = serde_json::to_value(container.meta()).unwrap();
    info!("Meta: {}", meta);
    assert_eq!(meta["total_items"], 3);
    assert_eq!(meta["num_of_items_per_category"]["tech"], 2);
    assert!(meta["num_of_items_per_order"].as_object().unwrap().is_empty());
}

#[test]
fn test_key_index_drops_empty_buckets() {
    let mut index = KeyIndex::new();
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();

    index.add("tech".to_string(), first);
    index.add("tech".to_string(), second);
    index.add("tech".to_string(), first);
    assert_eq!(index.lookup("tech").map(|bucket| bucket.len()), Some(2));

    index.remove("tech", &first);
    assert_eq!(
        index.lookup("tech").map(|bucket| bucket.iter().copied().collect::<Vec<_>>()),
        Some(vec![second])
    );

    index.remove("tech", &second);
    assert!(index.lookup("tech").is_none());
    assert!(index.is_empty());

    // Removing from an unknown key is a no-op.
    index.remove("cooking", &first);
    assert_eq!(index.keys().count(), 0);
}

#[test]
fn test_date_range_can_be_replayed() {
    let mut index = DateIndex::new();
    let ids: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();

    index.add("2024-01-02", ids[0]);
    index.add("2024-01-01", ids[1]);
    index.add("2024-01-02", ids[2]);
    index.add("2024-01-05", ids[3]);

    let range = index.range("2024-01-01", Some("2024-01-02"));
    let first: Vec<Uuid> = range.clone().collect();
    let second: Vec<Uuid> = range.collect();

    assert_eq!(first, vec![ids[1], ids[0], ids[2]]);
    assert_eq!(first, second);
    assert_eq!(index.range("2024-01-05", None).collect::<Vec<_>>(), vec![ids[3]]);

    index.remove("2024-01-05", &ids[3]);
    assert_eq!(index.timestamps().collect::<Vec<_>>(), ["2024-01-01", "2024-01-02"]);
}
