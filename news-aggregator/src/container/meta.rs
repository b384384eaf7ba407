use super::index::KeyIndex;
use crate::types::OrderId;
use serde::Serialize;
use std::collections::BTreeMap;

/// Aggregate counts over a container, rebuilt from the live indices after each mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Meta {
    pub total_items: usize,
    #[serde(rename = "num_of_items_per_category")]
    pub items_per_category: BTreeMap<String, usize>,
    #[serde(rename = "num_of_items_per_order")]
    pub items_per_order: BTreeMap<OrderId, usize>,
}

impl Meta {
    pub(crate) fn compute(
        total_items: usize,
        by_category: &KeyIndex<String>,
        by_order: &KeyIndex<OrderId>,
    ) -> Self {
        Self {
            total_items,
            items_per_category: by_category
                .bucket_sizes()
                .map(|(category, size)| (category.clone(), size))
                .collect(),
            items_per_order: by_order
                .bucket_sizes()
                .map(|(order, size)| (*order, size))
                .collect(),
        }
    }
}
