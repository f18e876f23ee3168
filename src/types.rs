//! Core types: upstream market records and the documents written for the front end

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Position of the item name in a Rolimons field array
pub const FIELD_NAME: usize = 0;
/// Position of the Recent Average Price
pub const FIELD_RAP: usize = 2;
/// Position of the community value
pub const FIELD_VALUE: usize = 3;

/// Prefix prepended to upstream ids in every output record
pub const ITEM_ID_PREFIX: &str = "rblx-";

/// Tag carried by every item this pipeline emits
pub const LIMITED_TAG: &str = "LIMITED";

/// Label prefixed to the title in product descriptions
pub const PRODUCT_DESCRIPTION_LABEL: &str = "Roblox Limited";

/// Positional fields of one market item
///
/// Rolimons ships `[name, acronym, rap, value, defaultValue, demand, trend,
/// projected, hyped, rare]`. Any position may be missing or of an unexpected
/// type, so the raw JSON values are kept and interpreted lazily.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct ItemFields(pub Vec<Value>);

impl From<Value> for ItemFields {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(fields) => ItemFields(fields),
            _ => ItemFields(Vec::new()),
        }
    }
}

impl ItemFields {
    /// Raw field at `index`, `None` when absent or JSON null
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index).filter(|v| !v.is_null())
    }

    /// Item name when it is a non-empty string
    pub fn name(&self) -> Option<&str> {
        self.get(FIELD_NAME)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// Market items keyed by upstream id, in the order the API returned them
pub type MarketItems = IndexMap<String, ItemFields>;

/// Upstream id to resolved thumbnail URL; absent ids have no image
pub type ThumbnailMap = HashMap<String, String>;

/// One catalog entry as consumed by the front end
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputItem {
    /// `rblx-<upstream id>`
    pub id: String,
    /// Display title
    pub title: String,
    /// Attribution
    pub by: String,
    /// Always [`LIMITED_TAG`]
    pub tag: String,
    /// Integer price, 0 when unknown
    pub price: i64,
    /// Currency label
    pub currency: String,
    /// Formatted price, `-` when unknown
    pub display_price: String,
    /// Remote URL or root-relative local path, `null` when no thumbnail exists
    pub image: Option<String>,
}

/// One entry of the optional products document
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutputProduct {
    /// Same id as the matching [`OutputItem`]
    pub id: String,
    /// Display title
    pub name: String,
    /// Integer price, 0 when unknown
    pub price: i64,
    /// Currency label
    pub currency: String,
    /// `"<label>: <title>"`
    pub description: String,
    /// Image reference, empty when no thumbnail exists
    pub image: String,
    /// Configured default stock
    pub stock: u32,
}

/// A filter tab shown by the front end
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Machine key
    pub key: String,
    /// Display label
    pub label: String,
}

impl Category {
    fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
        }
    }

    /// The three fixed tabs: all, Roblox limiteds, UGC limiteds
    pub fn fixed() -> Vec<Category> {
        vec![
            Category::new("all", "All"),
            Category::new("limited", "Roblox Limiteds"),
            Category::new("ugc", "UGC Limiteds"),
        ]
    }
}

/// Top-level `items.json` document
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    /// Always [`Category::fixed`]
    pub categories: Vec<Category>,
    /// Every fetched item, in fetch order
    pub roblox_limiteds: Vec<OutputItem>,
    /// Reserved for a UGC source; always empty
    pub ugc_limiteds: Vec<OutputItem>,
}

impl Catalog {
    /// Wrap built records in the fixed catalog envelope
    pub fn new(roblox_limiteds: Vec<OutputItem>) -> Self {
        Self {
            categories: Category::fixed(),
            roblox_limiteds,
            ugc_limiteds: Vec::new(),
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_array_item_has_no_fields() {
        let items: MarketItems =
            serde_json::from_value(json!({ "1": ["Hat", "H", 10, 20], "2": "garbage", "3": null }))
                .unwrap();

        assert_eq!(items["1"].name(), Some("Hat"));
        assert_eq!(items["1"].get(2), Some(&json!(10)));
        assert!(items["2"].0.is_empty());
        assert!(items["3"].0.is_empty());
    }

    #[test]
    fn market_items_keep_upstream_order() {
        let items: MarketItems =
            serde_json::from_str(r#"{"900": ["C"], "100": ["A"], "500": ["B"]}"#).unwrap();
        let ids: Vec<&str> = items.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["900", "100", "500"]);
    }

    #[test]
    fn empty_or_non_string_name_is_absent() {
        assert_eq!(ItemFields(vec![json!("")]).name(), None);
        assert_eq!(ItemFields(vec![json!(42)]).name(), None);
        assert_eq!(ItemFields(vec![Value::Null]).name(), None);
        assert_eq!(ItemFields::default().name(), None);
    }

    #[test]
    fn catalog_serializes_with_front_end_keys() {
        let catalog = Catalog::new(vec![OutputItem {
            id: "rblx-42".to_string(),
            title: "Cool Hat".to_string(),
            by: "ROBLOX".to_string(),
            tag: LIMITED_TAG.to_string(),
            price: 150,
            currency: "R$".to_string(),
            display_price: "150 R$".to_string(),
            image: None,
        }]);

        let value = serde_json::to_value(&catalog).unwrap();
        assert_eq!(value["categories"].as_array().unwrap().len(), 3);
        assert_eq!(value["categories"][1]["key"], "limited");
        assert_eq!(value["robloxLimiteds"][0]["displayPrice"], "150 R$");
        assert!(value["robloxLimiteds"][0]["image"].is_null());
        assert_eq!(value["ugcLimiteds"], json!([]));
    }
}
