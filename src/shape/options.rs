//! Sub-option groups in the two field-naming conventions.
//!
//! ```text
//! UI:       { "title": "Size", "items": [ { "name": "Large", "price": "+10" }, { "name": "Regular" } ] }
//! Backend:  { "category": "Size", "options": [ { "name": "Large", "price": "+10" }, "Regular" ] }
//! ```
//!
//! Conversions toward the backend accept either convention, since older
//! clients already send backend-shaped groups.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::shape::price::PriceDelta;

/// An option as the UI edits it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionItem {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<PriceDelta>,
}

/// A named option group as the UI edits it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionGroup {
    pub title: String,
    pub items: Vec<OptionItem>,
}

/// An option as the backend stores it: a bare name, or a name with a price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BackendOption {
    Name(String),
    Priced { name: String, price: PriceDelta },
}

/// A named option group as the backend stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendGroup {
    pub category: String,
    pub options: Vec<BackendOption>,
}

impl From<&OptionItem> for BackendOption {
    fn from(item: &OptionItem) -> Self {
        match &item.price {
            Some(price) => BackendOption::Priced {
                name: item.name.clone(),
                price: price.clone(),
            },
            None => BackendOption::Name(item.name.clone()),
        }
    }
}

impl From<&BackendOption> for OptionItem {
    fn from(option: &BackendOption) -> Self {
        match option {
            BackendOption::Name(name) => OptionItem {
                name: name.clone(),
                price: None,
            },
            BackendOption::Priced { name, price } => OptionItem {
                name: name.clone(),
                price: Some(price.clone()),
            },
        }
    }
}

/// UI groups to backend groups. Priceless items become bare names.
pub fn to_backend(groups: &[OptionGroup]) -> Vec<BackendGroup> {
    groups
        .iter()
        .map(|g| BackendGroup {
            category: g.title.clone(),
            options: g.items.iter().map(BackendOption::from).collect(),
        })
        .collect()
}

/// Backend groups to UI groups.
pub fn to_ui(groups: &[BackendGroup]) -> Vec<OptionGroup> {
    groups
        .iter()
        .map(|g| OptionGroup {
            title: g.category.clone(),
            items: g.options.iter().map(OptionItem::from).collect(),
        })
        .collect()
}

/// A group read leniently from JSON.
#[derive(Debug, Clone, PartialEq)]
enum Parsed {
    Ui(OptionGroup),
    Backend(BackendGroup),
    Unrecognized,
}

fn non_empty_str<'a>(obj: &'a serde_json::Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// One option in either convention: `"name"` or `{ "name": .., "price": .. }`.
fn parse_item(value: &Value) -> Option<OptionItem> {
    match value {
        Value::String(name) => Some(OptionItem {
            name: name.clone(),
            price: None,
        }),
        Value::Object(obj) => {
            let name = obj.get("name").and_then(Value::as_str)?.to_string();
            let price = match obj.get("price") {
                None | Some(Value::Null) => None,
                Some(raw) => {
                    let parsed = PriceDelta::from_json(raw);
                    if parsed.is_none() && !raw.is_string() {
                        tracing::warn!(option = %name, price = %raw, "Ignoring non-text option price");
                    }
                    parsed
                }
            };
            Some(OptionItem { name, price })
        }
        _ => None,
    }
}

fn parse_group(value: &Value) -> Parsed {
    let Some(obj) = value.as_object() else {
        return Parsed::Unrecognized;
    };

    let items_of = |key: &str| -> Option<Vec<OptionItem>> {
        let arr = obj.get(key).and_then(Value::as_array)?;
        let items = arr
            .iter()
            .filter_map(|entry| {
                let item = parse_item(entry);
                if item.is_none() {
                    tracing::warn!(option = %entry, "Skipping option without a name");
                }
                item
            })
            .collect();
        Some(items)
    };

    // UI shape wins when a group carries both.
    if let (Some(title), Some(items)) = (non_empty_str(obj, "title"), items_of("items")) {
        return Parsed::Ui(OptionGroup {
            title: title.to_string(),
            items,
        });
    }
    if let (Some(category), Some(items)) = (non_empty_str(obj, "category"), items_of("options")) {
        return Parsed::Backend(BackendGroup {
            category: category.to_string(),
            options: items.iter().map(BackendOption::from).collect(),
        });
    }
    Parsed::Unrecognized
}

/// Rewrite a `subCategories` array into backend groups.
///
/// Groups in neither convention are dropped. A non-array value is returned unchanged.
pub fn normalize_for_backend(value: &Value) -> Value {
    let Some(groups) = value.as_array() else {
        tracing::warn!("subCategories is not an array, forwarding unchanged");
        return value.clone();
    };

    let normalized: Vec<BackendGroup> = groups
        .iter()
        .filter_map(|g| match parse_group(g) {
            Parsed::Backend(b) => Some(b),
            Parsed::Ui(u) => to_backend(std::slice::from_ref(&u)).pop(),
            Parsed::Unrecognized => {
                tracing::warn!(group = %g, "Dropping invalid subCategory group");
                None
            }
        })
        .collect();

    serde_json::to_value(normalized).unwrap_or(Value::Array(Vec::new()))
}

/// Rewrite a `subCategories` value into UI groups.
///
/// Groups in neither convention pass through untouched. A non-array value becomes `[]`.
pub fn normalize_for_ui(value: &Value) -> Value {
    let Some(groups) = value.as_array() else {
        return Value::Array(Vec::new());
    };

    let normalized = groups
        .iter()
        .map(|g| match parse_group(g) {
            Parsed::Backend(b) => to_ui(std::slice::from_ref(&b))
                .pop()
                .and_then(|u| serde_json::to_value(u).ok())
                .unwrap_or_else(|| g.clone()),
            Parsed::Ui(u) => serde_json::to_value(u).unwrap_or_else(|_| g.clone()),
            Parsed::Unrecognized => g.clone(),
        })
        .collect();

    Value::Array(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn price(s: &str) -> Option<PriceDelta> {
        PriceDelta::parse(s)
    }

    #[test]
    fn test_to_backend_uses_bare_names_without_price() {
        let groups = vec![OptionGroup {
            title: "Size".into(),
            items: vec![
                OptionItem { name: "Large".into(), price: price("+10") },
                OptionItem { name: "Regular".into(), price: None },
            ],
        }];

        let value = serde_json::to_value(to_backend(&groups)).unwrap();
        assert_eq!(
            value,
            json!([{ "category": "Size", "options": [{ "name": "Large", "price": "+10" }, "Regular"] }])
        );
    }

    #[test]
    fn test_to_ui_reverses_to_backend() {
        let groups = vec![OptionGroup {
            title: "Protein".into(),
            items: vec![
                OptionItem { name: "Pork".into(), price: None },
                OptionItem { name: "Shrimp".into(), price: price("+20") },
            ],
        }];
        assert_eq!(to_ui(&to_backend(&groups)), groups);
    }

    #[test]
    fn test_normalize_for_backend_accepts_mixed_shapes() {
        let input = json!([
            { "title": "Size", "items": [{ "name": "Large", "price": "+10" }, { "name": "Small", "price": "" }] },
            { "category": "Protein", "options": ["Pork", { "name": "Beef", "price": 15 }] },
            { "title": "", "items": [] },
            { "something": "else" }
        ]);

        assert_eq!(
            normalize_for_backend(&input),
            json!([
                { "category": "Size", "options": [{ "name": "Large", "price": "+10" }, "Small"] },
                { "category": "Protein", "options": ["Pork", { "name": "Beef", "price": "15" }] }
            ])
        );
    }

    #[test]
    fn test_free_text_and_exponent_prices_survive_both_directions() {
        let ui = json!([{ "title": "Size", "items": [
            { "name": "Large", "price": "+20 บาท" },
            { "name": "XL", "price": "1,000" },
            { "name": "Huge", "price": 1e21 },
            { "name": "Lots", "price": "lots" }
        ] }]);
        assert_eq!(
            normalize_for_backend(&ui),
            json!([{ "category": "Size", "options": [
                { "name": "Large", "price": "+20 บาท" },
                { "name": "XL", "price": "1,000" },
                { "name": "Huge", "price": "1e21" },
                { "name": "Lots", "price": "lots" }
            ] }])
        );

        let backend = json!([{ "category": "Size", "options": [
            { "name": "Large", "price": "฿20" },
            { "name": "Huge", "price": 1e21 }
        ] }]);
        assert_eq!(
            normalize_for_ui(&backend),
            json!([{ "title": "Size", "items": [
                { "name": "Large", "price": "฿20" },
                { "name": "Huge", "price": "1e21" }
            ] }])
        );
    }

    #[test]
    fn test_ui_shape_takes_precedence() {
        let input = json!([{
            "title": "Spice", "items": [{ "name": "Hot", "price": "+5" }],
            "category": "Stale", "options": ["Old"]
        }]);
        assert_eq!(
            normalize_for_backend(&input),
            json!([{ "category": "Spice", "options": [{ "name": "Hot", "price": "+5" }] }])
        );
    }

    #[test]
    fn test_nameless_options_are_skipped() {
        let input = json!([{ "category": "Size", "options": ["Regular", 42, { "price": "+5" }] }]);
        assert_eq!(
            normalize_for_ui(&input),
            json!([{ "title": "Size", "items": [{ "name": "Regular" }] }])
        );
    }

    #[test]
    fn test_normalize_for_ui() {
        let input = json!([
            { "category": "Size", "options": ["Regular", { "name": "Large", "price": -5 }] },
            { "title": "Spice", "items": ["Mild"] },
            { "unknown": true }
        ]);

        assert_eq!(
            normalize_for_ui(&input),
            json!([
                { "title": "Size", "items": [{ "name": "Regular" }, { "name": "Large", "price": "-5" }] },
                { "title": "Spice", "items": [{ "name": "Mild" }] },
                { "unknown": true }
            ])
        );
        assert_eq!(normalize_for_ui(&json!(null)), json!([]));
    }

    #[test]
    fn test_backend_option_deserializes_both_forms() {
        let options: Vec<BackendOption> =
            serde_json::from_value(json!(["Plain", { "name": "Extra", "price": "+5" }])).unwrap();
        assert_eq!(options[0], BackendOption::Name("Plain".into()));
        assert_eq!(
            options[1],
            BackendOption::Priced { name: "Extra".into(), price: PriceDelta::parse("+5").unwrap() }
        );
    }
}
