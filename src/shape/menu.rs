//! Menu payloads: categories containing items containing option groups.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::shape::options::{normalize_for_backend, normalize_for_ui, OptionGroup};

pub const SUB_CATEGORIES: &str = "subCategories";

/// A menu item in UI shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sub_categories: Vec<OptionGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// A menu category in UI shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuCategory {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub items: Vec<MenuItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Convert every item's option groups in a `GET /api/menu` reply to UI shape.
///
/// Only successful replies with a `data` array are touched.
pub fn menu_response_for_ui(mut body: Value) -> Value {
    if body.get("success").and_then(Value::as_bool) != Some(true) {
        return body;
    }
    let Some(categories) = body.get_mut("data").and_then(Value::as_array_mut) else {
        return body;
    };

    for category in categories.iter_mut() {
        let Some(items) = category.get_mut("items").and_then(Value::as_array_mut) else {
            continue;
        };
        for item in items.iter_mut().filter_map(Value::as_object_mut) {
            let groups = item.get(SUB_CATEGORIES).cloned().unwrap_or(Value::Null);
            item.insert(SUB_CATEGORIES.to_string(), normalize_for_ui(&groups));
        }
    }
    body
}

/// Rewrite `subCategories` in an item write body to backend shape, in place.
pub fn item_body_for_backend(body: &mut Value) {
    if let Some(obj) = body.as_object_mut() {
        if let Some(groups) = obj.get(SUB_CATEGORIES) {
            let normalized = normalize_for_backend(groups);
            obj.insert(SUB_CATEGORIES.to_string(), normalized);
        }
    }
}

/// Rewrite a `subCategories` multipart field (a JSON string) to backend shape.
///
/// Text that is not JSON is forwarded as is.
pub fn sub_categories_field_for_backend(text: &str) -> String {
    match serde_json::from_str::<Value>(text) {
        Ok(parsed) => normalize_for_backend(&parsed).to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "subCategories field is not JSON, forwarding unchanged");
            text.to_string()
        }
    }
}
