use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Serialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    pub display_name: String,
    pub email: String,
    pub password: String,
}

/// One choice in an option group, e.g. `{name:"Large", price:"+10"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubCategoryItem {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubCategoryGroup {
    pub title: String,
    #[serde(default)]
    pub items: Vec<SubCategoryItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sub_categories: Vec<SubCategoryGroup>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuCategory {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub items: Vec<MenuItem>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MenuResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Vec<MenuCategory>,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableItem {
    pub table_number: u32,
    #[serde(default)]
    pub qr_url: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TablesResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Vec<TableItem>,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub message: Option<String>,
}

/// A file attached to a multipart write.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Fields of a menu item create or update.
#[derive(Debug, Clone, Default)]
pub struct MenuItemInput {
    pub name: String,
    pub description: String,
    pub sub_categories: Vec<SubCategoryGroup>,
    pub price: Option<f64>,
    pub image: Option<ImageUpload>,
    pub image_url: Option<String>,
}

/// Owner details saved with the store.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorePersonal {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub citizen_id: Option<String>,
    pub phone: Option<String>,
    pub birthday: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreProfile {
    pub shop_name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub store_number_phone: Option<String>,
    pub store_facebook: Option<String>,
    pub store_line: Option<String>,
    #[serde(skip)]
    pub image: Option<ImageUpload>,
}

/// Credential changes. Blank values are not sent.
#[derive(Debug, Clone, Default)]
pub struct AuthenUpdate {
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

/// Option groups in the backend's `{category, options}` shape.
pub fn groups_for_backend(groups: &[SubCategoryGroup]) -> Value {
    let groups: Vec<Value> = groups
        .iter()
        .map(|group| {
            let options: Vec<Value> = group
                .items
                .iter()
                .map(|item| match item.price.as_deref().map(str::trim) {
                    Some(price) if !price.is_empty() => json!({ "name": item.name, "price": price }),
                    _ => Value::String(item.name.clone()),
                })
                .collect();
            json!({ "category": group.title, "options": options })
        })
        .collect();
    Value::Array(groups)
}

/// Serialize and drop `null` and blank string fields.
pub fn prune_empty<T: Serialize>(value: &T) -> Map<String, Value> {
    let Ok(Value::Object(map)) = serde_json::to_value(value) else {
        return Map::new();
    };
    map.into_iter()
        .filter(|(_, v)| match v {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty(),
            _ => true,
        })
        .collect()
}
