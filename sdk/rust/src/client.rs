use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

use crate::error::ClientError;
use crate::types::{
    groups_for_backend, prune_empty, AuthenUpdate, ImageUpload, LoginInput, MenuItemInput,
    MenuResponse, RegisterInput, StorePersonal, StoreProfile, TablesResponse,
};

/// Client for a running console.
///
/// The session cookie set by `login` is kept in the client's cookie store.
/// Tools without a cookie can use [`ConsoleClient::with_token`] instead.
#[derive(Debug, Clone)]
pub struct ConsoleClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ConsoleClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let client = Client::builder().cookie_store(true).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Send `token` as `Authorization: Bearer` on every call.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn payload(&self, builder: RequestBuilder) -> Result<Option<Value>, ClientError> {
        let res = builder.send().await?;
        let status = res.status();
        let bytes = res.bytes().await?;
        let payload: Option<Value> = serde_json::from_slice(&bytes).ok();

        if !status.is_success() {
            return Err(ClientError::from_reply(status.as_u16(), payload));
        }
        Ok(payload)
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let payload = self.payload(builder).await?;
        Ok(serde_json::from_value(payload.unwrap_or_else(|| json!({})))?)
    }

    // ---- auth ----

    pub async fn register(&self, input: &RegisterInput) -> Result<Value, ClientError> {
        self.send(self.request(Method::POST, "/api/auth?action=register").json(input))
            .await
    }

    /// Sign in; the console answers `{ok:true}` and sets the session cookie.
    pub async fn login(&self, input: &LoginInput) -> Result<Value, ClientError> {
        self.send(self.request(Method::POST, "/api/auth?action=login").json(input))
            .await
    }

    pub async fn logout(&self) -> Result<Value, ClientError> {
        self.send(self.request(Method::POST, "/api/auth?action=logout"))
            .await
    }

    /// Verify a backend idToken, or the one stored in the session.
    pub async fn verify(&self, id_token: Option<&str>) -> Result<Value, ClientError> {
        let body = match id_token {
            Some(token) => json!({ "idToken": token }),
            None => json!({}),
        };
        self.send(self.request(Method::POST, "/api/auth?action=verify").json(&body))
            .await
    }

    // ---- menu ----

    pub async fn menu_categories(&self) -> Result<MenuResponse, ClientError> {
        self.send(self.request(Method::GET, "/api/menu")).await
    }

    pub async fn create_category(&self, name: &str) -> Result<Value, ClientError> {
        let builder = self
            .request(Method::POST, "/api/menu")
            .query(&[("action", "category")])
            .json(&json!({ "name": name }));
        self.send(builder).await
    }

    pub async fn update_category(&self, category_id: &str, name: &str) -> Result<Value, ClientError> {
        let builder = self
            .request(Method::PUT, "/api/menu")
            .query(&[("action", "category"), ("categoryId", category_id)])
            .json(&json!({ "name": name }));
        self.send(builder).await
    }

    pub async fn delete_category(&self, category_id: &str) -> Result<Value, ClientError> {
        let builder = self
            .request(Method::DELETE, "/api/menu")
            .query(&[("action", "category"), ("categoryId", category_id)]);
        self.send(builder).await
    }

    /// Create an item. Sent as multipart when an image is attached.
    pub async fn create_menu_item(
        &self,
        category_id: &str,
        input: &MenuItemInput,
    ) -> Result<Value, ClientError> {
        let builder = self
            .request(Method::POST, "/api/menu")
            .query(&[("action", "item"), ("categoryId", category_id)]);
        self.send(item_body(builder, input)?).await
    }

    pub async fn update_menu_item(
        &self,
        category_id: &str,
        item_id: &str,
        input: &MenuItemInput,
    ) -> Result<Value, ClientError> {
        let builder = self.request(Method::PUT, "/api/menu").query(&[
            ("action", "item"),
            ("categoryId", category_id),
            ("itemId", item_id),
        ]);
        self.send(item_body(builder, input)?).await
    }

    pub async fn delete_menu_item(&self, category_id: &str, item_id: &str) -> Result<Value, ClientError> {
        let builder = self.request(Method::DELETE, "/api/menu").query(&[
            ("action", "item"),
            ("categoryId", category_id),
            ("itemId", item_id),
        ]);
        self.send(builder).await
    }

    // ---- tables ----

    pub async fn tables(&self) -> Result<TablesResponse, ClientError> {
        self.send(self.request(Method::GET, "/api/tables")).await
    }

    pub async fn create_bulk_tables(&self, count: u32) -> Result<TablesResponse, ClientError> {
        let builder = self
            .request(Method::POST, "/api/tables?action=bulk")
            .json(&json!({ "count": count }));
        self.send(builder).await
    }

    pub async fn create_single_table(&self, table_number: u32) -> Result<TablesResponse, ClientError> {
        let builder = self
            .request(Method::POST, "/api/tables?action=single")
            .json(&json!({ "tableNumber": table_number }));
        self.send(builder).await
    }

    pub async fn delete_table(&self, table_number: u32) -> Result<Value, ClientError> {
        let builder = self
            .request(Method::DELETE, "/api/tables")
            .query(&[("tableNumber", table_number)]);
        self.send(builder).await
    }

    // ---- store ----

    /// Save owner and store details. Empty fields are not sent, so they do
    /// not overwrite stored values. Multipart when a logo is attached.
    pub async fn save_store(
        &self,
        uid: &str,
        personal: &StorePersonal,
        store: &StoreProfile,
    ) -> Result<Value, ClientError> {
        let personal = prune_empty(personal);
        let store_fields = prune_empty(store);
        let builder = self.request(Method::POST, "/api/store?action=save");

        let builder = match &store.image {
            Some(image) => {
                let mut form = Form::new().text("uid", uid.to_string());
                if !personal.is_empty() {
                    form = form.text("personal", Value::Object(personal).to_string());
                }
                form = form
                    .text("store", Value::Object(store_fields).to_string())
                    .part("image", image_part(image)?);
                builder.multipart(form)
            }
            None => {
                let mut body = Map::new();
                body.insert("uid".to_string(), Value::String(uid.to_string()));
                if !personal.is_empty() {
                    body.insert("personal".to_string(), Value::Object(personal));
                }
                if !store_fields.is_empty() {
                    body.insert("store".to_string(), Value::Object(store_fields));
                }
                builder.json(&Value::Object(body))
            }
        };

        let payload = self.payload(builder).await?;
        Ok(payload.unwrap_or_else(|| json!({ "ok": true })))
    }

    /// Owner and store profile. `uid` is only used by the console without a session.
    pub async fn profile(&self, uid: Option<&str>) -> Result<Value, ClientError> {
        self.store_get("profile", uid).await
    }

    pub async fn user(&self, uid: Option<&str>) -> Result<Value, ClientError> {
        self.store_get("user", uid).await
    }

    pub async fn shop(&self, uid: Option<&str>) -> Result<Value, ClientError> {
        self.store_get("shop", uid).await
    }

    async fn store_get(&self, action: &str, uid: Option<&str>) -> Result<Value, ClientError> {
        let mut query = vec![("action", action)];
        if let Some(uid) = uid {
            query.push(("uid", uid));
        }
        self.send(self.request(Method::GET, "/api/store").query(&query))
            .await
    }

    pub async fn update_authen(&self, uid: &str, update: &AuthenUpdate) -> Result<Value, ClientError> {
        let mut body = Map::new();
        body.insert("uid".to_string(), Value::String(uid.to_string()));
        if let Some(email) = update.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
            body.insert("email".to_string(), Value::String(email.to_string()));
        }
        if let Some(password) = update.password.as_deref().filter(|p| !p.trim().is_empty()) {
            body.insert("password".to_string(), Value::String(password.to_string()));
        }
        if let Some(confirm) = update.confirm_password.as_deref().filter(|p| !p.trim().is_empty()) {
            body.insert("confirmPassword".to_string(), Value::String(confirm.to_string()));
        }

        let builder = self
            .request(Method::POST, "/api/store?action=updateAuthen")
            .json(&Value::Object(body));
        self.send(builder).await
    }

    /// URL of the store logo, usable as an image source.
    pub fn logo_url(&self, uid: &str) -> Result<String, ClientError> {
        reqwest::Url::parse_with_params(
            &format!("{}/api/store", self.base_url),
            &[("action", "logo"), ("uid", uid)],
        )
        .map(String::from)
        .map_err(|e| ClientError::Validation(format!("invalid base url: {}", e)))
    }
}

fn image_part(image: &ImageUpload) -> Result<Part, ClientError> {
    Ok(Part::bytes(image.bytes.clone())
        .file_name(image.file_name.clone())
        .mime_str(&image.content_type)?)
}

/// Name and description must be non-blank; both are sent trimmed.
fn validate_item(input: &MenuItemInput) -> Result<(String, String), ClientError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(ClientError::Validation("Menu item name is required".to_string()));
    }
    let description = input.description.trim();
    if description.is_empty() {
        return Err(ClientError::Validation(
            "Menu item description is required".to_string(),
        ));
    }
    Ok((name.to_string(), description.to_string()))
}

fn item_body(builder: RequestBuilder, input: &MenuItemInput) -> Result<RequestBuilder, ClientError> {
    let (name, description) = validate_item(input)?;
    let groups = groups_for_backend(&input.sub_categories);

    match &input.image {
        Some(image) => {
            let mut form = Form::new()
                .text("name", name)
                .text("description", description)
                .text("subCategories", groups.to_string());
            if let Some(price) = input.price {
                form = form.text("price", price.to_string());
            }
            Ok(builder.multipart(form.part("image", image_part(image)?)))
        }
        None => Ok(builder.json(&json!({
            "name": name,
            "description": description,
            "subCategories": groups,
            "price": input.price,
            "imageUrl": input.image_url,
        }))),
    }
}
