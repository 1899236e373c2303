use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `/register` and `/login`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    #[serde(rename = "isAdmin", skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            is_admin: None,
        }
    }

    pub fn admin(mut self) -> Self {
        self.is_admin = Some(true);
        self
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoginResponse {
    pub token: String,
}

/// Body of `POST /products`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: u32,
    pub image_url: String,
}

impl NewProduct {
    /// Product created by the suite
    pub fn fixture() -> Self {
        Self {
            name: "New Product".to_string(),
            description: "A new product".to_string(),
            price: 30.99,
            stock: 50,
            image_url: "http://example.com/new.jpg".to_string(),
        }
    }
}

/// Element of `GET /products`
///
/// `id` and `price` are kept as raw JSON: the suite only ever echoes them
/// back or compares them with other server-produced values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: Value,
    pub name: String,
    #[serde(default)]
    pub price: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `POST /cart`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CartAdd {
    pub product_id: Value,
    pub quantity: i64,
}

/// Element of `GET /cart`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    pub product_id: Value,
    pub quantity: i64,
    pub name: String,
    #[serde(default)]
    pub price: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
