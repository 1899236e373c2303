//! In-process storefront used by the integration tests
//!
//! Implements the endpoint contract the suite checks, backed by in-memory
//! maps. `Faults` lets a test break one behavior at a time.

#![allow(dead_code)] // Helpers are shared across test binaries

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// Deliberate deviations from the contract
#[derive(Debug, Clone, Default)]
pub struct Faults {
    /// Accept duplicate registrations with 201
    pub allow_duplicates: bool,
    /// Reject every login with 401
    pub reject_logins: bool,
    /// Report this quantity for every cart line instead of the stored one
    pub cart_quantity_override: Option<i64>,
}

#[derive(Default)]
struct Store {
    users: HashMap<String, String>,
    tokens: HashMap<String, String>,
    products: Vec<Value>,
    carts: HashMap<String, Vec<(Value, i64)>>,
    next_id: i64,
    faults: Faults,
}

type Shared = Arc<Mutex<Store>>;

fn text(status: StatusCode, body: &str) -> Response {
    (status, body.to_string()).into_response()
}

fn bearer_user(store: &Store, headers: &HeaderMap) -> Option<String> {
    let header = headers.get("authorization")?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?;
    store.tokens.get(token).cloned()
}

fn field<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

async fn register(State(store): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut store = store.lock().unwrap();
    let (Some(username), Some(password)) = (field(&body, "username"), field(&body, "password"))
    else {
        return text(
            StatusCode::BAD_REQUEST,
            "Username and Password are required",
        );
    };

    if store.users.contains_key(username) && !store.faults.allow_duplicates {
        return text(StatusCode::CONFLICT, "Username already exists");
    }
    store
        .users
        .insert(username.to_string(), password.to_string());
    text(StatusCode::CREATED, "User registered")
}

async fn login(State(store): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut store = store.lock().unwrap();
    let username = field(&body, "username").unwrap_or_default().to_string();
    let password = field(&body, "password").unwrap_or_default();

    let valid = store.users.get(&username).map(String::as_str) == Some(password);
    if !valid || store.faults.reject_logins {
        return text(StatusCode::UNAUTHORIZED, "Invalid username or password");
    }

    store.next_id += 1;
    let token = format!("token-{}-{}", username, store.next_id);
    store.tokens.insert(token.clone(), username);
    Json(json!({ "token": token })).into_response()
}

async fn add_product(
    State(store): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut store = store.lock().unwrap();
    if bearer_user(&store, &headers).is_none() {
        return text(StatusCode::UNAUTHORIZED, "Unauthorized");
    }

    store.next_id += 1;
    let mut product = body;
    product["id"] = json!(store.next_id);
    store.products.push(product);
    text(StatusCode::CREATED, "Product added")
}

async fn list_products(State(store): State<Shared>) -> Response {
    let store = store.lock().unwrap();
    Json(Value::Array(store.products.clone())).into_response()
}

async fn add_to_cart(
    State(store): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut store = store.lock().unwrap();
    let Some(user) = bearer_user(&store, &headers) else {
        return text(StatusCode::UNAUTHORIZED, "Unauthorized");
    };

    let product_id = body["product_id"].clone();
    let quantity = body["quantity"].as_i64().unwrap_or(0);
    if !store.products.iter().any(|p| p["id"] == product_id) {
        return text(StatusCode::NOT_FOUND, "Product not found");
    }

    store
        .carts
        .entry(user)
        .or_default()
        .push((product_id, quantity));
    text(StatusCode::CREATED, "Item added to cart")
}

async fn list_cart(State(store): State<Shared>, headers: HeaderMap) -> Response {
    let store = store.lock().unwrap();
    let Some(user) = bearer_user(&store, &headers) else {
        return text(StatusCode::UNAUTHORIZED, "Unauthorized");
    };

    let items: Vec<Value> = store
        .carts
        .get(&user)
        .into_iter()
        .flatten()
        .filter_map(|(product_id, quantity)| {
            let product = store.products.iter().find(|p| &p["id"] == product_id)?;
            Some(json!({
                "product_id": product_id,
                "quantity": store.faults.cart_quantity_override.unwrap_or(*quantity),
                "name": product["name"],
                "price": product["price"],
            }))
        })
        .collect();
    Json(Value::Array(items)).into_response()
}

async fn unregister(State(store): State<Shared>, headers: HeaderMap) -> Response {
    let mut store = store.lock().unwrap();
    let Some(user) = bearer_user(&store, &headers) else {
        return text(StatusCode::UNAUTHORIZED, "Unauthorized");
    };

    store.users.remove(&user);
    store.carts.remove(&user);
    store.tokens.retain(|_, owner| *owner != user);
    text(StatusCode::OK, "User deleted successfully.")
}

/// Start a mock storefront on an ephemeral port; returns its base URL
pub async fn spawn_storefront(faults: Faults) -> String {
    let store: Shared = Arc::new(Mutex::new(Store {
        faults,
        ..Store::default()
    }));

    let app = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/products", post(add_product).get(list_products))
        .route("/cart", post(add_to_cart).get(list_cart))
        .route("/unregister", delete(unregister))
        .with_state(store);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await });

    format!("http://{}", addr)
}
