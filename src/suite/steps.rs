//! The storefront endpoint contract, one step per expectation

use super::expect::{expect_eq, expect_reply, expect_status};
use super::{Session, Step, StepError};
use crate::api::{CartAdd, CartItem, Credentials, LoginResponse, NewProduct, Product};
use async_trait::async_trait;

const INVALID_LOGIN: &str = "Invalid username or password";
const CART_QUANTITY: i64 = 2;

/// Steps in execution order
pub fn standard_steps() -> Vec<Box<dyn Step>> {
    vec![
        Box::new(RegisterSuccess),
        Box::new(RegisterDuplicate),
        Box::new(RegisterMissingFields),
        Box::new(LoginSuccess),
        Box::new(LoginInvalidPassword),
        Box::new(LoginNonexistentUser),
        Box::new(AddProduct),
        Box::new(ListProducts),
        Box::new(AddToCart),
        Box::new(ListCart),
        Box::new(Unregister),
    ]
}

pub struct RegisterSuccess;

#[async_trait]
impl Step for RegisterSuccess {
    fn name(&self) -> &'static str {
        "register_success"
    }

    async fn run(&self, session: &mut Session) -> Result<(), StepError> {
        let credentials = Credentials::new(&session.username, &session.password).admin();
        let response = session.client.register(&credentials).await?;
        expect_reply(&response, 201, "User registered")
    }
}

pub struct RegisterDuplicate;

#[async_trait]
impl Step for RegisterDuplicate {
    fn name(&self) -> &'static str {
        "register_duplicate"
    }

    async fn run(&self, session: &mut Session) -> Result<(), StepError> {
        let credentials = Credentials::new(&session.username, &session.password);
        let response = session.client.register(&credentials).await?;
        expect_reply(&response, 409, "Username already exists")
    }
}

pub struct RegisterMissingFields;

#[async_trait]
impl Step for RegisterMissingFields {
    fn name(&self) -> &'static str {
        "register_missing_fields"
    }

    async fn run(&self, session: &mut Session) -> Result<(), StepError> {
        let credentials = Credentials::new(&session.username, "");
        let response = session.client.register(&credentials).await?;
        expect_reply(&response, 400, "Username and Password are required")
    }
}

pub struct LoginSuccess;

#[async_trait]
impl Step for LoginSuccess {
    fn name(&self) -> &'static str {
        "login_success"
    }

    async fn run(&self, session: &mut Session) -> Result<(), StepError> {
        let credentials = Credentials::new(&session.username, &session.password);
        let response = session.client.login(&credentials).await?;
        expect_status(&response, 200)?;

        let login: LoginResponse = response.json()?;
        if login.token.is_empty() {
            return Err(StepError::Assertion(
                "login returned an empty token".to_string(),
            ));
        }
        session.set_token(login.token);
        Ok(())
    }
}

pub struct LoginInvalidPassword;

#[async_trait]
impl Step for LoginInvalidPassword {
    fn name(&self) -> &'static str {
        "login_invalid_password"
    }

    async fn run(&self, session: &mut Session) -> Result<(), StepError> {
        let credentials = Credentials::new(&session.username, "wrongpassword");
        let response = session.client.login(&credentials).await?;
        expect_reply(&response, 401, INVALID_LOGIN)
    }
}

pub struct LoginNonexistentUser;

#[async_trait]
impl Step for LoginNonexistentUser {
    fn name(&self) -> &'static str {
        "login_nonexistent_user"
    }

    async fn run(&self, session: &mut Session) -> Result<(), StepError> {
        let credentials = Credentials::new("nonexistantuser", "wrongpassword");
        let response = session.client.login(&credentials).await?;
        expect_reply(&response, 401, INVALID_LOGIN)
    }
}

pub struct AddProduct;

#[async_trait]
impl Step for AddProduct {
    fn name(&self) -> &'static str {
        "add_product"
    }

    async fn run(&self, session: &mut Session) -> Result<(), StepError> {
        let token = session.token()?;
        let response = session
            .client
            .add_product(token, &NewProduct::fixture())
            .await?;
        expect_reply(&response, 201, "Product added")
    }
}

pub struct ListProducts;

#[async_trait]
impl Step for ListProducts {
    fn name(&self) -> &'static str {
        "list_products"
    }

    async fn run(&self, session: &mut Session) -> Result<(), StepError> {
        let response = session.client.list_products().await?;
        expect_status(&response, 200)?;

        let products: Vec<Product> = response.json()?;
        if products.is_empty() {
            return Err(StepError::Assertion(
                "product list is empty".to_string(),
            ));
        }

        // Latest match: earlier runs against the same database may have left copies
        let wanted = NewProduct::fixture().name;
        let product = products
            .into_iter()
            .rev()
            .find(|p| p.name == wanted)
            .ok_or_else(|| {
                StepError::Assertion(format!("product {:?} not in product list", wanted))
            })?;
        session.set_product(product);
        Ok(())
    }
}

pub struct AddToCart;

#[async_trait]
impl Step for AddToCart {
    fn name(&self) -> &'static str {
        "add_to_cart"
    }

    async fn run(&self, session: &mut Session) -> Result<(), StepError> {
        let token = session.token()?;
        let entry = CartAdd {
            product_id: session.product()?.id.clone(),
            quantity: CART_QUANTITY,
        };
        let response = session.client.add_to_cart(token, &entry).await?;
        expect_reply(&response, 201, "Item added to cart")?;
        session.set_cart_entry(entry);
        Ok(())
    }
}

pub struct ListCart;

#[async_trait]
impl Step for ListCart {
    fn name(&self) -> &'static str {
        "list_cart"
    }

    async fn run(&self, session: &mut Session) -> Result<(), StepError> {
        let token = session.token()?;
        let product = session.product()?;
        let entry = session.cart_entry()?;

        let response = session.client.list_cart(token).await?;
        expect_status(&response, 200)?;

        let items: Vec<CartItem> = response.json()?;
        expect_eq("cart size", &1, &items.len())?;
        let item = &items[0];
        expect_eq("product_id", &entry.product_id, &item.product_id)?;
        expect_eq("quantity", &entry.quantity, &item.quantity)?;
        expect_eq("name", &product.name, &item.name)?;
        expect_eq("price", &product.price, &item.price)
    }
}

pub struct Unregister;

#[async_trait]
impl Step for Unregister {
    fn name(&self) -> &'static str {
        "unregister"
    }

    async fn run(&self, session: &mut Session) -> Result<(), StepError> {
        let token = session.token()?;
        let response = session.client.unregister(token).await?;
        expect_reply(&response, 200, "User deleted successfully.")
    }
}
