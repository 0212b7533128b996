#![allow(dead_code)]

use kasir_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    dto::{categories::CreateCategoryRequest, products::CreateProductRequest},
    entity::products::Entity as Products,
    models::{Category, CheckoutItem, Product},
    services::{category_service, product_service},
    state::AppState,
};
use sea_orm::EntityTrait;

/// Connects to the test database and empties the POS tables.
/// Returns `None` when no database is configured so the caller can skip.
pub async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run it.");
            return Ok(None);
        }
    };

    let config = AppConfig::from_lookup(|key| match key {
        "DATABASE_URL" => Some(database_url.clone()),
        "DB_MAX_CONNECTIONS" => Some("5".to_string()),
        _ => None,
    })?;
    let pool = create_pool(&config).await?;
    run_migrations(&pool).await?;

    sqlx::query(
        "TRUNCATE TABLE transaction_details, transactions, products, categories RESTART IDENTITY CASCADE",
    )
    .execute(&pool)
    .await?;

    Ok(Some(AppState::new(pool)))
}

pub async fn create_category(state: &AppState, name: &str) -> anyhow::Result<Category> {
    let resp = category_service::create_category(
        state,
        CreateCategoryRequest {
            name: name.to_string(),
            description: String::new(),
        },
    )
    .await?;
    Ok(resp.data.expect("category data"))
}

pub async fn create_product(
    state: &AppState,
    name: &str,
    price: i64,
    stock: i32,
    category_id: Option<i32>,
) -> anyhow::Result<Product> {
    let resp = product_service::create_product(
        state,
        CreateProductRequest {
            name: name.to_string(),
            price,
            stock,
            category_id,
        },
    )
    .await?;
    Ok(resp.data.expect("product data"))
}

pub async fn stock_of(state: &AppState, product_id: i32) -> anyhow::Result<i32> {
    let product = Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .expect("product exists");
    Ok(product.stock)
}

pub async fn transaction_count(state: &AppState) -> anyhow::Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM transactions")
        .fetch_one(&state.pool)
        .await?;
    Ok(count)
}

pub fn item(product_id: i32, quantity: i32) -> CheckoutItem {
    CheckoutItem {
        product_id,
        quantity,
    }
}
