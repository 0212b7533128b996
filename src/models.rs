use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Product {
    pub id: i32,
    pub name: String,
    /// Unit price in minor currency units.
    pub price: i64,
    pub stock: i32,
    pub category_id: Option<i32>,
    pub category_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct CheckoutItem {
    pub product_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Transaction {
    pub id: i32,
    pub total_amount: i64,
    pub created_at: DateTime<Utc>,
    pub details: Vec<TransactionDetail>,
}

/// One line of a transaction. `product_name` and `subtotal` are captured when
/// the sale is made and do not follow later product edits.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct TransactionDetail {
    pub id: i32,
    pub transaction_id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub quantity: i32,
    pub subtotal: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Default)]
pub struct TopProduct {
    pub product_id: Option<i32>,
    pub name: String,
    pub quantity_sold: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Default)]
pub struct ReportSummary {
    pub total_revenue: i64,
    pub total_transactions: i64,
    pub top_product: TopProduct,
}
