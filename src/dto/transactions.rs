use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{CheckoutItem, Transaction};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub items: Vec<CheckoutItem>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct TransactionList {
    #[schema(value_type = Vec<Transaction>)]
    pub items: Vec<Transaction>,
}
