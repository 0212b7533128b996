use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Product;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub price: i64,
    pub stock: i32,
    pub category_id: Option<i32>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub price: Option<i64>,
    pub stock: Option<i32>,
    /// Moves the product to this category.
    pub category_id: Option<i32>,
    /// Removes the product from its category. Cannot be combined with `category_id`.
    #[serde(default)]
    pub clear_category: bool,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_category_defaults_to_false() {
        let req: UpdateProductRequest = serde_json::from_str(r#"{"price": 4500}"#).unwrap();
        assert_eq!(req.price, Some(4500));
        assert_eq!(req.category_id, None);
        assert!(!req.clear_category);

        let req: UpdateProductRequest =
            serde_json::from_str(r#"{"category_id": null, "clear_category": true}"#).unwrap();
        assert!(req.clear_category);
    }
}
