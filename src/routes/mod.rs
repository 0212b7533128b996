use axum::Router;

use crate::state::AppState;

pub mod categories;
pub mod doc;
pub mod health;
pub mod params;
pub mod products;
pub mod report;
pub mod transactions;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/products", products::router())
        .nest("/categories", categories::router())
        .nest("/transactions", transactions::router())
        .nest("/report", report::router())
}
