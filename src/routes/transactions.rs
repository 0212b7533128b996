use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};

use crate::{
    dto::transactions::{CheckoutRequest, TransactionList},
    error::AppResult,
    models::Transaction,
    response::ApiResponse,
    routes::params::TransactionListQuery,
    services::transaction_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_transactions))
        .route("/checkout", post(checkout))
        .route("/{id}", get(get_transaction))
}

#[utoipa::path(
    post,
    path = "/api/transactions/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Transaction recorded", body = ApiResponse<Transaction>),
        (status = 400, description = "Empty item list or invalid quantity"),
        (status = 404, description = "Unknown product"),
        (status = 409, description = "Insufficient stock"),
    ),
    tag = "Transactions"
)]
pub async fn checkout(
    State(state): State<AppState>,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Transaction>>)> {
    let resp = transaction_service::checkout(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/transactions",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc (default)")
    ),
    responses(
        (status = 200, description = "List transactions", body = ApiResponse<TransactionList>)
    ),
    tag = "Transactions"
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<TransactionListQuery>,
) -> AppResult<Json<ApiResponse<TransactionList>>> {
    let resp = transaction_service::list_transactions(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/transactions/{id}",
    params(("id" = i32, Path, description = "Transaction ID")),
    responses(
        (status = 200, description = "Transaction with details", body = ApiResponse<Transaction>),
        (status = 404, description = "Transaction not found"),
    ),
    tag = "Transactions"
)]
pub async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Transaction>>> {
    let resp = transaction_service::get_transaction(&state, id).await?;
    Ok(Json(resp))
}
