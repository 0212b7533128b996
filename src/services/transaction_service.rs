use std::collections::HashMap;

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    IsolationLevel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::{
    dto::transactions::{CheckoutRequest, TransactionList},
    entity::{
        products::{Column as ProdCol, Entity as Products},
        transaction_details::{
            ActiveModel as DetailActive, Column as DetailCol, Entity as TransactionDetails,
            Model as DetailModel,
        },
        transactions::{ActiveModel as TxActive, Column as TxCol, Entity as Transactions, Model as TxModel},
    },
    error::{AppError, AppResult},
    models::{CheckoutItem, Transaction, TransactionDetail},
    response::{ApiResponse, Meta},
    routes::params::{SortOrder, TransactionListQuery},
    state::AppState,
};

/// Product row as seen from inside the checkout's unit of work.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StockSnapshot {
    pub name: String,
    pub price: i64,
    pub stock: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PricedLine {
    pub product_id: i32,
    pub product_name: String,
    pub quantity: i32,
    pub subtotal: i64,
}

pub async fn checkout(
    state: &AppState,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<Transaction>> {
    let transaction = create_transaction(&state.orm, &payload.items).await?;
    Ok(ApiResponse::success(
        "Checkout success",
        transaction,
        Some(Meta::empty()),
    ))
}

/// Applies every item and records the sale, or persists nothing.
///
/// All referenced product rows are locked `FOR UPDATE` (in id order) before any
/// stock is checked, so concurrent checkouts of the same product serialize on
/// the row lock and the later one sees the decremented stock.
pub async fn create_transaction(
    db: &DatabaseConnection,
    items: &[CheckoutItem],
) -> AppResult<Transaction> {
    if items.is_empty() {
        return Err(AppError::BadRequest("items cannot be empty".into()));
    }

    let txn = db
        .begin_with_config(Some(IsolationLevel::ReadCommitted), None)
        .await?;

    let result = record_sale(&txn, items).await;
    match result {
        Ok(transaction) => {
            txn.commit().await?;
            tracing::info!(
                transaction_id = transaction.id,
                total_amount = transaction.total_amount,
                lines = transaction.details.len(),
                "checkout committed"
            );
            Ok(transaction)
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                tracing::warn!(error = %rollback_err, "checkout rollback failed");
            }
            tracing::info!(error = %err, "checkout rejected");
            Err(err)
        }
    }
}

async fn record_sale(txn: &DatabaseTransaction, items: &[CheckoutItem]) -> AppResult<Transaction> {
    let mut ids: Vec<i32> = items.iter().map(|item| item.product_id).collect();
    ids.sort_unstable();
    ids.dedup();

    let mut snapshots: HashMap<i32, StockSnapshot> = Products::find()
        .filter(ProdCol::Id.is_in(ids))
        .order_by_asc(ProdCol::Id)
        .lock(LockType::Update)
        .all(txn)
        .await?
        .into_iter()
        .map(|p| {
            (
                p.id,
                StockSnapshot {
                    name: p.name,
                    price: p.price,
                    stock: p.stock,
                },
            )
        })
        .collect();

    let mut total_amount: i64 = 0;
    let mut lines = Vec::with_capacity(items.len());
    for item in items {
        let line = apply_item(&mut snapshots, item)?;
        total_amount = total_amount
            .checked_add(line.subtotal)
            .ok_or_else(|| AppError::BadRequest("transaction total is too large".into()))?;

        Products::update_many()
            .col_expr(ProdCol::Stock, Expr::col(ProdCol::Stock).sub(line.quantity))
            .filter(ProdCol::Id.eq(line.product_id))
            .exec(txn)
            .await?;

        tracing::debug!(
            product_id = line.product_id,
            quantity = line.quantity,
            subtotal = line.subtotal,
            "line applied"
        );
        lines.push(line);
    }

    let header = TxActive {
        id: NotSet,
        total_amount: Set(total_amount),
        created_at: NotSet,
    }
    .insert(txn)
    .await?;

    let mut details = Vec::with_capacity(lines.len());
    for line in lines {
        let detail = DetailActive {
            id: NotSet,
            transaction_id: Set(header.id),
            product_id: Set(line.product_id),
            product_name: Set(line.product_name),
            quantity: Set(line.quantity),
            subtotal: Set(line.subtotal),
        }
        .insert(txn)
        .await?;
        details.push(detail_from_entity(detail));
    }

    Ok(transaction_from_entity(header, details))
}

/// Checks one item against the current snapshot and takes its quantity out of stock.
pub(crate) fn apply_item(
    snapshots: &mut HashMap<i32, StockSnapshot>,
    item: &CheckoutItem,
) -> AppResult<PricedLine> {
    if item.quantity <= 0 {
        return Err(AppError::BadRequest(format!(
            "invalid quantity for product {}",
            item.product_id
        )));
    }

    let product = snapshots
        .get_mut(&item.product_id)
        .ok_or_else(|| AppError::NotFound(format!("product id {} not found", item.product_id)))?;

    if product.stock < item.quantity {
        return Err(AppError::Conflict(format!(
            "insufficient stock for product {}",
            item.product_id
        )));
    }

    let subtotal = product
        .price
        .checked_mul(i64::from(item.quantity))
        .ok_or_else(|| {
            AppError::BadRequest(format!("subtotal is too large for product {}", item.product_id))
        })?;

    product.stock -= item.quantity;

    Ok(PricedLine {
        product_id: item.product_id,
        product_name: product.name.clone(),
        quantity: item.quantity,
        subtotal,
    })
}

pub async fn get_transaction(state: &AppState, id: i32) -> AppResult<ApiResponse<Transaction>> {
    let header = Transactions::find_by_id(id).one(&state.orm).await?;
    let header = match header {
        Some(t) => t,
        None => return Err(AppError::NotFound(format!("transaction id {id} not found"))),
    };

    let details = TransactionDetails::find()
        .filter(DetailCol::TransactionId.eq(header.id))
        .order_by_asc(DetailCol::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(detail_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Transaction",
        transaction_from_entity(header, details),
        Some(Meta::empty()),
    ))
}

pub async fn list_transactions(
    state: &AppState,
    query: TransactionListQuery,
) -> AppResult<ApiResponse<TransactionList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

    let mut finder = Transactions::find();
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(TxCol::CreatedAt).order_by_asc(TxCol::Id),
        SortOrder::Desc => finder.order_by_desc(TxCol::CreatedAt).order_by_desc(TxCol::Id),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let headers = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let ids: Vec<i32> = headers.iter().map(|t| t.id).collect();
    let mut details_by_tx: HashMap<i32, Vec<TransactionDetail>> = HashMap::new();
    if !ids.is_empty() {
        let rows = TransactionDetails::find()
            .filter(DetailCol::TransactionId.is_in(ids))
            .order_by_asc(DetailCol::Id)
            .all(&state.orm)
            .await?;
        for row in rows {
            details_by_tx
                .entry(row.transaction_id)
                .or_default()
                .push(detail_from_entity(row));
        }
    }

    let items = headers
        .into_iter()
        .map(|header| {
            let details = details_by_tx.remove(&header.id).unwrap_or_default();
            transaction_from_entity(header, details)
        })
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Transactions",
        TransactionList { items },
        Some(meta),
    ))
}

fn transaction_from_entity(model: TxModel, details: Vec<TransactionDetail>) -> Transaction {
    Transaction {
        id: model.id,
        total_amount: model.total_amount,
        created_at: model.created_at.with_timezone(&Utc),
        details,
    }
}

fn detail_from_entity(model: DetailModel) -> TransactionDetail {
    TransactionDetail {
        id: model.id,
        transaction_id: model.transaction_id,
        product_id: model.product_id,
        product_name: model.product_name,
        quantity: model.quantity,
        subtotal: model.subtotal,
    }
}
