use sqlx::FromRow;

use crate::{
    db::DbPool,
    error::AppResult,
    models::{ReportSummary, TopProduct},
    response::{ApiResponse, Meta},
    state::AppState,
};

#[derive(Debug, FromRow)]
struct TotalsRow {
    total_revenue: i64,
    total_transactions: i64,
}

#[derive(Debug, FromRow)]
struct TopProductRow {
    product_id: i32,
    name: String,
    quantity_sold: i64,
}

pub async fn today(state: &AppState) -> AppResult<ApiResponse<ReportSummary>> {
    let summary = today_summary(&state.pool).await?;
    Ok(ApiResponse::success(
        "Today's sales",
        summary,
        Some(Meta::empty()),
    ))
}

/// Sales figures for the database's `CURRENT_DATE`.
///
/// The top product is best effort: if that lookup fails the summary is still
/// returned, with an empty top product.
pub async fn today_summary(pool: &DbPool) -> AppResult<ReportSummary> {
    let totals = sqlx::query_as::<_, TotalsRow>(
        r#"
        SELECT
            COALESCE(SUM(total_amount), 0)::BIGINT AS total_revenue,
            COUNT(*)::BIGINT AS total_transactions
        FROM transactions
        WHERE created_at >= CURRENT_DATE
          AND created_at < CURRENT_DATE + 1
        "#,
    )
    .fetch_one(pool)
    .await?;

    let top_product = match top_product_today(pool).await {
        Ok(top) => top.unwrap_or_default(),
        Err(err) => {
            tracing::warn!(error = %err, "top product lookup failed");
            TopProduct::default()
        }
    };

    Ok(ReportSummary {
        total_revenue: totals.total_revenue,
        total_transactions: totals.total_transactions,
        top_product,
    })
}

// Ties on quantity go to the lowest product id. The name is the one recorded
// on the most recent of today's lines, not the product's current name.
async fn top_product_today(pool: &DbPool) -> Result<Option<TopProduct>, sqlx::Error> {
    let row = sqlx::query_as::<_, TopProductRow>(
        r#"
        SELECT
            td.product_id AS product_id,
            (ARRAY_AGG(td.product_name ORDER BY td.id DESC))[1] AS name,
            SUM(td.quantity)::BIGINT AS quantity_sold
        FROM transaction_details td
        JOIN transactions t ON t.id = td.transaction_id
        WHERE t.created_at >= CURRENT_DATE
          AND t.created_at < CURRENT_DATE + 1
        GROUP BY td.product_id
        ORDER BY quantity_sold DESC, td.product_id ASC
        LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| TopProduct {
        product_id: Some(row.product_id),
        name: row.name,
        quantity_sold: row.quantity_sold,
    }))
}
