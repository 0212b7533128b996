use axum::{Json, Router, extract::State, routing::get};

use crate::{
    error::AppResult, models::ReportSummary, response::ApiResponse,
    services::report_service, state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/today", get(today))
}

#[utoipa::path(
    get,
    path = "/api/report/today",
    responses(
        (status = 200, description = "Revenue, transaction count and top product for today", body = ApiResponse<ReportSummary>)
    ),
    tag = "Report"
)]
pub async fn today(State(state): State<AppState>) -> AppResult<Json<ApiResponse<ReportSummary>>> {
    let resp = report_service::today(&state).await?;
    Ok(Json(resp))
}
