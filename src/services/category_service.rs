use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, QueryOrder, QuerySelect, Set};

use crate::{
    dto::categories::{CategoryList, CreateCategoryRequest, UpdateCategoryRequest},
    entity::categories::{ActiveModel, Column, Entity as Categories, Model as CategoryModel},
    error::{AppError, AppResult},
    models::Category,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

pub async fn list_categories(
    state: &AppState,
    pagination: Pagination,
) -> AppResult<ApiResponse<CategoryList>> {
    let (page, limit, offset) = pagination.normalize();
    let finder = Categories::find().order_by_asc(Column::Id);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(category_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        Some(meta),
    ))
}

pub async fn get_category(state: &AppState, id: i32) -> AppResult<ApiResponse<Category>> {
    let category = Categories::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(category_from_entity)
        .ok_or_else(|| category_not_found(id))?;
    Ok(ApiResponse::success("Category", category, Some(Meta::empty())))
}

pub async fn create_category(
    state: &AppState,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("name is required".into()));
    }

    let category = ActiveModel {
        id: NotSet,
        name: Set(name.to_string()),
        description: Set(payload.description),
    }
    .insert(&state.orm)
    .await?;
    tracing::info!(category_id = category.id, "category created");

    Ok(ApiResponse::success(
        "Category created",
        category_from_entity(category),
        Some(Meta::empty()),
    ))
}

pub async fn update_category(
    state: &AppState,
    id: i32,
    payload: UpdateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    let existing = Categories::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| category_not_found(id))?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest("name is required".into()));
        }
        active.name = Set(name.to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }

    let category = active.update(&state.orm).await?;
    Ok(ApiResponse::success(
        "Updated",
        category_from_entity(category),
        Some(Meta::empty()),
    ))
}

/// Products in the category keep existing with `category_id` cleared.
pub async fn delete_category(
    state: &AppState,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = Categories::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(category_not_found(id));
    }
    tracing::info!(category_id = id, "category deleted");

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn category_not_found(id: i32) -> AppError {
    AppError::NotFound(format!("category id {id} not found"))
}

fn category_from_entity(model: CategoryModel) -> Category {
    Category {
        id: model.id,
        name: model.name,
        description: model.description,
    }
}
