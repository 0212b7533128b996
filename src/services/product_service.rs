use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
};

use crate::dto::products::{CreateProductRequest, ProductList, UpdateProductRequest};
use crate::{
    entity::{
        categories::{Entity as Categories, Model as CategoryModel},
        products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    state::AppState,
};

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_ref().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(Expr::col((Products, Column::Name)).ilike(pattern));
    }

    if let Some(category_id) = query.category_id {
        condition = condition.add(Column::CategoryId.eq(category_id));
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }

    let sort_by = query.sort_by.unwrap_or(ProductSortBy::Id);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Asc);
    let sort_col = match sort_by {
        ProductSortBy::Id => Column::Id,
        ProductSortBy::Price => Column::Price,
        ProductSortBy::Name => Column::Name,
    };

    let total = Products::find()
        .filter(condition.clone())
        .count(&state.orm)
        .await? as i64;

    let mut finder = Products::find()
        .find_also_related(Categories)
        .filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(product, category)| product_from_entity(product, category))
        .collect();

    let meta = Meta::new(page, limit, total);
    let data = ProductList { items };
    Ok(ApiResponse::success("Products", data, Some(meta)))
}

pub async fn get_product(state: &AppState, id: i32) -> AppResult<ApiResponse<Product>> {
    let product = find_product(state, id).await?;
    Ok(ApiResponse::success("Product", product, Some(Meta::empty())))
}

pub async fn create_product(
    state: &AppState,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let name = validate_name(&payload.name)?;
    validate_price(payload.price)?;
    validate_stock(payload.stock)?;
    if let Some(category_id) = payload.category_id {
        ensure_category_exists(&state.orm, category_id).await?;
    }

    let active = ActiveModel {
        id: NotSet,
        name: Set(name),
        price: Set(payload.price),
        stock: Set(payload.stock),
        category_id: Set(payload.category_id),
        created_at: NotSet,
    };
    let product = active.insert(&state.orm).await?;
    tracing::info!(product_id = product.id, "product created");

    let product = find_product(state, product.id).await?;
    Ok(ApiResponse::success(
        "Product created",
        product,
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    id: i32,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let existing = Products::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(product_not_found(id)),
    };

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(validate_name(&name)?);
    }
    if let Some(price) = payload.price {
        validate_price(price)?;
        active.price = Set(price);
    }
    if let Some(stock) = payload.stock {
        validate_stock(stock)?;
        active.stock = Set(stock);
    }
    match (payload.category_id, payload.clear_category) {
        (Some(_), true) => {
            return Err(AppError::BadRequest(
                "category_id and clear_category cannot be combined".into(),
            ));
        }
        (Some(category_id), false) => {
            ensure_category_exists(&state.orm, category_id).await?;
            active.category_id = Set(Some(category_id));
        }
        (None, true) => active.category_id = Set(None),
        (None, false) => {}
    }

    let product = active.update(&state.orm).await?;
    tracing::info!(product_id = product.id, "product updated");

    let product = find_product(state, product.id).await?;
    Ok(ApiResponse::success("Updated", product, Some(Meta::empty())))
}

pub async fn delete_product(
    state: &AppState,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = match Products::delete_by_id(id).exec(&state.orm).await {
        Ok(result) => result,
        Err(err) => {
            if let Some(SqlErr::ForeignKeyConstraintViolation(_)) = err.sql_err() {
                return Err(AppError::Conflict(format!(
                    "product {id} has recorded sales and cannot be deleted"
                )));
            }
            return Err(err.into());
        }
    };

    if result.rows_affected == 0 {
        return Err(product_not_found(id));
    }
    tracing::info!(product_id = id, "product deleted");

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

async fn find_product(state: &AppState, id: i32) -> AppResult<Product> {
    let result = Products::find_by_id(id)
        .find_also_related(Categories)
        .one(&state.orm)
        .await?
        .map(|(product, category)| product_from_entity(product, category));
    match result {
        Some(p) => Ok(p),
        None => Err(product_not_found(id)),
    }
}

async fn ensure_category_exists<C: ConnectionTrait>(db: &C, category_id: i32) -> AppResult<()> {
    let found = Categories::find_by_id(category_id).one(db).await?;
    if found.is_none() {
        return Err(AppError::BadRequest(format!(
            "category id {category_id} not found"
        )));
    }
    Ok(())
}

fn product_not_found(id: i32) -> AppError {
    AppError::NotFound(format!("product id {id} not found"))
}

fn validate_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("name is required".into()));
    }
    Ok(name.to_string())
}

fn validate_price(price: i64) -> AppResult<()> {
    if price < 0 {
        return Err(AppError::BadRequest("price cannot be negative".into()));
    }
    Ok(())
}

fn validate_stock(stock: i32) -> AppResult<()> {
    if stock < 0 {
        return Err(AppError::BadRequest("stock cannot be negative".into()));
    }
    Ok(())
}

fn product_from_entity(model: ProductModel, category: Option<CategoryModel>) -> Product {
    Product {
        id: model.id,
        name: model.name,
        price: model.price,
        stock: model.stock,
        category_id: model.category_id,
        category_name: category.map(|c| c.name),
        created_at: model.created_at.with_timezone(&Utc),
    }
}
