mod common;

use common::{create_category, create_product, setup_state};
use kasir_api::{
    dto::{categories::UpdateCategoryRequest, products::UpdateProductRequest},
    error::AppError,
    routes::params::Pagination,
    services::{category_service, product_service},
    state::AppState,
};

// Category CRUD against a real database, including what happens to the
// products of a deleted category. One test so the truncating setup runs once.
#[tokio::test]
async fn catalog_crud_against_the_database() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    category_lifecycle_keeps_products(&state).await?;
    unknown_category_ids_are_not_found(&state).await?;
    product_category_can_be_moved_and_cleared(&state).await?;
    Ok(())
}

async fn category_lifecycle_keeps_products(state: &AppState) -> anyhow::Result<()> {
    let food = create_category(state, "  Makanan ").await?;
    assert_eq!(food.name, "Makanan");
    let beras = create_product(state, "Beras", 12000, 10, Some(food.id)).await?;
    assert_eq!(beras.category_id, Some(food.id));

    let fetched = category_service::get_category(state, food.id)
        .await?
        .data
        .expect("category data");
    assert_eq!(fetched.name, "Makanan");

    // blank names are rejected and leave the row as it was
    for name in ["", "   "] {
        let err = category_service::update_category(
            state,
            food.id,
            UpdateCategoryRequest {
                name: Some(name.into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)), "got {err:?}");
    }

    let renamed = category_service::update_category(
        state,
        food.id,
        UpdateCategoryRequest {
            name: Some(" Sembako ".into()),
            description: Some("Kebutuhan pokok".into()),
        },
    )
    .await?
    .data
    .expect("category data");
    assert_eq!(renamed.name, "Sembako");
    assert_eq!(renamed.description, "Kebutuhan pokok");

    let product = product_service::get_product(state, beras.id)
        .await?
        .data
        .expect("product data");
    assert_eq!(product.category_name.as_deref(), Some("Sembako"));

    let listed = category_service::list_categories(state, Pagination::default()).await?;
    assert_eq!(listed.meta.as_ref().and_then(|m| m.total), Some(1));

    // the product survives, uncategorized
    category_service::delete_category(state, food.id).await?;
    let product = product_service::get_product(state, beras.id)
        .await?
        .data
        .expect("product data");
    assert_eq!(product.category_id, None);
    assert_eq!(product.category_name, None);
    assert_eq!(product.stock, 10);

    let err = category_service::get_category(state, food.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "got {err:?}");

    Ok(())
}

async fn unknown_category_ids_are_not_found(state: &AppState) -> anyhow::Result<()> {
    let err = category_service::get_category(state, 9_999).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref msg) if msg == "category id 9999 not found"));

    let err = category_service::update_category(
        state,
        9_999,
        UpdateCategoryRequest {
            name: Some("Minuman".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "got {err:?}");

    let err = category_service::delete_category(state, 9_999).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "got {err:?}");

    Ok(())
}

async fn product_category_can_be_moved_and_cleared(state: &AppState) -> anyhow::Result<()> {
    let food = create_category(state, "Makanan").await?;
    let drinks = create_category(state, "Minuman").await?;
    let teh = create_product(state, "Teh Botol", 4000, 12, Some(food.id)).await?;

    let moved = product_service::update_product(
        state,
        teh.id,
        UpdateProductRequest {
            category_id: Some(drinks.id),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("product data");
    assert_eq!(moved.category_id, Some(drinks.id));
    assert_eq!(moved.category_name.as_deref(), Some("Minuman"));

    // an update that does not mention the category leaves it alone
    let repriced = product_service::update_product(
        state,
        teh.id,
        UpdateProductRequest {
            price: Some(4500),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("product data");
    assert_eq!(repriced.category_id, Some(drinks.id));

    let err = product_service::update_product(
        state,
        teh.id,
        UpdateProductRequest {
            category_id: Some(food.id),
            clear_category: true,
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)), "got {err:?}");

    let cleared = product_service::update_product(
        state,
        teh.id,
        UpdateProductRequest {
            clear_category: true,
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("product data");
    assert_eq!(cleared.category_id, None);
    assert_eq!(cleared.category_name, None);
    assert_eq!(cleared.price, 4500);

    Ok(())
}
