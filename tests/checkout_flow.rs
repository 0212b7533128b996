mod common;

use common::{create_category, create_product, item, setup_state, stock_of, transaction_count};
use kasir_api::{
    dto::products::UpdateProductRequest,
    error::AppError,
    routes::params::TransactionListQuery,
    services::{product_service, transaction_service},
};

// Checkout against a real database: success paths, every rejection, and the
// guarantee that a rejected checkout leaves stock and transactions untouched.
#[tokio::test]
async fn checkout_applies_all_items_or_nothing() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let drinks = create_category(&state, "Minuman").await?;
    let kopi = create_product(&state, "Kopi", 1000, 5, Some(drinks.id)).await?;
    assert_eq!(kopi.category_name.as_deref(), Some("Minuman"));

    // stock 5, buy 3 at 1000
    let first = transaction_service::create_transaction(&state.orm, &[item(kopi.id, 3)]).await?;
    assert_eq!(first.total_amount, 3000);
    assert_eq!(first.details.len(), 1);
    assert_eq!(first.details[0].quantity, 3);
    assert_eq!(first.details[0].subtotal, 3000);
    assert_eq!(first.details[0].product_name, "Kopi");
    assert_eq!(first.details[0].transaction_id, first.id);
    assert_eq!(stock_of(&state, kopi.id).await?, 2);

    // two products in one checkout
    let teh = create_product(&state, "Teh", 500, 10, None).await?;
    let roti = create_product(&state, "Roti", 1500, 4, None).await?;
    let second =
        transaction_service::create_transaction(&state.orm, &[item(teh.id, 2), item(roti.id, 1)])
            .await?;
    assert_eq!(second.total_amount, 2500);
    assert_eq!(second.details.len(), 2);
    assert_eq!(second.details[0].product_id, teh.id);
    assert_eq!(second.details[1].product_id, roti.id);
    assert_eq!(
        second.total_amount,
        second.details.iter().map(|d| d.subtotal).sum::<i64>()
    );
    assert_eq!(stock_of(&state, teh.id).await?, 8);
    assert_eq!(stock_of(&state, roti.id).await?, 3);

    let committed = transaction_count(&state).await?;
    assert_eq!(committed, 2);

    // more than available
    let err = transaction_service::create_transaction(&state.orm, &[item(kopi.id, 3)])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)), "got {err:?}");
    assert_eq!(stock_of(&state, kopi.id).await?, 2);
    assert_eq!(transaction_count(&state).await?, committed);

    // a valid item followed by an unknown product
    let err = transaction_service::create_transaction(&state.orm, &[item(teh.id, 1), item(999_999, 1)])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "got {err:?}");
    assert_eq!(stock_of(&state, teh.id).await?, 8);
    assert_eq!(transaction_count(&state).await?, committed);

    // a valid item followed by a zero quantity
    let err = transaction_service::create_transaction(&state.orm, &[item(teh.id, 1), item(roti.id, 0)])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)), "got {err:?}");
    assert_eq!(stock_of(&state, teh.id).await?, 8);

    let err = transaction_service::create_transaction(&state.orm, &[])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)), "got {err:?}");
    assert_eq!(transaction_count(&state).await?, committed);

    // the same product twice: the second line sees the first decrement
    let err = transaction_service::create_transaction(&state.orm, &[item(roti.id, 2), item(roti.id, 2)])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)), "got {err:?}");
    assert_eq!(stock_of(&state, roti.id).await?, 3);

    let third =
        transaction_service::create_transaction(&state.orm, &[item(roti.id, 1), item(roti.id, 2)])
            .await?;
    assert_eq!(third.total_amount, 4500);
    assert_eq!(third.details.len(), 2);
    assert_eq!(stock_of(&state, roti.id).await?, 0);

    // later product edits do not rewrite history
    product_service::update_product(
        &state,
        kopi.id,
        UpdateProductRequest {
            name: Some("Kopi Susu".into()),
            price: Some(5000),
            ..Default::default()
        },
    )
    .await?;
    let stored = transaction_service::get_transaction(&state, first.id)
        .await?
        .data
        .expect("transaction data");
    assert_eq!(stored.total_amount, 3000);
    assert_eq!(stored.details[0].subtotal, 3000);
    assert_eq!(stored.details[0].product_name, "Kopi");

    let listed = transaction_service::list_transactions(&state, TransactionListQuery::default())
        .await?;
    assert_eq!(listed.meta.as_ref().and_then(|m| m.total), Some(3));
    let items = listed.data.expect("transaction list").items;
    assert_eq!(items.len(), 3);
    for tx in &items {
        assert_eq!(tx.total_amount, tx.details.iter().map(|d| d.subtotal).sum::<i64>());
    }

    // products with recorded sales stay
    let err = product_service::delete_product(&state, kopi.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)), "got {err:?}");

    let missing = transaction_service::get_transaction(&state, 424_242)
        .await
        .unwrap_err();
    assert!(matches!(missing, AppError::NotFound(_)));

    Ok(())
}
