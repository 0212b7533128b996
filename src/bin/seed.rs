use kasir_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config).await?;
    // Ensure migrations are applied.
    run_migrations(&pool).await?;

    let food = ensure_category(&pool, "Makanan", "Makanan ringan dan instan").await?;
    let drinks = ensure_category(&pool, "Minuman", "Minuman dingin dan panas").await?;
    seed_products(&pool, food, drinks).await?;

    println!("Seed completed. Categories: food={food}, drinks={drinks}");
    Ok(())
}

async fn ensure_category(
    pool: &sqlx::PgPool,
    name: &str,
    description: &str,
) -> anyhow::Result<i32> {
    let existing: Option<(i32,)> = sqlx::query_as("SELECT id FROM categories WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    if let Some((id,)) = existing {
        return Ok(id);
    }

    let (id,): (i32,) = sqlx::query_as(
        "INSERT INTO categories (name, description) VALUES ($1, $2) RETURNING id",
    )
    .bind(name)
    .bind(description)
    .fetch_one(pool)
    .await?;

    println!("Created category {name}");
    Ok(id)
}

async fn seed_products(pool: &sqlx::PgPool, food: i32, drinks: i32) -> anyhow::Result<()> {
    let products = vec![
        ("Indomie Goreng", 3500_i64, 100, food),
        ("Roti Tawar", 15000, 30, food),
        ("Kopi Susu", 12000, 50, drinks),
        ("Teh Botol", 5000, 80, drinks),
    ];

    for (name, price, stock, category_id) in products {
        let exists: Option<(i32,)> = sqlx::query_as("SELECT id FROM products WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await?;
        if exists.is_some() {
            continue;
        }

        sqlx::query(
            r#"
            INSERT INTO products (name, price, stock, category_id)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(name)
        .bind(price)
        .bind(stock)
        .bind(category_id)
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
