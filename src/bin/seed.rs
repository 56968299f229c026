use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum_shop_api::{config::AppConfig, db::create_pool};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_user(&pool, "Admin", "admin@example.com", "admin123", "admin").await?;
    let user_id = ensure_user(&pool, "Demo User", "user@example.com", "user123", "user").await?;
    seed_catalog(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    name: &str,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, name, email, password_hash, role)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_optional(pool)
    .await?;

    // If user already exists, fetch id
    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

async fn seed_catalog(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let categories = ["laptops", "phones", "monitors", "accessories"];
    for name in categories {
        sqlx::query(
            r#"
            INSERT INTO categories (id, name)
            VALUES ($1, $2)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .execute(pool)
        .await?;
    }

    // (name, description, price in cents, stock, category)
    let products = vec![
        ("Zen Laptop 14", "14 inch ultrabook", 129_999, 25, "laptops"),
        ("Nova Phone X", "Flagship phone", 99_999, 40, "phones"),
        ("Pixel Monitor 27", "27 inch 4K display", 45_999, 30, "monitors"),
        ("Mech Keyboard", "Tenkeyless mechanical keyboard", 8_999, 120, "accessories"),
        ("Laser Mouse", "Wireless mouse", 3_499, 200, "accessories"),
    ];

    for (name, desc, price, stock, category) in products {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, price, stock, category_id)
            VALUES ($1, $2, $3, $4, $5, (SELECT id FROM categories WHERE name = $6))
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(desc)
        .bind(price as i64)
        .bind(stock)
        .bind(category)
        .execute(pool)
        .await?;
    }

    println!("Seeded categories and products");
    Ok(())
}
