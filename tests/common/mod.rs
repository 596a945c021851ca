//! Shared setup for the database-backed integration tests. These tests need
//! a PostgreSQL instance reachable through `DATABASE_URL` and are `#[ignore]`d
//! by default; run them with `cargo test -- --ignored`.

// Each integration test binary compiles its own copy; not all of them use
// every helper.
#![allow(dead_code)]

use sqlx::PgPool;
use uuid::Uuid;

pub async fn connect() -> PgPool {
  let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");
  let pool = PgPool::connect(&database_url).await.expect("database connects");
  sqlx::migrate!("./migrations").run(&pool).await.expect("migrations apply");
  pool
}

pub async fn create_user(pool: &PgPool) -> Uuid {
  sqlx::query_scalar("INSERT INTO users (email) VALUES ($1) RETURNING id")
    .bind(format!("cart-test-{}@example.com", Uuid::new_v4().simple()))
    .fetch_one(pool)
    .await
    .expect("user inserts")
}

pub async fn create_product(pool: &PgPool, name: &str, price_cents: i32) -> Uuid {
  sqlx::query_scalar(
    "INSERT INTO products (name, price_cents, stock_quantity, release_year) VALUES ($1, $2, 100, 2024) RETURNING id",
  )
  .bind(name)
  .bind(price_cents)
  .fetch_one(pool)
  .await
  .expect("product inserts")
}

pub async fn cart_row_count(pool: &PgPool, user_id: Uuid) -> i64 {
  sqlx::query_scalar("SELECT COUNT(*) FROM cart_items WHERE user_id = $1")
    .bind(user_id)
    .fetch_one(pool)
    .await
    .expect("count query runs")
}
