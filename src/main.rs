use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use sqlx::PgPool;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

use storefront_cart::config::AppConfig;
use storefront_cart::state::AppState;
use storefront_cart::web::routes::configure_app_routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting storefront cart server...");

  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      return Err(std::io::Error::other(e.to_string()));
    }
  };

  let db_pool = match PgPool::connect(&app_config.database_url).await {
    Ok(pool) => {
      tracing::info!("Successfully connected to the database.");
      pool
    }
    Err(e) => {
      tracing::error!(error = %e, "Failed to connect to the database.");
      return Err(std::io::Error::other(e.to_string()));
    }
  };

  if let Err(e) = sqlx::migrate!("./migrations").run(&db_pool).await {
    tracing::error!(error = %e, "Failed to run database migrations.");
    return Err(std::io::Error::other(e.to_string()));
  }

  if app_config.seed_db {
    if let Err(e) = seed_demo_products(&db_pool).await {
      tracing::error!(error = %e, "Failed to seed demo products.");
    }
  }

  let app_state = AppState {
    db_pool,
    config: app_config.clone(),
  };

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Binding server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(web::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}

/// Inserts a handful of demo catalog entries when the products table is
/// empty, so a fresh instance has something to put in a cart.
async fn seed_demo_products(pool: &PgPool) -> Result<(), sqlx::Error> {
  let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products").fetch_one(pool).await?;
  if existing > 0 {
    tracing::info!(product_count = existing, "Products already present; skipping seed.");
    return Ok(());
  }

  sqlx::query(
    r#"
    INSERT INTO products (name, price_cents, stock_quantity, release_year, image_url)
    VALUES
      ('Mechanical Keyboard', 12999, 40, 2023, '/images/keyboard.jpg'),
      ('USB-C Dock', 8950, 25, 2022, '/images/dock.jpg'),
      ('Noise-Cancelling Headphones', 24900, 15, 2024, '/images/headphones.jpg')
    "#,
  )
  .execute(pool)
  .await?;

  tracing::info!("Seeded demo products.");
  Ok(())
}
