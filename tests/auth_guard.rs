//! Auth guard behavior against a live database: a valid token for a real
//! user passes, a token for a vanished user does not.

mod common;

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use chrono::Duration;
use uuid::Uuid;

use storefront_cart::config::AppConfig;
use storefront_cart::state::AppState;
use storefront_cart::web::extractors::issue_token;
use storefront_cart::web::routes::configure_app_routes;

const SECRET: &str = "integration-test-secret";

fn state_with_pool(pool: sqlx::PgPool) -> AppState {
  AppState {
    db_pool: pool,
    config: Arc::new(AppConfig {
      server_host: "127.0.0.1".to_string(),
      server_port: 0,
      database_url: String::new(),
      access_token_secret: SECRET.to_string(),
      seed_db: false,
    }),
  }
}

#[actix_web::test]
#[ignore = "requires a PostgreSQL database via DATABASE_URL"]
async fn a_valid_token_for_an_existing_user_passes_the_guard() {
  let pool = common::connect().await;
  let user = common::create_user(&pool).await;
  let token = issue_token(user, SECRET, Duration::minutes(5)).expect("token issues");

  let app = test::init_service(
    App::new()
      .app_data(web::Data::new(state_with_pool(pool)))
      .configure(configure_app_routes),
  )
  .await;

  let req = test::TestRequest::get()
    .uri("/api/cart")
    .insert_header(("Authorization", format!("Bearer {}", token)))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);

  let body: Vec<serde_json::Value> = test::read_body_json(resp).await;
  assert!(body.is_empty(), "a fresh user has an empty cart");
}

#[actix_web::test]
#[ignore = "requires a PostgreSQL database via DATABASE_URL"]
async fn a_token_for_a_nonexistent_user_is_unauthorized() {
  let pool = common::connect().await;
  let token = issue_token(Uuid::new_v4(), SECRET, Duration::minutes(5)).expect("token issues");

  let app = test::init_service(
    App::new()
      .app_data(web::Data::new(state_with_pool(pool)))
      .configure(configure_app_routes),
  )
  .await;

  let req = test::TestRequest::get()
    .uri("/api/cart")
    .insert_header(("Authorization", format!("Bearer {}", token)))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
