//! HTTP handlers for the cart operations. Thin: parse, call the service,
//! shape the response. Span fields carry identifiers and counts, never row
//! payloads.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::services::cart_service;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartPayload {
  pub product_id: Uuid,
  pub quantity: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuantityPayload {
  pub quantity: i32,
}

fn parse_item_id(raw: &str) -> Result<Uuid> {
  Uuid::parse_str(raw).map_err(|_| AppError::Validation("Invalid ID format".to_string()))
}

#[instrument(name = "handler::get_cart", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn get_cart_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse> {
  let items = cart_service::list_items(&app_state.db_pool, auth_user.user_id).await?;
  Ok(HttpResponse::Ok().json(items))
}

#[instrument(
  name = "handler::add_to_cart",
  skip(app_state, payload, auth_user),
  fields(user_id = %auth_user.user_id, product_id = %payload.product_id, quantity = payload.quantity)
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<AddToCartPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse> {
  let item = cart_service::add_item(
    &app_state.db_pool,
    auth_user.user_id,
    payload.product_id,
    payload.quantity,
  )
  .await?;
  Ok(HttpResponse::Ok().json(item))
}

#[instrument(
  name = "handler::update_cart_item",
  skip(app_state, path, payload, auth_user),
  fields(user_id = %auth_user.user_id, item_id = %path.as_str(), quantity = payload.quantity)
)]
pub async fn update_cart_item_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  payload: web::Json<UpdateQuantityPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse> {
  let item_id = parse_item_id(&path)?;
  let item =
    cart_service::update_item_quantity(&app_state.db_pool, auth_user.user_id, item_id, payload.quantity).await?;
  Ok(HttpResponse::Ok().json(item))
}

#[instrument(
  name = "handler::remove_cart_item",
  skip(app_state, path, auth_user),
  fields(user_id = %auth_user.user_id, item_id = %path.as_str())
)]
pub async fn remove_cart_item_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse> {
  let item_id = parse_item_id(&path)?;
  cart_service::remove_item(&app_state.db_pool, auth_user.user_id, item_id).await?;
  Ok(HttpResponse::NoContent().finish())
}

#[instrument(name = "handler::clear_cart", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn clear_cart_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse> {
  cart_service::clear_cart(&app_state.db_pool, auth_user.user_id).await?;
  Ok(HttpResponse::NoContent().finish())
}

#[instrument(name = "handler::checkout", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn checkout_cart_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse> {
  let order = cart_service::checkout(&app_state.db_pool, auth_user.user_id).await?;
  Ok(HttpResponse::Ok().json(order))
}
