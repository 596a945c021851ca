//! Cart persistence logic. Every operation is scoped to the calling user;
//! the handlers never touch SQL directly.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::{CartItem, CartItemWithProduct, Order, OrderItem, OrderWithItems, Product};

/// Postgres error code for a foreign-key violation.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Flat row for the cart/product join; column aliases keep the two `id`
/// columns apart.
#[derive(Debug, FromRow)]
struct CartRow {
  id: Uuid,
  user_id: Uuid,
  product_id: Uuid,
  quantity: i32,
  added_at: DateTime<Utc>,
  product_name: String,
  product_price_cents: i32,
  product_stock_quantity: i32,
  product_release_year: Option<i32>,
  product_image_url: Option<String>,
  product_created_at: DateTime<Utc>,
  product_updated_at: DateTime<Utc>,
}

impl From<CartRow> for CartItemWithProduct {
  fn from(row: CartRow) -> Self {
    CartItemWithProduct {
      id: row.id,
      user_id: row.user_id,
      product_id: row.product_id,
      quantity: row.quantity,
      added_at: row.added_at,
      product: Product {
        id: row.product_id,
        name: row.product_name,
        price_cents: row.product_price_cents,
        stock_quantity: row.product_stock_quantity,
        release_year: row.product_release_year,
        image_url: row.product_image_url,
        created_at: row.product_created_at,
        updated_at: row.product_updated_at,
      },
    }
  }
}

pub fn validate_quantity(quantity: i32) -> Result<()> {
  if quantity <= 0 {
    return Err(AppError::Validation("Quantity must be a positive number.".to_string()));
  }
  Ok(())
}

/// The single ownership gate every mutating operation goes through.
fn ensure_owner(item: &CartItem, user_id: Uuid) -> Result<()> {
  if item.user_id != user_id {
    // Same outcome as a missing row so other users' item ids are not
    // confirmable.
    return Err(AppError::Forbidden("Unauthorized to act on this cart item".to_string()));
  }
  Ok(())
}

async fn fetch_item(pool: &PgPool, item_id: Uuid) -> Result<Option<CartItem>> {
  let item = sqlx::query_as("SELECT id, user_id, product_id, quantity, added_at FROM cart_items WHERE id = $1")
    .bind(item_id)
    .fetch_optional(pool)
    .await?;
  Ok(item)
}

/// All of the caller's cart lines, each joined with its product.
#[instrument(name = "cart_service::list_items", skip(pool), fields(user_id = %user_id))]
pub async fn list_items(pool: &PgPool, user_id: Uuid) -> Result<Vec<CartItemWithProduct>> {
  let rows: Vec<CartRow> = sqlx::query_as(
    r#"
    SELECT ci.id, ci.user_id, ci.product_id, ci.quantity, ci.added_at,
           p.name        AS product_name,
           p.price_cents AS product_price_cents,
           p.stock_quantity AS product_stock_quantity,
           p.release_year AS product_release_year,
           p.image_url   AS product_image_url,
           p.created_at  AS product_created_at,
           p.updated_at  AS product_updated_at
    FROM cart_items ci
    JOIN products p ON p.id = ci.product_id
    WHERE ci.user_id = $1
    ORDER BY ci.added_at ASC
    "#,
  )
  .bind(user_id)
  .fetch_all(pool)
  .await?;

  info!(item_count = rows.len(), "fetched cart items");
  Ok(rows.into_iter().map(CartItemWithProduct::from).collect())
}

/// Adds a product to the cart, or increments the existing line.
///
/// The lookup-and-increment is one atomic conditional write against the
/// (user_id, product_id) unique constraint, so concurrent adds of the same
/// product cannot produce duplicate rows.
#[instrument(
  name = "cart_service::add_item",
  skip(pool),
  fields(user_id = %user_id, product_id = %product_id, quantity)
)]
pub async fn add_item(pool: &PgPool, user_id: Uuid, product_id: Uuid, quantity: i32) -> Result<CartItem> {
  validate_quantity(quantity)?;

  let item: CartItem = sqlx::query_as(
    r#"
    INSERT INTO cart_items (user_id, product_id, quantity)
    VALUES ($1, $2, $3)
    ON CONFLICT (user_id, product_id)
    DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity
    RETURNING id, user_id, product_id, quantity, added_at
    "#,
  )
  .bind(user_id)
  .bind(product_id)
  .bind(quantity)
  .fetch_one(pool)
  .await
  .map_err(|e| match e.as_database_error().and_then(|db| db.code()) {
    Some(code) if code == FOREIGN_KEY_VIOLATION => {
      AppError::NotFound(format!("Product with ID {} not found.", product_id))
    }
    _ => AppError::Sqlx(e),
  })?;

  info!(item_id = %item.id, new_quantity = item.quantity, "cart item added or incremented");
  Ok(item)
}

/// Overwrites the quantity of a cart line the caller owns.
///
/// A missing row and another user's row produce the same `Forbidden`
/// outcome by design.
#[instrument(
  name = "cart_service::update_item_quantity",
  skip(pool),
  fields(user_id = %user_id, item_id = %item_id, quantity)
)]
pub async fn update_item_quantity(pool: &PgPool, user_id: Uuid, item_id: Uuid, quantity: i32) -> Result<CartItem> {
  validate_quantity(quantity)?;

  match fetch_item(pool, item_id).await? {
    None => Err(AppError::Forbidden(
      "Unauthorized to update this cart item".to_string(),
    )),
    Some(existing) => {
      ensure_owner(&existing, user_id)?;

      let updated: Option<CartItem> = sqlx::query_as(
        r#"
        UPDATE cart_items SET quantity = $3
        WHERE id = $1 AND user_id = $2
        RETURNING id, user_id, product_id, quantity, added_at
        "#,
      )
      .bind(item_id)
      .bind(user_id)
      .bind(quantity)
      .fetch_optional(pool)
      .await?;

      // The row can vanish between the fetch and the update; the scoped
      // UPDATE then matches nothing.
      updated.ok_or_else(|| AppError::Forbidden("Unauthorized to update this cart item".to_string()))
    }
  }
}

/// Deletes one cart line the caller owns. Missing rows are `NotFound`;
/// another user's rows are `Forbidden`.
#[instrument(
  name = "cart_service::remove_item",
  skip(pool),
  fields(user_id = %user_id, item_id = %item_id)
)]
pub async fn remove_item(pool: &PgPool, user_id: Uuid, item_id: Uuid) -> Result<()> {
  match fetch_item(pool, item_id).await? {
    None => Err(AppError::NotFound("Cart item not found".to_string())),
    Some(existing) => {
      ensure_owner(&existing, user_id)?;

      sqlx::query("DELETE FROM cart_items WHERE id = $1 AND user_id = $2")
        .bind(item_id)
        .bind(user_id)
        .execute(pool)
        .await?;

      info!("cart item removed");
      Ok(())
    }
  }
}

/// Deletes every cart line the caller owns. Idempotent; clearing an empty
/// cart succeeds.
#[instrument(name = "cart_service::clear_cart", skip(pool), fields(user_id = %user_id))]
pub async fn clear_cart(pool: &PgPool, user_id: Uuid) -> Result<u64> {
  let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
    .bind(user_id)
    .execute(pool)
    .await?;

  info!(removed = result.rows_affected(), "cart cleared");
  Ok(result.rows_affected())
}

/// Converts the caller's cart into an immutable order.
///
/// Reads the cart, creates the order with one line per cart item (product
/// and quantity copied), and empties the cart, all inside one transaction:
/// either the order exists and the cart is empty, or neither happened.
/// An empty cart checks out into a zero-item order.
#[instrument(name = "cart_service::checkout", skip(pool), fields(user_id = %user_id))]
pub async fn checkout(pool: &PgPool, user_id: Uuid) -> Result<OrderWithItems> {
  let mut tx = pool.begin().await?;

  // Lock the cart rows so a concurrent add or clear cannot interleave with
  // the snapshot.
  let cart_items: Vec<CartItem> = sqlx::query_as(
    "SELECT id, user_id, product_id, quantity, added_at FROM cart_items WHERE user_id = $1 FOR UPDATE",
  )
  .bind(user_id)
  .fetch_all(&mut *tx)
  .await?;

  let order: Order = sqlx::query_as("INSERT INTO orders (user_id) VALUES ($1) RETURNING id, user_id, created_at")
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;

  let mut order_items = Vec::with_capacity(cart_items.len());
  for cart_item in &cart_items {
    let order_item: OrderItem = sqlx::query_as(
      r#"
      INSERT INTO order_items (order_id, product_id, quantity)
      VALUES ($1, $2, $3)
      RETURNING id, order_id, product_id, quantity
      "#,
    )
    .bind(order.id)
    .bind(cart_item.product_id)
    .bind(cart_item.quantity)
    .fetch_one(&mut *tx)
    .await?;
    order_items.push(order_item);
  }

  sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

  tx.commit().await?;

  info!(order_id = %order.id, item_count = order_items.len(), "checkout committed");
  Ok(OrderWithItems::from_parts(order, order_items))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn non_positive_quantities_are_rejected() {
    assert!(matches!(validate_quantity(0), Err(AppError::Validation(_))));
    assert!(matches!(validate_quantity(-3), Err(AppError::Validation(_))));
    assert!(validate_quantity(1).is_ok());
    assert!(validate_quantity(500).is_ok());
  }

  #[test]
  fn ownership_gate_rejects_other_users() {
    let owner = Uuid::new_v4();
    let stranger = Uuid::new_v4();
    let item = CartItem {
      id: Uuid::new_v4(),
      user_id: owner,
      product_id: Uuid::new_v4(),
      quantity: 2,
      added_at: Utc::now(),
    };

    assert!(ensure_owner(&item, owner).is_ok());
    assert!(matches!(ensure_owner(&item, stranger), Err(AppError::Forbidden(_))));
  }
}
