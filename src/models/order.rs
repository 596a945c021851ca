use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::order_item::OrderItem;

/// A completed purchase. Created atomically from the cart at checkout and
/// immutable thereafter; no update or delete operations are exposed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub id: Uuid,
  pub user_id: Uuid,
  pub created_at: DateTime<Utc>,
}

/// The checkout response shape: the order header with its line items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderWithItems {
  pub id: Uuid,
  pub user_id: Uuid,
  pub created_at: DateTime<Utc>,
  pub order_items: Vec<OrderItem>,
}

impl OrderWithItems {
  pub fn from_parts(order: Order, order_items: Vec<OrderItem>) -> Self {
    Self {
      id: order.id,
      user_id: order.user_id,
      created_at: order.created_at,
      order_items,
    }
  }
}
