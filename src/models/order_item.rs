use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Snapshot of a cart line's product and quantity at checkout time, owned
/// exclusively by one order.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
  pub id: Uuid,
  pub order_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
}
