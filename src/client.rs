//! Thin request-issuing wrapper over the cart HTTP surface, for use by a UI
//! layer. Stateless beyond the caller-supplied token; no retries.

use reqwest::StatusCode;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{CartItem, CartItemWithProduct};

#[derive(Debug, Error)]
pub enum ClientError {
  #[error("request failed: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("server responded with status {status}")]
  Status { status: StatusCode },
}

#[derive(Debug, Clone)]
pub struct CartClient {
  http: reqwest::Client,
  base_url: String,
  token: String,
}

impl CartClient {
  pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
    Self {
      http: reqwest::Client::new(),
      base_url: normalize_base_url(base_url.into()),
      token: token.into(),
    }
  }

  /// Fetches the caller's cart, items joined with product detail.
  pub async fn fetch_cart_items(&self) -> Result<Vec<CartItemWithProduct>, ClientError> {
    let response = self
      .http
      .get(format!("{}/api/cart", self.base_url))
      .bearer_auth(&self.token)
      .send()
      .await?;

    if !response.status().is_success() {
      return Err(ClientError::Status {
        status: response.status(),
      });
    }
    Ok(response.json().await?)
  }

  /// Overwrites one cart line's quantity and returns the updated line.
  pub async fn update_item_quantity(&self, item_id: Uuid, quantity: i32) -> Result<CartItem, ClientError> {
    let response = self
      .http
      .put(format!("{}/api/cart/{}", self.base_url, item_id))
      .bearer_auth(&self.token)
      .json(&json!({ "quantity": quantity }))
      .send()
      .await?;

    if !response.status().is_success() {
      return Err(ClientError::Status {
        status: response.status(),
      });
    }
    Ok(response.json().await?)
  }
}

fn normalize_base_url(mut base_url: String) -> String {
  while base_url.ends_with('/') {
    base_url.pop();
  }
  base_url
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn trailing_slashes_are_stripped_from_the_base_url() {
    assert_eq!(normalize_base_url("http://localhost:8080/".into()), "http://localhost:8080");
    assert_eq!(
      normalize_base_url("http://localhost:8080///".into()),
      "http://localhost:8080"
    );
    assert_eq!(normalize_base_url("http://localhost:8080".into()), "http://localhost:8080");
  }
}
