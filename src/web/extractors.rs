//! Request extractors, most importantly the bearer-token auth guard.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use chrono::{Duration, Utc};
use futures_util::future::LocalBoxFuture;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::User;
use crate::state::AppState;

/// Bearer-token payload: the user it was issued to and when it expires.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
  pub sub: Uuid,
  pub exp: i64,
}

/// The identity attached to a request once the auth guard has passed.
///
/// Extraction fails with a 401 before any cart logic runs when the token is
/// missing, fails verification, has expired, or names a user that no longer
/// exists. On success it has no other side effect.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
  pub user_id: Uuid,
  pub email: String,
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    let req = req.clone();
    Box::pin(async move {
      let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::Internal("AppState not configured on the application".to_string()))?;

      let Some(token) = extract_bearer_token(&req) else {
        warn!("auth guard: missing or malformed Authorization header");
        return Err(AppError::Auth("No token provided".to_string()));
      };

      let claims = decode_token(token, &state.config.access_token_secret)?;

      let user: Option<User> = sqlx::query_as("SELECT id, email, created_at FROM users WHERE id = $1")
        .bind(claims.sub)
        .fetch_optional(&state.db_pool)
        .await?;

      match user {
        Some(user) => Ok(AuthenticatedUser {
          user_id: user.id,
          email: user.email,
        }),
        None => {
          warn!(subject = %claims.sub, "auth guard: token subject resolves to no user");
          Err(AppError::Auth("Invalid user".to_string()))
        }
      }
    })
  }
}

fn extract_bearer_token(req: &HttpRequest) -> Option<&str> {
  let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
  parse_bearer(value)
}

fn parse_bearer(header_value: &str) -> Option<&str> {
  let mut parts = header_value.splitn(2, ' ');
  let scheme = parts.next()?;
  let token = parts.next()?.trim();

  if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
    return None;
  }

  Some(token)
}

/// Verifies signature and expiry against the server-held secret.
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, AppError> {
  decode::<Claims>(
    token,
    &DecodingKey::from_secret(secret.as_bytes()),
    &Validation::default(),
  )
  .map(|data| data.claims)
  .map_err(|e| {
    warn!(error = %e, "auth guard: token verification failed");
    AppError::Auth("Token verification failed".to_string())
  })
}

/// Issues a signed token for a user, valid for `ttl`. Used by tests and the
/// operational token tool; the serving path only ever verifies.
pub fn issue_token(user_id: Uuid, secret: &str, ttl: Duration) -> Result<String, AppError> {
  let claims = Claims {
    sub: user_id,
    exp: (Utc::now() + ttl).timestamp(),
  };
  encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
    .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
}

#[cfg(test)]
mod tests {
  use super::*;

  const SECRET: &str = "unit-test-secret";

  #[test]
  fn issued_tokens_round_trip() {
    let user_id = Uuid::new_v4();
    let token = issue_token(user_id, SECRET, Duration::minutes(5)).expect("token issues");
    let claims = decode_token(&token, SECRET).expect("token decodes");
    assert_eq!(claims.sub, user_id);
  }

  #[test]
  fn expired_tokens_are_rejected() {
    let token = issue_token(Uuid::new_v4(), SECRET, Duration::minutes(-5)).expect("token issues");
    let err = decode_token(&token, SECRET).expect_err("expired token must fail");
    assert!(matches!(err, AppError::Auth(_)));
  }

  #[test]
  fn tokens_signed_with_another_secret_are_rejected() {
    let token = issue_token(Uuid::new_v4(), "other-secret", Duration::minutes(5)).expect("token issues");
    let err = decode_token(&token, SECRET).expect_err("foreign signature must fail");
    assert!(matches!(err, AppError::Auth(_)));
  }

  #[test]
  fn bearer_parsing_accepts_the_scheme_case_insensitively() {
    assert_eq!(parse_bearer("Bearer abc"), Some("abc"));
    assert_eq!(parse_bearer("bearer abc"), Some("abc"));
    assert_eq!(parse_bearer("BEARER abc"), Some("abc"));
  }

  #[test]
  fn bearer_parsing_rejects_other_shapes() {
    assert_eq!(parse_bearer("abc"), None);
    assert_eq!(parse_bearer("Basic abc"), None);
    assert_eq!(parse_bearer("Bearer "), None);
    assert_eq!(parse_bearer(""), None);
  }
}
