use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  /// Acting on a row that does not exist or belongs to another user.
  /// Deliberately undifferentiated from not-found so callers cannot probe
  /// for the existence of other users' cart items.
  #[error("Forbidden: {0}")]
  Forbidden(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

// Lets handlers use `?` on functions returning anyhow::Result.
impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<sqlx::Error>() {
      Ok(sqlx_err) => AppError::Sqlx(sqlx_err),
      Err(other) => AppError::Internal(other.to_string()),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::Forbidden(_) => StatusCode::FORBIDDEN,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    // Server-side failures carry diagnostic detail in the log only; the
    // response body stays generic.
    match self {
      AppError::Validation(m) => HttpResponse::BadRequest().json(json!({"error": m})),
      AppError::Auth(m) => HttpResponse::Unauthorized().json(json!({"error": m})),
      AppError::Forbidden(m) => HttpResponse::Forbidden().json(json!({"error": m})),
      AppError::NotFound(m) => HttpResponse::NotFound().json(json!({"error": m})),
      AppError::Config(m) => {
        tracing::error!(detail = %m, "configuration error while handling request");
        HttpResponse::InternalServerError().json(json!({"error": "Configuration issue"}))
      }
      AppError::Sqlx(e) => {
        tracing::error!(error = %e, "database operation failed");
        HttpResponse::InternalServerError().json(json!({"error": "Database operation failed"}))
      }
      AppError::Internal(m) => {
        tracing::error!(detail = %m, "internal error while handling request");
        HttpResponse::InternalServerError().json(json!({"error": "An internal error occurred"}))
      }
    }
  }
}

/// Result alias used throughout the application.
pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_codes_follow_the_error_taxonomy() {
    assert_eq!(
      AppError::Validation("q".into()).status_code(),
      StatusCode::BAD_REQUEST
    );
    assert_eq!(AppError::Auth("t".into()).status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(AppError::Forbidden("o".into()).status_code(), StatusCode::FORBIDDEN);
    assert_eq!(AppError::NotFound("r".into()).status_code(), StatusCode::NOT_FOUND);
    assert_eq!(
      AppError::Internal("x".into()).status_code(),
      StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
      AppError::Sqlx(sqlx::Error::RowNotFound).status_code(),
      StatusCode::INTERNAL_SERVER_ERROR
    );
  }

  #[actix_web::test]
  async fn database_errors_never_leak_detail_to_the_body() {
    let resp = AppError::Sqlx(sqlx::Error::PoolTimedOut).error_response();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = actix_web::body::to_bytes(resp.into_body())
      .await
      .expect("body collects");
    let text = String::from_utf8(body.to_vec()).expect("utf8 body");
    assert!(!text.contains("PoolTimedOut"));
    assert!(text.contains("Database operation failed"));
  }

  #[test]
  fn anyhow_conversion_preserves_sqlx_errors() {
    let err: AppError = anyhow::Error::new(sqlx::Error::RowNotFound).into();
    assert!(matches!(err, AppError::Sqlx(sqlx::Error::RowNotFound)));

    let err: AppError = anyhow::anyhow!("something else").into();
    assert!(matches!(err, AppError::Internal(_)));
  }
}
