use crate::config::AppConfig;
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state, created once in `main` and handed to every
/// handler through `web::Data`. The pool is the only store handle in the
/// process; it is released when the server shuts down.
#[derive(Clone)]
pub struct AppState {
  pub db_pool: PgPool,
  pub config: Arc<AppConfig>,
}
