use actix_web::{web, HttpResponse};

use crate::web::handlers::cart_handlers;

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Route table, mounted in `main`. The cart routes all sit behind the
/// bearer-token auth guard via the `AuthenticatedUser` extractor.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api")
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/cart")
          // "/checkout" must register before "/{item_id}" so it is not
          // captured as an item id.
          .route("/checkout", web::post().to(cart_handlers::checkout_cart_handler))
          .route("", web::get().to(cart_handlers::get_cart_handler))
          .route("", web::post().to(cart_handlers::add_to_cart_handler))
          .route("", web::delete().to(cart_handlers::clear_cart_handler))
          .route("/{item_id}", web::put().to(cart_handlers::update_cart_item_handler))
          .route("/{item_id}", web::delete().to(cart_handlers::remove_cart_item_handler)),
      ),
  );
}
