use std::sync::Arc;

use actix_web::web;

use crate::domain::order::OrderService;
use crate::domain::product::CatalogService;
use crate::domain::user::UserService;
use crate::metrics::Metrics;
use crate::store::Store;

// ============================================================================
// HTTP Layer
// ============================================================================
//
// Route registration and the request boundary:
//
// - auth: bearer-token resolution and the admin gate
// - error: ApiError and the `{"message": ...}` wire shape
// - pagination: pageNumber parsing and list slicing
// - orders / products / users: the route handlers
//
// Malformed JSON bodies, paths, and query strings are rewritten into the
// same `{"message": ...}` shape as domain failures, so callers see one
// error format everywhere.
//
// ============================================================================

pub mod auth;
pub mod error;
mod orders;
pub mod pagination;
mod products;
mod users;

pub use error::ApiError;

/// Build the app configuration: shared state, extractor error handlers,
/// and every route group including the operational endpoints.
pub fn configure(
    store: Arc<Store>,
    metrics: Arc<Metrics>,
) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        let order_service = OrderService::new(store.clone(), metrics.clone());
        let catalog_service = CatalogService::new(store.clone(), metrics.clone());
        let user_service = UserService::new(store.clone());

        cfg.app_data(web::Data::from(store))
            .app_data(web::Data::from(metrics))
            .app_data(web::Data::new(order_service))
            .app_data(web::Data::new(catalog_service))
            .app_data(web::Data::new(user_service))
            .app_data(json_config())
            .app_data(path_config())
            .app_data(query_config())
            .configure(orders::configure)
            .configure(products::configure)
            .configure(users::configure)
            .configure(crate::metrics::configure);
    }
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into())
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into())
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into())
}

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};

    macro_rules! test_app {
        () => {{
            let store = Arc::new(Store::new());
            let metrics = Arc::new(Metrics::new().unwrap());
            test::init_service(App::new().configure(configure(store, metrics))).await
        }};
    }

    #[actix_web::test]
    async fn test_malformed_json_body_is_400_with_message_shape() {
        let app = test_app!();

        let req = test::TestRequest::post()
            .uri("/api/orders")
            .insert_header(("Content-Type", "application/json"))
            .set_payload("{ not json")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 400);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["message"].is_string());
    }

    #[actix_web::test]
    async fn test_invalid_uuid_in_path_is_400() {
        let app = test_app!();

        let req = test::TestRequest::get()
            .uri("/api/orders/not-a-uuid")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 400);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["message"].is_string());
    }

    #[actix_web::test]
    async fn test_invalid_page_number_is_400() {
        let app = test_app!();

        let req = test::TestRequest::get()
            .uri("/api/products?pageNumber=abc")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn test_health_endpoint() {
        let app = test_app!();

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "storefront-api");
    }

    #[actix_web::test]
    async fn test_metrics_endpoint_exposes_counters() {
        let app = test_app!();

        let req = test::TestRequest::get().uri("/metrics").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 200);
        let body = test::read_body(resp).await;
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("orders_placed_total"));
        assert!(text.contains("stock_rejections_total"));
    }
}
