use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::order::{OrderDraft, OrderService, PaymentConfirmation, StatusUpdate};
use crate::store::Store;

use super::auth::{authenticate, require_admin};
use super::error::ApiError;
use super::pagination::{paginate, PageQuery};

// ============================================================================
// Order Routes
// ============================================================================
//
// /api/orders            POST  place order            (authenticated)
// /api/orders            GET   paginated list         (admin)
// /api/orders/myorders   GET   own orders             (authenticated)
// /api/orders/{id}       GET   fetch one              (owner or admin)
// /api/orders/{id}/pay   PUT   attach payment         (authenticated)
// /api/orders/{id}/deliver PUT mark delivered         (admin)
// /api/orders/{id}/status  PUT arbitrary overwrite    (admin)
// /api/orders/{id}/cancel  PUT cancel and restock     (owner or admin)
//
// /myorders must register ahead of /{id} so it is not swallowed by the
// id matcher.
//
// ============================================================================

pub const ORDERS_PAGE_SIZE: usize = 10;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/orders")
            .route("", web::post().to(place_order))
            .route("", web::get().to(list_orders))
            .route("/myorders", web::get().to(my_orders))
            .route("/{id}", web::get().to(get_order))
            .route("/{id}/pay", web::put().to(pay_order))
            .route("/{id}/deliver", web::put().to(deliver_order))
            .route("/{id}/status", web::put().to(update_order_status))
            .route("/{id}/cancel", web::put().to(cancel_order)),
    );
}

/// Payment gateway callback payload. Field names follow the provider's
/// wire shape, not ours.
#[derive(Debug, Deserialize)]
struct PaymentNotice {
    id: String,
    status: String,
    update_time: String,
    payer: Payer,
}

#[derive(Debug, Deserialize)]
struct Payer {
    email_address: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CancelRequest {
    cancellation_reason: Option<String>,
}

async fn place_order(
    store: web::Data<Store>,
    orders: web::Data<OrderService>,
    req: HttpRequest,
    body: web::Json<OrderDraft>,
) -> Result<HttpResponse, ApiError> {
    let user = authenticate(&store, &req).await?;
    let order = orders.place(user.id, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(order))
}

async fn list_orders(
    store: web::Data<Store>,
    orders: web::Data<OrderService>,
    req: HttpRequest,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&store, &req).await?;

    let page = paginate(orders.list_all().await, query.page(), ORDERS_PAGE_SIZE);
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "orders": page.items,
        "page": page.page,
        "pages": page.pages,
        "total": page.total,
    })))
}

async fn my_orders(
    store: web::Data<Store>,
    orders: web::Data<OrderService>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user = authenticate(&store, &req).await?;
    Ok(HttpResponse::Ok().json(orders.list_for_user(user.id).await))
}

async fn get_order(
    store: web::Data<Store>,
    orders: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let user = authenticate(&store, &req).await?;
    let order = orders.get(path.into_inner()).await?;

    if order.user_id != user.id && !user.is_admin() {
        return Err(ApiError::Unauthorized("Not authorized".to_string()));
    }

    Ok(HttpResponse::Ok().json(order))
}

async fn pay_order(
    store: web::Data<Store>,
    orders: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    body: web::Json<PaymentNotice>,
) -> Result<HttpResponse, ApiError> {
    authenticate(&store, &req).await?;

    let notice = body.into_inner();
    let confirmation = PaymentConfirmation {
        id: notice.id,
        status: notice.status,
        update_time: notice.update_time,
        email_address: notice.payer.email_address,
    };

    let order = orders.mark_paid(path.into_inner(), confirmation).await?;
    Ok(HttpResponse::Ok().json(order))
}

async fn deliver_order(
    store: web::Data<Store>,
    orders: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&store, &req).await?;
    let order = orders.mark_delivered(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(order))
}

async fn update_order_status(
    store: web::Data<Store>,
    orders: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    body: web::Json<StatusUpdate>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&store, &req).await?;
    let order = orders
        .update_status(path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(order))
}

async fn cancel_order(
    store: web::Data<Store>,
    orders: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    body: Option<web::Json<CancelRequest>>,
) -> Result<HttpResponse, ApiError> {
    let user = authenticate(&store, &req).await?;
    let order_id = path.into_inner();

    let existing = orders.get(order_id).await?;
    if existing.user_id != user.id && !user.is_admin() {
        return Err(ApiError::Unauthorized("Not authorized".to_string()));
    }

    let reason = body.and_then(|b| b.into_inner().cancellation_reason);
    let order = orders.cancel(order_id, user.id, reason).await?;
    Ok(HttpResponse::Ok().json(order))
}

// ============================================================================
// Integration Tests
// ============================================================================
