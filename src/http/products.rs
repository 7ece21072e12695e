use actix_web::{web, HttpRequest, HttpResponse};
use uuid::Uuid;

use crate::domain::product::{CatalogFilter, CatalogService, NewProduct, NewReview, ProductUpdate};
use crate::store::Store;

use super::auth::{authenticate, require_admin};
use super::error::ApiError;
use super::pagination::{paginate, PageQuery};

// ============================================================================
// Product Routes
// ============================================================================
//
// /api/products                GET    filtered paginated list   (public)
// /api/products                POST   create                    (admin)
// /api/products/top            GET    best rated                (public)
// /api/products/featured       GET    featured                  (public)
// /api/products/admin/all      GET    everything incl. hidden   (admin)
// /api/products/{id}           GET    fetch one active          (public)
// /api/products/{id}           PUT    partial update            (admin)
// /api/products/{id}           DELETE remove                    (admin)
// /api/products/{id}/reviews   POST   add review                (authenticated)
//
// The named routes register ahead of /{id} so they are not swallowed by
// the id matcher.
//
// ============================================================================

pub const PRODUCTS_PAGE_SIZE: usize = 12;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/products")
            .route("", web::get().to(list_products))
            .route("", web::post().to(create_product))
            .route("/top", web::get().to(top_products))
            .route("/featured", web::get().to(featured_products))
            .route("/admin/all", web::get().to(list_all_products))
            .route("/{id}", web::get().to(get_product))
            .route("/{id}", web::put().to(update_product))
            .route("/{id}", web::delete().to(delete_product))
            .route("/{id}/reviews", web::post().to(add_review)),
    );
}

async fn list_products(
    catalog: web::Data<CatalogService>,
    filter: web::Query<CatalogFilter>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    let results = catalog.search(&filter).await;
    let page = paginate(results, query.page(), PRODUCTS_PAGE_SIZE);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "products": page.items,
        "page": page.page,
        "pages": page.pages,
        "total": page.total,
    })))
}

async fn create_product(
    store: web::Data<Store>,
    catalog: web::Data<CatalogService>,
    req: HttpRequest,
    body: web::Json<NewProduct>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&store, &req).await?;
    let product = catalog.create(body.into_inner()).await;
    Ok(HttpResponse::Created().json(product))
}

async fn top_products(catalog: web::Data<CatalogService>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(catalog.top_rated().await))
}

async fn featured_products(catalog: web::Data<CatalogService>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(catalog.featured().await))
}

async fn list_all_products(
    store: web::Data<Store>,
    catalog: web::Data<CatalogService>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    require_admin(&store, &req).await?;
    Ok(HttpResponse::Ok().json(catalog.list_all().await))
}

async fn get_product(
    catalog: web::Data<CatalogService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let product = catalog.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(product))
}

async fn update_product(
    store: web::Data<Store>,
    catalog: web::Data<CatalogService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    body: web::Json<ProductUpdate>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&store, &req).await?;
    let product = catalog.update(path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(product))
}

async fn delete_product(
    store: web::Data<Store>,
    catalog: web::Data<CatalogService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&store, &req).await?;
    catalog.delete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Product removed" })))
}

async fn add_review(
    store: web::Data<Store>,
    catalog: web::Data<CatalogService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    body: web::Json<NewReview>,
) -> Result<HttpResponse, ApiError> {
    let user = authenticate(&store, &req).await?;
    catalog
        .add_review(path.into_inner(), user.id, &user.name, body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(serde_json::json!({ "message": "Review added" })))
}

// ============================================================================
// Integration Tests
// ============================================================================
