use actix_web::{web, HttpRequest, HttpResponse};
use uuid::Uuid;

use crate::domain::user::{AddressUpdate, NewAddress, UserService, UserUpdate};
use crate::store::Store;

use super::auth::{authenticate, require_admin};
use super::error::ApiError;
use super::pagination::{paginate, PageQuery};

// ============================================================================
// User Routes
// ============================================================================
//
// /api/users                 GET    paginated list       (admin)
// /api/users/profile         GET    own account          (authenticated)
// /api/users/addresses       GET    own address book     (authenticated)
// /api/users/addresses       POST   add address          (authenticated)
// /api/users/addresses/{id}  PUT    update address       (authenticated)
// /api/users/addresses/{id}  DELETE remove address       (authenticated)
// /api/users/{id}            GET    fetch account        (admin)
// /api/users/{id}            PUT    update account       (admin)
// /api/users/{id}            DELETE remove account       (admin)
//
// /profile and /addresses register ahead of /{id} so they are not
// swallowed by the id matcher.
//
// ============================================================================

pub const USERS_PAGE_SIZE: usize = 10;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/users")
            .route("", web::get().to(list_users))
            .route("/profile", web::get().to(profile))
            .route("/addresses", web::get().to(my_addresses))
            .route("/addresses", web::post().to(add_address))
            .route("/addresses/{id}", web::put().to(update_address))
            .route("/addresses/{id}", web::delete().to(delete_address))
            .route("/{id}", web::get().to(get_user))
            .route("/{id}", web::put().to(update_user))
            .route("/{id}", web::delete().to(delete_user)),
    );
}

async fn profile(store: web::Data<Store>, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let user = authenticate(&store, &req).await?;
    Ok(HttpResponse::Ok().json(user))
}

async fn my_addresses(
    store: web::Data<Store>,
    users: web::Data<UserService>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user = authenticate(&store, &req).await?;
    Ok(HttpResponse::Ok().json(users.addresses(user.id).await?))
}

async fn add_address(
    store: web::Data<Store>,
    users: web::Data<UserService>,
    req: HttpRequest,
    body: web::Json<NewAddress>,
) -> Result<HttpResponse, ApiError> {
    let user = authenticate(&store, &req).await?;
    let address = users.add_address(user.id, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(address))
}

async fn update_address(
    store: web::Data<Store>,
    users: web::Data<UserService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    body: web::Json<AddressUpdate>,
) -> Result<HttpResponse, ApiError> {
    let user = authenticate(&store, &req).await?;
    let address = users
        .update_address(user.id, path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(address))
}

async fn delete_address(
    store: web::Data<Store>,
    users: web::Data<UserService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let user = authenticate(&store, &req).await?;
    users.remove_address(user.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Address removed" })))
}

async fn list_users(
    store: web::Data<Store>,
    users: web::Data<UserService>,
    req: HttpRequest,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&store, &req).await?;

    let page = paginate(users.list().await, query.page(), USERS_PAGE_SIZE);
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "users": page.items,
        "page": page.page,
        "pages": page.pages,
        "total": page.total,
    })))
}

async fn get_user(
    store: web::Data<Store>,
    users: web::Data<UserService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&store, &req).await?;
    Ok(HttpResponse::Ok().json(users.get(path.into_inner()).await?))
}

async fn update_user(
    store: web::Data<Store>,
    users: web::Data<UserService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    body: web::Json<UserUpdate>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&store, &req).await?;
    let user = users.update(path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

async fn delete_user(
    store: web::Data<Store>,
    users: web::Data<UserService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    require_admin(&store, &req).await?;
    users.delete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "User removed" })))
}

// ============================================================================
// Integration Tests
// ============================================================================
