use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::cache::{CacheData, keys};
use crate::db::users as user_db;
use crate::error::ApiError;
use crate::handlers::Data;
use crate::models::users::{UpdateUser, UserResponse};
use crate::validation::validate;

/// GET /api/users/{id} — public profile, served read-through from cache.
pub async fn get_user(
    _user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<CacheData>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let cache_key = keys::user(&id.to_string());

    match cache.get::<UserResponse>(&cache_key).await {
        Ok(Some(cached)) => return Ok(HttpResponse::Ok().json(Data { data: cached })),
        Ok(None) => {}
        Err(e) => tracing::warn!("cache error: {e}"),
    }

    let user = user_db::get_user_by_id(db.get_ref(), id)
        .await?
        .ok_or(ApiError::NotFound("user"))?;
    let response = UserResponse::from(user);

    if let Err(e) = cache.set(&cache_key, &response, 900).await {
        tracing::warn!("cache error: {e}");
    }

    Ok(HttpResponse::Ok().json(Data { data: response }))
}

/// PUT /api/users/{id} — self-service profile update.
pub async fn update_user(
    auth_user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<CacheData>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateUser>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    if auth_user.0.id != id {
        return Err(ApiError::Forbidden("you can only update your own account"));
    }

    let input = body.into_inner();
    validate(&input)?;

    let updated = user_db::update_user(db.get_ref(), id, input).await?;

    if let Err(e) = cache.delete(&keys::user(&id.to_string())).await {
        tracing::warn!("cache error: {e}");
    }

    Ok(HttpResponse::Ok().json(Data {
        data: UserResponse::from(updated),
    }))
}
