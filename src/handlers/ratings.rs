use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::db::ratings as rating_db;
use crate::error::ApiError;
use crate::handlers::Data;
use crate::lifecycle;
use crate::models::ratings::{self, CreateRating};
use crate::pagination::{Cursor, Page, PageQuery};
use crate::validation::validate;

fn rating_cursor(rating: &ratings::Model) -> Cursor {
    Cursor::new(rating.created_at, rating.id)
}

/// POST /api/contracts/{id}/ratings — rate the counterparty on a completed
/// contract. One rating per reviewer per contract.
pub async fn rate_contract(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    body: web::Json<CreateRating>,
) -> Result<HttpResponse, ApiError> {
    let input = body.into_inner();
    validate(&input)?;

    let rating =
        lifecycle::submit_rating(db.get_ref(), user.0.id, path.into_inner(), input).await?;
    Ok(HttpResponse::Created().json(Data { data: rating }))
}

/// GET /api/contracts/{id}/ratings — the (at most two) reviews on a contract.
pub async fn get_contract_ratings(
    _user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let rows = rating_db::list_ratings_by_contract(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(Data { data: rows }))
}

/// GET /api/users/{id}/ratings — reviews received by a user, newest first.
pub async fn get_user_ratings(
    _user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    let reviewee_id = path.into_inner();
    let cursor = query.cursor()?;
    let limit = query.limit();

    let rows = rating_db::list_ratings_for_user(db.get_ref(), reviewee_id, limit, cursor).await?;
    Ok(HttpResponse::Ok().json(Page::from_rows(rows, limit, rating_cursor)))
}

/// GET /api/users/{id}/ratings/summary — average score and review count.
pub async fn get_user_rating_summary(
    _user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let summary = rating_db::summary_for_user(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(Data { data: summary }))
}
