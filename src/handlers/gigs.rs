use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::cache::{CacheData, keys};
use crate::db::gigs as gig_db;
use crate::error::ApiError;
use crate::handlers::Data;
use crate::lifecycle;
use crate::models::gigs::{self, CreateGig, GigListQuery, UpdateGig};
use crate::pagination::{Cursor, Page, PageQuery};
use crate::validation::validate;

fn gig_cursor(gig: &gigs::Model) -> Cursor {
    Cursor::new(gig.created_at, gig.id)
}

/// POST /api/gigs — founder posts a new gig (draft or straight to open).
pub async fn create_gig(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    body: web::Json<CreateGig>,
) -> Result<HttpResponse, ApiError> {
    let input = body.into_inner();
    validate(&input)?;

    let gig = gig_db::insert_gig(db.get_ref(), input, user.0.id).await?;
    Ok(HttpResponse::Created().json(Data { data: gig }))
}

/// GET /api/gigs — browse gigs with filters and keyset pagination.
pub async fn list_gigs(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    query: web::Query<GigListQuery>,
) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    let page = query.page();
    let cursor = page.cursor()?;
    let limit = page.limit();

    let rows = gig_db::list_gigs(db.get_ref(), user.0.id, &query, cursor).await?;
    Ok(HttpResponse::Ok().json(Page::from_rows(rows, limit, gig_cursor)))
}

/// GET /api/gigs/mine — the founder's own gigs, any status.
pub async fn my_gigs(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    let cursor = query.cursor()?;
    let limit = query.limit();

    let rows = gig_db::list_gigs_by_founder(db.get_ref(), user.0.id, limit, cursor).await?;
    Ok(HttpResponse::Ok().json(Page::from_rows(rows, limit, gig_cursor)))
}

/// GET /api/gigs/{id} — gig detail, served read-through from cache.
pub async fn get_gig(
    _user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<CacheData>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let cache_key = keys::gig(&id.to_string());

    match cache.get::<gigs::Model>(&cache_key).await {
        Ok(Some(cached)) => return Ok(HttpResponse::Ok().json(Data { data: cached })),
        Ok(None) => {}
        Err(e) => tracing::warn!("cache error: {e}"),
    }

    let gig = gig_db::get_gig_by_id(db.get_ref(), id)
        .await?
        .ok_or(ApiError::NotFound("gig"))?;

    if let Err(e) = cache.set(&cache_key, &gig, 600).await {
        tracing::warn!("cache error: {e}");
    }

    Ok(HttpResponse::Ok().json(Data { data: gig }))
}

/// PATCH /api/gigs/{id} — founder edits, legal while the gig is draft/open.
pub async fn update_gig(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<CacheData>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateGig>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let input = body.into_inner();
    validate(&input)?;

    let gig = gig_db::get_gig_by_id(db.get_ref(), id)
        .await?
        .ok_or(ApiError::NotFound("gig"))?;
    if gig.founder_id != user.0.id {
        return Err(ApiError::Forbidden("only the gig founder can edit it"));
    }
    if !gig.is_editable() {
        return Err(ApiError::GigNotOpen);
    }

    // The partial DTO can't cross-check the budget range on its own; check
    // it against the merged values.
    let budget_min = input.budget_min.unwrap_or(gig.budget_min);
    let budget_max = input.budget_max.unwrap_or(gig.budget_max);
    if budget_max < budget_min {
        let mut errors = validator::ValidationErrors::new();
        errors.add(
            "budget_max",
            validator::ValidationError::new("budget_max_below_min"),
        );
        return Err(ApiError::Validation(errors));
    }

    let updated = gig_db::update_gig(db.get_ref(), gig, input).await?;

    if let Err(e) = cache.delete(&keys::gig(&id.to_string())).await {
        tracing::warn!("cache error: {e}");
    }

    Ok(HttpResponse::Ok().json(Data { data: updated }))
}

/// POST /api/gigs/{id}/cancel — founder cancels a draft/open gig.
pub async fn cancel_gig(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<CacheData>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let cancelled = lifecycle::cancel_gig(db.get_ref(), user.0.id, id).await?;

    if let Err(e) = cache.delete(&keys::gig(&id.to_string())).await {
        tracing::warn!("cache error: {e}");
    }

    Ok(HttpResponse::Ok().json(Data { data: cancelled }))
}

/// POST /api/gigs/{id}/recount-proposals — repair counter drift.
pub async fn recount_proposals(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<CacheData>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let count = lifecycle::recount_gig_proposals(db.get_ref(), user.0.id, id).await?;

    if let Err(e) = cache.delete(&keys::gig(&id.to_string())).await {
        tracing::warn!("cache error: {e}");
    }

    Ok(HttpResponse::Ok().json(Data {
        data: serde_json::json!({ "gig_id": id, "proposals_count": count }),
    }))
}
