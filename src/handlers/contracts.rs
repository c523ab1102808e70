use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::db::contracts as contract_db;
use crate::error::ApiError;
use crate::handlers::Data;
use crate::lifecycle;
use crate::models::contracts;
use crate::pagination::{Cursor, Page, PageQuery};

fn contract_cursor(contract: &contracts::Model) -> Cursor {
    Cursor::new(contract.created_at, contract.id)
}

/// GET /api/contracts — contracts where the caller is a party, newest first.
pub async fn list_contracts(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    let cursor = query.cursor()?;
    let limit = query.limit();

    let rows =
        contract_db::list_contracts_for_user(db.get_ref(), user.0.id, limit, cursor).await?;
    Ok(HttpResponse::Ok().json(Page::from_rows(rows, limit, contract_cursor)))
}

/// GET /api/contracts/{id} — visible to its two parties only.
pub async fn get_contract(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let contract = contract_db::get_contract_by_id(db.get_ref(), path.into_inner())
        .await?
        .ok_or(ApiError::NotFound("contract"))?;

    if !contract.is_party(user.0.id) {
        return Err(ApiError::Forbidden("you are not a party to this contract"));
    }

    Ok(HttpResponse::Ok().json(Data { data: contract }))
}

/// POST /api/contracts/{id}/complete — freelancer marks the work complete.
/// The contract closes only when the founder has approved as well.
pub async fn mark_complete(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let contract = lifecycle::mark_complete(db.get_ref(), user.0.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(Data { data: contract }))
}

/// POST /api/contracts/{id}/approve — founder approves completion. The
/// contract closes only when the freelancer has marked complete as well.
pub async fn approve_completion(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let contract =
        lifecycle::approve_completion(db.get_ref(), user.0.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(Data { data: contract }))
}

/// POST /api/contracts/{id}/cancel — either party cancels an active contract.
pub async fn cancel(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let contract = lifecycle::cancel_contract(db.get_ref(), user.0.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(Data { data: contract }))
}

/// POST /api/contracts/{id}/dispute — either party raises a dispute.
pub async fn dispute(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let contract = lifecycle::dispute_contract(db.get_ref(), user.0.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(Data { data: contract }))
}
