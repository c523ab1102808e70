use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::db::gigs as gig_db;
use crate::db::proposals as proposal_db;
use crate::error::ApiError;
use crate::handlers::Data;
use crate::lifecycle;
use crate::models::proposals::{self, CreateProposal};
use crate::pagination::{Cursor, Page, PageQuery};
use crate::validation::validate;

fn proposal_cursor(proposal: &proposals::Model) -> Cursor {
    Cursor::new(proposal.created_at, proposal.id)
}

/// POST /api/gigs/{gig_id}/proposals — freelancer bids on an open gig.
pub async fn submit_proposal(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    body: web::Json<CreateProposal>,
) -> Result<HttpResponse, ApiError> {
    let gig_id = path.into_inner();
    let input = body.into_inner();
    validate(&input)?;

    let proposal = lifecycle::submit_proposal(db.get_ref(), user.0.id, gig_id, input).await?;
    Ok(HttpResponse::Created().json(Data { data: proposal }))
}

/// GET /api/gigs/{gig_id}/proposals — founder reviews bids on their gig.
pub async fn list_gig_proposals(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    let gig_id = path.into_inner();
    let cursor = query.cursor()?;
    let limit = query.limit();

    let rows =
        lifecycle::list_gig_proposals(db.get_ref(), user.0.id, gig_id, limit, cursor).await?;
    Ok(HttpResponse::Ok().json(Page::from_rows(rows, limit, proposal_cursor)))
}

/// GET /api/proposals/mine — the freelancer's own bids.
pub async fn my_proposals(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    let cursor = query.cursor()?;
    let limit = query.limit();

    let rows =
        proposal_db::list_proposals_by_freelancer(db.get_ref(), user.0.id, limit, cursor).await?;
    Ok(HttpResponse::Ok().json(Page::from_rows(rows, limit, proposal_cursor)))
}

/// GET /api/proposals/{id} — visible to its freelancer and the gig founder.
pub async fn get_proposal(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let proposal = proposal_db::get_proposal_by_id(db.get_ref(), id)
        .await?
        .ok_or(ApiError::NotFound("proposal"))?;

    if proposal.freelancer_id != user.0.id {
        let gig = gig_db::get_gig_by_id(db.get_ref(), proposal.gig_id)
            .await?
            .ok_or(ApiError::NotFound("gig"))?;
        if gig.founder_id != user.0.id {
            return Err(ApiError::Forbidden(
                "you can only view proposals you are involved in",
            ));
        }
    }

    Ok(HttpResponse::Ok().json(Data { data: proposal }))
}

/// POST /api/proposals/{id}/shortlist — founder triages a pending bid.
pub async fn shortlist(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let proposal =
        lifecycle::shortlist_proposal(db.get_ref(), user.0.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(Data { data: proposal }))
}

/// POST /api/proposals/{id}/accept — the exclusive composite transition:
/// contract created, siblings rejected, gig moves to in_progress.
pub async fn accept(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let contract = lifecycle::accept_proposal(db.get_ref(), user.0.id, path.into_inner()).await?;
    Ok(HttpResponse::Created().json(Data { data: contract }))
}

/// POST /api/proposals/{id}/reject — founder declines a bid.
pub async fn reject(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let proposal = lifecycle::reject_proposal(db.get_ref(), user.0.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(Data { data: proposal }))
}

/// POST /api/proposals/{id}/withdraw — freelancer pulls an open bid.
pub async fn withdraw(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let proposal =
        lifecycle::withdraw_proposal(db.get_ref(), user.0.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(Data { data: proposal }))
}
