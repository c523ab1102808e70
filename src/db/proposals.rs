use sea_orm::prelude::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::models::proposals::{self, CreateProposal, ProposalStatus};
use crate::pagination::Cursor;

/// Insert a new proposal (status pending). The unique (gig_id, freelancer_id)
/// index makes a duplicate submission fail here; the orchestrator translates
/// that violation into `DuplicateProposal`.
pub async fn insert_proposal<C: ConnectionTrait>(
    db: &C,
    input: CreateProposal,
    gig_id: Uuid,
    freelancer_id: Uuid,
) -> Result<proposals::Model, DbErr> {
    let now = chrono::Utc::now();
    let new_proposal = proposals::ActiveModel {
        id: Set(Uuid::new_v4()),
        gig_id: Set(gig_id),
        freelancer_id: Set(freelancer_id),
        cover_letter: Set(input.cover_letter),
        proposed_amount: Set(input.proposed_amount),
        estimated_days: Set(input.estimated_days),
        status: Set(ProposalStatus::Pending),
        created_at: Set(now),
        updated_at: Set(now),
    };

    new_proposal.insert(db).await
}

/// Fetch a single proposal by ID.
pub async fn get_proposal_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<proposals::Model>, DbErr> {
    proposals::Entity::find_by_id(id).one(db).await
}

/// List proposals on a gig, newest first, with keyset pagination.
pub async fn list_proposals_by_gig<C: ConnectionTrait>(
    db: &C,
    gig_id: Uuid,
    limit: u64,
    cursor: Option<Cursor>,
) -> Result<Vec<proposals::Model>, DbErr> {
    let mut find = proposals::Entity::find().filter(proposals::Column::GigId.eq(gig_id));

    if let Some(cursor) = cursor {
        find = find.filter(
            Condition::any()
                .add(proposals::Column::CreatedAt.lt(cursor.created_at))
                .add(
                    Condition::all()
                        .add(proposals::Column::CreatedAt.eq(cursor.created_at))
                        .add(proposals::Column::Id.lt(cursor.id)),
                ),
        );
    }

    find.order_by_desc(proposals::Column::CreatedAt)
        .order_by_desc(proposals::Column::Id)
        .limit(limit + 1)
        .all(db)
        .await
}

/// List a freelancer's own proposals, newest first, with keyset pagination.
pub async fn list_proposals_by_freelancer<C: ConnectionTrait>(
    db: &C,
    freelancer_id: Uuid,
    limit: u64,
    cursor: Option<Cursor>,
) -> Result<Vec<proposals::Model>, DbErr> {
    let mut find =
        proposals::Entity::find().filter(proposals::Column::FreelancerId.eq(freelancer_id));

    if let Some(cursor) = cursor {
        find = find.filter(
            Condition::any()
                .add(proposals::Column::CreatedAt.lt(cursor.created_at))
                .add(
                    Condition::all()
                        .add(proposals::Column::CreatedAt.eq(cursor.created_at))
                        .add(proposals::Column::Id.lt(cursor.id)),
                ),
        );
    }

    find.order_by_desc(proposals::Column::CreatedAt)
        .order_by_desc(proposals::Column::Id)
        .limit(limit + 1)
        .all(db)
        .await
}

/// Move a proposal to a new status (orchestrator only).
pub async fn set_status<C: ConnectionTrait>(
    db: &C,
    proposal: proposals::Model,
    status: ProposalStatus,
) -> Result<proposals::Model, DbErr> {
    let mut active: proposals::ActiveModel = proposal.into();
    active.status = Set(status);
    active.updated_at = Set(chrono::Utc::now());
    active.update(db).await
}

/// Reject every still-open sibling proposal on a gig when one is accepted.
/// Terminal proposals (withdrawn, already rejected) are left untouched.
pub async fn reject_open_siblings<C: ConnectionTrait>(
    db: &C,
    gig_id: Uuid,
    accepted_id: Uuid,
) -> Result<u64, DbErr> {
    let result = proposals::Entity::update_many()
        .col_expr(
            proposals::Column::Status,
            Expr::value(ProposalStatus::Rejected),
        )
        .col_expr(proposals::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(proposals::Column::GigId.eq(gig_id))
        .filter(proposals::Column::Id.ne(accepted_id))
        .filter(proposals::Column::Status.is_in([
            ProposalStatus::Pending,
            ProposalStatus::Shortlisted,
        ]))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Ids of the freelancers whose open proposals would be rejected by an
/// accept, gathered before the sibling rejection for notification fan-out.
pub async fn open_sibling_freelancers<C: ConnectionTrait>(
    db: &C,
    gig_id: Uuid,
    accepted_id: Uuid,
) -> Result<Vec<Uuid>, DbErr> {
    proposals::Entity::find()
        .filter(proposals::Column::GigId.eq(gig_id))
        .filter(proposals::Column::Id.ne(accepted_id))
        .filter(proposals::Column::Status.is_in([
            ProposalStatus::Pending,
            ProposalStatus::Shortlisted,
        ]))
        .select_only()
        .column(proposals::Column::FreelancerId)
        .into_tuple()
        .all(db)
        .await
}
