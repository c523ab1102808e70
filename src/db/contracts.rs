use sea_orm::*;
use uuid::Uuid;

use crate::models::contracts::{self, ContractStatus};
use crate::models::gigs;
use crate::models::proposals;
use crate::pagination::Cursor;

/// Insert the contract created by accepting a proposal (status active).
///
/// The unique indexes on `gig_id` and `proposal_id` are what make acceptance
/// exclusive: a concurrent accept on another proposal of the same gig loses
/// the race right here, and the orchestrator reports `AlreadyContracted`.
pub async fn insert_contract<C: ConnectionTrait>(
    db: &C,
    gig: &gigs::Model,
    proposal: &proposals::Model,
) -> Result<contracts::Model, DbErr> {
    let now = chrono::Utc::now();
    let new_contract = contracts::ActiveModel {
        id: Set(Uuid::new_v4()),
        gig_id: Set(gig.id),
        proposal_id: Set(proposal.id),
        founder_id: Set(gig.founder_id),
        freelancer_id: Set(proposal.freelancer_id),
        status: Set(ContractStatus::Active),
        freelancer_marked_complete: Set(false),
        founder_approved: Set(false),
        started_at: Set(now),
        completed_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };

    new_contract.insert(db).await
}

/// Fetch a single contract by ID.
pub async fn get_contract_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<contracts::Model>, DbErr> {
    contracts::Entity::find_by_id(id).one(db).await
}

/// Fetch the contract on a gig, if any.
pub async fn get_contract_by_gig<C: ConnectionTrait>(
    db: &C,
    gig_id: Uuid,
) -> Result<Option<contracts::Model>, DbErr> {
    contracts::Entity::find()
        .filter(contracts::Column::GigId.eq(gig_id))
        .one(db)
        .await
}

/// List contracts where the user is a party (either side), newest first.
pub async fn list_contracts_for_user<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    limit: u64,
    cursor: Option<Cursor>,
) -> Result<Vec<contracts::Model>, DbErr> {
    let mut find = contracts::Entity::find().filter(
        Condition::any()
            .add(contracts::Column::FounderId.eq(user_id))
            .add(contracts::Column::FreelancerId.eq(user_id)),
    );

    if let Some(cursor) = cursor {
        find = find.filter(
            Condition::any()
                .add(contracts::Column::CreatedAt.lt(cursor.created_at))
                .add(
                    Condition::all()
                        .add(contracts::Column::CreatedAt.eq(cursor.created_at))
                        .add(contracts::Column::Id.lt(cursor.id)),
                ),
        );
    }

    find.order_by_desc(contracts::Column::CreatedAt)
        .order_by_desc(contracts::Column::Id)
        .limit(limit + 1)
        .all(db)
        .await
}

/// Persist a completion confirmation. When both flags are set the contract
/// closes: status completed, `completed_at` stamped. Returns the updated row;
/// the caller checks its status to propagate closure to the gig.
pub async fn set_completion_flags<C: ConnectionTrait>(
    db: &C,
    contract: contracts::Model,
    freelancer_marked_complete: bool,
    founder_approved: bool,
) -> Result<contracts::Model, DbErr> {
    let closing = freelancer_marked_complete && founder_approved;
    let mut active: contracts::ActiveModel = contract.into();
    active.freelancer_marked_complete = Set(freelancer_marked_complete);
    active.founder_approved = Set(founder_approved);
    if closing {
        active.status = Set(ContractStatus::Completed);
        active.completed_at = Set(Some(chrono::Utc::now()));
    }
    active.updated_at = Set(chrono::Utc::now());
    active.update(db).await
}

/// Move a contract to cancelled or disputed (orchestrator only).
pub async fn set_status<C: ConnectionTrait>(
    db: &C,
    contract: contracts::Model,
    status: ContractStatus,
) -> Result<contracts::Model, DbErr> {
    let mut active: contracts::ActiveModel = contract.into();
    active.status = Set(status);
    active.updated_at = Set(chrono::Utc::now());
    active.update(db).await
}
