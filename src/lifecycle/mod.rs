//! The engagement lifecycle engine: every legal transition across
//! Gig → Proposal → Contract → Rating, plus the messaging and
//! service-request flows that hang off engagements.
//!
//! Multi-row transitions run inside a single database transaction in a fixed
//! mutation order. The unique indexes (contract gig_id/proposal_id, proposal
//! (gig_id, freelancer_id), rating (contract_id, reviewer_id)) are the
//! arbiters of correctness under concurrent requests: a violation means the
//! race was lost and is translated into the matching Conflict error, never
//! masked as a store failure. Authorization and state guards run before any
//! write; a failed guard leaves the store untouched.

use sea_orm::{DatabaseConnection, TransactionTrait};
use serde_json::json;
use uuid::Uuid;

use crate::db;
use crate::error::{on_unique_violation, ApiError};
use crate::models::contracts::{self, ContractStatus};
use crate::models::gigs::{self, GigStatus};
use crate::models::messages::{self, MessageType, SendMessage, Thread};
use crate::models::notifications::{CreateNotification, NotificationType};
use crate::models::proposals::{self, CreateProposal, ProposalStatus};
use crate::models::ratings::{self, CreateRating};
use crate::models::service_requests::{self, ServiceRequestStatus};
use crate::models::services;
use crate::pagination::Cursor;

/// Queue a notification row inside the caller's transaction.
async fn notify<C: sea_orm::ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    notification_type: NotificationType,
    reference_id: Option<Uuid>,
    payload: serde_json::Value,
) -> Result<(), ApiError> {
    db::notifications::insert_notification(
        db,
        CreateNotification {
            user_id,
            notification_type,
            reference_id,
            payload,
        },
    )
    .await?;
    Ok(())
}

// ── Proposals ──

/// Submit a proposal on an open gig. One proposal per freelancer per gig;
/// the unique index reports the duplicate, whatever the request interleaving.
pub async fn submit_proposal(
    db: &DatabaseConnection,
    freelancer_id: Uuid,
    gig_id: Uuid,
    input: CreateProposal,
) -> Result<proposals::Model, ApiError> {
    let gig = db::gigs::get_gig_by_id(db, gig_id)
        .await?
        .ok_or(ApiError::NotFound("gig"))?;

    if gig.founder_id == freelancer_id {
        return Err(ApiError::Forbidden(
            "you cannot submit a proposal on your own gig",
        ));
    }
    if gig.status != GigStatus::Open {
        return Err(ApiError::GigNotOpen);
    }

    let txn = db.begin().await?;

    let proposal = db::proposals::insert_proposal(&txn, input, gig.id, freelancer_id)
        .await
        .map_err(|e| on_unique_violation(e, ApiError::DuplicateProposal))?;
    db::gigs::bump_proposals_count(&txn, gig.id, 1).await?;
    notify(
        &txn,
        gig.founder_id,
        NotificationType::ProposalReceived,
        Some(proposal.id),
        json!({
            "gig_id": gig.id,
            "gig_title": gig.title,
            "freelancer_id": freelancer_id,
            "proposed_amount": proposal.proposed_amount,
        }),
    )
    .await?;

    txn.commit().await?;
    Ok(proposal)
}

/// Withdraw an open proposal (freelancer side).
pub async fn withdraw_proposal(
    db: &DatabaseConnection,
    freelancer_id: Uuid,
    proposal_id: Uuid,
) -> Result<proposals::Model, ApiError> {
    let proposal = db::proposals::get_proposal_by_id(db, proposal_id)
        .await?
        .ok_or(ApiError::NotFound("proposal"))?;

    if proposal.freelancer_id != freelancer_id {
        return Err(ApiError::Forbidden(
            "you can only withdraw your own proposals",
        ));
    }
    if !proposal.status.is_open() {
        return Err(ApiError::ProposalNotPending);
    }

    let txn = db.begin().await?;
    let gig_id = proposal.gig_id;
    let updated = db::proposals::set_status(&txn, proposal, ProposalStatus::Withdrawn).await?;
    db::gigs::bump_proposals_count(&txn, gig_id, -1).await?;
    txn.commit().await?;

    Ok(updated)
}

/// Load a proposal together with its gig and check the caller owns the gig.
async fn proposal_for_decision(
    db: &DatabaseConnection,
    founder_id: Uuid,
    proposal_id: Uuid,
) -> Result<(proposals::Model, gigs::Model), ApiError> {
    let proposal = db::proposals::get_proposal_by_id(db, proposal_id)
        .await?
        .ok_or(ApiError::NotFound("proposal"))?;
    let gig = db::gigs::get_gig_by_id(db, proposal.gig_id)
        .await?
        .ok_or(ApiError::NotFound("gig"))?;

    if gig.founder_id != founder_id {
        return Err(ApiError::Forbidden(
            "only the gig founder can decide on its proposals",
        ));
    }

    Ok((proposal, gig))
}

/// Shortlist a pending proposal (founder triage).
pub async fn shortlist_proposal(
    db: &DatabaseConnection,
    founder_id: Uuid,
    proposal_id: Uuid,
) -> Result<proposals::Model, ApiError> {
    let (proposal, _gig) = proposal_for_decision(db, founder_id, proposal_id).await?;

    if proposal.status != ProposalStatus::Pending {
        return Err(ApiError::ProposalNotPending);
    }

    Ok(db::proposals::set_status(db, proposal, ProposalStatus::Shortlisted).await?)
}

/// Accept a proposal: the exclusive composite transition.
///
/// In one transaction, in fixed order: insert the contract (the unique
/// `gig_id` index arbitrates the accept/accept race — the loser sees
/// `AlreadyContracted`), flip the proposal to accepted, reject its open
/// siblings, move the gig to in_progress, fan out notifications. Either all
/// of it commits or none of it does.
pub async fn accept_proposal(
    db: &DatabaseConnection,
    founder_id: Uuid,
    proposal_id: Uuid,
) -> Result<contracts::Model, ApiError> {
    let (proposal, gig) = proposal_for_decision(db, founder_id, proposal_id).await?;

    if !proposal.status.is_open() {
        return Err(ApiError::ProposalNotPending);
    }
    match gig.status {
        GigStatus::Open => {}
        GigStatus::InProgress | GigStatus::Completed => return Err(ApiError::AlreadyContracted),
        GigStatus::Draft | GigStatus::Cancelled => return Err(ApiError::GigNotOpen),
    }

    let txn = db.begin().await?;

    let rejected_freelancers =
        db::proposals::open_sibling_freelancers(&txn, gig.id, proposal.id).await?;

    let contract = db::contracts::insert_contract(&txn, &gig, &proposal)
        .await
        .map_err(|e| on_unique_violation(e, ApiError::AlreadyContracted))?;

    let accepted_freelancer = proposal.freelancer_id;
    db::proposals::set_status(&txn, proposal, ProposalStatus::Accepted).await?;
    db::proposals::reject_open_siblings(&txn, gig.id, proposal_id).await?;
    db::gigs::set_status(&txn, gig.id, GigStatus::InProgress).await?;

    notify(
        &txn,
        accepted_freelancer,
        NotificationType::ProposalAccepted,
        Some(contract.id),
        json!({ "gig_id": gig.id, "gig_title": gig.title, "contract_id": contract.id }),
    )
    .await?;
    for freelancer in rejected_freelancers {
        notify(
            &txn,
            freelancer,
            NotificationType::ProposalRejected,
            Some(gig.id),
            json!({ "gig_id": gig.id, "gig_title": gig.title }),
        )
        .await?;
    }

    txn.commit().await?;
    tracing::info!(gig_id = %gig.id, contract_id = %contract.id, "proposal accepted, contract opened");
    Ok(contract)
}

/// Reject an open proposal (founder side).
pub async fn reject_proposal(
    db: &DatabaseConnection,
    founder_id: Uuid,
    proposal_id: Uuid,
) -> Result<proposals::Model, ApiError> {
    let (proposal, gig) = proposal_for_decision(db, founder_id, proposal_id).await?;

    if !proposal.status.is_open() {
        return Err(ApiError::ProposalNotPending);
    }

    let txn = db.begin().await?;
    let freelancer_id = proposal.freelancer_id;
    let updated = db::proposals::set_status(&txn, proposal, ProposalStatus::Rejected).await?;
    notify(
        &txn,
        freelancer_id,
        NotificationType::ProposalRejected,
        Some(updated.id),
        json!({ "gig_id": gig.id, "gig_title": gig.title }),
    )
    .await?;
    txn.commit().await?;

    Ok(updated)
}

// ── Contracts ──

async fn active_contract_for_party(
    db: &DatabaseConnection,
    user_id: Uuid,
    contract_id: Uuid,
) -> Result<contracts::Model, ApiError> {
    let contract = db::contracts::get_contract_by_id(db, contract_id)
        .await?
        .ok_or(ApiError::NotFound("contract"))?;

    if !contract.is_party(user_id) {
        return Err(ApiError::Forbidden("you are not a party to this contract"));
    }
    if contract.status != ContractStatus::Active {
        return Err(ApiError::ContractNotActive);
    }

    Ok(contract)
}

/// Close out a contract whose second completion flag just flipped: the gig
/// completes and both parties are told. Runs inside the caller's transaction.
async fn finish_close<C: sea_orm::ConnectionTrait>(
    txn: &C,
    contract: &contracts::Model,
) -> Result<(), ApiError> {
    db::gigs::set_status(txn, contract.gig_id, GigStatus::Completed).await?;
    for user in [contract.founder_id, contract.freelancer_id] {
        notify(
            txn,
            user,
            NotificationType::ContractCompleted,
            Some(contract.id),
            json!({ "contract_id": contract.id, "gig_id": contract.gig_id }),
        )
        .await?;
    }
    Ok(())
}

/// Freelancer marks the work complete. Closes the contract only if the
/// founder has already approved; otherwise the contract stays active with
/// the flag set.
pub async fn mark_complete(
    db: &DatabaseConnection,
    freelancer_id: Uuid,
    contract_id: Uuid,
) -> Result<contracts::Model, ApiError> {
    let contract = active_contract_for_party(db, freelancer_id, contract_id).await?;
    if contract.freelancer_id != freelancer_id {
        return Err(ApiError::Forbidden(
            "only the freelancer can mark the work complete",
        ));
    }

    let founder_approved = contract.founder_approved;
    let txn = db.begin().await?;
    let updated = db::contracts::set_completion_flags(&txn, contract, true, founder_approved).await?;
    if updated.status == ContractStatus::Completed {
        finish_close(&txn, &updated).await?;
        tracing::info!(contract_id = %updated.id, "contract completed by mutual confirmation");
    }
    txn.commit().await?;

    Ok(updated)
}

/// Founder approves completion. Closes the contract only if the freelancer
/// has already marked it complete.
pub async fn approve_completion(
    db: &DatabaseConnection,
    founder_id: Uuid,
    contract_id: Uuid,
) -> Result<contracts::Model, ApiError> {
    let contract = active_contract_for_party(db, founder_id, contract_id).await?;
    if contract.founder_id != founder_id {
        return Err(ApiError::Forbidden(
            "only the founder can approve completion",
        ));
    }

    let freelancer_marked = contract.freelancer_marked_complete;
    let txn = db.begin().await?;
    let updated =
        db::contracts::set_completion_flags(&txn, contract, freelancer_marked, true).await?;
    if updated.status == ContractStatus::Completed {
        finish_close(&txn, &updated).await?;
        tracing::info!(contract_id = %updated.id, "contract completed by mutual confirmation");
    }
    txn.commit().await?;

    Ok(updated)
}

/// Cancel an active contract (either party). The gig is cancelled with it.
pub async fn cancel_contract(
    db: &DatabaseConnection,
    user_id: Uuid,
    contract_id: Uuid,
) -> Result<contracts::Model, ApiError> {
    let contract = active_contract_for_party(db, user_id, contract_id).await?;
    let counterparty = contract.counterparty(user_id);

    let txn = db.begin().await?;
    let updated = db::contracts::set_status(&txn, contract, ContractStatus::Cancelled).await?;
    db::gigs::set_status(&txn, updated.gig_id, GigStatus::Cancelled).await?;
    notify(
        &txn,
        counterparty,
        NotificationType::ContractCancelled,
        Some(updated.id),
        json!({ "contract_id": updated.id, "cancelled_by": user_id }),
    )
    .await?;
    txn.commit().await?;

    tracing::info!(contract_id = %updated.id, "contract cancelled");
    Ok(updated)
}

/// Raise a dispute on an active contract (either party). The gig keeps its
/// in_progress status; resolution is outside this engine.
pub async fn dispute_contract(
    db: &DatabaseConnection,
    user_id: Uuid,
    contract_id: Uuid,
) -> Result<contracts::Model, ApiError> {
    let contract = active_contract_for_party(db, user_id, contract_id).await?;
    let counterparty = contract.counterparty(user_id);

    let txn = db.begin().await?;
    let updated = db::contracts::set_status(&txn, contract, ContractStatus::Disputed).await?;
    notify(
        &txn,
        counterparty,
        NotificationType::ContractDisputed,
        Some(updated.id),
        json!({ "contract_id": updated.id, "raised_by": user_id }),
    )
    .await?;
    txn.commit().await?;

    tracing::info!(contract_id = %updated.id, "contract disputed");
    Ok(updated)
}

// ── Ratings ──

/// Rate the counterparty on a completed contract. One rating per reviewer
/// per contract; the unique index reports the duplicate.
pub async fn submit_rating(
    db: &DatabaseConnection,
    reviewer_id: Uuid,
    contract_id: Uuid,
    input: CreateRating,
) -> Result<ratings::Model, ApiError> {
    let contract = db::contracts::get_contract_by_id(db, contract_id)
        .await?
        .ok_or(ApiError::NotFound("contract"))?;

    if !contract.is_party(reviewer_id) {
        return Err(ApiError::Forbidden("you are not a party to this contract"));
    }
    if contract.status != ContractStatus::Completed {
        return Err(ApiError::ContractNotCompleted);
    }

    let reviewee_id = contract.counterparty(reviewer_id);

    let txn = db.begin().await?;
    let rating = db::ratings::insert_rating(&txn, input, contract.id, reviewer_id, reviewee_id)
        .await
        .map_err(|e| on_unique_violation(e, ApiError::DuplicateRating))?;
    notify(
        &txn,
        reviewee_id,
        NotificationType::RatingReceived,
        Some(rating.id),
        json!({ "contract_id": contract.id, "score": rating.score }),
    )
    .await?;
    txn.commit().await?;

    Ok(rating)
}

// ── Messages ──

/// Resolve a thread reference to its parties, checking the sender may post.
/// Contract threads allow messaging while active, completed or disputed;
/// service-request threads only once accepted.
pub async fn resolve_thread(
    db: &DatabaseConnection,
    user_id: Uuid,
    thread: Thread,
) -> Result<(Uuid, Uuid), ApiError> {
    match thread {
        Thread::Contract(contract_id) => {
            let contract = db::contracts::get_contract_by_id(db, contract_id)
                .await?
                .ok_or(ApiError::NotFound("contract"))?;
            if !contract.is_party(user_id) {
                return Err(ApiError::Forbidden("you are not a party to this contract"));
            }
            if contract.status == ContractStatus::Cancelled {
                return Err(ApiError::ContractNotActive);
            }
            Ok((user_id, contract.counterparty(user_id)))
        }
        Thread::ServiceRequest(request_id) => {
            let request = db::service_requests::get_request_by_id(db, request_id)
                .await?
                .ok_or(ApiError::NotFound("service request"))?;
            if !request.is_party(user_id) {
                return Err(ApiError::Forbidden(
                    "you are not a party to this service request",
                ));
            }
            if request.status != ServiceRequestStatus::Accepted {
                return Err(ApiError::RequestNotPending);
            }
            Ok((user_id, request.counterparty(user_id)))
        }
    }
}

/// Post a message into a thread and notify the recipient.
pub async fn send_message(
    db: &DatabaseConnection,
    sender_id: Uuid,
    thread: Thread,
    input: SendMessage,
) -> Result<messages::Model, ApiError> {
    let (sender_id, recipient_id) = resolve_thread(db, sender_id, thread).await?;

    let txn = db.begin().await?;
    let message = db::messages::insert_message(
        &txn,
        thread,
        sender_id,
        recipient_id,
        input.message_type,
        input.body,
        input.file_url,
    )
    .await?;
    notify(
        &txn,
        recipient_id,
        NotificationType::MessageReceived,
        Some(message.id),
        json!({
            "contract_id": message.contract_id,
            "service_request_id": message.service_request_id,
            "sender_id": sender_id,
        }),
    )
    .await?;
    txn.commit().await?;

    Ok(message)
}

// ── Service requests ──

/// Founder sends an inquiry against an active service.
pub async fn request_service(
    db: &DatabaseConnection,
    founder_id: Uuid,
    service_id: Uuid,
    note: Option<String>,
) -> Result<service_requests::Model, ApiError> {
    let service = db::services::get_service_by_id(db, service_id)
        .await?
        .ok_or(ApiError::NotFound("service"))?;

    if service.freelancer_id == founder_id {
        return Err(ApiError::Forbidden(
            "you cannot send a request on your own service",
        ));
    }
    if service.status != services::ServiceStatus::Active {
        return Err(ApiError::ServiceNotActive);
    }

    let txn = db.begin().await?;
    let request = db::service_requests::insert_request(&txn, &service, founder_id, note).await?;
    notify(
        &txn,
        service.freelancer_id,
        NotificationType::ServiceRequestReceived,
        Some(request.id),
        json!({ "service_id": service.id, "service_title": service.title, "founder_id": founder_id }),
    )
    .await?;
    txn.commit().await?;

    Ok(request)
}

async fn pending_request_for_freelancer(
    db: &DatabaseConnection,
    freelancer_id: Uuid,
    request_id: Uuid,
) -> Result<service_requests::Model, ApiError> {
    let request = db::service_requests::get_request_by_id(db, request_id)
        .await?
        .ok_or(ApiError::NotFound("service request"))?;

    if request.freelancer_id != freelancer_id {
        return Err(ApiError::Forbidden(
            "only the service owner can decide on its requests",
        ));
    }
    if request.status != ServiceRequestStatus::Pending {
        return Err(ApiError::RequestNotPending);
    }

    Ok(request)
}

/// Accept a pending service request, opening its message thread with an
/// engine-emitted system message.
pub async fn accept_service_request(
    db: &DatabaseConnection,
    freelancer_id: Uuid,
    request_id: Uuid,
) -> Result<service_requests::Model, ApiError> {
    let request = pending_request_for_freelancer(db, freelancer_id, request_id).await?;

    let txn = db.begin().await?;
    let founder_id = request.founder_id;
    let updated =
        db::service_requests::set_status(&txn, request, ServiceRequestStatus::Accepted).await?;
    db::messages::insert_message(
        &txn,
        Thread::ServiceRequest(updated.id),
        freelancer_id,
        founder_id,
        MessageType::System,
        Some("Request accepted — you can now exchange messages.".to_string()),
        None,
    )
    .await?;
    notify(
        &txn,
        founder_id,
        NotificationType::ServiceRequestAccepted,
        Some(updated.id),
        json!({ "service_id": updated.service_id, "request_id": updated.id }),
    )
    .await?;
    txn.commit().await?;

    Ok(updated)
}

/// Decline a pending service request.
pub async fn decline_service_request(
    db: &DatabaseConnection,
    freelancer_id: Uuid,
    request_id: Uuid,
) -> Result<service_requests::Model, ApiError> {
    let request = pending_request_for_freelancer(db, freelancer_id, request_id).await?;

    let txn = db.begin().await?;
    let founder_id = request.founder_id;
    let updated =
        db::service_requests::set_status(&txn, request, ServiceRequestStatus::Declined).await?;
    notify(
        &txn,
        founder_id,
        NotificationType::ServiceRequestDeclined,
        Some(updated.id),
        json!({ "service_id": updated.service_id, "request_id": updated.id }),
    )
    .await?;
    txn.commit().await?;

    Ok(updated)
}

// ── Gigs ──

/// Cancel a draft or open gig (founder side). A gig with a running contract
/// is only cancelled through its contract.
pub async fn cancel_gig(
    db: &DatabaseConnection,
    founder_id: Uuid,
    gig_id: Uuid,
) -> Result<gigs::Model, ApiError> {
    let gig = db::gigs::get_gig_by_id(db, gig_id)
        .await?
        .ok_or(ApiError::NotFound("gig"))?;

    if gig.founder_id != founder_id {
        return Err(ApiError::Forbidden("only the gig founder can cancel it"));
    }
    if !gig.is_editable() {
        return Err(ApiError::GigNotOpen);
    }

    db::gigs::set_status(db, gig.id, GigStatus::Cancelled).await?;
    db::gigs::get_gig_by_id(db, gig_id)
        .await?
        .ok_or(ApiError::NotFound("gig"))
}

/// Recompute a gig's denormalized proposal counter (founder-triggered drift
/// repair). The counter is maintained transactionally but never trusted as
/// authoritative.
pub async fn recount_gig_proposals(
    db: &DatabaseConnection,
    founder_id: Uuid,
    gig_id: Uuid,
) -> Result<i32, ApiError> {
    let gig = db::gigs::get_gig_by_id(db, gig_id)
        .await?
        .ok_or(ApiError::NotFound("gig"))?;
    if gig.founder_id != founder_id {
        return Err(ApiError::Forbidden(
            "only the gig founder can recount its proposals",
        ));
    }
    Ok(db::gigs::recount_proposals(db, gig_id).await?)
}

// ── Listing passthroughs used by the HTTP surface ──

/// Proposals on a gig are founder-only reading material.
pub async fn list_gig_proposals(
    db: &DatabaseConnection,
    founder_id: Uuid,
    gig_id: Uuid,
    limit: u64,
    cursor: Option<Cursor>,
) -> Result<Vec<proposals::Model>, ApiError> {
    let gig = db::gigs::get_gig_by_id(db, gig_id)
        .await?
        .ok_or(ApiError::NotFound("gig"))?;
    if gig.founder_id != founder_id {
        return Err(ApiError::Forbidden(
            "only the gig founder can view its proposals",
        ));
    }
    Ok(db::proposals::list_proposals_by_gig(db, gig_id, limit, cursor).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::gigs::{BudgetType, ExperienceLevel};
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn gig(founder_id: Uuid, status: GigStatus) -> gigs::Model {
        let now = Utc::now();
        gigs::Model {
            id: Uuid::new_v4(),
            founder_id,
            title: "Build an onboarding flow".to_string(),
            description: "Four screens plus e-mail verification.".to_string(),
            budget_type: BudgetType::Fixed,
            budget_min: 300.0,
            budget_max: 600.0,
            experience_level: ExperienceLevel::Intermediate,
            startup_stage: None,
            status,
            proposals_count: 1,
            is_remote: true,
            location_text: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn proposal(gig_id: Uuid, freelancer_id: Uuid, status: ProposalStatus) -> proposals::Model {
        let now = Utc::now();
        proposals::Model {
            id: Uuid::new_v4(),
            gig_id,
            freelancer_id,
            cover_letter: "I have shipped three of these.".to_string(),
            proposed_amount: 450.0,
            estimated_days: Some(10),
            status,
            created_at: now,
            updated_at: now,
        }
    }

    fn contract(
        founder_id: Uuid,
        freelancer_id: Uuid,
        status: ContractStatus,
    ) -> contracts::Model {
        let now = Utc::now();
        contracts::Model {
            id: Uuid::new_v4(),
            gig_id: Uuid::new_v4(),
            proposal_id: Uuid::new_v4(),
            founder_id,
            freelancer_id,
            status,
            freelancer_marked_complete: false,
            founder_approved: false,
            started_at: now,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn accept_by_non_founder_is_rejected_before_any_write() {
        let founder = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let g = gig(founder, GigStatus::Open);
        let p = proposal(g.id, Uuid::new_v4(), ProposalStatus::Pending);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![p]])
            .append_query_results([vec![g]])
            .into_connection();

        let result = accept_proposal(&db, stranger, Uuid::new_v4()).await;
        assert!(matches!(result, Err(ApiError::Forbidden(_))));
    }

    #[tokio::test]
    async fn accept_of_terminal_proposal_fails() {
        let founder = Uuid::new_v4();
        let g = gig(founder, GigStatus::Open);
        let p = proposal(g.id, Uuid::new_v4(), ProposalStatus::Rejected);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![p]])
            .append_query_results([vec![g]])
            .into_connection();

        let result = accept_proposal(&db, founder, Uuid::new_v4()).await;
        assert!(matches!(result, Err(ApiError::ProposalNotPending)));
    }

    #[tokio::test]
    async fn accept_on_contracted_gig_reports_already_contracted() {
        let founder = Uuid::new_v4();
        let g = gig(founder, GigStatus::InProgress);
        let p = proposal(g.id, Uuid::new_v4(), ProposalStatus::Pending);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![p]])
            .append_query_results([vec![g]])
            .into_connection();

        let result = accept_proposal(&db, founder, Uuid::new_v4()).await;
        assert!(matches!(result, Err(ApiError::AlreadyContracted)));
    }

    #[tokio::test]
    async fn submitting_on_own_gig_is_forbidden() {
        let founder = Uuid::new_v4();
        let g = gig(founder, GigStatus::Open);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![g]])
            .into_connection();

        let input = CreateProposal {
            cover_letter: "Me!".to_string(),
            proposed_amount: 100.0,
            estimated_days: None,
        };
        let result = submit_proposal(&db, founder, Uuid::new_v4(), input).await;
        assert!(matches!(result, Err(ApiError::Forbidden(_))));
    }

    #[tokio::test]
    async fn submitting_on_a_closed_gig_fails() {
        let g = gig(Uuid::new_v4(), GigStatus::Cancelled);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![g]])
            .into_connection();

        let input = CreateProposal {
            cover_letter: "Me!".to_string(),
            proposed_amount: 100.0,
            estimated_days: None,
        };
        let result = submit_proposal(&db, Uuid::new_v4(), Uuid::new_v4(), input).await;
        assert!(matches!(result, Err(ApiError::GigNotOpen)));
    }

    #[tokio::test]
    async fn marking_complete_on_inactive_contract_fails() {
        let freelancer = Uuid::new_v4();
        let c = contract(Uuid::new_v4(), freelancer, ContractStatus::Completed);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![c]])
            .into_connection();

        let result = mark_complete(&db, freelancer, Uuid::new_v4()).await;
        assert!(matches!(result, Err(ApiError::ContractNotActive)));
    }

    #[tokio::test]
    async fn founder_cannot_mark_complete_for_the_freelancer() {
        let founder = Uuid::new_v4();
        let c = contract(founder, Uuid::new_v4(), ContractStatus::Active);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![c]])
            .into_connection();

        let result = mark_complete(&db, founder, Uuid::new_v4()).await;
        assert!(matches!(result, Err(ApiError::Forbidden(_))));
    }

    #[tokio::test]
    async fn marking_complete_alone_leaves_the_contract_active() {
        let freelancer = Uuid::new_v4();
        let before = contract(Uuid::new_v4(), freelancer, ContractStatus::Active);
        let mut after = before.clone();
        after.freelancer_marked_complete = true;

        // Postgres updates return the row, so both the guard read and the
        // flag update are query results.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![before.clone()]])
            .append_query_results([vec![after]])
            .into_connection();

        let updated = mark_complete(&db, freelancer, before.id).await.unwrap();
        assert!(updated.freelancer_marked_complete);
        assert!(!updated.founder_approved);
        assert_eq!(updated.status, ContractStatus::Active);
        assert!(updated.completed_at.is_none());
    }

    #[tokio::test]
    async fn approval_after_freelancer_mark_closes_the_contract() {
        let founder = Uuid::new_v4();
        let mut before = contract(founder, Uuid::new_v4(), ContractStatus::Active);
        before.freelancer_marked_complete = true;
        let mut after = before.clone();
        after.founder_approved = true;
        after.status = ContractStatus::Completed;
        after.completed_at = Some(Utc::now());

        let notification = |user_id: Uuid| crate::models::notifications::Model {
            id: Uuid::new_v4(),
            user_id,
            notification_type: NotificationType::ContractCompleted,
            reference_id: Some(before.id),
            payload: serde_json::json!({ "contract_id": before.id }),
            read_at: None,
            created_at: Utc::now(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![before.clone()]])
            .append_query_results([vec![after]])
            .append_query_results([vec![notification(founder)]])
            .append_query_results([vec![notification(before.freelancer_id)]])
            .append_exec_results([sea_orm::MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let updated = approve_completion(&db, founder, before.id).await.unwrap();
        assert_eq!(updated.status, ContractStatus::Completed);
        assert!(updated.completed_at.is_some());
    }

    #[tokio::test]
    async fn rating_an_active_contract_fails() {
        let founder = Uuid::new_v4();
        let c = contract(founder, Uuid::new_v4(), ContractStatus::Active);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![c]])
            .into_connection();

        let input = CreateRating {
            score: 5,
            review_text: None,
        };
        let result = submit_rating(&db, founder, Uuid::new_v4(), input).await;
        assert!(matches!(result, Err(ApiError::ContractNotCompleted)));
    }

    #[tokio::test]
    async fn rating_by_a_non_party_is_forbidden() {
        let c = contract(Uuid::new_v4(), Uuid::new_v4(), ContractStatus::Completed);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![c]])
            .into_connection();

        let input = CreateRating {
            score: 5,
            review_text: None,
        };
        let result = submit_rating(&db, Uuid::new_v4(), Uuid::new_v4(), input).await;
        assert!(matches!(result, Err(ApiError::Forbidden(_))));
    }

    #[tokio::test]
    async fn messaging_a_cancelled_contract_thread_fails() {
        let founder = Uuid::new_v4();
        let c = contract(founder, Uuid::new_v4(), ContractStatus::Cancelled);
        let contract_id = c.id;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![c]])
            .into_connection();

        let result = resolve_thread(&db, founder, Thread::Contract(contract_id)).await;
        assert!(matches!(result, Err(ApiError::ContractNotActive)));
    }
}
