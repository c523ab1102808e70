use sea_orm::*;
use uuid::Uuid;

use crate::models::service_requests::{self, ServiceRequestStatus};
use crate::models::services;
use crate::pagination::Cursor;

/// Insert a founder's request against a service (status pending).
pub async fn insert_request<C: ConnectionTrait>(
    db: &C,
    service: &services::Model,
    founder_id: Uuid,
    note: Option<String>,
) -> Result<service_requests::Model, DbErr> {
    let now = chrono::Utc::now();
    let new_request = service_requests::ActiveModel {
        id: Set(Uuid::new_v4()),
        service_id: Set(service.id),
        founder_id: Set(founder_id),
        freelancer_id: Set(service.freelancer_id),
        note: Set(note),
        status: Set(ServiceRequestStatus::Pending),
        created_at: Set(now),
        updated_at: Set(now),
    };

    new_request.insert(db).await
}

/// Fetch a single service request by ID.
pub async fn get_request_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<service_requests::Model>, DbErr> {
    service_requests::Entity::find_by_id(id).one(db).await
}

/// List service requests where the user is a party (founder or freelancer),
/// newest first, with keyset pagination.
pub async fn list_requests_for_user<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    limit: u64,
    cursor: Option<Cursor>,
) -> Result<Vec<service_requests::Model>, DbErr> {
    let mut find = service_requests::Entity::find().filter(
        Condition::any()
            .add(service_requests::Column::FounderId.eq(user_id))
            .add(service_requests::Column::FreelancerId.eq(user_id)),
    );

    if let Some(cursor) = cursor {
        find = find.filter(
            Condition::any()
                .add(service_requests::Column::CreatedAt.lt(cursor.created_at))
                .add(
                    Condition::all()
                        .add(service_requests::Column::CreatedAt.eq(cursor.created_at))
                        .add(service_requests::Column::Id.lt(cursor.id)),
                ),
        );
    }

    find.order_by_desc(service_requests::Column::CreatedAt)
        .order_by_desc(service_requests::Column::Id)
        .limit(limit + 1)
        .all(db)
        .await
}

/// Move a request to a new status (orchestrator only).
pub async fn set_status<C: ConnectionTrait>(
    db: &C,
    request: service_requests::Model,
    status: ServiceRequestStatus,
) -> Result<service_requests::Model, DbErr> {
    let mut active: service_requests::ActiveModel = request.into();
    active.status = Set(status);
    active.updated_at = Set(chrono::Utc::now());
    active.update(db).await
}
