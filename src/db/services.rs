use sea_orm::*;
use uuid::Uuid;

use crate::models::services::{self, CreateService, ServiceListQuery, ServiceStatus, UpdateService};
use crate::pagination::Cursor;

/// Insert a new service offering (status active).
pub async fn insert_service<C: ConnectionTrait>(
    db: &C,
    input: CreateService,
    freelancer_id: Uuid,
) -> Result<services::Model, DbErr> {
    let now = chrono::Utc::now();
    let new_service = services::ActiveModel {
        id: Set(Uuid::new_v4()),
        freelancer_id: Set(freelancer_id),
        title: Set(input.title),
        description: Set(input.description),
        price: Set(input.price),
        status: Set(ServiceStatus::Active),
        created_at: Set(now),
        updated_at: Set(now),
    };

    new_service.insert(db).await
}

/// Fetch a single service by ID.
pub async fn get_service_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<services::Model>, DbErr> {
    services::Entity::find_by_id(id).one(db).await
}

/// List services, newest first, with keyset pagination. Browsing defaults to
/// active offerings.
pub async fn list_services<C: ConnectionTrait>(
    db: &C,
    query: &ServiceListQuery,
    cursor: Option<Cursor>,
) -> Result<Vec<services::Model>, DbErr> {
    let mut find = services::Entity::find()
        .filter(services::Column::Status.eq(query.status.unwrap_or(ServiceStatus::Active)));

    if let Some(freelancer_id) = query.freelancer_id {
        find = find.filter(services::Column::FreelancerId.eq(freelancer_id));
    }

    if let Some(cursor) = cursor {
        find = find.filter(
            Condition::any()
                .add(services::Column::CreatedAt.lt(cursor.created_at))
                .add(
                    Condition::all()
                        .add(services::Column::CreatedAt.eq(cursor.created_at))
                        .add(services::Column::Id.lt(cursor.id)),
                ),
        );
    }

    find.order_by_desc(services::Column::CreatedAt)
        .order_by_desc(services::Column::Id)
        .limit(query.page().limit() + 1)
        .all(db)
        .await
}

/// Apply owner edits to a service.
pub async fn update_service<C: ConnectionTrait>(
    db: &C,
    service: services::Model,
    input: UpdateService,
) -> Result<services::Model, DbErr> {
    let mut active: services::ActiveModel = service.into();

    if let Some(title) = input.title {
        active.title = Set(title);
    }
    if let Some(description) = input.description {
        active.description = Set(description);
    }
    if let Some(price) = input.price {
        active.price = Set(price);
    }
    if let Some(status) = input.status {
        active.status = Set(status);
    }
    active.updated_at = Set(chrono::Utc::now());

    active.update(db).await
}
