use sea_orm::prelude::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::models::notifications::{self, CreateNotification};
use crate::pagination::Cursor;

/// Insert a notification row. Called by the lifecycle engine inside the same
/// transaction as the transition that caused it; delivery is the sink's job.
pub async fn insert_notification<C: ConnectionTrait>(
    db: &C,
    input: CreateNotification,
) -> Result<notifications::Model, DbErr> {
    let new_notification = notifications::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(input.user_id),
        notification_type: Set(input.notification_type),
        reference_id: Set(input.reference_id),
        payload: Set(input.payload),
        read_at: Set(None),
        created_at: Set(chrono::Utc::now()),
    };

    new_notification.insert(db).await
}

/// List a user's notifications, newest first, with keyset pagination.
pub async fn list_for_user<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    unread_only: bool,
    limit: u64,
    cursor: Option<Cursor>,
) -> Result<Vec<notifications::Model>, DbErr> {
    let mut find =
        notifications::Entity::find().filter(notifications::Column::UserId.eq(user_id));

    if unread_only {
        find = find.filter(notifications::Column::ReadAt.is_null());
    }

    if let Some(cursor) = cursor {
        find = find.filter(
            Condition::any()
                .add(notifications::Column::CreatedAt.lt(cursor.created_at))
                .add(
                    Condition::all()
                        .add(notifications::Column::CreatedAt.eq(cursor.created_at))
                        .add(notifications::Column::Id.lt(cursor.id)),
                ),
        );
    }

    find.order_by_desc(notifications::Column::CreatedAt)
        .order_by_desc(notifications::Column::Id)
        .limit(limit + 1)
        .all(db)
        .await
}

/// Count a user's unread notifications.
pub async fn unread_count<C: ConnectionTrait>(db: &C, user_id: Uuid) -> Result<u64, DbErr> {
    notifications::Entity::find()
        .filter(notifications::Column::UserId.eq(user_id))
        .filter(notifications::Column::ReadAt.is_null())
        .count(db)
        .await
}

/// Fetch one notification by ID.
pub async fn get_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<notifications::Model>, DbErr> {
    notifications::Entity::find_by_id(id).one(db).await
}

/// Stamp one notification as read (idempotent).
pub async fn mark_read<C: ConnectionTrait>(
    db: &C,
    notification: notifications::Model,
) -> Result<notifications::Model, DbErr> {
    if notification.read_at.is_some() {
        return Ok(notification);
    }
    let mut active: notifications::ActiveModel = notification.into();
    active.read_at = Set(Some(chrono::Utc::now()));
    active.update(db).await
}

/// Mark all of a user's unread notifications as read.
pub async fn mark_all_read<C: ConnectionTrait>(db: &C, user_id: Uuid) -> Result<u64, DbErr> {
    let result = notifications::Entity::update_many()
        .col_expr(
            notifications::Column::ReadAt,
            Expr::value(chrono::Utc::now()),
        )
        .filter(notifications::Column::UserId.eq(user_id))
        .filter(notifications::Column::ReadAt.is_null())
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}
