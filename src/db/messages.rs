use sea_orm::prelude::Expr;
use sea_orm::sea_query::SimpleExpr;
use sea_orm::*;
use uuid::Uuid;

use crate::models::messages::{self, MessageType, Thread};
use crate::pagination::Cursor;

fn thread_filter(thread: Thread) -> SimpleExpr {
    match thread {
        Thread::Contract(id) => messages::Column::ContractId.eq(id),
        Thread::ServiceRequest(id) => messages::Column::ServiceRequestId.eq(id),
    }
}

/// Insert a message into a thread.
pub async fn insert_message<C: ConnectionTrait>(
    db: &C,
    thread: Thread,
    sender_id: Uuid,
    recipient_id: Uuid,
    message_type: MessageType,
    body: Option<String>,
    file_url: Option<String>,
) -> Result<messages::Model, DbErr> {
    let (contract_id, service_request_id) = match thread {
        Thread::Contract(id) => (Some(id), None),
        Thread::ServiceRequest(id) => (None, Some(id)),
    };

    let new_message = messages::ActiveModel {
        id: Set(Uuid::new_v4()),
        contract_id: Set(contract_id),
        service_request_id: Set(service_request_id),
        sender_id: Set(sender_id),
        recipient_id: Set(recipient_id),
        message_type: Set(message_type),
        body: Set(body),
        file_url: Set(file_url),
        read_at: Set(None),
        created_at: Set(chrono::Utc::now()),
    };

    new_message.insert(db).await
}

/// Fetch a thread's messages oldest-first with keyset pagination: threads
/// render chronologically, so the cursor window is strictly *after*
/// `(created_at, id)` and the order is ascending.
pub async fn list_thread<C: ConnectionTrait>(
    db: &C,
    thread: Thread,
    limit: u64,
    cursor: Option<Cursor>,
) -> Result<Vec<messages::Model>, DbErr> {
    let mut find = messages::Entity::find().filter(thread_filter(thread));

    if let Some(cursor) = cursor {
        find = find.filter(
            Condition::any()
                .add(messages::Column::CreatedAt.gt(cursor.created_at))
                .add(
                    Condition::all()
                        .add(messages::Column::CreatedAt.eq(cursor.created_at))
                        .add(messages::Column::Id.gt(cursor.id)),
                ),
        );
    }

    find.order_by_asc(messages::Column::CreatedAt)
        .order_by_asc(messages::Column::Id)
        .limit(limit + 1)
        .all(db)
        .await
}

/// Fetch a single message by ID.
pub async fn get_message_by_id<C: ConnectionTrait>(
    db: &C,
    message_id: Uuid,
) -> Result<Option<messages::Model>, DbErr> {
    messages::Entity::find_by_id(message_id).one(db).await
}

/// Stamp a message as read. Idempotent: an already-read message keeps its
/// original `read_at`.
pub async fn mark_message_read<C: ConnectionTrait>(
    db: &C,
    message: messages::Model,
) -> Result<messages::Model, DbErr> {
    if message.read_at.is_some() {
        return Ok(message);
    }
    let mut active: messages::ActiveModel = message.into();
    active.read_at = Set(Some(chrono::Utc::now()));
    active.update(db).await
}

/// Mark every unread message addressed to `reader_id` in a thread as read.
pub async fn mark_thread_read<C: ConnectionTrait>(
    db: &C,
    thread: Thread,
    reader_id: Uuid,
) -> Result<u64, DbErr> {
    let result = messages::Entity::update_many()
        .col_expr(messages::Column::ReadAt, Expr::value(chrono::Utc::now()))
        .filter(thread_filter(thread))
        .filter(messages::Column::RecipientId.eq(reader_id))
        .filter(messages::Column::ReadAt.is_null())
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Count unread messages addressed to a user in one thread.
pub async fn unread_count_for_thread<C: ConnectionTrait>(
    db: &C,
    thread: Thread,
    user_id: Uuid,
) -> Result<u64, DbErr> {
    messages::Entity::find()
        .filter(thread_filter(thread))
        .filter(messages::Column::RecipientId.eq(user_id))
        .filter(messages::Column::ReadAt.is_null())
        .count(db)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::QueryTrait;

    #[test]
    fn thread_listing_is_ascending_with_a_forward_window() {
        let cursor = Cursor::new(chrono::Utc::now(), Uuid::new_v4());
        let mut find = messages::Entity::find().filter(thread_filter(Thread::Contract(
            Uuid::new_v4(),
        )));
        find = find.filter(
            Condition::any()
                .add(messages::Column::CreatedAt.gt(cursor.created_at))
                .add(
                    Condition::all()
                        .add(messages::Column::CreatedAt.eq(cursor.created_at))
                        .add(messages::Column::Id.gt(cursor.id)),
                ),
        );
        let sql = find
            .order_by_asc(messages::Column::CreatedAt)
            .order_by_asc(messages::Column::Id)
            .limit(51)
            .build(DbBackend::Postgres)
            .to_string();

        assert!(sql.contains("\"created_at\" >"));
        assert!(sql.contains("ORDER BY \"messages\".\"created_at\" ASC, \"messages\".\"id\" ASC"));
    }
}
