use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::db::messages as message_db;
use crate::error::ApiError;
use crate::handlers::Data;
use crate::lifecycle;
use crate::models::messages::{self, MessageResponse, SendMessage, Thread};
use crate::pagination::{Cursor, Page, PageQuery};
use crate::validation::validate;

fn message_cursor(message: &messages::Model) -> Cursor {
    Cursor::new(message.created_at, message.id)
}

/// Shared listing tail: authorize the caller on the thread, then page
/// through it oldest-first.
async fn list_thread(
    db: &DatabaseConnection,
    user_id: Uuid,
    thread: Thread,
    query: &PageQuery,
) -> Result<HttpResponse, ApiError> {
    lifecycle::resolve_thread(db, user_id, thread).await?;

    let cursor = query.cursor()?;
    let limit = query.limit();
    let rows = message_db::list_thread(db, thread, limit, cursor).await?;
    Ok(HttpResponse::Ok().json(Page::from_rows(rows, limit, message_cursor).map(MessageResponse::from)))
}

async fn post_to_thread(
    db: &DatabaseConnection,
    user_id: Uuid,
    thread: Thread,
    input: SendMessage,
) -> Result<HttpResponse, ApiError> {
    validate(&input)?;
    let message = lifecycle::send_message(db, user_id, thread, input).await?;
    Ok(HttpResponse::Created().json(Data {
        data: MessageResponse::from(message),
    }))
}

async fn read_all_in_thread(
    db: &DatabaseConnection,
    user_id: Uuid,
    thread: Thread,
) -> Result<HttpResponse, ApiError> {
    lifecycle::resolve_thread(db, user_id, thread).await?;
    let updated = message_db::mark_thread_read(db, thread, user_id).await?;
    Ok(HttpResponse::Ok().json(Data {
        data: serde_json::json!({ "updated": updated }),
    }))
}

/// GET /api/contracts/{id}/messages — contract chat history, oldest first.
pub async fn get_contract_messages(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    list_thread(
        db.get_ref(),
        user.0.id,
        Thread::Contract(path.into_inner()),
        &query,
    )
    .await
}

/// POST /api/contracts/{id}/messages — post into the contract thread.
pub async fn post_contract_message(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    body: web::Json<SendMessage>,
) -> Result<HttpResponse, ApiError> {
    post_to_thread(
        db.get_ref(),
        user.0.id,
        Thread::Contract(path.into_inner()),
        body.into_inner(),
    )
    .await
}

/// POST /api/contracts/{id}/messages/read-all — mark the caller's unread
/// messages in the contract thread as read.
pub async fn read_all_contract_messages(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    read_all_in_thread(db.get_ref(), user.0.id, Thread::Contract(path.into_inner())).await
}

/// GET /api/contracts/{id}/messages/unread-count
pub async fn contract_unread_count(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let thread = Thread::Contract(path.into_inner());
    lifecycle::resolve_thread(db.get_ref(), user.0.id, thread).await?;
    let count = message_db::unread_count_for_thread(db.get_ref(), thread, user.0.id).await?;
    Ok(HttpResponse::Ok().json(Data {
        data: serde_json::json!({ "unread": count }),
    }))
}

/// GET /api/service-requests/{id}/messages — request chat history.
pub async fn get_request_messages(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    list_thread(
        db.get_ref(),
        user.0.id,
        Thread::ServiceRequest(path.into_inner()),
        &query,
    )
    .await
}

/// POST /api/service-requests/{id}/messages — post into the request thread.
pub async fn post_request_message(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    body: web::Json<SendMessage>,
) -> Result<HttpResponse, ApiError> {
    post_to_thread(
        db.get_ref(),
        user.0.id,
        Thread::ServiceRequest(path.into_inner()),
        body.into_inner(),
    )
    .await
}

/// POST /api/service-requests/{id}/messages/read-all
pub async fn read_all_request_messages(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    read_all_in_thread(
        db.get_ref(),
        user.0.id,
        Thread::ServiceRequest(path.into_inner()),
    )
    .await
}

/// PUT /api/messages/{id}/read — recipient marks one message as read.
pub async fn mark_read(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let message = message_db::get_message_by_id(db.get_ref(), path.into_inner())
        .await?
        .ok_or(ApiError::NotFound("message"))?;

    if message.recipient_id != user.0.id {
        return Err(ApiError::Forbidden(
            "only the recipient can mark a message as read",
        ));
    }

    let updated = message_db::mark_message_read(db.get_ref(), message).await?;
    Ok(HttpResponse::Ok().json(Data {
        data: MessageResponse::from(updated),
    }))
}
