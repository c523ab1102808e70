use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::db::notifications as notification_db;
use crate::error::ApiError;
use crate::handlers::Data;
use crate::models::notifications;
use crate::pagination::{Cursor, Page, PageQuery};

#[derive(Debug, Deserialize)]
pub struct NotificationListQuery {
    pub limit: Option<u64>,
    pub cursor: Option<String>,
    pub unread: Option<bool>,
}

impl NotificationListQuery {
    fn page(&self) -> PageQuery {
        PageQuery {
            limit: self.limit,
            cursor: self.cursor.clone(),
        }
    }
}

fn notification_cursor(notification: &notifications::Model) -> Cursor {
    Cursor::new(notification.created_at, notification.id)
}

/// GET /api/notifications — the caller's notifications, newest first.
pub async fn list(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    query: web::Query<NotificationListQuery>,
) -> Result<HttpResponse, ApiError> {
    let page = query.page();
    let cursor = page.cursor()?;
    let limit = page.limit();
    let unread_only = query.unread.unwrap_or(false);

    let rows =
        notification_db::list_for_user(db.get_ref(), user.0.id, unread_only, limit, cursor)
            .await?;
    Ok(HttpResponse::Ok().json(Page::from_rows(rows, limit, notification_cursor)))
}

/// GET /api/notifications/unread-count
pub async fn unread_count(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let count = notification_db::unread_count(db.get_ref(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(Data {
        data: serde_json::json!({ "unread": count }),
    }))
}

/// PUT /api/notifications/{id}/read
pub async fn mark_read(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let notification = notification_db::get_by_id(db.get_ref(), path.into_inner())
        .await?
        .ok_or(ApiError::NotFound("notification"))?;

    if notification.user_id != user.0.id {
        return Err(ApiError::Forbidden(
            "you can only read your own notifications",
        ));
    }

    let updated = notification_db::mark_read(db.get_ref(), notification).await?;
    Ok(HttpResponse::Ok().json(Data { data: updated }))
}

/// POST /api/notifications/read-all
pub async fn read_all(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let updated = notification_db::mark_all_read(db.get_ref(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(Data {
        data: serde_json::json!({ "updated": updated }),
    }))
}
