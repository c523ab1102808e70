use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::db::service_requests as request_db;
use crate::db::services as service_db;
use crate::error::ApiError;
use crate::handlers::Data;
use crate::lifecycle;
use crate::models::service_requests::{self, CreateServiceRequest};
use crate::models::services::{self, CreateService, ServiceListQuery, UpdateService};
use crate::pagination::{Cursor, Page, PageQuery};
use crate::validation::validate;

fn service_cursor(service: &services::Model) -> Cursor {
    Cursor::new(service.created_at, service.id)
}

fn request_cursor(request: &service_requests::Model) -> Cursor {
    Cursor::new(request.created_at, request.id)
}

/// POST /api/services — freelancer publishes a standing offering.
pub async fn create_service(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    body: web::Json<CreateService>,
) -> Result<HttpResponse, ApiError> {
    let input = body.into_inner();
    validate(&input)?;

    let service = service_db::insert_service(db.get_ref(), input, user.0.id).await?;
    Ok(HttpResponse::Created().json(Data { data: service }))
}

/// GET /api/services — browse offerings with keyset pagination.
pub async fn list_services(
    _user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    query: web::Query<ServiceListQuery>,
) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    let page = query.page();
    let cursor = page.cursor()?;
    let limit = page.limit();

    let rows = service_db::list_services(db.get_ref(), &query, cursor).await?;
    Ok(HttpResponse::Ok().json(Page::from_rows(rows, limit, service_cursor)))
}

/// GET /api/services/{id}
pub async fn get_service(
    _user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let service = service_db::get_service_by_id(db.get_ref(), path.into_inner())
        .await?
        .ok_or(ApiError::NotFound("service"))?;
    Ok(HttpResponse::Ok().json(Data { data: service }))
}

/// PATCH /api/services/{id} — owner edits or pauses the offering.
pub async fn update_service(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateService>,
) -> Result<HttpResponse, ApiError> {
    let input = body.into_inner();
    validate(&input)?;

    let service = service_db::get_service_by_id(db.get_ref(), path.into_inner())
        .await?
        .ok_or(ApiError::NotFound("service"))?;
    if service.freelancer_id != user.0.id {
        return Err(ApiError::Forbidden("only the service owner can edit it"));
    }

    let updated = service_db::update_service(db.get_ref(), service, input).await?;
    Ok(HttpResponse::Ok().json(Data { data: updated }))
}

/// POST /api/services/{id}/requests — founder sends an inquiry.
pub async fn request_service(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    body: web::Json<CreateServiceRequest>,
) -> Result<HttpResponse, ApiError> {
    let input = body.into_inner();
    validate(&input)?;

    let request =
        lifecycle::request_service(db.get_ref(), user.0.id, path.into_inner(), input.note).await?;
    Ok(HttpResponse::Created().json(Data { data: request }))
}

/// GET /api/service-requests/mine — requests the caller is a party to.
pub async fn my_requests(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    let cursor = query.cursor()?;
    let limit = query.limit();

    let rows = request_db::list_requests_for_user(db.get_ref(), user.0.id, limit, cursor).await?;
    Ok(HttpResponse::Ok().json(Page::from_rows(rows, limit, request_cursor)))
}

/// POST /api/service-requests/{id}/accept — owner opens the thread.
pub async fn accept_request(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let request =
        lifecycle::accept_service_request(db.get_ref(), user.0.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(Data { data: request }))
}

/// POST /api/service-requests/{id}/decline
pub async fn decline_request(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let request =
        lifecycle::decline_service_request(db.get_ref(), user.0.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(Data { data: request }))
}
