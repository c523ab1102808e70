use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;

use crate::auth::middleware::AuthenticatedUser;
use crate::db::users as user_db;
use crate::error::ApiError;
use crate::handlers::Data;
use crate::models::users::{CompleteProfile, UserResponse};
use crate::validation::validate;

/// GET /api/auth/me — the resolved caller's own profile.
pub async fn me(user: AuthenticatedUser) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(Data {
        data: UserResponse::from(user.0),
    }))
}

/// POST /api/auth/complete-profile — set username, role and display fields
/// after first login.
pub async fn complete_profile(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    body: web::Json<CompleteProfile>,
) -> Result<HttpResponse, ApiError> {
    let input = body.into_inner();
    validate(&input)?;

    let updated = user_db::complete_profile(db.get_ref(), user.0.id, input).await?;
    Ok(HttpResponse::Ok().json(Data {
        data: UserResponse::from(updated),
    }))
}
