use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::pagination::PageQuery;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum ServiceStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "paused")]
    Paused,
}

/// SeaORM entity for the `services` table: a freelancer's standing offering
/// that founders can send requests against.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "services")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub freelancer_id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Double")]
    pub price: f64,
    pub status: ServiceStatus,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::FreelancerId",
        to = "super::users::Column::Id"
    )]
    Freelancer,
    #[sea_orm(has_many = "super::service_requests::Entity")]
    Requests,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Freelancer.def()
    }
}

impl Related<super::service_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Requests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateService {
    #[validate(length(min = 3, max = 120))]
    pub title: String,
    #[validate(length(min = 1, max = 8000))]
    pub description: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateService {
    #[validate(length(min = 3, max = 120))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 8000))]
    pub description: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    pub status: Option<ServiceStatus>,
}

/// Query parameters for `GET /api/services`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceListQuery {
    pub limit: Option<u64>,
    pub cursor: Option<String>,
    pub status: Option<ServiceStatus>,
    pub freelancer_id: Option<Uuid>,
}

impl ServiceListQuery {
    pub fn page(&self) -> PageQuery {
        PageQuery {
            limit: self.limit,
            cursor: self.cursor.clone(),
        }
    }
}
