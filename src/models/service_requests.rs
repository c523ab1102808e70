use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum ServiceRequestStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "declined")]
    Declined,
    #[sea_orm(string_value = "closed")]
    Closed,
}

/// SeaORM entity for the `service_requests` table: a founder's inquiry
/// against a freelancer's service. Accepting one opens its message thread.
///
/// `freelancer_id` is denormalized from the service so party checks and
/// per-freelancer listings need no join.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub service_id: Uuid,
    pub founder_id: Uuid,
    pub freelancer_id: Uuid,
    #[sea_orm(column_type = "Text", nullable)]
    pub note: Option<String>,
    pub status: ServiceRequestStatus,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::services::Entity",
        from = "Column::ServiceId",
        to = "super::services::Column::Id"
    )]
    Service,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::FounderId",
        to = "super::users::Column::Id"
    )]
    Founder,
    #[sea_orm(has_many = "super::messages::Entity")]
    Messages,
}

impl Related<super::services::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Service.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_party(&self, user_id: Uuid) -> bool {
        self.founder_id == user_id || self.freelancer_id == user_id
    }

    pub fn counterparty(&self, user_id: Uuid) -> Uuid {
        if self.founder_id == user_id {
            self.freelancer_id
        } else {
            self.founder_id
        }
    }
}

// ── DTOs ──

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateServiceRequest {
    #[validate(length(max = 4000))]
    pub note: Option<String>,
}
