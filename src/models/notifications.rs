use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Notification kinds fanned out by lifecycle transitions. Delivery past the
/// table (push, email) is the sink's concern, not this engine's.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum NotificationType {
    #[sea_orm(string_value = "proposal_received")]
    ProposalReceived,
    #[sea_orm(string_value = "proposal_accepted")]
    ProposalAccepted,
    #[sea_orm(string_value = "proposal_rejected")]
    ProposalRejected,
    #[sea_orm(string_value = "contract_completed")]
    ContractCompleted,
    #[sea_orm(string_value = "contract_cancelled")]
    ContractCancelled,
    #[sea_orm(string_value = "contract_disputed")]
    ContractDisputed,
    #[sea_orm(string_value = "message_received")]
    MessageReceived,
    #[sea_orm(string_value = "service_request_received")]
    ServiceRequestReceived,
    #[sea_orm(string_value = "service_request_accepted")]
    ServiceRequestAccepted,
    #[sea_orm(string_value = "service_request_declined")]
    ServiceRequestDeclined,
    #[sea_orm(string_value = "rating_received")]
    RatingReceived,
}

/// SeaORM entity for the `notifications` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub notification_type: NotificationType,
    pub reference_id: Option<Uuid>,
    #[sea_orm(column_type = "JsonBinary")]
    pub payload: Json,
    pub read_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Internal creation DTO used by the lifecycle engine's notification fan-out.
#[derive(Debug, Clone)]
pub struct CreateNotification {
    pub user_id: Uuid,
    pub notification_type: NotificationType,
    pub reference_id: Option<Uuid>,
    pub payload: serde_json::Value,
}
