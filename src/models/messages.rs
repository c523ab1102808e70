use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum MessageType {
    #[sea_orm(string_value = "text")]
    Text,
    #[sea_orm(string_value = "file")]
    File,
    #[sea_orm(string_value = "system")]
    System,
}

/// SeaORM entity for the `messages` table.
///
/// A message belongs to exactly one thread: either a contract or a service
/// request. Text messages carry a body, file messages a file_url; system
/// messages are emitted by the lifecycle engine itself.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "messages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub contract_id: Option<Uuid>,
    pub service_request_id: Option<Uuid>,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub message_type: MessageType,
    #[sea_orm(column_type = "Text", nullable)]
    pub body: Option<String>,
    pub file_url: Option<String>,
    pub read_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::contracts::Entity",
        from = "Column::ContractId",
        to = "super::contracts::Column::Id"
    )]
    Contract,
    #[sea_orm(
        belongs_to = "super::service_requests::Entity",
        from = "Column::ServiceRequestId",
        to = "super::service_requests::Column::Id"
    )]
    ServiceRequest,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::SenderId",
        to = "super::users::Column::Id"
    )]
    Sender,
}

impl Related<super::contracts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contract.def()
    }
}

impl Related<super::service_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceRequest.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// The thread a message lives in. Repositories key all message queries on
/// this so contract chat and service-request chat share one code path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Thread {
    Contract(Uuid),
    ServiceRequest(Uuid),
}

// ── DTOs ──

/// Request body for posting a message into a thread. Clients may only send
/// text and file messages; system messages come from the engine.
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = validate_payload))]
pub struct SendMessage {
    pub message_type: MessageType,
    #[validate(length(min = 1, max = 8000))]
    pub body: Option<String>,
    #[validate(url)]
    pub file_url: Option<String>,
}

fn validate_payload(message: &SendMessage) -> Result<(), ValidationError> {
    match message.message_type {
        MessageType::Text if message.body.is_none() => {
            Err(ValidationError::new("text_requires_body"))
        }
        MessageType::File if message.file_url.is_none() => {
            Err(ValidationError::new("file_requires_file_url"))
        }
        MessageType::System => Err(ValidationError::new("system_messages_are_reserved")),
        _ => Ok(()),
    }
}

/// Response DTO for messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub id: Uuid,
    pub contract_id: Option<Uuid>,
    pub service_request_id: Option<Uuid>,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub message_type: MessageType,
    pub body: Option<String>,
    pub file_url: Option<String>,
    pub read_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

impl From<Model> for MessageResponse {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            contract_id: m.contract_id,
            service_request_id: m.service_request_id,
            sender_id: m.sender_id,
            recipient_id: m.recipient_id,
            message_type: m.message_type,
            body: m.body,
            file_url: m.file_url,
            read_at: m.read_at,
            created_at: m.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn text_message(body: Option<&str>) -> SendMessage {
        SendMessage {
            message_type: MessageType::Text,
            body: body.map(str::to_string),
            file_url: None,
        }
    }

    #[test]
    fn text_requires_body() {
        assert!(text_message(Some("hi")).validate().is_ok());
        assert!(text_message(None).validate().is_err());
    }

    #[test]
    fn file_requires_file_url() {
        let without_url = SendMessage {
            message_type: MessageType::File,
            body: None,
            file_url: None,
        };
        assert!(without_url.validate().is_err());

        let with_url = SendMessage {
            message_type: MessageType::File,
            body: None,
            file_url: Some("https://files.example.com/brief.pdf".to_string()),
        };
        assert!(with_url.validate().is_ok());
    }

    #[test]
    fn clients_cannot_send_system_messages() {
        let system = SendMessage {
            message_type: MessageType::System,
            body: Some("contract closed".to_string()),
            file_url: None,
        };
        assert!(system.validate().is_err());
    }
}
