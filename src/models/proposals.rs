use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Proposal status stored as a lowercase string in the database.
///
/// `Pending` and `Shortlisted` are the open states: the founder may still
/// accept or reject, and the freelancer may still withdraw. The other three
/// are terminal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum ProposalStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "shortlisted")]
    Shortlisted,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "withdrawn")]
    Withdrawn,
}

impl ProposalStatus {
    pub fn is_open(self) -> bool {
        matches!(self, ProposalStatus::Pending | ProposalStatus::Shortlisted)
    }
}

/// SeaORM entity for the `proposals` table.
/// Unique (gig_id, freelancer_id): one proposal per freelancer per gig.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "proposals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub gig_id: Uuid,
    pub freelancer_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub cover_letter: String,
    #[sea_orm(column_type = "Double")]
    pub proposed_amount: f64,
    pub estimated_days: Option<i32>,
    pub status: ProposalStatus,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::gigs::Entity",
        from = "Column::GigId",
        to = "super::gigs::Column::Id"
    )]
    Gig,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::FreelancerId",
        to = "super::users::Column::Id"
    )]
    Freelancer,
    #[sea_orm(has_one = "super::contracts::Entity")]
    Contract,
}

impl Related<super::gigs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Gig.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Freelancer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProposal {
    #[validate(length(min = 1, max = 8000))]
    pub cover_letter: String,
    #[validate(range(min = 0.0))]
    pub proposed_amount: f64,
    #[validate(range(min = 1))]
    pub estimated_days: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn open_states_are_pending_and_shortlisted() {
        assert!(ProposalStatus::Pending.is_open());
        assert!(ProposalStatus::Shortlisted.is_open());
        assert!(!ProposalStatus::Accepted.is_open());
        assert!(!ProposalStatus::Rejected.is_open());
        assert!(!ProposalStatus::Withdrawn.is_open());
    }

    #[test]
    fn zero_estimated_days_is_rejected() {
        let proposal = CreateProposal {
            cover_letter: "I can do this.".to_string(),
            proposed_amount: 500.0,
            estimated_days: Some(0),
        };
        assert!(proposal.validate().is_err());
    }

    #[test]
    fn negative_amount_is_rejected() {
        let proposal = CreateProposal {
            cover_letter: "I can do this.".to_string(),
            proposed_amount: -10.0,
            estimated_days: None,
        };
        assert!(proposal.validate().is_err());
    }
}
