use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Contract status stored as a lowercase string in the database.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum ContractStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    #[sea_orm(string_value = "disputed")]
    Disputed,
}

/// SeaORM entity for the `contracts` table.
///
/// `gig_id` and `proposal_id` carry unique indexes: the database is the
/// arbiter that at most one contract ever exists per gig, whatever the
/// interleaving of concurrent accept calls. Completion is a two-flag mutual
/// gate; the contract only closes once both parties have confirmed.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contracts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub gig_id: Uuid,
    #[sea_orm(unique)]
    pub proposal_id: Uuid,
    pub founder_id: Uuid,
    pub freelancer_id: Uuid,
    pub status: ContractStatus,
    pub freelancer_marked_complete: bool,
    pub founder_approved: bool,
    pub started_at: DateTimeUtc,
    pub completed_at: Option<DateTimeUtc>,
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
        belongs_to = "super::proposals::Entity",
        from = "Column::ProposalId",
        to = "super::proposals::Column::Id"
    )]
    Proposal,
    #[sea_orm(has_many = "super::ratings::Entity")]
    Ratings,
    #[sea_orm(has_many = "super::messages::Entity")]
    Messages,
}

impl Related<super::gigs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Gig.def()
    }
}

impl Related<super::proposals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Proposal.def()
    }
}

impl Related<super::ratings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ratings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_party(&self, user_id: Uuid) -> bool {
        self.founder_id == user_id || self.freelancer_id == user_id
    }

    /// The other side of the engagement, from `user_id`'s point of view.
    pub fn counterparty(&self, user_id: Uuid) -> Uuid {
        if self.founder_id == user_id {
            self.freelancer_id
        } else {
            self.founder_id
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn contract(founder_id: Uuid, freelancer_id: Uuid) -> Model {
        let now = Utc::now();
        Model {
            id: Uuid::new_v4(),
            gig_id: Uuid::new_v4(),
            proposal_id: Uuid::new_v4(),
            founder_id,
            freelancer_id,
            status: ContractStatus::Active,
            freelancer_marked_complete: false,
            founder_approved: false,
            started_at: now,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn party_checks_cover_both_sides() {
        let founder = Uuid::new_v4();
        let freelancer = Uuid::new_v4();
        let c = contract(founder, freelancer);
        assert!(c.is_party(founder));
        assert!(c.is_party(freelancer));
        assert!(!c.is_party(Uuid::new_v4()));
        assert_eq!(c.counterparty(founder), freelancer);
        assert_eq!(c.counterparty(freelancer), founder);
    }
}
