use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// SeaORM entity for the `ratings` table.
/// Unique (contract_id, reviewer_id): each party rates the other once.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ratings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub contract_id: Uuid,
    pub reviewer_id: Uuid,
    pub reviewee_id: Uuid,
    pub score: i16,
    #[sea_orm(column_type = "Text", nullable)]
    pub review_text: Option<String>,
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
        belongs_to = "super::users::Entity",
        from = "Column::RevieweeId",
        to = "super::users::Column::Id"
    )]
    Reviewee,
}

impl Related<super::contracts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contract.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRating {
    #[validate(range(min = 1, max = 5))]
    pub score: i16,
    #[validate(length(max = 2000))]
    pub review_text: Option<String>,
}

/// Aggregate returned by `GET /api/users/{id}/ratings/summary`.
#[derive(Debug, Clone, Serialize)]
pub struct RatingSummary {
    pub user_id: Uuid,
    pub average_score: Option<f64>,
    pub ratings_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn score_must_be_one_to_five() {
        for score in [0, 6, -1] {
            let rating = CreateRating {
                score,
                review_text: None,
            };
            assert!(rating.validate().is_err(), "score {score} should fail");
        }
        let ok = CreateRating {
            score: 5,
            review_text: Some("Great work".to_string()),
        };
        assert!(ok.validate().is_ok());
    }
}
