use sea_orm::prelude::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::models::ratings::{self, CreateRating, RatingSummary};
use crate::pagination::Cursor;

/// Insert a rating. The unique (contract_id, reviewer_id) index makes a
/// second rating from the same reviewer fail here; the orchestrator
/// translates that violation into `DuplicateRating`.
pub async fn insert_rating<C: ConnectionTrait>(
    db: &C,
    input: CreateRating,
    contract_id: Uuid,
    reviewer_id: Uuid,
    reviewee_id: Uuid,
) -> Result<ratings::Model, DbErr> {
    let new_rating = ratings::ActiveModel {
        id: Set(Uuid::new_v4()),
        contract_id: Set(contract_id),
        reviewer_id: Set(reviewer_id),
        reviewee_id: Set(reviewee_id),
        score: Set(input.score),
        review_text: Set(input.review_text),
        created_at: Set(chrono::Utc::now()),
    };

    new_rating.insert(db).await
}

/// Both ratings on a contract (at most two rows, no pagination needed).
pub async fn list_ratings_by_contract<C: ConnectionTrait>(
    db: &C,
    contract_id: Uuid,
) -> Result<Vec<ratings::Model>, DbErr> {
    ratings::Entity::find()
        .filter(ratings::Column::ContractId.eq(contract_id))
        .order_by_desc(ratings::Column::CreatedAt)
        .all(db)
        .await
}

/// Ratings received by a user, newest first, with keyset pagination.
pub async fn list_ratings_for_user<C: ConnectionTrait>(
    db: &C,
    reviewee_id: Uuid,
    limit: u64,
    cursor: Option<Cursor>,
) -> Result<Vec<ratings::Model>, DbErr> {
    let mut find = ratings::Entity::find().filter(ratings::Column::RevieweeId.eq(reviewee_id));

    if let Some(cursor) = cursor {
        find = find.filter(
            Condition::any()
                .add(ratings::Column::CreatedAt.lt(cursor.created_at))
                .add(
                    Condition::all()
                        .add(ratings::Column::CreatedAt.eq(cursor.created_at))
                        .add(ratings::Column::Id.lt(cursor.id)),
                ),
        );
    }

    find.order_by_desc(ratings::Column::CreatedAt)
        .order_by_desc(ratings::Column::Id)
        .limit(limit + 1)
        .all(db)
        .await
}

#[derive(Debug, FromQueryResult)]
struct RatingAggRow {
    average: Option<f64>,
    count: i64,
}

/// Aggregate score for a user, computed on demand.
pub async fn summary_for_user<C: ConnectionTrait>(
    db: &C,
    reviewee_id: Uuid,
) -> Result<RatingSummary, DbErr> {
    let row = ratings::Entity::find()
        .select_only()
        .column_as(Expr::cust("AVG(score::float8)"), "average")
        .column_as(Expr::cust("COUNT(*)"), "count")
        .filter(ratings::Column::RevieweeId.eq(reviewee_id))
        .into_model::<RatingAggRow>()
        .one(db)
        .await?;

    let (average_score, ratings_count) = match row {
        Some(row) => (row.average, Ord::max(row.count, 0) as u64),
        None => (None, 0),
    };

    Ok(RatingSummary {
        user_id: reviewee_id,
        average_score,
        ratings_count,
    })
}
