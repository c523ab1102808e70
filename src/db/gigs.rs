use sea_orm::prelude::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::models::gig_tags;
use crate::models::gigs::{self, CreateGig, GigListQuery, GigStatus, UpdateGig};
use crate::models::proposals::{self, ProposalStatus};
use crate::pagination::Cursor;

/// Insert a new gig and its tag rows.
pub async fn insert_gig<C: ConnectionTrait>(
    db: &C,
    input: CreateGig,
    founder_id: Uuid,
) -> Result<gigs::Model, DbErr> {
    let now = chrono::Utc::now();
    let status = if input.is_draft.unwrap_or(false) {
        GigStatus::Draft
    } else {
        GigStatus::Open
    };

    let new_gig = gigs::ActiveModel {
        id: Set(Uuid::new_v4()),
        founder_id: Set(founder_id),
        title: Set(input.title),
        description: Set(input.description),
        budget_type: Set(input.budget_type),
        budget_min: Set(input.budget_min),
        budget_max: Set(input.budget_max),
        experience_level: Set(input.experience_level),
        startup_stage: Set(input.startup_stage),
        status: Set(status),
        proposals_count: Set(0),
        is_remote: Set(input.is_remote),
        location_text: Set(input.location_text),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let gig = new_gig.insert(db).await?;

    // Normalize and dedupe before the bulk insert; the composite key would
    // reject a repeated tag.
    let tags: std::collections::BTreeSet<String> = input
        .tags
        .iter()
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect();
    if !tags.is_empty() {
        let rows: Vec<gig_tags::ActiveModel> = tags
            .into_iter()
            .map(|tag| gig_tags::ActiveModel {
                gig_id: Set(gig.id),
                tag: Set(tag),
            })
            .collect();
        gig_tags::Entity::insert_many(rows).exec(db).await?;
    }

    Ok(gig)
}

/// Fetch a single gig by ID.
pub async fn get_gig_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<gigs::Model>, DbErr> {
    gigs::Entity::find_by_id(id).one(db).await
}

/// List gigs ordered by `(created_at desc, id desc)` with keyset pagination.
///
/// Filters are applied before the cursor predicate so the keyset stays
/// correct. A tag filter resolves matching gig ids first and short-circuits
/// to an empty result when nothing matches, instead of running the main
/// query with an impossible id set. Browsing defaults to `open` gigs;
/// requesting drafts is scoped to the caller's own.
pub async fn list_gigs<C: ConnectionTrait>(
    db: &C,
    caller_id: Uuid,
    query: &GigListQuery,
    cursor: Option<Cursor>,
) -> Result<Vec<gigs::Model>, DbErr> {
    let tags = query.tag_filter();
    let mut find = gigs::Entity::find();

    if !tags.is_empty() {
        let tagged_ids: Vec<Uuid> = gig_tags::Entity::find()
            .filter(gig_tags::Column::Tag.is_in(tags))
            .select_only()
            .column(gig_tags::Column::GigId)
            .distinct()
            .into_tuple()
            .all(db)
            .await?;
        if tagged_ids.is_empty() {
            return Ok(Vec::new());
        }
        find = find.filter(gigs::Column::Id.is_in(tagged_ids));
    }

    let status = query.status.unwrap_or(GigStatus::Open);
    find = find.filter(gigs::Column::Status.eq(status));
    if status == GigStatus::Draft {
        find = find.filter(gigs::Column::FounderId.eq(caller_id));
    }

    if let Some(min_budget) = query.min_budget {
        find = find.filter(gigs::Column::BudgetMax.gte(min_budget));
    }
    if let Some(max_budget) = query.max_budget {
        find = find.filter(gigs::Column::BudgetMin.lte(max_budget));
    }
    if let Some(level) = query.experience_level {
        find = find.filter(gigs::Column::ExperienceLevel.eq(level));
    }
    if let Some(is_remote) = query.is_remote {
        find = find.filter(gigs::Column::IsRemote.eq(is_remote));
    }

    if let Some(cursor) = cursor {
        find = find.filter(
            Condition::any()
                .add(gigs::Column::CreatedAt.lt(cursor.created_at))
                .add(
                    Condition::all()
                        .add(gigs::Column::CreatedAt.eq(cursor.created_at))
                        .add(gigs::Column::Id.lt(cursor.id)),
                ),
        );
    }

    find.order_by_desc(gigs::Column::CreatedAt)
        .order_by_desc(gigs::Column::Id)
        .limit(query.page().limit() + 1)
        .all(db)
        .await
}

/// List a founder's own gigs, any status.
pub async fn list_gigs_by_founder<C: ConnectionTrait>(
    db: &C,
    founder_id: Uuid,
    limit: u64,
    cursor: Option<Cursor>,
) -> Result<Vec<gigs::Model>, DbErr> {
    let mut find = gigs::Entity::find().filter(gigs::Column::FounderId.eq(founder_id));

    if let Some(cursor) = cursor {
        find = find.filter(
            Condition::any()
                .add(gigs::Column::CreatedAt.lt(cursor.created_at))
                .add(
                    Condition::all()
                        .add(gigs::Column::CreatedAt.eq(cursor.created_at))
                        .add(gigs::Column::Id.lt(cursor.id)),
                ),
        );
    }

    find.order_by_desc(gigs::Column::CreatedAt)
        .order_by_desc(gigs::Column::Id)
        .limit(limit + 1)
        .all(db)
        .await
}

/// Apply founder edits to a draft/open gig. Status changes only via `publish`.
pub async fn update_gig<C: ConnectionTrait>(
    db: &C,
    gig: gigs::Model,
    input: UpdateGig,
) -> Result<gigs::Model, DbErr> {
    let was_draft = gig.status == GigStatus::Draft;
    let mut active: gigs::ActiveModel = gig.into();

    if let Some(title) = input.title {
        active.title = Set(title);
    }
    if let Some(description) = input.description {
        active.description = Set(description);
    }
    if let Some(budget_type) = input.budget_type {
        active.budget_type = Set(budget_type);
    }
    if let Some(budget_min) = input.budget_min {
        active.budget_min = Set(budget_min);
    }
    if let Some(budget_max) = input.budget_max {
        active.budget_max = Set(budget_max);
    }
    if let Some(level) = input.experience_level {
        active.experience_level = Set(level);
    }
    if let Some(stage) = input.startup_stage {
        active.startup_stage = Set(Some(stage));
    }
    if let Some(is_remote) = input.is_remote {
        active.is_remote = Set(is_remote);
    }
    if let Some(location_text) = input.location_text {
        active.location_text = Set(Some(location_text));
    }
    if was_draft && input.publish.unwrap_or(false) {
        active.status = Set(GigStatus::Open);
    }
    active.updated_at = Set(chrono::Utc::now());

    active.update(db).await
}

/// Move a gig to a new lifecycle status (orchestrator only).
pub async fn set_status<C: ConnectionTrait>(
    db: &C,
    gig_id: Uuid,
    status: GigStatus,
) -> Result<(), DbErr> {
    gigs::Entity::update_many()
        .col_expr(gigs::Column::Status, Expr::value(status))
        .col_expr(gigs::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(gigs::Column::Id.eq(gig_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Bump the denormalized proposal counter (±1), in the same transaction as
/// the proposal write it mirrors.
pub async fn bump_proposals_count<C: ConnectionTrait>(
    db: &C,
    gig_id: Uuid,
    delta: i32,
) -> Result<(), DbErr> {
    gigs::Entity::update_many()
        .col_expr(
            gigs::Column::ProposalsCount,
            Expr::col(gigs::Column::ProposalsCount).add(delta),
        )
        .filter(gigs::Column::Id.eq(gig_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Recompute `proposals_count` from the proposals table (drift repair). The
/// counter tracks non-withdrawn proposals.
pub async fn recount_proposals<C: ConnectionTrait>(db: &C, gig_id: Uuid) -> Result<i32, DbErr> {
    let count = proposals::Entity::find()
        .filter(proposals::Column::GigId.eq(gig_id))
        .filter(proposals::Column::Status.ne(ProposalStatus::Withdrawn))
        .count(db)
        .await? as i32;

    gigs::Entity::update_many()
        .col_expr(gigs::Column::ProposalsCount, Expr::value(count))
        .filter(gigs::Column::Id.eq(gig_id))
        .exec(db)
        .await?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::QueryTrait;

    #[test]
    fn cursor_predicate_lands_after_filters() {
        let cursor = Cursor::new(chrono::Utc::now(), Uuid::new_v4());
        let query = GigListQuery {
            status: Some(GigStatus::Open),
            min_budget: Some(100.0),
            is_remote: Some(true),
            ..Default::default()
        };

        // Build the same query shape list_gigs produces and check the SQL
        // carries both the filters and the strict keyset window.
        let mut find = gigs::Entity::find()
            .filter(gigs::Column::Status.eq(query.status.unwrap()))
            .filter(gigs::Column::BudgetMax.gte(query.min_budget.unwrap()))
            .filter(gigs::Column::IsRemote.eq(true));
        find = find.filter(
            Condition::any()
                .add(gigs::Column::CreatedAt.lt(cursor.created_at))
                .add(
                    Condition::all()
                        .add(gigs::Column::CreatedAt.eq(cursor.created_at))
                        .add(gigs::Column::Id.lt(cursor.id)),
                ),
        );
        let sql = find
            .order_by_desc(gigs::Column::CreatedAt)
            .order_by_desc(gigs::Column::Id)
            .limit(21)
            .build(DbBackend::Postgres)
            .to_string();

        assert!(sql.contains("\"status\" ="));
        assert!(sql.contains("\"budget_max\" >="));
        assert!(sql.contains("\"created_at\" <"));
        assert!(sql.contains("ORDER BY \"gigs\".\"created_at\" DESC, \"gigs\".\"id\" DESC"));
        assert!(sql.contains("LIMIT 21"));
    }
}
