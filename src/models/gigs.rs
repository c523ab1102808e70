use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::pagination::PageQuery;

/// Gig lifecycle status stored as a lowercase string in the database.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum GigStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "open")]
    Open,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum BudgetType {
    #[sea_orm(string_value = "fixed")]
    Fixed,
    #[sea_orm(string_value = "hourly")]
    Hourly,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum ExperienceLevel {
    #[sea_orm(string_value = "entry")]
    Entry,
    #[sea_orm(string_value = "intermediate")]
    Intermediate,
    #[sea_orm(string_value = "expert")]
    Expert,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum StartupStage {
    #[sea_orm(string_value = "idea")]
    Idea,
    #[sea_orm(string_value = "mvp")]
    Mvp,
    #[sea_orm(string_value = "scaling")]
    Scaling,
    #[sea_orm(string_value = "established")]
    Established,
}

/// SeaORM entity for the `gigs` table.
///
/// `proposals_count` is a denormalized counter maintained in the same
/// transaction as proposal writes; `recount_proposals` repairs drift.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "gigs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub founder_id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub budget_type: BudgetType,
    #[sea_orm(column_type = "Double")]
    pub budget_min: f64,
    #[sea_orm(column_type = "Double")]
    pub budget_max: f64,
    pub experience_level: ExperienceLevel,
    pub startup_stage: Option<StartupStage>,
    pub status: GigStatus,
    pub proposals_count: i32,
    pub is_remote: bool,
    pub location_text: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::proposals::Entity")]
    Proposals,
    #[sea_orm(has_many = "super::gig_tags::Entity")]
    Tags,
    #[sea_orm(has_one = "super::contracts::Entity")]
    Contract,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::FounderId",
        to = "super::users::Column::Id"
    )]
    Founder,
}

impl Related<super::proposals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Proposals.def()
    }
}

impl Related<super::gig_tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tags.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Founder.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Draft and open gigs are still editable by their founder; once a
    /// contract exists the gig is only mutated by the lifecycle engine.
    pub fn is_editable(&self) -> bool {
        matches!(self.status, GigStatus::Draft | GigStatus::Open)
    }
}

// ── DTOs ──

#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = validate_budget_range))]
pub struct CreateGig {
    #[validate(length(min = 3, max = 120))]
    pub title: String,
    #[validate(length(min = 1, max = 8000))]
    pub description: String,
    pub budget_type: BudgetType,
    #[validate(range(min = 0.0))]
    pub budget_min: f64,
    #[validate(range(min = 0.0))]
    pub budget_max: f64,
    pub experience_level: ExperienceLevel,
    pub startup_stage: Option<StartupStage>,
    /// Defaults to publishing straight to `open`.
    pub is_draft: Option<bool>,
    pub is_remote: bool,
    #[validate(length(max = 120))]
    pub location_text: Option<String>,
    #[serde(default)]
    #[validate(custom(function = crate::validation::tag_list))]
    pub tags: Vec<String>,
}

fn validate_budget_range(gig: &CreateGig) -> Result<(), ValidationError> {
    if gig.budget_max < gig.budget_min {
        return Err(ValidationError::new("budget_max_below_min"));
    }
    Ok(())
}

/// Founder edits, legal only while the gig is draft or open.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateGig {
    #[validate(length(min = 3, max = 120))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 8000))]
    pub description: Option<String>,
    pub budget_type: Option<BudgetType>,
    #[validate(range(min = 0.0))]
    pub budget_min: Option<f64>,
    #[validate(range(min = 0.0))]
    pub budget_max: Option<f64>,
    pub experience_level: Option<ExperienceLevel>,
    pub startup_stage: Option<StartupStage>,
    pub is_remote: Option<bool>,
    #[validate(length(max = 120))]
    pub location_text: Option<String>,
    /// Publish a draft.
    pub publish: Option<bool>,
}

/// Query parameters for `GET /api/gigs`. Pagination params are flat
/// (`?limit=&cursor=`) like every other listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GigListQuery {
    pub limit: Option<u64>,
    pub cursor: Option<String>,
    pub status: Option<GigStatus>,
    pub min_budget: Option<f64>,
    pub max_budget: Option<f64>,
    pub experience_level: Option<ExperienceLevel>,
    pub is_remote: Option<bool>,
    /// Comma-separated tag list, e.g. `?tags=rust,backend`.
    pub tags: Option<String>,
}

impl GigListQuery {
    pub fn page(&self) -> PageQuery {
        PageQuery {
            limit: self.limit,
            cursor: self.cursor.clone(),
        }
    }

    pub fn tag_filter(&self) -> Vec<String> {
        self.tags
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn base_gig() -> CreateGig {
        CreateGig {
            title: "Build an MVP landing page".to_string(),
            description: "Responsive landing page for our beta waitlist.".to_string(),
            budget_type: BudgetType::Fixed,
            budget_min: 200.0,
            budget_max: 500.0,
            experience_level: ExperienceLevel::Intermediate,
            startup_stage: Some(StartupStage::Mvp),
            is_draft: None,
            is_remote: true,
            location_text: None,
            tags: vec!["web".to_string(), "design".to_string()],
        }
    }

    #[test]
    fn valid_gig_passes() {
        assert!(base_gig().validate().is_ok());
    }

    #[test]
    fn budget_max_below_min_is_rejected() {
        let mut gig = base_gig();
        gig.budget_min = 500.0;
        gig.budget_max = 200.0;
        assert!(gig.validate().is_err());
    }

    #[test]
    fn negative_budget_is_rejected() {
        let mut gig = base_gig();
        gig.budget_min = -1.0;
        assert!(gig.validate().is_err());
    }

    #[test]
    fn short_title_is_rejected() {
        let mut gig = base_gig();
        gig.title = "ab".to_string();
        assert!(gig.validate().is_err());
    }

    #[test]
    fn tag_filter_splits_and_trims() {
        let query = GigListQuery {
            tags: Some(" rust , backend ,,".to_string()),
            ..Default::default()
        };
        assert_eq!(query.tag_filter(), vec!["rust", "backend"]);
        assert!(GigListQuery::default().tag_filter().is_empty());
    }

    #[test]
    fn page_params_pass_through() {
        let query = GigListQuery {
            limit: Some(5),
            cursor: None,
            ..Default::default()
        };
        assert_eq!(query.page().limit(), 5);
    }
}
