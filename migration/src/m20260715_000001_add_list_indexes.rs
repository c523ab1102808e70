use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Gigs {
    Table,
    Status,
    FounderId,
    CreatedAt,
    Id,
}

#[derive(DeriveIden)]
enum Proposals {
    Table,
    GigId,
    FreelancerId,
    CreatedAt,
    Id,
}

#[derive(DeriveIden)]
enum Contracts {
    Table,
    FounderId,
    FreelancerId,
    CreatedAt,
    Id,
}

#[derive(DeriveIden)]
enum Messages {
    Table,
    ContractId,
    ServiceRequestId,
    RecipientId,
    ReadAt,
    CreatedAt,
    Id,
}

#[derive(DeriveIden)]
enum Notifications {
    Table,
    UserId,
    CreatedAt,
    Id,
}

#[derive(DeriveIden)]
enum Ratings {
    Table,
    RevieweeId,
    CreatedAt,
    Id,
}

/// Covering indexes for the keyset listings: each one matches a listing's
/// filter column(s) followed by the `(created_at, id)` order key.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_gigs_status_created_at_id")
                    .table(Gigs::Table)
                    .col(Gigs::Status)
                    .col(Gigs::CreatedAt)
                    .col(Gigs::Id)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_gigs_founder_created_at_id")
                    .table(Gigs::Table)
                    .col(Gigs::FounderId)
                    .col(Gigs::CreatedAt)
                    .col(Gigs::Id)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_proposals_gig_created_at_id")
                    .table(Proposals::Table)
                    .col(Proposals::GigId)
                    .col(Proposals::CreatedAt)
                    .col(Proposals::Id)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_proposals_freelancer_created_at_id")
                    .table(Proposals::Table)
                    .col(Proposals::FreelancerId)
                    .col(Proposals::CreatedAt)
                    .col(Proposals::Id)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_contracts_founder_created_at_id")
                    .table(Contracts::Table)
                    .col(Contracts::FounderId)
                    .col(Contracts::CreatedAt)
                    .col(Contracts::Id)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_contracts_freelancer_created_at_id")
                    .table(Contracts::Table)
                    .col(Contracts::FreelancerId)
                    .col(Contracts::CreatedAt)
                    .col(Contracts::Id)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_messages_contract_created_at_id")
                    .table(Messages::Table)
                    .col(Messages::ContractId)
                    .col(Messages::CreatedAt)
                    .col(Messages::Id)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_messages_request_created_at_id")
                    .table(Messages::Table)
                    .col(Messages::ServiceRequestId)
                    .col(Messages::CreatedAt)
                    .col(Messages::Id)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_messages_recipient_read_at")
                    .table(Messages::Table)
                    .col(Messages::RecipientId)
                    .col(Messages::ReadAt)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_notifications_user_created_at_id")
                    .table(Notifications::Table)
                    .col(Notifications::UserId)
                    .col(Notifications::CreatedAt)
                    .col(Notifications::Id)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_ratings_reviewee_created_at_id")
                    .table(Ratings::Table)
                    .col(Ratings::RevieweeId)
                    .col(Ratings::CreatedAt)
                    .col(Ratings::Id)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (table, name) in [
            ("gigs", "idx_gigs_status_created_at_id"),
            ("gigs", "idx_gigs_founder_created_at_id"),
            ("proposals", "idx_proposals_gig_created_at_id"),
            ("proposals", "idx_proposals_freelancer_created_at_id"),
            ("contracts", "idx_contracts_founder_created_at_id"),
            ("contracts", "idx_contracts_freelancer_created_at_id"),
            ("messages", "idx_messages_contract_created_at_id"),
            ("messages", "idx_messages_request_created_at_id"),
            ("messages", "idx_messages_recipient_read_at"),
            ("notifications", "idx_notifications_user_created_at_id"),
            ("ratings", "idx_ratings_reviewee_created_at_id"),
        ] {
            manager
                .drop_index(
                    Index::drop()
                        .name(name)
                        .table(Alias::new(table))
                        .to_owned(),
                )
                .await?;
        }
        Ok(())
    }
}
