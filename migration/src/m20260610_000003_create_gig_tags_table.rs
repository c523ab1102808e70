use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum GigTags {
    Table,
    GigId,
    Tag,
}

#[derive(DeriveIden)]
enum Gigs {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GigTags::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(GigTags::GigId).uuid().not_null())
                    .col(ColumnDef::new(GigTags::Tag).string().not_null())
                    .primary_key(
                        Index::create()
                            .name("pk_gig_tags")
                            .col(GigTags::GigId)
                            .col(GigTags::Tag),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_gig_tags_gig_id")
                            .from(GigTags::Table, GigTags::GigId)
                            .to(Gigs::Table, Gigs::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Tag filtering resolves gig ids by tag before the main gig query.
        manager
            .create_index(
                Index::create()
                    .name("idx_gig_tags_tag")
                    .table(GigTags::Table)
                    .col(GigTags::Tag)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GigTags::Table).to_owned())
            .await
    }
}
