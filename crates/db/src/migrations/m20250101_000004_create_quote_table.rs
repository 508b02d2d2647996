//! Create quote table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Quote::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Quote::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Quote::State).string_len(16).not_null().default("pending"))
                    .col(ColumnDef::new(Quote::Text).text().not_null())
                    .col(ColumnDef::new(Quote::Context).string_len(256))
                    .col(ColumnDef::new(Quote::Note).string_len(256))
                    .col(ColumnDef::new(Quote::OriginatorId).string_len(32).not_null())
                    .col(ColumnDef::new(Quote::ClassId).string_len(32))
                    // created_by / approved_by carry no foreign key so that
                    // removing an account keeps submission history intact.
                    .col(ColumnDef::new(Quote::CreatedBy).string_len(32).not_null())
                    .col(ColumnDef::new(Quote::ApprovedBy).string_len(32))
                    .col(
                        ColumnDef::new(Quote::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Quote::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Index: originator_id (for filtering quotes by person)
        manager
            .create_index(
                Index::create()
                    .name("idx_quote_originator_id")
                    .table(Quote::Table)
                    .col(Quote::OriginatorId)
                    .to_owned(),
            )
            .await?;

        // Index: (state, class_id) - for listings and the public classless pool
        manager
            .create_index(
                Index::create()
                    .name("idx_quote_state_class_id")
                    .table(Quote::Table)
                    .col(Quote::State)
                    .col(Quote::ClassId)
                    .to_owned(),
            )
            .await?;

        // Index: class_id
        manager
            .create_index(
                Index::create()
                    .name("idx_quote_class_id")
                    .table(Quote::Table)
                    .col(Quote::ClassId)
                    .to_owned(),
            )
            .await?;

        // Index: created_by (for owner visibility checks)
        manager
            .create_index(
                Index::create()
                    .name("idx_quote_created_by")
                    .table(Quote::Table)
                    .col(Quote::CreatedBy)
                    .to_owned(),
            )
            .await?;

        // Index: created_at
        manager
            .create_index(
                Index::create()
                    .name("idx_quote_created_at")
                    .table(Quote::Table)
                    .col(Quote::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Foreign key: originator_id -> person.id
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_quote_originator_id")
                    .from(Quote::Table, Quote::OriginatorId)
                    .to(Person::Table, Person::Id)
                    .on_delete(ForeignKeyAction::Restrict)
                    .to_owned(),
            )
            .await?;

        // Foreign key: class_id -> class.id
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_quote_class_id")
                    .from(Quote::Table, Quote::ClassId)
                    .to(Class::Table, Class::Id)
                    .on_delete(ForeignKeyAction::SetNull)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Quote::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Quote {
    Table,
    Id,
    State,
    Text,
    Context,
    Note,
    OriginatorId,
    ClassId,
    CreatedBy,
    ApprovedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Person {
    Table,
    Id,
}

#[derive(Iden)]
enum Class {
    Table,
    Id,
}
