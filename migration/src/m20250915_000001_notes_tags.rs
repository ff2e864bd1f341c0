use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Note::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Note::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Note::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Note::CustomerId).uuid().not_null())
                    .col(ColumnDef::new(Note::Title).string_len(200))
                    .col(ColumnDef::new(Note::Content).text().not_null())
                    .col(
                        ColumnDef::new(Note::Pinned)
                            .boolean()
                            .not_null()
                            .default(Expr::value(false)),
                    )
                    .col(&mut timestamp(Note::CreatedAt))
                    .col(&mut timestamp(Note::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_note_customer")
                            .from(Note::Table, Note::CustomerId)
                            .to(Customer::Table, Customer::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_note_customer_pinned")
                    .table(Note::Table)
                    .col(Note::CustomerId)
                    .col(Note::Pinned)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tag::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Tag::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Tag::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Tag::Name).string_len(50).not_null())
                    .col(
                        ColumnDef::new(Tag::Color)
                            .string_len(7)
                            .not_null()
                            .default("#6c757d"),
                    )
                    .col(&mut timestamp(Tag::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tag_owner_name")
                    .table(Tag::Table)
                    .col(Tag::OwnerId)
                    .col(Tag::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CustomerTag::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(CustomerTag::CustomerId).uuid().not_null())
                    .col(ColumnDef::new(CustomerTag::TagId).uuid().not_null())
                    .primary_key(
                        Index::create()
                            .col(CustomerTag::CustomerId)
                            .col(CustomerTag::TagId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_customer_tag_customer")
                            .from(CustomerTag::Table, CustomerTag::CustomerId)
                            .to(Customer::Table, Customer::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_customer_tag_tag")
                            .from(CustomerTag::Table, CustomerTag::TagId)
                            .to(Tag::Table, Tag::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CustomerTag::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tag::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Note::Table).if_exists().to_owned())
            .await
    }
}

fn timestamp<C: IntoIden>(col: C) -> ColumnDef {
    let mut column = ColumnDef::new(col);
    column.timestamp_with_time_zone().not_null();
    column
}

#[derive(DeriveIden)]
enum Customer {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Note {
    Table,
    Id,
    OwnerId,
    CustomerId,
    Title,
    Content,
    Pinned,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Tag {
    Table,
    Id,
    OwnerId,
    Name,
    Color,
    CreatedAt,
}

#[derive(DeriveIden)]
enum CustomerTag {
    Table,
    CustomerId,
    TagId,
}
