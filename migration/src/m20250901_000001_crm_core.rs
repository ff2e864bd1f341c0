use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Funnel::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Funnel::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Funnel::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Funnel::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Funnel::Stages).json().not_null())
                    .col(ColumnDef::new(Funnel::SlaHours).json().not_null())
                    .col(ColumnDef::new(Funnel::ConversionRates).json().not_null())
                    .col(
                        ColumnDef::new(Funnel::Color)
                            .string_len(7)
                            .not_null()
                            .default("#007bff"),
                    )
                    .col(
                        ColumnDef::new(Funnel::Active)
                            .boolean()
                            .not_null()
                            .default(Expr::value(true)),
                    )
                    .col(&mut timestamp(Funnel::CreatedAt))
                    .col(&mut timestamp(Funnel::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_funnel_owner_name")
                    .table(Funnel::Table)
                    .col(Funnel::OwnerId)
                    .col(Funnel::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Customer::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Customer::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Customer::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Customer::FunnelId).uuid().not_null())
                    .col(ColumnDef::new(Customer::Name).string_len(200).not_null())
                    .col(ColumnDef::new(Customer::Stage).string_len(100).not_null())
                    .col(&mut timestamp(Customer::StageEnteredAt))
                    .col(
                        ColumnDef::new(Customer::EstimatedValueCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Customer::Probability)
                            .small_integer()
                            .not_null()
                            .default(50),
                    )
                    .col(ColumnDef::new(Customer::Company).string_len(200))
                    .col(ColumnDef::new(Customer::Email).string_len(254))
                    .col(ColumnDef::new(Customer::Phone).string_len(20))
                    .col(ColumnDef::new(Customer::LastContactAt).timestamp_with_time_zone())
                    .col(&mut timestamp(Customer::CreatedAt))
                    .col(&mut timestamp(Customer::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_customer_funnel")
                            .from(Customer::Table, Customer::FunnelId)
                            .to(Funnel::Table, Funnel::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_customer_owner_funnel_stage")
                    .table(Customer::Table)
                    .col(Customer::OwnerId)
                    .col(Customer::FunnelId)
                    .col(Customer::Stage)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_customer_stage_entered_at")
                    .table(Customer::Table)
                    .col(Customer::StageEnteredAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Task::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Task::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Task::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Task::CustomerId).uuid())
                    .col(ColumnDef::new(Task::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Task::Description).text())
                    .col(
                        ColumnDef::new(Task::Kind)
                            .string_len(32)
                            .not_null()
                            .default("other"),
                    )
                    .col(
                        ColumnDef::new(Task::Status)
                            .string_len(32)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Task::Priority)
                            .string_len(16)
                            .not_null()
                            .default("medium"),
                    )
                    .col(&mut timestamp(Task::DueAt))
                    .col(ColumnDef::new(Task::CompletedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Task::EstimatedMinutes).integer())
                    .col(ColumnDef::new(Task::SpentMinutes).integer())
                    .col(&mut timestamp(Task::CreatedAt))
                    .col(&mut timestamp(Task::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_task_customer")
                            .from(Task::Table, Task::CustomerId)
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
                    .name("idx_task_owner_status")
                    .table(Task::Table)
                    .col(Task::OwnerId)
                    .col(Task::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_task_due_at")
                    .table(Task::Table)
                    .col(Task::DueAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Activity::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Activity::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Activity::CustomerId).uuid().not_null())
                    .col(ColumnDef::new(Activity::ActorId).uuid().not_null())
                    .col(ColumnDef::new(Activity::Kind).string_len(32).not_null())
                    .col(ColumnDef::new(Activity::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Activity::Description).text().not_null())
                    .col(ColumnDef::new(Activity::Outcome).string_len(32))
                    .col(ColumnDef::new(Activity::DurationMinutes).integer())
                    .col(ColumnDef::new(Activity::TaskId).uuid())
                    .col(ColumnDef::new(Activity::MetaJson).json().not_null())
                    .col(&mut timestamp(Activity::OccurredAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_activity_customer")
                            .from(Activity::Table, Activity::CustomerId)
                            .to(Customer::Table, Customer::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_activity_task")
                            .from(Activity::Table, Activity::TaskId)
                            .to(Task::Table, Task::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_activity_customer_occurred")
                    .table(Activity::Table)
                    .col(Activity::CustomerId)
                    .col(Activity::OccurredAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Activity::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Task::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Customer::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Funnel::Table).if_exists().to_owned())
            .await
    }
}

fn timestamp<C: IntoIden>(col: C) -> ColumnDef {
    let mut column = ColumnDef::new(col);
    column.timestamp_with_time_zone().not_null();
    column
}

#[derive(DeriveIden)]
enum Funnel {
    Table,
    Id,
    OwnerId,
    Name,
    Stages,
    SlaHours,
    ConversionRates,
    Color,
    Active,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Customer {
    Table,
    Id,
    OwnerId,
    FunnelId,
    Name,
    Stage,
    StageEnteredAt,
    EstimatedValueCents,
    Probability,
    Company,
    Email,
    Phone,
    LastContactAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Activity {
    Table,
    Id,
    CustomerId,
    ActorId,
    Kind,
    Title,
    Description,
    Outcome,
    DurationMinutes,
    TaskId,
    MetaJson,
    OccurredAt,
}

#[derive(DeriveIden)]
enum Task {
    Table,
    Id,
    OwnerId,
    CustomerId,
    Title,
    Description,
    Kind,
    Status,
    Priority,
    DueAt,
    CompletedAt,
    EstimatedMinutes,
    SpentMinutes,
    CreatedAt,
    UpdatedAt,
}
