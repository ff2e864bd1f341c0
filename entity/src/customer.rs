use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "customer")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub owner_id: Uuid,
    #[sea_orm(indexed)]
    pub funnel_id: Uuid,
    pub name: String,
    pub stage: String,
    pub stage_entered_at: DateTimeWithTimeZone,
    pub estimated_value_cents: i64,
    pub probability: i16,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub last_contact_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::funnel::Entity",
        from = "Column::FunnelId",
        to = "super::funnel::Column::Id",
        on_delete = "Cascade"
    )]
    Funnel,
    #[sea_orm(has_many = "super::activity::Entity")]
    Activity,
    #[sea_orm(has_many = "super::task::Entity")]
    Task,
    #[sea_orm(has_many = "super::note::Entity")]
    Note,
    #[sea_orm(has_many = "super::customer_tag::Entity")]
    CustomerTag,
}

impl Related<super::funnel::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Funnel.def()
    }
}

impl Related<super::activity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Activity.def()
    }
}

impl Related<super::task::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Task.def()
    }
}

impl Related<super::note::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Note.def()
    }
}

impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        super::customer_tag::Relation::Tag.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::customer_tag::Relation::Customer.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
