use chrono::{DateTime, Utc};
use entity::{customer_tag, tag};
use products_crm::Tag;
use sea_orm::prelude::*;
use sea_orm::{ActiveValue::Set, QueryOrder};
use tracing::{debug, instrument};

use crate::convert::{tag_active_model, tag_from_model};
use crate::{DbError, DbResult, customers};

/// Stores a tag built in the domain layer. Names are unique per owner.
#[instrument(name = "crm.tags.create", skip_all, fields(owner = %tag.owner_id, tag = %tag.name))]
pub async fn create_tag(db: &DatabaseConnection, tag: &Tag, now: DateTime<Utc>) -> DbResult<()> {
    tag::Entity::insert(tag_active_model(tag, now))
        .exec_without_returning(db)
        .await?;
    Ok(())
}

/// The owner's tags by name.
pub async fn list_tags<C: ConnectionTrait>(db: &C, owner_id: Uuid) -> DbResult<Vec<Tag>> {
    Ok(tag::Entity::find()
        .filter(tag::Column::OwnerId.eq(owner_id))
        .order_by_asc(tag::Column::Name)
        .all(db)
        .await?
        .into_iter()
        .map(tag_from_model)
        .collect())
}

/// Attaches a tag to a customer. Attaching twice is a no-op.
#[instrument(
    name = "crm.tags.attach",
    skip_all,
    fields(owner = %owner_id, customer = %customer_id, tag = %tag_id)
)]
pub async fn tag_customer(
    db: &DatabaseConnection,
    owner_id: Uuid,
    customer_id: Uuid,
    tag_id: Uuid,
) -> DbResult<()> {
    customers::find_owned(db, owner_id, customer_id).await?;
    find_owned(db, owner_id, tag_id).await?;
    let existing = customer_tag::Entity::find_by_id((customer_id, tag_id))
        .one(db)
        .await?;
    if existing.is_some() {
        debug!("tag already attached");
        return Ok(());
    }
    customer_tag::Entity::insert(customer_tag::ActiveModel {
        customer_id: Set(customer_id),
        tag_id: Set(tag_id),
    })
    .exec_without_returning(db)
    .await?;
    Ok(())
}

#[instrument(
    name = "crm.tags.detach",
    skip_all,
    fields(owner = %owner_id, customer = %customer_id, tag = %tag_id)
)]
pub async fn untag_customer(
    db: &DatabaseConnection,
    owner_id: Uuid,
    customer_id: Uuid,
    tag_id: Uuid,
) -> DbResult<()> {
    customers::find_owned(db, owner_id, customer_id).await?;
    customer_tag::Entity::delete_by_id((customer_id, tag_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Tags on one customer, by name.
pub async fn customer_tags<C: ConnectionTrait>(
    db: &C,
    owner_id: Uuid,
    customer_id: Uuid,
) -> DbResult<Vec<Tag>> {
    let owned = customers::find_owned(db, owner_id, customer_id).await?;
    Ok(owned
        .find_related(tag::Entity)
        .order_by_asc(tag::Column::Name)
        .all(db)
        .await?
        .into_iter()
        .map(tag_from_model)
        .collect())
}

async fn find_owned<C: ConnectionTrait>(
    db: &C,
    owner_id: Uuid,
    tag_id: Uuid,
) -> DbResult<tag::Model> {
    tag::Entity::find_by_id(tag_id)
        .filter(tag::Column::OwnerId.eq(owner_id))
        .one(db)
        .await?
        .ok_or(DbError::NotFound("tag"))
}
