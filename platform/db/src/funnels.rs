use chrono::{DateTime, Utc};
use entity::funnel;
use products_crm::Funnel;
use sea_orm::prelude::*;
use sea_orm::{ActiveValue::Set, QueryOrder};
use tracing::instrument;

use crate::convert::{funnel_active_model, funnel_from_model, stored};
use crate::{DbError, DbResult};

/// Persists a funnel that was built (and validated) in the domain layer.
#[instrument(
    name = "crm.funnels.create",
    skip_all,
    fields(owner = %funnel.owner_id, stages = funnel.stages().len())
)]
pub async fn create_funnel(
    db: &DatabaseConnection,
    funnel: &Funnel,
    now: DateTime<Utc>,
) -> DbResult<()> {
    insert_funnel(db, funnel, now).await
}

pub(crate) async fn insert_funnel<C: ConnectionTrait>(
    db: &C,
    funnel: &Funnel,
    now: DateTime<Utc>,
) -> DbResult<()> {
    funnel.validate()?;
    funnel::Entity::insert(funnel_active_model(funnel, now)?)
        .exec_without_returning(db)
        .await?;
    Ok(())
}

/// Writes back every editable field of an existing funnel.
#[instrument(name = "crm.funnels.update", skip_all, fields(funnel = %funnel.id))]
pub async fn save_funnel(
    db: &DatabaseConnection,
    funnel: &Funnel,
    now: DateTime<Utc>,
) -> DbResult<()> {
    funnel.validate()?;
    let existing = find_owned(db, funnel.owner_id, funnel.id).await?;
    let fresh = funnel_active_model(funnel, now)?;
    let mut active: funnel::ActiveModel = existing.into();
    active.name = fresh.name;
    active.stages = fresh.stages;
    active.sla_hours = fresh.sla_hours;
    active.conversion_rates = fresh.conversion_rates;
    active.color = fresh.color;
    active.active = fresh.active;
    active.updated_at = Set(stored(now));
    active.update(db).await?;
    Ok(())
}

pub async fn load_funnel<C: ConnectionTrait>(
    db: &C,
    owner_id: Uuid,
    funnel_id: Uuid,
) -> DbResult<Funnel> {
    funnel_from_model(find_owned(db, owner_id, funnel_id).await?)
}

/// The owner's funnels by name. With `active_only`, deactivated funnels are
/// left out.
pub async fn list_funnels<C: ConnectionTrait>(
    db: &C,
    owner_id: Uuid,
    active_only: bool,
) -> DbResult<Vec<Funnel>> {
    let mut query = funnel::Entity::find().filter(funnel::Column::OwnerId.eq(owner_id));
    if active_only {
        query = query.filter(funnel::Column::Active.eq(true));
    }
    query
        .order_by_asc(funnel::Column::Name)
        .all(db)
        .await?
        .into_iter()
        .map(funnel_from_model)
        .collect()
}

pub(crate) async fn find_by_name<C: ConnectionTrait>(
    db: &C,
    owner_id: Uuid,
    name: &str,
) -> DbResult<Option<funnel::Model>> {
    Ok(funnel::Entity::find()
        .filter(funnel::Column::OwnerId.eq(owner_id))
        .filter(funnel::Column::Name.eq(name))
        .one(db)
        .await?)
}

async fn find_owned<C: ConnectionTrait>(
    db: &C,
    owner_id: Uuid,
    funnel_id: Uuid,
) -> DbResult<funnel::Model> {
    funnel::Entity::find_by_id(funnel_id)
        .filter(funnel::Column::OwnerId.eq(owner_id))
        .one(db)
        .await?
        .ok_or(DbError::NotFound("funnel"))
}
