use chrono::{DateTime, Utc};
use entity::{activity, customer};
use products_crm::{Customer, NewCustomer, StageTransition, move_stage};
use sea_orm::prelude::*;
use sea_orm::{ActiveValue::Set, QueryOrder, TransactionTrait};
use tracing::{info, instrument};

use crate::convert::{activity_active_model, customer_active_model, customer_from_model, stored};
use crate::funnels::load_funnel;
use crate::{DbError, DbResult};

/// Places a new customer in one of the owner's funnels.
#[instrument(
    name = "crm.customers.create",
    skip_all,
    fields(owner = %owner_id, funnel = %funnel_id)
)]
pub async fn create_customer(
    db: &DatabaseConnection,
    owner_id: Uuid,
    funnel_id: Uuid,
    input: NewCustomer,
    now: DateTime<Utc>,
) -> DbResult<Customer> {
    let funnel = load_funnel(db, owner_id, funnel_id).await?;
    let customer = Customer::new(owner_id, &funnel, input, now)?;
    customer::Entity::insert(customer_active_model(&customer, now))
        .exec_without_returning(db)
        .await?;
    Ok(customer)
}

pub async fn load_customer<C: ConnectionTrait>(
    db: &C,
    owner_id: Uuid,
    customer_id: Uuid,
) -> DbResult<Customer> {
    customer_from_model(find_owned(db, owner_id, customer_id).await?)
}

pub async fn list_customers<C: ConnectionTrait>(
    db: &C,
    owner_id: Uuid,
    funnel_id: Option<Uuid>,
) -> DbResult<Vec<Customer>> {
    let mut query = customer::Entity::find().filter(customer::Column::OwnerId.eq(owner_id));
    if let Some(funnel_id) = funnel_id {
        query = query.filter(customer::Column::FunnelId.eq(funnel_id));
    }
    query
        .order_by_asc(customer::Column::StageEnteredAt)
        .all(db)
        .await?
        .into_iter()
        .map(customer_from_model)
        .collect()
}

/// Moves a customer to `to_stage`, optionally into another funnel, and
/// records the audit entry in the same transaction. Nothing is written when
/// the stage does not belong to the destination funnel.
#[instrument(
    name = "crm.customers.move_stage",
    skip_all,
    fields(owner = %owner_id, customer = %customer_id, to_stage = %to_stage)
)]
pub async fn move_customer_stage(
    db: &DatabaseConnection,
    owner_id: Uuid,
    customer_id: Uuid,
    to_funnel_id: Option<Uuid>,
    to_stage: &str,
    actor_id: Uuid,
    now: DateTime<Utc>,
) -> DbResult<StageTransition> {
    let txn = db.begin().await?;
    let existing = find_owned(&txn, owner_id, customer_id).await?;
    let mut current = customer_from_model(existing.clone())?;
    let destination_id = to_funnel_id.unwrap_or(current.funnel_id);
    let destination = load_funnel(&txn, owner_id, destination_id).await?;

    let transition = move_stage(&mut current, &destination, to_stage, actor_id, now)?;

    let mut active: customer::ActiveModel = existing.into();
    active.funnel_id = Set(current.funnel_id);
    active.stage = Set(current.stage.clone());
    active.stage_entered_at = Set(stored(current.stage_entered_at));
    active.updated_at = Set(stored(now));
    active.update(&txn).await?;

    activity::Entity::insert(activity_active_model(&transition.activity)?)
        .exec_without_returning(&txn)
        .await?;
    txn.commit().await?;

    info!(
        from = %transition.from_stage,
        changed_funnel = transition.changed_funnel(),
        "customer stage persisted"
    );
    Ok(transition)
}

pub(crate) async fn find_owned<C: ConnectionTrait>(
    db: &C,
    owner_id: Uuid,
    customer_id: Uuid,
) -> DbResult<customer::Model> {
    customer::Entity::find_by_id(customer_id)
        .filter(customer::Column::OwnerId.eq(owner_id))
        .one(db)
        .await?
        .ok_or(DbError::NotFound("customer"))
}
