use chrono::{DateTime, Utc};
use entity::{activity, customer};
use products_crm::{ActivityEntry, NewInteraction, log_interaction};
use sea_orm::prelude::*;
use sea_orm::{ActiveValue::Set, QueryOrder, TransactionTrait};
use tracing::{info, instrument};

use crate::convert::{activity_active_model, activity_from_model, customer_from_model, stored};
use crate::{DbError, DbResult, customers, tasks};

/// Records a hand-logged interaction and stamps the customer's last contact
/// in one transaction. A linked task must belong to the same owner.
#[instrument(
    name = "crm.activities.log",
    skip_all,
    fields(owner = %owner_id, customer = %customer_id, kind = input.kind.as_str())
)]
pub async fn log_activity(
    db: &DatabaseConnection,
    owner_id: Uuid,
    customer_id: Uuid,
    input: NewInteraction,
    actor_id: Uuid,
    now: DateTime<Utc>,
) -> DbResult<ActivityEntry> {
    let txn = db.begin().await?;
    let existing = customers::find_owned(&txn, owner_id, customer_id).await?;
    if let Some(task_id) = input.task_id {
        let linked = tasks::find_owned(&txn, owner_id, task_id).await?;
        if linked.customer_id.is_some_and(|id| id != customer_id) {
            return Err(DbError::NotFound("task"));
        }
    }
    let mut current = customer_from_model(existing.clone())?;
    let entry = log_interaction(&mut current, input, actor_id, now)?;

    let mut active: customer::ActiveModel = existing.into();
    active.last_contact_at = Set(current.last_contact_at.map(stored));
    active.updated_at = Set(stored(now));
    active.update(&txn).await?;

    activity::Entity::insert(activity_active_model(&entry)?)
        .exec_without_returning(&txn)
        .await?;
    txn.commit().await?;

    info!(activity = %entry.id, "activity logged");
    Ok(entry)
}

/// Activity trail for one customer, oldest first.
pub async fn customer_activities<C: ConnectionTrait>(
    db: &C,
    owner_id: Uuid,
    customer_id: Uuid,
) -> DbResult<Vec<ActivityEntry>> {
    customers::find_owned(db, owner_id, customer_id).await?;
    activity::Entity::find()
        .filter(activity::Column::CustomerId.eq(customer_id))
        .order_by_asc(activity::Column::OccurredAt)
        .all(db)
        .await?
        .into_iter()
        .map(activity_from_model)
        .collect()
}

/// Activities linked to one task, oldest first.
pub async fn task_activities<C: ConnectionTrait>(
    db: &C,
    owner_id: Uuid,
    task_id: Uuid,
) -> DbResult<Vec<ActivityEntry>> {
    tasks::find_owned(db, owner_id, task_id).await?;
    activity::Entity::find()
        .filter(activity::Column::TaskId.eq(task_id))
        .order_by_asc(activity::Column::OccurredAt)
        .all(db)
        .await?
        .into_iter()
        .map(activity_from_model)
        .collect()
}
