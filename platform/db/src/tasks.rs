use chrono::{DateTime, Utc};
use entity::{activity, task};
use products_crm::{Task, TaskStatus};
use sea_orm::prelude::*;
use sea_orm::{ActiveValue::Set, QueryOrder, TransactionTrait};
use tracing::{debug, instrument};

use crate::convert::{
    activity_active_model, stored, task_active_model, task_from_model, task_status_to_record,
};
use crate::customers;
use crate::{DbError, DbResult};

#[instrument(
    name = "crm.tasks.create",
    skip_all,
    fields(
        owner = %task.owner_id,
        kind = task.kind.as_str(),
        status = task.status.as_str(),
        priority = task.priority.as_str()
    )
)]
pub async fn create_task(
    db: &DatabaseConnection,
    task: &Task,
    now: DateTime<Utc>,
) -> DbResult<()> {
    if let Some(customer_id) = task.customer_id {
        customers::find_owned(db, task.owner_id, customer_id).await?;
    }
    task::Entity::insert(task_active_model(task, now)?)
        .exec_without_returning(db)
        .await?;
    Ok(())
}

pub async fn load_task<C: ConnectionTrait>(
    db: &C,
    owner_id: Uuid,
    task_id: Uuid,
) -> DbResult<Task> {
    task_from_model(find_owned(db, owner_id, task_id).await?)
}

/// The owner's tasks by due date, optionally narrowed to one status.
pub async fn list_tasks<C: ConnectionTrait>(
    db: &C,
    owner_id: Uuid,
    status: Option<TaskStatus>,
) -> DbResult<Vec<Task>> {
    let mut query = task::Entity::find().filter(task::Column::OwnerId.eq(owner_id));
    if let Some(status) = status {
        query = query.filter(task::Column::Status.eq(task_status_to_record(status)));
    }
    query
        .order_by_asc(task::Column::DueAt)
        .all(db)
        .await?
        .into_iter()
        .map(task_from_model)
        .collect()
}

/// Board move: applies the new status and, for tasks linked to a customer,
/// writes the move to that customer's activity trail in the same transaction.
#[instrument(
    name = "crm.tasks.transition",
    skip_all,
    fields(owner = %owner_id, task = %task_id, status = next.as_str())
)]
pub async fn set_task_status(
    db: &DatabaseConnection,
    owner_id: Uuid,
    task_id: Uuid,
    next: TaskStatus,
    actor_id: Uuid,
    now: DateTime<Utc>,
) -> DbResult<Task> {
    let txn = db.begin().await?;
    let existing = find_owned(&txn, owner_id, task_id).await?;
    let mut current = task_from_model(existing.clone())?;
    let entry = current.move_to(next, actor_id, now);

    persist_status(&txn, existing, &current, now).await?;
    if let Some(entry) = entry {
        activity::Entity::insert(activity_active_model(&entry)?)
            .exec_without_returning(&txn)
            .await?;
    }
    txn.commit().await?;
    Ok(current)
}

/// Calendar checkbox: done tasks reopen, anything else completes.
#[instrument(name = "crm.tasks.toggle", skip_all, fields(owner = %owner_id, task = %task_id))]
pub async fn toggle_task(
    db: &DatabaseConnection,
    owner_id: Uuid,
    task_id: Uuid,
    now: DateTime<Utc>,
) -> DbResult<Task> {
    let existing = find_owned(db, owner_id, task_id).await?;
    let mut current = task_from_model(existing.clone())?;
    let status = current.toggle_completion(now);
    persist_status(db, existing, &current, now).await?;
    debug!(status = status.as_str(), "task toggled");
    Ok(current)
}

async fn persist_status<C: ConnectionTrait>(
    db: &C,
    existing: task::Model,
    current: &Task,
    now: DateTime<Utc>,
) -> DbResult<()> {
    let mut active: task::ActiveModel = existing.into();
    active.status = Set(task_status_to_record(current.status));
    active.completed_at = Set(current.completed_at.map(stored));
    active.updated_at = Set(stored(now));
    active.update(db).await?;
    Ok(())
}

pub(crate) async fn find_owned<C: ConnectionTrait>(
    db: &C,
    owner_id: Uuid,
    task_id: Uuid,
) -> DbResult<task::Model> {
    task::Entity::find_by_id(task_id)
        .filter(task::Column::OwnerId.eq(owner_id))
        .one(db)
        .await?
        .ok_or(DbError::NotFound("task"))
}
