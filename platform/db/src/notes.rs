use chrono::{DateTime, Utc};
use entity::note;
use products_crm::Note;
use products_crm::note::sort_for_display;
use sea_orm::prelude::*;
use sea_orm::{ActiveValue::Set, QueryOrder};
use tracing::instrument;

use crate::convert::{note_active_model, note_from_model, stored};
use crate::{DbError, DbResult, customers};

/// Stores a note built in the domain layer on one of the owner's customers.
#[instrument(
    name = "crm.notes.create",
    skip_all,
    fields(owner = %note.owner_id, customer = %note.customer_id, heading = note.heading())
)]
pub async fn add_note(db: &DatabaseConnection, note: &Note) -> DbResult<()> {
    customers::find_owned(db, note.owner_id, note.customer_id).await?;
    note::Entity::insert(note_active_model(note))
        .exec_without_returning(db)
        .await?;
    Ok(())
}

pub async fn load_note<C: ConnectionTrait>(
    db: &C,
    owner_id: Uuid,
    note_id: Uuid,
) -> DbResult<Note> {
    Ok(note_from_model(find_owned(db, owner_id, note_id).await?))
}

/// Replaces a note's title and content.
#[instrument(name = "crm.notes.update", skip_all, fields(owner = %owner_id, note = %note_id))]
pub async fn edit_note(
    db: &DatabaseConnection,
    owner_id: Uuid,
    note_id: Uuid,
    title: Option<&str>,
    content: &str,
    now: DateTime<Utc>,
) -> DbResult<Note> {
    let existing = find_owned(db, owner_id, note_id).await?;
    let mut current = note_from_model(existing.clone());
    current.edit(title, content, now)?;

    let mut active: note::ActiveModel = existing.into();
    active.title = Set(current.title.clone());
    active.content = Set(current.content.clone());
    active.updated_at = Set(stored(now));
    active.update(db).await?;
    Ok(current)
}

#[instrument(
    name = "crm.notes.pin",
    skip_all,
    fields(owner = %owner_id, note = %note_id, pinned = pinned)
)]
pub async fn pin_note(
    db: &DatabaseConnection,
    owner_id: Uuid,
    note_id: Uuid,
    pinned: bool,
    now: DateTime<Utc>,
) -> DbResult<Note> {
    let existing = find_owned(db, owner_id, note_id).await?;
    let mut current = note_from_model(existing.clone());
    current.set_pinned(pinned, now);

    let mut active: note::ActiveModel = existing.into();
    active.pinned = Set(current.pinned);
    active.updated_at = Set(stored(now));
    active.update(db).await?;
    Ok(current)
}

#[instrument(name = "crm.notes.delete", skip_all, fields(owner = %owner_id, note = %note_id))]
pub async fn delete_note(db: &DatabaseConnection, owner_id: Uuid, note_id: Uuid) -> DbResult<()> {
    let existing = find_owned(db, owner_id, note_id).await?;
    existing.delete(db).await?;
    Ok(())
}

/// A customer's notes, pinned first and newest first within each group.
pub async fn customer_notes<C: ConnectionTrait>(
    db: &C,
    owner_id: Uuid,
    customer_id: Uuid,
) -> DbResult<Vec<Note>> {
    customers::find_owned(db, owner_id, customer_id).await?;
    let mut notes: Vec<Note> = note::Entity::find()
        .filter(note::Column::CustomerId.eq(customer_id))
        .order_by_desc(note::Column::CreatedAt)
        .all(db)
        .await?
        .into_iter()
        .map(note_from_model)
        .collect();
    sort_for_display(&mut notes);
    Ok(notes)
}

async fn find_owned<C: ConnectionTrait>(
    db: &C,
    owner_id: Uuid,
    note_id: Uuid,
) -> DbResult<note::Model> {
    note::Entity::find_by_id(note_id)
        .filter(note::Column::OwnerId.eq(owner_id))
        .one(db)
        .await?
        .ok_or(DbError::NotFound("note"))
}
