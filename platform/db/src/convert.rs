//! Mapping between sea-orm records and domain values.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use entity::{activity, customer, funnel, note, tag, task};
use products_crm::{
    ActivityEntry, ActivityKind, ActivityResult, Customer, Funnel, Note, Tag, Task, TaskKind,
    TaskPriority, TaskStatus,
};
use sea_orm::ActiveValue::Set;
use sea_orm::prelude::{DateTimeWithTimeZone, Json};
use serde::de::DeserializeOwned;

use crate::{DbError, DbResult};

pub(crate) fn utc(value: DateTimeWithTimeZone) -> DateTime<Utc> {
    value.with_timezone(&Utc)
}

pub(crate) fn stored(value: DateTime<Utc>) -> DateTimeWithTimeZone {
    value.into()
}

fn decode<T: DeserializeOwned>(field: &str, value: Json) -> DbResult<T> {
    serde_json::from_value(value)
        .map_err(|err| DbError::InvalidRecord(format!("funnel.{field}: {err}")))
}

fn encode<T: serde::Serialize + ?Sized>(value: &T) -> DbResult<Json> {
    serde_json::to_value(value).map_err(|err| DbError::InvalidRecord(err.to_string()))
}

pub(crate) fn funnel_from_model(model: funnel::Model) -> DbResult<Funnel> {
    let stages: Vec<String> = decode("stages", model.stages)?;
    let sla_hours: BTreeMap<String, u32> = decode("sla_hours", model.sla_hours)?;
    let conversion_rates: BTreeMap<String, u8> =
        decode("conversion_rates", model.conversion_rates)?;
    Ok(Funnel::from_parts_unchecked(
        model.id,
        model.owner_id,
        model.name,
        stages,
        sla_hours,
        conversion_rates,
        model.color,
        model.active,
    ))
}

pub(crate) fn funnel_active_model(
    funnel: &Funnel,
    now: DateTime<Utc>,
) -> DbResult<funnel::ActiveModel> {
    Ok(funnel::ActiveModel {
        id: Set(funnel.id),
        owner_id: Set(funnel.owner_id),
        name: Set(funnel.name.clone()),
        stages: Set(encode(funnel.stages())?),
        sla_hours: Set(encode(funnel.sla_hours())?),
        conversion_rates: Set(encode(funnel.conversion_rates())?),
        color: Set(funnel.color.clone()),
        active: Set(funnel.active),
        created_at: Set(stored(now)),
        updated_at: Set(stored(now)),
    })
}

pub(crate) fn customer_from_model(model: customer::Model) -> DbResult<Customer> {
    let probability = u8::try_from(model.probability)
        .ok()
        .filter(|p| *p <= 100)
        .ok_or_else(|| {
            DbError::InvalidRecord(format!("customer.probability: {}", model.probability))
        })?;
    Ok(Customer {
        id: model.id,
        owner_id: model.owner_id,
        funnel_id: model.funnel_id,
        name: model.name,
        stage: model.stage,
        stage_entered_at: utc(model.stage_entered_at),
        estimated_value_cents: model.estimated_value_cents,
        probability,
        company: model.company,
        email: model.email,
        phone: model.phone,
        last_contact_at: model.last_contact_at.map(utc),
    })
}

pub(crate) fn customer_active_model(
    customer: &Customer,
    now: DateTime<Utc>,
) -> customer::ActiveModel {
    customer::ActiveModel {
        id: Set(customer.id),
        owner_id: Set(customer.owner_id),
        funnel_id: Set(customer.funnel_id),
        name: Set(customer.name.clone()),
        stage: Set(customer.stage.clone()),
        stage_entered_at: Set(stored(customer.stage_entered_at)),
        estimated_value_cents: Set(customer.estimated_value_cents),
        probability: Set(i16::from(customer.probability)),
        company: Set(customer.company.clone()),
        email: Set(customer.email.clone()),
        phone: Set(customer.phone.clone()),
        last_contact_at: Set(customer.last_contact_at.map(stored)),
        created_at: Set(stored(now)),
        updated_at: Set(stored(now)),
    }
}

pub(crate) fn activity_kind_to_record(kind: ActivityKind) -> activity::Kind {
    match kind {
        ActivityKind::StageChange => activity::Kind::StageChange,
        ActivityKind::TaskMove => activity::Kind::TaskMove,
        ActivityKind::Call => activity::Kind::Call,
        ActivityKind::Email => activity::Kind::Email,
        ActivityKind::Meeting => activity::Kind::Meeting,
        ActivityKind::Proposal => activity::Kind::Proposal,
        ActivityKind::Contract => activity::Kind::Contract,
        ActivityKind::Visit => activity::Kind::Visit,
        ActivityKind::Note => activity::Kind::Note,
        ActivityKind::Whatsapp => activity::Kind::Whatsapp,
        ActivityKind::Other => activity::Kind::Other,
    }
}

fn activity_kind_from_record(kind: activity::Kind) -> ActivityKind {
    match kind {
        activity::Kind::StageChange => ActivityKind::StageChange,
        activity::Kind::TaskMove => ActivityKind::TaskMove,
        activity::Kind::Call => ActivityKind::Call,
        activity::Kind::Email => ActivityKind::Email,
        activity::Kind::Meeting => ActivityKind::Meeting,
        activity::Kind::Proposal => ActivityKind::Proposal,
        activity::Kind::Contract => ActivityKind::Contract,
        activity::Kind::Visit => ActivityKind::Visit,
        activity::Kind::Note => ActivityKind::Note,
        activity::Kind::Whatsapp => ActivityKind::Whatsapp,
        activity::Kind::Other => ActivityKind::Other,
    }
}

fn result_to_record(result: ActivityResult) -> activity::Outcome {
    match result {
        ActivityResult::Success => activity::Outcome::Success,
        ActivityResult::NoAnswer => activity::Outcome::NoAnswer,
        ActivityResult::Reschedule => activity::Outcome::Reschedule,
        ActivityResult::Negative => activity::Outcome::Negative,
        ActivityResult::Other => activity::Outcome::Other,
    }
}

fn result_from_record(outcome: activity::Outcome) -> ActivityResult {
    match outcome {
        activity::Outcome::Success => ActivityResult::Success,
        activity::Outcome::NoAnswer => ActivityResult::NoAnswer,
        activity::Outcome::Reschedule => ActivityResult::Reschedule,
        activity::Outcome::Negative => ActivityResult::Negative,
        activity::Outcome::Other => ActivityResult::Other,
    }
}

pub(crate) fn activity_active_model(entry: &ActivityEntry) -> DbResult<activity::ActiveModel> {
    Ok(activity::ActiveModel {
        id: Set(entry.id),
        customer_id: Set(entry.customer_id),
        actor_id: Set(entry.actor_id),
        kind: Set(activity_kind_to_record(entry.kind)),
        title: Set(entry.title.clone()),
        description: Set(entry.description.clone()),
        outcome: Set(entry.result.map(result_to_record)),
        duration_minutes: Set(minutes_to_db(
            "activity",
            "duration_minutes",
            entry.duration_minutes,
        )?),
        task_id: Set(entry.task_id),
        meta_json: Set(entry.meta.clone()),
        occurred_at: Set(stored(entry.occurred_at)),
    })
}

pub(crate) fn activity_from_model(model: activity::Model) -> DbResult<ActivityEntry> {
    Ok(ActivityEntry {
        id: model.id,
        customer_id: model.customer_id,
        actor_id: model.actor_id,
        kind: activity_kind_from_record(model.kind),
        title: model.title,
        description: model.description,
        result: model.outcome.map(result_from_record),
        duration_minutes: minutes_from_db("activity", "duration_minutes", model.duration_minutes)?,
        task_id: model.task_id,
        meta: model.meta_json,
        occurred_at: utc(model.occurred_at),
    })
}

pub(crate) fn task_status_to_record(status: TaskStatus) -> task::Status {
    match status {
        TaskStatus::Pending => task::Status::Pending,
        TaskStatus::InProgress => task::Status::InProgress,
        TaskStatus::Done => task::Status::Done,
        TaskStatus::Cancelled => task::Status::Cancelled,
    }
}

fn task_status_from_record(status: task::Status) -> TaskStatus {
    match status {
        task::Status::Pending => TaskStatus::Pending,
        task::Status::InProgress => TaskStatus::InProgress,
        task::Status::Done => TaskStatus::Done,
        task::Status::Cancelled => TaskStatus::Cancelled,
    }
}

fn task_priority_to_record(priority: TaskPriority) -> task::Priority {
    match priority {
        TaskPriority::Low => task::Priority::Low,
        TaskPriority::Medium => task::Priority::Medium,
        TaskPriority::High => task::Priority::High,
        TaskPriority::Urgent => task::Priority::Urgent,
    }
}

fn task_priority_from_record(priority: task::Priority) -> TaskPriority {
    match priority {
        task::Priority::Low => TaskPriority::Low,
        task::Priority::Medium => TaskPriority::Medium,
        task::Priority::High => TaskPriority::High,
        task::Priority::Urgent => TaskPriority::Urgent,
    }
}

fn task_kind_to_record(kind: TaskKind) -> task::Kind {
    match kind {
        TaskKind::Call => task::Kind::Call,
        TaskKind::Email => task::Kind::Email,
        TaskKind::Meeting => task::Kind::Meeting,
        TaskKind::Proposal => task::Kind::Proposal,
        TaskKind::FollowUp => task::Kind::FollowUp,
        TaskKind::Negotiation => task::Kind::Negotiation,
        TaskKind::Visit => task::Kind::Visit,
        TaskKind::Presentation => task::Kind::Presentation,
        TaskKind::Other => task::Kind::Other,
    }
}

fn task_kind_from_record(kind: task::Kind) -> TaskKind {
    match kind {
        task::Kind::Call => TaskKind::Call,
        task::Kind::Email => TaskKind::Email,
        task::Kind::Meeting => TaskKind::Meeting,
        task::Kind::Proposal => TaskKind::Proposal,
        task::Kind::FollowUp => TaskKind::FollowUp,
        task::Kind::Negotiation => TaskKind::Negotiation,
        task::Kind::Visit => TaskKind::Visit,
        task::Kind::Presentation => TaskKind::Presentation,
        task::Kind::Other => TaskKind::Other,
    }
}

fn minutes_from_db(table: &str, field: &str, value: Option<i32>) -> DbResult<Option<u32>> {
    value
        .map(|m| {
            u32::try_from(m)
                .map_err(|_| DbError::InvalidRecord(format!("{table}.{field}: {m}")))
        })
        .transpose()
}

fn minutes_to_db(table: &str, field: &str, value: Option<u32>) -> DbResult<Option<i32>> {
    value
        .map(|m| {
            i32::try_from(m)
                .map_err(|_| DbError::InvalidRecord(format!("{table}.{field}: {m}")))
        })
        .transpose()
}

pub(crate) fn task_from_model(model: task::Model) -> DbResult<Task> {
    Ok(Task {
        id: model.id,
        owner_id: model.owner_id,
        customer_id: model.customer_id,
        title: model.title,
        description: model.description,
        kind: task_kind_from_record(model.kind),
        status: task_status_from_record(model.status),
        priority: task_priority_from_record(model.priority),
        due_at: utc(model.due_at),
        completed_at: model.completed_at.map(utc),
        estimated_minutes: minutes_from_db("task", "estimated_minutes", model.estimated_minutes)?,
        spent_minutes: minutes_from_db("task", "spent_minutes", model.spent_minutes)?,
    })
}

pub(crate) fn task_active_model(task: &Task, now: DateTime<Utc>) -> DbResult<task::ActiveModel> {
    Ok(task::ActiveModel {
        id: Set(task.id),
        owner_id: Set(task.owner_id),
        customer_id: Set(task.customer_id),
        title: Set(task.title.clone()),
        description: Set(task.description.clone()),
        kind: Set(task_kind_to_record(task.kind)),
        status: Set(task_status_to_record(task.status)),
        priority: Set(task_priority_to_record(task.priority)),
        due_at: Set(stored(task.due_at)),
        completed_at: Set(task.completed_at.map(stored)),
        estimated_minutes: Set(minutes_to_db(
            "task",
            "estimated_minutes",
            task.estimated_minutes,
        )?),
        spent_minutes: Set(minutes_to_db("task", "spent_minutes", task.spent_minutes)?),
        created_at: Set(stored(now)),
        updated_at: Set(stored(now)),
    })
}

pub(crate) fn note_from_model(model: note::Model) -> Note {
    Note {
        id: model.id,
        owner_id: model.owner_id,
        customer_id: model.customer_id,
        title: model.title,
        content: model.content,
        pinned: model.pinned,
        created_at: utc(model.created_at),
        updated_at: utc(model.updated_at),
    }
}

pub(crate) fn note_active_model(note: &Note) -> note::ActiveModel {
    note::ActiveModel {
        id: Set(note.id),
        owner_id: Set(note.owner_id),
        customer_id: Set(note.customer_id),
        title: Set(note.title.clone()),
        content: Set(note.content.clone()),
        pinned: Set(note.pinned),
        created_at: Set(stored(note.created_at)),
        updated_at: Set(stored(note.updated_at)),
    }
}

pub(crate) fn tag_from_model(model: tag::Model) -> Tag {
    Tag {
        id: model.id,
        owner_id: model.owner_id,
        name: model.name,
        color: model.color,
    }
}

pub(crate) fn tag_active_model(tag: &Tag, now: DateTime<Utc>) -> tag::ActiveModel {
    tag::ActiveModel {
        id: Set(tag.id),
        owner_id: Set(tag.owner_id),
        name: Set(tag.name.clone()),
        color: Set(tag.color.clone()),
        created_at: Set(stored(now)),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;
    use uuid::Uuid;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).unwrap()
    }

    fn funnel_model(stages: Json, sla: Json) -> funnel::Model {
        funnel::Model {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            name: "Legacy".into(),
            stages,
            sla_hours: sla,
            conversion_rates: json!({}),
            color: "#007bff".into(),
            active: true,
            created_at: stored(now()),
            updated_at: stored(now()),
        }
    }

    #[test]
    fn stored_funnel_keeps_read_time_defaults() {
        let model = funnel_model(json!(["Lead", "Won"]), json!({ "Lead": 12 }));
        let funnel = funnel_from_model(model).unwrap();
        assert_eq!(funnel.sla_for("Lead"), 12);
        assert_eq!(funnel.sla_for("Won"), 24);
    }

    #[test]
    fn malformed_stage_json_is_rejected() {
        let model = funnel_model(json!({ "not": "a list" }), json!({}));
        assert!(matches!(
            funnel_from_model(model),
            Err(DbError::InvalidRecord(msg)) if msg.starts_with("funnel.stages")
        ));
    }

    #[test]
    fn out_of_range_probability_is_rejected() {
        let model = customer::Model {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            funnel_id: Uuid::new_v4(),
            name: "Acme".into(),
            stage: "Lead".into(),
            stage_entered_at: stored(now()),
            estimated_value_cents: 0,
            probability: 140,
            company: None,
            email: None,
            phone: None,
            last_contact_at: None,
            created_at: stored(now()),
            updated_at: stored(now()),
        };
        assert!(matches!(
            customer_from_model(model),
            Err(DbError::InvalidRecord(_))
        ));
    }

    #[test]
    fn every_activity_kind_maps_to_a_record() {
        for kind in [ActivityKind::StageChange, ActivityKind::TaskMove]
            .into_iter()
            .chain(products_crm::InteractionKind::ALL.map(ActivityKind::from))
        {
            assert_eq!(
                activity_kind_from_record(activity_kind_to_record(kind)),
                kind
            );
        }
        for status in TaskStatus::ALL {
            assert_eq!(
                task_status_from_record(task_status_to_record(status)),
                status
            );
        }
    }

    #[test]
    fn negative_stored_duration_is_rejected() {
        let model = activity::Model {
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            actor_id: Uuid::new_v4(),
            kind: activity::Kind::Call,
            title: "Call".into(),
            description: String::new(),
            outcome: Some(activity::Outcome::NoAnswer),
            duration_minutes: Some(-5),
            task_id: None,
            meta_json: json!({}),
            occurred_at: stored(now()),
        };
        assert!(matches!(
            activity_from_model(model),
            Err(DbError::InvalidRecord(msg)) if msg == "activity.duration_minutes: -5"
        ));
    }

    #[test]
    fn timestamps_survive_the_offset_round_trip() {
        assert_eq!(utc(stored(now())), now());
    }
}
