use anyhow::Result;
use chrono::{DateTime, Duration, TimeZone, Utc};
use platform_db::{DbError, DbPool};
use products_crm::{
    ActivityKind, ActivityResult, CrmError, Customer, Funnel, InteractionKind, NewCustomer,
    NewInteraction, Task, TaskStatus,
};
use suite_tests::migrated_pool;
use uuid::Uuid;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 1, 10, 0, 0).unwrap()
}

async fn customer_for(pool: &DbPool, owner: Uuid, name: &str) -> Result<Customer> {
    let funnel = Funnel::new(owner, name, vec!["Lead".into(), "Won".into()])?;
    platform_db::create_funnel(pool, &funnel, t0()).await?;
    let customer = platform_db::create_customer(
        pool,
        owner,
        funnel.id,
        NewCustomer {
            name: name.into(),
            ..Default::default()
        },
        t0(),
    )
    .await?;
    Ok(customer)
}

fn call(title: &str) -> NewInteraction {
    NewInteraction {
        kind: InteractionKind::Call,
        title: title.into(),
        result: Some(ActivityResult::Success),
        duration_minutes: Some(15),
        ..Default::default()
    }
}

#[tokio::test]
async fn logged_call_stamps_last_contact() -> Result<()> {
    let pool = migrated_pool().await?;
    let owner = Uuid::new_v4();
    let actor = Uuid::new_v4();
    let customer = customer_for(&pool, owner, "Globex").await?;
    assert_eq!(customer.last_contact_at, None);

    let at = t0() + Duration::hours(6);
    let entry =
        platform_db::log_activity(&pool, owner, customer.id, call("Intro call"), actor, at).await?;
    assert_eq!(entry.kind, ActivityKind::Call);
    assert_eq!(entry.occurred_at, at);

    let loaded = platform_db::load_customer(&pool, owner, customer.id).await?;
    assert_eq!(loaded.last_contact_at, Some(at));
    assert_eq!(loaded.stage, "Lead");

    let trail = platform_db::customer_activities(&pool, owner, customer.id).await?;
    assert_eq!(trail, vec![entry]);
    assert_eq!(trail[0].result, Some(ActivityResult::Success));
    assert_eq!(trail[0].duration_minutes, Some(15));
    assert_eq!(trail[0].actor_id, actor);
    Ok(())
}

#[tokio::test]
async fn activity_linked_to_task_shows_on_both_trails() -> Result<()> {
    let pool = migrated_pool().await?;
    let owner = Uuid::new_v4();
    let actor = Uuid::new_v4();
    let customer = customer_for(&pool, owner, "Globex").await?;
    let mut task = Task::new(owner, "Call back", t0() + Duration::days(2))?;
    task.customer_id = Some(customer.id);
    platform_db::create_task(&pool, &task, t0()).await?;

    let input = NewInteraction {
        task_id: Some(task.id),
        ..call("Called back")
    };
    let logged = platform_db::log_activity(&pool, owner, customer.id, input, actor, t0()).await?;
    let done_at = t0() + Duration::hours(1);
    platform_db::set_task_status(&pool, owner, task.id, TaskStatus::Done, actor, done_at).await?;

    let on_task = platform_db::task_activities(&pool, owner, task.id).await?;
    assert_eq!(on_task.len(), 2);
    assert_eq!(on_task[0].id, logged.id);
    assert!(on_task.iter().all(|entry| entry.task_id == Some(task.id)));
    assert_eq!(on_task[1].kind, ActivityKind::TaskMove);

    let on_customer = platform_db::customer_activities(&pool, owner, customer.id).await?;
    assert_eq!(on_customer.len(), 2);
    Ok(())
}

#[tokio::test]
async fn task_of_another_customer_is_rejected_without_writes() -> Result<()> {
    let pool = migrated_pool().await?;
    let owner = Uuid::new_v4();
    let globex = customer_for(&pool, owner, "Globex").await?;
    let umbrella = customer_for(&pool, owner, "Umbrella").await?;
    let mut task = Task::new(owner, "Demo", t0() + Duration::days(1))?;
    task.customer_id = Some(umbrella.id);
    platform_db::create_task(&pool, &task, t0()).await?;

    let input = NewInteraction {
        task_id: Some(task.id),
        ..call("Demo")
    };
    let err = platform_db::log_activity(&pool, owner, globex.id, input, owner, t0())
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::NotFound("task")));

    let loaded = platform_db::load_customer(&pool, owner, globex.id).await?;
    assert_eq!(loaded, globex);
    assert!(
        platform_db::customer_activities(&pool, owner, globex.id)
            .await?
            .is_empty()
    );
    Ok(())
}

#[tokio::test]
async fn blank_title_and_foreign_customer_are_rejected() -> Result<()> {
    let pool = migrated_pool().await?;
    let owner = Uuid::new_v4();
    let customer = customer_for(&pool, owner, "Globex").await?;

    let err = platform_db::log_activity(&pool, owner, customer.id, call("  "), owner, t0())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DbError::Domain(CrmError::BlankName("activity title"))
    ));

    let stranger = Uuid::new_v4();
    let err = platform_db::log_activity(&pool, stranger, customer.id, call("Hi"), stranger, t0())
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::NotFound("customer")));

    let loaded = platform_db::load_customer(&pool, owner, customer.id).await?;
    assert_eq!(loaded.last_contact_at, None);
    Ok(())
}
