use anyhow::Result;
use chrono::{DateTime, Duration, TimeZone, Utc};
use platform_db::DbPool;
use products_crm::{Funnel, NewCustomer, Priority, SuggestedAction};
use suite_tests::migrated_pool;
use uuid::Uuid;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 2, 3, 8, 0, 0).unwrap()
}

/// Stages `[A, B, C]` with SLA `{A: 24, B: 48, C: 24}`.
async fn abc_funnel(pool: &DbPool, owner: Uuid) -> Result<Funnel> {
    let mut funnel = Funnel::new(owner, "ABC", vec!["A".into(), "B".into(), "C".into()])?;
    funnel.set_sla("B", 48)?;
    platform_db::create_funnel(pool, &funnel, t0()).await?;
    Ok(funnel)
}

async fn place(
    pool: &DbPool,
    funnel: &Funnel,
    name: &str,
    stage: &str,
    entered_at: DateTime<Utc>,
) -> Result<Uuid> {
    let customer = platform_db::create_customer(
        pool,
        funnel.owner_id,
        funnel.id,
        NewCustomer {
            name: name.into(),
            stage: Some(stage.into()),
            estimated_value_cents: 6_000_000,
            ..Default::default()
        },
        entered_at,
    )
    .await?;
    Ok(customer.id)
}

#[tokio::test]
async fn overdue_scan_orders_by_breach_and_respects_owner() -> Result<()> {
    let pool = migrated_pool().await?;
    let owner = Uuid::new_v4();
    let funnel = abc_funnel(&pool, owner).await?;
    let now = t0() + Duration::hours(100);

    let fresh = place(&pool, &funnel, "Fresh", "A", now - Duration::hours(2)).await?;
    let late_b = place(&pool, &funnel, "Late B", "B", now - Duration::hours(50)).await?;
    let very_late = place(&pool, &funnel, "Very late", "A", t0()).await?;

    let other = Uuid::new_v4();
    let foreign = abc_funnel(&pool, other).await?;
    place(&pool, &foreign, "Foreign", "A", t0()).await?;

    let overdue = platform_db::overdue_customers(&pool, owner, now).await?;
    let ids: Vec<Uuid> = overdue.iter().map(|o| o.customer_id).collect();
    assert_eq!(ids, vec![very_late, late_b]);
    assert!(!ids.contains(&fresh));
    assert_eq!(overdue[0].hours_overdue, 76.0);
    assert_eq!(overdue[1].hours_overdue, 2.0);
    Ok(())
}

#[tokio::test]
async fn deactivated_funnels_drop_out_of_the_overdue_scan() -> Result<()> {
    let pool = migrated_pool().await?;
    let owner = Uuid::new_v4();
    let mut retired = abc_funnel(&pool, owner).await?;
    let kept = Funnel::new(owner, "Kept", vec!["A".into(), "B".into()])?;
    platform_db::create_funnel(&pool, &kept, t0()).await?;
    let now = t0() + Duration::hours(100);

    place(&pool, &retired, "Retired", "A", t0()).await?;
    let live = place(&pool, &kept, "Live", "A", t0()).await?;

    retired.active = false;
    platform_db::save_funnel(&pool, &retired, now).await?;

    let overdue = platform_db::overdue_customers(&pool, owner, now).await?;
    let ids: Vec<Uuid> = overdue.iter().map(|o| o.customer_id).collect();
    assert_eq!(ids, vec![live]);

    let active = platform_db::list_funnels(&pool, owner, true).await?;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, kept.id);
    assert_eq!(
        platform_db::list_funnels(&pool, owner, false).await?.len(),
        2
    );
    Ok(())
}

#[tokio::test]
async fn funnel_report_counts_stages_and_overdue_share() -> Result<()> {
    let pool = migrated_pool().await?;
    let owner = Uuid::new_v4();
    let funnel = abc_funnel(&pool, owner).await?;
    let now = t0() + Duration::hours(60);

    place(&pool, &funnel, "One", "A", now - Duration::hours(30)).await?;
    place(&pool, &funnel, "Two", "A", now - Duration::hours(10)).await?;
    place(&pool, &funnel, "Three", "B", now - Duration::hours(20)).await?;
    place(&pool, &funnel, "Four", "C", now - Duration::hours(1)).await?;

    let report = platform_db::funnel_report(&pool, owner, funnel.id, now).await?;
    assert_eq!(report.name, "ABC");
    assert_eq!(report.stages, "A → B → C");
    assert_eq!(report.stats.total_customers, 4);
    let counts: Vec<usize> = report.stats.per_stage.iter().map(|s| s.customers).collect();
    assert_eq!(counts, vec![2, 1, 1]);
    assert_eq!(report.stats.overdue_customers, 1);
    assert_eq!(report.stats.overdue_rate, 25.0);

    let a = &report.stage_averages[0];
    assert_eq!(a.stage, "A");
    assert_eq!(a.average_hours, 20.0);
    assert_eq!(a.sla_hours, 24);
    assert_eq!(a.conversion_target, Some(50));
    assert_eq!(report.stage_averages[2].conversion_target, None);
    Ok(())
}

#[tokio::test]
async fn insight_combines_sla_advice_and_score() -> Result<()> {
    let pool = migrated_pool().await?;
    let owner = Uuid::new_v4();
    let funnel = abc_funnel(&pool, owner).await?;
    let customer = place(&pool, &funnel, "Acme", "B", t0()).await?;

    let insight = platform_db::customer_insight(&pool, owner, customer, t0() + Duration::hours(50))
        .await?;
    assert!(!insight.sla.within_sla);
    assert_eq!(insight.sla.hours_remaining, -2.0);
    assert_eq!(insight.advice.priority, Priority::High);
    assert_eq!(insight.advice.action, SuggestedAction::Contact);
    assert_eq!(insight.next_step, "[HIGH] Get in touch: Overdue by 2 hours");
    assert_eq!(insight.score.total, 50 + 20 + 15 + 6);
    Ok(())
}

#[tokio::test]
async fn seeding_is_idempotent_per_owner() -> Result<()> {
    let pool = migrated_pool().await?;
    let owner = Uuid::new_v4();

    let first = platform_db::seed_demo(&pool, owner, t0()).await?;
    assert_eq!(first.funnels, 3);
    assert_eq!(first.customers, 12);
    assert_eq!(first.tasks, 6);

    let again = platform_db::seed_demo(&pool, owner, t0()).await?;
    assert_eq!(again, platform_db::SeedSummary::default());

    assert_eq!(
        platform_db::list_funnels(&pool, owner, false).await?.len(),
        3
    );
    assert_eq!(
        platform_db::list_customers(&pool, owner, None).await?.len(),
        12
    );

    let overdue = platform_db::overdue_customers(&pool, owner, t0()).await?;
    assert!(!overdue.is_empty());
    assert!(
        overdue
            .windows(2)
            .all(|pair| pair[0].hours_overdue >= pair[1].hours_overdue)
    );
    Ok(())
}
