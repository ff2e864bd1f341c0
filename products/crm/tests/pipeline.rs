use std::collections::BTreeMap;

use chrono::{DateTime, Duration, TimeZone, Utc};
use products_crm::{
    CrmError, Customer, Funnel, NewCustomer, Priority, SuggestedAction, advise, evaluate,
    move_stage, score,
};
use uuid::Uuid;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 1, 8, 0, 0).unwrap()
}

/// Stages `[A, B, C]` with SLA `{A: 24, B: 48}`; C falls back to the default.
fn abc_funnel() -> Funnel {
    let sla = BTreeMap::from([("A".to_string(), 24), ("B".to_string(), 48)]);
    let funnel = Funnel::from_parts_unchecked(
        Uuid::new_v4(),
        Uuid::new_v4(),
        "ABC".into(),
        vec!["A".into(), "B".into(), "C".into()],
        sla,
        BTreeMap::new(),
        "#007bff".into(),
        true,
    );
    funnel.validate().unwrap();
    funnel
}

fn customer_in(funnel: &Funnel, stage: &str, entered: DateTime<Utc>, value_cents: i64) -> Customer {
    Customer::new(
        funnel.owner_id,
        funnel,
        NewCustomer {
            name: "Acme".into(),
            stage: Some(stage.into()),
            estimated_value_cents: value_cents,
            ..Default::default()
        },
        entered,
    )
    .unwrap()
}

#[test]
fn missing_sla_entry_defaults_to_24_hours() {
    let funnel = abc_funnel();
    assert!(!funnel.sla_hours().contains_key("C"));
    for stage in funnel.stages() {
        let c = customer_in(&funnel, stage, t0(), 0);
        let status = evaluate(&funnel, &c, t0());
        let expected = if stage == "B" { 48 } else { 24 };
        assert_eq!(status.sla_hours, expected, "stage {stage}");
    }
}

#[test]
fn fifty_hours_in_b_is_two_hours_late() {
    let funnel = abc_funnel();
    let c = customer_in(&funnel, "B", t0(), 0);
    let status = evaluate(&funnel, &c, t0() + Duration::hours(50));
    assert!(!status.within_sla);
    assert_eq!(status.hours_remaining, -2.0);
    assert_eq!(status.hours_in_stage, 50.0);
}

#[test]
fn remaining_hours_identity_holds() {
    let funnel = abc_funnel();
    for minutes in [0_i64, 1, 59, 600, 2_881, 10_000] {
        let c = customer_in(&funnel, "A", t0(), 0);
        let status = evaluate(&funnel, &c, t0() + Duration::minutes(minutes));
        assert_eq!(
            status.hours_remaining,
            f64::from(status.sla_hours) - status.hours_in_stage
        );
    }
}

#[test]
fn zero_sla_is_always_within() {
    let mut funnel = Funnel::new(Uuid::new_v4(), "Z", vec!["Only".into()]).unwrap();
    funnel.set_sla("Only", 0).unwrap();
    let c = customer_in(&funnel, "Only", t0(), 0);
    for hours in [0, 1, 1_000, 100_000] {
        assert!(
            evaluate(&funnel, &c, t0() + Duration::hours(hours))
                .within_sla
        );
    }
}

#[test]
fn rejected_transition_mutates_nothing() {
    let funnel = abc_funnel();
    let mut c = customer_in(&funnel, "A", t0(), 0);
    let before = (c.stage.clone(), c.stage_entered_at, c.funnel_id);
    let err = move_stage(
        &mut c,
        &funnel,
        "D",
        Uuid::new_v4(),
        t0() + Duration::hours(3),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        CrmError::UnknownStage { ref stage, .. } if stage == "D"
    ));
    assert_eq!((c.stage.clone(), c.stage_entered_at, c.funnel_id), before);
}

#[test]
fn accepted_transition_resets_clock_and_audits_once() {
    let funnel = abc_funnel();
    let mut c = customer_in(&funnel, "A", t0(), 0);
    let at = t0() + Duration::hours(7);
    let actor = Uuid::new_v4();
    let transition = move_stage(&mut c, &funnel, "B", actor, at).unwrap();
    assert_eq!(c.stage, "B");
    assert_eq!(c.stage_entered_at, at);
    assert_eq!(transition.activity.customer_id, c.id);
    assert_eq!(transition.activity.actor_id, actor);
    assert_eq!(transition.activity.occurred_at, at);
    assert_eq!(evaluate(&funnel, &c, at).hours_in_stage, 0.0);
}

#[test]
fn advisor_scenarios() {
    let funnel = abc_funnel();

    let terminal = customer_in(&funnel, "C", t0(), 0);
    let advice = advise(&funnel, &terminal, t0() + Duration::hours(1));
    assert_eq!(advice.priority, Priority::High);
    assert_eq!(advice.action, SuggestedAction::MarkAsWon);

    let c = customer_in(&funnel, "A", t0(), 0);
    let critical = advise(&funnel, &c, t0() + Duration::hours(24 + 80));
    assert_eq!(critical.priority, Priority::Critical);

    let high = advise(&funnel, &c, t0() + Duration::hours(24 + 10));
    assert_eq!(high.priority, Priority::High);
    assert_eq!(high.action, SuggestedAction::Contact);

    let medium = advise(&funnel, &c, t0() + Duration::hours(24 - 5));
    assert_eq!(medium.priority, Priority::Medium);

    let low = advise(&funnel, &c, t0() + Duration::hours(1));
    assert_eq!(low.priority, Priority::Low);
}

#[test]
fn score_is_capped_at_100() {
    let funnel = Funnel::new(
        Uuid::new_v4(),
        "Four",
        vec!["S0".into(), "S1".into(), "S2".into(), "S3".into()],
    )
    .unwrap();
    let c = customer_in(&funnel, "S2", t0(), 6_000_000);
    let breakdown = score(&funnel, &c, t0() + Duration::hours(24 + 100));
    assert_eq!(breakdown.value, 20);
    assert_eq!(breakdown.sla, 30);
    assert_eq!(breakdown.position, 10);
    assert_eq!(
        breakdown.base + breakdown.value + breakdown.sla + breakdown.position,
        110
    );
    assert_eq!(breakdown.total, 100);
}
