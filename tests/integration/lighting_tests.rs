//! Lighting regulator: gating, manual and calm overrides, lazy registration.

use henhouse::adapters::time::ManualClock;
use henhouse::app::lighting::LightingRegulator;
use henhouse::config::LightingConfig;
use henhouse::error::SendError;
use henhouse::messages::{
    AggressionUpdate, CalmRequest, LightMode, LightRequest, LightingMsg, Outbound,
};

use crate::mock_sink::{FailingSink, RecordingSink, hen};

fn regulator(clock: &ManualClock) -> LightingRegulator<ManualClock> {
    LightingRegulator::new(&LightingConfig::default(), clock.clone())
}

fn aggression(id: &str, value: f32) -> LightingMsg {
    LightingMsg::Aggression(AggressionUpdate {
        entity_id: Some(hen(id)),
        aggression: value,
        hunger: 0,
        reason: None,
    })
}

#[test]
fn startup_broadcasts_every_configured_entity_once() {
    let clock = ManualClock::new();
    let mut lighting = regulator(&clock);
    let mut out = RecordingSink::new();
    let entities = [hen("a"), hen("b"), hen("c")];

    lighting.start(&entities, &mut out);
    lighting.start(&entities, &mut out);

    assert_eq!(out.count("light_level_update"), 3);
    assert_eq!(out.count("light_update"), 3);
    for e in &entities {
        assert_eq!(lighting.state(e).unwrap().mode, LightMode::Init);
        assert_eq!(out.light_levels(e.as_str()), vec![50]);
    }
}

#[test]
fn set_light_is_clamped_and_keeps_its_reason() {
    let clock = ManualClock::new();
    let mut lighting = regulator(&clock);
    let mut out = RecordingSink::new();
    lighting.start(&[hen("a")], &mut out);
    out.clear();

    lighting.handle(
        LightingMsg::SetLight(LightRequest {
            entity_id: Some(hen("a")),
            level: Some(250),
            reason: Some("operator".into()),
        }),
        &mut out,
    );

    assert_eq!(lighting.level(&hen("a")), Some(100));
    match &out.events[..] {
        [
            Outbound::LightLevel { level, reason, .. },
            Outbound::LightState { mode, .. },
        ] => {
            assert_eq!(*level, 100);
            assert_eq!(reason, "operator");
            assert_eq!(*mode, LightMode::Manual);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn calm_without_entity_reaches_every_known_entity() {
    let clock = ManualClock::new();
    let mut lighting = regulator(&clock);
    let mut out = RecordingSink::new();
    lighting.start(&[hen("a"), hen("b")], &mut out);

    lighting.handle(LightingMsg::Calm(CalmRequest::default()), &mut out);

    for id in ["a", "b"] {
        assert_eq!(lighting.level(&hen(id)), Some(70));
        assert_eq!(lighting.state(&hen(id)).unwrap().mode, LightMode::Calm);
    }
}

#[test]
fn unknown_entity_is_registered_before_its_first_update() {
    let clock = ManualClock::new();
    let mut lighting = regulator(&clock);
    let mut out = RecordingSink::new();
    lighting.start(&[], &mut out);

    lighting.handle(aggression("late", -6.0), &mut out);

    assert_eq!(out.light_levels("late"), vec![50, 20]);
    assert_eq!(lighting.entities().count(), 1);
}

#[test]
fn small_changes_never_go_out() {
    let clock = ManualClock::new();
    let mut cfg = LightingConfig::default();
    cfg.gain_per_aggression = 0.25;
    let mut lighting = LightingRegulator::new(&cfg, clock.clone());
    let mut out = RecordingSink::new();
    lighting.start(&[hen("a")], &mut out);
    out.clear();

    // 50 + 0.25 * 3.5 rounds to 51: below the minimum delta.
    lighting.handle(aggression("a", 3.5), &mut out);
    clock.advance_secs(10.0);
    lighting.handle(aggression("a", 3.5), &mut out);

    assert!(out.events.is_empty());
    assert_eq!(lighting.level(&hen("a")), Some(50));
}

#[test]
fn per_entity_gates_are_independent() {
    let clock = ManualClock::new();
    let mut lighting = regulator(&clock);
    let mut out = RecordingSink::new();
    lighting.start(&[hen("a"), hen("b")], &mut out);

    lighting.handle(aggression("a", 6.0), &mut out);
    lighting.handle(aggression("b", 6.0), &mut out);
    lighting.handle(aggression("a", 9.0), &mut out);

    assert_eq!(lighting.level(&hen("a")), Some(80));
    assert_eq!(lighting.level(&hen("b")), Some(80));
}

#[test]
fn state_is_kept_when_delivery_fails() {
    let clock = ManualClock::new();
    let mut lighting = regulator(&clock);
    let mut sink = FailingSink::new(SendError::MailboxFull);

    lighting.start(&[hen("a")], &mut sink);
    lighting.handle(aggression("a", 8.0), &mut sink);

    assert_eq!(lighting.level(&hen("a")), Some(90));
    assert_eq!(sink.attempts, 4);
}
