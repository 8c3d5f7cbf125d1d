//! Alarm monitor → lighting regulator chain, wired by hand.

use henhouse::adapters::time::ManualClock;
use henhouse::app::alarm::AlarmMonitor;
use henhouse::app::lighting::LightingRegulator;
use henhouse::config::SystemConfig;
use henhouse::error::SendError;
use henhouse::messages::{BehaviorMsg, BehaviorSample, ExternalAlert, LightMode, Outbound};

use crate::mock_sink::{FailingSink, RecordingSink, hen};

fn sample(id: &str, aggression: f32, hunger: i32) -> BehaviorMsg {
    BehaviorMsg::Sample(BehaviorSample {
        entity_id: Some(hen(id)),
        aggression,
        hunger,
    })
}

/// Deliver everything the monitor addressed to lighting.
fn pump<C: henhouse::app::ports::Clock>(
    monitor_out: &RecordingSink,
    lighting: &mut LightingRegulator<C>,
    out: &mut RecordingSink,
) {
    for event in monitor_out.to_lighting() {
        if let Some(msg) = event.into_lighting() {
            lighting.handle(msg, out);
        }
    }
}

#[test]
fn alarm_then_forward_drives_light_up() {
    let clock = ManualClock::new();
    let cfg = SystemConfig::default();
    let mut monitor = AlarmMonitor::new(&cfg.behavior, clock.clone());
    let mut lighting = LightingRegulator::new(&cfg.lighting, clock.clone());

    let mut monitor_out = RecordingSink::new();
    monitor.handle(sample("hen-1", 9.0, 30), &mut monitor_out);
    assert_eq!(monitor_out.kinds(), vec!["aggression_alert", "aggression_update"]);

    let mut out = RecordingSink::new();
    pump(&monitor_out, &mut lighting, &mut out);
    // init broadcast for the new entity, then the regulated level.
    assert_eq!(out.light_levels("hen-1"), vec![50, 95]);
    assert_eq!(lighting.state(&hen("hen-1")).unwrap().mode, LightMode::Auto);
}

#[test]
fn calm_on_alarm_overrides_regulation_within_window() {
    let clock = ManualClock::new();
    let mut cfg = SystemConfig::default();
    cfg.behavior.calm_on_alarm = true;
    let mut monitor = AlarmMonitor::new(&cfg.behavior, clock.clone());
    let mut lighting = LightingRegulator::new(&cfg.lighting, clock.clone());

    let mut monitor_out = RecordingSink::new();
    monitor.handle(sample("hen-1", 8.0, 0), &mut monitor_out);
    assert_eq!(
        monitor_out.kinds(),
        vec!["aggression_alert", "calm_hens", "aggression_update"]
    );

    let mut out = RecordingSink::new();
    pump(&monitor_out, &mut lighting, &mut out);
    // Calm goes first and closes the gate; the forward is rejected.
    assert_eq!(lighting.level(&hen("hen-1")), Some(70));
    assert_eq!(lighting.state(&hen("hen-1")).unwrap().mode, LightMode::Calm);
}

#[test]
fn repeated_reading_is_forwarded_once_per_window() {
    let clock = ManualClock::new();
    let cfg = SystemConfig::default();
    let mut monitor = AlarmMonitor::new(&cfg.behavior, clock.clone());
    let mut out = RecordingSink::new();

    monitor.handle(sample("hen-1", 4.0, 0), &mut out);
    clock.advance_secs(0.5);
    monitor.handle(sample("hen-1", 4.0, 0), &mut out);
    clock.advance_secs(2.0);
    monitor.handle(sample("hen-1", 4.0, 0), &mut out);

    assert_eq!(out.count("aggression_update"), 2);
    assert_eq!(out.count("aggression_alert"), 0);
}

#[test]
fn relayed_alert_keeps_entity_and_payload() {
    let clock = ManualClock::new();
    let cfg = SystemConfig::default();
    let mut monitor = AlarmMonitor::new(&cfg.behavior, clock);
    let mut out = RecordingSink::new();

    let mut payload = serde_json::Map::new();
    payload.insert("temp".into(), 41.into());
    monitor.handle(
        BehaviorMsg::Alert(ExternalAlert {
            event_type: None,
            kind: Some("heat_stress".into()),
            entity_id: Some(hen("hen-4")),
            payload,
        }),
        &mut out,
    );

    match &out.events[..] {
        [Outbound::Alarm(alarm)] => {
            assert_eq!(alarm.event_type, "heat_stress");
            assert_eq!(alarm.entity_id, Some(hen("hen-4")));
            assert_eq!(alarm.payload["temp"], 41);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn failing_sink_does_not_stop_the_monitor() {
    let clock = ManualClock::new();
    let cfg = SystemConfig::default();
    let mut monitor = AlarmMonitor::new(&cfg.behavior, clock);
    let mut sink = FailingSink::new(SendError::Closed);

    monitor.handle(sample("hen-1", 9.0, 0), &mut sink);
    monitor.handle(sample("hen-2", 9.0, 0), &mut sink);
    // Alarm + forward for each sample, each attempted exactly once.
    assert_eq!(sink.attempts, 4);
}
