//! Feed scheduler: priority, batch limits, cooldown and silo exhaustion.

use henhouse::adapters::time::ManualClock;
use henhouse::app::feeding::FeedScheduler;
use henhouse::config::FeedingConfig;
use henhouse::error::SendError;
use henhouse::messages::{FeedingMsg, HungerSample, Outbound};

use crate::mock_sink::{FailingSink, RecordingSink, hen};

fn hunger(id: &str, value: i32) -> FeedingMsg {
    FeedingMsg::Hunger(HungerSample {
        entity_id: Some(hen(id)),
        hunger: value,
        threshold: None,
    })
}

fn config(level: u32, batch: usize) -> FeedingConfig {
    FeedingConfig {
        initial_feed_level: level,
        max_hens_per_batch: batch,
        ..FeedingConfig::default()
    }
}

#[test]
fn only_entities_over_threshold_are_fed() {
    let clock = ManualClock::new();
    let mut feeder = FeedScheduler::new(&config(100, 3), clock.clone());
    let mut out = RecordingSink::new();

    // Below threshold: cached only.
    feeder.handle(hunger("a", 60), &mut out);
    feeder.handle(hunger("b", 65), &mut out);
    assert!(out.dispensed().is_empty());

    // Only c crosses the threshold.
    feeder.handle(hunger("c", 95), &mut out);
    assert_eq!(out.dispensed(), vec![("c", 5)]);
}

#[test]
fn whole_flock_is_served_then_cooldown_holds() {
    let clock = ManualClock::new();
    let mut feeder = FeedScheduler::new(&config(100, 2), clock.clone());
    let mut out = RecordingSink::new();

    feeder.handle(hunger("a", 80), &mut out);
    feeder.handle(hunger("b", 90), &mut out);
    feeder.handle(hunger("c", 85), &mut out);
    // a at t=0, then b at t=0 (a cooling down), then c.
    assert_eq!(
        out.dispensed(),
        vec![("a", 5), ("b", 5), ("c", 5)]
    );
    assert_eq!(feeder.feed().level(), 85);

    out.clear();
    clock.advance_secs(10.0);
    let report = feeder
        .ingest(
            &HungerSample {
                entity_id: Some(hen("a")),
                hunger: 99,
                threshold: Some(70),
            },
            &mut out,
        )
        .unwrap();
    assert!(report.served.is_empty());
    assert_eq!(report.cooling_down.len(), 3);

    clock.advance_secs(25.0);
    feeder.handle(hunger("a", 99), &mut out);
    // Two per batch, hungriest first: a (99) then b (90).
    assert_eq!(out.dispensed(), vec![("a", 5), ("b", 5)]);
}

#[test]
fn silo_runs_dry_without_going_negative() {
    let clock = ManualClock::new();
    let mut feeder = FeedScheduler::new(&config(7, 3), clock.clone());
    let mut out = RecordingSink::new();

    feeder.handle(hunger("a", 90), &mut out);
    feeder.handle(hunger("b", 80), &mut out);

    // a gets a full portion, b gets the remaining 2.
    assert_eq!(out.dispensed(), vec![("a", 5), ("b", 2)]);
    assert!(feeder.feed().is_empty());

    out.clear();
    feeder.handle(hunger("c", 75), &mut out);
    assert_eq!(out.count("no_feed"), 3);
    assert!(out.dispensed().is_empty());
    assert!(out.events.iter().any(|e| matches!(
        e,
        Outbound::FeedState {
            level: 0,
            reason: "no_feed",
            ..
        }
    )));
}

#[test]
fn every_dispense_is_reported_to_the_sink() {
    let clock = ManualClock::new();
    let mut feeder = FeedScheduler::new(&config(100, 3), clock);
    let mut out = RecordingSink::new();

    feeder.handle(hunger("a", 88), &mut out);

    let report = out.events.iter().find_map(|e| match e {
        Outbound::FeedReport {
            portion,
            remaining_feed,
            hunger_before,
            ..
        } => Some((*portion, *remaining_feed, *hunger_before)),
        _ => None,
    });
    assert_eq!(report, Some((5, 95, 88)));
    assert_eq!(out.count("feed_update"), 1);
}

#[test]
fn silo_keeps_draining_when_delivery_fails() {
    let clock = ManualClock::new();
    let mut feeder = FeedScheduler::new(&config(100, 3), clock);
    let mut sink = FailingSink::new(SendError::Io);

    feeder.handle(hunger("a", 90), &mut sink);

    assert_eq!(feeder.feed().level(), 95);
    assert!(feeder.last_fed_at(&hen("a")).is_some());
    assert!(sink.attempts >= 3);
}
