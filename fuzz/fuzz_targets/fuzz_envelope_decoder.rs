//! Fuzz target: `Inbound::decode`
//!
//! Feeds arbitrary UTF-8 lines into the envelope decoder and checks that
//! it never panics, and that anything it accepts round-trips through a
//! component without panicking either.
//!
//! cargo fuzz run fuzz_envelope_decoder

#![no_main]

use henhouse::adapters::time::ManualClock;
use henhouse::app::alarm::AlarmMonitor;
use henhouse::app::feeding::FeedScheduler;
use henhouse::app::lighting::LightingRegulator;
use henhouse::config::SystemConfig;
use henhouse::messages::{Inbound, Outbound};
use henhouse::runtime::Component;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(Some(msg)) = Inbound::decode(line) else {
        return;
    };

    let cfg = SystemConfig::default();
    let clock = ManualClock::new();
    let mut out: Vec<Outbound> = Vec::new();
    match msg {
        Inbound::Behavior(m) => AlarmMonitor::new(&cfg.behavior, clock).on_message(m, &mut out),
        Inbound::Lighting(m) => {
            LightingRegulator::new(&cfg.lighting, clock).on_message(m, &mut out)
        }
        Inbound::Feeding(m) => FeedScheduler::new(&cfg.feeding, clock).on_message(m, &mut out),
    }

    // Every emitted message must have a serialisable wire form.
    for event in &out {
        assert!(event.to_wire().is_object());
    }
});
