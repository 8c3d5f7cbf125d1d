//! Cooperative single-threaded runtime.
//!
//! One `edge-executor` task per component, each draining its own bounded
//! `embassy-sync` mailbox and handling every message to completion before
//! it yields.  A driver task decodes input lines and feeds the mailboxes.
//!
//! ```text
//!  ┌──────────────────────────────────────────────────────────────┐
//!  │  futures_lite::block_on                                      │
//!  │  ┌────────────────────────────────────────────────────────┐  │
//!  │  │  edge_executor::LocalExecutor                          │  │
//!  │  │                                                        │  │
//!  │  │  driver ──▶ behavior ──▶ AlarmMonitor ──┐              │  │
//!  │  │        ├──▶ lighting ──▶ LightingRegulator ◀── forward │  │
//!  │  │        └──▶ feeding  ──▶ FeedScheduler                 │  │
//!  │  │                              │                         │  │
//!  │  │                              ▼                         │  │
//!  │  │                        Router ──▶ EventSink            │  │
//!  │  └────────────────────────────────────────────────────────┘  │
//!  └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each component is owned by exactly one task, so its state is never
//! touched concurrently.  The only suspension point inside a task is the
//! mailbox receive (plus a yield between messages for fairness), which
//! keeps the feed scheduler's read-then-write on the silo atomic.
//!
//! Input uses `send().await` and so applies backpressure.  Internal
//! forwards (monitor → lighting) use `try_send` and are dropped with a
//! warning when the lighting mailbox is full: fire-and-forget.

use core::cell::RefCell;
use core::time::Duration;

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::Channel;
use futures_lite::future::yield_now;
use log::{debug, info, warn};

use crate::app::alarm::AlarmMonitor;
use crate::app::feeding::{FeedResource, FeedScheduler};
use crate::app::lighting::LightingRegulator;
use crate::app::ports::{Clock, EventSink};
use crate::config::SystemConfig;
use crate::entity::EntityId;
use crate::error::SendError;
use crate::messages::{BehaviorMsg, Destination, FeedingMsg, Inbound, LightingMsg, Outbound};

/// Depth of every component mailbox.
pub const MAILBOX_DEPTH: usize = 16;

type Mailbox<T> = Channel<NoopRawMutex, T, MAILBOX_DEPTH>;

// ── Component seam ───────────────────────────────────────────

/// A decision component driven by one mailbox.
pub trait Component {
    type Msg;

    fn on_message<S: EventSink + ?Sized>(&mut self, msg: Self::Msg, sink: &mut S);
}

impl<C: Clock> Component for AlarmMonitor<C> {
    type Msg = BehaviorMsg;

    fn on_message<S: EventSink + ?Sized>(&mut self, msg: BehaviorMsg, sink: &mut S) {
        self.handle(msg, sink);
    }
}

impl<C: Clock> Component for LightingRegulator<C> {
    type Msg = LightingMsg;

    fn on_message<S: EventSink + ?Sized>(&mut self, msg: LightingMsg, sink: &mut S) {
        self.handle(msg, sink);
    }
}

impl<C: Clock> Component for FeedScheduler<C> {
    type Msg = FeedingMsg;

    fn on_message<S: EventSink + ?Sized>(&mut self, msg: FeedingMsg, sink: &mut S) {
        self.handle(msg, sink);
    }
}

// ── Mailboxes + routing ──────────────────────────────────────

struct Mailboxes {
    behavior: Mailbox<BehaviorMsg>,
    lighting: Mailbox<LightingMsg>,
    feeding: Mailbox<FeedingMsg>,
}

impl Mailboxes {
    fn new() -> Self {
        Self {
            behavior: Channel::new(),
            lighting: Channel::new(),
            feeding: Channel::new(),
        }
    }

    fn is_idle(&self) -> bool {
        self.behavior.is_empty() && self.lighting.is_empty() && self.feeding.is_empty()
    }
}

/// Per-task outbound path: lighting-bound messages go to the regulator's
/// mailbox, everything else to the shared external sink.
struct Router<'a, S> {
    lighting: &'a Mailbox<LightingMsg>,
    sink: &'a RefCell<S>,
}

impl<'a, S> Router<'a, S> {
    fn new(mailboxes: &'a Mailboxes, sink: &'a RefCell<S>) -> Self {
        Self {
            lighting: &mailboxes.lighting,
            sink,
        }
    }
}

impl<S: EventSink> EventSink for Router<'_, S> {
    fn emit(&mut self, event: Outbound) -> Result<(), SendError> {
        if event.destination() == Destination::Lighting {
            return match event.into_lighting() {
                Some(msg) => self
                    .lighting
                    .try_send(msg)
                    .map_err(|_| SendError::MailboxFull),
                None => Ok(()),
            };
        }
        self.sink.borrow_mut().emit(event)
    }
}

async fn agent_loop<A, S>(inbox: &Mailbox<A::Msg>, agent: &mut A, mut router: Router<'_, S>)
where
    A: Component,
    S: EventSink,
{
    loop {
        let msg = inbox.receive().await;
        agent.on_message(msg, &mut router);
        yield_now().await;
    }
}

// ── Runtime ──────────────────────────────────────────────────

/// Counters for one [`Runtime::run`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Lines read from the input.
    pub lines: u64,
    /// Messages delivered to a component mailbox.
    pub routed: u64,
    /// Unknown topic or type.
    pub ignored: u64,
    /// Undecodable or malformed messages.
    pub malformed: u64,
}

/// The three components plus the sink they report to.
pub struct Runtime<C, S> {
    entities: Vec<EntityId>,
    alarm: AlarmMonitor<C>,
    lighting: LightingRegulator<C>,
    feeding: FeedScheduler<C>,
    sink: S,
    pace: Option<Duration>,
}

impl<C: Clock + Clone, S: EventSink> Runtime<C, S> {
    pub fn new(config: &SystemConfig, clock: C, sink: S) -> Self {
        Self {
            entities: config.entities.clone(),
            alarm: AlarmMonitor::new(&config.behavior, clock.clone()),
            lighting: LightingRegulator::new(&config.lighting, clock.clone()),
            feeding: FeedScheduler::new(&config.feeding, clock),
            sink,
            pace: None,
        }
    }

    /// Wait this long between input lines (telemetry replay).
    pub fn with_pace(mut self, pace: Duration) -> Self {
        self.pace = (!pace.is_zero()).then_some(pace);
        self
    }

    /// Process every input line, then return once all mailboxes are
    /// drained.  Startup broadcasts happen on the first call only.
    pub fn run<I>(&mut self, input: I) -> RunStats
    where
        I: IntoIterator<Item = String>,
    {
        let Self {
            entities,
            alarm,
            lighting,
            feeding,
            sink,
            pace,
        } = self;
        let pace = *pace;

        let mailboxes = Mailboxes::new();
        let sink = RefCell::new(sink);

        {
            let mut router = Router::new(&mailboxes, &sink);
            lighting.start(entities, &mut router);
            feeding.start(&mut router);
        }

        let executor: edge_executor::LocalExecutor<'_, 4> = edge_executor::LocalExecutor::new();
        executor
            .spawn(agent_loop(&mailboxes.behavior, alarm, Router::new(&mailboxes, &sink)))
            .detach();
        executor
            .spawn(agent_loop(&mailboxes.lighting, lighting, Router::new(&mailboxes, &sink)))
            .detach();
        executor
            .spawn(agent_loop(&mailboxes.feeding, feeding, Router::new(&mailboxes, &sink)))
            .detach();

        let stats = futures_lite::future::block_on(executor.run(drive(&mailboxes, input, pace)));
        info!(
            "Run complete: lines={} routed={} ignored={} malformed={}",
            stats.lines, stats.routed, stats.ignored, stats.malformed
        );
        stats
    }

    pub fn feed(&self) -> FeedResource {
        self.feeding.feed()
    }

    pub fn light_level(&self, entity: &EntityId) -> Option<i32> {
        self.lighting.level(entity)
    }

    pub fn lighting(&self) -> &LightingRegulator<C> {
        &self.lighting
    }

    pub fn feeding(&self) -> &FeedScheduler<C> {
        &self.feeding
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

/// Decode and route input, then wait for every mailbox to drain.
async fn drive<I>(mailboxes: &Mailboxes, input: I, pace: Option<Duration>) -> RunStats
where
    I: IntoIterator<Item = String>,
{
    let mut stats = RunStats::default();
    for line in input {
        stats.lines += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match Inbound::decode(line) {
            Ok(Some(msg)) => {
                stats.routed += 1;
                match msg {
                    Inbound::Behavior(m) => mailboxes.behavior.send(m).await,
                    Inbound::Lighting(m) => mailboxes.lighting.send(m).await,
                    Inbound::Feeding(m) => mailboxes.feeding.send(m).await,
                }
            }
            Ok(None) => {
                stats.ignored += 1;
                debug!("IN | ignored: {}", line);
            }
            Err(e) => {
                stats.malformed += 1;
                warn!("IN | dropped ({}): {}", e, line);
            }
        }
        if let Some(pace) = pace {
            async_io_mini::Timer::after(pace).await;
        }
    }

    // A task never suspends mid-message, so empty mailboxes mean every
    // routed message (and every forward it caused) has been handled.
    while !mailboxes.is_idle() {
        yield_now().await;
    }
    stats
}
