use crate::aircraft::AircraftId;
use crate::config::{Config, Span, Timings};
use crate::dashboard::NullDashboard;
use crate::event_log::EventLog;
use crate::summary::RunSummary;
use crate::tower::TrafficController;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub fn fast_timings() -> Timings {
    Timings {
        tick_ms: 100,
        spawn_delay_ticks: Span::new(1, 3),
        boarding_ms: 300,
        taxi_ms: Span::new(50, 100),
        runway_ms: Span::new(100, 200),
        clearance_ms: Span::fixed(50),
        idle_poll_ms: 20,
    }
}

pub fn config(runways: usize, capacity: usize, aircraft: u32) -> Config {
    Config {
        runways,
        capacity,
        log_depth: 5,
        aircraft,
        timings: fast_timings(),
    }
    .validate()
    .unwrap()
}

pub fn back_to_back(runways: usize, capacity: usize, aircraft: u32) -> Config {
    let mut config = config(runways, capacity, aircraft);
    config.timings.spawn_delay_ticks = Span::fixed(0);
    config
}

pub fn controller(config: Config) -> (TrafficController, Arc<EventLog>) {
    let events = Arc::new(EventLog::new());
    let controller = TrafficController::new(config, events.clone(), Box::new(NullDashboard));
    (controller, events)
}

pub async fn run(config: Config) -> (RunSummary, Arc<EventLog>) {
    let (mut controller, events) = controller(config);
    let summary = controller.run(CancellationToken::new()).await;
    (summary, events)
}

/// Number of runway claims per aircraft, read back from the event log.
pub fn claims(events: &EventLog) -> HashMap<AircraftId, usize> {
    let mut claims = HashMap::new();
    for event in events.snapshot() {
        if event.message.contains("(3/5)") {
            *claims.entry(event.owner).or_default() += 1;
        }
    }
    claims
}

pub fn spawn_announcements(events: &EventLog) -> usize {
    events.for_owner(AircraftId::SYSTEM).len()
}

/// Index in the log of the first event for `owner` containing `needle`.
pub fn position(events: &EventLog, owner: AircraftId, needle: &str) -> Option<usize> {
    events
        .snapshot()
        .iter()
        .position(|e| e.owner == owner && e.message.contains(needle))
}
