use crate::aircraft::{Aircraft, Stage};
use crate::config::Timings;
use crate::event_log::EventSink;
use crate::holding::BoundedContainer;
use crate::summary::RunwayStats;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tabled::Tabled;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub type Holding = BoundedContainer<Arc<Aircraft>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Taxiing,
    Active,
    Clearing,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Idle => "Idle",
            Phase::Taxiing => "Taxiing",
            Phase::Active => "Active",
            Phase::Clearing => "Clearing",
        };
        f.pad(s)
    }
}

struct Occupancy {
    phase: Phase,
    occupant: Option<Arc<Aircraft>>,
}

/// One runway. Takes aircraft out of the holding area one at a time and
/// walks each through taxi, runway use and clearance.
pub struct Runway {
    name: String,
    arrivals: AtomicU32,
    departures: AtomicU32,
    occupancy: Mutex<Occupancy>,
}

#[derive(Debug, Clone, PartialEq, Tabled)]
pub struct RunwayView {
    #[tabled(rename = "RUNWAY")]
    pub name: String,
    #[tabled(rename = "STATUS")]
    pub phase: Phase,
    #[tabled(rename = "AIRCRAFT")]
    pub occupant: String,
    #[tabled(rename = "ARRIVALS")]
    pub arrivals: u32,
    #[tabled(rename = "DEPARTURES")]
    pub departures: u32,
}

impl Runway {
    pub fn new(number: usize) -> Runway {
        Runway {
            name: format!("Runway {}", number),
            arrivals: AtomicU32::new(0),
            departures: AtomicU32::new(0),
            occupancy: Mutex::new(Occupancy {
                phase: Phase::Idle,
                occupant: None,
            }),
        }
    }

    fn occupancy(&self) -> MutexGuard<'_, Occupancy> {
        self.occupancy.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arrivals(&self) -> u32 {
        self.arrivals.load(Ordering::Acquire)
    }

    pub fn departures(&self) -> u32 {
        self.departures.load(Ordering::Acquire)
    }

    #[cfg(test)]
    pub fn phase(&self) -> Phase {
        self.occupancy().phase
    }

    #[cfg(test)]
    pub fn occupant(&self) -> Option<Arc<Aircraft>> {
        self.occupancy().occupant.clone()
    }

    pub fn view(&self) -> RunwayView {
        let (phase, occupant) = {
            let occupancy = self.occupancy();
            (occupancy.phase, occupancy.occupant.clone())
        };
        RunwayView {
            name: self.name.clone(),
            phase,
            occupant: occupant.map(|a| a.to_string()).unwrap_or_else(|| "-".to_string()),
            arrivals: self.arrivals(),
            departures: self.departures(),
        }
    }

    pub fn stats(&self) -> RunwayStats {
        RunwayStats {
            name: self.name.clone(),
            arrivals: self.arrivals(),
            departures: self.departures(),
        }
    }

    fn occupy(&self, aircraft: Arc<Aircraft>) {
        let mut occupancy = self.occupancy();
        debug_assert!(occupancy.occupant.is_none(), "{} already occupied", self.name);
        occupancy.occupant = Some(aircraft);
        occupancy.phase = Phase::Taxiing;
    }

    fn set_phase(&self, phase: Phase) {
        self.occupancy().phase = phase;
    }

    fn vacate(&self) -> Option<Arc<Aircraft>> {
        let mut occupancy = self.occupancy();
        occupancy.phase = Phase::Idle;
        occupancy.occupant.take()
    }

    /// Claims the earliest aircraft that is not parked, if any.
    pub fn claim(&self, holding: &Holding) -> Option<Arc<Aircraft>> {
        let now = Instant::now();
        let aircraft = holding.remove_first(|a| a.is_ready_for_runway(now))?;
        self.occupy(aircraft.clone());
        Some(aircraft)
    }

    /// Worker loop. Cancellation is honoured between aircraft only; an
    /// aircraft already claimed is always brought to its final stage.
    pub async fn run(
        self: Arc<Self>,
        holding: Arc<Holding>,
        events: Arc<dyn EventSink>,
        timings: Timings,
        cancel: CancellationToken,
    ) {
        let mut changes = holding.subscribe();
        debug!(runway = %self.name, "runway open");

        while !cancel.is_cancelled() {
            if let Some(aircraft) = self.claim(&holding) {
                self.service(aircraft, events.as_ref(), &timings).await;
                continue;
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = changes.changed() => {}
                _ = sleep(timings.idle_poll()) => {}
            }
        }

        debug!(runway = %self.name, "runway closed");
    }

    async fn service(&self, aircraft: Arc<Aircraft>, events: &dyn EventSink, timings: &Timings) {
        let id = aircraft.id();

        aircraft.advance_stage(Stage::Claimed);
        events.append(
            id,
            format!("[ID: {}] ({}) {} is taxiing to {}", id, Stage::Claimed, aircraft.name(), self.name),
        );
        debug!(runway = %self.name, aircraft = %id, "taxiing");
        sleep(timings.taxi_ms.sample_ms()).await;

        // a flying aircraft lands, a landed one takes off
        let landing = aircraft.is_flying();
        if let Err(e) = aircraft.set_at_runway() {
            warn!(runway = %self.name, aircraft = %id, error = %e, "runway entry rejected");
        }
        aircraft.advance_stage(Stage::OnRunway);
        self.set_phase(Phase::Active);
        let action = if landing { "is landing on" } else { "is taking off from" };
        events.append(
            id,
            format!("[ID: {}] ({}) {} {} {}", id, Stage::OnRunway, aircraft.name(), action, self.name),
        );
        sleep(timings.runway_ms.sample_ms()).await;

        self.set_phase(Phase::Clearing);
        aircraft.unset_at_runway();
        if let Err(e) = aircraft.switch_status() {
            warn!(runway = %self.name, aircraft = %id, error = %e, "status switch rejected");
        }
        aircraft.advance_stage(Stage::FINAL);
        let message = if landing {
            self.arrivals.fetch_add(1, Ordering::AcqRel);
            format!(
                "[ID: {}] ({}) {} has landed on {}, arrived from {}",
                id,
                Stage::FINAL,
                aircraft.name(),
                self.name,
                aircraft.destination()
            )
        } else {
            self.departures.fetch_add(1, Ordering::AcqRel);
            format!(
                "[ID: {}] ({}) {} has departed from {} to {}",
                id,
                Stage::FINAL,
                aircraft.name(),
                self.name,
                aircraft.destination()
            )
        };
        events.append(id, message);
        sleep(timings.clearance_ms.sample_ms()).await;

        self.vacate();
        info!(runway = %self.name, aircraft = %id, landing, "runway cleared");
    }
}

/// A running runway task and the token that stops it.
pub struct RunwayHandle {
    runway: Arc<Runway>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl RunwayHandle {
    pub fn spawn(
        runway: Arc<Runway>,
        holding: Arc<Holding>,
        events: Arc<dyn EventSink>,
        timings: Timings,
    ) -> RunwayHandle {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(runway.clone().run(holding, events, timings, cancel.clone()));
        RunwayHandle { runway, cancel, task }
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub async fn join(self) {
        if let Err(e) = self.task.await {
            error!(runway = %self.runway.name, error = %e, "runway task failed");
        }
    }
}
