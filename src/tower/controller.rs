use crate::aircraft::{Aircraft, AircraftId, Stage};
use crate::airport::Airport;
use crate::config::Config;
use crate::dashboard::{Dashboard, Header};
use crate::error::Full;
use crate::event_log::{EventLog, EventSink};
use crate::runway::{Holding, Runway, RunwayHandle};
use crate::summary::RunSummary;
use crate::time::{Clock, Elapsed};
use std::sync::Arc;
use tokio::time::{Instant, MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Paces spawning, owns the runways and decides when the run is over.
pub struct TrafficController {
    config: Config,
    airport: Airport,
    holding: Arc<Holding>,
    runways: Vec<Arc<Runway>>,
    events: Arc<EventLog>,
    dashboard: Box<dyn Dashboard>,
}

impl TrafficController {
    pub fn new(
        config: Config,
        events: Arc<EventLog>,
        dashboard: Box<dyn Dashboard>,
    ) -> TrafficController {
        let holding = Arc::new(Holding::new(config.capacity));
        let runways = (1..=config.runways).map(|n| Arc::new(Runway::new(n))).collect();
        TrafficController {
            config,
            airport: Airport::new(),
            holding,
            runways,
            events,
            dashboard,
        }
    }

    #[cfg(test)]
    pub fn holding(&self) -> &Arc<Holding> {
        &self.holding
    }

    #[cfg(test)]
    pub fn runways(&self) -> &[Arc<Runway>] {
        &self.runways
    }

    /// Runs until every aircraft has been spawned and has left the holding
    /// area, or until `abort` fires. Runways are always joined before the
    /// summary is produced.
    pub async fn run(&mut self, abort: CancellationToken) -> RunSummary {
        let started_at = Clock::now();
        let start = Instant::now();
        let timings = self.config.timings.clone();
        info!(
            runways = self.config.runways,
            capacity = self.config.capacity,
            aircraft = self.config.aircraft,
            "tower online"
        );

        let handles = self
            .runways
            .iter()
            .map(|runway| {
                RunwayHandle::spawn(
                    runway.clone(),
                    self.holding.clone(),
                    self.events.clone(),
                    timings.clone(),
                )
            })
            .collect::<Vec<_>>();

        let mut changes = self.holding.subscribe();
        let mut ticker = interval(timings.tick());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick completes immediately
        ticker.tick().await;

        let mut remaining = self.config.aircraft;
        let mut countdown: Option<u64> = None;
        let mut aborted = false;

        loop {
            let spawning = remaining > 0 && !self.holding.is_full();
            if spawning {
                let ticks = *countdown.get_or_insert_with(|| {
                    let ticks = timings.spawn_delay_ticks.sample();
                    self.events.append(
                        AircraftId::SYSTEM,
                        format!("Creating an Aircraft in {} seconds", ticks),
                    );
                    ticks
                });
                if ticks == 0 {
                    countdown = None;
                    if self.spawn() {
                        remaining -= 1;
                    }
                }
            }

            self.render(start, started_at, remaining, countdown);

            if self.holding.is_empty() && remaining == 0 {
                debug!("holding area empty, nothing left to spawn");
                break;
            }

            tokio::select! {
                _ = ticker.tick() => {
                    if spawning {
                        if let Some(ticks) = countdown.as_mut() {
                            *ticks = ticks.saturating_sub(1);
                        }
                    }
                }
                _ = changes.changed() => {}
                _ = abort.cancelled() => {
                    warn!(remaining, holding = self.holding.len(), "run aborted");
                    aborted = true;
                    break;
                }
            }
        }

        for handle in &handles {
            handle.stop();
        }
        for handle in handles {
            handle.join().await;
        }

        let summary = RunSummary {
            runways: self.runways.iter().map(|r| r.stats()).collect(),
            started_at,
            ended_at: Clock::now(),
            elapsed: Elapsed(start.elapsed()),
            stranded: self.holding.len(),
            aborted,
        };
        info!(
            arrivals = summary.total_arrivals(),
            departures = summary.total_departures(),
            "tower offline"
        );
        if let Err(e) = self.dashboard.render_summary(&summary) {
            warn!(error = %e, "failed to render summary");
        }
        summary
    }

    /// Creates one aircraft and queues it. Departures are parked at the gate
    /// for boarding before they become visible to the runways.
    fn spawn(&self) -> bool {
        let aircraft = Arc::new(self.airport.new_aircraft());
        let id = aircraft.id();

        if aircraft.is_landed() {
            self.events.append(
                id,
                format!(
                    "[ID: {}] ({}) {} created and is waiting for departure to {}",
                    id,
                    Stage::Spawned,
                    aircraft.name(),
                    aircraft.destination()
                ),
            );
            if let Err(e) = aircraft.park(self.config.timings.boarding(), Instant::now()) {
                warn!(aircraft = %id, error = %e, "could not park for boarding");
            }
            self.queue_event(&aircraft, "is parked at the gate for boarding");
        } else {
            self.events.append(
                id,
                format!(
                    "[ID: {}] ({}) {} created and is arriving soon from {}",
                    id,
                    Stage::Spawned,
                    aircraft.name(),
                    aircraft.destination()
                ),
            );
            self.queue_event(&aircraft, "is holding for a landing slot");
        }
        aircraft.advance_stage(Stage::Queued);

        match self.holding.add(aircraft) {
            Ok(()) => {
                debug!(aircraft = %id, holding = self.holding.len(), "aircraft spawned");
                true
            }
            Err(Full(aircraft)) => {
                warn!(aircraft = %aircraft.id(), "holding area filled up before spawn");
                false
            }
        }
    }

    fn queue_event(&self, aircraft: &Aircraft, what: &str) {
        self.events.append(
            aircraft.id(),
            format!("[ID: {}] ({}) {} {}", aircraft.id(), Stage::Queued, aircraft.name(), what),
        );
    }

    fn render(&mut self, start: Instant, started_at: Clock, remaining: u32, countdown: Option<u64>) {
        let now = Instant::now();
        let aircraft = self
            .holding
            .snapshot()
            .iter()
            .map(|a| {
                a.check_parking(now);
                a.view()
            })
            .collect::<Vec<_>>();
        let runways = self.runways.iter().map(|r| r.view()).collect::<Vec<_>>();
        let logs = self.events.recent(self.config.log_depth);

        let header = Header {
            started_at,
            now: Clock::now(),
            elapsed: Elapsed(start.elapsed()),
            remaining,
            countdown,
            holding_full: self.holding.is_full(),
        };
        self.dashboard.render_header(&header);
        self.dashboard.render_aircraft(&aircraft, self.holding.capacity());
        self.dashboard.render_runways(&runways);
        self.dashboard.render_logs(&logs);
        if let Err(e) = self.dashboard.present() {
            warn!(error = %e, "failed to render dashboard");
        }
    }
}
