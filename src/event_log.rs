use crate::aircraft::AircraftId;
use crate::summary::RunSummary;
use crate::time::Clock;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};

/// Write-only side of the event log, as seen by the controller and runways.
pub trait EventSink: Send + Sync {
    fn append(&self, owner: AircraftId, message: String);
}

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub owner: AircraftId,
    pub at: Clock,
    pub message: String,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.at, self.message)
    }
}

/// Append-only, in-memory record of the run. Written to disk once at the end.
#[derive(Default)]
pub struct EventLog {
    events: Mutex<Vec<Event>>,
}

impl EventSink for EventLog {
    fn append(&self, owner: AircraftId, message: String) {
        self.events().push(Event {
            owner,
            at: Clock::now(),
            message,
        });
    }
}

impl EventLog {
    pub fn new() -> EventLog {
        EventLog::default()
    }

    fn events(&self) -> MutexGuard<'_, Vec<Event>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.events().len()
    }

    pub fn snapshot(&self) -> Vec<Event> {
        self.events().clone()
    }

    /// The newest `depth` events, newest first.
    pub fn recent(&self, depth: usize) -> Vec<Event> {
        self.events().iter().rev().take(depth).cloned().collect()
    }

    #[cfg(test)]
    pub fn for_owner(&self, owner: AircraftId) -> Vec<Event> {
        self.events()
            .iter()
            .filter(|e| e.owner == owner)
            .cloned()
            .collect()
    }

    /// Groups events into one block per aircraft, ordered by ID. The n-th
    /// system event opens the block of aircraft n.
    pub fn blocks(&self) -> Vec<Vec<Event>> {
        let events = self.snapshot();
        let mut spawns = vec![];
        let mut by_owner = BTreeMap::<AircraftId, Vec<Event>>::new();
        for event in events {
            if event.owner == AircraftId::SYSTEM {
                spawns.push(event);
            } else {
                by_owner.entry(event.owner).or_default().push(event);
            }
        }

        let highest = by_owner.keys().next_back().map(|id| id.0 as usize).unwrap_or(0);
        let count = highest.max(spawns.len());
        let mut spawns = spawns.into_iter();

        (1..=count)
            .map(|n| {
                let mut block = spawns.next().into_iter().collect::<Vec<_>>();
                if let Some(owned) = by_owner.remove(&AircraftId(n as u32)) {
                    block.extend(owned);
                }
                block
            })
            .filter(|block| !block.is_empty())
            .collect()
    }

    pub fn write_report<W: Write>(&self, mut out: W, summary: &RunSummary) -> io::Result<()> {
        writeln!(out, "Start time: {}", summary.started_at)?;
        writeln!(out)?;
        for block in self.blocks() {
            for event in block {
                writeln!(out, "{}", event)?;
            }
            writeln!(out)?;
        }
        writeln!(out, "{}", summary)?;
        out.flush()
    }

    /// Writes the sorted log to `path`. Failures are reported, never raised.
    pub fn save(&self, path: &Path, summary: &RunSummary) {
        let result = File::create(path)
            .and_then(|file| self.write_report(BufWriter::new(file), summary));
        match result {
            Ok(()) => info!(path = %path.display(), events = self.len(), "event log written"),
            Err(e) => warn!(path = %path.display(), error = %e, "failed to write event log"),
        }
    }
}
