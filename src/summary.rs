use crate::time::{Clock, Elapsed};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunwayStats {
    pub name: String,
    pub arrivals: u32,
    pub departures: u32,
}

impl RunwayStats {
    pub fn total(&self) -> u32 {
        self.arrivals + self.departures
    }
}

/// Final statistics of one run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub runways: Vec<RunwayStats>,
    pub started_at: Clock,
    pub ended_at: Clock,
    pub elapsed: Elapsed,
    /// Aircraft still in the holding area when the run stopped. Zero unless aborted.
    pub stranded: usize,
    pub aborted: bool,
}

impl RunSummary {
    pub fn total_arrivals(&self) -> u32 {
        self.runways.iter().map(|r| r.arrivals).sum()
    }

    pub fn total_departures(&self) -> u32 {
        self.runways.iter().map(|r| r.departures).sum()
    }

    pub fn processed(&self) -> u32 {
        self.total_arrivals() + self.total_departures()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Runway Stats")?;
        for runway in &self.runways {
            writeln!(
                f,
                "- {}: {} [Arrivals: {:2} | Departures: {:2}]",
                runway.name,
                runway.total(),
                runway.arrivals,
                runway.departures
            )?;
        }
        writeln!(f)?;
        writeln!(f, "Total Arrivals: {}", self.total_arrivals())?;
        writeln!(f, "Total Departures: {}", self.total_departures())?;
        writeln!(f)?;
        writeln!(f, "End Time: {}", self.ended_at)?;
        writeln!(f, "Time Taken: {}", self.elapsed)?;
        write!(f, "Aircrafts Processed: {}", self.processed())?;
        if self.aborted {
            write!(f, "\nRun aborted with {} aircraft still holding", self.stranded)?;
        }
        Ok(())
    }
}
