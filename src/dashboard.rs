use crate::aircraft::{AircraftView, Status};
use crate::event_log::Event;
use crate::runway::RunwayView;
use crate::summary::RunSummary;
use crate::time::{Clock, Elapsed};
use colored::Colorize;
use std::io::{self, Write};
use tabled::Table;
use tabled::builder::Builder;
use tabled::settings::{Alignment, Style};

/// Header line data for one tick.
#[derive(Debug, Clone)]
pub struct Header {
    pub started_at: Clock,
    pub now: Clock,
    pub elapsed: Elapsed,
    pub remaining: u32,
    pub countdown: Option<u64>,
    pub holding_full: bool,
}

/// Read-only view of the run, fed point-in-time copies once per tick.
pub trait Dashboard: Send {
    fn render_header(&mut self, header: &Header);
    fn render_aircraft(&mut self, aircraft: &[AircraftView], capacity: usize);
    fn render_runways(&mut self, runways: &[RunwayView]);
    fn render_logs(&mut self, logs: &[Event]);
    /// Pushes the composed frame out.
    fn present(&mut self) -> io::Result<()>;
    fn render_summary(&mut self, summary: &RunSummary) -> io::Result<()>;
}

/// Draws nothing. Used for `--quiet` and tests.
pub struct NullDashboard;

impl Dashboard for NullDashboard {
    fn render_header(&mut self, _header: &Header) {}
    fn render_aircraft(&mut self, _aircraft: &[AircraftView], _capacity: usize) {}
    fn render_runways(&mut self, _runways: &[RunwayView]) {}
    fn render_logs(&mut self, _logs: &[Event]) {}

    fn present(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn render_summary(&mut self, _summary: &RunSummary) -> io::Result<()> {
        Ok(())
    }
}

/// Redraws the whole terminal each tick.
pub struct TerminalDashboard<W: Write + Send> {
    out: W,
    frame: String,
}

impl TerminalDashboard<io::Stdout> {
    pub fn stdout() -> TerminalDashboard<io::Stdout> {
        TerminalDashboard::new(io::stdout())
    }
}

fn colored_status(status: Status) -> String {
    let label = status.to_string();
    match status {
        Status::Flying => label.cyan().to_string(),
        Status::Landed => label.green().to_string(),
        Status::Runway => label.yellow().bold().to_string(),
        Status::Parked => label.magenta().to_string(),
    }
}

impl<W: Write + Send> TerminalDashboard<W> {
    pub fn new(out: W) -> TerminalDashboard<W> {
        TerminalDashboard {
            out,
            frame: String::new(),
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> Dashboard for TerminalDashboard<W> {
    fn render_header(&mut self, header: &Header) {
        self.frame.push_str(&format!(
            "Start Time: {}\nCurrent Time: {} ({})\n\nRemaining Aircrafts: {}\n",
            header.started_at, header.now, header.elapsed, header.remaining
        ));
        match (header.remaining, header.countdown) {
            (0, _) => self.frame.push_str(&"Waiting for aircrafts to clear\n".dimmed().to_string()),
            (_, Some(ticks)) => self.frame.push_str(&format!("Next aircraft in {}s\n", ticks)),
            (_, None) if header.holding_full => {
                self.frame.push_str("Holding area full, spawning deferred\n")
            }
            (_, None) => {}
        }
        self.frame.push('\n');
    }

    fn render_aircraft(&mut self, aircraft: &[AircraftView], capacity: usize) {
        let mut builder = Builder::default();
        builder.push_record(["ID", "AIRCRAFT NAME", "DESTINATION CITY", "STATUS", "STAGE"]);
        for view in aircraft {
            builder.push_record([
                view.id.to_string(),
                view.name.to_string(),
                view.destination.to_string(),
                colored_status(view.status),
                view.stage.to_string(),
            ]);
        }
        // free slots show as empty rows
        for _ in aircraft.len()..capacity {
            builder.push_record(["", "", "", "", ""]);
        }
        let mut table = builder.build();
        table.with(Style::rounded());
        table.with(Alignment::left());

        self.frame.push_str(&format!("{}\n{}\n\n", "Arrivals & Departures".bold(), table));
    }

    fn render_runways(&mut self, runways: &[RunwayView]) {
        let mut table = Table::new(runways);
        table.with(Style::rounded());
        table.with(Alignment::left());
        self.frame.push_str(&format!("{}\n{}\n\n", "Runways' status".bold(), table));
    }

    fn render_logs(&mut self, logs: &[Event]) {
        self.frame.push_str(&format!("{}\n", format!("Logs ({})", logs.len()).bold()));
        for event in logs {
            self.frame.push_str(&format!("{}\n", event));
        }
        self.frame.push('\n');
    }

    fn present(&mut self) -> io::Result<()> {
        // clear screen, cursor home
        write!(self.out, "\x1b[H\x1b[2J{}", self.frame)?;
        self.frame.clear();
        self.out.flush()
    }

    fn render_summary(&mut self, summary: &RunSummary) -> io::Result<()> {
        writeln!(self.out, "{}\n", "End".bold())?;
        writeln!(self.out, "{}", summary)?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aircraft::{AircraftId, Stage};
    use crate::runway::Phase;
    use std::sync::Arc;
    use std::time::Duration;

    fn header(remaining: u32, countdown: Option<u64>) -> Header {
        Header {
            started_at: Clock::now(),
            now: Clock::now(),
            elapsed: Elapsed(Duration::from_secs(3)),
            remaining,
            countdown,
            holding_full: false,
        }
    }

    #[test]
    fn test_frame_contains_every_section() {
        colored::control::set_override(false);
        let mut dashboard = TerminalDashboard::new(Vec::new());
        dashboard.render_header(&header(4, Some(2)));
        dashboard.render_aircraft(
            &[AircraftView {
                id: AircraftId(7),
                name: Arc::from("Qantas 101"),
                destination: Arc::from("Sydney"),
                status: Status::Parked,
                stage: Stage::Queued,
            }],
            3,
        );
        dashboard.render_runways(&[RunwayView {
            name: "Runway 1".into(),
            phase: Phase::Active,
            occupant: "Qatar 404 [ID: 2]".into(),
            arrivals: 1,
            departures: 0,
        }]);
        dashboard.render_logs(&[]);
        dashboard.present().unwrap();

        let text = String::from_utf8(dashboard.into_inner()).unwrap();
        assert!(text.starts_with("\x1b[H\x1b[2J"));
        assert!(text.contains("Remaining Aircrafts: 4"));
        assert!(text.contains("Next aircraft in 2s"));
        assert!(text.contains("Qantas 101"));
        assert!(text.contains("2/5"));
        assert!(text.contains("Qatar 404 [ID: 2]"));
        assert!(text.contains("Logs (0)"));
    }

    #[test]
    fn test_present_clears_frame() {
        colored::control::set_override(false);
        let mut dashboard = TerminalDashboard::new(Vec::new());
        dashboard.render_header(&header(0, None));
        dashboard.present().unwrap();
        dashboard.present().unwrap();
        let text = String::from_utf8(dashboard.into_inner()).unwrap();
        assert_eq!(text.matches("Waiting for aircrafts to clear").count(), 1);
    }
}
