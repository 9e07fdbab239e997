use crate::error::ConfigError;
use rand::Rng;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Context, Editor, Helper, Highlighter, Hinter, Validator};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Largest holding area the dashboard can lay out.
pub const MAX_CAPACITY: usize = 999;
pub const MAX_RUNWAYS: usize = 99;

/// Inclusive range sampled uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub min: u64,
    pub max: u64,
}

impl Span {
    pub const fn new(min: u64, max: u64) -> Span {
        Span { min, max }
    }

    #[cfg(test)]
    pub const fn fixed(value: u64) -> Span {
        Span { min: value, max: value }
    }

    pub fn sample(&self) -> u64 {
        if self.min >= self.max {
            return self.min;
        }
        rand::thread_rng().gen_range(self.min..=self.max)
    }

    pub fn sample_ms(&self) -> Duration {
        Duration::from_millis(self.sample())
    }

    fn check(&self, field: &'static str) -> Result<(), ConfigError> {
        if self.min > self.max {
            return Err(ConfigError::InvertedSpan {
                field,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Pacing of the simulation. Spawn delays count controller ticks; the rest
/// are milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    pub tick_ms: u64,
    pub spawn_delay_ticks: Span,
    pub boarding_ms: u64,
    pub taxi_ms: Span,
    pub runway_ms: Span,
    pub clearance_ms: Span,
    pub idle_poll_ms: u64,
}

impl Default for Timings {
    fn default() -> Timings {
        Timings {
            tick_ms: 1000,
            spawn_delay_ticks: Span::new(4, 6),
            boarding_ms: 5000,
            taxi_ms: Span::new(1000, 2000),
            runway_ms: Span::new(2000, 3000),
            clearance_ms: Span::new(1000, 2000),
            idle_poll_ms: 250,
        }
    }
}

impl Timings {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn boarding(&self) -> Duration {
        Duration::from_millis(self.boarding_ms)
    }

    pub fn idle_poll(&self) -> Duration {
        Duration::from_millis(self.idle_poll_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub runways: usize,
    pub capacity: usize,
    pub log_depth: usize,
    pub aircraft: u32,
    pub timings: Timings,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            runways: 3,
            capacity: 5,
            log_depth: 5,
            aircraft: 10,
            timings: Timings::default(),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<Config, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&data)?;
        config.validate()
    }

    pub fn validate(self) -> Result<Config, ConfigError> {
        at_least("runways", self.runways as u64, 1)?;
        at_least("capacity", self.capacity as u64, 1)?;
        at_most("runways", self.runways, MAX_RUNWAYS)?;
        at_most("capacity", self.capacity, MAX_CAPACITY)?;
        at_least("tick_ms", self.timings.tick_ms, 1)?;
        at_least("idle_poll_ms", self.timings.idle_poll_ms, 1)?;
        self.timings.spawn_delay_ticks.check("spawn_delay_ticks")?;
        self.timings.taxi_ms.check("taxi_ms")?;
        self.timings.runway_ms.check("runway_ms")?;
        self.timings.clearance_ms.check("clearance_ms")?;
        Ok(self)
    }
}

fn at_least(field: &'static str, value: u64, min: u64) -> Result<(), ConfigError> {
    if value < min {
        return Err(ConfigError::TooSmall { field, value, min });
    }
    Ok(())
}

fn at_most(field: &'static str, value: usize, max: usize) -> Result<(), ConfigError> {
    if value > max {
        return Err(ConfigError::TooLarge {
            field,
            value: value as u64,
            max: max as u64,
        });
    }
    Ok(())
}

#[derive(Helper, Hinter, Highlighter, Validator)]
struct SetupHelper {
    choices: Vec<String>,
}

impl Completer for SetupHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        _pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let candidates = self
            .choices
            .iter()
            .filter(|c| c.starts_with(line))
            .map(|c| Pair {
                display: c.clone(),
                replacement: c.clone(),
            })
            .collect();
        Ok((0, candidates))
    }
}

type SetupEditor = Editor<SetupHelper, DefaultHistory>;

fn read_line(rl: &mut SetupEditor, prompt: &str) -> Result<String, ConfigError> {
    match rl.readline(prompt) {
        Ok(line) => Ok(line.trim().to_string()),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Err(ConfigError::Cancelled),
        Err(e) => Err(e.into()),
    }
}

fn ask_number(rl: &mut SetupEditor, prompt: &str) -> Result<u64, ConfigError> {
    loop {
        match read_line(rl, prompt)?.parse::<u64>() {
            Ok(n) => return Ok(n),
            Err(_) => println!("Please enter a whole number."),
        }
    }
}

/// Interactive setup menu. Returns the defaults or a validated custom setup.
pub fn prompt_setup() -> Result<Config, ConfigError> {
    let defaults = Config::default();
    println!("Airport Traffic Control v1.0\n");
    println!("1. Default Setup");
    println!(" - Aircrafts to spawn: {}", defaults.aircraft);
    println!(" - Logs to display: {}", defaults.log_depth);
    println!(" - Airport capacity: {}", defaults.capacity);
    println!(" - Runways: {}\n", defaults.runways);
    println!("2. Custom Setup\n");

    let config = rustyline::Config::builder()
        .completion_type(rustyline::CompletionType::List)
        .build();
    let mut rl: SetupEditor = Editor::with_config(config)?;
    rl.set_helper(Some(SetupHelper {
        choices: vec!["default".to_string(), "custom".to_string()],
    }));

    loop {
        match read_line(&mut rl, "Choice: ")?.as_str() {
            "1" | "default" => return Ok(defaults),
            "2" | "custom" => break,
            _ => continue,
        }
    }

    println!("\nCustom Setup\n");
    let aircraft = ask_number(&mut rl, "Aircrafts to spawn (recommended MAX=99): ")?;
    let log_depth = ask_number(&mut rl, "Logs to display (recommended MAX=10): ")?;
    let capacity = ask_number(&mut rl, "Airport capacity: ")?;
    let runways = ask_number(&mut rl, "Runways: ")?;

    Config {
        runways: runways as usize,
        capacity: capacity as usize,
        log_depth: log_depth as usize,
        aircraft: u32::try_from(aircraft).unwrap_or(u32::MAX),
        timings: defaults.timings,
    }
    .validate()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default().validate().unwrap();
        assert_eq!(
            (config.runways, config.capacity, config.log_depth, config.aircraft),
            (3, 5, 5, 10)
        );
    }

    #[test]
    fn test_zero_runways_rejected() {
        let config = Config { runways: 0, ..Config::default() };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TooSmall { field: "runways", value: 0, min: 1 })
        ));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = Config { capacity: 0, ..Config::default() };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TooSmall { field: "capacity", .. })
        ));
    }

    #[test]
    fn test_capacity_upper_bound() {
        let config = Config { capacity: MAX_CAPACITY, ..Config::default() };
        assert!(config.validate().is_ok());

        let config = Config { capacity: usize::MAX / 4, ..Config::default() };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TooLarge { field: "capacity", max: 999, .. })
        ));
    }

    #[test]
    fn test_runways_upper_bound() {
        let config = Config { runways: MAX_RUNWAYS + 1, ..Config::default() };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TooLarge { field: "runways", max: 99, .. })
        ));
    }

    #[test]
    fn test_zero_aircraft_allowed() {
        let config = Config { aircraft: 0, log_depth: 0, ..Config::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_inverted_span_rejected() {
        let mut config = Config::default();
        config.timings.taxi_ms = Span::new(500, 100);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedSpan { field: "taxi_ms", .. })
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"runways": 1, "timings": {"tick_ms": 10}}"#).unwrap();
        assert_eq!(config.runways, 1);
        assert_eq!(config.capacity, 5);
        assert_eq!(config.timings.tick_ms, 10);
        assert_eq!(config.timings.spawn_delay_ticks, Span::new(4, 6));
    }

    #[test]
    fn test_span_sample_in_range() {
        let span = Span::new(4, 6);
        for _ in 0..100 {
            assert!((4..=6).contains(&span.sample()));
        }
        assert_eq!(Span::fixed(3).sample(), 3);
    }
}
