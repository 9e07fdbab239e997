use chrono::{DateTime, Local};
use std::fmt;
use std::time::Duration;

/// Wall-clock time of day, `HH:MM:SS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Clock(pub DateTime<Local>);

impl Clock {
    pub fn now() -> Clock {
        Clock(Local::now())
    }
}

impl fmt::Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M:%S"))
    }
}

/// Run length, `MM:SS`. Minutes keep counting past the hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Elapsed(pub Duration);

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0.as_secs();
        write!(f, "{:02}:{:02}", secs / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_elapsed_format() {
        assert_eq!(Elapsed(Duration::from_secs(0)).to_string(), "00:00");
        assert_eq!(Elapsed(Duration::from_millis(65_900)).to_string(), "01:05");
        assert_eq!(Elapsed(Duration::from_secs(3725)).to_string(), "62:05");
    }

    #[test]
    fn test_clock_format() {
        let t = Local.with_ymd_and_hms(2024, 3, 9, 7, 4, 5).unwrap();
        assert_eq!(Clock(t).to_string(), "07:04:05");
    }
}
