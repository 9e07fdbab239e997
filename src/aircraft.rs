use crate::error::TransitionError;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AircraftId(pub u32);

impl AircraftId {
    /// Owner of controller-level events such as spawn announcements.
    pub const SYSTEM: AircraftId = AircraftId(0);
}

impl fmt::Display for AircraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Flying,
    Landed,
    Runway,
    Parked,
}

impl Status {
    pub fn is_on_ground_or_air(self) -> bool {
        matches!(self, Status::Flying | Status::Landed)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Flying => "Flying",
            Status::Landed => "Landed",
            Status::Runway => "Runway",
            Status::Parked => "Parked",
        };
        f.pad(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Spawned = 1,
    Queued = 2,
    Claimed = 3,
    OnRunway = 4,
    Cleared = 5,
}

impl Stage {
    pub const FINAL: Stage = Stage::Cleared;

    pub fn number(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.number(), Stage::FINAL.number())
    }
}

#[derive(Debug)]
struct State {
    status: Status,
    previous: Option<Status>,
    stage: Stage,
    release_at: Option<Instant>,
}

impl State {
    // a restoration without a prior save captures the current status instead
    fn restore(&mut self) {
        match self.previous.take() {
            Some(previous) => self.status = previous,
            None => self.previous = Some(self.status),
        }
    }
}

/// A single aircraft. Identity is immutable; everything else sits behind a
/// per-aircraft lock so a reader never sees a half-applied transition.
#[derive(Debug)]
pub struct Aircraft {
    id: AircraftId,
    name: Arc<str>,
    destination: Arc<str>,
    state: Mutex<State>,
}

impl Aircraft {
    pub fn new(
        id: AircraftId,
        name: impl Into<Arc<str>>,
        destination: impl Into<Arc<str>>,
        status: Status,
    ) -> Aircraft {
        Aircraft {
            id,
            name: name.into(),
            destination: destination.into(),
            state: Mutex::new(State {
                status,
                previous: None,
                stage: Stage::Spawned,
                release_at: None,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn id(&self) -> AircraftId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn status(&self) -> Status {
        self.state().status
    }

    #[cfg(test)]
    pub fn stage(&self) -> Stage {
        self.state().stage
    }

    #[cfg(test)]
    pub fn release_at(&self) -> Option<Instant> {
        self.state().release_at
    }

    pub fn is_flying(&self) -> bool {
        self.status() == Status::Flying
    }

    pub fn is_landed(&self) -> bool {
        self.status() == Status::Landed
    }

    #[cfg(test)]
    pub fn is_runway(&self) -> bool {
        self.status() == Status::Runway
    }

    #[cfg(test)]
    pub fn is_parked(&self) -> bool {
        self.status() == Status::Parked
    }

    pub fn switch_status(&self) -> Result<(), TransitionError> {
        let mut state = self.state();
        state.status = match state.status {
            Status::Flying => Status::Landed,
            Status::Landed => Status::Flying,
            other => return Err(TransitionError::NotToggleable(other)),
        };
        Ok(())
    }

    pub fn set_at_runway(&self) -> Result<(), TransitionError> {
        let mut state = self.state();
        if !state.status.is_on_ground_or_air() {
            return Err(TransitionError::MidExcursion(state.status));
        }
        state.previous = Some(state.status);
        state.status = Status::Runway;
        Ok(())
    }

    pub fn unset_at_runway(&self) {
        self.state().restore();
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn set_parked(&self) -> Result<(), TransitionError> {
        let mut state = self.state();
        Self::enter_parking(&mut state)
    }

    fn enter_parking(state: &mut State) -> Result<(), TransitionError> {
        if state.status == Status::Parked {
            return Err(TransitionError::AlreadyParked);
        }
        state.previous = Some(state.status);
        state.status = Status::Parked;
        Ok(())
    }

    /// Parks the aircraft and arms its release at `now + duration`.
    pub fn park(&self, duration: Duration, now: Instant) -> Result<(), TransitionError> {
        let mut state = self.state();
        Self::enter_parking(&mut state)?;
        state.release_at = Some(now + duration);
        Ok(())
    }

    /// Releases a parked aircraft once its timer has expired. Returns whether
    /// a release happened on this call.
    pub fn check_parking(&self, now: Instant) -> bool {
        let mut state = self.state();
        match state.release_at {
            Some(release_at) if now >= release_at => {
                state.restore();
                state.release_at = None;
                true
            }
            _ => false,
        }
    }

    /// Moves the aircraft forward in its lifecycle. Never moves it back.
    pub fn advance_stage(&self, stage: Stage) {
        let mut state = self.state();
        if stage > state.stage {
            state.stage = stage;
        }
    }

    /// Polls parking, then reports whether a runway may take this aircraft.
    pub fn is_ready_for_runway(&self, now: Instant) -> bool {
        self.check_parking(now);
        self.status().is_on_ground_or_air()
    }

    pub fn view(&self) -> AircraftView {
        let state = self.state();
        AircraftView {
            id: self.id,
            name: self.name.clone(),
            destination: self.destination.clone(),
            status: state.status,
            stage: state.stage,
        }
    }
}

impl fmt::Display for Aircraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [ID: {}]", self.name, self.id)
    }
}

/// Point-in-time copy of an aircraft for display.
#[derive(Debug, Clone, PartialEq)]
pub struct AircraftView {
    pub id: AircraftId,
    pub name: Arc<str>,
    pub destination: Arc<str>,
    pub status: Status,
    pub stage: Stage,
}
