use crate::aircraft::{Aircraft, AircraftId, Status};
use rand::Rng;
use rand::seq::SliceRandom;
use std::sync::atomic::{AtomicU32, Ordering};

const AIRLINES: &[&str] = &[
    "AirAsia", "Malaysia", "Emirates", "Qantas", "Lufthansa", "Singapore", "Cathay", "KLM",
    "Qatar", "Etihad", "Garuda", "Firefly",
];

const CITIES: &[&str] = &[
    "Kuala Lumpur", "Singapore", "Tokyo", "London", "Sydney", "Dubai", "Bangkok", "Hong Kong",
    "Jakarta", "Seoul", "Paris", "Amsterdam", "Penang", "Kota Kinabalu",
];

/// Builds the aircraft of one run and hands out their IDs, starting at 1.
pub struct Airport {
    next_id: AtomicU32,
}

impl Default for Airport {
    fn default() -> Airport {
        Airport::new()
    }
}

impl Airport {
    pub fn new() -> Airport {
        Airport {
            next_id: AtomicU32::new(AircraftId::SYSTEM.0 + 1),
        }
    }

    pub fn next_id(&self) -> AircraftId {
        AircraftId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// A new aircraft with a random name, city and initial status.
    pub fn new_aircraft(&self) -> Aircraft {
        let mut rng = rand::thread_rng();
        let airline = AIRLINES.choose(&mut rng).copied().unwrap_or("Charter");
        let city = CITIES.choose(&mut rng).copied().unwrap_or("Kuala Lumpur");
        let name = format!("{} {}", airline, rng.gen_range(100..1000));
        let status = if rng.gen_bool(0.5) {
            Status::Flying
        } else {
            Status::Landed
        };
        Aircraft::new(self.next_id(), name, city, status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_sequential_from_one() {
        let airport = Airport::new();
        let ids = (0..5).map(|_| airport.new_aircraft().id()).collect::<Vec<_>>();
        assert_eq!(ids, (1..=5).map(AircraftId).collect::<Vec<_>>());
    }

    #[test]
    fn test_runs_do_not_share_ids() {
        let first = Airport::new();
        first.next_id();
        first.next_id();
        assert_eq!(Airport::new().next_id(), AircraftId(1));
    }

    #[test]
    fn test_new_aircraft_starts_flying_or_landed() {
        let airport = Airport::new();
        let mut seen_flying = false;
        let mut seen_landed = false;
        for _ in 0..200 {
            let ac = airport.new_aircraft();
            assert!(ac.name().len() <= 13);
            assert!(CITIES.contains(&ac.destination()));
            match ac.status() {
                Status::Flying => seen_flying = true,
                Status::Landed => seen_landed = true,
                other => panic!("unexpected initial status {}", other),
            }
        }
        assert!(seen_flying && seen_landed);
    }
}
