use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelMode {
    Walk,
    Bike,
    Drive,
    Transit,
}

impl TravelMode {
    pub const fn ordered() -> [Self; 4] {
        [Self::Walk, Self::Bike, Self::Drive, Self::Transit]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Walk => "walk",
            Self::Bike => "bike",
            Self::Drive => "drive",
            Self::Transit => "transit",
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One leg of a route (a walk to the stop, a bus ride, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSection {
    #[serde(default)]
    pub kind: String,
    pub departure: DateTime<FixedOffset>,
    pub arrival: DateTime<FixedOffset>,
}

impl RouteSection {
    pub fn seconds(&self) -> i64 {
        (self.arrival - self.departure).num_seconds().max(0)
    }
}

/// Route as returned by the travel-time provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Route {
    #[serde(default)]
    pub sections: Vec<RouteSection>,
}

impl Route {
    /// Total time across all sections, rounded up to whole minutes.
    pub fn duration_minutes(&self) -> f64 {
        let seconds: i64 = self.sections.iter().map(RouteSection::seconds).sum();
        (seconds as f64 / 60.0).ceil()
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }
}

/// Cached durations between a listing and one destination. A `None` duration
/// means that mode was never observed and takes no part in scoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommuteRecord {
    #[serde(default)]
    pub walk_minutes: Option<f64>,
    #[serde(default)]
    pub bike_minutes: Option<f64>,
    #[serde(default)]
    pub drive_minutes: Option<f64>,
    #[serde(default)]
    pub transit_minutes: Option<f64>,
    #[serde(default)]
    pub transit_route: Option<Route>,
}

impl CommuteRecord {
    pub fn minutes(&self, mode: TravelMode) -> Option<f64> {
        match mode {
            TravelMode::Walk => self.walk_minutes,
            TravelMode::Bike => self.bike_minutes,
            TravelMode::Drive => self.drive_minutes,
            TravelMode::Transit => self.transit_minutes,
        }
    }

    pub fn set_minutes(&mut self, mode: TravelMode, minutes: Option<f64>) {
        match mode {
            TravelMode::Walk => self.walk_minutes = minutes,
            TravelMode::Bike => self.bike_minutes = minutes,
            TravelMode::Drive => self.drive_minutes = minutes,
            TravelMode::Transit => self.transit_minutes = minutes,
        }
    }

    pub fn transit_sections(&self) -> Option<usize> {
        self.transit_route.as_ref().map(Route::section_count)
    }

    pub fn has_observations(&self) -> bool {
        TravelMode::ordered()
            .iter()
            .any(|mode| self.minutes(*mode).is_some())
    }

    /// Rejects negative or non-finite durations.
    pub fn validate(&self) -> Result<(), String> {
        for mode in TravelMode::ordered() {
            if let Some(minutes) = self.minutes(mode) {
                if !minutes.is_finite() || minutes < 0.0 {
                    return Err(format!("{mode} duration {minutes} is not a non-negative number"));
                }
            }
        }
        Ok(())
    }
}
