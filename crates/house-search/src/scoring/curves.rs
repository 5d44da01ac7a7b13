use crate::commute::TravelMode;

pub const MAX_SCORE: f64 = 10.0;

/// Transit routes with fewer legs than this earn the simplicity bonus.
const SIMPLE_TRANSIT_SECTIONS: usize = 3;
const SIMPLE_TRANSIT_BONUS: f64 = 1.0;

/// Linear decay from `MAX_SCORE` at `perfect` minutes down to zero at `max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreCurve {
    pub perfect: f64,
    pub max: f64,
    pub slope: f64,
}

impl ScoreCurve {
    pub const WALK: Self = Self {
        perfect: 10.0,
        max: 30.0,
        slope: 0.5,
    };
    pub const BIKE: Self = Self {
        perfect: 15.0,
        max: 60.0,
        slope: 2.0 / 9.0,
    };
    pub const DRIVE: Self = Self {
        perfect: 10.0,
        max: 45.0,
        slope: 2.0 / 7.0,
    };
    pub const TRANSIT: Self = Self {
        perfect: 25.0,
        max: 60.0,
        slope: 2.0 / 7.0,
    };

    pub const fn for_mode(mode: TravelMode) -> Self {
        match mode {
            TravelMode::Walk => Self::WALK,
            TravelMode::Bike => Self::BIKE,
            TravelMode::Drive => Self::DRIVE,
            TravelMode::Transit => Self::TRANSIT,
        }
    }

    pub fn score(&self, minutes: f64) -> f64 {
        match self.band(minutes) {
            Band::Perfect => MAX_SCORE,
            Band::TooFar => 0.0,
            Band::Decay(score) => score,
        }
    }

    fn band(&self, minutes: f64) -> Band {
        if minutes <= self.perfect {
            Band::Perfect
        } else if minutes >= self.max {
            Band::TooFar
        } else {
            Band::Decay(MAX_SCORE - (minutes - self.perfect) * self.slope)
        }
    }
}

enum Band {
    Perfect,
    TooFar,
    Decay(f64),
}

/// Transit score with the simplicity bonus: inside the decay band a route
/// with fewer than three sections gains one point, capped at `MAX_SCORE`.
/// An unknown section count earns no bonus.
pub fn transit_score(minutes: f64, sections: Option<usize>) -> f64 {
    match ScoreCurve::TRANSIT.band(minutes) {
        Band::Perfect => MAX_SCORE,
        Band::TooFar => 0.0,
        Band::Decay(score) => match sections {
            Some(count) if count < SIMPLE_TRANSIT_SECTIONS => {
                (score + SIMPLE_TRANSIT_BONUS).min(MAX_SCORE)
            }
            _ => score,
        },
    }
}

/// Score one observed duration for `mode`.
pub fn mode_score(mode: TravelMode, minutes: f64, transit_sections: Option<usize>) -> f64 {
    match mode {
        TravelMode::Transit => transit_score(minutes, transit_sections),
        other => ScoreCurve::for_mode(other).score(minutes),
    }
}
