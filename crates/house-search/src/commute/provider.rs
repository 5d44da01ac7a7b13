use serde::{Deserialize, Serialize};

use super::record::{Route, TravelMode};
use crate::listings::Coordinate;

pub const NO_ROUTE_HINT: &str =
    "check that both endpoints are reachable and served by the same transit network";

/// External oracle returning a route between two coordinates for one mode.
pub trait TravelTimeProvider: Send + Sync {
    fn route(
        &self,
        mode: TravelMode,
        from: Coordinate,
        to: Coordinate,
    ) -> Result<Route, ProviderError>;
}

/// Address lookup used when a listing has no stored coordinate.
pub trait GeocodingProvider: Send + Sync {
    fn geocode(&self, query: &str) -> Result<GeocodedPlace, ProviderError>;
}

/// Best geocoding match for a free-text query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodedPlace {
    pub id: String,
    pub address: String,
    pub coordinate: Coordinate,
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Transport(String),
    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("provider response could not be decoded: {0}")]
    Decode(String),
    #[error("no {mode} route possible between these locations; {hint}")]
    NoRoute {
        mode: TravelMode,
        hint: &'static str,
    },
    #[error("no geocoding match for '{query}'")]
    NoMatch { query: String },
}

impl ProviderError {
    pub fn no_route(mode: TravelMode) -> Self {
        Self::NoRoute {
            mode,
            hint: NO_ROUTE_HINT,
        }
    }

    /// Whether the failure says something about the endpoints themselves
    /// rather than the transport.
    pub fn is_semantic(&self) -> bool {
        matches!(self, Self::NoRoute { .. })
    }
}
