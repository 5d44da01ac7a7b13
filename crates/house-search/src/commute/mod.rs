//! Travel-time observations between a listing and the places its owner cares about.

pub mod fetch;
pub mod here;
pub mod provider;
pub mod record;

pub use fetch::{CommuteFetcher, FetchError, FetchReport};
pub use here::HereClient;
pub use provider::{GeocodedPlace, GeocodingProvider, ProviderError, TravelTimeProvider};
pub use record::{CommuteRecord, Route, RouteSection, TravelMode};
