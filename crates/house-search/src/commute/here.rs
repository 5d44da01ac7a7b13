use chrono::{DateTime, FixedOffset};
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::provider::{GeocodedPlace, GeocodingProvider, ProviderError, TravelTimeProvider};
use super::record::{Route, RouteSection, TravelMode};
use crate::listings::Coordinate;

const ROUTER_URL: &str = "https://router.hereapi.com/v8/routes";
const TRANSIT_ROUTER_URL: &str = "https://transit.router.hereapi.com/v8/routes";
const GEOCODE_URL: &str = "https://geocode.search.hereapi.com/v1/geocode";

/// Blocking client for the HERE routing, transit, and geocoding APIs.
pub struct HereClient {
    client: Client,
    api_key: String,
}

impl HereClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .build()
            .map_err(|err| ProviderError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
        })
    }

    fn transport_mode(mode: TravelMode) -> Option<&'static str> {
        match mode {
            TravelMode::Walk => Some("pedestrian"),
            TravelMode::Bike => Some("bicycle"),
            TravelMode::Drive => Some("car"),
            TravelMode::Transit => None,
        }
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let response = self
            .client
            .get(url)
            .query(&[("apiKey", self.api_key.as_str())])
            .query(query)
            .send()
            .map_err(|err| ProviderError::Transport(err.to_string()))?;
        Self::decode(response)
    }

    fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ProviderError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_else(|_| "(no body)".to_string());
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json::<T>()
            .map_err(|err| ProviderError::Decode(err.to_string()))
    }
}

impl std::fmt::Debug for HereClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HereClient").finish_non_exhaustive()
    }
}

fn waypoint(coordinate: Coordinate) -> String {
    format!("{},{}", coordinate.latitude, coordinate.longitude)
}

#[derive(Debug, Deserialize)]
struct RoutesResponse {
    #[serde(default)]
    routes: Vec<HereRoute>,
}

#[derive(Debug, Deserialize)]
struct HereRoute {
    #[serde(default)]
    sections: Vec<HereSection>,
}

#[derive(Debug, Deserialize)]
struct HereSection {
    #[serde(rename = "type", default)]
    kind: String,
    departure: HereStop,
    arrival: HereStop,
}

#[derive(Debug, Deserialize)]
struct HereStop {
    time: DateTime<FixedOffset>,
}

impl RoutesResponse {
    fn into_route(self, mode: TravelMode) -> Result<Route, ProviderError> {
        let Some(route) = self.routes.into_iter().next() else {
            return Err(ProviderError::no_route(mode));
        };
        Ok(Route {
            sections: route
                .sections
                .into_iter()
                .map(|section| RouteSection {
                    kind: section.kind,
                    departure: section.departure.time,
                    arrival: section.arrival.time,
                })
                .collect(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    items: Vec<GeocodeItem>,
}

#[derive(Debug, Deserialize)]
struct GeocodeItem {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    position: GeocodePosition,
}

#[derive(Debug, Deserialize)]
struct GeocodePosition {
    lat: f64,
    lng: f64,
}

impl TravelTimeProvider for HereClient {
    fn route(
        &self,
        mode: TravelMode,
        from: Coordinate,
        to: Coordinate,
    ) -> Result<Route, ProviderError> {
        let mut query = vec![
            ("origin", waypoint(from)),
            ("destination", waypoint(to)),
        ];
        let url = match Self::transport_mode(mode) {
            Some(transport) => {
                query.push(("transportMode", transport.to_string()));
                ROUTER_URL
            }
            None => TRANSIT_ROUTER_URL,
        };

        debug!(%mode, origin = %query[0].1, destination = %query[1].1, "requesting route");
        let response: RoutesResponse = self.get_json(url, &query)?;
        response.into_route(mode)
    }
}

impl GeocodingProvider for HereClient {
    fn geocode(&self, query: &str) -> Result<GeocodedPlace, ProviderError> {
        debug!(query, "geocoding address");
        let response: GeocodeResponse = self.get_json(GEOCODE_URL, &[("q", query.to_string())])?;
        let item = response
            .items
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::NoMatch {
                query: query.to_string(),
            })?;
        Ok(GeocodedPlace {
            id: item.id,
            address: item.title,
            coordinate: Coordinate::new(item.position.lat, item.position.lng),
        })
    }
}
