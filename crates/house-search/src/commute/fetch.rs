use std::sync::Arc;

use tracing::{error, info, warn};

use super::provider::{GeocodingProvider, ProviderError, TravelTimeProvider};
use super::record::{CommuteRecord, TravelMode};
use crate::listings::{
    Coordinate, ListingKey, ListingRepository, ListingStore, Location, LocationId, StoreError,
};

/// Failure to produce a commute record for one listing/destination pair.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("listing '{0}' has no stored record")]
    MissingListing(ListingKey),
    #[error("listing '{0}' has neither coordinates nor an address to geocode")]
    MissingAddress(ListingKey),
    #[error("every travel mode failed for this pair of locations")]
    NoObservations,
}

/// Tally of a downtown fetch run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchReport {
    pub fetched: Vec<ListingKey>,
    pub cached: Vec<ListingKey>,
    pub failed: Vec<(ListingKey, String)>,
}

/// Produces commute records by querying the travel-time provider and files
/// them under the listing.
pub struct CommuteFetcher<S, P, G> {
    repository: ListingRepository<S>,
    routes: Arc<P>,
    geocoder: Arc<G>,
    downtown: Location,
}

impl<S, P, G> CommuteFetcher<S, P, G>
where
    S: ListingStore,
    P: TravelTimeProvider,
    G: GeocodingProvider,
{
    pub fn new(
        repository: ListingRepository<S>,
        routes: Arc<P>,
        geocoder: Arc<G>,
        downtown: Coordinate,
    ) -> Self {
        Self {
            repository,
            routes,
            geocoder,
            downtown: Location::new(downtown),
        }
    }

    /// Coordinate lookup order: cached geocode, listing record, then a fresh
    /// geocode of the listing address (which is cached for next time).
    pub fn resolve_location(&self, key: &ListingKey) -> Result<Location, FetchError> {
        if let Some(coordinate) = self.repository.cached_coordinate(key)? {
            return Ok(Location::for_listing(coordinate, key.clone()));
        }

        let listing = self
            .repository
            .listing(key)?
            .ok_or_else(|| FetchError::MissingListing(key.clone()))?;

        let (coordinate, address) = match listing.coordinate() {
            Some(coordinate) => (coordinate, listing.address.clone()),
            None => {
                let address = listing
                    .address
                    .as_deref()
                    .filter(|address| !address.trim().is_empty())
                    .ok_or_else(|| FetchError::MissingAddress(key.clone()))?;
                let place = self.geocoder.geocode(address)?;
                info!(listing = %key, here_id = %place.id, "geocoded listing address");
                (place.coordinate, Some(place.address))
            }
        };

        self.repository.cache_coordinate(key, coordinate)?;
        let mut location = Location::for_listing(coordinate, key.clone());
        location.address = address;
        Ok(location)
    }

    /// Query every mode between two points. A mode whose request fails for
    /// transport reasons is left absent; a "no route" answer aborts the pair.
    pub fn fetch_record(
        &self,
        from: Coordinate,
        to: Coordinate,
    ) -> Result<CommuteRecord, FetchError> {
        let mut record = CommuteRecord::default();

        for mode in TravelMode::ordered() {
            match self.routes.route(mode, from, to) {
                Ok(route) => {
                    record.set_minutes(mode, Some(route.duration_minutes()));
                    if mode == TravelMode::Transit {
                        record.transit_route = Some(route);
                    }
                }
                Err(err) if err.is_semantic() => return Err(err.into()),
                Err(err) => {
                    warn!(%mode, error = %err, "route query failed; mode left unobserved");
                }
            }
        }

        if !record.has_observations() {
            return Err(FetchError::NoObservations);
        }
        Ok(record)
    }

    /// Fetch and store (overwriting) the downtown record for one listing.
    pub fn fetch_downtown_for_one(&self, key: &ListingKey) -> Result<CommuteRecord, FetchError> {
        let origin = self.resolve_location(key)?;
        let record = self.fetch_record(origin.coordinate, self.downtown.coordinate)?;
        self.repository.put_downtown_record(key, &record)?;
        Ok(record)
    }

    /// Fill in missing downtown records across every listing. Existing
    /// records are kept unless `refresh` is set.
    pub fn fetch_downtown_for_all(&self, refresh: bool) -> Result<FetchReport, StoreError> {
        let keys = self.repository.listing_keys()?;
        info!(listings = keys.len(), refresh, "checking downtown commute data");

        let mut report = FetchReport::default();
        for key in keys {
            if !refresh {
                match self.repository.downtown_record(&key) {
                    Ok(Some(_)) => {
                        report.cached.push(key);
                        continue;
                    }
                    Ok(None) => {}
                    Err(err) => {
                        warn!(listing = %key, error = %err, "stored downtown record unreadable; refetching");
                    }
                }
            }

            match self.fetch_downtown_for_one(&key) {
                Ok(_) => report.fetched.push(key),
                Err(err) => {
                    error!(listing = %key, error = %err, "downtown commute fetch failed");
                    report.failed.push((key, err.to_string()));
                }
            }
        }
        Ok(report)
    }

    /// Fetch a commute record towards a custom point of interest and attach
    /// it to the listing under the point's derived id.
    pub fn attach_point_of_interest(
        &self,
        key: &ListingKey,
        poi: Coordinate,
    ) -> Result<LocationId, FetchError> {
        let origin = self.resolve_location(key)?;
        let destination = Location::new(poi);
        let record = self.fetch_record(origin.coordinate, destination.coordinate)?;
        let id = destination.id();
        self.repository.put_poi_record(key, &id, &record)?;
        info!(listing = %key, poi = %id, "attached point of interest");
        Ok(id)
    }
}
