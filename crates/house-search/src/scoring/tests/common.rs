use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset};

use crate::commute::{CommuteRecord, Route, RouteSection};
use crate::listings::{
    InMemoryListingStore, KeySpace, Listing, ListingKey, ListingRepository, ListingStore,
};

pub(super) fn repository() -> (
    Arc<InMemoryListingStore>,
    ListingRepository<InMemoryListingStore>,
) {
    let store = Arc::new(InMemoryListingStore::new());
    let repository = ListingRepository::new(store.clone(), KeySpace::new("house-search"));
    (store, repository)
}

fn start() -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339("2024-05-01T08:00:00-06:00").expect("valid timestamp")
}

/// Transit route with `sections` equal legs adding up to `minutes`.
pub(super) fn transit_route(minutes: i64, sections: usize) -> Route {
    let leg = Duration::seconds(minutes * 60 / sections as i64);
    let mut departure = start();
    let mut legs = Vec::new();
    for index in 0..sections {
        let arrival = departure + leg;
        legs.push(RouteSection {
            kind: (if index % 2 == 0 { "pedestrian" } else { "transit" }).to_string(),
            departure,
            arrival,
        });
        departure = arrival;
    }
    Route { sections: legs }
}

pub(super) fn record(walk: f64, bike: f64, drive: f64, transit: f64, sections: usize) -> CommuteRecord {
    CommuteRecord {
        walk_minutes: Some(walk),
        bike_minutes: Some(bike),
        drive_minutes: Some(drive),
        transit_minutes: Some(transit),
        transit_route: Some(transit_route(transit as i64, sections)),
    }
}

pub(super) fn listing(price: Option<f64>, lot_size: Option<&str>) -> Listing {
    Listing {
        address: Some("123 King St.".to_string()),
        latitude: Some(51.0478),
        longitude: Some(-114.0593),
        price,
        bedrooms: Some(2.0),
        bathrooms: Some(1.0),
        size: Some("900 sqft".to_string()),
        lot_size: lot_size.map(str::to_string),
        property_type: Some("house".to_string()),
        photo: None,
    }
}

pub(super) fn seed_listing(
    repository: &ListingRepository<InMemoryListingStore>,
    key: &str,
    listing: &Listing,
) -> ListingKey {
    let key = ListingKey::new(key);
    repository.put_listing(&key, listing).expect("listing stored");
    key
}

pub(super) fn raw_set(store: &InMemoryListingStore, key: &str, value: &str) {
    store.set(key, value).expect("raw value stored");
}

pub(super) fn approx(left: f64, right: f64) -> bool {
    (left - right).abs() < 1e-9
}
