use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration};
use house_search::commute::{
    CommuteFetcher, FetchError, GeocodedPlace, GeocodingProvider, ProviderError, Route,
    RouteSection, TravelMode, TravelTimeProvider,
};
use house_search::listings::{
    Coordinate, InMemoryListingStore, KeySpace, Listing, ListingKey, ListingRepository,
    ListingStore,
};

const DOWNTOWN: Coordinate = Coordinate {
    latitude: 51.04782,
    longitude: -114.0592,
};

enum Answer {
    Minutes(i64, usize),
    Transport,
    NoRoute,
}

struct FakeRoutes {
    answers: HashMap<TravelMode, Answer>,
    calls: Mutex<Vec<(TravelMode, Coordinate, Coordinate)>>,
}

impl FakeRoutes {
    fn new(answers: Vec<(TravelMode, Answer)>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn all(minutes: i64) -> Self {
        Self::new(
            TravelMode::ordered()
                .into_iter()
                .map(|mode| (mode, Answer::Minutes(minutes, 2)))
                .collect(),
        )
    }

    fn call_count(&self) -> usize {
        self.calls.lock().expect("calls mutex").len()
    }
}

fn route(minutes: i64, sections: usize) -> Route {
    let mut departure =
        DateTime::parse_from_rfc3339("2024-05-01T08:00:00-06:00").expect("timestamp");
    let leg = Duration::seconds(minutes * 60 / sections as i64);
    let mut legs = Vec::new();
    for _ in 0..sections {
        let arrival = departure + leg;
        legs.push(RouteSection {
            kind: "transit".to_string(),
            departure,
            arrival,
        });
        departure = arrival;
    }
    Route { sections: legs }
}

impl TravelTimeProvider for FakeRoutes {
    fn route(
        &self,
        mode: TravelMode,
        from: Coordinate,
        to: Coordinate,
    ) -> Result<Route, ProviderError> {
        self.calls
            .lock()
            .expect("calls mutex")
            .push((mode, from, to));
        match self.answers.get(&mode) {
            Some(Answer::Minutes(minutes, sections)) => Ok(route(*minutes, *sections)),
            Some(Answer::Transport) | None => {
                Err(ProviderError::Transport("connection reset".to_string()))
            }
            Some(Answer::NoRoute) => Err(ProviderError::no_route(mode)),
        }
    }
}

#[derive(Default)]
struct FakeGeocoder {
    queries: Mutex<Vec<String>>,
}

impl GeocodingProvider for FakeGeocoder {
    fn geocode(&self, query: &str) -> Result<GeocodedPlace, ProviderError> {
        self.queries
            .lock()
            .expect("queries mutex")
            .push(query.to_string());
        Ok(GeocodedPlace {
            id: "here:af:street:42".to_string(),
            address: format!("{query}, Calgary, AB"),
            coordinate: Coordinate::new(51.1, -114.1),
        })
    }
}

struct Harness {
    store: Arc<InMemoryListingStore>,
    repository: ListingRepository<InMemoryListingStore>,
    routes: Arc<FakeRoutes>,
    geocoder: Arc<FakeGeocoder>,
}

impl Harness {
    fn new(routes: FakeRoutes) -> Self {
        let store = Arc::new(InMemoryListingStore::new());
        let repository = ListingRepository::new(store.clone(), KeySpace::new("house-search"));
        Self {
            store,
            repository,
            routes: Arc::new(routes),
            geocoder: Arc::new(FakeGeocoder::default()),
        }
    }

    fn fetcher(&self) -> CommuteFetcher<InMemoryListingStore, FakeRoutes, FakeGeocoder> {
        CommuteFetcher::new(
            self.repository.clone(),
            self.routes.clone(),
            self.geocoder.clone(),
            DOWNTOWN,
        )
    }

    fn seed(&self, key: &str, listing: Listing) -> ListingKey {
        let key = ListingKey::new(key);
        self.repository
            .put_listing(&key, &listing)
            .expect("listing stored");
        key
    }
}

fn addressed(address: &str) -> Listing {
    Listing {
        address: Some(address.to_string()),
        price: Some(450000.0),
        ..Listing::default()
    }
}

#[test]
fn geocodes_missing_coordinates_once_and_caches_them() {
    let harness = Harness::new(FakeRoutes::all(20));
    let key = harness.seed("a", addressed("50-4769 Hubalta Rd SE"));
    let fetcher = harness.fetcher();

    let first = fetcher.resolve_location(&key).expect("resolved");
    let second = fetcher.resolve_location(&key).expect("resolved from cache");

    assert_eq!(first, second);
    assert_eq!(first.listing_key.as_ref(), Some(&key));
    assert_eq!(
        harness.geocoder.queries.lock().expect("queries").as_slice(),
        ["50-4769 Hubalta Rd SE"]
    );
    assert_eq!(
        harness.repository.cached_coordinate(&key).expect("read"),
        Some(Coordinate::new(51.1, -114.1))
    );
}

#[test]
fn listing_coordinates_are_used_before_geocoding() {
    let harness = Harness::new(FakeRoutes::all(20));
    let key = harness.seed(
        "a",
        Listing {
            latitude: Some(51.2),
            longitude: Some(-114.2),
            ..addressed("somewhere")
        },
    );

    let location = harness.fetcher().resolve_location(&key).expect("resolved");
    assert_eq!(location.coordinate, Coordinate::new(51.2, -114.2));
    assert!(harness.geocoder.queries.lock().expect("queries").is_empty());
}

#[test]
fn listing_without_coordinates_or_address_is_rejected() {
    let harness = Harness::new(FakeRoutes::all(20));
    let key = harness.seed("a", Listing::default());

    assert!(matches!(
        harness.fetcher().resolve_location(&key),
        Err(FetchError::MissingAddress(_))
    ));
}

#[test]
fn downtown_record_carries_every_mode_and_route_sections() {
    let harness = Harness::new(FakeRoutes::all(20));
    let key = harness.seed("a", addressed("1 Main St"));

    let record = harness
        .fetcher()
        .fetch_downtown_for_one(&key)
        .expect("fetched");

    for mode in TravelMode::ordered() {
        assert_eq!(record.minutes(mode), Some(20.0), "{mode}");
    }
    assert_eq!(record.transit_sections(), Some(2));
    assert_eq!(
        harness.repository.downtown_record(&key).expect("read"),
        Some(record)
    );
    let calls = harness.routes.calls.lock().expect("calls");
    assert!(calls.iter().all(|(_, _, to)| *to == DOWNTOWN));
}

#[test]
fn transport_failure_leaves_mode_unobserved() {
    let harness = Harness::new(FakeRoutes::new(vec![
        (TravelMode::Walk, Answer::Minutes(35, 1)),
        (TravelMode::Bike, Answer::Transport),
        (TravelMode::Drive, Answer::Minutes(12, 1)),
        (TravelMode::Transit, Answer::Minutes(40, 3)),
    ]));
    let key = harness.seed("a", addressed("1 Main St"));

    let record = harness
        .fetcher()
        .fetch_downtown_for_one(&key)
        .expect("fetched");
    assert_eq!(record.bike_minutes, None);
    assert_eq!(record.walk_minutes, Some(35.0));
}

#[test]
fn no_route_propagates_with_hint_and_writes_nothing() {
    let harness = Harness::new(FakeRoutes::new(vec![
        (TravelMode::Walk, Answer::Minutes(35, 1)),
        (TravelMode::Bike, Answer::Minutes(35, 1)),
        (TravelMode::Drive, Answer::Minutes(12, 1)),
        (TravelMode::Transit, Answer::NoRoute),
    ]));
    let key = harness.seed("a", addressed("1 Main St"));

    let err = harness
        .fetcher()
        .fetch_downtown_for_one(&key)
        .expect_err("no route");
    match &err {
        FetchError::Provider(provider) => assert!(provider.is_semantic()),
        other => panic!("expected provider error, got {other:?}"),
    }
    assert!(err.to_string().contains("transit network"));
    assert_eq!(harness.repository.downtown_record(&key).expect("read"), None);
}

#[test]
fn all_modes_failing_is_not_cached() {
    let harness = Harness::new(FakeRoutes::new(Vec::new()));
    let key = harness.seed("a", addressed("1 Main St"));

    assert!(matches!(
        harness.fetcher().fetch_downtown_for_one(&key),
        Err(FetchError::NoObservations)
    ));
}

#[test]
fn batch_fetch_keeps_cached_records_unless_refreshing() {
    let harness = Harness::new(FakeRoutes::all(20));
    let cached = harness.seed("cached", addressed("1 Main St"));
    let fresh = harness.seed("fresh", addressed("2 Main St"));
    let orphan = ListingKey::new("orphan");
    harness
        .store
        .set(&harness.repository.keys().root(&orphan), "{}")
        .expect("set");
    harness
        .fetcher()
        .fetch_downtown_for_one(&cached)
        .expect("prefetch");
    let calls_before = harness.routes.call_count();

    let report = harness
        .fetcher()
        .fetch_downtown_for_all(false)
        .expect("batch runs");
    assert_eq!(report.cached, vec![cached.clone()]);
    assert_eq!(report.fetched, vec![fresh.clone()]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, orphan);
    assert_eq!(harness.routes.call_count(), calls_before + 4);

    let refreshed = harness
        .fetcher()
        .fetch_downtown_for_all(true)
        .expect("batch runs");
    assert!(refreshed.cached.is_empty());
    assert_eq!(refreshed.fetched, vec![cached, fresh]);
}

#[test]
fn attaching_poi_files_record_under_derived_id() {
    let harness = Harness::new(FakeRoutes::all(20));
    let key = harness.seed("a", addressed("1 Main St"));
    let gym = Coordinate::new(51.0912345, -114.2);

    let id = harness
        .fetcher()
        .attach_point_of_interest(&key, gym)
        .expect("attached");

    assert_eq!(id, gym.id());
    assert!(harness
        .store
        .get(&format!("house-search:listings/a/poi/{id}"))
        .expect("get")
        .is_some());
    assert_eq!(harness.repository.poi_records(&key).expect("read").len(), 1);
}
