use std::sync::Arc;

use serde::Serialize;

use super::domain::{Coordinate, Listing, ListingKey, LocationId};
use super::keys::{KeySpace, ScoreKind};
use super::store::{ListingStore, StoreError};
use crate::commute::CommuteRecord;

/// Scores currently persisted for one listing; `None` means never computed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListingScores {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downtown_commute: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_commute: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
}

/// Typed access to listing data over a raw key-value store. Decoding
/// failures surface as [`StoreError::Malformed`].
pub struct ListingRepository<S> {
    store: Arc<S>,
    keys: KeySpace,
}

impl<S> Clone for ListingRepository<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            keys: self.keys.clone(),
        }
    }
}

impl<S: ListingStore> ListingRepository<S> {
    pub fn new(store: Arc<S>, keys: KeySpace) -> Self {
        Self { store, keys }
    }

    pub fn keys(&self) -> &KeySpace {
        &self.keys
    }

    pub fn listing_keys(&self) -> Result<Vec<ListingKey>, StoreError> {
        let raw = self.store.scan_prefix(self.keys.listings_prefix())?;
        Ok(raw
            .iter()
            .filter_map(|key| self.keys.classify(key))
            .collect())
    }

    pub fn listing(&self, key: &ListingKey) -> Result<Option<Listing>, StoreError> {
        self.read_json(&self.keys.root(key))
    }

    pub fn put_listing(&self, key: &ListingKey, listing: &Listing) -> Result<(), StoreError> {
        self.write_json(&self.keys.root(key), listing)
    }

    /// Cached geocode; present only when both halves are stored.
    pub fn cached_coordinate(&self, key: &ListingKey) -> Result<Option<Coordinate>, StoreError> {
        let latitude = self.read_number(&self.keys.latitude(key))?;
        let longitude = self.read_number(&self.keys.longitude(key))?;
        Ok(match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinate::new(latitude, longitude)),
            _ => None,
        })
    }

    pub fn cache_coordinate(
        &self,
        key: &ListingKey,
        coordinate: Coordinate,
    ) -> Result<(), StoreError> {
        self.store
            .set(&self.keys.latitude(key), &coordinate.latitude.to_string())?;
        self.store
            .set(&self.keys.longitude(key), &coordinate.longitude.to_string())
    }

    pub fn downtown_record(&self, key: &ListingKey) -> Result<Option<CommuteRecord>, StoreError> {
        self.read_record(&self.keys.downtown(key))
    }

    pub fn put_downtown_record(
        &self,
        key: &ListingKey,
        record: &CommuteRecord,
    ) -> Result<(), StoreError> {
        self.write_json(&self.keys.downtown(key), record)
    }

    /// Every commute record stored against a custom point of interest.
    pub fn poi_records(
        &self,
        key: &ListingKey,
    ) -> Result<Vec<(LocationId, CommuteRecord)>, StoreError> {
        let prefix = self.keys.poi_prefix(key);
        let mut records = Vec::new();
        for raw in self.store.scan_prefix(&prefix)? {
            let Some(id) = raw.strip_prefix(&prefix) else {
                continue;
            };
            if let Some(record) = self.read_record(&raw)? {
                records.push((LocationId(id.to_string()), record));
            }
        }
        Ok(records)
    }

    pub fn put_poi_record(
        &self,
        key: &ListingKey,
        poi: &LocationId,
        record: &CommuteRecord,
    ) -> Result<(), StoreError> {
        self.write_json(&self.keys.poi(key, poi), record)
    }

    pub fn score(&self, key: &ListingKey, kind: ScoreKind) -> Result<Option<f64>, StoreError> {
        self.read_number(&self.keys.score(key, kind))
    }

    pub fn put_score(&self, key: &ListingKey, kind: ScoreKind, value: f64) -> Result<(), StoreError> {
        let raw_key = self.keys.score(key, kind);
        if !value.is_finite() {
            return Err(StoreError::malformed(&raw_key, "score is not a finite number"));
        }
        self.store.set(&raw_key, &value.to_string())
    }

    pub fn scores(&self, key: &ListingKey) -> Result<ListingScores, StoreError> {
        Ok(ListingScores {
            downtown_commute: self.score(key, ScoreKind::DowntownCommute)?,
            custom_commute: self.score(key, ScoreKind::CustomCommute)?,
            total: self.score(key, ScoreKind::Total)?,
        })
    }

    fn read_record(&self, raw_key: &str) -> Result<Option<CommuteRecord>, StoreError> {
        let Some(record) = self.read_json::<CommuteRecord>(raw_key)? else {
            return Ok(None);
        };
        record
            .validate()
            .map_err(|reason| StoreError::malformed(raw_key, reason))?;
        Ok(Some(record))
    }

    fn read_json<T: serde::de::DeserializeOwned>(
        &self,
        raw_key: &str,
    ) -> Result<Option<T>, StoreError> {
        match self.store.get(raw_key)? {
            Some(value) => serde_json::from_str(&value)
                .map(Some)
                .map_err(|err| StoreError::malformed(raw_key, err)),
            None => Ok(None),
        }
    }

    fn write_json<T: Serialize>(&self, raw_key: &str, value: &T) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(value).map_err(|source| StoreError::Encode {
            key: raw_key.to_string(),
            source,
        })?;
        self.store.set(raw_key, &encoded)
    }

    fn read_number(&self, raw_key: &str) -> Result<Option<f64>, StoreError> {
        match self.store.get(raw_key)? {
            Some(value) => match value.trim().parse::<f64>() {
                Ok(number) if number.is_finite() => Ok(Some(number)),
                Ok(_) => Err(StoreError::malformed(raw_key, "score is not a finite number")),
                Err(err) => Err(StoreError::malformed(raw_key, err)),
            },
            None => Ok(None),
        }
    }
}
