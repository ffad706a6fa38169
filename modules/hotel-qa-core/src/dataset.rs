//! Hotel dataset loading.
//!
//! The CSV is parsed once per [`DatasetStore`]; every later `load()` hands out
//! the same `Arc<Dataset>`. Snapshots are never mutated, so they can be shared
//! across sessions without locking.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::error::{HotelError, HotelResult};
use crate::types::HotelRecord;

/// Columns the domain model is built from. The name column may also be `name`.
const REQUIRED_COLUMNS: &[&str] = &[
    "city",
    "country",
    "star_rating",
    "cleanliness_base",
    "comfort_base",
    "facilities_base",
];

/// Present in the raw file, irrelevant to querying. Must exist, then dropped.
const DISCARDED_COLUMNS: &[&str] = &["location_base", "staff_base", "value_for_money_base"];

#[derive(Debug, Deserialize)]
struct RawHotelRow {
    #[serde(alias = "name")]
    hotel_name: String,
    city: String,
    country: String,
    star_rating: f64,
    cleanliness_base: f64,
    comfort_base: f64,
    facilities_base: f64,
}

impl RawHotelRow {
    fn into_record(self) -> Result<HotelRecord> {
        let stars = self.star_rating;
        if !stars.is_finite() || stars.fract() != 0.0 || !(0.0..=f64::from(u8::MAX)).contains(&stars)
        {
            bail!("star_rating {} is not a whole number of stars", stars);
        }
        for (column, score) in [
            ("cleanliness_base", self.cleanliness_base),
            ("comfort_base", self.comfort_base),
            ("facilities_base", self.facilities_base),
        ] {
            if !score.is_finite() {
                bail!("{} {} is not a finite score", column, score);
            }
        }

        Ok(HotelRecord {
            name: self.hotel_name.trim().to_string(),
            city: self.city.trim().to_string(),
            country: self.country.trim().to_string(),
            star_rating: stars as u8,
            cleanliness_score: self.cleanliness_base,
            comfort_score: self.comfort_base,
            facilities_score: self.facilities_base,
        })
    }
}

/// Immutable, ordered hotel table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    hotels: Vec<HotelRecord>,
}

impl Dataset {
    pub fn from_records(hotels: Vec<HotelRecord>) -> Self {
        Self { hotels }
    }

    /// Parse CSV from any reader, dropping the unused score columns.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let headers = rdr.headers().context("Failed to read CSV header")?.clone();
        let has = |col: &str| headers.iter().any(|h| h == col);

        if !has("hotel_name") && !has("name") {
            bail!("missing column 'hotel_name'");
        }
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .chain(DISCARDED_COLUMNS)
            .copied()
            .filter(|col| !has(*col))
            .collect();
        if !missing.is_empty() {
            bail!("missing columns: {}", missing.join(", "));
        }

        let mut hotels = Vec::new();
        for (idx, row) in rdr.deserialize::<RawHotelRow>().enumerate() {
            // +2: one for the header, one for 1-based line numbers
            let line = idx + 2;
            let record = row
                .map_err(anyhow::Error::from)
                .and_then(RawHotelRow::into_record)
                .with_context(|| format!("invalid row at line {line}"))?;
            hotels.push(record);
        }

        Ok(Self { hotels })
    }

    pub fn hotels(&self) -> &[HotelRecord] {
        &self.hotels
    }

    pub fn len(&self) -> usize {
        self.hotels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hotels.is_empty()
    }
}

/// Lazily loads the dataset from disk exactly once and caches the snapshot.
#[derive(Debug)]
pub struct DatasetStore {
    path: PathBuf,
    snapshot: Mutex<Option<Arc<Dataset>>>,
}

impl DatasetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            snapshot: Mutex::new(None),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.snapshot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_some()
    }

    /// Return the cached snapshot, reading the file on first use.
    ///
    /// A failed read is not cached; the error goes straight to the caller.
    pub fn load(&self) -> HotelResult<Arc<Dataset>> {
        let mut guard = self
            .snapshot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(ref dataset) = *guard {
            return Ok(Arc::clone(dataset));
        }

        let dataset = Arc::new(read_file(&self.path).map_err(|e| {
            HotelError::DataUnavailable {
                path: self.path.clone(),
                reason: format!("{e:#}"),
            }
        })?);

        info!(
            path = %self.path.display(),
            hotels = dataset.len(),
            "Hotel dataset loaded"
        );

        *guard = Some(Arc::clone(&dataset));
        Ok(dataset)
    }
}

fn read_file(path: &Path) -> Result<Dataset> {
    let file = File::open(path).context("Failed to open dataset file")?;
    Dataset::from_reader(file)
}
