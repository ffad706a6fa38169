//! Hotel query engine: conjunctive filters, optional descending sort, capped
//! result count. Pure; never touches the dataset it reads.

use schemars::gen::SchemaGenerator;
use schemars::schema::{InstanceType, Schema, SchemaObject};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer};

use crate::dataset::Dataset;
use crate::error::HotelResult;
use crate::types::{HotelRecord, SortField};

pub const DEFAULT_LIMIT: usize = 10;
pub const MAX_LIMIT: usize = 10;

/// Arguments of the `query_hotels` tool.
///
/// Every field is optional and `None` means "no filter". A threshold of `0`
/// is still an active filter.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, JsonSchema)]
#[serde(default)]
pub struct QueryRequest {
    /// City name to match exactly (case-insensitive). Omit to search every city.
    pub city: Option<String>,
    /// Country name to match exactly (case-insensitive). Omit to search every country.
    pub country: Option<String>,
    /// Minimum star rating, inclusive (1-5).
    #[serde(deserialize_with = "whole_number")]
    pub min_star_rating: Option<i64>,
    /// Minimum cleanliness score, inclusive.
    pub min_cleanliness: Option<f64>,
    /// Minimum comfort score, inclusive.
    pub min_comfort: Option<f64>,
    /// Minimum facilities score, inclusive.
    pub min_facilities: Option<f64>,
    /// Rank results by this attribute, highest first.
    #[schemars(schema_with = "sort_by_schema")]
    pub sort_by: Option<String>,
    /// Maximum number of hotels to return (1-10, default 10).
    #[serde(deserialize_with = "whole_number")]
    pub limit: Option<i64>,
}

/// Accepts `5` as well as `5.0`; models often emit integers as floats.
fn whole_number<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Int(i64),
        Float(f64),
    }

    match Option::<Number>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Number::Int(n)) => Ok(Some(n)),
        Some(Number::Float(f)) if f.is_finite() && f.fract() == 0.0 => Ok(Some(f as i64)),
        Some(Number::Float(f)) => Err(serde::de::Error::custom(format!(
            "expected a whole number, got {f}"
        ))),
    }
}

fn sort_by_schema(_gen: &mut SchemaGenerator) -> Schema {
    let mut schema = SchemaObject {
        instance_type: Some(InstanceType::String.into()),
        enum_values: Some(
            SortField::ALL
                .iter()
                .map(|f| serde_json::Value::from(f.as_str()))
                .collect(),
        ),
        ..Default::default()
    };
    schema.metadata().description =
        Some("Rank results by this attribute, highest first.".to_string());
    Schema::Object(schema)
}

impl QueryRequest {
    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn min_star_rating(mut self, stars: i64) -> Self {
        self.min_star_rating = Some(stars);
        self
    }

    pub fn min_cleanliness(mut self, score: f64) -> Self {
        self.min_cleanliness = Some(score);
        self
    }

    pub fn min_comfort(mut self, score: f64) -> Self {
        self.min_comfort = Some(score);
        self
    }

    pub fn min_facilities(mut self, score: f64) -> Self {
        self.min_facilities = Some(score);
        self
    }

    pub fn sort_by(mut self, field: impl Into<String>) -> Self {
        self.sort_by = Some(field.into());
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Clamp a requested row count into `1..=MAX_LIMIT`, defaulting to `DEFAULT_LIMIT`.
pub fn clamp_limit(limit: Option<i64>) -> usize {
    match limit {
        None => DEFAULT_LIMIT,
        Some(n) => n.clamp(1, MAX_LIMIT as i64) as usize,
    }
}

/// Hotels matching a request, in output order.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult<'a> {
    rows: Vec<&'a HotelRecord>,
    total_matches: usize,
}

impl<'a> QueryResult<'a> {
    pub fn rows(&self) -> &[&'a HotelRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Matches before the limit was applied.
    pub fn total_matches(&self) -> usize {
        self.total_matches
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a HotelRecord> + '_ {
        self.rows.iter().copied()
    }
}

/// Normalized filters, computed once per request.
struct Filters {
    city: Option<String>,
    country: Option<String>,
    min_star_rating: Option<i64>,
    min_cleanliness: Option<f64>,
    min_comfort: Option<f64>,
    min_facilities: Option<f64>,
}

/// Trimmed, lower-cased text filter. Blank strings can never match a hotel,
/// so they are treated as no filter.
fn text_filter(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_lowercase)
}

impl Filters {
    fn from_request(request: &QueryRequest) -> Self {
        Self {
            city: text_filter(&request.city),
            country: text_filter(&request.country),
            min_star_rating: request.min_star_rating,
            min_cleanliness: request.min_cleanliness,
            min_comfort: request.min_comfort,
            min_facilities: request.min_facilities,
        }
    }

    fn matches(&self, hotel: &HotelRecord) -> bool {
        fn at_least(value: f64, min: Option<f64>) -> bool {
            min.map_or(true, |min| value >= min)
        }

        self.city
            .as_ref()
            .map_or(true, |c| hotel.city.to_lowercase() == *c)
            && self
                .country
                .as_ref()
                .map_or(true, |c| hotel.country.to_lowercase() == *c)
            && self
                .min_star_rating
                .map_or(true, |min| i64::from(hotel.star_rating) >= min)
            && at_least(hotel.cleanliness_score, self.min_cleanliness)
            && at_least(hotel.comfort_score, self.min_comfort)
            && at_least(hotel.facilities_score, self.min_facilities)
    }
}

/// Run a request against a dataset snapshot.
///
/// Fails only when `sort_by` names an unknown attribute. An empty match set
/// is a normal result.
pub fn query_hotels<'a>(dataset: &'a Dataset, request: &QueryRequest) -> HotelResult<QueryResult<'a>> {
    let sort = request
        .sort_by
        .as_deref()
        .map(str::parse::<SortField>)
        .transpose()?;

    let filters = Filters::from_request(request);
    let mut rows: Vec<&HotelRecord> = dataset
        .hotels()
        .iter()
        .filter(|h| filters.matches(h))
        .collect();

    if let Some(field) = sort {
        // sort_by is stable: equal values keep dataset order
        rows.sort_by(|a, b| field.value(b).total_cmp(&field.value(a)));
    }

    let total_matches = rows.len();
    rows.truncate(clamp_limit(request.limit));

    Ok(QueryResult {
        rows,
        total_matches,
    })
}
