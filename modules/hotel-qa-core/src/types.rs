use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::HotelError;

/// One hotel from the dataset. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HotelRecord {
    pub name: String,
    pub city: String,
    pub country: String,
    pub star_rating: u8,
    pub cleanliness_score: f64,
    pub comfort_score: f64,
    pub facilities_score: f64,
}

/// Numeric attribute a query can rank by. Ranking is always descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    StarRating,
    Cleanliness,
    Comfort,
    Facilities,
}

impl SortField {
    pub const ALL: [SortField; 4] = [
        SortField::StarRating,
        SortField::Cleanliness,
        SortField::Comfort,
        SortField::Facilities,
    ];

    /// Logical name accepted from callers.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::StarRating => "star_rating",
            SortField::Cleanliness => "cleanliness",
            SortField::Comfort => "comfort",
            SortField::Facilities => "facilities",
        }
    }

    /// Dataset column backing this field.
    pub fn column(&self) -> &'static str {
        match self {
            SortField::StarRating => "star_rating",
            SortField::Cleanliness => "cleanliness_base",
            SortField::Comfort => "comfort_base",
            SortField::Facilities => "facilities_base",
        }
    }

    pub fn value(&self, hotel: &HotelRecord) -> f64 {
        match self {
            SortField::StarRating => f64::from(hotel.star_rating),
            SortField::Cleanliness => hotel.cleanliness_score,
            SortField::Comfort => hotel.comfort_score,
            SortField::Facilities => hotel.facilities_score,
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = HotelError;

    /// Accepts the logical name or the backing column name, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        SortField::ALL
            .into_iter()
            .find(|f| f.as_str() == wanted || f.column() == wanted)
            .ok_or_else(|| HotelError::UnknownSortField(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_logical_and_column_names() {
        assert_eq!("cleanliness".parse::<SortField>().unwrap(), SortField::Cleanliness);
        assert_eq!("Comfort".parse::<SortField>().unwrap(), SortField::Comfort);
        assert_eq!("facilities_base".parse::<SortField>().unwrap(), SortField::Facilities);
        assert_eq!(" star_rating ".parse::<SortField>().unwrap(), SortField::StarRating);
    }

    #[test]
    fn test_parse_unknown_field() {
        let err = "price".parse::<SortField>().unwrap_err();
        assert!(matches!(err, HotelError::UnknownSortField(ref f) if f == "price"));
    }

    #[test]
    fn test_value_maps_to_attribute() {
        let hotel = HotelRecord {
            name: "A".into(),
            city: "Paris".into(),
            country: "France".into(),
            star_rating: 5,
            cleanliness_score: 9.0,
            comfort_score: 8.0,
            facilities_score: 7.0,
        };
        let values: Vec<f64> = SortField::ALL.iter().map(|f| f.value(&hotel)).collect();
        assert_eq!(values, vec![5.0, 9.0, 8.0, 7.0]);
    }
}
