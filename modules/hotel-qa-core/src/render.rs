//! Fixed-width text rendering of query results for the model's context.

use crate::query::QueryResult;
use crate::types::HotelRecord;

pub const NO_MATCHES: &str = "No hotels matched the requested filters.";

const COLUMNS: [&str; 7] = [
    "hotel_name",
    "city",
    "country",
    "star_rating",
    "cleanliness_base",
    "comfort_base",
    "facilities_base",
];

/// Text columns are left-aligned, numeric ones right-aligned.
const NUMERIC_FROM: usize = 3;

fn format_score(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

fn cells(hotel: &HotelRecord) -> [String; 7] {
    [
        hotel.name.clone(),
        hotel.city.clone(),
        hotel.country.clone(),
        hotel.star_rating.to_string(),
        format_score(hotel.cleanliness_score),
        format_score(hotel.comfort_score),
        format_score(hotel.facilities_score),
    ]
}

/// Render rows as an aligned table: header line, then one line per hotel,
/// no index column, no trailing whitespace.
pub fn render_table(result: &QueryResult<'_>) -> String {
    if result.is_empty() {
        return NO_MATCHES.to_string();
    }

    let rows: Vec<[String; 7]> = result.iter().map(cells).collect();

    let mut widths = COLUMNS.map(|c| c.chars().count());
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let header = COLUMNS.map(str::to_string);
    std::iter::once(&header)
        .chain(&rows)
        .map(|row| {
            let line = row
                .iter()
                .zip(widths)
                .enumerate()
                .map(|(i, (cell, width))| {
                    if i < NUMERIC_FROM {
                        format!("{cell:<width$}")
                    } else {
                        format!("{cell:>width$}")
                    }
                })
                .collect::<Vec<_>>()
                .join("  ");
            line.trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
