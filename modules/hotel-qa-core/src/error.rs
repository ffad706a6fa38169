//! Typed errors for dataset loading, querying and startup.

use std::path::PathBuf;

use ai_client::AiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HotelError {
    /// Backing CSV is missing, unreadable or malformed
    #[error("hotel data unavailable at {}: {reason}", path.display())]
    DataUnavailable { path: PathBuf, reason: String },

    /// `sort_by` did not name a sortable attribute
    #[error("unknown sort field '{0}' (expected one of: star_rating, cleanliness, comfort, facilities)")]
    UnknownSortField(String),

    /// LLM provider credential absent from the environment
    #[error("{0} environment variable is required")]
    CredentialMissing(String),

    #[error("configuration error: {0}")]
    Config(String),

    /// A conversation turn failed at the model boundary
    #[error(transparent)]
    Ai(#[from] AiError),
}

pub type HotelResult<T> = std::result::Result<T, HotelError>;
