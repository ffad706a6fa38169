pub mod config;
pub mod dataset;
pub mod error;
pub mod file_config;
pub mod prompt;
pub mod query;
pub mod render;
pub mod session;
pub mod tool;
pub mod types;

pub use config::AppConfig;
pub use dataset::{Dataset, DatasetStore};
pub use error::{HotelError, HotelResult};
pub use file_config::FileConfig;
pub use query::{clamp_limit, query_hotels, QueryRequest, QueryResult};
pub use render::render_table;
pub use session::{ChatSession, TranscriptEntry};
pub use tool::QueryHotelsTool;
pub use types::{HotelRecord, SortField};
