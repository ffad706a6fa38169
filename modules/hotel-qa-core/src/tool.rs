use std::sync::Arc;

use ai_client::{tool_parameters, Tool, ToolDefinition};
use async_trait::async_trait;
use tracing::debug;

use crate::dataset::Dataset;
use crate::error::HotelError;
use crate::query::{query_hotels, QueryRequest};
use crate::render::render_table;

const DESCRIPTION: &str = "Query the hotel dataset. Call this for every question about hotels: \
filter by city and/or country (exact name, case-insensitive), by minimum star rating and by \
minimum cleanliness, comfort or facilities scores; optionally rank by one attribute (highest \
first) and cap the number of rows (1-10, default 10). Only pass filters the user actually asked \
for. Returns a text table with columns hotel_name, city, country, star_rating, cleanliness_base, \
comfort_base, facilities_base, or a line saying nothing matched.";

/// Exposes the query engine to the model as the `query_hotels` function.
pub struct QueryHotelsTool {
    dataset: Arc<Dataset>,
}

impl QueryHotelsTool {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self { dataset }
    }
}

#[async_trait]
impl Tool for QueryHotelsTool {
    const NAME: &'static str = "query_hotels";
    type Error = HotelError;
    type Args = QueryRequest;
    type Output = String;

    async fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: DESCRIPTION.to_string(),
            parameters: tool_parameters::<QueryRequest>(),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        let result = query_hotels(&self.dataset, &args)?;

        debug!(
            rows = result.len(),
            total_matches = result.total_matches(),
            sort_by = args.sort_by.as_deref().unwrap_or("-"),
            "query_hotels executed"
        );

        Ok(render_table(&result))
    }
}
