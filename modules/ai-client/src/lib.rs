pub mod error;
pub mod openai;
pub mod schema;
pub mod tool;
pub mod tool_loop;
pub mod traits;
pub mod util;

pub use error::{AiError, AiResult};
pub use openai::OpenAi;
pub use schema::tool_parameters;
pub use tool::{DynTool, Tool, ToolDefinition, ToolSet, ToolWrapper};
pub use tool_loop::{LoopOutcome, ToolLoop, DEFAULT_MAX_TOOL_ROUNDS};
pub use traits::{ChatModel, Message, MessageRole, ToolCall};
pub use util::{log_preview, truncate_to_char_boundary};
