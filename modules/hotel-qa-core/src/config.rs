use std::path::PathBuf;

use ai_client::DEFAULT_MAX_TOOL_ROUNDS;

use crate::error::{HotelError, HotelResult};
use crate::file_config::FileConfig;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f32 = 0.6;
pub const DEFAULT_HOTELS_CSV: &str = "data/hotels.csv";

/// Application configuration loaded from environment variables, optionally
/// overlaid with a TOML [`FileConfig`].
#[derive(Clone)]
pub struct AppConfig {
    // AI / LLM
    pub openai_api_key: String,
    pub openai_base_url: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tool_rounds: usize,
    pub system_prompt_path: Option<PathBuf>,

    // Data
    pub hotels_csv: PathBuf,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("openai_api_key", &preview(&self.openai_api_key))
            .field("openai_base_url", &self.openai_base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tool_rounds", &self.max_tool_rounds)
            .field("system_prompt_path", &self.system_prompt_path)
            .field("hotels_csv", &self.hotels_csv)
            .finish()
    }
}

impl AppConfig {
    /// Read configuration from the process environment (and `.env`, if present).
    pub fn from_env() -> HotelResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup. A missing or blank
    /// `OPENAI_API_KEY` is [`HotelError::CredentialMissing`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> HotelResult<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let openai_api_key = get("OPENAI_API_KEY")
            .ok_or_else(|| HotelError::CredentialMissing("OPENAI_API_KEY".to_string()))?;

        Ok(Self {
            openai_api_key,
            openai_base_url: get("OPENAI_BASE_URL"),
            model: get("HOTEL_QA_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: parse_or(get("HOTEL_QA_TEMPERATURE"), "HOTEL_QA_TEMPERATURE", DEFAULT_TEMPERATURE)?,
            max_tool_rounds: parse_or(
                get("HOTEL_QA_MAX_TOOL_ROUNDS"),
                "HOTEL_QA_MAX_TOOL_ROUNDS",
                DEFAULT_MAX_TOOL_ROUNDS,
            )?,
            system_prompt_path: get("HOTEL_QA_SYSTEM_PROMPT").map(PathBuf::from),
            hotels_csv: get("HOTELS_CSV")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_HOTELS_CSV)),
        })
    }

    /// Overlay values from a config file. File values win over env defaults.
    pub fn with_file(mut self, file: &FileConfig) -> HotelResult<Self> {
        if let Some(ref name) = file.model.name {
            self.model = name.clone();
        }
        if let Some(temperature) = file.model.temperature {
            self.temperature = temperature;
        }
        if let Some(ref path) = file.dataset.path {
            self.hotels_csv = path.clone();
        }
        if let Some(rounds) = file.agent.max_tool_rounds {
            self.max_tool_rounds = rounds;
        }
        if let Some(ref path) = file.agent.system_prompt_path {
            self.system_prompt_path = Some(path.clone());
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> HotelResult<()> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(HotelError::Config(format!(
                "temperature must be between 0 and 2, got {}",
                self.temperature
            )));
        }
        if self.max_tool_rounds == 0 {
            return Err(HotelError::Config(
                "max_tool_rounds must be at least 1".to_string(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(HotelError::Config("model name is empty".to_string()));
        }
        Ok(())
    }

    pub fn log_keys(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  OPENAI_API_KEY: {}", preview(&self.openai_api_key));
        tracing::info!(
            "  OPENAI_BASE_URL: {}",
            self.openai_base_url.as_deref().unwrap_or("<default>")
        );
        tracing::info!("  model: {} (temperature {})", self.model, self.temperature);
        tracing::info!("  max_tool_rounds: {}", self.max_tool_rounds);
        tracing::info!("  hotels_csv: {}", self.hotels_csv.display());
    }
}

fn preview(val: &str) -> String {
    let cut = ai_client::truncate_to_char_boundary(val, 5);
    format!("{}...({} chars)", cut, val.len())
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, key: &str, default: T) -> HotelResult<T> {
    match raw {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| HotelError::Config(format!("{key} has invalid value '{v}'"))),
    }
}
