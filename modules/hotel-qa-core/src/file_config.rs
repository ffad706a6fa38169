use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Optional TOML overrides loaded from disk.
/// Secrets (API keys) stay as env vars.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub agent: AgentConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    pub name: Option<String>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatasetConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    pub max_tool_rounds: Option<usize>,
    /// Relative paths resolve against the config file's directory.
    pub system_prompt_path: Option<PathBuf>,
}

/// Load and parse a TOML config file. Relative paths inside it are resolved
/// against the file's own directory.
pub fn load_config(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let mut config: FileConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let resolve = |p: &mut Option<PathBuf>| {
        if let Some(found) = p.take() {
            *p = Some(if found.is_relative() {
                base.join(found)
            } else {
                found
            });
        }
    };
    resolve(&mut config.dataset.path);
    resolve(&mut config.agent.system_prompt_path);

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_full_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hotel-qa.toml");
        std::fs::write(
            &path,
            r#"
[model]
name = "gpt-4o"
temperature = 0.2

[dataset]
path = "data/hotels.csv"

[agent]
max_tool_rounds = 3
system_prompt_path = "/etc/hotel-qa/prompt.txt"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.model.name.as_deref(), Some("gpt-4o"));
        assert_eq!(config.model.temperature, Some(0.2));
        assert_eq!(config.dataset.path, Some(dir.path().join("data/hotels.csv")));
        assert_eq!(config.agent.max_tool_rounds, Some(3));
        assert_eq!(
            config.agent.system_prompt_path,
            Some(PathBuf::from("/etc/hotel-qa/prompt.txt"))
        );
    }

    #[test]
    fn test_sections_are_optional() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hotel-qa.toml");
        std::fs::write(&path, "[model]\nname = \"gpt-4o-mini\"\n").unwrap();

        let config = load_config(&path).unwrap();
        assert!(config.dataset.path.is_none());
        assert!(config.agent.max_tool_rounds.is_none());
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hotel-qa.toml");
        std::fs::write(&path, "[model]\nprovider = \"anthropic\"\n").unwrap();

        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_shipped_example_config_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/hotel-qa.toml");
        let config = load_config(&path).unwrap();
        assert_eq!(config.model.name.as_deref(), Some("gpt-4o-mini"));
        assert!(config
            .dataset
            .path
            .unwrap()
            .ends_with("../data/hotels.csv"));
    }
}
