use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for the workbox core.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkboxConfig {
    /// Pagination settings
    pub pagination: PaginationConfig,
    /// Command resolution and execution settings
    pub commands: CommandConfig,
    /// State display settings
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaginationConfig {
    /// Page size used when the user has no stored preference
    pub default_page_size: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CommandConfig {
    /// Above this raw item count, command visibility is computed at the
    /// state level instead of per item (precision/cost trade-off)
    pub state_filtering_item_threshold: usize,
    /// Prompt once for a single comment covering a whole bulk operation
    pub single_comment_for_bulk: bool,
    /// Maximum accepted comment length in characters
    pub comment_max_length: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DisplayConfig {
    /// Show states with no actionable commands, hiding only final states
    /// that hold no items
    pub show_empty_states: bool,
}

impl Default for WorkboxConfig {
    fn default() -> Self {
        Self {
            pagination: PaginationConfig {
                default_page_size: 10,
            },
            commands: CommandConfig {
                state_filtering_item_threshold: 500,
                single_comment_for_bulk: false,
                comment_max_length: 2000,
            },
            display: DisplayConfig {
                show_empty_states: false,
            },
        }
    }
}

impl WorkboxConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (workbox.toml)
    /// 3. Environment variables (prefixed with WORKBOX__)
    pub fn load() -> Result<Self> {
        let defaults = Config::try_from(&WorkboxConfig::default())?;
        let mut builder = Config::builder().add_source(defaults);

        if Path::new("workbox.toml").exists() {
            builder = builder.add_source(File::with_name("workbox"));
        }

        builder = builder.add_source(
            Environment::with_prefix("WORKBOX")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = WorkboxConfig::default();
        assert_eq!(config.pagination.default_page_size, 10);
        assert_eq!(config.commands.state_filtering_item_threshold, 500);
        assert_eq!(config.commands.comment_max_length, 2000);
        assert!(!config.commands.single_comment_for_bulk);
        assert!(!config.display.show_empty_states);
    }

    #[test]
    fn roundtrips_through_toml() {
        let config = WorkboxConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let back: WorkboxConfig = toml::from_str(&text).unwrap();
        assert_eq!(
            back.commands.comment_max_length,
            config.commands.comment_max_length
        );
        assert_eq!(
            back.pagination.default_page_size,
            config.pagination.default_page_size
        );
    }

    #[test]
    fn save_writes_parseable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workbox.toml");
        WorkboxConfig::default().save_to_file(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let back: WorkboxConfig = toml::from_str(&text).unwrap();
        assert_eq!(back.pagination.default_page_size, 10);
    }
}
