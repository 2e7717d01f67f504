use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "notedown.config.json";

/// Notedown configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory containing .md notes
    #[serde(default = "default_notes_dir")]
    pub notes_dir: String,

    /// Export defaults
    #[serde(default)]
    pub export: ExportConfig,
}

fn default_notes_dir() -> String {
    "notes".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportConfig {
    /// Emit complete HTML documents rather than bare fragments
    #[serde(default = "default_true")]
    pub standalone: bool,

    /// Embed the default stylesheet in standalone exports
    #[serde(default = "default_true")]
    pub include_css: bool,

    /// Output directory for exported files
    #[serde(rename = "outDir", skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            standalone: true,
            include_css: true,
            out_dir: None,
        }
    }
}

impl Config {
    /// Load config from a directory, falling back to defaults when no
    /// config file exists.
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Get absolute path to the notes directory
    pub fn get_notes_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.notes_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            notes_dir: default_notes_dir(),
            export: ExportConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "notesDir": "journal",
            "export": {
                "standalone": false,
                "includeCss": false,
                "outDir": "dist"
            }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.notes_dir, "journal");
        assert!(!config.export.standalone);
        assert!(!config.export.include_css);
        assert_eq!(config.export.out_dir, Some("dist".to_string()));
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.notes_dir, "notes");
        assert!(config.export.standalone);
        assert!(config.export.include_css);
        assert_eq!(config.export.out_dir, None);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.notes_dir, "notes");
        assert!(config.export.standalone);
    }
}
