use std::{path::Path, str::FromStr};

use locale_link::UserConfig;

/// Serialization formats a user configuration file may be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ConfigFormat {
    /// `{"defaultLanguage": "en", "otherLanguages": ["de"]}`
    Json,

    /// ```yaml
    /// defaultLanguage: en
    /// otherLanguages: [de]
    /// ```
    Yaml,

    /// ```toml
    /// defaultLanguage = "en"
    /// otherLanguages = ["de"]
    /// ```
    Toml,
}

impl FromStr for ConfigFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ConfigFormat::Json),
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "toml" => Ok(ConfigFormat::Toml),
            _ => Err(format!(
                "Unknown config format: '{}'. Supported formats: json, yaml, toml",
                s
            )),
        }
    }
}

impl ConfigFormat {
    /// Infer the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, String> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| format!("Cannot infer config format from path: {}", path.display()))?;
        extension.parse()
    }

    pub fn parse_str(&self, content: &str) -> Result<serde_json::Value, String> {
        match self {
            ConfigFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            ConfigFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
            ConfigFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        }
    }
}

/// Read a user configuration file, choosing the format from its extension
/// unless one is given.
pub fn load_user_config<P: AsRef<Path>>(
    path: P,
    format: Option<ConfigFormat>,
) -> Result<UserConfig, String> {
    let path = path.as_ref();
    let format = match format {
        Some(format) => format,
        None => ConfigFormat::from_path(path)?,
    };
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Error reading {}: {}", path.display(), e))?;
    let value = format
        .parse_str(&content)
        .map_err(|e| format!("Error parsing {}: {}", path.display(), e))?;
    UserConfig::from_value(value).map_err(|e| e.to_string())
}
