use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Editor constants. Every field falls back to its default when absent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Offset between the image's stored coordinates and the rendered
    /// surface, submitted with every save.
    pub margin: u32,
    pub display_radius: f32,
    pub marker_class: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            margin: 96,
            display_radius: 32.0,
            marker_class: "stoma".to_string(),
        }
    }
}

impl EditorConfig {
    /// Missing file means defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("annotate.json");
        std::fs::write(&path, r#"{"margin": 32}"#).unwrap();

        let config = EditorConfig::load(&path).unwrap();
        assert_eq!(config.margin, 32);
        assert_eq!(config.display_radius, 32.0);
        assert_eq!(config.marker_class, "stoma");
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = EditorConfig::load(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("annotate.json");
        std::fs::write(&path, "{margin").unwrap();
        assert!(matches!(
            EditorConfig::load(&path),
            Err(ConfigError::Serde(_))
        ));
    }
}
