//! Session configuration – everything `Document::start` needs, loadable from
//! JSON.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::backend::DocumentInfo;
use crate::error::Result;
use crate::page::Margins;
use crate::style::{default_styles, Style};

/// Settings for one document session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Page size name ("Letter", "A4", "ansi", ...). Unknown names use Letter.
    pub page_size: String,
    pub landscape: bool,
    pub margins: Margins,
    /// Style sheet; should contain a "Normal" style.
    pub styles: Vec<Style>,
    /// Custom TrueType font file, or a directory holding one.
    pub font_path: Option<PathBuf>,
    pub info: DocumentInfo,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            page_size: "Letter".to_string(),
            landscape: false,
            margins: Margins::word(),
            styles: default_styles(),
            font_path: None,
            info: DocumentInfo::default(),
        }
    }
}

impl SessionConfig {
    pub fn new(page_size: &str, landscape: bool, margins: Margins) -> Self {
        Self {
            page_size: page_size.to_string(),
            landscape,
            margins,
            ..Self::default()
        }
    }

    pub fn with_styles(mut self, styles: Vec<Style>) -> Self {
        self.styles = styles;
        self
    }

    pub fn with_font_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.font_path = Some(path.into());
        self
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn json_round_trip() {
        let config = SessionConfig::new("a4", true, Margins::narrow()).with_font_path("fonts/");
        let json = config.to_json().unwrap();
        let back = SessionConfig::from_json(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config = SessionConfig::from_json(r#"{ "page_size": "Legal" }"#).unwrap();
        assert_eq!(config.page_size, "Legal");
        assert!(!config.landscape);
        assert_eq!(config.margins, Margins::word());
        assert!(config.styles.iter().any(|s| s.name == "Normal"));
    }

    #[test]
    fn invalid_json_is_a_config_error() {
        let err = SessionConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
