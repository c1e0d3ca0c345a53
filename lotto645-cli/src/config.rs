use anyhow::{bail, Context, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::Path;

use lotto645_db::models::MAIN_COUNT;

use crate::analysis::entropy::EntropyMethod;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawConfig {
    pub method: EntropyMethod,
    /// Weight by main + bonus counts instead of main counts alone.
    pub include_bonus: bool,
    pub count: usize,
    pub grids: usize,
    pub seed: Option<u64>,
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            method: EntropyMethod::Hardware,
            include_bonus: true,
            count: MAIN_COUNT,
            grids: 1,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    #[serde(serialize_with = "ser_delimiter", deserialize_with = "de_delimiter")]
    pub delimiter: u8,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

fn ser_delimiter<S: Serializer>(delimiter: &u8, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_char(*delimiter as char)
}

fn de_delimiter<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let c = char::deserialize(deserializer)?;
    if !c.is_ascii() {
        return Err(serde::de::Error::custom(format!("delimiter '{}' is not ASCII", c)));
    }
    Ok(c as u8)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub draw: DrawConfig,
    pub import: ImportConfig,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read config {:?}", path))?;
        let config: AppConfig = serde_json::from_str(&json)
            .with_context(|| format!("Invalid JSON in config {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.draw.count == 0 {
            bail!("draw.count must be at least 1");
        }
        if self.draw.grids == 0 {
            bail!("draw.grids must be at least 1");
        }
        Ok(())
    }
}

/// Parses a single-character delimiter given on the command line.
pub fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s.as_bytes() {
        [b] if b.is_ascii() => Ok(*b),
        _ if s == "\\t" || s == "tab" => Ok(b'\t'),
        _ => Err(format!("delimiter must be one ASCII character, got '{}'", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.draw.method, EntropyMethod::Hardware);
        assert!(config.draw.include_bonus);
        assert_eq!(config.draw.count, 6);
        assert_eq!(config.import.delimiter, b',');
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lotto645.json");
        std::fs::write(
            &path,
            r#"{"draw": {"method": "pseudo", "seed": 7}, "import": {"delimiter": ";"}}"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.draw.method, EntropyMethod::Pseudo);
        assert_eq!(config.draw.seed, Some(7));
        assert!(config.draw.include_bonus);
        assert_eq!(config.draw.grids, 1);
        assert_eq!(config.import.delimiter, b';');
    }

    #[test]
    fn test_zero_grids_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lotto645.json");
        std::fs::write(&path, r#"{"draw": {"grids": 0}}"#).unwrap();
        assert!(AppConfig::load(&path).is_err());
    }

    #[test]
    fn test_serialized_delimiter_is_a_char() {
        let json = serde_json::to_string(&ImportConfig { delimiter: b'\t' }).unwrap();
        assert_eq!(json, r#"{"delimiter":"\t"}"#);
    }

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter(";"), Ok(b';'));
        assert_eq!(parse_delimiter("tab"), Ok(b'\t'));
        assert!(parse_delimiter(";;").is_err());
    }
}
