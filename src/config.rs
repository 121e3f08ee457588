// src/config.rs

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};
use url::Url;

use crate::{
    boundary::DEFAULT_NAME_FIELD,
    projection::{PartyColors, PartyPalette},
};

/// Env var naming the YAML config file.
pub const CONFIG_ENV: &str = "RIDINGMAP_CONFIG";
/// Read from the working directory when `RIDINGMAP_CONFIG` is unset.
pub const DEFAULT_CONFIG_FILE: &str = "ridingmap.yaml";

const URL_ENV: &str = "RIDINGMAP_URL";
const BOUNDARIES_ENV: &str = "RIDINGMAP_BOUNDARIES";
const OUT_DIR_ENV: &str = "RIDINGMAP_OUT_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 500,
        }
    }
}

/// Run configuration. Every field has a default, so a config file only
/// needs the values it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub source_url: String,
    pub table_id: String,
    /// GeoJSON FeatureCollection of district boundaries.
    pub boundaries: PathBuf,
    pub name_field: String,
    pub out_dir: PathBuf,
    pub output_stem: String,
    pub title: String,
    pub retry: RetryConfig,
    /// Inline palette; conflicts with `palette_file`.
    pub palette: Option<Vec<PartyColors>>,
    pub palette_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_url: "https://338canada.com/districts.htm".to_string(),
            table_id: "myTable".to_string(),
            boundaries: PathBuf::from("shapefiles/CF_CA_2023_FR.geojson"),
            name_field: DEFAULT_NAME_FIELD.to_string(),
            out_dir: PathBuf::from("docs"),
            output_stem: "canada_electoral_map".to_string(),
            title: "Canadian Electoral Districts".to_string(),
            retry: RetryConfig::default(),
            palette: None,
            palette_file: None,
        }
    }
}

impl Config {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text =
            fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Config file named by `RIDINGMAP_CONFIG`, else `ridingmap.yaml` if it
    /// exists, else defaults; then single-value env overrides.
    pub fn load() -> Result<Self> {
        let mut config = match env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_path(PathBuf::from(path))?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_path(DEFAULT_CONFIG_FILE)?
            }
            None => {
                info!("no config file, using defaults");
                Self::default()
            }
        };
        config.apply_overrides(|key| env::var(key).ok());
        Ok(config)
    }

    /// Overwrite fields from `lookup` (normally the process environment).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(URL_ENV) {
            self.source_url = url;
        }
        if let Some(path) = lookup(BOUNDARIES_ENV) {
            self.boundaries = PathBuf::from(path);
        }
        if let Some(path) = lookup(OUT_DIR_ENV) {
            self.out_dir = PathBuf::from(path);
        }
    }

    pub fn source_url(&self) -> Result<Url> {
        Url::parse(&self.source_url)
            .with_context(|| format!("parsing source URL {}", self.source_url))
    }

    /// The configured palette: inline, from file, or the built-in one.
    pub fn palette(&self) -> Result<PartyPalette> {
        match (&self.palette, &self.palette_file) {
            (Some(_), Some(_)) => bail!("set either `palette` or `palette_file`, not both"),
            (Some(parties), None) => {
                PartyPalette::new(parties.clone()).context("validating inline palette")
            }
            (None, Some(path)) => PartyPalette::from_path(path),
            (None, None) => Ok(PartyPalette::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::Tier;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_partial_file_keeps_defaults() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        writeln!(
            tmp,
            "table_id: projections\nretry:\n  max_retries: 5\nboundaries: data/ridings.geojson"
        )?;
        let config = Config::from_path(tmp.path())?;
        assert_eq!(config.table_id, "projections");
        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.retry.initial_backoff_ms, 500);
        assert_eq!(config.boundaries, PathBuf::from("data/ridings.geojson"));
        assert_eq!(config.name_field, "CF_NOMAN");
        assert_eq!(config.source_url()?.host_str(), Some("338canada.com"));
        Ok(())
    }

    #[test]
    fn test_unknown_keys_are_rejected() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        writeln!(tmp, "tabel_id: oops")?;
        assert!(Config::from_path(tmp.path()).is_err());
        Ok(())
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("RIDINGMAP_URL", "https://example.org/table.htm"),
            ("RIDINGMAP_OUT_DIR", "/tmp/maps"),
        ]
        .into_iter()
        .collect();
        let mut config = Config::default();
        config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.source_url, "https://example.org/table.htm");
        assert_eq!(config.out_dir, PathBuf::from("/tmp/maps"));
        assert_eq!(config.boundaries, Config::default().boundaries);
    }

    #[test]
    fn test_palette_sources() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        writeln!(
            tmp,
            "palette:\n  - party: ppc\n    safe: \"#4a3c8c\"\n    likely: \"#8a7cc4\"\n    leaning: \"#c2b8e6\""
        )?;
        let mut config = Config::from_path(tmp.path())?;
        let palette = config.palette()?;
        assert_eq!(palette.parties().len(), 1);
        assert!(palette.color("PPC", Tier::Likely).is_some());

        config.palette_file = Some(PathBuf::from("elsewhere.yaml"));
        assert!(config.palette().is_err());

        let defaults = Config::default().palette()?;
        assert_eq!(defaults.parties().len(), 5);
        Ok(())
    }
}
