// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Configuration system for chordially.
//!
//! This module provides the player configuration that drives every
//! derivation, plus playback timings and query-service settings, loaded
//! from YAML or TOML files.

pub mod watcher;

pub use watcher::{validate_config, ConfigEvent, ConfigWatcher};

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::music::{Extension, ScaleType};
use crate::playback::{Instrument, PlayStyle, PlaybackTiming};

/// Root configuration file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    /// What to derive and how to play it
    pub player: PlayerConfig,
    /// Fixed playback timings
    pub timing: PlaybackTiming,
    /// Query service settings
    pub server: ServerConfig,
}

impl AppConfig {
    /// Load a configuration file; `.toml` files are parsed as TOML,
    /// anything else as YAML
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        if is_toml(path) {
            Self::from_toml(&contents)
        } else {
            Self::from_yaml(&contents)
        }
    }

    /// Parse a configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse YAML configuration")
    }

    /// Parse a configuration from TOML string
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse TOML configuration")
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize configuration to YAML")
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).context("Failed to serialize configuration to TOML")
    }

    /// Save configuration, choosing the format from the extension
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let text = if is_toml(path) {
            self.to_toml()?
        } else {
            self.to_yaml()?
        };
        fs::write(path, text).with_context(|| format!("Failed to write config file: {:?}", path))
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "toml")
}

/// The inputs of one derivation pass; the pipeline is a pure function of it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    /// Root note name (e.g., "C", "F#", "Bb")
    pub root: String,
    /// Scale type
    pub scale: ScaleType,
    /// Chord size
    pub extension: Extension,
    /// Synthesis preset
    pub instrument: Instrument,
    /// Articulation
    pub style: PlayStyle,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            root: "C".to_string(),
            scale: ScaleType::Major,
            extension: Extension::Triad,
            instrument: Instrument::Synth,
            style: PlayStyle::Sustained,
        }
    }
}

/// Query service settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4000,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_config() {
        let yaml = r#"
player:
  root: "Bb"
  scale: harmonic_minor
  extension: seventh
  instrument: AMSynth
  style: strummed

timing:
  chord_spacing_ms: 2000

server:
  port: 8080
"#;

        let config = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.player.root, "Bb");
        assert_eq!(config.player.scale, ScaleType::HarmonicMinor);
        assert_eq!(config.player.extension, Extension::Seventh);
        assert_eq!(config.player.instrument, Instrument::AmSynth);
        assert_eq!(config.player.style, PlayStyle::Strummed);
        assert_eq!(config.timing.chord_spacing_ms, 2000);
        assert_eq!(config.timing.sustain_ms, 1000);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_scale_name_aliases() {
        for (name, expected) in [
            ("minor", ScaleType::NaturalMinor),
            ("natural_minor", ScaleType::NaturalMinor),
            ("harmonicMinor", ScaleType::HarmonicMinor),
            ("melodicMinor", ScaleType::MelodicMinor),
            ("melodic_minor_asc", ScaleType::MelodicMinor),
        ] {
            let yaml = format!("player:\n  scale: {}\n", name);
            let config = AppConfig::from_yaml(&yaml).unwrap();
            assert_eq!(config.player.scale, expected, "{}", name);
        }
    }

    #[test]
    fn test_parse_toml_config() {
        let text = r#"
[player]
root = "F"
scale = "major"
style = "arpeggiated"

[server]
host = "0.0.0.0"
"#;

        let config = AppConfig::from_toml(text).unwrap();
        assert_eq!(config.player.root, "F");
        assert_eq!(config.player.style, PlayStyle::Arpeggiated);
        assert_eq!(config.server.address(), "0.0.0.0:4000");
    }

    #[test]
    fn test_default_values() {
        let config = AppConfig::from_yaml("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.player.root, "C");
        assert_eq!(config.player.scale, ScaleType::Major);
        assert_eq!(config.timing.chord_spacing_ms, 3000);
        assert_eq!(config.server.port, 4000);
    }

    #[test]
    fn test_invalid_scale_is_rejected() {
        let yaml = "player:\n  scale: bogus\n";
        assert!(AppConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.player.root = "E".to_string();
        config.player.extension = Extension::Ninth;

        let yaml_path = dir.path().join("chordially.yaml");
        config.save(&yaml_path).unwrap();
        assert_eq!(AppConfig::load(&yaml_path).unwrap(), config);

        let toml_path = dir.path().join("chordially.toml");
        config.save(&toml_path).unwrap();
        assert_eq!(AppConfig::load(&toml_path).unwrap(), config);
    }
}
