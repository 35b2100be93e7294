// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Music theory engine for chordially.
//!
//! Maps a root note, scale type and chord extension to the spelled
//! scale, its seven diatonic chords and their quality labels. Everything
//! here is pure: the same configuration always derives the same result.

pub mod chord;
pub mod progression;
pub mod scale;
pub mod voicing;

pub use chord::{build_chords, quality_of, Chord, Extension};
pub use progression::Progression;
pub use scale::{Key, Mode, Note, PitchClass, Scale, ScaleType, Spelling, FLAT_NAMES, SHARP_NAMES};
pub use voicing::{voice, VoicedChord, VoicedNote};

use thiserror::Error;
use tracing::debug;

use crate::config::PlayerConfig;

/// Errors raised while deriving scales and chords
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TheoryError {
    #[error("unknown root note: {0}")]
    InvalidRoot(String),

    #[error("unknown scale type: {0}")]
    InvalidScaleType(String),

    #[error("unknown chord extension: {0}")]
    InvalidExtension(String),

    #[error("invalid progression: {0}")]
    InvalidProgression(String),
}

/// Output of one derivation pass
#[derive(Debug, Clone, PartialEq)]
pub struct Derivation {
    pub scale: Scale,
    pub extension: Extension,
    pub chords: Vec<Chord>,
    pub qualities: Vec<String>,
}

impl Derivation {
    /// Chord symbol for a degree, e.g. "Bm7b5"
    pub fn symbol(&self, degree: usize) -> Option<String> {
        let chord = self.chords.get(degree)?;
        let quality = self.qualities.get(degree)?;
        Some(format!("{}{}", chord.root(), quality))
    }
}

/// Derive scale, chords and qualities from a player configuration
pub fn derive(config: &PlayerConfig) -> Result<Derivation, TheoryError> {
    let scale = Scale::build(&config.root, config.scale)?;
    Ok(derive_from_scale(scale, config.extension))
}

/// Derive chords and qualities from an already-built scale
pub fn derive_from_scale(scale: Scale, extension: Extension) -> Derivation {
    let chords = build_chords(&scale, extension);
    let qualities: Vec<String> = chords
        .iter()
        .map(|c| quality_of(c.degree(), scale.scale_type(), extension))
        .collect();

    for (chord, quality) in chords.iter().zip(&qualities) {
        debug_assert!(
            chord::quality_matches(chord, quality),
            "quality table disagrees with stacked chord {} ({})",
            chord,
            quality
        );
    }

    debug!(
        scale = %scale,
        extension = %extension,
        notes = ?scale.note_names(),
        "derived scale"
    );

    Derivation {
        scale,
        extension,
        chords,
        qualities,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(root: &str, scale: ScaleType, extension: Extension) -> PlayerConfig {
        PlayerConfig {
            root: root.to_string(),
            scale,
            extension,
            ..Default::default()
        }
    }

    #[test]
    fn test_derive_c_major_sevenths() {
        let d = derive(&config("C", ScaleType::Major, Extension::Seventh)).unwrap();
        assert_eq!(d.scale.note_names(), vec!["C", "D", "E", "F", "G", "A", "B"]);
        assert_eq!(d.qualities[0], "maj7");
        assert_eq!(d.qualities[6], "m7b5");
        assert_eq!(d.symbol(6).as_deref(), Some("Bm7b5"));
        assert_eq!(d.symbol(7), None);
    }

    #[test]
    fn test_derive_is_idempotent() {
        let cfg = config("Bb", ScaleType::HarmonicMinor, Extension::Ninth);
        assert_eq!(derive(&cfg).unwrap(), derive(&cfg).unwrap());
    }

    #[test]
    fn test_derive_invalid_root() {
        let err = derive(&config("Q", ScaleType::Major, Extension::Triad)).unwrap_err();
        assert_eq!(err, TheoryError::InvalidRoot("Q".to_string()));
        assert_eq!(err.to_string(), "unknown root note: Q");
    }
}
