// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Diatonic chord derivation and chord-quality labels.
//!
//! Chords are stacked from scale degrees (root, +2, +4, then +6 for the
//! seventh and +1 for the ninth). The ninth reuses the note a step above
//! the root inside the same scale rather than a compound interval.
//!
//! Quality labels come from fixed tables keyed by scale type and degree.
//! They are kept separate from the stacking; [`quality_intervals`] and
//! [`Chord::intervals`] let the two be checked against each other.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::scale::{Note, Scale, ScaleType};
use super::TheoryError;

/// Roman numerals for the seven degrees
pub const ROMAN_NUMERALS: [&str; 7] = ["I", "II", "III", "IV", "V", "VI", "VII"];

/// How many tones are stacked above the triad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Extension {
    #[default]
    Triad,
    Seventh,
    Ninth,
}

impl Extension {
    pub const ALL: [Extension; 3] = [Extension::Triad, Extension::Seventh, Extension::Ninth];

    /// Scale-degree offsets stacked above the chord root, in chord order
    pub fn offsets(self) -> &'static [usize] {
        match self {
            Extension::Triad => &[0, 2, 4],
            Extension::Seventh => &[0, 2, 4, 6],
            Extension::Ninth => &[0, 2, 4, 6, 1],
        }
    }

    /// Number of notes in a chord of this extension
    pub fn len(self) -> usize {
        self.offsets().len()
    }

    pub fn name(self) -> &'static str {
        match self {
            Extension::Triad => "triad",
            Extension::Seventh => "seventh",
            Extension::Ninth => "ninth",
        }
    }
}

impl std::str::FromStr for Extension {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "triad" | "3" => Ok(Extension::Triad),
            "seventh" | "7" | "7th" => Ok(Extension::Seventh),
            "ninth" | "9" | "9th" => Ok(Extension::Ninth),
            _ => Err(TheoryError::InvalidExtension(s.to_string())),
        }
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A diatonic chord: note names only, no octaves yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chord {
    degree: usize,
    notes: Vec<Note>,
}

impl Chord {
    /// Stack the chord whose root is the scale note at `degree` (0-based)
    pub fn build(scale: &Scale, degree: usize, extension: Extension) -> Self {
        let notes = extension
            .offsets()
            .iter()
            .map(|offset| scale.degree(degree + offset))
            .collect();
        Self {
            degree: degree % 7,
            notes,
        }
    }

    /// 0-based scale degree that generated this chord
    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn root(&self) -> Note {
        self.notes[0]
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn note_names(&self) -> Vec<&'static str> {
        self.notes.iter().map(Note::name).collect()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Semitones above the root for each chord tone, in chord order.
    /// The fifth chord tone is a ninth, so it sits an octave up.
    pub fn intervals(&self) -> Vec<u8> {
        let root = self.root().pitch_class();
        self.notes
            .iter()
            .enumerate()
            .map(|(pos, n)| {
                let interval = root.interval_to(n.pitch_class());
                if pos == 4 {
                    interval + 12
                } else {
                    interval
                }
            })
            .collect()
    }

    pub fn numeral(&self) -> &'static str {
        ROMAN_NUMERALS[self.degree]
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.note_names().join(" - "))
    }
}

/// One chord per scale degree, degree order
pub fn build_chords(scale: &Scale, extension: Extension) -> Vec<Chord> {
    (0..scale.len())
        .map(|degree| Chord::build(scale, degree, extension))
        .collect()
}

/// Triad quality by scale type and 0-based degree
pub fn triad_quality(scale_type: ScaleType, degree: usize) -> Option<&'static str> {
    let table: [&str; 7] = match scale_type {
        ScaleType::Major => ["", "m", "m", "", "", "m", "dim"],
        ScaleType::NaturalMinor => ["m", "dim", "", "m", "m", "", ""],
        ScaleType::HarmonicMinor => ["m", "dim", "aug", "m", "", "", "dim"],
        ScaleType::MelodicMinor => ["m", "m", "aug", "", "", "dim", "dim"],
    };
    table.get(degree).copied()
}

/// Seventh-chord quality by scale type and 0-based degree
pub fn seventh_quality(scale_type: ScaleType, degree: usize) -> Option<&'static str> {
    let table: [&str; 7] = match scale_type {
        ScaleType::Major => ["maj7", "m7", "m7", "maj7", "7", "m7", "m7b5"],
        ScaleType::NaturalMinor => ["m7", "m7b5", "maj7", "m7", "m7", "maj7", "7"],
        ScaleType::HarmonicMinor => ["mMaj7", "m7b5", "maj7#5", "m7", "7", "maj7", "dim7"],
        ScaleType::MelodicMinor => ["mMaj7", "m7", "maj7#5", "7", "7", "m7b5", "m7b5"],
    };
    table.get(degree).copied()
}

/// Quality label for a chord at a degree.
///
/// A missing triad entry yields "", a missing seventh entry falls back to
/// the triad label plus "7". Ninth labels are always the triad label
/// plus "9".
pub fn quality_of(degree: usize, scale_type: ScaleType, extension: Extension) -> String {
    let triad = triad_quality(scale_type, degree).unwrap_or("");
    match extension {
        Extension::Triad => triad.to_string(),
        Extension::Seventh => match seventh_quality(scale_type, degree) {
            Some(label) => label.to_string(),
            None => format!("{}7", triad),
        },
        Extension::Ninth => format!("{}9", triad),
    }
}

/// Semitone content (above the root) that a triad or seventh label denotes
pub fn quality_intervals(label: &str) -> Option<&'static [u8]> {
    let intervals: &[u8] = match label {
        "" => &[0, 4, 7],
        "m" => &[0, 3, 7],
        "dim" => &[0, 3, 6],
        "aug" => &[0, 4, 8],
        "maj7" => &[0, 4, 7, 11],
        "m7" => &[0, 3, 7, 10],
        "7" => &[0, 4, 7, 10],
        "m7b5" => &[0, 3, 6, 10],
        "dim7" => &[0, 3, 6, 9],
        "mMaj7" => &[0, 3, 7, 11],
        "maj7#5" => &[0, 4, 8, 11],
        _ => return None,
    };
    Some(intervals)
}

/// Whether a chord's stacked intervals agree with its label.
///
/// Ninth labels are checked through their triad prefix, since the ninth
/// table is derived from the triad table.
pub fn quality_matches(chord: &Chord, label: &str) -> bool {
    let intervals = chord.intervals();
    if chord.len() == Extension::Ninth.len() {
        let Some(triad) = label.strip_suffix('9') else {
            return false;
        };
        return quality_intervals(triad) == Some(&intervals[..3]);
    }
    quality_intervals(label) == Some(intervals.as_slice())
}
