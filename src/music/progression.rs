// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Named chord progressions as scale-degree sequences.

use std::fmt;

use super::chord::{Chord, ROMAN_NUMERALS};
use super::TheoryError;

/// Built-in progressions (name, 0-based degrees)
const BUILTIN: [(&str, &[usize]); 6] = [
    ("I-IV-V-I", &[0, 3, 4, 0]),
    ("I-V-vi-IV", &[0, 4, 5, 3]), // pop
    ("ii-V-I", &[1, 4, 0]),
    ("I-vi-IV-V", &[0, 5, 3, 4]),
    ("I-IV-vi-V", &[0, 3, 5, 4]),
    ("vi-IV-I-V", &[5, 3, 0, 4]),
];

/// An ordered list of scale degrees to play in sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progression {
    name: String,
    degrees: Vec<usize>,
}

impl Progression {
    /// Create a progression from 0-based degrees
    pub fn new(name: impl Into<String>, degrees: Vec<usize>) -> Result<Self, TheoryError> {
        let name = name.into();
        if degrees.is_empty() || degrees.iter().any(|&d| d >= ROMAN_NUMERALS.len()) {
            return Err(TheoryError::InvalidProgression(name));
        }
        Ok(Self { name, degrees })
    }

    /// Every scale degree once, in scale order
    pub fn scale_order(len: usize) -> Self {
        Self {
            name: "scale".to_string(),
            degrees: (0..len).collect(),
        }
    }

    /// Parse roman numerals separated by '-', e.g. "I-V-vi-IV".
    /// Case marks quality in the usual notation but is not checked.
    pub fn parse(s: &str) -> Result<Self, TheoryError> {
        let degrees = s
            .split('-')
            .map(|token| {
                let numeral = token.trim().to_uppercase();
                ROMAN_NUMERALS
                    .iter()
                    .position(|&n| n == numeral)
                    .ok_or_else(|| TheoryError::InvalidProgression(s.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(s.trim(), degrees)
    }

    /// Look up a built-in progression by name, case-insensitively
    pub fn builtin(name: &str) -> Option<Self> {
        BUILTIN
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name.trim()))
            .map(|(n, degrees)| Self {
                name: n.to_string(),
                degrees: degrees.to_vec(),
            })
    }

    /// Names of the built-in progressions
    pub fn available() -> Vec<&'static str> {
        BUILTIN.iter().map(|(n, _)| *n).collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn degrees(&self) -> &[usize] {
        &self.degrees
    }

    pub fn len(&self) -> usize {
        self.degrees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.degrees.is_empty()
    }

    /// The diatonic chords in progression order
    ///
    /// Fails if a degree lies past the end of `chords`.
    pub fn resolve<'a>(&self, chords: &'a [Chord]) -> Result<Vec<&'a Chord>, TheoryError> {
        self.degrees
            .iter()
            .map(|&d| {
                chords.get(d).ok_or_else(|| {
                    TheoryError::InvalidProgression(format!(
                        "{} needs degree {} but only {} chords are available",
                        self.name,
                        d + 1,
                        chords.len()
                    ))
                })
            })
            .collect()
    }
}

impl fmt::Display for Progression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl std::str::FromStr for Progression {
    type Err = TheoryError;

    /// Built-in names first, then free roman-numeral notation
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::builtin(s) {
            Some(progression) => Ok(progression),
            None => Self::parse(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::music::chord::{build_chords, Extension};
    use crate::music::scale::{Scale, ScaleType};

    #[test]
    fn test_pop_progression_in_c() {
        let scale = Scale::build("C", ScaleType::Major).unwrap();
        let chords = build_chords(&scale, Extension::Triad);
        let prog: Progression = "I-V-vi-IV".parse().unwrap();
        assert_eq!(prog.degrees(), &[0, 4, 5, 3]);

        let resolved: Vec<Vec<&str>> = prog.resolve(&chords).unwrap().iter().map(|c| c.note_names()).collect();
        assert_eq!(
            resolved,
            vec![
                vec!["C", "E", "G"],
                vec!["G", "B", "D"],
                vec!["A", "C", "E"],
                vec!["F", "A", "C"],
            ]
        );
    }

    #[test]
    fn test_parse_free_notation() {
        let prog = Progression::parse("vi - ii - V - I").unwrap();
        assert_eq!(prog.degrees(), &[5, 1, 4, 0]);

        let prog = Progression::parse("vii").unwrap();
        assert_eq!(prog.degrees(), &[6]);
    }

    #[test]
    fn test_parse_rejects_unknown_numerals() {
        assert!(Progression::parse("I-VIII").is_err());
        assert!(Progression::parse("I--V").is_err());
        assert!(Progression::parse("").is_err());
    }

    #[test]
    fn test_builtin_lookup() {
        assert_eq!(Progression::builtin("ii-v-i").unwrap().degrees(), &[1, 4, 0]);
        assert!(Progression::builtin("nope").is_none());
        assert_eq!(Progression::available().len(), 6);
    }

    #[test]
    fn test_new_validates_degrees() {
        assert!(Progression::new("bad", vec![0, 7]).is_err());
        assert!(Progression::new("empty", vec![]).is_err());
    }

    #[test]
    fn test_resolve_rejects_missing_degrees() {
        let scale = Scale::build("C", ScaleType::Major).unwrap();
        let chords = build_chords(&scale, Extension::Triad);
        let prog = Progression::builtin("I-V-vi-IV").unwrap();

        let err = prog.resolve(&chords[..5]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid progression: I-V-vi-IV needs degree 6 but only 5 chords are available"
        );
        assert_eq!(Progression::scale_order(2).resolve(&chords[..2]).unwrap().len(), 2);
    }

    #[test]
    fn test_scale_order() {
        assert_eq!(Progression::scale_order(7).degrees(), &[0, 1, 2, 3, 4, 5, 6]);
    }
}
