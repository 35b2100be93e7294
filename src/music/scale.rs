// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Pitch-class table, key-signature spelling and the scale builder.
//!
//! A pitch class is identified by its semitone index alone. Its printed
//! name depends on the key: the same index is "C#" in sharp keys and "Db"
//! in flat keys. Every scale is spelled from exactly one of the two
//! alphabets, chosen by the key signature of its root and mode.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

use super::TheoryError;

/// MIDI note number type (0-127)
pub type MidiNote = u8;

/// Sharp-preferred chromatic alphabet
pub const SHARP_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Flat-preferred chromatic alphabet
pub const FLAT_NAMES: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// Keys whose signature carries flats, as (root name, is minor)
const FLAT_KEYS: [(&str, bool); 14] = [
    ("F", false),
    ("Bb", false),
    ("Eb", false),
    ("Ab", false),
    ("Db", false),
    ("Gb", false),
    ("Cb", false),
    ("D", true),
    ("G", true),
    ("C", true),
    ("F", true),
    ("Bb", true),
    ("Eb", true),
    ("Ab", true),
];

/// Keys whose signature carries sharps, as (root name, is minor)
const SHARP_KEYS: [(&str, bool); 14] = [
    ("G", false),
    ("D", false),
    ("A", false),
    ("E", false),
    ("B", false),
    ("F#", false),
    ("C#", false),
    ("E", true),
    ("B", true),
    ("F#", true),
    ("C#", true),
    ("G#", true),
    ("D#", true),
    ("A#", true),
];

/// One of the 12 chromatic steps (0 = C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PitchClass(u8);

impl PitchClass {
    /// Create a pitch class, wrapping the index into 0-11
    pub fn new(index: u8) -> Self {
        PitchClass(index % 12)
    }

    /// Semitone index (0-11)
    pub fn index(self) -> u8 {
        self.0
    }

    /// Look a name up in either alphabet ("C#", "Db", "f#", ...).
    ///
    /// Only the 17 names of the two alphabets are recognized; spellings
    /// such as "E#" or "Cb" are rejected.
    pub fn from_name(name: &str) -> Option<Self> {
        let canonical = canonical_name(name)?;
        SHARP_NAMES
            .iter()
            .position(|&n| n == canonical)
            .or_else(|| FLAT_NAMES.iter().position(|&n| n == canonical))
            .map(|i| PitchClass(i as u8))
    }

    /// Name of this pitch class in the given spelling
    pub fn name(self, spelling: Spelling) -> &'static str {
        spelling.alphabet()[self.0 as usize]
    }

    /// Get interval in semitones to another pitch class (ascending)
    pub fn interval_to(self, other: PitchClass) -> u8 {
        (other.0 as i16 - self.0 as i16).rem_euclid(12) as u8
    }
}

/// Normalize letter case: "db" -> "Db", "f#" -> "F#"
fn canonical_name(name: &str) -> Option<String> {
    let mut chars = name.trim().chars();
    let letter = chars.next()?.to_ascii_uppercase();
    if !('A'..='G').contains(&letter) {
        return None;
    }
    let accidental: String = chars.collect();
    match accidental.as_str() {
        "" => Some(letter.to_string()),
        "#" => Some(format!("{}#", letter)),
        "b" | "B" => Some(format!("{}b", letter)),
        _ => None,
    }
}

/// Which chromatic alphabet names are drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Spelling {
    Sharp,
    Flat,
}

impl Spelling {
    /// The 12-entry alphabet for this spelling
    pub fn alphabet(self) -> &'static [&'static str; 12] {
        match self {
            Spelling::Sharp => &SHARP_NAMES,
            Spelling::Flat => &FLAT_NAMES,
        }
    }
}

/// A pitch class together with the name it carries in its scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Note {
    pitch: PitchClass,
    name: &'static str,
}

impl Note {
    /// Spell a pitch class
    pub fn new(pitch: PitchClass, spelling: Spelling) -> Self {
        Self {
            pitch,
            name: pitch.name(spelling),
        }
    }

    pub fn pitch_class(&self) -> PitchClass {
        self.pitch
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Two notes are enharmonic when their semitone indices match
    pub fn is_enharmonic(&self, other: &Note) -> bool {
        self.pitch == other.pitch
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl Serialize for Note {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name)
    }
}

/// Major or minor, for key-signature purposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Major,
    Minor,
}

/// A root name and mode, which together select the spelling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    root: PitchClass,
    root_name: String,
    mode: Mode,
}

impl Key {
    /// Parse a key from a root name; fails if the name is in neither alphabet
    pub fn new(root_name: &str, mode: Mode) -> Result<Self, TheoryError> {
        let root = PitchClass::from_name(root_name)
            .ok_or_else(|| TheoryError::InvalidRoot(root_name.to_string()))?;
        let root_name = canonical_name(root_name)
            .ok_or_else(|| TheoryError::InvalidRoot(root_name.to_string()))?;
        Ok(Self {
            root,
            root_name,
            mode,
        })
    }

    pub fn root(&self) -> PitchClass {
        self.root
    }

    /// Root exactly as named by the caller (case-normalized)
    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Key-signature classification, or None for keys in neither set
    /// (C major, A minor, and enharmonic oddities such as Db minor)
    pub fn signature(&self) -> Option<Spelling> {
        let entry = (self.root_name.as_str(), self.mode == Mode::Minor);
        if FLAT_KEYS.contains(&entry) {
            Some(Spelling::Flat)
        } else if SHARP_KEYS.contains(&entry) {
            Some(Spelling::Sharp)
        } else {
            None
        }
    }

    /// Spelling used for every note of this key; unlisted keys use sharps
    pub fn spelling(&self) -> Spelling {
        self.signature().unwrap_or(Spelling::Sharp)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            Mode::Major => write!(f, "{} major", self.root_name),
            Mode::Minor => write!(f, "{} minor", self.root_name),
        }
    }
}

/// Scale types supported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleType {
    Major,
    #[serde(alias = "minor")]
    NaturalMinor,
    #[serde(alias = "harmonicMinor")]
    HarmonicMinor,
    /// Ascending form
    #[serde(alias = "melodic_minor_asc", alias = "melodicMinor")]
    MelodicMinor,
}

impl ScaleType {
    pub const ALL: [ScaleType; 4] = [
        ScaleType::Major,
        ScaleType::NaturalMinor,
        ScaleType::HarmonicMinor,
        ScaleType::MelodicMinor,
    ];

    /// Semitone steps between consecutive degrees; always sums to 12
    pub fn steps(self) -> [u8; 7] {
        match self {
            ScaleType::Major => [2, 2, 1, 2, 2, 2, 1],
            ScaleType::NaturalMinor => [2, 1, 2, 2, 1, 2, 2],
            ScaleType::HarmonicMinor => [2, 1, 2, 2, 1, 3, 1],
            ScaleType::MelodicMinor => [2, 1, 2, 2, 2, 2, 1],
        }
    }

    /// Anything but plain major is spelled as a minor key
    pub fn mode(self) -> Mode {
        match self {
            ScaleType::Major => Mode::Major,
            _ => Mode::Minor,
        }
    }

    /// Walk the steps from a root: eight positions, the last being the
    /// octave repeat of the root
    pub fn walk(self, root: PitchClass) -> [PitchClass; 8] {
        let mut positions = [root; 8];
        let mut idx = root.index();
        for (i, step) in self.steps().iter().enumerate() {
            idx = (idx + step) % 12;
            positions[i + 1] = PitchClass::new(idx);
        }
        positions
    }

    /// Key used by the query service
    pub fn query_key(self) -> &'static str {
        match self {
            ScaleType::Major => "major",
            ScaleType::NaturalMinor => "natural_minor",
            ScaleType::HarmonicMinor => "harmonic_minor",
            ScaleType::MelodicMinor => "melodic_minor_asc",
        }
    }

    /// Strict lookup of a query-service key
    pub fn from_query_key(key: &str) -> Option<Self> {
        ScaleType::ALL.into_iter().find(|st| st.query_key() == key)
    }

    /// Get a human-readable name for this scale type
    pub fn name(self) -> &'static str {
        match self {
            ScaleType::Major => "Major",
            ScaleType::NaturalMinor => "Natural Minor",
            ScaleType::HarmonicMinor => "Harmonic Minor",
            ScaleType::MelodicMinor => "Melodic Minor",
        }
    }
}

impl FromStr for ScaleType {
    type Err = TheoryError;

    /// Lenient parse: "harmonic_minor", "harmonicMinor", "Harmonic Minor"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace([' ', '-', '_'], "");
        match key.as_str() {
            "major" | "ionian" => Ok(ScaleType::Major),
            "minor" | "naturalminor" | "aeolian" => Ok(ScaleType::NaturalMinor),
            "harmonicminor" => Ok(ScaleType::HarmonicMinor),
            "melodicminor" | "melodicminorasc" => Ok(ScaleType::MelodicMinor),
            _ => Err(TheoryError::InvalidScaleType(s.to_string())),
        }
    }
}

impl fmt::Display for ScaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Seven spelled notes built from a key and a scale type
#[derive(Debug, Clone, PartialEq)]
pub struct Scale {
    key: Key,
    scale_type: ScaleType,
    spelling: Spelling,
    notes: [Note; 7],
}

impl Scale {
    /// Build a scale, choosing the spelling from the key signature
    pub fn build(root: &str, scale_type: ScaleType) -> Result<Self, TheoryError> {
        let key = Key::new(root, scale_type.mode())?;
        let spelling = key.spelling();
        Ok(Self::spelled(key, scale_type, spelling))
    }

    /// Build a scale with an explicit spelling, ignoring the key signature
    pub fn with_spelling(
        root: &str,
        scale_type: ScaleType,
        spelling: Spelling,
    ) -> Result<Self, TheoryError> {
        let key = Key::new(root, scale_type.mode())?;
        Ok(Self::spelled(key, scale_type, spelling))
    }

    fn spelled(key: Key, scale_type: ScaleType, spelling: Spelling) -> Self {
        let walk = scale_type.walk(key.root());
        let mut notes = [Note::new(key.root(), spelling); 7];
        for (note, pc) in notes.iter_mut().zip(walk.iter()) {
            *note = Note::new(*pc, spelling);
        }
        Self {
            key,
            scale_type,
            spelling,
            notes,
        }
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    /// Degree 1
    pub fn root(&self) -> Note {
        self.notes[0]
    }

    pub fn scale_type(&self) -> ScaleType {
        self.scale_type
    }

    pub fn spelling(&self) -> Spelling {
        self.spelling
    }

    /// Get the notes in this scale
    pub fn notes(&self) -> &[Note; 7] {
        &self.notes
    }

    /// Note names in degree order
    pub fn note_names(&self) -> Vec<&'static str> {
        self.notes.iter().map(Note::name).collect()
    }

    /// Note at a 0-based degree, wrapping past the seventh
    pub fn degree(&self, index: usize) -> Note {
        self.notes[index % 7]
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.root(), self.scale_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The 17 root names offered across both alphabets
    fn all_roots() -> Vec<&'static str> {
        let mut roots: Vec<&str> = SHARP_NAMES.to_vec();
        for name in FLAT_NAMES {
            if !roots.contains(&name) {
                roots.push(name);
            }
        }
        roots
    }

    #[test]
    fn test_pitch_class_from_name() {
        assert_eq!(PitchClass::from_name("C"), Some(PitchClass::new(0)));
        assert_eq!(PitchClass::from_name("C#"), Some(PitchClass::new(1)));
        assert_eq!(PitchClass::from_name("Db"), Some(PitchClass::new(1)));
        assert_eq!(PitchClass::from_name("bb"), Some(PitchClass::new(10)));
        assert_eq!(PitchClass::from_name(" f# "), Some(PitchClass::new(6)));
        assert_eq!(PitchClass::from_name("X"), None);
        assert_eq!(PitchClass::from_name("E#"), None);
        assert_eq!(PitchClass::from_name("Cb"), None);
        assert_eq!(PitchClass::from_name(""), None);
    }

    #[test]
    fn test_enharmonic_identity() {
        let sharp = Note::new(PitchClass::new(3), Spelling::Sharp);
        let flat = Note::new(PitchClass::new(3), Spelling::Flat);
        assert_eq!(sharp.name(), "D#");
        assert_eq!(flat.name(), "Eb");
        assert!(sharp.is_enharmonic(&flat));
        assert_ne!(sharp, flat);
    }

    #[test]
    fn test_pitch_class_interval() {
        let c = PitchClass::new(0);
        assert_eq!(PitchClass::new(14), PitchClass::new(2));
        assert_eq!(c.interval_to(PitchClass::new(4)), 4);
        assert_eq!(PitchClass::new(7).interval_to(c), 5);
    }

    #[test]
    fn test_key_sets_are_disjoint() {
        for entry in FLAT_KEYS {
            assert!(!SHARP_KEYS.contains(&entry), "{:?} is in both sets", entry);
        }
    }

    #[test]
    fn test_key_spelling() {
        let f_major = Key::new("F", Mode::Major).unwrap();
        assert_eq!(f_major.signature(), Some(Spelling::Flat));

        let d_minor = Key::new("D", Mode::Minor).unwrap();
        assert_eq!(d_minor.spelling(), Spelling::Flat);

        let d_major = Key::new("D", Mode::Major).unwrap();
        assert_eq!(d_major.signature(), Some(Spelling::Sharp));

        let c_major = Key::new("C", Mode::Major).unwrap();
        assert_eq!(c_major.signature(), None);
        assert_eq!(c_major.spelling(), Spelling::Sharp);
    }

    #[test]
    fn test_key_invalid_root() {
        assert_eq!(
            Key::new("H", Mode::Major),
            Err(TheoryError::InvalidRoot("H".to_string()))
        );
    }

    #[test]
    fn test_scale_type_steps_sum_to_octave() {
        for st in ScaleType::ALL {
            assert_eq!(st.steps().iter().map(|&s| s as u32).sum::<u32>(), 12);
        }
    }

    #[test]
    fn test_scale_type_from_str() {
        assert_eq!("major".parse::<ScaleType>(), Ok(ScaleType::Major));
        assert_eq!("minor".parse::<ScaleType>(), Ok(ScaleType::NaturalMinor));
        assert_eq!("harmonicMinor".parse::<ScaleType>(), Ok(ScaleType::HarmonicMinor));
        assert_eq!("melodic_minor_asc".parse::<ScaleType>(), Ok(ScaleType::MelodicMinor));
        assert!("bogus".parse::<ScaleType>().is_err());
    }

    #[test]
    fn test_query_keys() {
        assert_eq!(ScaleType::from_query_key("natural_minor"), Some(ScaleType::NaturalMinor));
        assert_eq!(ScaleType::from_query_key("melodic_minor_asc"), Some(ScaleType::MelodicMinor));
        assert_eq!(ScaleType::from_query_key("melodicMinor"), None);
        assert_eq!(ScaleType::from_query_key("bogus"), None);
    }

    #[test]
    fn test_c_major() {
        let scale = Scale::build("C", ScaleType::Major).unwrap();
        assert_eq!(scale.note_names(), vec!["C", "D", "E", "F", "G", "A", "B"]);
    }

    #[test]
    fn test_f_major_uses_flats() {
        let scale = Scale::build("F", ScaleType::Major).unwrap();
        assert_eq!(scale.spelling(), Spelling::Flat);
        assert_eq!(scale.note_names(), vec!["F", "G", "A", "Bb", "C", "D", "E"]);
    }

    #[test]
    fn test_minor_family_spelling() {
        let d_minor = Scale::build("D", ScaleType::NaturalMinor).unwrap();
        assert_eq!(d_minor.note_names(), vec!["D", "E", "F", "G", "A", "Bb", "C"]);

        let a_harmonic = Scale::build("A", ScaleType::HarmonicMinor).unwrap();
        assert_eq!(a_harmonic.note_names(), vec!["A", "B", "C", "D", "E", "F", "G#"]);

        let c_melodic = Scale::build("C", ScaleType::MelodicMinor).unwrap();
        assert_eq!(c_melodic.note_names(), vec!["C", "D", "Eb", "F", "G", "A", "B"]);
    }

    #[test]
    fn test_flat_root_outside_flat_keys_is_respelled() {
        // Db minor is in neither key set, so it is spelled with sharps
        let scale = Scale::build("Db", ScaleType::NaturalMinor).unwrap();
        assert_eq!(scale.note_names(), vec!["C#", "D#", "E", "F#", "G#", "A", "B"]);
    }

    #[test]
    fn test_forced_sharp_spelling() {
        let scale = Scale::with_spelling("F", ScaleType::Major, Spelling::Sharp).unwrap();
        assert_eq!(scale.note_names(), vec!["F", "G", "A", "A#", "C", "D", "E"]);
    }

    #[test]
    fn test_invalid_root() {
        assert_eq!(
            Scale::build("X", ScaleType::Major),
            Err(TheoryError::InvalidRoot("X".to_string()))
        );
    }

    #[test]
    fn test_every_scale_has_seven_distinct_notes() {
        for root in all_roots() {
            for st in ScaleType::ALL {
                let scale = Scale::build(root, st).unwrap();
                let mut pcs: Vec<u8> = scale.notes().iter().map(|n| n.pitch_class().index()).collect();
                pcs.sort();
                pcs.dedup();
                assert_eq!(pcs.len(), 7, "{} {}", root, st);
                assert_eq!(
                    scale.root().pitch_class(),
                    PitchClass::from_name(root).unwrap(),
                    "{} {}",
                    root,
                    st
                );
                let alphabet = scale.spelling().alphabet();
                assert!(scale.note_names().iter().all(|n| alphabet.contains(n)));
            }
        }
    }

    #[test]
    fn test_walk_returns_to_root() {
        for root in 0..12 {
            for st in ScaleType::ALL {
                let walk = st.walk(PitchClass::new(root));
                assert_eq!(walk[7], walk[0]);
            }
        }
    }
}
