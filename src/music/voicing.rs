// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Octave assignment for chord tones.
//!
//! The chord root goes in octave 3, the third, fifth and seventh in
//! octave 4, and the ninth in octave 5. The voiced notes are then sorted
//! by pitch height so playback styles can assume ascending input.

use std::fmt;

use serde::{Serialize, Serializer};

use super::chord::Chord;
use super::scale::{MidiNote, Note};

/// Octave for each chord position
const POSITION_OCTAVES: [i8; 5] = [3, 4, 4, 4, 5];

/// A chord tone with a concrete octave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoicedNote {
    note: Note,
    octave: i8,
}

impl VoicedNote {
    pub fn new(note: Note, octave: i8) -> Self {
        Self { note, octave }
    }

    pub fn note(&self) -> Note {
        self.note
    }

    pub fn octave(&self) -> i8 {
        self.octave
    }

    /// Pitch height as a MIDI note number (C4 = 60)
    pub fn midi(&self) -> MidiNote {
        ((self.octave as i16 + 1) * 12 + self.note.pitch_class().index() as i16) as MidiNote
    }

    /// Frequency in Hz, equal temperament with A4 = 440
    pub fn frequency(&self) -> f64 {
        440.0 * 2f64.powf((self.midi() as f64 - 69.0) / 12.0)
    }
}

impl fmt::Display for VoicedNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.note, self.octave)
    }
}

impl Serialize for VoicedNote {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Playable pitches of one chord, ascending
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoicedChord {
    notes: Vec<VoicedNote>,
}

impl VoicedChord {
    pub fn notes(&self) -> &[VoicedNote] {
        &self.notes
    }

    pub fn midi_notes(&self) -> Vec<MidiNote> {
        self.notes.iter().map(VoicedNote::midi).collect()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

impl fmt::Display for VoicedChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.notes.iter().map(|n| n.to_string()).collect();
        write!(f, "{}", names.join(" "))
    }
}

/// Assign octaves by chord position, then sort by pitch height
pub fn voice(chord: &Chord) -> VoicedChord {
    let mut notes: Vec<VoicedNote> = chord
        .notes()
        .iter()
        .zip(POSITION_OCTAVES.iter())
        .map(|(&note, &octave)| VoicedNote::new(note, octave))
        .collect();
    notes.sort_by_key(VoicedNote::midi);
    VoicedChord { notes }
}
