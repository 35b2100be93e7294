// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Playback scheduling for voiced chords.
//!
//! This module provides:
//! - Play styles that turn an ascending voicing into timed note events
//! - Instrument presets handed to the synthesis backend
//! - The backend trait and the sequencing player

pub mod backend;
pub mod player;

pub use backend::{LogBackend, MemoryBackend, PlayedChord, SynthBackend};
pub use player::{Player, PlayerState};

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::music::{TheoryError, VoicedChord, VoicedNote};

/// Articulation of a single chord
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayStyle {
    /// All notes struck together
    #[default]
    Sustained,
    /// One note at a time, slow
    Arpeggiated,
    /// One note at a time, fast
    Strummed,
}

impl PlayStyle {
    pub const ALL: [PlayStyle; 3] = [PlayStyle::Sustained, PlayStyle::Arpeggiated, PlayStyle::Strummed];

    pub fn name(self) -> &'static str {
        match self {
            PlayStyle::Sustained => "sustained",
            PlayStyle::Arpeggiated => "arpeggiated",
            PlayStyle::Strummed => "strummed",
        }
    }

    /// Schedule an ascending voicing with this style
    pub fn schedule(self, voiced: &VoicedChord, timing: &PlaybackTiming) -> ChordSchedule {
        let (step, duration) = match self {
            PlayStyle::Sustained => (Duration::ZERO, timing.sustain()),
            PlayStyle::Arpeggiated => (timing.arpeggio_step(), timing.arpeggio_note()),
            PlayStyle::Strummed => (timing.strum_step(), timing.strum_note()),
        };

        let events = voiced
            .notes()
            .iter()
            .enumerate()
            .map(|(i, &note)| NoteEvent {
                note,
                offset: step * i as u32,
                duration,
            })
            .collect();

        ChordSchedule {
            style: self,
            events,
        }
    }
}

impl FromStr for PlayStyle {
    type Err = PlaybackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlayStyle::ALL
            .into_iter()
            .find(|style| style.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PlaybackError::UnknownStyle(s.to_string()))
    }
}

impl fmt::Display for PlayStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Synthesis preset; only the backend interprets it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Instrument {
    #[default]
    #[serde(alias = "Synth")]
    Synth,
    #[serde(alias = "AMSynth")]
    AmSynth,
    #[serde(alias = "FMSynth")]
    FmSynth,
    #[serde(alias = "DuoSynth")]
    DuoSynth,
    #[serde(alias = "PluckSynth")]
    PluckSynth,
}

impl Instrument {
    pub const ALL: [Instrument; 5] = [
        Instrument::Synth,
        Instrument::AmSynth,
        Instrument::FmSynth,
        Instrument::DuoSynth,
        Instrument::PluckSynth,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Instrument::Synth => "Synth",
            Instrument::AmSynth => "AMSynth",
            Instrument::FmSynth => "FMSynth",
            Instrument::DuoSynth => "DuoSynth",
            Instrument::PluckSynth => "PluckSynth",
        }
    }

    /// Closest General MIDI program (0-based)
    pub fn gm_program(self) -> u8 {
        match self {
            Instrument::Synth => 80,      // Lead 1 (square)
            Instrument::AmSynth => 89,    // Pad 2 (warm)
            Instrument::FmSynth => 4,     // Electric Piano 1
            Instrument::DuoSynth => 50,   // Synth Strings 1
            Instrument::PluckSynth => 25, // Acoustic Guitar (steel)
        }
    }
}

impl FromStr for Instrument {
    type Err = PlaybackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace(['_', '-', ' '], "");
        Instrument::ALL
            .into_iter()
            .find(|inst| inst.name().to_lowercase() == key)
            .ok_or_else(|| PlaybackError::UnknownInstrument(s.to_string()))
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fixed timings of the playback contract, in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackTiming {
    /// Length of a sustained chord
    pub sustain_ms: u64,
    /// Gap between arpeggiated notes
    pub arpeggio_step_ms: u64,
    /// Length of each arpeggiated note
    pub arpeggio_note_ms: u64,
    /// Gap between strummed notes
    pub strum_step_ms: u64,
    /// Length of each strummed note
    pub strum_note_ms: u64,
    /// Decay window between consecutive chords of a sequence
    pub chord_spacing_ms: u64,
    /// Tempo used when rendering to MIDI
    pub tempo: f64,
}

impl Default for PlaybackTiming {
    fn default() -> Self {
        Self {
            sustain_ms: 1000,
            arpeggio_step_ms: 400,
            arpeggio_note_ms: 250,
            strum_step_ms: 70,
            strum_note_ms: 500,
            chord_spacing_ms: 3000,
            tempo: 120.0,
        }
    }
}

impl PlaybackTiming {
    pub fn sustain(&self) -> Duration {
        Duration::from_millis(self.sustain_ms)
    }

    pub fn arpeggio_step(&self) -> Duration {
        Duration::from_millis(self.arpeggio_step_ms)
    }

    pub fn arpeggio_note(&self) -> Duration {
        Duration::from_millis(self.arpeggio_note_ms)
    }

    pub fn strum_step(&self) -> Duration {
        Duration::from_millis(self.strum_step_ms)
    }

    pub fn strum_note(&self) -> Duration {
        Duration::from_millis(self.strum_note_ms)
    }

    pub fn chord_spacing(&self) -> Duration {
        Duration::from_millis(self.chord_spacing_ms)
    }
}

/// One note of a scheduled chord
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteEvent {
    pub note: VoicedNote,
    /// Start time relative to the chord's strike
    pub offset: Duration,
    pub duration: Duration,
}

impl NoteEvent {
    pub fn end(&self) -> Duration {
        self.offset + self.duration
    }
}

/// Timed note events for one chord, ascending pitch order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChordSchedule {
    pub style: PlayStyle,
    pub events: Vec<NoteEvent>,
}

impl ChordSchedule {
    /// Time at which the last note is released
    pub fn end(&self) -> Duration {
        self.events
            .iter()
            .map(NoteEvent::end)
            .max()
            .unwrap_or(Duration::ZERO)
    }
}

/// Errors raised by playback
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("a chord sequence is already playing")]
    Busy,

    #[error("failed to acquire player lock")]
    LockFailed,

    #[error("unknown play style: {0}")]
    UnknownStyle(String),

    #[error("unknown instrument: {0}")]
    UnknownInstrument(String),

    #[error("synthesis backend failed: {0}")]
    Backend(String),

    #[error(transparent)]
    Theory(#[from] TheoryError),
}
