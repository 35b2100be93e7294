// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Synthesis backends.
//!
//! A backend receives a fully timed chord schedule and is responsible for
//! turning it into sound. It must not block: playback of the notes is
//! expected to run in the background, relative to the moment `play` is
//! called.

use std::sync::Mutex;

use tokio::time::Instant;
use tracing::info;

use super::{ChordSchedule, Instrument, PlaybackError};

/// Sink for scheduled chords
pub trait SynthBackend: Send + Sync {
    /// Start a chord now
    fn play(&self, instrument: Instrument, schedule: &ChordSchedule) -> Result<(), PlaybackError>;

    /// Backend name for logs
    fn name(&self) -> &'static str;
}

/// Backend that only logs the notes it would play
#[derive(Debug, Default)]
pub struct LogBackend;

impl SynthBackend for LogBackend {
    fn play(&self, instrument: Instrument, schedule: &ChordSchedule) -> Result<(), PlaybackError> {
        for event in &schedule.events {
            info!(
                instrument = %instrument,
                style = %schedule.style,
                note = %event.note,
                midi = event.note.midi(),
                frequency_hz = event.note.frequency(),
                offset_ms = event.offset.as_millis() as u64,
                duration_ms = event.duration.as_millis() as u64,
                "note"
            );
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

/// A chord as received by [`MemoryBackend`]
#[derive(Debug, Clone, PartialEq)]
pub struct PlayedChord {
    pub at: Instant,
    pub instrument: Instrument,
    pub schedule: ChordSchedule,
}

/// Backend that records every chord it receives
#[derive(Debug, Default)]
pub struct MemoryBackend {
    played: Mutex<Vec<PlayedChord>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything played so far, oldest first
    pub fn played(&self) -> Vec<PlayedChord> {
        match self.played.lock() {
            Ok(played) => played.clone(),
            Err(_) => Vec::new(),
        }
    }

    pub fn clear(&self) {
        if let Ok(mut played) = self.played.lock() {
            played.clear();
        }
    }
}

impl SynthBackend for MemoryBackend {
    fn play(&self, instrument: Instrument, schedule: &ChordSchedule) -> Result<(), PlaybackError> {
        let mut played = self.played.lock().map_err(|_| PlaybackError::LockFailed)?;
        played.push(PlayedChord {
            at: Instant::now(),
            instrument,
            schedule: schedule.clone(),
        });
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
