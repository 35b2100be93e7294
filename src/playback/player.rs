// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Chord player with single in-flight sequence.
//!
//! Single chords are handed straight to the backend. Sequences (all seven
//! chords, or a progression) run as a cooperative task that sleeps one
//! decay window between chords. The player is `Idle` or `Playing`; a
//! sequence can only start from `Idle`, and a second request while
//! `Playing` is rejected with [`PlaybackError::Busy`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{info, warn};

use super::{ChordSchedule, Instrument, PlayStyle, PlaybackError, PlaybackTiming, SynthBackend};
use crate::music::{voice, Chord, Progression};

/// Sequencing state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Playing,
}

/// Plays chords through a synthesis backend
#[derive(Clone)]
pub struct Player {
    backend: Arc<dyn SynthBackend>,
    timing: PlaybackTiming,
    state: Arc<Mutex<PlayerState>>,
}

impl Player {
    /// Create a player on a backend
    pub fn new(backend: Arc<dyn SynthBackend>, timing: PlaybackTiming) -> Self {
        Self {
            backend,
            timing,
            state: Arc::new(Mutex::new(PlayerState::Idle)),
        }
    }

    pub fn timing(&self) -> &PlaybackTiming {
        &self.timing
    }

    /// Current sequencing state
    pub fn state(&self) -> PlayerState {
        *lock_state(&self.state)
    }

    pub fn is_playing(&self) -> bool {
        self.state() == PlayerState::Playing
    }

    /// Voice, schedule and play one chord
    pub fn play_chord(
        &self,
        chord: &Chord,
        style: PlayStyle,
        instrument: Instrument,
    ) -> Result<ChordSchedule, PlaybackError> {
        let voiced = voice(chord);
        let schedule = style.schedule(&voiced, &self.timing);
        info!(
            backend = self.backend.name(),
            chord = %voiced,
            style = %style,
            instrument = %instrument,
            "play chord"
        );
        self.backend.play(instrument, &schedule)?;
        Ok(schedule)
    }

    /// Play every chord in scale order
    pub async fn play_all_chords(
        &self,
        chords: &[Chord],
        style: PlayStyle,
        instrument: Instrument,
    ) -> Result<(), PlaybackError> {
        let order = Progression::scale_order(chords.len());
        self.play_progression(chords, &order, style, instrument).await
    }

    /// Play the chords a progression names, in its order
    pub async fn play_progression(
        &self,
        chords: &[Chord],
        progression: &Progression,
        style: PlayStyle,
        instrument: Instrument,
    ) -> Result<(), PlaybackError> {
        let ordered = progression.resolve(chords)?;
        let _guard = self.begin_sequence()?;
        info!(progression = %progression, chords = ordered.len(), "sequence started");

        for chord in ordered {
            self.play_chord(chord, style, instrument)?;
            tokio::time::sleep(self.timing.chord_spacing()).await;
        }

        info!(progression = %progression, "sequence finished");
        Ok(())
    }

    /// Idle -> Playing, or Busy if a sequence is already in flight
    fn begin_sequence(&self) -> Result<SequenceGuard, PlaybackError> {
        let mut state = lock_state(&self.state);
        if *state == PlayerState::Playing {
            warn!("sequence requested while another is playing");
            return Err(PlaybackError::Busy);
        }
        *state = PlayerState::Playing;
        Ok(SequenceGuard {
            state: Arc::clone(&self.state),
        })
    }
}

/// Returns the player to Idle when a sequence ends, however it ends
struct SequenceGuard {
    state: Arc<Mutex<PlayerState>>,
}

impl Drop for SequenceGuard {
    fn drop(&mut self) {
        *lock_state(&self.state) = PlayerState::Idle;
    }
}

/// The state is a plain enum, so a poisoned lock still holds a valid value
fn lock_state(state: &Mutex<PlayerState>) -> MutexGuard<'_, PlayerState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
