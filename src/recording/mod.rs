// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Offline rendering of chord sequences.
//!
//! Lays chords out on a MIDI timeline exactly as the player would strike
//! them: each chord voiced and scheduled by its style, consecutive chords
//! one decay window apart.

pub mod export;

pub use export::{ExportNote, ExportTrack, MidiExporter, MidiFileFormat};

use tracing::debug;

use crate::music::{voice, Chord};
use crate::playback::{Instrument, PlayStyle, PlaybackTiming};

/// Velocity used for rendered notes
const VELOCITY: u8 = 90;

/// Render chords, in the given order, into a single-track MIDI file
pub fn render_sequence(
    chords: &[&Chord],
    style: PlayStyle,
    instrument: Instrument,
    timing: &PlaybackTiming,
) -> MidiExporter {
    let mut exporter = MidiExporter::new();
    render_into(&mut exporter, chords, style, instrument, timing);
    exporter
}

/// Render chords onto an exporter whose format and resolution are already set
pub fn render_into(
    exporter: &mut MidiExporter,
    chords: &[&Chord],
    style: PlayStyle,
    instrument: Instrument,
    timing: &PlaybackTiming,
) {
    exporter.set_tempo(timing.tempo);

    let mut track = ExportTrack::new(instrument.name(), 0).with_program(instrument.gm_program());
    let spacing = exporter.millis_to_ticks(timing.chord_spacing_ms);

    for (i, chord) in chords.iter().enumerate() {
        let start = spacing * i as u64;
        let schedule = style.schedule(&voice(chord), timing);
        for event in &schedule.events {
            let tick = start + exporter.millis_to_ticks(event.offset.as_millis() as u64);
            let duration = exporter.millis_to_ticks(event.duration.as_millis() as u64);
            track.add_note(ExportNote::new(tick, event.note.midi(), VELOCITY, duration.max(1)));
        }
    }

    debug!(
        chords = chords.len(),
        notes = track.notes.len(),
        end_tick = track.end_tick(),
        "rendered sequence"
    );
    exporter.add_track(track);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::music::{build_chords, Extension, Progression, Scale, ScaleType};

    #[test]
    fn test_render_progression() {
        let scale = Scale::build("C", ScaleType::Major).unwrap();
        let chords = build_chords(&scale, Extension::Triad);
        let prog = Progression::builtin("I-V-vi-IV").unwrap();
        let ordered = prog.resolve(&chords).unwrap();

        let exporter = render_sequence(
            &ordered,
            PlayStyle::Sustained,
            Instrument::FmSynth,
            &PlaybackTiming::default(),
        );

        let track = &exporter.tracks()[0];
        assert_eq!(track.program, Some(4));
        assert_eq!(track.notes.len(), 12);

        // Each chord starts 3 s (2880 ticks) after the previous one
        let starts: Vec<u64> = track.notes.iter().step_by(3).map(|n| n.tick).collect();
        assert_eq!(starts, vec![0, 2880, 5760, 8640]);

        // Second chord is G3 B4 D4 reordered to G3 D4 B4
        let second: Vec<u8> = track.notes[3..6].iter().map(|n| n.note).collect();
        assert_eq!(second, vec![55, 62, 71]);
    }

    #[test]
    fn test_render_arpeggio_offsets() {
        let scale = Scale::build("A", ScaleType::NaturalMinor).unwrap();
        let chords = build_chords(&scale, Extension::Seventh);
        let exporter = render_sequence(
            &[&chords[0]],
            PlayStyle::Arpeggiated,
            Instrument::Synth,
            &PlaybackTiming::default(),
        );

        let ticks: Vec<u64> = exporter.tracks()[0].notes.iter().map(|n| n.tick).collect();
        assert_eq!(ticks, vec![0, 384, 768, 1152]);
        assert_eq!(exporter.tracks()[0].notes[0].duration, 240);
    }

    #[test]
    fn test_nan_tempo_keeps_chords_apart() {
        let config = crate::config::AppConfig::from_yaml("timing:\n  tempo: .nan\n").unwrap();
        assert!(config.timing.tempo.is_nan());

        let scale = Scale::build("C", ScaleType::Major).unwrap();
        let chords = build_chords(&scale, Extension::Triad);
        let ordered: Vec<&Chord> = chords.iter().collect();
        let exporter = render_sequence(&ordered, PlayStyle::Sustained, Instrument::Synth, &config.timing);

        assert_eq!(exporter.tempo(), 120.0);
        let starts: Vec<u64> = exporter.tracks()[0].notes.iter().step_by(3).map(|n| n.tick).collect();
        assert_eq!(starts, vec![0, 2880, 5760, 8640, 11520, 14400, 17280]);
    }

    #[test]
    fn test_render_into_type1_at_960_ppqn() {
        let scale = Scale::build("C", ScaleType::Major).unwrap();
        let chords = build_chords(&scale, Extension::Triad);

        let mut exporter = MidiExporter::new();
        exporter.set_format(MidiFileFormat::Type1);
        exporter.set_ppqn(960);
        render_into(
            &mut exporter,
            &[&chords[0], &chords[4]],
            PlayStyle::Sustained,
            Instrument::Synth,
            &PlaybackTiming::default(),
        );

        assert_eq!(exporter.tracks()[0].notes[3].tick, 5760);
        let bytes = exporter.to_bytes();
        assert_eq!(&bytes[8..10], &[0, 1]);
        assert_eq!(&bytes[12..14], &960u16.to_be_bytes());
    }
}
