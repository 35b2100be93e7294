// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Standard MIDI file export.
//!
//! Writes rendered chord sequences as Type 0 or Type 1 MIDI files.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Tempo used when a requested tempo is not a finite number
const DEFAULT_TEMPO: f64 = 120.0;

/// Chord sequences are written in common time
const TIME_SIGNATURE: (u8, u8) = (4, 4);

/// MIDI file format type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MidiFileFormat {
    /// Type 0: Single track with all channels
    #[default]
    Type0,
    /// Type 1: Tempo track plus one track per chord track
    Type1,
}

/// A note placed on the tick grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportNote {
    /// Start tick
    pub tick: u64,
    /// Note number (0-127)
    pub note: u8,
    /// Velocity (1-127)
    pub velocity: u8,
    /// Duration in ticks
    pub duration: u64,
}

impl ExportNote {
    pub fn new(tick: u64, note: u8, velocity: u8, duration: u64) -> Self {
        Self {
            tick,
            note,
            velocity,
            duration,
        }
    }

    pub fn end_tick(&self) -> u64 {
        self.tick + self.duration
    }
}

/// One instrument's notes
#[derive(Debug, Clone)]
pub struct ExportTrack {
    pub name: String,
    /// MIDI channel (0-15)
    pub channel: u8,
    pub notes: Vec<ExportNote>,
    /// Program change at start (None = no change)
    pub program: Option<u8>,
}

impl ExportTrack {
    pub fn new(name: impl Into<String>, channel: u8) -> Self {
        Self {
            name: name.into(),
            channel: channel & 0x0F,
            notes: Vec::new(),
            program: None,
        }
    }

    pub fn with_program(mut self, program: u8) -> Self {
        self.program = Some(program & 0x7F);
        self
    }

    pub fn add_note(&mut self, note: ExportNote) {
        self.notes.push(note);
    }

    /// Tick of the last note-off
    pub fn end_tick(&self) -> u64 {
        self.notes.iter().map(ExportNote::end_tick).max().unwrap_or(0)
    }

    /// Channel events in file order: program change, then notes with
    /// note-offs ahead of note-ons on the same tick
    fn events(&self) -> Vec<TrackEvent> {
        let mut events = Vec::with_capacity(self.notes.len() * 2 + 1);
        if let Some(program) = self.program {
            events.push(TrackEvent::new(0, 0, vec![0xC0 | self.channel, program]));
        }
        for note in &self.notes {
            events.push(TrackEvent::new(
                note.end_tick(),
                1,
                vec![0x80 | self.channel, note.note & 0x7F, 0],
            ));
            events.push(TrackEvent::new(
                note.tick,
                2,
                vec![0x90 | self.channel, note.note & 0x7F, note.velocity.clamp(1, 127)],
            ));
        }
        events
    }
}

/// Raw event with its absolute tick; `rank` orders events sharing a tick
#[derive(Debug, Clone)]
struct TrackEvent {
    tick: u64,
    rank: u8,
    data: Vec<u8>,
}

impl TrackEvent {
    fn new(tick: u64, rank: u8, data: Vec<u8>) -> Self {
        Self { tick, rank, data }
    }

    fn meta(kind: u8, payload: &[u8]) -> Self {
        let mut data = vec![0xFF, kind, payload.len() as u8];
        data.extend_from_slice(payload);
        Self::new(0, 0, data)
    }

    fn tempo(bpm: f64) -> Self {
        let micros = (60_000_000.0 / bpm) as u32;
        Self::meta(0x51, &micros.to_be_bytes()[1..])
    }

    fn time_signature(numerator: u8, denominator: u8) -> Self {
        // Denominator is expressed as power of 2
        let denom_power = (denominator as f64).log2() as u8;
        Self::meta(0x58, &[numerator, denom_power, 24, 8])
    }

    fn track_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        Self::meta(0x03, &bytes[..bytes.len().min(127)])
    }
}

/// MIDI file writer
#[derive(Debug, Clone)]
pub struct MidiExporter {
    format: MidiFileFormat,
    /// Ticks per quarter note
    ppqn: u16,
    /// Tempo in BPM
    tempo: f64,
    tracks: Vec<ExportTrack>,
}

impl MidiExporter {
    pub fn new() -> Self {
        Self {
            format: MidiFileFormat::Type0,
            ppqn: 480,
            tempo: DEFAULT_TEMPO,
            tracks: Vec::new(),
        }
    }

    pub fn format(&self) -> MidiFileFormat {
        self.format
    }

    pub fn set_format(&mut self, format: MidiFileFormat) {
        self.format = format;
    }

    pub fn ppqn(&self) -> u16 {
        self.ppqn
    }

    pub fn set_ppqn(&mut self, ppqn: u16) {
        self.ppqn = ppqn.max(1);
    }

    pub fn tempo(&self) -> f64 {
        self.tempo
    }

    /// Set the tempo, clamped to 20-300 BPM; NaN or infinite falls back to 120
    pub fn set_tempo(&mut self, bpm: f64) {
        self.tempo = if bpm.is_finite() {
            bpm.clamp(20.0, 300.0)
        } else {
            DEFAULT_TEMPO
        };
    }

    pub fn add_track(&mut self, track: ExportTrack) {
        self.tracks.push(track);
    }

    pub fn tracks(&self) -> &[ExportTrack] {
        &self.tracks
    }

    /// Convert milliseconds to ticks at the current tempo
    pub fn millis_to_ticks(&self, millis: u64) -> u64 {
        let ticks_per_ms = self.ppqn as f64 * self.tempo / 60_000.0;
        (millis as f64 * ticks_per_ms).round() as u64
    }

    /// Write to a file
    pub fn export<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write(&mut writer)?;
        writer.flush()
    }

    /// Encode the whole file in memory
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = Vec::new();
        // Writing into a Vec cannot fail
        let _ = self.write(&mut buffer);
        buffer
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let conductor = vec![
            TrackEvent::tempo(self.tempo),
            TrackEvent::time_signature(TIME_SIGNATURE.0, TIME_SIGNATURE.1),
        ];

        match self.format {
            MidiFileFormat::Type0 => {
                let mut events = conductor;
                for track in &self.tracks {
                    events.extend(track.events());
                }
                write_header(writer, 0, 1, self.ppqn)?;
                write_track(writer, events)
            }
            MidiFileFormat::Type1 => {
                write_header(writer, 1, self.tracks.len() as u16 + 1, self.ppqn)?;
                let mut events = conductor;
                events.push(TrackEvent::track_name("Tempo"));
                write_track(writer, events)?;

                for track in &self.tracks {
                    let mut events = vec![TrackEvent::track_name(&track.name)];
                    events.extend(track.events());
                    write_track(writer, events)?;
                }
                Ok(())
            }
        }
    }
}

impl Default for MidiExporter {
    fn default() -> Self {
        Self::new()
    }
}

fn write_header<W: Write>(writer: &mut W, format: u16, num_tracks: u16, ppqn: u16) -> io::Result<()> {
    writer.write_all(b"MThd")?;
    writer.write_all(&6u32.to_be_bytes())?;
    writer.write_all(&format.to_be_bytes())?;
    writer.write_all(&num_tracks.to_be_bytes())?;
    writer.write_all(&ppqn.to_be_bytes())
}

fn write_track<W: Write>(writer: &mut W, mut events: Vec<TrackEvent>) -> io::Result<()> {
    events.sort_by_key(|e| (e.tick, e.rank));

    let mut data = Vec::new();
    let mut last_tick = 0u64;
    for event in &events {
        let delta = event.tick.saturating_sub(last_tick);
        data.extend(variable_length(delta as u32));
        data.extend_from_slice(&event.data);
        last_tick = event.tick;
    }
    // End of track
    data.extend_from_slice(&[0x00, 0xFF, 0x2F, 0x00]);

    writer.write_all(b"MTrk")?;
    writer.write_all(&(data.len() as u32).to_be_bytes())?;
    writer.write_all(&data)
}

/// Variable-length quantity, most significant group first
fn variable_length(mut value: u32) -> Vec<u8> {
    let mut bytes = vec![(value & 0x7F) as u8];
    value >>= 7;
    while value > 0 {
        bytes.push((value & 0x7F) as u8 | 0x80);
        value >>= 7;
    }
    bytes.reverse();
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triad_track() -> ExportTrack {
        let mut track = ExportTrack::new("Chords", 0).with_program(4);
        for note in [48, 64, 67] {
            track.add_note(ExportNote::new(0, note, 90, 480));
        }
        track
    }

    #[test]
    fn test_exporter_defaults() {
        let exporter = MidiExporter::new();
        assert_eq!(exporter.format(), MidiFileFormat::Type0);
        assert_eq!(exporter.ppqn(), 480);
        assert_eq!(exporter.tempo(), 120.0);
    }

    #[test]
    fn test_tempo_is_clamped_and_finite() {
        let mut exporter = MidiExporter::new();
        exporter.set_tempo(1000.0);
        assert_eq!(exporter.tempo(), 300.0);
        exporter.set_tempo(f64::NAN);
        assert_eq!(exporter.tempo(), 120.0);
        exporter.set_tempo(f64::NEG_INFINITY);
        assert_eq!(exporter.tempo(), 120.0);
        assert_eq!(exporter.millis_to_ticks(3000), 2880);
    }

    #[test]
    fn test_ppqn_scales_ticks() {
        let mut exporter = MidiExporter::new();
        exporter.set_ppqn(960);
        assert_eq!(exporter.millis_to_ticks(500), 960);
        exporter.set_ppqn(0);
        assert_eq!(exporter.ppqn(), 1);
    }

    #[test]
    fn test_variable_length() {
        assert_eq!(variable_length(0), vec![0x00]);
        assert_eq!(variable_length(0x7F), vec![0x7F]);
        assert_eq!(variable_length(0x80), vec![0x81, 0x00]);
        assert_eq!(variable_length(0x3FFF), vec![0xFF, 0x7F]);
        assert_eq!(variable_length(0x4000), vec![0x81, 0x80, 0x00]);
    }

    #[test]
    fn test_millis_to_ticks() {
        let exporter = MidiExporter::new();
        // 120 BPM, 480 PPQN: a quarter note is 500 ms
        assert_eq!(exporter.millis_to_ticks(500), 480);
        assert_eq!(exporter.millis_to_ticks(3000), 2880);
        assert_eq!(exporter.millis_to_ticks(70), 67);
    }

    #[test]
    fn test_type0_layout() {
        let mut exporter = MidiExporter::new();
        exporter.add_track(triad_track());
        let bytes = exporter.to_bytes();

        assert_eq!(&bytes[0..4], b"MThd");
        assert_eq!(&bytes[8..10], &[0, 0]); // format 0
        assert_eq!(&bytes[10..12], &[0, 1]); // one track
        assert_eq!(&bytes[12..14], &480u16.to_be_bytes());
        assert_eq!(&bytes[14..18], b"MTrk");

        let len = u32::from_be_bytes([bytes[18], bytes[19], bytes[20], bytes[21]]) as usize;
        assert_eq!(bytes.len(), 22 + len);
        assert_eq!(&bytes[bytes.len() - 3..], &[0xFF, 0x2F, 0x00]);
    }

    #[test]
    fn test_type1_has_tempo_track() {
        let mut exporter = MidiExporter::new();
        exporter.set_format(MidiFileFormat::Type1);
        exporter.add_track(triad_track());
        let bytes = exporter.to_bytes();

        assert_eq!(&bytes[8..10], &[0, 1]);
        assert_eq!(&bytes[10..12], &[0, 2]);
        let chunks = bytes.windows(4).filter(|w| *w == b"MTrk").count();
        assert_eq!(chunks, 2);
    }

    #[test]
    fn test_note_off_precedes_note_on_on_same_tick() {
        let mut track = ExportTrack::new("Repeat", 0);
        track.add_note(ExportNote::new(0, 60, 90, 480));
        track.add_note(ExportNote::new(480, 60, 90, 480));

        let mut events = track.events();
        events.sort_by_key(|e| (e.tick, e.rank));
        let at_480: Vec<u8> = events.iter().filter(|e| e.tick == 480).map(|e| e.data[0]).collect();
        assert_eq!(at_480, vec![0x80, 0x90]);
    }

    #[test]
    fn test_tempo_event() {
        let event = TrackEvent::tempo(120.0);
        // 500,000 microseconds per quarter
        assert_eq!(event.data, vec![0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20]);
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chords.mid");

        let mut exporter = MidiExporter::new();
        exporter.add_track(triad_track());
        exporter.export(&path).unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), exporter.to_bytes());
    }
}
