// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Chordially: diatonic scale and chord engine with a chord player and a
//! JSON query service.

pub mod config;
pub mod music;
pub mod playback;
pub mod recording;
pub mod server;
