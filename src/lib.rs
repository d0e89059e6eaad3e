// pang -- algorithmic notation through queue simulation
// Copyright (C) 2026  The pang developers
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Algorithmic notation through queue simulation.
//!
//! A `pang_core::Sequence` of sound points is distributed over a set of
//! servers by [`simulation::simulate_queue`]. Each server's record can then be
//! quantized into a notated voice, see [`mapper::populate_voices_from_sequence`].

pub mod input;
pub mod mapper;
pub mod quantize;
pub mod server;
pub mod sieve;
pub mod simulation;

pub use mapper::{populate_voices_from_sequence, QuantizingMetadata, Voice, VoiceSpecification};
pub use server::{NoteServer, PitchServer, PredicateServer, Server};
pub use simulation::{simulate_queue, QueueError};
