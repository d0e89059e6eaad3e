// pang -- algorithmic notation through queue simulation
// Copyright (C) 2026  The pang developers
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Distributing a sequence over notated voices.
//!
//! Each voice is fed by one server. All servers take part in a single queue
//! simulation, so a sound point routed away from one voice can still delay
//! the others. Afterwards every server that played something is quantized and
//! the result appended to its voice.

use std::fmt;

use log::debug;
use pang_core::Sequence;
use snafu::{ResultExt, Snafu};

use crate::quantize::{DiscardCounts, Leaf, QuantizeConfig, QuantizeError, Quantizer};
use crate::server::{NoteServer, Server};
use crate::simulation::{simulate_queue, QueueError};

/// Possible errors when populating voices.
#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum MapError {
    #[snafu(display("cannot distribute sound points: {}", source))]
    Simulation { source: QueueError },
    #[snafu(display("cannot quantize voice {}: {}", voice, source))]
    Quantization { voice: usize, source: QuantizeError },
}

/// Somewhere quantized leaves can be appended to.
pub trait VoiceSink {
    fn extend_leaves(&mut self, leaves: Vec<Leaf>);
}

impl VoiceSink for Vec<Leaf> {
    fn extend_leaves(&mut self, leaves: Vec<Leaf>) {
        self.extend(leaves)
    }
}

/// A named voice of a score.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    pub leaves: Vec<Leaf>,
}

impl Voice {
    pub fn new(name: impl Into<String>) -> Self {
        Voice {
            name: name.into(),
            leaves: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }
}

impl VoiceSink for Voice {
    fn extend_leaves(&mut self, leaves: Vec<Leaf>) {
        self.leaves.extend(leaves)
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "voice {} {{", self.name)?;
        for leaf in &self.leaves {
            writeln!(f, "    {}", leaf)?;
        }
        write!(f, "}}")
    }
}

/// A voice together with the server feeding it and how its record is
/// quantized.
pub struct VoiceSpecification<'v> {
    pub voice: &'v mut dyn VoiceSink,
    pub server: Box<dyn Server>,
    pub config: QuantizeConfig,
}

impl<'v> VoiceSpecification<'v> {
    /// A voice accepting every sound point, quantized with the default
    /// configuration.
    pub fn new(voice: &'v mut dyn VoiceSink) -> Self {
        VoiceSpecification {
            voice,
            server: Box::new(NoteServer::new()),
            config: QuantizeConfig::default(),
        }
    }

    pub fn with_server(self, server: impl Server + 'static) -> Self {
        VoiceSpecification {
            server: Box::new(server),
            ..self
        }
    }

    pub fn with_config(self, config: QuantizeConfig) -> Self {
        VoiceSpecification { config, ..self }
    }
}

impl fmt::Debug for VoiceSpecification<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoiceSpecification")
            .field("record", self.server.record())
            .field("config", &self.config)
            .finish()
    }
}

/// What happened to a single voice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceMetadata {
    /// Number of leaves appended.
    pub leaves: usize,
    /// `None` if the voice's server played nothing or the quantizer does not
    /// count dropped events.
    pub discarded: Option<DiscardCounts>,
}

/// Totals over all voices of one `populate_voices_from_sequence` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuantizingMetadata {
    pub number_of_all_discarded_q_events: usize,
    pub number_of_discarded_pitched_q_events: usize,
    /// One entry per voice specification, in order.
    pub voices: Vec<VoiceMetadata>,
}

/// Simulate `sequence` on the servers of all `voice_specifications` at once,
/// then quantize every server that played something into its voice.
///
/// Voices are only extended once the simulation and all quantizations
/// succeeded.
pub fn populate_voices_from_sequence<Q: Quantizer + ?Sized>(
    sequence: &Sequence,
    voice_specifications: &mut [VoiceSpecification<'_>],
    quantizer: &mut Q,
) -> Result<QuantizingMetadata, MapError> {
    let mut servers: Vec<&mut Box<dyn Server>> = voice_specifications
        .iter_mut()
        .map(|specification| &mut specification.server)
        .collect();
    simulate_queue(sequence, &mut servers[..]).context(Simulation)?;

    let mut quantized = Vec::with_capacity(voice_specifications.len());
    for (voice, specification) in voice_specifications.iter().enumerate() {
        let record = specification.server.record();
        if record.is_empty() {
            quantized.push(None);
            continue;
        }
        let result = quantizer
            .quantize(&record.millisecond_q_events(), &specification.config)
            .context(Quantization { voice })?;
        quantized.push(Some(result));
    }

    let mut metadata = QuantizingMetadata::default();
    for (specification, result) in voice_specifications.iter_mut().zip(quantized) {
        let mut voice = VoiceMetadata::default();
        if let Some(result) = result {
            if let Some(discarded) = result.discarded {
                metadata.number_of_all_discarded_q_events += discarded.all;
                metadata.number_of_discarded_pitched_q_events += discarded.pitched;
            }
            voice.leaves = result.leaves.len();
            voice.discarded = result.discarded;
            specification.voice.extend_leaves(result.leaves);
        }
        metadata.voices.push(voice);
    }
    debug!(
        "populated {} voices, {} events discarded ({} pitched)",
        metadata.voices.len(),
        metadata.number_of_all_discarded_q_events,
        metadata.number_of_discarded_pitched_q_events
    );
    Ok(metadata)
}
