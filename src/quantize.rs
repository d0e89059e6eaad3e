// pang -- algorithmic notation through queue simulation
// Copyright (C) 2026  The pang developers
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Turning a server's record into notated rhythm.
//!
//! The queue simulation works in seconds; notation works in fractions of a
//! whole note on a rhythmic grid. A `Quantizer` bridges the two. The
//! configuration types here name the policies a quantizer is asked to follow,
//! and `GridQuantizer` is a small quantizer that follows them on a fixed grid.

use std::fmt;

use log::debug;
use pang_core::{Attachment, Pitch, Rational};
use snafu::Snafu;

use crate::server::QEvent;

/// Possible errors when quantizing.
#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum QuantizeError {
    #[snafu(display("invalid tempo {}={}", reference, units_per_minute))]
    InvalidTempo {
        reference: Rational,
        units_per_minute: i64,
    },
    #[snafu(display("invalid beat divisions {}, must be positive", beat_divisions))]
    InvalidDivisions { beat_divisions: i64 },
    #[snafu(display("invalid time signature {}/{}", numerator, denominator))]
    InvalidTimeSignature { numerator: i64, denominator: i64 },
}

/// `units_per_minute` notes of length `reference` (in whole notes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tempo {
    pub reference: Rational,
    pub units_per_minute: i64,
}

impl Tempo {
    /// Length in whole notes of one millisecond.
    pub fn whole_notes_per_millisecond(&self) -> Rational {
        self.reference * self.units_per_minute / 60_000
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Tempo {
            reference: Rational::new(1, 4),
            units_per_minute: 60,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSignature {
    pub numerator: i64,
    pub denominator: i64,
}

impl TimeSignature {
    /// Length of one measure in whole notes.
    pub fn measure_length(&self) -> Rational {
        Rational::new(self.numerator, self.denominator)
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        TimeSignature {
            numerator: 4,
            denominator: 4,
        }
    }
}

/// The unit the search for attack points is organized by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QSchemaKind {
    Measurewise,
    Beatwise,
}

/// The rhythmic grid events are quantized onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QSchema {
    pub kind: QSchemaKind,
    pub tempo: Tempo,
    pub time_signature: TimeSignature,
    /// Number of grid steps per beat, a beat being `tempo.reference`.
    pub beat_divisions: i64,
}

impl QSchema {
    /// Length of one grid step in whole notes.
    pub fn grid(&self) -> Rational {
        self.tempo.reference / self.beat_divisions
    }
}

impl Default for QSchema {
    fn default() -> Self {
        QSchema {
            kind: QSchemaKind::Measurewise,
            tempo: Tempo::default(),
            time_signature: TimeSignature::default(),
            beat_divisions: 4,
        }
    }
}

/// What happens to events that are too short to survive on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraceHandling {
    /// Drop them.
    Discard,
    /// Keep pitched ones as grace notes before the next leaf. If that leaf is
    /// a rest and `replace_rest_with_final_grace_note` is set, the last grace
    /// note takes the place of the rest.
    Concatenate {
        replace_rest_with_final_grace_note: bool,
    },
}

impl Default for GraceHandling {
    fn default() -> Self {
        GraceHandling::Concatenate {
            replace_rest_with_final_grace_note: true,
        }
    }
}

/// How an attack point between grid lines is moved onto the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heuristic {
    /// To the nearest grid line, the later one on ties.
    Distance,
    /// To the grid line at or before it.
    Floor,
}

impl Default for Heuristic {
    fn default() -> Self {
        Heuristic::Distance
    }
}

/// How quantized leaves are arranged for notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackPointOptimizer {
    /// Split leaves at barlines, tying the parts of notes.
    Measurewise,
    /// Leave leaves as they are.
    Naive,
}

impl Default for AttackPointOptimizer {
    fn default() -> Self {
        AttackPointOptimizer::Measurewise
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantizeConfig {
    pub schema: QSchema,
    pub grace_handling: GraceHandling,
    pub heuristic: Heuristic,
    pub attack_point_optimizer: AttackPointOptimizer,
    /// Put a metronome mark on the first leaf.
    pub attach_tempos: bool,
}

impl Default for QuantizeConfig {
    fn default() -> Self {
        QuantizeConfig {
            schema: QSchema::default(),
            grace_handling: GraceHandling::default(),
            heuristic: Heuristic::default(),
            attack_point_optimizer: AttackPointOptimizer::default(),
            attach_tempos: true,
        }
    }
}

/// A note, chord or rest of notated length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    /// Length in whole notes.
    pub duration: Rational,
    /// `None` for rests.
    pub pitch: Option<Pitch>,
    pub attachments: Vec<Attachment>,
    /// Grace notes played right before this leaf.
    pub grace_notes: Vec<Pitch>,
    /// Tied to the following leaf.
    pub tie: bool,
}

impl Leaf {
    pub fn rest(duration: Rational) -> Self {
        Leaf {
            duration,
            pitch: None,
            attachments: Vec::new(),
            grace_notes: Vec::new(),
            tie: false,
        }
    }

    pub fn is_rest(&self) -> bool {
        self.pitch.is_none()
    }
}

/// Prints as e.g. `{1 2} 0:1/4~ \p` or `r:1/2`.
impl fmt::Display for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.grace_notes.is_empty() {
            write!(f, "{{")?;
            for (i, grace) in self.grace_notes.iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", grace)?;
            }
            write!(f, "}} ")?;
        }
        match &self.pitch {
            Some(pitch) => write!(f, "{}", pitch)?,
            None => write!(f, "r")?,
        }
        write!(f, ":{}", self.duration)?;
        if self.tie {
            write!(f, "~")?;
        }
        for attachment in &self.attachments {
            write!(f, " {}", attachment)?;
        }
        Ok(())
    }
}

/// How many events a quantizer dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscardCounts {
    pub all: usize,
    /// Those of `all` that were not rests.
    pub pitched: usize,
}

/// The outcome of quantizing one server's record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Quantized {
    pub leaves: Vec<Leaf>,
    /// `None` if the quantizer does not keep track of dropped events.
    pub discarded: Option<DiscardCounts>,
}

/// Turns events with millisecond durations into notated leaves.
pub trait Quantizer {
    fn quantize(
        &mut self,
        events: &[QEvent],
        config: &QuantizeConfig,
    ) -> Result<Quantized, QuantizeError>;
}

/// Quantizes onto a fixed grid of `QSchema::grid` whole notes.
#[derive(Debug, Clone, Copy, Default)]
pub struct GridQuantizer;

impl GridQuantizer {
    pub fn new() -> Self {
        GridQuantizer
    }
}

impl Quantizer for GridQuantizer {
    fn quantize(
        &mut self,
        events: &[QEvent],
        config: &QuantizeConfig,
    ) -> Result<Quantized, QuantizeError> {
        validate(&config.schema)?;
        let schema = &config.schema;
        let grid = schema.grid();
        let scale = schema.tempo.whole_notes_per_millisecond();

        // Attack points in whole notes, snapped to the grid. One more than
        // there are events, the last one being where the last event ends.
        let mut onset = Rational::zero();
        let mut attacks = vec![Rational::zero()];
        for event in events {
            onset += event.duration * scale;
            attacks.push(snap(onset, grid, config.heuristic));
        }

        let mut discarded = DiscardCounts::default();
        let mut graces: Vec<Pitch> = Vec::new();
        // attachments of collapsed events, moved to the next leaf
        let mut carried: Vec<Attachment> = Vec::new();
        let mut leaves: Vec<Leaf> = Vec::new();
        for (event, span) in events.iter().zip(attacks.windows(2)) {
            let duration = span[1] - span[0];
            if duration.is_zero() {
                carried.extend(event.attachments.iter().cloned());
                match (&event.pitch, config.grace_handling) {
                    (Some(pitch), GraceHandling::Concatenate { .. }) => graces.push(pitch.clone()),
                    (pitch, _) => {
                        discarded.all += 1;
                        discarded.pitched += pitch.is_some() as usize;
                    }
                }
                continue;
            }

            let mut attachments = std::mem::take(&mut carried);
            attachments.extend(event.attachments.iter().cloned());
            let mut leaf = Leaf {
                duration,
                pitch: event.pitch.clone(),
                attachments,
                grace_notes: std::mem::take(&mut graces),
                tie: false,
            };
            if let GraceHandling::Concatenate {
                replace_rest_with_final_grace_note: true,
            } = config.grace_handling
            {
                if leaf.is_rest() {
                    leaf.pitch = leaf.grace_notes.pop();
                }
            }
            push_merging_rests(&mut leaves, leaf);
        }
        discarded.all += graces.len();
        discarded.pitched += graces.len();
        if let Some(last) = leaves.last_mut() {
            last.attachments.append(&mut carried);
        }
        if !carried.is_empty() {
            debug!("dropped {} attachments without a leaf", carried.len());
        }

        let end = attacks[attacks.len() - 1];
        let unit = match schema.kind {
            QSchemaKind::Measurewise => schema.time_signature.measure_length(),
            QSchemaKind::Beatwise => schema.tempo.reference,
        };
        let padding = (unit - end % unit) % unit;
        if !leaves.is_empty() && padding.is_positive() {
            push_merging_rests(&mut leaves, Leaf::rest(padding));
        }

        if config.attack_point_optimizer == AttackPointOptimizer::Measurewise {
            leaves = split_at_barlines(leaves, schema.time_signature.measure_length());
        }

        if config.attach_tempos {
            if let Some(first) = leaves.first_mut() {
                first.attachments.insert(
                    0,
                    Attachment::MetronomeMark {
                        reference: schema.tempo.reference,
                        units_per_minute: schema.tempo.units_per_minute,
                    },
                );
            }
        }

        debug!(
            "quantized {} events into {} leaves, {} discarded ({} pitched)",
            events.len(),
            leaves.len(),
            discarded.all,
            discarded.pitched
        );
        Ok(Quantized {
            leaves,
            discarded: Some(discarded),
        })
    }
}

fn validate(schema: &QSchema) -> Result<(), QuantizeError> {
    let tempo = schema.tempo;
    if tempo.units_per_minute <= 0 || !tempo.reference.is_positive() {
        return Err(QuantizeError::InvalidTempo {
            reference: tempo.reference,
            units_per_minute: tempo.units_per_minute,
        });
    }
    if schema.beat_divisions <= 0 {
        return Err(QuantizeError::InvalidDivisions {
            beat_divisions: schema.beat_divisions,
        });
    }
    let signature = schema.time_signature;
    if signature.numerator <= 0 || signature.denominator <= 0 {
        return Err(QuantizeError::InvalidTimeSignature {
            numerator: signature.numerator,
            denominator: signature.denominator,
        });
    }
    Ok(())
}

fn snap(time: Rational, grid: Rational, heuristic: Heuristic) -> Rational {
    let steps = time / grid;
    let steps = match heuristic {
        Heuristic::Distance => steps.round(),
        Heuristic::Floor => steps.floor(),
    };
    grid * steps
}

/// Appends `leaf`, folding it into the previous leaf if both are plain rests.
fn push_merging_rests(leaves: &mut Vec<Leaf>, leaf: Leaf) {
    let plain_rest = |leaf: &Leaf| {
        leaf.is_rest() && leaf.attachments.is_empty() && leaf.grace_notes.is_empty()
    };
    if let Some(last) = leaves.last_mut() {
        if plain_rest(last) && plain_rest(&leaf) {
            last.duration += leaf.duration;
            return;
        }
    }
    leaves.push(leaf);
}

/// Splits every leaf crossing a barline. Parts of notes are tied; only the
/// first part keeps attachments and grace notes.
fn split_at_barlines(leaves: Vec<Leaf>, measure: Rational) -> Vec<Leaf> {
    let mut result = Vec::with_capacity(leaves.len());
    let mut position = Rational::zero();
    for mut leaf in leaves {
        let end = position + leaf.duration;
        loop {
            let barline = measure * ((position / measure).floor() + 1);
            if end <= barline {
                leaf.duration = end - position;
                position = end;
                result.push(leaf);
                break;
            }
            let head = Leaf {
                duration: barline - position,
                pitch: leaf.pitch.clone(),
                attachments: std::mem::take(&mut leaf.attachments),
                grace_notes: std::mem::take(&mut leaf.grace_notes),
                tie: !leaf.is_rest(),
            };
            result.push(head);
            position = barline;
        }
    }
    result
}
