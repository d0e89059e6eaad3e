// pang -- algorithmic notation through queue simulation
// Copyright (C) 2026  The pang developers
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! A line based text format for writing down sound points.
//!
//! Every non-empty line holds one sound point:
//!
//! ```text
//! # instance duration pitch [attachments]
//! 0    1/2  0
//! 0.5  1    0,4,7   dynamic=mf articulation=accent
//! 2    0.25 -3.5    markup=dolce harmonics
//! ```
//!
//! Times are in seconds and may be written as integers, fractions or
//! decimals. A comma separated pitch is a chord. Everything after `#` is
//! ignored.

use pang_core::nonnan::ParseNonNanError;
use pang_core::rational::ParseRationalError;
use pang_core::{Attachment, Pitch, Sequence, SequenceError, SoundPoint, Time};
use snafu::{ResultExt, Snafu};

#[derive(Debug, PartialEq, Snafu)]
pub enum ParseError {
    #[snafu(display("line {}: missing {}", line, field))]
    MissingField { line: usize, field: &'static str },
    #[snafu(display("line {}: invalid time '{}': {}", line, text, source))]
    InvalidTime {
        line: usize,
        text: String,
        source: ParseRationalError,
    },
    #[snafu(display("line {}: invalid pitch '{}': {}", line, text, source))]
    InvalidPitch {
        line: usize,
        text: String,
        source: ParseNonNanError,
    },
    #[snafu(display("line {}: unknown attachment '{}'", line, text))]
    UnknownAttachment { line: usize, text: String },
    #[snafu(display("invalid sequence: {}", source))]
    InvalidSequence { source: SequenceError },
}

/// Parse all sound points in `input`, in the order they appear.
pub fn parse_sound_points(input: &str) -> Result<Vec<SoundPoint>, ParseError> {
    let mut points = Vec::new();
    for (index, raw) in input.lines().enumerate() {
        let content = match raw.find('#') {
            Some(comment) => &raw[..comment],
            None => raw,
        };
        if content.trim().is_empty() {
            continue;
        }
        points.push(parse_line(index + 1, content)?);
    }
    Ok(points)
}

/// Parse a sequence. Without a `duration`, the sequence ends with its last
/// sound point.
pub fn parse_sequence(input: &str, duration: Option<Time>) -> Result<Sequence, ParseError> {
    let points = parse_sound_points(input)?;
    let sequence = match duration {
        Some(duration) => Sequence::new(points, duration),
        None => Sequence::from_sound_points(points),
    };
    sequence.context(InvalidSequence)
}

fn parse_line(line: usize, content: &str) -> Result<SoundPoint, ParseError> {
    let mut fields = content.split_whitespace();
    let mut next = |field| fields.next().ok_or(ParseError::MissingField { line, field });
    let instance = next("instance")?;
    let duration = next("duration")?;
    let pitch = next("pitch")?;

    let instance = instance
        .parse::<Time>()
        .context(InvalidTime { line, text: instance })?;
    let duration = duration
        .parse::<Time>()
        .context(InvalidTime { line, text: duration })?;
    let pitch = pitch
        .parse::<Pitch>()
        .context(InvalidPitch { line, text: pitch })?;
    let attachments = fields
        .map(|text| parse_attachment(line, text))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SoundPoint::new(instance, duration, pitch).with_attachments(attachments))
}

fn parse_attachment(line: usize, text: &str) -> Result<Attachment, ParseError> {
    let attachment = match text.split_once('=') {
        Some(("dynamic", value)) if !value.is_empty() => Attachment::Dynamic(value.to_string()),
        Some(("articulation", value)) if !value.is_empty() => {
            Attachment::Articulation(value.to_string())
        }
        Some(("markup", value)) => Attachment::Markup(value.replace('_', " ")),
        None if text == "harmonics" => Attachment::Harmonics,
        _ => {
            return Err(ParseError::UnknownAttachment {
                line,
                text: text.to_string(),
            })
        }
    };
    Ok(attachment)
}
