// pang -- algorithmic notation through queue simulation
// Copyright (C) 2026  The pang developers
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Payloads attached to sound points and carried through to notation.

use std::fmt;

use crate::rational::Rational;

/// Notation attached to a sound point. The simulation never looks inside;
/// it only moves attachments along with the sound point they belong to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Attachment {
    /// A dynamic marking such as `p` or `sfz`.
    Dynamic(String),
    /// An articulation such as `staccato` or `accent`.
    Articulation(String),
    /// Free text shown above the note.
    Markup(String),
    /// Play as harmonics.
    Harmonics,
    /// A tempo indication: `units_per_minute` notes of length `reference`.
    MetronomeMark {
        reference: Rational,
        units_per_minute: i64,
    },
}

impl fmt::Display for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attachment::Dynamic(name) => write!(f, "\\{}", name),
            Attachment::Articulation(name) => write!(f, "-\\{}", name),
            Attachment::Markup(text) => write!(f, "^\"{}\"", text),
            Attachment::Harmonics => write!(f, "\\harmonic"),
            Attachment::MetronomeMark {
                reference,
                units_per_minute,
            } => write!(f, "\\tempo {}={}", reference, units_per_minute),
        }
    }
}
