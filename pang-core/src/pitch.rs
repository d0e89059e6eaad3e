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

//! Pitches of sound points.

use std::fmt;
use std::str::FromStr;

use crate::nonnan::{ParseNonNanError, F64N};

/// What a sound point plays: a single pitch number or several at once.
///
/// Pitch numbers count semitones with 0 at middle C; fractional values are
/// microtones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Pitch {
    Note(F64N),
    Chord(Vec<F64N>),
}

impl Pitch {
    /// Returns `None` for NaN.
    pub fn note(number: f64) -> Option<Pitch> {
        F64N::new(number).map(Pitch::Note)
    }

    /// Returns `None` if any of the numbers is NaN.
    pub fn chord(numbers: &[f64]) -> Option<Pitch> {
        numbers
            .iter()
            .map(|number| F64N::new(*number))
            .collect::<Option<Vec<_>>>()
            .map(Pitch::Chord)
    }

    /// All pitch numbers sounding, in the order given.
    pub fn numbers(&self) -> &[F64N] {
        match self {
            Pitch::Note(number) => std::slice::from_ref(number),
            Pitch::Chord(numbers) => numbers,
        }
    }

    pub fn is_chord(&self) -> bool {
        matches!(self, Pitch::Chord(_))
    }
}

impl From<i32> for Pitch {
    fn from(number: i32) -> Pitch {
        Pitch::Note(F64N::from(number))
    }
}

impl From<F64N> for Pitch {
    fn from(number: F64N) -> Pitch {
        Pitch::Note(number)
    }
}

/// Notes print as their number, chords as `<a b c>`.
impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pitch::Note(number) => write!(f, "{}", number),
            Pitch::Chord(numbers) => {
                write!(f, "<")?;
                for (i, number) in numbers.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", number)?;
                }
                write!(f, ">")
            }
        }
    }
}

/// `"7"` is a note, `"0,4,7"` a chord and `"<>"` the empty chord.
impl FromStr for Pitch {
    type Err = ParseNonNanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "<>" {
            Ok(Pitch::Chord(Vec::new()))
        } else if s.contains(',') {
            s.split(',')
                .map(|part| part.trim().parse())
                .collect::<Result<Vec<F64N>, _>>()
                .map(Pitch::Chord)
        } else {
            s.trim().parse().map(Pitch::Note)
        }
    }
}
