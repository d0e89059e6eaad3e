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

//! Sources of sound points for seeding sequences.

use snafu::Snafu;

use crate::pitch::Pitch;
use crate::soundpoint::{SoundPoint, Time};

/// Produces the sound points of a sequence with a given duration.
///
/// Any `Fn(Time) -> Vec<SoundPoint>` is a generator.
pub trait SoundPointsGenerator {
    fn generate(&self, sequence_duration: Time) -> Vec<SoundPoint>;
}

impl<F> SoundPointsGenerator for F
where
    F: Fn(Time) -> Vec<SoundPoint>,
{
    fn generate(&self, sequence_duration: Time) -> Vec<SoundPoint> {
        self(sequence_duration)
    }
}

#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum GeneratorError {
    #[snafu(display(
        "Got {} instances, {} durations and {} pitches",
        instances,
        durations,
        pitches
    ))]
    LengthMismatch {
        instances: usize,
        durations: usize,
        pitches: usize,
    },
}

/// Sound points listed by hand as parallel instance, duration and pitch lists.
/// The requested sequence duration is ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct ManualSoundPointsGenerator {
    instances: Vec<Time>,
    durations: Vec<Time>,
    pitches: Vec<Pitch>,
}

impl ManualSoundPointsGenerator {
    /// Pitches default to 0 when not given.
    pub fn new(
        instances: Vec<Time>,
        durations: Vec<Time>,
        pitches: Option<Vec<Pitch>>,
    ) -> Result<Self, GeneratorError> {
        let pitches = pitches.unwrap_or_else(|| vec![Pitch::from(0); instances.len()]);
        if instances.len() != durations.len() || instances.len() != pitches.len() {
            return Err(GeneratorError::LengthMismatch {
                instances: instances.len(),
                durations: durations.len(),
                pitches: pitches.len(),
            });
        }
        Ok(ManualSoundPointsGenerator {
            instances,
            durations,
            pitches,
        })
    }
}

impl SoundPointsGenerator for ManualSoundPointsGenerator {
    fn generate(&self, _sequence_duration: Time) -> Vec<SoundPoint> {
        self.instances
            .iter()
            .zip(&self.durations)
            .zip(&self.pitches)
            .map(|((instance, duration), pitch)| {
                SoundPoint::new(*instance, *duration, pitch.clone())
            })
            .collect()
    }
}
