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

//! A musical sequence: sound points in arrival order plus a nominal duration.

use snafu::Snafu;

use crate::generator::SoundPointsGenerator;
use crate::pitch::Pitch;
use crate::soundpoint::{SoundPoint, Time};

/// An ordered, validated collection of sound points.
///
/// Sound points are sorted by `instance`, none starts before zero or after the
/// declared duration, and every duration is positive. The declared duration
/// may exceed the span covered by the sound points, which leaves trailing
/// silence when sequences are chained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    /// Nominal duration. This determines where appended sequences start.
    duration: Time,
    sound_points: Vec<SoundPoint>,
}

/// Possible errors when building a sequence.
#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum SequenceError {
    #[snafu(display(
        "Sound point {} starts at {}, before its predecessor at {}",
        index,
        current,
        previous
    ))]
    OutOfOrder {
        index: usize,
        previous: Time,
        current: Time,
    },
    #[snafu(display(
        "Sound point {} starts at {}, after the end of the sequence at {}",
        index,
        instance,
        sequence_duration
    ))]
    Overtime {
        index: usize,
        instance: Time,
        sequence_duration: Time,
    },
    #[snafu(display("Sound point {} has non-positive duration {}", index, duration))]
    NonPositiveDuration { index: usize, duration: Time },
    #[snafu(display("Sound point {} starts at negative time {}", index, instance))]
    NegativeInstance { index: usize, instance: Time },
}

impl Sequence {
    // ==================== Constructors ====================

    /// Build a sequence, checking that the sound points are in order and fit
    /// into `sequence_duration`.
    pub fn new(
        sound_points: Vec<SoundPoint>,
        sequence_duration: Time,
    ) -> Result<Self, SequenceError> {
        validate(&sound_points, sequence_duration)?;
        Ok(Sequence {
            duration: sequence_duration,
            sound_points,
        })
    }

    pub fn empty() -> Self {
        Sequence {
            duration: Time::zero(),
            sound_points: Vec::new(),
        }
    }

    /// A sequence lasting exactly until its last sound point ends.
    pub fn from_sound_points(sound_points: Vec<SoundPoint>) -> Result<Self, SequenceError> {
        let duration = end_time(&sound_points);
        Sequence::new(sound_points, duration)
    }

    /// Ask a generator for the sound points of a sequence of the given duration.
    pub fn from_generator<G>(generator: &G, sequence_duration: Time) -> Result<Self, SequenceError>
    where
        G: SoundPointsGenerator + ?Sized,
    {
        Sequence::new(generator.generate(sequence_duration), sequence_duration)
    }

    /// Chain sequences one after another.
    pub fn from_sequences<I>(sequences: I) -> Result<Self, SequenceError>
    where
        I: IntoIterator<Item = Sequence>,
    {
        let mut result = Sequence::empty();
        for sequence in sequences {
            result.extend(&sequence, Time::zero())?;
        }
        Ok(result)
    }

    // ==================== Views ====================

    pub fn sound_points(&self) -> &[SoundPoint] {
        &self.sound_points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SoundPoint> {
        self.sound_points.iter()
    }

    pub fn len(&self) -> usize {
        self.sound_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sound_points.is_empty()
    }

    pub fn instances(&self) -> impl Iterator<Item = Time> + '_ {
        self.sound_points.iter().map(SoundPoint::instance)
    }

    pub fn durations(&self) -> impl Iterator<Item = Time> + '_ {
        self.sound_points.iter().map(SoundPoint::duration)
    }

    pub fn durations_in_milliseconds(&self) -> impl Iterator<Item = Time> + '_ {
        self.durations().map(|duration| duration * 1000)
    }

    pub fn pitches(&self) -> impl Iterator<Item = &Pitch> + '_ {
        self.sound_points.iter().map(SoundPoint::pitch)
    }

    /// The latest time at which any sound point is still sounding.
    pub fn end_time(&self) -> Time {
        end_time(&self.sound_points)
    }

    /// The duration given at construction.
    pub fn declared_duration(&self) -> Time {
        self.duration
    }

    /// The declared duration, or the end time if sound points ring past it.
    pub fn sequence_duration(&self) -> Time {
        self.duration.max(self.end_time())
    }

    // ==================== Composition ====================
    //
    // Each operation builds the combined point list and revalidates it, so a
    // failed operation leaves `self` unchanged.

    /// Append `other` after the end of this sequence, plus `time_gap`.
    pub fn extend(&mut self, other: &Sequence, time_gap: Time) -> Result<(), SequenceError> {
        let offset = self.sequence_duration() + time_gap;
        let mut sound_points = self.sound_points.clone();
        sound_points.extend(other.iter().map(|point| point.shifted(offset)));
        *self = Sequence::new(sound_points, offset + other.sequence_duration())?;
        Ok(())
    }

    /// Splice `other` in at `offset`. Sound points of this sequence starting at
    /// or after `offset` are pushed back by the duration of `other`.
    pub fn insert(&mut self, offset: Time, other: &Sequence) -> Result<(), SequenceError> {
        let shift = other.sequence_duration();
        let split = self
            .sound_points
            .partition_point(|point| point.instance() < offset);
        let (before, after) = self.sound_points.split_at(split);

        let mut sound_points = Vec::with_capacity(self.len() + other.len());
        sound_points.extend(before.iter().cloned());
        sound_points.extend(other.iter().map(|point| point.shifted(offset)));
        sound_points.extend(after.iter().map(|point| point.shifted(shift)));

        let duration = self.sequence_duration().max(offset) + shift;
        *self = Sequence::new(sound_points, duration)?;
        Ok(())
    }

    /// Merge the sound points of `other`, starting at `offset`, into this
    /// sequence. Each point goes after all points that start no later than it.
    pub fn superpose(&mut self, offset: Time, other: &Sequence) -> Result<(), SequenceError> {
        let mut sound_points = self.sound_points.clone();
        for point in other.iter().map(|point| point.shifted(offset)) {
            let position =
                sound_points.partition_point(|existing| existing.instance() <= point.instance());
            sound_points.insert(position, point);
        }
        let duration = self
            .sequence_duration()
            .max(offset + other.sequence_duration());
        *self = Sequence::new(sound_points, duration)?;
        Ok(())
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = &'a SoundPoint;
    type IntoIter = std::slice::Iter<'a, SoundPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn end_time(sound_points: &[SoundPoint]) -> Time {
    sound_points
        .iter()
        .map(SoundPoint::end)
        .max()
        .unwrap_or_else(Time::zero)
}

fn validate(sound_points: &[SoundPoint], sequence_duration: Time) -> Result<(), SequenceError> {
    let mut previous: Option<Time> = None;
    for (index, point) in sound_points.iter().enumerate() {
        let instance = point.instance();
        if instance.is_negative() {
            return Err(SequenceError::NegativeInstance { index, instance });
        }
        if !point.duration().is_positive() {
            return Err(SequenceError::NonPositiveDuration {
                index,
                duration: point.duration(),
            });
        }
        if let Some(previous) = previous {
            if instance < previous {
                return Err(SequenceError::OutOfOrder {
                    index,
                    previous,
                    current: instance,
                });
            }
        }
        if instance > sequence_duration {
            return Err(SequenceError::Overtime {
                index,
                instance,
                sequence_duration,
            });
        }
        previous = Some(instance);
    }
    Ok(())
}
