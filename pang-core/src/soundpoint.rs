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

//! The sound point, a single timed event.

use crate::attachment::Attachment;
use crate::pitch::Pitch;
use crate::rational::Rational;

/// Time in seconds.
pub type Time = Rational;

/// A discrete musical event: when it starts, how long it lasts and what it plays.
///
/// Sound points are immutable. Derived points are made with the `with_*`
/// methods, which return modified copies.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SoundPoint {
    instance: Time,
    duration: Time,
    pitch: Pitch,
    attachments: Vec<Attachment>,
}

impl SoundPoint {
    pub fn new(instance: Time, duration: Time, pitch: impl Into<Pitch>) -> Self {
        SoundPoint {
            instance,
            duration,
            pitch: pitch.into(),
            attachments: Vec::new(),
        }
    }

    /// Time at which the sound point arrives.
    pub fn instance(&self) -> Time {
        self.instance
    }

    pub fn duration(&self) -> Time {
        self.duration
    }

    /// `instance + duration`
    pub fn end(&self) -> Time {
        self.instance + self.duration
    }

    pub fn pitch(&self) -> &Pitch {
        &self.pitch
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    // ==================== Copies with overrides ====================

    pub fn with_instance(&self, instance: Time) -> Self {
        SoundPoint {
            instance,
            ..self.clone()
        }
    }

    pub fn with_duration(&self, duration: Time) -> Self {
        SoundPoint {
            duration,
            ..self.clone()
        }
    }

    pub fn with_pitch(&self, pitch: impl Into<Pitch>) -> Self {
        SoundPoint {
            pitch: pitch.into(),
            ..self.clone()
        }
    }

    pub fn with_attachments(&self, attachments: Vec<Attachment>) -> Self {
        SoundPoint {
            attachments,
            ..self.clone()
        }
    }

    /// A copy that starts `offset` later.
    pub fn shifted(&self, offset: Time) -> Self {
        self.with_instance(self.instance + offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_leave_the_original_alone() {
        let point = SoundPoint::new(Time::int(1), Time::new(1, 2), 0);
        let loud = point.with_attachments(vec![Attachment::Dynamic("f".into())]);
        let later = point.shifted(Time::int(2));

        assert!(point.attachments().is_empty());
        assert_eq!(loud.attachments(), &[Attachment::Dynamic("f".into())]);
        assert_eq!(loud.instance(), Time::int(1));
        assert_eq!(later.instance(), Time::int(3));
        assert_eq!(later.end(), Time::new(7, 2));
        assert_eq!(point.with_pitch(4).pitch(), &Pitch::from(4));
        assert_eq!(point.with_duration(Time::int(2)).end(), Time::int(3));
    }
}
