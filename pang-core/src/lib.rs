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

//! Core data model of pang: exact time, pitches, sound points and sequences.

pub mod attachment;
pub mod generator;
pub mod nonnan;
pub mod pitch;
pub mod rational;
pub mod sequence;
pub mod soundpoint;

pub use attachment::Attachment;
pub use generator::{ManualSoundPointsGenerator, SoundPointsGenerator};
pub use pitch::Pitch;
pub use rational::Rational;
pub use sequence::{Sequence, SequenceError};
pub use soundpoint::{SoundPoint, Time};
