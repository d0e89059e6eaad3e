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

//! Floats that cannot be NaN by construction, and hence are `Ord`, `Eq` and `Hash`.
//!
//! Pitch numbers are floats (quarter tones are halves), but servers route by
//! comparing pitches, which needs a total order.

use std::hash::{Hash, Hasher};
use std::{fmt, num::ParseFloatError, str::FromStr};

/// A non-nan f64. Negative zero is stored as positive zero so that equal
/// values hash equally.
#[derive(Debug, Clone, Copy)]
pub struct F64N(f64);

impl F64N {
    pub fn new(value: f64) -> Option<F64N> {
        if value.is_nan() {
            None
        } else if value == 0.0 {
            Some(Self(0.0))
        } else {
            Some(Self(value))
        }
    }

    pub fn into_inner(self) -> f64 {
        self.0
    }
}

impl PartialEq for F64N {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for F64N {}

impl PartialOrd for F64N {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for F64N {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0
            .partial_cmp(&other.0)
            .expect("bug: non-nan is nan")
    }
}

impl Hash for F64N {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state)
    }
}

impl From<i32> for F64N {
    fn from(value: i32) -> F64N {
        F64N(f64::from(value))
    }
}

impl fmt::Display for F64N {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for F64N {
    type Err = ParseNonNanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.parse::<f64>()?).ok_or(ParseNonNanError::Nan)
    }
}

///////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, PartialEq)]
pub enum ParseNonNanError {
    Nan,
    Other(ParseFloatError),
}

impl std::error::Error for ParseNonNanError {}

impl fmt::Display for ParseNonNanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseNonNanError::Nan => write!(f, "float was nan"),
            ParseNonNanError::Other(error) => error.fmt(f),
        }
    }
}

impl From<ParseFloatError> for ParseNonNanError {
    fn from(err: ParseFloatError) -> Self {
        ParseNonNanError::Other(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn nan_is_rejected() {
        assert!(F64N::new(f64::NAN).is_none());
        assert_eq!("NaN".parse::<F64N>(), Err(ParseNonNanError::Nan));
        assert!(matches!(
            "x".parse::<F64N>(),
            Err(ParseNonNanError::Other(_))
        ));
    }

    #[test]
    fn zeros_are_one_value() {
        let mut set = HashSet::new();
        set.insert(F64N::new(0.0).unwrap());
        set.insert(F64N::new(-0.0).unwrap());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn ordering() {
        let mut values: Vec<F64N> = vec![
            F64N::new(1.5).unwrap(),
            F64N::from(-2),
            F64N::new(f64::INFINITY).unwrap(),
        ];
        values.sort();
        assert_eq!(
            values.iter().map(|v| v.into_inner()).collect::<Vec<_>>(),
            vec![-2.0, 1.5, f64::INFINITY]
        );
    }
}
