// pang -- algorithmic notation through queue simulation
// Copyright (C) 2026  The pang developers
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Pitch sieves: periodic selections of pitch numbers.

use pang_core::Pitch;
use snafu::Snafu;

#[derive(Debug, PartialEq, Snafu)]
pub enum SieveError {
    #[snafu(display("sieve period must be positive, got {}", period))]
    InvalidPeriod { period: i64 },
    #[snafu(display("pitch multiplier must be finite and non-zero, got {}", multiplier))]
    InvalidMultiplier { multiplier: f64 },
}

/// Selects the numbers whose remainder modulo `period` is one of `indices`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sieve {
    indices: Vec<i64>,
    period: i64,
}

impl Sieve {
    pub fn new(indices: Vec<i64>, period: i64) -> Result<Self, SieveError> {
        if period <= 0 {
            return Err(SieveError::InvalidPeriod { period });
        }
        Ok(Sieve { indices, period })
    }

    pub fn indices(&self) -> &[i64] {
        &self.indices
    }

    pub fn period(&self) -> i64 {
        self.period
    }

    /// Negative `index`es wrap around, so the sieve repeats in both
    /// directions.
    pub fn matches(&self, index: i64) -> bool {
        let index = index.rem_euclid(self.period);
        self.indices
            .iter()
            .any(|candidate| candidate.rem_euclid(self.period) == index)
    }
}

/// All pitches `p * multiplier` between `low` and `high` (exclusive) for which
/// the sieve, shifted to start at `origin`, matches `p`.
///
/// With a `multiplier` of 0.5 the sieve counts quarter tones.
pub fn gen_pitches_from_sieve(
    sieve: &Sieve,
    origin: i64,
    low: f64,
    high: f64,
    multiplier: f64,
) -> Result<Vec<Pitch>, SieveError> {
    if multiplier == 0.0 || !multiplier.is_finite() {
        return Err(SieveError::InvalidMultiplier { multiplier });
    }
    let low = (low / multiplier) as i64;
    let high = (high / multiplier) as i64;
    Ok((low..high)
        .filter(|p| sieve.matches(p - origin))
        .filter_map(|p| Pitch::note(p as f64 * multiplier))
        .collect())
}
