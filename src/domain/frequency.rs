//! Frequency domain types
//!
//! Provides the step table of legal hardware frequencies and the logic that
//! maps a caller's request onto one of those steps.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Native unit of a clock domain
///
/// cpufreq reports kHz, devfreq reports Hz. Values are never converted
/// between the two; the unit only matters for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrequencyUnit {
    /// Kilohertz (CPU cores)
    KHz,
    /// Hertz (GPU)
    Hz,
}

impl FrequencyUnit {
    /// Convert a value in this unit to megahertz
    pub fn to_mhz(self, value: u64) -> f64 {
        match self {
            FrequencyUnit::KHz => value as f64 / 1_000.0,
            FrequencyUnit::Hz => value as f64 / 1_000_000.0,
        }
    }

    /// Unit suffix used in log lines and tables
    pub const fn suffix(self) -> &'static str {
        match self {
            FrequencyUnit::KHz => "kHz",
            FrequencyUnit::Hz => "Hz",
        }
    }
}

impl fmt::Display for FrequencyUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Ordered table of legal frequency steps
///
/// Invariant: strictly ascending, no duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u64>", into = "Vec<u64>")]
pub struct FrequencyTable(Vec<u64>);

impl FrequencyTable {
    /// Build a table from whatever the hardware reported
    ///
    /// Steps are sorted and de-duplicated.
    pub fn new(mut steps: Vec<u64>) -> Self {
        steps.sort_unstable();
        steps.dedup();
        Self(steps)
    }

    /// Build a table, rejecting input that is not already strictly ascending
    ///
    /// # Errors
    /// Returns `DomainError::UnsortedFrequencyTable` on out-of-order or repeated steps
    pub fn strict(steps: Vec<u64>) -> Result<Self, DomainError> {
        if steps.windows(2).any(|w| w[0] >= w[1]) {
            return Err(DomainError::UnsortedFrequencyTable);
        }
        Ok(Self(steps))
    }

    /// All steps in ascending order
    pub fn steps(&self) -> &[u64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn min(&self) -> Option<u64> {
        self.0.first().copied()
    }

    pub fn max(&self) -> Option<u64> {
        self.0.last().copied()
    }

    pub fn contains(&self, value: u64) -> bool {
        self.0.binary_search(&value).is_ok()
    }

    /// Step closest to `target`
    ///
    /// On equal distance the lower step wins, since the scan runs in
    /// ascending order and keeps the first minimum.
    pub fn nearest(&self, target: i64) -> Option<u64> {
        self.0
            .iter()
            .copied()
            .min_by_key(|&step| (step as i128 - target as i128).unsigned_abs())
    }

    /// Map a raw request onto a step of this table
    ///
    /// - `0 < requested < 1`: proportional index, `floor(requested * (len - 1))`.
    ///   This indexes the step list, it does not interpolate in frequency space.
    /// - anything else: absolute value in the domain's native unit, truncated
    ///   toward zero and snapped to the nearest step.
    ///
    /// An absolute request against an empty table is passed through as-is.
    ///
    /// # Errors
    /// - `DomainError::InvalidFrequency` for non-finite input, or a negative
    ///   absolute request with nothing to snap to
    /// - `DomainError::EmptyFrequencyTable` for a proportional request on an empty table
    pub fn resolve(&self, requested: f64) -> Result<u64, DomainError> {
        if !requested.is_finite() {
            return Err(DomainError::InvalidFrequency(requested.to_string()));
        }

        if requested > 0.0 && requested < 1.0 {
            if self.0.is_empty() {
                return Err(DomainError::EmptyFrequencyTable);
            }
            let idx = (requested * (self.0.len() - 1) as f64).floor() as usize;
            return Ok(self.0[idx]);
        }

        let target = requested.trunc() as i64;
        if let Some(step) = self.nearest(target) {
            return Ok(step);
        }

        u64::try_from(target).map_err(|_| DomainError::InvalidFrequency(requested.to_string()))
    }
}

impl TryFrom<Vec<u64>> for FrequencyTable {
    type Error = DomainError;

    fn try_from(steps: Vec<u64>) -> Result<Self, Self::Error> {
        Self::strict(steps)
    }
}

impl From<FrequencyTable> for Vec<u64> {
    fn from(table: FrequencyTable) -> Self {
        table.0
    }
}
