// Copyright (c) The xcresult-sonar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt;

/// A unit-bearing, signed time value.
///
/// Test result bundles report durations as a floating-point value together with a unit. Unlike
/// [`std::time::Duration`], this type can carry zero and negative values exactly as they were
/// reported.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestDuration {
    /// The magnitude of the duration, in `unit`s.
    pub value: f64,

    /// The unit `value` is expressed in.
    pub unit: DurationUnit,
}

impl TestDuration {
    /// Creates a new duration.
    pub const fn new(value: f64, unit: DurationUnit) -> Self {
        Self { value, unit }
    }

    /// A zero-length duration, expressed in seconds.
    pub const fn zero() -> Self {
        Self::seconds(0.0)
    }

    /// Creates a duration expressed in seconds.
    pub const fn seconds(value: f64) -> Self {
        Self::new(value, DurationUnit::Seconds)
    }

    /// Creates a duration expressed in milliseconds.
    pub const fn milliseconds(value: f64) -> Self {
        Self::new(value, DurationUnit::Milliseconds)
    }

    /// Returns this duration converted to (fractional) milliseconds.
    pub fn as_millis_f64(&self) -> f64 {
        self.value * self.unit.millis_per_unit()
    }
}

impl Default for TestDuration {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for TestDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

/// The unit of a [`TestDuration`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DurationUnit {
    /// Nanoseconds.
    Nanoseconds,
    /// Microseconds.
    Microseconds,
    /// Milliseconds.
    Milliseconds,
    /// Seconds.
    Seconds,
    /// Minutes.
    Minutes,
    /// Hours.
    Hours,
}

impl DurationUnit {
    fn millis_per_unit(self) -> f64 {
        match self {
            DurationUnit::Nanoseconds => 1e-6,
            DurationUnit::Microseconds => 1e-3,
            DurationUnit::Milliseconds => 1.0,
            DurationUnit::Seconds => 1_000.0,
            DurationUnit::Minutes => 60_000.0,
            DurationUnit::Hours => 3_600_000.0,
        }
    }

    /// Returns the short symbol for this unit.
    pub fn symbol(self) -> &'static str {
        match self {
            DurationUnit::Nanoseconds => "ns",
            DurationUnit::Microseconds => "µs",
            DurationUnit::Milliseconds => "ms",
            DurationUnit::Seconds => "s",
            DurationUnit::Minutes => "min",
            DurationUnit::Hours => "h",
        }
    }
}

impl fmt::Display for DurationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
