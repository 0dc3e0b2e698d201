//! Duration strings used for frequencies and offsets.
//!
//! Coupled-run configuration expresses every cadence as a compact duration
//! string: an integer amount followed by a unit suffix.
//!
//! - `3ts`: three model timesteps
//! - `3600s`: one hour expressed in seconds
//! - `1d`, `2mo`, `100000y`: calendar units
//!
//! # Grammar
//!
//! ```text
//! duration = '-'? [0-9]+ unit
//! unit     = 'ts' | 's' | 'mi' | 'h' | 'd' | 'mo' | 'y'
//! ```
//!
//! Only the timestep unit supports automatic offset derivation, see
//! [`Duration::offset_by_timesteps`].

use crate::errors::{CplError, CplResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unit suffix of a [`Duration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DurationUnit {
    Timestep,
    Second,
    Minute,
    Hour,
    Day,
    Month,
    Year,
}

impl DurationUnit {
    /// The suffix used in duration strings.
    pub fn suffix(&self) -> &'static str {
        match self {
            DurationUnit::Timestep => "ts",
            DurationUnit::Second => "s",
            DurationUnit::Minute => "mi",
            DurationUnit::Hour => "h",
            DurationUnit::Day => "d",
            DurationUnit::Month => "mo",
            DurationUnit::Year => "y",
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "ts" => Some(DurationUnit::Timestep),
            "s" => Some(DurationUnit::Second),
            "mi" => Some(DurationUnit::Minute),
            "h" => Some(DurationUnit::Hour),
            "d" => Some(DurationUnit::Day),
            "mo" => Some(DurationUnit::Month),
            "y" => Some(DurationUnit::Year),
            _ => None,
        }
    }
}

impl fmt::Display for DurationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

/// An integer amount of a single unit, e.g. `3ts` or `1d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Duration {
    amount: i64,
    unit: DurationUnit,
}

impl Duration {
    pub fn new(amount: i64, unit: DurationUnit) -> Self {
        Self { amount, unit }
    }

    /// A duration counted in model timesteps.
    pub fn timesteps(amount: i64) -> Self {
        Self::new(amount, DurationUnit::Timestep)
    }

    /// Parses a duration string.
    ///
    /// Surrounding whitespace is ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use cplgen_core::duration::{Duration, DurationUnit};
    ///
    /// let d = Duration::parse("3ts").unwrap();
    /// assert_eq!(d, Duration::new(3, DurationUnit::Timestep));
    /// assert_eq!(d.to_string(), "3ts");
    /// ```
    pub fn parse(input: &str) -> CplResult<Self> {
        let trimmed = input.trim();
        let invalid = |details: &str| CplError::InvalidDuration {
            value: input.to_string(),
            details: details.to_string(),
        };

        if trimmed.is_empty() {
            return Err(invalid("empty duration string"));
        }

        let digits_start = usize::from(trimmed.starts_with('-'));
        let digits_end = trimmed[digits_start..]
            .find(|c: char| !c.is_ascii_digit())
            .map(|i| i + digits_start)
            .unwrap_or(trimmed.len());

        if digits_end == digits_start {
            return Err(invalid("missing integer amount"));
        }

        let amount = trimmed[..digits_end]
            .parse::<i64>()
            .map_err(|e| invalid(&e.to_string()))?;

        let suffix = &trimmed[digits_end..];
        if suffix.is_empty() {
            return Err(invalid("missing unit suffix"));
        }
        let unit = DurationUnit::from_suffix(suffix)
            .ok_or_else(|| invalid(&format!("unknown unit suffix '{suffix}'")))?;

        Ok(Self { amount, unit })
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn unit(&self) -> DurationUnit {
        self.unit
    }

    pub fn is_timesteps(&self) -> bool {
        self.unit == DurationUnit::Timestep
    }

    /// Returns this duration shifted by `offset` timesteps.
    ///
    /// Only defined for durations counted in timesteps; any calendar unit
    /// fails with [`CplError::UnsupportedOffsetUnit`] and must be supplied
    /// explicitly by the caller instead.
    pub fn offset_by_timesteps(&self, offset: i64) -> CplResult<Self> {
        if !self.is_timesteps() {
            return Err(CplError::UnsupportedOffsetUnit {
                value: self.to_string(),
            });
        }
        let amount = self
            .amount
            .checked_add(offset)
            .ok_or_else(|| CplError::InvalidDuration {
                value: self.to_string(),
                details: format!("offset by {offset} timesteps overflows"),
            })?;
        Ok(Self::timesteps(amount))
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.unit)
    }
}

impl FromStr for Duration {
    type Err = CplError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Duration {
    type Error = CplError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Duration> for String {
    fn from(value: Duration) -> Self {
        value.to_string()
    }
}
