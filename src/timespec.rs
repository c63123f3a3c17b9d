//! Time quantities with explicit units.
//!
//! Link latencies and run-level options are expressed as a value plus a
//! unit (`"5000ps"`, `"50us"`). The external simulation core interprets
//! these strings; this module parses both the compact and the spaced
//! spelling (`"1 ps"`), prints the compact form, and normalizes to
//! picoseconds for comparisons.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors from parsing a time quantity string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("empty time string")]
    Empty,

    #[error("missing numeric value in {0:?}")]
    MissingValue(String),

    #[error("unknown time unit {0:?}")]
    UnknownUnit(String),
}

/// A unit of simulated time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeUnit {
    Ps,
    Ns,
    Us,
    Ms,
    S,
}

impl TimeUnit {
    /// Picoseconds per unit.
    pub fn picos(&self) -> u64 {
        match self {
            TimeUnit::Ps => 1,
            TimeUnit::Ns => 1_000,
            TimeUnit::Us => 1_000_000,
            TimeUnit::Ms => 1_000_000_000,
            TimeUnit::S => 1_000_000_000_000,
        }
    }

    /// Suffix as it appears in generated scripts.
    pub fn suffix(&self) -> &'static str {
        match self {
            TimeUnit::Ps => "ps",
            TimeUnit::Ns => "ns",
            TimeUnit::Us => "us",
            TimeUnit::Ms => "ms",
            TimeUnit::S => "s",
        }
    }
}

impl FromStr for TimeUnit {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ps" => Ok(TimeUnit::Ps),
            "ns" => Ok(TimeUnit::Ns),
            "us" => Ok(TimeUnit::Us),
            "ms" => Ok(TimeUnit::Ms),
            "s" => Ok(TimeUnit::S),
            other => Err(TimeParseError::UnknownUnit(other.to_string())),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// A time quantity with a unit, e.g. a link latency of `5000ps`.
///
/// Serialized as its string form so configuration files can write
/// `latency: 5000ps` directly.
///
/// # Example
///
/// ```
/// use vaultbench::timespec::{TimeSpec, TimeUnit};
///
/// let lat: TimeSpec = "5000ps".parse().unwrap();
/// assert_eq!(lat, TimeSpec::new(5000, TimeUnit::Ps));
/// assert_eq!(lat.to_string(), "5000ps");
///
/// // The spelling with a space is accepted too ("1 ps").
/// let tb: TimeSpec = "1 ps".parse().unwrap();
/// assert_eq!(tb.picos(), 1);
/// ```
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct TimeSpec {
    pub value: u64,
    pub unit: TimeUnit,
}

impl TimeSpec {
    /// Creates a new time quantity.
    pub fn new(value: u64, unit: TimeUnit) -> Self {
        Self { value, unit }
    }

    /// Convenience constructor for picoseconds.
    pub fn ps(value: u64) -> Self {
        Self::new(value, TimeUnit::Ps)
    }

    /// Convenience constructor for nanoseconds.
    pub fn ns(value: u64) -> Self {
        Self::new(value, TimeUnit::Ns)
    }

    /// Convenience constructor for microseconds.
    pub fn us(value: u64) -> Self {
        Self::new(value, TimeUnit::Us)
    }

    /// Total picoseconds represented by this quantity. Saturates at
    /// `u64::MAX` rather than overflowing.
    pub fn picos(&self) -> u64 {
        self.value.saturating_mul(self.unit.picos())
    }
}

impl PartialEq for TimeSpec {
    fn eq(&self, other: &Self) -> bool {
        self.picos() == other.picos()
    }
}

impl Eq for TimeSpec {}

impl PartialOrd for TimeSpec {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimeSpec {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.picos().cmp(&other.picos())
    }
}

impl fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit)
    }
}

impl FromStr for TimeSpec {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TimeParseError::Empty);
        }

        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| TimeParseError::UnknownUnit(String::new()))?;
        let (digits, rest) = s.split_at(split);

        let value: u64 = digits
            .parse()
            .map_err(|_| TimeParseError::MissingValue(s.to_string()))?;
        let unit: TimeUnit = rest.trim().parse()?;

        Ok(Self { value, unit })
    }
}

impl From<TimeSpec> for String {
    fn from(t: TimeSpec) -> Self {
        t.to_string()
    }
}

impl TryFrom<String> for TimeSpec {
    type Error = TimeParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
