//! API microversions
//!
//! A microversion is a `major.minor` pair negotiated per request. Resources
//! declare the highest one they understand; the session may know the highest
//! one a deployment offers. Requests use the lower of the two.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// A `major.minor` API version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Microversion {
    pub major: u16,
    pub minor: u16,
}

impl Microversion {
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    /// Version to send given what the session negotiated and what the
    /// resource supports
    pub fn effective(negotiated: Option<Self>, ceiling: Option<Self>) -> Option<Self> {
        match (negotiated, ceiling) {
            (Some(n), Some(c)) => Some(n.min(c)),
            (Some(n), None) => Some(n),
            (None, c) => c,
        }
    }
}

impl fmt::Display for Microversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for Microversion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (major, minor) = s
            .trim()
            .split_once('.')
            .ok_or_else(|| Error::Config(format!("invalid microversion: {s}")))?;

        let parse = |part: &str| {
            part.parse::<u16>()
                .map_err(|_| Error::Config(format!("invalid microversion: {s}")))
        };

        Ok(Self::new(parse(major)?, parse(minor)?))
    }
}

impl serde::Serialize for Microversion {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Microversion {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
