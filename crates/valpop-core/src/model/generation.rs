use crate::errors::ValpopError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Publish timestamp identifying one generation, in whole seconds.
///
/// Generations sort numerically, so "newest" is simply the largest id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationId(i64);

impl GenerationId {
    pub const fn new(seconds: i64) -> Self {
        Self(seconds)
    }

    pub const fn seconds(self) -> i64 {
        self.0
    }

    /// Age of this generation at `now`, in seconds.
    ///
    /// Negative when the generation lies in the future (clock skew between
    /// publisher and collector).
    pub const fn age_at(self, now: i64) -> i64 {
        now.saturating_sub(self.0)
    }
}

impl fmt::Display for GenerationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for GenerationId {
    type Err = ValpopError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        raw.parse::<i64>()
            .map(Self)
            .map_err(|_| ValpopError::MalformedGenerationId {
                raw: raw.to_string(),
            })
    }
}
