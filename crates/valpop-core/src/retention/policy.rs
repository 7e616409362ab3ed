//! Retention policy configuration.

use crate::errors::{Result, ValpopError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Paths exempt from reachability deletion unless configured otherwise.
///
/// `fedmods.json` is the federated-module registry frontends fetch by a
/// fixed name.
pub const DEFAULT_PROTECTED_PATHS: &[&str] = &["fedmods.json"];

/// Which retention shape a backend requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetentionShape {
    /// Per-path age/count (items stored per generation)
    PerPath,
    /// Per-generation reachability (items shared across generations)
    Reachability,
}

/// Retention policy applied to one namespace.
///
/// # Example
///
/// ```rust
/// use valpop_core::retention::RetentionPolicy;
///
/// let policy = RetentionPolicy::try_new(2, 30).unwrap();
/// assert_eq!(policy.min_keep(), 2);
/// assert!(policy.is_protected("fedmods.json"));
///
/// assert!(RetentionPolicy::try_new(-1, 30).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Newest generations always kept, regardless of age.
    min_keep: usize,

    /// Generations at most this old (in seconds) are kept.
    max_age_seconds: i64,

    /// Paths never deleted by the reachability shape.
    protected: BTreeSet<String>,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            min_keep: 1,
            max_age_seconds: 10,
            protected: default_protected(),
        }
    }
}

fn default_protected() -> BTreeSet<String> {
    DEFAULT_PROTECTED_PATHS
        .iter()
        .map(|p| (*p).to_string())
        .collect()
}

impl RetentionPolicy {
    /// Build a policy from operator-supplied values.
    ///
    /// Values arrive signed (flags, env, config files); negatives are
    /// rejected with `PolicyViolation` so nothing reaches a backend.
    pub fn try_new(min_keep: i64, max_age_seconds: i64) -> Result<Self> {
        if min_keep < 0 {
            return Err(ValpopError::InvalidRetention {
                field: "min_keep".to_string(),
                value: min_keep,
                reason: "must be non-negative".to_string(),
            }
            .into());
        }
        if max_age_seconds < 0 {
            return Err(ValpopError::InvalidRetention {
                field: "max_age_seconds".to_string(),
                value: max_age_seconds,
                reason: "must be non-negative".to_string(),
            }
            .into());
        }

        let min_keep = usize::try_from(min_keep).map_err(|_| ValpopError::InvalidRetention {
            field: "min_keep".to_string(),
            value: min_keep,
            reason: "out of range".to_string(),
        })?;

        Ok(Self {
            min_keep,
            max_age_seconds,
            protected: default_protected(),
        })
    }

    /// Replace the protected path set.
    #[must_use]
    pub fn with_protected<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.protected = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn min_keep(&self) -> usize {
        self.min_keep
    }

    pub fn max_age_seconds(&self) -> i64 {
        self.max_age_seconds
    }

    pub fn protected(&self) -> &BTreeSet<String> {
        &self.protected
    }

    pub fn is_protected(&self, path: &str) -> bool {
        self.protected.contains(path)
    }

    /// Whether a generation is young enough to keep at `now`.
    pub fn within_max_age(&self, generation: crate::model::GenerationId, now: i64) -> bool {
        generation.age_at(now) <= self.max_age_seconds
    }
}
