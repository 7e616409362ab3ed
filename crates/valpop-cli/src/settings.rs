//! Operator settings
//!
//! Resolution order, last wins: built-in defaults, the TOML file named by
//! `--config`, then flags (each flag also reads its `VALPOP_*` variable).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use valpop_core::errors::{ExError, ExErrorKind};
use valpop_core::logging_facility::Profile;
use valpop_core::retention::DEFAULT_PROTECTED_PATHS;
use valpop_core::{Result, RetentionPolicy};
use valpop_engine::GcOptions;
use valpop_store::BackendKind;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub backend: BackendKind,
    /// SQLite file (kv) or root directory (object). Defaults per backend.
    pub address: Option<PathBuf>,
    pub log_profile: String,
    pub retention: RetentionSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetentionSettings {
    pub min_keep: i64,
    pub max_age_seconds: i64,
    /// Paths never deleted by reachability collection.
    pub protected: Vec<String>,
    pub stale_lock_after_seconds: Option<i64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            address: None,
            log_profile: "development".to_string(),
            retention: RetentionSettings::default(),
        }
    }
}

impl Default for RetentionSettings {
    fn default() -> Self {
        Self {
            min_keep: 1,
            max_age_seconds: 10,
            protected: DEFAULT_PROTECTED_PATHS.iter().map(|p| p.to_string()).collect(),
            stale_lock_after_seconds: None,
        }
    }
}

/// Values supplied on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub backend: Option<BackendKind>,
    pub address: Option<PathBuf>,
    pub log_profile: Option<String>,
    pub min_keep: Option<i64>,
    pub max_age_seconds: Option<i64>,
    /// Replaces the configured protected set when non-empty.
    pub protected: Vec<String>,
    pub stale_lock_after_seconds: Option<i64>,
}

fn invalid(message: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::InvalidInput)
        .with_op("load_settings")
        .with_message(message)
}

impl Settings {
    /// Defaults, or the file at `path` when given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Load settings from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ExError::new(ExErrorKind::Io)
                .with_op("load_settings")
                .with_path(path.display().to_string())
                .with_message(format!("failed to read config file: {}", e))
        })?;
        Self::from_toml(&content).map_err(|e| e.with_path(path.display().to_string()))
    }

    /// Load settings from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            ExError::new(ExErrorKind::Serialization)
                .with_op("load_settings")
                .with_message(format!("failed to parse config: {}", e))
        })
    }

    pub fn apply_overrides(&mut self, overrides: &SettingsOverrides) {
        if let Some(backend) = overrides.backend {
            self.backend = backend;
        }
        if let Some(ref address) = overrides.address {
            self.address = Some(address.clone());
        }
        if let Some(ref log_profile) = overrides.log_profile {
            self.log_profile = log_profile.clone();
        }
        if let Some(min_keep) = overrides.min_keep {
            self.retention.min_keep = min_keep;
        }
        if let Some(max_age_seconds) = overrides.max_age_seconds {
            self.retention.max_age_seconds = max_age_seconds;
        }
        if !overrides.protected.is_empty() {
            self.retention.protected = overrides.protected.clone();
        }
        if let Some(stale) = overrides.stale_lock_after_seconds {
            self.retention.stale_lock_after_seconds = Some(stale);
        }
    }

    /// Validate settings consistency.
    ///
    /// ## Errors
    ///
    /// - `PolicyViolation`: negative retention or stale-lock threshold
    /// - `InvalidInput`: unknown log profile or empty protected path
    pub fn validate(&self) -> Result<()> {
        self.retention_policy()?;
        self.profile()?;
        if let Some(stale) = self.retention.stale_lock_after_seconds {
            if stale < 0 {
                return Err(ExError::new(ExErrorKind::PolicyViolation)
                    .with_op("validate_retention")
                    .with_message(format!(
                        "stale_lock_after_seconds must be non-negative, got {}",
                        stale
                    )));
            }
        }
        if self.retention.protected.iter().any(|p| p.is_empty()) {
            return Err(invalid("protected paths must not be empty"));
        }
        Ok(())
    }

    pub fn profile(&self) -> Result<Profile> {
        self.log_profile.parse().map_err(invalid)
    }

    pub fn retention_policy(&self) -> Result<RetentionPolicy> {
        Ok(RetentionPolicy::try_new(
            self.retention.min_keep,
            self.retention.max_age_seconds,
        )?
        .with_protected(self.retention.protected.iter().cloned()))
    }

    pub fn gc_options(&self, dry_run: bool) -> GcOptions {
        GcOptions {
            dry_run,
            stale_lock_after_seconds: self.retention.stale_lock_after_seconds,
        }
    }

    /// Backend address, falling back to a per-backend default below
    /// `.valpop/`.
    pub fn address(&self) -> PathBuf {
        match (&self.address, self.backend) {
            (Some(address), _) => address.clone(),
            (None, BackendKind::Kv) => PathBuf::from(".valpop/store.db"),
            (None, BackendKind::Object) => PathBuf::from(".valpop/objects"),
        }
    }
}
