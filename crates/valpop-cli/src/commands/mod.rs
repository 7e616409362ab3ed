pub mod collect;
pub mod pop;
pub mod populate;

use crate::settings::Settings;
use clap::Args;
use valpop_store::StorageAdapter;

/// Retention flags shared by `populate` and `collect`
#[derive(Debug, Args)]
pub struct RetentionArgs {
    /// Newest generations always kept
    #[arg(long, env = "VALPOP_MIN_KEEP", allow_negative_numbers = true)]
    pub min_keep: Option<i64>,

    /// Seconds a generation is kept past the newest `min-keep`
    #[arg(
        long,
        short = 't',
        visible_alias = "timeout",
        env = "VALPOP_MAX_AGE",
        allow_negative_numbers = true
    )]
    pub max_age: Option<i64>,

    /// Path never deleted by reachability collection (repeatable)
    #[arg(long = "protect", value_name = "PATH")]
    pub protect: Vec<String>,

    /// Abandon unfinished publishes older than this many seconds
    #[arg(long, env = "VALPOP_STALE_LOCK_AFTER", allow_negative_numbers = true)]
    pub stale_lock_after: Option<i64>,
}

impl RetentionArgs {
    pub fn apply(&self, settings: &mut Settings) {
        settings.apply_overrides(&crate::settings::SettingsOverrides {
            min_keep: self.min_keep,
            max_age_seconds: self.max_age,
            protected: self.protect.clone(),
            stale_lock_after_seconds: self.stale_lock_after,
            ..Default::default()
        });
    }
}

/// Open the configured backend, creating its parent directory first
pub fn open_backend(settings: &Settings) -> Result<Box<dyn StorageAdapter>, Box<dyn std::error::Error>> {
    let address = settings.address();
    if let Some(parent) = address.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(valpop_store::open(settings.backend, &address)?)
}
