//! Populate command: publish a directory, then collect

use super::{open_backend, RetentionArgs};
use crate::settings::Settings;
use clap::Args;
use std::path::PathBuf;
use valpop_core::{Namespace, SystemClock};
use valpop_engine::populate;
use valpop_store::DirWalker;

#[derive(Debug, Args)]
pub struct PopulateArgs {
    /// Namespace to publish into
    #[arg(long, short = 'r', visible_alias = "prefix", env = "VALPOP_NAMESPACE")]
    pub namespace: String,

    /// Directory to publish
    #[arg(long, short = 's', env = "VALPOP_SOURCE")]
    pub source: PathBuf,

    #[command(flatten)]
    pub retention: RetentionArgs,
}

pub fn execute(args: PopulateArgs, mut settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    args.retention.apply(&mut settings);
    settings.validate()?;
    let policy = settings.retention_policy()?;
    let namespace = Namespace::new(args.namespace)?;

    if !args.source.is_dir() {
        return Err(format!("source is not a directory: {}", args.source.display()).into());
    }

    let adapter = open_backend(&settings)?;
    let report = populate(
        &adapter,
        &namespace,
        &DirWalker::new(&args.source),
        &policy,
        &SystemClock,
        settings.gc_options(false),
    )?;

    println!(
        "Published {} generation {} ({} files)",
        namespace,
        report.publish.generation,
        report.publish.paths.len()
    );
    println!(
        "Collected {}: {} items, {} generations deleted",
        namespace, report.gc.items_deleted, report.gc.generations_deleted
    );
    for generation in &report.gc.abandoned {
        println!("Abandoned unfinished generation {}", generation);
    }

    Ok(())
}
