//! Collect command: apply retention to one namespace

use super::{open_backend, RetentionArgs};
use crate::settings::Settings;
use clap::Args;
use valpop_core::{Namespace, SystemClock};
use valpop_engine::collect;

#[derive(Debug, Args)]
pub struct CollectArgs {
    /// Namespace to collect
    #[arg(long, short = 'r', visible_alias = "prefix", env = "VALPOP_NAMESPACE")]
    pub namespace: String,

    /// Report what would be deleted without deleting it
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub retention: RetentionArgs,
}

pub fn execute(args: CollectArgs, mut settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    args.retention.apply(&mut settings);
    settings.validate()?;
    let policy = settings.retention_policy()?;
    let namespace = Namespace::new(args.namespace)?;

    let adapter = open_backend(&settings)?;
    let report = collect(
        &adapter,
        &namespace,
        &policy,
        &SystemClock,
        settings.gc_options(args.dry_run),
    )?;

    if report.dry_run {
        for item in &report.plan.items {
            println!("would delete item {}", item);
        }
        for generation in &report.plan.generations {
            println!("would delete generation {}", generation);
        }
        println!(
            "Dry run for {}: {} items, {} generations",
            namespace,
            report.plan.items.len(),
            report.plan.generations.len()
        );
    } else {
        for generation in &report.abandoned {
            println!("Abandoned unfinished generation {}", generation);
        }
        println!(
            "Collected {}: {} items, {} generations deleted",
            namespace, report.items_deleted, report.generations_deleted
        );
    }

    Ok(())
}
