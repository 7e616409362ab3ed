//! Pop command: copy one version of every file out for serving

use super::open_backend;
use crate::settings::Settings;
use clap::Args;
use std::path::PathBuf;
use valpop_core::{Namespace, SelectionRule};
use valpop_engine::{export_all, select_and_export};
use valpop_store::DirSink;

#[derive(Debug, Args)]
pub struct PopArgs {
    /// Destination directory
    #[arg(long, short = 'd', env = "VALPOP_DEST")]
    pub dest: PathBuf,

    /// Export only this namespace (default: every namespace)
    #[arg(long, short = 'r', visible_alias = "prefix")]
    pub namespace: Option<String>,

    /// Export the oldest visible version of each file instead of the newest
    #[arg(long)]
    pub oldest: bool,
}

pub fn execute(args: PopArgs, settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    settings.validate()?;
    let rule = if args.oldest {
        SelectionRule::Oldest
    } else {
        SelectionRule::Newest
    };

    let adapter = open_backend(&settings)?;
    let sink = DirSink::new(&args.dest);

    let reports = match args.namespace {
        Some(namespace) => vec![select_and_export(
            &adapter,
            &Namespace::new(namespace)?,
            &sink,
            rule,
        )?],
        None => export_all(&adapter, &sink, rule)?,
    };

    for report in &reports {
        println!(
            "Exported {} ({} files) to {}",
            report.namespace,
            report.files.len(),
            args.dest.display()
        );
    }

    Ok(())
}
