//! valpop CLI
//!
//! Publishes static asset trees into a backend as generations, prunes old
//! generations, and copies the current set out for serving.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use valpop_store::BackendKind;

mod commands;
mod settings;

use settings::{Settings, SettingsOverrides};

#[derive(Debug, Parser)]
#[command(name = "valpop")]
#[command(about = "valpop - Versioned static asset publishing", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// TOML settings file
    #[arg(long, global = true, env = "VALPOP_CONFIG")]
    config: Option<PathBuf>,

    /// Backend variant: kv or object
    #[arg(long, global = true, env = "VALPOP_BACKEND")]
    backend: Option<BackendKind>,

    /// SQLite file (kv) or root directory (object)
    #[arg(long, global = true, env = "VALPOP_ADDRESS")]
    address: Option<PathBuf>,

    /// Logging profile: development or production
    #[arg(long, global = true, env = "VALPOP_LOG_PROFILE")]
    log_profile: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Publish a directory as a new generation, then collect
    Populate(commands::populate::PopulateArgs),
    /// Copy the current files out for serving
    Pop(commands::pop::PopArgs),
    /// Delete generations the retention policy no longer needs
    Collect(commands::collect::CollectArgs),
}

fn load_settings(global: &GlobalArgs) -> Result<Settings, Box<dyn std::error::Error>> {
    let mut settings = Settings::load(global.config.as_deref())?;
    settings.apply_overrides(&SettingsOverrides {
        backend: global.backend,
        address: global.address.clone(),
        log_profile: global.log_profile.clone(),
        ..SettingsOverrides::default()
    });
    Ok(settings)
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let settings = load_settings(&cli.global)?;
    valpop_core::logging_facility::init(settings.profile()?);

    match cli.command {
        Commands::Populate(args) => commands::populate::execute(args, settings),
        Commands::Pop(args) => commands::pop::execute(args, settings),
        Commands::Collect(args) => commands::collect::execute(args, settings),
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
