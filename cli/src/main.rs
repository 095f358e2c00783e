#![deny(missing_docs)]

//! # Swagger Docs CLI
//!
//! Build-time tool that assembles the versioned OpenAPI document.
//!
//! Supported Commands:
//! - `build`: base + fragments + fallback -> JSON and YAML outputs.

use clap::{Parser, Subcommand};
use swagger_docs_core::AppResult;
use tracing_subscriber::EnvFilter;

mod build;

#[derive(Parser, Debug)]
#[clap(author, version, about = "OpenAPI document assembler")]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Merge fragments into the base document and write JSON and YAML outputs.
    Build(build::BuildArgs),
}

/// Diagnostics go to stderr so `--stdout` output stays clean.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> AppResult<()> {
    // `.env` is optional; PATH_PREFIX and friends usually come from the build environment.
    dotenvy::dotenv().ok();
    init_logging();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Build(args) => build::execute(args),
    };

    if let Err(err) = &result {
        tracing::error!("{}", err);
    }
    result
}
