#![deny(missing_docs)]

//! # Build Command
//!
//! Assembles the OpenAPI document from the docs directory and writes the
//! JSON and YAML outputs.

use std::path::PathBuf;
use swagger_docs_core::assembler::{run, AssemblerConfig};
use swagger_docs_core::output::render_yaml;
use swagger_docs_core::{AppResult, DEFAULT_FRAGMENT_SUFFIX, DEFAULT_PATH_PREFIX};

/// Arguments for the build command.
#[derive(clap::Args, Debug, Clone)]
pub struct BuildArgs {
    /// Directory containing the base document and `*.spec.yaml` fragments.
    #[clap(long, env = "SWAGGER_DOCS_DIR", default_value = "docs/swagger_v2")]
    pub docs_dir: PathBuf,

    /// Base document file name, relative to the docs directory.
    #[clap(long, default_value = "base.yaml")]
    pub base_file: String,

    /// File-name suffix that marks a fragment.
    #[clap(long, default_value = DEFAULT_FRAGMENT_SUFFIX)]
    pub fragment_suffix: String,

    /// Text file holding the version stamped into `info.version`.
    #[clap(long, env = "VERSION_FILE", default_value = "AEMDW_VERSION")]
    pub version_file: PathBuf,

    /// Document whose `components.schemas` backfill dangling references.
    /// Ignored when the file does not exist.
    #[clap(
        long,
        env = "SWAGGER_FALLBACK",
        default_value = "docs/swagger_v2/swagger_v2_fallback.yaml"
    )]
    pub fallback: PathBuf,

    /// Value written to `servers[0].url`.
    #[clap(long, env = "PATH_PREFIX", default_value = DEFAULT_PATH_PREFIX)]
    pub path_prefix: String,

    /// JSON output path.
    #[clap(long, default_value = "priv/static/swagger/swagger_v3.json")]
    pub json_out: PathBuf,

    /// YAML output path.
    #[clap(long, default_value = "priv/static/swagger/swagger_v3.yaml")]
    pub yaml_out: PathBuf,

    /// Keep schemas in merge order instead of sorting them by name.
    #[clap(long)]
    pub keep_schema_order: bool,

    /// Also print the final YAML document to stdout.
    #[clap(long)]
    pub stdout: bool,
}

impl From<&BuildArgs> for AssemblerConfig {
    fn from(args: &BuildArgs) -> Self {
        AssemblerConfig {
            docs_dir: args.docs_dir.clone(),
            base_file: args.base_file.clone(),
            fragment_suffix: args.fragment_suffix.clone(),
            version_file: args.version_file.clone(),
            fallback: Some(args.fallback.clone()),
            path_prefix: args.path_prefix.clone(),
            json_out: args.json_out.clone(),
            yaml_out: args.yaml_out.clone(),
            sort_schemas: !args.keep_schema_order,
        }
    }
}

/// Executes the build.
///
/// # Arguments
///
/// * `args` - Command arguments.
pub fn execute(args: &BuildArgs) -> AppResult<()> {
    let config = AssemblerConfig::from(args);
    let assembled = run(&config)?;

    println!(
        "Merged {} fragment(s) from {:?}",
        assembled.fragment_count, config.docs_dir
    );
    println!("Added {} schemas from fallback source", assembled.added_schemas);
    println!("Wrote {:?} and {:?}", config.json_out, config.yaml_out);

    if args.stdout {
        print!("{}", render_yaml(&assembled.document)?);
    }

    Ok(())
}
