//! Thin CLI binary: parses arguments, loads a schema document and a JSON
//! tree fixture, runs the validator, and prints the result.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::Level;

use treeschema_config::{CommandLineArgs, ConfigFile, OutputFormat, ResolvedConfig};
use treeschema_model::MemoryTree;
use treeschema_schema::Schema;

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<ExitCode> {
    let args = CommandLineArgs::parse();
    init_tracing(args.verbose);

    let config_file = args
        .config_file
        .as_ref()
        .map(ConfigFile::load)
        .transpose()
        .context("loading treeschema.toml")?;
    let resolved = ResolvedConfig::resolve(&args, config_file.as_ref());

    let schema_text = std::fs::read_to_string(&args.schema)
        .with_context(|| format!("reading schema document {}", args.schema.display()))?;
    let schema_value: serde_json::Value = serde_json::from_str(&schema_text)
        .with_context(|| format!("parsing schema document {}", args.schema.display()))?;
    if resolved.warn_unknown_keys {
        for key in treeschema_schema::unknown_top_level_keys(&schema_value) {
            tracing::warn!(%key, "unrecognized top-level schema key");
        }
    }
    let schema = Schema::load(&schema_value)
        .with_context(|| format!("loading schema document {}", args.schema.display()))?;

    let tree_text = std::fs::read_to_string(&args.tree)
        .with_context(|| format!("reading tree fixture {}", args.tree.display()))?;
    let tree = MemoryTree::from_json(&tree_text)
        .with_context(|| format!("parsing tree fixture {}", args.tree.display()))?;

    let errors = treeschema_engine::validate(&tree, &schema).context("running validation")?;

    match resolved.format {
        OutputFormat::Text => {
            for error in &errors {
                if resolved.color {
                    println!("\x1b[31m{error}\x1b[0m");
                } else {
                    println!("{error}");
                }
            }
        }
        OutputFormat::Json => {
            let rendered: Vec<_> = errors
                .iter()
                .map(|e| serde_json::json!({ "path": e.path.to_string(), "message": e.kind.to_string() }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&rendered)?);
        }
    }

    if errors.is_empty() {
        Ok(ExitCode::from(0))
    } else {
        Ok(ExitCode::from(1))
    }
}
