//! Configuration for the CLI: command-line arguments and an optional
//! `treeschema.toml` file, in the manner of `diskplan_config`/
//! `diskplan_core::config::args`.
#![warn(missing_docs)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Deserialize;

/// Command line arguments for the `treeschema` binary.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineArgs {
    /// Path to the JSON schema document
    pub schema: PathBuf,

    /// Path to the JSON-encoded tree fixture to validate
    pub tree: PathBuf,

    /// Path to an optional treeschema.toml config file
    #[arg(short, long)]
    pub config_file: Option<PathBuf>,

    /// Output format for reported errors
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Increase logging verbosity (0: warn; 1: info; 2: debug; 3: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Output rendering for reported errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One error per line, human-readable
    Text,
    /// A JSON array of error records
    Json,
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Text
    }
}

/// Deserialization of `treeschema.toml`: output preferences and
/// validation knobs that aren't worth a command-line flag.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    /// Default output format, overridden by `--format`
    pub format: Option<OutputFormat>,
    /// Whether to colorize text output
    #[serde(default)]
    pub color: bool,
    /// Whether to warn about top-level schema document keys this crate
    /// doesn't recognize
    #[serde(default)]
    pub warn_unknown_keys: bool,
}

impl ConfigFile {
    /// Loads a config file from disk.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        text.as_str().try_into()
    }
}

impl TryFrom<&str> for ConfigFile {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Ok(toml::from_str(value)?)
    }
}

/// The fully resolved output configuration: command-line flags take
/// precedence over the config file, which takes precedence over defaults.
pub struct ResolvedConfig {
    /// Effective output format
    pub format: OutputFormat,
    /// Effective color preference
    pub color: bool,
    /// Effective unknown-key warning preference
    pub warn_unknown_keys: bool,
}

impl ResolvedConfig {
    /// Merges command-line arguments over an optional loaded config file.
    pub fn resolve(args: &CommandLineArgs, file: Option<&ConfigFile>) -> Self {
        let file = file.cloned().unwrap_or_default();
        ResolvedConfig {
            format: args.format.or(file.format).unwrap_or_default(),
            color: file.color,
            warn_unknown_keys: file.warn_unknown_keys,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_file_parses_toml() {
        let config: ConfigFile = "format = \"json\"\ncolor = true\n".try_into().unwrap();
        assert_eq!(config.format, Some(OutputFormat::Json));
        assert!(config.color);
    }

    #[test]
    fn cli_format_overrides_config_file() {
        let args = CommandLineArgs {
            schema: "s.json".into(),
            tree: "t.json".into(),
            config_file: None,
            format: Some(OutputFormat::Json),
            verbose: 0,
        };
        let file = ConfigFile {
            format: Some(OutputFormat::Text),
            ..Default::default()
        };
        let resolved = ResolvedConfig::resolve(&args, Some(&file));
        assert_eq!(resolved.format, OutputFormat::Json);
    }
}
