//! Command-line configuration

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use log::LevelFilter;

/// Rendering of the collected reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Go source map literal
    Table,
    Json,
}

/// Settings for one run over a set of binaries
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Binaries to inspect, each carrying a version number in its path
    pub inputs: Vec<PathBuf>,
    pub format: OutputFormat,
    /// JSON schema replacing the built-in CPython manifest
    pub schema: Option<PathBuf>,
    /// Output file; stdout when absent
    pub output: Option<PathBuf>,
    pub log_level: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            format: OutputFormat::Table,
            schema: None,
            output: None,
            log_level: LevelFilter::Warn,
        }
    }
}

/// What the command line asks for
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    Run(Config),
    Help,
    Version,
}

impl Config {
    /// Parse arguments, excluding the program name
    pub fn from_args(args: &[String]) -> Result<Invocation> {
        let mut config = Config::default();
        let mut i = 0;

        while i < args.len() {
            match args[i].as_str() {
                "-h" | "--help" => return Ok(Invocation::Help),
                "-v" | "--version" => return Ok(Invocation::Version),
                "--json" => config.format = OutputFormat::Json,
                "--schema" => config.schema = Some(PathBuf::from(value(args, &mut i)?)),
                "-o" | "--output" => config.output = Some(PathBuf::from(value(args, &mut i)?)),
                "--log-level" => {
                    let level = value(args, &mut i)?;
                    config.log_level = LevelFilter::from_str(level)
                        .map_err(|_| anyhow!("unknown log level: {}", level))?;
                }
                // Everything after `--` is an input, even if it looks like a flag
                "--" => {
                    config.inputs.extend(args[i + 1..].iter().map(PathBuf::from));
                    break;
                }
                flag if flag.starts_with('-') && flag.len() > 1 => {
                    return Err(anyhow!("unknown option: {}", flag));
                }
                input => config.inputs.push(PathBuf::from(input)),
            }
            i += 1;
        }

        if config.inputs.is_empty() {
            return Err(anyhow!("no input binaries given"));
        }

        Ok(Invocation::Run(config))
    }
}

/// Value following the option at `args[*i]`
fn value<'a>(args: &'a [String], i: &mut usize) -> Result<&'a str> {
    let option = &args[*i];
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("missing value for {}", option))
}
