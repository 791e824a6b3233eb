use std::env;
use std::fs;
use std::process;

use anyhow::{Context, Result};
use log::{error, info};

use offsetdump::config::{Config, Invocation, OutputFormat};
use offsetdump::report::{render_json, render_table, sort_reports, BinaryReport, TableOptions};
use offsetdump::schema::Schema;

/// OFFSETDUMP - struct field offsets from DWARF debug information
fn main() {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map_or("offsetdump", String::as_str);

    let config = match Config::from_args(args.get(1..).unwrap_or_default()) {
        Ok(Invocation::Run(config)) => config,
        Ok(Invocation::Help) => {
            print_usage(program);
            process::exit(0);
        }
        Ok(Invocation::Version) => {
            println!("{} v{}", offsetdump::PKG_NAME, offsetdump::VERSION);
            println!("{}", offsetdump::PKG_DESCRIPTION);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("error: {}", e);
            print_usage(program);
            process::exit(2);
        }
    };

    offsetdump::init_logging(config.log_level);

    match run(&config) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            error!("{:#}", e);
            process::exit(1);
        }
    }
}

/// Process every input; returns whether all of them produced a report
fn run(config: &Config) -> Result<bool> {
    let schema = match &config.schema {
        Some(path) => Schema::load(path)?,
        None => Schema::cpython(),
    };

    let mut reports = Vec::new();
    let mut all_ok = true;
    for input in &config.inputs {
        info!("Processing {}", input.display());
        match BinaryReport::from_binary(input, &schema) {
            Ok(report) => reports.push(report),
            Err(e) => {
                // A faulty binary yields no row; the rest are still reported
                error!("Skipping {}: {:#}", input.display(), e);
                all_ok = false;
            }
        }
    }

    sort_reports(&mut reports);
    let rendered = match config.format {
        OutputFormat::Table => render_table(&reports, &TableOptions::default()),
        OutputFormat::Json => render_json(&reports)?,
    };

    match &config.output {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("cannot write {}", path.display()))?,
        None => print!("{}", rendered),
    }

    info!("Wrote {} of {} reports", reports.len(), config.inputs.len());
    Ok(all_ok)
}

/// Print usage information
fn print_usage(program_name: &str) {
    println!("OFFSETDUMP - struct field offsets from DWARF debug information");
    println!("Usage: {} [options] binary...", program_name);
    println!();
    println!("Each binary path must contain its version, e.g. libpython3.11.4.so");
    println!();
    println!("Options:");
    println!("  -h, --help           Display this help message");
    println!("  -v, --version        Display version information");
    println!("      --json           Emit JSON instead of a Go source table");
    println!("      --schema FILE    Read type requests from a JSON file");
    println!("  -o, --output FILE    Write the result to FILE instead of stdout");
    println!("      --log-level LVL  off, error, warn, info, debug or trace");
}
