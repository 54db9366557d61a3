//! sparsetrace - Run a prompt through the sparse routing engine
//!
//! # Usage
//!
//! ```bash
//! # Human-readable report
//! sparsetrace "How does a mixture of experts route tokens?"
//!
//! # JSON trace on stdout (the UI contract)
//! sparsetrace --json --pretty "matrix algebra"
//!
//! # JSON trace into a file, prompt from stdin
//! echo "neural network training" | sparsetrace --output trace.json
//!
//! # Inspect the compiled-in layers and vocabulary
//! sparsetrace --catalog
//! ```
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 2: Invalid arguments or IO error

use anyhow::{Context, Result};
use sparsetrace::report::{render, render_catalog};
use sparsetrace::{EngineConfig, RoutingModel};
use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Default)]
struct Options {
    json: bool,
    pretty: bool,
    catalog: bool,
    output: Option<PathBuf>,
    config: Option<EngineConfig>,
    prompt: Vec<String>,
}

enum Parsed {
    Run(Options),
    Help,
}

fn parse_args(args: &[String]) -> std::result::Result<Parsed, String> {
    let mut options = Options::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-j" | "--json" => options.json = true,
            "-p" | "--pretty" => options.pretty = true,
            "-c" | "--catalog" => options.catalog = true,
            "--compact" => options.config = Some(EngineConfig::compact()),
            "--full" => options.config = Some(EngineConfig::verbose()),
            "-o" | "--output" => {
                let path = iter.next().ok_or("--output needs a path")?;
                options.output = Some(PathBuf::from(path));
            }
            "-h" | "--help" => return Ok(Parsed::Help),
            "--" => {
                options.prompt.extend(iter.by_ref().cloned());
            }
            _ if arg.starts_with('-') && arg.len() > 1 => {
                return Err(format!("Unknown option: {}", arg));
            }
            _ => options.prompt.push(arg.clone()),
        }
    }

    Ok(Parsed::Run(options))
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let options = match parse_args(&args) {
        Ok(Parsed::Run(options)) => options,
        Ok(Parsed::Help) => {
            print_help();
            return ExitCode::SUCCESS;
        }
        Err(message) => {
            eprintln!("Error: {}\n", message);
            print_help();
            return ExitCode::from(2);
        }
    };

    match run(options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run(options: Options) -> Result<()> {
    let model = match options.config {
        Some(config) => RoutingModel::builtin_with_config(config)
            .context("Invalid engine configuration")?,
        None => RoutingModel::builtin(),
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if options.catalog {
        if options.json {
            let text = if options.pretty {
                serde_json::to_string_pretty(&model)
            } else {
                serde_json::to_string(&model)
            }
            .context("Failed to serialize catalog")?;
            writeln!(out, "{}", text)?;
        } else {
            write!(out, "{}", render_catalog(&model))?;
        }
        return Ok(());
    }

    let prompt = if options.prompt.is_empty() {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read prompt from stdin")?;
        buffer
    } else {
        options.prompt.join(" ")
    };

    let trace = model.infer(&prompt);

    if let Some(path) = &options.output {
        trace
            .save_json(path, options.pretty)
            .with_context(|| format!("Failed to write trace to {}", path.display()))?;
        eprintln!(
            "wrote {} ({} tokens, {} sparsity)",
            path.display(),
            trace.tokens.len(),
            sparsetrace::format_percent(trace.energy.sparsity_ratio)
        );
        return Ok(());
    }

    if options.json {
        trace
            .write_json(&mut out, options.pretty)
            .context("Failed to write JSON trace")?;
        writeln!(out)?;
    } else {
        write!(out, "{}", render(&trace))?;
    }

    Ok(())
}

fn print_help() {
    eprintln!("sparsetrace - Sparse mixture-of-experts routing trace");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("    sparsetrace [OPTIONS] [PROMPT]...");
    eprintln!();
    eprintln!("ARGS:");
    eprintln!("    <PROMPT>    Prompt text (read from stdin when omitted)");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("    -j, --json           Print the JSON trace instead of the report");
    eprintln!("    -p, --pretty         Pretty-print JSON output");
    eprintln!("    -o, --output <PATH>  Write the JSON trace to a file");
    eprintln!("    -c, --catalog        Show the built-in layers and vocabulary");
    eprintln!("        --compact        One dominant feature per neuron, top 3 profile");
    eprintln!("        --full           Five dominant features per neuron, top 10 profile");
    eprintln!("    -h, --help           Print this help message");
    eprintln!();
    eprintln!("EXIT CODES:");
    eprintln!("    0    Success");
    eprintln!("    2    Invalid arguments or IO error");
}
