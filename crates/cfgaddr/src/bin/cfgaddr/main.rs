mod cli;

use anyhow::Context;
use cfgaddr::config_file::ConfigFile;
use cfgaddr::report::{self, Report};
use std::io::Write;
use std::path::PathBuf;

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("CFGADDR_LOG"))
        .with_writer(std::io::stderr)
        .init();

    for new_path in cli.directory.iter() {
        match new_path.canonicalize() {
            Err(e) => {
                eprintln!(
                    "Failed to resolve path for -C/--directory {}\n{}",
                    new_path.display(),
                    e
                );
                std::process::exit(1);
            }
            Ok(cwd) => {
                if let Err(err) = std::env::set_current_dir(&cwd) {
                    eprintln!("Failed to set work directory to {}\n{}", cwd.display(), err,);
                    std::process::exit(1);
                }

                tracing::info!(directory=%cwd.display(), "Changed working directory");
            }
        }
    }

    let command_result = match cli.command {
        cli::Command::Extract(extract_cli) => extract(extract_cli),
        cli::Command::Dev(dev_cli) => dev(dev_cli),
    };

    if let Err(e) = command_result {
        for error in e.chain() {
            eprintln!("{error}")
        }
        std::process::exit(1);
    }
}

pub fn extract(cli: cli::ExtractCommand) -> anyhow::Result<()> {
    let file = load(&cli.input)?;
    let header = block_header(&cli.input)?;

    // nothing to report is not an error, but nothing gets written either
    let report = match cfgaddr::extract(&file, &header) {
        Ok(report) => report,
        Err(outcome) => {
            println!("{outcome}");
            return Ok(());
        }
    };

    let payload = render(cli.output.format, &report)?;

    if cli.output.stdout {
        print!("{payload}");
        return Ok(());
    }

    let path = cli.output.file.clone().unwrap_or_else(|| {
        PathBuf::from(report::output_file_name(
            &header,
            cli.output.format.extension(),
        ))
    });

    report::persist(&path, &payload)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    println!("Report written to {}", path.display());

    Ok(())
}

fn load(input: &cli::InputArgs) -> anyhow::Result<ConfigFile> {
    let path = match &input.file {
        Some(path) => path.clone(),
        None => prompt("Config file (e.g. config.txt): ")?.into(),
    };

    Ok(ConfigFile::load_file(&path)?)
}

fn block_header(input: &cli::InputArgs) -> anyhow::Result<String> {
    match &input.block {
        Some(block) => Ok(block.trim().to_string()),
        None => prompt("Block header (e.g. config firewall addrgrp): "),
    }
}

fn prompt(message: &str) -> anyhow::Result<String> {
    print!("{message}");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;

    let answer = answer.trim();
    anyhow::ensure!(!answer.is_empty(), "No input given");
    Ok(answer.to_string())
}

fn render(format: cli::OutputFormat, report: &Report) -> anyhow::Result<String> {
    let payload = match format {
        cli::OutputFormat::Text => report.render(),
        cli::OutputFormat::Json => serde_json::to_string_pretty(report)? + "\n",
        cli::OutputFormat::Yaml => serde_yaml::to_string(report)?,
    };

    Ok(payload)
}

/// (cfgaddr-)developer utilities
///
/// A quick way to expose internal structures for debugging purposes
pub fn dev(cli: cli::DevCommand) -> anyhow::Result<()> {
    use cli::DevSubCommand::*;

    match cli.command {
        Registry(input) => {
            let file = load(&input)?;
            let registry = cfgaddr::registry::Registry::build(file.lines());
            for name in registry.names() {
                let body = registry.get(name).unwrap_or_default();
                println!("{name} ({} lines)", body.len());
            }
        }
        Block(input) => {
            let file = load(&input)?;
            let header = block_header(&input)?;
            for line in cfgaddr::block::capture_block(file.lines(), &header) {
                println!("{line}");
            }
        }
        Entries(input) => {
            let file = load(&input)?;
            let header = block_header(&input)?;
            let block = cfgaddr::block::capture_block(file.lines(), &header);
            for entry in cfgaddr::block::parse_entries(&block) {
                println!("{}: {:?}", entry.name, entry.members());
            }
        }
    }

    Ok(())
}
