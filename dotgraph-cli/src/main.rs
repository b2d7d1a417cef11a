mod app;
mod commands;
mod output;

use clap::Parser;

use crate::app::{Cli, Command};

fn main() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        eprintln!("\nCancelled.");
        std::process::exit(130);
    })
    .expect("failed to set Ctrl+C handler");

    let cli = Cli::parse();

    // Show dotgraph info+ on stderr unless --json; --verbose enables debug; RUST_LOG overrides
    if !cli.global.json {
        let level = if cli.global.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        };
        env_logger::Builder::new()
            .filter_module("dotgraph", level)
            .parse_default_env()
            .target(env_logger::Target::Stderr)
            .format_timestamp(None)
            .format_module_path(false)
            .format_target(false)
            .init();
    }

    match &cli.command {
        Command::Scan { dir } => commands::scan::run(dir, &cli.global),
        Command::Order {
            input,
            output,
            modules,
            copied,
            update_references,
            variables,
        } => commands::order::run(
            &commands::order::OrderOptions {
                input,
                output: output.as_deref(),
                modules,
                copied,
                update_references: *update_references,
                variables,
            },
            &cli.global,
        ),
        Command::Referencing { input, select } => {
            commands::referencing::run(input, select, &cli.global)
        }
    }
}
