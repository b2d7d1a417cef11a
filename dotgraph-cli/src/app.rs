use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// dotgraph - dependency order and referencing modules of .NET assembly sets
#[derive(Debug, Parser)]
#[command(name = "dotgraph", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared across all subcommands.
#[derive(Debug, Parser)]
pub struct GlobalOptions {
    /// Emit output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose (debug-level) logging output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the modules of a directory with their references, and the files that were skipped.
    Scan {
        /// Directory holding the .dll and .exe files.
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },

    /// Load a project and print the processing order of its modules.
    Order {
        /// Input directory (InPath).
        #[arg(long = "in", value_name = "DIR")]
        input: PathBuf,

        /// Output directory (OutPath), created if missing.
        #[arg(long = "out", value_name = "DIR")]
        output: Option<PathBuf>,

        /// Module to process, relative to the input directory. Repeatable.
        #[arg(short, long = "module", value_name = "FILE", required = true)]
        modules: Vec<PathBuf>,

        /// Module to pass through unchanged. Repeatable.
        #[arg(long = "copy", value_name = "FILE")]
        copied: Vec<PathBuf>,

        /// Also select modules of the input directory that reference a selected module.
        #[arg(long)]
        update_references: bool,

        /// Project variable as NAME=VALUE. Repeatable; values may use $(Name).
        #[arg(long = "var", value_name = "NAME=VALUE")]
        variables: Vec<String>,
    },

    /// List the modules of a directory that directly reference the given modules.
    Referencing {
        /// Input directory.
        #[arg(long = "in", value_name = "DIR")]
        input: PathBuf,

        /// Name of a selected module. Repeatable.
        #[arg(short, long, value_name = "NAME", required = true)]
        select: Vec<String>,
    },
}
