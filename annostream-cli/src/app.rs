use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// annostream - inspect annotated stream files
#[derive(Debug, Parser)]
#[command(name = "annostream", version, about, long_about = None)]
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
    /// Show the byte order, size and entry counts of an annotated file.
    Info {
        /// Path to the annotated file.
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },

    /// List the names directly inside a namespace.
    Keys {
        /// Path to the annotated file.
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// Dotted namespace to list (e.g. header.camera); the top level if omitted.
        #[arg(short, long)]
        scope: Option<String>,
    },

    /// Print the value stored under a dotted name.
    Get {
        /// Path to the annotated file.
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// Fully qualified name, e.g. header.width.
        #[arg(value_name = "KEY")]
        key: String,
    },

    /// Print every table of contents entry with its value.
    Dump {
        /// Path to the annotated file.
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },
}
