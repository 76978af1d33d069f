//! ObjEnv CLI
//!
//! Command-line tools for inspecting and manipulating a directory-backed
//! object store through the ObjEnv file environment.
//!
//! # Commands
//!
//! - `ls` - List files under a virtual directory
//! - `stat` - Show size and modification time
//! - `cat` - Print a file
//! - `put` - Write a file with a sync barrier
//! - `mv` - Rename a file (copy then remove)
//! - `rm` - Delete a file
//! - `smoke` - Exercise every file operation end to end

mod commands;

use clap::{Parser, Subcommand};
use objenv_core::{EnvConfig, ObjectEnv};
use objenv_store::DirStore;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// ObjEnv command-line object store tools.
#[derive(Parser)]
#[command(name = "objenv")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Root directory of the object store
    #[arg(global = true, short, long)]
    root: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List files under a virtual directory
    Ls {
        /// Directory prefix (whole namespace when omitted)
        #[arg(default_value = "")]
        dir: String,
    },

    /// Show size and modification time of a file
    Stat {
        /// File name
        name: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Print a file to stdout
    Cat {
        /// File name
        name: String,
    },

    /// Write a file from a local file or stdin
    Put {
        /// File name in the store
        name: String,

        /// Local file to read (stdin when omitted)
        input: Option<PathBuf>,

        /// Append to the existing content instead of replacing it
        #[arg(short, long)]
        append: bool,
    },

    /// Rename a file
    Mv {
        /// Source name
        src: String,

        /// Destination name
        dst: String,
    },

    /// Delete a file
    Rm {
        /// File name
        name: String,
    },

    /// Exercise every file operation end to end
    Smoke {
        /// Virtual directory to run in
        #[arg(short, long, default_value = "smoke")]
        dir: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let open_env = || -> Result<ObjectEnv, Box<dyn std::error::Error>> {
        let root = cli.root.as_deref().ok_or("Object store root required (--root)")?;
        let store = DirStore::open(root)?;
        Ok(ObjectEnv::with_config(Arc::new(store), EnvConfig::default()))
    };

    match &cli.command {
        Commands::Ls { dir } => commands::objects::list(&open_env()?, dir)?,
        Commands::Stat { name, format } => commands::objects::stat(&open_env()?, name, format)?,
        Commands::Cat { name } => commands::objects::cat(&open_env()?, name)?,
        Commands::Put {
            name,
            input,
            append,
        } => commands::objects::put(&open_env()?, name, input.as_deref(), *append)?,
        Commands::Mv { src, dst } => commands::objects::rename(&open_env()?, src, dst)?,
        Commands::Rm { name } => commands::objects::remove(&open_env()?, name)?,
        Commands::Smoke { dir } => commands::smoke::run(&open_env()?, dir)?,
        Commands::Version => {
            println!("ObjEnv CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("ObjEnv Core v{}", objenv_core::VERSION);
        }
    }

    Ok(())
}
