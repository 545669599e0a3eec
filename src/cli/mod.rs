// Command Line Interface Module
// Server management commands using clap

pub mod commands;

use clap::{Parser, Subcommand};
use colored::*;

/// Basket Server - session-backed shopping basket service
#[derive(Parser)]
#[command(name = "basket-server")]
#[command(author = "Basket Server Team")]
#[command(version)]
#[command(about = "Session-backed shopping basket reconciled against live inventory", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start serving basket requests
    Serve {
        /// Configuration file path
        #[arg(short, long, default_value = "basket.toml")]
        config: String,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate configuration file
    Validate {
        /// Configuration file to validate
        #[arg(short, long, default_value = "basket.toml")]
        file: String,
    },

    /// Print products and aggregated stock of a catalog seed file
    Catalog {
        /// Catalog seed file
        #[arg(short, long)]
        file: String,
    },
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red().bold(), msg);
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue().bold(), msg);
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{} {}", "⚠".yellow().bold(), msg);
}
