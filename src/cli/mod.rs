//! CLI module for the Teams API

pub mod serve;

use clap::{Parser, Subcommand};

/// Teams API - team creation service
#[derive(Parser)]
#[command(name = "teams-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve(serve::ServeArgs),
}
