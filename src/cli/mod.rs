//! CLI module for the movie service

pub mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Movie catalogue API - movies, directors and users behind bearer tokens
#[derive(Parser)]
#[command(name = "movie-service")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve {
        /// Extra configuration file layered over `config/default` and `config/local`
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}
