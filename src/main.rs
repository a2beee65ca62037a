use clap::Parser;
use movie_service::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve { config } => cli::serve::run(config.as_deref()).await,
    }
}
