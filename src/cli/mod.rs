pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "gift-certificates")]
#[command(about = "Gift certificate and tag REST service")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply migrations and serve the HTTP API (default)")]
    Serve {
        #[arg(long, help = "Bind address (overrides SERVER_HOST)")]
        host: Option<String>,
        #[arg(long, short, help = "Port (overrides SERVER_PORT / PORT)")]
        port: Option<u16>,
        #[arg(long, help = "Skip running migrations on startup")]
        skip_migrations: bool,
    },

    #[command(about = "Apply embedded SQL migrations and exit")]
    Migrate,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
        skip_migrations: false,
    }) {
        Commands::Serve {
            host,
            port,
            skip_migrations,
        } => commands::serve::handle(host, port, skip_migrations).await,
        Commands::Migrate => commands::migrate::handle().await,
    }
}
