pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "inventory")]
#[command(about = "Product inventory web application")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, short, help = "Listen port, overrides INVENTORY_PORT")]
        port: Option<u16>,
    },

    #[command(about = "Print the bcrypt hash of a password for the app_users table")]
    HashPassword {
        #[arg(help = "Plain-text password")]
        password: String,

        #[arg(long, default_value_t = crate::auth::password::DEFAULT_COST, help = "bcrypt work factor (4-31)")]
        cost: u32,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => commands::serve::handle(port).await,
        Commands::HashPassword { password, cost } => commands::password::handle(&password, cost),
    }
}
