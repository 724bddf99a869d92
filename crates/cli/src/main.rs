//! CampusCrew CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run back-office database migrations
//! cc-cli migrate
//!
//! # Create the first administrator (only while no accounts exist)
//! cc-cli admin create-initial -e admin@example.com -n "Admin Name" -p "a strong password"
//!
//! # Delete expired session rows
//! cc-cli sessions purge
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `admin create-initial` - Bootstrap the first administrator
//! - `sessions purge` - Housekeeping sweep for expired sessions

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "cc-cli")]
#[command(author, version, about = "CampusCrew CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run back-office database migrations
    Migrate,
    /// Manage administrator accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Manage sessions
    Sessions {
        #[command(subcommand)]
        action: SessionAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create the first administrator (fails once any account exists)
    CreateInitial {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin password (minimum 8 characters)
        #[arg(short, long)]
        password: String,

        /// Admin display name
        #[arg(short, long)]
        name: String,

        /// Admin surname
        #[arg(short, long)]
        surname: Option<String>,
    },
}

#[derive(Subcommand)]
enum SessionAction {
    /// Delete sessions whose expiry has passed
    Purge,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::CreateInitial {
                email,
                password,
                name,
                surname,
            } => {
                commands::admin::create_initial(&email, &password, &name, surname.as_deref())
                    .await?;
            }
        },
        Commands::Sessions { action } => match action {
            SessionAction::Purge => commands::sessions::purge().await?,
        },
    }
    Ok(())
}
