//! Vieux Carré CLI - database migrations and user management.
//!
//! # Usage
//!
//! ```bash
//! # Run auth database migrations
//! vc-cli migrate
//!
//! # Create a credential user
//! vc-cli user create -e marie@vieuxcarre.app -n "Marie" -r admin
//! ```
//!
//! # Environment Variables
//!
//! - `AUTH_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//! - `VC_USER_PASSWORD` - Password for `user create` when `--password` is omitted

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "vc-cli")]
#[command(author, version, about = "Vieux Carré CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage storefront users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a credential user
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name (defaults to the email's local part)
        #[arg(short, long)]
        name: Option<String>,

        /// Password
        #[arg(short, long, env = "VC_USER_PASSWORD", hide_env_values = true)]
        password: String,

        /// Role (`user` or `admin`)
        #[arg(short, long, default_value = "user")]
        role: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                name,
                password,
                role,
            } => {
                commands::user::create(&email, name.as_deref(), &password, &role).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_user_create() {
        let cli = Cli::try_parse_from([
            "vc-cli", "user", "create", "-e", "marie@vieuxcarre.app", "-p", "gris-gris-1", "-r",
            "admin",
        ])
        .map_err(|e| e.to_string());
        let Ok(Cli {
            command: Commands::User {
                action: UserAction::Create { email, name, role, .. },
            },
        }) = cli
        else {
            panic!("unexpected parse result");
        };
        assert_eq!(email, "marie@vieuxcarre.app");
        assert_eq!(name, None);
        assert_eq!(role, "admin");
    }
}
