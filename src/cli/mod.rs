//! Command-line interface for AutoSource.
//!
//! `serve` is the default; the rest are one-off operator commands that run
//! against the configured database and exit.

mod commands;

use clap::{Parser, Subcommand};

use crate::db::repositories::user::ADMIN_ROLE;

/// AutoSource - vehicle sourcing website and back-office
#[derive(Parser)]
#[command(name = "autosource")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server (default)
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Load demo vehicles, testimonials and site settings
    Seed {
        /// Seed even when vehicles already exist
        #[arg(long)]
        force: bool,
    },

    /// Manage admin users
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },
}

#[derive(Subcommand)]
pub enum AdminCommands {
    /// Grant access to an e-mail address
    Add {
        email: String,
        #[arg(long, default_value = ADMIN_ROLE)]
        role: String,
    },

    /// List users
    #[command(alias = "ls")]
    List,

    /// Revoke access
    #[command(alias = "rm")]
    Remove { email: String },

    /// Print a one-time login link without sending e-mail
    Link { email: String },
}

pub use commands::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_admin_add_defaults_role() {
        let cli = Cli::try_parse_from(["autosource", "admin", "add", "ops@example.com"]).unwrap();
        match cli.command {
            Some(Commands::Admin {
                command: AdminCommands::Add { email, role },
            }) => {
                assert_eq!(email, "ops@example.com");
                assert_eq!(role, ADMIN_ROLE);
            }
            _ => panic!("expected admin add"),
        }
    }

    #[test]
    fn test_no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["autosource"]).unwrap();
        assert!(cli.command.is_none());
    }
}
