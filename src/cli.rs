//! CLI argument parsing via clap.

use clap::{Parser, Subcommand};

/// Command-line client for a multi-shop retail management API.
#[derive(Debug, Parser)]
#[command(name = "shopctl", version)]
pub struct Args {
    /// Path to config file (default: ./shopctl.toml or
    /// ~/.config/shopctl/shopctl.toml).
    #[arg(short = 'c', long = "config")]
    pub config: Option<String>,

    /// Override API base URL.
    #[arg(long = "base-url")]
    pub base_url: Option<String>,

    /// Disable color output.
    #[arg(long = "no-color")]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and store the session locally.
    Login {
        /// Account email. The password is prompted for.
        email: String,
    },
    /// Clear the stored session.
    Logout,
    /// Show the logged-in user and the active shop.
    Whoami,
    /// List shops.
    Shops,
    /// Select the active shop for subsequent commands.
    UseShop {
        /// Shop id, as shown by `shops`.
        id: i64,
    },
    /// List products in the active shop.
    Products {
        /// Server-side search over name and SKU.
        #[arg(long)]
        search: Option<String>,
    },
    /// List sales in the active shop.
    Sales,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn login_takes_email_argument() {
        let args = Args::parse_from(["shopctl", "login", "admin@example.com"]);
        match args.command {
            Command::Login { email } => assert_eq!(email, "admin@example.com"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn use_shop_parses_numeric_id() {
        let args = Args::parse_from(["shopctl", "use-shop", "4"]);
        assert!(matches!(args.command, Command::UseShop { id: 4 }));
    }

    #[test]
    fn products_accepts_optional_search() {
        let args = Args::parse_from(["shopctl", "products", "--search", "beans"]);
        match args.command {
            Command::Products { search } => assert_eq!(search.as_deref(), Some("beans")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_apply_before_subcommand() {
        let args = Args::parse_from([
            "shopctl",
            "--base-url",
            "https://staging.example.com/api",
            "--no-color",
            "whoami",
        ]);
        assert_eq!(
            args.base_url.as_deref(),
            Some("https://staging.example.com/api")
        );
        assert!(args.no_color);
    }
}
