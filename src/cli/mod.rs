//! Command-line surface.
//!
//! Argument parsing with clap, one module per command family. Command
//! output goes to stdout; failures are rendered on stderr and drive a
//! non-zero exit code.

mod account;
mod lists;
mod login;
mod output;
mod recipes;

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::api::{ApiError, BringClient, TokenAuth};
use crate::auth::AuthError;
use crate::config::{AppConfig, ConfigError};

#[derive(Debug, Parser)]
#[command(
    name = "bringr",
    version,
    about = "Bring! shopping lists from the command line"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in to Bring!
    Login {
        /// Open a browser window and capture the session automatically
        #[arg(long, short = 'b')]
        browser: bool,
        /// Use an access token extracted manually from the web app
        #[arg(long)]
        token: Option<String>,
    },
    /// Clear saved credentials
    Logout,
    /// Show login status and token expiry
    Status,
    /// Show all shopping lists
    Lists,
    /// Show items to purchase
    Items {
        #[arg(long)]
        list: Option<String>,
        /// Include recent/completed items
        #[arg(long)]
        all: bool,
    },
    /// Add an item to a list
    Add {
        item: String,
        /// Specification, e.g. "500 g"
        #[arg(long)]
        spec: Option<String>,
        #[arg(long)]
        list: Option<String>,
    },
    /// Remove an item from a list
    #[command(alias = "rm")]
    Remove {
        item: String,
        #[arg(long)]
        list: Option<String>,
    },
    /// Mark an item as purchased
    #[command(alias = "done")]
    Complete {
        item: String,
        #[arg(long)]
        list: Option<String>,
    },
    /// Show account information
    Account,
    /// Add a recipe's ingredients to a shopping list
    AddRecipe {
        /// Recipe content id
        id: String,
        /// Scale for this many servings (default: config or recipe)
        #[arg(long)]
        servings: Option<u32>,
        /// Include pantry items (salt, pepper, etc.)
        #[arg(long)]
        all: bool,
        #[arg(long)]
        list: Option<String>,
    },
    /// Show or change configuration values
    Config {
        key: Option<String>,
        value: Option<String>,
    },
}

/// Top-level command error, rendered on stderr.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Usage(String),
}

pub type Result<T> = std::result::Result<T, CliError>;

/// Execute the parsed command and return the process exit code.
pub async fn run(cli: Cli) -> i32 {
    match dispatch(cli).await {
        Ok(()) => 0,
        Err(error) => {
            output::error(&error.to_string());
            1
        }
    }
}

async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Login { browser, token } => login::login(browser, token).await,
        Command::Logout => login::logout(),
        Command::Status => login::status(),
        Command::Lists => lists::lists().await,
        Command::Items { list, all } => lists::items(list, all).await,
        Command::Add { item, spec, list } => lists::add(item, spec, list).await,
        Command::Remove { item, list } => lists::remove(item, list).await,
        Command::Complete { item, list } => lists::complete(item, list).await,
        Command::Account => account::account().await,
        Command::AddRecipe {
            id,
            servings,
            all,
            list,
        } => recipes::add_recipe(id, servings, all, list).await,
        Command::Config { key, value } => account::config_cmd(key, value),
    }
}

/// REST client from the stored credential, or a login hint.
pub(crate) fn authenticated_client() -> Result<(BringClient, AppConfig)> {
    let config = AppConfig::load();
    if config.auth.access_token.is_empty() || config.auth.user_uuid.is_empty() {
        return Err(CliError::Usage(
            "Not logged in. Run `bringr login` first.".to_string(),
        ));
    }

    let client = BringClient::from_token(TokenAuth {
        access_token: config.auth.access_token.clone(),
        user_uuid: config.auth.user_uuid.clone(),
        public_user_uuid: (!config.auth.public_user_uuid.is_empty())
            .then(|| config.auth.public_user_uuid.clone()),
    })?;
    Ok((client, config))
}

/// Resolve the target list: explicit flag, configured default, or the
/// user's first list.
pub(crate) async fn resolve_list(
    client: &BringClient,
    flag: Option<String>,
    config: &AppConfig,
) -> Result<(String, String)> {
    if let Some(list) = flag {
        return Ok((list.clone(), list));
    }
    if let Some(default) = &config.defaults.default_list {
        return Ok((default.clone(), default.clone()));
    }

    let lists = client.load_lists().await?;
    let first = lists
        .lists
        .first()
        .ok_or_else(|| CliError::Usage("no shopping lists found".to_string()))?;
    Ok((first.list_uuid.clone(), first.name.clone()))
}
