mod client;
mod commands;
mod config;
mod watcher;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::client::HttpClient;
use crate::config::CliConfig;

#[derive(Parser)]
#[command(name = "pigeon")]
#[command(about = "Terminal client for the Pigeon mail triage service")]
#[command(
    long_about = "A command-line interface for the Pigeon backend.\n\n\
    Start and watch Gmail syncs, trigger AI classification, browse mails and\n\
    manage folders. Sign in through the web app first and pass the tokens it\n\
    issued with --access-token/--refresh-token or PIGEON_ACCESS_TOKEN/PIGEON_REFRESH_TOKEN."
)]
struct Cli {
    /// Base URL of the Pigeon API, including the version prefix.
    #[arg(short, long, value_name = "URL")]
    api_url: Option<String>,

    /// Bearer token used for every request.
    #[arg(long, value_name = "TOKEN")]
    access_token: Option<String>,

    /// Refresh token used once when the access token is rejected.
    #[arg(long, value_name = "TOKEN")]
    refresh_token: Option<String>,

    /// Settings file (TOML). Defaults to ./pigeon.toml when present.
    #[arg(short, long, value_name = "FILE", env = "PIGEON_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start, stop and follow mailbox syncs
    Sync {
        #[command(subcommand)]
        action: SyncAction,
    },
    /// Classify every mail that has no folder yet
    Classify,
    /// Browse and update mails
    Mails {
        #[command(subcommand)]
        action: MailAction,
    },
    /// Manage folders
    Folders {
        #[command(subcommand)]
        action: FolderAction,
    },
    /// Show mail counts of the virtual folders
    Counts,
    /// Show the signed-in user
    Whoami,
}

#[derive(Subcommand)]
pub enum SyncAction {
    /// Ask the backend to start a sync
    Start {
        /// Keep polling until the sync finishes.
        #[arg(short, long)]
        watch: bool,
    },
    /// Ask the backend to cancel the running sync
    Stop,
    /// Print the current sync status once
    Status,
    /// Poll every 3 seconds until the running sync finishes
    Watch,
}

#[derive(Subcommand)]
pub enum MailAction {
    /// List one page of mails
    ///
    /// Without filters this lists all mail. --folder and --virtual are
    /// mutually exclusive.
    List {
        /// Only mails in this folder.
        #[arg(short, long, value_name = "ID", conflicts_with = "virtual_folder")]
        folder: Option<i64>,

        /// One of: all, unread, starred, unclassified.
        #[arg(short = 'v', long = "virtual", value_name = "NAME")]
        virtual_folder: Option<String>,

        /// Free text search.
        #[arg(short, long, value_name = "TEXT")]
        search: Option<String>,

        #[arg(short, long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = pigeon_shared::api::DEFAULT_PAGE_SIZE)]
        page_size: u32,
    },
    /// Show a single mail
    Show { id: i64 },
    /// Move mails into a folder
    Move {
        /// Target folder ID.
        #[arg(short, long, value_name = "ID")]
        folder: i64,

        #[arg(required = true)]
        ids: Vec<i64>,
    },
    /// Star a mail (or unstar with --off)
    Star {
        id: i64,
        #[arg(long)]
        off: bool,
    },
    /// Mark a mail as read (or unread with --unread)
    Read {
        id: i64,
        #[arg(long)]
        unread: bool,
    },
    /// Delete a mail
    Delete { id: i64 },
}

#[derive(Subcommand)]
pub enum FolderAction {
    /// Print the folder tree
    List,
    /// Create a folder
    Create {
        name: String,
        /// Parent folder ID for a nested folder.
        #[arg(short, long, value_name = "ID")]
        parent: Option<i64>,
    },
    /// Rename a folder
    Rename { id: i64, name: String },
    /// Delete a folder
    Delete { id: i64 },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pigeon_cli=info,pigeon_shared=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref())?.with_overrides(
        cli.api_url,
        cli.access_token,
        cli.refresh_token,
    );
    let client = HttpClient::new(&config)?;
    tracing::debug!("Using API at {}", client.base_url());

    commands::run(&client, cli.command).await
}
