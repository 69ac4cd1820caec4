//! Clap derive structures for the `invsync` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// invsync -- keep a local product inventory in sync with its server
#[derive(Debug, Parser)]
#[command(
    name = "invsync",
    version,
    about = "Inventory client: CRUD operations plus a live-updating view",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Inventory server base URL
    #[arg(
        long,
        short = 's',
        env = "INVSYNC_SERVER",
        default_value = "http://127.0.0.1:5000",
        global = true
    )]
    pub server: String,

    /// Push endpoint URL (default: derived from the server URL)
    #[arg(long, env = "INVSYNC_WS", global = true)]
    pub ws: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "INVSYNC_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds
    #[arg(long, env = "INVSYNC_TIMEOUT", default_value = "30", global = true)]
    pub timeout: u64,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Plain text, one id per line (scripting)
    Plain,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List all products
    #[command(alias = "ls")]
    List,

    /// Fetch a single product by id
    Get {
        /// Product id
        id: i64,
    },

    /// Create a product
    Create(ProductArgs),

    /// Replace an existing product
    Update(ProductArgs),

    /// Delete a product by id
    #[command(alias = "rm")]
    Delete {
        /// Product id
        id: i64,
    },

    /// Follow the live-updating inventory view until interrupted
    Watch {
        /// Poll-only mode: skip the push channel and re-fetch on an interval
        #[arg(long)]
        no_live: bool,
    },
}

/// Full product payload for create/update.
#[derive(Debug, Args)]
pub struct ProductArgs {
    /// Product id (the server validates and is authoritative)
    pub id: i64,
    /// Brand name
    pub brand: String,
    /// Category
    pub category: String,
    /// Units in stock
    pub quantity: i64,
    /// Unit price
    pub price: f64,
}
