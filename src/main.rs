//! # Roster CLI (`roster`)
//!
//! One binary for both sides: `roster serve` runs the HTTP server, the
//! other commands are clients of a running server.
//!
//! | Command | Description |
//! |---------|-------------|
//! | `roster init` | Create the SQLite database and run schema migrations |
//! | `roster serve` | Start the HTTP server |
//! | `roster upload <file>` | Import a CSV file |
//! | `roster list` | Print one page of records, optionally filtered |
//! | `roster clear` | Delete every record |
//! | `roster browse` | Interactive paginated table |

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use roster::browse::{is_yes, run_browse};
use roster::client::{HttpApi, UsersApi};
use roster::config::{self, Config};
use roster::table::TableWidget;
use roster::upload::UploadWidget;
use roster::{logging, migrate, server};

/// Roster: import CSV files and browse them as a paginated table.
#[derive(Parser)]
#[command(name = "roster", version, about)]
struct Cli {
    /// Path to configuration file (TOML). Defaults apply when it is absent.
    #[arg(long, global = true, default_value = "./config/roster.toml")]
    config: PathBuf,

    /// Server base URL for client commands; overrides `[client].base_url`.
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema. Idempotent.
    Init,

    /// Start the HTTP server on `[server].bind`.
    Serve,

    /// Import a CSV file into the server's store.
    Upload {
        /// CSV file to upload.
        file: PathBuf,

        /// Declared MIME type; lets a file without a `.csv` name through.
        #[arg(long)]
        mime: Option<String>,
    },

    /// Print one page of records, newest first.
    List {
        #[arg(long, default_value_t = 1)]
        page: u64,

        /// Rows per page (defaults to `[client].default_limit`).
        #[arg(long)]
        limit: Option<u64>,

        /// Case-insensitive substring filter over name, email, company,
        /// city, state, and phone.
        #[arg(long)]
        search: Option<String>,
    },

    /// Delete every record.
    Clear {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },

    /// Interactive paginated, searchable table.
    Browse,
}

fn load(cli: &Cli) -> Result<Config> {
    let mut cfg = if cli.config.exists() {
        config::load_config(&cli.config)?
    } else {
        Config::minimal()
    };
    if let Some(url) = &cli.server {
        cfg.client.base_url = url.clone();
    }
    Ok(cfg)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = load(&cli)?;
    logging::init(&cfg.logging.level);

    if !cli.config.exists() {
        tracing::debug!(path = %cli.config.display(), "config file not found, using defaults");
    }

    let api = HttpApi::new(&cfg.client.base_url);

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized at {}", cfg.db.path.display());
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Upload { file, mime } => {
            let mut widget = UploadWidget::new();
            if let Err(notice) = widget.select(&file, mime.as_deref()) {
                bail!(notice.message().to_string());
            }
            let notice = widget.upload(&api, |_| {}).await;
            if notice.is_error() {
                bail!(notice.message().to_string());
            }
            println!("{}", notice);
        }
        Commands::List {
            page,
            limit,
            search,
        } => {
            let limit = limit.unwrap_or(cfg.client.default_limit);
            let mut table = TableWidget::new(limit, cfg.client.search_cap);
            if let Some(term) = search.as_deref() {
                table.set_search(term);
            }
            if let Err(notice) = table.ensure_fresh(&api).await {
                bail!(notice.message().to_string());
            }
            if page > 1 && table.goto(page) {
                if let Err(notice) = table.ensure_fresh(&api).await {
                    bail!(notice.message().to_string());
                }
            }
            print!("{}", table.render());
        }
        Commands::Clear { yes } => {
            if !yes && !confirm_clear(&api).await? {
                println!("Clear cancelled.");
                return Ok(());
            }
            let mut table = TableWidget::new(cfg.client.default_limit, cfg.client.search_cap);
            let notice = table.clear(&api).await;
            if notice.is_error() {
                bail!(notice.message().to_string());
            }
            println!("{}", notice);
        }
        Commands::Browse => {
            run_browse(&cfg, &api).await?;
        }
    }

    Ok(())
}

async fn confirm_clear(api: &HttpApi) -> Result<bool> {
    let total = api
        .list_users(roster::paging::PageRequest::new(1, 1))
        .await?
        .total_users;
    print!(
        "Delete all {} records at {}? This cannot be undone. [y/N] ",
        total,
        api.base_url()
    );
    std::io::Write::flush(&mut std::io::stdout())?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}
