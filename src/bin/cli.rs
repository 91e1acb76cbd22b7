//! ordkv CLI
//!
//! Inspect and edit a log store directory. Keys and values are hex.

use std::path::Path;
use std::process;

use bytes::Bytes;
use clap::{Parser, Subcommand};
use ordkv::{hex, Cursor, LogStore, OrdKvError, Result, SortedStore};
use tracing_subscriber::{fmt, EnvFilter};

/// ordkv CLI
#[derive(Parser, Debug)]
#[command(name = "ordkv-cli")]
#[command(about = "Inspect an ordkv log store")]
#[command(version)]
struct Args {
    /// Data directory of the log store
    #[arg(short, long, default_value = "./ordkv_data")]
    data_dir: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// Key as hex
        key: String,
    },

    /// Set a key-value pair
    Put {
        /// Key as hex
        key: String,

        /// Value as hex
        value: String,
    },

    /// Delete a key
    Del {
        /// Key as hex
        key: String,
    },

    /// List entries under a prefix, one page at a time
    Scan {
        /// Prefix as hex (empty for everything)
        #[arg(default_value = "")]
        prefix: String,

        /// Maximum entries per page
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Resume from a cursor printed by a previous scan
        #[arg(short, long)]
        cursor: Option<String>,

        /// Print keys only
        #[arg(short, long)]
        keys_only: bool,
    },

    /// Rewrite the log keeping only live data
    Compact,

    /// Show store counters
    Stats,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        match e {
            OrdKvError::NotFound => eprintln!("(not found)"),
            e => eprintln!("error: {}", e),
        }
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let store = LogStore::open_path(Path::new(&args.data_dir))?;

    match args.command {
        Commands::Get { key } => {
            let value = store.get(&hex::decode(&key)?)?;
            println!("{}", hex::encode(&value));
        }
        Commands::Put { key, value } => {
            store.put(Bytes::from(hex::decode(&key)?), Bytes::from(hex::decode(&value)?))?;
        }
        Commands::Del { key } => {
            store.delete(Bytes::from(hex::decode(&key)?))?;
        }
        Commands::Scan {
            prefix,
            limit,
            cursor,
            keys_only,
        } => {
            let prefix = hex::decode(&prefix)?;
            let cursor = match cursor {
                Some(c) => Cursor::Resume(Bytes::from(hex::decode(&c)?)),
                None => Cursor::Start,
            };
            let page = store.scan_entries(&prefix, &cursor, limit)?;
            for (key, value) in &page.items {
                if keys_only {
                    println!("{}", hex::encode(key));
                } else {
                    println!("{} {}", hex::encode(key), hex::encode(value));
                }
            }
            match page.next_cursor() {
                Some(next) => println!("-- next cursor: {}", hex::encode(next)),
                None => println!("-- end"),
            }
        }
        Commands::Compact => {
            store.compact()?;
            println!("compacted, log is now {} bytes", store.stats().log_bytes);
        }
        Commands::Stats => {
            let stats = store.stats();
            println!("keys:       {}", stats.entry_count);
            println!("live bytes: {}", stats.live_bytes);
            println!("log bytes:  {}", stats.log_bytes);
            println!("last lsn:   {}", stats.last_lsn);
        }
    }

    store.close()
}
