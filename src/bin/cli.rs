//! memcachedb CLI Client
//!
//! Command-line interface for talking to a memcache / memcachedb server.

use clap::{Parser, Subcommand};
use memcachedb::config::DEFAULT_PORT;
use memcachedb::{Client, Config, GetTerminator, MemcacheError, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// memcachedb CLI
#[derive(Parser, Debug)]
#[command(name = "memcachedb-cli")]
#[command(about = "CLI for memcache / memcachedb servers")]
#[command(version)]
struct Args {
    /// Server host, or socket path when --port is 0
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port (0 = Unix domain socket at --host)
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Read timeout in milliseconds (0 = none)
    #[arg(long, default_value = "5000")]
    read_timeout_ms: u64,

    /// Write timeout in milliseconds (0 = none)
    #[arg(long, default_value = "5000")]
    write_timeout_ms: u64,

    /// Server does not send END after a get hit
    #[arg(long)]
    omit_get_end: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get values by key
    Get {
        /// Keys to fetch
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Store a value
    Set(StoreArgs),

    /// Store a value only if the key is absent
    Add(StoreArgs),

    /// Store a value only if the key is present
    Replace(StoreArgs),

    /// Append to an existing value
    Append(StoreArgs),

    /// Prepend to an existing value
    Prepend(StoreArgs),

    /// Delete a key
    Delete {
        /// The key to delete
        key: String,
    },

    /// Increment a counter
    Incr {
        key: String,
        #[arg(default_value = "1")]
        delta: u64,
    },

    /// Decrement a counter
    Decr {
        key: String,
        #[arg(default_value = "1")]
        delta: u64,
    },

    /// Print server statistics
    Stats,

    /// Invalidate all items
    FlushAll,

    /// Store "foo" = "bar", fetch it back and print value and flags
    Demo,
}

#[derive(clap::Args, Debug)]
struct StoreArgs {
    /// The key to store
    key: String,

    /// The value to store
    value: String,

    /// Opaque flags stored with the value
    #[arg(short, long, default_value = "0")]
    flags: u32,

    /// Expiration time (0 = never)
    #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
    exptime: i64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,memcachedb=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let terminator = if args.omit_get_end {
        GetTerminator::Omitted
    } else {
        GetTerminator::End
    };

    let config = Config::builder()
        .host(&args.host)
        .port(args.port)
        .read_timeout_ms(args.read_timeout_ms)
        .write_timeout_ms(args.write_timeout_ms)
        .get_terminator(terminator)
        .build();

    tracing::debug!("memcachedb-cli v{}", memcachedb::VERSION);

    let mut client = match Client::open(config) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to connect to {}:{}: {}", args.host, args.port, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&mut client, args.command) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(client: &mut Client, command: Commands) -> Result<()> {
    match command {
        Commands::Get { keys } => {
            if let [key] = keys.as_slice() {
                match client.get(key) {
                    Ok(r) => println!("{} {}", String::from_utf8_lossy(&r.value), r.flags),
                    Err(MemcacheError::NotFound) => println!("(not found)"),
                    Err(e) => return Err(e),
                }
            } else {
                let results = client.get_multi(&keys)?;
                for key in &keys {
                    match results.get(key) {
                        Some(r) => {
                            println!("{}: {} {}", key, String::from_utf8_lossy(&r.value), r.flags)
                        }
                        None => println!("{}: (not found)", key),
                    }
                }
            }
        }
        Commands::Set(s) => {
            client.set(&s.key, s.value.as_bytes(), s.flags, s.exptime)?;
            println!("STORED");
        }
        Commands::Add(s) => {
            client.add(&s.key, s.value.as_bytes(), s.flags, s.exptime)?;
            println!("STORED");
        }
        Commands::Replace(s) => {
            client.replace(&s.key, s.value.as_bytes(), s.flags, s.exptime)?;
            println!("STORED");
        }
        Commands::Append(s) => {
            client.append(&s.key, s.value.as_bytes(), s.flags, s.exptime)?;
            println!("STORED");
        }
        Commands::Prepend(s) => {
            client.prepend(&s.key, s.value.as_bytes(), s.flags, s.exptime)?;
            println!("STORED");
        }
        Commands::Delete { key } => {
            client.delete(&key)?;
            println!("DELETED");
        }
        Commands::Incr { key, delta } => println!("{}", client.incr(&key, delta)?),
        Commands::Decr { key, delta } => println!("{}", client.decr(&key, delta)?),
        Commands::Stats => {
            for (name, value) in client.stats()?.iter() {
                println!("{} {}", name, value);
            }
        }
        Commands::FlushAll => {
            client.flush_all()?;
            println!("OK");
        }
        Commands::Demo => {
            client.set("foo", b"bar", 0, 0)?;
            let fetched = client.get("foo")?;
            println!("{} {}", String::from_utf8_lossy(&fetched.value), fetched.flags);
        }
    }

    client.close()
}
