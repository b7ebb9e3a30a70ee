//! `threadkv` command surface: one subcommand per store operation plus
//! `auth` to collect credentials and the target board.

use std::io::{self, BufRead, Write};
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use threadkv_core::KvClient;
use threadkv_http::{Config, HttpNodeStore};

#[derive(Parser)]
#[command(
    name = "threadkv",
    version,
    about = "A key/value store backed by a discussion board",
    long_about = "threadkv maps a key/value store onto a discussion board.\n\n\
                  Boards become databases, topic titles become keys, and\n\
                  reply trees become values.\n\n\
                  This is a proof of concept. Please don't use it for anything serious."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Configure API credentials and the board to use as a database
    Auth {
        #[arg(long)]
        base_url: Option<String>,
        #[arg(long)]
        client_id: Option<String>,
        #[arg(long)]
        client_secret: Option<String>,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        board: Option<String>,
    },
    /// Create or overwrite a key with a scalar value
    Set { key: String, value: String },
    /// Print the value tree for a key
    Get {
        key: String,
        /// Print only the root value instead of the JSON tree
        #[arg(long)]
        raw: bool,
    },
    /// Append a value to an existing key's tree
    Append {
        key: String,
        value: String,
        /// Comma-separated child indices addressing the parent node
        /// (e.g. "0,1"); without it the value lands under the root
        #[arg(long)]
        parent: Option<String>,
    },
    /// Remove a key and its whole tree
    Delete { key: String },
    /// List keys in the board
    Keys {
        /// Print as a JSON array
        #[arg(long)]
        json: bool,
    },
}

type CliError = Box<dyn std::error::Error>;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    if let Err(err) = run(Cli::parse().command) {
        eprintln!("{err}");
        process::exit(1);
    }
}

fn run(command: Command) -> Result<(), CliError> {
    match command {
        Command::Auth {
            base_url,
            client_id,
            client_secret,
            username,
            password,
            board,
        } => run_auth(base_url, client_id, client_secret, username, password, board),
        Command::Set { key, value } => {
            client()?.set(&key, &value)?;
            println!("OK");
            Ok(())
        }
        Command::Get { key, raw } => {
            let tree = client()?.get(&key)?;
            if raw {
                println!("{}", tree.value);
            } else {
                println!("{}", serde_json::to_string_pretty(&tree)?);
            }
            Ok(())
        }
        Command::Append { key, value, parent } => {
            let path = parent.as_deref().map(parse_parent_path).transpose()?;
            client()?.append(&key, &value, path.as_deref())?;
            println!("OK");
            Ok(())
        }
        Command::Delete { key } => {
            client()?.delete(&key)?;
            println!("OK");
            Ok(())
        }
        Command::Keys { json } => {
            let keys = client()?.keys()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&keys)?);
            } else if keys.is_empty() {
                println!("(no keys)");
            } else {
                for key in keys {
                    println!("{key}");
                }
            }
            Ok(())
        }
    }
}

fn client() -> Result<KvClient<HttpNodeStore>, CliError> {
    let config = Config::load()?;
    let board = config.board.clone();
    let store = HttpNodeStore::new(config)?;
    Ok(KvClient::new(store, board))
}

/// Parses `--parent` values like `"0,1"` into child indices.
fn parse_parent_path(raw: &str) -> Result<Vec<usize>, CliError> {
    raw.split(',')
        .map(|part| part.trim().parse::<usize>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| format!("invalid path: {raw}").into())
}

fn run_auth(
    base_url: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    username: Option<String>,
    password: Option<String>,
    board: Option<String>,
) -> Result<(), CliError> {
    let base_url = prompt_if_missing(base_url, "API base URL")?;
    let client_id = prompt_if_missing(client_id, "Client ID")?;
    let client_secret = prompt_if_missing(client_secret, "Client Secret")?;
    let username = prompt_if_missing(username, "Username")?;
    let password = prompt_if_missing(password, "Password")?;
    let board = prompt_if_missing(board, "Board (without b/)")?;

    if [&base_url, &client_id, &client_secret, &username, &password, &board]
        .iter()
        .any(|field| field.is_empty())
    {
        return Err("all fields are required".into());
    }

    let config = Config {
        base_url,
        client_id,
        client_secret,
        username,
        password,
        board: board.trim_start_matches("b/").to_string(),
        access_token: None,
        token_expiry: None,
    };

    // First real call; fails fast on bad credentials before anything is
    // written to disk.
    let store = HttpNodeStore::new(config.clone())?;
    KvClient::new(store, config.board.clone()).keys()?;

    config.save()?;
    println!("Configuration saved to {}", Config::path()?.display());
    println!("You can now use threadkv commands!");
    Ok(())
}

fn prompt_if_missing(flag: Option<String>, label: &str) -> Result<String, CliError> {
    match flag {
        Some(value) if !value.is_empty() => Ok(value),
        _ => {
            print!("{label}: ");
            io::stdout().flush()?;
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            Ok(line.trim().to_string())
        }
    }
}
