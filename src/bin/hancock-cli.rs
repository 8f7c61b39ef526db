use clap::{Parser, Subcommand};
use hancock_sdk::config::load_config_or_default;
use hancock_sdk::observability::init_logging;
use hancock_sdk::{Dlt, EventKind, HancockClient, InvokeOptions, SocketEvent, SocketStatus, WatchTarget};
use serde_json::{json, Value};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hancock-cli")]
#[command(about = "Command line client for the Hancock ledger services", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Ledger family
    #[arg(short, long, default_value = "ethereum")]
    dlt: Dlt,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the balance of an address
    Balance { address: String },
    /// Transfer value between two addresses
    Transfer {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        value: String,
        /// Sign locally with this key
        #[arg(long)]
        private_key: Option<String>,
        /// Delegate signing to this provider
        #[arg(long)]
        sign_provider: Option<String>,
    },
    /// Show a token balance (ethereum only)
    TokenBalance {
        address: String,
        /// Token address or alias
        token: String,
    },
    /// Print transfer events for addresses until Ctrl-C
    Watch {
        addresses: Vec<String>,
        #[arg(long, default_value = "")]
        consumer: String,
        /// Only report mined or pending events
        #[arg(long, value_parser = parse_status)]
        status: Option<SocketStatus>,
        /// Watch every transaction instead of transfers only
        #[arg(long)]
        transactions: bool,
    },
}

fn parse_status(value: &str) -> Result<SocketStatus, String> {
    match value {
        "mined" => Ok(SocketStatus::Mined),
        "pending" => Ok(SocketStatus::Pending),
        other => Err(format!("unknown status '{}', expected mined or pending", other)),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config_or_default(cli.config.as_deref())?;
    init_logging(&config.observability);

    let client = HancockClient::new(config);

    match cli.command {
        Commands::Balance { address } => {
            let balance = match cli.dlt {
                Dlt::Ethereum => client.ethereum().get_balance(&address).await?,
                Dlt::Bitcoin => client.bitcoin().get_balance(&address).await?,
            };
            print_json(&json!({ "address": address, "balance": balance }))?;
        }
        Commands::Transfer {
            from,
            to,
            value,
            private_key,
            sign_provider,
        } => {
            let mut options = InvokeOptions::new();
            if let Some(key) = private_key {
                options = options.with_private_key(key);
            }
            if let Some(provider) = sign_provider {
                options = options.with_sign_provider(provider);
            }
            let response = match cli.dlt {
                Dlt::Ethereum => client.ethereum().transfer(&from, &to, &value, &options).await?,
                Dlt::Bitcoin => client.bitcoin().transfer(&from, &to, &value, &options).await?,
            };
            print_json(&response)?;
        }
        Commands::TokenBalance { address, token } => {
            if cli.dlt != Dlt::Ethereum {
                return Err("token-balance is only available for ethereum".into());
            }
            let data = client.ethereum().get_token_balance(&address, &token).await?;
            print_json(&data)?;
        }
        Commands::Watch {
            addresses,
            consumer,
            status,
            transactions,
        } => {
            let target = if transactions {
                WatchTarget::Transactions
            } else {
                WatchTarget::Transfers
            };
            let register = |socket: &hancock_sdk::EventSocket| {
                for kind in [EventKind::Tx, EventKind::Error, EventKind::Closed] {
                    socket.on(kind, print_event);
                }
            };
            let socket = match cli.dlt {
                Dlt::Ethereum => client
                    .ethereum()
                    .subscribe_with(target, addresses, &consumer, status, register)?,
                Dlt::Bitcoin => client
                    .bitcoin()
                    .subscribe_with(target, addresses, &consumer, status, register)?,
            };

            tokio::signal::ctrl_c().await?;
            socket.close();
        }
    }

    Ok(())
}

fn print_event(event: &SocketEvent) {
    match event {
        SocketEvent::Message { payload, .. } => {
            if let Ok(text) = serde_json::to_string_pretty(payload) {
                println!("{}", text);
            }
        }
        SocketEvent::Error(err) => eprintln!("Error: {}", err),
        SocketEvent::Closed => eprintln!("Connection closed"),
        SocketEvent::Opened => {}
    }
}

fn print_json(value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
