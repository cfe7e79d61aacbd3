//! `chain-gateway` command line.
//!
//! Credentials are read only from the environment
//! (`CHAIN_GATEWAY_MNEMONIC` or `CHAIN_GATEWAY_PRIVATE_KEY`).

use std::path::PathBuf;

use alloy::primitives::Address;
use clap::{Parser, Subcommand};
use serde::Serialize;
use zeroize::Zeroizing;

use chain_gateway::config::{load_config, GatewayConfig};
use chain_gateway::observability::logging;
use chain_gateway::swap::SwapRequest;
use chain_gateway::tokens::parse_address;
use chain_gateway::wallet::{ConnectionInfo, MNEMONIC_ENV_VAR, PRIVATE_KEY_ENV_VAR};
use chain_gateway::{Gateway, GatewayError, GatewayResult};

#[derive(Parser)]
#[command(name = "chain-gateway")]
#[command(about = "Multi-network EVM wallet gateway", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, env = "CHAIN_GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Network key (overrides default_network)
    #[arg(short, long)]
    network: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List supported networks
    Networks,
    /// List tokens of the network (built-in and custom)
    Tokens {
        /// Only user-added tokens
        #[arg(long)]
        custom: bool,
    },
    /// Probe every RPC endpoint of the network
    Health,
    /// Check whether an address hosts an ERC-20 token
    ValidateToken { address: String },
    /// Validate and store a custom token
    AddToken { address: String },
    /// Remove a custom token
    RemoveToken { address: String },
    /// Balances of every known token
    Balances {
        /// Defaults to the wallet from the environment
        #[arg(long)]
        address: Option<String>,
    },
    /// Recent transactions found in the latest blocks
    History {
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Quote a swap
    Quote {
        /// Input token symbol or address
        #[arg(long)]
        from: String,
        /// Output token symbol or address
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: String,
    },
    /// Send the native token
    Send {
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: String,
        /// Wait for confirmation
        #[arg(long)]
        wait: bool,
    },
    /// Send an ERC-20 token
    SendToken {
        /// Token symbol or address
        #[arg(long)]
        token: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: String,
        #[arg(long)]
        wait: bool,
    },
    /// Swap through the aggregator
    Swap {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: String,
        /// Slippage tolerance in percent
        #[arg(long, default_value_t = 1.0)]
        slippage: f64,
    },
}

#[derive(Serialize)]
struct NetworkSummary {
    key: String,
    chain_id: u64,
    name: String,
    native_token: String,
    endpoints: usize,
    explorer_url: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };
    if let Some(network) = &cli.network {
        config.default_network.0 = network.clone();
    }
    logging::init(&config.observability);

    let mut gateway = Gateway::new(config)?;
    tracing::debug!(network = %gateway.active_network().key, "chain-gateway starting");

    match cli.command {
        Commands::Networks => {
            let networks: Vec<NetworkSummary> = gateway
                .networks()
                .iter()
                .map(|n| NetworkSummary {
                    key: n.key.clone(),
                    chain_id: n.chain_id.0,
                    name: n.name.clone(),
                    native_token: n.native_token.symbol.clone(),
                    endpoints: n.endpoints().len(),
                    explorer_url: n.explorer_url.clone(),
                })
                .collect();
            print_json(&networks)?;
        }
        Commands::Tokens { custom } => {
            if custom {
                print_json(&gateway.custom_tokens()?)?;
            } else {
                print_json(&gateway.all_tokens()?)?;
            }
        }
        Commands::Health => print_json(&gateway.health().await?)?,
        Commands::ValidateToken { address } => print_json(&gateway.validate_token(&address).await?)?,
        Commands::AddToken { address } => print_json(&gateway.add_custom_token(&address).await?)?,
        Commands::RemoveToken { address } => {
            let removed = gateway.remove_custom_token(&address)?;
            print_json(&serde_json::json!({ "removed": removed }))?;
        }
        Commands::Balances { address } => {
            let address = resolve_owner(&mut gateway, address).await?;
            print_json(&gateway.all_balances(Some(address)).await?)?;
        }
        Commands::History { address, limit } => {
            let address = resolve_owner(&mut gateway, address).await?;
            print_json(&gateway.history(Some(address), limit).await?)?;
        }
        Commands::Quote { from, to, amount } => {
            let request = swap_request(&gateway, &from, &to, amount)?;
            print_json(&gateway.quote(&request).await?)?;
        }
        Commands::Send { to, amount, wait } => {
            connect_from_env(&mut gateway).await?;
            let sent = gateway.send_native(parse_address(&to)?, &amount).await?;
            print_json(&sent)?;
            if wait {
                print_json(&gateway.wait_for_confirmation(sent.hash).await?)?;
            }
        }
        Commands::SendToken { token, to, amount, wait } => {
            connect_from_env(&mut gateway).await?;
            let sent = gateway.send_token(&token, parse_address(&to)?, &amount).await?;
            print_json(&sent)?;
            if wait {
                print_json(&gateway.wait_for_confirmation(sent.hash).await?)?;
            }
        }
        Commands::Swap { from, to, amount, slippage } => {
            connect_from_env(&mut gateway).await?;
            let request = swap_request(&gateway, &from, &to, amount)?;
            let quote = gateway.quote(&request).await?;
            print_json(&gateway.execute_quote(&quote, slippage).await?)?;
        }
    }

    gateway.disconnect();
    Ok(())
}

/// Connect the wallet named by the environment.
async fn connect_from_env(gateway: &mut Gateway) -> GatewayResult<ConnectionInfo> {
    let info = if let Ok(phrase) = std::env::var(MNEMONIC_ENV_VAR) {
        let phrase = Zeroizing::new(phrase);
        gateway.connect_with_mnemonic(&phrase).await?
    } else if let Ok(key) = std::env::var(PRIVATE_KEY_ENV_VAR) {
        let key = Zeroizing::new(key);
        gateway.connect_with_private_key(&key).await?
    } else {
        tracing::error!("Set {} or {} to use a wallet", MNEMONIC_ENV_VAR, PRIVATE_KEY_ENV_VAR);
        return Err(GatewayError::NoWalletConnected);
    };

    if let Some(mismatch) = &info.chain_mismatch {
        eprintln!(
            "warning: {} reports chain id {}, expected {}",
            info.network, mismatch.actual, mismatch.expected
        );
    }
    Ok(info)
}

async fn resolve_owner(gateway: &mut Gateway, address: Option<String>) -> GatewayResult<Address> {
    match address {
        Some(address) => parse_address(&address),
        None => Ok(connect_from_env(gateway).await?.address),
    }
}

fn swap_request(gateway: &Gateway, from: &str, to: &str, amount: String) -> GatewayResult<SwapRequest> {
    let from_token = gateway.find_token(from)?;
    let to_token = gateway.find_token(to)?;
    Ok(SwapRequest {
        from_token: from_token.address,
        to_token: to_token.address,
        amount,
        decimals: from_token.decimals,
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
