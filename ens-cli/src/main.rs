//! ENS CLI
//!
//! Command-line interface for ENS-style name services (ENS, PUFFScoin-ENS).

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ens_client::{Ens, HttpTransport, DEFAULT_ETH_RPC_URL};
use ens_core::constants::{ABI_CONTENT_JSON, NETWORK_MAINNET};
use ens_core::types::TxOptions;
use ens_core::{Address, Node, B256};
use ens_namehash::{namehash, normalize};

/// ENS - name resolution and registry management
#[derive(Parser)]
#[command(name = "ens")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ConnectionArgs {
    /// Ethereum RPC URL
    #[arg(long, global = true, env = "ETH_RPC_URL", default_value = DEFAULT_ETH_RPC_URL)]
    rpc_url: String,

    /// Network id used to pick the registry
    #[arg(long, global = true, env = "ENS_NETWORK", default_value = NETWORK_MAINNET)]
    network: String,

    /// Registry address (overrides --network)
    #[arg(long, global = true, env = "ENS_REGISTRY")]
    registry: Option<String>,
}

#[derive(Debug, Args)]
struct TxArgs {
    /// Sending account (defaults to the node's first account)
    #[arg(long)]
    from: Option<String>,

    /// Gas limit
    #[arg(long)]
    gas: Option<u64>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,

    /// Wait for the transaction to be mined
    #[arg(short, long)]
    wait: bool,
}

impl TxArgs {
    fn options(&self) -> Result<TxOptions> {
        let mut opts = TxOptions::default();
        if let Some(from) = &self.from {
            opts.from = Some(parse_address(from)?);
        }
        opts.gas = self.gas;
        Ok(opts)
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the namehash of a name
    Namehash {
        /// Name to hash
        name: String,
    },

    /// Print the normalized form of a name
    Normalize {
        /// Name to normalize
        name: String,
    },

    /// Resolve a name to an address
    Lookup {
        /// Name to resolve
        name: String,
    },

    /// Print the owner of a name
    Owner {
        /// Name to query
        name: String,
    },

    /// Print the resolver of a name (or 32-byte node) and its capabilities
    Resolver {
        /// Name or node hex
        name: String,
    },

    /// Resolve an address to its reverse name
    Reverse {
        /// Address to look up
        address: String,
    },

    /// Print the JSON ABI of a name
    Abi {
        /// Name to query
        name: String,
    },

    /// Run the legacy has(node, kind) check
    Has {
        /// Name to query
        name: String,
        /// Record kind, e.g. "addr"
        kind: String,
    },

    /// Transfer ownership of a name
    SetOwner {
        /// Name to update
        name: String,
        /// New owner
        owner: String,
        #[command(flatten)]
        tx: TxArgs,
    },

    /// Set the resolver of a name
    SetResolver {
        /// Name to update
        name: String,
        /// Resolver address
        resolver: String,
        #[command(flatten)]
        tx: TxArgs,
    },

    /// Assign ownership of a subdomain
    SetSubnodeOwner {
        /// Full subdomain name, e.g. baz.bar.puffs
        name: String,
        /// New owner
        owner: String,
        #[command(flatten)]
        tx: TxArgs,
    },

    /// Set the address record of a name on its resolver
    SetAddr {
        /// Name to update
        name: String,
        /// Address to record
        address: String,
        #[command(flatten)]
        tx: TxArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "ens_client=debug,ens_cli=debug,info"
    } else {
        "ens_client=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let conn = &cli.connection;
    debug!(command = ?cli.command, "Running command");
    match cli.command {
        Commands::Namehash { name } => cmd_namehash(&name),
        Commands::Normalize { name } => cmd_normalize(&name),
        Commands::Lookup { name } => cmd_lookup(conn, &name).await,
        Commands::Owner { name } => cmd_owner(conn, &name).await,
        Commands::Resolver { name } => cmd_resolver(conn, &name).await,
        Commands::Reverse { address } => cmd_reverse(conn, &address).await,
        Commands::Abi { name } => cmd_abi(conn, &name).await,
        Commands::Has { name, kind } => cmd_has(conn, &name, &kind).await,
        Commands::SetOwner { name, owner, tx } => {
            let ens = connect(conn)?;
            let owner = parse_address(&owner)?;
            let opts = tx.options()?;
            let action = format!("set owner of {name} to {owner}");
            send(&ens, &action, &tx, ens.set_owner(&name, owner, &opts)).await
        }
        Commands::SetResolver { name, resolver, tx } => {
            let ens = connect(conn)?;
            let resolver = parse_address(&resolver)?;
            let opts = tx.options()?;
            let action = format!("set resolver of {name} to {resolver}");
            send(&ens, &action, &tx, ens.set_resolver(&name, resolver, &opts)).await
        }
        Commands::SetSubnodeOwner { name, owner, tx } => {
            let ens = connect(conn)?;
            let owner = parse_address(&owner)?;
            let opts = tx.options()?;
            let action = format!("assign {name} to {owner}");
            send(&ens, &action, &tx, ens.set_subnode_owner(&name, owner, &opts)).await
        }
        Commands::SetAddr { name, address, tx } => {
            let ens = connect(conn)?;
            let address = parse_address(&address)?;
            let opts = tx.options()?;
            let resolver = ens
                .resolver(&name)
                .await
                .with_context(|| format!("Failed to find resolver for {name}"))?;
            let action = format!("set address of {name} to {address}");
            send(&ens, &action, &tx, resolver.set_addr(address, &opts)).await
        }
    }
}

fn connect(conn: &ConnectionArgs) -> Result<Ens> {
    debug!(rpc_url = %conn.rpc_url, network = %conn.network, "Connecting");
    let transport =
        HttpTransport::new(conn.rpc_url.clone()).context("Failed to create RPC transport")?;

    let mut builder = Ens::builder().transport(transport).network(conn.network.clone());
    if let Some(registry) = &conn.registry {
        builder = builder.registry(parse_address(registry)?);
    }

    builder.build().context("Failed to configure ENS client")
}

fn parse_address(raw: &str) -> Result<Address> {
    raw.trim()
        .parse::<Address>()
        .with_context(|| format!("Invalid address: {raw}"))
}

/// Print namehash
fn cmd_namehash(name: &str) -> Result<()> {
    let node = namehash(name).context("Invalid name")?;
    println!("{}", node);
    Ok(())
}

/// Print normalized name
fn cmd_normalize(name: &str) -> Result<()> {
    let normalized = normalize(name).context("Invalid name")?;
    println!("{}", normalized);
    Ok(())
}

/// Resolve name to address
async fn cmd_lookup(conn: &ConnectionArgs, name: &str) -> Result<()> {
    println!("{} {}", "🔍 Resolving:".cyan().bold(), name);

    let ens = connect(conn)?;
    let address = ens.lookup(name).await.context("Failed to resolve name")?;

    println!("   {} {}", "Address:".green(), address);
    Ok(())
}

/// Print owner
async fn cmd_owner(conn: &ConnectionArgs, name: &str) -> Result<()> {
    let ens = connect(conn)?;
    let owner = ens.owner(name).await.context("Failed to fetch owner")?;

    println!("   {} {}", "Owner:".green(), owner);
    Ok(())
}

/// Print resolver and capabilities
async fn cmd_resolver(conn: &ConnectionArgs, name: &str) -> Result<()> {
    let ens = connect(conn)?;
    let resolver = if Node::parse_hex(name).is_some() {
        ens.resolver_for_node(name).await
    } else {
        ens.resolver(name).await
    }
    .context("Failed to find resolver")?;

    println!("   {} {}", "Resolver:".green(), resolver.address());
    println!("   {} {}", "Node:".dimmed(), resolver.node());

    let caps = resolver
        .capabilities()
        .await
        .context("Failed to probe resolver capabilities")?;
    println!("   {} {}", "Supports:".dimmed(), caps);
    Ok(())
}

/// Resolve address to name
async fn cmd_reverse(conn: &ConnectionArgs, address: &str) -> Result<()> {
    println!("{} {}", "🔍 Reverse resolving:".cyan().bold(), address);

    let ens = connect(conn)?;
    let name = ens.reverse(address).await.context("Failed to reverse resolve")?;

    println!("   {} {}", "Name:".green(), name);
    Ok(())
}

/// Print JSON ABI
async fn cmd_abi(conn: &ConnectionArgs, name: &str) -> Result<()> {
    let ens = connect(conn)?;
    let resolver = ens.resolver(name).await.context("Failed to find resolver")?;

    let abi = resolver.abi_json().await.with_context(|| {
        format!("Failed to fetch ABI (content type {ABI_CONTENT_JSON})")
    })?;
    println!("{}", serde_json::to_string_pretty(&abi)?);
    Ok(())
}

/// Legacy has() check
async fn cmd_has(conn: &ConnectionArgs, name: &str, kind: &str) -> Result<()> {
    let ens = connect(conn)?;
    let resolver = ens.resolver(name).await.context("Failed to find resolver")?;
    let has = resolver.has(kind).await.context("has() call failed")?;

    if has {
        println!("   {} {} has a {} record", "✅".green(), name, kind);
    } else {
        println!("   {} {} has no {} record", "❌".red(), name, kind);
    }
    Ok(())
}

/// Confirm, submit, and optionally wait for a transaction
async fn send<F>(ens: &Ens, action: &str, args: &TxArgs, submit: F) -> Result<()>
where
    F: Future<Output = ens_core::Result<B256>>,
{
    println!("{} {}", "📝 About to".cyan().bold(), action);

    if !args.yes {
        let confirmed = Confirm::new()
            .with_prompt("Send transaction?")
            .default(false)
            .interact()?;
        if !confirmed {
            debug!(action, "Transaction declined");
            println!("{}", "Aborted.".yellow());
            return Ok(());
        }
    }

    let tx_hash = submit.await.context("Transaction failed")?;
    info!(%tx_hash, action, "Transaction submitted");
    println!("   {} {}", "Transaction:".green(), tx_hash);

    if args.wait {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        pb.set_message("Waiting for receipt...");
        pb.enable_steady_tick(Duration::from_millis(100));

        let receipt = ens.wait_for_receipt(tx_hash).await;
        pb.finish_and_clear();

        let receipt = receipt.context("Failed to get receipt")?;
        let block = receipt
            .block_number
            .map(|b| b.to_string())
            .unwrap_or_else(|| "pending".into());

        if receipt.succeeded() {
            println!("   {} Mined in block {}", "✅".green(), block);
        } else {
            warn!(%tx_hash, block = %block, "Transaction reverted");
            println!("   {} Reverted in block {}", "❌".red(), block);
        }
    }

    Ok(())
}
