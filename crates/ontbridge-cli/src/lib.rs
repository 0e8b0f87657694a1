use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use ontbridge::{ArgType, DapiConfig, Platform, convert_value, query_balance, str_to_hex};

#[derive(Parser, Debug)]
#[command(name = "ontbridge")]
#[command(about = "Ontology dApp wallet bridge tools")]
pub struct OntbridgeCli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Print the wallet platform (desktop or mobile)
    Platform {
        /// Classify this user agent instead of using the configured platform
        #[arg(long)]
        user_agent: Option<String>,
    },
    /// Convert a raw argument to its extension wire value
    Convert {
        value: String,
        /// Boolean, Integer, ByteArray or String
        arg_type: String,
    },
    /// Print every asset balance of an address
    Balance { address: String },
    /// Wait for a contract notification emitted by a transaction
    Notify {
        txhash: String,
        script_hash: String,
        #[arg(long)]
        interval_ms: Option<u64>,
        #[arg(long)]
        timeout_secs: Option<u64>,
        #[arg(long)]
        max_attempts: Option<u32>,
    },
}

pub async fn run(cli: OntbridgeCli) -> Result<()> {
    let config = DapiConfig::from_env().context("failed to load ONTBRIDGE_* configuration")?;

    match cli.command {
        Commands::Platform { user_agent } => {
            let platform = user_agent
                .as_deref()
                .map_or(config.platform, Platform::detect);
            println!("{platform}");
        }
        Commands::Convert { value, arg_type } => {
            let arg_type = arg_type.parse::<ArgType>()?;
            let converted = convert_value(&value, arg_type, str_to_hex)?;
            println!("{}", serde_json::to_string(&converted)?);
        }
        Commands::Balance { address } => {
            let client = config.explorer_client()?;
            let balances = query_balance(&client, &address)
                .await
                .with_context(|| format!("balance query for {address} failed"))?;
            println!("{}", serde_json::to_string_pretty(&balances)?);
        }
        Commands::Notify {
            txhash,
            script_hash,
            interval_ms,
            timeout_secs,
            max_attempts,
        } => {
            let mut policy = config.poll;
            if let Some(interval_ms) = interval_ms {
                policy = policy.with_interval(Duration::from_millis(interval_ms));
            }
            if let Some(timeout_secs) = timeout_secs {
                policy = policy.with_timeout(Duration::from_secs(timeout_secs));
            }
            if let Some(max_attempts) = max_attempts {
                policy = policy.with_max_attempts(max_attempts);
            }

            let poller = config.notify_poller()?.with_policy(policy);
            let handle = poller.spawn(txhash, script_hash);
            let canceller = handle.canceller();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("interrupt received, cancelling poll");
                    canceller.cancel();
                }
            });

            let result = handle.wait().await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }
    Ok(())
}
