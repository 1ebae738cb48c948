//! `flow-lifecycle`: command-line front end for the Flow transaction
//! lifecycle.
//!
//! ```text
//! flow-lifecycle [--config FILE] [--api-url URL] <command>
//!
//!   account <address>            account with keys, as JSON
//!   balance <address>            FLOW balance
//!   create-account --public-key  create an account, print its address
//!   transfer --to --amount       send FLOW from the configured signer
//!   await <tx-id>                wait for an existing transaction's seal
//!   generate-key                 print a fresh key pair
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::json;

use flow_lifecycle::access::{Address, HttpAccessClient, Identifier, TransactionResult};
use flow_lifecycle::app::{generate_key, ClientSettings, FlowClient, NewAccountKey, SigningAccount};
use flow_lifecycle::config::{load_config, validate_config, ClientConfig, ConfigError};
use flow_lifecycle::crypto::{HashAlgorithm, PrivateKey, PublicKey, SignatureAlgorithm};
use flow_lifecycle::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "flow-lifecycle")]
#[command(about = "Build, sign, submit and confirm Flow transactions", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `access.api_url`.
    #[arg(long)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show an account and its keys
    Account { address: String },
    /// Show an account's FLOW balance
    Balance { address: String },
    /// Create an account paid for by the configured signer
    CreateAccount {
        /// Hex public key (64 bytes, X ‖ Y)
        #[arg(long)]
        public_key: String,
        #[arg(long, default_value = "ECDSA_P256")]
        sign_algo: String,
        #[arg(long, default_value = "SHA3_256")]
        hash_algo: String,
        #[arg(long, default_value_t = flow_lifecycle::app::FULL_KEY_WEIGHT)]
        weight: u32,
    },
    /// Transfer FLOW from the configured signer
    Transfer {
        #[arg(long)]
        to: String,
        /// Amount with exactly 8 decimal places, e.g. 10.00000000
        #[arg(long)]
        amount: String,
    },
    /// Wait for a submitted transaction to be sealed
    Await { tx_id: String },
    /// Generate a key pair
    GenerateKey {
        #[arg(long, default_value = "ECDSA_P256")]
        algorithm: String,
    },
}

fn load(cli: &Cli) -> Result<ClientConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ClientConfig::default(),
    };
    if let Some(api_url) = &cli.api_url {
        config.access.api_url = api_url.clone();
        validate_config(&config).map_err(ConfigError::Validation)?;
    }
    Ok(config)
}

fn configured_signer(config: &ClientConfig) -> Result<SigningAccount, Box<dyn std::error::Error>> {
    let algorithm: SignatureAlgorithm = config.signer.signature_algorithm.parse()?;
    Ok(SigningAccount {
        address: config.signer.address.parse()?,
        key_index: config.signer.key_index,
        private_key: PrivateKey::from_env(&config.signer.private_key_env, algorithm)?,
    })
}

fn result_json(result: &TransactionResult) -> serde_json::Value {
    json!({
        "transaction_id": result.transaction_id,
        "status": result.status.as_str(),
        "block_id": result.block_id,
        "events": result.events.iter().map(|e| e.event_type.as_str()).collect::<Vec<_>>(),
    })
}

fn print(value: &serde_json::Value) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load(&cli)?;

    logging::init_logging(&config.observability);

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    if let Commands::GenerateKey { algorithm } = &cli.command {
        let (private_key, public_key) = generate_key(algorithm.parse()?);
        return print(&json!({
            "algorithm": public_key.algorithm(),
            "private_key": private_key.to_hex(),
            "public_key": public_key.to_hex(),
        }));
    }

    let api = Arc::new(HttpAccessClient::new(&config.access)?);
    let mut client = FlowClient::new(api, ClientSettings::from(&config));

    let cancel = client.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, cancelling");
            cancel.cancel();
        }
    });

    match cli.command {
        Commands::Account { address } => {
            let account = client.get_account(&address.parse::<Address>()?).await?;
            print(&serde_json::to_value(&account)?)?;
        }
        Commands::Balance { address } => {
            let address: Address = address.parse()?;
            let balance = client.get_account_balance(&address).await?;
            print(&json!({ "address": address, "balance": balance }))?;
        }
        Commands::CreateAccount {
            public_key,
            sign_algo,
            hash_algo,
            weight,
        } => {
            let signer = configured_signer(&config)?;
            let payer = signer.address;
            client.add_signer(signer);

            let key = NewAccountKey {
                public_key: PublicKey::from_hex(&public_key, sign_algo.parse()?)?,
                hash_algo: hash_algo.parse::<HashAlgorithm>()?,
                weight,
            };
            let address = client.create_account(payer, &key).await?;
            print(&json!({ "address": address.to_prefixed_hex() }))?;
        }
        Commands::Transfer { to, amount } => {
            let signer = configured_signer(&config)?;
            let sender = signer.address;
            client.add_signer(signer);

            let result = client
                .transfer_tokens(sender, to.parse()?, &amount)
                .await?;
            print(&result_json(&result))?;
        }
        Commands::Await { tx_id } => {
            let tx_id: Identifier = tx_id.parse()?;
            let result = client
                .poller()
                .await_seal(&tx_id, &client.cancellation_token())
                .await?;
            print(&result_json(&result))?;
        }
        Commands::GenerateKey { .. } => {}
    }

    Ok(())
}
