mod commands;
mod config;
mod error;
mod utils;

use clap::{Parser, Subcommand};
use commands::{
    ClaimCommand, ContractCommand, HashCommand, InspectCommand, KeyCommand, RefundCommand,
    SecretCommand, SpendArgs,
};
use config::NetworkArg;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(
        long,
        global = true,
        value_enum,
        env = "SWAPLOCK_NETWORK",
        default_value = "regtest",
        help = "Bitcoin network used for addresses and key encodings"
    )]
    network: NetworkArg,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a random 32-byte secret and its SHA-256 hash
    Secret,

    /// Hash hex encoded data with SHA-256
    Hash {
        #[arg(help = "Hex encoded data")]
        data: String,
    },

    /// Derive the compressed public key and WIF encoding of a hex private key
    Key {
        #[arg(long, help = "Hex encoded 32-byte private key")]
        private_key: String,
    },

    /// Build an HTLC contract and its P2WSH funding address
    Contract {
        #[arg(
            long,
            help = "Hex SHA-256 hash to lock to, a new secret is generated when omitted"
        )]
        hash: Option<String>,
        #[arg(long, help = "Compressed public key of the party claiming with the secret")]
        claimer_pubkey: String,
        #[arg(long, help = "Compressed public key of the party refunding after the timeout")]
        refunder_pubkey: String,
        #[arg(long, help = "Relative timeout in blocks")]
        timeout: u64,
        #[arg(long, help = "Path the contract record should be written to")]
        output: Option<PathBuf>,
    },

    /// Rebuild a contract record and check it for consistency
    Inspect {
        #[arg(long, help = "Path to the contract record")]
        record: PathBuf,
    },

    /// Build a signed transaction spending the contract through the secret branch
    Claim {
        #[command(flatten)]
        spend: SpendArgs,
        #[arg(long, help = "Hex preimage, defaults to the one stored in the record")]
        secret: Option<String>,
        #[arg(long, help = "Build the claim even if the secret does not match the hash")]
        skip_preimage_check: bool,
    },

    /// Build a signed transaction spending the contract through the timeout branch
    Refund {
        #[command(flatten)]
        spend: SpendArgs,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let cli = Cli::parse();
    let network: bitcoin::Network = cli.network.into();
    log::debug!("Using network: {network}");

    match &cli.command {
        Commands::Secret => SecretCommand::execute()?,
        Commands::Hash { data } => HashCommand::execute(data)?,
        Commands::Key { private_key } => KeyCommand::execute(private_key, network)?,
        Commands::Contract {
            hash,
            claimer_pubkey,
            refunder_pubkey,
            timeout,
            output,
        } => ContractCommand::execute(
            hash.as_deref(),
            claimer_pubkey,
            refunder_pubkey,
            *timeout,
            output.as_deref(),
            network,
        )?,
        Commands::Inspect { record } => InspectCommand::execute(record, network)?,
        Commands::Claim {
            spend,
            secret,
            skip_preimage_check,
        } => ClaimCommand::execute(spend, secret.as_deref(), *skip_preimage_check, network)?,
        Commands::Refund { spend } => RefundCommand::execute(spend, network)?,
    }

    Ok(())
}
