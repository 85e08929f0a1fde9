use crate::error::{CliError, Result};
use crate::utils::{file_ops, output};
use bitcoin::{Network, key::Secp256k1};
use clap::Args;
use serde_json::json;
use std::path::PathBuf;
use swaplock::{
    ByteInput, ClaimRequest, ContractRecord, RefundRequest, SpendBuilder, SpendRequest,
    SpendTransaction,
    record::{KeyRecord, SecretRecord},
    validation::{self, SECRET_LEN},
    verify_preimage,
};

#[derive(Args, Debug)]
pub struct SpendArgs {
    #[arg(long, help = "Path to the contract record written by the contract command")]
    pub record: PathBuf,
    #[arg(long, help = "Id of the transaction that funded the contract address")]
    pub prev_txid: String,
    #[arg(long, help = "Index of the contract output in the funding transaction")]
    pub output_index: u64,
    #[arg(long, help = "Value of the contract output in satoshis")]
    pub amount: u64,
    #[arg(long, help = "Address receiving the funds")]
    pub destination: String,
    #[arg(long, help = "Absolute fee in satoshis")]
    pub fee: u64,
    #[arg(
        long,
        help = "Hex private key to sign with, defaults to the WIF key stored in the record"
    )]
    pub private_key: Option<String>,
}

/// Resolves the signing key as hex, preferring `--private-key` over the record's stored key.
fn signing_key(
    private_key: Option<&str>,
    key_record: &KeyRecord,
    network: Network,
) -> Result<String> {
    if let Some(private_key) = private_key {
        return Ok(private_key.to_string());
    }
    match key_record.keypair(&Secp256k1::new(), network)? {
        Some(keypair) => Ok(hex::encode(keypair.secret_bytes())),
        None => Err(CliError::InvalidInput(
            "no --private-key given and the record holds no private key".to_string(),
        )),
    }
}

/// Resolves the claim preimage, preferring `--secret` over the record's stored preimage, and
/// checks it against the record hash unless `skip_preimage_check` is set.
fn claim_secret(
    secret: Option<&str>,
    record: &SecretRecord,
    skip_preimage_check: bool,
) -> Result<[u8; SECRET_LEN]> {
    let Some(text) = secret.or(record.preimage.as_deref()) else {
        return Err(CliError::InvalidInput(
            "no --secret given and the record holds no preimage".to_string(),
        ));
    };
    let preimage = validation::secret(ByteInput::from(text))?;

    if !skip_preimage_check {
        let hash = validation::hash(ByteInput::from(&record.hash))?;
        if !verify_preimage(&preimage, &hash) {
            return Err(CliError::InvalidInput(
                "secret does not hash to the contract hash (use --skip-preimage-check to build anyway)"
                    .to_string(),
            ));
        }
    }
    Ok(preimage)
}

fn spend_request<'a>(
    args: &'a SpendArgs,
    private_key: &'a str,
    script_hex: &'a str,
) -> SpendRequest<'a> {
    SpendRequest {
        prev_txid: &args.prev_txid,
        output_index: args.output_index,
        amount: args.amount,
        private_key: ByteInput::from(private_key),
        contract_script: ByteInput::from(script_hex),
        destination: &args.destination,
        fee: args.fee,
    }
}

fn print_spend(spend: &SpendTransaction) -> Result<()> {
    let witness: Vec<String> = spend.witness().items().iter().map(hex::encode).collect();
    output::print_json(&json!({
        "txid": spend.txid().to_string(),
        "hex": spend.hex(),
        "vsize": spend.vsize(),
        "witness": witness,
    }))
}

fn load_record(args: &SpendArgs, network: Network) -> Result<(ContractRecord, String)> {
    let record = file_ops::read_record(&args.record)?;
    let script_hex = record.rebuild(network)?.script_hex();
    Ok((record, script_hex))
}

pub struct ClaimCommand;

impl ClaimCommand {
    pub fn execute(
        args: &SpendArgs,
        secret: Option<&str>,
        skip_preimage_check: bool,
        network: Network,
    ) -> Result<()> {
        let (record, script_hex) = load_record(args, network)?;
        let secret = claim_secret(secret, &record.secret, skip_preimage_check)?;

        let private_key = signing_key(args.private_key.as_deref(), &record.claimer_key, network)?;
        let spend = SpendBuilder::new(network).build_claim(&ClaimRequest {
            spend: spend_request(args, &private_key, &script_hex),
            secret: ByteInput::from(&secret),
        })?;
        print_spend(&spend)
    }
}

pub struct RefundCommand;

impl RefundCommand {
    pub fn execute(args: &SpendArgs, network: Network) -> Result<()> {
        let (record, script_hex) = load_record(args, network)?;
        let private_key =
            signing_key(args.private_key.as_deref(), &record.refunder_key, network)?;

        let spend = SpendBuilder::new(network).build_refund(&RefundRequest {
            spend: spend_request(args, &private_key, &script_hex),
            timeout: Some(u64::from(record.timeout.blocks)),
        })?;
        print_spend(&spend)
    }
}
