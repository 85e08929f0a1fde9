use crate::error::Result;
use crate::utils::{file_ops, output};
use bitcoin::Network;
use serde_json::json;
use std::path::Path;
use swaplock::{ByteInput, Contract, ContractParams, ContractRecord, Secret, record::KeyRecord};

pub struct ContractCommand;

impl ContractCommand {
    /// Builds a contract from a given hash, or from a freshly generated secret when `hash` is
    /// `None`. The generated preimage is only ever written to the record file.
    pub fn execute(
        hash: Option<&str>,
        claimer_pubkey: &str,
        refunder_pubkey: &str,
        timeout: u64,
        output_path: Option<&Path>,
        network: Network,
    ) -> Result<()> {
        let secret = hash.is_none().then(Secret::generate);
        let hash = match &secret {
            Some(secret) => ByteInput::from(secret.hash()),
            None => ByteInput::from(hash.unwrap_or_default()),
        };

        let params = ContractParams::new(
            hash,
            ByteInput::from(claimer_pubkey),
            ByteInput::from(refunder_pubkey),
            timeout,
        )?;
        let contract = Contract::build(params, network)?;
        log::info!("Funding address: {}", contract.address());

        let record = ContractRecord::new(
            &contract,
            secret.as_ref(),
            KeyRecord::public(&contract.params().claimer.serialize()),
            KeyRecord::public(&contract.params().refunder.serialize()),
        );
        if let Some(path) = output_path {
            file_ops::write_record(path, &record)?;
        } else if secret.is_some() {
            log::warn!("No --output given, the generated preimage is not persisted");
        }

        output::print_json(&json!({
            "address": contract.address().to_string(),
            "scriptHex": contract.script_hex(),
            "scriptHash": hex::encode(contract.script_hash()),
            "asm": contract.disassembly(),
            "hash": record.secret.hash,
            "timeout": contract.params().timeout,
        }))
    }
}
