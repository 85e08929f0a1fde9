use crate::error::Result;
use crate::utils::{file_ops, output};
use bitcoin::Network;
use serde_json::json;
use std::path::Path;
use swaplock::decode_funding_address;

pub struct InspectCommand;

impl InspectCommand {
    pub fn execute(record_path: &Path, network: Network) -> Result<()> {
        let record = file_ops::read_record(record_path)?;
        let contract = record.rebuild(network)?;
        let committed = decode_funding_address(&record.contract.address, network)?;

        output::print_json(&json!({
            "address": contract.address().to_string(),
            "scriptHash": hex::encode(contract.script_hash()),
            "addressCommitsToScript": committed == *contract.script_hash(),
            "asm": contract.disassembly(),
            "timeout": contract.params().timeout,
            "hasPreimage": record.secret.preimage.is_some(),
        }))
    }
}
