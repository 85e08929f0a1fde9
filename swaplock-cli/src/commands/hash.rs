use crate::error::Result;
use crate::utils::output;
use serde_json::json;
use swaplock::{ByteInput, sha256};

pub struct HashCommand;

impl HashCommand {
    pub fn execute(data: &str) -> Result<()> {
        let bytes = ByteInput::from(data).to_bytes("data")?;
        output::print_json(&json!({ "sha256": hex::encode(sha256(&bytes)) }))
    }
}
