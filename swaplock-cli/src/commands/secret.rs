use crate::error::Result;
use crate::utils::output;
use serde_json::json;
use swaplock::Secret;

pub struct SecretCommand;

impl SecretCommand {
    pub fn execute() -> Result<()> {
        let secret = Secret::generate();
        log::info!("Generated secret with hash {}", hex::encode(secret.hash()));

        output::print_json(&json!({
            "preimage": hex::encode(secret.preimage()),
            "hash": hex::encode(secret.hash()),
        }))
    }
}
