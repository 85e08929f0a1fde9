use crate::error::Result;
use crate::utils::output;
use bitcoin::{Network, key::Secp256k1};
use serde_json::json;
use swaplock::{ByteInput, Keypair};

pub struct KeyCommand;

impl KeyCommand {
    pub fn execute(private_key: &str, network: Network) -> Result<()> {
        let keypair =
            Keypair::from_private_key(&Secp256k1::new(), ByteInput::from(private_key), network)?;

        output::print_json(&json!({
            "publicKey": hex::encode(keypair.public_key_bytes()),
            "privateKeyEncoded": keypair.to_wif(),
        }))
    }
}
