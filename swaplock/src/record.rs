//! The persisted contract record exchanged with the funding and broadcast tooling.
//!
//! ```json
//! {
//!   "secret": { "preimage": "..", "hash": ".." },
//!   "contract": { "address": "..", "scriptHex": "..", "scriptHash": ".." },
//!   "claimerKey": { "publicKey": "..", "privateKeyEncoded": ".." },
//!   "refunderKey": { "publicKey": "..", "privateKeyEncoded": ".." },
//!   "timeout": { "blocks": 144 }
//! }
//! ```

use bitcoin::{Network, key::Secp256k1, secp256k1::All};
use serde::{Deserialize, Serialize};

use crate::{
    contract::{Contract, ContractParams},
    error::{Result, SwapError},
    keys::Keypair,
    secret::Secret,
    validation::{self, ByteInput, SECRET_LEN},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretRecord {
    /// Only the party that generated the secret knows the preimage until it is revealed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preimage: Option<String>,
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractInfo {
    pub address: String,
    pub script_hex: String,
    pub script_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyRecord {
    pub public_key: String,
    /// WIF encoding of the private key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key_encoded: Option<String>,
}

impl KeyRecord {
    #[must_use]
    pub fn public(public_key: &[u8; 33]) -> Self {
        Self {
            public_key: hex::encode(public_key),
            private_key_encoded: None,
        }
    }

    #[must_use]
    pub fn from_keypair(keypair: &Keypair) -> Self {
        Self {
            public_key: hex::encode(keypair.public_key_bytes()),
            private_key_encoded: Some(keypair.to_wif()),
        }
    }

    /// Decodes the stored private key, if any, and checks it against the stored public key.
    pub fn keypair(&self, secp: &Secp256k1<All>, network: Network) -> Result<Option<Keypair>> {
        let Some(wif) = &self.private_key_encoded else {
            return Ok(None);
        };
        let keypair = Keypair::from_wif(secp, wif, network)?;
        let public_key = validation::public_key("publicKey", ByteInput::from(&self.public_key))?;
        if keypair.public_key_bytes() != public_key {
            return Err(SwapError::validation(
                "privateKey",
                "encoded private key does not match publicKey",
            ));
        }
        Ok(Some(keypair))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutRecord {
    pub blocks: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractRecord {
    pub secret: SecretRecord,
    pub contract: ContractInfo,
    pub claimer_key: KeyRecord,
    pub refunder_key: KeyRecord,
    pub timeout: TimeoutRecord,
}

impl ContractRecord {
    #[must_use]
    pub fn new(
        contract: &Contract,
        secret: Option<&Secret>,
        claimer_key: KeyRecord,
        refunder_key: KeyRecord,
    ) -> Self {
        let params = contract.params();
        Self {
            secret: SecretRecord {
                preimage: secret.map(|secret| hex::encode(secret.preimage())),
                hash: hex::encode(params.hash),
            },
            contract: ContractInfo {
                address: contract.address().to_string(),
                script_hex: contract.script_hex(),
                script_hash: hex::encode(contract.script_hash()),
            },
            claimer_key,
            refunder_key,
            timeout: TimeoutRecord {
                blocks: params.timeout,
            },
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| SwapError::validation("record", format!("malformed contract record: {e}")))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SwapError::Construction(format!("record serialization: {e}")))
    }

    /// Recomputes the contract from the hash, public keys and timeout and checks that it
    /// matches the stored script, script hash and address.
    pub fn rebuild(&self, network: Network) -> Result<Contract> {
        let params = ContractParams::new(
            ByteInput::from(&self.secret.hash),
            ByteInput::from(&self.claimer_key.public_key),
            ByteInput::from(&self.refunder_key.public_key),
            u64::from(self.timeout.blocks),
        )?;
        let contract = Contract::build(params, network)?;

        let stored = validation::contract_script(ByteInput::from(&self.contract.script_hex))?;
        if contract.script() != stored.as_script() {
            return Err(SwapError::validation(
                "scriptHex",
                "stored script differs from the one rebuilt from hash, keys and timeout",
            ));
        }
        if !self
            .contract
            .script_hash
            .eq_ignore_ascii_case(&hex::encode(contract.script_hash()))
        {
            return Err(SwapError::validation(
                "scriptHex",
                "stored script hash does not match the script",
            ));
        }
        if self.contract.address != contract.address().to_string() {
            return Err(SwapError::validation(
                "scriptHex",
                format!(
                    "stored address {} does not match {} on {network}",
                    self.contract.address,
                    contract.address()
                ),
            ));
        }
        Ok(contract)
    }

    /// The stored preimage, if present.
    pub fn preimage(&self) -> Result<Option<[u8; SECRET_LEN]>> {
        self.secret
            .preimage
            .as_ref()
            .map(|preimage| validation::secret(ByteInput::from(preimage)))
            .transpose()
    }
}
