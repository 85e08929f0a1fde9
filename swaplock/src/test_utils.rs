//! Deterministic fixtures shared by the unit tests.

use bitcoin::{Address, CompressedPublicKey, Network, key::Secp256k1};

use crate::{
    contract::{Contract, ContractParams},
    keys::Keypair,
    secret::Secret,
    validation::ByteInput,
};

pub const NETWORK: Network = Network::Regtest;
pub const CLAIMER_KEY: [u8; 32] = [0x11; 32];
pub const REFUNDER_KEY: [u8; 32] = [0x22; 32];
pub const DESTINATION_KEY: [u8; 32] = [0x33; 32];
pub const TIMEOUT: u64 = 144;
pub const FUNDING_TXID: &str = "4f7a5e3c1b2d9e8f0a6c4b3d2e1f0a9b8c7d6e5f4a3b2c1d0e9f8a7b6c5d4e3f";

pub fn keypair(private_key: &[u8; 32]) -> Keypair {
    Keypair::from_private_key(&Secp256k1::new(), ByteInput::from(private_key), NETWORK).unwrap()
}

pub fn secret() -> Secret {
    Secret::from_preimage([0x42; 32])
}

pub fn contract(timeout: u64) -> Contract {
    let claimer = keypair(&CLAIMER_KEY).public_key_bytes();
    let refunder = keypair(&REFUNDER_KEY).public_key_bytes();
    let params = ContractParams::new(
        ByteInput::from(secret().hash()),
        ByteInput::from(&claimer),
        ByteInput::from(&refunder),
        timeout,
    )
    .unwrap();
    Contract::build(params, NETWORK).unwrap()
}

/// A P2WPKH address on [`NETWORK`].
pub fn destination() -> String {
    let public_key = CompressedPublicKey(keypair(&DESTINATION_KEY).public_key().inner);
    Address::p2wpkh(&public_key, NETWORK).to_string()
}
