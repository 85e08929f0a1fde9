use bitcoin::{
    Network, NetworkKind, PrivateKey, PublicKey,
    key::Secp256k1,
    secp256k1::{self, All},
};

use crate::{
    error::{Result, SwapError},
    validation::{self, ByteInput},
};

/// `Keypair` is a signing key and its compressed public key, scoped to one network.
#[derive(Clone)]
pub struct Keypair {
    private_key: PrivateKey,
    public_key: PublicKey,
}

impl Keypair {
    /// Derives a keypair from 32 raw private key bytes. Zero and values at or above the group
    /// order are rejected.
    pub fn from_private_key(
        secp: &Secp256k1<All>,
        input: ByteInput<'_>,
        network: Network,
    ) -> Result<Self> {
        let bytes = validation::private_key(input)?;
        let private_key = PrivateKey::from_slice(&bytes, NetworkKind::from(network))
            .map_err(|e| SwapError::Cryptographic(format!("invalid private key: {e}")))?;
        Ok(Self::from_bitcoin(secp, private_key))
    }

    /// Decodes a WIF encoded private key, which must be for `network` and compressed.
    pub fn from_wif(secp: &Secp256k1<All>, wif: &str, network: Network) -> Result<Self> {
        let private_key = PrivateKey::from_wif(wif)
            .map_err(|e| SwapError::Cryptographic(format!("invalid WIF private key: {e}")))?;
        if private_key.network != NetworkKind::from(network) {
            return Err(SwapError::validation(
                "privateKey",
                format!("WIF key is not for {network}"),
            ));
        }
        if !private_key.compressed {
            return Err(SwapError::validation(
                "privateKey",
                "WIF key must use a compressed public key",
            ));
        }
        Ok(Self::from_bitcoin(secp, private_key))
    }

    fn from_bitcoin(secp: &Secp256k1<All>, private_key: PrivateKey) -> Self {
        let public_key = private_key.public_key(secp);
        Self {
            private_key,
            public_key,
        }
    }

    #[must_use]
    pub fn secret_key(&self) -> &secp256k1::SecretKey {
        &self.private_key.inner
    }

    #[must_use]
    pub fn secret_bytes(&self) -> [u8; 32] {
        self.private_key.inner.secret_bytes()
    }

    #[must_use]
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    #[must_use]
    pub fn public_key_bytes(&self) -> [u8; 33] {
        self.public_key.inner.serialize()
    }

    #[must_use]
    pub fn to_wif(&self) -> String {
        self.private_key.to_wif()
    }
}

/// Parses a 33-byte compressed public key and checks that it is a point on the curve.
pub fn parse_public_key(field: &'static str, input: ByteInput<'_>) -> Result<secp256k1::PublicKey> {
    let bytes = validation::public_key(field, input)?;
    secp256k1::PublicKey::from_slice(&bytes)
        .map_err(|e| SwapError::Cryptographic(format!("{field} is not a valid curve point: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Private key 1 maps to the generator point.
    const GENERATOR: &str = "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";

    fn one() -> [u8; 32] {
        let mut key = [0u8; 32];
        key[31] = 1;
        key
    }

    #[test]
    fn test_derive_generator() {
        let secp = Secp256k1::new();
        let keypair = Keypair::from_private_key(&secp, ByteInput::from(&one()), Network::Regtest)
            .unwrap();
        assert_eq!(hex::encode(keypair.public_key_bytes()), GENERATOR);
    }

    #[test]
    fn test_hex_and_bytes_derive_same_key() {
        let secp = Secp256k1::new();
        let hex_key = hex::encode(one());
        let a = Keypair::from_private_key(&secp, ByteInput::from(&hex_key), Network::Regtest)
            .unwrap();
        let b = Keypair::from_private_key(&secp, ByteInput::from(&one()), Network::Regtest)
            .unwrap();
        assert_eq!(a.public_key(), b.public_key());
    }

    #[test]
    fn test_reject_invalid_scalars() {
        let secp = Secp256k1::new();
        let zero = [0u8; 32];
        let err =
            Keypair::from_private_key(&secp, ByteInput::from(&zero), Network::Regtest).err();
        assert!(matches!(err, Some(SwapError::Cryptographic(_))));

        let above_order = [0xffu8; 32];
        let err = Keypair::from_private_key(&secp, ByteInput::from(&above_order), Network::Regtest)
            .err();
        assert!(matches!(err, Some(SwapError::Cryptographic(_))));
    }

    #[test]
    fn test_short_key_is_validation_error() {
        let secp = Secp256k1::new();
        let err = Keypair::from_private_key(&secp, ByteInput::from(&[1u8; 31]), Network::Regtest)
            .err()
            .unwrap();
        assert_eq!(err.field(), Some("privateKey"));
    }

    #[test]
    fn test_wif_roundtrip_and_network() {
        let secp = Secp256k1::new();
        let keypair =
            Keypair::from_private_key(&secp, ByteInput::from(&[0x11; 32]), Network::Testnet)
                .unwrap();
        let wif = keypair.to_wif();

        let decoded = Keypair::from_wif(&secp, &wif, Network::Regtest).unwrap();
        assert_eq!(decoded.public_key(), keypair.public_key());

        let err = Keypair::from_wif(&secp, &wif, Network::Bitcoin).err().unwrap();
        assert_eq!(err.field(), Some("privateKey"));
    }

    #[test]
    fn test_parse_public_key() {
        assert!(parse_public_key("publicKey", ByteInput::from(GENERATOR)).is_ok());

        // Valid prefix, x coordinate not on the curve
        let mut off_curve = [0u8; 33];
        off_curve[0] = 0x02;
        off_curve[32] = 0x05;
        let err = parse_public_key("publicKey", ByteInput::from(&off_curve)).unwrap_err();
        assert!(matches!(err, SwapError::Cryptographic(_)));
    }
}
