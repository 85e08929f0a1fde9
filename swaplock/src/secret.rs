use std::fmt;

use bitcoin_hashes::sha256 as sha256_hash;
use rand::{RngCore, rngs::OsRng};

use crate::validation::{HASH_LEN, SECRET_LEN};

/// `Secret` is a swap preimage together with its public hash commitment.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret {
    preimage: [u8; SECRET_LEN],
    hash: [u8; HASH_LEN],
}

impl Secret {
    /// Draws a fresh preimage from the operating system's entropy source.
    #[must_use]
    pub fn generate() -> Self {
        let mut preimage = [0u8; SECRET_LEN];
        OsRng.fill_bytes(&mut preimage);
        Self::from_preimage(preimage)
    }

    #[must_use]
    pub fn from_preimage(preimage: [u8; SECRET_LEN]) -> Self {
        Self {
            preimage,
            hash: sha256(&preimage),
        }
    }

    #[must_use]
    pub fn preimage(&self) -> &[u8; SECRET_LEN] {
        &self.preimage
    }

    #[must_use]
    pub fn hash(&self) -> &[u8; HASH_LEN] {
        &self.hash
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secret")
            .field("preimage", &"<redacted>")
            .field("hash", &hex::encode(self.hash))
            .finish()
    }
}

#[must_use]
pub fn sha256(data: &[u8]) -> [u8; HASH_LEN] {
    *sha256_hash::Hash::hash(data).as_byte_array()
}

/// Whether `preimage` opens the commitment `hash`.
#[must_use]
pub fn verify_preimage(preimage: &[u8], hash: &[u8; HASH_LEN]) -> bool {
    sha256(preimage) == *hash
}
