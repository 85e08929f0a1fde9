pub mod contract;
pub mod error;
pub mod keys;
pub mod record;
pub mod script_num;
pub mod secret;
pub mod spend;
pub mod validation;
pub mod witness;

#[cfg(test)]
pub(crate) mod test_utils;

pub use contract::{Contract, ContractParams, decode_funding_address};
pub use error::{Result, SwapError};
pub use keys::Keypair;
pub use record::ContractRecord;
pub use secret::{Secret, sha256, verify_preimage};
pub use spend::{ClaimRequest, RefundRequest, SpendBuilder, SpendRequest, SpendTransaction};
pub use validation::ByteInput;
pub use witness::WitnessStack;
