pub mod contract;
pub mod hash;
pub mod inspect;
pub mod key;
pub mod secret;
pub mod spend;

pub use contract::ContractCommand;
pub use hash::HashCommand;
pub use inspect::InspectCommand;
pub use key::KeyCommand;
pub use secret::SecretCommand;
pub use spend::{ClaimCommand, RefundCommand, SpendArgs};
