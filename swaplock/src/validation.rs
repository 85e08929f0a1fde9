//! Input normalisation and checks that run before any key or script work.
//!
//! Every byte-valued parameter enters through [`ByteInput`] so that the rest of the crate only
//! ever sees raw bytes of a known length.

use std::str::FromStr;

use bitcoin::{Address, Amount, Network, ScriptBuf, Txid};

use crate::error::{Result, SwapError};

pub const HASH_LEN: usize = 32;
pub const SECRET_LEN: usize = 32;
pub const PRIVATE_KEY_LEN: usize = 32;
pub const PUBLIC_KEY_LEN: usize = 33;
pub const TXID_HEX_LEN: usize = 64;

pub const MIN_TIMEOUT: u32 = 1;
pub const MAX_TIMEOUT: u32 = 0x00FF_FFFF;

/// Consensus limit on the size of a witness script.
pub const MAX_SCRIPT_SIZE: usize = 10_000;

/// `ByteInput` is a byte-valued parameter as presented by a caller, either hex text or raw bytes.
#[derive(Debug, Clone, Copy)]
pub enum ByteInput<'a> {
    Hex(&'a str),
    Raw(&'a [u8]),
}

impl<'a> From<&'a str> for ByteInput<'a> {
    fn from(text: &'a str) -> Self {
        ByteInput::Hex(text)
    }
}

impl<'a> From<&'a String> for ByteInput<'a> {
    fn from(text: &'a String) -> Self {
        ByteInput::Hex(text.as_str())
    }
}

impl<'a> From<&'a [u8]> for ByteInput<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        ByteInput::Raw(bytes)
    }
}

impl<'a> From<&'a Vec<u8>> for ByteInput<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        ByteInput::Raw(bytes.as_slice())
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for ByteInput<'a> {
    fn from(bytes: &'a [u8; N]) -> Self {
        ByteInput::Raw(bytes.as_slice())
    }
}

impl ByteInput<'_> {
    pub fn to_bytes(&self, field: &'static str) -> Result<Vec<u8>> {
        match self {
            ByteInput::Hex(text) => decode_hex(field, text),
            ByteInput::Raw(bytes) => Ok(bytes.to_vec()),
        }
    }
}

pub fn decode_hex(field: &'static str, text: &str) -> Result<Vec<u8>> {
    if text.is_empty() {
        return Err(SwapError::validation(field, "hex string is empty"));
    }
    hex::decode(text).map_err(|e| match e {
        hex::FromHexError::OddLength => {
            SwapError::validation(field, format!("hex string has odd length {}", text.len()))
        }
        hex::FromHexError::InvalidHexCharacter { c, index } => SwapError::validation(
            field,
            format!("invalid hex character {c:?} at position {index}"),
        ),
        hex::FromHexError::InvalidStringLength => SwapError::validation(field, e.to_string()),
    })
}

fn fixed_bytes<const N: usize>(
    field: &'static str,
    what: &str,
    input: ByteInput<'_>,
) -> Result<[u8; N]> {
    let bytes = input.to_bytes(field)?;
    <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| {
        SwapError::validation(
            field,
            format!("{what} length must be {N} bytes, got {}", bytes.len()),
        )
    })
}

pub fn secret(input: ByteInput<'_>) -> Result<[u8; SECRET_LEN]> {
    fixed_bytes("secret", "secret", input)
}

pub fn hash(input: ByteInput<'_>) -> Result<[u8; HASH_LEN]> {
    fixed_bytes("hash", "hash", input)
}

pub fn private_key(input: ByteInput<'_>) -> Result<[u8; PRIVATE_KEY_LEN]> {
    fixed_bytes("privateKey", "private key", input)
}

/// Checks the length of a compressed public key. Curve membership is checked by `keys`.
pub fn public_key(field: &'static str, input: ByteInput<'_>) -> Result<[u8; PUBLIC_KEY_LEN]> {
    let bytes: [u8; PUBLIC_KEY_LEN] = fixed_bytes(field, "public key", input)?;
    if bytes[0] != 0x02 && bytes[0] != 0x03 {
        return Err(SwapError::validation(
            field,
            format!("public key must be compressed, got prefix {:#04x}", bytes[0]),
        ));
    }
    Ok(bytes)
}

pub fn contract_script(input: ByteInput<'_>) -> Result<ScriptBuf> {
    let bytes = input.to_bytes("contractScript")?;
    if bytes.is_empty() {
        return Err(SwapError::validation("contractScript", "script is empty"));
    }
    if bytes.len() > MAX_SCRIPT_SIZE {
        return Err(SwapError::validation(
            "contractScript",
            format!(
                "script is {} bytes, limit is {MAX_SCRIPT_SIZE}",
                bytes.len()
            ),
        ));
    }
    Ok(ScriptBuf::from_bytes(bytes))
}

/// Parses a transaction id given in its usual (byte-reversed) hex display form.
pub fn prev_txid(text: &str) -> Result<Txid> {
    if text.len() != TXID_HEX_LEN {
        return Err(SwapError::validation(
            "prevTxId",
            format!(
                "prevTxId must be exactly {TXID_HEX_LEN} hex characters, got {}",
                text.len()
            ),
        ));
    }
    Txid::from_str(text)
        .map_err(|e| SwapError::validation("prevTxId", format!("prevTxId is not hex: {e}")))
}

pub fn output_index(index: u64) -> Result<u32> {
    u32::try_from(index).map_err(|_| {
        SwapError::validation(
            "outputIndex",
            format!("output index {index} exceeds {}", u32::MAX),
        )
    })
}

pub fn amount(sats: u64) -> Result<Amount> {
    if sats == 0 {
        return Err(SwapError::validation("amount", "amount must be positive"));
    }
    if sats > Amount::MAX_MONEY.to_sat() {
        return Err(SwapError::validation(
            "amount",
            format!("amount {sats} exceeds the maximum money supply"),
        ));
    }
    Ok(Amount::from_sat(sats))
}

/// Checks `0 < fee < amount` and returns the value left for the spend output.
pub fn fee(amount: Amount, fee: u64) -> Result<Amount> {
    if fee == 0 {
        return Err(SwapError::validation("fee", "fee must be positive"));
    }
    if fee >= amount.to_sat() {
        return Err(SwapError::validation(
            "fee",
            format!(
                "fee ({fee}) must be less than amount ({})",
                amount.to_sat()
            ),
        ));
    }
    Ok(amount - Amount::from_sat(fee))
}

pub fn timeout(blocks: u64) -> Result<u32> {
    match u32::try_from(blocks) {
        Ok(blocks) if (MIN_TIMEOUT..=MAX_TIMEOUT).contains(&blocks) => Ok(blocks),
        _ => Err(SwapError::validation(
            "timeout",
            format!("timeout {blocks} is outside [{MIN_TIMEOUT}, {MAX_TIMEOUT:#x}]"),
        )),
    }
}

/// Decodes `address` and requires it to belong to `network`.
pub fn destination(address: &str, network: Network) -> Result<Address> {
    Address::from_str(address)
        .and_then(|unchecked| unchecked.require_network(network))
        .map_err(|e| {
            SwapError::validation(
                "destination",
                format!("address {address:?} is not valid on {network}: {e}"),
            )
        })
}
