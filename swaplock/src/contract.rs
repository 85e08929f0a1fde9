//! The two-branch HTLC witness script and its P2WSH funding address.
//!
//! ```text
//! OP_IF
//!     OP_SHA256 <hash> OP_EQUALVERIFY <claimer pubkey> OP_CHECKSIG
//! OP_ELSE
//!     <timeout> OP_CSV OP_DROP <refunder pubkey> OP_CHECKSIG
//! OP_ENDIF
//! ```

use bitcoin::{
    Address, Network, Script, ScriptBuf,
    opcodes::{
        Opcode,
        all::{
            OP_CHECKSIG, OP_CSV, OP_DROP, OP_ELSE, OP_ENDIF, OP_EQUALVERIFY, OP_IF,
            OP_PUSHBYTES_0, OP_PUSHNUM_1, OP_PUSHNUM_16, OP_PUSHNUM_NEG1, OP_SHA256,
        },
    },
    script::{Builder, Instruction, PushBytesBuf},
    secp256k1,
};

use crate::{
    error::{Result, SwapError},
    keys::parse_public_key,
    script_num,
    secret::sha256,
    validation::{self, ByteInput, HASH_LEN},
};

/// `ContractParams` are the validated inputs the contract script is a pure function of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractParams {
    pub hash: [u8; HASH_LEN],
    pub claimer: secp256k1::PublicKey,
    pub refunder: secp256k1::PublicKey,
    pub timeout: u32,
}

impl ContractParams {
    pub fn new(
        hash: ByteInput<'_>,
        claimer: ByteInput<'_>,
        refunder: ByteInput<'_>,
        timeout: u64,
    ) -> Result<Self> {
        let hash = validation::hash(hash)?;
        let claimer = validation::public_key("claimerPubKey", claimer)?;
        let refunder = validation::public_key("refunderPubKey", refunder)?;
        let timeout = validation::timeout(timeout)?;

        Ok(Self {
            hash,
            claimer: parse_public_key("claimerPubKey", ByteInput::from(&claimer))?,
            refunder: parse_public_key("refunderPubKey", ByteInput::from(&refunder))?,
            timeout,
        })
    }

    /// Recovers the parameters from a script previously produced by [`ContractParams::to_script`].
    pub fn from_script(script: &Script) -> Result<Self> {
        let instructions = script
            .instructions_minimal()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| malformed(&e.to_string()))?;

        let [
            if_op,
            sha_op,
            hash,
            equal_op,
            claimer,
            claim_sig_op,
            else_op,
            timeout,
            csv_op,
            drop_op,
            refunder,
            refund_sig_op,
            endif_op,
        ] = instructions.as_slice()
        else {
            return Err(malformed(&format!(
                "expected 13 instructions, got {}",
                instructions.len()
            )));
        };

        expect_op(if_op, OP_IF)?;
        expect_op(sha_op, OP_SHA256)?;
        expect_op(equal_op, OP_EQUALVERIFY)?;
        expect_op(claim_sig_op, OP_CHECKSIG)?;
        expect_op(else_op, OP_ELSE)?;
        expect_op(csv_op, OP_CSV)?;
        expect_op(drop_op, OP_DROP)?;
        expect_op(refund_sig_op, OP_CHECKSIG)?;
        expect_op(endif_op, OP_ENDIF)?;

        let timeout = decode_number(timeout)?;
        let timeout = u64::try_from(timeout)
            .map_err(|_| SwapError::validation("timeout", format!("timeout {timeout} is negative")))?;

        Self::new(
            ByteInput::Raw(expect_push(hash)?),
            ByteInput::Raw(expect_push(claimer)?),
            ByteInput::Raw(expect_push(refunder)?),
            timeout,
        )
    }

    pub fn to_script(&self) -> Result<ScriptBuf> {
        let builder = Builder::new()
            .push_opcode(OP_IF)
            .push_opcode(OP_SHA256)
            .push_slice(self.hash)
            .push_opcode(OP_EQUALVERIFY)
            .push_slice(self.claimer.serialize())
            .push_opcode(OP_CHECKSIG)
            .push_opcode(OP_ELSE);

        Ok(push_number(builder, i64::from(self.timeout))?
            .push_opcode(OP_CSV)
            .push_opcode(OP_DROP)
            .push_slice(self.refunder.serialize())
            .push_opcode(OP_CHECKSIG)
            .push_opcode(OP_ENDIF)
            .into_script())
    }
}

fn malformed(what: &str) -> SwapError {
    SwapError::validation(
        "contractScript",
        format!("not an HTLC contract script: {what}"),
    )
}

fn expect_op(instruction: &Instruction<'_>, expected: Opcode) -> Result<()> {
    match instruction {
        Instruction::Op(op) if *op == expected => Ok(()),
        other => Err(malformed(&format!("expected {expected}, got {other:?}"))),
    }
}

fn expect_push<'a>(instruction: &Instruction<'a>) -> Result<&'a [u8]> {
    match *instruction {
        Instruction::PushBytes(bytes) => Ok(bytes.as_bytes()),
        Instruction::Op(op) => Err(malformed(&format!("expected data push, got {op}"))),
    }
}

fn decode_number(instruction: &Instruction<'_>) -> Result<i64> {
    match instruction {
        Instruction::PushBytes(bytes) => {
            script_num::decode(bytes.as_bytes(), script_num::MAX_NUM_LEN)
                .ok_or_else(|| malformed("timeout is not a minimal script number"))
        }
        Instruction::Op(op) if *op == OP_PUSHNUM_NEG1 => Ok(-1),
        Instruction::Op(op)
            if (OP_PUSHNUM_1.to_u8()..=OP_PUSHNUM_16.to_u8()).contains(&op.to_u8()) =>
        {
            Ok(i64::from(op.to_u8() - OP_PUSHNUM_1.to_u8() + 1))
        }
        Instruction::Op(op) => Err(malformed(&format!("expected timeout, got {op}"))),
    }
}

/// Pushes `value` in script-number form, using the small-integer opcodes where they apply.
fn push_number(builder: Builder, value: i64) -> Result<Builder> {
    let encoded = script_num::encode(value);
    Ok(match encoded.as_slice() {
        [] => builder.push_opcode(OP_PUSHBYTES_0),
        [0x81] => builder.push_opcode(OP_PUSHNUM_NEG1),
        [n @ 1..=16] => builder.push_opcode(Opcode::from(OP_PUSHNUM_1.to_u8() + n - 1)),
        _ => {
            let bytes = PushBytesBuf::try_from(encoded)
                .map_err(|e| SwapError::Construction(format!("script number push: {e}")))?;
            builder.push_slice(bytes)
        }
    })
}

/// `OP_0 <sha256(script)>`, the output form that commits to a witness script.
#[must_use]
pub fn funding_script_pubkey(script: &Script) -> ScriptBuf {
    let mut script_pubkey = vec![OP_PUSHBYTES_0.to_u8(), 32];
    script_pubkey.extend_from_slice(&sha256(script.as_bytes()));
    ScriptBuf::from_bytes(script_pubkey)
}

/// `Contract` is a built contract script with everything derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contract {
    params: ContractParams,
    script: ScriptBuf,
    script_hash: [u8; HASH_LEN],
    script_pubkey: ScriptBuf,
    address: Address,
}

impl Contract {
    pub fn build(params: ContractParams, network: Network) -> Result<Self> {
        let script = params.to_script()?;
        let script_hash = sha256(script.as_bytes());
        let script_pubkey = funding_script_pubkey(&script);
        let address = Address::from_script(&script_pubkey, network)
            .map_err(|e| SwapError::Construction(format!("funding address derivation: {e}")))?;

        log::debug!(
            "Built contract script ({} bytes) hash={} address={address}",
            script.len(),
            hex::encode(script_hash)
        );

        Ok(Self {
            params,
            script,
            script_hash,
            script_pubkey,
            address,
        })
    }

    /// Rebuilds a contract from its script bytes. The rebuilt script must match byte for byte.
    pub fn from_script(script: ByteInput<'_>, network: Network) -> Result<Self> {
        let script = validation::contract_script(script)?;
        let contract = Self::build(ContractParams::from_script(&script)?, network)?;
        if contract.script != script {
            return Err(malformed("script does not re-encode to the same bytes"));
        }
        Ok(contract)
    }

    #[must_use]
    pub fn params(&self) -> &ContractParams {
        &self.params
    }

    #[must_use]
    pub fn script(&self) -> &Script {
        &self.script
    }

    #[must_use]
    pub fn script_hex(&self) -> String {
        hex::encode(self.script.as_bytes())
    }

    #[must_use]
    pub fn disassembly(&self) -> String {
        self.script.to_asm_string()
    }

    /// SHA256 of the script, the witness program of the funding output.
    #[must_use]
    pub fn script_hash(&self) -> &[u8; HASH_LEN] {
        &self.script_hash
    }

    #[must_use]
    pub fn script_pubkey(&self) -> &Script {
        &self.script_pubkey
    }

    #[must_use]
    pub fn address(&self) -> &Address {
        &self.address
    }
}

/// Decodes a funding address back to the script hash it commits to.
pub fn decode_funding_address(address: &str, network: Network) -> Result<[u8; HASH_LEN]> {
    let address = validation::destination(address, network)?;
    let script_pubkey = address.script_pubkey();
    if !script_pubkey.is_p2wsh() {
        return Err(SwapError::validation(
            "destination",
            format!("{address} is not a pay-to-witness-script-hash address"),
        ));
    }
    <[u8; HASH_LEN]>::try_from(&script_pubkey.as_bytes()[2..])
        .map_err(|_| SwapError::Construction("witness program is not 32 bytes".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;

    #[test]
    fn test_build_is_deterministic() {
        let a = test_utils::contract(test_utils::TIMEOUT);
        let b = test_utils::contract(test_utils::TIMEOUT);
        assert_eq!(a.script(), b.script());
        assert_eq!(a.script_hash(), b.script_hash());
        assert_eq!(a.address(), b.address());
    }

    #[test]
    fn test_script_layout() {
        let contract = test_utils::contract(144);
        let params = contract.params();
        let bytes = contract.script().as_bytes();

        let mut expected = vec![0x63, 0xa8, 0x20];
        expected.extend_from_slice(&params.hash);
        expected.extend_from_slice(&[0x88, 0x21]);
        expected.extend_from_slice(&params.claimer.serialize());
        expected.extend_from_slice(&[0xac, 0x67, 0x02, 0x90, 0x00, 0xb2, 0x75, 0x21]);
        expected.extend_from_slice(&params.refunder.serialize());
        expected.extend_from_slice(&[0xac, 0x68]);

        assert_eq!(bytes, expected.as_slice());
        assert!(contract.disassembly().contains("OP_CSV"));
    }

    #[test]
    fn test_timeout_push_matches_push_int() {
        for timeout in [1u32, 16, 17, 127, 128, 144, 0xffff, 0x00ff_ffff] {
            let contract = test_utils::contract(u64::from(timeout));
            let params = contract.params();
            let reference = Builder::new()
                .push_opcode(OP_IF)
                .push_opcode(OP_SHA256)
                .push_slice(params.hash)
                .push_opcode(OP_EQUALVERIFY)
                .push_slice(params.claimer.serialize())
                .push_opcode(OP_CHECKSIG)
                .push_opcode(OP_ELSE)
                .push_int(i64::from(timeout))
                .push_opcode(OP_CSV)
                .push_opcode(OP_DROP)
                .push_slice(params.refunder.serialize())
                .push_opcode(OP_CHECKSIG)
                .push_opcode(OP_ENDIF)
                .into_script();
            assert_eq!(contract.script(), reference.as_script(), "timeout {timeout}");
        }
    }

    #[test]
    fn test_address_roundtrip() {
        let contract = test_utils::contract(test_utils::TIMEOUT);
        let decoded =
            decode_funding_address(&contract.address().to_string(), test_utils::NETWORK).unwrap();
        assert_eq!(&decoded, contract.script_hash());
        assert!(contract.address().to_string().starts_with("bcrt1q"));
        assert!(contract.script_pubkey().is_p2wsh());
    }

    #[test]
    fn test_decode_rejects_non_p2wsh() {
        let err = decode_funding_address(&test_utils::destination(), test_utils::NETWORK)
            .unwrap_err();
        assert_eq!(err.field(), Some("destination"));
    }

    #[test]
    fn test_from_script_roundtrip() {
        for timeout in [1u64, 16, 144, 0x00ff_ffff] {
            let contract = test_utils::contract(timeout);
            let rebuilt =
                Contract::from_script(ByteInput::from(&contract.script_hex()), test_utils::NETWORK)
                    .unwrap();
            assert_eq!(rebuilt, contract);
            assert_eq!(u64::from(rebuilt.params().timeout), timeout);
        }
    }

    #[test]
    fn test_from_script_rejects_other_scripts() {
        let err = ContractParams::from_script(&ScriptBuf::from_bytes(vec![0x51])).unwrap_err();
        assert_eq!(err.field(), Some("contractScript"));

        // Swap OP_CSV for OP_CLTV
        let contract = test_utils::contract(test_utils::TIMEOUT);
        let mut bytes = contract.script().to_bytes();
        let csv_at = bytes.iter().position(|b| *b == 0xb2).unwrap();
        bytes[csv_at] = 0xb1;
        let err = ContractParams::from_script(&ScriptBuf::from_bytes(bytes)).unwrap_err();
        assert_eq!(err.field(), Some("contractScript"));
    }

    #[test]
    fn test_params_reject_bad_inputs() {
        let claimer = test_utils::keypair(&test_utils::CLAIMER_KEY).public_key_bytes();
        let refunder = test_utils::keypair(&test_utils::REFUNDER_KEY).public_key_bytes();
        let hash = [0x5a; 32];

        let err = ContractParams::new(
            ByteInput::from(&hash),
            ByteInput::from(&claimer),
            ByteInput::from(&refunder),
            0,
        )
        .unwrap_err();
        assert_eq!(err.field(), Some("timeout"));

        let err = ContractParams::new(
            ByteInput::from(&[0x5a; 31]),
            ByteInput::from(&claimer),
            ByteInput::from(&refunder),
            144,
        )
        .unwrap_err();
        assert_eq!(err.field(), Some("hash"));

        let mut off_curve = [0u8; 33];
        off_curve[0] = 0x03;
        off_curve[32] = 0x05;
        let err = ContractParams::new(
            ByteInput::from(&hash),
            ByteInput::from(&claimer),
            ByteInput::from(&off_curve),
            144,
        )
        .unwrap_err();
        assert!(matches!(err, SwapError::Cryptographic(_)));
    }

    #[test]
    fn test_different_timeouts_give_different_addresses() {
        let a = test_utils::contract(144);
        let b = test_utils::contract(145);
        assert_ne!(a.address(), b.address());
    }
}
