//! Claim and refund transactions spending a contract output.
//!
//! Building a spend happens in two phases. [`UnsignedSpend`] holds the single-input,
//! single-output transaction and produces a detached signature over its segwit v0 sighash.
//! [`assemble_witness`] then combines that signature with the branch specific stack items, and
//! [`UnsignedSpend::finalize`] attaches the result.

use bitcoin::{
    Address, Amount, EcdsaSighashType, Network, OutPoint, Script, ScriptBuf, Sequence,
    Transaction, TxIn, TxOut, Txid, Witness,
    absolute::LockTime,
    consensus::encode::{deserialize, serialize_hex},
    ecdsa,
    hashes::Hash,
    key::Secp256k1,
    secp256k1::{self, All},
    sighash::SighashCache,
    transaction,
};

use crate::{
    contract::{ContractParams, funding_script_pubkey},
    error::{Result, SwapError},
    keys::Keypair,
    validation::{self, ByteInput, SECRET_LEN},
    witness::WitnessStack,
};

/// Stack item selecting the `OP_IF` branch of the contract.
pub const CLAIM_BRANCH_FLAG: u8 = 0x01;

/// `FundingOutput` is the contract output being spent together with its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FundingOutput {
    pub outpoint: OutPoint,
    pub amount: Amount,
}

impl FundingOutput {
    pub fn new(prev_txid: &str, output_index: u64, amount: u64) -> Result<Self> {
        Ok(Self {
            outpoint: OutPoint::new(
                validation::prev_txid(prev_txid)?,
                validation::output_index(output_index)?,
            ),
            amount: validation::amount(amount)?,
        })
    }
}

/// Which contract branch a spend satisfies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Branch {
    Claim { secret: [u8; SECRET_LEN] },
    Refund { timeout: u32 },
}

impl Branch {
    /// Refunds must carry the relative timelock in the input sequence for `OP_CSV` to pass.
    #[must_use]
    pub fn sequence(&self) -> Sequence {
        match self {
            Branch::Claim { .. } => Sequence::MAX,
            Branch::Refund { timeout } => Sequence(*timeout),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Branch::Claim { .. } => "claim",
            Branch::Refund { .. } => "refund",
        }
    }
}

/// Inputs shared by both spend kinds, as handed in by the caller.
#[derive(Debug, Clone, Copy)]
pub struct SpendRequest<'a> {
    pub prev_txid: &'a str,
    pub output_index: u64,
    pub amount: u64,
    pub private_key: ByteInput<'a>,
    pub contract_script: ByteInput<'a>,
    pub destination: &'a str,
    pub fee: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct ClaimRequest<'a> {
    pub spend: SpendRequest<'a>,
    pub secret: ByteInput<'a>,
}

#[derive(Debug, Clone, Copy)]
pub struct RefundRequest<'a> {
    pub spend: SpendRequest<'a>,
    /// Expected relative timelock. Taken from the contract script when absent.
    pub timeout: Option<u64>,
}

/// `CheckedSpend` is a [`SpendRequest`] after every format and range check.
struct CheckedSpend {
    funding: FundingOutput,
    output_value: Amount,
    private_key: [u8; 32],
    script: ScriptBuf,
    params: ContractParams,
    destination: Address,
}

impl CheckedSpend {
    fn new(request: &SpendRequest<'_>, network: Network) -> Result<Self> {
        let funding = FundingOutput::new(request.prev_txid, request.output_index, request.amount)?;
        let output_value = validation::fee(funding.amount, request.fee)?;
        let private_key = validation::private_key(request.private_key)?;
        let script = validation::contract_script(request.contract_script)?;
        let params = ContractParams::from_script(&script)?;
        Ok(Self {
            funding,
            output_value,
            private_key,
            script,
            params,
            destination: validation::destination(request.destination, network)?,
        })
    }
}

/// `UnsignedSpend` is a spend transaction with an empty witness.
#[derive(Debug, Clone)]
pub struct UnsignedSpend {
    tx: Transaction,
    prevout: TxOut,
    witness_script: ScriptBuf,
    branch: Branch,
}

impl UnsignedSpend {
    #[must_use]
    pub fn new(
        funding: FundingOutput,
        witness_script: ScriptBuf,
        destination: &Address,
        output_value: Amount,
        branch: Branch,
    ) -> Self {
        let prevout = TxOut {
            value: funding.amount,
            script_pubkey: funding_script_pubkey(&witness_script),
        };

        let tx = Transaction {
            version: transaction::Version::TWO,
            lock_time: LockTime::ZERO,
            input: vec![TxIn {
                previous_output: funding.outpoint,
                script_sig: ScriptBuf::new(),
                sequence: branch.sequence(),
                witness: Witness::new(),
            }],
            output: vec![TxOut {
                value: output_value,
                script_pubkey: destination.script_pubkey(),
            }],
        };

        Self {
            tx,
            prevout,
            witness_script,
            branch,
        }
    }

    #[must_use]
    pub fn tx(&self) -> &Transaction {
        &self.tx
    }

    /// The funding output as recomputed from the witness script.
    #[must_use]
    pub fn prevout(&self) -> &TxOut {
        &self.prevout
    }

    #[must_use]
    pub fn branch(&self) -> &Branch {
        &self.branch
    }

    pub fn sighash(&self) -> Result<secp256k1::Message> {
        let mut cache = SighashCache::new(&self.tx);
        let sighash = cache
            .p2wsh_signature_hash(
                0,
                &self.witness_script,
                self.prevout.value,
                EcdsaSighashType::All,
            )
            .map_err(|e| SwapError::Construction(format!("sighash: {e}")))?;
        log::debug!("{} sighash {sighash}", self.branch.name());
        Ok(secp256k1::Message::from_digest(sighash.to_byte_array()))
    }

    /// Signs the only input with `keypair`, using the witness script as script code.
    pub fn sign(&self, secp: &Secp256k1<All>, keypair: &Keypair) -> Result<ecdsa::Signature> {
        let message = self.sighash()?;
        let signature = secp.sign_ecdsa(&message, keypair.secret_key());
        secp.verify_ecdsa(&message, &signature, &keypair.public_key().inner)
            .map_err(|e| SwapError::Construction(format!("no valid signature produced: {e}")))?;

        Ok(ecdsa::Signature {
            signature,
            sighash_type: EcdsaSighashType::All,
        })
    }

    pub fn finalize(self, stack: WitnessStack) -> Result<SpendTransaction> {
        let witness_bytes = stack.serialize();
        let witness: Witness = deserialize(&witness_bytes)
            .map_err(|e| SwapError::Construction(format!("witness encoding: {e}")))?;

        let mut tx = self.tx;
        let input = tx
            .input
            .first_mut()
            .ok_or_else(|| SwapError::Construction("spend has no input".to_string()))?;
        input.witness = witness;

        let txid = tx.compute_txid();
        let hex = serialize_hex(&tx);
        log::info!(
            "Finalized {} spend txid={txid} vsize={}",
            self.branch.name(),
            tx.vsize()
        );

        Ok(SpendTransaction {
            tx,
            txid,
            hex,
            witness: stack,
            witness_bytes,
        })
    }
}

/// Builds the witness stack for `branch` around a detached signature.
///
/// Claim: `[signature, secret, 0x01, script]`. Refund: `[signature, <empty>, script]`.
#[must_use]
pub fn assemble_witness(
    branch: &Branch,
    signature: &ecdsa::Signature,
    witness_script: &Script,
) -> WitnessStack {
    let mut stack = WitnessStack::new();
    stack.push(signature.to_vec());
    match branch {
        Branch::Claim { secret } => {
            stack.push(secret.to_vec());
            stack.push(vec![CLAIM_BRANCH_FLAG]);
        }
        Branch::Refund { .. } => stack.push(Vec::new()),
    }
    stack.push(witness_script.to_bytes());
    stack
}

/// `SpendTransaction` is a signed spend ready for broadcast.
#[derive(Debug, Clone)]
pub struct SpendTransaction {
    tx: Transaction,
    txid: Txid,
    hex: String,
    witness: WitnessStack,
    witness_bytes: Vec<u8>,
}

impl SpendTransaction {
    #[must_use]
    pub fn tx(&self) -> &Transaction {
        &self.tx
    }

    #[must_use]
    pub fn txid(&self) -> Txid {
        self.txid
    }

    #[must_use]
    pub fn hex(&self) -> &str {
        &self.hex
    }

    #[must_use]
    pub fn witness(&self) -> &WitnessStack {
        &self.witness
    }

    #[must_use]
    pub fn witness_bytes(&self) -> &[u8] {
        &self.witness_bytes
    }

    #[must_use]
    pub fn vsize(&self) -> usize {
        self.tx.vsize()
    }
}

/// `SpendBuilder` turns claim and refund requests into signed transactions for one network.
pub struct SpendBuilder {
    secp_ctx: Secp256k1<All>,
    network: Network,
}

impl SpendBuilder {
    #[must_use]
    pub fn new(network: Network) -> Self {
        Self {
            secp_ctx: Secp256k1::new(),
            network,
        }
    }

    #[must_use]
    pub fn network(&self) -> Network {
        self.network
    }

    pub fn build_claim(&self, request: &ClaimRequest<'_>) -> Result<SpendTransaction> {
        let checked = CheckedSpend::new(&request.spend, self.network)?;
        let secret = validation::secret(request.secret)?;

        let keypair = Keypair::from_private_key(
            &self.secp_ctx,
            ByteInput::from(&checked.private_key),
            self.network,
        )?;
        if keypair.public_key().inner != checked.params.claimer {
            return Err(SwapError::Cryptographic(
                "private key does not match the claimer key in the contract script".to_string(),
            ));
        }

        self.build(checked, &keypair, Branch::Claim { secret })
    }

    pub fn build_refund(&self, request: &RefundRequest<'_>) -> Result<SpendTransaction> {
        let checked = CheckedSpend::new(&request.spend, self.network)?;
        let expected_timeout = request.timeout.map(validation::timeout).transpose()?;
        let script_timeout = checked.params.timeout;
        if let Some(timeout) = expected_timeout.filter(|timeout| *timeout != script_timeout) {
            return Err(SwapError::validation(
                "timeout",
                format!(
                    "timeout {timeout} does not match {script_timeout} in the contract script"
                ),
            ));
        }

        let keypair = Keypair::from_private_key(
            &self.secp_ctx,
            ByteInput::from(&checked.private_key),
            self.network,
        )?;
        if keypair.public_key().inner != checked.params.refunder {
            return Err(SwapError::Cryptographic(
                "private key does not match the refunder key in the contract script".to_string(),
            ));
        }

        self.build(
            checked,
            &keypair,
            Branch::Refund {
                timeout: script_timeout,
            },
        )
    }

    fn build(
        &self,
        checked: CheckedSpend,
        keypair: &Keypair,
        branch: Branch,
    ) -> Result<SpendTransaction> {
        let destination_script = checked.destination.script_pubkey();
        if checked.output_value < destination_script.minimal_non_dust() {
            log::warn!(
                "{} output of {} is below the dust limit for {}",
                branch.name(),
                checked.output_value,
                checked.destination
            );
        }

        let unsigned = UnsignedSpend::new(
            checked.funding,
            checked.script,
            &checked.destination,
            checked.output_value,
            branch,
        );
        let signature = unsigned.sign(&self.secp_ctx, keypair)?;
        let stack = assemble_witness(unsigned.branch(), &signature, &unsigned.witness_script);
        unsigned.finalize(stack)
    }
}
