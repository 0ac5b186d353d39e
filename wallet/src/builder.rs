//! The transaction builder.
//!
//! A builder assembles one transaction, funding it from wallet outputs and
//! signing it with wallet keys. Builders are single-owner; the wallet they
//! borrow from serializes access internally. After `sign` has produced at
//! least one signature the builder is poisoned and must be dropped, which
//! also releases every reservation it wrote.

use std::collections::HashSet;

use cairn_types::{
    CoveredFields, Currency, FileContract, FileContractRevision, OutputId, SiacoinInput,
    SiacoinOutput, SiafundInput, SiafundOutput, StorageProof, Transaction, TransactionId,
    TransactionSignature,
};

use crate::error::WalletError;
use crate::sign::add_signatures;
use crate::wallet::Wallet;

/// Builds one transaction against a wallet.
pub struct TransactionBuilder<'a> {
    wallet: &'a Wallet,
    parents: Vec<Transaction>,
    transaction: Transaction,
    signed: bool,

    new_parents: Vec<usize>,
    siacoin_inputs: Vec<usize>,
    siafund_inputs: Vec<usize>,
    transaction_signatures: Vec<usize>,

    /// Every output id this builder reserved, released again on drop.
    reserved: Vec<OutputId>,
}

impl<'a> TransactionBuilder<'a> {
    pub(crate) fn new(wallet: &'a Wallet, transaction: Transaction, parents: Vec<Transaction>) -> Self {
        Self {
            wallet,
            parents,
            transaction,
            signed: false,
            new_parents: Vec::new(),
            siacoin_inputs: Vec::new(),
            siafund_inputs: Vec::new(),
            transaction_signatures: Vec::new(),
            reserved: Vec::new(),
        }
    }

    // ── funding ─────────────────────────────────────────────────────────

    /// Add a siacoin input of exactly `amount` to the transaction.
    ///
    /// Coin selection is hidden behind a parent transaction: selected
    /// inputs are aggregated into a fresh output of exactly `amount` (plus
    /// a refund), the parent is signed internally, and the child input
    /// consuming that output is appended to the transaction in progress.
    /// The input is not signed until `sign` is called.
    pub fn fund_siacoins(&mut self, amount: Currency) -> Result<(), WalletError> {
        let mut state = self.wallet.write_state();

        let mut fund = Currency::zero();
        // `potential` additionally counts outputs reserved by recent
        // spends, to distinguish "broke" from "wait for confirmation".
        let mut potential = Currency::zero();
        let mut parent_txn = Transaction::default();
        let mut spent: Vec<OutputId> = Vec::new();

        for (id, output) in state.sorted_siacoin_candidates() {
            match state.check_siacoin_output(&id, &output) {
                Ok(()) => {}
                Err(WalletError::SpendHeightTooHigh) => {
                    potential += &output.value;
                    continue;
                }
                Err(_) => continue,
            }
            let Some(key) = state.keys.get(&output.unlock_hash) else {
                continue;
            };

            parent_txn.siacoin_inputs.push(SiacoinInput {
                parent_id: id,
                unlock_conditions: key.unlock_conditions.clone(),
            });
            spent.push(OutputId::from(id));
            fund += &output.value;
            potential += &output.value;
            if fund >= amount {
                break;
            }
        }
        if potential >= amount && fund < amount {
            return Err(WalletError::IncompleteTransactions);
        }
        if fund < amount {
            return Err(WalletError::LowBalance {
                needed: amount,
                available: fund,
            });
        }

        // The exact output consumed by the child input, and a refund for
        // the remainder.
        let parent_conditions = state.next_address();
        parent_txn.siacoin_outputs.push(SiacoinOutput {
            value: amount.clone(),
            unlock_hash: parent_conditions.unlock_hash(),
        });
        if fund != amount {
            let refund_conditions = state.next_address();
            let refund = fund.checked_sub(&amount).unwrap_or_default();
            parent_txn.siacoin_outputs.push(SiacoinOutput {
                value: refund,
                unlock_hash: refund_conditions.unlock_hash(),
            });
        }

        // Sign the parent internally; the child input is signed later.
        for index in 0..parent_txn.siacoin_inputs.len() {
            let input = parent_txn.siacoin_inputs[index].clone();
            let key = state
                .keys
                .get(&input.unlock_conditions.unlock_hash())
                .ok_or(WalletError::CannotSignInput)?;
            add_signatures(
                &mut parent_txn,
                &CoveredFields::whole(),
                &input.unlock_conditions,
                *input.parent_id.as_hash(),
                key,
            )?;
        }

        // All reservations land in one step, including the parent's exact
        // output, which is derived from the finished parent transaction.
        spent.push(OutputId::from(parent_txn.siacoin_output_id(0)));
        state.reserve(&spent);
        self.reserved.extend_from_slice(&spent);

        let child_input = SiacoinInput {
            parent_id: parent_txn.siacoin_output_id(0),
            unlock_conditions: parent_conditions,
        };
        self.new_parents.push(self.parents.len());
        self.parents.push(parent_txn);
        self.siacoin_inputs.push(self.transaction.siacoin_inputs.len());
        self.transaction.siacoin_inputs.push(child_input);
        Ok(())
    }

    /// Fund the given outputs directly, without a parent transaction.
    ///
    /// Inputs covering the outputs plus `fee` are placed on the transaction
    /// itself, the outputs are appended, a refund output picks up any
    /// remainder, and a non-zero fee is added to the miner fees.
    pub fn fund_siacoins_for_outputs(
        &mut self,
        outputs: Vec<SiacoinOutput>,
        fee: Currency,
    ) -> Result<(), WalletError> {
        let mut state = self.wallet.write_state();

        let mut amount: Currency = outputs.iter().map(|o| &o.value).sum();
        if !fee.is_zero() {
            amount += &fee;
            self.transaction.miner_fees.push(fee);
        }

        let mut fund = Currency::zero();
        let mut potential = Currency::zero();
        let mut spent: Vec<OutputId> = Vec::new();
        let mut inputs: Vec<SiacoinInput> = Vec::new();

        for (id, output) in state.sorted_siacoin_candidates() {
            match state.check_siacoin_output(&id, &output) {
                Ok(()) => {}
                Err(WalletError::SpendHeightTooHigh) => {
                    potential += &output.value;
                    continue;
                }
                Err(_) => continue,
            }
            let Some(key) = state.keys.get(&output.unlock_hash) else {
                continue;
            };

            inputs.push(SiacoinInput {
                parent_id: id,
                unlock_conditions: key.unlock_conditions.clone(),
            });
            spent.push(OutputId::from(id));
            fund += &output.value;
            potential += &output.value;
            if fund >= amount {
                break;
            }
        }
        if potential >= amount && fund < amount {
            return Err(WalletError::IncompleteTransactions);
        }
        if fund < amount {
            return Err(WalletError::LowBalance {
                needed: amount,
                available: fund,
            });
        }

        for input in inputs {
            self.siacoin_inputs.push(self.transaction.siacoin_inputs.len());
            self.transaction.siacoin_inputs.push(input);
        }
        for output in outputs {
            self.transaction.siacoin_outputs.push(output);
        }
        if fund != amount {
            let refund_conditions = state.next_address();
            let refund = fund.checked_sub(&amount).unwrap_or_default();
            self.transaction.siacoin_outputs.push(SiacoinOutput {
                value: refund,
                unlock_hash: refund_conditions.unlock_hash(),
            });
        }

        state.reserve(&spent);
        self.reserved.extend_from_slice(&spent);
        Ok(())
    }

    /// Add a siafund input of exactly `amount`, via a signed parent
    /// transaction, the same shape as [`Self::fund_siacoins`]. Each spent
    /// siafund input claims its accrued siacoins to a fresh wallet address.
    pub fn fund_siafunds(&mut self, amount: Currency) -> Result<(), WalletError> {
        let mut state = self.wallet.write_state();

        let mut fund = Currency::zero();
        let mut potential = Currency::zero();
        let mut parent_txn = Transaction::default();
        let mut spent: Vec<OutputId> = Vec::new();

        let mut candidates: Vec<(cairn_types::SiafundOutputId, SiafundOutput)> = state
            .siafund_outputs
            .iter()
            .map(|(id, output)| (*id, output.clone()))
            .collect();
        candidates.sort_by(|a, b| b.1.value.cmp(&a.1.value).then_with(|| a.0.cmp(&b.0)));

        for (id, output) in candidates {
            match state.check_siafund_output(&id, &output) {
                Ok(()) => {}
                Err(WalletError::SpendHeightTooHigh) => {
                    potential += &output.value;
                    continue;
                }
                Err(_) => continue,
            }
            let Some(key) = state.keys.get(&output.unlock_hash) else {
                continue;
            };
            let conditions = key.unlock_conditions.clone();

            let claim_conditions = state.next_address();
            parent_txn.siafund_inputs.push(SiafundInput {
                parent_id: id,
                unlock_conditions: conditions,
                claim_unlock_hash: claim_conditions.unlock_hash(),
            });
            spent.push(OutputId::from(id));
            fund += &output.value;
            potential += &output.value;
            if fund >= amount {
                break;
            }
        }
        if potential >= amount && fund < amount {
            return Err(WalletError::IncompleteTransactions);
        }
        if fund < amount {
            return Err(WalletError::LowBalance {
                needed: amount,
                available: fund,
            });
        }

        let parent_conditions = state.next_address();
        parent_txn.siafund_outputs.push(SiafundOutput {
            value: amount.clone(),
            unlock_hash: parent_conditions.unlock_hash(),
            claim_start: Currency::zero(),
        });
        if fund != amount {
            let refund_conditions = state.next_address();
            let refund = fund.checked_sub(&amount).unwrap_or_default();
            parent_txn.siafund_outputs.push(SiafundOutput {
                value: refund,
                unlock_hash: refund_conditions.unlock_hash(),
                claim_start: Currency::zero(),
            });
        }

        for index in 0..parent_txn.siafund_inputs.len() {
            let input = parent_txn.siafund_inputs[index].clone();
            let key = state
                .keys
                .get(&input.unlock_conditions.unlock_hash())
                .ok_or(WalletError::CannotSignInput)?;
            add_signatures(
                &mut parent_txn,
                &CoveredFields::whole(),
                &input.unlock_conditions,
                *input.parent_id.as_hash(),
                key,
            )?;
        }

        spent.push(OutputId::from(parent_txn.siafund_output_id(0)));
        state.reserve(&spent);
        self.reserved.extend_from_slice(&spent);

        let claim_conditions = state.next_address();
        let child_input = SiafundInput {
            parent_id: parent_txn.siafund_output_id(0),
            unlock_conditions: parent_conditions,
            claim_unlock_hash: claim_conditions.unlock_hash(),
        };
        self.new_parents.push(self.parents.len());
        self.parents.push(parent_txn);
        self.siafund_inputs.push(self.transaction.siafund_inputs.len());
        self.transaction.siafund_inputs.push(child_input);
        Ok(())
    }

    // ── manual construction ─────────────────────────────────────────────

    /// Add a set of parents the transaction depends on.
    pub fn add_parents(&mut self, new_parents: Vec<Transaction>) {
        self.parents.extend(new_parents);
    }

    /// Add a miner fee, returning its index within the transaction.
    pub fn add_miner_fee(&mut self, fee: Currency) -> u64 {
        self.transaction.miner_fees.push(fee);
        self.transaction.miner_fees.len() as u64 - 1
    }

    /// Add a siacoin input, returning its index. The input is left unsigned
    /// by `sign`.
    pub fn add_siacoin_input(&mut self, input: SiacoinInput) -> u64 {
        self.transaction.siacoin_inputs.push(input);
        self.transaction.siacoin_inputs.len() as u64 - 1
    }

    /// Add a siacoin output, returning its index.
    pub fn add_siacoin_output(&mut self, output: SiacoinOutput) -> u64 {
        self.transaction.siacoin_outputs.push(output);
        self.transaction.siacoin_outputs.len() as u64 - 1
    }

    /// Add a file contract, returning its index.
    pub fn add_file_contract(&mut self, contract: FileContract) -> u64 {
        self.transaction.file_contracts.push(contract);
        self.transaction.file_contracts.len() as u64 - 1
    }

    /// Add a file contract revision, returning its index. The revision is
    /// left unsigned by `sign`.
    pub fn add_file_contract_revision(&mut self, revision: FileContractRevision) -> u64 {
        self.transaction.file_contract_revisions.push(revision);
        self.transaction.file_contract_revisions.len() as u64 - 1
    }

    /// Add a storage proof, returning its index.
    pub fn add_storage_proof(&mut self, proof: StorageProof) -> u64 {
        self.transaction.storage_proofs.push(proof);
        self.transaction.storage_proofs.len() as u64 - 1
    }

    /// Add a siafund input, returning its index. The input is left unsigned
    /// by `sign`.
    pub fn add_siafund_input(&mut self, input: SiafundInput) -> u64 {
        self.transaction.siafund_inputs.push(input);
        self.transaction.siafund_inputs.len() as u64 - 1
    }

    /// Add a siafund output, returning its index.
    pub fn add_siafund_output(&mut self, output: SiafundOutput) -> u64 {
        self.transaction.siafund_outputs.push(output);
        self.transaction.siafund_outputs.len() as u64 - 1
    }

    /// Add arbitrary data, returning its index.
    pub fn add_arbitrary_data(&mut self, data: Vec<u8>) -> u64 {
        self.transaction.arbitrary_data.push(data);
        self.transaction.arbitrary_data.len() as u64 - 1
    }

    /// Add a prebuilt signature, returning its index. The signature should
    /// already be valid and must not sign inputs added by the fund calls.
    pub fn add_transaction_signature(&mut self, signature: TransactionSignature) -> u64 {
        self.transaction.transaction_signatures.push(signature);
        self.transaction.transaction_signatures.len() as u64 - 1
    }

    // ── lifecycle ───────────────────────────────────────────────────────

    /// Sign every input added by the fund calls and return the transaction
    /// set: all parents followed by the built transaction.
    ///
    /// With `whole_transaction` the signatures commit to every field;
    /// otherwise they cover exactly the fields present at signing time,
    /// leaving room for more to be added. The first successful signature
    /// poisons the builder: further `sign` calls fail, and on any error the
    /// caller must drop the builder.
    pub fn sign(&mut self, whole_transaction: bool) -> Result<Vec<Transaction>, WalletError> {
        if self.signed {
            return Err(WalletError::BuilderAlreadySigned);
        }

        let mut covered_fields = if whole_transaction {
            CoveredFields::whole()
        } else {
            let txn = &self.transaction;
            CoveredFields {
                whole_transaction: false,
                miner_fees: (0..txn.miner_fees.len() as u64).collect(),
                siacoin_inputs: (0..txn.siacoin_inputs.len() as u64).collect(),
                siacoin_outputs: (0..txn.siacoin_outputs.len() as u64).collect(),
                file_contracts: (0..txn.file_contracts.len() as u64).collect(),
                file_contract_terminations: (0..txn.file_contract_terminations.len() as u64)
                    .collect(),
                file_contract_revisions: (0..txn.file_contract_revisions.len() as u64).collect(),
                storage_proofs: (0..txn.storage_proofs.len() as u64).collect(),
                siafund_inputs: (0..txn.siafund_inputs.len() as u64).collect(),
                siafund_outputs: (0..txn.siafund_outputs.len() as u64).collect(),
                arbitrary_data: (0..txn.arbitrary_data.len() as u64).collect(),
                transaction_signatures: Vec::new(),
            }
        };
        // the signatures list is never covered by the whole-transaction
        // flag; existing entries are covered explicitly
        covered_fields.transaction_signatures =
            (0..self.transaction.transaction_signatures.len() as u64).collect();

        let state = self.wallet.read_state();
        for position in 0..self.siacoin_inputs.len() {
            let input_index = self.siacoin_inputs[position];
            let input = self.transaction.siacoin_inputs[input_index].clone();
            let key = state
                .keys
                .get(&input.unlock_conditions.unlock_hash())
                .ok_or(WalletError::CannotSignInput)?;
            let new_indices = add_signatures(
                &mut self.transaction,
                &covered_fields,
                &input.unlock_conditions,
                *input.parent_id.as_hash(),
                key,
            )?;
            self.transaction_signatures.extend_from_slice(&new_indices);
            self.signed = true;
        }
        for position in 0..self.siafund_inputs.len() {
            let input_index = self.siafund_inputs[position];
            let input = self.transaction.siafund_inputs[input_index].clone();
            let key = state
                .keys
                .get(&input.unlock_conditions.unlock_hash())
                .ok_or(WalletError::CannotSignInput)?;
            let new_indices = add_signatures(
                &mut self.transaction,
                &covered_fields,
                &input.unlock_conditions,
                *input.parent_id.as_hash(),
                key,
            )?;
            self.transaction_signatures.extend_from_slice(&new_indices);
            self.signed = true;
        }

        let mut set = self.parents.clone();
        set.push(self.transaction.clone());
        Ok(set)
    }

    /// The transaction in progress along with its parents.
    pub fn view(&self) -> (Transaction, Vec<Transaction>) {
        (self.transaction.clone(), self.parents.clone())
    }

    /// Indices of everything the fund and sign calls added automatically:
    /// new parents, siacoin inputs, siafund inputs, and signatures.
    pub fn view_added(&self) -> (Vec<usize>, Vec<usize>, Vec<usize>, Vec<usize>) {
        (
            self.new_parents.clone(),
            self.siacoin_inputs.clone(),
            self.siafund_inputs.clone(),
            self.transaction_signatures.clone(),
        )
    }

    /// The unconfirmed transactions that created outputs spent by this
    /// builder's parents.
    pub fn unconfirmed_parents(&self) -> Result<Vec<Transaction>, WalletError> {
        if self.signed {
            return Err(WalletError::BuilderAlreadySigned);
        }
        let state = self.wallet.read_state();
        let mut seen: HashSet<TransactionId> = HashSet::new();
        let mut result = Vec::new();
        for parent in &self.parents {
            for sci in &parent.siacoin_inputs {
                for txn in &state.unconfirmed {
                    let creates = (0..txn.siacoin_outputs.len() as u64)
                        .any(|i| txn.siacoin_output_id(i) == sci.parent_id);
                    if creates && seen.insert(txn.id()) {
                        result.push(txn.clone());
                    }
                }
            }
        }
        Ok(result)
    }

    /// Discard the transaction and release every reservation this builder
    /// wrote, returning the outputs to the pool. A freshly registered
    /// builder has nothing to release, so dropping it is a no-op.
    pub fn drop_transaction(&mut self) {
        let mut state = self.wallet.write_state();
        for id in &self.reserved {
            state.spent_outputs.remove(id);
        }
        drop(state);

        self.parents.clear();
        self.signed = false;
        self.transaction = Transaction::default();
        self.new_parents.clear();
        self.siacoin_inputs.clear();
        self.siafund_inputs.clear();
        self.transaction_signatures.clear();
        self.reserved.clear();
    }
}
