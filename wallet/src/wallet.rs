//! Core wallet state.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use rand::RngCore;

use cairn_types::params::RESPEND_TIMEOUT;
use cairn_types::{
    BlockHeight, Currency, Hash, OutputId, SiacoinOutput, SiacoinOutputId, SiafundOutput,
    SiafundOutputId, Transaction, UnlockConditions, UnlockHash,
};

use crate::builder::TransactionBuilder;
use crate::error::WalletError;
use crate::keys::{generate_spendable_key, SpendableKey};
use crate::sign::sign_existing;

/// A wallet: spend keys derived from one seed, the outputs it owns, and the
/// recently-spent reservations that keep rapid successive builds from
/// selecting the same output twice.
///
/// The wallet holds no connection to consensus; the embedder feeds height
/// and output changes in through the update methods. One readers-writers
/// lock guards all state.
pub struct Wallet {
    state: RwLock<WalletState>,
}

pub(crate) struct WalletState {
    seed: [u8; 32],
    progress: u64,
    pub(crate) keys: HashMap<UnlockHash, SpendableKey>,
    pub(crate) siacoin_outputs: HashMap<SiacoinOutputId, SiacoinOutput>,
    pub(crate) siafund_outputs: HashMap<SiafundOutputId, SiafundOutput>,
    pub(crate) unconfirmed: Vec<Transaction>,
    pub(crate) spent_outputs: HashMap<OutputId, BlockHeight>,
    pub(crate) height: BlockHeight,
    pub(crate) dust_threshold: Currency,
}

impl WalletState {
    /// Derive the next address from the primary seed, register its key and
    /// advance the derivation counter.
    pub(crate) fn next_address(&mut self) -> UnlockConditions {
        let key = generate_spendable_key(&self.seed, self.progress);
        self.progress += 1;
        let conditions = key.unlock_conditions.clone();
        let address = conditions.unlock_hash();
        self.keys.insert(address, key);
        tracing::debug!(address = %address, index = self.progress - 1, "derived wallet address");
        conditions
    }

    /// All spend candidates: confirmed outputs plus unconfirmed outputs
    /// paying a wallet address, sorted by value, largest first.
    pub(crate) fn sorted_siacoin_candidates(&self) -> Vec<(SiacoinOutputId, SiacoinOutput)> {
        let mut candidates: Vec<(SiacoinOutputId, SiacoinOutput)> = self
            .siacoin_outputs
            .iter()
            .map(|(id, output)| (*id, output.clone()))
            .collect();
        for txn in &self.unconfirmed {
            for (i, output) in txn.siacoin_outputs.iter().enumerate() {
                if !self.keys.contains_key(&output.unlock_hash) {
                    continue;
                }
                candidates.push((txn.siacoin_output_id(i as u64), output.clone()));
            }
        }
        // value descending, id as tie-break so selection is deterministic
        candidates.sort_by(|a, b| b.1.value.cmp(&a.1.value).then_with(|| a.0.cmp(&b.0)));
        candidates
    }

    /// Whether a siacoin output is usable: not dust, not inside the respend
    /// window, and not timelocked past the current height.
    pub(crate) fn check_siacoin_output(
        &self,
        id: &SiacoinOutputId,
        output: &SiacoinOutput,
    ) -> Result<(), WalletError> {
        if output.value < self.dust_threshold {
            return Err(WalletError::DustOutput);
        }
        self.check_respend_and_timelock(&OutputId::from(*id), &output.unlock_hash)
    }

    /// Siafund outputs skip the dust check; everything else is the same.
    pub(crate) fn check_siafund_output(
        &self,
        id: &SiafundOutputId,
        output: &SiafundOutput,
    ) -> Result<(), WalletError> {
        self.check_respend_and_timelock(&OutputId::from(*id), &output.unlock_hash)
    }

    fn check_respend_and_timelock(
        &self,
        id: &OutputId,
        unlock_hash: &UnlockHash,
    ) -> Result<(), WalletError> {
        if let Some(spend_height) = self.spent_outputs.get(id) {
            if spend_height.get() + RESPEND_TIMEOUT > self.height.get() {
                return Err(WalletError::SpendHeightTooHigh);
            }
        }
        if let Some(key) = self.keys.get(unlock_hash) {
            if self.height < key.unlock_conditions.timelock {
                return Err(WalletError::OutputTimelock);
            }
        }
        Ok(())
    }

    /// Record every id in `ids` as spent at the current height, in one step.
    pub(crate) fn reserve(&mut self, ids: &[OutputId]) {
        for id in ids {
            self.spent_outputs.insert(*id, self.height);
        }
    }
}

impl Wallet {
    /// Create a wallet from a 32-byte primary seed. The dust threshold
    /// defaults to one unit, making zero-value outputs unspendable.
    pub fn new(seed: [u8; 32]) -> Self {
        Self {
            state: RwLock::new(WalletState {
                seed,
                progress: 0,
                keys: HashMap::new(),
                siacoin_outputs: HashMap::new(),
                siafund_outputs: HashMap::new(),
                unconfirmed: Vec::new(),
                spent_outputs: HashMap::new(),
                height: BlockHeight::ZERO,
                dust_threshold: Currency::from_u64(1),
            }),
        }
    }

    /// Create a wallet with a fresh random seed.
    pub fn new_random() -> Self {
        let mut seed = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut seed);
        Self::new(seed)
    }

    pub(crate) fn read_state(&self) -> RwLockReadGuard<'_, WalletState> {
        self.state.read().unwrap_or_else(|poison| poison.into_inner())
    }

    pub(crate) fn write_state(&self) -> RwLockWriteGuard<'_, WalletState> {
        self.state.write().unwrap_or_else(|poison| poison.into_inner())
    }

    /// The minimum output value the wallet will spend.
    pub fn dust_threshold(&self) -> Currency {
        self.read_state().dust_threshold.clone()
    }

    pub fn set_dust_threshold(&self, threshold: Currency) {
        self.write_state().dust_threshold = threshold;
    }

    /// Derive the next wallet address.
    pub fn next_address(&self) -> UnlockConditions {
        self.write_state().next_address()
    }

    pub fn is_wallet_address(&self, address: &UnlockHash) -> bool {
        self.read_state().keys.contains_key(address)
    }

    pub fn height(&self) -> BlockHeight {
        self.read_state().height
    }

    /// The sum of confirmed siacoin outputs the wallet owns.
    pub fn confirmed_siacoin_balance(&self) -> Currency {
        let state = self.read_state();
        state.siacoin_outputs.values().map(|o| &o.value).sum()
    }

    // ── consensus feed ──────────────────────────────────────────────────

    pub fn update_height(&self, height: BlockHeight) {
        self.write_state().height = height;
    }

    pub fn insert_siacoin_output(&self, id: SiacoinOutputId, output: SiacoinOutput) {
        self.write_state().siacoin_outputs.insert(id, output);
    }

    pub fn remove_siacoin_output(&self, id: &SiacoinOutputId) {
        self.write_state().siacoin_outputs.remove(id);
    }

    pub fn insert_siafund_output(&self, id: SiafundOutputId, output: SiafundOutput) {
        self.write_state().siafund_outputs.insert(id, output);
    }

    pub fn remove_siafund_output(&self, id: &SiafundOutputId) {
        self.write_state().siafund_outputs.remove(id);
    }

    /// Replace the set of unconfirmed transactions the wallet observes.
    pub fn set_unconfirmed(&self, transactions: Vec<Transaction>) {
        self.write_state().unconfirmed = transactions;
    }

    // ── builders ────────────────────────────────────────────────────────

    /// Begin building on top of `transaction` with the given parents. The
    /// builder owns value copies; the originals stay with the caller.
    pub fn register_transaction(
        &self,
        transaction: Transaction,
        parents: Vec<Transaction>,
    ) -> TransactionBuilder<'_> {
        TransactionBuilder::new(self, transaction, parents)
    }

    /// Begin building an empty transaction.
    pub fn start_transaction(&self) -> TransactionBuilder<'_> {
        self.register_transaction(Transaction::default(), Vec::new())
    }

    /// Build and sign a transaction paying `outputs` plus a miner fee,
    /// funding it from wallet outputs. The builder is dropped on failure so
    /// its reservations are released.
    pub fn new_transaction(
        &self,
        outputs: Vec<SiacoinOutput>,
        fee: Currency,
    ) -> Result<Transaction, WalletError> {
        let mut builder = self.start_transaction();
        let result = builder
            .fund_siacoins_for_outputs(outputs, fee)
            .and_then(|()| builder.sign(true));
        match result {
            // the signed set is never empty; the built transaction is last
            Ok(mut set) => Ok(set.pop().unwrap_or_default()),
            Err(err) => {
                builder.drop_transaction();
                Err(err)
            }
        }
    }

    /// Build and sign a transaction paying `amount` to a single address.
    pub fn new_transaction_for_address(
        &self,
        dest: UnlockHash,
        amount: Currency,
        fee: Currency,
    ) -> Result<Transaction, WalletError> {
        let output = SiacoinOutput {
            value: amount,
            unlock_hash: dest,
        };
        self.new_transaction(vec![output], fee)
    }

    // ── keyless signing ─────────────────────────────────────────────────

    /// Sign `txn` using keys known to the wallet. If `to_sign` is empty,
    /// every input whose unlock hash belongs to the wallet is signed;
    /// otherwise exactly the named parents are.
    pub fn sign_transaction(
        &self,
        txn: &mut Transaction,
        mut to_sign: Vec<Hash>,
    ) -> Result<(), WalletError> {
        let state = self.read_state();
        if to_sign.is_empty() {
            for sci in &txn.siacoin_inputs {
                if state
                    .keys
                    .contains_key(&sci.unlock_conditions.unlock_hash())
                {
                    to_sign.push(*sci.parent_id.as_hash());
                }
            }
            for sfi in &txn.siafund_inputs {
                if state
                    .keys
                    .contains_key(&sfi.unlock_conditions.unlock_hash())
                {
                    to_sign.push(*sfi.parent_id.as_hash());
                }
            }
        }
        sign_existing(txn, &state.keys, &to_sign)
    }
}
