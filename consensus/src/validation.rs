//! The transaction validation rules.
//!
//! `validate` runs each rule group in a fixed order and reports the first
//! violation. Signature checking lives in [`crate::signatures`] and runs
//! last.

use num_bigint::BigUint;
use num_traits::ToPrimitive;

use cairn_crypto::merkle;
use cairn_types::{
    Currency, FileContractId, Hash, Transaction, UnlockConditions, UnlockHash,
};

use crate::error::ValidationError;
use crate::signatures::validate_signatures;
use crate::view::ConsensusView;

/// Decide whether `txn` is acceptable atop `view`.
pub fn validate<V: ConsensusView>(view: &V, txn: &Transaction) -> Result<(), ValidationError> {
    validate_storage_proof_rules(txn)?;
    validate_siacoins(view, txn)?;
    validate_file_contracts(view, txn)?;
    validate_terminations(view, txn)?;
    validate_storage_proofs(view, txn)?;
    validate_siafunds(view, txn)?;
    validate_signatures(txn)?;
    Ok(())
}

/// A transaction carrying storage proofs must not also create outputs the
/// proof outcome could bias: no siacoin outputs, file contracts,
/// terminations or siafund outputs.
pub fn validate_storage_proof_rules(txn: &Transaction) -> Result<(), ValidationError> {
    if txn.storage_proofs.is_empty() {
        return Ok(());
    }
    if !txn.siacoin_outputs.is_empty()
        || !txn.file_contracts.is_empty()
        || !txn.file_contract_terminations.is_empty()
        || !txn.siafund_outputs.is_empty()
    {
        return Err(ValidationError::StorageProofWithForbiddenOutputs);
    }
    Ok(())
}

/// Unlock conditions must hash to the expected unlock hash and their
/// timelock must have matured. Signatures are checked elsewhere.
fn valid_unlock_conditions<V: ConsensusView>(
    view: &V,
    conditions: &UnlockConditions,
    expected: &UnlockHash,
) -> Result<(), ValidationError> {
    if conditions.unlock_hash() != *expected {
        return Err(ValidationError::UnlockHashMismatch);
    }
    if conditions.timelock > view.height() {
        return Err(ValidationError::TimelockNotMet);
    }
    Ok(())
}

/// Every siacoin input spends an existing output under matching unlock
/// conditions, and the input sum equals the transaction's siacoin output
/// sum (fees, contract payouts, created outputs).
pub fn validate_siacoins<V: ConsensusView>(
    view: &V,
    txn: &Transaction,
) -> Result<(), ValidationError> {
    let mut input_sum = Currency::zero();
    for input in &txn.siacoin_inputs {
        let output = view
            .siacoin_output(&input.parent_id)
            .ok_or(ValidationError::MissingSiacoinOutput(input.parent_id))?;
        valid_unlock_conditions(view, &input.unlock_conditions, &output.unlock_hash)?;
        input_sum += &output.value;
    }
    let output_sum = txn.siacoin_output_sum();
    if input_sum != output_sum {
        return Err(ValidationError::InputsOutputsMismatch {
            inputs: input_sum,
            outputs: output_sum,
        });
    }
    Ok(())
}

/// Every new file contract starts in the future, lasts at least one block,
/// and distributes its payout exactly: valid-proof outputs sum to the
/// payout minus the siafund tax, missed-proof outputs sum to the payout.
pub fn validate_file_contracts<V: ConsensusView>(
    view: &V,
    txn: &Transaction,
) -> Result<(), ValidationError> {
    for fc in &txn.file_contracts {
        if fc.start <= view.height() {
            return Err(ValidationError::ContractStartInPast);
        }
        if fc.expiration <= fc.start {
            return Err(ValidationError::ContractDurationZero);
        }

        let valid_sum: Currency = fc.valid_proof_outputs.iter().map(|o| &o.value).sum();
        let missed_sum: Currency = fc.missed_proof_outputs.iter().map(|o| &o.value).sum();
        let output_portion = fc
            .payout
            .checked_sub(&fc.tax())
            .ok_or(ValidationError::ContractPayoutMismatch)?;
        if valid_sum != output_portion {
            return Err(ValidationError::ContractPayoutMismatch);
        }
        if missed_sum != fc.payout {
            return Err(ValidationError::ContractPayoutMismatch);
        }
    }
    Ok(())
}

/// Every termination dissolves an existing contract under conditions that
/// hash to the contract's termination hash, and redistributes the full
/// payout.
pub fn validate_terminations<V: ConsensusView>(
    view: &V,
    txn: &Transaction,
) -> Result<(), ValidationError> {
    for fct in &txn.file_contract_terminations {
        let fc = view
            .file_contract(&fct.parent_id)
            .ok_or(ValidationError::MissingFileContract(fct.parent_id))?;
        valid_unlock_conditions(view, &fct.termination_conditions, &fc.termination_hash)?;

        let payout_sum: Currency = fct.payouts.iter().map(|o| &o.value).sum();
        if payout_sum != fc.payout {
            return Err(ValidationError::ContractTerminationMismatch);
        }
    }
    Ok(())
}

/// The segment index a storage proof for `fcid` must prove.
///
/// The challenge is seeded by the block preceding the contract's start: its
/// id is hashed together with the contract id, and the hash, read as a
/// big-endian integer, is reduced modulo the number of segments. The slight
/// bias toward low indices is far below any practical significance.
pub fn storage_proof_segment<V: ConsensusView>(
    view: &V,
    fcid: &FileContractId,
) -> Result<u64, ValidationError> {
    let fc = view
        .file_contract(fcid)
        .ok_or(ValidationError::MissingFileContract(*fcid))?;

    let trigger_height = fc
        .start
        .checked_sub(1)
        .ok_or(ValidationError::TriggerBlockNotFound)?;
    if trigger_height > view.height() {
        return Err(ValidationError::TriggerBlockNotFound);
    }
    let trigger_id = view
        .block_id(trigger_height)
        .ok_or(ValidationError::TriggerBlockNotFound)?;

    let seed = Hash::of_all(&[trigger_id.as_hash().as_bytes(), fcid.as_hash().as_bytes()]);
    let num_segments = merkle::segments_for_file_size(fc.file_size);
    let index = BigUint::from_bytes_be(seed.as_bytes()) % num_segments;
    // the remainder is < num_segments, which fits in a u64
    Ok(index.to_u64().unwrap_or_default())
}

/// Every storage proof names an existing contract and proves the challenged
/// segment against the contract's file Merkle root.
pub fn validate_storage_proofs<V: ConsensusView>(
    view: &V,
    txn: &Transaction,
) -> Result<(), ValidationError> {
    for sp in &txn.storage_proofs {
        let fc = view
            .file_contract(&sp.parent_id)
            .ok_or(ValidationError::MissingFileContract(sp.parent_id))?;

        let segment_index = storage_proof_segment(view, &sp.parent_id)?;
        let verified = merkle::verify_segment(
            &sp.segment,
            &sp.hash_set,
            merkle::segments_for_file_size(fc.file_size),
            segment_index,
            &fc.file_merkle_root,
        );
        if !verified {
            return Err(ValidationError::StorageProofInvalid);
        }
    }
    Ok(())
}

/// Every siafund input spends an existing output under matching unlock
/// conditions; created siafund outputs have a zero claim start; input and
/// output sums match.
pub fn validate_siafunds<V: ConsensusView>(
    view: &V,
    txn: &Transaction,
) -> Result<(), ValidationError> {
    let mut input_sum = Currency::zero();
    for input in &txn.siafund_inputs {
        let output = view
            .siafund_output(&input.parent_id)
            .ok_or(ValidationError::MissingSiafundOutput(input.parent_id))?;
        valid_unlock_conditions(view, &input.unlock_conditions, &output.unlock_hash)?;
        input_sum += &output.value;
    }

    let mut output_sum = Currency::zero();
    for output in &txn.siafund_outputs {
        // Type safety upstream should already enforce this, but a claim
        // start smuggled in from the wire would mint siacoins.
        if !output.claim_start.is_zero() {
            return Err(ValidationError::NonZeroClaimStart);
        }
        output_sum += &output.value;
    }
    if input_sum != output_sum {
        return Err(ValidationError::SiafundInputsOutputsMismatch {
            inputs: input_sum,
            outputs: output_sum,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::Snapshot;
    use cairn_crypto::{keypair_from_seed, merkle, sign_hash};
    use cairn_types::{
        BlockHeight, BlockId, CoveredFields, FileContract, Segment, SiacoinInput, SiacoinOutput,
        SiacoinOutputId, SiafundInput, SiafundOutput, SiafundOutputId, StorageProof,
        TransactionSignature,
    };
    use cairn_types::params::SEGMENT_SIZE;

    struct Owner {
        seed: [u8; 32],
        conditions: UnlockConditions,
    }

    fn owner(seed_byte: u8) -> Owner {
        let seed = [seed_byte; 32];
        let kp = keypair_from_seed(&seed);
        Owner {
            seed,
            conditions: UnlockConditions::standard(kp.public),
        }
    }

    fn sign_whole(txn: &mut Transaction, parent_id: Hash, owner: &Owner) {
        txn.transaction_signatures.push(TransactionSignature {
            parent_id,
            public_key_index: 0,
            covered_fields: CoveredFields::whole(),
            signature: vec![],
        });
        let index = txn.transaction_signatures.len() - 1;
        let sig_hash = txn.sig_hash(index).unwrap();
        let kp = keypair_from_seed(&owner.seed);
        txn.transaction_signatures[index].signature =
            sign_hash(&sig_hash, &kp.private).as_bytes().to_vec();
    }

    fn snapshot_at(height: u64) -> Snapshot {
        let mut snap = Snapshot::new();
        snap.set_height(BlockHeight::new(height));
        snap
    }

    fn scoid(byte: u8) -> SiacoinOutputId {
        SiacoinOutputId::new(Hash::new([byte; 32]))
    }

    fn fcid(byte: u8) -> FileContractId {
        FileContractId::new(Hash::new([byte; 32]))
    }

    /// A view with one 100-coin output owned by `owner`, and a transaction
    /// spending it into fees.
    fn funded_txn(owner: &Owner) -> (Snapshot, Transaction) {
        let mut snap = snapshot_at(10);
        snap.insert_siacoin_output(
            scoid(1),
            SiacoinOutput {
                value: Currency::from_u64(100),
                unlock_hash: owner.conditions.unlock_hash(),
            },
        );
        let mut txn = Transaction {
            siacoin_inputs: vec![SiacoinInput {
                parent_id: scoid(1),
                unlock_conditions: owner.conditions.clone(),
            }],
            miner_fees: vec![Currency::from_u64(100)],
            ..Transaction::default()
        };
        sign_whole(&mut txn, *scoid(1).as_hash(), owner);
        (snap, txn)
    }

    #[test]
    fn accepts_simple_spend() {
        let owner = owner(1);
        let (snap, txn) = funded_txn(&owner);
        assert_eq!(validate(&snap, &txn), Ok(()));
    }

    #[test]
    fn validation_is_deterministic() {
        let owner = owner(1);
        let (snap, txn) = funded_txn(&owner);
        assert_eq!(validate(&snap, &txn), validate(&snap, &txn));
    }

    #[test]
    fn storage_proof_exclusivity() {
        let mut txn = Transaction::default();
        txn.storage_proofs.push(StorageProof {
            parent_id: fcid(9),
            segment: Segment::ZERO,
            hash_set: vec![],
        });
        txn.siacoin_outputs.push(SiacoinOutput {
            value: Currency::from_u64(1),
            unlock_hash: UnlockHash::new(Hash::ZERO),
        });
        assert_eq!(
            validate(&snapshot_at(0), &txn),
            Err(ValidationError::StorageProofWithForbiddenOutputs)
        );
    }

    #[test]
    fn missing_siacoin_output() {
        let owner = owner(1);
        let (_, txn) = funded_txn(&owner);
        // empty view: the parent does not exist
        assert_eq!(
            validate(&snapshot_at(10), &txn),
            Err(ValidationError::MissingSiacoinOutput(scoid(1)))
        );
    }

    #[test]
    fn unlock_hash_mismatch() {
        let owner = owner(1);
        let intruder = self::owner(2);
        let (snap, mut txn) = funded_txn(&owner);
        txn.siacoin_inputs[0].unlock_conditions = intruder.conditions.clone();
        assert_eq!(
            validate(&snap, &txn),
            Err(ValidationError::UnlockHashMismatch)
        );
    }

    #[test]
    fn input_timelock_not_met() {
        let seed = [3u8; 32];
        let kp = keypair_from_seed(&seed);
        let mut conditions = UnlockConditions::standard(kp.public);
        conditions.timelock = BlockHeight::new(50);
        let locked = Owner { seed, conditions };

        let mut snap = snapshot_at(10);
        snap.insert_siacoin_output(
            scoid(1),
            SiacoinOutput {
                value: Currency::from_u64(100),
                unlock_hash: locked.conditions.unlock_hash(),
            },
        );
        let txn = Transaction {
            siacoin_inputs: vec![SiacoinInput {
                parent_id: scoid(1),
                unlock_conditions: locked.conditions.clone(),
            }],
            miner_fees: vec![Currency::from_u64(100)],
            ..Transaction::default()
        };
        assert_eq!(validate(&snap, &txn), Err(ValidationError::TimelockNotMet));
    }

    #[test]
    fn inputs_must_equal_outputs() {
        let owner = owner(1);
        let (snap, mut txn) = funded_txn(&owner);
        txn.miner_fees[0] = Currency::from_u64(99);
        assert!(matches!(
            validate(&snap, &txn),
            Err(ValidationError::InputsOutputsMismatch { .. })
        ));
    }

    fn contract(payout: u64, start: u64, expiration: u64) -> FileContract {
        let payout = Currency::from_u64(payout);
        let fc = FileContract {
            start: BlockHeight::new(start),
            expiration: BlockHeight::new(expiration),
            payout: payout.clone(),
            file_merkle_root: Hash::ZERO,
            file_size: 0,
            valid_proof_outputs: vec![],
            missed_proof_outputs: vec![],
            termination_hash: UnlockHash::new(Hash::ZERO),
        };
        let valid_portion = fc.payout.checked_sub(&fc.tax()).unwrap();
        FileContract {
            valid_proof_outputs: vec![SiacoinOutput {
                value: valid_portion,
                unlock_hash: UnlockHash::new(Hash::ZERO),
            }],
            missed_proof_outputs: vec![SiacoinOutput {
                value: payout,
                unlock_hash: UnlockHash::new(Hash::ZERO),
            }],
            ..fc
        }
    }

    #[test]
    fn contract_must_start_in_future() {
        let mut txn = Transaction::default();
        txn.file_contracts.push(contract(1000, 5, 20));
        assert_eq!(
            validate_file_contracts(&snapshot_at(10), &txn),
            Err(ValidationError::ContractStartInPast)
        );
        assert_eq!(validate_file_contracts(&snapshot_at(4), &txn), Ok(()));
    }

    #[test]
    fn contract_duration_must_be_positive() {
        let mut txn = Transaction::default();
        txn.file_contracts.push(contract(1000, 20, 20));
        assert_eq!(
            validate_file_contracts(&snapshot_at(10), &txn),
            Err(ValidationError::ContractDurationZero)
        );
    }

    #[test]
    fn contract_payout_mismatch() {
        // payout 1000, tax 40: valid-proof outputs must sum to 960
        let mut fc = contract(1000, 20, 30);
        fc.valid_proof_outputs[0].value = Currency::from_u64(900);
        let mut txn = Transaction::default();
        txn.file_contracts.push(fc);
        assert_eq!(
            validate_file_contracts(&snapshot_at(10), &txn),
            Err(ValidationError::ContractPayoutMismatch)
        );
    }

    #[test]
    fn contract_missed_payout_mismatch() {
        let mut fc = contract(1000, 20, 30);
        fc.missed_proof_outputs[0].value = Currency::from_u64(999);
        let mut txn = Transaction::default();
        txn.file_contracts.push(fc);
        assert_eq!(
            validate_file_contracts(&snapshot_at(10), &txn),
            Err(ValidationError::ContractPayoutMismatch)
        );
    }

    #[test]
    fn termination_rules() {
        let owner = owner(4);
        let mut fc = contract(1000, 20, 30);
        fc.termination_hash = owner.conditions.unlock_hash();

        let mut snap = snapshot_at(10);
        snap.insert_file_contract(fcid(7), fc);

        let mut txn = Transaction::default();
        txn.file_contract_terminations
            .push(cairn_types::FileContractTermination {
                parent_id: fcid(7),
                termination_conditions: owner.conditions.clone(),
                payouts: vec![SiacoinOutput {
                    value: Currency::from_u64(1000),
                    unlock_hash: UnlockHash::new(Hash::ZERO),
                }],
            });
        assert_eq!(validate_terminations(&snap, &txn), Ok(()));

        txn.file_contract_terminations[0].payouts[0].value = Currency::from_u64(999);
        assert_eq!(
            validate_terminations(&snap, &txn),
            Err(ValidationError::ContractTerminationMismatch)
        );

        txn.file_contract_terminations[0].parent_id = fcid(8);
        assert_eq!(
            validate_terminations(&snap, &txn),
            Err(ValidationError::MissingFileContract(fcid(8)))
        );
    }

    /// Full storage-proof flow: build a file, commit its root in a
    /// contract, advance past the trigger block, prove the challenged
    /// segment.
    #[test]
    fn storage_proof_roundtrip() {
        let segments: Vec<Segment> = (0..7u8)
            .map(|i| Segment::new([i; SEGMENT_SIZE]))
            .collect();
        let mut fc = contract(1000, 5, 50);
        fc.file_size = (segments.len() * SEGMENT_SIZE) as u64;
        fc.file_merkle_root = merkle::segment_root(&segments);

        let mut snap = Snapshot::new();
        for i in 0..10u8 {
            snap.push_block(BlockId::new(Hash::new([i; 32])));
        }
        let id = fcid(7);
        snap.insert_file_contract(id, fc);

        let index = storage_proof_segment(&snap, &id).unwrap();
        let proof = merkle::build_segment_proof(&segments, index).unwrap();

        let mut txn = Transaction::default();
        txn.storage_proofs.push(StorageProof {
            parent_id: id,
            segment: segments[index as usize],
            hash_set: proof,
        });
        assert_eq!(validate(&snap, &txn), Ok(()));

        // corrupting the segment invalidates the proof
        txn.storage_proofs[0].segment = Segment::new([0xEE; SEGMENT_SIZE]);
        assert_eq!(
            validate(&snap, &txn),
            Err(ValidationError::StorageProofInvalid)
        );
    }

    #[test]
    fn storage_proof_before_trigger_block() {
        let mut fc = contract(1000, 20, 50);
        fc.file_size = SEGMENT_SIZE as u64;

        let mut snap = Snapshot::new();
        for i in 0..5u8 {
            snap.push_block(BlockId::new(Hash::new([i; 32])));
        }
        let id = fcid(3);
        snap.insert_file_contract(id, fc);

        assert_eq!(
            storage_proof_segment(&snap, &id),
            Err(ValidationError::TriggerBlockNotFound)
        );
    }

    #[test]
    fn siafund_flow() {
        let owner = owner(5);
        let sfoid = SiafundOutputId::new(Hash::new([6; 32]));

        let mut snap = snapshot_at(10);
        snap.insert_siafund_output(
            sfoid,
            SiafundOutput {
                value: Currency::from_u64(20),
                unlock_hash: owner.conditions.unlock_hash(),
                claim_start: Currency::zero(),
            },
        );

        let mut txn = Transaction {
            siafund_inputs: vec![SiafundInput {
                parent_id: sfoid,
                unlock_conditions: owner.conditions.clone(),
                claim_unlock_hash: UnlockHash::new(Hash::ZERO),
            }],
            siafund_outputs: vec![SiafundOutput {
                value: Currency::from_u64(20),
                unlock_hash: UnlockHash::new(Hash::ZERO),
                claim_start: Currency::zero(),
            }],
            ..Transaction::default()
        };
        assert_eq!(validate_siafunds(&snap, &txn), Ok(()));

        txn.siafund_outputs[0].claim_start = Currency::from_u64(1);
        assert_eq!(
            validate_siafunds(&snap, &txn),
            Err(ValidationError::NonZeroClaimStart)
        );

        txn.siafund_outputs[0].claim_start = Currency::zero();
        txn.siafund_outputs[0].value = Currency::from_u64(19);
        assert!(matches!(
            validate_siafunds(&snap, &txn),
            Err(ValidationError::SiafundInputsOutputsMismatch { .. })
        ));
    }
}
