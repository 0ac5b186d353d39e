//! Signature validation over covered fields.

use std::collections::{HashMap, HashSet};

use cairn_crypto::sign::verify_hash_bytes;
use cairn_types::{Hash, Transaction, UnlockConditions};

use crate::error::ValidationError;

/// Everything one parent (input or termination) needs signed.
struct SigSlot<'a> {
    conditions: &'a UnlockConditions,
    used_keys: HashSet<u64>,
    valid: u64,
}

/// Check every transaction signature and require each spend to reach its
/// `signatures_required` count.
///
/// A signature slot exists for every siacoin input, siafund input and
/// contract termination, keyed by parent id. Repeated signatures by the same
/// key index are counted once. Keys with an unrecognized algorithm verify as
/// valid so that upgraded key types do not split old validators from new
/// ones. An under-signed transaction is reported for the first short parent
/// in list order, keeping the result identical across calls.
pub fn validate_signatures(txn: &Transaction) -> Result<(), ValidationError> {
    let mut slots: HashMap<Hash, SigSlot<'_>> = HashMap::new();
    for input in &txn.siacoin_inputs {
        slots.insert(
            *input.parent_id.as_hash(),
            SigSlot {
                conditions: &input.unlock_conditions,
                used_keys: HashSet::new(),
                valid: 0,
            },
        );
    }
    for input in &txn.siafund_inputs {
        slots.insert(
            *input.parent_id.as_hash(),
            SigSlot {
                conditions: &input.unlock_conditions,
                used_keys: HashSet::new(),
                valid: 0,
            },
        );
    }
    for termination in &txn.file_contract_terminations {
        slots.insert(
            *termination.parent_id.as_hash(),
            SigSlot {
                conditions: &termination.termination_conditions,
                used_keys: HashSet::new(),
                valid: 0,
            },
        );
    }

    for (index, sig) in txn.transaction_signatures.iter().enumerate() {
        if sig.covered_fields.whole_transaction && sig.covered_fields.has_explicit_indices() {
            return Err(ValidationError::WholeTransactionWithExplicitFields);
        }

        let slot = slots
            .get_mut(&sig.parent_id)
            .ok_or(ValidationError::UnrelatedSignature)?;
        let key = slot
            .conditions
            .public_keys
            .get(sig.public_key_index as usize)
            .ok_or(ValidationError::InvalidPublicKeyIndex)?;

        // only the first signature per (parent, key index) counts
        if !slot.used_keys.insert(sig.public_key_index) {
            continue;
        }

        if key.is_ed25519() {
            let sig_hash = txn
                .sig_hash(index)
                .ok_or(ValidationError::InvalidCoveredFields)?;
            if !verify_hash_bytes(&sig_hash, &sig.signature, &key.key) {
                return Err(ValidationError::InvalidSignature);
            }
        }
        slot.valid += 1;
    }

    // check the slots in parent list order, never in map order
    let parent_ids = txn
        .siacoin_inputs
        .iter()
        .map(|input| input.parent_id.as_hash())
        .chain(txn.siafund_inputs.iter().map(|input| input.parent_id.as_hash()))
        .chain(
            txn.file_contract_terminations
                .iter()
                .map(|termination| termination.parent_id.as_hash()),
        );
    for id in parent_ids {
        if let Some(slot) = slots.get(id) {
            if slot.valid < slot.conditions.signatures_required {
                return Err(ValidationError::InsufficientSignatures {
                    required: slot.conditions.signatures_required,
                    got: slot.valid,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairn_crypto::{keypair_from_seed, sign_hash};
    use cairn_types::{
        CoveredFields, Currency, SiacoinInput, SiacoinOutputId, Specifier, TransactionSignature,
        UnlockPublicKey,
    };

    fn input_with(conditions: UnlockConditions) -> SiacoinInput {
        SiacoinInput {
            parent_id: SiacoinOutputId::new(Hash::new([1; 32])),
            unlock_conditions: conditions,
        }
    }

    fn push_signature(txn: &mut Transaction, key_index: u64, seed: &[u8; 32]) {
        txn.transaction_signatures.push(TransactionSignature {
            parent_id: Hash::new([1; 32]),
            public_key_index: key_index,
            covered_fields: CoveredFields::whole(),
            signature: vec![],
        });
        let index = txn.transaction_signatures.len() - 1;
        let sig_hash = txn.sig_hash(index).unwrap();
        let kp = keypair_from_seed(seed);
        txn.transaction_signatures[index].signature =
            sign_hash(&sig_hash, &kp.private).as_bytes().to_vec();
    }

    #[test]
    fn single_key_satisfied() {
        let seed = [1u8; 32];
        let kp = keypair_from_seed(&seed);
        let mut txn = Transaction {
            siacoin_inputs: vec![input_with(UnlockConditions::standard(kp.public))],
            miner_fees: vec![Currency::zero()],
            ..Transaction::default()
        };
        push_signature(&mut txn, 0, &seed);
        assert_eq!(validate_signatures(&txn), Ok(()));
    }

    #[test]
    fn missing_signatures_reported() {
        let kp = keypair_from_seed(&[1u8; 32]);
        let txn = Transaction {
            siacoin_inputs: vec![input_with(UnlockConditions::standard(kp.public))],
            ..Transaction::default()
        };
        assert_eq!(
            validate_signatures(&txn),
            Err(ValidationError::InsufficientSignatures {
                required: 1,
                got: 0
            })
        );
    }

    #[test]
    fn forged_signature_rejected() {
        let kp = keypair_from_seed(&[1u8; 32]);
        let mut txn = Transaction {
            siacoin_inputs: vec![input_with(UnlockConditions::standard(kp.public))],
            ..Transaction::default()
        };
        // signed by a key that is not in the unlock conditions
        push_signature(&mut txn, 0, &[2u8; 32]);
        assert_eq!(
            validate_signatures(&txn),
            Err(ValidationError::InvalidSignature)
        );
    }

    #[test]
    fn unrelated_signature_rejected() {
        let mut txn = Transaction::default();
        txn.transaction_signatures.push(TransactionSignature {
            parent_id: Hash::new([9; 32]),
            public_key_index: 0,
            covered_fields: CoveredFields::whole(),
            signature: vec![],
        });
        assert_eq!(
            validate_signatures(&txn),
            Err(ValidationError::UnrelatedSignature)
        );
    }

    #[test]
    fn key_index_out_of_range() {
        let kp = keypair_from_seed(&[1u8; 32]);
        let mut txn = Transaction {
            siacoin_inputs: vec![input_with(UnlockConditions::standard(kp.public))],
            ..Transaction::default()
        };
        txn.transaction_signatures.push(TransactionSignature {
            parent_id: Hash::new([1; 32]),
            public_key_index: 3,
            covered_fields: CoveredFields::whole(),
            signature: vec![],
        });
        assert_eq!(
            validate_signatures(&txn),
            Err(ValidationError::InvalidPublicKeyIndex)
        );
    }

    #[test]
    fn whole_transaction_with_explicit_indices_rejected() {
        let kp = keypair_from_seed(&[1u8; 32]);
        let mut txn = Transaction {
            siacoin_inputs: vec![input_with(UnlockConditions::standard(kp.public))],
            ..Transaction::default()
        };
        let mut cf = CoveredFields::whole();
        cf.siacoin_inputs.push(0);
        txn.transaction_signatures.push(TransactionSignature {
            parent_id: Hash::new([1; 32]),
            public_key_index: 0,
            covered_fields: cf,
            signature: vec![],
        });
        assert_eq!(
            validate_signatures(&txn),
            Err(ValidationError::WholeTransactionWithExplicitFields)
        );
    }

    #[test]
    fn two_of_two_multisig() {
        let seed_a = [1u8; 32];
        let seed_b = [2u8; 32];
        let conditions = UnlockConditions {
            timelock: cairn_types::BlockHeight::ZERO,
            public_keys: vec![
                UnlockPublicKey::ed25519(keypair_from_seed(&seed_a).public),
                UnlockPublicKey::ed25519(keypair_from_seed(&seed_b).public),
            ],
            signatures_required: 2,
        };
        let mut txn = Transaction {
            siacoin_inputs: vec![input_with(conditions)],
            ..Transaction::default()
        };
        push_signature(&mut txn, 0, &seed_a);
        assert_eq!(
            validate_signatures(&txn),
            Err(ValidationError::InsufficientSignatures {
                required: 2,
                got: 1
            })
        );
        push_signature(&mut txn, 1, &seed_b);
        assert_eq!(validate_signatures(&txn), Ok(()));
    }

    #[test]
    fn repeated_key_counts_once() {
        let seed = [1u8; 32];
        let kp = keypair_from_seed(&seed);
        let mut conditions = UnlockConditions::standard(kp.public);
        conditions.public_keys.push(UnlockPublicKey::ed25519(
            keypair_from_seed(&[2u8; 32]).public,
        ));
        conditions.signatures_required = 2;

        let mut txn = Transaction {
            siacoin_inputs: vec![input_with(conditions)],
            ..Transaction::default()
        };
        push_signature(&mut txn, 0, &seed);
        push_signature(&mut txn, 0, &seed);
        assert_eq!(
            validate_signatures(&txn),
            Err(ValidationError::InsufficientSignatures {
                required: 2,
                got: 1
            })
        );
    }

    #[test]
    fn first_short_parent_in_list_order_is_reported() {
        let single = keypair_from_seed(&[1u8; 32]);
        let multisig = UnlockConditions {
            timelock: cairn_types::BlockHeight::ZERO,
            public_keys: vec![
                UnlockPublicKey::ed25519(keypair_from_seed(&[2u8; 32]).public),
                UnlockPublicKey::ed25519(keypair_from_seed(&[3u8; 32]).public),
            ],
            signatures_required: 2,
        };
        // both inputs are unsigned; the first one in the list decides the
        // error payload
        let txn = Transaction {
            siacoin_inputs: vec![
                input_with(UnlockConditions::standard(single.public)),
                SiacoinInput {
                    parent_id: SiacoinOutputId::new(Hash::new([2; 32])),
                    unlock_conditions: multisig,
                },
            ],
            ..Transaction::default()
        };

        let expected = Err(ValidationError::InsufficientSignatures {
            required: 1,
            got: 0,
        });
        assert_eq!(validate_signatures(&txn), expected);
        assert_eq!(validate_signatures(&txn), expected);
    }

    #[test]
    fn unknown_algorithm_is_accepted() {
        let conditions = UnlockConditions {
            timelock: cairn_types::BlockHeight::ZERO,
            public_keys: vec![UnlockPublicKey {
                algorithm: Specifier::new(*b"entropy\0\0\0\0\0\0\0\0\0"),
                key: vec![0u8; 32],
            }],
            signatures_required: 1,
        };
        let mut txn = Transaction {
            siacoin_inputs: vec![input_with(conditions)],
            ..Transaction::default()
        };
        txn.transaction_signatures.push(TransactionSignature {
            parent_id: Hash::new([1; 32]),
            public_key_index: 0,
            covered_fields: CoveredFields::whole(),
            signature: vec![],
        });
        assert_eq!(validate_signatures(&txn), Ok(()));
    }
}
