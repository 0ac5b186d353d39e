//! The shared signing routines.

use std::collections::HashMap;

use cairn_crypto::{public_from_private, sign_hash};
use cairn_types::{
    CoveredFields, Hash, Transaction, TransactionSignature, UnlockConditions, UnlockHash,
};

use crate::error::WalletError;
use crate::keys::{generate_keys, SpendableKey};

/// Sign one parent of `txn` with a spendable key, with support for multisig
/// conditions.
///
/// Public keys are matched in the order they appear in the unlock
/// conditions, each to the first secret key that derives it, and one
/// signature is appended per match until `signatures_required` is reached.
/// For a fixed transaction and key set the appended signatures are
/// byte-identical across runs. Returns the indices of the appended
/// signatures.
pub(crate) fn add_signatures(
    txn: &mut Transaction,
    covered_fields: &CoveredFields,
    conditions: &UnlockConditions,
    parent_id: Hash,
    key: &SpendableKey,
) -> Result<Vec<usize>, WalletError> {
    let mut new_indices = Vec::new();
    let mut total_signatures = 0u64;
    for (key_index, public_key) in conditions.public_keys.iter().enumerate() {
        // Search for the matching secret key. Some public keys may have no
        // match, and one secret key may satisfy several slots.
        for secret in &key.secret_keys {
            let derived = public_from_private(secret);
            if public_key.key.as_slice() != derived.as_bytes() {
                continue;
            }

            txn.transaction_signatures.push(TransactionSignature {
                parent_id,
                public_key_index: key_index as u64,
                covered_fields: covered_fields.clone(),
                signature: Vec::new(),
            });
            let sig_index = txn.transaction_signatures.len() - 1;
            let sig_hash = txn
                .sig_hash(sig_index)
                .ok_or(WalletError::InvalidCoveredFields)?;
            let signature = sign_hash(&sig_hash, secret);
            txn.transaction_signatures[sig_index].signature = signature.as_bytes().to_vec();
            new_indices.push(sig_index);

            total_signatures += 1;
            break;
        }

        if total_signatures == conditions.signatures_required {
            break;
        }
    }
    Ok(new_indices)
}

/// Fill in the signature fields referenced by `to_sign` using `keys`.
///
/// Every named parent must already have a signature slot in the
/// transaction; existing signature bytes are overwritten.
pub(crate) fn sign_existing(
    txn: &mut Transaction,
    keys: &HashMap<UnlockHash, SpendableKey>,
    to_sign: &[Hash],
) -> Result<(), WalletError> {
    for id in to_sign {
        let sig_index = txn
            .transaction_signatures
            .iter()
            .position(|sig| sig.parent_id == *id)
            .ok_or(WalletError::MissingTransactionSignature(*id))?;

        let conditions =
            find_unlock_conditions(txn, id).ok_or(WalletError::UnknownSignatureParent)?;
        let key_index = txn.transaction_signatures[sig_index].public_key_index;
        let secret = find_signing_key(keys, &conditions, key_index)
            .ok_or(WalletError::CannotSignInput)?;

        let sig_hash = txn
            .sig_hash(sig_index)
            .ok_or(WalletError::InvalidCoveredFields)?;
        let signature = sign_hash(&sig_hash, secret);
        txn.transaction_signatures[sig_index].signature = signature.as_bytes().to_vec();
    }
    Ok(())
}

/// Sign `txn` using keys derived from a bare seed.
///
/// `to_sign` must name the parents explicitly; without the wallet's key
/// index there is no way to know which inputs are signable short of deriving
/// every key. Derivation stops at `max_keys`; if the needed key lies beyond
/// the bound, `KeySearchExhausted` is returned.
pub fn sign_transaction_with_seed(
    txn: &mut Transaction,
    seed: &[u8; 32],
    to_sign: &[Hash],
    max_keys: u64,
) -> Result<(), WalletError> {
    if to_sign.is_empty() {
        return Err(WalletError::ToSignEmpty);
    }

    let mut keys = HashMap::new();
    for key in generate_keys(seed, 0, max_keys) {
        keys.insert(key.unlock_conditions.unlock_hash(), key);
    }

    sign_existing(txn, &keys, to_sign).map_err(|err| match err {
        WalletError::CannotSignInput => WalletError::KeySearchExhausted,
        other => other,
    })
}

fn find_unlock_conditions(txn: &Transaction, id: &Hash) -> Option<UnlockConditions> {
    for sci in &txn.siacoin_inputs {
        if sci.parent_id.as_hash() == id {
            return Some(sci.unlock_conditions.clone());
        }
    }
    for sfi in &txn.siafund_inputs {
        if sfi.parent_id.as_hash() == id {
            return Some(sfi.unlock_conditions.clone());
        }
    }
    None
}

fn find_signing_key<'a>(
    keys: &'a HashMap<UnlockHash, SpendableKey>,
    conditions: &UnlockConditions,
    key_index: u64,
) -> Option<&'a cairn_types::PrivateKey> {
    let public_key = conditions.public_keys.get(key_index as usize)?;
    let spend_key = keys.get(&conditions.unlock_hash())?;
    spend_key
        .secret_keys
        .iter()
        .find(|secret| public_from_private(secret).as_bytes() == public_key.key.as_slice())
}
