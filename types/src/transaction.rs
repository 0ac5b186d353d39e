//! The transaction model: inputs, outputs, file contracts, storage proofs,
//! covered fields and signatures.
//!
//! Identity rules: a transaction's id and every id it derives for the
//! outputs it creates are hashes over the signature-free canonical encoding,
//! so adding or replacing signatures never changes an id. Signature hashes
//! are computed over the covered-fields view described on [`Transaction::sig_hash`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::currency::Currency;
use crate::encoding::{self, CanonicalEncode};
use crate::hash::{FileContractId, Hash, SiacoinOutputId, SiafundOutputId, TransactionId};
use crate::height::BlockHeight;
use crate::params::{
    SEGMENT_SIZE, SPECIFIER_FILE_CONTRACT, SPECIFIER_SIACOIN_OUTPUT, SPECIFIER_SIAFUND_OUTPUT,
    TAX_DENOMINATOR, TAX_NUMERATOR,
};
use crate::unlock::{UnlockConditions, UnlockHash};

/// A siacoin output: a value claimable by whoever can satisfy the conditions
/// hashing to `unlock_hash`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiacoinOutput {
    pub value: Currency,
    pub unlock_hash: UnlockHash,
}

impl CanonicalEncode for SiacoinOutput {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        self.value.encode_to(buf);
        self.unlock_hash.encode_to(buf);
    }
}

/// A siafund output. `claim_start` records the cumulative siafund pool at
/// the time the output was created and must be zero when the output first
/// appears in a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiafundOutput {
    pub value: Currency,
    pub unlock_hash: UnlockHash,
    pub claim_start: Currency,
}

impl CanonicalEncode for SiafundOutput {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        self.value.encode_to(buf);
        self.unlock_hash.encode_to(buf);
        self.claim_start.encode_to(buf);
    }
}

/// Spends a siacoin output by revealing its unlock conditions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiacoinInput {
    pub parent_id: SiacoinOutputId,
    pub unlock_conditions: UnlockConditions,
}

impl CanonicalEncode for SiacoinInput {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        self.parent_id.encode_to(buf);
        self.unlock_conditions.encode_to(buf);
    }
}

/// Spends a siafund output. The accrued siacoin claim is paid to
/// `claim_unlock_hash`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiafundInput {
    pub parent_id: SiafundOutputId,
    pub unlock_conditions: UnlockConditions,
    pub claim_unlock_hash: UnlockHash,
}

impl CanonicalEncode for SiafundInput {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        self.parent_id.encode_to(buf);
        self.unlock_conditions.encode_to(buf);
        self.claim_unlock_hash.encode_to(buf);
    }
}

/// An agreement to store a file, settled by a storage proof inside the
/// window `[start, expiration)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileContract {
    pub start: BlockHeight,
    pub expiration: BlockHeight,
    pub payout: Currency,
    pub file_merkle_root: Hash,
    pub file_size: u64,
    pub valid_proof_outputs: Vec<SiacoinOutput>,
    pub missed_proof_outputs: Vec<SiacoinOutput>,
    pub termination_hash: UnlockHash,
}

impl FileContract {
    /// The siafund fee levied on the payout, floor of
    /// `payout * TAX_NUMERATOR / TAX_DENOMINATOR`.
    pub fn tax(&self) -> Currency {
        // TAX_DENOMINATOR is a nonzero constant.
        self.payout
            .mul_u64(TAX_NUMERATOR)
            .div_u64(TAX_DENOMINATOR)
            .unwrap_or_default()
    }
}

impl CanonicalEncode for FileContract {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        self.start.encode_to(buf);
        self.expiration.encode_to(buf);
        self.payout.encode_to(buf);
        self.file_merkle_root.encode_to(buf);
        encoding::write_u64(buf, self.file_size);
        encoding::write_list(buf, &self.valid_proof_outputs);
        encoding::write_list(buf, &self.missed_proof_outputs);
        self.termination_hash.encode_to(buf);
    }
}

/// Dissolves a live contract early, redistributing its full payout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileContractTermination {
    pub parent_id: FileContractId,
    pub termination_conditions: UnlockConditions,
    pub payouts: Vec<SiacoinOutput>,
}

impl CanonicalEncode for FileContractTermination {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        self.parent_id.encode_to(buf);
        self.termination_conditions.encode_to(buf);
        encoding::write_list(buf, &self.payouts);
    }
}

/// Replaces the negotiable fields of a live contract. Revisions are carried
/// and signed like any other field; applying them to the contract set
/// happens during block application, outside this crate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileContractRevision {
    pub parent_id: FileContractId,
    pub unlock_conditions: UnlockConditions,
    pub new_revision_number: u64,
    pub new_file_size: u64,
    pub new_file_merkle_root: Hash,
    pub new_expiration: BlockHeight,
    pub new_valid_proof_outputs: Vec<SiacoinOutput>,
    pub new_missed_proof_outputs: Vec<SiacoinOutput>,
    pub new_unlock_hash: UnlockHash,
}

impl CanonicalEncode for FileContractRevision {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        self.parent_id.encode_to(buf);
        self.unlock_conditions.encode_to(buf);
        encoding::write_u64(buf, self.new_revision_number);
        encoding::write_u64(buf, self.new_file_size);
        self.new_file_merkle_root.encode_to(buf);
        self.new_expiration.encode_to(buf);
        encoding::write_list(buf, &self.new_valid_proof_outputs);
        encoding::write_list(buf, &self.new_missed_proof_outputs);
        self.new_unlock_hash.encode_to(buf);
    }
}

/// One `SEGMENT_SIZE`-byte leaf of a contracted file.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Segment(pub [u8; SEGMENT_SIZE]);

impl Segment {
    pub const ZERO: Self = Self([0u8; SEGMENT_SIZE]);

    pub fn new(bytes: [u8; SEGMENT_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SEGMENT_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Segment(")?;
        for b in &self.0[..4] {
            write!(f, "{:02x}", b)?;
        }
        write!(f, "..)")
    }
}

impl Serialize for Segment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.0)
    }
}

impl<'de> Deserialize<'de> for Segment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SegmentVisitor;

        impl<'de> serde::de::Visitor<'de> for SegmentVisitor {
            type Value = Segment;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "{} bytes", SEGMENT_SIZE)
            }

            fn visit_bytes<E: serde::de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
                let arr: [u8; SEGMENT_SIZE] = v
                    .try_into()
                    .map_err(|_| E::invalid_length(v.len(), &self))?;
                Ok(Segment(arr))
            }

            fn visit_seq<A: serde::de::SeqAccess<'de>>(
                self,
                mut seq: A,
            ) -> Result<Self::Value, A::Error> {
                let mut arr = [0u8; SEGMENT_SIZE];
                for (i, byte) in arr.iter_mut().enumerate() {
                    *byte = seq
                        .next_element()?
                        .ok_or_else(|| serde::de::Error::invalid_length(i, &self))?;
                }
                Ok(Segment(arr))
            }
        }

        deserializer.deserialize_bytes(SegmentVisitor)
    }
}

impl CanonicalEncode for Segment {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.0);
    }
}

/// A Merkle proof that the host retains the challenged segment of a
/// contracted file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageProof {
    pub parent_id: FileContractId,
    pub segment: Segment,
    pub hash_set: Vec<Hash>,
}

impl CanonicalEncode for StorageProof {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        self.parent_id.encode_to(buf);
        self.segment.encode_to(buf);
        encoding::write_list(buf, &self.hash_set);
    }
}

/// The subset of a transaction a signature commits to.
///
/// Either `whole_transaction` is set and every other index list except
/// `transaction_signatures` is empty, or the signature covers exactly the
/// indexed elements. The signatures list itself is only ever covered by
/// explicit indices.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoveredFields {
    pub whole_transaction: bool,
    pub miner_fees: Vec<u64>,
    pub siacoin_inputs: Vec<u64>,
    pub siacoin_outputs: Vec<u64>,
    pub file_contracts: Vec<u64>,
    pub file_contract_terminations: Vec<u64>,
    pub file_contract_revisions: Vec<u64>,
    pub storage_proofs: Vec<u64>,
    pub siafund_inputs: Vec<u64>,
    pub siafund_outputs: Vec<u64>,
    pub arbitrary_data: Vec<u64>,
    pub transaction_signatures: Vec<u64>,
}

impl CoveredFields {
    /// Covered fields for a whole-transaction signature.
    pub fn whole() -> Self {
        Self {
            whole_transaction: true,
            ..Self::default()
        }
    }

    /// True when any per-field index list other than
    /// `transaction_signatures` is non-empty.
    pub fn has_explicit_indices(&self) -> bool {
        !self.miner_fees.is_empty()
            || !self.siacoin_inputs.is_empty()
            || !self.siacoin_outputs.is_empty()
            || !self.file_contracts.is_empty()
            || !self.file_contract_terminations.is_empty()
            || !self.file_contract_revisions.is_empty()
            || !self.storage_proofs.is_empty()
            || !self.siafund_inputs.is_empty()
            || !self.siafund_outputs.is_empty()
            || !self.arbitrary_data.is_empty()
    }
}

impl CanonicalEncode for CoveredFields {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        encoding::write_bool(buf, self.whole_transaction);
        encoding::write_list(buf, &self.miner_fees);
        encoding::write_list(buf, &self.siacoin_inputs);
        encoding::write_list(buf, &self.siacoin_outputs);
        encoding::write_list(buf, &self.file_contracts);
        encoding::write_list(buf, &self.file_contract_terminations);
        encoding::write_list(buf, &self.file_contract_revisions);
        encoding::write_list(buf, &self.storage_proofs);
        encoding::write_list(buf, &self.siafund_inputs);
        encoding::write_list(buf, &self.siafund_outputs);
        encoding::write_list(buf, &self.arbitrary_data);
        encoding::write_list(buf, &self.transaction_signatures);
    }
}

/// One signature over a covered-fields view of the transaction.
///
/// `parent_id` names the input (or termination) being authorized;
/// `public_key_index` selects the key inside that parent's unlock conditions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSignature {
    pub parent_id: Hash,
    pub public_key_index: u64,
    pub covered_fields: CoveredFields,
    pub signature: Vec<u8>,
}

impl CanonicalEncode for TransactionSignature {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        self.parent_id.encode_to(buf);
        encoding::write_u64(buf, self.public_key_index);
        self.covered_fields.encode_to(buf);
        encoding::write_bytes(buf, &self.signature);
    }
}

/// A transaction: the atomic unit of consensus change.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub siacoin_inputs: Vec<SiacoinInput>,
    pub siacoin_outputs: Vec<SiacoinOutput>,
    pub file_contracts: Vec<FileContract>,
    pub file_contract_terminations: Vec<FileContractTermination>,
    pub file_contract_revisions: Vec<FileContractRevision>,
    pub storage_proofs: Vec<StorageProof>,
    pub siafund_inputs: Vec<SiafundInput>,
    pub siafund_outputs: Vec<SiafundOutput>,
    pub miner_fees: Vec<Currency>,
    pub arbitrary_data: Vec<Vec<u8>>,
    pub transaction_signatures: Vec<TransactionSignature>,
}

impl Transaction {
    /// Encode every field except the signatures list, in declaration order.
    fn encode_no_signatures(&self, buf: &mut Vec<u8>) {
        encoding::write_list(buf, &self.siacoin_inputs);
        encoding::write_list(buf, &self.siacoin_outputs);
        encoding::write_list(buf, &self.file_contracts);
        encoding::write_list(buf, &self.file_contract_terminations);
        encoding::write_list(buf, &self.file_contract_revisions);
        encoding::write_list(buf, &self.storage_proofs);
        encoding::write_list(buf, &self.siafund_inputs);
        encoding::write_list(buf, &self.siafund_outputs);
        encoding::write_list(buf, &self.miner_fees);
        encoding::write_list(buf, &self.arbitrary_data);
    }

    /// The transaction id: hash of the signature-free encoding.
    pub fn id(&self) -> TransactionId {
        let mut buf = Vec::new();
        self.encode_no_signatures(&mut buf);
        TransactionId::new(Hash::of(&buf))
    }

    fn derived_id(&self, specifier: &crate::hash::Specifier, index: u64) -> Hash {
        let mut buf = Vec::new();
        specifier.encode_to(&mut buf);
        self.encode_no_signatures(&mut buf);
        encoding::write_u64(&mut buf, index);
        Hash::of(&buf)
    }

    /// The id the i-th siacoin output will have once this transaction is
    /// accepted.
    pub fn siacoin_output_id(&self, index: u64) -> SiacoinOutputId {
        SiacoinOutputId::new(self.derived_id(&SPECIFIER_SIACOIN_OUTPUT, index))
    }

    /// The id the i-th siafund output will have once this transaction is
    /// accepted.
    pub fn siafund_output_id(&self, index: u64) -> SiafundOutputId {
        SiafundOutputId::new(self.derived_id(&SPECIFIER_SIAFUND_OUTPUT, index))
    }

    /// The id the i-th file contract will have once this transaction is
    /// accepted.
    pub fn file_contract_id(&self, index: u64) -> FileContractId {
        FileContractId::new(self.derived_id(&SPECIFIER_FILE_CONTRACT, index))
    }

    /// The sum every siacoin input must account for: miner fees, contract
    /// payouts and created siacoin outputs. Siafund outputs and
    /// proof-generated outputs are excluded, they were funded when the
    /// parent contract was created.
    pub fn siacoin_output_sum(&self) -> Currency {
        let mut sum: Currency = self.miner_fees.iter().sum();
        for contract in &self.file_contracts {
            sum += &contract.payout;
        }
        for output in &self.siacoin_outputs {
            sum += &output.value;
        }
        sum
    }

    /// True when every index in `cf` names an existing element.
    pub fn covered_fields_in_range(&self, cf: &CoveredFields) -> bool {
        fn in_range(indices: &[u64], len: usize) -> bool {
            indices.iter().all(|&i| (i as usize) < len)
        }
        in_range(&cf.miner_fees, self.miner_fees.len())
            && in_range(&cf.siacoin_inputs, self.siacoin_inputs.len())
            && in_range(&cf.siacoin_outputs, self.siacoin_outputs.len())
            && in_range(&cf.file_contracts, self.file_contracts.len())
            && in_range(
                &cf.file_contract_terminations,
                self.file_contract_terminations.len(),
            )
            && in_range(
                &cf.file_contract_revisions,
                self.file_contract_revisions.len(),
            )
            && in_range(&cf.storage_proofs, self.storage_proofs.len())
            && in_range(&cf.siafund_inputs, self.siafund_inputs.len())
            && in_range(&cf.siafund_outputs, self.siafund_outputs.len())
            && in_range(&cf.arbitrary_data, self.arbitrary_data.len())
            && in_range(
                &cf.transaction_signatures,
                self.transaction_signatures.len(),
            )
    }

    /// The hash the i-th signature signs.
    ///
    /// A whole-transaction signature covers every field except the
    /// signatures list, bound to its slot through the signature's parent id
    /// and key index. A partial signature covers exactly the indexed
    /// elements plus the explicitly covered signatures. Returns `None` when
    /// the signature index or any covered index is out of range, or when a
    /// whole-transaction descriptor carries explicit field indices.
    pub fn sig_hash(&self, index: usize) -> Option<Hash> {
        let sig = self.transaction_signatures.get(index)?;
        let cf = &sig.covered_fields;
        if !self.covered_fields_in_range(cf) {
            return None;
        }

        let mut buf = Vec::new();
        if cf.whole_transaction {
            if cf.has_explicit_indices() {
                return None;
            }
            self.encode_no_signatures(&mut buf);
            buf.extend_from_slice(sig.parent_id.as_bytes());
            encoding::write_u64(&mut buf, sig.public_key_index);
        } else {
            for &i in &cf.miner_fees {
                self.miner_fees[i as usize].encode_to(&mut buf);
            }
            for &i in &cf.siacoin_inputs {
                self.siacoin_inputs[i as usize].encode_to(&mut buf);
            }
            for &i in &cf.siacoin_outputs {
                self.siacoin_outputs[i as usize].encode_to(&mut buf);
            }
            for &i in &cf.file_contracts {
                self.file_contracts[i as usize].encode_to(&mut buf);
            }
            for &i in &cf.file_contract_terminations {
                self.file_contract_terminations[i as usize].encode_to(&mut buf);
            }
            for &i in &cf.file_contract_revisions {
                self.file_contract_revisions[i as usize].encode_to(&mut buf);
            }
            for &i in &cf.storage_proofs {
                self.storage_proofs[i as usize].encode_to(&mut buf);
            }
            for &i in &cf.siafund_inputs {
                self.siafund_inputs[i as usize].encode_to(&mut buf);
            }
            for &i in &cf.siafund_outputs {
                self.siafund_outputs[i as usize].encode_to(&mut buf);
            }
            for &i in &cf.arbitrary_data {
                self.arbitrary_data[i as usize].encode_to(&mut buf);
            }
            for &i in &cf.transaction_signatures {
                self.transaction_signatures[i as usize].encode_to(&mut buf);
            }
        }
        Some(Hash::of(&buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_unlock_hash(byte: u8) -> UnlockHash {
        UnlockHash::new(Hash::new([byte; 32]))
    }

    fn simple_txn() -> Transaction {
        Transaction {
            siacoin_inputs: vec![SiacoinInput {
                parent_id: SiacoinOutputId::new(Hash::new([1; 32])),
                unlock_conditions: UnlockConditions::default(),
            }],
            siacoin_outputs: vec![SiacoinOutput {
                value: Currency::from_u64(90),
                unlock_hash: dummy_unlock_hash(2),
            }],
            miner_fees: vec![Currency::from_u64(10)],
            ..Transaction::default()
        }
    }

    #[test]
    fn id_ignores_signatures() {
        let mut txn = simple_txn();
        let before = txn.id();
        txn.transaction_signatures.push(TransactionSignature {
            parent_id: Hash::new([1; 32]),
            public_key_index: 0,
            covered_fields: CoveredFields::whole(),
            signature: vec![0xaa; 64],
        });
        assert_eq!(txn.id(), before);
    }

    #[test]
    fn id_commits_to_outputs() {
        let mut txn = simple_txn();
        let before = txn.id();
        txn.siacoin_outputs[0].value = Currency::from_u64(91);
        assert_ne!(txn.id(), before);
    }

    #[test]
    fn derived_ids_differ_by_index_and_kind() {
        let txn = simple_txn();
        assert_ne!(txn.siacoin_output_id(0), txn.siacoin_output_id(1));
        assert_ne!(
            txn.siacoin_output_id(0).as_hash(),
            txn.siafund_output_id(0).as_hash()
        );
        assert_ne!(
            txn.siacoin_output_id(0).as_hash(),
            txn.file_contract_id(0).as_hash()
        );
    }

    #[test]
    fn output_sum_counts_fees_payouts_outputs() {
        let mut txn = simple_txn();
        txn.file_contracts.push(FileContract {
            start: BlockHeight::new(5),
            expiration: BlockHeight::new(10),
            payout: Currency::from_u64(100),
            file_merkle_root: Hash::ZERO,
            file_size: 0,
            valid_proof_outputs: vec![],
            missed_proof_outputs: vec![],
            termination_hash: dummy_unlock_hash(3),
        });
        // 10 fee + 100 payout + 90 output
        assert_eq!(txn.siacoin_output_sum(), Currency::from_u64(200));
    }

    #[test]
    fn tax_is_four_percent_floored() {
        let fc = FileContract {
            start: BlockHeight::new(1),
            expiration: BlockHeight::new(2),
            payout: Currency::from_u64(1000),
            file_merkle_root: Hash::ZERO,
            file_size: 0,
            valid_proof_outputs: vec![],
            missed_proof_outputs: vec![],
            termination_hash: dummy_unlock_hash(0),
        };
        assert_eq!(fc.tax(), Currency::from_u64(40));
    }

    #[test]
    fn sig_hash_whole_binds_slot() {
        let mut txn = simple_txn();
        txn.transaction_signatures.push(TransactionSignature {
            parent_id: Hash::new([1; 32]),
            public_key_index: 0,
            covered_fields: CoveredFields::whole(),
            signature: vec![],
        });
        txn.transaction_signatures.push(TransactionSignature {
            parent_id: Hash::new([1; 32]),
            public_key_index: 1,
            covered_fields: CoveredFields::whole(),
            signature: vec![],
        });
        let h0 = txn.sig_hash(0).unwrap();
        let h1 = txn.sig_hash(1).unwrap();
        // same covered fields, different key index, different hash
        assert_ne!(h0, h1);
    }

    #[test]
    fn sig_hash_whole_rejects_explicit_indices() {
        let mut txn = simple_txn();
        let mut cf = CoveredFields::whole();
        cf.miner_fees.push(0);
        txn.transaction_signatures.push(TransactionSignature {
            parent_id: Hash::ZERO,
            public_key_index: 0,
            covered_fields: cf,
            signature: vec![],
        });
        assert_eq!(txn.sig_hash(0), None);
    }

    #[test]
    fn sig_hash_partial_covers_indexed_fields_only() {
        let mut txn = simple_txn();
        let cf = CoveredFields {
            siacoin_inputs: vec![0],
            ..CoveredFields::default()
        };
        txn.transaction_signatures.push(TransactionSignature {
            parent_id: Hash::ZERO,
            public_key_index: 0,
            covered_fields: cf,
            signature: vec![],
        });
        let before = txn.sig_hash(0).unwrap();
        // changing an uncovered field leaves the hash alone
        txn.miner_fees[0] = Currency::from_u64(99);
        assert_eq!(txn.sig_hash(0).unwrap(), before);
        // changing a covered field does not
        txn.siacoin_inputs[0].parent_id = SiacoinOutputId::new(Hash::new([9; 32]));
        assert_ne!(txn.sig_hash(0).unwrap(), before);
    }

    #[test]
    fn sig_hash_rejects_out_of_range_indices() {
        let mut txn = simple_txn();
        let cf = CoveredFields {
            siacoin_outputs: vec![5],
            ..CoveredFields::default()
        };
        txn.transaction_signatures.push(TransactionSignature {
            parent_id: Hash::ZERO,
            public_key_index: 0,
            covered_fields: cf,
            signature: vec![],
        });
        assert_eq!(txn.sig_hash(0), None);
        assert_eq!(txn.sig_hash(7), None);
    }
}
