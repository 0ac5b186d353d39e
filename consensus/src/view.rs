//! The read-only consensus-state view the validator runs against.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use cairn_types::{
    BlockHeight, BlockId, FileContract, FileContractId, SiacoinOutput, SiacoinOutputId,
    SiafundOutput, SiafundOutputId,
};

/// A snapshot of consensus state: current height, the unspent output sets,
/// the live file contracts, and the path of block ids.
///
/// Implementations must be immutable for the duration of a validation call;
/// the validator only reads.
pub trait ConsensusView {
    fn height(&self) -> BlockHeight;

    fn siacoin_output(&self, id: &SiacoinOutputId) -> Option<SiacoinOutput>;

    fn siafund_output(&self, id: &SiafundOutputId) -> Option<SiafundOutput>;

    fn file_contract(&self, id: &FileContractId) -> Option<FileContract>;

    /// The id of the block at `height` on the current path, if one exists.
    fn block_id(&self, height: BlockHeight) -> Option<BlockId>;
}

/// An owned in-memory consensus snapshot.
///
/// The canonical `ConsensusView` for tests and for embedders that maintain
/// their own state and hand the validator a copy.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Snapshot {
    height: BlockHeight,
    siacoin_outputs: HashMap<SiacoinOutputId, SiacoinOutput>,
    siafund_outputs: HashMap<SiafundOutputId, SiafundOutput>,
    file_contracts: HashMap<FileContractId, FileContract>,
    current_path: Vec<BlockId>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a block id to the current path and advance the height.
    pub fn push_block(&mut self, id: BlockId) {
        self.current_path.push(id);
        self.height = BlockHeight::new(self.current_path.len() as u64 - 1);
    }

    /// Force the height without extending the path. Useful for tests that
    /// do not care about the path.
    pub fn set_height(&mut self, height: BlockHeight) {
        self.height = height;
    }

    pub fn insert_siacoin_output(&mut self, id: SiacoinOutputId, output: SiacoinOutput) {
        self.siacoin_outputs.insert(id, output);
    }

    pub fn remove_siacoin_output(&mut self, id: &SiacoinOutputId) -> Option<SiacoinOutput> {
        self.siacoin_outputs.remove(id)
    }

    pub fn insert_siafund_output(&mut self, id: SiafundOutputId, output: SiafundOutput) {
        self.siafund_outputs.insert(id, output);
    }

    pub fn remove_siafund_output(&mut self, id: &SiafundOutputId) -> Option<SiafundOutput> {
        self.siafund_outputs.remove(id)
    }

    pub fn insert_file_contract(&mut self, id: FileContractId, contract: FileContract) {
        self.file_contracts.insert(id, contract);
    }

    pub fn remove_file_contract(&mut self, id: &FileContractId) -> Option<FileContract> {
        self.file_contracts.remove(id)
    }

    pub fn siacoin_output_count(&self) -> usize {
        self.siacoin_outputs.len()
    }
}

impl ConsensusView for Snapshot {
    fn height(&self) -> BlockHeight {
        self.height
    }

    fn siacoin_output(&self, id: &SiacoinOutputId) -> Option<SiacoinOutput> {
        self.siacoin_outputs.get(id).cloned()
    }

    fn siafund_output(&self, id: &SiafundOutputId) -> Option<SiafundOutput> {
        self.siafund_outputs.get(id).cloned()
    }

    fn file_contract(&self, id: &FileContractId) -> Option<FileContract> {
        self.file_contracts.get(id).cloned()
    }

    fn block_id(&self, height: BlockHeight) -> Option<BlockId> {
        self.current_path.get(height.get() as usize).copied()
    }
}
