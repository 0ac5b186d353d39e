//! Block height.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

use crate::encoding::{self, CanonicalEncode};

/// A chain height, monotonically non-decreasing in any consensus view.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct BlockHeight(u64);

impl BlockHeight {
    pub const ZERO: Self = Self(0);

    pub fn new(height: u64) -> Self {
        Self(height)
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    pub fn saturating_sub(&self, blocks: u64) -> Self {
        Self(self.0.saturating_sub(blocks))
    }

    pub fn checked_sub(&self, blocks: u64) -> Option<Self> {
        self.0.checked_sub(blocks).map(Self)
    }
}

impl Add<u64> for BlockHeight {
    type Output = Self;
    fn add(self, rhs: u64) -> Self {
        Self(self.0 + rhs)
    }
}

impl fmt::Display for BlockHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl CanonicalEncode for BlockHeight {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        encoding::write_u64(buf, self.0);
    }
}
