//! The currency amount type.
//!
//! Amounts are non-negative integers of unbounded precision. Every operation
//! that could underflow returns an `Option` instead of panicking; addition
//! and multiplication cannot overflow.

use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use crate::encoding::{self, CanonicalEncode};

/// A quantity of currency, either siacoins or siafunds.
///
/// Backed by an unbounded unsigned integer so payouts and fee sums can never
/// silently wrap.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Currency(BigUint);

impl Currency {
    /// The zero amount.
    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    pub fn new(value: BigUint) -> Self {
        Self(value)
    }

    pub fn from_u64(value: u64) -> Self {
        Self(BigUint::from(value))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Subtraction, `None` if the result would be negative.
    pub fn checked_sub(&self, other: &Self) -> Option<Self> {
        if self.0 < other.0 {
            None
        } else {
            Some(Self(&self.0 - &other.0))
        }
    }

    pub fn mul_u64(&self, factor: u64) -> Self {
        Self(&self.0 * factor)
    }

    /// Floor division by a small constant, `None` when dividing by zero.
    pub fn div_u64(&self, divisor: u64) -> Option<Self> {
        if divisor == 0 {
            None
        } else {
            Some(Self(&self.0 / divisor))
        }
    }

    /// The minimal big-endian magnitude bytes. Empty for zero.
    pub fn to_bytes_be(&self) -> Vec<u8> {
        if self.0.is_zero() {
            Vec::new()
        } else {
            self.0.to_bytes_be()
        }
    }

    pub fn from_bytes_be(bytes: &[u8]) -> Self {
        Self(BigUint::from_bytes_be(bytes))
    }
}

impl Add<&Currency> for &Currency {
    type Output = Currency;
    fn add(self, rhs: &Currency) -> Currency {
        Currency(&self.0 + &rhs.0)
    }
}

impl AddAssign<&Currency> for Currency {
    fn add_assign(&mut self, rhs: &Currency) {
        self.0 += &rhs.0;
    }
}

impl<'a> Sum<&'a Currency> for Currency {
    fn sum<I: Iterator<Item = &'a Currency>>(iter: I) -> Self {
        let mut total = Currency::zero();
        for c in iter {
            total += c;
        }
        total
    }
}

impl From<u64> for Currency {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl CanonicalEncode for Currency {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        encoding::write_bytes(buf, &self.to_bytes_be());
    }
}
