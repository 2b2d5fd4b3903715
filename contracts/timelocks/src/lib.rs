#![no_std]

const HALF_BITS: u32 = 64;
const HALF_MASK: u128 = u64::MAX as u128;

/// Withdrawal and cancellation periods packed into a single `u128`.
///
/// The low 64 bits hold the withdrawal period and the high 64 bits the
/// cancellation period, both in seconds relative to the escrow's creation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Timelocks(u128);

impl Timelocks {
    pub fn new(withdrawal_period: u64, cancellation_period: u64) -> Self {
        Self(((cancellation_period as u128) << HALF_BITS) | withdrawal_period as u128)
    }

    pub fn from_packed(packed: u128) -> Self {
        Self(packed)
    }

    pub fn packed(&self) -> u128 {
        self.0
    }

    pub fn withdrawal_period(&self) -> u64 {
        (self.0 & HALF_MASK) as u64
    }

    pub fn cancellation_period(&self) -> u64 {
        (self.0 >> HALF_BITS) as u64
    }

    /// Absolute time from which the escrow may be cancelled.
    /// Returns `None` when the sum does not fit in a timestamp.
    pub fn cancellation_deadline(&self, created_at: u64) -> Option<u64> {
        created_at
            .checked_add(self.withdrawal_period())?
            .checked_add(self.cancellation_period())
    }

    pub fn cancellation_open(&self, created_at: u64, now: u64) -> bool {
        match self.cancellation_deadline(created_at) {
            Some(deadline) => now >= deadline,
            None => false,
        }
    }
}

mod test;
