//! # Event Records
//!
//! Decoded forms of the events emitted by the factory and the escrows.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// 32-byte hash (order hash, hashlock).
pub type Hash = [u8; 32];

/// 32-byte hashlock preimage.
pub type Secret = [u8; 32];

/// Leg of the swap an escrow implements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variant {
    /// Taker withdraws, maker cancels.
    Source,
    /// Maker withdraws, taker cancels.
    Destination,
}

impl Variant {
    /// The other leg.
    pub fn counterpart(self) -> Self {
        match self {
            Variant::Source => Variant::Destination,
            Variant::Destination => Variant::Source,
        }
    }
}

/// Payload of the factory's `created` event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreationRecord {
    /// Escrow variant.
    pub variant: Variant,
    /// Maker address (strkey).
    pub maker: String,
    /// Taker address (strkey).
    pub taker: String,
    /// Escrow contract address (strkey).
    pub escrow: String,
    /// Off-chain order this escrow belongs to.
    pub order_hash: Hash,
    /// sha256 of the swap secret.
    pub hashlock: Hash,
    /// Ledger close time of the creating transaction.
    pub ledger_timestamp: u64,
}

/// One record from the event stream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IndexEvent {
    /// Factory `created` event.
    Created(CreationRecord),
    /// Escrow `withdraw` event.
    Withdrawn {
        /// Escrow contract address.
        escrow: String,
        /// Revealed secret.
        secret: Secret,
    },
    /// Escrow `cancel` event.
    Cancelled {
        /// Escrow contract address.
        escrow: String,
    },
}

impl IndexEvent {
    /// Address of the escrow this event concerns.
    pub fn escrow(&self) -> &str {
        match self {
            IndexEvent::Created(record) => &record.escrow,
            IndexEvent::Withdrawn { escrow, .. } | IndexEvent::Cancelled { escrow } => escrow,
        }
    }
}

/// sha256 of a secret, as escrows compute their hashlock check.
pub fn hashlock_of(secret: &Secret) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(secret);
    hasher.finalize().into()
}
