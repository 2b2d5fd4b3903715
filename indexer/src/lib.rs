//! # Escrow Indexer
//!
//! Read model over the escrow event stream.
//!
//! The factory keeps no registry of the escrows it creates; it only emits a
//! `created` event per escrow. Escrows emit `withdraw` (carrying the revealed
//! secret) and `cancel` when they settle. This crate folds those records into
//! queryable state:
//!
//! - escrows by address, by order hash and by party
//! - settlement status of each escrow
//! - secrets revealed on one leg, so the other leg can be claimed with them
//!
//! Reading events from a ledger is left to the caller; records are handed in
//! already decoded.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod events;
pub mod index;

pub use error::IndexError;
pub use events::{CreationRecord, Hash, IndexEvent, Secret, Variant};
pub use index::{EscrowIndex, IndexedEscrow, Settlement};
