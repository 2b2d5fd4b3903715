//! # Escrow Index
//!
//! In-memory read model built by folding [`IndexEvent`]s.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::IndexError;
use crate::events::{hashlock_of, CreationRecord, Hash, IndexEvent, Secret};

/// Settlement status of an indexed escrow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Settlement {
    /// Funds still held.
    Active,
    /// Released with the secret.
    Withdrawn,
    /// Refunded after the deadline.
    Cancelled,
}

/// An escrow as seen by the index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedEscrow {
    /// Creation record.
    pub record: CreationRecord,
    /// Current status.
    pub settlement: Settlement,
}

#[derive(Default)]
struct IndexState {
    escrows: HashMap<String, IndexedEscrow>,
    by_order_hash: HashMap<Hash, Vec<String>>,
    by_hashlock: HashMap<Hash, Vec<String>>,
    secrets: HashMap<Hash, Secret>,
}

impl IndexState {
    fn collect(&self, addresses: Option<&Vec<String>>) -> Vec<IndexedEscrow> {
        addresses
            .into_iter()
            .flatten()
            .filter_map(|address| self.escrows.get(address).cloned())
            .collect()
    }
}

/// Query service over escrow creation and settlement events.
///
/// Order hashes are not unique: the factory accepts any number of escrows
/// for the same order, and so does the index.
#[derive(Default)]
pub struct EscrowIndex {
    state: RwLock<IndexState>,
}

impl EscrowIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the index.
    pub fn apply(&self, event: IndexEvent) -> Result<(), IndexError> {
        match event {
            IndexEvent::Created(record) => self.record_created(record),
            IndexEvent::Withdrawn { escrow, secret } => self.record_withdrawn(&escrow, secret),
            IndexEvent::Cancelled { escrow } => self.record_cancelled(&escrow),
        }
    }

    /// Index a newly created escrow.
    pub fn record_created(&self, record: CreationRecord) -> Result<(), IndexError> {
        let mut state = self.state.write();
        if state.escrows.contains_key(&record.escrow) {
            return Err(IndexError::DuplicateEscrow(record.escrow));
        }

        info!(
            "[indexer] {:?} escrow {} created for order {}",
            record.variant,
            record.escrow,
            hex::encode(record.order_hash)
        );

        state
            .by_order_hash
            .entry(record.order_hash)
            .or_default()
            .push(record.escrow.clone());
        state
            .by_hashlock
            .entry(record.hashlock)
            .or_default()
            .push(record.escrow.clone());
        state.escrows.insert(
            record.escrow.clone(),
            IndexedEscrow {
                record,
                settlement: Settlement::Active,
            },
        );
        Ok(())
    }

    /// Mark an escrow withdrawn and remember the secret it revealed.
    pub fn record_withdrawn(&self, escrow: &str, secret: Secret) -> Result<(), IndexError> {
        let mut state = self.state.write();
        let entry = state
            .escrows
            .get_mut(escrow)
            .ok_or_else(|| IndexError::UnknownEscrow(escrow.to_string()))?;

        if entry.settlement != Settlement::Active {
            return Err(IndexError::AlreadySettled(escrow.to_string()));
        }
        let hashlock = entry.record.hashlock;
        if hashlock_of(&secret) != hashlock {
            warn!("[indexer] withdrawal from {} carries a foreign secret", escrow);
            return Err(IndexError::SecretMismatch(hashlock));
        }

        entry.settlement = Settlement::Withdrawn;
        state.secrets.insert(hashlock, secret);

        debug!("[indexer] escrow {} withdrawn", escrow);
        Ok(())
    }

    /// Mark an escrow cancelled.
    pub fn record_cancelled(&self, escrow: &str) -> Result<(), IndexError> {
        let mut state = self.state.write();
        let entry = state
            .escrows
            .get_mut(escrow)
            .ok_or_else(|| IndexError::UnknownEscrow(escrow.to_string()))?;

        if entry.settlement != Settlement::Active {
            return Err(IndexError::AlreadySettled(escrow.to_string()));
        }
        entry.settlement = Settlement::Cancelled;

        debug!("[indexer] escrow {} cancelled", escrow);
        Ok(())
    }

    /// Look up an escrow by address.
    pub fn get(&self, escrow: &str) -> Option<IndexedEscrow> {
        self.state.read().escrows.get(escrow).cloned()
    }

    /// All escrows created for an order, in creation order.
    pub fn by_order_hash(&self, order_hash: &Hash) -> Vec<IndexedEscrow> {
        let state = self.state.read();
        state.collect(state.by_order_hash.get(order_hash))
    }

    /// All escrows in which `address` is maker or taker.
    pub fn by_party(&self, address: &str) -> Vec<IndexedEscrow> {
        self.state
            .read()
            .escrows
            .values()
            .filter(|e| e.record.maker == address || e.record.taker == address)
            .cloned()
            .collect()
    }

    /// The other leg of the swap: an escrow of the opposite variant locked to
    /// the same hashlock. Prefers an active one.
    pub fn counterpart(&self, escrow: &str) -> Option<IndexedEscrow> {
        let state = self.state.read();
        let this = state.escrows.get(escrow)?;
        let wanted = this.record.variant.counterpart();

        let mut candidates = state
            .collect(state.by_hashlock.get(&this.record.hashlock))
            .into_iter()
            .filter(|e| e.record.variant == wanted);
        let first = candidates.next()?;
        if first.settlement == Settlement::Active {
            return Some(first);
        }
        candidates
            .find(|e| e.settlement == Settlement::Active)
            .or(Some(first))
    }

    /// Secret revealed by a withdrawal from any escrow locked to `hashlock`.
    pub fn revealed_secret(&self, hashlock: &Hash) -> Option<Secret> {
        self.state.read().secrets.get(hashlock).copied()
    }

    /// Escrows still holding funds.
    pub fn active(&self) -> Vec<IndexedEscrow> {
        self.state
            .read()
            .escrows
            .values()
            .filter(|e| e.settlement == Settlement::Active)
            .cloned()
            .collect()
    }

    /// Number of indexed escrows.
    pub fn len(&self) -> usize {
        self.state.read().escrows.len()
    }

    /// Whether nothing has been indexed yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Variant;

    const SECRET: Secret = [9u8; 32];

    fn record(escrow: &str, variant: Variant, order_hash: Hash) -> CreationRecord {
        CreationRecord {
            variant,
            maker: "GMAKER".to_string(),
            taker: "GTAKER".to_string(),
            escrow: escrow.to_string(),
            order_hash,
            hashlock: hashlock_of(&SECRET),
            ledger_timestamp: 1_000,
        }
    }

    #[test]
    fn test_record_and_get() {
        let index = EscrowIndex::new();
        index.record_created(record("CSRC", Variant::Source, [1; 32])).unwrap();

        let escrow = index.get("CSRC").unwrap();
        assert_eq!(escrow.settlement, Settlement::Active);
        assert_eq!(escrow.record.variant, Variant::Source);
        assert_eq!(index.len(), 1);
        assert!(index.get("CNONE").is_none());
    }

    #[test]
    fn test_duplicate_escrow_rejected() {
        let index = EscrowIndex::new();
        index.record_created(record("CSRC", Variant::Source, [1; 32])).unwrap();

        let result = index.record_created(record("CSRC", Variant::Source, [1; 32]));
        assert_eq!(result, Err(IndexError::DuplicateEscrow("CSRC".to_string())));
    }

    #[test]
    fn test_duplicate_order_hashes_are_kept() {
        let index = EscrowIndex::new();
        index.record_created(record("CA", Variant::Source, [1; 32])).unwrap();
        index.record_created(record("CB", Variant::Source, [1; 32])).unwrap();
        index.record_created(record("CC", Variant::Source, [2; 32])).unwrap();

        let escrows: Vec<String> = index
            .by_order_hash(&[1; 32])
            .into_iter()
            .map(|e| e.record.escrow)
            .collect();
        assert_eq!(escrows, vec!["CA".to_string(), "CB".to_string()]);
        assert!(index.by_order_hash(&[3; 32]).is_empty());
    }

    #[test]
    fn test_withdrawal_reveals_secret_for_counterpart() {
        let index = EscrowIndex::new();
        index.record_created(record("CSRC", Variant::Source, [1; 32])).unwrap();
        index.record_created(record("CDST", Variant::Destination, [1; 32])).unwrap();

        let hashlock = hashlock_of(&SECRET);
        assert_eq!(index.revealed_secret(&hashlock), None);

        index.record_withdrawn("CDST", SECRET).unwrap();

        assert_eq!(index.revealed_secret(&hashlock), Some(SECRET));
        let counterpart = index.counterpart("CDST").unwrap();
        assert_eq!(counterpart.record.escrow, "CSRC");
        assert_eq!(counterpart.settlement, Settlement::Active);
    }

    #[test]
    fn test_withdrawal_with_wrong_secret_rejected() {
        let index = EscrowIndex::new();
        index.record_created(record("CSRC", Variant::Source, [1; 32])).unwrap();

        let result = index.record_withdrawn("CSRC", [8u8; 32]);
        assert_eq!(result, Err(IndexError::SecretMismatch(hashlock_of(&SECRET))));
        assert_eq!(index.get("CSRC").unwrap().settlement, Settlement::Active);
    }

    #[test]
    fn test_settlement_is_final() {
        let index = EscrowIndex::new();
        index.record_created(record("CSRC", Variant::Source, [1; 32])).unwrap();
        index.record_cancelled("CSRC").unwrap();

        assert_eq!(
            index.record_withdrawn("CSRC", SECRET),
            Err(IndexError::AlreadySettled("CSRC".to_string()))
        );
        assert_eq!(
            index.record_cancelled("CSRC"),
            Err(IndexError::AlreadySettled("CSRC".to_string()))
        );
        assert!(index.active().is_empty());
    }

    #[test]
    fn test_unknown_escrow_settlement() {
        let index = EscrowIndex::new();
        assert_eq!(
            index.apply(IndexEvent::Cancelled {
                escrow: "CNONE".to_string()
            }),
            Err(IndexError::UnknownEscrow("CNONE".to_string()))
        );
    }

    #[test]
    fn test_apply_event_stream() {
        let index = EscrowIndex::new();
        let events = vec![
            IndexEvent::Created(record("CSRC", Variant::Source, [1; 32])),
            IndexEvent::Created(record("CDST", Variant::Destination, [1; 32])),
            IndexEvent::Withdrawn {
                escrow: "CDST".to_string(),
                secret: SECRET,
            },
            IndexEvent::Withdrawn {
                escrow: "CSRC".to_string(),
                secret: SECRET,
            },
        ];
        for event in events {
            index.apply(event).unwrap();
        }

        assert!(index.active().is_empty());
        assert_eq!(index.get("CSRC").unwrap().settlement, Settlement::Withdrawn);
        assert_eq!(index.by_party("GMAKER").len(), 2);
        assert!(index.by_party("GSTRANGER").is_empty());
    }

    #[test]
    fn test_counterpart_prefers_active_leg() {
        let index = EscrowIndex::new();
        index.record_created(record("CSRC", Variant::Source, [1; 32])).unwrap();
        index.record_created(record("CDST1", Variant::Destination, [1; 32])).unwrap();
        index.record_created(record("CDST2", Variant::Destination, [1; 32])).unwrap();
        index.record_cancelled("CDST1").unwrap();

        assert_eq!(index.counterpart("CSRC").unwrap().record.escrow, "CDST2");
        assert!(index.counterpart("CNONE").is_none());
    }
}
