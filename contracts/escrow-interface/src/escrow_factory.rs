use soroban_sdk::{contracttype, symbol_short, Address, BytesN, Symbol};

use crate::base_escrow::EscrowVariant;

/// Event topic for escrow creation, paired with the variant.
pub const CREATED_TOPIC: Symbol = symbol_short!("created");

// Events
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EscrowCreated {
    pub variant: EscrowVariant,
    pub maker: Address,
    pub taker: Address,
    pub escrow: Address,
    pub order_hash: BytesN<32>,
    pub hashlock: BytesN<32>,
}
