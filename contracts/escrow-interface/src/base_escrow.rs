use soroban_sdk::{contracterror, contracttype, Address, BytesN, Env, String};
use timelocks::Timelocks;

/// Strkey of the all-zero contract id. Never a valid maker or taker.
pub const ZERO_ADDRESS: &str = "CAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAABSC4";

pub fn zero_address(env: &Env) -> Address {
    Address::from_string(&String::from_str(env, ZERO_ADDRESS))
}

// Errors
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum EscrowError {
    InvalidParameters = 1,
    InvalidSecret = 2,
    Unauthorized = 3,
    TooEarly = 4,
    AlreadySettled = 5,
}

/// What an escrow holds.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Asset {
    /// The ledger's native asset, moved through its Stellar Asset Contract.
    Native,
    /// Any contract implementing the token interface.
    Token(Address),
}

impl Asset {
    pub fn is_native(&self) -> bool {
        matches!(self, Asset::Native)
    }

    /// Contract that moves this asset, given the configured native asset contract.
    pub fn contract(&self, native_asset: &Address) -> Address {
        match self {
            Asset::Native => native_asset.clone(),
            Asset::Token(token) => token.clone(),
        }
    }
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Role {
    Maker,
    Taker,
}

/// Which party may release funds with the secret and which may reclaim them
/// after the deadline.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RolePolicy {
    pub withdraw: Role,
    pub cancel: Role,
}

/// The two legs of a swap. They share the state machine and differ only in
/// their role policy.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EscrowVariant {
    Source,
    Destination,
}

impl EscrowVariant {
    pub fn policy(&self) -> RolePolicy {
        match self {
            EscrowVariant::Source => RolePolicy {
                withdraw: Role::Taker,
                cancel: Role::Maker,
            },
            EscrowVariant::Destination => RolePolicy {
                withdraw: Role::Maker,
                cancel: Role::Taker,
            },
        }
    }
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EscrowState {
    Active,
    Withdrawn,
    Cancelled,
}

// Structs
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Immutables {
    pub order_hash: BytesN<32>,
    pub hashlock: BytesN<32>, // sha256 of the secret
    pub maker: Address,
    pub taker: Address,
    pub asset: Asset,
    pub amount: i128,
    pub safety_deposit: i128,
    pub timelocks: u128, // see `timelocks::Timelocks`
}

impl Immutables {
    pub fn timelocks(&self) -> Timelocks {
        Timelocks::from_packed(self.timelocks)
    }

    pub fn party(&self, role: Role) -> &Address {
        match role {
            Role::Maker => &self.maker,
            Role::Taker => &self.taker,
        }
    }

    /// Native value that must accompany creation: principal plus deposit for
    /// native escrows, the deposit alone when the principal is a token.
    pub fn required_value(&self) -> Option<i128> {
        match self.asset {
            Asset::Native => self.amount.checked_add(self.safety_deposit),
            Asset::Token(_) => Some(self.safety_deposit),
        }
    }

    /// Construction-time checks shared by the escrow constructor and the factory.
    pub fn validate(&self, env: &Env, value: i128, created_at: u64) -> Result<(), EscrowError> {
        let zero = zero_address(env);
        if self.maker == zero || self.taker == zero {
            return Err(EscrowError::InvalidParameters);
        }
        if let Asset::Token(token) = &self.asset {
            if *token == zero {
                return Err(EscrowError::InvalidParameters);
            }
        }
        if self.amount < 0 || self.safety_deposit < 0 {
            return Err(EscrowError::InvalidParameters);
        }
        if self.required_value() != Some(value) {
            return Err(EscrowError::InvalidParameters);
        }
        if self.timelocks().cancellation_deadline(created_at).is_none() {
            return Err(EscrowError::InvalidParameters);
        }
        Ok(())
    }
}
