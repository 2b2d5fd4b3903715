// lib.rs
#![no_std]
use soroban_sdk::{
    contract, contractimpl, contractmeta, contracttype, log, panic_with_error, symbol_short,
    token, Address, BytesN, Env,
};

pub use escrow_interface::{
    Asset, EscrowError, EscrowState, EscrowVariant, Immutables, Role, RolePolicy,
};

contractmeta!(
    key = "Description",
    val = "Hash- and time-locked escrow for one leg of a cross-chain atomic swap"
);

#[derive(Clone)]
#[contracttype]
pub enum DataKey {
    NativeAsset,
    Variant,
    Immutables,
    CreatedAt,
    State,
}

#[contract]
pub struct Escrow;

#[contractimpl]
impl Escrow {
    /// Funds must already sit at this address when the constructor runs;
    /// `value` is the native amount the creator attached.
    pub fn __constructor(
        env: Env,
        native_asset: Address,
        variant: EscrowVariant,
        immutables: Immutables,
        value: i128,
    ) {
        let created_at = env.ledger().timestamp();
        if let Err(err) = immutables.validate(&env, value, created_at) {
            panic_with_error!(&env, err);
        }
        if !is_funded(&env, &native_asset, &immutables) {
            panic_with_error!(&env, EscrowError::InvalidParameters);
        }

        let storage = env.storage().instance();
        storage.set(&DataKey::NativeAsset, &native_asset);
        storage.set(&DataKey::Variant, &variant);
        storage.set(&DataKey::Immutables, &immutables);
        storage.set(&DataKey::CreatedAt, &created_at);
        storage.set(&DataKey::State, &EscrowState::Active);
    }

    /// Releases the held funds to the withdrawing party on presentation of the
    /// hashlock preimage. Not time-gated.
    pub fn withdraw(env: Env, caller: Address, secret: BytesN<32>) -> Result<(), EscrowError> {
        let immutables = load_immutables(&env);
        let policy = load_variant(&env).policy();

        ensure_active(&env)?;
        if caller != *immutables.party(policy.withdraw) {
            return Err(EscrowError::Unauthorized);
        }
        caller.require_auth();

        let secret_hash = env.crypto().sha256(secret.as_ref());
        if secret_hash.to_bytes() != immutables.hashlock {
            return Err(EscrowError::InvalidSecret);
        }

        settle(&env, &immutables, EscrowState::Withdrawn, &caller);

        env.events()
            .publish((symbol_short!("withdraw"), caller), secret);
        Ok(())
    }

    /// Returns the held funds to the cancelling party once the cancellation
    /// deadline has been reached.
    pub fn cancel(env: Env, caller: Address) -> Result<(), EscrowError> {
        let immutables = load_immutables(&env);
        let policy = load_variant(&env).policy();

        ensure_active(&env)?;
        if caller != *immutables.party(policy.cancel) {
            return Err(EscrowError::Unauthorized);
        }
        caller.require_auth();

        let created_at = load_created_at(&env);
        if !immutables
            .timelocks()
            .cancellation_open(created_at, env.ledger().timestamp())
        {
            return Err(EscrowError::TooEarly);
        }

        settle(&env, &immutables, EscrowState::Cancelled, &caller);

        env.events().publish((symbol_short!("cancel"), caller), ());
        Ok(())
    }

    pub fn immutables(env: Env) -> Immutables {
        load_immutables(&env)
    }

    pub fn variant(env: Env) -> EscrowVariant {
        load_variant(&env)
    }

    pub fn state(env: Env) -> EscrowState {
        load_state(&env)
    }

    pub fn created_at(env: Env) -> u64 {
        load_created_at(&env)
    }

    pub fn cancellation_deadline(env: Env) -> u64 {
        let created_at = load_created_at(&env);
        // Checked at construction.
        load_immutables(&env)
            .timelocks()
            .cancellation_deadline(created_at)
            .unwrap_or(u64::MAX)
    }

    pub fn withdraw_role(env: Env) -> Role {
        load_variant(&env).policy().withdraw
    }

    pub fn cancel_role(env: Env) -> Role {
        load_variant(&env).policy().cancel
    }
}

fn ensure_active(env: &Env) -> Result<(), EscrowError> {
    match load_state(env) {
        EscrowState::Active => Ok(()),
        EscrowState::Withdrawn | EscrowState::Cancelled => Err(EscrowError::AlreadySettled),
    }
}

/// Native escrows hold principal plus deposit in the native asset. Token
/// escrows hold the principal in the token and the deposit in native.
fn is_funded(env: &Env, native_asset: &Address, immutables: &Immutables) -> bool {
    let escrow = env.current_contract_address();
    let native = token::TokenClient::new(env, native_asset).balance(&escrow);
    match &immutables.asset {
        Asset::Native => immutables
            .required_value()
            .is_some_and(|required| native >= required),
        Asset::Token(token_address) => {
            native >= immutables.safety_deposit
                && token::TokenClient::new(env, token_address).balance(&escrow) >= immutables.amount
        }
    }
}

/// Marks the escrow settled, then moves everything it holds to `recipient`.
/// Token escrows also hold the native safety deposit, which goes along.
fn settle(env: &Env, immutables: &Immutables, outcome: EscrowState, recipient: &Address) {
    env.storage().instance().set(&DataKey::State, &outcome);

    let native_asset = load_native_asset(env);
    let principal = transfer_balance(env, &immutables.asset.contract(&native_asset), recipient);
    let deposit = if immutables.asset.is_native() {
        0
    } else {
        transfer_balance(env, &native_asset, recipient)
    };

    log!(
        env,
        "escrow settled: recipient={}, principal={}, deposit={}",
        recipient.clone(),
        principal,
        deposit
    );
}

fn transfer_balance(env: &Env, asset: &Address, to: &Address) -> i128 {
    let client = token::TokenClient::new(env, asset);
    let escrow = env.current_contract_address();
    let balance = client.balance(&escrow);
    if balance > 0 {
        client.transfer(&escrow, to, &balance);
    }
    balance
}

fn load_native_asset(env: &Env) -> Address {
    env.storage()
        .instance()
        .get(&DataKey::NativeAsset)
        .unwrap_or_else(|| panic_with_error!(env, EscrowError::InvalidParameters))
}

fn load_variant(env: &Env) -> EscrowVariant {
    env.storage()
        .instance()
        .get(&DataKey::Variant)
        .unwrap_or_else(|| panic_with_error!(env, EscrowError::InvalidParameters))
}

fn load_immutables(env: &Env) -> Immutables {
    env.storage()
        .instance()
        .get(&DataKey::Immutables)
        .unwrap_or_else(|| panic_with_error!(env, EscrowError::InvalidParameters))
}

fn load_created_at(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get(&DataKey::CreatedAt)
        .unwrap_or_else(|| panic_with_error!(env, EscrowError::InvalidParameters))
}

fn load_state(env: &Env) -> EscrowState {
    env.storage()
        .instance()
        .get(&DataKey::State)
        .unwrap_or_else(|| panic_with_error!(env, EscrowError::InvalidParameters))
}
