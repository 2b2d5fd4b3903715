// lib.rs
#![no_std]
use soroban_sdk::{
    contract, contractimpl, contractmeta, contracttype, log, panic_with_error, token,
    xdr::ToXdr, Address, BytesN, Env,
};

pub use escrow_interface::{
    Asset, EscrowCreated, EscrowError, EscrowVariant, Immutables, CREATED_TOPIC,
};

contractmeta!(
    key = "Description",
    val = "Deploys and funds cross-chain atomic swap escrows"
);

#[derive(Clone)]
#[contracttype]
pub enum DataKey {
    EscrowWasmHash,
    NativeAsset,
}

#[contract]
pub struct EscrowFactory;

#[contractimpl]
impl EscrowFactory {
    pub fn __constructor(env: Env, escrow_wasm_hash: BytesN<32>, native_asset: Address) {
        env.storage().instance().set(&DataKey::EscrowWasmHash, &escrow_wasm_hash);
        env.storage().instance().set(&DataKey::NativeAsset, &native_asset);
    }

    /// Deploys and funds the leg on which the taker withdraws and the maker
    /// cancels.
    pub fn create_src_escrow(
        env: Env,
        creator: Address,
        immutables: Immutables,
        value: i128,
    ) -> Result<Address, EscrowError> {
        create_escrow(&env, EscrowVariant::Source, creator, immutables, value)
    }

    /// Deploys and funds the leg on which the maker withdraws and the taker
    /// cancels.
    pub fn create_dst_escrow(
        env: Env,
        creator: Address,
        immutables: Immutables,
        value: i128,
    ) -> Result<Address, EscrowError> {
        create_escrow(&env, EscrowVariant::Destination, creator, immutables, value)
    }

    /// Address the escrow for these parameters is (or will be) deployed at.
    pub fn escrow_address(env: Env, variant: EscrowVariant, immutables: Immutables) -> Address {
        env.deployer()
            .with_current_contract(escrow_salt(&env, variant, &immutables))
            .deployed_address()
    }

    pub fn escrow_wasm_hash(env: Env) -> BytesN<32> {
        load_wasm_hash(&env)
    }

    pub fn native_asset(env: Env) -> Address {
        load_native_asset(&env)
    }
}

/// Salt for the escrow's deterministic address: sha256 over the XDR of the
/// variant and its immutables.
pub fn escrow_salt(env: &Env, variant: EscrowVariant, immutables: &Immutables) -> BytesN<32> {
    env.crypto()
        .sha256(&(variant, immutables.clone()).to_xdr(env))
        .to_bytes()
}

fn create_escrow(
    env: &Env,
    variant: EscrowVariant,
    creator: Address,
    immutables: Immutables,
    value: i128,
) -> Result<Address, EscrowError> {
    creator.require_auth();

    // Same checks the escrow constructor runs; failing here keeps funds in place.
    immutables.validate(env, value, env.ledger().timestamp())?;

    let native_asset = load_native_asset(env);
    let deployer = env
        .deployer()
        .with_current_contract(escrow_salt(env, variant, &immutables));
    let escrow = deployer.deployed_address();

    // Fund the derived address first; deployment and funding commit together.
    if value > 0 {
        token::TokenClient::new(env, &native_asset).transfer(&creator, &escrow, &value);
    }
    if let Asset::Token(token_address) = &immutables.asset {
        if immutables.amount > 0 {
            token::TokenClient::new(env, token_address).transfer(
                &creator,
                &escrow,
                &immutables.amount,
            );
        }
    }

    let deployed = deployer.deploy_v2(
        load_wasm_hash(env),
        (native_asset, variant, immutables.clone(), value),
    );

    env.events().publish(
        (CREATED_TOPIC, variant),
        EscrowCreated {
            variant,
            maker: immutables.maker.clone(),
            taker: immutables.taker.clone(),
            escrow: deployed.clone(),
            order_hash: immutables.order_hash.clone(),
            hashlock: immutables.hashlock.clone(),
        },
    );
    log!(env, "escrow created: escrow={}, creator={}", deployed.clone(), creator);

    Ok(deployed)
}

fn load_wasm_hash(env: &Env) -> BytesN<32> {
    env.storage()
        .instance()
        .get(&DataKey::EscrowWasmHash)
        .unwrap_or_else(|| panic_with_error!(env, EscrowError::InvalidParameters))
}

fn load_native_asset(env: &Env) -> Address {
    env.storage()
        .instance()
        .get(&DataKey::NativeAsset)
        .unwrap_or_else(|| panic_with_error!(env, EscrowError::InvalidParameters))
}

mod test_wasm;
