// End-to-end creation against the compiled escrow contract.
#![cfg(test)]

use soroban_sdk::{
    testutils::{Address as _, Events, Ledger},
    token, vec, Address, Bytes, BytesN, Env, IntoVal,
};
use timelocks::Timelocks;

use crate::{
    Asset, EscrowCreated, EscrowFactory, EscrowFactoryClient, EscrowVariant, Immutables,
    CREATED_TOPIC,
};

mod escrow_contract {
    soroban_sdk::contractimport!(file = "../../target/wasm32-unknown-unknown/release/escrow.wasm");
}

fn create_token_contract<'a>(e: &Env, admin: &Address) -> (token::StellarAssetClient<'a>, token::TokenClient<'a>) {
    let address = e.register_stellar_asset_contract_v2(admin.clone()).address();
    (token::StellarAssetClient::new(e, &address), token::TokenClient::new(e, &address))
}

fn create_escrow_factory_contract<'a>(e: &Env, native: &Address) -> EscrowFactoryClient<'a> {
    let wasm_hash = e.deployer().upload_contract_wasm(escrow_contract::WASM);
    let address = e.register(EscrowFactory, (wasm_hash, native.clone()));
    EscrowFactoryClient::new(e, &address)
}

fn secret_and_hashlock(e: &Env, seed: u8) -> (BytesN<32>, BytesN<32>) {
    let secret = BytesN::from_array(e, &[seed; 32]);
    let hashlock = e.crypto().sha256(&Bytes::from_array(e, &[seed; 32])).to_bytes();
    (secret, hashlock)
}

#[test]
fn test_create_src_escrow_native() {
    let e = Env::default();
    e.mock_all_auths();
    e.ledger().set_timestamp(1_000_000);

    let admin = Address::generate(&e);
    let (native_admin, native) = create_token_contract(&e, &admin);
    let factory = create_escrow_factory_contract(&e, &native.address);
    let maker = Address::generate(&e);
    let taker = Address::generate(&e);
    let (secret, hashlock) = secret_and_hashlock(&e, 42);
    native_admin.mint(&maker, &1000);

    let immutables = Immutables {
        order_hash: BytesN::from_array(&e, &[1; 32]),
        hashlock: hashlock.clone(),
        maker: maker.clone(),
        taker: taker.clone(),
        asset: Asset::Native,
        amount: 100,
        safety_deposit: 0,
        timelocks: Timelocks::new(3600, 3600).packed(),
    };

    let predicted = factory.escrow_address(&EscrowVariant::Source, &immutables);
    let escrow_address = factory.create_src_escrow(&maker, &immutables, &100);
    assert_eq!(escrow_address, predicted);

    let last = e.events().all().last().unwrap();
    assert_eq!(
        vec![&e, last],
        vec![
            &e,
            (
                factory.address.clone(),
                (CREATED_TOPIC, EscrowVariant::Source).into_val(&e),
                EscrowCreated {
                    variant: EscrowVariant::Source,
                    maker: maker.clone(),
                    taker: taker.clone(),
                    escrow: escrow_address.clone(),
                    order_hash: immutables.order_hash.clone(),
                    hashlock,
                }
                .into_val(&e),
            )
        ]
    );

    // Funded in the same call that created it.
    assert_eq!(native.balance(&escrow_address), 100);
    assert_eq!(native.balance(&maker), 900);

    let escrow = escrow_contract::Client::new(&e, &escrow_address);
    assert_eq!(escrow.state(), escrow_contract::EscrowState::Active);
    assert_eq!(escrow.created_at(), 1_000_000);

    escrow.withdraw(&taker, &secret);
    assert_eq!(native.balance(&taker), 100);
    assert_eq!(escrow.state(), escrow_contract::EscrowState::Withdrawn);
}

#[test]
fn test_create_dst_escrow_token() {
    let e = Env::default();
    e.mock_all_auths();

    let admin = Address::generate(&e);
    let (native_admin, native) = create_token_contract(&e, &admin);
    let (token_admin, token) = create_token_contract(&e, &admin);
    let factory = create_escrow_factory_contract(&e, &native.address);
    let maker = Address::generate(&e);
    let taker = Address::generate(&e);
    let (secret, hashlock) = secret_and_hashlock(&e, 7);
    token_admin.mint(&taker, &1000);
    native_admin.mint(&taker, &100);

    let immutables = Immutables {
        order_hash: BytesN::from_array(&e, &[2; 32]),
        hashlock,
        maker: maker.clone(),
        taker: taker.clone(),
        asset: Asset::Token(token.address.clone()),
        amount: 500,
        safety_deposit: 50,
        timelocks: Timelocks::new(600, 600).packed(),
    };

    let escrow_address = factory.create_dst_escrow(&taker, &immutables, &50);
    assert_eq!(token.balance(&escrow_address), 500);
    assert_eq!(native.balance(&escrow_address), 50);
    assert_eq!(token.balance(&taker), 500);
    assert_eq!(native.balance(&taker), 50);

    let escrow = escrow_contract::Client::new(&e, &escrow_address);
    escrow.withdraw(&maker, &secret);

    assert_eq!(token.balance(&maker), 500);
    assert_eq!(native.balance(&maker), 50);
}

#[test]
fn test_identical_parameters_cannot_be_recreated() {
    let e = Env::default();
    e.mock_all_auths();

    let admin = Address::generate(&e);
    let (native_admin, native) = create_token_contract(&e, &admin);
    let factory = create_escrow_factory_contract(&e, &native.address);
    let maker = Address::generate(&e);
    let taker = Address::generate(&e);
    let (_secret, hashlock) = secret_and_hashlock(&e, 1);
    native_admin.mint(&maker, &1000);

    let immutables = Immutables {
        order_hash: BytesN::from_array(&e, &[5; 32]),
        hashlock,
        maker: maker.clone(),
        taker: taker.clone(),
        asset: Asset::Native,
        amount: 100,
        safety_deposit: 0,
        timelocks: Timelocks::new(60, 60).packed(),
    };

    factory.create_src_escrow(&maker, &immutables, &100);
    assert!(factory.try_create_src_escrow(&maker, &immutables, &100).is_err());
    assert_eq!(native.balance(&maker), 900);

    // Same order hash, different terms: a separate escrow.
    let mut second = immutables.clone();
    second.amount = 200;
    factory.create_src_escrow(&maker, &second, &200);
    assert_eq!(native.balance(&maker), 700);
}
