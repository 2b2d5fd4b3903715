#![no_std]

pub mod base_escrow;
pub mod escrow_factory;

pub use base_escrow::*;
pub use escrow_factory::*;
