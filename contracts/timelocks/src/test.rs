#![cfg(test)]

use super::*;

#[test]
fn test_timelocks() {
    let timelocks = Timelocks::new(3600, 7200);

    assert_eq!(timelocks.withdrawal_period(), 3600);
    assert_eq!(timelocks.cancellation_period(), 7200);
    assert_eq!(timelocks.packed(), (7200u128 << 64) | 3600);
    assert_eq!(timelocks.cancellation_deadline(1_000_000), Some(1_010_800));
}

#[test]
fn test_halves_do_not_bleed() {
    let low_only = Timelocks::new(u64::MAX, 0);
    assert_eq!(low_only.withdrawal_period(), u64::MAX);
    assert_eq!(low_only.cancellation_period(), 0);

    let high_only = Timelocks::from_packed(u128::MAX << 64);
    assert_eq!(high_only.withdrawal_period(), 0);
    assert_eq!(high_only.cancellation_period(), u64::MAX);
}

#[test]
fn test_zero_periods() {
    let timelocks = Timelocks::default();
    assert_eq!(timelocks.cancellation_deadline(500), Some(500));
    assert!(timelocks.cancellation_open(500, 500));
    assert!(!timelocks.cancellation_open(500, 499));
}

#[test]
fn test_cancellation_boundary() {
    let timelocks = Timelocks::new(3600, 3600);
    let created_at = 10_000;

    assert!(!timelocks.cancellation_open(created_at, created_at + 7199));
    assert!(timelocks.cancellation_open(created_at, created_at + 7200));
}

#[test]
fn test_deadline_overflow() {
    let timelocks = Timelocks::new(u64::MAX, 1);
    assert_eq!(timelocks.cancellation_deadline(0), None);
    assert!(!timelocks.cancellation_open(0, u64::MAX));

    let timelocks = Timelocks::new(10, 10);
    assert_eq!(timelocks.cancellation_deadline(u64::MAX - 5), None);
}
