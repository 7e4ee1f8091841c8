//! Order identifier and order number generation.
//!
//! Candidates are derived from a SHA-256 digest over the current time, OS
//! randomness and a per-call UUID. Uniqueness is finally enforced by the
//! storage constraints on `orders.id` and `orders.order_number`; the checkout
//! service regenerates both values when a constraint rejects them.

use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use uuid::Uuid;

pub const ORDER_ID_LEN: usize = 12;
pub const ORDER_NUMBER_PREFIX: &str = "ORD";

/// Source of fresh order identifiers.
pub trait OrderIdGenerator: Send + Sync + 'static {
    fn order_id(&self) -> String;
    fn order_number(&self, now: DateTime<Utc>) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RandomOrderIds;

impl OrderIdGenerator for RandomOrderIds {
    fn order_id(&self) -> String {
        generate_order_id(Utc::now())
    }

    fn order_number(&self, now: DateTime<Utc>) -> String {
        generate_order_number(now)
    }
}

/// 12 upper-case alphanumeric characters, e.g. `3F9A0C1D22BE`.
pub fn generate_order_id(now: DateTime<Utc>) -> String {
    let mut random = [0u8; 8];
    OsRng.fill_bytes(&mut random);

    let mut hasher = Sha256::new();
    hasher.update(now.timestamp().to_string());
    hasher.update(random);
    hasher.update(Uuid::new_v4().as_bytes());

    normalize_order_id(&hex::encode_upper(hasher.finalize()))
}

/// `ORD-<YYYYMMDD>-<8 hash chars><12 random hex chars>`, upper-cased.
pub fn generate_order_number(now: DateTime<Utc>) -> String {
    let mut random = [0u8; 6];
    OsRng.fill_bytes(&mut random);
    let random_hex = hex::encode(random);

    let mut hasher = Sha256::new();
    hasher.update(now.timestamp().to_string());
    hasher.update(&random_hex);
    hasher.update(Uuid::new_v4().as_bytes());
    let digest = hex::encode(hasher.finalize());

    format!(
        "{}-{}-{}{}",
        ORDER_NUMBER_PREFIX,
        now.format("%Y%m%d"),
        &digest[..8],
        random_hex
    )
    .to_uppercase()
}

/// Keep only `[A-Z0-9]`, cut to [`ORDER_ID_LEN`] and left-pad with `'0'`.
pub fn normalize_order_id(raw: &str) -> String {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        .take(ORDER_ID_LEN)
        .collect();
    format!("{:0>width$}", kept, width = ORDER_ID_LEN)
}
