//! Opaque identifier types
//!
//! Order and trade identifiers are UUID v7 (128-bit, time-sortable), so
//! replayed streams keep a chronological total order. Owner and fee-class
//! identifiers are opaque strings carried through untouched.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an order
///
/// Opaque 128 bits. Callers normally mint these with [`OrderId::new`], but
/// any unique UUID is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(Uuid);

impl OrderId {
    /// Create a new OrderId with current timestamp
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Create from existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Create from a raw 128-bit value (for testing/convenience)
    pub fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    /// Get inner UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a trade record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TradeId(Uuid);

impl TradeId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TradeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque owner identifier, pass-through only
///
/// The core never interprets this; it exists so downstream consumers (and a
/// future self-match policy) can attribute orders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(owner: impl Into<String>) -> Self {
        Self(owner.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OwnerId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Fee-class identifier, pass-through only
///
/// Reserved for tiered fee schedules; the core applies the configured
/// maker/taker rates regardless.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeeClass(String);

impl FeeClass {
    pub fn new(class: impl Into<String>) -> Self {
        Self(class.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_id_uniqueness() {
        let id1 = OrderId::new();
        let id2 = OrderId::new();
        assert_ne!(id1, id2, "OrderIds should be unique");
    }

    #[test]
    fn test_order_id_from_u128() {
        let id = OrderId::from_u128(42);
        assert_eq!(id, OrderId::from_u128(42));
        assert_ne!(id, OrderId::from_u128(43));
    }

    #[test]
    fn test_order_id_serialization() {
        let id = OrderId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: OrderId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn test_trade_id_uniqueness() {
        assert_ne!(TradeId::new(), TradeId::new());
    }

    #[test]
    fn test_owner_id_passthrough() {
        let owner = OwnerId::new("desk-7");
        assert_eq!(owner.as_str(), "desk-7");
        assert_eq!(owner, OwnerId::from("desk-7"));
    }

    #[test]
    fn test_fee_class_default_is_empty() {
        assert_eq!(FeeClass::default().as_str(), "");
        assert_eq!(FeeClass::new("vip").as_str(), "vip");
    }
}
