// crates/furrow-core/src/identity.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable pool identifier. Assigned by insertion order and never reused.
pub type PoolId = usize;

/// Identity of an account that can hold assets: a depositor, the engine's
/// custody account, a rewarder, or the owner.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Identity of an external asset (the stake asset of a pool, or the reward asset).
///
/// The engine never assumes a decimal count for an asset; amounts are raw
/// integer units.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// The environment of a single call: who is calling, and the current
/// block/time index supplied by the host's clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    pub caller: AccountId,
    pub index: u64,
}

impl CallContext {
    pub fn new(caller: impl Into<AccountId>, index: u64) -> Self {
        Self {
            caller: caller.into(),
            index,
        }
    }

    /// Same caller, a different index.
    pub fn at(&self, index: u64) -> Self {
        Self {
            caller: self.caller.clone(),
            index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_display() {
        let alice = AccountId::from("alice");
        assert_eq!(alice.to_string(), "alice");
        assert_eq!(alice.as_str(), "alice");
    }

    #[test]
    fn test_ids_serialize_transparently() {
        let asset = AssetId::new("LP");
        assert_eq!(serde_json::to_string(&asset).unwrap(), "\"LP\"");
    }

    #[test]
    fn test_context_at_keeps_caller() {
        let ctx = CallContext::new("bob", 10);
        let later = ctx.at(25);
        assert_eq!(later.caller, AccountId::from("bob"));
        assert_eq!(later.index, 25);
    }
}
