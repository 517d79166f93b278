//! Entitlements: purchased flags such as "remove ads".
//!
//! adgate never decides who owns what. It asks an [`EntitlementStore`],
//! which in a shipping game is backed by the purchase/receipt layer.

use std::collections::HashSet;
use std::fmt;
use std::sync::RwLock;

use crate::StoreError;

/// Identifier of a purchasable entitlement (a store product id).
///
/// Keys are process-wide constants, so the id is a `&'static str`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntitlementId(pub &'static str);

impl fmt::Display for EntitlementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// First remove-ads product. Also disables automatic interstitials and the
/// auto-banner.
pub const REMOVE_ADS_1: EntitlementId = EntitlementId("removeAds1");

/// Second remove-ads product, covering the reward-pack style ads.
pub const REMOVE_ADS_2: EntitlementId = EntitlementId("removeAds2");

/// Read-only view of the player's purchased entitlements.
///
/// # Trait bounds
///
/// `Send + Sync + 'static` because the store is shared between the
/// controller task and whoever else holds an eligibility policy.
///
/// Implementations must be side-effect free: adgate calls this on every
/// request and never caches the answer.
pub trait EntitlementStore: Send + Sync + 'static {
    /// Returns whether the entitlement is currently held.
    fn has_entitlement(&self, id: EntitlementId) -> Result<bool, StoreError>;
}

/// An entitlement set kept in memory. Useful for development builds, the
/// demo binary, and tests.
#[derive(Debug, Default)]
pub struct InMemoryEntitlements {
    held: RwLock<HashSet<EntitlementId>>,
}

impl InMemoryEntitlements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds the given entitlements.
    pub fn with(ids: impl IntoIterator<Item = EntitlementId>) -> Self {
        Self {
            held: RwLock::new(ids.into_iter().collect()),
        }
    }

    pub fn grant(&self, id: EntitlementId) -> Result<(), StoreError> {
        let mut held = self.held.write().map_err(|_| poisoned())?;
        held.insert(id);
        Ok(())
    }

    pub fn revoke(&self, id: EntitlementId) -> Result<(), StoreError> {
        let mut held = self.held.write().map_err(|_| poisoned())?;
        held.remove(&id);
        Ok(())
    }
}

impl EntitlementStore for InMemoryEntitlements {
    fn has_entitlement(&self, id: EntitlementId) -> Result<bool, StoreError> {
        let held = self.held.read().map_err(|_| poisoned())?;
        Ok(held.contains(&id))
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("entitlement lock poisoned".into())
}
