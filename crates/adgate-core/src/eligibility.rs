//! Skip eligibility: may this request bypass the network entirely?

use std::sync::Arc;

use crate::{AdRequestKey, EntitlementId, EntitlementStore, SkipPolicy};

/// Decides whether a request is skippable.
///
/// Cheap to clone (one `Arc`). Every call queries the store afresh; nothing
/// is cached, so a purchase made mid-session takes effect on the next
/// request.
///
/// # Fail-closed
///
/// When the store errors, the entitlement is treated as *not held*. A
/// lookup failure never grants a free skip.
#[derive(Clone)]
pub struct AdEligibilityPolicy {
    entitlements: Arc<dyn EntitlementStore>,
}

impl AdEligibilityPolicy {
    pub fn new(entitlements: Arc<dyn EntitlementStore>) -> Self {
        Self { entitlements }
    }

    /// Whether `id` is held right now. Store failures read as `false`.
    pub fn holds(&self, id: EntitlementId) -> bool {
        match self.entitlements.has_entitlement(id) {
            Ok(held) => held,
            Err(e) => {
                tracing::warn!(
                    entitlement = %id,
                    error = %e,
                    "entitlement lookup failed, treating as not held"
                );
                false
            }
        }
    }

    pub fn is_skippable(&self, key: &AdRequestKey) -> bool {
        match key.skip_policy {
            SkipPolicy::NeverSkippable => false,
            SkipPolicy::SkippableIfHasEntitlement(id) => self.holds(id),
            SkipPolicy::SkippableIfHasAnyEntitlement(a, b) => {
                self.holds(a) || self.holds(b)
            }
        }
    }
}

impl std::fmt::Debug for AdEligibilityPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdEligibilityPolicy").finish_non_exhaustive()
    }
}
