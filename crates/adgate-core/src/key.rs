//! Ad request keys and their skip policies.

use crate::{AdKind, EntitlementId};

/// Who may bypass an ad without watching it.
///
/// A closed set: the controller matches on it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipPolicy {
    /// Everyone watches, entitled or not.
    NeverSkippable,
    /// Skipped when the player holds this entitlement.
    SkippableIfHasEntitlement(EntitlementId),
    /// Skipped when the player holds either entitlement.
    SkippableIfHasAnyEntitlement(EntitlementId, EntitlementId),
}

/// Immutable description of one ad call site: what to show, and the rule
/// for skipping it.
///
/// Keys are `const`-constructible so every call site can own a process-wide
/// constant (see [`crate::keys`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AdRequestKey {
    pub kind: AdKind,
    pub skip_policy: SkipPolicy,
}

impl AdRequestKey {
    pub const fn new(kind: AdKind, skip_policy: SkipPolicy) -> Self {
        Self { kind, skip_policy }
    }

    /// A key nobody can skip.
    pub const fn unskippable(kind: AdKind) -> Self {
        Self::new(kind, SkipPolicy::NeverSkippable)
    }

    /// A key skipped by holders of `id`.
    pub const fn skippable_with(kind: AdKind, id: EntitlementId) -> Self {
        Self::new(kind, SkipPolicy::SkippableIfHasEntitlement(id))
    }

    /// A key skipped by holders of either `a` or `b`.
    pub const fn skippable_with_any(kind: AdKind, a: EntitlementId, b: EntitlementId) -> Self {
        Self::new(kind, SkipPolicy::SkippableIfHasAnyEntitlement(a, b))
    }
}
