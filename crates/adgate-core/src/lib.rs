//! Core vocabulary for adgate.
//!
//! This crate defines the values that every other layer passes around:
//!
//! - **Kinds** ([`AdKind`]): which network surface an ad lives on.
//! - **Keys** ([`AdRequestKey`], [`SkipPolicy`], [`keys`]): one immutable
//!   constant per call site, describing what to show and who may skip it.
//! - **Outcomes** ([`AdOutcome`], [`FailReason`]): the uniform result every
//!   show request resolves to.
//! - **Eligibility** ([`AdEligibilityPolicy`], [`EntitlementStore`]): the
//!   rule deciding whether a request is skipped without touching the network.
//!
//! # How it fits in the stack
//!
//! ```text
//! Controller (above)  ← consults eligibility, returns outcomes
//!     ↕
//! Core (this crate)   ← keys, outcomes, entitlement lookups
//! ```

mod eligibility;
mod entitlement;
mod error;
mod key;
mod kind;
mod outcome;

pub mod keys;

pub use eligibility::AdEligibilityPolicy;
pub use entitlement::{
    EntitlementId, EntitlementStore, InMemoryEntitlements, REMOVE_ADS_1, REMOVE_ADS_2,
};
pub use error::StoreError;
pub use key::{AdRequestKey, SkipPolicy};
pub use kind::AdKind;
pub use outcome::{AdOutcome, FailReason};
