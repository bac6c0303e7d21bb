//! The Agrifood Trust Chain Core: a deterministic state machine tracking
//! delegated signing authority from accreditation bodies down to farms,
//! and the provenance of grape units those farms produce and certify.
//!
//! Layered the way the teacher lays `vision_records` out: one module per
//! component (`store`, `identity`, `party_registry`,
//! `accreditation_registry`, `authorization_registry`, `provenance`),
//! a shared `error`/`model`/`config`/`ledger` foundation, and a
//! `dispatch` module as the single externally-called entry point —
//! mirroring how `vision_records::lib` re-exports its RBAC, examination
//! and events modules behind one `#[contractimpl]` surface.

pub mod accreditation_registry;
pub mod authorization_registry;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod identity;
pub mod ledger;
pub mod model;
pub mod party_registry;
pub mod provenance;
pub mod store;

#[cfg(any(test, feature = "testutils"))]
pub mod testkit;

pub use config::StoreConfig;
pub use error::{CoreError, ErrorCategory};
pub use ledger::{CallerEnvelope, Ledger, SignatureHost};
