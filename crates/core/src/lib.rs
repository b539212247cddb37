//! `splitbook-core` — foundation types for the bookkeeping engine.
//!
//! Identifiers, commodity and reconcile values, the error model and the
//! engine configuration. No engine state lives here.

pub mod commodity;
pub mod config;
pub mod entity;
pub mod error;
pub mod id;
pub mod reconcile;

pub use commodity::CommodityId;
pub use config::{EnforcementMode, EngineConfig};
pub use entity::Entity;
pub use error::{LedgerError, LedgerResult};
pub use id::{AccountId, SplitId, TransactionId};
pub use reconcile::ReconcileState;
