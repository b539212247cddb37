//! Identity shared by ledger entities.

/// Something stored and looked up by a typed id.
///
/// The id never changes for the lifetime of the entity; edits go through
/// the owning ledger.
pub trait Entity {
    /// Copyable id, used as a map key.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}
