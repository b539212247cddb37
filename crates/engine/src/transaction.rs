//! Transaction entity: a dated event owning an ordered sequence of splits.

use chrono::{DateTime, Utc};

use splitbook_core::{Entity, SplitId, TransactionId};

/// Edit-session state of a transaction.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum EditState {
    #[default]
    Closed,
    Open {
        /// Postpone rebalancing until commit.
        defer_rebalance: bool,
    },
}

impl EditState {
    pub fn is_open(self) -> bool {
        matches!(self, EditState::Open { .. })
    }

    pub fn defers_rebalance(self) -> bool {
        matches!(
            self,
            EditState::Open {
                defer_rebalance: true
            }
        )
    }
}

/// A dated financial event.
///
/// The first split is the "source" split; rebalancing treats it
/// differently from the rest.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    id: TransactionId,
    pub(crate) num: String,
    pub(crate) description: String,
    pub(crate) docref: String,
    pub(crate) date_entered: DateTime<Utc>,
    pub(crate) date_posted: DateTime<Utc>,
    pub(crate) splits: Vec<SplitId>,
    pub(crate) edit: EditState,
}

impl Transaction {
    /// A closed transaction owning the given first split.
    pub(crate) fn with_source(source: SplitId) -> Self {
        Self {
            id: TransactionId::new(),
            num: String::new(),
            description: String::new(),
            docref: String::new(),
            date_entered: DateTime::<Utc>::default(),
            date_posted: DateTime::<Utc>::default(),
            splits: vec![source],
            edit: EditState::Closed,
        }
    }

    pub fn id_typed(&self) -> TransactionId {
        self.id
    }

    pub fn num(&self) -> &str {
        &self.num
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn docref(&self) -> &str {
        &self.docref
    }

    pub fn date_entered(&self) -> DateTime<Utc> {
        self.date_entered
    }

    pub fn date_posted(&self) -> DateTime<Utc> {
        self.date_posted
    }

    pub fn splits(&self) -> &[SplitId] {
        &self.splits
    }

    pub fn split_count(&self) -> usize {
        self.splits.len()
    }

    pub fn split_at(&self, index: usize) -> Option<SplitId> {
        self.splits.get(index).copied()
    }

    /// The first split.
    pub fn source_split(&self) -> Option<SplitId> {
        self.split_at(0)
    }

    pub fn contains(&self, split: SplitId) -> bool {
        self.splits.contains(&split)
    }

    pub fn edit_state(&self) -> EditState {
        self.edit
    }

    pub fn is_open(&self) -> bool {
        self.edit.is_open()
    }

    pub(crate) fn push_split(&mut self, split: SplitId) {
        self.splits.push(split);
    }

    pub(crate) fn insert_split_at(&mut self, index: usize, split: SplitId) {
        let index = index.min(self.splits.len());
        self.splits.insert(index, split);
    }

    /// Drop `split` from the sequence, keeping the others in order.
    pub(crate) fn remove_split(&mut self, split: SplitId) -> bool {
        let before = self.splits.len();
        self.splits.retain(|s| *s != split);
        self.splits.len() != before
    }
}

impl Entity for Transaction {
    type Id = TransactionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
