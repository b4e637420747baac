//! What a run changed.

use serde::Serialize;

/// The kind of an inserted cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertionKind {
    /// A clock buffer.
    Buffer,
    /// An input pad.
    Pad,
}

/// One inserted cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Insertion {
    /// The module the cell was added to.
    pub module: String,
    /// The wire whose bit triggered the insertion.
    pub wire: String,
    /// The bit of that wire.
    pub bit: u32,
    /// Buffer or pad.
    pub kind: InsertionKind,
    /// The inserted cell's type.
    pub cell_type: String,
    /// The inserted cell's name.
    pub cell: String,
}

/// Per-module counts, in processing order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ModuleSummary {
    /// The module name.
    pub module: String,
    /// Whether only the port contract was read.
    pub blackbox: bool,
    /// Cells inserted into this module.
    pub inserted: usize,
    /// Clock input bits left for instantiating modules.
    pub deferred: usize,
    /// Driver bits moved to the source side of an inserted cell.
    pub reconnected: usize,
}

/// The outcome of [`run`](crate::run).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct InsertionReport {
    /// Every inserted cell, in insertion order.
    pub insertions: Vec<Insertion>,
    /// One entry per processed module.
    pub modules: Vec<ModuleSummary>,
}

impl InsertionReport {
    /// Returns `true` if the run left the design unchanged.
    pub fn is_empty(&self) -> bool {
        self.insertions.is_empty()
    }

    /// Number of inserted cells of the given kind.
    pub fn count(&self, kind: InsertionKind) -> usize {
        self.insertions.iter().filter(|i| i.kind == kind).count()
    }
}
