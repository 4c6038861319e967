//! Create / update / skip decision policy

use crate::adapters::store::ExistingRecord;
use crate::core::ledger::LedgerHistory;

/// What to do with one record after the existence check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadAction {
    /// No record with this DOI exists yet
    Create,

    /// A record exists from a create that never completed; finish it and
    /// report it as created
    Resume(ExistingRecord),

    /// A record exists and updates are suppressed
    Skip(ExistingRecord),

    /// A record exists and will be updated in place
    Update(ExistingRecord),
}

impl LoadAction {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            LoadAction::Create => "create",
            LoadAction::Resume(_) => "finish_create",
            LoadAction::Skip(_) => "skip",
            LoadAction::Update(existing) if existing.is_published => "update_published",
            LoadAction::Update(_) => "update_draft",
        }
    }

    /// The existing record, for every action but `Create`
    pub fn existing(&self) -> Option<&ExistingRecord> {
        match self {
            LoadAction::Create => None,
            LoadAction::Resume(existing)
            | LoadAction::Skip(existing)
            | LoadAction::Update(existing) => Some(existing),
        }
    }
}

/// Decides the action for a record given the store's existing match and
/// the ledger's history for its key
///
/// A create is unfinished when the store holds an unpublished draft the
/// created log has never seen, or when the key failed without ever being
/// created. Unfinished creates are always finished; `no_updates` only
/// suppresses updates of records whose create completed.
pub fn decide_action(
    existing: Option<ExistingRecord>,
    history: LedgerHistory,
    no_updates: bool,
) -> LoadAction {
    match existing {
        None => LoadAction::Create,
        Some(existing) if !history.created && !existing.is_published => {
            LoadAction::Resume(existing)
        }
        Some(existing) if history.unfinished_create() => LoadAction::Resume(existing),
        Some(existing) if no_updates && existing.is_published => LoadAction::Skip(existing),
        Some(existing) => LoadAction::Update(existing),
    }
}
