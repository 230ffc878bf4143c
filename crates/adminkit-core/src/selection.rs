// ── Selection engine ──
//
// Flat and hierarchical multi-selection over item ids. In hierarchical
// mode, newly selected ids pull their whole ancestor chain into the
// selection.
//
// Propagation is one-directional: selecting a child selects its
// ancestors, but deselecting that child later leaves the ancestors
// selected, and siblings are never touched. Callers that want parents to
// drop out when their last child does must do so themselves.

use indexmap::IndexSet;
use tracing::trace;

use crate::model::ItemId;
use crate::tree::TreeIndex;

/// Set of selected ids, deduplicated, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct SelectionEngine {
    selected: IndexSet<ItemId>,
    propagate_to_ancestors: bool,
    disabled: bool,
}

impl SelectionEngine {
    pub fn new(propagate_to_ancestors: bool) -> Self {
        Self {
            selected: IndexSet::new(),
            propagate_to_ancestors,
            disabled: false,
        }
    }

    // ── Flags ────────────────────────────────────────────────────────

    /// Freeze (or unfreeze) the selection. While disabled every mutating
    /// call is a no-op but the current selection stays readable.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn propagates_to_ancestors(&self) -> bool {
        self.propagate_to_ancestors
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub fn is_selected(&self, id: &ItemId) -> bool {
        self.selected.contains(id)
    }

    pub fn selected(&self) -> Vec<ItemId> {
        self.selected.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemId> {
        self.selected.iter()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Replace the selection outright.
    pub fn set_selection(&mut self, ids: impl IntoIterator<Item = ItemId>) {
        if self.disabled {
            return;
        }
        self.selected = ids.into_iter().collect();
    }

    /// Apply a caller-computed target selection.
    ///
    /// With ancestor propagation enabled and a tree supplied, each id that
    /// was not already selected brings its ancestors along.
    pub fn toggle_selection(
        &mut self,
        new_ids: impl IntoIterator<Item = ItemId>,
        tree: Option<&TreeIndex>,
    ) {
        if self.disabled {
            return;
        }
        let target: IndexSet<ItemId> = new_ids.into_iter().collect();

        let mut next = target.clone();
        if let (true, Some(tree)) = (self.propagate_to_ancestors, tree) {
            for id in target.iter().filter(|id| !self.selected.contains(*id)) {
                let ancestors = tree.ancestors(id);
                trace!(id = %id, ancestors = ancestors.len(), "propagating selection");
                next.extend(ancestors);
            }
        }
        self.selected = next;
    }

    /// Flip one id and apply the result through
    /// [`toggle_selection`](Self::toggle_selection).
    pub fn toggle(&mut self, id: &ItemId, tree: Option<&TreeIndex>) {
        if self.disabled {
            return;
        }
        let mut target = self.selected.clone();
        if !target.shift_remove(id) {
            target.insert(id.clone());
        }
        self.toggle_selection(target, tree);
    }

    /// Select every id known to the tree.
    pub fn select_all(&mut self, tree: &TreeIndex) {
        self.set_selection(tree.ids().iter().cloned());
    }

    pub fn clear(&mut self) {
        self.set_selection(std::iter::empty());
    }

    /// Deselect specific ids. No propagation in either direction.
    pub fn remove(&mut self, ids: &[ItemId]) {
        if self.disabled {
            return;
        }
        self.selected.retain(|id| !ids.contains(id));
    }

    /// Drop ids that no longer exist in `tree` (after a reload).
    pub fn retain_existing(&mut self, tree: &TreeIndex) {
        if self.disabled {
            return;
        }
        self.selected.retain(|id| tree.contains(id));
    }
}
