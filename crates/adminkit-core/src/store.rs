// ── Screen state snapshot ──
//
// Everything a renderer needs to draw one screen, published through a
// `watch` channel. Renderers never mutate it; they call back into the
// orchestrator instead.

use std::sync::Arc;

use crate::model::{ItemId, LoadStatus, ModalState};
use crate::selection::SelectionEngine;
use crate::tree::{TreeIndex, VisibleRow};

/// Per-id outcome of a batch delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchDeleteReport {
    pub results: Vec<(ItemId, Result<(), String>)>,
}

impl BatchDeleteReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &ItemId> {
        self.results
            .iter()
            .filter(|(_, r)| r.is_ok())
            .map(|(id, _)| id)
    }

    pub fn failed(&self) -> impl Iterator<Item = (&ItemId, &str)> {
        self.results.iter().filter_map(|(id, r)| match r {
            Ok(()) => None,
            Err(reason) => Some((id, reason.as_str())),
        })
    }

    pub fn failed_count(&self) -> usize {
        self.failed().count()
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }
}

/// Observable state of one list or tree screen.
#[derive(Debug, Clone)]
pub struct ScreenState<T> {
    pub items: Arc<Vec<T>>,
    pub status: LoadStatus,
    pub modal: ModalState,
    pub selection: SelectionEngine,
    pub tree: TreeIndex,
    /// Outcome of the most recent batch delete, if any.
    pub last_batch: Option<BatchDeleteReport>,
}

impl<T> ScreenState<T> {
    pub(crate) fn new(selection: SelectionEngine, tree: TreeIndex) -> Self {
        Self {
            items: Arc::new(Vec::new()),
            status: LoadStatus::Idle,
            modal: ModalState::Closed,
            selection,
            tree,
            last_batch: None,
        }
    }
}

impl<T: crate::model::Record> ScreenState<T> {
    /// Rows for a tree renderer, honoring expand state.
    pub fn visible_rows(&self) -> Vec<VisibleRow> {
        self.tree.visible_rows(&self.items)
    }

    pub fn find(&self, id: &ItemId) -> Option<&T> {
        fn walk<'a, T: crate::model::Record>(nodes: &'a [T], id: &ItemId) -> Option<&'a T> {
            nodes.iter().find_map(|node| {
                if node.id() == id {
                    Some(node)
                } else {
                    walk(node.children(), id)
                }
            })
        }
        walk(&self.items, id)
    }
}
