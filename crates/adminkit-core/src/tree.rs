// ── Tree index ──
//
// Parent/ancestor lookups and expand/collapse state over a hierarchical
// record collection. The index only reads the collection; it is rebuilt
// after every load.
//
// Duplicate ids are tolerated: the first occurrence in pre-order owns the
// parent and depth entries, later ones are reported via `duplicates()`.
// Cycles cannot occur because records own their children by value.

use std::collections::{HashMap, HashSet};

use indexmap::IndexSet;
use tracing::warn;

use crate::model::{ItemId, Record};

/// Root-first chain of ancestor ids of `id`, ending at its immediate parent.
///
/// Depth-first over `collection`; the first matching path in traversal
/// order wins. Roots and unknown ids yield an empty chain.
pub fn find_ancestors<T: Record>(id: &ItemId, collection: &[T]) -> Vec<ItemId> {
    fn walk<T: Record>(nodes: &[T], target: &ItemId, path: &mut Vec<ItemId>) -> bool {
        for node in nodes {
            if node.id() == target {
                return true;
            }
            path.push(node.id().clone());
            if walk(node.children(), target, path) {
                return true;
            }
            path.pop();
        }
        false
    }

    let mut path = Vec::new();
    if walk(collection, id, &mut path) {
        path
    } else {
        Vec::new()
    }
}

/// Every id in the tree, pre-order, each exactly once.
pub fn flatten<T: Record>(collection: &[T]) -> Vec<ItemId> {
    fn walk<T: Record>(nodes: &[T], out: &mut IndexSet<ItemId>) {
        for node in nodes {
            out.insert(node.id().clone());
            walk(node.children(), out);
        }
    }

    let mut out = IndexSet::new();
    walk(collection, &mut out);
    out.into_iter().collect()
}

/// One renderable row of a tree view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleRow {
    pub id: ItemId,
    pub depth: usize,
    pub has_children: bool,
    pub expanded: bool,
}

/// Lookup tables plus expand state for one tree screen.
#[derive(Debug, Clone, Default)]
pub struct TreeIndex {
    order: Vec<ItemId>,
    parents: HashMap<ItemId, ItemId>,
    depths: HashMap<ItemId, usize>,
    branches: HashSet<ItemId>,
    expanded: HashMap<ItemId, bool>,
    initially_expanded: bool,
    duplicates: Vec<ItemId>,
}

impl TreeIndex {
    /// An empty index. Nodes added by later rebuilds start in
    /// `initially_expanded` state.
    pub fn new(initially_expanded: bool) -> Self {
        Self {
            initially_expanded,
            ..Self::default()
        }
    }

    pub fn build<T: Record>(collection: &[T], initially_expanded: bool) -> Self {
        let mut index = Self::new(initially_expanded);
        index.rebuild(collection);
        index
    }

    /// Re-index a fresh collection.
    ///
    /// Expand state survives for ids still present; new ids get the
    /// configured initial state; vanished ids are forgotten.
    pub fn rebuild<T: Record>(&mut self, collection: &[T]) {
        let previous = std::mem::take(&mut self.expanded);
        self.order.clear();
        self.parents.clear();
        self.depths.clear();
        self.branches.clear();
        self.duplicates.clear();

        let mut seen = HashSet::new();
        self.index_level(collection, None, 0, &mut seen);

        for id in &self.order {
            let state = previous
                .get(id)
                .copied()
                .unwrap_or(self.initially_expanded);
            self.expanded.insert(id.clone(), state);
        }

        if !self.duplicates.is_empty() {
            warn!(
                count = self.duplicates.len(),
                "duplicate ids in tree; first occurrence wins"
            );
        }
    }

    fn index_level<T: Record>(
        &mut self,
        nodes: &[T],
        parent: Option<&ItemId>,
        depth: usize,
        seen: &mut HashSet<ItemId>,
    ) {
        for node in nodes {
            let id = node.id();
            if seen.insert(id.clone()) {
                self.order.push(id.clone());
                self.depths.insert(id.clone(), depth);
                if let Some(parent) = parent {
                    self.parents.insert(id.clone(), parent.clone());
                }
                if !node.children().is_empty() {
                    self.branches.insert(id.clone());
                }
            } else {
                self.duplicates.push(id.clone());
            }
            self.index_level(node.children(), Some(id), depth + 1, seen);
        }
    }

    // ── Lookups ──────────────────────────────────────────────────────

    /// Root-first ancestor chain of `id` (empty for roots and unknown ids).
    pub fn ancestors(&self, id: &ItemId) -> Vec<ItemId> {
        let mut chain = Vec::new();
        let mut cursor = self.parents.get(id);
        while let Some(parent) = cursor {
            chain.push(parent.clone());
            cursor = self.parents.get(parent);
        }
        chain.reverse();
        chain
    }

    pub fn parent(&self, id: &ItemId) -> Option<&ItemId> {
        self.parents.get(id)
    }

    pub fn depth(&self, id: &ItemId) -> Option<usize> {
        self.depths.get(id).copied()
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.depths.contains_key(id)
    }

    /// All ids in pre-order.
    pub fn ids(&self) -> &[ItemId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Ids that appeared more than once during the last rebuild.
    pub fn duplicates(&self) -> &[ItemId] {
        &self.duplicates
    }

    // ── Expand state ─────────────────────────────────────────────────

    pub fn is_expanded(&self, id: &ItemId) -> bool {
        self.expanded
            .get(id)
            .copied()
            .unwrap_or(self.initially_expanded)
    }

    /// Returns `false` if `id` is not in the tree.
    pub fn expand(&mut self, id: &ItemId) -> bool {
        self.set_expanded(id, true)
    }

    pub fn collapse(&mut self, id: &ItemId) -> bool {
        self.set_expanded(id, false)
    }

    pub fn toggle(&mut self, id: &ItemId) -> bool {
        let next = !self.is_expanded(id);
        self.set_expanded(id, next)
    }

    pub fn expand_all(&mut self) {
        self.expanded.values_mut().for_each(|v| *v = true);
    }

    pub fn collapse_all(&mut self) {
        self.expanded.values_mut().for_each(|v| *v = false);
    }

    fn set_expanded(&mut self, id: &ItemId, expanded: bool) -> bool {
        match self.expanded.get_mut(id) {
            Some(state) => {
                *state = expanded;
                true
            }
            None => false,
        }
    }

    /// Rows a tree renderer should draw, skipping the descendants of
    /// collapsed nodes.
    pub fn visible_rows<T: Record>(&self, collection: &[T]) -> Vec<VisibleRow> {
        let mut rows = Vec::new();
        self.collect_rows(collection, 0, &mut rows);
        rows
    }

    fn collect_rows<T: Record>(&self, nodes: &[T], depth: usize, rows: &mut Vec<VisibleRow>) {
        for node in nodes {
            let has_children = !node.children().is_empty();
            let expanded = self.is_expanded(node.id());
            rows.push(VisibleRow {
                id: node.id().clone(),
                depth,
                has_children,
                expanded,
            });
            if has_children && expanded {
                self.collect_rows(node.children(), depth + 1, rows);
            }
        }
    }

    /// Whether `id` has children in the indexed collection.
    pub fn has_children(&self, id: &ItemId) -> bool {
        self.branches.contains(id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone)]
    pub(crate) struct Node {
        pub id: ItemId,
        pub children: Vec<Node>,
    }

    impl Record for Node {
        fn id(&self) -> &ItemId {
            &self.id
        }

        fn children(&self) -> &[Self] {
            &self.children
        }
    }

    pub(crate) fn node(id: &str, children: Vec<Node>) -> Node {
        Node {
            id: ItemId::from(id),
            children,
        }
    }

    pub(crate) fn leaf(id: &str) -> Node {
        node(id, Vec::new())
    }

    fn ids(raw: &[&str]) -> Vec<ItemId> {
        raw.iter().map(|s| ItemId::from(*s)).collect()
    }

    /// A ─┬─ B ─── C
    ///    └─ D
    /// E
    pub(crate) fn sample() -> Vec<Node> {
        vec![
            node("A", vec![node("B", vec![leaf("C")]), leaf("D")]),
            leaf("E"),
        ]
    }

    #[test]
    fn find_ancestors_returns_root_first_chain() {
        let tree = sample();
        assert_eq!(find_ancestors(&"C".into(), &tree), ids(&["A", "B"]));
        assert_eq!(find_ancestors(&"D".into(), &tree), ids(&["A"]));
    }

    #[test]
    fn find_ancestors_of_root_or_unknown_is_empty() {
        let tree = sample();
        assert!(find_ancestors(&"A".into(), &tree).is_empty());
        assert!(find_ancestors(&"zzz".into(), &tree).is_empty());
    }

    #[test]
    fn flatten_is_preorder() {
        assert_eq!(flatten(&sample()), ids(&["A", "B", "C", "D", "E"]));
    }

    #[test]
    fn index_ancestors_agree_with_search() {
        let tree = sample();
        let index = TreeIndex::build(&tree, true);
        for id in flatten(&tree) {
            assert_eq!(index.ancestors(&id), find_ancestors(&id, &tree), "id {id}");
        }
        assert_eq!(index.depth(&"C".into()), Some(2));
        assert_eq!(index.parent(&"B".into()), Some(&ItemId::from("A")));
        assert!(index.has_children(&"B".into()));
        assert!(!index.has_children(&"E".into()));
    }

    #[test]
    fn initial_expand_state_is_configurable() {
        let tree = sample();
        let open = TreeIndex::build(&tree, true);
        let closed = TreeIndex::build(&tree, false);
        assert!(open.is_expanded(&"A".into()));
        assert!(!closed.is_expanded(&"A".into()));
    }

    #[test]
    fn toggle_and_bulk_expand() {
        let tree = sample();
        let mut index = TreeIndex::build(&tree, true);

        assert!(index.toggle(&"A".into()));
        assert!(!index.is_expanded(&"A".into()));
        assert!(!index.toggle(&"missing".into()));

        index.collapse_all();
        assert!(index.ids().iter().all(|id| !index.is_expanded(id)));
        index.expand_all();
        assert!(index.ids().iter().all(|id| index.is_expanded(id)));
    }

    #[test]
    fn rebuild_keeps_state_of_surviving_ids() {
        let tree = sample();
        let mut index = TreeIndex::build(&tree, true);
        index.collapse(&"A".into());

        let next = vec![
            node("A", vec![node("B", vec![leaf("C")])]),
            node("F", vec![leaf("G")]),
        ];
        index.rebuild(&next);

        assert!(!index.is_expanded(&"A".into()));
        assert!(index.is_expanded(&"F".into()));
        assert!(!index.contains(&"D".into()));
        assert_eq!(index.len(), 5);
    }

    #[test]
    fn visible_rows_skip_collapsed_subtrees() {
        let tree = sample();
        let mut index = TreeIndex::build(&tree, true);
        index.collapse(&"B".into());

        let rows = index.visible_rows(&tree);
        let shown: Vec<_> = rows.iter().map(|r| (r.id.as_str(), r.depth)).collect();
        assert_eq!(shown, vec![("A", 0), ("B", 1), ("D", 1), ("E", 0)]);
        assert!(rows[1].has_children);
        assert!(!rows[1].expanded);
    }

    #[test]
    fn duplicate_ids_first_occurrence_wins() {
        let tree = vec![node("A", vec![leaf("X")]), node("B", vec![leaf("X")])];
        let index = TreeIndex::build(&tree, true);

        assert_eq!(index.ancestors(&"X".into()), ids(&["A"]));
        assert_eq!(index.duplicates(), ids(&["X"]).as_slice());
        assert_eq!(flatten(&tree), ids(&["A", "X", "B"]));
        assert_eq!(find_ancestors(&"X".into(), &tree), ids(&["A"]));
    }
}
