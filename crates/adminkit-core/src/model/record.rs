// ── Record contract ──

use super::item_id::ItemId;

/// A record the engine can list, select and delete.
///
/// The engine is generic over the record shape: it only ever reads the
/// id and, for hierarchical screens, the children. Children are owned by
/// value, so a node can never appear under two parents and a tree built
/// from `Record`s is acyclic.
pub trait Record: Clone + Send + Sync + 'static {
    fn id(&self) -> &ItemId;

    /// Child records. Flat records keep the default.
    fn children(&self) -> &[Self] {
        &[]
    }

    /// Name used in confirmation prompts and notifications.
    fn display_name(&self) -> String {
        self.id().to_string()
    }
}
