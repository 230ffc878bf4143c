// ── Runtime screen configuration ──
//
// Describes *how* a screen behaves: debounce timing, paging defaults,
// tree and selection behavior. The core never reads config files; the
// CLI (via adminkit-config) constructs an `EngineConfig` and hands it in.

use std::time::Duration;

/// Default search debounce window.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Default page size for new screens.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Configuration for a single list or tree screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// How long the search input must be stable before a reload fires.
    pub debounce: Duration,
    /// Initial page size.
    pub page_size: u32,
    /// Page sizes offered to the user.
    pub page_size_options: Vec<u32>,
    /// Whether tree nodes start expanded.
    pub tree_expanded: bool,
    /// Selecting a node also selects all of its ancestors.
    pub propagate_to_ancestors: bool,
    /// Freeze selection (read-only and preview screens).
    pub selection_disabled: bool,
    /// Human label of the records on this screen, used in notifications.
    pub item_type: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            page_size: DEFAULT_PAGE_SIZE,
            page_size_options: vec![10, 25, 50, 100],
            tree_expanded: true,
            propagate_to_ancestors: false,
            selection_disabled: false,
            item_type: "item".into(),
        }
    }
}
