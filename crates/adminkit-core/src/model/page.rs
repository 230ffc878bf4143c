// ── Paging, search and screen status types ──

use serde::{Deserialize, Serialize};

use super::item_id::ItemId;

/// Current page window of a listing.
///
/// `pages_count` is always `ceil(items_count / page_size)` and `page` stays
/// within `1..=max(pages_count, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    pub page: u32,
    pub page_size: u32,
    pub items_count: u64,
    pub pages_count: u32,
}

impl PageState {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            items_count: 0,
            pages_count: 0,
        }
    }

    /// Highest page the listing can currently show.
    pub fn last_page(&self) -> u32 {
        self.pages_count.max(1)
    }

    /// Set the total and recompute `pages_count`.
    pub(crate) fn set_items_count(&mut self, items_count: u64) {
        self.items_count = items_count;
        self.pages_count = pages_for(items_count, self.page_size);
    }

    pub(crate) fn set_page_size(&mut self, page_size: u32) {
        self.page_size = page_size;
        self.pages_count = pages_for(self.items_count, page_size);
    }
}

fn pages_for(items_count: u64, page_size: u32) -> u32 {
    let pages = items_count.div_ceil(u64::from(page_size.max(1)));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Search box state.
///
/// `display_value` follows every keystroke; `committed_term` only moves
/// once the debounce window has elapsed and is the one that drives reloads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchState {
    pub display_value: String,
    pub committed_term: String,
}

/// Parameters handed to a data service `list` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    pub page: u32,
    pub page_size: u32,
    pub search: String,
}

impl ListQuery {
    /// Zero-based offset of the first record on this page.
    pub fn offset(&self) -> usize {
        let page = usize::try_from(self.page.saturating_sub(1)).unwrap_or(usize::MAX);
        let size = usize::try_from(self.page_size).unwrap_or(usize::MAX);
        page.saturating_mul(size)
    }
}

/// One page of records returned by a data service.
#[derive(Debug, Clone)]
pub struct ListPage<T> {
    pub items: Vec<T>,
    /// Total number of records matching the query across all pages.
    pub items_count: u64,
}

/// Load lifecycle of a screen. Loading and failure are exclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(String),
}

impl LoadStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Which editing modal, if any, is open on a screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ModalState {
    #[default]
    Closed,
    Create,
    Edit(ItemId),
}
