// ── Engine data model ──
//
// Identity, the record contract, and the paging/search/status types
// shared by every screen.

pub mod item_id;
pub mod page;
pub mod record;

pub use item_id::ItemId;
pub use page::{ListPage, ListQuery, LoadStatus, ModalState, PageState, SearchState};
pub use record::Record;
