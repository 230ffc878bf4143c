// ── Pagination / search coordination ──
//
// Owns the page window and the two-stage search state of a screen and
// decides *when* a reload is needed. It never performs the reload itself:
// an injected trigger is called with the query to run, fire-and-forget.
//
// The search box and the reload are fully decoupled: `display_value` is
// published synchronously on every keystroke and is never rewritten by a
// reload, so a renderer can keep the input element stable (and focused)
// while data arrives.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::CoreError;
use crate::model::{ListQuery, PageState, SearchState};

/// Callback invoked whenever the coordinator wants fresh data.
pub type ReloadTrigger = Arc<dyn Fn(ListQuery) + Send + Sync>;

/// Page and search state holder with debounced search commits.
///
/// Cheaply cloneable; clones share state. Search debouncing spawns a
/// timer task, so [`handle_search_change`](Self::handle_search_change)
/// must be called from within a Tokio runtime.
#[derive(Clone)]
pub struct PaginationCoordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    page: watch::Sender<PageState>,
    search: watch::Sender<SearchState>,
    debounce: Duration,
    /// Token of the currently armed debounce timer.
    pending_search: Mutex<CancellationToken>,
    trigger: ReloadTrigger,
}

impl PaginationCoordinator {
    pub fn new(page_size: u32, debounce: Duration, trigger: ReloadTrigger) -> Self {
        let (page, _) = watch::channel(PageState::new(page_size));
        let (search, _) = watch::channel(SearchState::default());

        Self {
            inner: Arc::new(CoordinatorInner {
                page,
                search,
                debounce,
                pending_search: Mutex::new(CancellationToken::new()),
                trigger,
            }),
        }
    }

    // ── Observables ──────────────────────────────────────────────────

    pub fn page_state(&self) -> PageState {
        *self.inner.page.borrow()
    }

    pub fn search_state(&self) -> SearchState {
        self.inner.search.borrow().clone()
    }

    pub fn subscribe_page(&self) -> watch::Receiver<PageState> {
        self.inner.page.subscribe()
    }

    pub fn subscribe_search(&self) -> watch::Receiver<SearchState> {
        self.inner.search.subscribe()
    }

    /// The query matching the current page window and committed term.
    pub fn query(&self) -> ListQuery {
        let page = self.page_state();
        ListQuery {
            page: page.page,
            page_size: page.page_size,
            search: self.inner.search.borrow().committed_term.clone(),
        }
    }

    // ── Paging ───────────────────────────────────────────────────────

    /// Jump to page `page` and reload.
    pub fn change_page(&self, page: u32) -> Result<(), CoreError> {
        let last_page = self.page_state().last_page();
        if page < 1 || page > last_page {
            return Err(CoreError::InvalidPage { page, last_page });
        }
        self.inner.page.send_modify(|p| p.page = page);
        debug!(page, "page changed");
        self.reload();
        Ok(())
    }

    /// Change the page size. The page offset is invalidated, so the
    /// listing returns to page 1 before the reload is requested.
    pub fn change_page_size(&self, page_size: u32) -> Result<(), CoreError> {
        if page_size == 0 {
            return Err(CoreError::InvalidPageSize { page_size });
        }
        self.inner.page.send_modify(|p| {
            p.set_page_size(page_size);
            p.page = 1;
        });
        debug!(page_size, "page size changed");
        self.reload();
        Ok(())
    }

    /// Record the total reported by the last load.
    ///
    /// If the current page fell off the end (e.g. after deleting the last
    /// rows of the final page) it is clamped and one more reload is issued.
    pub fn apply_items_count(&self, items_count: u64) {
        let mut clamped_to = None;
        self.inner.page.send_modify(|p| {
            p.set_items_count(items_count);
            let last = p.last_page();
            if p.page > last {
                p.page = last;
                clamped_to = Some(last);
            }
        });
        if let Some(page) = clamped_to {
            debug!(page, items_count, "page past end after load, clamping");
            self.reload();
        }
    }

    // ── Search ───────────────────────────────────────────────────────

    /// Handle a keystroke in the search box.
    ///
    /// The display value updates immediately; the committed term (and the
    /// reload) follows once the input has been stable for the debounce
    /// window. Each call re-arms the window, so bursts collapse into a
    /// single reload carrying the last value.
    pub fn handle_search_change(&self, text: impl Into<String>) {
        let text = text.into();
        self.inner
            .search
            .send_modify(|s| s.display_value.clone_from(&text));

        let token = CancellationToken::new();
        let previous = std::mem::replace(&mut *self.inner.lock_pending(), token.clone());
        previous.cancel();

        let coordinator = self.clone();
        let window = self.inner.debounce;
        tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => {}
                () = tokio::time::sleep(window) => {
                    if !token.is_cancelled() {
                        coordinator.commit_search(text);
                    }
                }
            }
        });
    }

    /// Commit a search term immediately, skipping the debounce window.
    pub fn commit_search_now(&self, text: impl Into<String>) {
        let text = text.into();
        self.inner.lock_pending().cancel();
        self.inner
            .search
            .send_modify(|s| s.display_value.clone_from(&text));
        self.commit_search(text);
    }

    /// Drop any armed debounce timer without committing.
    pub fn cancel_pending_search(&self) {
        self.inner.lock_pending().cancel();
    }

    fn commit_search(&self, term: String) {
        debug!(term = %term, "search term committed");
        self.inner.search.send_modify(|s| s.committed_term = term);
        self.inner.page.send_modify(|p| p.page = 1);
        self.reload();
    }

    /// Request a reload of the current query.
    pub fn reload(&self) {
        (self.inner.trigger)(self.query());
    }
}

impl CoordinatorInner {
    fn lock_pending(&self) -> MutexGuard<'_, CancellationToken> {
        self.pending_search
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for PaginationCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginationCoordinator")
            .field("page", &self.page_state())
            .field("search", &self.search_state())
            .field("debounce", &self.inner.debounce)
            .finish_non_exhaustive()
    }
}
