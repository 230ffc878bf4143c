// ── CRUD orchestrator ──
//
// Composes pagination, tree index, selection and the confirmation gate
// into one screen-level facade over an injected `DataService`. Every
// mutation is followed by a full reload; there is no optimistic merging.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, join_all};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::command::{ActionDispatcher, ConfirmText, DeleteRoute, RefreshFn};
use crate::config::EngineConfig;
use crate::error::CoreError;
use crate::gate::{ConfirmOptions, ConfirmationGate, ExecuteOutcome, capitalize};
use crate::model::{ItemId, ListPage, ListQuery, LoadStatus, ModalState, Record};
use crate::notify::{NotificationKind, Notifier};
use crate::pagination::{PaginationCoordinator, ReloadTrigger};
use crate::selection::SelectionEngine;
use crate::service::{DataService, ServiceError, TreeService};
use crate::store::{BatchDeleteReport, ScreenState};
use crate::tree::TreeIndex;

type ListFn<S> = for<'a> fn(
    &'a S,
    ListQuery,
) -> BoxFuture<'a, Result<ListPage<<S as DataService>::Item>, ServiceError>>;

fn list_flat<S: DataService>(
    service: &S,
    query: ListQuery,
) -> BoxFuture<'_, Result<ListPage<S::Item>, ServiceError>> {
    service.list(query).boxed()
}

fn list_tree<S: TreeService>(
    service: &S,
    query: ListQuery,
) -> BoxFuture<'_, Result<ListPage<S::Item>, ServiceError>> {
    service.list_with_children(query).boxed()
}

/// How a load call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// A newer load was issued while this one was in flight; its response
    /// was dropped.
    Stale,
    Failed,
}

/// Screen-level facade over one data service.
///
/// Cheaply cloneable via `Arc<OrchestratorInner>`. Reloads triggered by
/// paging and search run on spawned Tokio tasks, so the orchestrator must
/// be driven from within a runtime.
pub struct Orchestrator<S: DataService> {
    inner: Arc<OrchestratorInner<S>>,
}

struct OrchestratorInner<S: DataService> {
    service: Arc<S>,
    list_fn: ListFn<S>,
    hierarchical: bool,
    config: EngineConfig,
    notifier: Arc<dyn Notifier>,
    pagination: PaginationCoordinator,
    gate: ConfirmationGate,
    state: watch::Sender<ScreenState<S::Item>>,
    /// Sequence number of the most recently issued load.
    load_seq: AtomicU64,
    /// Reloads spawned by the pagination trigger that have not finished.
    in_flight: Arc<watch::Sender<usize>>,
}

/// Decrements the in-flight counter when a spawned reload ends, even if it
/// panicked.
struct InFlight(Arc<watch::Sender<usize>>);

impl InFlight {
    fn enter(counter: &Arc<watch::Sender<usize>>) -> Self {
        counter.send_modify(|n| *n += 1);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.send_modify(|n| *n = n.saturating_sub(1));
    }
}

impl<S: DataService> Clone for Orchestrator<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: DataService> Orchestrator<S> {
    /// Orchestrator for a flat, paginated listing.
    pub fn new(service: S, notifier: Arc<dyn Notifier>, config: EngineConfig) -> Self {
        Self::build(service, notifier, config, list_flat::<S>, false)
    }

    fn build(
        service: S,
        notifier: Arc<dyn Notifier>,
        config: EngineConfig,
        list_fn: ListFn<S>,
        hierarchical: bool,
    ) -> Self {
        let inner = Arc::new_cyclic(|weak: &Weak<OrchestratorInner<S>>| {
            let weak = weak.clone();
            let trigger: ReloadTrigger = Arc::new(move |query| {
                if let Some(inner) = weak.upgrade() {
                    let guard = InFlight::enter(&inner.in_flight);
                    let screen = Orchestrator { inner };
                    tokio::spawn(async move {
                        let _guard = guard;
                        screen.load_query(query).await;
                    });
                }
            });

            let mut selection = SelectionEngine::new(config.propagate_to_ancestors);
            selection.set_disabled(config.selection_disabled);
            let tree = TreeIndex::new(config.tree_expanded);
            let (state, _) = watch::channel(ScreenState::new(selection, tree));

            OrchestratorInner {
                service: Arc::new(service),
                list_fn,
                hierarchical,
                pagination: PaginationCoordinator::new(config.page_size, config.debounce, trigger),
                gate: ConfirmationGate::new(Arc::clone(&notifier)),
                notifier,
                config,
                state,
                load_seq: AtomicU64::new(0),
                in_flight: Arc::new(watch::channel(0).0),
            }
        });
        Self { inner }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    pub fn service(&self) -> &Arc<S> {
        &self.inner.service
    }

    pub fn pagination(&self) -> &PaginationCoordinator {
        &self.inner.pagination
    }

    pub fn gate(&self) -> &ConfirmationGate {
        &self.inner.gate
    }

    pub fn subscribe(&self) -> watch::Receiver<ScreenState<S::Item>> {
        self.inner.state.subscribe()
    }

    /// Current snapshot of the screen.
    pub fn snapshot(&self) -> ScreenState<S::Item> {
        self.inner.state.borrow().clone()
    }

    pub fn items(&self) -> Arc<Vec<S::Item>> {
        Arc::clone(&self.inner.state.borrow().items)
    }

    pub fn status(&self) -> LoadStatus {
        self.inner.state.borrow().status.clone()
    }

    pub fn selected(&self) -> Vec<ItemId> {
        self.inner.state.borrow().selection.selected()
    }

    fn item_type(&self) -> &str {
        &self.inner.config.item_type
    }

    // ── Loading ──────────────────────────────────────────────────────

    /// Load the current page window and committed search term.
    pub async fn load(&self) -> LoadOutcome {
        self.load_query(self.inner.pagination.query()).await
    }

    /// Load a specific query.
    ///
    /// Loads are not serialized, but every call takes a fresh sequence
    /// number and only the most recently issued one may apply its
    /// response. On failure the previously loaded items stay visible.
    pub async fn load_query(&self, query: ListQuery) -> LoadOutcome {
        let seq = self.inner.load_seq.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(seq, page = query.page, page_size = query.page_size, search = %query.search, "loading");
        self.inner
            .state
            .send_modify(|s| s.status = LoadStatus::Loading);

        let result = (self.inner.list_fn)(self.inner.service.as_ref(), query).await;

        if self.inner.load_seq.load(Ordering::SeqCst) != seq {
            debug!(seq, "discarding stale load response");
            return LoadOutcome::Stale;
        }

        match result {
            Ok(page) => {
                let items = Arc::new(page.items);
                let hierarchical = self.inner.hierarchical;
                self.inner.state.send_modify(|s| {
                    s.tree.rebuild(&items);
                    if hierarchical {
                        s.selection.retain_existing(&s.tree);
                    }
                    s.items = items;
                    s.status = LoadStatus::Ready;
                });
                self.inner.pagination.apply_items_count(page.items_count);
                LoadOutcome::Applied
            }
            Err(err) => {
                let err = CoreError::from(err);
                warn!(seq, error = %err, "load failed");
                let message = err.to_string();
                self.inner
                    .state
                    .send_modify(|s| s.status = LoadStatus::Failed(message.clone()));
                self.inner
                    .notifier
                    .notify(NotificationKind::Error, "Failed to load data", &message);
                LoadOutcome::Failed
            }
        }
    }

    /// Wait until every reload triggered by paging or search has finished.
    ///
    /// Does not wait for a search that is still inside its debounce window.
    pub async fn settled(&self) {
        let mut idle = self.inner.in_flight.subscribe();
        // Sender is owned by `inner`; never closed while `self` is alive.
        let _ = idle.wait_for(|n| *n == 0).await;
    }

    // ── Paging & search ──────────────────────────────────────────────

    pub fn change_page(&self, page: u32) -> Result<(), CoreError> {
        self.inner.pagination.change_page(page)
    }

    pub fn change_page_size(&self, page_size: u32) -> Result<(), CoreError> {
        self.inner.pagination.change_page_size(page_size)
    }

    pub fn handle_search_change(&self, text: impl Into<String>) {
        self.inner.pagination.handle_search_change(text);
    }

    /// Commit a search term immediately, skipping the debounce window.
    pub fn commit_search_now(&self, text: impl Into<String>) {
        self.inner.pagination.commit_search_now(text);
    }

    // ── Create / update ──────────────────────────────────────────────

    /// Create a record, reload, close the modal and report success.
    ///
    /// Failures are reported *and* returned, so an open form can keep its
    /// values and show the error inline.
    pub async fn create(&self, data: S::Create) -> Result<S::Item, CoreError> {
        match self.inner.service.create(data).await {
            Ok(item) => {
                info!(id = %item.id(), "record created");
                self.load().await;
                self.close_modal();
                self.inner.notifier.notify(
                    NotificationKind::Success,
                    &format!("{} created", capitalize(self.item_type())),
                    &format!("\"{}\" was created.", item.display_name()),
                );
                Ok(item)
            }
            Err(err) => Err(self.report_mutation_error("Create failed", err)),
        }
    }

    /// Update a record; same reporting rules as [`create`](Self::create).
    pub async fn update(&self, id: &ItemId, data: S::Update) -> Result<S::Item, CoreError> {
        match self.inner.service.update(id, data).await {
            Ok(item) => {
                info!(id = %id, "record updated");
                self.load().await;
                self.close_modal();
                self.inner.notifier.notify(
                    NotificationKind::Success,
                    &format!("{} updated", capitalize(self.item_type())),
                    &format!("\"{}\" was updated.", item.display_name()),
                );
                Ok(item)
            }
            Err(err) => Err(self.report_mutation_error("Update failed", err)),
        }
    }

    fn report_mutation_error(&self, title: &str, err: ServiceError) -> CoreError {
        let err = CoreError::from(err);
        warn!(error = %err, "{title}");
        self.inner
            .notifier
            .notify(NotificationKind::Error, title, &err.to_string());
        err
    }

    // ── Delete ───────────────────────────────────────────────────────

    /// Ask for confirmation to delete `item`.
    ///
    /// On confirmation the record is deleted, the screen reloads and a
    /// success notification is emitted. Failures are reported by the gate
    /// and never returned.
    pub fn delete(&self, item: &S::Item) -> Result<(), CoreError> {
        self.delete_with_confirm(item, &ConfirmText::default())
    }

    /// [`delete`](Self::delete) with the prompt wording overridden by
    /// `confirm` where set.
    pub fn delete_with_confirm(
        &self,
        item: &S::Item,
        confirm: &ConfirmText,
    ) -> Result<(), CoreError> {
        let screen = self.clone();
        let id = item.id().clone();
        let options = confirm.apply(ConfirmOptions::new(self.item_type(), item.display_name()));

        self.inner.gate.confirm_delete(
            move || {
                async move {
                    screen.inner.service.delete(&id).await?;
                    debug!(id = %id, "record deleted");
                    screen
                        .inner
                        .state
                        .send_modify(|s| s.selection.remove(std::slice::from_ref(&id)));
                    screen.load().await;
                    Ok(())
                }
                .boxed()
            },
            options,
        )
    }

    /// Ask for confirmation to delete every id in `ids`.
    ///
    /// Deletes run concurrently. The per-id outcome is published as
    /// `ScreenState::last_batch`; any failure is reported as one aggregate
    /// error. The screen reloads either way.
    pub fn delete_selected(&self, ids: Vec<ItemId>) -> Result<(), CoreError> {
        self.delete_selected_with_confirm(ids, &ConfirmText::default())
    }

    /// [`delete_selected`](Self::delete_selected) with the prompt wording
    /// overridden by `confirm` where set.
    pub fn delete_selected_with_confirm(
        &self,
        ids: Vec<ItemId>,
        confirm: &ConfirmText,
    ) -> Result<(), CoreError> {
        let count = ids.len();
        if count == 0 {
            return Err(CoreError::SelectionOutOfRange {
                action: "delete-selected".into(),
                count,
                min: 1,
                max: usize::MAX,
            });
        }

        let item_type = self.item_type().to_owned();
        let options = confirm.apply(
            ConfirmOptions::new(item_type.clone(), format!("{count} selected"))
                .title(format!("Delete {count} selected?"))
                .description(format!(
                    "Are you sure you want to delete {count} selected {item_type} records? \
                     This action cannot be undone."
                ))
                .success_message(format!("Deleted {count} {item_type} records.")),
        );

        let screen = self.clone();
        self.inner.gate.confirm_delete(
            move || async move { screen.run_batch_delete(ids).await }.boxed(),
            options,
        )
    }

    async fn run_batch_delete(&self, ids: Vec<ItemId>) -> Result<(), CoreError> {
        let service = &self.inner.service;
        let results = join_all(ids.iter().map(|id| async move {
            let result = service.delete(id).await.map_err(|e| e.to_string());
            (id.clone(), result)
        }))
        .await;

        let report = BatchDeleteReport { results };
        let failed = report.failed_count();
        let total = report.total();
        let deleted: Vec<ItemId> = report.succeeded().cloned().collect();
        for (id, reason) in report.failed() {
            warn!(id = %id, reason, "batch delete entry failed");
        }

        self.inner.state.send_modify(|s| {
            s.selection.remove(&deleted);
            s.last_batch = Some(report);
        });
        self.load().await;

        if failed == 0 {
            Ok(())
        } else {
            Err(CoreError::BatchDelete { failed, total })
        }
    }

    /// Confirm whatever the gate is holding.
    pub async fn confirm(&self) -> ExecuteOutcome {
        self.inner.gate.execute_delete().await
    }

    /// Dismiss the pending confirmation.
    pub fn cancel(&self) -> bool {
        self.inner.gate.cancel_delete()
    }

    // ── Modals ───────────────────────────────────────────────────────

    pub fn open_create(&self) {
        self.inner.state.send_modify(|s| s.modal = ModalState::Create);
    }

    pub fn open_edit(&self, id: ItemId) {
        self.inner.state.send_modify(|s| s.modal = ModalState::Edit(id));
    }

    pub fn close_modal(&self) {
        self.inner.state.send_modify(|s| s.modal = ModalState::Closed);
    }

    // ── Tree & selection ─────────────────────────────────────────────

    pub fn toggle_expanded(&self, id: &ItemId) -> bool {
        let mut known = false;
        self.inner.state.send_modify(|s| known = s.tree.toggle(id));
        known
    }

    pub fn expand_all(&self) {
        self.inner.state.send_modify(|s| s.tree.expand_all());
    }

    pub fn collapse_all(&self) {
        self.inner.state.send_modify(|s| s.tree.collapse_all());
    }

    /// Apply a caller-computed selection, propagating to ancestors when
    /// configured.
    pub fn toggle_selection(&self, ids: impl IntoIterator<Item = ItemId>) {
        self.inner
            .state
            .send_modify(|s| s.selection.toggle_selection(ids, Some(&s.tree)));
    }

    pub fn toggle_selected(&self, id: &ItemId) {
        self.inner
            .state
            .send_modify(|s| s.selection.toggle(id, Some(&s.tree)));
    }

    pub fn set_selection(&self, ids: impl IntoIterator<Item = ItemId>) {
        self.inner
            .state
            .send_modify(|s| s.selection.set_selection(ids));
    }

    pub fn select_all(&self) {
        self.inner
            .state
            .send_modify(|s| s.selection.select_all(&s.tree));
    }

    pub fn clear_selection(&self) {
        self.inner.state.send_modify(|s| s.selection.clear());
    }

    // ── Actions ──────────────────────────────────────────────────────

    /// Action dispatcher wired to this screen's gate, delete pipeline and
    /// reload.
    pub fn dispatcher(&self) -> ActionDispatcher<S::Item> {
        let screen = self.clone();
        let refresh: RefreshFn = Arc::new(move || {
            let screen = screen.clone();
            async move {
                screen.load().await;
            }
            .boxed()
        });
        ActionDispatcher::new(
            self.inner.gate.clone(),
            Arc::new(self.clone()),
            refresh,
            self.item_type(),
        )
    }
}

impl<S: TreeService> Orchestrator<S> {
    /// Orchestrator for a hierarchical screen. Records are fetched with
    /// `list_with_children`, and the selection is pruned of ids that
    /// disappear between loads.
    pub fn new_tree(service: S, notifier: Arc<dyn Notifier>, config: EngineConfig) -> Self {
        Self::build(service, notifier, config, list_tree::<S>, true)
    }
}

impl<S: DataService> DeleteRoute<S::Item> for Orchestrator<S> {
    fn delete_item(&self, item: S::Item, confirm: ConfirmText) -> Result<(), CoreError> {
        self.delete_with_confirm(&item, &confirm)
    }

    fn delete_ids(&self, ids: Vec<ItemId>, confirm: ConfirmText) -> Result<(), CoreError> {
        self.delete_selected_with_confirm(ids, &confirm)
    }
}

impl<S: DataService> std::fmt::Debug for Orchestrator<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("item_type", &self.inner.config.item_type)
            .field("hierarchical", &self.inner.hierarchical)
            .field("pagination", &self.inner.pagination)
            .field("gate", &self.inner.gate)
            .finish_non_exhaustive()
    }
}
