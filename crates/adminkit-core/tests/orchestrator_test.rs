#![allow(clippy::unwrap_used)]
// Integration tests for `Orchestrator` against an in-memory data service.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use adminkit_core::{
    ActionDescriptor, ActionTarget, BulkAction, ChannelNotifier, CoreError, DataService,
    DispatchOutcome, EngineConfig, ExecuteOutcome, GateState, ItemId, ListPage, ListQuery,
    LoadOutcome, LoadStatus, ModalState, Notification, NotificationKind, Orchestrator, Record,
    RowAction, ServiceError, TreeService,
};
use pretty_assertions::assert_eq;
use tokio::sync::mpsc;

// ── Fixtures ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
struct Row {
    id: ItemId,
    name: String,
    children: Vec<Row>,
}

impl Record for Row {
    fn id(&self) -> &ItemId {
        &self.id
    }

    fn children(&self) -> &[Self] {
        &self.children
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }
}

fn row(id: &str, name: &str) -> Row {
    Row {
        id: id.into(),
        name: name.into(),
        children: Vec::new(),
    }
}

fn branch(id: &str, children: Vec<Row>) -> Row {
    Row {
        id: id.into(),
        name: id.to_lowercase(),
        children,
    }
}

#[derive(Default)]
struct MemoryService {
    rows: Mutex<Vec<Row>>,
    fail_deletes: Mutex<HashSet<ItemId>>,
    fail_list: AtomicBool,
    /// Per-call artificial latency for `list`, consumed front to back.
    list_delays: Mutex<VecDeque<Duration>>,
    queries: Mutex<Option<mpsc::UnboundedSender<ListQuery>>>,
}

impl MemoryService {
    fn with_rows(rows: Vec<Row>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Self::default()
        }
    }

    fn numbered(count: usize) -> Self {
        Self::with_rows(
            (1..=count)
                .map(|n| row(&n.to_string(), &format!("user{n}")))
                .collect(),
        )
    }

    fn watch_queries(&self) -> mpsc::UnboundedReceiver<ListQuery> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.queries.lock().unwrap() = Some(tx);
        rx
    }
}

impl DataService for MemoryService {
    type Item = Row;
    type Create = String;
    type Update = String;

    async fn list(&self, query: ListQuery) -> Result<ListPage<Row>, ServiceError> {
        if let Some(tx) = self.queries.lock().unwrap().as_ref() {
            let _ = tx.send(query.clone());
        }
        let delay = self.list_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(ServiceError::Unavailable {
                reason: "backend down".into(),
            });
        }

        let matching: Vec<Row> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.name.contains(&query.search))
            .cloned()
            .collect();
        let items_count = matching.len() as u64;
        let size = query.page_size as usize;
        let items = matching.into_iter().skip(query.offset()).take(size).collect();
        Ok(ListPage { items, items_count })
    }

    async fn create(&self, name: String) -> Result<Row, ServiceError> {
        if name.is_empty() {
            return Err(ServiceError::Validation {
                field: "name".into(),
                message: "must not be empty".into(),
            });
        }
        let mut rows = self.rows.lock().unwrap();
        let created = row(&(rows.len() + 100).to_string(), &name);
        rows.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: &ItemId, name: String) -> Result<Row, ServiceError> {
        let mut rows = self.rows.lock().unwrap();
        let target = rows
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| ServiceError::NotFound { id: id.clone() })?;
        target.name = name;
        Ok(target.clone())
    }

    async fn delete(&self, id: &ItemId) -> Result<(), ServiceError> {
        tokio::task::yield_now().await;
        if self.fail_deletes.lock().unwrap().contains(id) {
            return Err(ServiceError::Rejected {
                message: format!("{id} is locked"),
            });
        }
        self.rows.lock().unwrap().retain(|r| &r.id != id);
        Ok(())
    }
}

impl TreeService for MemoryService {}

fn screen(
    service: MemoryService,
    config: EngineConfig,
) -> (
    Orchestrator<MemoryService>,
    mpsc::UnboundedReceiver<Notification>,
) {
    let (notifier, notes) = ChannelNotifier::new();
    (Orchestrator::new(service, Arc::new(notifier), config), notes)
}

fn users() -> EngineConfig {
    EngineConfig {
        item_type: "user".into(),
        ..EngineConfig::default()
    }
}

fn ids(raw: &[&str]) -> Vec<ItemId> {
    raw.iter().map(|s| ItemId::from(*s)).collect()
}

fn drain(notes: &mut mpsc::UnboundedReceiver<Notification>) -> Vec<Notification> {
    let mut out = Vec::new();
    while let Ok(note) = notes.try_recv() {
        out.push(note);
    }
    out
}

// ── Loading ─────────────────────────────────────────────────────────

#[tokio::test]
async fn load_publishes_items_and_page_count() {
    let (screen, _notes) = screen(MemoryService::numbered(25), users());

    assert_eq!(screen.load().await, LoadOutcome::Applied);

    let state = screen.snapshot();
    assert_eq!(state.status, LoadStatus::Ready);
    assert_eq!(state.items.len(), 10);
    let page = screen.pagination().page_state();
    assert_eq!(page.items_count, 25);
    assert_eq!(page.pages_count, 3);
}

#[tokio::test(start_paused = true)]
async fn stale_response_is_discarded() {
    let service = MemoryService::numbered(30);
    service
        .list_delays
        .lock()
        .unwrap()
        .extend([Duration::from_millis(500), Duration::from_millis(10)]);
    let (screen, _notes) = screen(service, users());

    let slow = ListQuery {
        page: 1,
        page_size: 10,
        search: String::new(),
    };
    let fast = ListQuery {
        page: 2,
        ..slow.clone()
    };

    let (first, second) = tokio::join!(screen.load_query(slow), screen.load_query(fast));

    assert_eq!(first, LoadOutcome::Stale);
    assert_eq!(second, LoadOutcome::Applied);
    let first_id = screen.items().first().map(|r| r.id.clone());
    assert_eq!(first_id, Some(ItemId::from("11")));
}

#[tokio::test]
async fn load_failure_keeps_previous_items() {
    let (screen, mut notes) = screen(MemoryService::numbered(3), users());
    screen.load().await;
    assert_eq!(screen.items().len(), 3);

    screen.service().fail_list.store(true, Ordering::SeqCst);
    assert_eq!(screen.load().await, LoadOutcome::Failed);

    assert_eq!(screen.items().len(), 3);
    let status = screen.status();
    assert!(status.error().unwrap().contains("backend down"));
    assert!(!status.is_loading());

    let note = drain(&mut notes).pop().unwrap();
    assert_eq!(note.kind, NotificationKind::Error);
    assert_eq!(note.title, "Failed to load data");
}

#[tokio::test(start_paused = true)]
async fn debounced_search_reloads_first_page() {
    let service = MemoryService::numbered(25);
    let mut queries = service.watch_queries();
    let (screen, _notes) = screen(service, users());
    let mut state = screen.subscribe();

    screen.load().await;
    queries.recv().await.unwrap();
    screen.change_page(2).unwrap();
    let paged = queries.recv().await.unwrap();
    assert_eq!(paged.page, 2);

    screen.handle_search_change("user1");
    screen.handle_search_change("user2");
    assert_eq!(screen.pagination().search_state().display_value, "user2");

    let searched = tokio::time::timeout(Duration::from_secs(1), queries.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(searched.search, "user2");
    assert_eq!(searched.page, 1);

    state
        .wait_for(|s| s.status == LoadStatus::Ready && s.items.len() == 7)
        .await
        .unwrap();
    assert!(queries.try_recv().is_err());
}

#[tokio::test]
async fn settled_waits_for_triggered_reloads() {
    let (screen, _notes) = screen(MemoryService::numbered(25), users());
    screen.load().await;

    screen.change_page(3).unwrap();
    screen.settled().await;

    let state = screen.snapshot();
    assert_eq!(state.status, LoadStatus::Ready);
    let first: Vec<_> = state.items.iter().map(|r| r.id.clone()).collect();
    assert_eq!(first, ids(&["21", "22", "23", "24", "25"]));

    screen.change_page_size(25).unwrap();
    screen.settled().await;
    assert_eq!(screen.items().len(), 25);
    assert_eq!(screen.pagination().page_state().page, 1);
}

#[tokio::test]
async fn out_of_range_page_is_rejected_without_reload() {
    let service = MemoryService::numbered(5);
    let mut queries = service.watch_queries();
    let (screen, _notes) = screen(service, users());
    screen.load().await;
    queries.recv().await.unwrap();

    let err = screen.change_page(2).unwrap_err();
    assert!(matches!(err, CoreError::InvalidPage { page: 2, last_page: 1 }));
    screen.settled().await;
    assert!(queries.try_recv().is_err());
}

// ── Create / update ─────────────────────────────────────────────────

#[tokio::test]
async fn create_reloads_and_closes_modal() {
    let (screen, mut notes) = screen(MemoryService::numbered(2), users());
    screen.open_create();

    let created = screen.create("zoe".into()).await.unwrap();

    assert_eq!(created.name, "zoe");
    let state = screen.snapshot();
    assert_eq!(state.modal, ModalState::Closed);
    assert_eq!(state.items.len(), 3);

    let note = drain(&mut notes).pop().unwrap();
    assert_eq!(note.kind, NotificationKind::Success);
    assert_eq!(note.title, "User created");
}

#[tokio::test]
async fn create_failure_is_returned_and_modal_stays_open() {
    let (screen, mut notes) = screen(MemoryService::numbered(2), users());
    screen.open_create();

    let err = screen.create(String::new()).await.unwrap_err();

    assert!(matches!(err, CoreError::ValidationFailed { .. }));
    assert_eq!(screen.snapshot().modal, ModalState::Create);
    let note = drain(&mut notes).pop().unwrap();
    assert_eq!(note.title, "Create failed");
    assert_eq!(note.description, "Validation failed: name: must not be empty");
}

#[tokio::test]
async fn update_of_missing_record_is_not_found() {
    let (screen, _notes) = screen(MemoryService::numbered(1), users());
    screen.open_edit("9".into());

    let err = screen.update(&"9".into(), "x".into()).await.unwrap_err();

    assert!(matches!(err, CoreError::NotFound { .. }));
    assert_eq!(screen.snapshot().modal, ModalState::Edit("9".into()));
}

// ── Delete ──────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_waits_for_confirmation() {
    let (screen, mut notes) = screen(MemoryService::numbered(3), users());
    screen.load().await;
    let target = screen.items()[1].clone();
    screen.set_selection(ids(&["2", "3"]));

    screen.delete(&target).unwrap();
    assert!(matches!(screen.gate().state(), GateState::Confirming(_)));
    assert_eq!(screen.service().rows.lock().unwrap().len(), 3);

    assert_eq!(screen.confirm().await, ExecuteOutcome::Succeeded);

    assert_eq!(screen.items().len(), 2);
    assert_eq!(screen.selected(), ids(&["3"]));
    let note = drain(&mut notes).pop().unwrap();
    assert_eq!(note.title, "User deleted");
    assert_eq!(note.description, "User \"user2\" was deleted.");
}

#[tokio::test]
async fn cancelled_delete_touches_nothing() {
    let (screen, mut notes) = screen(MemoryService::numbered(3), users());
    screen.load().await;
    let target = screen.items()[0].clone();

    screen.delete(&target).unwrap();
    assert!(screen.cancel());

    assert_eq!(screen.gate().state(), GateState::Idle);
    assert_eq!(screen.confirm().await, ExecuteOutcome::Ignored);
    assert_eq!(screen.service().rows.lock().unwrap().len(), 3);
    assert!(drain(&mut notes).is_empty());
}

#[tokio::test]
async fn batch_delete_reports_partial_failure() {
    let service = MemoryService::numbered(3);
    service.fail_deletes.lock().unwrap().insert("2".into());
    let (screen, mut notes) = screen(service, users());
    screen.load().await;
    screen.set_selection(ids(&["1", "2", "3"]));

    screen.delete_selected(screen.selected()).unwrap();
    assert_eq!(screen.gate().prompt().unwrap().title, "Delete 3 selected?");
    assert_eq!(screen.confirm().await, ExecuteOutcome::Failed);

    let state = screen.snapshot();
    let report = state.last_batch.as_ref().unwrap();
    assert_eq!(report.total(), 3);
    assert_eq!(report.failed_count(), 1);
    let failed: Vec<_> = report.failed().map(|(id, _)| id.clone()).collect();
    assert_eq!(failed, ids(&["2"]));

    assert_eq!(state.selection.selected(), ids(&["2"]));
    assert_eq!(state.items.len(), 1);

    let note = drain(&mut notes).pop().unwrap();
    assert_eq!(note.kind, NotificationKind::Error);
    assert!(note.description.contains("Failed to delete 1 of 3 items"));
}

#[tokio::test]
async fn batch_delete_of_nothing_is_rejected() {
    let (screen, _notes) = screen(MemoryService::numbered(1), users());
    let err = screen.delete_selected(Vec::new()).unwrap_err();
    assert!(matches!(err, CoreError::SelectionOutOfRange { count: 0, .. }));
    assert_eq!(screen.gate().state(), GateState::Idle);
}

#[tokio::test]
async fn dispatcher_routes_bulk_delete_to_screen() {
    let (screen, _notes) = screen(MemoryService::numbered(4), users());
    screen.load().await;
    let dispatcher = screen.dispatcher();

    let outcome = dispatcher
        .dispatch(
            &ActionDescriptor::Bulk(BulkAction::delete("Delete selected")),
            ActionTarget::Selection(ids(&["1", "4"])),
        )
        .await
        .unwrap();
    assert_eq!(outcome, DispatchOutcome::AwaitingConfirmation);

    assert_eq!(screen.confirm().await, ExecuteOutcome::Succeeded);
    let remaining: Vec<_> = screen.items().iter().map(|r| r.id.clone()).collect();
    assert_eq!(remaining, ids(&["2", "3"]));
}

#[tokio::test]
async fn dispatcher_delete_uses_action_confirm_text() {
    let (screen, mut notes) = screen(MemoryService::numbered(2), users());
    screen.load().await;
    let target = screen.items()[0].clone();
    let action = RowAction::delete("Remove")
        .with_confirm(Some("Remove {name} for good?".into()), None);

    screen
        .dispatcher()
        .dispatch(&ActionDescriptor::Row(action), ActionTarget::Row(target))
        .await
        .unwrap();

    let prompt = screen.gate().prompt().unwrap();
    assert_eq!(prompt.title, "Remove user1 for good?");
    assert!(prompt.description.contains("\"user1\""));

    assert_eq!(screen.confirm().await, ExecuteOutcome::Succeeded);
    assert_eq!(screen.items().len(), 1);
    assert_eq!(drain(&mut notes).pop().unwrap().title, "User deleted");
}

// ── Trees ───────────────────────────────────────────────────────────

fn org_chart() -> Vec<Row> {
    vec![
        branch("A", vec![branch("B", vec![row("C", "c")]), row("D", "d")]),
        row("E", "e"),
    ]
}

#[tokio::test]
async fn tree_selection_pulls_in_ancestors() {
    let (notifier, _notes) = ChannelNotifier::new();
    let config = EngineConfig {
        propagate_to_ancestors: true,
        ..users()
    };
    let screen = Orchestrator::new_tree(
        MemoryService::with_rows(org_chart()),
        Arc::new(notifier),
        config,
    );
    screen.load().await;

    screen.toggle_selected(&"C".into());
    assert_eq!(screen.selected(), ids(&["C", "A", "B"]));

    screen.toggle_selected(&"C".into());
    assert_eq!(screen.selected(), ids(&["A", "B"]));
}

#[tokio::test]
async fn tree_reload_prunes_vanished_selection() {
    let (notifier, _notes) = ChannelNotifier::new();
    let screen = Orchestrator::new_tree(
        MemoryService::with_rows(org_chart()),
        Arc::new(notifier),
        users(),
    );
    screen.load().await;
    screen.set_selection(ids(&["C", "E"]));

    screen.service().rows.lock().unwrap().retain(|r| r.id.as_str() != "E");
    screen.load().await;

    assert_eq!(screen.selected(), ids(&["C"]));
}

#[tokio::test]
async fn tree_expand_state_survives_reload() {
    let (notifier, _notes) = ChannelNotifier::new();
    let screen = Orchestrator::new_tree(
        MemoryService::with_rows(org_chart()),
        Arc::new(notifier),
        users(),
    );
    screen.load().await;

    assert!(screen.toggle_expanded(&"A".into()));
    screen.load().await;

    let rows: Vec<_> = screen
        .snapshot()
        .visible_rows()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(rows, ids(&["A", "E"]));
}
