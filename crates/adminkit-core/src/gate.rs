// ── Confirmation gate ──
//
// Turns an arbitrary async action into a confirm -> execute -> report
// cycle:
//
//   Idle ──confirm_delete──▶ Confirming ──execute_delete──▶ Executing ──▶ Idle
//                              │
//                              └──cancel_delete──▶ Idle
//
// The gate owns the outcome of the action: failures are reported through
// the notifier and the `on_error` callback and never escape to the caller.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::future::BoxFuture;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::notify::{NotificationKind, Notifier};

/// Deferred action guarded by the gate.
pub type GateAction = Box<dyn FnOnce() -> BoxFuture<'static, Result<(), CoreError>> + Send>;

type SuccessCallback = Box<dyn FnOnce() + Send>;
type ErrorCallback = Box<dyn FnOnce(&CoreError) + Send>;

/// What the confirmation dialog should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmPrompt {
    pub title: String,
    pub description: String,
    pub item_name: String,
    pub item_type: String,
}

/// Observable gate state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GateState {
    #[default]
    Idle,
    Confirming(ConfirmPrompt),
    Executing(ConfirmPrompt),
}

impl GateState {
    pub fn prompt(&self) -> Option<&ConfirmPrompt> {
        match self {
            Self::Idle => None,
            Self::Confirming(prompt) | Self::Executing(prompt) => Some(prompt),
        }
    }
}

/// Result of [`ConfirmationGate::execute_delete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecuteOutcome {
    Succeeded,
    Failed,
    /// Nothing was awaiting confirmation (already executing, cancelled, or
    /// never requested).
    Ignored,
}

/// Wording and callbacks attached to a guarded action.
pub struct ConfirmOptions {
    pub item_name: String,
    pub item_type: String,
    /// Verb shown in notifications for non-delete actions ("Publish").
    pub operation: Option<String>,
    pub confirm_title: Option<String>,
    pub confirm_description: Option<String>,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
    on_success: Option<SuccessCallback>,
    on_error: Option<ErrorCallback>,
}

impl ConfirmOptions {
    pub fn new(item_type: impl Into<String>, item_name: impl Into<String>) -> Self {
        Self {
            item_name: item_name.into(),
            item_type: item_type.into(),
            operation: None,
            confirm_title: None,
            confirm_description: None,
            success_message: None,
            error_message: None,
            on_success: None,
            on_error: None,
        }
    }

    pub fn operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.confirm_title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.confirm_description = Some(description.into());
        self
    }

    pub fn success_message(mut self, message: impl Into<String>) -> Self {
        self.success_message = Some(message.into());
        self
    }

    pub fn error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn on_success(mut self, callback: impl FnOnce() + Send + 'static) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    pub fn on_error(mut self, callback: impl FnOnce(&CoreError) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(callback));
        self
    }

    fn prompt(&self) -> ConfirmPrompt {
        ConfirmPrompt {
            title: self.confirm_title.clone().unwrap_or_else(|| match &self.operation {
                Some(op) => format!("{op}?"),
                None => format!("Delete {}?", self.item_type),
            }),
            description: self.confirm_description.clone().unwrap_or_else(|| {
                match &self.operation {
                    Some(op) => format!("{op} \"{}\"?", self.item_name),
                    None => format!(
                        "Are you sure you want to delete \"{}\"? This action cannot be undone.",
                        self.item_name
                    ),
                }
            }),
            item_name: self.item_name.clone(),
            item_type: self.item_type.clone(),
        }
    }
}

impl std::fmt::Debug for ConfirmOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfirmOptions")
            .field("item_name", &self.item_name)
            .field("item_type", &self.item_type)
            .field("confirm_title", &self.confirm_title)
            .field("confirm_description", &self.confirm_description)
            .finish_non_exhaustive()
    }
}

struct Pending {
    action: GateAction,
    options: ConfirmOptions,
}

/// Confirm/execute state machine for destructive actions.
///
/// Cheaply cloneable; clones drive the same state machine.
#[derive(Clone)]
pub struct ConfirmationGate {
    inner: Arc<GateInner>,
}

struct GateInner {
    state: watch::Sender<GateState>,
    /// `Some` exactly while the gate is `Confirming`.
    pending: Mutex<Option<Pending>>,
    notifier: Arc<dyn Notifier>,
}

impl ConfirmationGate {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        let (state, _) = watch::channel(GateState::Idle);
        Self {
            inner: Arc::new(GateInner {
                state,
                pending: Mutex::new(None),
                notifier,
            }),
        }
    }

    // ── Observables ──────────────────────────────────────────────────

    pub fn state(&self) -> GateState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<GateState> {
        self.inner.state.subscribe()
    }

    pub fn is_confirming(&self) -> bool {
        matches!(*self.inner.state.borrow(), GateState::Confirming(_))
    }

    pub fn is_executing(&self) -> bool {
        matches!(*self.inner.state.borrow(), GateState::Executing(_))
    }

    pub fn prompt(&self) -> Option<ConfirmPrompt> {
        self.inner.state.borrow().prompt().cloned()
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// Park `action` until the user confirms.
    ///
    /// A request arriving while another is still awaiting confirmation
    /// replaces it. While an action is executing the request is refused.
    pub fn confirm_delete<F>(&self, action: F, options: ConfirmOptions) -> Result<(), CoreError>
    where
        F: FnOnce() -> BoxFuture<'static, Result<(), CoreError>> + Send + 'static,
    {
        let mut pending = self.inner.lock();
        if matches!(*self.inner.state.borrow(), GateState::Executing(_)) {
            return Err(CoreError::GateBusy);
        }
        if pending.is_some() {
            debug!("replacing unconfirmed action");
        }

        let prompt = options.prompt();
        debug!(item = %prompt.item_name, item_type = %prompt.item_type, "awaiting confirmation");
        *pending = Some(Pending {
            action: Box::new(action),
            options,
        });
        self.inner.state.send_replace(GateState::Confirming(prompt));
        Ok(())
    }

    /// Abandon the parked action without running it. Returns `false` if
    /// nothing was awaiting confirmation.
    pub fn cancel_delete(&self) -> bool {
        let mut pending = self.inner.lock();
        if pending.take().is_none() {
            return false;
        }
        debug!("confirmation cancelled");
        self.inner.state.send_replace(GateState::Idle);
        true
    }

    /// Run the parked action and report its outcome.
    ///
    /// Only the first call per confirmation cycle runs anything; calls
    /// made while executing (or with nothing parked) are ignored.
    pub async fn execute_delete(&self) -> ExecuteOutcome {
        let Some(Pending { action, options }) = self.begin_execution() else {
            debug!("execute ignored: nothing awaiting confirmation");
            return ExecuteOutcome::Ignored;
        };

        let _idle = ExecutionGuard(&self.inner);
        let result = action().await;
        self.report(result, options)
    }

    fn begin_execution(&self) -> Option<Pending> {
        let mut pending = self.inner.lock();
        let parked = pending.take()?;
        self.inner
            .state
            .send_replace(GateState::Executing(parked.options.prompt()));
        Some(parked)
    }

    fn report(&self, result: Result<(), CoreError>, options: ConfirmOptions) -> ExecuteOutcome {
        let ConfirmOptions {
            item_name,
            item_type,
            operation,
            success_message,
            error_message,
            on_success,
            on_error,
            ..
        } = options;

        match result {
            Ok(()) => {
                let (title, default_description) = match &operation {
                    Some(op) => (
                        format!("{op} completed"),
                        format!("{op} completed for \"{item_name}\"."),
                    ),
                    None => (
                        format!("{} deleted", capitalize(&item_type)),
                        format!("{} \"{item_name}\" was deleted.", capitalize(&item_type)),
                    ),
                };
                let description = success_message.unwrap_or(default_description);
                self.inner
                    .notifier
                    .notify(NotificationKind::Success, &title, &description);
                if let Some(callback) = on_success {
                    callback();
                }
                ExecuteOutcome::Succeeded
            }
            Err(err) => {
                warn!(item = %item_name, error = %err, "guarded action failed");
                let (title, default_description) = match &operation {
                    Some(op) => (
                        format!("{op} failed"),
                        format!("{op} failed for \"{item_name}\": {err}"),
                    ),
                    None => (
                        "Delete failed".to_owned(),
                        format!("Failed to delete {item_type} \"{item_name}\": {err}"),
                    ),
                };
                let description = error_message.unwrap_or(default_description);
                self.inner
                    .notifier
                    .notify(NotificationKind::Error, &title, &description);
                if let Some(callback) = on_error {
                    callback(&err);
                }
                ExecuteOutcome::Failed
            }
        }
    }
}

/// Returns the gate to `Idle` when execution ends, including when the
/// `execute_delete` future is dropped mid-action.
struct ExecutionGuard<'a>(&'a GateInner);

impl Drop for ExecutionGuard<'_> {
    fn drop(&mut self) {
        let _pending = self.0.lock();
        self.0.state.send_replace(GateState::Idle);
    }
}

impl GateInner {
    fn lock(&self) -> MutexGuard<'_, Option<Pending>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ConfirmationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfirmationGate")
            .field("state", &*self.inner.state.borrow())
            .finish_non_exhaustive()
    }
}

pub(crate) fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
