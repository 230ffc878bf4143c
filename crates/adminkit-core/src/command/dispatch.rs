// ── Action dispatch ──
//
// Resolves row, bulk and global actions into one uniform
// "maybe confirm, then execute, then refresh" call.
//
// Every action is treated as mutating: after it runs (successfully or
// not) the screen is refreshed. `ActionKind::Delete` actions bypass the
// generic path and go to the screen's own delete pipeline, which carries
// the item-type wording and batch handling.

use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tracing::{debug, warn};

use super::{ActionDescriptor, ActionKind, BulkAction, ConfirmText, GlobalAction, RowAction};
use crate::error::CoreError;
use crate::gate::{ConfirmOptions, ConfirmationGate};
use crate::model::{ItemId, Record};

/// Full reload of the screen the actions belong to.
pub type RefreshFn = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// The screen's own delete pipeline. Both calls only *request* deletion;
/// execution waits for confirmation. `confirm` is already rendered and
/// overrides the pipeline's default prompt wording where set.
pub trait DeleteRoute<T>: Send + Sync {
    fn delete_item(&self, item: T, confirm: ConfirmText) -> Result<(), CoreError>;
    fn delete_ids(&self, ids: Vec<ItemId>, confirm: ConfirmText) -> Result<(), CoreError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The action is parked in the confirmation gate.
    AwaitingConfirmation,
    /// The action ran and the screen was refreshed.
    Executed,
}

/// What an action is applied to.
#[derive(Debug, Clone)]
pub enum ActionTarget<T> {
    Row(T),
    Selection(Vec<ItemId>),
    Nothing,
}

/// Substitute `{name}` and `{count}` placeholders.
pub fn render_template(template: &str, name: Option<&str>, count: Option<usize>) -> String {
    let mut out = template.to_owned();
    if let Some(name) = name {
        out = out.replace("{name}", name);
    }
    if let Some(count) = count {
        out = out.replace("{count}", &count.to_string());
    }
    out
}

pub struct ActionDispatcher<T> {
    gate: ConfirmationGate,
    route: Arc<dyn DeleteRoute<T>>,
    refresh: RefreshFn,
    item_type: String,
}

impl<T> Clone for ActionDispatcher<T> {
    fn clone(&self) -> Self {
        Self {
            gate: self.gate.clone(),
            route: Arc::clone(&self.route),
            refresh: Arc::clone(&self.refresh),
            item_type: self.item_type.clone(),
        }
    }
}

impl<T: Record> ActionDispatcher<T> {
    pub fn new(
        gate: ConfirmationGate,
        route: Arc<dyn DeleteRoute<T>>,
        refresh: RefreshFn,
        item_type: impl Into<String>,
    ) -> Self {
        Self {
            gate,
            route,
            refresh,
            item_type: item_type.into(),
        }
    }

    pub fn gate(&self) -> &ConfirmationGate {
        &self.gate
    }

    /// Dispatch any descriptor against a matching target.
    pub async fn dispatch(
        &self,
        action: &ActionDescriptor<T>,
        target: ActionTarget<T>,
    ) -> Result<DispatchOutcome, CoreError> {
        match (action, target) {
            (ActionDescriptor::Row(a), ActionTarget::Row(item)) => self.dispatch_row(a, item).await,
            (ActionDescriptor::Bulk(a), ActionTarget::Selection(ids)) => {
                self.dispatch_bulk(a, ids).await
            }
            (ActionDescriptor::Global(a), _) => self.dispatch_global(a).await,
            (other, _) => Err(CoreError::Internal(format!(
                "action '{}' dispatched against the wrong target",
                other.key()
            ))),
        }
    }

    pub async fn dispatch_row(
        &self,
        action: &RowAction<T>,
        item: T,
    ) -> Result<DispatchOutcome, CoreError> {
        if action.kind == ActionKind::Delete {
            let confirm = action.confirm.render(&item.display_name(), None);
            self.route.delete_item(item, confirm)?;
            return Ok(DispatchOutcome::AwaitingConfirmation);
        }
        let handler = action.handler().cloned().ok_or_else(|| {
            CoreError::Internal(format!("row action '{}' has no handler", action.key))
        })?;
        let name = item.display_name();
        self.run(
            &action.key,
            &action.label,
            &action.confirm,
            name,
            None,
            move || handler(item),
        )
        .await
    }

    pub async fn dispatch_bulk(
        &self,
        action: &BulkAction,
        ids: Vec<ItemId>,
    ) -> Result<DispatchOutcome, CoreError> {
        action.check_count(ids.len())?;
        if action.kind == ActionKind::Delete {
            let count = ids.len();
            let confirm = action.confirm.render(&format!("{count} selected"), Some(count));
            self.route.delete_ids(ids, confirm)?;
            return Ok(DispatchOutcome::AwaitingConfirmation);
        }
        let handler = action.handler().cloned().ok_or_else(|| {
            CoreError::Internal(format!("bulk action '{}' has no handler", action.key))
        })?;
        let count = ids.len();
        self.run(
            &action.key,
            &action.label,
            &action.confirm,
            format!("{count} selected"),
            Some(count),
            move || handler(ids),
        )
        .await
    }

    pub async fn dispatch_global(&self, action: &GlobalAction) -> Result<DispatchOutcome, CoreError> {
        let handler = Arc::clone(action.handler());
        self.run(
            &action.key,
            &action.label,
            &action.confirm,
            action.label.clone(),
            None,
            move || handler(),
        )
        .await
    }

    async fn run<F>(
        &self,
        key: &str,
        label: &str,
        confirm: &ConfirmText,
        item_name: String,
        count: Option<usize>,
        job: F,
    ) -> Result<DispatchOutcome, CoreError>
    where
        F: FnOnce() -> BoxFuture<'static, Result<(), CoreError>> + Send + 'static,
    {
        if confirm.is_empty() {
            debug!(action = key, "executing action");
            let result = job().await;
            (self.refresh)().await;
            if let Err(ref err) = result {
                warn!(action = key, error = %err, "action failed");
            }
            return result.map(|()| DispatchOutcome::Executed);
        }

        let options = confirm.render(&item_name, count).apply(
            ConfirmOptions::new(self.item_type.clone(), item_name.clone()).operation(label),
        );

        let refresh = Arc::clone(&self.refresh);
        self.gate.confirm_delete(
            move || {
                async move {
                    let result = job().await;
                    refresh().await;
                    result
                }
                .boxed()
            },
            options,
        )?;
        debug!(action = key, "action awaiting confirmation");
        Ok(DispatchOutcome::AwaitingConfirmation)
    }
}
