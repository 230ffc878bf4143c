// ── Action descriptors ──
//
// Every row, bulk and toolbar action a screen offers is described by an
// `ActionDescriptor`. Descriptors are plain data plus a handler; the
// `ActionDispatcher` decides whether to confirm first, run immediately,
// or route to the screen's own delete pipeline.

pub mod dispatch;

use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::error::CoreError;
use crate::gate::ConfirmOptions;
use crate::model::ItemId;

pub use dispatch::{
    ActionDispatcher, ActionTarget, DeleteRoute, DispatchOutcome, RefreshFn, render_template,
};

pub type RowHandler<T> =
    Arc<dyn Fn(T) -> BoxFuture<'static, Result<(), CoreError>> + Send + Sync>;
pub type BulkHandler =
    Arc<dyn Fn(Vec<ItemId>) -> BoxFuture<'static, Result<(), CoreError>> + Send + Sync>;
pub type GlobalHandler = Arc<dyn Fn() -> BoxFuture<'static, Result<(), CoreError>> + Send + Sync>;

/// Explicit discriminant for the one action that needs the screen's
/// delete wording and pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Delete,
    Custom,
}

/// Optional confirmation wording. `{name}` and `{count}` placeholders are
/// substituted at dispatch time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfirmText {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl ConfirmText {
    pub fn new(title: Option<String>, description: Option<String>) -> Self {
        Self { title, description }
    }

    /// Neither a title nor a description was given.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }

    /// Copy with `{name}` and `{count}` substituted.
    pub fn render(&self, name: &str, count: Option<usize>) -> Self {
        let fill = |text: &String| render_template(text, Some(name), count);
        Self {
            title: self.title.as_ref().map(&fill),
            description: self.description.as_ref().map(&fill),
        }
    }

    /// Override the prompt wording of `options` with whatever is set here.
    pub(crate) fn apply(&self, mut options: ConfirmOptions) -> ConfirmOptions {
        if let Some(title) = &self.title {
            options = options.title(title.clone());
        }
        if let Some(description) = &self.description {
            options = options.description(description.clone());
        }
        options
    }
}

// ── Row actions ─────────────────────────────────────────────────────

/// Action on a single record.
pub struct RowAction<T> {
    pub key: String,
    pub label: String,
    pub kind: ActionKind,
    pub confirm: ConfirmText,
    handler: Option<RowHandler<T>>,
}

impl<T> RowAction<T> {
    /// The screen's delete action. Routed to the orchestrator, no handler.
    pub fn delete(label: impl Into<String>) -> Self {
        Self {
            key: "delete".into(),
            label: label.into(),
            kind: ActionKind::Delete,
            confirm: ConfirmText::default(),
            handler: None,
        }
    }

    pub fn custom<F>(key: impl Into<String>, label: impl Into<String>, handler: F) -> Self
    where
        F: Fn(T) -> BoxFuture<'static, Result<(), CoreError>> + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            label: label.into(),
            kind: ActionKind::Custom,
            confirm: ConfirmText::default(),
            handler: Some(Arc::new(handler)),
        }
    }

    pub fn with_confirm(mut self, title: Option<String>, description: Option<String>) -> Self {
        self.confirm = ConfirmText::new(title, description);
        self
    }

    pub(crate) fn handler(&self) -> Option<&RowHandler<T>> {
        self.handler.as_ref()
    }
}

impl<T> Clone for RowAction<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            label: self.label.clone(),
            kind: self.kind,
            confirm: self.confirm.clone(),
            handler: self.handler.clone(),
        }
    }
}

// ── Bulk actions ────────────────────────────────────────────────────

/// Action on the current selection, optionally limited to a count range.
#[derive(Clone)]
pub struct BulkAction {
    pub key: String,
    pub label: String,
    pub kind: ActionKind,
    pub confirm: ConfirmText,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
    handler: Option<BulkHandler>,
}

impl BulkAction {
    /// Delete every selected record through the orchestrator.
    pub fn delete(label: impl Into<String>) -> Self {
        Self {
            key: "delete-selected".into(),
            label: label.into(),
            kind: ActionKind::Delete,
            confirm: ConfirmText::default(),
            min_items: Some(1),
            max_items: None,
            handler: None,
        }
    }

    pub fn custom<F>(key: impl Into<String>, label: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Vec<ItemId>) -> BoxFuture<'static, Result<(), CoreError>> + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            label: label.into(),
            kind: ActionKind::Custom,
            confirm: ConfirmText::default(),
            min_items: None,
            max_items: None,
            handler: Some(Arc::new(handler)),
        }
    }

    pub fn with_confirm(mut self, title: Option<String>, description: Option<String>) -> Self {
        self.confirm = ConfirmText::new(title, description);
        self
    }

    pub fn with_range(mut self, min_items: Option<usize>, max_items: Option<usize>) -> Self {
        self.min_items = min_items;
        self.max_items = max_items;
        self
    }

    /// Whether the action applies to a selection of `count` records.
    pub fn is_enabled(&self, count: usize) -> bool {
        self.check_count(count).is_ok()
    }

    pub(crate) fn check_count(&self, count: usize) -> Result<(), CoreError> {
        let min = self.min_items.unwrap_or(0);
        let max = self.max_items.unwrap_or(usize::MAX);
        if (min..=max).contains(&count) {
            Ok(())
        } else {
            Err(CoreError::SelectionOutOfRange {
                action: self.key.clone(),
                count,
                min,
                max,
            })
        }
    }

    pub(crate) fn handler(&self) -> Option<&BulkHandler> {
        self.handler.as_ref()
    }
}

// ── Global actions ──────────────────────────────────────────────────

/// Toolbar action that targets no particular record. Always visible.
#[derive(Clone)]
pub struct GlobalAction {
    pub key: String,
    pub label: String,
    pub confirm: ConfirmText,
    handler: GlobalHandler,
}

impl GlobalAction {
    pub fn new<F>(key: impl Into<String>, label: impl Into<String>, handler: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, Result<(), CoreError>> + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            label: label.into(),
            confirm: ConfirmText::default(),
            handler: Arc::new(handler),
        }
    }

    pub fn with_confirm(mut self, title: Option<String>, description: Option<String>) -> Self {
        self.confirm = ConfirmText::new(title, description);
        self
    }

    pub(crate) fn handler(&self) -> &GlobalHandler {
        &self.handler
    }
}

// ── Descriptor ──────────────────────────────────────────────────────

pub enum ActionDescriptor<T> {
    Row(RowAction<T>),
    Bulk(BulkAction),
    Global(GlobalAction),
}

impl<T> ActionDescriptor<T> {
    pub fn key(&self) -> &str {
        match self {
            Self::Row(a) => &a.key,
            Self::Bulk(a) => &a.key,
            Self::Global(a) => &a.key,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Row(a) => &a.label,
            Self::Bulk(a) => &a.label,
            Self::Global(a) => &a.label,
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Row(a) => a.kind,
            Self::Bulk(a) => a.kind,
            Self::Global(_) => ActionKind::Custom,
        }
    }

    pub fn confirm(&self) -> &ConfirmText {
        match self {
            Self::Row(a) => &a.confirm,
            Self::Bulk(a) => &a.confirm,
            Self::Global(a) => &a.confirm,
        }
    }
}

impl<T> Clone for ActionDescriptor<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Row(a) => Self::Row(a.clone()),
            Self::Bulk(a) => Self::Bulk(a.clone()),
            Self::Global(a) => Self::Global(a.clone()),
        }
    }
}

impl<T> fmt::Debug for ActionDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variant = match self {
            Self::Row(_) => "Row",
            Self::Bulk(_) => "Bulk",
            Self::Global(_) => "Global",
        };
        f.debug_struct("ActionDescriptor")
            .field("variant", &variant)
            .field("key", &self.key())
            .field("kind", &self.kind())
            .finish()
    }
}
