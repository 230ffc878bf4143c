// ── Notification sink ──
//
// Fire-and-forget user notifications (toasts in a GUI, stderr lines in the
// CLI). The engine never reads anything back from a notifier.

use strum::{Display, EnumString};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
}

/// Receives notifications emitted by the engine.
pub trait Notifier: Send + Sync + 'static {
    fn notify(&self, kind: NotificationKind, title: &str, description: &str);
}

/// Emits notifications as tracing events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, kind: NotificationKind, title: &str, description: &str) {
        match kind {
            NotificationKind::Success | NotificationKind::Info => {
                info!(%kind, title, description, "notification");
            }
            NotificationKind::Warning => warn!(title, description, "notification"),
            NotificationKind::Error => error!(title, description, "notification"),
        }
    }
}

/// Forwards notifications into an unbounded channel.
///
/// The receiving half is typically drained by a UI loop. Sends after the
/// receiver is dropped are silently discarded.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, kind: NotificationKind, title: &str, description: &str) {
        let _ = self.tx.send(Notification {
            kind,
            title: title.to_owned(),
            description: description.to_owned(),
        });
    }
}
