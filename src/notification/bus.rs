use std::cell::RefCell;
use std::sync::Arc;

use parking_lot::Mutex;

use super::{Notification, NotificationSink};

/// Broadcasts editor notifications to registered sinks
pub struct NotificationBus {
    sinks: RefCell<Vec<Box<dyn NotificationSink>>>,
}

impl std::fmt::Debug for NotificationBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationBus")
            .field("sinks", &format!("<{} sinks>", self.sinks.borrow().len()))
            .finish()
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationBus {
    pub fn new() -> Self {
        Self {
            sinks: RefCell::new(Vec::new()),
        }
    }

    /// Subscribe a sink to receive notifications
    pub fn subscribe(&self, sink: Box<dyn NotificationSink>) {
        self.sinks.borrow_mut().push(sink);
    }

    /// Emit a notification to all registered sinks
    pub fn emit(&self, notification: Notification) {
        log::trace!("Notification: {:?}", notification);
        for sink in &mut *self.sinks.borrow_mut() {
            sink.notify(&notification);
        }
    }
}

/// Sink that keeps every notification it sees, shareable between owners
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    received: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.received.lock().clone()
    }

    pub fn last(&self) -> Option<Notification> {
        self.received.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.received.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.received.lock().is_empty()
    }

    pub fn clear(&self) {
        self.received.lock().clear();
    }

    /// Take everything received so far, leaving the sink empty
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.received.lock())
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&mut self, notification: &Notification) {
        self.received.lock().push(notification.clone());
    }
}
