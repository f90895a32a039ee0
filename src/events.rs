//! Typed publish/subscribe surface for grid events.
//!
//! Handlers are dispatched synchronously on the emitting thread, in
//! subscription order. The bus is cheap to clone; clones share subscribers,
//! so export completions arriving from the offload port reach the same
//! handlers as the engine itself.

use crate::types::{ExportFormat, RowIndex, RowRecord, SortDirection};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Events emitted by a grid
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GridEvent {
    SortChanged {
        column: String,
        direction: SortDirection,
    },
    FilterApplied {
        /// Rows matching search and criteria
        matched: usize,
        total: usize,
    },
    PageChanged {
        page: usize,
        total_pages: usize,
    },
    SelectionChanged {
        selected: Vec<RowIndex>,
    },
    BulkActionRequested {
        action: String,
        rows: Vec<RowRecord>,
    },
    ExportCompleted {
        job: Uuid,
        format: ExportFormat,
        content: String,
        filename: String,
    },
    RowsDeleted {
        count: usize,
    },
    ColumnResized {
        column: String,
        width: f32,
    },
    ColumnVisibilityChanged {
        column: String,
        visible: bool,
    },
}

impl GridEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GridEvent::SortChanged { .. } => EventKind::SortChanged,
            GridEvent::FilterApplied { .. } => EventKind::FilterApplied,
            GridEvent::PageChanged { .. } => EventKind::PageChanged,
            GridEvent::SelectionChanged { .. } => EventKind::SelectionChanged,
            GridEvent::BulkActionRequested { .. } => EventKind::BulkActionRequested,
            GridEvent::ExportCompleted { .. } => EventKind::ExportCompleted,
            GridEvent::RowsDeleted { .. } => EventKind::RowsDeleted,
            GridEvent::ColumnResized { .. } => EventKind::ColumnResized,
            GridEvent::ColumnVisibilityChanged { .. } => EventKind::ColumnVisibilityChanged,
        }
    }
}

/// Discriminant used to subscribe to one kind of event
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum EventKind {
    SortChanged,
    FilterApplied,
    PageChanged,
    SelectionChanged,
    BulkActionRequested,
    ExportCompleted,
    RowsDeleted,
    ColumnResized,
    ColumnVisibilityChanged,
}

/// Identifies a subscription for `EventBus::off`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Arc<dyn Fn(&GridEvent) + Send + Sync>;

struct Subscription {
    id: SubscriptionId,
    kind: EventKind,
    handler: Handler,
}

#[derive(Clone, Default)]
pub struct EventBus {
    subscriptions: Arc<Mutex<Vec<Subscription>>>,
    next_id: Arc<AtomicU64>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `handler` to events of `kind`.
    pub fn on<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&GridEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscriptions.lock().push(Subscription {
            id,
            kind,
            handler: Arc::new(handler),
        });
        id
    }

    /// Remove a subscription. Returns false if it was already gone.
    pub fn off(&self, id: SubscriptionId) -> bool {
        let mut subs = self.subscriptions.lock();
        let before = subs.len();
        subs.retain(|s| s.id != id);
        subs.len() != before
    }

    /// Dispatch an event to every handler subscribed to its kind.
    pub fn emit(&self, event: GridEvent) {
        let kind = event.kind();
        // Handlers run without the lock so they may subscribe or unsubscribe
        let handlers: Vec<Handler> = self
            .subscriptions
            .lock()
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| Arc::clone(&s.handler))
            .collect();

        tracing::trace!(?kind, handlers = handlers.len(), "Emitting grid event");

        for handler in handlers {
            handler(&event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.lock().len()
    }

    /// Drop every subscription.
    pub fn clear(&self) {
        self.subscriptions.lock().clear();
    }
}
