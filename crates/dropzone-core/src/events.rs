//! Priority-ordered publish/subscribe hub.
//!
//! Dispatch is synchronous and re-entrant: a handler may emit on the same bus
//! and the nested dispatch completes before the outer one continues. The bus
//! is single-threaded and meant to be shared as an `Rc<EventBus>` between the
//! drop zone, the drag controller and host code.

use crate::config::{CancelPolicy, EventBusConfig};
use crate::error::LayoutError;
use crate::widget::WidgetId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

/// Standard event type names.
pub mod types {
    // Widget lifecycle
    pub const WIDGET_DROPPED: &str = "widget_dropped";
    pub const WIDGET_REMOVED: &str = "widget_removed";

    // Interaction
    pub const WIDGET_CLICKED: &str = "widget_clicked";
    pub const SELECTION_CHANGED: &str = "selection_changed";

    // Drag and drop
    pub const DRAG_STARTED: &str = "drag_started";
    pub const DRAG_MOVED: &str = "drag_moved";
    pub const DRAG_FINISHED: &str = "drag_finished";
    pub const DRAG_CANCELLED: &str = "drag_cancelled";

    // Modification
    pub const WIDGET_MOVED: &str = "widget_moved";
    pub const WIDGET_RESIZED: &str = "widget_resized";
    pub const RESIZE_STARTED: &str = "resize_started";
    pub const RESIZE_FINISHED: &str = "resize_finished";

    // Layout
    pub const LAYOUT_CHANGED: &str = "layout_changed";
    pub const LAYOUT_LOADED: &str = "layout_loaded";
    pub const LAYOUT_SAVED: &str = "layout_saved";
    pub const LAYOUT_MODE_CHANGED: &str = "layout_mode_changed";
    pub const GRID_TOGGLED: &str = "grid_toggled";
    pub const DROP_ZONE_CLEARED: &str = "drop_zone_cleared";
}

/// Handler priority. Higher priorities run first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventPriority {
    High,
    #[default]
    Normal,
    Low,
}

/// Event payload: string keys to arbitrary JSON values.
pub type Payload = serde_json::Map<String, Value>;

/// Turn a `json!({...})` object into a payload. Non-objects give an empty payload.
pub fn payload(value: Value) -> Payload {
    match value {
        Value::Object(map) => map,
        _ => Payload::new(),
    }
}

/// A dispatched notification.
#[derive(Debug, Clone)]
pub struct Event {
    pub event_type: String,
    /// Originating widget, `None` for container-level events.
    pub source: Option<WidgetId>,
    pub payload: Payload,
    /// Monotonic per-bus sequence number.
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    cancelled: Cell<bool>,
    /// Set once dispatch completes; the event is read-only afterwards.
    sealed: Cell<bool>,
}

impl Event {
    fn new(event_type: &str, source: Option<&WidgetId>, payload: Payload, sequence: u64) -> Self {
        Self {
            event_type: event_type.to_string(),
            source: source.cloned(),
            payload,
            sequence,
            timestamp: Utc::now(),
            cancelled: Cell::new(false),
            sealed: Cell::new(false),
        }
    }

    /// Flag the event as cancelled. Whether later handlers still run depends
    /// on the bus [`CancelPolicy`].
    ///
    /// Only handlers can cancel: once dispatch has completed the call is
    /// ignored, including on copies taken from the history.
    pub fn cancel(&self) {
        if self.sealed.get() {
            log::debug!(
                "Ignoring cancel of '{}' #{} after dispatch",
                self.event_type,
                self.sequence
            );
            return;
        }
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }

    /// Look up a payload value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }
}

/// What a handler reports back. Errors are logged, never propagated.
pub type HandlerResult = Result<(), LayoutError>;

type HandlerFn = dyn Fn(&Event) -> HandlerResult;

/// Handle returned by registration, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscription {
    id: SubscriptionId,
    /// `None` for global handlers.
    event_type: Option<String>,
    priority: EventPriority,
    once: bool,
    handler: Rc<HandlerFn>,
}

/// The event hub.
pub struct EventBus {
    config: EventBusConfig,
    subscriptions: RefCell<Vec<Subscription>>,
    history: RefCell<VecDeque<Event>>,
    next_id: Cell<u64>,
    next_sequence: Cell<u64>,
    enabled: Cell<bool>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(EventBusConfig::default())
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("config", &self.config)
            .field("handlers", &self.subscriptions.borrow().len())
            .field("history", &self.history.borrow().len())
            .field("enabled", &self.enabled.get())
            .finish()
    }
}

impl EventBus {
    /// Create a new bus.
    pub fn new(config: EventBusConfig) -> Self {
        Self {
            config,
            subscriptions: RefCell::new(Vec::new()),
            history: RefCell::new(VecDeque::new()),
            next_id: Cell::new(1),
            next_sequence: Cell::new(1),
            enabled: Cell::new(true),
        }
    }

    /// Create a bus ready to be shared.
    pub fn shared(config: EventBusConfig) -> Rc<Self> {
        Rc::new(Self::new(config))
    }

    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }

    fn subscribe(
        &self,
        event_type: Option<&str>,
        handler: Rc<HandlerFn>,
        priority: EventPriority,
        once: bool,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.subscriptions.borrow_mut().push(Subscription {
            id,
            event_type: event_type.map(str::to_string),
            priority,
            once,
            handler,
        });
        id
    }

    /// Register a handler for one event type.
    pub fn register<F>(
        &self,
        event_type: &str,
        handler: F,
        priority: EventPriority,
        once: bool,
    ) -> SubscriptionId
    where
        F: Fn(&Event) -> HandlerResult + 'static,
    {
        self.subscribe(Some(event_type), Rc::new(handler), priority, once)
    }

    /// Register a normal-priority handler.
    pub fn on<F>(&self, event_type: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&Event) -> HandlerResult + 'static,
    {
        self.register(event_type, handler, EventPriority::Normal, false)
    }

    /// Register a normal-priority handler that runs at most once.
    pub fn once<F>(&self, event_type: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&Event) -> HandlerResult + 'static,
    {
        self.register(event_type, handler, EventPriority::Normal, true)
    }

    /// Register a handler receiving every event, after the type-specific ones.
    pub fn register_global<F>(&self, handler: F, priority: EventPriority) -> SubscriptionId
    where
        F: Fn(&Event) -> HandlerResult + 'static,
    {
        self.subscribe(None, Rc::new(handler), priority, false)
    }

    /// Remove a handler. Returns false if it was not registered.
    pub fn unregister(&self, id: SubscriptionId) -> bool {
        let mut subs = self.subscriptions.borrow_mut();
        let before = subs.len();
        subs.retain(|s| s.id != id);
        subs.len() != before
    }

    /// Remove every handler for an event type (globals are kept).
    pub fn unregister_all(&self, event_type: &str) {
        self.subscriptions
            .borrow_mut()
            .retain(|s| s.event_type.as_deref() != Some(event_type));
    }

    /// Remove every handler, global ones included.
    pub fn clear_handlers(&self) {
        self.subscriptions.borrow_mut().clear();
    }

    /// Number of handlers for a type, or of all handlers when `None`.
    pub fn handler_count(&self, event_type: Option<&str>) -> usize {
        let subs = self.subscriptions.borrow();
        match event_type {
            Some(t) => subs.iter().filter(|s| s.event_type.as_deref() == Some(t)).count(),
            None => subs.len(),
        }
    }

    /// Event types with at least one handler, in registration order.
    pub fn registered_events(&self) -> Vec<String> {
        let mut events: Vec<String> = Vec::new();
        for sub in self.subscriptions.borrow().iter() {
            if let Some(t) = &sub.event_type {
                if !events.contains(t) {
                    events.push(t.clone());
                }
            }
        }
        events
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    /// Handlers to run for `event_type`: type-specific first, then global,
    /// each group ordered by priority with registration order as tie-break.
    fn dispatch_plan(&self, event_type: &str) -> Vec<(SubscriptionId, bool, Rc<HandlerFn>)> {
        let subs = self.subscriptions.borrow();
        let mut specific: Vec<&Subscription> = subs
            .iter()
            .filter(|s| s.event_type.as_deref() == Some(event_type))
            .collect();
        let mut global: Vec<&Subscription> =
            subs.iter().filter(|s| s.event_type.is_none()).collect();
        // Stable sort keeps registration order within a priority.
        specific.sort_by_key(|s| s.priority);
        global.sort_by_key(|s| s.priority);
        specific
            .into_iter()
            .chain(global)
            .map(|s| (s.id, s.once, Rc::clone(&s.handler)))
            .collect()
    }

    fn is_registered(&self, id: SubscriptionId) -> bool {
        self.subscriptions.borrow().iter().any(|s| s.id == id)
    }

    /// Build an event and dispatch it synchronously.
    ///
    /// Returns the dispatched event, or `None` when the bus is disabled.
    pub fn emit(
        &self,
        event_type: &str,
        source: Option<&WidgetId>,
        payload: Payload,
    ) -> Option<Event> {
        if !self.enabled.get() {
            log::trace!("Event bus disabled, dropping '{}'", event_type);
            return None;
        }

        let sequence = self.next_sequence.get();
        self.next_sequence.set(sequence + 1);
        let event = Event::new(event_type, source, payload, sequence);

        let plan = self.dispatch_plan(event_type);
        let mut invoked = 0usize;
        for (id, once, handler) in plan {
            // An earlier handler may have unregistered this one.
            if !self.is_registered(id) {
                continue;
            }
            if once {
                self.unregister(id);
            }
            invoked += 1;
            if let Err(e) = handler(&event) {
                log::warn!("Handler for '{}' failed: {}", event_type, e);
            }
            if event.is_cancelled() && self.config.cancel_policy == CancelPolicy::StopPropagation {
                log::debug!("Event '{}' #{} cancelled, stopping dispatch", event_type, sequence);
                break;
            }
        }
        log::trace!("Dispatched '{}' #{} to {} handler(s)", event_type, sequence, invoked);

        event.sealed.set(true);
        self.record(event.clone());
        Some(event)
    }

    fn record(&self, event: Event) {
        if self.config.history_capacity == 0 {
            return;
        }
        let mut history = self.history.borrow_mut();
        while history.len() >= self.config.history_capacity {
            history.pop_front();
        }
        history.push_back(event);
    }

    /// Past events, oldest first, optionally filtered by type and limited to
    /// the most recent `limit` matches.
    pub fn history(&self, event_type: Option<&str>, limit: Option<usize>) -> Vec<Event> {
        let history = self.history.borrow();
        let matching: Vec<&Event> = history
            .iter()
            .filter(|e| event_type.is_none_or(|t| e.event_type == t))
            .collect();
        let skip = limit.map_or(0, |l| matching.len().saturating_sub(l));
        matching.into_iter().skip(skip).cloned().collect()
    }

    pub fn clear_history(&self) {
        self.history.borrow_mut().clear();
    }
}

/// A group of subscriptions removed together when the scope is dropped.
pub struct EventScope {
    bus: Rc<EventBus>,
    name: String,
    subscriptions: Vec<SubscriptionId>,
}

impl EventScope {
    pub fn new(bus: Rc<EventBus>, name: impl Into<String>) -> Self {
        Self {
            bus,
            name: name.into(),
            subscriptions: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a handler owned by this scope.
    pub fn register<F>(
        &mut self,
        event_type: &str,
        handler: F,
        priority: EventPriority,
        once: bool,
    ) -> SubscriptionId
    where
        F: Fn(&Event) -> HandlerResult + 'static,
    {
        let id = self.bus.register(event_type, handler, priority, once);
        self.subscriptions.push(id);
        id
    }

    /// Unregister everything registered through this scope.
    pub fn clear(&mut self) {
        for id in self.subscriptions.drain(..) {
            self.bus.unregister(id);
        }
    }
}

impl Drop for EventScope {
    fn drop(&mut self) {
        log::trace!("Dropping event scope '{}'", self.name);
        self.clear();
    }
}
