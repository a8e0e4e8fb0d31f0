//! Connectors
//!
//! A connector owns the duplex channel (usually a WebSocket) and performs
//! the subscription handshake. Subscribers only see it through
//! [`Connector`]: they hand over a payload and a [`Sink`] and get back a
//! callback that ends the subscription.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::error::ConnectorError;
use crate::payload::SubscriptionPayload;

/// Ends one subscription
pub type Unsubscribe = Box<dyn FnOnce()>;

/// Where a connector delivers the events of one subscription
#[derive(Clone)]
pub struct Sink {
    next: Rc<dyn Fn(Value)>,
    error: Rc<dyn Fn(ConnectorError)>,
    complete: Rc<dyn Fn()>,
}

impl Sink {
    pub fn new(
        next: impl Fn(Value) + 'static,
        error: impl Fn(ConnectorError) + 'static,
        complete: impl Fn() + 'static,
    ) -> Self {
        Self {
            next: Rc::new(next),
            error: Rc::new(error),
            complete: Rc::new(complete),
        }
    }

    /// Inbound message
    pub fn next(&self, message: Value) {
        (self.next)(message)
    }

    pub fn error(&self, error: ConnectorError) {
        (self.error)(error)
    }

    /// Server ended the subscription
    pub fn complete(&self) {
        (self.complete)()
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink").finish_non_exhaustive()
    }
}

/// Connection lifecycle events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    Connecting,
    /// Handshake done, channel usable
    Connected,
    Closed,
}

/// Registration handle for a lifecycle listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Callback for one lifecycle event
#[derive(Clone)]
pub struct LifecycleListener {
    pub event: LifecycleEvent,
    pub handler: Rc<dyn Fn()>,
    /// Drop the listener after it fires once
    pub once: bool,
}

impl LifecycleListener {
    pub fn new(event: LifecycleEvent, handler: impl Fn() + 'static) -> Self {
        Self {
            event,
            handler: Rc::new(handler),
            once: false,
        }
    }

    pub fn once(event: LifecycleEvent, handler: impl Fn() + 'static) -> Self {
        Self {
            once: true,
            ..Self::new(event, handler)
        }
    }
}

impl fmt::Debug for LifecycleListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleListener")
            .field("event", &self.event)
            .field("once", &self.once)
            .finish_non_exhaustive()
    }
}

/// The channel a subscriber subscribes through
pub trait Connector {
    /// Start a subscription; events go to `sink` until the returned
    /// callback runs
    fn subscribe(&self, payload: &dyn SubscriptionPayload, sink: Sink) -> Unsubscribe;

    fn add_lifecycle_listener(&self, listener: LifecycleListener) -> ListenerId;

    /// Unknown ids are ignored
    fn remove_lifecycle_listener(&self, id: ListenerId);
}

/// Listener bookkeeping for connector implementations
#[derive(Default)]
pub struct LifecycleListeners {
    next_id: Cell<u64>,
    listeners: RefCell<Vec<(ListenerId, LifecycleListener)>>,
}

impl LifecycleListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, listener: LifecycleListener) -> ListenerId {
        let id = ListenerId(self.next_id.get() + 1);
        self.next_id.set(id.0);
        self.listeners.borrow_mut().push((id, listener));
        id
    }

    pub fn remove(&self, id: ListenerId) {
        self.listeners.borrow_mut().retain(|(lid, _)| *lid != id);
    }

    pub fn len(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.borrow().is_empty()
    }

    /// Run every listener for `event`; once-listeners are removed first.
    /// Returns how many ran.
    pub fn emit(&self, event: LifecycleEvent) -> usize {
        let handlers = {
            let mut listeners = self.listeners.borrow_mut();
            let handlers: Vec<Rc<dyn Fn()>> = listeners
                .iter()
                .filter(|(_, l)| l.event == event)
                .map(|(_, l)| Rc::clone(&l.handler))
                .collect();
            listeners.retain(|(_, l)| !(l.once && l.event == event));
            handlers
        };
        for handler in &handlers {
            handler();
        }
        handlers.len()
    }
}

impl fmt::Debug for LifecycleListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleListeners")
            .field("len", &self.len())
            .finish()
    }
}

/// Call made on a [`ManualConnector`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorCall {
    Subscribe(usize),
    Unsubscribe(usize),
}

struct ManualSubscription {
    id: usize,
    message: Value,
    sink: Sink,
    active: Rc<Cell<bool>>,
}

/// In-process connector driven by hand: records every subscription and
/// lets the caller push messages, errors and lifecycle events to it.
#[derive(Default)]
pub struct ManualConnector {
    subscriptions: RefCell<Vec<ManualSubscription>>,
    calls: Rc<RefCell<Vec<ConnectorCall>>>,
    listeners: LifecycleListeners,
}

impl ManualConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every subscribe/unsubscribe, in order
    pub fn calls(&self) -> Vec<ConnectorCall> {
        self.calls.borrow().clone()
    }

    pub fn subscribe_count(&self) -> usize {
        self.subscriptions.borrow().len()
    }

    pub fn unsubscribe_count(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, ConnectorCall::Unsubscribe(_)))
            .count()
    }

    /// Subscriptions not yet unsubscribed
    pub fn active_count(&self) -> usize {
        self.subscriptions
            .borrow()
            .iter()
            .filter(|s| s.active.get())
            .count()
    }

    /// Wire message of the most recent subscription
    pub fn last_message(&self) -> Option<Value> {
        self.subscriptions.borrow().last().map(|s| s.message.clone())
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Deliver a message to the newest active subscription
    pub fn emit_next(&self, message: Value) -> bool {
        self.with_active_sink(|sink| sink.next(message))
    }

    /// Fail the newest active subscription
    pub fn emit_error(&self, error: ConnectorError) -> bool {
        self.with_active_sink(|sink| sink.error(error))
    }

    /// Complete the newest active subscription
    pub fn emit_complete(&self) -> bool {
        self.with_active_sink(Sink::complete)
    }

    pub fn emit_lifecycle(&self, event: LifecycleEvent) -> usize {
        self.listeners.emit(event)
    }

    fn with_active_sink(&self, deliver: impl FnOnce(&Sink)) -> bool {
        let sink = self
            .subscriptions
            .borrow()
            .iter()
            .rev()
            .find(|s| s.active.get())
            .map(|s| s.sink.clone());
        match sink {
            Some(sink) => {
                deliver(&sink);
                true
            }
            None => false,
        }
    }
}

impl Connector for ManualConnector {
    fn subscribe(&self, payload: &dyn SubscriptionPayload, sink: Sink) -> Unsubscribe {
        let id = self.subscriptions.borrow().len() + 1;
        let active = Rc::new(Cell::new(true));
        self.subscriptions.borrow_mut().push(ManualSubscription {
            id,
            message: payload.to_message(),
            sink,
            active: Rc::clone(&active),
        });
        self.calls.borrow_mut().push(ConnectorCall::Subscribe(id));
        tracing::debug!(id, "manual subscription opened");

        let calls = Rc::clone(&self.calls);
        Box::new(move || {
            if active.replace(false) {
                calls.borrow_mut().push(ConnectorCall::Unsubscribe(id));
            }
        })
    }

    fn add_lifecycle_listener(&self, listener: LifecycleListener) -> ListenerId {
        self.listeners.add(listener)
    }

    fn remove_lifecycle_listener(&self, id: ListenerId) {
        self.listeners.remove(id);
    }
}

impl fmt::Debug for ManualConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualConnector")
            .field("subscriptions", &self.subscribe_count())
            .field("active", &self.active_count())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl fmt::Debug for ManualSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualSubscription")
            .field("id", &self.id)
            .field("active", &self.active.get())
            .finish()
    }
}
