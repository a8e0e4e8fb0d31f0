//! Reconnecting subscriber
//!
//! Keeps one logical subscription alive over a [`Connector`]. When the
//! connector reports an error the subscription is retried after a backoff
//! delay; the backoff resets once the connector reports `Connected` again.
//!
//! Every `subscribe`/`unsubscribe` starts a new generation. Callbacks
//! (connector sinks and resubscribe timers) remember the generation they
//! were made for and do nothing once it has passed, so an explicit
//! `unsubscribe` also stops any pending retry.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use tracing::{debug, info, trace, warn};

use crate::backoff::ResubscribeConfig;
use crate::capsule::{AbortedReason, SubscriptionCapsule};
use crate::connector::{Connector, LifecycleEvent, LifecycleListener, ListenerId, Sink, Unsubscribe};
use crate::error::ConnectorError;
use crate::payload::SubscriptionPayload;
use crate::timers::{Scheduler, TimerId};

/// Delivered to `on_disconnected` when the connector fails a subscription
#[derive(Debug)]
pub struct DisconnectedEvent<P> {
    pub payload: Rc<P>,
    pub error: ConnectorError,
}

/// Delivered to `on_terminate` when the server completes a subscription
#[derive(Debug)]
pub struct TerminatedEvent<P> {
    pub payload: Rc<P>,
}

/// Callbacks for subscription events. `on_publish` is required.
pub struct SubscriberHooks<P> {
    pub on_publish: Rc<dyn Fn(SubscriptionCapsule<P>)>,
    pub on_disconnected: Option<Rc<dyn Fn(DisconnectedEvent<P>)>>,
    pub on_terminate: Option<Rc<dyn Fn(TerminatedEvent<P>)>>,
}

impl<P> SubscriberHooks<P> {
    pub fn new(on_publish: impl Fn(SubscriptionCapsule<P>) + 'static) -> Self {
        Self {
            on_publish: Rc::new(on_publish),
            on_disconnected: None,
            on_terminate: None,
        }
    }

    pub fn on_disconnected(mut self, hook: impl Fn(DisconnectedEvent<P>) + 'static) -> Self {
        self.on_disconnected = Some(Rc::new(hook));
        self
    }

    pub fn on_terminate(mut self, hook: impl Fn(TerminatedEvent<P>) + 'static) -> Self {
        self.on_terminate = Some(Rc::new(hook));
        self
    }
}

impl<P> Clone for SubscriberHooks<P> {
    fn clone(&self) -> Self {
        Self {
            on_publish: Rc::clone(&self.on_publish),
            on_disconnected: self.on_disconnected.clone(),
            on_terminate: self.on_terminate.clone(),
        }
    }
}

impl<P> fmt::Debug for SubscriberHooks<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriberHooks")
            .field("on_disconnected", &self.on_disconnected.is_some())
            .field("on_terminate", &self.on_terminate.is_some())
            .finish_non_exhaustive()
    }
}

/// Where the subscriber is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriberState {
    /// No subscription registered
    Idle,
    /// Subscription registered with the connector
    Active,
    /// Connector failed; a resubscribe timer is pending
    AwaitingResubscribe,
}

struct Session {
    state: SubscriberState,
    unsubscribe: Option<Unsubscribe>,
    attempt_count: u32,
    generation: u64,
    timer: Option<TimerId>,
    reset_listener: Option<ListenerId>,
}

struct Inner {
    connector: Rc<dyn Connector>,
    scheduler: Rc<dyn Scheduler>,
    config: ResubscribeConfig,
    session: RefCell<Session>,
}

impl Inner {
    fn is_current(&self, generation: u64) -> bool {
        self.session.borrow().generation == generation
    }

    /// Start a new generation: drop the pending timer and hand back the
    /// old unsubscribe callback for the caller to run
    fn next_generation(&self) -> (u64, Option<Unsubscribe>) {
        let (generation, timer, old) = {
            let mut session = self.session.borrow_mut();
            session.generation += 1;
            (session.generation, session.timer.take(), session.unsubscribe.take())
        };
        if let Some(timer) = timer {
            self.scheduler.clear_timeout(timer);
        }
        (generation, old)
    }

    /// Explicit end of the session: no pending retry, no reset listener,
    /// backoff back to zero
    fn teardown(&self) -> (u64, Option<Unsubscribe>) {
        let (generation, old) = self.next_generation();
        let listener = {
            let mut session = self.session.borrow_mut();
            session.state = SubscriberState::Idle;
            session.attempt_count = 0;
            session.reset_listener.take()
        };
        if let Some(listener) = listener {
            self.connector.remove_lifecycle_listener(listener);
        }
        (generation, old)
    }
}

/// Manages a single subscription with automatic resubscribe on error
pub struct ReconnectingSubscriber<P> {
    inner: Rc<Inner>,
    _payload: std::marker::PhantomData<fn(P)>,
}

impl<P: SubscriptionPayload + 'static> ReconnectingSubscriber<P> {
    pub fn new(connector: Rc<dyn Connector>, scheduler: Rc<dyn Scheduler>) -> Self {
        Self::with_config(connector, scheduler, ResubscribeConfig::default())
    }

    pub fn with_config(
        connector: Rc<dyn Connector>,
        scheduler: Rc<dyn Scheduler>,
        config: ResubscribeConfig,
    ) -> Self {
        Self {
            inner: Rc::new(Inner {
                connector,
                scheduler,
                config,
                session: RefCell::new(Session {
                    state: SubscriberState::Idle,
                    unsubscribe: None,
                    attempt_count: 0,
                    generation: 0,
                    timer: None,
                    reset_listener: None,
                }),
            }),
            _payload: std::marker::PhantomData,
        }
    }

    /// Subscribe, replacing any current subscription.
    ///
    /// A payload that fails validation is answered with an aborted capsule
    /// on `on_publish` right away and never reaches the connector.
    pub fn subscribe(&self, payload: P, hooks: SubscriberHooks<P>) {
        subscribe(&self.inner, Rc::new(payload), hooks);
    }

    /// End the current subscription and cancel any pending resubscribe
    pub fn unsubscribe(&self) {
        let (generation, old) = self.inner.teardown();
        if let Some(unsubscribe) = old {
            unsubscribe();
            info!(generation, "unsubscribed");
        }
    }

    /// Delay the next error would wait before resubscribing
    pub fn calculate_resubscribe_delay(&self) -> Duration {
        let attempt = self.inner.session.borrow().attempt_count;
        self.inner.config.delay_for_attempt(attempt)
    }

    /// Errors seen since the last reset
    pub fn attempt_count(&self) -> u32 {
        self.inner.session.borrow().attempt_count
    }

    pub fn state(&self) -> SubscriberState {
        self.inner.session.borrow().state
    }

    pub fn config(&self) -> &ResubscribeConfig {
        &self.inner.config
    }
}

impl<P> Drop for ReconnectingSubscriber<P> {
    fn drop(&mut self) {
        if let (_, Some(unsubscribe)) = self.inner.teardown() {
            unsubscribe();
        }
    }
}

impl<P> fmt::Debug for ReconnectingSubscriber<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let session = self.inner.session.borrow();
        f.debug_struct("ReconnectingSubscriber")
            .field("state", &session.state)
            .field("attempt_count", &session.attempt_count)
            .field("generation", &session.generation)
            .field("config", &self.inner.config)
            .finish()
    }
}

fn subscribe<P: SubscriptionPayload + 'static>(
    inner: &Rc<Inner>,
    payload: Rc<P>,
    hooks: SubscriberHooks<P>,
) {
    if let Err(errors) = payload.validate() {
        debug!(failed = errors.len(), "payload rejected before subscribing");
        (hooks.on_publish)(SubscriptionCapsule::aborted(
            payload,
            AbortedReason::InvalidVariables(errors),
        ));
        return;
    }

    let (generation, old) = inner.next_generation();
    if let Some(unsubscribe) = old {
        unsubscribe();
    }
    inner.session.borrow_mut().state = SubscriberState::Active;

    let sink = make_sink(Rc::downgrade(inner), generation, &payload, &hooks);
    let unsubscribe = inner.connector.subscribe(&*payload, sink);
    info!(generation, "subscribed");

    let mut session = inner.session.borrow_mut();
    if session.generation == generation {
        session.unsubscribe = Some(unsubscribe);
    } else {
        // Superseded while the connector was still subscribing
        drop(session);
        unsubscribe();
    }
}

fn make_sink<P: SubscriptionPayload + 'static>(
    inner: Weak<Inner>,
    generation: u64,
    payload: &Rc<P>,
    hooks: &SubscriberHooks<P>,
) -> Sink {
    let live = {
        let inner = inner.clone();
        move || {
            let current = inner.upgrade().filter(|i| i.is_current(generation));
            if current.is_none() {
                trace!(generation, "ignoring event from stale subscription");
            }
            current
        }
    };

    let next = {
        let live = live.clone();
        let payload = Rc::clone(payload);
        let on_publish = Rc::clone(&hooks.on_publish);
        move |message| {
            if live().is_some() {
                on_publish(SubscriptionCapsule::message(Rc::clone(&payload), message));
            }
        }
    };

    let error = {
        let live = live.clone();
        let payload = Rc::clone(payload);
        let hooks = hooks.clone();
        move |error: ConnectorError| {
            let Some(inner) = live() else {
                return;
            };
            if let Some(on_disconnected) = &hooks.on_disconnected {
                on_disconnected(DisconnectedEvent {
                    payload: Rc::clone(&payload),
                    error: error.clone(),
                });
            }
            schedule_resubscribe(&inner, generation, Rc::clone(&payload), hooks.clone(), &error);
        }
    };

    let complete = {
        let payload = Rc::clone(payload);
        let on_terminate = hooks.on_terminate.clone();
        move || {
            let Some(inner) = live() else {
                return;
            };
            inner.session.borrow_mut().state = SubscriberState::Idle;
            debug!(generation, "subscription completed");
            if let Some(on_terminate) = &on_terminate {
                on_terminate(TerminatedEvent {
                    payload: Rc::clone(&payload),
                });
            }
        }
    };

    Sink::new(next, error, complete)
}

fn schedule_resubscribe<P: SubscriptionPayload + 'static>(
    inner: &Rc<Inner>,
    generation: u64,
    payload: Rc<P>,
    hooks: SubscriberHooks<P>,
    error: &ConnectorError,
) {
    let (delay, attempt, stale_timer, needs_reset_listener) = {
        let mut session = inner.session.borrow_mut();
        let attempt = session.attempt_count;
        let delay = inner.config.delay_for_attempt(attempt);
        session.attempt_count += 1;
        session.state = SubscriberState::AwaitingResubscribe;
        (delay, attempt, session.timer.take(), session.reset_listener.is_none())
    };
    if let Some(timer) = stale_timer {
        inner.scheduler.clear_timeout(timer);
    }

    warn!(
        error = %error,
        attempt,
        delay_ms = delay.as_millis() as u64,
        "subscription failed, resubscribing"
    );

    let weak = Rc::downgrade(inner);
    let timer = inner.scheduler.set_timeout(
        delay,
        Box::new(move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if !inner.is_current(generation) {
                trace!(generation, "ignoring stale resubscribe timer");
                return;
            }
            inner.session.borrow_mut().timer = None;
            subscribe(&inner, payload, hooks);
        }),
    );
    inner.session.borrow_mut().timer = Some(timer);

    if needs_reset_listener {
        let weak = Rc::downgrade(inner);
        let listener = inner.connector.add_lifecycle_listener(LifecycleListener::once(
            LifecycleEvent::Connected,
            move || {
                if let Some(inner) = weak.upgrade() {
                    let mut session = inner.session.borrow_mut();
                    session.attempt_count = 0;
                    session.reset_listener = None;
                    debug!("connected, resubscribe backoff reset");
                }
            },
        ));
        inner.session.borrow_mut().reset_listener = Some(listener);
    }
}
