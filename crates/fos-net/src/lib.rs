//! fOS Net
//!
//! Subscriptions over persistent connections.
//!
//! - [`ReconnectingSubscriber`] keeps one subscription alive through a
//!   [`Connector`], resubscribing with backoff after errors.
//! - [`GraphqlSubscriptionPayload`] carries a query and a variables hash
//!   that is validated before anything is sent.
//! - [`upload`] renders operations with files as multipart form data.

mod error;
mod connector;
mod payload;
mod capsule;
mod backoff;
mod timers;
mod subscriber;
pub mod upload;

pub use error::{ConnectorError, UploadError};
pub use connector::{
    Connector, ConnectorCall, LifecycleEvent, LifecycleListener, LifecycleListeners, ListenerId,
    ManualConnector, Sink, Unsubscribe,
};
pub use payload::{GraphqlSubscriptionPayload, SubscriptionPayload};
pub use capsule::{AbortedReason, CapsuleOutcome, SubscriptionCapsule};
pub use backoff::ResubscribeConfig;
pub use timers::{LocalScheduler, Scheduler, TimerCallback, TimerId, TimerQueue};
pub use subscriber::{
    DisconnectedEvent, ReconnectingSubscriber, SubscriberHooks, SubscriberState, TerminatedEvent,
};
