//! Subscription results
//!
//! Every message a subscription produces reaches `on_publish` wrapped in a
//! capsule together with the payload that produced it.

use std::rc::Rc;

use fos_forms::{HashValue, ValidationErrors};
use serde_json::Value;

/// Why a subscription was abandoned before reaching the connector
#[derive(Debug, Clone)]
pub enum AbortedReason {
    InvalidVariables(ValidationErrors),
}

/// What a capsule carries
#[derive(Debug, Clone)]
pub enum CapsuleOutcome {
    /// Message delivered by the connector
    Message(Value),
    Aborted(AbortedReason),
}

/// A result paired with the payload it belongs to
#[derive(Debug)]
pub struct SubscriptionCapsule<P> {
    pub payload: Rc<P>,
    pub outcome: CapsuleOutcome,
}

impl<P> SubscriptionCapsule<P> {
    pub fn message(payload: Rc<P>, message: Value) -> Self {
        Self {
            payload,
            outcome: CapsuleOutcome::Message(message),
        }
    }

    pub fn aborted(payload: Rc<P>, reason: AbortedReason) -> Self {
        Self {
            payload,
            outcome: CapsuleOutcome::Aborted(reason),
        }
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self.outcome, CapsuleOutcome::Aborted(_))
    }

    /// Raw message, if one was delivered
    pub fn raw(&self) -> Option<&Value> {
        match &self.outcome {
            CapsuleOutcome::Message(message) => Some(message),
            CapsuleOutcome::Aborted(_) => None,
        }
    }

    /// The message's `data` member as a value hash
    pub fn data(&self) -> Option<HashValue> {
        self.raw()
            .and_then(|message| message.get("data"))
            .filter(|data| !data.is_null())
            .cloned()
            .map(HashValue::from)
    }

    /// Messages of the `errors` member, if any
    pub fn errors(&self) -> Vec<String> {
        self.raw()
            .and_then(|message| message.get("errors"))
            .and_then(Value::as_array)
            .map(|errors| {
                errors
                    .iter()
                    .filter_map(|e| e.get("message").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl<P> Clone for SubscriptionCapsule<P> {
    fn clone(&self) -> Self {
        Self {
            payload: Rc::clone(&self.payload),
            outcome: self.outcome.clone(),
        }
    }
}
