//! Subscription payloads
//!
//! What a connector is asked to subscribe to. Payloads are checked before
//! any connector traffic; an invalid payload never reaches the wire.

use fos_forms::validators::{self, ValidationErrors, VariableRule};
use fos_forms::HashValue;
use serde_json::{Map, Value};

/// A subscription request a connector knows how to send
pub trait SubscriptionPayload {
    /// Check the payload before it is sent
    fn validate(&self) -> Result<(), ValidationErrors>;

    /// Wire message for the connector
    fn to_message(&self) -> Value;
}

/// GraphQL subscription operation
#[derive(Debug, Clone)]
pub struct GraphqlSubscriptionPayload {
    pub query: String,
    pub operation_name: Option<String>,
    pub variables: HashValue,
    pub rules: Vec<VariableRule>,
}

impl GraphqlSubscriptionPayload {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            operation_name: None,
            variables: HashValue::object(),
            rules: Vec::new(),
        }
    }

    pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    /// Replace the variables, typically with a hash extracted from a form
    pub fn with_variables(mut self, variables: HashValue) -> Self {
        self.variables = variables;
        self
    }

    /// Add a rule the variables must satisfy
    pub fn with_rule(mut self, rule: VariableRule) -> Self {
        self.rules.push(rule);
        self
    }
}

impl SubscriptionPayload for GraphqlSubscriptionPayload {
    fn validate(&self) -> Result<(), ValidationErrors> {
        validators::validate(&self.variables, &self.rules)
    }

    /// `{query, operationName, variables}`; files in the variables become
    /// `null` and travel separately (see [`crate::upload`])
    fn to_message(&self) -> Value {
        let mut message = Map::new();
        message.insert("query".to_string(), Value::String(self.query.clone()));
        if let Some(name) = &self.operation_name {
            message.insert("operationName".to_string(), Value::String(name.clone()));
        }
        message.insert("variables".to_string(), self.variables.to_json());
        Value::Object(message)
    }
}
