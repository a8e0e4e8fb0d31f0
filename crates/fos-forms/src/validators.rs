//! Variable validation
//!
//! Constraint checks run against values in a built hash, addressed by
//! dotted path. Mirrors the constraint validation API of form controls.

use thiserror::Error;
use url::Url;

use crate::HashValue;

/// Which constraints a value failed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidityState {
    /// Required but empty
    pub value_missing: bool,
    /// Not an email/url/number where one is expected
    pub type_mismatch: bool,
    /// Text that does not parse as a number
    pub bad_input: bool,
    pub too_long: bool,
    pub too_short: bool,
    pub range_underflow: bool,
    pub range_overflow: bool,
    /// Rejected by a custom check
    pub custom_error: bool,
    custom_message: String,
}

impl ValidityState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if all constraints are satisfied
    pub fn valid(&self) -> bool {
        !(self.value_missing
            || self.type_mismatch
            || self.bad_input
            || self.too_long
            || self.too_short
            || self.range_underflow
            || self.range_overflow
            || self.custom_error)
    }

    /// Set custom error message; an empty message clears it
    pub fn set_custom_validity(&mut self, message: &str) {
        self.custom_message = message.to_string();
        self.custom_error = !message.is_empty();
    }

    /// Human readable reason for the first failed constraint
    pub fn validation_message(&self) -> String {
        if self.custom_error {
            return self.custom_message.clone();
        }
        let message = if self.value_missing {
            "Please fill out this field."
        } else if self.type_mismatch || self.bad_input {
            "Please enter a valid value."
        } else if self.too_long {
            "Please shorten this text."
        } else if self.too_short {
            "Please lengthen this text."
        } else if self.range_underflow {
            "Value must be greater or equal to minimum."
        } else if self.range_overflow {
            "Value must be less or equal to maximum."
        } else {
            ""
        };
        message.to_string()
    }
}

/// Expected shape of a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueKind {
    #[default]
    Any,
    Email,
    Url,
    Number,
}

/// Validation constraints for one variable
#[derive(Debug, Clone, Default)]
pub struct ValidationConstraints {
    pub required: bool,
    /// Minimum length in characters, or items for arrays
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub kind: ValueKind,
}

/// Custom check; returns an error message when the value is rejected
pub type CustomCheck = fn(&HashValue) -> Option<String>;

/// Constraints attached to the value at `path`
#[derive(Debug, Clone)]
pub struct VariableRule {
    pub path: String,
    pub constraints: ValidationConstraints,
    pub custom: Option<CustomCheck>,
}

impl VariableRule {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            constraints: ValidationConstraints::default(),
            custom: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.constraints.required = true;
        self
    }

    pub fn min_length(mut self, len: usize) -> Self {
        self.constraints.min_length = Some(len);
        self
    }

    pub fn max_length(mut self, len: usize) -> Self {
        self.constraints.max_length = Some(len);
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.constraints.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.constraints.max = Some(max);
        self
    }

    pub fn email(mut self) -> Self {
        self.constraints.kind = ValueKind::Email;
        self
    }

    pub fn url(mut self) -> Self {
        self.constraints.kind = ValueKind::Url;
        self
    }

    pub fn number(mut self) -> Self {
        self.constraints.kind = ValueKind::Number;
        self
    }

    pub fn custom(mut self, check: CustomCheck) -> Self {
        self.custom = Some(check);
        self
    }

    /// Evaluate the rule against `hash`. A missing path reads as `Null`.
    pub fn check(&self, hash: &HashValue) -> ValidityState {
        let value = hash.get_path(&self.path).unwrap_or(&HashValue::Null);
        let constraints = &self.constraints;
        let mut validity = ValidityState::new();

        if is_empty(value) {
            validity.value_missing = constraints.required;
        } else {
            if let Some(len) = length_of(value) {
                if constraints.min_length.is_some_and(|min| len < min) {
                    validity.too_short = true;
                }
                if constraints.max_length.is_some_and(|max| len > max) {
                    validity.too_long = true;
                }
            }

            match (constraints.kind, value) {
                (ValueKind::Email, HashValue::String(s)) => validity.type_mismatch = !is_valid_email(s),
                (ValueKind::Url, HashValue::String(s)) => validity.type_mismatch = !is_valid_url(s),
                (ValueKind::Email | ValueKind::Url, _) => validity.type_mismatch = true,
                (ValueKind::Number, HashValue::String(s)) => {
                    validity.bad_input = s.trim().parse::<f64>().is_err()
                }
                (ValueKind::Number, HashValue::Number(_)) | (ValueKind::Any, _) => {}
                (ValueKind::Number, _) => validity.type_mismatch = true,
            }

            if let Some(n) = numeric_value(value, constraints.kind) {
                if constraints.min.is_some_and(|min| n < min) {
                    validity.range_underflow = true;
                }
                if constraints.max.is_some_and(|max| n > max) {
                    validity.range_overflow = true;
                }
            }
        }

        if let Some(message) = self.custom.and_then(|check| check(value)) {
            validity.set_custom_validity(&message);
        }
        validity
    }
}

/// A rule that failed
#[derive(Debug, Clone, Error)]
#[error("invalid variable `{path}`: {message}")]
pub struct ValidationError {
    pub path: String,
    pub message: String,
    pub validity: ValidityState,
}

/// Every failed rule of one validation pass
#[derive(Debug, Clone, Error)]
#[error("{} variable(s) failed validation", .0.len())]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Paths that failed, in rule order
    pub fn paths(&self) -> Vec<&str> {
        self.0.iter().map(|e| e.path.as_str()).collect()
    }
}

/// Check every rule against `hash`
pub fn validate(hash: &HashValue, rules: &[VariableRule]) -> Result<(), ValidationErrors> {
    let errors: Vec<ValidationError> = rules
        .iter()
        .filter_map(|rule| {
            let validity = rule.check(hash);
            (!validity.valid()).then(|| ValidationError {
                path: rule.path.clone(),
                message: validity.validation_message(),
                validity,
            })
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        tracing::debug!(failed = errors.len(), "variable validation failed");
        Err(ValidationErrors(errors))
    }
}

fn is_empty(value: &HashValue) -> bool {
    match value {
        HashValue::Null => true,
        HashValue::String(s) => s.is_empty(),
        HashValue::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn length_of(value: &HashValue) -> Option<usize> {
    match value {
        HashValue::String(s) => Some(s.chars().count()),
        HashValue::Array(items) => Some(items.len()),
        _ => None,
    }
}

fn numeric_value(value: &HashValue, kind: ValueKind) -> Option<f64> {
    match value {
        HashValue::Number(n) => Some(*n),
        HashValue::String(s) if kind == ValueKind::Number => s.trim().parse().ok(),
        _ => None,
    }
}

fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Absolute URL with a host, like `<input type="url">` accepts
fn is_valid_url(value: &str) -> bool {
    Url::parse(value).is_ok_and(|url| url.has_host())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hash() -> HashValue {
        HashValue::from(json!({
            "title": "Hi",
            "email": "not-an-email",
            "age": 17,
            "tags": ["a", "b", "c"],
            "site": "https://example.com",
            "count": "12x",
        }))
    }

    #[test]
    fn test_validity_state() {
        let mut state = ValidityState::new();
        assert!(state.valid());

        state.value_missing = true;
        assert!(!state.valid());
        assert_eq!(state.validation_message(), "Please fill out this field.");
    }

    #[test]
    fn test_custom_validity() {
        let mut state = ValidityState::new();
        state.set_custom_validity("Custom error");
        assert!(!state.valid());
        assert_eq!(state.validation_message(), "Custom error");

        state.set_custom_validity("");
        assert!(state.valid());
    }

    #[test]
    fn test_required_missing_path() {
        let validity = VariableRule::new("author.name").required().check(&hash());
        assert!(validity.value_missing);

        let optional = VariableRule::new("author.name").min_length(3).check(&hash());
        assert!(optional.valid());
    }

    #[test]
    fn test_length_counts_chars_and_items() {
        assert!(VariableRule::new("title").min_length(3).check(&hash()).too_short);
        assert!(VariableRule::new("tags").max_length(2).check(&hash()).too_long);
        assert!(VariableRule::new("tags").min_length(3).check(&hash()).valid());
    }

    #[test]
    fn test_kinds() {
        assert!(VariableRule::new("email").email().check(&hash()).type_mismatch);
        assert!(VariableRule::new("site").url().check(&hash()).valid());
        assert!(VariableRule::new("title").url().check(&hash()).type_mismatch);
        assert!(VariableRule::new("count").number().check(&hash()).bad_input);
        assert!(VariableRule::new("tags").number().check(&hash()).type_mismatch);
    }

    #[test]
    fn test_url_parsing() {
        for bad in ["http://exa mple.com", "https://:::", "http://a b c", "wss://%%%", "mailto:a@b.c", "/relative"] {
            assert!(!is_valid_url(bad), "{bad} accepted");
        }
        for good in ["HTTPS://example.com", "wss://example.com:8443/graphql", "http://[::1]/"] {
            assert!(is_valid_url(good), "{good} rejected");
        }
    }

    #[test]
    fn test_range() {
        assert!(VariableRule::new("age").min(18.0).check(&hash()).range_underflow);
        assert!(VariableRule::new("age").max(10.0).check(&hash()).range_overflow);
        assert!(VariableRule::new("age").min(0.0).max(120.0).check(&hash()).valid());
    }

    #[test]
    fn test_custom_check() {
        fn no_b(value: &HashValue) -> Option<String> {
            let has_b = value
                .as_array()
                .is_some_and(|items| items.iter().any(|i| i.as_str() == Some("b")));
            has_b.then(|| "b is reserved".to_string())
        }

        let validity = VariableRule::new("tags").custom(no_b).check(&hash());
        assert!(validity.custom_error);
        assert_eq!(validity.validation_message(), "b is reserved");
    }

    #[test]
    fn test_validate_collects_failures() {
        let rules = vec![
            VariableRule::new("title").required(),
            VariableRule::new("email").email(),
            VariableRule::new("age").min(18.0),
        ];

        let errors = validate(&hash(), &rules).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.paths(), vec!["email", "age"]);
        assert_eq!(errors.to_string(), "2 variable(s) failed validation");
        assert!(validate(&hash(), &rules[..1]).is_ok());
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("ann@example.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ann@localhost"));
        assert!(!is_valid_email("ann@@example.com"));
    }
}
