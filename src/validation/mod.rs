//! Declarative payload validation.
//!
//! Entity schemas are rule-per-field tables ([`FieldRule`]) grouped into a
//! [`RuleSet`] and interpreted by a small generic engine over JSON payloads.
//! Keeping the rules as data means each module's schema can be read and
//! tested in isolation, without per-field code. Shared field templates live
//! in [`fields`]; each entity module owns its rule tables.

pub mod fields;

use rollbook_core::AppError;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use validator::ValidateEmail;

/// Validates a typed payload against a rule set, converting the first issue
/// into a validation error whose message is surfaced verbatim.
pub fn check<T: Serialize>(rule_set: &RuleSet, payload: &T) -> Result<(), AppError> {
    let value = serde_json::to_value(payload).map_err(AppError::internal)?;
    if let Some(issues) = rule_set.validate(&value) {
        return Err(AppError::validation(anyhow::anyhow!(
            "{}",
            issues[0].message
        )));
    }
    Ok(())
}

/// JSON type a field must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Array,
    Object,
}

impl FieldType {
    fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }
}

/// Named predicate a rule can reference, mirroring a registry of custom
/// validators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    Email,
    Date,
    ValidId,
}

impl Predicate {
    fn check(&self, value: &Value) -> bool {
        match self {
            Self::Email => value.as_str().is_some_and(|s| s.validate_email()),
            Self::Date => value
                .as_str()
                .is_some_and(|s| chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()),
            Self::ValidId => value
                .as_str()
                .is_some_and(|s| uuid::Uuid::parse_str(s).is_ok()),
        }
    }

    fn default_message(&self, label: &str) -> String {
        match self {
            Self::Email => format!("{label} must be a valid email"),
            Self::Date => format!("{label} must be a valid date (YYYY-MM-DD)"),
            Self::ValidId => format!("{label} must be a valid id"),
        }
    }
}

/// Bounds for string/array lengths or numeric values.
#[derive(Debug, Clone, Copy)]
pub struct Length {
    pub min: Option<u64>,
    pub max: Option<u64>,
}

/// A single field's validation rule.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    label: &'static str,
    required: bool,
    kind: Option<FieldType>,
    length: Option<Length>,
    one_of: Option<&'static [&'static str]>,
    predicate: Option<Predicate>,
    predicate_error: Option<&'static str>,
    items: Option<&'static [FieldRule]>,
}

impl FieldRule {
    pub const fn new(label: &'static str) -> Self {
        Self {
            label,
            required: false,
            kind: None,
            length: None,
            one_of: None,
            predicate: None,
            predicate_error: None,
            items: None,
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn kind(mut self, kind: FieldType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub const fn length(mut self, min: Option<u64>, max: Option<u64>) -> Self {
        self.length = Some(Length { min, max });
        self
    }

    pub const fn one_of(mut self, allowed: &'static [&'static str]) -> Self {
        self.one_of = Some(allowed);
        self
    }

    pub const fn predicate(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub const fn predicate_error(mut self, message: &'static str) -> Self {
        self.predicate_error = Some(message);
        self
    }

    /// Rules applied to every element of an array field.
    pub const fn items(mut self, items: &'static [FieldRule]) -> Self {
        self.items = Some(items);
        self
    }
}

/// A failed rule: the offending field and a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    fn new(field: &str, message: String) -> Self {
        Self {
            field: field.to_string(),
            message,
        }
    }
}

/// A named table of field rules for one operation's payload.
#[derive(Debug, Clone, Copy)]
pub struct RuleSet {
    pub name: &'static str,
    pub rules: &'static [FieldRule],
}

impl RuleSet {
    /// Validates `payload` against every rule, in table order. Returns
    /// `None` when the payload is valid; callers surface the first issue's
    /// message verbatim.
    pub fn validate(&self, payload: &Value) -> Option<Vec<ValidationIssue>> {
        let mut issues = Vec::new();
        apply_rules(self.rules, payload, &mut issues);
        if issues.is_empty() {
            None
        } else {
            debug!(
                rule_set = %self.name,
                issues = issues.len(),
                "Payload failed validation"
            );
            Some(issues)
        }
    }
}

fn apply_rules(rules: &[FieldRule], payload: &Value, issues: &mut Vec<ValidationIssue>) {
    for rule in rules {
        let value = payload.get(rule.label);
        match value {
            None | Some(Value::Null) => {
                if rule.required {
                    issues.push(ValidationIssue::new(
                        rule.label,
                        format!("{} is required", rule.label),
                    ));
                }
            }
            Some(value) => check_rule(rule, value, issues),
        }
    }
}

fn check_rule(rule: &FieldRule, value: &Value, issues: &mut Vec<ValidationIssue>) {
    if let Some(kind) = rule.kind
        && !kind.matches(value)
    {
        issues.push(ValidationIssue::new(
            rule.label,
            format!("{} must be a {}", rule.label, kind.name()),
        ));
        return;
    }

    if let Some(length) = rule.length
        && let Some(message) = check_length(rule.label, &length, value)
    {
        issues.push(ValidationIssue::new(rule.label, message));
    }

    if let Some(allowed) = rule.one_of
        && !value.as_str().is_some_and(|s| allowed.contains(&s))
    {
        issues.push(ValidationIssue::new(
            rule.label,
            format!("{} must be one of: {}", rule.label, allowed.join(", ")),
        ));
    }

    if let Some(predicate) = rule.predicate
        && !predicate.check(value)
    {
        let message = rule
            .predicate_error
            .map(str::to_string)
            .unwrap_or_else(|| predicate.default_message(rule.label));
        issues.push(ValidationIssue::new(rule.label, message));
    }

    if let Some(items) = rule.items
        && let Some(elements) = value.as_array()
    {
        for element in elements {
            if element.is_object() {
                apply_rules(items, element, issues);
            } else {
                issues.push(ValidationIssue::new(
                    rule.label,
                    format!("{} items must be objects", rule.label),
                ));
            }
        }
    }
}

fn check_length(label: &str, length: &Length, value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let chars = s.chars().count() as u64;
            if let Some(min) = length.min
                && chars < min
            {
                return Some(format!("{label} must be at least {min} characters"));
            }
            if let Some(max) = length.max
                && chars > max
            {
                return Some(format!("{label} must be at most {max} characters"));
            }
            None
        }
        Value::Number(n) => {
            let v = n.as_f64().unwrap_or(0.0);
            if let Some(min) = length.min
                && v < min as f64
            {
                return Some(format!("{label} must be at least {min}"));
            }
            if let Some(max) = length.max
                && v > max as f64
            {
                return Some(format!("{label} must be at most {max}"));
            }
            None
        }
        Value::Array(items) => {
            let len = items.len() as u64;
            if let Some(min) = length.min
                && len < min
            {
                return Some(format!("{label} must have at least {min} items"));
            }
            if let Some(max) = length.max
                && len > max
            {
                return Some(format!("{label} must have at most {max} items"));
            }
            None
        }
        _ => None,
    }
}
