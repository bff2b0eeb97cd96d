//! Declarative payload validation.
//!
//! A [`Schema`] runs every per-field check, collecting one [`FieldError`] per
//! violation, then appends the results of its cross-field refinements. Only the
//! final result is a success/failure boundary, so a caller always sees every
//! violation of a payload at once.
//!
//! Unknown keys are dropped from the validated output.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Number, Value};

use crate::error::{FieldError, ValidationError};
use crate::models::Fields;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_'+\-]+(\.[A-Za-z0-9_'+\-]+)*@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
        .unwrap_or_else(|e| panic!("invalid email pattern: {e}"))
});

/// What a single field must look like.
#[derive(Debug, Clone, Copy)]
pub enum Check {
    /// Required string of at least `min` characters.
    Text { min: usize },
    /// Required string shaped like an email address.
    Email,
    /// Required string among the given values.
    OneOf(&'static [&'static str]),
    /// Optional string among the given values.
    OptionalOneOf(&'static [&'static str]),
    /// Optional string of any length.
    OptionalText,
    /// Optional number; numeric strings are coerced and blank strings count as absent.
    OptionalNumber,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    pub check: Check,
    pub message: &'static str,
}

/// A rule over several validated fields, reported against `path`.
#[derive(Debug, Clone, Copy)]
pub struct Refinement {
    pub path: &'static str,
    pub message: &'static str,
    pub holds: fn(&Fields) -> bool,
}

#[derive(Debug, Clone)]
pub struct Schema {
    name: &'static str,
    fields: Vec<FieldRule>,
    refinements: Vec<Refinement>,
}

impl Schema {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
            refinements: Vec::new(),
        }
    }

    pub fn field(mut self, field: &'static str, check: Check, message: &'static str) -> Self {
        self.fields.push(FieldRule {
            field,
            check,
            message,
        });
        self
    }

    pub fn refine(mut self, path: &'static str, message: &'static str, holds: fn(&Fields) -> bool) -> Self {
        self.refinements.push(Refinement {
            path,
            message,
            holds,
        });
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Validate an untyped payload into the fields the schema declares.
    pub fn validate(&self, raw: &Value) -> Result<Fields, ValidationError> {
        let Some(input) = raw.as_object() else {
            return Err(ValidationError {
                errors: vec![FieldError {
                    path: String::new(),
                    message: "expected an object".to_string(),
                }],
            });
        };

        let mut output = Fields::new();
        let mut errors = Vec::new();

        for rule in &self.fields {
            match apply_check(rule, input.get(rule.field)) {
                Ok(Some(value)) => {
                    output.insert(rule.field.to_string(), value);
                }
                Ok(None) => {}
                Err(message) => errors.push(FieldError {
                    path: rule.field.to_string(),
                    message,
                }),
            }
        }

        for refinement in &self.refinements {
            if !(refinement.holds)(&output) {
                errors.push(FieldError {
                    path: refinement.path.to_string(),
                    message: refinement.message.to_string(),
                });
            }
        }

        if errors.is_empty() {
            Ok(output)
        } else {
            tracing::debug!(schema = self.name, violations = errors.len(), "payload rejected");
            Err(ValidationError { errors })
        }
    }
}

fn apply_check(rule: &FieldRule, value: Option<&Value>) -> Result<Option<Value>, String> {
    let present = value.filter(|v| !v.is_null());

    match rule.check {
        Check::Text { min } => {
            let text = require_str(present, rule)?;
            if text.chars().count() < min {
                return Err(rule.message.to_string());
            }
            Ok(Some(Value::String(text.to_string())))
        }
        Check::Email => {
            let text = require_str(present, rule)?;
            if !EMAIL_RE.is_match(text) {
                return Err(rule.message.to_string());
            }
            Ok(Some(Value::String(text.to_string())))
        }
        Check::OneOf(allowed) => {
            let text = require_str(present, rule)?;
            one_of(text, allowed, rule).map(Some)
        }
        Check::OptionalOneOf(allowed) => match present {
            None => Ok(None),
            Some(Value::String(text)) => one_of(text, allowed, rule).map(Some),
            Some(_) => Err(rule.message.to_string()),
        },
        Check::OptionalText => match present {
            None => Ok(None),
            Some(Value::String(text)) => Ok(Some(Value::String(text.clone()))),
            Some(_) => Err(rule.message.to_string()),
        },
        Check::OptionalNumber => match present {
            None => Ok(None),
            Some(Value::Number(n)) => Ok(Some(Value::Number(n.clone()))),
            Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
            Some(Value::String(text)) => coerce_number(text.trim())
                .map(|n| Some(Value::Number(n)))
                .ok_or_else(|| rule.message.to_string()),
            Some(_) => Err(rule.message.to_string()),
        },
    }
}

fn require_str<'a>(value: Option<&'a Value>, rule: &FieldRule) -> Result<&'a str, String> {
    match value {
        Some(Value::String(text)) => Ok(text),
        _ => Err(rule.message.to_string()),
    }
}

fn one_of(text: &str, allowed: &[&str], rule: &FieldRule) -> Result<Value, String> {
    if allowed.contains(&text) {
        Ok(Value::String(text.to_string()))
    } else {
        Err(rule.message.to_string())
    }
}

fn coerce_number(text: &str) -> Option<Number> {
    if let Ok(i) = text.parse::<i64>() {
        return Some(Number::from(i));
    }
    text.parse::<f64>().ok().and_then(Number::from_f64)
}

/// Whether a validated field holds something other than an empty string or zero.
pub fn is_truthy(fields: &Fields, field: &str) -> bool {
    match fields.get(field) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::Bool(b)) => *b,
        Some(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn contact_schema() -> Schema {
        Schema::new("contact")
            .field("name", Check::Text { min: 1 }, "name required")
            .field("email", Check::Email, "email invalid")
            .field("kind", Check::OneOf(&["parent", "staff"]), "kind invalid")
            .field("year", Check::OptionalNumber, "year invalid")
            .refine("year", "staff need a year", |f| {
                f.get("kind").and_then(|v| v.as_str()) != Some("staff") || is_truthy(f, "year")
            })
    }

    #[test]
    fn valid_payload_keeps_declared_fields_only() {
        let out = contact_schema()
            .validate(&json!({
                "name": "Aïchatou",
                "email": "a@x.ne",
                "kind": "parent",
                "extra": "dropped"
            }))
            .unwrap();
        assert_eq!(
            Value::Object(out),
            json!({ "name": "Aïchatou", "email": "a@x.ne", "kind": "parent" })
        );
    }

    #[test]
    fn every_violation_is_reported() {
        let err = contact_schema()
            .validate(&json!({ "name": "", "email": "not-an-email", "kind": "staff" }))
            .unwrap_err();
        let paths: Vec<&str> = err.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["name", "email", "year"]);
    }

    #[test]
    fn numeric_strings_are_coerced() {
        let out = contact_schema()
            .validate(&json!({ "name": "A", "email": "a@x.ne", "kind": "staff", "year": "2019" }))
            .unwrap();
        assert_eq!(out.get("year"), Some(&json!(2019)));
    }

    #[test]
    fn blank_number_counts_as_absent() {
        let err = contact_schema()
            .validate(&json!({ "name": "A", "email": "a@x.ne", "kind": "staff", "year": " " }))
            .unwrap_err();
        assert!(err.has_error_for("year"));
        assert_eq!(err.errors.len(), 1);
    }

    #[test]
    fn non_object_payload_is_rejected() {
        let err = contact_schema().validate(&json!(["name"])).unwrap_err();
        assert_eq!(err.errors[0].path, "");
    }

    #[test]
    fn wrong_primitive_kind_is_a_violation() {
        let err = contact_schema()
            .validate(&json!({ "name": 42, "email": "a@x.ne", "kind": "parent" }))
            .unwrap_err();
        assert!(err.has_error_for("name"));
    }
}
