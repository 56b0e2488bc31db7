//! Declarative field checks for JSON request bodies.
//!
//! Rules are evaluated in order and every failure is recorded in the errorMap
//! under `<base>.<field>`, so one response reports all bad fields at once.

use serde_json::Value;

use crate::api::ErrorMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Boolean,
}

impl FieldType {
    fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
        }
    }

    fn matches(&self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Number => value.is_number(),
            FieldType::Boolean => value.is_boolean(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub kind: FieldType,
    pub optional: bool,
    pub non_empty: bool,
    pub max_len: Option<usize>,
}

impl FieldRule {
    const fn of(kind: FieldType) -> Self {
        Self {
            kind,
            optional: false,
            non_empty: false,
            max_len: None,
        }
    }

    pub const fn string() -> Self {
        Self::of(FieldType::String)
    }

    pub const fn number() -> Self {
        Self::of(FieldType::Number)
    }

    pub const fn boolean() -> Self {
        Self::of(FieldType::Boolean)
    }

    pub const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Reject strings that are blank after trimming
    pub const fn non_empty(mut self) -> Self {
        self.non_empty = true;
        self
    }

    /// Upper bound in characters, not bytes, measured after trimming
    pub const fn max_len(mut self, max: usize) -> Self {
        self.max_len = Some(max);
        self
    }

    fn check(&self, field: &str, value: Option<&Value>) -> Option<String> {
        let value = match value {
            None | Some(Value::Null) => {
                return (!self.optional).then(|| format!("{} is required", field));
            }
            Some(value) => value,
        };

        if !self.kind.matches(value) {
            return Some(format!("{} must be {}", field, self.kind.as_str()));
        }

        if let Value::String(s) = value {
            if self.non_empty && s.trim().is_empty() {
                return Some(format!("{} cannot be empty", field));
            }
            if let Some(max) = self.max_len {
                if s.trim().chars().count() > max {
                    return Some(format!("{} must be at most {} characters", field, max));
                }
            }
        }

        None
    }
}

/// Check `body` against `schema`, recording failures under `<base>.<field>`.
///
/// Returns true when the body passed. Fields not named in the schema are ignored.
pub fn validate(body: &Value, schema: &[(&str, FieldRule)], errors: &mut ErrorMap, base: &str) -> bool {
    let Some(object) = body.as_object() else {
        errors.add_error(format!("{}.body", base), "Request body must be a JSON object");
        return false;
    };

    let mut valid = true;
    for (field, rule) in schema {
        if let Some(message) = rule.check(field, object.get(*field)) {
            errors.add_error(format!("{}.{}", base, field), message);
            valid = false;
        }
    }
    valid
}
