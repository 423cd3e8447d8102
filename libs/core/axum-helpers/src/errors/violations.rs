use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

/// One rejected property of a request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FieldViolation {
    /// Dotted path, e.g. `coordinates.latitude` or `images[2]`
    pub property: String,
    /// Value as submitted, `null` when absent
    #[schema(value_type = Object)]
    pub value: Value,
    pub messages: Vec<String>,
}

/// Flatten `validator` errors into a list sorted by property path.
///
/// `submitted` is the raw request JSON; it is walked alongside the error tree
/// so each violation reports exactly what the client sent.
pub fn field_violations(errors: &ValidationErrors, submitted: &Value) -> Vec<FieldViolation> {
    let mut out = Vec::new();
    collect("", errors, submitted, &mut out);
    out.sort_by(|a, b| a.property.cmp(&b.property));
    out
}

fn collect(prefix: &str, errors: &ValidationErrors, submitted: &Value, out: &mut Vec<FieldViolation>) {
    for (field, kind) in errors.errors() {
        let name: &str = field.as_ref();
        let property = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}.{name}")
        };
        let value = submitted.get(name).cloned().unwrap_or(Value::Null);

        match kind {
            ValidationErrorsKind::Field(errs) => out.push(FieldViolation {
                messages: errs.iter().map(|e| message_for(&property, e)).collect(),
                property,
                value,
            }),
            ValidationErrorsKind::Struct(nested) => collect(&property, nested, &value, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    let item = value.get(*index).cloned().unwrap_or(Value::Null);
                    collect(&format!("{property}[{index}]"), nested, &item, out);
                }
            }
        }
    }
}

/// Messages written relative to the property ("must be ...") get the
/// property name prefixed.
fn message_for(property: &str, error: &ValidationError) -> String {
    match &error.message {
        Some(message) if message.starts_with("must ") => format!("{property} {message}"),
        Some(message) => message.to_string(),
        None => format!("{property} failed the '{}' check", error.code),
    }
}
