//! Validation gateway: sanitizes and validates raw request input before any
//! handler body runs, producing exactly one typed value per target slot.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::ApiError;

pub mod extract;
pub mod rules;
pub mod sanitize;

/// Field path mapped to the messages recorded for it, in order.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Where the raw input came from. Body input is sanitized before validation;
/// query and path parameters are validated as-is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    Body,
    Query,
    Params,
}

/// A payload type the gateway can produce from raw JSON input.
pub trait FromPayload: Sized {
    /// Array-valued fields exempt from blank-field sanitization: an empty
    /// array is a meaningful signal, unlike an empty scalar.
    const BULK_FIELDS: &'static [&'static str] = &[];

    fn from_payload(input: &Map<String, Value>) -> Result<Self, FieldErrors>;
}

/// Required mode: the input must validate.
pub fn validate_required<T: FromPayload>(
    target: Target,
    raw: &Map<String, Value>,
) -> Result<T, ApiError> {
    let sanitized;
    let input = match target {
        Target::Body => {
            sanitized = sanitize::sanitize(raw, T::BULK_FIELDS);
            &sanitized
        }
        Target::Query | Target::Params => raw,
    };

    T::from_payload(input)
        .map_err(|field_errors| ApiError::unprocessable_entity("Validation failed", field_errors))
}

/// Optional mode: an empty raw object skips validation entirely.
pub fn validate_optional<T: FromPayload>(
    target: Target,
    raw: &Map<String, Value>,
) -> Result<Option<T>, ApiError> {
    if raw.is_empty() {
        return Ok(None);
    }
    validate_required(target, raw).map(Some)
}

/// Object-shape combinator: applies per-field rules against one input object,
/// accumulating every error instead of stopping at the first.
pub struct ObjectShape<'a> {
    input: &'a Map<String, Value>,
    prefix: String,
    errors: FieldErrors,
}

impl<'a> ObjectShape<'a> {
    pub fn new(input: &'a Map<String, Value>) -> Self {
        Self {
            input,
            prefix: String::new(),
            errors: FieldErrors::new(),
        }
    }

    fn nested(input: &'a Map<String, Value>, prefix: String) -> Self {
        Self {
            input,
            prefix,
            errors: FieldErrors::new(),
        }
    }

    fn path(&self, field: &str) -> String {
        if self.prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", self.prefix, field)
        }
    }

    pub fn push_error(&mut self, field: &str, message: impl Into<String>) {
        let path = self.path(field);
        self.errors.entry(path).or_default().push(message.into());
    }

    /// Field must be present, non-null, and pass the rule.
    pub fn required<T>(
        &mut self,
        field: &str,
        rule: impl Fn(&Value) -> Result<T, String>,
    ) -> Option<T> {
        let input = self.input;
        match input.get(field) {
            None | Some(Value::Null) => {
                self.push_error(field, "Required");
                None
            }
            Some(value) => match rule(value) {
                Ok(parsed) => Some(parsed),
                Err(message) => {
                    self.push_error(field, message);
                    None
                }
            },
        }
    }

    /// Absent and null both mean "not supplied".
    pub fn optional<T>(
        &mut self,
        field: &str,
        rule: impl Fn(&Value) -> Result<T, String>,
    ) -> Option<T> {
        let input = self.input;
        match input.get(field) {
            None | Some(Value::Null) => None,
            Some(value) => match rule(value) {
                Ok(parsed) => Some(parsed),
                Err(message) => {
                    self.push_error(field, message);
                    None
                }
            },
        }
    }

    /// Required array of objects, validated item by item under indexed paths.
    pub fn required_array<T>(
        &mut self,
        field: &str,
        min: usize,
        min_message: &str,
        item: impl Fn(&mut ObjectShape<'a>) -> Option<T>,
    ) -> Option<Vec<T>> {
        let input = self.input;
        let value = match input.get(field) {
            None | Some(Value::Null) => {
                self.push_error(field, "Required");
                return None;
            }
            Some(value) => value,
        };
        self.validate_array(field, value, Some((min, min_message)), item)
    }

    /// Optional array of objects; absence leaves the field unconstrained.
    pub fn optional_array<T>(
        &mut self,
        field: &str,
        item: impl Fn(&mut ObjectShape<'a>) -> Option<T>,
    ) -> Option<Vec<T>> {
        let input = self.input;
        match input.get(field) {
            None | Some(Value::Null) => None,
            Some(value) => self.validate_array(field, value, None, item),
        }
    }

    fn validate_array<T>(
        &mut self,
        field: &str,
        value: &'a Value,
        min: Option<(usize, &str)>,
        item: impl Fn(&mut ObjectShape<'a>) -> Option<T>,
    ) -> Option<Vec<T>> {
        let Some(elements) = value.as_array() else {
            self.push_error(field, "Must be an array");
            return None;
        };

        if let Some((min, message)) = min {
            if elements.len() < min {
                self.push_error(field, message);
                return None;
            }
        }

        let base = self.path(field);
        let mut items = Vec::with_capacity(elements.len());
        let mut valid = true;

        for (index, element) in elements.iter().enumerate() {
            let item_path = format!("{}.{}", base, index);
            let Some(object) = element.as_object() else {
                self.errors
                    .entry(item_path)
                    .or_default()
                    .push("Must be an object".to_string());
                valid = false;
                continue;
            };

            let mut shape = ObjectShape::nested(object, item_path);
            let parsed = item(&mut shape);
            if shape.errors.is_empty() {
                match parsed {
                    Some(parsed) => items.push(parsed),
                    None => valid = false,
                }
            } else {
                for (path, messages) in shape.errors {
                    self.errors.entry(path).or_default().extend(messages);
                }
                valid = false;
            }
        }

        valid.then_some(items)
    }

    /// True while no field has recorded an error.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Succeeds only when no field recorded an error.
    pub fn finish(self) -> Result<(), FieldErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }

    pub fn into_errors(self) -> FieldErrors {
        self.errors
    }
}
