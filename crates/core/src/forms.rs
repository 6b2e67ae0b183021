//! Descriptor-driven entity forms.
//!
//! Every add/edit dialog in the system is the same shape: a bag of field
//! values seeded from defaults or from the entity being edited, per-field
//! validation, and a submit that either creates or updates depending on
//! whether an id is being edited. [`EntityForm`] is that shape, driven by a
//! list of [`FieldDescriptor`]s supplied per entity type.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::errors::DomainError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    TextArea,
    Number { min: Option<f64>, max: Option<f64> },
    Integer { min: Option<i64>, max: Option<i64> },
    Date,
    Select { options: Vec<String> },
    Checkbox,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self { name: name.into(), label: label.into(), kind, required: false }
    }

    pub fn text(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Text)
    }

    pub fn text_area(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::TextArea)
    }

    pub fn number(name: impl Into<String>, label: impl Into<String>, min: Option<f64>) -> Self {
        Self::new(name, label, FieldKind::Number { min, max: None })
    }

    pub fn integer(
        name: impl Into<String>,
        label: impl Into<String>,
        min: Option<i64>,
        max: Option<i64>,
    ) -> Self {
        Self::new(name, label, FieldKind::Integer { min, max })
    }

    pub fn date(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Date)
    }

    pub fn select(name: impl Into<String>, label: impl Into<String>, options: &[&str]) -> Self {
        Self::new(
            name,
            label,
            FieldKind::Select { options: options.iter().map(|option| option.to_string()).collect() },
        )
    }

    pub fn checkbox(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Checkbox)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn default_value(&self) -> Value {
        match self.kind {
            FieldKind::Text | FieldKind::TextArea => Value::String(String::new()),
            FieldKind::Checkbox => Value::Bool(false),
            _ => Value::Null,
        }
    }

    fn validate(&self, value: Option<&Value>) -> Result<(), String> {
        let value = value.filter(|value| !is_blank(value));
        let Some(value) = value else {
            return if self.required {
                Err(format!("{} is required", self.label))
            } else {
                Ok(())
            };
        };

        match &self.kind {
            FieldKind::Text | FieldKind::TextArea => match value {
                Value::String(_) | Value::Number(_) => Ok(()),
                _ => Err(format!("{} must be text", self.label)),
            },
            FieldKind::Number { min, max } => {
                let number =
                    as_f64(value).ok_or_else(|| format!("{} must be a number", self.label))?;
                check_range(&self.label, number, *min, *max)
            }
            FieldKind::Integer { min, max } => {
                let number = as_i64(value)
                    .ok_or_else(|| format!("{} must be a whole number", self.label))?;
                check_range(&self.label, number, *min, *max)
            }
            FieldKind::Date => {
                let raw = value.as_str().unwrap_or_default();
                let date_part = raw.get(..10).unwrap_or(raw);
                NaiveDate::parse_from_str(date_part, DATE_FORMAT)
                    .map(|_| ())
                    .map_err(|_| format!("{} must be a date (YYYY-MM-DD)", self.label))
            }
            FieldKind::Select { options } => {
                let selected = match value {
                    Value::String(raw) => raw.clone(),
                    other => other.to_string(),
                };
                if options.is_empty() || options.iter().any(|option| *option == selected) {
                    Ok(())
                } else {
                    Err(format!("{} must be one of: {}", self.label, options.join(", ")))
                }
            }
            FieldKind::Checkbox => match value {
                Value::Bool(_) => Ok(()),
                _ => Err(format!("{} must be true or false", self.label)),
            },
        }
    }

    fn normalize(&self, value: &Value) -> Value {
        if is_blank(value) {
            return match self.kind {
                FieldKind::Text | FieldKind::TextArea => Value::String(String::new()),
                FieldKind::Checkbox => Value::Bool(false),
                _ => Value::Null,
            };
        }
        match self.kind {
            FieldKind::Number { .. } => as_f64(value)
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or_else(|| value.clone()),
            FieldKind::Integer { .. } => {
                as_i64(value).map(Value::from).unwrap_or_else(|| value.clone())
            }
            _ => value.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Submission {
    Create(Map<String, Value>),
    Update { id: i64, body: Map<String, Value> },
}

#[derive(Clone, Debug, PartialEq)]
pub struct EntityForm {
    fields: Vec<FieldDescriptor>,
    values: Map<String, Value>,
    editing_id: Option<i64>,
}

impl EntityForm {
    pub fn for_create(fields: Vec<FieldDescriptor>) -> Self {
        let values =
            fields.iter().map(|field| (field.name.clone(), field.default_value())).collect();
        Self { fields, values, editing_id: None }
    }

    /// Seeds the form from an existing entity. Fields the descriptors do not
    /// mention are carried through untouched so updates do not drop them.
    pub fn for_edit<T: Serialize>(
        fields: Vec<FieldDescriptor>,
        id: i64,
        entity: &T,
    ) -> Result<Self, DomainError> {
        let mut values = match serde_json::to_value(entity) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                return Err(DomainError::InvariantViolation(
                    "edited entity must serialize to an object".to_string(),
                ))
            }
            Err(error) => return Err(DomainError::InvariantViolation(error.to_string())),
        };
        for field in &fields {
            values.entry(field.name.clone()).or_insert_with(|| field.default_value());
        }
        Ok(Self { fields, values, editing_id: Some(id) })
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn editing_id(&self) -> Option<i64> {
        self.editing_id
    }

    pub fn is_editing(&self) -> bool {
        self.editing_id.is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), DomainError> {
        if !self.fields.iter().any(|field| field.name == name) {
            return Err(DomainError::UnknownField(name.to_string()));
        }
        self.values.insert(name.to_string(), value.into());
        Ok(())
    }

    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let errors: Vec<FieldError> = self
            .fields
            .iter()
            .filter_map(|field| {
                field
                    .validate(self.values.get(&field.name))
                    .err()
                    .map(|message| FieldError { field: field.name.clone(), message })
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn submission(&self) -> Result<Submission, DomainError> {
        self.validate().map_err(DomainError::FormInvalid)?;

        let mut body = self.values.clone();
        for field in &self.fields {
            if let Some(value) = body.get_mut(&field.name) {
                *value = field.normalize(value);
            }
        }

        Ok(match self.editing_id {
            Some(id) => Submission::Update { id, body },
            None => Submission::Create(body),
        })
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(raw) => raw.trim().is_empty(),
        _ => false,
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => raw.trim().parse::<f64>().ok().filter(|number| number.is_finite()),
        _ => None,
    }
}

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(raw) => raw.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn check_range<N>(label: &str, number: N, min: Option<N>, max: Option<N>) -> Result<(), String>
where
    N: PartialOrd + std::fmt::Display + Copy,
{
    if let Some(min) = min {
        if number < min {
            return Err(format!("{label} must be at least {min}"));
        }
    }
    if let Some(max) = max {
        if number > max {
            return Err(format!("{label} must be at most {max}"));
        }
    }
    Ok(())
}
