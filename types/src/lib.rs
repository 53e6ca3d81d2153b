// Wire types shared by the widget sync library, the reference client bridge
// and the HTTP service.
//
// Instructions flow server → client, feedback fields flow client → server.
// Both sides only ever exchange the types defined here.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

mod utils;

pub use utils::{feedback_key, json_to_option_value, option_value_to_json};

/// Form field naming the widget that raised the postback event.
pub const EVENT_TARGET_FIELD: &str = "_event_target";

/// Form field naming the event raised by `EVENT_TARGET_FIELD`.
pub const EVENT_FIELD: &str = "_event";

/// Separator between a widget id and an internal field name (without its
/// leading underscore) in a feedback key.
pub const FEEDBACK_SEPARATOR: &str = "__";

/// A single option value held by a widget model.
///
/// `Null` means "not set, do not transmit" and is distinct from any
/// meaningful empty value such as `String(String::new())` or `Array(vec![])`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum OptionValue {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Vec<OptionValue>),
    Object(BTreeMap<String, OptionValue>),
    /// Name of a client-side callback or object, resolved by the client.
    Reference(String),
}

impl OptionValue {
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::Reference(_) => "reference",
        }
    }

    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Self]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub const fn as_object(&self) -> Option<&BTreeMap<String, Self>> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for OptionValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl<T: Into<Self>> From<Vec<T>> for OptionValue {
    fn from(values: Vec<T>) -> Self {
        Self::Array(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Self>> From<Option<T>> for OptionValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl Serialize for OptionValue {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        option_value_to_json(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for OptionValue {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(json_to_option_value)
    }
}

/// Declared type of a widget option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionType {
    Bool,
    Integer,
    Float,
    String,
    Array,
    Object,
    Reference,
    Any,
}

impl OptionType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
            Self::Reference => "reference",
            Self::Any => "any",
        }
    }
}

/// Priority tier of an instruction.
///
/// Tiers are applied in declaration order: every `High` instruction of a
/// flush runs before any `Low` one, `Exclusive` after `Low`, and `Last`
/// after everything else.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Low,
    Exclusive,
    Last,
}

/// A client-bound command: call `operation(args...)` on the widget mounted
/// on DOM id `target`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub target: String,
    pub operation: String,
    pub args: Vec<OptionValue>,
    pub priority: Priority,
}

impl Instruction {
    /// `operation({...options})`: construct (or reconstruct) the widget.
    pub fn init(
        target: impl Into<String>,
        operation: impl Into<String>,
        options: BTreeMap<String, OptionValue>,
    ) -> Self {
        Self {
            target: target.into(),
            operation: operation.into(),
            args: vec![OptionValue::Object(options)],
            priority: Priority::High,
        }
    }

    /// `operation("option", name, value)`.
    pub fn option(
        target: impl Into<String>,
        operation: impl Into<String>,
        name: impl Into<String>,
        value: OptionValue,
        priority: Priority,
    ) -> Self {
        Self {
            target: target.into(),
            operation: operation.into(),
            args: vec![
                OptionValue::from("option"),
                OptionValue::String(name.into()),
                value,
            ],
            priority,
        }
    }

    /// `operation(method, args...)`, e.g. `dialog("open")`.
    pub fn method(
        target: impl Into<String>,
        operation: impl Into<String>,
        method: impl Into<String>,
        args: Vec<OptionValue>,
        priority: Priority,
    ) -> Self {
        let mut all = Vec::with_capacity(args.len() + 1);
        all.push(OptionValue::String(method.into()));
        all.extend(args);

        Self {
            target: target.into(),
            operation: operation.into(),
            args: all,
            priority,
        }
    }

    /// True when this instruction constructs the client widget.
    pub fn is_init(&self) -> bool {
        matches!(self.args.first(), Some(OptionValue::Object(_)))
    }

    /// The sub-operation, e.g. `"option"` or `"open"`.
    pub fn sub_operation(&self) -> Option<&str> {
        self.args.first().and_then(OptionValue::as_str)
    }

    /// For `option` instructions, the client option name.
    pub fn option_name(&self) -> Option<&str> {
        if self.sub_operation() == Some("option") {
            self.args.get(1).and_then(OptionValue::as_str)
        } else {
            None
        }
    }
}

/// Response payload of one request cycle.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InstructionBatch {
    pub instructions: Vec<Instruction>,
    /// Widget id → user-visible validation message.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub validation: BTreeMap<String, String>,
}
