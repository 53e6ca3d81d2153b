use crate::error::{Result, WidgetError};
use types::{OptionType, OptionValue};

/// Declaration of one widget option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSpec {
    /// Public name used by server code, e.g. `Min`.
    pub name: &'static str,
    /// Option name understood by the client widget, e.g. `min`.
    pub client_name: &'static str,
    pub ty: OptionType,
}

impl OptionSpec {
    pub const fn new(
        name: &'static str,
        client_name: &'static str,
        ty: OptionType,
    ) -> Self {
        Self {
            name,
            client_name,
            ty,
        }
    }
}

/// Static option table of a widget type.
///
/// Lookups that miss the local table are delegated to `parent`; a miss at
/// the root is an `UnknownProperty` error.
#[derive(Debug)]
pub struct OptionSchema {
    /// Client-side widget constructor, e.g. `slider`.
    pub widget: &'static str,
    pub specs: &'static [OptionSpec],
    pub parent: Option<&'static OptionSchema>,
}

/// Options every client widget understands.
pub static COMMON_OPTIONS: OptionSchema = OptionSchema {
    widget: "widget",
    specs: &[
        OptionSpec::new("Disabled", "disabled", OptionType::Bool),
        OptionSpec::new("Classes", "classes", OptionType::Object),
    ],
    parent: None,
};

impl OptionSchema {
    /// Resolve a public or client option name through the schema chain.
    ///
    /// # Errors
    ///
    /// `UnknownProperty` if no schema in the chain declares `name`.
    pub fn lookup(&self, name: &str) -> Result<&'static OptionSpec> {
        let mut schema = Some(self);

        while let Some(current) = schema {
            if let Some(spec) = current
                .specs
                .iter()
                .find(|spec| spec.name == name || spec.client_name == name)
            {
                return Ok(spec);
            }
            schema = current.parent;
        }

        Err(WidgetError::UnknownProperty {
            widget: self.widget,
            name: name.to_string(),
        })
    }
}

/// Coerce `value` to the declared type of `spec`.
///
/// `Null` passes for every type and means "unset".
///
/// # Errors
///
/// `TypeMismatch` when the value cannot be represented as the declared type.
#[allow(clippy::cast_precision_loss)]
pub fn coerce(spec: &OptionSpec, value: OptionValue) -> Result<OptionValue> {
    if value.is_null() || spec.ty == OptionType::Any {
        return Ok(value);
    }

    let found = value.kind();

    let coerced = match (spec.ty, value) {
        (OptionType::Bool, OptionValue::Bool(b)) => Some(OptionValue::Bool(b)),
        (OptionType::Bool, OptionValue::Integer(i)) => match i {
            0 => Some(OptionValue::Bool(false)),
            1 => Some(OptionValue::Bool(true)),
            _ => None,
        },
        (OptionType::Bool, OptionValue::String(s)) => {
            match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Some(OptionValue::Bool(true)),
                "false" | "0" => Some(OptionValue::Bool(false)),
                _ => None,
            }
        }
        (OptionType::Integer, OptionValue::Integer(i)) => {
            Some(OptionValue::Integer(i))
        }
        (OptionType::Integer, OptionValue::Float(f)) => float_to_integer(f),
        (OptionType::Integer, OptionValue::String(s)) => {
            s.trim().parse::<i64>().ok().map(OptionValue::Integer)
        }
        (OptionType::Float, OptionValue::Float(f)) if f.is_finite() => {
            Some(OptionValue::Float(f))
        }
        (OptionType::Float, OptionValue::Integer(i)) => {
            Some(OptionValue::Float(i as f64))
        }
        (OptionType::Float, OptionValue::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(OptionValue::Float),
        (OptionType::String, OptionValue::String(s)) => {
            Some(OptionValue::String(s))
        }
        (OptionType::String, OptionValue::Integer(i)) => {
            Some(OptionValue::String(i.to_string()))
        }
        (OptionType::String, OptionValue::Float(f)) if f.is_finite() => {
            Some(OptionValue::String(f.to_string()))
        }
        (OptionType::String, OptionValue::Bool(b)) => {
            Some(OptionValue::String(b.to_string()))
        }
        (OptionType::Array, v @ OptionValue::Array(_))
        | (OptionType::Object, v @ OptionValue::Object(_))
        | (OptionType::Reference, v @ OptionValue::Reference(_)) => Some(v),
        _ => None,
    };

    coerced.ok_or_else(|| WidgetError::TypeMismatch {
        name: spec.name.to_string(),
        expected: spec.ty.as_str(),
        found,
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn float_to_integer(f: f64) -> Option<OptionValue> {
    if f.is_finite()
        && f.fract() == 0.0
        && f >= i64::MIN as f64
        && f < i64::MAX as f64
    {
        Some(OptionValue::Integer(f as i64))
    } else {
        None
    }
}
