use crate::error::Result;
use crate::schema::{OptionSchema, coerce};
use std::collections::BTreeMap;
use types::OptionValue;

static UNSET: OptionValue = OptionValue::Null;

/// Result of writing an option.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionChange {
    /// The stored value already equals the coerced value.
    Unchanged,
    Set {
        client_name: &'static str,
        value: OptionValue,
    },
    /// A previously set option was reset to `Null`.
    Cleared { client_name: &'static str },
}

/// Typed option storage of one widget, keyed by client option name.
#[derive(Debug, Clone)]
pub struct OptionBag {
    schema: &'static OptionSchema,
    values: BTreeMap<&'static str, OptionValue>,
}

impl OptionBag {
    pub const fn new(schema: &'static OptionSchema) -> Self {
        Self {
            schema,
            values: BTreeMap::new(),
        }
    }

    pub const fn schema(&self) -> &'static OptionSchema {
        self.schema
    }

    /// Coerce and store `value` under the option called `name`.
    ///
    /// # Errors
    ///
    /// `UnknownProperty` for an undeclared name, `TypeMismatch` when the
    /// value cannot be coerced to the declared type.
    pub fn set(
        &mut self,
        name: &str,
        value: impl Into<OptionValue>,
    ) -> Result<OptionChange> {
        let spec = self.schema.lookup(name)?;
        let value = coerce(spec, value.into())?;

        if value.is_null() {
            return Ok(self
                .values
                .remove(spec.client_name)
                .map_or(OptionChange::Unchanged, |_| OptionChange::Cleared {
                    client_name: spec.client_name,
                }));
        }

        if self.values.get(spec.client_name) == Some(&value) {
            return Ok(OptionChange::Unchanged);
        }

        self.values.insert(spec.client_name, value.clone());

        Ok(OptionChange::Set {
            client_name: spec.client_name,
            value,
        })
    }

    /// The stored value, or `Null` if the option was never set.
    ///
    /// # Errors
    ///
    /// `UnknownProperty` for an undeclared name.
    pub fn get(&self, name: &str) -> Result<&OptionValue> {
        let spec = self.schema.lookup(name)?;
        Ok(self.values.get(spec.client_name).unwrap_or(&UNSET))
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.schema
            .lookup(name)
            .is_ok_and(|spec| self.values.contains_key(spec.client_name))
    }

    /// Every set option, in the shape of a client initialization map.
    pub fn to_init_map(&self) -> BTreeMap<String, OptionValue> {
        self.values
            .iter()
            .map(|(name, value)| ((*name).to_string(), value.clone()))
            .collect()
    }
}
