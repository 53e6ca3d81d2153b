use super::{parse_integer, split_list};
use crate::behavior_any;
use crate::error::Result;
use crate::options::OptionBag;
use crate::schema::{COMMON_OPTIONS, OptionSchema, OptionSpec};
use crate::widget::{Widget, WidgetBehavior};
use types::{OptionType, OptionValue};

static SLIDER_OPTIONS: OptionSchema = OptionSchema {
    widget: "slider",
    specs: &[
        OptionSpec::new("Animate", "animate", OptionType::Any),
        OptionSpec::new("Max", "max", OptionType::Integer),
        OptionSpec::new("Min", "min", OptionType::Integer),
        OptionSpec::new("Orientation", "orientation", OptionType::String),
        OptionSpec::new("Range", "range", OptionType::Any),
        OptionSpec::new("Step", "step", OptionType::Integer),
        OptionSpec::new("Value", "value", OptionType::Integer),
        OptionSpec::new("Values", "values", OptionType::Array),
    ],
    parent: Some(&COMMON_OPTIONS),
};

/// Single-handle or range slider.
///
/// The client reports `_Value` for single sliders and `_Values` (comma
/// joined) for range sliders; both are written straight into the public
/// options.
#[derive(Debug, Default)]
pub struct Slider;

impl Slider {
    pub const fn new() -> Self {
        Self
    }

    pub fn value(widget: &Widget) -> Option<i64> {
        widget.option("Value").ok().and_then(OptionValue::as_i64)
    }

    pub fn values(widget: &Widget) -> Vec<i64> {
        widget
            .option("Values")
            .ok()
            .and_then(OptionValue::as_array)
            .map(|items| items.iter().filter_map(OptionValue::as_i64).collect())
            .unwrap_or_default()
    }
}

impl WidgetBehavior for Slider {
    fn schema(&self) -> &'static OptionSchema {
        &SLIDER_OPTIONS
    }

    fn internal_fields(&self) -> &'static [&'static str] {
        &["_Value", "_Values"]
    }

    fn apply_feedback(
        &mut self,
        field: &str,
        raw: &str,
        options: &mut OptionBag,
    ) -> Result<()> {
        match field {
            "_Value" => {
                let value = parse_integer(field, raw);
                options.set("Value", value.as_ref().ok().copied())?;
                value.map(|_| ())
            }
            "_Values" => {
                let values: Result<Vec<i64>> =
                    split_list(raw)
                        .iter()
                        .map(|item| parse_integer(field, item))
                        .collect();
                options.set("Values", values.as_ref().ok().cloned())?;
                values.map(|_| ())
            }
            _ => Ok(()),
        }
    }

    behavior_any!();
}
