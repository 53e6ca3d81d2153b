use super::parse_integer;
use crate::behavior_any;
use crate::error::Result;
use crate::options::OptionBag;
use crate::schema::{COMMON_OPTIONS, OptionSchema, OptionSpec};
use crate::widget::{Widget, WidgetBehavior};
use types::{OptionType, OptionValue};

static ACCORDION_OPTIONS: OptionSchema = OptionSchema {
    widget: "accordion",
    specs: &[
        OptionSpec::new("Active", "active", OptionType::Any),
        OptionSpec::new("Animate", "animate", OptionType::Any),
        OptionSpec::new("Collapsible", "collapsible", OptionType::Bool),
        OptionSpec::new("Event", "event", OptionType::String),
        OptionSpec::new("Header", "header", OptionType::String),
        OptionSpec::new("HeightStyle", "heightStyle", OptionType::String),
        OptionSpec::new("Icons", "icons", OptionType::Object),
    ],
    parent: Some(&COMMON_OPTIONS),
};

/// Accordion. `_Active` reports the open panel index, or `false` when a
/// collapsible accordion has every panel closed.
#[derive(Debug, Default)]
pub struct Accordion;

impl Accordion {
    pub const fn new() -> Self {
        Self
    }

    /// Index of the open panel; `None` when all panels are collapsed.
    pub fn active(widget: &Widget) -> Option<i64> {
        widget.option("Active").ok().and_then(OptionValue::as_i64)
    }
}

impl WidgetBehavior for Accordion {
    fn schema(&self) -> &'static OptionSchema {
        &ACCORDION_OPTIONS
    }

    fn internal_fields(&self) -> &'static [&'static str] {
        &["_Active"]
    }

    fn apply_feedback(
        &mut self,
        field: &str,
        raw: &str,
        options: &mut OptionBag,
    ) -> Result<()> {
        if raw == "false" {
            options.set("Active", false)?;
            return Ok(());
        }

        let index = parse_integer(field, raw);
        options.set("Active", index.as_ref().ok().copied())?;
        index.map(|_| ())
    }

    behavior_any!();
}
