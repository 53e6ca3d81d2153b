use super::parse_integer;
use crate::behavior_any;
use crate::error::Result;
use crate::options::OptionBag;
use crate::schema::{COMMON_OPTIONS, OptionSchema, OptionSpec};
use crate::widget::{Widget, WidgetBehavior};
use types::{OptionType, OptionValue};

static TABS_OPTIONS: OptionSchema = OptionSchema {
    widget: "tabs",
    specs: &[
        OptionSpec::new("Active", "active", OptionType::Integer),
        OptionSpec::new("Collapsible", "collapsible", OptionType::Bool),
        OptionSpec::new("Event", "event", OptionType::String),
        OptionSpec::new("HeightStyle", "heightStyle", OptionType::String),
        OptionSpec::new("Hide", "hide", OptionType::Any),
        OptionSpec::new("Show", "show", OptionType::Any),
    ],
    parent: Some(&COMMON_OPTIONS),
};

/// Tab strip. `_Active` reports the selected tab index.
#[derive(Debug, Default)]
pub struct Tabs;

impl Tabs {
    pub const fn new() -> Self {
        Self
    }

    pub fn active(widget: &Widget) -> Option<i64> {
        widget.option("Active").ok().and_then(OptionValue::as_i64)
    }
}

impl WidgetBehavior for Tabs {
    fn schema(&self) -> &'static OptionSchema {
        &TABS_OPTIONS
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
        let index = parse_integer(field, raw);
        options.set("Active", index.as_ref().ok().copied())?;
        index.map(|_| ())
    }

    behavior_any!();
}
