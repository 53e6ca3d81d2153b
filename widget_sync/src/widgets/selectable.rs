use super::split_list;
use crate::behavior_any;
use crate::error::Result;
use crate::options::OptionBag;
use crate::schema::{COMMON_OPTIONS, OptionSchema, OptionSpec};
use crate::widget::{Widget, WidgetBehavior};
use types::OptionType;

static SELECTABLE_OPTIONS: OptionSchema = OptionSchema {
    widget: "selectable",
    specs: &[
        OptionSpec::new("AutoRefresh", "autoRefresh", OptionType::Bool),
        OptionSpec::new("Cancel", "cancel", OptionType::String),
        OptionSpec::new("Delay", "delay", OptionType::Integer),
        OptionSpec::new("Distance", "distance", OptionType::Integer),
        OptionSpec::new("Filter", "filter", OptionType::String),
        OptionSpec::new("Tolerance", "tolerance", OptionType::String),
    ],
    parent: Some(&COMMON_OPTIONS),
};

/// Lasso selection over child elements. `_SelectedItems` carries the
/// selected element ids.
#[derive(Debug, Default)]
pub struct Selectable {
    selected: Vec<String>,
}

impl Selectable {
    pub const fn new() -> Self {
        Self {
            selected: Vec::new(),
        }
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn selected_items(widget: &Widget) -> &[String] {
        widget.behavior::<Self>().map(Self::selected).unwrap_or_default()
    }
}

impl WidgetBehavior for Selectable {
    fn schema(&self) -> &'static OptionSchema {
        &SELECTABLE_OPTIONS
    }

    fn internal_fields(&self) -> &'static [&'static str] {
        &["_SelectedItems"]
    }

    fn apply_feedback(
        &mut self,
        _field: &str,
        raw: &str,
        _options: &mut OptionBag,
    ) -> Result<()> {
        self.selected = split_list(raw);
        Ok(())
    }

    behavior_any!();
}
