use crate::behavior_any;
use crate::error::Result;
use crate::options::OptionBag;
use crate::schema::{COMMON_OPTIONS, OptionSchema, OptionSpec};
use crate::widget::{Widget, WidgetBehavior};
use types::OptionType;

static DROPPABLE_OPTIONS: OptionSchema = OptionSchema {
    widget: "droppable",
    specs: &[
        OptionSpec::new("Accept", "accept", OptionType::String),
        OptionSpec::new("ActiveClass", "activeClass", OptionType::String),
        OptionSpec::new("Greedy", "greedy", OptionType::Bool),
        OptionSpec::new("HoverClass", "hoverClass", OptionType::String),
        OptionSpec::new("Scope", "scope", OptionType::String),
        OptionSpec::new("Tolerance", "tolerance", OptionType::String),
    ],
    parent: Some(&COMMON_OPTIONS),
};

/// Drop-target capability. `_DroppedId` names the element dropped last.
#[derive(Debug, Default)]
pub struct Droppable {
    dropped_id: Option<String>,
}

impl Droppable {
    pub const fn new() -> Self {
        Self { dropped_id: None }
    }

    pub fn dropped_id(widget: &Widget) -> Option<&str> {
        widget
            .behavior::<Self>()
            .ok()
            .and_then(|drop| drop.dropped_id.as_deref())
    }
}

impl WidgetBehavior for Droppable {
    fn schema(&self) -> &'static OptionSchema {
        &DROPPABLE_OPTIONS
    }

    fn internal_fields(&self) -> &'static [&'static str] {
        &["_DroppedId"]
    }

    fn apply_feedback(
        &mut self,
        _field: &str,
        raw: &str,
        _options: &mut OptionBag,
    ) -> Result<()> {
        self.dropped_id = Some(raw.trim())
            .filter(|id| !id.is_empty())
            .map(ToString::to_string);
        Ok(())
    }

    fn is_capability(&self) -> bool {
        true
    }

    behavior_any!();
}
