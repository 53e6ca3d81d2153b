use super::{Delta, parse_delta};
use crate::behavior_any;
use crate::error::Result;
use crate::options::OptionBag;
use crate::schema::{COMMON_OPTIONS, OptionSchema, OptionSpec};
use crate::widget::{Widget, WidgetBehavior};
use types::OptionType;

static DRAGGABLE_OPTIONS: OptionSchema = OptionSchema {
    widget: "draggable",
    specs: &[
        OptionSpec::new("Axis", "axis", OptionType::String),
        OptionSpec::new("Containment", "containment", OptionType::Any),
        OptionSpec::new("Cursor", "cursor", OptionType::String),
        OptionSpec::new("Grid", "grid", OptionType::Array),
        OptionSpec::new("Handle", "handle", OptionType::String),
        OptionSpec::new("Helper", "helper", OptionType::Any),
        OptionSpec::new("Opacity", "opacity", OptionType::Float),
        OptionSpec::new("Revert", "revert", OptionType::Any),
        OptionSpec::new("Scope", "scope", OptionType::String),
        OptionSpec::new("Snap", "snap", OptionType::Any),
        OptionSpec::new("ZIndex", "zIndex", OptionType::Integer),
    ],
    parent: Some(&COMMON_OPTIONS),
};

/// Drag capability. `_DragData` reports the offset of the last drag.
#[derive(Debug, Default)]
pub struct Draggable {
    delta: Option<Delta>,
}

impl Draggable {
    pub const fn new() -> Self {
        Self { delta: None }
    }

    pub fn delta(widget: &Widget) -> Option<Delta> {
        widget.behavior::<Self>().ok().and_then(|drag| drag.delta)
    }
}

impl WidgetBehavior for Draggable {
    fn schema(&self) -> &'static OptionSchema {
        &DRAGGABLE_OPTIONS
    }

    fn internal_fields(&self) -> &'static [&'static str] {
        &["_DragData"]
    }

    fn apply_feedback(
        &mut self,
        field: &str,
        raw: &str,
        _options: &mut OptionBag,
    ) -> Result<()> {
        let delta = parse_delta(field, raw);
        self.delta = delta.as_ref().ok().copied();
        delta.map(|_| ())
    }

    fn is_capability(&self) -> bool {
        true
    }

    behavior_any!();
}
