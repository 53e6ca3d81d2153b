use super::{Delta, parse_delta};
use crate::behavior_any;
use crate::error::Result;
use crate::options::OptionBag;
use crate::schema::{COMMON_OPTIONS, OptionSchema, OptionSpec};
use crate::widget::{Widget, WidgetBehavior};
use types::OptionType;

static RESIZABLE_OPTIONS: OptionSchema = OptionSchema {
    widget: "resizable",
    specs: &[
        OptionSpec::new("AlsoResize", "alsoResize", OptionType::String),
        OptionSpec::new("AspectRatio", "aspectRatio", OptionType::Any),
        OptionSpec::new("AutoHide", "autoHide", OptionType::Bool),
        OptionSpec::new("Containment", "containment", OptionType::Any),
        OptionSpec::new("Grid", "grid", OptionType::Array),
        OptionSpec::new("Handles", "handles", OptionType::Any),
        OptionSpec::new("MaxHeight", "maxHeight", OptionType::Integer),
        OptionSpec::new("MaxWidth", "maxWidth", OptionType::Integer),
        OptionSpec::new("MinHeight", "minHeight", OptionType::Integer),
        OptionSpec::new("MinWidth", "minWidth", OptionType::Integer),
    ],
    parent: Some(&COMMON_OPTIONS),
};

/// Resize capability. `_ResizeData` reports the size change of the last
/// resize as `"dw,dh"`.
#[derive(Debug, Default)]
pub struct Resizable {
    delta: Option<Delta>,
}

impl Resizable {
    pub const fn new() -> Self {
        Self { delta: None }
    }

    pub fn delta(widget: &Widget) -> Option<Delta> {
        widget.behavior::<Self>().ok().and_then(|resize| resize.delta)
    }
}

impl WidgetBehavior for Resizable {
    fn schema(&self) -> &'static OptionSchema {
        &RESIZABLE_OPTIONS
    }

    fn internal_fields(&self) -> &'static [&'static str] {
        &["_ResizeData"]
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Page;
    use crate::widgets::{Dialog, Draggable};

    #[test]
    fn test_host_can_carry_several_capabilities() {
        let mut page = Page::new();
        page.add("panel", Dialog::new()).unwrap();
        page.attach("panel", Draggable::new()).unwrap();
        page.attach("panel", Resizable::new()).unwrap();

        page.apply_feedback("panel_resizable__ResizeData", "20,-10");
        assert_eq!(
            Resizable::delta(page.widget("panel_resizable").unwrap()),
            Some(Delta { x: 20.0, y: -10.0 })
        );
        assert_eq!(Draggable::delta(page.widget("panel_draggable").unwrap()), None);
        assert_eq!(
            page.ids().collect::<Vec<_>>(),
            ["panel", "panel_draggable", "panel_resizable"]
        );
    }
}
