use super::split_list;
use crate::behavior_any;
use crate::error::Result;
use crate::options::OptionBag;
use crate::schema::{COMMON_OPTIONS, OptionSchema, OptionSpec};
use crate::widget::{Widget, WidgetBehavior};
use types::OptionType;

static SORTABLE_OPTIONS: OptionSchema = OptionSchema {
    widget: "sortable",
    specs: &[
        OptionSpec::new("Axis", "axis", OptionType::String),
        OptionSpec::new("Cancel", "cancel", OptionType::String),
        OptionSpec::new("ConnectWith", "connectWith", OptionType::String),
        OptionSpec::new("Containment", "containment", OptionType::Any),
        OptionSpec::new("Cursor", "cursor", OptionType::String),
        OptionSpec::new("Delay", "delay", OptionType::Integer),
        OptionSpec::new("Distance", "distance", OptionType::Integer),
        OptionSpec::new("DropOnEmpty", "dropOnEmpty", OptionType::Bool),
        OptionSpec::new("Grid", "grid", OptionType::Array),
        OptionSpec::new("Handle", "handle", OptionType::String),
        OptionSpec::new("Items", "items", OptionType::String),
        OptionSpec::new("Opacity", "opacity", OptionType::Float),
        OptionSpec::new("Placeholder", "placeholder", OptionType::String),
        OptionSpec::new("Revert", "revert", OptionType::Any),
        OptionSpec::new("Tolerance", "tolerance", OptionType::String),
    ],
    parent: Some(&COMMON_OPTIONS),
};

/// Sortable list. `_ItemArray` carries the current item ids in order.
#[derive(Debug, Default)]
pub struct Sortable {
    items: Vec<String>,
}

impl Sortable {
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Item ids in the order last reported by the client.
    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn item_order(widget: &Widget) -> &[String] {
        widget.behavior::<Self>().map(Self::items).unwrap_or_default()
    }
}

impl WidgetBehavior for Sortable {
    fn schema(&self) -> &'static OptionSchema {
        &SORTABLE_OPTIONS
    }

    fn internal_fields(&self) -> &'static [&'static str] {
        &["_ItemArray"]
    }

    fn apply_feedback(
        &mut self,
        _field: &str,
        raw: &str,
        _options: &mut OptionBag,
    ) -> Result<()> {
        self.items = split_list(raw);
        Ok(())
    }

    behavior_any!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Page;

    #[test]
    fn test_item_order_feedback() {
        let mut page = Page::new();
        page.add("list1", Sortable::new()).unwrap();

        page.apply_feedback("list1__ItemArray", "item3,item1,item2");
        assert_eq!(
            Sortable::item_order(page.widget("list1").unwrap()),
            ["item3", "item1", "item2"]
        );

        page.apply_feedback("list1__ItemArray", "");
        assert!(Sortable::item_order(page.widget("list1").unwrap()).is_empty());
    }

    #[test]
    fn test_item_order_does_not_emit_instructions() {
        let mut page = Page::new();
        page.add("list1", Sortable::new()).unwrap();
        page.flush();

        page.apply_feedback("list1__ItemArray", "b,a");
        assert!(page.flush().instructions.is_empty());
    }
}
