use crate::behavior_any;
use crate::schema::{COMMON_OPTIONS, OptionSchema, OptionSpec};
use crate::widget::{Widget, WidgetBehavior};
use types::{OptionType, OptionValue};

static PROGRESSBAR_OPTIONS: OptionSchema = OptionSchema {
    widget: "progressbar",
    specs: &[
        OptionSpec::new("Max", "max", OptionType::Integer),
        // An integer, or `false` for an indeterminate bar.
        OptionSpec::new("Value", "value", OptionType::Any),
    ],
    parent: Some(&COMMON_OPTIONS),
};

/// Display-only progress bar.
#[derive(Debug, Default)]
pub struct Progressbar;

impl Progressbar {
    pub const fn new() -> Self {
        Self
    }

    pub fn value(widget: &Widget) -> Option<i64> {
        widget.option("Value").ok().and_then(OptionValue::as_i64)
    }
}

impl WidgetBehavior for Progressbar {
    fn schema(&self) -> &'static OptionSchema {
        &PROGRESSBAR_OPTIONS
    }

    behavior_any!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FeedbackOutcome, Page};

    #[test]
    fn test_indeterminate_value() {
        let mut page = Page::new();
        page.add("bar", Progressbar::new()).unwrap();
        page.set_option("bar", "Value", false).unwrap();
        assert_eq!(Progressbar::value(page.widget("bar").unwrap()), None);

        page.set_option("bar", "Value", 40).unwrap();
        assert_eq!(Progressbar::value(page.widget("bar").unwrap()), Some(40));
    }

    #[test]
    fn test_rejects_feedback() {
        let mut page = Page::new();
        page.add("bar", Progressbar::new()).unwrap();
        assert!(matches!(
            page.apply_feedback("bar__Value", "10"),
            FeedbackOutcome::Rejected { .. }
        ));
    }
}
