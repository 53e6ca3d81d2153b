use crate::behavior_any;
use crate::error::{Result, WidgetError};
use crate::options::OptionBag;
use crate::schema::{COMMON_OPTIONS, OptionSchema, OptionSpec};
use crate::widget::{Widget, WidgetBehavior, WidgetMut};
use std::collections::BTreeMap;
use types::{OptionType, OptionValue, Priority};

/// Client callback posting `_ClickedButton` and raising `buttonclick`.
pub const BUTTON_CLICK_CALLBACK: &str = "widgetSync.dialogButtonClick";

/// Client callback closing the dialog without a round trip.
pub const CLOSE_CALLBACK: &str = "widgetSync.dialogClose";

/// Event raised when a dialog button that posts back is clicked.
pub const BUTTON_CLICK_EVENT: &str = "buttonclick";

static DIALOG_OPTIONS: OptionSchema = OptionSchema {
    widget: "dialog",
    specs: &[
        OptionSpec::new("AppendTo", "appendTo", OptionType::String),
        OptionSpec::new("AutoOpen", "autoOpen", OptionType::Bool),
        OptionSpec::new("Buttons", "buttons", OptionType::Array),
        OptionSpec::new("CloseOnEscape", "closeOnEscape", OptionType::Bool),
        OptionSpec::new("CloseText", "closeText", OptionType::String),
        OptionSpec::new("DialogClass", "dialogClass", OptionType::String),
        OptionSpec::new("Draggable", "draggable", OptionType::Bool),
        OptionSpec::new("Height", "height", OptionType::Any),
        OptionSpec::new("Hide", "hide", OptionType::Any),
        OptionSpec::new("MaxHeight", "maxHeight", OptionType::Integer),
        OptionSpec::new("MaxWidth", "maxWidth", OptionType::Integer),
        OptionSpec::new("MinHeight", "minHeight", OptionType::Integer),
        OptionSpec::new("MinWidth", "minWidth", OptionType::Integer),
        OptionSpec::new("Modal", "modal", OptionType::Bool),
        OptionSpec::new("Position", "position", OptionType::Any),
        OptionSpec::new("Resizable", "resizable", OptionType::Bool),
        OptionSpec::new("Show", "show", OptionType::Any),
        OptionSpec::new("Title", "title", OptionType::String),
        OptionSpec::new("Width", "width", OptionType::Any),
    ],
    parent: Some(&COMMON_OPTIONS),
};

/// A button in the dialog's button pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogButton {
    pub id: String,
    pub label: String,
    pub primary: bool,
    /// Close the dialog on the client instead of posting back.
    pub closes: bool,
}

impl DialogButton {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            primary: false,
            closes: false,
        }
    }

    #[must_use]
    pub const fn primary(mut self) -> Self {
        self.primary = true;
        self
    }

    #[must_use]
    pub const fn closes(mut self) -> Self {
        self.closes = true;
        self
    }

    fn to_option_value(&self) -> OptionValue {
        let mut map = BTreeMap::new();
        map.insert("id".to_string(), OptionValue::from(self.id.as_str()));
        map.insert("text".to_string(), OptionValue::from(self.label.as_str()));
        if self.primary {
            map.insert(
                "class".to_string(),
                OptionValue::from("ui-priority-primary"),
            );
        }
        let callback = if self.closes {
            CLOSE_CALLBACK
        } else {
            BUTTON_CLICK_CALLBACK
        };
        map.insert(
            "click".to_string(),
            OptionValue::Reference(callback.to_string()),
        );
        OptionValue::Object(map)
    }
}

/// Modal or modeless dialog with tracked buttons.
#[derive(Debug, Default)]
pub struct Dialog {
    buttons: Vec<DialogButton>,
    clicked_button: Option<String>,
    is_open: bool,
}

impl Dialog {
    pub const fn new() -> Self {
        Self {
            buttons: Vec::new(),
            clicked_button: None,
            is_open: false,
        }
    }

    pub fn buttons(&self) -> &[DialogButton] {
        &self.buttons
    }

    /// Id of the button whose click raised the current event.
    pub fn clicked_button(widget: &Widget) -> Option<&str> {
        widget
            .behavior::<Self>()
            .ok()
            .and_then(|dialog| dialog.clicked_button.as_deref())
    }

    pub fn is_open(widget: &Widget) -> bool {
        widget.behavior::<Self>().is_ok_and(|dialog| dialog.is_open)
    }

    fn sync_buttons(widget: &mut WidgetMut<'_>) -> Result<()> {
        let value = OptionValue::Array(
            widget
                .behavior_mut::<Self>()?
                .buttons
                .iter()
                .map(DialogButton::to_option_value)
                .collect(),
        );
        widget.set_option("Buttons", value)
    }

    /// Add a button, replacing one with the same id.
    ///
    /// # Errors
    ///
    /// `WrongWidgetType` if the widget is not a dialog.
    pub fn add_button(widget: &mut WidgetMut<'_>, button: DialogButton) -> Result<()> {
        let dialog = widget.behavior_mut::<Self>()?;
        match dialog.buttons.iter_mut().find(|b| b.id == button.id) {
            Some(existing) => *existing = button,
            None => dialog.buttons.push(button),
        }
        Self::sync_buttons(widget)
    }

    /// # Errors
    ///
    /// `WrongWidgetType` if the widget is not a dialog.
    pub fn remove_button(widget: &mut WidgetMut<'_>, id: &str) -> Result<()> {
        widget.behavior_mut::<Self>()?.buttons.retain(|b| b.id != id);
        Self::sync_buttons(widget)
    }

    /// # Errors
    ///
    /// `WrongWidgetType` if the widget is not a dialog.
    pub fn open(widget: &mut WidgetMut<'_>) -> Result<()> {
        widget.behavior_mut::<Self>()?.is_open = true;
        widget.store_option("AutoOpen", true)?;
        widget.call("open", vec![], Priority::Low);
        Ok(())
    }

    /// Close the dialog after every other instruction of the cycle.
    ///
    /// # Errors
    ///
    /// `WrongWidgetType` if the widget is not a dialog.
    pub fn close(widget: &mut WidgetMut<'_>) -> Result<()> {
        widget.behavior_mut::<Self>()?.is_open = false;
        widget.store_option("AutoOpen", false)?;
        widget.call("close", vec![], Priority::Last);
        Ok(())
    }
}

impl WidgetBehavior for Dialog {
    fn schema(&self) -> &'static OptionSchema {
        &DIALOG_OPTIONS
    }

    fn internal_fields(&self) -> &'static [&'static str] {
        &["_ClickedButton", "_IsOpen"]
    }

    fn apply_feedback(
        &mut self,
        field: &str,
        raw: &str,
        options: &mut OptionBag,
    ) -> Result<()> {
        match field {
            "_ClickedButton" => {
                self.clicked_button = None;
                if raw.is_empty() {
                    return Ok(());
                }
                if !self.buttons.iter().any(|b| b.id == raw) {
                    return Err(WidgetError::malformed(
                        field,
                        format!("no button with id {raw:?}"),
                    ));
                }
                self.clicked_button = Some(raw.to_string());
                Ok(())
            }
            "_IsOpen" => {
                let is_open = match raw {
                    "1" | "true" => true,
                    "0" | "false" | "" => false,
                    _ => {
                        return Err(WidgetError::malformed(
                            field,
                            format!("{raw:?} is not a boolean"),
                        ));
                    }
                };
                self.is_open = is_open;
                options.set("AutoOpen", is_open)?;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    behavior_any!();
}
