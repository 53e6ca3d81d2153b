//! Concrete widget behaviors.
//!
//! Each behavior declares its option schema and parses the feedback fields
//! its client widget reports back. Typed accessors are associated functions
//! taking the `Widget` (reads) or `WidgetMut` (writes).

pub mod accordion;
pub mod datepicker;
pub mod dialog;
pub mod draggable;
pub mod droppable;
pub mod progressbar;
pub mod resizable;
pub mod selectable;
pub mod slider;
pub mod sortable;
pub mod tabs;

pub use accordion::Accordion;
pub use datepicker::Datepicker;
pub use dialog::{Dialog, DialogButton};
pub use draggable::Draggable;
pub use droppable::Droppable;
pub use progressbar::Progressbar;
pub use resizable::Resizable;
pub use selectable::Selectable;
pub use slider::Slider;
pub use sortable::Sortable;
pub use tabs::Tabs;

use crate::error::{Result, WidgetError};

/// Offset reported by a drag or resize, replacing the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Delta {
    pub x: f64,
    pub y: f64,
}

/// Split a comma-joined id list. The empty string is the empty list.
pub(crate) fn split_list(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(',').map(|item| item.trim().to_string()).collect()
}

/// Parse `"dx,dy"`.
pub(crate) fn parse_delta(field: &str, raw: &str) -> Result<Delta> {
    let malformed = || {
        WidgetError::malformed(field, format!("expected \"dx,dy\", got {raw:?}"))
    };

    let (x, y) = raw.split_once(',').ok_or_else(malformed)?;
    let x = x.trim().parse::<f64>().map_err(|_| malformed())?;
    let y = y.trim().parse::<f64>().map_err(|_| malformed())?;

    if !x.is_finite() || !y.is_finite() {
        return Err(malformed());
    }

    Ok(Delta { x, y })
}

/// Parse an integer feedback value.
pub(crate) fn parse_integer(field: &str, raw: &str) -> Result<i64> {
    raw.trim().parse::<i64>().map_err(|_| {
        WidgetError::malformed(field, format!("{raw:?} is not an integer"))
    })
}
