//! Server-held widget models kept in sync with client-rendered widgets.
//!
//! A [`Page`] owns the widgets of one session. Writes to widget options are
//! turned into client instructions, queued per request cycle and flushed in
//! priority order as an [`InstructionBatch`](types::InstructionBatch).
//! Client-side state changes come back as feedback fields in the next
//! postback and are applied before any event handler runs.

pub mod bridge;
mod error;
mod feedback;
mod macros;
mod options;
mod page;
mod queue;
mod schema;
mod widget;
pub mod widgets;

pub use bridge::{BridgeState, ClientBridge, ClientWidgetLibrary, RecordingLibrary};
pub use error::{Result, WidgetError};
pub use feedback::{ClientEvent, Postback, PostbackBuilder};
pub use options::{OptionBag, OptionChange};
pub use page::{FeedbackOutcome, Handler, Page};
pub use queue::InstructionQueue;
pub use schema::{COMMON_OPTIONS, OptionSchema, OptionSpec, coerce};
pub use widget::{Widget, WidgetBehavior, WidgetMut};
