use crate::error::{Result, WidgetError};
use crate::options::{OptionBag, OptionChange};
use crate::queue::InstructionQueue;
use crate::schema::OptionSchema;
use std::any::Any;
use std::fmt;
use types::{Instruction, OptionValue, Priority};

/// Widget-type specific behavior: option schema plus feedback parsing.
///
/// Implementations keep whatever internal state the client reports back
/// (item order, drag deltas, clicked buttons) and write public state through
/// the `OptionBag` they are handed.
pub trait WidgetBehavior: Send + Sync + fmt::Debug + 'static {
    fn schema(&self) -> &'static OptionSchema;

    /// Client-side constructor name, e.g. `slider`.
    fn client_operation(&self) -> &'static str {
        self.schema().widget
    }

    /// Feedback fields this widget accepts, each with a leading underscore.
    fn internal_fields(&self) -> &'static [&'static str] {
        &[]
    }

    /// Apply one feedback value. Called only for names listed in
    /// `internal_fields`.
    ///
    /// # Errors
    ///
    /// `MalformedFeedback` when `raw` cannot be parsed; the implementation
    /// has already fallen back to its "no selection" state.
    fn apply_feedback(
        &mut self,
        _field: &str,
        _raw: &str,
        _options: &mut OptionBag,
    ) -> Result<()> {
        Ok(())
    }

    /// Capabilities attach to a host widget instead of owning a DOM node.
    fn is_capability(&self) -> bool {
        false
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Server-side model of one client widget.
#[derive(Debug)]
pub struct Widget {
    id: String,
    host: Option<String>,
    options: OptionBag,
    behavior: Box<dyn WidgetBehavior>,
    realized: bool,
    needs_render: bool,
    deferred: Vec<Instruction>,
}

impl Widget {
    pub(crate) fn new(
        id: String,
        host: Option<String>,
        behavior: Box<dyn WidgetBehavior>,
    ) -> Self {
        Self {
            id,
            host,
            options: OptionBag::new(behavior.schema()),
            behavior,
            realized: false,
            needs_render: true,
            deferred: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Host widget id for capabilities.
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// DOM id the client widget is mounted on.
    pub fn target(&self) -> &str {
        self.host.as_deref().unwrap_or(&self.id)
    }

    pub fn operation(&self) -> &'static str {
        self.behavior.client_operation()
    }

    pub const fn options(&self) -> &OptionBag {
        &self.options
    }

    /// # Errors
    ///
    /// `UnknownProperty` for an undeclared name.
    pub fn option(&self, name: &str) -> Result<&OptionValue> {
        self.options.get(name)
    }

    pub const fn is_realized(&self) -> bool {
        self.realized
    }

    pub const fn needs_render(&self) -> bool {
        self.needs_render
    }

    pub fn is_capability(&self) -> bool {
        self.behavior.is_capability()
    }

    /// Borrow the behavior as its concrete type.
    ///
    /// # Errors
    ///
    /// `WrongWidgetType` if the widget is not a `T`.
    pub fn behavior<T: WidgetBehavior>(&self) -> Result<&T> {
        self.behavior.as_any().downcast_ref::<T>().ok_or_else(|| {
            WidgetError::WrongWidgetType {
                id: self.id.clone(),
                expected: std::any::type_name::<T>(),
            }
        })
    }

    pub(crate) fn init_instruction(&self) -> Instruction {
        Instruction::init(
            self.target(),
            self.operation(),
            self.options.to_init_map(),
        )
    }

    /// Mark realized and hand back the instructions held until then.
    pub(crate) fn realize(&mut self) -> Vec<Instruction> {
        self.realized = true;
        self.needs_render = false;
        std::mem::take(&mut self.deferred)
    }

    pub(crate) fn mark_for_redraw(&mut self) {
        self.needs_render = true;
    }

    pub(crate) const fn is_live(&self) -> bool {
        self.realized && !self.needs_render
    }

    pub(crate) fn apply_feedback(&mut self, field: &str, raw: &str) -> Result<()> {
        if !self.behavior.internal_fields().contains(&field) {
            return Err(WidgetError::UnknownInternalField {
                widget: self.id.clone(),
                field: field.to_string(),
            });
        }

        self.behavior.apply_feedback(field, raw, &mut self.options)
    }
}

/// Mutable access to one widget together with the cycle's instruction
/// queue, so that writes are mirrored to the client.
pub struct WidgetMut<'a> {
    pub(crate) widget: &'a mut Widget,
    pub(crate) queue: &'a mut InstructionQueue,
}

impl WidgetMut<'_> {
    pub fn widget(&self) -> &Widget {
        self.widget
    }

    /// Set an option and schedule the matching client instruction.
    ///
    /// Nothing is queued for an unrealized widget or one awaiting a redraw:
    /// its initialization instruction carries the full option map. Clearing
    /// an option on a live widget schedules a redraw, since `Null` is never
    /// transmitted.
    ///
    /// # Errors
    ///
    /// `UnknownProperty` or `TypeMismatch`, leaving the stored value as is.
    pub fn set_option(
        &mut self,
        name: &str,
        value: impl Into<OptionValue>,
    ) -> Result<()> {
        let change = self.widget.options.set(name, value)?;

        match change {
            OptionChange::Unchanged => {}
            OptionChange::Set { client_name, value } => {
                if self.widget.is_live() {
                    self.queue.push_option(Instruction::option(
                        self.widget.target(),
                        self.widget.operation(),
                        client_name,
                        value,
                        Priority::Low,
                    ));
                }
            }
            OptionChange::Cleared { client_name } => {
                if self.widget.is_live() {
                    tracing::debug!(
                        "option {client_name} cleared on {}, redrawing",
                        self.widget.id
                    );
                    self.widget.mark_for_redraw();
                }
            }
        }

        Ok(())
    }

    /// Store an option without scheduling an instruction. Used when a
    /// method call already conveys the change to the client.
    ///
    /// # Errors
    ///
    /// `UnknownProperty` or `TypeMismatch`.
    pub fn store_option(
        &mut self,
        name: &str,
        value: impl Into<OptionValue>,
    ) -> Result<()> {
        self.widget.options.set(name, value).map(|_| ())
    }

    /// Schedule `operation(method, args...)` on the client widget, held
    /// back until the widget is (re)initialized if needed.
    pub fn call(
        &mut self,
        method: &str,
        args: Vec<OptionValue>,
        priority: Priority,
    ) {
        let instruction = Instruction::method(
            self.widget.target(),
            self.widget.operation(),
            method,
            args,
            priority,
        );

        if self.widget.is_live() {
            self.queue.push(instruction);
        } else {
            self.widget.deferred.push(instruction);
        }
    }

    pub fn mark_for_redraw(&mut self) {
        self.widget.mark_for_redraw();
    }

    /// # Errors
    ///
    /// `WrongWidgetType` if the widget is not a `T`.
    pub fn behavior_mut<T: WidgetBehavior>(&mut self) -> Result<&mut T> {
        let id = &self.widget.id;
        self.widget
            .behavior
            .as_any_mut()
            .downcast_mut::<T>()
            .ok_or_else(|| WidgetError::WrongWidgetType {
                id: id.clone(),
                expected: std::any::type_name::<T>(),
            })
    }
}
