use crate::error::{Result, WidgetError};
use crate::feedback::{ClientEvent, Postback};
use crate::queue::InstructionQueue;
use crate::widget::{Widget, WidgetBehavior, WidgetMut};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use types::{
    FEEDBACK_SEPARATOR, Instruction, InstructionBatch, OptionValue, Priority,
};

/// Event handler registered on a widget.
///
/// Handlers run after all feedback of the round trip has been applied, so
/// they observe post-update state.
pub type Handler =
    Arc<dyn Fn(&mut Page, &ClientEvent) -> Result<()> + Send + Sync>;

/// What happened to one feedback field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackOutcome {
    Applied { widget: String, field: String },
    /// The widget id is no longer registered.
    Stale { widget: String },
    /// The key lacks the internal marker or names an undeclared field.
    Rejected { key: String },
    /// The payload could not be parsed; the widget fell back to its empty
    /// state and a validation message was recorded.
    Malformed { widget: String, message: String },
}

enum KeyResolution {
    Widget { id: String, field: String },
    Stale(String),
    Unmarked,
}

/// Session-scoped widget registry and request cycle.
///
/// A page owns its widgets, the instruction queue of the current cycle and
/// the handlers bound to widget events. It is not designed for concurrent
/// mutation; callers serialize requests per session.
#[derive(Default)]
pub struct Page {
    widgets: HashMap<String, Widget>,
    order: Vec<String>,
    queue: InstructionQueue,
    handlers: HashMap<(String, String), Vec<Handler>>,
    validation: BTreeMap<String, String>,
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("widgets", &self.order)
            .field("queued", &self.queue.len())
            .field("handlers", &self.handlers.len())
            .finish_non_exhaustive()
    }
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a widget.
    ///
    /// # Errors
    ///
    /// `InvalidWidgetId` for an empty id or one containing the feedback
    /// separator, `DuplicateWidget` if the id is taken, and
    /// `DetachedCapability` for capability behaviors (use `attach`).
    pub fn add(
        &mut self,
        id: &str,
        behavior: impl WidgetBehavior,
    ) -> Result<WidgetMut<'_>> {
        if behavior.is_capability() {
            return Err(WidgetError::DetachedCapability(id.to_string()));
        }
        self.insert(id.to_string(), None, Box::new(behavior))
    }

    /// Attach a capability (draggable, droppable, resizable) to `host`.
    /// The capability is registered as `host + "_" + operation`.
    ///
    /// # Errors
    ///
    /// `UnknownWidget` if the host is missing, `NotACapabilityHost` if the
    /// host is itself a capability, `DuplicateWidget` if the host already
    /// has this capability.
    pub fn attach(
        &mut self,
        host: &str,
        capability: impl WidgetBehavior,
    ) -> Result<WidgetMut<'_>> {
        let host_widget = self
            .widgets
            .get(host)
            .ok_or_else(|| WidgetError::UnknownWidget(host.to_string()))?;

        if host_widget.is_capability() || !capability.is_capability() {
            return Err(WidgetError::NotACapabilityHost(host.to_string()));
        }

        let id = format!("{host}_{}", capability.client_operation());
        self.insert(id, Some(host.to_string()), Box::new(capability))
    }

    fn insert(
        &mut self,
        id: String,
        host: Option<String>,
        behavior: Box<dyn WidgetBehavior>,
    ) -> Result<WidgetMut<'_>> {
        if id.is_empty() || id.contains(FEEDBACK_SEPARATOR) {
            return Err(WidgetError::InvalidWidgetId(id));
        }
        if self.widgets.contains_key(&id) {
            return Err(WidgetError::DuplicateWidget(id));
        }

        let target = host.as_deref().unwrap_or(&id);
        let operation = behavior.client_operation();

        // A widget of the same kind removed earlier in this cycle must be
        // torn down before the new one is initialized on the same node.
        let pending_destroy =
            self.queue.discard(target, operation, |i| {
                i.sub_operation() == Some("destroy")
            }) > 0;
        if pending_destroy {
            tracing::debug!("restarting {operation} on {target}");
            self.queue.discard(target, operation, |_| true);
            self.queue.push(Instruction::method(
                target,
                operation,
                "destroy",
                vec![],
                Priority::High,
            ));
        }

        tracing::debug!("adding widget {id}");

        self.order.push(id.clone());
        let widget = self
            .widgets
            .entry(id.clone())
            .or_insert_with(|| Widget::new(id, host, behavior));

        Ok(WidgetMut {
            widget,
            queue: &mut self.queue,
        })
    }

    /// Remove a widget and every capability attached to it.
    ///
    /// Realized widgets get a `destroy` instruction at `Last` priority.
    /// Instructions already queued for them this cycle stay queued, unless
    /// a widget of the same kind is added under the same DOM id before the
    /// flush: the old widget is then destroyed ahead of the new init.
    ///
    /// # Errors
    ///
    /// `UnknownWidget` if `id` is not registered.
    pub fn remove(&mut self, id: &str) -> Result<()> {
        if !self.widgets.contains_key(id) {
            return Err(WidgetError::UnknownWidget(id.to_string()));
        }

        let mut doomed: Vec<String> = self
            .order
            .iter()
            .filter(|other| {
                self.widgets
                    .get(other.as_str())
                    .is_some_and(|w| w.host() == Some(id))
            })
            .cloned()
            .collect();
        doomed.push(id.to_string());

        for doomed_id in &doomed {
            if let Some(widget) = self.widgets.remove(doomed_id) {
                if widget.is_realized() {
                    self.queue.push(Instruction::method(
                        widget.target(),
                        widget.operation(),
                        "destroy",
                        vec![],
                        Priority::Last,
                    ));
                }
            }
            self.validation.remove(doomed_id);
            self.handlers.retain(|(target, _), _| target != doomed_id);
            tracing::debug!("removed widget {doomed_id}");
        }

        self.order.retain(|other| !doomed.contains(other));

        Ok(())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.widgets.contains_key(id)
    }

    /// Widget ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// # Errors
    ///
    /// `UnknownWidget` if `id` is not registered.
    pub fn widget(&self, id: &str) -> Result<&Widget> {
        self.widgets
            .get(id)
            .ok_or_else(|| WidgetError::UnknownWidget(id.to_string()))
    }

    /// # Errors
    ///
    /// `UnknownWidget` if `id` is not registered.
    pub fn widget_mut(&mut self, id: &str) -> Result<WidgetMut<'_>> {
        let widget = self
            .widgets
            .get_mut(id)
            .ok_or_else(|| WidgetError::UnknownWidget(id.to_string()))?;

        Ok(WidgetMut {
            widget,
            queue: &mut self.queue,
        })
    }

    /// Borrow the behavior of `id` as its concrete type.
    ///
    /// # Errors
    ///
    /// `UnknownWidget` or `WrongWidgetType`.
    pub fn behavior<T: WidgetBehavior>(&self, id: &str) -> Result<&T> {
        self.widget(id)?.behavior::<T>()
    }

    /// # Errors
    ///
    /// `UnknownWidget`, `UnknownProperty` or `TypeMismatch`.
    pub fn set_option(
        &mut self,
        id: &str,
        name: &str,
        value: impl Into<OptionValue>,
    ) -> Result<()> {
        self.widget_mut(id)?.set_option(name, value)
    }

    /// # Errors
    ///
    /// `UnknownWidget` or `UnknownProperty`.
    pub fn get_option(&self, id: &str, name: &str) -> Result<&OptionValue> {
        self.widget(id)?.option(name)
    }

    /// # Errors
    ///
    /// `UnknownWidget` if `id` is not registered.
    pub fn call(
        &mut self,
        id: &str,
        method: &str,
        args: Vec<OptionValue>,
        priority: Priority,
    ) -> Result<()> {
        self.widget_mut(id)?.call(method, args, priority);
        Ok(())
    }

    /// Schedule a full re-initialization of `id` and its capabilities.
    ///
    /// # Errors
    ///
    /// `UnknownWidget` if `id` is not registered.
    pub fn mark_for_redraw(&mut self, id: &str) -> Result<()> {
        if !self.widgets.contains_key(id) {
            return Err(WidgetError::UnknownWidget(id.to_string()));
        }

        for widget in self.widgets.values_mut() {
            if widget.id() == id || widget.host() == Some(id) {
                widget.mark_for_redraw();
            }
        }

        Ok(())
    }

    /// Bind `handler` to `event` raised by widget `id`.
    ///
    /// # Errors
    ///
    /// `UnknownWidget` if `id` is not registered.
    pub fn on<F>(&mut self, id: &str, event: &str, handler: F) -> Result<()>
    where
        F: Fn(&mut Self, &ClientEvent) -> Result<()> + Send + Sync + 'static,
    {
        if !self.widgets.contains_key(id) {
            return Err(WidgetError::UnknownWidget(id.to_string()));
        }

        self.handlers
            .entry((id.to_string(), event.to_string()))
            .or_default()
            .push(Arc::new(handler));

        Ok(())
    }

    /// Validation message recorded for `id` during the current cycle.
    pub fn validation_error(&self, id: &str) -> Option<&str> {
        self.validation.get(id).map(String::as_str)
    }

    fn resolve_feedback_key(&self, key: &str) -> KeyResolution {
        let owner = self
            .order
            .iter()
            .filter(|id| {
                key.strip_prefix(id.as_str())
                    .and_then(|rest| rest.strip_prefix(FEEDBACK_SEPARATOR))
                    .is_some_and(|field| !field.is_empty())
            })
            .max_by_key(|id| id.len());

        if let Some(id) = owner {
            let field = &key[id.len() + FEEDBACK_SEPARATOR.len()..];
            return KeyResolution::Widget {
                id: id.clone(),
                field: format!("_{field}"),
            };
        }

        match key.split_once(FEEDBACK_SEPARATOR) {
            Some((id, _)) if !id.is_empty() && !self.widgets.contains_key(id) => {
                KeyResolution::Stale(id.to_string())
            }
            _ => KeyResolution::Unmarked,
        }
    }

    /// Apply one feedback field to the widget model.
    ///
    /// Never fails the request: stale ids and unmarked keys are dropped with
    /// a warning, malformed payloads become validation messages.
    pub fn apply_feedback(&mut self, key: &str, value: &str) -> FeedbackOutcome {
        let (id, field) = match self.resolve_feedback_key(key) {
            KeyResolution::Widget { id, field } => (id, field),
            KeyResolution::Stale(widget) => {
                tracing::warn!("dropping feedback {key} for stale widget {widget}");
                return FeedbackOutcome::Stale { widget };
            }
            KeyResolution::Unmarked => {
                tracing::warn!("rejecting {key}: not an internal feedback field");
                return FeedbackOutcome::Rejected {
                    key: key.to_string(),
                };
            }
        };

        let Some(widget) = self.widgets.get_mut(&id) else {
            return FeedbackOutcome::Stale { widget: id };
        };

        match widget.apply_feedback(&field, value) {
            Ok(()) => {
                self.validation.remove(&id);
                FeedbackOutcome::Applied { widget: id, field }
            }
            Err(WidgetError::MalformedFeedback { reason, .. }) => {
                tracing::warn!("malformed feedback {key}: {reason}");
                self.validation.insert(id.clone(), reason.clone());
                FeedbackOutcome::Malformed {
                    widget: id,
                    message: reason,
                }
            }
            Err(e) => {
                tracing::warn!("rejecting {key}: {e}");
                FeedbackOutcome::Rejected {
                    key: key.to_string(),
                }
            }
        }
    }

    /// Run the handlers bound to `event`.
    ///
    /// # Errors
    ///
    /// The first error returned by a handler.
    pub fn dispatch_event(&mut self, event: &ClientEvent) -> Result<()> {
        if !self.widgets.contains_key(&event.target) {
            tracing::warn!(
                "dropping {} event for stale widget {}",
                event.name,
                event.target
            );
            return Ok(());
        }

        let handlers = self
            .handlers
            .get(&(event.target.clone(), event.name.clone()))
            .cloned()
            .unwrap_or_default();

        tracing::debug!(
            "dispatching {} on {} to {} handler(s)",
            event.name,
            event.target,
            handlers.len()
        );

        for handler in handlers {
            (*handler)(self, event)?;
        }

        Ok(())
    }

    /// Process one postback: apply feedback in arrival order, then run the
    /// handlers of the raised event, then render and flush.
    ///
    /// # Errors
    ///
    /// Errors returned by handlers. The queue keeps what was emitted before
    /// the failure and is delivered with the next flush.
    #[tracing::instrument(skip_all)]
    pub fn process_postback<I, K, V>(&mut self, fields: I) -> Result<InstructionBatch>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.validation.clear();

        let postback = Postback::from_fields(fields);

        for (key, value) in &postback.fields {
            self.apply_feedback(key, value);
        }

        if let Some(event) = &postback.event {
            self.dispatch_event(event)?;
        }

        Ok(self.flush())
    }

    /// Queue the initialization of every widget that needs it, followed by
    /// the instructions deferred until then.
    pub fn render(&mut self) {
        for id in &self.order {
            let Some(widget) = self.widgets.get_mut(id) else {
                continue;
            };

            if widget.needs_render() {
                // The init map carries the current options; queued option
                // writes would otherwise overwrite it on the client.
                self.queue.discard(widget.target(), widget.operation(), |i| {
                    i.option_name().is_some()
                });
                self.queue.push(widget.init_instruction());
                for deferred in widget.realize() {
                    self.queue.push(deferred);
                }
            }
        }
    }

    /// Render pending widgets and drain the queue.
    pub fn flush(&mut self) -> InstructionBatch {
        self.render();

        InstructionBatch {
            instructions: self.queue.flush(),
            validation: self.validation.clone(),
        }
    }

    /// First response of a fresh page: every widget is initialized.
    pub fn initial_render(&mut self) -> InstructionBatch {
        self.validation.clear();
        self.flush()
    }

    /// Re-initialize every widget, e.g. after a full page load replaced the
    /// DOM. Queued incremental instructions are superseded by the
    /// initialization maps and dropped.
    pub fn full_render(&mut self) -> InstructionBatch {
        self.queue.clear();
        for widget in self.widgets.values_mut() {
            widget.mark_for_redraw();
        }
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::{Draggable, Slider, Sortable};

    fn rendered_slider() -> Page {
        let mut page = Page::new();
        page.add("slider1", Slider::new()).unwrap();
        page.flush();
        page
    }

    #[test]
    fn test_page_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Page>();
    }

    #[test]
    fn test_unrealized_widget_sends_options_in_init() {
        let mut page = Page::new();
        page.add("slider1", Slider::new()).unwrap();
        page.set_option("slider1", "Min", 0).unwrap();
        page.set_option("slider1", "Max", 100).unwrap();

        let batch = page.flush();
        assert_eq!(batch.instructions.len(), 1);
        assert!(batch.instructions[0].is_init());
        let map = batch.instructions[0].args[0].as_object().unwrap();
        assert_eq!(map.get("max"), Some(&OptionValue::Integer(100)));
        assert!(page.widget("slider1").unwrap().is_realized());
    }

    #[test]
    fn test_realized_widget_emits_option_instructions() {
        let mut page = rendered_slider();
        page.set_option("slider1", "Value", 10).unwrap();
        page.set_option("slider1", "Value", 20).unwrap();

        let batch = page.flush();
        assert_eq!(batch.instructions.len(), 1);
        assert_eq!(batch.instructions[0].args[2], OptionValue::Integer(20));
    }

    #[test]
    fn test_unchanged_value_emits_nothing() {
        let mut page = rendered_slider();
        page.set_option("slider1", "Value", 10).unwrap();
        page.flush();
        page.set_option("slider1", "Value", 10).unwrap();
        assert!(page.flush().instructions.is_empty());
    }

    #[test]
    fn test_clearing_option_redraws() {
        let mut page = rendered_slider();
        page.set_option("slider1", "Step", 5).unwrap();
        page.flush();

        page.set_option("slider1", "Step", OptionValue::Null).unwrap();
        let batch = page.flush();
        assert_eq!(batch.instructions.len(), 1);
        assert!(batch.instructions[0].is_init());
        assert!(batch.instructions[0].args[0].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_redraw_drops_superseded_option_writes() {
        let mut page = rendered_slider();
        page.set_option("slider1", "Value", 5).unwrap();
        page.mark_for_redraw("slider1").unwrap();
        page.set_option("slider1", "Value", 7).unwrap();

        let batch = page.flush();
        assert_eq!(batch.instructions.len(), 1);
        assert!(batch.instructions[0].is_init());
        let map = batch.instructions[0].args[0].as_object().unwrap();
        assert_eq!(map.get("value"), Some(&OptionValue::Integer(7)));
    }

    #[test]
    fn test_set_then_clear_in_one_cycle() {
        let mut page = rendered_slider();
        page.set_option("slider1", "Step", 5).unwrap();
        page.set_option("slider1", "Step", OptionValue::Null).unwrap();

        let batch = page.flush();
        assert_eq!(batch.instructions.len(), 1);
        assert!(batch.instructions[0].is_init());
        assert!(batch.instructions[0].args[0].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_remove_then_readd_destroys_before_init() {
        let mut page = rendered_slider();
        page.set_option("slider1", "Value", 3).unwrap();
        page.remove("slider1").unwrap();
        page.add("slider1", Slider::new())
            .unwrap()
            .set_option("Max", 10)
            .unwrap();

        let batch = page.flush();
        let ops: Vec<(Option<&str>, Priority)> = batch
            .instructions
            .iter()
            .map(|i| (i.sub_operation(), i.priority))
            .collect();
        assert_eq!(ops, vec![(Some("destroy"), Priority::High), (None, Priority::High)]);
        let map = batch.instructions[1].args[0].as_object().unwrap();
        assert_eq!(map.get("max"), Some(&OptionValue::Integer(10)));
        assert!(page.widget("slider1").unwrap().is_realized());
    }

    #[test]
    fn test_readd_as_other_type_keeps_last_destroy() {
        let mut page = rendered_slider();
        page.remove("slider1").unwrap();
        page.add("slider1", Sortable::new()).unwrap();

        let batch = page.flush();
        let ops: Vec<(&str, Priority)> = batch
            .instructions
            .iter()
            .map(|i| (i.operation.as_str(), i.priority))
            .collect();
        assert_eq!(
            ops,
            vec![("sortable", Priority::High), ("slider", Priority::Last)]
        );
    }

    #[test]
    fn test_deferred_call_follows_init() {
        let mut page = Page::new();
        page.add("slider1", Slider::new()).unwrap();
        page.call("slider1", "refresh", vec![], Priority::Low).unwrap();

        let batch = page.flush();
        assert_eq!(batch.instructions.len(), 2);
        assert!(batch.instructions[0].is_init());
        assert_eq!(batch.instructions[1].sub_operation(), Some("refresh"));
    }

    #[test]
    fn test_duplicate_and_invalid_ids() {
        let mut page = Page::new();
        page.add("a", Slider::new()).unwrap();
        assert_eq!(
            page.add("a", Slider::new()).err(),
            Some(WidgetError::DuplicateWidget("a".to_string()))
        );
        assert!(matches!(
            page.add("a__b", Slider::new()),
            Err(WidgetError::InvalidWidgetId(_))
        ));
        assert!(matches!(
            page.add("", Slider::new()),
            Err(WidgetError::InvalidWidgetId(_))
        ));
    }

    #[test]
    fn test_capability_must_be_attached() {
        let mut page = Page::new();
        assert!(matches!(
            page.add("d", Draggable::new()),
            Err(WidgetError::DetachedCapability(_))
        ));

        page.add("list1", Sortable::new()).unwrap();
        let id = page.attach("list1", Draggable::new()).unwrap().widget().id().to_string();
        assert_eq!(id, "list1_draggable");
        assert_eq!(page.widget(&id).unwrap().target(), "list1");

        assert!(matches!(
            page.attach("list1_draggable", Draggable::new()),
            Err(WidgetError::NotACapabilityHost(_))
        ));
        assert!(matches!(
            page.attach("list1", Slider::new()),
            Err(WidgetError::NotACapabilityHost(_))
        ));
    }

    #[test]
    fn test_remove_host_removes_capabilities() {
        let mut page = Page::new();
        page.add("list1", Sortable::new()).unwrap();
        page.attach("list1", Draggable::new()).unwrap();
        page.flush();

        page.remove("list1").unwrap();
        assert!(!page.contains("list1"));
        assert!(!page.contains("list1_draggable"));

        let batch = page.flush();
        let ops: Vec<(&str, Option<&str>)> = batch
            .instructions
            .iter()
            .map(|i| (i.operation.as_str(), i.sub_operation()))
            .collect();
        assert_eq!(
            ops,
            vec![("draggable", Some("destroy")), ("sortable", Some("destroy"))]
        );
    }

    #[test]
    fn test_instructions_for_removed_widget_still_flush() {
        let mut page = rendered_slider();
        page.set_option("slider1", "Value", 3).unwrap();
        page.remove("slider1").unwrap();

        let batch = page.flush();
        assert_eq!(batch.instructions.len(), 2);
        assert_eq!(batch.instructions[0].option_name(), Some("value"));
        assert_eq!(batch.instructions[1].sub_operation(), Some("destroy"));
    }

    #[test]
    fn test_unmarked_and_stale_feedback() {
        let mut page = rendered_slider();

        assert_eq!(
            page.apply_feedback("slider1_Value", "5"),
            FeedbackOutcome::Rejected {
                key: "slider1_Value".to_string()
            }
        );
        assert_eq!(
            page.apply_feedback("gone__Value", "5"),
            FeedbackOutcome::Stale {
                widget: "gone".to_string()
            }
        );
        assert_eq!(
            page.apply_feedback("slider1__Secret", "5"),
            FeedbackOutcome::Rejected {
                key: "slider1__Secret".to_string()
            }
        );
        assert_eq!(page.get_option("slider1", "Value").unwrap(), &OptionValue::Null);
    }

    #[test]
    fn test_feedback_key_prefers_longest_widget_id() {
        let mut page = Page::new();
        page.add("list", Sortable::new()).unwrap();
        page.add("list_2", Sortable::new()).unwrap();

        let outcome = page.apply_feedback("list_2__ItemArray", "x,y");
        assert_eq!(
            outcome,
            FeedbackOutcome::Applied {
                widget: "list_2".to_string(),
                field: "_ItemArray".to_string()
            }
        );
        assert_eq!(
            page.behavior::<Sortable>("list_2").unwrap().items(),
            ["x", "y"]
        );
        assert!(page.behavior::<Sortable>("list").unwrap().items().is_empty());
    }

    #[test]
    fn test_handler_errors_propagate() {
        let mut page = rendered_slider();
        page.on("slider1", "change", |_, _| {
            Err(WidgetError::Handler("boom".to_string()))
        })
        .unwrap();

        let fields = crate::PostbackBuilder::new()
            .event("slider1", "change")
            .build();
        assert_eq!(
            page.process_postback(fields),
            Err(WidgetError::Handler("boom".to_string()))
        );
    }

    #[test]
    fn test_full_render_reinitializes_everything() {
        let mut page = rendered_slider();
        page.set_option("slider1", "Value", 9).unwrap();

        let batch = page.full_render();
        assert_eq!(batch.instructions.len(), 1);
        let map = batch.instructions[0].args[0].as_object().unwrap();
        assert_eq!(map.get("value"), Some(&OptionValue::Integer(9)));
    }
}
