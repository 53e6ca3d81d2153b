//! Reference model of the browser-side dispatcher.
//!
//! The real dispatcher lives in the browser; this one drives any
//! `ClientWidgetLibrary` and is what the integration tests use to check that
//! client state converges on the server model.

use std::collections::{BTreeMap, HashMap};
use types::{Instruction, InstructionBatch, OptionValue};

/// Lifecycle of one client widget, keyed by DOM target and operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    Uninitialized,
    Initialized,
    Destroyed,
}

/// The concrete client widget library, treated as a black box.
pub trait ClientWidgetLibrary {
    /// Run the widget constructor with the full option map.
    fn construct(
        &mut self,
        target: &str,
        operation: &str,
        options: &BTreeMap<String, OptionValue>,
    );

    /// `operation(method, args...)` on a constructed widget.
    fn invoke(&mut self, target: &str, operation: &str, method: &str, args: &[OptionValue]);

    fn destroy(&mut self, target: &str, operation: &str);
}

#[derive(Debug, Default)]
struct Slot {
    initialized: bool,
    destroyed: bool,
    pending: Vec<Instruction>,
}

#[derive(Debug)]
pub struct ClientBridge<L> {
    library: L,
    slots: HashMap<(String, String), Slot>,
}

impl<L: ClientWidgetLibrary> ClientBridge<L> {
    pub fn new(library: L) -> Self {
        Self {
            library,
            slots: HashMap::new(),
        }
    }

    pub const fn library(&self) -> &L {
        &self.library
    }

    pub fn state(&self, target: &str, operation: &str) -> BridgeState {
        match self.slots.get(&(target.to_string(), operation.to_string())) {
            Some(slot) if slot.destroyed => BridgeState::Destroyed,
            Some(slot) if slot.initialized => BridgeState::Initialized,
            _ => BridgeState::Uninitialized,
        }
    }

    /// Apply one response batch in tier order, emission order within a tier.
    pub fn apply(&mut self, batch: &InstructionBatch) {
        let mut ordered: Vec<&Instruction> = batch.instructions.iter().collect();
        ordered.sort_by_key(|instruction| instruction.priority);

        for instruction in ordered {
            self.dispatch(instruction.clone());
        }
    }

    /// The DOM node of `target` was replaced, e.g. by a full page reload.
    /// Every widget mounted on it starts over.
    pub fn dom_replaced(&mut self, target: &str) {
        self.slots.retain(|(slot_target, _), _| slot_target != target);
    }

    fn dispatch(&mut self, instruction: Instruction) {
        let key = (instruction.target.clone(), instruction.operation.clone());
        let slot = self.slots.entry(key).or_default();

        if slot.destroyed && instruction.is_init() {
            tracing::debug!(
                "new {} on {} after destroy",
                instruction.operation,
                instruction.target
            );
            *slot = Slot::default();
        }

        if slot.destroyed {
            tracing::debug!(
                "dropping {:?} for destroyed {} on {}",
                instruction.sub_operation(),
                instruction.operation,
                instruction.target
            );
            return;
        }

        if let Some(OptionValue::Object(options)) = instruction.args.first() {
            self.library
                .construct(&instruction.target, &instruction.operation, options);
            slot.initialized = true;

            for pending in std::mem::take(&mut slot.pending) {
                Self::invoke(&mut self.library, slot, &pending);
            }
            return;
        }

        if !slot.initialized {
            slot.pending.push(instruction);
            return;
        }

        Self::invoke(&mut self.library, slot, &instruction);
    }

    fn invoke(library: &mut L, slot: &mut Slot, instruction: &Instruction) {
        if slot.destroyed {
            return;
        }

        let Some(method) = instruction.sub_operation() else {
            tracing::warn!("instruction without a sub-operation: {instruction:?}");
            return;
        };

        if method == "destroy" {
            library.destroy(&instruction.target, &instruction.operation);
            slot.destroyed = true;
            slot.pending.clear();
            return;
        }

        library.invoke(
            &instruction.target,
            &instruction.operation,
            method,
            &instruction.args[1..],
        );
    }
}

/// One constructed client widget as seen by `RecordingLibrary`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientWidget {
    pub options: BTreeMap<String, OptionValue>,
    pub constructed: usize,
    pub destroyed: bool,
}

/// In-memory widget library: keeps the option map of every widget and logs
/// every other method call.
#[derive(Debug, Default)]
pub struct RecordingLibrary {
    pub widgets: HashMap<(String, String), ClientWidget>,
    pub calls: Vec<(String, String, String)>,
}

impl RecordingLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn widget(&self, target: &str, operation: &str) -> Option<&ClientWidget> {
        self.widgets
            .get(&(target.to_string(), operation.to_string()))
    }

    pub fn option(&self, target: &str, operation: &str, name: &str) -> Option<&OptionValue> {
        self.widget(target, operation)
            .and_then(|widget| widget.options.get(name))
    }

    /// Methods invoked on `target`, in order, excluding `option`.
    pub fn methods(&self, target: &str) -> Vec<&str> {
        self.calls
            .iter()
            .filter(|(call_target, _, _)| call_target == target)
            .map(|(_, _, method)| method.as_str())
            .collect()
    }
}

impl ClientWidgetLibrary for RecordingLibrary {
    fn construct(
        &mut self,
        target: &str,
        operation: &str,
        options: &BTreeMap<String, OptionValue>,
    ) {
        let widget = self
            .widgets
            .entry((target.to_string(), operation.to_string()))
            .or_default();
        widget.options.clone_from(options);
        widget.constructed += 1;
        widget.destroyed = false;
    }

    fn invoke(&mut self, target: &str, operation: &str, method: &str, args: &[OptionValue]) {
        let key = (target.to_string(), operation.to_string());

        if method == "option" {
            if let (Some(widget), [OptionValue::String(name), value]) =
                (self.widgets.get_mut(&key), args)
            {
                widget.options.insert(name.clone(), value.clone());
            }
            return;
        }

        self.calls
            .push((target.to_string(), operation.to_string(), method.to_string()));
    }

    fn destroy(&mut self, target: &str, operation: &str) {
        if let Some(widget) = self
            .widgets
            .get_mut(&(target.to_string(), operation.to_string()))
        {
            widget.destroyed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::Priority;

    fn batch(instructions: Vec<Instruction>) -> InstructionBatch {
        InstructionBatch {
            instructions,
            ..Default::default()
        }
    }

    fn init(target: &str, options: &[(&str, i64)]) -> Instruction {
        Instruction::init(
            target,
            "slider",
            options
                .iter()
                .map(|(k, v)| ((*k).to_string(), OptionValue::Integer(*v)))
                .collect(),
        )
    }

    fn set(target: &str, name: &str, value: i64) -> Instruction {
        Instruction::option(target, "slider", name, value.into(), Priority::Low)
    }

    #[test]
    fn test_instructions_before_init_are_replayed() {
        let mut bridge = ClientBridge::new(RecordingLibrary::new());

        bridge.apply(&batch(vec![set("s", "value", 7)]));
        assert_eq!(bridge.state("s", "slider"), BridgeState::Uninitialized);
        assert!(bridge.library().widget("s", "slider").is_none());

        bridge.apply(&batch(vec![init("s", &[("min", 0)])]));
        assert_eq!(bridge.state("s", "slider"), BridgeState::Initialized);
        assert_eq!(
            bridge.library().option("s", "slider", "value"),
            Some(&OptionValue::Integer(7))
        );
    }

    #[test]
    fn test_high_applied_before_low_in_one_batch() {
        let mut bridge = ClientBridge::new(RecordingLibrary::new());

        // Listed out of order on purpose; the option must not be buffered
        // behind an init that arrives later in the same batch.
        bridge.apply(&batch(vec![set("s", "value", 3), init("s", &[])]));

        let widget = bridge.library().widget("s", "slider").unwrap();
        assert_eq!(widget.constructed, 1);
        assert_eq!(widget.options.get("value"), Some(&OptionValue::Integer(3)));
    }

    #[test]
    fn test_reinit_replaces_options_wholesale() {
        let mut bridge = ClientBridge::new(RecordingLibrary::new());
        bridge.apply(&batch(vec![init("s", &[("step", 5)])]));
        bridge.apply(&batch(vec![init("s", &[("max", 10)])]));

        let widget = bridge.library().widget("s", "slider").unwrap();
        assert_eq!(widget.constructed, 2);
        assert!(!widget.options.contains_key("step"));
    }

    #[test]
    fn test_destroyed_drops_silently() {
        let mut bridge = ClientBridge::new(RecordingLibrary::new());
        bridge.apply(&batch(vec![
            init("s", &[]),
            Instruction::method("s", "slider", "destroy", vec![], Priority::Last),
        ]));
        assert_eq!(bridge.state("s", "slider"), BridgeState::Destroyed);

        bridge.apply(&batch(vec![
            set("s", "value", 1),
            Instruction::method("s", "slider", "refresh", vec![], Priority::Low),
        ]));
        let widget = bridge.library().widget("s", "slider").unwrap();
        assert!(widget.destroyed);
        assert!(!widget.options.contains_key("value"));
        assert!(bridge.library().methods("s").is_empty());
        assert_eq!(bridge.state("s", "slider"), BridgeState::Destroyed);
    }

    #[test]
    fn test_init_after_destroy_starts_new_lifetime() {
        let mut bridge = ClientBridge::new(RecordingLibrary::new());
        bridge.apply(&batch(vec![
            init("s", &[("step", 5)]),
            Instruction::method("s", "slider", "destroy", vec![], Priority::Last),
        ]));

        bridge.apply(&batch(vec![init("s", &[("max", 10)])]));

        assert_eq!(bridge.state("s", "slider"), BridgeState::Initialized);
        let widget = bridge.library().widget("s", "slider").unwrap();
        assert!(!widget.destroyed);
        assert_eq!(widget.constructed, 2);
        assert_eq!(widget.options.get("max"), Some(&OptionValue::Integer(10)));
        assert!(!widget.options.contains_key("step"));
    }

    #[test]
    fn test_destroy_then_init_in_one_tier() {
        let mut bridge = ClientBridge::new(RecordingLibrary::new());
        bridge.apply(&batch(vec![init("s", &[])]));

        bridge.apply(&batch(vec![
            Instruction::method("s", "slider", "destroy", vec![], Priority::High),
            init("s", &[("min", 2)]),
        ]));

        assert_eq!(bridge.state("s", "slider"), BridgeState::Initialized);
        assert_eq!(
            bridge.library().option("s", "slider", "min"),
            Some(&OptionValue::Integer(2))
        );
    }

    #[test]
    fn test_dom_replaced_allows_new_widget() {
        let mut bridge = ClientBridge::new(RecordingLibrary::new());
        bridge.apply(&batch(vec![
            init("s", &[]),
            Instruction::method("s", "slider", "destroy", vec![], Priority::Last),
        ]));

        bridge.dom_replaced("s");
        assert_eq!(bridge.state("s", "slider"), BridgeState::Uninitialized);

        bridge.apply(&batch(vec![init("s", &[("min", 1)])]));
        assert_eq!(bridge.state("s", "slider"), BridgeState::Initialized);
    }
}
