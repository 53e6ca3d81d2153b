use types::{Instruction, Priority};

#[derive(Debug, Clone)]
struct Queued {
    seq: u64,
    instruction: Instruction,
}

/// Instructions collected during one request cycle.
///
/// `flush` returns them ordered by priority tier, then by emission order.
#[derive(Debug, Default)]
pub struct InstructionQueue {
    entries: Vec<Queued>,
    next_seq: u64,
}

impl InstructionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an instruction.
    ///
    /// An `Exclusive` instruction replaces any queued `Exclusive`
    /// instruction for the same target and operation.
    pub fn push(&mut self, instruction: Instruction) {
        if instruction.priority == Priority::Exclusive {
            self.entries.retain(|queued| {
                !(queued.instruction.priority == Priority::Exclusive
                    && queued.instruction.target == instruction.target
                    && queued.instruction.operation == instruction.operation)
            });
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Queued { seq, instruction });
    }

    /// Append an `option` instruction, or overwrite the queued one for the
    /// same target, operation and option name in place.
    pub fn push_option(&mut self, instruction: Instruction) {
        let name = instruction.option_name();

        if name.is_some() {
            if let Some(existing) = self.entries.iter_mut().find(|queued| {
                queued.instruction.target == instruction.target
                    && queued.instruction.operation == instruction.operation
                    && queued.instruction.option_name() == name
            }) {
                tracing::debug!(
                    "coalescing option {:?} for {}",
                    name,
                    instruction.target
                );
                existing.instruction = instruction;
                return;
            }
        }

        self.push(instruction);
    }

    /// Drop the queued instructions for `target` and `operation` that match
    /// `filter`, returning how many were dropped.
    pub fn discard(
        &mut self,
        target: &str,
        operation: &str,
        filter: impl Fn(&Instruction) -> bool,
    ) -> usize {
        let before = self.entries.len();
        self.entries.retain(|queued| {
            !(queued.instruction.target == target
                && queued.instruction.operation == operation
                && filter(&queued.instruction))
        });
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drain the queue in delivery order.
    pub fn flush(&mut self) -> Vec<Instruction> {
        let mut entries = std::mem::take(&mut self.entries);
        entries.sort_by_key(|queued| (queued.instruction.priority, queued.seq));
        entries
            .into_iter()
            .map(|queued| queued.instruction)
            .collect()
    }
}
