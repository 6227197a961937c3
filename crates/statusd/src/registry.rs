use anyhow::{ensure, Result};

use crate::field::FieldId;

/// Request-table entry that asks the daemon to shut down, by convention.
pub const QUIT_REQUEST_ID: u32 = 0;

/// Index of an action inside its [ActionRegistry].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionId(usize);

/// The two display labels of a toggle and the side-effect command fired when
/// switching into the corresponding state.
#[derive(Debug)]
pub struct TogglePair {
    pub labels: [&'static str; 2],
    pub commands: [&'static str; 2],
}

/// A unit of behavior the daemon can run in response to a request.
#[derive(Debug)]
pub enum Action {
    /// Run a shell command and store the first line of its output into the
    /// target field. Without a target the output is discarded.
    External { command: &'static str, target: Option<FieldId> },
    /// Flip a private two-state index, fire the matching side-effect command
    /// without waiting on it, and label the target field with the new state.
    Toggle { pair: TogglePair, state: usize, target: FieldId },
    /// Run other registered actions in their given order. The quit composite
    /// carries no steps and clears the daemon's running flag instead.
    Composite { steps: Vec<ActionId>, quit: bool },
}

/// Immutable table of all actions plus the request table mapping wire-level
/// numeric ids onto them. Built once before the IPC socket starts serving.
pub struct ActionRegistry {
    actions: Vec<Action>,
    request_table: Vec<ActionId>,
}

impl ActionRegistry {
    /// Resolve a wire-level request id, or `None` when it is out of bounds.
    pub fn request(&self, id: u32) -> Option<ActionId> {
        self.request_table.get(id as usize).copied()
    }

    pub fn request_count(&self) -> usize {
        self.request_table.len()
    }

    pub fn get(&self, id: ActionId) -> &Action {
        &self.actions[id.0]
    }

    pub(crate) fn get_mut(&mut self, id: ActionId) -> &mut Action {
        &mut self.actions[id.0]
    }

    /// All registered actions in declaration order.
    pub fn action_ids(&self) -> impl Iterator<Item = ActionId> {
        (0..self.actions.len()).map(ActionId)
    }
}

/// Builds an [ActionRegistry]. Composites may only reference actions that
/// were registered before them, which keeps the table acyclic by
/// construction.
pub struct ActionRegistryBuilder {
    actions: Vec<Action>,
}

impl ActionRegistryBuilder {
    pub fn new() -> Self {
        ActionRegistryBuilder { actions: Vec::new() }
    }

    pub fn external(&mut self, command: &'static str, target: FieldId) -> ActionId {
        self.push(Action::External { command, target: Some(target) })
    }

    pub fn toggle(&mut self, pair: TogglePair, target: FieldId) -> ActionId {
        self.push(Action::Toggle { pair, state: 1, target })
    }

    pub fn composite(&mut self, steps: Vec<ActionId>) -> Result<ActionId> {
        ensure!(
            steps.iter().all(|step| step.0 < self.actions.len()),
            "A composite action may only reference actions registered before it"
        );
        Ok(self.push(Action::Composite { steps, quit: false }))
    }

    pub fn quit(&mut self) -> ActionId {
        self.push(Action::Composite { steps: Vec::new(), quit: true })
    }

    pub fn build(self, request_table: Vec<ActionId>) -> Result<ActionRegistry> {
        ensure!(
            request_table.iter().all(|entry| entry.0 < self.actions.len()),
            "Request table references an unregistered action"
        );
        Ok(ActionRegistry { actions: self.actions, request_table })
    }

    fn push(&mut self, action: Action) -> ActionId {
        self.actions.push(action);
        ActionId(self.actions.len() - 1)
    }
}
