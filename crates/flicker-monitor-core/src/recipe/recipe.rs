use crate::{Action, CoreResult};

use serde::{Deserialize, Serialize};

/// Ordered list of actions, edited freely until handed to an executor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Steps in execution order.
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl Recipe {
    /// Empty, unnamed recipe.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recipe from a prepared list of steps.
    pub fn from_actions(actions: Vec<Action>) -> Self {
        Self {
            name: None,
            actions,
        }
    }

    /// Appends a step.
    pub fn push(&mut self, action: Action) -> &mut Self {
        self.actions.push(action);
        self
    }

    /// Inserts a step at `index`, clamped to the end of the list.
    pub fn insert(&mut self, index: usize, action: Action) {
        let index = index.min(self.actions.len());
        self.actions.insert(index, action);
    }

    /// Removes the step at `index`, if it exists.
    pub fn remove(&mut self, index: usize) -> Option<Action> {
        (index < self.actions.len()).then(|| self.actions.remove(index))
    }

    /// Moves the step at `from` to position `to`. Returns false if `from`
    /// is out of range.
    pub fn move_action(&mut self, from: usize, to: usize) -> bool {
        match self.remove(from) {
            Some(action) => {
                self.insert(to, action);
                true
            }
            None => false,
        }
    }

    /// Removes all steps.
    pub fn clear(&mut self) {
        self.actions.clear();
    }

    /// Steps in execution order.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether the recipe has no steps.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Validates every step.
    ///
    /// # Errors
    ///
    /// Returns the first step's [`crate::CoreError::InvalidAction`].
    #[track_caller]
    pub fn validate(&self) -> CoreResult<()> {
        self.actions.iter().try_for_each(Action::validate)
    }
}
