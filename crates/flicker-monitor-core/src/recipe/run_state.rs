use uuid::Uuid;

/// Executor state, observable while a recipe runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecipeRunState {
    /// No recipe is executing.
    #[default]
    Idle,
    /// A recipe is executing.
    Running {
        /// Identifier of this run for log correlation.
        run_id: Uuid,
        /// Zero-based index of the step being executed.
        current_index: usize,
        /// Number of steps in the recipe.
        total: usize,
    },
}

impl RecipeRunState {
    /// Whether a recipe is executing.
    pub fn is_running(&self) -> bool {
        matches!(self, RecipeRunState::Running { .. })
    }
}
