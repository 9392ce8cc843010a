use uuid::Uuid;

/// Summary of a recipe that ran to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecipeReport {
    /// Identifier used in the run's log lines.
    pub run_id: Uuid,
    /// Number of steps executed.
    pub actions_completed: usize,
}
