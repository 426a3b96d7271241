//! Pipeline error types

use thiserror::Error;

/// Errors that abort processing of a single mesh. Configuration errors are
/// raised before any mesh is touched and abort the whole run instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A mesh needs at least one vertex to bound or partition.
    #[error("mesh has no vertices")]
    EmptyGeometry,

    /// A single triangle references more bones than the configured cap, so
    /// no triangle-boundary split can satisfy the budget.
    #[error("triangle references {found} bones, exceeding the budget of {budget}")]
    BoneBudgetUnsatisfiable { found: usize, budget: usize },

    /// Vertex budgets must be positive multiples of 3 so chunk boundaries
    /// stay on triangle boundaries.
    #[error("vertex budget {0} is not a positive multiple of 3")]
    InvalidPartitionBudget(usize),

    /// Source arrays that must be parallel disagree in length, or an index
    /// points outside its target array.
    #[error("inconsistent source data in {stream}: {detail}")]
    SourceDataInconsistency { stream: &'static str, detail: String },
}
