use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    #[error("Unknown province code: {0}")]
    UnknownProvince(String),
    #[error("Portfolio allocation must be non-negative and sum to 100, got {total}")]
    InvalidAllocation { total: f64 },
    #[error("Planning horizon must be at least one year, got {0}")]
    InvalidPlanningHorizon(u32),
}
