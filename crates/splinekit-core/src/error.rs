use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeomError {
    /// The knot vector length must equal the number of control points
    /// plus the degree plus one.
    #[error(
        "invalid knot relation: {num_knots} knots for {num_ctrl_pts} control points of degree {degree}"
    )]
    InvalidKnotRelation {
        degree: usize,
        num_knots: usize,
        num_ctrl_pts: usize,
    },

    /// A rational weight was zero or negative. `index` is the row-major
    /// position of the offending weight.
    #[error("weight at index {index} must be strictly positive")]
    NonPositiveWeight { index: usize },

    /// The weight sequence does not pair one-to-one with the control points.
    #[error("expected {expected} weights, got {actual}")]
    WeightCountMismatch { expected: usize, actual: usize },

    /// A surface grid row has a different length than the first row.
    #[error("ragged grid: row {row} has {len} entries, expected {expected}")]
    RaggedGrid {
        row: usize,
        len: usize,
        expected: usize,
    },
}

pub type Result<T> = std::result::Result<T, GeomError>;
