//! NURBS core algorithms: knot vector utilities, homogeneous lifts, and
//! point/derivative evaluation.

pub mod eval;
pub mod homogeneous;
pub mod knot;

pub use eval::*;
pub use homogeneous::{to_cartesian, to_homogeneous, truncate};
pub use knot::{basis_function_derivatives, basis_functions, find_span};
