//! Splinekit geometry: NURBS curve and surface evaluation.

pub mod nurbs;

pub use nurbs::eval::{
    curve_derivatives, curve_point, is_valid_relation, rational_curve_derivatives,
    rational_curve_point, rational_surface_derivatives, rational_surface_point,
    surface_derivatives, surface_point,
};
