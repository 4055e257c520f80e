//! End-to-end evaluation tests across the curve and surface kernels.

use approx::assert_relative_eq;
use nalgebra::{Point2, Point3, Vector3};

use splinekit_geometry::{
    curve_derivatives, curve_point, rational_curve_derivatives, rational_curve_point,
    rational_surface_derivatives, rational_surface_point, surface_derivatives, surface_point,
};

fn quarter_circle() -> (Vec<f64>, Vec<Point2<f64>>, Vec<f64>) {
    let knots = vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
    let cps = vec![
        Point2::new(1.0, 0.0),
        Point2::new(1.0, 1.0),
        Point2::new(0.0, 1.0),
    ];
    let w = 1.0_f64 / 2.0_f64.sqrt();
    (knots, cps, vec![1.0, w, 1.0])
}

/// A bi-quadratic Bezier patch with genuinely varying weights in both
/// directions, so the derivative elimination sees non-zero mixed weight
/// derivatives.
type SurfaceData = (
    Vec<f64>,
    Vec<f64>,
    Vec<Vec<Point3<f64>>>,
    Vec<Vec<f64>>,
);

fn weighted_patch() -> SurfaceData {
    let knots_u = vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
    let knots_v = vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
    let cps = vec![
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.5),
            Point3::new(0.0, 2.0, 0.0),
        ],
        vec![
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 2.0),
            Point3::new(1.0, 2.0, 1.0),
        ],
        vec![
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 0.5),
            Point3::new(2.0, 2.0, 0.0),
        ],
    ];
    let weights = vec![
        vec![1.0, 1.5, 0.8],
        vec![1.2, 2.0, 1.1],
        vec![0.9, 1.3, 1.0],
    ];
    (knots_u, knots_v, cps, weights)
}

#[test]
fn linear_curve_matches_closed_form() {
    let knots = vec![0.0, 0.0, 1.0, 1.0];
    let cps = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)];

    for i in 0..=10 {
        let t = i as f64 / 10.0;
        let p = curve_point(1, &knots, &cps, t).unwrap();
        assert_relative_eq!(p, Point2::new(t, t), epsilon = 1e-14);
    }

    let ders = curve_derivatives(1, &knots, &cps, 0.5, 2).unwrap();
    assert_relative_eq!(ders[0].x, 0.5, epsilon = 1e-14);
    assert_relative_eq!(ders[1].x, 1.0, epsilon = 1e-14);
    assert_relative_eq!(ders[1].y, 1.0, epsilon = 1e-14);
    assert_relative_eq!(ders[2].norm(), 0.0);
}

#[test]
fn rational_with_unit_weights_reduces_to_bspline() {
    let knots = vec![0.0, 0.0, 1.0, 1.0];
    let cps = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)];
    let weights = vec![1.0, 1.0];

    let p = rational_curve_point(1, &knots, &cps, &weights, 0.5).unwrap();
    assert_relative_eq!(p, Point2::new(0.5, 0.5), epsilon = 1e-14);
}

#[test]
fn full_nurbs_circle_has_unit_radius() {
    // Unit circle as a degree-2 NURBS with 9 control points
    let w = 1.0_f64 / 2.0_f64.sqrt();
    let knots = vec![
        0.0, 0.0, 0.0, 0.25, 0.25, 0.5, 0.5, 0.75, 0.75, 1.0, 1.0, 1.0,
    ];
    let cps = vec![
        Point2::new(1.0, 0.0),
        Point2::new(1.0, 1.0),
        Point2::new(0.0, 1.0),
        Point2::new(-1.0, 1.0),
        Point2::new(-1.0, 0.0),
        Point2::new(-1.0, -1.0),
        Point2::new(0.0, -1.0),
        Point2::new(1.0, -1.0),
        Point2::new(1.0, 0.0),
    ];
    let weights = vec![1.0, w, 1.0, w, 1.0, w, 1.0, w, 1.0];

    for i in 0..=40 {
        let t = i as f64 / 40.0;
        let p = rational_curve_point(2, &knots, &cps, &weights, t).unwrap();
        let r = (p.x * p.x + p.y * p.y).sqrt();
        assert!(
            (r - 1.0).abs() < 1e-10,
            "circle point at t={} has radius {}",
            t,
            r
        );
    }
}

#[test]
fn quarter_circle_midpoint_lies_on_circle() {
    let (knots, cps, weights) = quarter_circle();
    let p = rational_curve_point(2, &knots, &cps, &weights, 0.5).unwrap();
    assert_relative_eq!(p.coords.norm_squared(), 1.0, epsilon = 1e-12);
}

#[test]
fn curve_evaluation_is_translation_invariant() {
    // Basis functions form a partition of unity, so translating every
    // control point translates the curve and leaves derivatives unchanged.
    let knots = vec![0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 2.0, 2.0, 2.0];
    let cps = vec![
        Point2::new(0.0, 0.0),
        Point2::new(1.0, 3.0),
        Point2::new(2.0, -2.0),
        Point2::new(3.0, 1.0),
        Point2::new(4.0, 0.5),
    ];
    let offset = nalgebra::Vector2::new(5.0, -3.0);
    let moved: Vec<Point2<f64>> = cps.iter().map(|p| p + offset).collect();

    for &t in &[0.0, 0.5, 1.0, 1.5, 2.0] {
        let p = curve_point(3, &knots, &cps, t).unwrap();
        let q = curve_point(3, &knots, &moved, t).unwrap();
        assert_relative_eq!(q, p + offset, epsilon = 1e-12);

        let d = curve_derivatives(3, &knots, &cps, t, 2).unwrap();
        let e = curve_derivatives(3, &knots, &moved, t, 2).unwrap();
        for k in 1..=2 {
            assert_relative_eq!(e[k], d[k], epsilon = 1e-11);
        }
    }
}

#[test]
fn surface_evaluation_is_translation_invariant() {
    let (knots_u, knots_v, cps, weights) = weighted_patch();
    let offset = Vector3::new(-2.0, 4.0, 7.0);
    let moved: Vec<Vec<Point3<f64>>> = cps
        .iter()
        .map(|row| row.iter().map(|p| p + offset).collect())
        .collect();

    for &(u, v) in &[(0.2, 0.3), (0.5, 0.5), (0.8, 0.6)] {
        let p = rational_surface_point(2, 2, &knots_u, &knots_v, &cps, &weights, u, v).unwrap();
        let q =
            rational_surface_point(2, 2, &knots_u, &knots_v, &moved, &weights, u, v).unwrap();
        assert_relative_eq!(q, p + offset, epsilon = 1e-12);
    }
}

#[test]
fn bilinear_surface_center_and_vanishing_derivatives() {
    let knots = vec![0.0, 0.0, 1.0, 1.0];
    let cps = vec![
        vec![Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)],
        vec![Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 1.0, 0.0)],
    ];

    let p = surface_point(1, 1, &knots, &knots, &cps, 0.5, 0.5).unwrap();
    assert_relative_eq!(p, Point3::new(0.5, 0.5, 0.0), epsilon = 1e-14);

    let ders = surface_derivatives(1, 1, &knots, &knots, &cps, 0.5, 0.5, 2).unwrap();
    assert_relative_eq!(ders[0][0], p.coords, epsilon = 1e-14);
    for i in 0..=2 {
        assert_relative_eq!(ders[2][i].norm(), 0.0);
        assert_relative_eq!(ders[i][2].norm(), 0.0);
    }
}

#[test]
fn quarter_cylinder_surface_stays_on_cylinder() {
    // Quarter circle swept along z: x^2 + y^2 == 1 everywhere
    let (knots_u, circle_cps, circle_weights) = quarter_circle();
    let knots_v = vec![0.0, 0.0, 1.0, 1.0];
    let cps: Vec<Vec<Point3<f64>>> = circle_cps
        .iter()
        .map(|p| vec![Point3::new(p.x, p.y, 0.0), Point3::new(p.x, p.y, 2.0)])
        .collect();
    let weights: Vec<Vec<f64>> = circle_weights.iter().map(|&w| vec![w, w]).collect();

    for &(u, v) in &[(0.0, 0.0), (0.25, 0.5), (0.5, 0.75), (0.9, 1.0)] {
        let p = rational_surface_point(2, 1, &knots_u, &knots_v, &cps, &weights, u, v).unwrap();
        assert_relative_eq!(p.x * p.x + p.y * p.y, 1.0, epsilon = 1e-12);
        let ders =
            rational_surface_derivatives(2, 1, &knots_u, &knots_v, &cps, &weights, u, v, 1)
                .unwrap();
        // d/dv is the constant extrusion direction
        assert_relative_eq!(ders[0][1], Vector3::new(0.0, 0.0, 2.0), epsilon = 1e-11);
    }
}

#[test]
fn rational_surface_first_derivatives_match_finite_differences() {
    let (knots_u, knots_v, cps, weights) = weighted_patch();
    let h = 1e-5;
    let at = |u: f64, v: f64| {
        rational_surface_point(2, 2, &knots_u, &knots_v, &cps, &weights, u, v)
            .unwrap()
            .coords
    };

    for &(u, v) in &[(0.35, 0.45), (0.5, 0.5), (0.6, 0.7)] {
        let ders =
            rational_surface_derivatives(2, 2, &knots_u, &knots_v, &cps, &weights, u, v, 1)
                .unwrap();

        let fd_u = (at(u + h, v) - at(u - h, v)) / (2.0 * h);
        let fd_v = (at(u, v + h) - at(u, v - h)) / (2.0 * h);
        assert_relative_eq!(ders[1][0], fd_u, epsilon = 1e-6);
        assert_relative_eq!(ders[0][1], fd_v, epsilon = 1e-6);
    }
}

#[test]
fn rational_surface_second_derivatives_match_finite_differences() {
    let (knots_u, knots_v, cps, weights) = weighted_patch();
    let h = 1e-4;
    let at = |u: f64, v: f64| {
        rational_surface_point(2, 2, &knots_u, &knots_v, &cps, &weights, u, v)
            .unwrap()
            .coords
    };

    for &(u, v) in &[(0.4, 0.6), (0.5, 0.5)] {
        let ders =
            rational_surface_derivatives(2, 2, &knots_u, &knots_v, &cps, &weights, u, v, 2)
                .unwrap();

        let fd_uu = (at(u + h, v) - at(u, v) * 2.0 + at(u - h, v)) / (h * h);
        let fd_vv = (at(u, v + h) - at(u, v) * 2.0 + at(u, v - h)) / (h * h);
        let fd_uv = (at(u + h, v + h) - at(u + h, v - h) - at(u - h, v + h)
            + at(u - h, v - h))
            / (4.0 * h * h);

        assert_relative_eq!(ders[2][0], fd_uu, epsilon = 1e-4);
        assert_relative_eq!(ders[0][2], fd_vv, epsilon = 1e-4);
        assert_relative_eq!(ders[1][1], fd_uv, epsilon = 1e-4);
    }
}

#[test]
fn rational_surface_third_order_mixed_derivative_matches_finite_differences() {
    // Exercises the elimination with k = 2, l = 1, where the mixed weight
    // contributions accumulate through previously resolved table entries.
    let (knots_u, knots_v, cps, weights) = weighted_patch();
    let h = 1e-3;
    let at = |u: f64, v: f64| {
        rational_surface_point(2, 2, &knots_u, &knots_v, &cps, &weights, u, v)
            .unwrap()
            .coords
    };

    let (u, v) = (0.45, 0.55);
    let ders = rational_surface_derivatives(2, 2, &knots_u, &knots_v, &cps, &weights, u, v, 3)
        .unwrap();

    let d2u_at = |vv: f64| (at(u + h, vv) - at(u, vv) * 2.0 + at(u - h, vv)) / (h * h);
    let fd_uuv = (d2u_at(v + h) - d2u_at(v - h)) / (2.0 * h);
    assert_relative_eq!(ders[2][1], fd_uuv, epsilon = 1e-3);
}

#[test]
fn curve_and_surface_derivative_tables_agree_on_an_extrusion() {
    // Along a ruled surface's section curve, pure-u surface derivatives
    // must match the corresponding curve derivatives.
    let (knots_u, circle_cps, circle_weights) = quarter_circle();
    let knots_v = vec![0.0, 0.0, 1.0, 1.0];
    let cps: Vec<Vec<Point2<f64>>> = circle_cps
        .iter()
        .map(|p| vec![*p, Point2::new(p.x + 1.0, p.y)])
        .collect();
    let weights: Vec<Vec<f64>> = circle_weights.iter().map(|&w| vec![w, w]).collect();

    let u = 0.6;
    let curve_ders = rational_curve_derivatives(2, &knots_u, &circle_cps, &circle_weights, u, 2)
        .unwrap();
    let surf_ders =
        rational_surface_derivatives(2, 1, &knots_u, &knots_v, &cps, &weights, u, 0.0, 2)
            .unwrap();

    for k in 0..=2 {
        assert_relative_eq!(surf_ders[k][0], curve_ders[k], epsilon = 1e-10);
    }
}
