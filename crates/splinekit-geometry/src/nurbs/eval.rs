//! Point and derivative evaluation for B-spline and NURBS curves and
//! tensor-product surfaces.
//!
//! Non-rational forms are weighted sums of control points over the non-zero
//! basis functions. Rational forms lift control points into homogeneous
//! coordinates, evaluate the polynomial piece there, and then strip the
//! weight's derivative contribution with the binomial elimination recursions
//! of Piegl & Tiller (eqs. 4.8 and 4.20). Every operation is a pure function
//! of its arguments.

use nalgebra::{
    allocator::Allocator, DefaultAllocator, DimName, DimNameAdd, DimNameSum, OPoint, OVector,
    RealField, U1,
};

use splinekit_core::util::binomial_table;
use splinekit_core::{GeomError, Result};

use super::homogeneous::{to_cartesian, to_homogeneous, truncate};
use super::knot::{basis_function_derivatives, basis_functions, find_span};

/// Check the relation between degree, number of knots, and number of
/// control points: `num_knots == num_ctrl_pts + degree + 1`.
pub fn is_valid_relation(degree: usize, num_knots: usize, num_ctrl_pts: usize) -> bool {
    num_knots == num_ctrl_pts + degree + 1
}

fn check_relation(degree: usize, num_knots: usize, num_ctrl_pts: usize) -> Result<()> {
    if is_valid_relation(degree, num_knots, num_ctrl_pts) {
        Ok(())
    } else {
        Err(GeomError::InvalidKnotRelation {
            degree,
            num_knots,
            num_ctrl_pts,
        })
    }
}

fn check_weights<T: RealField + Copy>(weights: &[T], num_ctrl_pts: usize) -> Result<()> {
    if weights.len() != num_ctrl_pts {
        return Err(GeomError::WeightCountMismatch {
            expected: num_ctrl_pts,
            actual: weights.len(),
        });
    }
    for (index, w) in weights.iter().enumerate() {
        if *w <= T::zero() {
            return Err(GeomError::NonPositiveWeight { index });
        }
    }
    Ok(())
}

fn check_grid<P>(grid: &[Vec<P>]) -> Result<()> {
    let expected = grid.first().map_or(0, Vec::len);
    for (row, entries) in grid.iter().enumerate() {
        if entries.len() != expected {
            return Err(GeomError::RaggedGrid {
                row,
                len: entries.len(),
                expected,
            });
        }
    }
    Ok(())
}

fn check_weight_grid<T: RealField + Copy, P>(
    weights: &[Vec<T>],
    control_points: &[Vec<P>],
) -> Result<()> {
    let n_u = control_points.len();
    let n_v = control_points.first().map_or(0, Vec::len);
    if weights.len() != n_u || weights.iter().any(|row| row.len() != n_v) {
        return Err(GeomError::WeightCountMismatch {
            expected: n_u * n_v,
            actual: weights.iter().map(Vec::len).sum(),
        });
    }
    for (i, row) in weights.iter().enumerate() {
        for (j, &w) in row.iter().enumerate() {
            if w <= T::zero() {
                return Err(GeomError::NonPositiveWeight { index: i * n_v + j });
            }
        }
    }
    Ok(())
}

fn coef<T: RealField + Copy>(c: u64) -> T {
    nalgebra::convert(c as f64)
}

/// Evaluate a point on a non-rational B-spline curve at parameter `u`.
#[allow(clippy::needless_range_loop)]
pub fn curve_point<T, D>(
    degree: usize,
    knots: &[T],
    control_points: &[OPoint<T, D>],
    u: T,
) -> Result<OPoint<T, D>>
where
    T: RealField + Copy,
    D: DimName,
    DefaultAllocator: Allocator<D>,
{
    check_relation(degree, knots.len(), control_points.len())?;

    let n = control_points.len() - 1;
    let span = find_span(degree, knots, n, u);
    let basis = basis_functions(degree, knots, span, u);

    let mut point = OVector::<T, D>::zeros();
    for j in 0..=degree {
        point += &control_points[span - degree + j].coords * basis[j];
    }

    Ok(OPoint::from(point))
}

/// Evaluate derivatives of a non-rational B-spline curve at parameter `u`.
///
/// Returns `num_ders + 1` vectors where entry `k` is the k-th derivative;
/// entry 0 is the curve point itself. Entries of order greater than the
/// degree are zero vectors.
#[allow(clippy::needless_range_loop)]
pub fn curve_derivatives<T, D>(
    degree: usize,
    knots: &[T],
    control_points: &[OPoint<T, D>],
    u: T,
    num_ders: usize,
) -> Result<Vec<OVector<T, D>>>
where
    T: RealField + Copy,
    D: DimName,
    DefaultAllocator: Allocator<D>,
{
    check_relation(degree, knots.len(), control_points.len())?;

    let n = control_points.len() - 1;
    let span = find_span(degree, knots, n, u);
    let ders = basis_function_derivatives(degree, knots, span, u, num_ders);

    let mut curve_ders = vec![OVector::<T, D>::zeros(); num_ders + 1];
    let du = num_ders.min(degree);
    for k in 0..=du {
        for j in 0..=degree {
            curve_ders[k] += &control_points[span - degree + j].coords * ders[k][j];
        }
    }

    Ok(curve_ders)
}

/// Evaluate a point on a rational (weighted) B-spline curve at parameter `u`.
pub fn rational_curve_point<T, D>(
    degree: usize,
    knots: &[T],
    control_points: &[OPoint<T, D>],
    weights: &[T],
    u: T,
) -> Result<OPoint<T, D>>
where
    T: RealField + Copy,
    D: DimNameAdd<U1>,
    DefaultAllocator: Allocator<D> + Allocator<DimNameSum<D, U1>>,
{
    check_weights(weights, control_points.len())?;

    // Lift into homogeneous coordinates and evaluate the polynomial piece
    let cw: Vec<OPoint<T, DimNameSum<D, U1>>> = control_points
        .iter()
        .zip(weights)
        .map(|(p, &w)| to_homogeneous(p, w))
        .collect();
    let pointw = curve_point(degree, knots, &cw, u)?;

    Ok(to_cartesian::<T, D>(&pointw))
}

/// Evaluate derivatives of a rational B-spline curve at parameter `u`.
///
/// The homogeneous derivatives are split into their cartesian parts `A_k`
/// and weight derivatives `w_k`, then the weight contribution is removed in
/// increasing derivative order (Piegl & Tiller eq. 4.8):
///
/// ```text
/// C_k = ( A_k - sum_{i=1..k} C(k,i) * w_i * C_{k-i} ) / w_0
/// ```
pub fn rational_curve_derivatives<T, D>(
    degree: usize,
    knots: &[T],
    control_points: &[OPoint<T, D>],
    weights: &[T],
    u: T,
    num_ders: usize,
) -> Result<Vec<OVector<T, D>>>
where
    T: RealField + Copy,
    D: DimNameAdd<U1>,
    DefaultAllocator: Allocator<D> + Allocator<DimNameSum<D, U1>>,
{
    check_weights(weights, control_points.len())?;

    let cw: Vec<OPoint<T, DimNameSum<D, U1>>> = control_points
        .iter()
        .zip(weights)
        .map(|(p, &w)| to_homogeneous(p, w))
        .collect();
    let cw_ders = curve_derivatives(degree, knots, &cw, u, num_ders)?;

    // Split into cartesian parts and weight derivatives
    let a_ders: Vec<OVector<T, D>> = cw_ders.iter().map(|d| truncate::<T, D>(d)).collect();
    let w_ders: Vec<T> = cw_ders.iter().map(|d| d[D::dim()]).collect();

    // Forward-fill: each order depends only on lower ones
    let binom = binomial_table(num_ders);
    let mut curve_ders: Vec<OVector<T, D>> = Vec::with_capacity(num_ders + 1);
    for k in 0..=num_ders {
        let mut v = a_ders[k].clone();
        for i in 1..=k {
            v -= &curve_ders[k - i] * (coef::<T>(binom[k][i]) * w_ders[i]);
        }
        curve_ders.push(v / w_ders[0]);
    }

    Ok(curve_ders)
}

/// Evaluate a point on a non-rational B-spline surface at `(u, v)`.
///
/// `control_points[i][j]` is the control point at row `i` (u-direction) and
/// column `j` (v-direction).
#[allow(clippy::needless_range_loop)]
pub fn surface_point<T, D>(
    degree_u: usize,
    degree_v: usize,
    knots_u: &[T],
    knots_v: &[T],
    control_points: &[Vec<OPoint<T, D>>],
    u: T,
    v: T,
) -> Result<OPoint<T, D>>
where
    T: RealField + Copy,
    D: DimName,
    DefaultAllocator: Allocator<D>,
{
    check_grid(control_points)?;
    check_relation(degree_u, knots_u.len(), control_points.len())?;
    check_relation(
        degree_v,
        knots_v.len(),
        control_points.first().map_or(0, Vec::len),
    )?;

    let n_u = control_points.len() - 1;
    let n_v = control_points[0].len() - 1;
    let span_u = find_span(degree_u, knots_u, n_u, u);
    let span_v = find_span(degree_v, knots_v, n_v, v);
    let basis_u = basis_functions(degree_u, knots_u, span_u, u);
    let basis_v = basis_functions(degree_v, knots_v, span_v, v);

    let mut point = OVector::<T, D>::zeros();
    for l in 0..=degree_v {
        let mut temp = OVector::<T, D>::zeros();
        for k in 0..=degree_u {
            temp += &control_points[span_u - degree_u + k][span_v - degree_v + l].coords
                * basis_u[k];
        }
        point += temp * basis_v[l];
    }

    Ok(OPoint::from(point))
}

/// Evaluate mixed partial derivatives of a non-rational B-spline surface.
///
/// Returns a `(num_ders + 1) x (num_ders + 1)` table where entry `[k][l]` is
/// the derivative of order `k` in u and `l` in v; entry `[0][0]` is the
/// surface point. Entries with `k > degree_u`, `l > degree_v`, or
/// `k + l > num_ders` are zero vectors.
///
/// The control net is contracted along u once per order `k`, and the
/// resulting `degree_v + 1` intermediate vectors are reused for every `l`.
#[allow(clippy::needless_range_loop, clippy::too_many_arguments)]
pub fn surface_derivatives<T, D>(
    degree_u: usize,
    degree_v: usize,
    knots_u: &[T],
    knots_v: &[T],
    control_points: &[Vec<OPoint<T, D>>],
    u: T,
    v: T,
    num_ders: usize,
) -> Result<Vec<Vec<OVector<T, D>>>>
where
    T: RealField + Copy,
    D: DimName,
    DefaultAllocator: Allocator<D>,
{
    check_grid(control_points)?;
    check_relation(degree_u, knots_u.len(), control_points.len())?;
    check_relation(
        degree_v,
        knots_v.len(),
        control_points.first().map_or(0, Vec::len),
    )?;

    let n_u = control_points.len() - 1;
    let n_v = control_points[0].len() - 1;
    let span_u = find_span(degree_u, knots_u, n_u, u);
    let span_v = find_span(degree_v, knots_v, n_v, v);
    let ders_u = basis_function_derivatives(degree_u, knots_u, span_u, u, num_ders);
    let ders_v = basis_function_derivatives(degree_v, knots_v, span_v, v, num_ders);

    let mut surf_ders = vec![vec![OVector::<T, D>::zeros(); num_ders + 1]; num_ders + 1];
    let du = num_ders.min(degree_u);
    let dv = num_ders.min(degree_v);

    let mut temp = vec![OVector::<T, D>::zeros(); degree_v + 1];
    for k in 0..=du {
        // Contract the u direction at order k
        for s in 0..=degree_v {
            temp[s] = OVector::zeros();
            for r in 0..=degree_u {
                temp[s] += &control_points[span_u - degree_u + r][span_v - degree_v + s].coords
                    * ders_u[k][r];
            }
        }

        // Contract the v direction for every remaining order l
        let dd = (num_ders - k).min(dv);
        for l in 0..=dd {
            for s in 0..=degree_v {
                surf_ders[k][l] += &temp[s] * ders_v[l][s];
            }
        }
    }

    Ok(surf_ders)
}

/// Evaluate a point on a rational (weighted) B-spline surface at `(u, v)`.
pub fn rational_surface_point<T, D>(
    degree_u: usize,
    degree_v: usize,
    knots_u: &[T],
    knots_v: &[T],
    control_points: &[Vec<OPoint<T, D>>],
    weights: &[Vec<T>],
    u: T,
    v: T,
) -> Result<OPoint<T, D>>
where
    T: RealField + Copy,
    D: DimNameAdd<U1>,
    DefaultAllocator: Allocator<D> + Allocator<DimNameSum<D, U1>>,
{
    check_grid(control_points)?;
    check_weight_grid(weights, control_points)?;

    let cw: Vec<Vec<OPoint<T, DimNameSum<D, U1>>>> = control_points
        .iter()
        .zip(weights)
        .map(|(points, row_weights)| {
            points
                .iter()
                .zip(row_weights)
                .map(|(p, &w)| to_homogeneous(p, w))
                .collect()
        })
        .collect();
    let pointw = surface_point(degree_u, degree_v, knots_u, knots_v, &cw, u, v)?;

    Ok(to_cartesian::<T, D>(&pointw))
}

/// Evaluate mixed partial derivatives of a rational B-spline surface.
///
/// The homogeneous derivative table is split into cartesian parts `A_{k,l}`
/// and weight derivatives `w_{k,l}`, then the weight contribution is removed
/// with `k` ascending and `l` ascending within `k`, so that every entry the
/// recursion reads has already been resolved (Piegl & Tiller eq. 4.20):
///
/// ```text
/// S_{k,l} = ( A_{k,l} - sum_{j=1..l} C(l,j) * w_{0,j} * S_{k,l-j}
///                     - sum_{i=1..k} C(k,i) * ( w_{i,0} * S_{k-i,l}
///                       + sum_{j=1..l} C(l,j) * w_{i,j} * S_{k-i,l-j} ) ) / w_{0,0}
/// ```
///
/// As in [`surface_derivatives`], entries with `k + l > num_ders` are zero.
#[allow(clippy::too_many_arguments)]
pub fn rational_surface_derivatives<T, D>(
    degree_u: usize,
    degree_v: usize,
    knots_u: &[T],
    knots_v: &[T],
    control_points: &[Vec<OPoint<T, D>>],
    weights: &[Vec<T>],
    u: T,
    v: T,
    num_ders: usize,
) -> Result<Vec<Vec<OVector<T, D>>>>
where
    T: RealField + Copy,
    D: DimNameAdd<U1>,
    DefaultAllocator: Allocator<D> + Allocator<DimNameSum<D, U1>>,
{
    check_grid(control_points)?;
    check_weight_grid(weights, control_points)?;

    let cw: Vec<Vec<OPoint<T, DimNameSum<D, U1>>>> = control_points
        .iter()
        .zip(weights)
        .map(|(points, row_weights)| {
            points
                .iter()
                .zip(row_weights)
                .map(|(p, &w)| to_homogeneous(p, w))
                .collect()
        })
        .collect();
    let homo_ders =
        surface_derivatives(degree_u, degree_v, knots_u, knots_v, &cw, u, v, num_ders)?;

    let a_ders: Vec<Vec<OVector<T, D>>> = homo_ders
        .iter()
        .map(|row| row.iter().map(|d| truncate::<T, D>(d)).collect())
        .collect();
    let w_ders: Vec<Vec<T>> = homo_ders
        .iter()
        .map(|row| row.iter().map(|d| d[D::dim()]).collect())
        .collect();

    let binom = binomial_table(num_ders);
    let mut surf_ders = vec![vec![OVector::<T, D>::zeros(); num_ders + 1]; num_ders + 1];
    for k in 0..=num_ders {
        for l in 0..=(num_ders - k) {
            let mut der = a_ders[k][l].clone();

            // Pure v-direction weight contributions
            for j in 1..=l {
                der -= &surf_ders[k][l - j] * (coef::<T>(binom[l][j]) * w_ders[0][j]);
            }

            // Pure u-direction and mixed (u, v) weight contributions
            for i in 1..=k {
                der -= &surf_ders[k - i][l] * (coef::<T>(binom[k][i]) * w_ders[i][0]);

                let mut cross = OVector::<T, D>::zeros();
                for j in 1..=l {
                    cross += &surf_ders[k - i][l - j] * (coef::<T>(binom[l][j]) * w_ders[i][j]);
                }
                der -= cross * coef::<T>(binom[k][i]);
            }

            surf_ders[k][l] = der / w_ders[0][0];
        }
    }

    Ok(surf_ders)
}
