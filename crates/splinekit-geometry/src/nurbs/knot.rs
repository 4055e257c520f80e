//! Knot vector utilities for B-spline/NURBS evaluation.

use nalgebra::RealField;

/// Find the knot span index for parameter `t` in the knot vector.
///
/// Returns the index `i` such that `knots[i] <= t < knots[i+1]`,
/// with special handling for the upper boundary. Parameters outside the
/// valid domain are clamped to the boundary spans, so the result always
/// satisfies `degree <= i < knots.len() - degree - 1`.
///
/// # Arguments
/// * `degree` - Degree of the B-spline
/// * `knots` - The knot vector
/// * `n` - Number of control points minus 1
/// * `t` - Parameter value
pub fn find_span<T: RealField + Copy>(degree: usize, knots: &[T], n: usize, t: T) -> usize {
    // Special case: t at upper boundary
    if t >= knots[n + 1] {
        return n;
    }
    if t <= knots[degree] {
        return degree;
    }

    // Binary search
    let mut low = degree;
    let mut high = n + 1;
    let mut mid = (low + high) / 2;

    while t < knots[mid] || t >= knots[mid + 1] {
        if t < knots[mid] {
            high = mid;
        } else {
            low = mid;
        }
        mid = (low + high) / 2;
    }

    mid
}

/// Compute the non-vanishing basis functions at parameter `t`.
///
/// Returns a vector of `degree + 1` basis function values N_{span-degree,degree}(t)
/// through N_{span,degree}(t). Algorithm A2.2 of Piegl & Tiller.
///
/// # Arguments
/// * `degree` - Degree of the B-spline
/// * `knots` - The knot vector
/// * `span` - The knot span index (from `find_span`)
/// * `t` - Parameter value
pub fn basis_functions<T: RealField + Copy>(
    degree: usize,
    knots: &[T],
    span: usize,
    t: T,
) -> Vec<T> {
    let mut n = vec![T::zero(); degree + 1];
    let mut left = vec![T::zero(); degree + 1];
    let mut right = vec![T::zero(); degree + 1];

    n[0] = T::one();

    for j in 1..=degree {
        left[j] = t - knots[span + 1 - j];
        right[j] = knots[span + j] - t;
        let mut saved = T::zero();

        for r in 0..j {
            let temp = n[r] / (right[r + 1] + left[j - r]);
            n[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }

        n[j] = saved;
    }

    n
}

/// Compute basis functions and their derivatives up to order `num_ders`.
///
/// Returns a `(num_ders + 1) x (degree + 1)` table where row `k` holds the
/// k-th derivative of each non-zero basis function; row 0 matches
/// [`basis_functions`]. Rows beyond `degree` are zero, since a degree-p
/// piecewise polynomial has no higher non-vanishing derivatives.
/// Algorithm A2.3 of Piegl & Tiller.
pub fn basis_function_derivatives<T: RealField + Copy>(
    degree: usize,
    knots: &[T],
    span: usize,
    t: T,
    num_ders: usize,
) -> Vec<Vec<T>> {
    let p = degree;

    // ndu stores the basis functions (upper triangle) and the knot
    // differences (lower triangle).
    let mut ndu = vec![vec![T::zero(); p + 1]; p + 1];
    let mut left = vec![T::zero(); p + 1];
    let mut right = vec![T::zero(); p + 1];

    ndu[0][0] = T::one();

    for j in 1..=p {
        left[j] = t - knots[span + 1 - j];
        right[j] = knots[span + j] - t;
        let mut saved = T::zero();

        for r in 0..j {
            // Lower triangle
            ndu[j][r] = right[r + 1] + left[j - r];
            let temp = ndu[r][j - 1] / ndu[j][r];

            // Upper triangle
            ndu[r][j] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        ndu[j][j] = saved;
    }

    let n_out = num_ders.min(p);
    let mut ders = vec![vec![T::zero(); p + 1]; num_ders + 1];

    // Load the basis functions (0th derivative)
    for j in 0..=p {
        ders[0][j] = ndu[j][p];
    }

    // Compute derivatives through the recurrence on two alternating
    // working rows a[s1] and a[s2].
    let mut a = vec![vec![T::zero(); p + 1]; 2];

    for r in 0..=p {
        let mut s1 = 0usize;
        let mut s2 = 1usize;
        a[0][0] = T::one();

        for k in 1..=n_out {
            let mut d = T::zero();
            let rk = r as isize - k as isize;
            let pk = p as isize - k as isize;

            if rk >= 0 {
                a[s2][0] = a[s1][0] / ndu[(pk + 1) as usize][rk as usize];
                d = a[s2][0] * ndu[rk as usize][pk as usize];
            }

            let j1 = if rk >= -1 { 1 } else { (-rk) as usize };
            let j2 = if r as isize - 1 <= pk { k - 1 } else { p - r };

            for j in j1..=j2 {
                a[s2][j] =
                    (a[s1][j] - a[s1][j - 1]) / ndu[(pk + 1) as usize][(rk + j as isize) as usize];
                d += a[s2][j] * ndu[(rk + j as isize) as usize][pk as usize];
            }

            if r as isize <= pk {
                a[s2][k] = -a[s1][k - 1] / ndu[(pk + 1) as usize][r];
                d += a[s2][k] * ndu[r][pk as usize];
            }

            ders[k][r] = d;
            std::mem::swap(&mut s1, &mut s2);
        }
    }

    // Multiply through by the correct factors p!/(p-k)!
    let mut factor: T = nalgebra::convert(p as f64);
    for k in 1..=n_out {
        for j in 0..=p {
            ders[k][j] *= factor;
        }
        factor *= nalgebra::convert((p - k) as f64);
    }

    ders
}
