//! Homogeneous-coordinate lifts for rational evaluation.
//!
//! A rational point of dimension `D` with weight `w` is represented as the
//! augmented point `(w * point, w)` of dimension `D + 1`, so that rational
//! evaluation can reuse the polynomial machinery and finish with a single
//! perspective divide. The augmented point is its own fixed-size type,
//! obtained through `DimNameAdd`, never the cartesian type with a spare
//! coordinate.

use nalgebra::{
    allocator::Allocator, DefaultAllocator, DimNameAdd, DimNameSum, OPoint, OVector, RealField, U1,
};

/// Lift a cartesian point and weight into homogeneous coordinates:
/// `(weight * point, weight)`.
pub fn to_homogeneous<T, D>(point: &OPoint<T, D>, weight: T) -> OPoint<T, DimNameSum<D, U1>>
where
    T: RealField + Copy,
    D: DimNameAdd<U1>,
    DefaultAllocator: Allocator<D> + Allocator<DimNameSum<D, U1>>,
{
    OPoint::from(OVector::<T, DimNameSum<D, U1>>::from_fn(|i, _| {
        if i < D::dim() {
            point[i] * weight
        } else {
            weight
        }
    }))
}

/// Project a homogeneous point back to cartesian coordinates by dividing
/// the leading components by the trailing weight.
pub fn to_cartesian<T, D>(hpoint: &OPoint<T, DimNameSum<D, U1>>) -> OPoint<T, D>
where
    T: RealField + Copy,
    D: DimNameAdd<U1>,
    DefaultAllocator: Allocator<D> + Allocator<DimNameSum<D, U1>>,
{
    let w = hpoint[D::dim()];
    OPoint::from(OVector::<T, D>::from_fn(|i, _| hpoint[i] / w))
}

/// Drop the trailing weight coordinate of a homogeneous vector without
/// dividing.
pub fn truncate<T, D>(hvector: &OVector<T, DimNameSum<D, U1>>) -> OVector<T, D>
where
    T: RealField + Copy,
    D: DimNameAdd<U1>,
    DefaultAllocator: Allocator<D> + Allocator<DimNameSum<D, U1>>,
{
    OVector::<T, D>::from_fn(|i, _| hvector[i])
}
