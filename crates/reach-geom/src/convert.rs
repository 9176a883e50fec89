//! Conversions between set representations.
//!
//! Algorithms frequently produce one representation while a consumer needs
//! another; [`convert`] normalizes the mismatch. Every directional converter
//! must over-approximate: the result always contains the source set.

use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

use reach_core::{ReachError, SetKind};

use crate::interval::Interval;
use crate::zonotope::ZonoTensor;

/// Tagged union over the concrete set representations.
///
/// Conversion and mixed-type operators dispatch on the variant instead of a
/// runtime type tag; undefined pairs fail with
/// [`ReachError::NotSupported`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GeometrySet {
    /// Axis-aligned box set.
    Interval(Interval),
    /// Batched center-plus-generator set.
    Zonotope(ZonoTensor),
}

impl GeometrySet {
    /// Returns the discriminant of the wrapped representation.
    pub fn kind(&self) -> SetKind {
        match self {
            GeometrySet::Interval(_) => SetKind::Interval,
            GeometrySet::Zonotope(_) => SetKind::Zonotope,
        }
    }

    /// Returns the wrapped interval, if this is one.
    pub fn as_interval(&self) -> Option<&Interval> {
        match self {
            GeometrySet::Interval(interval) => Some(interval),
            _ => None,
        }
    }

    /// Returns the wrapped zonotope, if this is one.
    pub fn as_zonotope(&self) -> Option<&ZonoTensor> {
        match self {
            GeometrySet::Zonotope(zonotope) => Some(zonotope),
            _ => None,
        }
    }
}

impl From<Interval> for GeometrySet {
    fn from(value: Interval) -> Self {
        GeometrySet::Interval(value)
    }
}

impl From<ZonoTensor> for GeometrySet {
    fn from(value: ZonoTensor) -> Self {
        GeometrySet::Zonotope(value)
    }
}

/// Over-approximates a batched zonotope by its interval hull.
///
/// The radius at each index is the sum of absolute generator values, so the
/// bounds `c - r` and `c + r` form the tightest axis-aligned box containing
/// the zonotope, not merely some enclosure. Batches of rank 0..=2 map onto
/// the 2-D interval layout (scalars become 1x1, vectors become a row);
/// higher ranks are not representable as a single bound matrix.
pub fn zonotope_to_interval(source: &ZonoTensor) -> Result<Interval, ReachError> {
    if source.is_empty().iter().any(|&flag| flag) {
        return Err(ReachError::shape_mismatch(
            "convert.zonotope_to_interval.empty",
            "cannot hull a batch with empty entries",
        ));
    }
    let radius = source
        .gen()
        .mapv(f64::abs)
        .sum_axis(Axis(source.gen().ndim() - 1));
    let inf = source.c() - &radius;
    let sup = source.c() + &radius;
    let (inf, sup) = match source.c().ndim() {
        0 => (
            inf.insert_axis(Axis(0)).insert_axis(Axis(0)),
            sup.insert_axis(Axis(0)).insert_axis(Axis(0)),
        ),
        1 => (inf.insert_axis(Axis(0)), sup.insert_axis(Axis(0))),
        2 => (inf, sup),
        rank => {
            return Err(ReachError::not_supported(
                "convert.zonotope_to_interval.rank",
                "interval hulls of batches above rank 2 are not implemented",
            )
            .with_context("rank", rank))
        }
    };
    let to_matrix = |arr: ndarray::ArrayD<f64>| -> Result<Array2<f64>, ReachError> {
        arr.into_dimensionality::<ndarray::Ix2>().map_err(|_| {
            ReachError::shape_mismatch(
                "convert.zonotope_to_interval.shape",
                "hull bounds did not collapse to a matrix",
            )
        })
    };
    Interval::new(to_matrix(inf)?, to_matrix(sup)?)
}

/// Converts an interval to a zonotope. Unimplemented extension point: the
/// half-width construction must not be guessed silently.
pub fn interval_to_zonotope(_source: &Interval) -> Result<ZonoTensor, ReachError> {
    Err(ReachError::not_supported(
        "convert.interval_to_zonotope",
        "interval-to-zonotope conversion is not implemented",
    ))
}

/// Converts a set to the target representation kind.
///
/// Identity conversions return the source unchanged; defined directional
/// pairs delegate to their converter; every other pair fails with
/// [`ReachError::NotSupported`].
pub fn convert(source: GeometrySet, target: SetKind) -> Result<GeometrySet, ReachError> {
    match (source, target) {
        (GeometrySet::Interval(interval), SetKind::Interval) => {
            Ok(GeometrySet::Interval(interval))
        }
        (GeometrySet::Zonotope(zonotope), SetKind::Zonotope) => {
            Ok(GeometrySet::Zonotope(zonotope))
        }
        (GeometrySet::Zonotope(zonotope), SetKind::Interval) => {
            zonotope_to_interval(&zonotope).map(GeometrySet::Interval)
        }
        (GeometrySet::Interval(interval), SetKind::Zonotope) => {
            interval_to_zonotope(&interval).map(GeometrySet::Zonotope)
        }
        (source, target) => Err(ReachError::not_supported(
            "convert.pair",
            "no conversion is defined for this source/target pair",
        )
        .with_context("source", source.kind())
        .with_context("target", target)),
    }
}
