//! Generic arithmetic capability over concrete set representations.
//!
//! Composite-geometry code needs to invoke "the add of whatever this set
//! is" without knowing the concrete type. Each representation implements
//! [`Arithmetic`]; operand/operation pairs without a sound definition fail
//! with [`ReachError::NotSupported`] instead of approximating silently.

use ndarray::{Array2, ArrayD, Axis};

use reach_core::{ReachError, SetKind};

use crate::convert::GeometrySet;
use crate::interval::Interval;
use crate::zonotope::ZonoTensor;

/// Right-hand operand accepted by the generic arithmetic capability.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A plain real, broadcast to every component.
    Scalar(f64),
    /// A dense numeric tensor.
    Dense(ArrayD<f64>),
    /// Another set representation.
    Set(GeometrySet),
}

/// Arithmetic operations shared by every set representation.
pub trait Arithmetic {
    /// Returns the discriminant of this representation.
    fn kind(&self) -> SetKind;

    /// Adds an operand to this set.
    fn add(&self, rhs: &Operand) -> Result<GeometrySet, ReachError>;

    /// Multiplies this set by an operand.
    fn multiply(&self, rhs: &Operand) -> Result<GeometrySet, ReachError>;

    /// Raises this set to a real exponent.
    fn power(&self, exponent: f64) -> Result<GeometrySet, ReachError>;

    /// Absolute value of this set.
    fn abs(&self) -> Result<GeometrySet, ReachError>;

    /// Negation of this set.
    fn negate(&self) -> Result<GeometrySet, ReachError>;
}

/// Views a dynamic-rank tensor as the 2-D interval bound layout: scalars
/// become 1x1, vectors become a row, matrices pass through.
fn dense_to_matrix(value: &ArrayD<f64>, code: &str) -> Result<Array2<f64>, ReachError> {
    let promoted = match value.ndim() {
        0 => value.clone().insert_axis(Axis(0)).insert_axis(Axis(0)),
        1 => value.clone().insert_axis(Axis(0)),
        2 => value.clone(),
        rank => {
            return Err(ReachError::shape_mismatch(
                code,
                "interval operands must have rank at most 2",
            )
            .with_context("rank", rank))
        }
    };
    promoted
        .into_dimensionality::<ndarray::Ix2>()
        .map_err(|_| ReachError::shape_mismatch(code, "operand did not collapse to a matrix"))
}

impl Arithmetic for Interval {
    fn kind(&self) -> SetKind {
        SetKind::Interval
    }

    fn add(&self, rhs: &Operand) -> Result<GeometrySet, ReachError> {
        match rhs {
            Operand::Scalar(value) => self.add_scalar(*value).map(GeometrySet::Interval),
            Operand::Dense(value) => {
                let matrix = dense_to_matrix(value, "interval.add_dense.rank")?;
                self.add_dense(&matrix).map(GeometrySet::Interval)
            }
            Operand::Set(GeometrySet::Interval(other)) => {
                Interval::add(self, other).map(GeometrySet::Interval)
            }
            Operand::Set(other) => Err(ReachError::not_supported(
                "interval.add.mixed",
                "interval addition with this representation is not implemented",
            )
            .with_context("rhs", other.kind())),
        }
    }

    fn multiply(&self, rhs: &Operand) -> Result<GeometrySet, ReachError> {
        match rhs {
            Operand::Scalar(value) => self.mul_scalar(*value).map(GeometrySet::Interval),
            Operand::Dense(value) => {
                let matrix = dense_to_matrix(value, "interval.mul_dense.rank")?;
                self.mul_dense(&matrix).map(GeometrySet::Interval)
            }
            Operand::Set(GeometrySet::Interval(other)) => {
                Interval::mul(self, other).map(GeometrySet::Interval)
            }
            Operand::Set(other) => Err(ReachError::not_supported(
                "interval.mul.mixed",
                "interval multiplication with this representation is not implemented",
            )
            .with_context("rhs", other.kind())),
        }
    }

    fn power(&self, exponent: f64) -> Result<GeometrySet, ReachError> {
        self.pow(exponent).map(GeometrySet::Interval)
    }

    fn abs(&self) -> Result<GeometrySet, ReachError> {
        Interval::abs(self).map(GeometrySet::Interval)
    }

    fn negate(&self) -> Result<GeometrySet, ReachError> {
        self.neg().map(GeometrySet::Interval)
    }
}

impl Arithmetic for ZonoTensor {
    fn kind(&self) -> SetKind {
        SetKind::Zonotope
    }

    fn add(&self, rhs: &Operand) -> Result<GeometrySet, ReachError> {
        match rhs {
            Operand::Scalar(value) => Ok(GeometrySet::Zonotope(self.add_scalar(*value))),
            Operand::Dense(value) => self.add_dense(value).map(GeometrySet::Zonotope),
            Operand::Set(GeometrySet::Zonotope(other)) => {
                ZonoTensor::add(self, other).map(GeometrySet::Zonotope)
            }
            Operand::Set(other) => Err(ReachError::not_supported(
                "zonotope.add.mixed",
                "zonotope addition with this representation is not implemented",
            )
            .with_context("rhs", other.kind())),
        }
    }

    fn multiply(&self, rhs: &Operand) -> Result<GeometrySet, ReachError> {
        match rhs {
            Operand::Scalar(value) => Ok(GeometrySet::Zonotope(self.mul_scalar(*value))),
            Operand::Dense(value) => self.mul_dense(value).map(GeometrySet::Zonotope),
            Operand::Set(GeometrySet::Interval(other)) => {
                self.mul_interval(other).map(GeometrySet::Zonotope)
            }
            Operand::Set(GeometrySet::Zonotope(other)) => {
                self.mul_zonotope(other).map(GeometrySet::Zonotope)
            }
        }
    }

    fn power(&self, _exponent: f64) -> Result<GeometrySet, ReachError> {
        Err(ReachError::not_supported(
            "zonotope.pow",
            "zonotope powers are not implemented",
        ))
    }

    fn abs(&self) -> Result<GeometrySet, ReachError> {
        Ok(GeometrySet::Zonotope(ZonoTensor::abs(self)))
    }

    fn negate(&self) -> Result<GeometrySet, ReachError> {
        Ok(GeometrySet::Zonotope(self.neg()))
    }
}

impl Arithmetic for GeometrySet {
    fn kind(&self) -> SetKind {
        GeometrySet::kind(self)
    }

    fn add(&self, rhs: &Operand) -> Result<GeometrySet, ReachError> {
        match self {
            GeometrySet::Interval(interval) => Arithmetic::add(interval, rhs),
            GeometrySet::Zonotope(zonotope) => Arithmetic::add(zonotope, rhs),
        }
    }

    fn multiply(&self, rhs: &Operand) -> Result<GeometrySet, ReachError> {
        match self {
            GeometrySet::Interval(interval) => Arithmetic::multiply(interval, rhs),
            GeometrySet::Zonotope(zonotope) => Arithmetic::multiply(zonotope, rhs),
        }
    }

    fn power(&self, exponent: f64) -> Result<GeometrySet, ReachError> {
        match self {
            GeometrySet::Interval(interval) => Arithmetic::power(interval, exponent),
            GeometrySet::Zonotope(zonotope) => Arithmetic::power(zonotope, exponent),
        }
    }

    fn abs(&self) -> Result<GeometrySet, ReachError> {
        match self {
            GeometrySet::Interval(interval) => Arithmetic::abs(interval),
            GeometrySet::Zonotope(zonotope) => Arithmetic::abs(zonotope),
        }
    }

    fn negate(&self) -> Result<GeometrySet, ReachError> {
        match self {
            GeometrySet::Interval(interval) => Arithmetic::negate(interval),
            GeometrySet::Zonotope(zonotope) => Arithmetic::negate(zonotope),
        }
    }
}
