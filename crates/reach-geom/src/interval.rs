use ndarray::{s, Array2, Axis, Zip};
use serde::{Deserialize, Serialize};

use reach_core::ReachError;

/// Axis-aligned box set represented as independent lower/upper bounds per
/// component.
///
/// Both bounds are dense 2-D matrices of identical shape (rows are dimension
/// groups, columns are components) with `sup >= inf` elementwise. The
/// ordering invariant is validated at construction and preserved by every
/// operation; arithmetic always over-approximates, never under-approximates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    inf: Array2<f64>,
    sup: Array2<f64>,
}

fn ew_min(a: &Array2<f64>, b: &Array2<f64>) -> Array2<f64> {
    Zip::from(a).and(b).map_collect(|&x, &y| x.min(y))
}

fn ew_max(a: &Array2<f64>, b: &Array2<f64>) -> Array2<f64> {
    Zip::from(a).and(b).map_collect(|&x, &y| x.max(y))
}

impl Interval {
    /// Creates an interval from lower and upper bound matrices.
    ///
    /// Fails with [`ReachError::ShapeMismatch`] when the shapes differ and
    /// with [`ReachError::BoundOrder`] when any component has `sup < inf`
    /// (NaN bounds are rejected by the same check).
    pub fn new(inf: Array2<f64>, sup: Array2<f64>) -> Result<Self, ReachError> {
        if inf.dim() != sup.dim() {
            return Err(ReachError::shape_mismatch(
                "interval.new.shape",
                "lower and upper bound shapes differ",
            )
            .with_context("inf", format!("{:?}", inf.dim()))
            .with_context("sup", format!("{:?}", sup.dim())));
        }
        if inf.iter().zip(sup.iter()).any(|(&lo, &hi)| !(hi - lo >= 0.0)) {
            return Err(ReachError::bound_order(
                "interval.new.order",
                "upper bound below lower bound",
            ));
        }
        Ok(Self { inf, sup })
    }

    /// Promotes two reals to a 1x1 interval.
    pub fn scalar(inf: f64, sup: f64) -> Result<Self, ReachError> {
        Self::new(
            Array2::from_elem((1, 1), inf),
            Array2::from_elem((1, 1), sup),
        )
    }

    /// Creates a degenerate point interval with both bounds equal to `value`.
    pub fn degenerate(value: &Array2<f64>) -> Self {
        Self {
            inf: value.clone(),
            sup: value.clone(),
        }
    }

    /// Internal constructor for bounds already known to be ordered.
    fn from_ordered(inf: Array2<f64>, sup: Array2<f64>) -> Self {
        debug_assert_eq!(inf.dim(), sup.dim());
        debug_assert!(inf.iter().zip(sup.iter()).all(|(&lo, &hi)| hi - lo >= 0.0));
        Self { inf, sup }
    }

    /// Returns the lower bound matrix.
    pub fn inf(&self) -> &Array2<f64> {
        &self.inf
    }

    /// Returns the upper bound matrix.
    pub fn sup(&self) -> &Array2<f64> {
        &self.sup
    }

    /// Returns the shape `[rows, columns]`, or `None` for an empty interval.
    pub fn dim(&self) -> Option<[usize; 2]> {
        if self.is_empty() {
            None
        } else {
            Some([self.inf.nrows(), self.inf.ncols()])
        }
    }

    /// Returns whether the backing arrays hold no elements.
    pub fn is_empty(&self) -> bool {
        self.inf.is_empty()
    }

    /// Returns whether the interval is a single component (1x1).
    pub fn is_scalar(&self) -> bool {
        !self.is_empty() && self.inf.len() == 1
    }

    /// Returns the midpoint `(inf + sup) / 2`.
    pub fn center(&self) -> Result<Array2<f64>, ReachError> {
        self.ensure_non_empty("interval.center")?;
        Ok((&self.inf + &self.sup) * 0.5)
    }

    fn ensure_non_empty(&self, code: &str) -> Result<(), ReachError> {
        if self.is_empty() {
            return Err(ReachError::shape_mismatch(
                code,
                "operation requires a non-empty interval",
            ));
        }
        Ok(())
    }

    fn ensure_same_dim(&self, rhs: &Interval, code: &str) -> Result<(), ReachError> {
        if self.inf.dim() != rhs.inf.dim() {
            return Err(ReachError::dimension_mismatch(code, "operand dimensions differ")
                .with_context("lhs", format!("{:?}", self.inf.dim()))
                .with_context("rhs", format!("{:?}", rhs.inf.dim())));
        }
        Ok(())
    }

    /// Elementwise interval addition.
    pub fn add(&self, rhs: &Interval) -> Result<Interval, ReachError> {
        self.ensure_non_empty("interval.add")?;
        rhs.ensure_non_empty("interval.add")?;
        self.ensure_same_dim(rhs, "interval.add.dim")?;
        Ok(Self::from_ordered(&self.inf + &rhs.inf, &self.sup + &rhs.sup))
    }

    /// Shifts both bounds by a dense offset (ndarray broadcast rules).
    pub fn add_dense(&self, rhs: &Array2<f64>) -> Result<Interval, ReachError> {
        self.ensure_non_empty("interval.add_dense")?;
        let offset = broadcast_to(rhs, &self.inf, "interval.add_dense.shape")?;
        Ok(Self::from_ordered(&self.inf + &offset, &self.sup + &offset))
    }

    /// Shifts both bounds by a scalar offset.
    pub fn add_scalar(&self, rhs: f64) -> Result<Interval, ReachError> {
        self.ensure_non_empty("interval.add_scalar")?;
        Ok(Self::from_ordered(&self.inf + rhs, &self.sup + rhs))
    }

    /// Elementwise interval multiplication.
    ///
    /// The sign of either operand is unknown, so the extremal products must
    /// be searched among all four combinations of `{inf, sup} x {inf, sup}`:
    /// the elementwise minimum becomes the new lower bound and the maximum
    /// the new upper bound.
    pub fn mul(&self, rhs: &Interval) -> Result<Interval, ReachError> {
        self.ensure_non_empty("interval.mul")?;
        rhs.ensure_non_empty("interval.mul")?;
        self.ensure_same_dim(rhs, "interval.mul.dim")?;
        let ll = &self.inf * &rhs.inf;
        let lu = &self.inf * &rhs.sup;
        let ul = &self.sup * &rhs.inf;
        let uu = &self.sup * &rhs.sup;
        let inf = ew_min(&ew_min(&ll, &lu), &ew_min(&ul, &uu));
        let sup = ew_max(&ew_max(&ll, &lu), &ew_max(&ul, &uu));
        Ok(Self::from_ordered(inf, sup))
    }

    /// Scales by a dense factor; negative factors flip the bound order, so
    /// the result takes the elementwise min/max of both products.
    pub fn mul_dense(&self, rhs: &Array2<f64>) -> Result<Interval, ReachError> {
        self.ensure_non_empty("interval.mul_dense")?;
        let factor = broadcast_to(rhs, &self.inf, "interval.mul_dense.shape")?;
        let lo = &self.inf * &factor;
        let hi = &self.sup * &factor;
        Ok(Self::from_ordered(ew_min(&lo, &hi), ew_max(&lo, &hi)))
    }

    /// Scales by a scalar factor with the same min/max sign handling.
    pub fn mul_scalar(&self, rhs: f64) -> Result<Interval, ReachError> {
        self.ensure_non_empty("interval.mul_scalar")?;
        let lo = &self.inf * rhs;
        let hi = &self.sup * rhs;
        Ok(Self::from_ordered(ew_min(&lo, &hi), ew_max(&lo, &hi)))
    }

    /// Negation, defined as multiplication by -1.
    pub fn neg(&self) -> Result<Interval, ReachError> {
        self.mul_scalar(-1.0)
    }

    /// Elementwise absolute value of the set.
    ///
    /// Components straddling zero map to `[0, max(|inf|, |sup|)]`, entirely
    /// non-positive components swap and negate to `[|sup|, |inf|]`, and
    /// non-negative components are unchanged. The receiver is never mutated.
    pub fn abs(&self) -> Result<Interval, ReachError> {
        self.ensure_non_empty("interval.abs")?;
        let inf = Zip::from(&self.inf)
            .and(&self.sup)
            .map_collect(|&lo, &hi| {
                if lo < 0.0 && hi > 0.0 {
                    0.0
                } else if lo < 0.0 {
                    hi.abs()
                } else {
                    lo
                }
            });
        let sup = Zip::from(&self.inf)
            .and(&self.sup)
            .map_collect(|&lo, &hi| {
                if lo < 0.0 && hi > 0.0 {
                    lo.abs().max(hi.abs())
                } else if lo < 0.0 {
                    lo.abs()
                } else {
                    hi
                }
            });
        Ok(Self::from_ordered(inf, sup))
    }

    /// Raises a scalar interval to an integer-valued exponent.
    ///
    /// Only 1x1 intervals and exponents within machine epsilon of an integer
    /// are accepted. For even nonzero exponents a zero-straddling interval
    /// clamps the lower bound to 0, since even powers cannot be negative.
    /// Negative exponents require interval division, which is an
    /// unimplemented extension point.
    pub fn pow(&self, exponent: f64) -> Result<Interval, ReachError> {
        self.ensure_non_empty("interval.pow")?;
        if !self.is_scalar() {
            return Err(ReachError::not_supported(
                "interval.pow.tensor",
                "powers of non-scalar intervals are not implemented",
            ));
        }
        if (exponent.round() - exponent).abs() > f64::EPSILON {
            return Err(ReachError::not_supported(
                "interval.pow.real",
                "non-integer interval exponents are not implemented",
            ));
        }
        if exponent < 0.0 {
            return Err(ReachError::not_supported(
                "interval.pow.negative",
                "negative exponents require interval division, which is not implemented",
            )
            .with_context("blocked_on", "interval.div"));
        }
        let n = exponent.round() as i32;
        let lo = self.inf[[0, 0]];
        let hi = self.sup[[0, 0]];
        let (p_lo, p_hi) = (lo.powi(n), hi.powi(n));
        let mut inf = p_lo.min(p_hi);
        let sup = p_lo.max(p_hi);
        if n % 2 == 0 && n != 0 && lo < 0.0 && hi > 0.0 {
            inf = 0.0;
        }
        Self::scalar(inf, sup)
    }

    /// Returns a new interval holding the selected columns of both bounds.
    pub fn columns(&self, cols: &[usize]) -> Result<Interval, ReachError> {
        self.ensure_non_empty("interval.columns")?;
        self.check_columns(cols, "interval.columns.range")?;
        Ok(Self::from_ordered(
            self.inf.select(Axis(1), cols),
            self.sup.select(Axis(1), cols),
        ))
    }

    /// Returns a new interval holding a contiguous column slice.
    pub fn column_range(&self, start: usize, end: usize) -> Result<Interval, ReachError> {
        self.ensure_non_empty("interval.column_range")?;
        if start > end || end > self.inf.ncols() {
            return Err(ReachError::shape_mismatch(
                "interval.column_range.range",
                "column range exceeds interval width",
            )
            .with_context("range", format!("{start}..{end}"))
            .with_context("ncols", self.inf.ncols()));
        }
        Ok(Self::from_ordered(
            self.inf.slice(s![.., start..end]).to_owned(),
            self.sup.slice(s![.., start..end]).to_owned(),
        ))
    }

    fn check_columns(&self, cols: &[usize], code: &str) -> Result<(), ReachError> {
        if let Some(&bad) = cols.iter().find(|&&c| c >= self.inf.ncols()) {
            return Err(ReachError::shape_mismatch(code, "column index out of range")
                .with_context("index", bad)
                .with_context("ncols", self.inf.ncols()));
        }
        Ok(())
    }

    /// Copies both bounds of `value` into the selected columns.
    ///
    /// Validation completes before any mutation takes place.
    pub fn set_columns(&mut self, cols: &[usize], value: &Interval) -> Result<(), ReachError> {
        self.ensure_non_empty("interval.set_columns")?;
        value.ensure_non_empty("interval.set_columns")?;
        self.check_columns(cols, "interval.set_columns.range")?;
        if value.inf.dim() != (self.inf.nrows(), cols.len()) {
            return Err(ReachError::shape_mismatch(
                "interval.set_columns.shape",
                "assigned interval does not match the selected columns",
            )
            .with_context("value", format!("{:?}", value.inf.dim()))
            .with_context("target", format!("({}, {})", self.inf.nrows(), cols.len())));
        }
        for (k, &col) in cols.iter().enumerate() {
            self.inf.column_mut(col).assign(&value.inf.column(k));
            self.sup.column_mut(col).assign(&value.sup.column(k));
        }
        Ok(())
    }

    /// Collapses the selected columns to the degenerate point interval given
    /// by a dense matrix (both bounds become equal).
    pub fn set_columns_dense(
        &mut self,
        cols: &[usize],
        value: &Array2<f64>,
    ) -> Result<(), ReachError> {
        self.ensure_non_empty("interval.set_columns_dense")?;
        self.check_columns(cols, "interval.set_columns_dense.range")?;
        if value.dim() != (self.inf.nrows(), cols.len()) {
            return Err(ReachError::shape_mismatch(
                "interval.set_columns_dense.shape",
                "assigned matrix does not match the selected columns",
            )
            .with_context("value", format!("{:?}", value.dim()))
            .with_context("target", format!("({}, {})", self.inf.nrows(), cols.len())));
        }
        for (k, &col) in cols.iter().enumerate() {
            self.inf.column_mut(col).assign(&value.column(k));
            self.sup.column_mut(col).assign(&value.column(k));
        }
        Ok(())
    }

    /// Collapses the selected columns to a degenerate scalar point.
    pub fn set_columns_scalar(&mut self, cols: &[usize], value: f64) -> Result<(), ReachError> {
        self.ensure_non_empty("interval.set_columns_scalar")?;
        self.check_columns(cols, "interval.set_columns_scalar.range")?;
        for &col in cols {
            self.inf.column_mut(col).fill(value);
            self.sup.column_mut(col).fill(value);
        }
        Ok(())
    }

    /// Extracts the main diagonal of both bound matrices as a 1xN interval.
    pub fn diag(&self) -> Result<Interval, ReachError> {
        self.ensure_non_empty("interval.diag")?;
        let inf = self.inf.diag().to_owned().insert_axis(Axis(0));
        let sup = self.sup.diag().to_owned().insert_axis(Axis(0));
        Ok(Self::from_ordered(inf, sup))
    }

    /// Interval subtraction. Unimplemented extension point.
    pub fn sub(&self, _rhs: &Interval) -> Result<Interval, ReachError> {
        Err(ReachError::not_supported(
            "interval.sub",
            "interval subtraction is not implemented",
        ))
    }

    /// Interval division. Unimplemented extension point.
    pub fn div(&self, _rhs: &Interval) -> Result<Interval, ReachError> {
        Err(ReachError::not_supported(
            "interval.div",
            "interval division is not implemented",
        ))
    }

    /// Point containment test. Unimplemented extension point.
    pub fn contains(&self, _point: &Array2<f64>) -> Result<bool, ReachError> {
        Err(ReachError::not_supported(
            "interval.contains",
            "interval containment is not implemented",
        ))
    }

    /// Set union. Unimplemented extension point.
    pub fn union(&self, _rhs: &Interval) -> Result<Interval, ReachError> {
        Err(ReachError::not_supported(
            "interval.union",
            "interval union is not implemented",
        ))
    }

    /// Set intersection. Unimplemented extension point.
    pub fn intersect(&self, _rhs: &Interval) -> Result<Interval, ReachError> {
        Err(ReachError::not_supported(
            "interval.intersect",
            "interval intersection is not implemented",
        ))
    }

    /// Semantic set equality. Unimplemented extension point; the derived
    /// `PartialEq` compares representations, not sets.
    pub fn set_equals(&self, _rhs: &Interval) -> Result<bool, ReachError> {
        Err(ReachError::not_supported(
            "interval.eq",
            "interval set equality is not implemented",
        ))
    }

    /// Matrix application to an interval. Unimplemented extension point.
    pub fn matmul(&self, _rhs: &Array2<f64>) -> Result<Interval, ReachError> {
        Err(ReachError::not_supported(
            "interval.matmul",
            "interval matrix multiplication is not implemented",
        ))
    }

    /// Order reduction. Unimplemented extension point.
    pub fn reduce(&self, _method: &str, _order: usize) -> Result<Interval, ReachError> {
        Err(ReachError::not_supported(
            "interval.reduce",
            "interval order reduction is not implemented",
        ))
    }

    /// Projection onto selected dimensions. Unimplemented extension point.
    pub fn proj(&self, _dims: &[usize]) -> Result<Interval, ReachError> {
        Err(ReachError::not_supported(
            "interval.proj",
            "interval projection is not implemented",
        ))
    }

    /// Vertex enumeration. Unimplemented extension point.
    pub fn vertices(&self) -> Result<Array2<f64>, ReachError> {
        Err(ReachError::not_supported(
            "interval.vertices",
            "interval vertex enumeration is not implemented",
        ))
    }

    /// Empty-interval factory of a given dimension. Unimplemented extension
    /// point; empty intervals can still be built from zero-size arrays.
    pub fn empty(_dim: usize) -> Result<Interval, ReachError> {
        Err(ReachError::not_supported(
            "interval.empty",
            "the empty-interval factory is not implemented",
        ))
    }

    /// Random-interval factory. Unimplemented extension point.
    pub fn rand(_dim: usize) -> Result<Interval, ReachError> {
        Err(ReachError::not_supported(
            "interval.rand",
            "the random-interval factory is not implemented",
        ))
    }
}

fn broadcast_to(
    value: &Array2<f64>,
    like: &Array2<f64>,
    code: &str,
) -> Result<Array2<f64>, ReachError> {
    value
        .broadcast(like.raw_dim())
        .map(|view| view.to_owned())
        .ok_or_else(|| {
            ReachError::shape_mismatch(code, "operand does not broadcast to the interval shape")
                .with_context("operand", format!("{:?}", value.dim()))
                .with_context("interval", format!("{:?}", like.dim()))
        })
}

macro_rules! transcendental_stub {
    ($(($name:ident, $code:literal, $what:literal)),+ $(,)?) => {
        impl Interval {
            $(
                #[doc = concat!("Interval ", $what, ". Unimplemented extension point.")]
                pub fn $name(_x: &Interval) -> Result<Interval, ReachError> {
                    Err(ReachError::not_supported(
                        $code,
                        concat!("interval ", $what, " is not implemented"),
                    ))
                }
            )+
        }
    };
}

transcendental_stub!(
    (sin, "interval.sin", "sine"),
    (cos, "interval.cos", "cosine"),
    (tan, "interval.tan", "tangent"),
    (asin, "interval.asin", "arcsine"),
    (acos, "interval.acos", "arccosine"),
    (atan, "interval.atan", "arctangent"),
    (atan2, "interval.atan2", "two-argument arctangent"),
    (sinh, "interval.sinh", "hyperbolic sine"),
    (cosh, "interval.cosh", "hyperbolic cosine"),
    (tanh, "interval.tanh", "hyperbolic tangent"),
    (asinh, "interval.asinh", "inverse hyperbolic sine"),
    (acosh, "interval.acosh", "inverse hyperbolic cosine"),
    (exp, "interval.exp", "exponential"),
    (sqrt, "interval.sqrt", "square root"),
);
