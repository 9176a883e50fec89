use ndarray::{concatenate, ArrayD, Axis, IxDyn, Zip};
use rand::Rng;
use serde::{Deserialize, Serialize};

use reach_core::{ErrorInfo, ReachError, RngHandle};

use crate::interval::Interval;

/// Batched zonotope: a tensor of center-plus-generator convex sets.
///
/// `c` holds the centers with shape `S`; `gen` holds the generators with
/// shape `S + (g,)`, the generator axis always last. Every slice along the
/// generator axis contributes one generator to the set at the matching index
/// of `c`. Arithmetic is vectorized over the whole batch and always returns
/// a new instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZonoTensor {
    c: ArrayD<f64>,
    gen: ArrayD<f64>,
}

impl ZonoTensor {
    /// Creates a batched zonotope from center and generator tensors.
    ///
    /// Fails with [`ReachError::ShapeMismatch`] unless `gen` has exactly one
    /// more axis than `c` and agrees with it on all leading axes.
    pub fn new(c: ArrayD<f64>, gen: ArrayD<f64>) -> Result<Self, ReachError> {
        if gen.ndim() != c.ndim() + 1 || gen.shape()[..c.ndim()] != *c.shape() {
            return Err(ReachError::shape_mismatch(
                "zonotope.new.shape",
                "generator tensor does not extend the center shape by one axis",
            )
            .with_context("center", format!("{:?}", c.shape()))
            .with_context("generators", format!("{:?}", gen.shape())));
        }
        Ok(Self { c, gen })
    }

    /// Returns the center tensor.
    pub fn c(&self) -> &ArrayD<f64> {
        &self.c
    }

    /// Returns the generator tensor.
    pub fn gen(&self) -> &ArrayD<f64> {
        &self.gen
    }

    /// Returns the batch shape (the center shape).
    pub fn shape(&self) -> &[usize] {
        self.c.shape()
    }

    /// Returns the number of generators (length of the trailing axis).
    pub fn gen_num(&self) -> usize {
        self.gen.shape().last().copied().unwrap_or(0)
    }

    fn gen_axis(&self) -> Axis {
        Axis(self.gen.ndim() - 1)
    }

    /// Elementwise emptiness flags: true where the center is NaN or any
    /// generator component at that index is NaN.
    pub fn is_empty(&self) -> ArrayD<bool> {
        let gen_nan = self
            .gen
            .map_axis(self.gen_axis(), |lane| lane.iter().any(|v| v.is_nan()));
        Zip::from(&self.c)
            .and(&gen_nan)
            .map_collect(|&c, &g| c.is_nan() || g)
    }

    /// Minkowski sum of two batched zonotopes.
    ///
    /// The generator sets are united: `rhs.gen` broadcasts to this batch
    /// shape (keeping its own generator count) and is concatenated along the
    /// generator axis, so generator counts add; the centers sum. When `rhs`
    /// has strictly more axes the operands swap once, after which the axis
    /// condition holds.
    pub fn add(&self, rhs: &ZonoTensor) -> Result<ZonoTensor, ReachError> {
        if self.c.ndim() < rhs.c.ndim() {
            return rhs.add(self);
        }
        let c_rhs = rhs.c.broadcast(self.c.raw_dim()).ok_or_else(|| {
            ReachError::shape_mismatch(
                "zonotope.add.shape",
                "operand centers do not broadcast together",
            )
            .with_context("lhs", format!("{:?}", self.shape()))
            .with_context("rhs", format!("{:?}", rhs.shape()))
        })?;
        let c = &self.c + &c_rhs;

        let mut target = self.shape().to_vec();
        target.push(rhs.gen_num());
        let rgen = rhs.gen.broadcast(IxDyn(&target)).ok_or_else(|| {
            ReachError::shape_mismatch(
                "zonotope.add.gen_shape",
                "operand generators do not broadcast to the batch shape",
            )
            .with_context("rhs_gen", format!("{:?}", rhs.gen.shape()))
            .with_context("target", format!("{target:?}"))
        })?;
        let gen = concatenate(self.gen_axis(), &[self.gen.view(), rgen.view()]).map_err(|_| {
            ReachError::shape_mismatch(
                "zonotope.add.concat",
                "generator tensors do not concatenate along the generator axis",
            )
        })?;
        ZonoTensor::new(c, gen)
    }

    /// Shifts the centers by a dense offset; generators are unchanged.
    pub fn add_dense(&self, rhs: &ArrayD<f64>) -> Result<ZonoTensor, ReachError> {
        let offset = rhs.broadcast(self.c.raw_dim()).ok_or_else(|| {
            ReachError::shape_mismatch(
                "zonotope.add_dense.shape",
                "offset does not broadcast to the batch shape",
            )
            .with_context("offset", format!("{:?}", rhs.shape()))
            .with_context("batch", format!("{:?}", self.shape()))
        })?;
        Ok(Self {
            c: &self.c + &offset,
            gen: self.gen.clone(),
        })
    }

    /// Shifts the centers by a scalar; generators are unchanged.
    pub fn add_scalar(&self, rhs: f64) -> ZonoTensor {
        Self {
            c: &self.c + rhs,
            gen: self.gen.clone(),
        }
    }

    /// Subtracts a dense offset (`self + (-rhs)`).
    pub fn sub_dense(&self, rhs: &ArrayD<f64>) -> Result<ZonoTensor, ReachError> {
        self.add_dense(&(-rhs.clone()))
    }

    /// Subtracts a scalar offset.
    pub fn sub_scalar(&self, rhs: f64) -> ZonoTensor {
        self.add_scalar(-rhs)
    }

    /// Zonotope difference. Unimplemented extension point.
    pub fn sub(&self, _rhs: &ZonoTensor) -> Result<ZonoTensor, ReachError> {
        Err(ReachError::not_supported(
            "zonotope.sub",
            "zonotope-zonotope subtraction is not implemented",
        ))
    }

    /// Scales centers and every generator by a dense factor.
    ///
    /// Scaling is an affine map, so this is exact (no widening).
    pub fn mul_dense(&self, rhs: &ArrayD<f64>) -> Result<ZonoTensor, ReachError> {
        let factor = rhs.broadcast(self.c.raw_dim()).ok_or_else(|| {
            ReachError::shape_mismatch(
                "zonotope.mul_dense.shape",
                "factor does not broadcast to the batch shape",
            )
            .with_context("factor", format!("{:?}", rhs.shape()))
            .with_context("batch", format!("{:?}", self.shape()))
        })?;
        let c = &self.c * &factor;
        let expanded = rhs.view().insert_axis(Axis(rhs.ndim()));
        let gfactor = expanded.broadcast(self.gen.raw_dim()).ok_or_else(|| {
            ReachError::shape_mismatch(
                "zonotope.mul_dense.gen_shape",
                "factor does not broadcast to the generator shape",
            )
        })?;
        let gen = &self.gen * &gfactor;
        Ok(Self { c, gen })
    }

    /// Scales centers and every generator by a scalar. Exact.
    pub fn mul_scalar(&self, rhs: f64) -> ZonoTensor {
        Self {
            c: &self.c * rhs,
            gen: &self.gen * rhs,
        }
    }

    /// Negation, an exact scaling by -1.
    pub fn neg(&self) -> ZonoTensor {
        self.mul_scalar(-1.0)
    }

    /// Zonotope-interval multiplication. Unimplemented extension point.
    pub fn mul_interval(&self, _rhs: &Interval) -> Result<ZonoTensor, ReachError> {
        Err(ReachError::not_supported(
            "zonotope.mul.interval",
            "zonotope-interval multiplication is not implemented",
        ))
    }

    /// Elementwise zonotope-zonotope multiplication. Unimplemented extension
    /// point.
    pub fn mul_zonotope(&self, _rhs: &ZonoTensor) -> Result<ZonoTensor, ReachError> {
        Err(ReachError::not_supported(
            "zonotope.mul.zonotope",
            "zonotope-zonotope multiplication is not implemented",
        ))
    }

    /// Matrix-style application. Unimplemented extension point.
    pub fn matmul(&self, _rhs: &ArrayD<f64>) -> Result<ZonoTensor, ReachError> {
        Err(ReachError::not_supported(
            "zonotope.matmul",
            "zonotope matrix application is not implemented",
        ))
    }

    /// Elementwise absolute value of centers and generators.
    ///
    /// This is a crude enclosure of the true absolute-value image, kept for
    /// compatibility; it does not tighten components whose sign is fixed.
    pub fn abs(&self) -> ZonoTensor {
        Self {
            c: self.c.mapv(f64::abs),
            gen: self.gen.mapv(f64::abs),
        }
    }

    /// Transposes the batch axes, keeping the generator axis last.
    pub fn transpose(&self) -> ZonoTensor {
        let c = self.c.view().reversed_axes().to_owned();
        let n = self.gen.ndim();
        let mut perm: Vec<usize> = (0..n).rev().collect();
        perm.rotate_left(1);
        let gen = self.gen.view().permuted_axes(IxDyn(&perm)).to_owned();
        Self { c, gen }
    }

    /// Transposes the batch axes by an explicit permutation; the generator
    /// axis stays pinned to the end.
    pub fn transpose_axes(&self, order: &[usize]) -> Result<ZonoTensor, ReachError> {
        let n = self.c.ndim();
        let mut seen = vec![false; n];
        let valid = order.len() == n
            && order.iter().all(|&ax| {
                if ax >= n || seen[ax] {
                    false
                } else {
                    seen[ax] = true;
                    true
                }
            });
        if !valid {
            return Err(ReachError::shape_mismatch(
                "zonotope.transpose.axes",
                "axis order is not a permutation of the batch axes",
            )
            .with_context("order", format!("{order:?}"))
            .with_context("rank", n));
        }
        let c = self.c.view().permuted_axes(IxDyn(order)).to_owned();
        let mut gperm = order.to_vec();
        gperm.push(n);
        let gen = self.gen.view().permuted_axes(IxDyn(&gperm)).to_owned();
        Ok(Self { c, gen })
    }

    /// Sums the batch along one axis.
    ///
    /// Both the centers and the generator tensor are summed along the axis:
    /// summation is a linear map, and the generator image of a linear map is
    /// the map applied to each generator. Scalar results are promoted back to
    /// single-element arrays.
    pub fn sum_axis(&self, axis: usize) -> Result<ZonoTensor, ReachError> {
        if axis >= self.c.ndim() {
            return Err(ReachError::shape_mismatch(
                "zonotope.sum.axis",
                "axis exceeds the batch rank",
            )
            .with_context("axis", axis)
            .with_context("rank", self.c.ndim()));
        }
        let c = self.c.sum_axis(Axis(axis));
        let gen = self.gen.sum_axis(Axis(axis));
        Ok(Self::promote(c, gen))
    }

    /// Sums the batch over all axes down to a single set.
    pub fn sum_all(&self) -> ZonoTensor {
        let mut c = self.c.clone();
        let mut gen = self.gen.clone();
        while c.ndim() > 0 {
            c = c.sum_axis(Axis(0));
            gen = gen.sum_axis(Axis(0));
        }
        Self::promote(c, gen)
    }

    fn promote(c: ArrayD<f64>, gen: ArrayD<f64>) -> Self {
        if c.ndim() == 0 {
            Self {
                c: c.insert_axis(Axis(0)),
                gen: gen.insert_axis(Axis(0)),
            }
        } else {
            Self { c, gen }
        }
    }

    /// Selects positions along the leading batch axis.
    pub fn select(&self, indices: &[usize]) -> Result<ZonoTensor, ReachError> {
        self.check_lead_indices(indices, "zonotope.select.range")?;
        Ok(Self {
            c: self.c.select(Axis(0), indices),
            gen: self.gen.select(Axis(0), indices),
        })
    }

    /// Extracts the set at one position of the leading batch axis.
    ///
    /// Scalar centers are promoted back to single-element arrays so the
    /// center/generator shape invariant keeps holding.
    pub fn index_at(&self, index: usize) -> Result<ZonoTensor, ReachError> {
        self.check_lead_indices(&[index], "zonotope.index.range")?;
        let c = self.c.index_axis(Axis(0), index).to_owned();
        let gen = self.gen.index_axis(Axis(0), index).to_owned();
        Ok(Self::promote(c, gen))
    }

    fn check_lead_indices(&self, indices: &[usize], code: &str) -> Result<(), ReachError> {
        if self.c.ndim() == 0 {
            return Err(ReachError::shape_mismatch(code, "cannot index a rank-0 batch"));
        }
        let len = self.c.shape()[0];
        if let Some(&bad) = indices.iter().find(|&&i| i >= len) {
            return Err(ReachError::shape_mismatch(code, "index exceeds the leading axis")
                .with_context("index", bad)
                .with_context("len", len));
        }
        Ok(())
    }

    /// Replaces center and generators at one position of the leading axis
    /// atomically from another zonotope.
    ///
    /// All shapes (including the generator count) are validated before any
    /// field is written.
    pub fn set_index(&mut self, index: usize, value: &ZonoTensor) -> Result<(), ReachError> {
        self.check_lead_indices(&[index], "zonotope.set_index.range")?;
        let target_c = &self.c.shape()[1..];
        let (vc, vg) = if value.c.shape() == target_c {
            (value.c.view(), value.gen.view())
        } else if target_c.is_empty() && value.c.ndim() == 1 && value.c.len() == 1 {
            // Promoted scalar slot: strip the promotion axis back off.
            (
                value.c.index_axis(Axis(0), 0),
                value.gen.index_axis(Axis(0), 0),
            )
        } else {
            return Err(ReachError::shape_mismatch(
                "zonotope.set_index.shape",
                "assigned center does not match the slice shape",
            )
            .with_context("value", format!("{:?}", value.c.shape()))
            .with_context("target", format!("{target_c:?}")));
        };
        if vg.shape() != &self.gen.shape()[1..] {
            return Err(ReachError::shape_mismatch(
                "zonotope.set_index.gen_shape",
                "assigned generators do not match the slice shape",
            )
            .with_context("value", format!("{:?}", vg.shape()))
            .with_context("target", format!("{:?}", &self.gen.shape()[1..])));
        }
        self.c.index_axis_mut(Axis(0), index).assign(&vc);
        self.gen.index_axis_mut(Axis(0), index).assign(&vg);
        Ok(())
    }

    /// Collapses one position of the leading axis to a point: the center is
    /// set from a dense tensor and the generators there are zeroed.
    pub fn set_index_dense(&mut self, index: usize, value: &ArrayD<f64>) -> Result<(), ReachError> {
        self.check_lead_indices(&[index], "zonotope.set_index_dense.range")?;
        let target = self.c.shape()[1..].to_vec();
        let view = value.broadcast(IxDyn(&target)).ok_or_else(|| {
            ReachError::shape_mismatch(
                "zonotope.set_index_dense.shape",
                "assigned tensor does not broadcast to the slice shape",
            )
            .with_context("value", format!("{:?}", value.shape()))
            .with_context("target", format!("{target:?}"))
        })?;
        self.c.index_axis_mut(Axis(0), index).assign(&view);
        self.gen.index_axis_mut(Axis(0), index).fill(0.0);
        Ok(())
    }

    /// Collapses one position of the leading axis to a scalar point.
    pub fn set_index_scalar(&mut self, index: usize, value: f64) -> Result<(), ReachError> {
        self.check_lead_indices(&[index], "zonotope.set_index_scalar.range")?;
        self.c.index_axis_mut(Axis(0), index).fill(value);
        self.gen.index_axis_mut(Axis(0), index).fill(0.0);
        Ok(())
    }

    /// Builds an empty batch: all-NaN centers and zero generators.
    pub fn empty(shape: &[usize]) -> ZonoTensor {
        let c = ArrayD::from_elem(IxDyn(shape), f64::NAN);
        let mut gshape = shape.to_vec();
        gshape.push(0);
        Self {
            c,
            gen: ArrayD::zeros(IxDyn(&gshape)),
        }
    }

    /// Builds a batch with uniform random centers and generators.
    ///
    /// Intended for tests and debugging; determinism comes from the caller's
    /// seeded [`RngHandle`].
    pub fn rand(
        gen_num: usize,
        shape: &[usize],
        rng: &mut RngHandle,
    ) -> Result<ZonoTensor, ReachError> {
        if shape.is_empty() {
            return Err(ReachError::Rng(ErrorInfo::new(
                "zonotope.rand.shape",
                "random batches need at least one batch axis",
            )));
        }
        let c = ArrayD::from_shape_fn(IxDyn(shape), |_| rng.gen::<f64>());
        let mut gshape = shape.to_vec();
        gshape.push(gen_num);
        let gen = ArrayD::from_shape_fn(IxDyn(&gshape), |_| rng.gen::<f64>());
        Ok(Self { c, gen })
    }

    /// Builds a degenerate point batch at 0 with zero generators.
    pub fn zeros(gen_num: usize, shape: &[usize]) -> ZonoTensor {
        let c = ArrayD::zeros(IxDyn(shape));
        let mut gshape = shape.to_vec();
        gshape.push(gen_num);
        Self {
            c,
            gen: ArrayD::zeros(IxDyn(&gshape)),
        }
    }

    /// Builds a degenerate point batch at 1 with zero generators.
    pub fn ones(gen_num: usize, shape: &[usize]) -> ZonoTensor {
        let c = ArrayD::ones(IxDyn(shape));
        let mut gshape = shape.to_vec();
        gshape.push(gen_num);
        Self {
            c,
            gen: ArrayD::zeros(IxDyn(&gshape)),
        }
    }
}
