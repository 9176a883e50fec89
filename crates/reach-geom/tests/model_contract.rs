use ndarray::{arr1, ArrayD};
use reach_core::{ReachError, SetKind};
use reach_geom::{Arithmetic, EvalOutput, GeometrySet, Interval, ModelEval, Operand, ZonoTensor};

/// Minimal affine flow model: order 0 emits the numeric flow, order 1 emits
/// a zonotope enclosure of the Jacobian action on the state.
struct AffineModel {
    slope: f64,
}

impl ModelEval for AffineModel {
    fn evaluate(
        &self,
        state: &ArrayD<f64>,
        input: &ArrayD<f64>,
        order: usize,
        _index: usize,
    ) -> Result<EvalOutput, ReachError> {
        match order {
            0 => Ok(EvalOutput::Numeric(state * self.slope + input)),
            1 => {
                let gen = state.mapv(|v| v.abs() * 0.1).insert_axis(ndarray::Axis(state.ndim()));
                let zono = ZonoTensor::new(state * self.slope, gen)?;
                Ok(EvalOutput::Zonotope(zono))
            }
            _ => Err(ReachError::not_supported(
                "model.evaluate.order",
                "derivative orders above 1 are not implemented",
            )),
        }
    }
}

#[test]
fn numeric_outputs_feed_set_arithmetic() {
    let model = AffineModel { slope: 2.0 };
    let state = arr1(&[1.0, -2.0]).into_dyn();
    let input = arr1(&[0.5, 0.5]).into_dyn();

    let output = model.evaluate(&state, &input, 0, 0).unwrap();
    assert_eq!(output.kind(), None);
    let flow = match output {
        EvalOutput::Numeric(flow) => flow,
        other => panic!("expected a numeric flow, got {other:?}"),
    };

    let zono = ZonoTensor::zeros(1, &[2]);
    let shifted = Arithmetic::add(&zono, &Operand::Dense(flow)).unwrap();
    assert_eq!(shifted.kind(), SetKind::Zonotope);
    let shifted = shifted.as_zonotope().unwrap();
    assert_eq!(shifted.c(), &arr1(&[2.5, -3.5]).into_dyn());
}

#[test]
fn set_outputs_dispatch_through_the_capability_trait() {
    let model = AffineModel { slope: 1.0 };
    let state = arr1(&[1.0, 2.0]).into_dyn();
    let input = arr1(&[0.0, 0.0]).into_dyn();

    let output = model.evaluate(&state, &input, 1, 0).unwrap();
    assert_eq!(output.kind(), Some(SetKind::Zonotope));
    let jacobian = match output {
        EvalOutput::Zonotope(zono) => zono,
        other => panic!("expected a zonotope, got {other:?}"),
    };

    let doubled = Arithmetic::multiply(&jacobian, &Operand::Scalar(2.0)).unwrap();
    assert_eq!(doubled.as_zonotope().unwrap().c(), &arr1(&[2.0, 4.0]).into_dyn());

    // Mixed-representation operands stay explicit gaps.
    let interval = Interval::scalar(0.0, 1.0).unwrap();
    let err = Arithmetic::add(
        &jacobian,
        &Operand::Set(GeometrySet::Interval(interval)),
    )
    .unwrap_err();
    assert!(matches!(err, ReachError::NotSupported(_)));
}

#[test]
fn higher_orders_are_rejected_at_the_boundary() {
    let model = AffineModel { slope: 1.0 };
    let state = arr1(&[1.0]).into_dyn();
    let err = model.evaluate(&state, &state, 2, 0).unwrap_err();
    assert!(matches!(err, ReachError::NotSupported(_)));
}
