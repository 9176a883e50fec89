//! Contract for the dynamic-model collaborator.
//!
//! Model definition and evaluation live outside this crate; the core only
//! consumes the numeric or set-typed tensors a model emits. The trait pins
//! down that boundary so operator code and tests can drive collaborator
//! outputs generically.

use ndarray::ArrayD;

use reach_core::{ReachError, SetKind};

use crate::interval::Interval;
use crate::zonotope::ZonoTensor;

/// Operand forms a model evaluation may produce.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalOutput {
    /// A plain numeric tensor (e.g. a flow or Jacobian sample).
    Numeric(ArrayD<f64>),
    /// An interval-valued tensor.
    Interval(Interval),
    /// A zonotope-valued tensor.
    Zonotope(ZonoTensor),
}

impl EvalOutput {
    /// Returns the set discriminant of the output, or `None` for plain
    /// numeric tensors.
    pub fn kind(&self) -> Option<SetKind> {
        match self {
            EvalOutput::Numeric(_) => None,
            EvalOutput::Interval(_) => Some(SetKind::Interval),
            EvalOutput::Zonotope(_) => Some(SetKind::Zonotope),
        }
    }
}

/// Evaluation contract for dynamic models.
///
/// `order` selects the derivative order of the requested tensor (0 for the
/// flow itself, 1 for the Jacobian, and so on) and `index` selects among
/// same-order outputs. Implementations are black boxes; the core never
/// inspects them beyond this method.
pub trait ModelEval {
    /// Evaluates the model at a state/input pair.
    fn evaluate(
        &self,
        state: &ArrayD<f64>,
        input: &ArrayD<f64>,
        order: usize,
        index: usize,
    ) -> Result<EvalOutput, ReachError>;
}
