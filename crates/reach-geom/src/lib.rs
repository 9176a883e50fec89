#![deny(missing_docs)]
#![doc = "Geometric set arithmetic for reachability analysis: intervals, batched zonotopes, and sound conversions between them."]

//! Every operation over-approximates: the computed set always contains the
//! true result set. Operations without a sound implementation are explicit
//! [`reach_core::ReachError::NotSupported`] extension points, never silent
//! approximations.

mod arith;
mod convert;
mod interval;
mod model;
mod zonotope;

pub use arith::{Arithmetic, Operand};
pub use convert::{convert, interval_to_zonotope, zonotope_to_interval, GeometrySet};
pub use interval::Interval;
pub use model::{EvalOutput, ModelEval};
pub use zonotope::ZonoTensor;
