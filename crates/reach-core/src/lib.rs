#![deny(missing_docs)]
#![doc = "Core error taxonomy, geometry discriminant, and deterministic RNG shared by the reach set-arithmetic crates."]

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

pub mod errors;
pub mod rng;

pub use errors::{ErrorInfo, ReachError};
pub use rng::{derive_substream_seed, RngHandle};

/// Discriminant identifying the concrete set representation of a geometry
/// object.
///
/// Conversion routines and mixed-type operators dispatch on this tag.
/// External code may introduce new kinds; every new kind requires matching
/// conversion-pair entries, so the enum is non-exhaustive and undefined
/// pairs fail with [`ReachError::NotSupported`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum SetKind {
    /// Axis-aligned box set with independent lower/upper bounds.
    Interval,
    /// Center-plus-generator convex set, possibly batched as a tensor.
    Zonotope,
    /// Half-space/vertex polyhedral set (owned by an external collaborator).
    Polytope,
}

impl Display for SetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SetKind::Interval => "interval",
            SetKind::Zonotope => "zonotope",
            SetKind::Polytope => "polytope",
        };
        write!(f, "{name}")
    }
}
