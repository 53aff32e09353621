use crate::point::Point3;
use crate::qeds::EdgeTarget;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LocateError {
    /// The walk did not reach the target. This means the mesh topology is
    /// broken, the subdivision must not be used any further.
    #[error("locating ({x}, {y}) did not converge after {steps} steps, last edge {last_edge:?}")]
    NoConvergence {
        x: f64,
        y: f64,
        steps: usize,
        last_edge: EdgeTarget,
    },
    #[error("({x}, {y}) lies outside the frame of the subdivision")]
    OutsideFrame { x: f64, y: f64 },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConformingError {
    #[error(transparent)]
    Locate(#[from] LocateError),
    /// Splitting constraint segments did not settle within the pass limit.
    #[error("too many splitting passes ({passes}) while enforcing constraints, last split point was {split_point}")]
    NonConvergence { passes: usize, split_point: Point3 },
}
