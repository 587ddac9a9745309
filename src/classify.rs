use crate::geom::Point;
use crate::library::ReferenceShape;

/// Best-match result for a candidate against a reference set.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: String,
    /// Confidence in [0, 1]; higher is closer.
    pub score: f64,
}

/// The shape-matching boundary. Implementations must be pure: same inputs,
/// same answer, no observable side effects. Returns `None` only for an empty
/// reference set; how ties break is the implementation's business.
pub trait Classifier {
    fn classify(&self, candidate: &[Point], references: &[ReferenceShape])
        -> Option<Classification>;
}
