use crate::boundary::SkipReason;

/// Outcome of a decision step that may legitimately end the run early
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision<T> {
    /// Continue with the decided value
    Proceed(T),
    /// Stop here; the run succeeds without output
    Skip(SkipReason),
}

impl<T> Decision<T> {
    /// Transform the decided value, keeping a skip as is
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Decision<U> {
        match self {
            Decision::Proceed(value) => Decision::Proceed(f(value)),
            Decision::Skip(reason) => Decision::Skip(reason),
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, Decision::Skip(_))
    }
}
