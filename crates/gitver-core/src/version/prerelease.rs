//! The optional `-alphaN` slot.

use std::fmt;

use super::PRERELEASE_TAG;

/// Pre-release counter. `None` is the unallocated state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PreRelease(Option<u64>);

impl PreRelease {
    /// No pre-release.
    pub const NONE: Self = Self(None);

    /// A present slot with the given counter.
    pub const fn new(counter: u64) -> Self {
        Self(Some(counter))
    }

    /// Whether the slot renders at all.
    pub const fn is_present(&self) -> bool {
        self.0.is_some()
    }

    /// The counter, if present.
    pub const fn counter(&self) -> Option<u64> {
        self.0
    }

    /// Advance by one. An absent slot becomes `alpha0`.
    #[must_use]
    pub const fn incremented(self) -> Self {
        match self.0 {
            Some(n) => Self(Some(n.saturating_add(1))),
            None => Self(Some(0)),
        }
    }

    /// Return to the absent state.
    #[must_use]
    pub const fn cleared(self) -> Self {
        Self::NONE
    }
}

impl fmt::Display for PreRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(n) => write!(f, "-{PRERELEASE_TAG}{n}"),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_renders_nothing() {
        assert_eq!(PreRelease::NONE.to_string(), "");
        assert!(!PreRelease::NONE.is_present());
        assert_eq!(PreRelease::NONE.counter(), None);
    }

    #[test]
    fn present_renders_counter() {
        assert_eq!(PreRelease::new(3).to_string(), "-alpha3");
    }

    #[test]
    fn increment_allocates_then_advances() {
        let first = PreRelease::NONE.incremented();
        assert_eq!(first.counter(), Some(0));
        assert_eq!(first.incremented().counter(), Some(1));
    }

    #[test]
    fn cleared_is_absent() {
        assert_eq!(PreRelease::new(7).cleared(), PreRelease::NONE);
    }
}
