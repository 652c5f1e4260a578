use serde::{Deserialize, Serialize};
use std::fmt;

/// How the particles of one advance are distributed over workers.
///
/// The choice only affects scheduling. Every policy produces the same coordinates and stream
/// states to the bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionPolicy {
    /// One loop over all particle indices on the calling thread.
    #[default]
    Sequential,
    /// Particles spread over the rayon thread pool. Falls back to the sequential loop when the
    /// crate is built without the `parallel` feature.
    Parallel,
}

impl ExecutionPolicy {
    pub fn label(self) -> &'static str {
        match self {
            ExecutionPolicy::Sequential => "sequential",
            ExecutionPolicy::Parallel => "parallel",
        }
    }

    /// Whether [`ExecutionPolicy::Parallel`] really runs concurrently in this build.
    pub fn parallel_available() -> bool {
        cfg!(feature = "parallel")
    }
}

impl fmt::Display for ExecutionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_sequential() {
        assert_eq!(ExecutionPolicy::default(), ExecutionPolicy::Sequential);
    }

    #[test]
    fn labels_match_display() {
        assert_eq!(ExecutionPolicy::Sequential.to_string(), "sequential");
        assert_eq!(ExecutionPolicy::Parallel.to_string(), "parallel");
    }
}
