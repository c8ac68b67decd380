use std::time::Duration;

use serde::Serialize;
use sopagrami_subgraph::Pattern;

/// A frequent pattern as reported by a run.
#[derive(Clone, Debug, Serialize)]
pub struct Found {
    pub pat: Pattern,
    /// MNI support; at least `tau`.
    pub support: usize,
    /// `support` is the exact count rather than a lower bound.
    pub full_support: bool,
}

impl Found {
    /// Merge rule for two reports of the same key: an exact count replaces a
    /// lower bound, otherwise the first report stays.
    pub(crate) fn absorb(&mut self, other: Self) {
        if other.full_support && !self.full_support {
            *self = other;
        }
    }
}

/// Counters for one run.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct MiningStats {
    /// Distinct single-edge seeds in the graph.
    pub seeds: usize,
    /// Seeds dropped because they cannot reach `tau`.
    pub pruned_seeds: usize,
    /// Candidate patterns whose support was evaluated.
    pub evaluated: usize,
    pub elapsed: Duration,
}

/// Result of a run: one entry per distinct canonical key, sorted by edge
/// count and then key.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Output {
    pub frequent_patterns: Vec<Found>,
    pub stats: MiningStats,
}

impl Output {
    #[must_use]
    pub fn len(&self) -> usize {
        self.frequent_patterns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frequent_patterns.is_empty()
    }

    /// Look up a pattern by canonical key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Found> {
        self.frequent_patterns.iter().find(|f| f.pat.key() == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.frequent_patterns.iter().map(|f| f.pat.key())
    }
}
