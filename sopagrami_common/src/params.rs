//! Configuration for a mining run.
//!
//! `Params` is built once, validated once, and then only read. The knobs are:
//! - tau: minimum MNI support a pattern needs to be reported.
//! - directed: mine arcs as oriented edges. Only honoured when the data graph
//!   itself is directed; an undirected graph is always mined undirected.
//! - sorted_seeds: order the single-edge seeds before dispatch.
//! - num_threads: worker count; zero or negative means every available core.
//! - compute_full_support: count exhaustively (exact) or stop a vertex as soon
//!   as tau is certainly met (lower bound).
//!
//! Quick examples
//!
//! Exact counting on four workers:
//! ```ignore
//! use sopagrami_common::Params;
//! let params = Params::default().with_tau(10).with_threads(4);
//! ```
//!
//! Fast frequent/infrequent classification, directed, unsorted seeds:
//! ```ignore
//! use sopagrami_common::Params;
//! let params = Params::default()
//!     .with_directed(true)
//!     .with_sorted_seeds(false)
//!     .with_full_support(false);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Engine configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    /// Minimum support, must be at least 1.
    pub tau: usize,
    /// Mine directed patterns (requires a directed data graph).
    pub directed: bool,
    /// Order seeds by the selectivity heuristic before scheduling.
    pub sorted_seeds: bool,
    /// Worker count; non-positive resolves to the hardware concurrency.
    pub num_threads: i32,
    /// Exhaustive, exact support counting.
    pub compute_full_support: bool,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            tau: 2,
            directed: false,
            sorted_seeds: true,
            num_threads: 0,
            compute_full_support: true,
        }
    }
}

impl Params {
    /// Set the minimum support.
    #[must_use]
    pub const fn with_tau(mut self, tau: usize) -> Self {
        self.tau = tau;
        self
    }

    /// Set directed mining.
    #[must_use]
    pub const fn with_directed(mut self, directed: bool) -> Self {
        self.directed = directed;
        self
    }

    /// Toggle seed ordering.
    #[must_use]
    pub const fn with_sorted_seeds(mut self, sorted_seeds: bool) -> Self {
        self.sorted_seeds = sorted_seeds;
        self
    }

    /// Set the worker count.
    #[must_use]
    pub const fn with_threads(mut self, num_threads: i32) -> Self {
        self.num_threads = num_threads;
        self
    }

    /// Toggle exact support counting.
    #[must_use]
    pub const fn with_full_support(mut self, compute_full_support: bool) -> Self {
        self.compute_full_support = compute_full_support;
        self
    }

    /// Reject parameter combinations the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParams`] when `tau` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.tau < 1 {
            return Err(Error::invalid_params(format!(
                "tau must be at least 1, got {}",
                self.tau
            )));
        }
        Ok(())
    }

    /// Worker count with the "use everything" convention applied.
    #[must_use]
    pub fn resolved_threads(&self) -> usize {
        match usize::try_from(self.num_threads) {
            Ok(n) if n > 0 => n,
            _ => std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get),
        }
    }

    /// Whether patterns are mined with oriented edges against a graph whose
    /// directedness is `graph_directed`.
    #[must_use]
    pub const fn mines_directed(&self, graph_directed: bool) -> bool {
        self.directed && graph_directed
    }
}
