//! Frequent subgraph mining over a single labelled graph.
//!
//! [`run_sopagrami`] seeds the search with every single-edge pattern of the
//! graph, grows each seed's subtree on a worker thread, and returns every
//! connected pattern whose minimum-image support reaches `tau`.
//!
//! ```ignore
//! use sopagrami_common::{DataGraph, Params};
//! use sopagrami_miner::run_sopagrami;
//!
//! let graph = DataGraph::load_from_lg("citeseer.lg", false)?;
//! let out = run_sopagrami(&graph, &Params::default().with_tau(100))?;
//! for found in &out.frequent_patterns {
//!     println!("{} support={}", found.pat, found.support);
//! }
//! ```

mod extend;
mod output;
mod scheduler;
mod seeds;

pub use extend::extend;
pub use output::{Found, MiningStats, Output};
pub use scheduler::run_sopagrami;
pub use seeds::{Seed, enumerate_seeds, order_seeds};
