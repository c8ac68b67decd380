//! Mining scheduler.
//!
//! A run goes through four phases:
//! 1. Seed: enumerate the single-edge patterns of the graph and drop the ones
//!    whose support is already below tau.
//! 2. Order: optionally rank the seeds so the largest subtrees start first.
//! 3. Dispatch: a rayon pool hands out one seed per task; each task grows its
//!    subtree depth-first on a local stack (evaluate, extend, push children).
//! 4. Merge: frequent patterns land in a shared map keyed by canonical key.
//!
//! A shared visited set is claimed before any candidate is evaluated, so each
//! shape is evaluated exactly once per run no matter how many parents or
//! seeds reach it.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use dashmap::{DashMap, DashSet};
use rayon::prelude::*;
use sopagrami_common::{DataGraph, Error, Params, Result, VertexId};
use sopagrami_subgraph::{Pattern, SupportEvaluator};
use tracing::{debug, info, trace, warn};

use crate::extend::extend;
use crate::output::{Found, MiningStats, Output};
use crate::seeds::{Seed, enumerate_seeds, order_seeds};

/// Domains a child inherits from its parent; shared by all siblings.
type Inherited = Arc<[Vec<VertexId>]>;

/// Shared state of one run.
struct Miner<'g> {
    evaluator: SupportEvaluator<'g>,
    visited: DashSet<String>,
    results: DashMap<String, Found>,
    evaluated: AtomicUsize,
}

impl<'g> Miner<'g> {
    fn new(evaluator: SupportEvaluator<'g>) -> Self {
        Self {
            evaluator,
            visited: DashSet::new(),
            results: DashMap::new(),
            evaluated: AtomicUsize::new(0),
        }
    }

    /// Claim `pattern` for evaluation; false if some task already did.
    fn claim(&self, pattern: &Pattern) -> bool {
        self.visited.insert(pattern.key().to_owned())
    }

    fn record(&self, found: Found) {
        self.results
            .entry(found.pat.key().to_owned())
            .and_modify(|existing| existing.absorb(found.clone()))
            .or_insert(found);
    }

    /// Grow the whole subtree below `seed`.
    fn grow(&self, seed: Seed) {
        if !self.claim(&seed.pattern) {
            return;
        }
        let graph = self.evaluator.graph();
        let tau = self.evaluator.tau();
        let directed = self.evaluator.directed();
        let root = seed.pattern.to_string();

        let mut stack: Vec<(Pattern, Option<Inherited>)> = vec![(seed.pattern, None)];
        let mut evaluated = 0usize;
        let mut frequent = 0usize;

        while let Some((pattern, inherited)) = stack.pop() {
            let evaluation = self.evaluator.evaluate(&pattern, inherited.as_deref());
            evaluated += 1;
            if !evaluation.is_frequent(tau) {
                trace!("{}: infrequent (support {})", pattern, evaluation.support);
                continue;
            }
            frequent += 1;

            let children = extend(graph, &pattern, &evaluation, directed);
            if !children.is_empty() {
                let viable: Inherited = evaluation.viable.into();
                for child in children {
                    if self.claim(&child) {
                        stack.push((child, Some(Arc::clone(&viable))));
                    }
                }
            }

            self.record(Found {
                pat: pattern,
                support: evaluation.support,
                full_support: evaluation.full_support,
            });
        }

        self.evaluated.fetch_add(evaluated, Ordering::Relaxed);
        debug!(
            "Seed {}: {} evaluated, {} frequent",
            root, evaluated, frequent
        );
    }

    fn into_patterns(self) -> Vec<Found> {
        let mut patterns: Vec<Found> = self.results.into_iter().map(|(_, f)| f).collect();
        patterns.sort_by(|x, y| {
            (x.pat.num_edges(), x.pat.key()).cmp(&(y.pat.num_edges(), y.pat.key()))
        });
        patterns
    }
}

/// Mine every frequent connected pattern of `graph` under `params`.
///
/// # Errors
///
/// Returns [`Error::InvalidParams`] before any work when the parameters do
/// not validate, and [`Error::ThreadPool`] when the worker pool cannot be
/// created.
pub fn run_sopagrami(graph: &DataGraph, params: &Params) -> Result<Output> {
    params.validate()?;
    let started = Instant::now();

    let threads = params.resolved_threads();
    let evaluator = SupportEvaluator::new(graph, params);
    let directed = evaluator.directed();
    if params.directed && !graph.is_directed() {
        warn!("Directed mining requested on an undirected graph; mining undirected");
    }
    info!(
        "Mining |V|={} |E|={} with tau={} directed={} sorted={} threads={} full={}",
        graph.num_vertices(),
        graph.num_edges(),
        params.tau,
        directed,
        params.sorted_seeds,
        threads,
        params.compute_full_support
    );

    let mut seeds = enumerate_seeds(graph, directed);
    let total_seeds = seeds.len();
    seeds.retain(|s| {
        let keep = s.estimate >= params.tau;
        if !keep {
            debug!("Pruned seed {} (support {})", s.pattern, s.estimate);
        }
        keep
    });
    let pruned_seeds = total_seeds - seeds.len();
    if params.sorted_seeds {
        order_seeds(&mut seeds);
    }
    info!(
        "{} seeds, {} pruned below tau, {} dispatched",
        total_seeds,
        pruned_seeds,
        seeds.len()
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("sopagrami-{i}"))
        .build()
        .map_err(|e| Error::thread_pool(e.to_string()))?;

    let miner = Miner::new(evaluator);
    pool.install(|| {
        seeds
            .into_par_iter()
            .with_max_len(1)
            .for_each(|seed| miner.grow(seed));
    });

    let evaluated = miner.evaluated.load(Ordering::Relaxed);
    let frequent_patterns = miner.into_patterns();
    let stats = MiningStats {
        seeds: total_seeds,
        pruned_seeds,
        evaluated,
        elapsed: started.elapsed(),
    };
    info!(
        "Found {} frequent patterns ({} candidates evaluated) in {:?}",
        frequent_patterns.len(),
        stats.evaluated,
        stats.elapsed
    );

    Ok(Output {
        frequent_patterns,
        stats,
    })
}
