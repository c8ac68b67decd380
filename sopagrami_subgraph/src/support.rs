//! Minimum-image-based (MNI) support.
//!
//! The support of a pattern is the minimum, over its vertices, of the number
//! of distinct data vertices that serve as that vertex's image in some
//! embedding. Images are resolved per `(pattern vertex, candidate)`: a
//! candidate already seen in a recorded embedding is confirmed for free,
//! otherwise one pinned stop-at-first search confirms or refutes it. Every
//! embedding found confirms the images of all its vertices at once.

use ahash::AHashSet;
use sopagrami_common::{DataGraph, Params, VertexId};
use tracing::trace;

use crate::pattern::Pattern;
use crate::search::{Embedding, EmbeddingSearch};

/// Result of evaluating one pattern.
#[derive(Clone, Debug, Default)]
pub struct Evaluation {
    /// MNI support; exact when `full_support`, otherwise a lower bound.
    pub support: usize,
    /// Every candidate of every vertex was resolved.
    pub full_support: bool,
    /// Confirmed images per pattern vertex, sorted.
    pub images: Vec<Vec<VertexId>>,
    /// Confirmed plus unresolved candidates per pattern vertex, sorted. A
    /// superset of the true image sets.
    pub viable: Vec<Vec<VertexId>>,
    /// Embeddings recorded while resolving images.
    pub embeddings: Vec<Embedding>,
}

impl Evaluation {
    fn empty(k: usize) -> Self {
        Self {
            support: 0,
            full_support: true,
            images: vec![Vec::new(); k],
            viable: vec![Vec::new(); k],
            embeddings: Vec::new(),
        }
    }

    #[must_use]
    pub const fn is_frequent(&self, tau: usize) -> bool {
        self.support >= tau
    }
}

/// MNI over a set of embeddings: per vertex, count the distinct images, and
/// take the minimum.
#[must_use]
pub fn mni_support(embeddings: &[Embedding], pattern_vertices: usize) -> usize {
    if embeddings.is_empty() {
        return 0;
    }
    (0..pattern_vertices)
        .map(|p| {
            embeddings
                .iter()
                .map(|e| e.image(p))
                .collect::<AHashSet<_>>()
                .len()
        })
        .min()
        .unwrap_or(0)
}

/// Evaluates patterns against one data graph with fixed parameters.
#[derive(Clone, Copy, Debug)]
pub struct SupportEvaluator<'g> {
    graph: &'g DataGraph,
    tau: usize,
    directed: bool,
    full: bool,
}

impl<'g> SupportEvaluator<'g> {
    #[must_use]
    pub const fn new(graph: &'g DataGraph, params: &Params) -> Self {
        Self {
            graph,
            tau: params.tau,
            directed: params.mines_directed(graph.is_directed()),
            full: params.compute_full_support,
        }
    }

    pub const fn tau(&self) -> usize {
        self.tau
    }

    pub const fn directed(&self) -> bool {
        self.directed
    }

    pub const fn graph(&self) -> &'g DataGraph {
        self.graph
    }

    /// Evaluate `pattern`, optionally narrowing its leading vertices to the
    /// parent's viable sets.
    #[must_use]
    pub fn evaluate(&self, pattern: &Pattern, inherited: Option<&[Vec<VertexId>]>) -> Evaluation {
        let k = pattern.num_vertices();
        let Some(mut search) = EmbeddingSearch::new(self.graph, pattern, self.directed) else {
            trace!("{}: label absent from graph", pattern);
            return Evaluation::empty(k);
        };
        if let Some(parent) = inherited {
            search = search.with_inherited(parent);
        }

        if search.domains().iter().any(Vec::is_empty) {
            return Evaluation::empty(k);
        }

        let mut confirmed: Vec<AHashSet<VertexId>> = vec![AHashSet::new(); k];
        let mut embeddings: Vec<Embedding> = Vec::new();
        let mut truncated = false;

        // Smallest domains first: they fail fastest.
        let mut order: Vec<usize> = (0..k).collect();
        order.sort_by_key(|&p| (search.domains()[p].len(), p));

        for p in order {
            if search.domains()[p].len() < self.tau {
                return self.rejected(confirmed, &search, embeddings);
            }

            let candidates = search.domains()[p].clone();
            let plan = search.plan(Some(p));
            let mut refuted: AHashSet<VertexId> = AHashSet::new();
            let mut cursor = 0;

            while cursor < candidates.len() {
                if !self.full && confirmed[p].len() >= self.tau {
                    break;
                }
                let v = candidates[cursor];
                cursor += 1;
                if confirmed[p].contains(&v) {
                    continue;
                }

                match search.find_pinned(&plan, v) {
                    Some(embedding) => {
                        for (q, &image) in embedding.mapping.iter().enumerate() {
                            confirmed[q].insert(image);
                        }
                        embeddings.push(embedding);
                    }
                    None => {
                        refuted.insert(v);
                        if candidates.len() - refuted.len() < self.tau {
                            trace!(
                                "{}: vertex {} cannot reach tau={} ({} refuted of {})",
                                pattern,
                                p,
                                self.tau,
                                refuted.len(),
                                candidates.len()
                            );
                            return self.rejected(confirmed, &search, embeddings);
                        }
                    }
                }
            }

            if candidates[cursor..].iter().any(|v| !confirmed[p].contains(v)) {
                truncated = true;
            }
            if !refuted.is_empty() {
                let keep: Vec<VertexId> = candidates
                    .into_iter()
                    .filter(|v| !refuted.contains(v))
                    .collect();
                search.restrict(p, keep);
            }
        }

        let images = sorted_sets(&confirmed);
        let support = images.iter().map(Vec::len).min().unwrap_or(0);
        let evaluation = Evaluation {
            support,
            full_support: !truncated,
            images,
            viable: search.domains().to_vec(),
            embeddings,
        };
        trace!(
            "{}: support={} full={} embeddings={}",
            pattern,
            evaluation.support,
            evaluation.full_support,
            evaluation.embeddings.len()
        );
        evaluation
    }

    /// Infrequent outcome: some vertex cannot reach `tau` images. The
    /// confirmed counts are only a lower bound at this point.
    fn rejected(
        &self,
        confirmed: Vec<AHashSet<VertexId>>,
        search: &EmbeddingSearch<'_>,
        embeddings: Vec<Embedding>,
    ) -> Evaluation {
        let images = sorted_sets(&confirmed);
        let support = images.iter().map(Vec::len).min().unwrap_or(0);
        Evaluation {
            support,
            full_support: false,
            images,
            viable: search.domains().to_vec(),
            embeddings,
        }
    }
}

fn sorted_sets(sets: &[AHashSet<VertexId>]) -> Vec<Vec<VertexId>> {
    sets.iter()
        .map(|s| {
            let mut v: Vec<VertexId> = s.iter().copied().collect();
            v.sort_unstable();
            v
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use sopagrami_common::GraphBuilder;

    use super::*;
    use crate::pattern::EdgeDir;
    use crate::search::find_embeddings;

    lazy_static::lazy_static! {
        /// Star: centre 0 (B) with leaves 1..=4 (A), plus an isolated A-A edge 5-6.
        static ref STAR: DataGraph = {
            let mut b = GraphBuilder::new(false);
            b.add_vertex("B");
            for _ in 0..4 {
                b.add_vertex("A");
            }
            b.add_vertex("A");
            b.add_vertex("A");
            for leaf in 1..=4 {
                b.add_edge(0, leaf, "x").unwrap();
            }
            b.add_edge(5, 6, "x").unwrap();
            b.build()
        };
    }

    fn params(tau: usize, full: bool) -> Params {
        Params::default().with_tau(tau).with_full_support(full)
    }

    #[test]
    fn star_edge_support_is_bounded_by_the_centre() {
        let p = Pattern::single_edge("A", "x", "B", EdgeDir::Undirected);
        let eval = SupportEvaluator::new(&STAR, &params(1, true)).evaluate(&p, None);
        assert_eq!(eval.support, 1);
        assert!(eval.full_support);
        let a = p.vlab().iter().position(|l| l == "A").unwrap();
        assert_eq!(eval.images[a], vec![1, 2, 3, 4]);
    }

    #[test]
    fn matches_mni_over_all_embeddings() {
        let p = Pattern::single_edge("A", "x", "B", EdgeDir::Undirected)
            .with_new_vertex(1, "A", "x", EdgeDir::Undirected, true);
        let eval = SupportEvaluator::new(&STAR, &params(1, true)).evaluate(&p, None);
        let all = find_embeddings(&STAR, &p, false);
        assert_eq!(eval.support, mni_support(&all, p.num_vertices()));
        assert!(eval.full_support);
    }

    #[test]
    fn threshold_boundary() {
        let p = Pattern::single_edge("A", "x", "A", EdgeDir::Undirected);
        // only 5-6 is an A-A edge: support 2
        let at = SupportEvaluator::new(&STAR, &params(2, true)).evaluate(&p, None);
        assert!(at.is_frequent(2));
        assert_eq!(at.support, 2);
        let above = SupportEvaluator::new(&STAR, &params(3, true)).evaluate(&p, None);
        assert!(!above.is_frequent(3));
    }

    #[test]
    fn short_circuit_reports_lower_bound() {
        let p = Pattern::single_edge("A", "x", "B", EdgeDir::Undirected)
            .with_new_vertex(1, "A", "x", EdgeDir::Undirected, true);
        let a_side = SupportEvaluator::new(&STAR, &params(1, false)).evaluate(&p, None);
        assert!(a_side.is_frequent(1));
        assert!(!a_side.full_support);
        assert!(a_side.support >= 1);
        for (images, viable) in a_side.images.iter().zip(&a_side.viable) {
            assert!(images.iter().all(|v| viable.binary_search(v).is_ok()));
        }
    }

    #[test]
    fn absent_pattern_has_zero_support() {
        let p = Pattern::single_edge("B", "x", "B", EdgeDir::Undirected);
        let eval = SupportEvaluator::new(&STAR, &params(1, true)).evaluate(&p, None);
        assert_eq!(eval.support, 0);
        assert!(eval.full_support);
        assert!(eval.embeddings.is_empty());
    }

    #[test]
    fn mni_of_nothing_is_zero() {
        assert_eq!(mni_support(&[], 3), 0);
    }
}
