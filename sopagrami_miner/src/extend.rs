//! Candidate extension: children one edge larger than a frequent parent.
//!
//! Children are drawn from the data around the parent's viable image sets, so
//! only edges that actually occur next to a possible image are proposed.
//! Every child keeps the parent's vertex numbering, which lets the scheduler
//! hand the parent's viable sets down as the child's starting domains.

use ahash::AHashSet;
use sopagrami_common::{DataGraph, Direction, LabelId};
use sopagrami_subgraph::{EdgeDir, Evaluation, Pattern};
use tracing::trace;

/// One proposed edge, before it is turned into a pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Growth {
    /// New vertex with `label` attached to `at`; `outgoing` orients a
    /// directed edge away from `at`.
    Vertex {
        at: usize,
        label: LabelId,
        el: LabelId,
        outgoing: bool,
    },
    /// Edge `a -> b` (or `a - b`) between existing vertices.
    Closing { a: usize, b: usize, el: LabelId },
}

/// Children of `parent` reachable from its evaluation, deduplicated by key.
///
/// `directed` must be the effective mining direction: with it only arcs are
/// followed and children carry [`EdgeDir::Forward`] edges, otherwise every
/// connection is proposed as an undirected edge.
#[must_use]
pub fn extend(
    graph: &DataGraph,
    parent: &Pattern,
    evaluation: &Evaluation,
    directed: bool,
) -> Vec<Pattern> {
    let k = parent.num_vertices();
    let mut proposals: AHashSet<Growth> = AHashSet::new();
    let mut ordered: Vec<Growth> = Vec::new();
    let mut propose = |g: Growth| {
        if proposals.insert(g) {
            ordered.push(g);
        }
    };

    for (i, images) in evaluation.viable.iter().enumerate().take(k) {
        for &d in images {
            for a in graph.adjacency(d) {
                let outgoing = a.dir != Direction::In;
                propose(Growth::Vertex {
                    at: i,
                    label: graph.label_of(a.vertex),
                    el: a.label,
                    outgoing: !directed || outgoing,
                });

                for (j, other) in evaluation.viable.iter().enumerate().take(k) {
                    if j == i || other.binary_search(&a.vertex).is_err() {
                        continue;
                    }
                    let (x, y) = if directed {
                        if outgoing { (i, j) } else { (j, i) }
                    } else {
                        (i.min(j), i.max(j))
                    };
                    propose(Growth::Closing { a: x, b: y, el: a.label });
                }
            }
        }
    }

    let dir = EdgeDir::for_mining(directed);
    let labels = graph.labels();
    let mut seen: AHashSet<String> = AHashSet::new();
    let children: Vec<Pattern> = ordered
        .into_iter()
        .filter_map(|g| match g {
            Growth::Vertex {
                at,
                label,
                el,
                outgoing,
            } => Some(parent.with_new_vertex(
                at,
                labels.name(label),
                labels.name(el),
                dir,
                outgoing,
            )),
            Growth::Closing { a, b, el } => parent.with_closing_edge(a, b, labels.name(el), dir),
        })
        .filter(|child| seen.insert(child.key().to_owned()))
        .collect();

    trace!("{}: {} children", parent, children.len());
    children
}

#[cfg(test)]
mod tests {
    use sopagrami_common::{GraphBuilder, Params};
    use sopagrami_subgraph::SupportEvaluator;

    use super::*;

    fn evaluate(graph: &DataGraph, p: &Pattern, directed: bool) -> Evaluation {
        let params = Params::default().with_tau(1).with_directed(directed);
        SupportEvaluator::new(graph, &params).evaluate(p, None)
    }

    fn keys(children: &[Pattern]) -> Vec<String> {
        let mut keys: Vec<String> = children.iter().map(|c| c.key().to_owned()).collect();
        keys.sort();
        keys
    }

    #[test]
    fn triangle_edge_grows_into_a_path_only() {
        let mut b = GraphBuilder::new(false);
        for _ in 0..3 {
            b.add_vertex("A");
        }
        for (u, v) in [(0, 1), (1, 2), (2, 0)] {
            b.add_edge(u, v, "x").unwrap();
        }
        let g = b.build();

        let edge = Pattern::single_edge("A", "x", "A", EdgeDir::Undirected);
        let children = extend(&g, &edge, &evaluate(&g, &edge, false), false);
        let path = edge.with_new_vertex(1, "A", "x", EdgeDir::Undirected, true);
        assert_eq!(keys(&children), vec![path.key().to_owned()]);

        let grown = extend(&g, &path, &evaluate(&g, &path, false), false);
        let triangle = path
            .with_closing_edge(0, 2, "x", EdgeDir::Undirected)
            .unwrap();
        assert!(grown.contains(&triangle));
        assert!(grown.iter().all(|c| c.num_edges() == 3));
    }

    #[test]
    fn directed_children_follow_arc_orientation() {
        // 0:A -> 1:B <- 2:C
        let mut b = GraphBuilder::new(true);
        for l in ["A", "B", "C"] {
            b.add_vertex(l);
        }
        b.add_edge(0, 1, "x").unwrap();
        b.add_edge(2, 1, "y").unwrap();
        let g = b.build();

        let seed = Pattern::single_edge("A", "x", "B", EdgeDir::Forward);
        let children = extend(&g, &seed, &evaluate(&g, &seed, true), true);
        let expected = seed.with_new_vertex(1, "C", "y", EdgeDir::Forward, false);
        let reversed = seed.with_new_vertex(1, "C", "y", EdgeDir::Forward, true);
        assert_eq!(expected.pedges()[1].a, 2);
        assert!(children.contains(&expected));
        assert!(!children.contains(&reversed));
        // A->B plus a second B, A->B<-A, and B<-C
        assert_eq!(children.len(), 3);
    }

    #[test]
    fn lone_edge_only_proposes_its_own_neighbourhood() {
        let mut b = GraphBuilder::new(false);
        b.add_vertex("A");
        b.add_vertex("B");
        b.add_edge(0, 1, "x").unwrap();
        let g = b.build();

        let seed = Pattern::single_edge("A", "x", "B", EdgeDir::Undirected);
        let children = extend(&g, &seed, &evaluate(&g, &seed, false), false);
        // B-A-B and A-B-A; the seed edge itself is never re-proposed
        assert_eq!(children.len(), 2);
        assert!(
            children
                .iter()
                .all(|c| c.num_vertices() == 3 && c.num_edges() == 2)
        );
    }
}
