//! Single-edge seeds.

use std::cmp::Reverse;

use ahash::{AHashMap, AHashSet};
use sopagrami_common::{DataGraph, Direction, LabelId, VertexId};
use sopagrami_subgraph::{EdgeDir, Pattern};

/// A single-edge pattern plus the numbers used to rank and prune it.
#[derive(Clone, Debug)]
pub struct Seed {
    pub pattern: Pattern,
    /// Data edges matching the seed.
    pub edges: usize,
    /// Distinct endpoints on the smaller side. For a single edge this is the
    /// exact MNI support.
    pub estimate: usize,
}

/// `(label of a, edge label, label of b)`.
type SeedShape = (LabelId, LabelId, LabelId);

#[derive(Default)]
struct Tally {
    edges: usize,
    left: AHashSet<VertexId>,
    right: AHashSet<VertexId>,
}

impl Tally {
    fn add(&mut self, a: VertexId, b: VertexId, symmetric: bool) {
        self.edges += 1;
        self.left.insert(a);
        self.right.insert(b);
        if symmetric {
            self.left.insert(b);
            self.right.insert(a);
        }
    }
}

/// Every distinct single-edge pattern present in `graph`, in discovery order.
///
/// Directed mining keys seeds by `(source label, edge label, target label)`.
/// Undirected mining folds both endpoint orders into one seed, and counts a
/// pair of opposite arcs with the same label as one connection.
#[must_use]
pub fn enumerate_seeds(graph: &DataGraph, directed: bool) -> Vec<Seed> {
    let mut index: AHashMap<SeedShape, usize> = AHashMap::new();
    let mut shapes: Vec<SeedShape> = Vec::new();
    let mut tallies: Vec<Tally> = Vec::new();

    for u in 0..graph.num_vertices() as VertexId {
        let lu = graph.label_of(u);
        for a in graph.adjacency(u) {
            let v = a.vertex;
            let lv = graph.label_of(v);

            let (shape, from, to) = if directed {
                if a.dir != Direction::Out {
                    continue;
                }
                ((lu, a.label, lv), u, v)
            } else {
                // each connection once: undirected edges and opposite arc
                // pairs from their lower endpoint, lone arcs from the source
                let first_sight = match a.dir {
                    Direction::Both => u < v,
                    Direction::In => false,
                    Direction::Out => {
                        u < v
                            || !graph
                                .edges_between(u, v, a.label)
                                .iter()
                                .any(|e| e.dir == Direction::In)
                    }
                };
                if !first_sight {
                    continue;
                }
                if lu <= lv {
                    ((lu, a.label, lv), u, v)
                } else {
                    ((lv, a.label, lu), v, u)
                }
            };

            let slot = *index.entry(shape).or_insert_with(|| {
                shapes.push(shape);
                tallies.push(Tally::default());
                shapes.len() - 1
            });
            let symmetric = !directed && shape.0 == shape.2;
            tallies[slot].add(from, to, symmetric);
        }
    }

    let dir = EdgeDir::for_mining(directed);
    let labels = graph.labels();
    shapes
        .into_iter()
        .zip(tallies)
        .map(|((la, el, lb), tally)| Seed {
            pattern: Pattern::single_edge(labels.name(la), labels.name(el), labels.name(lb), dir),
            edges: tally.edges,
            estimate: tally.left.len().min(tally.right.len()),
        })
        .collect()
}

/// Largest subtrees first: more matching edges, then a higher estimate, then
/// key order.
pub fn order_seeds(seeds: &mut [Seed]) {
    seeds.sort_by(|x, y| {
        (Reverse(x.edges), Reverse(x.estimate), x.pattern.key()).cmp(&(
            Reverse(y.edges),
            Reverse(y.estimate),
            y.pattern.key(),
        ))
    });
}
