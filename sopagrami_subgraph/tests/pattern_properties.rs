use std::sync::OnceLock;

use quickcheck::{Arbitrary, Gen, quickcheck};
use rstest::rstest;

use sopagrami_common::{DataGraph, GraphBuilder, Params};
use sopagrami_subgraph::{EdgeDir, PEdge, Pattern, SupportEvaluator, find_embeddings, mni_support};

fn init_test_logger() {
    static INIT: OnceLock<()> = OnceLock::new();
    let _ = INIT.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

const VERTEX_LABELS: [&str; 3] = ["A", "B", "C:1"];
const EDGE_LABELS: [&str; 2] = ["x", "y-z"];

/// A random connected pattern together with a random relabelling of its
/// vertices.
#[derive(Clone, Debug)]
struct PermutedPattern {
    vlab: Vec<String>,
    pedges: Vec<PEdge>,
    perm: Vec<usize>,
}

impl PermutedPattern {
    fn original(&self) -> Pattern {
        Pattern::new(self.vlab.clone(), self.pedges.clone()).unwrap()
    }

    fn permuted(&self) -> Pattern {
        let mut vlab = vec![String::new(); self.vlab.len()];
        for (v, l) in self.vlab.iter().enumerate() {
            vlab[self.perm[v]] = l.clone();
        }
        let mut pedges: Vec<PEdge> = self
            .pedges
            .iter()
            .map(|e| PEdge::new(self.perm[e.a], self.perm[e.b], e.el.clone(), e.dir))
            .collect();
        pedges.reverse();
        Pattern::new(vlab, pedges).unwrap()
    }
}

impl Arbitrary for PermutedPattern {
    fn arbitrary(g: &mut Gen) -> Self {
        let n = 2 + usize::arbitrary(g) % 5;
        let dir = if bool::arbitrary(g) {
            EdgeDir::Forward
        } else {
            EdgeDir::Undirected
        };
        let vlab: Vec<String> = (0..n)
            .map(|_| (*g.choose(&VERTEX_LABELS).unwrap()).to_owned())
            .collect();

        // spanning tree first, then a few extra edges
        let mut pedges: Vec<PEdge> = Vec::new();
        for v in 1..n {
            let u = usize::arbitrary(g) % v;
            let el = *g.choose(&EDGE_LABELS).unwrap();
            let (a, b) = if bool::arbitrary(g) { (u, v) } else { (v, u) };
            pedges.push(PEdge::new(a, b, el, dir));
        }
        for _ in 0..usize::arbitrary(g) % 4 {
            let a = usize::arbitrary(g) % n;
            let b = usize::arbitrary(g) % n;
            let edge = PEdge::new(a, b, *g.choose(&EDGE_LABELS).unwrap(), dir);
            if a != b && !pedges.iter().any(|e| e.same_edge(&edge)) {
                pedges.push(edge);
            }
        }

        let mut perm: Vec<usize> = (0..n).collect();
        for i in (1..n).rev() {
            perm.swap(i, usize::arbitrary(g) % (i + 1));
        }
        Self { vlab, pedges, perm }
    }
}

/// Small random data graph over two vertex labels and two edge labels.
#[derive(Clone, Debug)]
struct SmallGraph(DataGraph);

impl Arbitrary for SmallGraph {
    fn arbitrary(g: &mut Gen) -> Self {
        let n = 2 + usize::arbitrary(g) % 7;
        let mut b = GraphBuilder::new(bool::arbitrary(g));
        for _ in 0..n {
            b.add_vertex(*g.choose(&["A", "B"]).unwrap());
        }
        for _ in 0..usize::arbitrary(g) % 14 {
            let u = (usize::arbitrary(g) % n) as u32;
            let v = (usize::arbitrary(g) % n) as u32;
            b.add_edge(u, v, *g.choose(&["x", "y"]).unwrap()).unwrap();
        }
        Self(b.build())
    }
}

/// Each pattern is the previous one plus one edge.
fn growth_chain() -> Vec<Pattern> {
    let p0 = Pattern::single_edge("A", "x", "A", EdgeDir::Undirected);
    let p1 = p0.with_new_vertex(1, "B", "x", EdgeDir::Undirected, true);
    let p2 = p1.with_new_vertex(0, "B", "y", EdgeDir::Undirected, true);
    let p3 = p2.with_closing_edge(2, 3, "x", EdgeDir::Undirected).unwrap();
    vec![p0, p1, p2, p3]
}

quickcheck! {
    fn prop_key_is_invariant_under_relabelling(p: PermutedPattern) -> bool {
        p.original().key() == p.permuted().key()
    }

    fn prop_support_never_grows_along_an_extension(graph: SmallGraph) -> bool {
        let chain = growth_chain();
        let supports: Vec<usize> = chain
            .iter()
            .map(|p| mni_support(&find_embeddings(&graph.0, p, false), p.num_vertices()))
            .collect();
        supports.windows(2).all(|w| w[1] <= w[0])
    }

    fn prop_exact_evaluation_matches_full_enumeration(graph: SmallGraph) -> bool {
        let params = Params::default().with_tau(1).with_full_support(true);
        let evaluator = SupportEvaluator::new(&graph.0, &params);
        growth_chain().iter().all(|p| {
            let all = find_embeddings(&graph.0, p, false);
            evaluator.evaluate(p, None).support == mni_support(&all, p.num_vertices())
        })
    }
}

#[rstest]
#[case::edge_label(
    Pattern::single_edge("A", "x", "B", EdgeDir::Undirected),
    Pattern::single_edge("A", "y", "B", EdgeDir::Undirected)
)]
#[case::direction_marker(
    Pattern::single_edge("A", "x", "B", EdgeDir::Undirected),
    Pattern::single_edge("A", "x", "B", EdgeDir::Forward)
)]
#[case::arc_orientation(
    Pattern::single_edge("A", "x", "B", EdgeDir::Forward),
    Pattern::single_edge("B", "x", "A", EdgeDir::Forward)
)]
#[case::path_vs_star(
    Pattern::single_edge("A", "x", "A", EdgeDir::Undirected)
        .with_new_vertex(1, "A", "x", EdgeDir::Undirected, true)
        .with_new_vertex(2, "A", "x", EdgeDir::Undirected, true),
    Pattern::single_edge("A", "x", "A", EdgeDir::Undirected)
        .with_new_vertex(1, "A", "x", EdgeDir::Undirected, true)
        .with_new_vertex(1, "A", "x", EdgeDir::Undirected, true)
)]
fn distinct_shapes_get_distinct_keys(#[case] left: Pattern, #[case] right: Pattern) {
    init_test_logger();
    assert_ne!(left.key(), right.key());
}

#[test]
fn growth_paths_meet_at_the_same_key() {
    init_test_logger();
    // A-B-C path grown from either end
    let from_a = Pattern::single_edge("A", "x", "B", EdgeDir::Undirected)
        .with_new_vertex(1, "C", "y", EdgeDir::Undirected, true);
    let from_c = Pattern::single_edge("C", "y", "B", EdgeDir::Undirected)
        .with_new_vertex(1, "A", "x", EdgeDir::Undirected, true);
    assert_eq!(from_a, from_c);
}
