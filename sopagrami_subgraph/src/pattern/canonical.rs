//! Canonical labelling of patterns.
//!
//! Colour refinement seeded by vertex labels, then individualization of the
//! first non-singleton colour class, recursively, until every vertex has its
//! own colour. Each leaf fixes a vertex order; the canonical form is the
//! smallest `(labels, edges)` encoding over all leaves. Branches related by a
//! transposition automorphism are visited once.

use ahash::AHashSet;
use itertools::Itertools;

use super::{EdgeDir, Pattern};

/// `(a, b, edge label, direction code)` after relabelling.
pub type CanonicalEdge = (usize, usize, String, u8);

/// Relabelling-invariant encoding of a pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanonicalForm {
    labels: Vec<String>,
    edges: Vec<CanonicalEdge>,
    order: Vec<usize>,
}

impl CanonicalForm {
    /// Vertex labels in canonical order.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Sorted edges over canonical positions.
    #[must_use]
    pub fn edges(&self) -> &[CanonicalEdge] {
        &self.edges
    }

    /// `order[pos]` is the original vertex placed at canonical position `pos`.
    #[must_use]
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    fn encoding(&self) -> (&[String], &[CanonicalEdge]) {
        (&self.labels, &self.edges)
    }

    /// Text key, e.g. `v:A,B|e:0-1:x:0`.
    #[must_use]
    pub fn to_key(&self) -> String {
        let labels = self.labels.iter().map(|l| escape(l)).join(",");
        let edges = self
            .edges
            .iter()
            .map(|(a, b, el, dir)| format!("{a}-{b}:{}:{dir}", escape(el)))
            .join(",");
        format!("v:{labels}|e:{edges}")
    }
}

fn escape(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for ch in label.chars() {
        if matches!(ch, '\\' | ',' | '|' | ':' | '-') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Dense ranks of `items` under their ordering.
fn rank<T: Ord>(items: &[T]) -> Vec<usize> {
    let sorted: Vec<&T> = items.iter().sorted().dedup().collect();
    items
        .iter()
        .map(|x| sorted.partition_point(|s| *s < x))
        .collect()
}

fn class_count(colors: &[usize]) -> usize {
    colors.iter().max().map_or(0, |m| m + 1)
}

/// Edge role seen from one endpoint: 0 undirected, 1 outgoing, 2 incoming.
type Around<'a> = (&'a str, u8, usize);

struct Canonizer<'a> {
    pattern: &'a Pattern,
    nbrs: Vec<Vec<Around<'a>>>,
    edge_set: AHashSet<(usize, usize, &'a str, EdgeDir)>,
    best: Option<CanonicalForm>,
}

fn normalized(a: usize, b: usize, el: &str, dir: EdgeDir) -> (usize, usize, &str, EdgeDir) {
    if dir == EdgeDir::Undirected && a > b {
        (b, a, el, dir)
    } else {
        (a, b, el, dir)
    }
}

impl<'a> Canonizer<'a> {
    fn new(pattern: &'a Pattern) -> Self {
        let mut nbrs: Vec<Vec<Around<'a>>> = vec![Vec::new(); pattern.num_vertices()];
        let mut edge_set = AHashSet::new();
        for e in pattern.pedges() {
            let el = e.el.as_str();
            let (role_a, role_b) = match e.dir {
                EdgeDir::Undirected => (0, 0),
                EdgeDir::Forward => (1, 2),
            };
            nbrs[e.a].push((el, role_a, e.b));
            nbrs[e.b].push((el, role_b, e.a));
            edge_set.insert(normalized(e.a, e.b, el, e.dir));
        }
        Self {
            pattern,
            nbrs,
            edge_set,
            best: None,
        }
    }

    fn refine(&self, mut colors: Vec<usize>) -> Vec<usize> {
        let mut classes = class_count(&colors);
        loop {
            let sigs: Vec<(usize, Vec<Around<'a>>)> = self
                .nbrs
                .iter()
                .enumerate()
                .map(|(v, around)| {
                    let mut seen: Vec<Around<'a>> = around
                        .iter()
                        .map(|&(el, role, u)| (el, role, colors[u]))
                        .collect();
                    seen.sort_unstable();
                    (colors[v], seen)
                })
                .collect();
            colors = rank(&sigs);
            let next = class_count(&colors);
            if next == classes {
                return colors;
            }
            classes = next;
        }
    }

    /// Whether swapping `u` and `v` maps the pattern onto itself.
    fn swap_is_automorphism(&self, u: usize, v: usize) -> bool {
        let vlab = self.pattern.vlab();
        if vlab[u] != vlab[v] {
            return false;
        }
        let swap = |x: usize| {
            if x == u {
                v
            } else if x == v {
                u
            } else {
                x
            }
        };
        self.pattern.pedges().iter().all(|e| {
            self.edge_set
                .contains(&normalized(swap(e.a), swap(e.b), &e.el, e.dir))
        })
    }

    fn search(&mut self, colors: Vec<usize>) {
        let colors = self.refine(colors);
        let k = colors.len();

        let mut sizes = vec![0usize; k];
        for &c in &colors {
            sizes[c] += 1;
        }
        let Some(target) = (0..k).find(|&c| sizes[c] > 1) else {
            self.offer_leaf(&colors);
            return;
        };

        let members: Vec<usize> = (0..k).filter(|&v| colors[v] == target).collect();
        let mut tried: Vec<usize> = Vec::with_capacity(members.len());
        for v in members {
            if tried.iter().any(|&u| self.swap_is_automorphism(u, v)) {
                continue;
            }
            tried.push(v);
            let split: Vec<(usize, bool)> = colors
                .iter()
                .enumerate()
                .map(|(u, &c)| (c, c == target && u != v))
                .collect();
            self.search(rank(&split));
        }
    }

    fn offer_leaf(&mut self, colors: &[usize]) {
        let mut order = vec![0usize; colors.len()];
        for (v, &pos) in colors.iter().enumerate() {
            order[pos] = v;
        }
        let labels: Vec<String> = order
            .iter()
            .map(|&v| self.pattern.vlab()[v].clone())
            .collect();
        let edges: Vec<CanonicalEdge> = self
            .pattern
            .pedges()
            .iter()
            .map(|e| {
                let (a, b, el, dir) = normalized(colors[e.a], colors[e.b], &e.el, e.dir);
                (a, b, el.to_owned(), dir.code())
            })
            .sorted()
            .collect();
        let leaf = CanonicalForm {
            labels,
            edges,
            order,
        };

        let better = self
            .best
            .as_ref()
            .is_none_or(|best| leaf.encoding() < best.encoding());
        if better {
            self.best = Some(leaf);
        }
    }
}

pub(super) fn canonical_form(pattern: &Pattern) -> CanonicalForm {
    let mut canonizer = Canonizer::new(pattern);
    let initial = rank(&pattern.vlab().iter().map(String::as_str).collect::<Vec<_>>());
    canonizer.search(initial);
    canonizer.best.unwrap_or_else(|| CanonicalForm {
        labels: Vec::new(),
        edges: Vec::new(),
        order: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::pattern::PEdge;

    fn pattern(vlab: &[&str], edges: &[(usize, usize, &str)], dir: EdgeDir) -> Pattern {
        Pattern::new(
            vlab.iter().map(|s| (*s).to_owned()).collect(),
            edges
                .iter()
                .map(|&(a, b, el)| PEdge::new(a, b, el, dir))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn single_edge_key_is_orientation_free_when_undirected() {
        let p = pattern(&["B", "A"], &[(0, 1, "x")], EdgeDir::Undirected);
        assert_eq!(p.key(), "v:A,B|e:0-1:x:0");
    }

    #[test]
    fn directed_edges_keep_orientation() {
        let ab = pattern(&["A", "B"], &[(0, 1, "x")], EdgeDir::Forward);
        let ba = pattern(&["A", "B"], &[(1, 0, "x")], EdgeDir::Forward);
        assert_ne!(ab.key(), ba.key());
        assert_eq!(ab.key(), "v:A,B|e:0-1:x:1");
        assert_eq!(ba.key(), "v:A,B|e:1-0:x:1");
    }

    #[test]
    fn paths_built_from_either_end_collide() {
        let left = pattern(&["A", "B", "C"], &[(0, 1, "x"), (1, 2, "y")], EdgeDir::Undirected);
        let right = pattern(&["C", "B", "A"], &[(1, 0, "y"), (2, 1, "x")], EdgeDir::Undirected);
        assert_eq!(left.key(), right.key());
    }

    #[rstest]
    #[case::path_vs_triangle(
        pattern(&["A", "A", "A"], &[(0, 1, "x"), (1, 2, "x")], EdgeDir::Undirected),
        pattern(&["A", "A", "A"], &[(0, 1, "x"), (1, 2, "x"), (2, 0, "x")], EdgeDir::Undirected)
    )]
    #[case::star_vs_path(
        pattern(&["A", "A", "A", "A"], &[(0, 1, "x"), (0, 2, "x"), (0, 3, "x")], EdgeDir::Undirected),
        pattern(&["A", "A", "A", "A"], &[(0, 1, "x"), (1, 2, "x"), (2, 3, "x")], EdgeDir::Undirected)
    )]
    #[case::label_placement(
        pattern(&["A", "B", "A"], &[(0, 1, "x"), (1, 2, "x")], EdgeDir::Undirected),
        pattern(&["B", "A", "A"], &[(0, 1, "x"), (1, 2, "x")], EdgeDir::Undirected)
    )]
    #[case::edge_label_placement(
        pattern(&["A", "A", "A"], &[(0, 1, "x"), (1, 2, "y")], EdgeDir::Undirected),
        pattern(&["A", "A", "A"], &[(0, 1, "x"), (0, 2, "x")], EdgeDir::Undirected)
    )]
    #[case::in_star_vs_out_star(
        pattern(&["A", "A", "A"], &[(0, 1, "x"), (0, 2, "x")], EdgeDir::Forward),
        pattern(&["A", "A", "A"], &[(1, 0, "x"), (2, 0, "x")], EdgeDir::Forward)
    )]
    #[case::six_cycle_vs_two_triangles_plus_bridge(
        pattern(
            &["A", "A", "A", "A", "A", "A"],
            &[(0, 1, "x"), (1, 2, "x"), (2, 3, "x"), (3, 4, "x"), (4, 5, "x"), (5, 0, "x")],
            EdgeDir::Undirected
        ),
        pattern(
            &["A", "A", "A", "A", "A", "A"],
            &[(0, 1, "x"), (1, 2, "x"), (2, 0, "x"), (3, 4, "x"), (4, 5, "x"), (5, 3, "x"), (0, 3, "x")],
            EdgeDir::Undirected
        )
    )]
    fn non_isomorphic_patterns_differ(#[case] p: Pattern, #[case] q: Pattern) {
        assert_ne!(p.key(), q.key());
    }

    #[test]
    fn regular_graphs_are_separated() {
        // K3,3 and the triangular prism are both 3-regular on six vertices.
        let k33 = pattern(
            &["A"; 6],
            &[
                (0, 3, "x"), (0, 4, "x"), (0, 5, "x"),
                (1, 3, "x"), (1, 4, "x"), (1, 5, "x"),
                (2, 3, "x"), (2, 4, "x"), (2, 5, "x"),
            ],
            EdgeDir::Undirected,
        );
        let prism = pattern(
            &["A"; 6],
            &[
                (0, 1, "x"), (1, 2, "x"), (2, 0, "x"),
                (3, 4, "x"), (4, 5, "x"), (5, 3, "x"),
                (0, 3, "x"), (1, 4, "x"), (2, 5, "x"),
            ],
            EdgeDir::Undirected,
        );
        assert_ne!(k33.key(), prism.key());
    }

    #[test]
    fn cycle_rotations_collide() {
        let a = pattern(
            &["A", "B", "A", "B"],
            &[(0, 1, "x"), (1, 2, "x"), (2, 3, "x"), (3, 0, "x")],
            EdgeDir::Undirected,
        );
        let b = pattern(
            &["B", "A", "B", "A"],
            &[(0, 1, "x"), (1, 2, "x"), (2, 3, "x"), (3, 0, "x")],
            EdgeDir::Undirected,
        );
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn order_maps_positions_back_to_vertices() {
        let p = pattern(&["B", "A"], &[(0, 1, "x")], EdgeDir::Undirected);
        let form = p.canonical_form();
        assert_eq!(form.order(), &[1, 0]);
        assert_eq!(form.labels(), &["A".to_owned(), "B".to_owned()]);
    }

    #[test]
    fn separators_in_labels_are_escaped() {
        let p = pattern(&["a,b", "c"], &[(0, 1, "x:y")], EdgeDir::Undirected);
        let q = pattern(&["a", "b,c"], &[(0, 1, "x:y")], EdgeDir::Undirected);
        assert_ne!(p.key(), q.key());
        assert!(p.key().contains("a\\,b"));
    }
}
