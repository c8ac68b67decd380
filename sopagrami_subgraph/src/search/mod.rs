//! Embedding search: backtracking constraint satisfaction against the data
//! graph.
//!
//! Every pattern vertex has a domain of data vertices (label match plus node
//! consistency, optionally narrowed by the parent pattern's viable sets). A
//! [`SearchPlan`] fixes the placement order; at each level the candidates are
//! the anchor image's neighbours that lie in the domain, are unused, and
//! satisfy every other edge to an already placed vertex. The backtracking runs
//! on an explicit stack of frames rather than recursion.

mod plan;
mod state;

use std::ops::ControlFlow;

use sopagrami_common::{DataGraph, Direction, LabelId, VertexId};
use tracing::trace;

use crate::pattern::{EdgeDir, Pattern};

pub use plan::SearchPlan;
use plan::PlanStep;
use state::State;

/// Orientation of a pattern edge seen from the vertex that owns the
/// constraint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Orient {
    Any,
    /// Arc from the owner to `other`.
    Out,
    /// Arc from `other` to the owner.
    In,
}

impl Orient {
    const fn reversed(self) -> Self {
        match self {
            Self::Any => Self::Any,
            Self::Out => Self::In,
            Self::In => Self::Out,
        }
    }

    /// Whether an adjacency entry stored at the owner's image satisfies it.
    const fn accepts(self, dir: Direction) -> bool {
        match self {
            Self::Any => true,
            Self::Out => matches!(dir, Direction::Out | Direction::Both),
            Self::In => matches!(dir, Direction::In | Direction::Both),
        }
    }
}

/// Pattern edge from the owning vertex to `other`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Constraint {
    pub other: usize,
    pub label: LabelId,
    pub orient: Orient,
}

/// One mapping of pattern vertices to distinct data vertices.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Embedding {
    pub mapping: Vec<VertexId>,
}

impl Embedding {
    /// Image of pattern vertex `p`.
    #[must_use]
    pub fn image(&self, p: usize) -> VertexId {
        self.mapping[p]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}

/// Counters from one [`EmbeddingSearch::run`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Complete embeddings handed to the visitor.
    pub embeddings: usize,
    /// Partial assignments tried.
    pub expansions: usize,
    /// The visitor asked to stop.
    pub stopped: bool,
}

/// Frame of the explicit backtracking stack.
struct Frame {
    candidates: Vec<VertexId>,
    cursor: usize,
}

/// Search context for one pattern against one data graph.
pub struct EmbeddingSearch<'g> {
    graph: &'g DataGraph,
    vlabels: Vec<LabelId>,
    constraints: Vec<Vec<Constraint>>,
    /// Sorted candidate lists, one per pattern vertex.
    domains: Vec<Vec<VertexId>>,
}

impl<'g> EmbeddingSearch<'g> {
    /// Prepare a search for `pattern`. With `directed`, forward pattern edges
    /// must follow arc orientation; otherwise every edge is matched as an
    /// undirected connection.
    ///
    /// Returns `None` when a pattern label does not occur in the graph at all,
    /// which means there is no embedding.
    #[must_use]
    pub fn new(graph: &'g DataGraph, pattern: &Pattern, directed: bool) -> Option<Self> {
        let labels = graph.labels();
        let vlabels = pattern
            .vlab()
            .iter()
            .map(|l| labels.get(l))
            .collect::<Option<Vec<LabelId>>>()?;

        let mut constraints: Vec<Vec<Constraint>> = vec![Vec::new(); pattern.num_vertices()];
        for e in pattern.pedges() {
            let label = labels.get(&e.el)?;
            let orient = if directed && e.dir == EdgeDir::Forward {
                Orient::Out
            } else {
                Orient::Any
            };
            constraints[e.a].push(Constraint {
                other: e.b,
                label,
                orient,
            });
            constraints[e.b].push(Constraint {
                other: e.a,
                label,
                orient: orient.reversed(),
            });
        }

        let mut search = Self {
            graph,
            vlabels,
            constraints,
            domains: Vec::new(),
        };
        search.domains = (0..pattern.num_vertices())
            .map(|p| search.initial_domain(p))
            .collect();
        Some(search)
    }

    /// Data vertices with the right label whose neighbourhood can serve
    /// every pattern edge at `p`.
    fn initial_domain(&self, p: usize) -> Vec<VertexId> {
        self.graph
            .vertices_with_label(self.vlabels[p])
            .iter()
            .copied()
            .filter(|&v| {
                self.constraints[p].iter().all(|c| {
                    let wanted = self.vlabels[c.other];
                    self.graph.adjacency(v).iter().any(|a| {
                        a.label == c.label
                            && c.orient.accepts(a.dir)
                            && self.graph.label_of(a.vertex) == wanted
                    })
                })
            })
            .collect()
    }

    /// Intersect the leading domains with sets inherited from a parent
    /// pattern (same local numbering).
    #[must_use]
    pub fn with_inherited(mut self, inherited: &[Vec<VertexId>]) -> Self {
        for (domain, parent) in self.domains.iter_mut().zip(inherited) {
            domain.retain(|v| parent.binary_search(v).is_ok());
        }
        self
    }

    pub fn domains(&self) -> &[Vec<VertexId>] {
        &self.domains
    }

    /// Replace the domain of `p`; `keep` must be sorted.
    pub fn restrict(&mut self, p: usize, keep: Vec<VertexId>) {
        debug_assert!(keep.is_sorted());
        self.domains[p] = keep;
    }

    pub fn pattern_vertices(&self) -> usize {
        self.vlabels.len()
    }

    /// Plan starting at `first`, or at the most selective vertex.
    #[must_use]
    pub fn plan(&self, first: Option<usize>) -> SearchPlan {
        let sizes: Vec<usize> = self.domains.iter().map(Vec::len).collect();
        SearchPlan::build(&self.constraints, &sizes, first)
    }

    fn satisfies(&self, d: VertexId, c: &Constraint, state: &State) -> bool {
        state.mapped_to(c.other).is_some_and(|o| {
            self.graph
                .edges_between(d, o, c.label)
                .iter()
                .any(|a| c.orient.accepts(a.dir))
        })
    }

    fn candidates(&self, step: &PlanStep, state: &State, pin: Option<VertexId>) -> Vec<VertexId> {
        let domain = &self.domains[step.vertex];
        let in_domain = |d: &VertexId| domain.binary_search(d).is_ok();

        let mut base: Vec<VertexId> = match (pin, step.anchor) {
            (Some(pinned), _) => vec![pinned],
            (None, Some(anchor)) => {
                let Some(o) = state.mapped_to(anchor.other) else {
                    return Vec::new();
                };
                let from_anchor = anchor.orient.reversed();
                let mut found: Vec<VertexId> = self
                    .graph
                    .adjacency(o)
                    .iter()
                    .filter(|a| a.label == anchor.label && from_anchor.accepts(a.dir))
                    .map(|a| a.vertex)
                    .collect();
                found.dedup();
                found
            }
            (None, None) => domain.clone(),
        };

        base.retain(|d| {
            in_domain(d)
                && !state.is_used(*d)
                && step.anchor.is_none_or(|a| pin.is_none() || self.satisfies(*d, &a, state))
                && step.checks.iter().all(|c| self.satisfies(*d, c, state))
        });
        base
    }

    /// Walk every embedding consistent with the domains, in `plan` order.
    ///
    /// With `pin`, the plan's first vertex is fixed to that data vertex. The
    /// visitor sees each complete mapping (indexed by pattern vertex) and may
    /// stop the walk with [`ControlFlow::Break`].
    pub fn run<F>(&self, plan: &SearchPlan, pin: Option<VertexId>, mut visit: F) -> SearchStats
    where
        F: FnMut(&[VertexId]) -> ControlFlow<()>,
    {
        let mut stats = SearchStats::default();
        let Some(first) = plan.steps.first() else {
            return stats;
        };

        let mut state = State::new(self.pattern_vertices());
        let mut stack: Vec<Frame> = vec![Frame {
            candidates: self.candidates(first, &state, pin),
            cursor: 0,
        }];

        while let Some(depth) = stack.len().checked_sub(1) {
            let vertex = plan.steps[depth].vertex;
            if let Some(d) = state.mapped_to(vertex) {
                state.unmap(vertex, d);
            }

            let frame = &mut stack[depth];
            let Some(&cand) = frame.candidates.get(frame.cursor) else {
                stack.pop();
                continue;
            };
            frame.cursor += 1;

            state.map(vertex, cand);
            stats.expansions += 1;

            if state.done() {
                stats.embeddings += 1;
                if visit(&state.images()).is_break() {
                    stats.stopped = true;
                    break;
                }
                continue;
            }

            let next = self.candidates(&plan.steps[depth + 1], &state, None);
            if !next.is_empty() {
                stack.push(Frame {
                    candidates: next,
                    cursor: 0,
                });
            }
        }

        trace!(
            "Search over {} levels: {} embeddings, {} expansions, stopped={}",
            plan.len(),
            stats.embeddings,
            stats.expansions,
            stats.stopped
        );
        stats
    }

    /// First embedding that maps `plan`'s first vertex to `pin`, if any.
    #[must_use]
    pub fn find_pinned(&self, plan: &SearchPlan, pin: VertexId) -> Option<Embedding> {
        let mut found = None;
        self.run(plan, Some(pin), |mapping| {
            found = Some(Embedding {
                mapping: mapping.to_vec(),
            });
            ControlFlow::Break(())
        });
        found
    }

    /// Enumerate embeddings, up to `limit` when given.
    #[must_use]
    pub fn enumerate(&self, limit: Option<usize>) -> Vec<Embedding> {
        let plan = self.plan(None);
        let mut out = Vec::new();
        self.run(&plan, None, |mapping| {
            out.push(Embedding {
                mapping: mapping.to_vec(),
            });
            if limit.is_some_and(|l| out.len() >= l) {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        out
    }
}

/// Every embedding of `pattern` in `graph`.
#[must_use]
pub fn find_embeddings(graph: &DataGraph, pattern: &Pattern, directed: bool) -> Vec<Embedding> {
    EmbeddingSearch::new(graph, pattern, directed).map_or_else(Vec::new, |s| s.enumerate(None))
}
