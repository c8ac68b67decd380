//! Immutable labelled data graph.
//!
//! The graph is built once (through [`GraphBuilder`] or the `.lg` loader) and
//! never mutated afterwards, which is what lets every mining worker read it
//! concurrently without locks.

mod labels;
mod loader;

pub use labels::{LabelId, Labels};

use ahash::AHashMap;
use tracing::debug;

use crate::error::{Error, Result};

/// Data vertex id (position in the vertex label sequence).
pub type VertexId = u32;

/// Orientation of an adjacency entry relative to the vertex that owns it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    /// Arc leaving the owning vertex.
    Out,
    /// Arc entering the owning vertex.
    In,
    /// Undirected edge.
    Both,
}

/// One entry of a vertex's adjacency list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Adjacent {
    pub vertex: VertexId,
    pub label: LabelId,
    pub dir: Direction,
}

#[derive(Clone, Debug)]
pub struct DataGraph {
    directed: bool,
    labels: Labels,
    vlabels: Vec<LabelId>,
    /// Sorted by `(vertex, label, dir)`, no duplicates.
    adj: Vec<Vec<Adjacent>>,
    by_label: AHashMap<LabelId, Vec<VertexId>>,
    num_edges: usize,
}

impl DataGraph {
    #[must_use]
    pub const fn is_directed(&self) -> bool {
        self.directed
    }

    #[must_use]
    pub fn num_vertices(&self) -> usize {
        self.vlabels.len()
    }

    /// Number of distinct edges (an undirected edge counts once).
    #[must_use]
    pub const fn num_edges(&self) -> usize {
        self.num_edges
    }

    #[must_use]
    pub const fn labels(&self) -> &Labels {
        &self.labels
    }

    /// Vertex labels indexed by vertex id.
    #[must_use]
    pub fn vlabels(&self) -> &[LabelId] {
        &self.vlabels
    }

    #[must_use]
    pub fn label_of(&self, v: VertexId) -> LabelId {
        self.vlabels[v as usize]
    }

    #[must_use]
    pub fn label_str(&self, v: VertexId) -> &str {
        self.labels.name(self.label_of(v))
    }

    #[must_use]
    pub fn adjacency(&self, v: VertexId) -> &[Adjacent] {
        &self.adj[v as usize]
    }

    /// Vertices carrying `label`, ascending.
    #[must_use]
    pub fn vertices_with_label(&self, label: LabelId) -> &[VertexId] {
        self.by_label.get(&label).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn label_frequency(&self, label: LabelId) -> usize {
        self.vertices_with_label(label).len()
    }

    /// Entries of `adj[u]` pointing at `v` with `label`, any direction.
    #[must_use]
    pub fn edges_between(&self, u: VertexId, v: VertexId, label: LabelId) -> &[Adjacent] {
        let list = &self.adj[u as usize];
        let lo = list.partition_point(|a| (a.vertex, a.label) < (v, label));
        let hi = list.partition_point(|a| (a.vertex, a.label) <= (v, label));
        &list[lo..hi]
    }

    /// Whether an edge labelled `label` runs from `u` to `v`, respecting the
    /// graph's own directedness.
    #[must_use]
    pub fn has_edge(&self, u: VertexId, v: VertexId, label: &str) -> bool {
        let n = self.num_vertices();
        if u as usize >= n || v as usize >= n {
            return false;
        }
        self.labels
            .get(label)
            .is_some_and(|l| self.connects(u, v, l, self.directed))
    }

    /// Edge test used by the search. With `directed` the arc must leave `u`;
    /// otherwise any connection between `u` and `v` with `label` counts.
    #[must_use]
    pub fn connects(&self, u: VertexId, v: VertexId, label: LabelId, directed: bool) -> bool {
        let entries = self.edges_between(u, v, label);
        if directed {
            entries
                .iter()
                .any(|a| matches!(a.dir, Direction::Out | Direction::Both))
        } else {
            !entries.is_empty()
        }
    }
}

/// Incremental constructor for [`DataGraph`].
#[derive(Clone, Debug)]
pub struct GraphBuilder {
    directed: bool,
    labels: Labels,
    vlabels: Vec<LabelId>,
    adj: Vec<Vec<Adjacent>>,
}

impl GraphBuilder {
    #[must_use]
    pub fn new(directed: bool) -> Self {
        Self {
            directed,
            labels: Labels::new(),
            vlabels: Vec::new(),
            adj: Vec::new(),
        }
    }

    /// Append a vertex; ids are handed out densely from zero.
    pub fn add_vertex(&mut self, label: &str) -> VertexId {
        let id = self.vlabels.len() as VertexId;
        let label = self.labels.intern(label);
        self.vlabels.push(label);
        self.adj.push(Vec::new());
        id
    }

    /// Add an edge between two existing vertices.
    ///
    /// Self loops are dropped (an injective embedding can never use one);
    /// the return value tells whether the edge was kept.
    ///
    /// # Errors
    ///
    /// Returns a format error when either endpoint has not been added.
    pub fn add_edge(&mut self, u: VertexId, v: VertexId, label: &str) -> Result<bool> {
        let n = self.vlabels.len();
        for endpoint in [u, v] {
            if endpoint as usize >= n {
                return Err(Error::format(
                    0,
                    format!("edge endpoint {endpoint} out of range (|V| = {n})"),
                ));
            }
        }
        if u == v {
            debug!("Skipping self loop on vertex {u} labelled {label:?}");
            return Ok(false);
        }

        let label = self.labels.intern(label);
        let (fwd, bwd) = if self.directed {
            (Direction::Out, Direction::In)
        } else {
            (Direction::Both, Direction::Both)
        };
        self.adj[u as usize].push(Adjacent {
            vertex: v,
            label,
            dir: fwd,
        });
        self.adj[v as usize].push(Adjacent {
            vertex: u,
            label,
            dir: bwd,
        });
        Ok(true)
    }

    #[must_use]
    pub fn num_vertices(&self) -> usize {
        self.vlabels.len()
    }

    /// Freeze the graph: sort and deduplicate adjacency, index labels.
    #[must_use]
    pub fn build(mut self) -> DataGraph {
        for list in &mut self.adj {
            list.sort_unstable();
            list.dedup();
        }

        let mut by_label: AHashMap<LabelId, Vec<VertexId>> = AHashMap::new();
        for (v, &label) in self.vlabels.iter().enumerate() {
            by_label.entry(label).or_default().push(v as VertexId);
        }

        let half_edges: usize = self
            .adj
            .iter()
            .map(|list| {
                list.iter()
                    .filter(|a| matches!(a.dir, Direction::Out | Direction::Both))
                    .count()
            })
            .sum();
        let num_edges = if self.directed {
            half_edges
        } else {
            half_edges / 2
        };

        debug!(
            "Built graph: |V|={}, |E|={}, labels={}, directed={}",
            self.vlabels.len(),
            num_edges,
            self.labels.len(),
            self.directed
        );

        DataGraph {
            directed: self.directed,
            labels: self.labels,
            vlabels: self.vlabels,
            adj: self.adj,
            by_label,
            num_edges,
        }
    }
}
