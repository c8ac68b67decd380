//! Candidate and frequent patterns.
//!
//! A [`Pattern`] is a small connected labelled graph over local vertex ids
//! `0..k`. Children produced by the extender keep their parent's numbering and
//! append new vertices at the end, so per-vertex data computed for a parent
//! (image sets, domains) lines up with the child's first `k` vertices.
//!
//! Identity is the canonical [`key`](Pattern::key): equality, hashing and
//! deduplication all go through it.

mod canonical;

use std::collections::VecDeque;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use serde::Serialize;
use serde::ser::SerializeStruct;
use sopagrami_common::{Error, Result};

pub use canonical::CanonicalForm;

/// Direction marker of a pattern edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[repr(u8)]
pub enum EdgeDir {
    /// No orientation; `a` and `b` are interchangeable.
    Undirected = 0,
    /// Oriented `a -> b`.
    Forward = 1,
}

impl EdgeDir {
    /// Numeric marker used in keys.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Marker used for edges mined with the given directedness.
    #[must_use]
    pub const fn for_mining(directed: bool) -> Self {
        if directed { Self::Forward } else { Self::Undirected }
    }
}

/// Edge between two local pattern vertices.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PEdge {
    pub a: usize,
    pub b: usize,
    pub el: String,
    pub dir: EdgeDir,
}

impl PEdge {
    #[must_use]
    pub fn new(a: usize, b: usize, el: impl Into<String>, dir: EdgeDir) -> Self {
        Self {
            a,
            b,
            el: el.into(),
            dir,
        }
    }

    #[must_use]
    pub const fn touches(&self, v: usize) -> bool {
        self.a == v || self.b == v
    }

    /// The endpoint opposite `v`, if `v` is an endpoint.
    #[must_use]
    pub const fn other(&self, v: usize) -> Option<usize> {
        if self.a == v {
            Some(self.b)
        } else if self.b == v {
            Some(self.a)
        } else {
            None
        }
    }

    /// Whether `self` and `other` describe the same edge (undirected edges
    /// ignore endpoint order).
    #[must_use]
    pub fn same_edge(&self, other: &Self) -> bool {
        if self.el != other.el || self.dir != other.dir {
            return false;
        }
        let straight = self.a == other.a && self.b == other.b;
        match self.dir {
            EdgeDir::Forward => straight,
            EdgeDir::Undirected => straight || (self.a == other.b && self.b == other.a),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Pattern {
    vlab: Vec<String>,
    pedges: Vec<PEdge>,
    key: OnceLock<String>,
}

impl Pattern {
    /// Build a pattern from user-supplied parts.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPattern`] if there are no edges, an endpoint is out of
    /// range, an edge is a self loop, an edge is repeated, or some vertex is
    /// not reachable from vertex 0.
    pub fn new(vlab: Vec<String>, pedges: Vec<PEdge>) -> Result<Self> {
        let k = vlab.len();
        if pedges.is_empty() {
            return Err(Error::invalid_pattern("a pattern needs at least one edge"));
        }
        for (idx, e) in pedges.iter().enumerate() {
            if e.a >= k || e.b >= k {
                return Err(Error::invalid_pattern(format!(
                    "edge {}-{} references a vertex outside 0..{k}",
                    e.a, e.b
                )));
            }
            if e.a == e.b {
                return Err(Error::invalid_pattern(format!("self loop on vertex {}", e.a)));
            }
            if pedges[..idx].iter().any(|prev| prev.same_edge(e)) {
                return Err(Error::invalid_pattern(format!(
                    "duplicate edge {}-{} labelled {:?}",
                    e.a, e.b, e.el
                )));
            }
        }
        let pattern = Self::from_parts(vlab, pedges);
        if !pattern.is_connected() {
            return Err(Error::invalid_pattern("pattern vertices are not connected"));
        }
        Ok(pattern)
    }

    const fn from_parts(vlab: Vec<String>, pedges: Vec<PEdge>) -> Self {
        Self {
            vlab,
            pedges,
            key: OnceLock::new(),
        }
    }

    /// Two-vertex seed `la --el-- lb`.
    #[must_use]
    pub fn single_edge(la: &str, el: &str, lb: &str, dir: EdgeDir) -> Self {
        Self::from_parts(
            vec![la.to_owned(), lb.to_owned()],
            vec![PEdge::new(0, 1, el, dir)],
        )
    }

    /// Child with a new vertex `k` labelled `label`, attached to `at`.
    ///
    /// For [`EdgeDir::Forward`] edges `outgoing` selects `at -> k` over
    /// `k -> at`; undirected edges ignore it.
    #[must_use]
    pub fn with_new_vertex(
        &self,
        at: usize,
        label: &str,
        el: &str,
        dir: EdgeDir,
        outgoing: bool,
    ) -> Self {
        debug_assert!(at < self.vlab.len());
        let k = self.vlab.len();
        let edge = match (dir, outgoing) {
            (EdgeDir::Forward, false) => PEdge::new(k, at, el, dir),
            _ => PEdge::new(at, k, el, dir),
        };

        let mut vlab = self.vlab.clone();
        vlab.push(label.to_owned());
        let mut pedges = self.pedges.clone();
        pedges.push(edge);
        Self::from_parts(vlab, pedges)
    }

    /// Child with an extra edge between existing vertices, or `None` when the
    /// edge is already present or degenerate.
    #[must_use]
    pub fn with_closing_edge(&self, a: usize, b: usize, el: &str, dir: EdgeDir) -> Option<Self> {
        let k = self.vlab.len();
        if a == b || a >= k || b >= k {
            return None;
        }
        let edge = PEdge::new(a, b, el, dir);
        if self.pedges.iter().any(|e| e.same_edge(&edge)) {
            return None;
        }
        let mut pedges = self.pedges.clone();
        pedges.push(edge);
        Some(Self::from_parts(self.vlab.clone(), pedges))
    }

    /// Vertex labels by local id.
    #[must_use]
    pub fn vlab(&self) -> &[String] {
        &self.vlab
    }

    #[must_use]
    pub fn pedges(&self) -> &[PEdge] {
        &self.pedges
    }

    #[must_use]
    pub fn num_vertices(&self) -> usize {
        self.vlab.len()
    }

    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.pedges.len()
    }

    /// Edges touching `v`.
    pub fn incident(&self, v: usize) -> impl Iterator<Item = &PEdge> {
        self.pedges.iter().filter(move |e| e.touches(v))
    }

    #[must_use]
    pub fn degree(&self, v: usize) -> usize {
        self.incident(v).count()
    }

    /// Whether the pattern already holds this exact edge.
    #[must_use]
    pub fn contains_edge(&self, a: usize, b: usize, el: &str, dir: EdgeDir) -> bool {
        let probe = PEdge::new(a, b, el, dir);
        self.pedges.iter().any(|e| e.same_edge(&probe))
    }

    fn is_connected(&self) -> bool {
        let k = self.vlab.len();
        if k == 0 {
            return false;
        }
        let mut seen = vec![false; k];
        let mut queue = VecDeque::from([0usize]);
        seen[0] = true;
        while let Some(v) = queue.pop_front() {
            for u in self.incident(v).filter_map(|e| e.other(v)) {
                if !seen[u] {
                    seen[u] = true;
                    queue.push_back(u);
                }
            }
        }
        seen.into_iter().all(|s| s)
    }

    /// Canonical form under vertex relabelling.
    #[must_use]
    pub fn canonical_form(&self) -> CanonicalForm {
        canonical::canonical_form(self)
    }

    /// Canonical key, computed on first use and cached on the instance.
    pub fn key(&self) -> &str {
        self.key.get_or_init(|| self.canonical_form().to_key())
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Pattern {}

impl Hash for Pattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl Serialize for Pattern {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Pattern", 3)?;
        s.serialize_field("vlab", &self.vlab)?;
        s.serialize_field("pedges", &self.pedges)?;
        s.serialize_field("key", self.key())?;
        s.end()
    }
}
